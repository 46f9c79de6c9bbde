use axum::Json;
use axum::extract::{Extension, Path, State};
use axum::http::StatusCode;
use uuid::Uuid;
use workhive_application::CreateProjectInput;
use workhive_core::ActorContext;

use crate::dto::{
    AssignProjectTeamRequest, BacklogResponse, BoardResponse, CreateProjectRequest,
    ProjectResponse, UpdateProjectRequest,
};
use crate::error::ApiResult;
use crate::state::AppState;

pub async fn create_project_handler(
    State(state): State<AppState>,
    Extension(actor): Extension<ActorContext>,
    Json(payload): Json<CreateProjectRequest>,
) -> ApiResult<(StatusCode, Json<ProjectResponse>)> {
    let project = state
        .project_service
        .create_project(
            &actor,
            CreateProjectInput {
                stream_id: payload.stream_id,
                name: payload.name,
                description: payload.description,
                team_id: payload.team_id,
            },
        )
        .await?;

    Ok((StatusCode::CREATED, Json(ProjectResponse::from(project))))
}

pub async fn list_projects_handler(
    State(state): State<AppState>,
    Extension(actor): Extension<ActorContext>,
    Path(stream_id): Path<Uuid>,
) -> ApiResult<Json<Vec<ProjectResponse>>> {
    let projects = state
        .project_service
        .list_projects(&actor, stream_id)
        .await?
        .into_iter()
        .map(ProjectResponse::from)
        .collect();

    Ok(Json(projects))
}

pub async fn get_project_handler(
    State(state): State<AppState>,
    Extension(actor): Extension<ActorContext>,
    Path(project_id): Path<Uuid>,
) -> ApiResult<Json<ProjectResponse>> {
    let project = state.project_service.get_project(&actor, project_id).await?;

    Ok(Json(ProjectResponse::from(project)))
}

pub async fn update_project_handler(
    State(state): State<AppState>,
    Extension(actor): Extension<ActorContext>,
    Path(project_id): Path<Uuid>,
    Json(payload): Json<UpdateProjectRequest>,
) -> ApiResult<Json<ProjectResponse>> {
    let project = state
        .project_service
        .update_project(&actor, project_id, payload.into())
        .await?;

    Ok(Json(ProjectResponse::from(project)))
}

pub async fn assign_project_team_handler(
    State(state): State<AppState>,
    Extension(actor): Extension<ActorContext>,
    Path(project_id): Path<Uuid>,
    Json(payload): Json<AssignProjectTeamRequest>,
) -> ApiResult<Json<ProjectResponse>> {
    let project = state
        .project_service
        .assign_project_to_team(&actor, project_id, payload.team_id)
        .await?;

    Ok(Json(ProjectResponse::from(project)))
}

pub async fn delete_project_handler(
    State(state): State<AppState>,
    Extension(actor): Extension<ActorContext>,
    Path(project_id): Path<Uuid>,
) -> ApiResult<StatusCode> {
    state
        .project_service
        .delete_project(&actor, project_id)
        .await?;

    Ok(StatusCode::NO_CONTENT)
}

pub async fn get_board_handler(
    State(state): State<AppState>,
    Extension(actor): Extension<ActorContext>,
    Path(project_id): Path<Uuid>,
) -> ApiResult<Json<BoardResponse>> {
    let board = state.project_service.get_board(&actor, project_id).await?;

    Ok(Json(BoardResponse::from(board)))
}

pub async fn get_backlog_handler(
    State(state): State<AppState>,
    Extension(actor): Extension<ActorContext>,
    Path(project_id): Path<Uuid>,
) -> ApiResult<Json<BacklogResponse>> {
    let backlog = state.project_service.get_backlog(&actor, project_id).await?;

    Ok(Json(BacklogResponse::from(backlog)))
}

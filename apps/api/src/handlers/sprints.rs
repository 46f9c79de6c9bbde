use axum::Json;
use axum::extract::{Extension, Path, State};
use axum::http::StatusCode;
use uuid::Uuid;
use workhive_application::CreateSprintInput;
use workhive_core::ActorContext;

use crate::dto::{
    CardEntryResponse, CardResponse, CreateSprintRequest, MoveCardToColumnRequest,
    MoveCardToSprintRequest, SprintResponse, UpdateSprintRequest,
};
use crate::error::ApiResult;
use crate::state::AppState;

pub async fn create_sprint_handler(
    State(state): State<AppState>,
    Extension(actor): Extension<ActorContext>,
    Path(project_id): Path<Uuid>,
    Json(payload): Json<CreateSprintRequest>,
) -> ApiResult<(StatusCode, Json<SprintResponse>)> {
    let sprint = state
        .project_service
        .create_sprint(
            &actor,
            CreateSprintInput {
                project_id,
                name: payload.name,
                goal: payload.goal,
            },
        )
        .await?;

    Ok((StatusCode::CREATED, Json(SprintResponse::from(sprint))))
}

pub async fn list_sprints_handler(
    State(state): State<AppState>,
    Extension(actor): Extension<ActorContext>,
    Path(project_id): Path<Uuid>,
) -> ApiResult<Json<Vec<SprintResponse>>> {
    let sprints = state
        .project_service
        .list_sprints(&actor, project_id)
        .await?
        .into_iter()
        .map(SprintResponse::from)
        .collect();

    Ok(Json(sprints))
}

pub async fn update_sprint_handler(
    State(state): State<AppState>,
    Extension(actor): Extension<ActorContext>,
    Path(sprint_id): Path<Uuid>,
    Json(payload): Json<UpdateSprintRequest>,
) -> ApiResult<Json<SprintResponse>> {
    let sprint = state
        .project_service
        .update_sprint(&actor, sprint_id, payload.into())
        .await?;

    Ok(Json(SprintResponse::from(sprint)))
}

pub async fn start_sprint_handler(
    State(state): State<AppState>,
    Extension(actor): Extension<ActorContext>,
    Path(sprint_id): Path<Uuid>,
) -> ApiResult<Json<SprintResponse>> {
    let sprint = state.project_service.start_sprint(&actor, sprint_id).await?;

    Ok(Json(SprintResponse::from(sprint)))
}

pub async fn complete_sprint_handler(
    State(state): State<AppState>,
    Extension(actor): Extension<ActorContext>,
    Path(sprint_id): Path<Uuid>,
) -> ApiResult<Json<SprintResponse>> {
    let sprint = state
        .project_service
        .complete_sprint(&actor, sprint_id)
        .await?;

    Ok(Json(SprintResponse::from(sprint)))
}

pub async fn delete_sprint_handler(
    State(state): State<AppState>,
    Extension(actor): Extension<ActorContext>,
    Path(sprint_id): Path<Uuid>,
) -> ApiResult<StatusCode> {
    state
        .project_service
        .delete_sprint(&actor, sprint_id)
        .await?;

    Ok(StatusCode::NO_CONTENT)
}

pub async fn move_card_to_sprint_handler(
    State(state): State<AppState>,
    Extension(actor): Extension<ActorContext>,
    Path(card_id): Path<Uuid>,
    Json(payload): Json<MoveCardToSprintRequest>,
) -> ApiResult<Json<CardResponse>> {
    let card = state
        .project_service
        .move_card_to_sprint(&actor, card_id, payload.sprint_id)
        .await?;

    Ok(Json(CardResponse::from(card)))
}

pub async fn move_card_to_backlog_handler(
    State(state): State<AppState>,
    Extension(actor): Extension<ActorContext>,
    Path(card_id): Path<Uuid>,
) -> ApiResult<Json<CardResponse>> {
    let card = state
        .project_service
        .move_card_to_backlog(&actor, card_id)
        .await?;

    Ok(Json(CardResponse::from(card)))
}

pub async fn move_card_to_column_handler(
    State(state): State<AppState>,
    Extension(actor): Extension<ActorContext>,
    Path(card_id): Path<Uuid>,
    Json(payload): Json<MoveCardToColumnRequest>,
) -> ApiResult<Json<CardEntryResponse>> {
    let entry = state
        .project_service
        .move_card_to_column(&actor, card_id, payload.column_id)
        .await?;

    Ok(Json(CardEntryResponse::from(entry)))
}

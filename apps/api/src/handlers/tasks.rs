use axum::Json;
use axum::extract::{Extension, Path, State};
use axum::http::StatusCode;
use uuid::Uuid;
use workhive_application::CreateTaskInput;
use workhive_core::{ActorContext, UserId};

use crate::dto::{
    AddChecklistItemRequest, AddDependencyRequest, AddSubtaskRequest, AssignTaskRequest,
    ChecklistItemResponse, CreateTaskRequest, CreatedTaskResponse, DependencyResponse,
    ProjectSummaryResponse, SetChecklistItemDoneRequest, TaskDetailsResponse, TaskResponse,
    UpdateTaskRequest, parse_priority,
};
use crate::error::ApiResult;
use crate::state::AppState;

pub async fn create_task_handler(
    State(state): State<AppState>,
    Extension(actor): Extension<ActorContext>,
    Path(project_id): Path<Uuid>,
    Json(payload): Json<CreateTaskRequest>,
) -> ApiResult<(StatusCode, Json<CreatedTaskResponse>)> {
    let created = state
        .task_service
        .create_task(
            &actor,
            CreateTaskInput {
                project_id,
                description: payload.description,
                priority: parse_priority(payload.priority)?,
                due_date: payload.due_date,
                labels: payload.labels,
                sprint_id: payload.sprint_id,
            },
        )
        .await?;

    Ok((StatusCode::CREATED, Json(CreatedTaskResponse::from(created))))
}

pub async fn list_tasks_handler(
    State(state): State<AppState>,
    Extension(actor): Extension<ActorContext>,
    Path(project_id): Path<Uuid>,
) -> ApiResult<Json<Vec<TaskResponse>>> {
    let tasks = state
        .task_service
        .list_tasks(&actor, project_id)
        .await?
        .into_iter()
        .map(TaskResponse::from)
        .collect();

    Ok(Json(tasks))
}

pub async fn get_task_handler(
    State(state): State<AppState>,
    Extension(actor): Extension<ActorContext>,
    Path(task_id): Path<Uuid>,
) -> ApiResult<Json<TaskDetailsResponse>> {
    let details = state.task_service.get_task(&actor, task_id).await?;

    Ok(Json(TaskDetailsResponse::from(details)))
}

pub async fn update_task_handler(
    State(state): State<AppState>,
    Extension(actor): Extension<ActorContext>,
    Path(task_id): Path<Uuid>,
    Json(payload): Json<UpdateTaskRequest>,
) -> ApiResult<Json<TaskResponse>> {
    let task = state
        .task_service
        .update_task(&actor, task_id, payload.into_update()?)
        .await?;

    Ok(Json(TaskResponse::from(task)))
}

pub async fn delete_task_handler(
    State(state): State<AppState>,
    Extension(actor): Extension<ActorContext>,
    Path(task_id): Path<Uuid>,
) -> ApiResult<StatusCode> {
    state.task_service.delete_task(&actor, task_id).await?;

    Ok(StatusCode::NO_CONTENT)
}

pub async fn add_subtask_handler(
    State(state): State<AppState>,
    Extension(actor): Extension<ActorContext>,
    Path(task_id): Path<Uuid>,
    Json(payload): Json<AddSubtaskRequest>,
) -> ApiResult<(StatusCode, Json<TaskResponse>)> {
    let subtask = state
        .task_service
        .add_subtask(&actor, task_id, payload.description.as_str())
        .await?;

    Ok((StatusCode::CREATED, Json(TaskResponse::from(subtask))))
}

pub async fn add_dependency_handler(
    State(state): State<AppState>,
    Extension(actor): Extension<ActorContext>,
    Path(task_id): Path<Uuid>,
    Json(payload): Json<AddDependencyRequest>,
) -> ApiResult<(StatusCode, Json<DependencyResponse>)> {
    let dependency = state
        .task_service
        .add_dependency(&actor, task_id, payload.depends_on_task_id)
        .await?;

    Ok((StatusCode::CREATED, Json(DependencyResponse::from(dependency))))
}

pub async fn remove_dependency_handler(
    State(state): State<AppState>,
    Extension(actor): Extension<ActorContext>,
    Path((task_id, depends_on_task_id)): Path<(Uuid, Uuid)>,
) -> ApiResult<StatusCode> {
    state
        .task_service
        .remove_dependency(&actor, task_id, depends_on_task_id)
        .await?;

    Ok(StatusCode::NO_CONTENT)
}

pub async fn assign_task_handler(
    State(state): State<AppState>,
    Extension(actor): Extension<ActorContext>,
    Path(task_id): Path<Uuid>,
    Json(payload): Json<AssignTaskRequest>,
) -> ApiResult<Json<TaskResponse>> {
    let task = state
        .task_service
        .assign_task(&actor, task_id, UserId::from_uuid(payload.user_id))
        .await?;

    Ok(Json(TaskResponse::from(task)))
}

pub async fn reassign_task_handler(
    State(state): State<AppState>,
    Extension(actor): Extension<ActorContext>,
    Path(task_id): Path<Uuid>,
    Json(payload): Json<AssignTaskRequest>,
) -> ApiResult<Json<TaskResponse>> {
    let task = state
        .task_service
        .reassign_task(&actor, task_id, UserId::from_uuid(payload.user_id))
        .await?;

    Ok(Json(TaskResponse::from(task)))
}

pub async fn unassign_task_handler(
    State(state): State<AppState>,
    Extension(actor): Extension<ActorContext>,
    Path(task_id): Path<Uuid>,
) -> ApiResult<Json<TaskResponse>> {
    let task = state.task_service.unassign_task(&actor, task_id).await?;

    Ok(Json(TaskResponse::from(task)))
}

pub async fn add_checklist_item_handler(
    State(state): State<AppState>,
    Extension(actor): Extension<ActorContext>,
    Path(task_id): Path<Uuid>,
    Json(payload): Json<AddChecklistItemRequest>,
) -> ApiResult<(StatusCode, Json<ChecklistItemResponse>)> {
    let item = state
        .task_service
        .add_checklist_item(&actor, task_id, payload.content.as_str())
        .await?;

    Ok((StatusCode::CREATED, Json(ChecklistItemResponse::from(item))))
}

pub async fn set_checklist_item_done_handler(
    State(state): State<AppState>,
    Extension(actor): Extension<ActorContext>,
    Path(item_id): Path<Uuid>,
    Json(payload): Json<SetChecklistItemDoneRequest>,
) -> ApiResult<Json<ChecklistItemResponse>> {
    let item = if payload.is_done {
        state
            .task_service
            .mark_checklist_item_complete(&actor, item_id)
            .await?
    } else {
        state
            .task_service
            .mark_checklist_item_incomplete(&actor, item_id)
            .await?
    };

    Ok(Json(ChecklistItemResponse::from(item)))
}

pub async fn remove_checklist_item_handler(
    State(state): State<AppState>,
    Extension(actor): Extension<ActorContext>,
    Path(item_id): Path<Uuid>,
) -> ApiResult<StatusCode> {
    state
        .task_service
        .remove_checklist_item(&actor, item_id)
        .await?;

    Ok(StatusCode::NO_CONTENT)
}

pub async fn get_summary_handler(
    State(state): State<AppState>,
    Extension(actor): Extension<ActorContext>,
    Path(project_id): Path<Uuid>,
) -> ApiResult<Json<ProjectSummaryResponse>> {
    let summary = state.task_service.get_summary(&actor, project_id).await?;

    Ok(Json(ProjectSummaryResponse::from(summary)))
}

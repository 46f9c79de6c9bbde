use axum::Json;
use axum::extract::{Extension, Path, State};
use axum::http::StatusCode;
use uuid::Uuid;
use workhive_core::ActorContext;
use workhive_domain::{PermissionAction, ResourceType};

use crate::dto::{
    CreatePermissionRequest, PermissionResponse, RoleDefinitionResponse, RoleNameRequest,
    RoleResponse, UpdatePermissionRequest,
};
use crate::error::ApiResult;
use crate::state::AppState;

pub async fn list_roles_handler(
    State(state): State<AppState>,
    Extension(actor): Extension<ActorContext>,
) -> ApiResult<Json<Vec<RoleResponse>>> {
    let roles = state
        .role_service
        .list_roles(&actor)
        .await?
        .into_iter()
        .map(RoleResponse::from)
        .collect();

    Ok(Json(roles))
}

pub async fn get_role_handler(
    State(state): State<AppState>,
    Extension(actor): Extension<ActorContext>,
    Path(role_id): Path<Uuid>,
) -> ApiResult<Json<RoleDefinitionResponse>> {
    let role = state.role_service.get_role(&actor, role_id).await?;

    Ok(Json(RoleDefinitionResponse::from(role)))
}

pub async fn create_role_handler(
    State(state): State<AppState>,
    Extension(actor): Extension<ActorContext>,
    Json(payload): Json<RoleNameRequest>,
) -> ApiResult<(StatusCode, Json<RoleDefinitionResponse>)> {
    let role = state
        .role_service
        .create_role(&actor, payload.name.as_str())
        .await?;

    Ok((StatusCode::CREATED, Json(RoleDefinitionResponse::from(role))))
}

pub async fn update_role_handler(
    State(state): State<AppState>,
    Extension(actor): Extension<ActorContext>,
    Path(role_id): Path<Uuid>,
    Json(payload): Json<RoleNameRequest>,
) -> ApiResult<Json<RoleResponse>> {
    let role = state
        .role_service
        .update_role(&actor, role_id, payload.name.as_str())
        .await?;

    Ok(Json(RoleResponse::from(role)))
}

pub async fn delete_role_handler(
    State(state): State<AppState>,
    Extension(actor): Extension<ActorContext>,
    Path(role_id): Path<Uuid>,
) -> ApiResult<StatusCode> {
    state.role_service.delete_role(&actor, role_id).await?;

    Ok(StatusCode::NO_CONTENT)
}

pub async fn get_permissions_handler(
    State(state): State<AppState>,
    Extension(actor): Extension<ActorContext>,
    Path(role_id): Path<Uuid>,
) -> ApiResult<Json<Vec<PermissionResponse>>> {
    let permissions = state
        .permission_service
        .get_permissions(&actor, role_id)
        .await?
        .into_iter()
        .map(PermissionResponse::from)
        .collect();

    Ok(Json(permissions))
}

pub async fn create_permission_handler(
    State(state): State<AppState>,
    Extension(actor): Extension<ActorContext>,
    Path(role_id): Path<Uuid>,
    Json(payload): Json<CreatePermissionRequest>,
) -> ApiResult<(StatusCode, Json<PermissionResponse>)> {
    let resource_type = payload.resource_type.parse::<ResourceType>()?;
    let action = payload.action.parse::<PermissionAction>()?;
    let permission = state
        .permission_service
        .create_permission(&actor, role_id, resource_type, action, payload.value)
        .await?;

    Ok((StatusCode::CREATED, Json(PermissionResponse::from(permission))))
}

pub async fn update_permission_handler(
    State(state): State<AppState>,
    Extension(actor): Extension<ActorContext>,
    Path(permission_id): Path<Uuid>,
    Json(payload): Json<UpdatePermissionRequest>,
) -> ApiResult<Json<PermissionResponse>> {
    let permission = state
        .permission_service
        .update_permission(&actor, permission_id, payload.value)
        .await?;

    Ok(Json(PermissionResponse::from(permission)))
}

use axum::Json;
use axum::extract::State;
use tower_sessions::Session;
use tracing::info;
use workhive_core::{ActorContext, AppError, UserId, UserIdentity};

use crate::dto::{BootstrapRequest, UserIdentityResponse};
use crate::error::ApiResult;
use crate::state::AppState;

use super::SESSION_USER_KEY;

pub async fn bootstrap_handler(
    State(state): State<AppState>,
    session: Session,
    Json(payload): Json<BootstrapRequest>,
) -> ApiResult<Json<UserIdentityResponse>> {
    if payload.token != state.bootstrap_token {
        return Err(AppError::Unauthorized("invalid bootstrap token".to_owned()).into());
    }

    let identity = UserIdentity::new(
        UserId::from_uuid(payload.user_id),
        payload.display_name,
        payload.email,
    );
    let account = state.workspace_service.register_user(&identity).await?;

    session
        .cycle_id()
        .await
        .map_err(|error| AppError::Internal(format!("failed to cycle session id: {error}")))?;

    session
        .insert(SESSION_USER_KEY, &identity)
        .await
        .map_err(|error| {
            AppError::Internal(format!("failed to persist session identity: {error}"))
        })?;

    info!(user_id = %account.user_id, "bootstrap sign-in");

    let actor = ActorContext::new(identity.clone(), None);
    let workspaces = state.workspace_service.my_workspaces(&actor).await?;
    Ok(Json(UserIdentityResponse::from_identity(
        &identity, workspaces,
    )))
}

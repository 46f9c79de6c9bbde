use axum::extract::{Request, State};
use axum::http::{HeaderMap, HeaderValue, Method, header};
use axum::middleware::Next;
use axum::response::Response;
use tower_sessions::Session;
use uuid::Uuid;
use workhive_core::{ActorContext, AppError, UserIdentity, WorkspaceId};

use crate::auth::SESSION_USER_KEY;
use crate::error::ApiResult;
use crate::state::AppState;

/// Request header naming the workspace an operation targets.
pub const WORKSPACE_HEADER: &str = "x-workspace-id";

pub async fn require_auth(
    session: Session,
    mut request: Request,
    next: Next,
) -> ApiResult<Response> {
    let identity = session
        .get::<UserIdentity>(SESSION_USER_KEY)
        .await
        .map_err(|error| AppError::Internal(format!("failed to read session identity: {error}")))?
        .ok_or_else(|| AppError::Unauthorized("authentication required".to_owned()))?;

    let workspace_id = requested_workspace(request.headers())?;
    request
        .extensions_mut()
        .insert(ActorContext::new(identity, workspace_id));
    Ok(next.run(request).await)
}

fn requested_workspace(headers: &HeaderMap) -> Result<Option<WorkspaceId>, AppError> {
    let Some(value) = headers.get(WORKSPACE_HEADER) else {
        return Ok(None);
    };

    let value = value
        .to_str()
        .map_err(|_| AppError::Validation(format!("{WORKSPACE_HEADER} must be ASCII")))?
        .trim();
    if value.is_empty() {
        return Ok(None);
    }

    Uuid::parse_str(value)
        .map(|uuid| Some(WorkspaceId::from_uuid(uuid)))
        .map_err(|error| AppError::Validation(format!("invalid {WORKSPACE_HEADER}: {error}")))
}

pub async fn require_same_origin_for_mutations(
    State(state): State<AppState>,
    request: Request,
    next: Next,
) -> ApiResult<Response> {
    if is_state_changing_method(request.method()) {
        let headers = request.headers();

        if let Some(fetch_site) = headers.get("sec-fetch-site") {
            if fetch_site == HeaderValue::from_static("cross-site") {
                return Err(AppError::Unauthorized("cross-site request blocked".to_owned()).into());
            }
        }

        let origin = headers
            .get(header::ORIGIN)
            .and_then(|value| value.to_str().ok())
            .unwrap_or_default();
        let referer = headers
            .get(header::REFERER)
            .and_then(|value| value.to_str().ok())
            .unwrap_or_default();

        let allowed_origin = state.frontend_url;
        let origin_is_allowed = origin == allowed_origin;
        let referer_is_allowed = referer.starts_with(&allowed_origin);

        if !origin_is_allowed && !referer_is_allowed {
            return Err(AppError::Unauthorized("origin validation failed".to_owned()).into());
        }
    }

    Ok(next.run(request).await)
}

fn is_state_changing_method(method: &Method) -> bool {
    matches!(
        *method,
        Method::POST | Method::PUT | Method::PATCH | Method::DELETE
    )
}

#[cfg(test)]
mod tests {
    use axum::http::{HeaderMap, HeaderValue, Method};
    use workhive_core::AppError;

    use super::{WORKSPACE_HEADER, is_state_changing_method, requested_workspace};

    #[test]
    fn missing_or_blank_workspace_header_falls_back_to_default() {
        let headers = HeaderMap::new();
        assert!(requested_workspace(&headers).is_ok_and(|workspace| workspace.is_none()));

        let mut blank = HeaderMap::new();
        blank.insert(WORKSPACE_HEADER, HeaderValue::from_static("  "));
        assert!(requested_workspace(&blank).is_ok_and(|workspace| workspace.is_none()));
    }

    #[test]
    fn workspace_header_parses_uuid() {
        let mut headers = HeaderMap::new();
        headers.insert(
            WORKSPACE_HEADER,
            HeaderValue::from_static("6f1c1d8e-3a52-4d8c-9a55-0f0b7f8b8a11"),
        );

        let workspace = requested_workspace(&headers);
        assert!(workspace.is_ok_and(|workspace| {
            workspace.is_some_and(|id| id.to_string() == "6f1c1d8e-3a52-4d8c-9a55-0f0b7f8b8a11")
        }));
    }

    #[test]
    fn malformed_workspace_header_is_rejected() {
        let mut headers = HeaderMap::new();
        headers.insert(WORKSPACE_HEADER, HeaderValue::from_static("acme"));

        assert!(matches!(
            requested_workspace(&headers),
            Err(AppError::Validation(_))
        ));
    }

    #[test]
    fn only_mutating_methods_need_same_origin() {
        assert!(is_state_changing_method(&Method::DELETE));
        assert!(is_state_changing_method(&Method::PATCH));
        assert!(!is_state_changing_method(&Method::GET));
        assert!(!is_state_changing_method(&Method::OPTIONS));
    }
}

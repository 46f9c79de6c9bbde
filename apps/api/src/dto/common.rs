use serde::{Deserialize, Deserializer, Serialize};
use ts_rs::TS;
use workhive_core::UserIdentity;
use workhive_domain::Workspace;

use super::workspaces::WorkspaceResponse;

/// Health response payload.
#[derive(Debug, Serialize, TS)]
#[ts(
    export,
    export_to = "../../../../packages/api-types/src/generated/health-response.ts"
)]
pub struct HealthResponse {
    pub status: &'static str,
}

/// Development sign-in payload trusted through the shared bootstrap token.
#[derive(Debug, Deserialize, TS)]
#[ts(
    export,
    export_to = "../../../../packages/api-types/src/generated/bootstrap-request.ts"
)]
pub struct BootstrapRequest {
    #[ts(type = "string")]
    pub user_id: uuid::Uuid,
    pub display_name: String,
    pub email: Option<String>,
    pub token: String,
}

/// Authenticated user with the workspaces they belong to.
#[derive(Debug, Serialize, TS)]
#[ts(
    export,
    export_to = "../../../../packages/api-types/src/generated/user-identity-response.ts"
)]
pub struct UserIdentityResponse {
    pub user_id: String,
    pub display_name: String,
    pub email: Option<String>,
    pub workspaces: Vec<WorkspaceResponse>,
}

impl UserIdentityResponse {
    pub fn from_identity(identity: &UserIdentity, workspaces: Vec<Workspace>) -> Self {
        Self {
            user_id: identity.user_id().to_string(),
            display_name: identity.display_name().to_owned(),
            email: identity.email().map(ToOwned::to_owned),
            workspaces: workspaces.into_iter().map(WorkspaceResponse::from).collect(),
        }
    }
}

/// Keeps an explicit `null` apart from a missing field in patch payloads.
pub(crate) fn patch_field<'de, D, T>(deserializer: D) -> Result<Option<Option<T>>, D::Error>
where
    D: Deserializer<'de>,
    T: Deserialize<'de>,
{
    Option::<T>::deserialize(deserializer).map(Some)
}

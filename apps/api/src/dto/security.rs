use serde::{Deserialize, Serialize};
use ts_rs::TS;
use workhive_application::RoleDefinition;
use workhive_domain::{Permission, Role};

/// Incoming payload for role creation and renaming.
#[derive(Debug, Deserialize, TS)]
#[ts(
    export,
    export_to = "../../../../packages/api-types/src/generated/role-name-request.ts"
)]
pub struct RoleNameRequest {
    pub name: String,
}

/// Incoming payload for a new permission row.
#[derive(Debug, Deserialize, TS)]
#[ts(
    export,
    export_to = "../../../../packages/api-types/src/generated/create-permission-request.ts"
)]
pub struct CreatePermissionRequest {
    pub resource_type: String,
    pub action: String,
    pub value: bool,
}

/// Incoming payload for granting or revoking a permission row.
#[derive(Debug, Deserialize, TS)]
#[ts(
    export,
    export_to = "../../../../packages/api-types/src/generated/update-permission-request.ts"
)]
pub struct UpdatePermissionRequest {
    pub value: bool,
}

/// API representation of a role.
#[derive(Debug, Serialize, TS)]
#[ts(
    export,
    export_to = "../../../../packages/api-types/src/generated/role-response.ts"
)]
pub struct RoleResponse {
    pub role_id: String,
    pub name: String,
}

impl From<Role> for RoleResponse {
    fn from(value: Role) -> Self {
        Self {
            role_id: value.role_id.to_string(),
            name: value.name.to_string(),
        }
    }
}

/// API representation of a permission row.
#[derive(Debug, Serialize, TS)]
#[ts(
    export,
    export_to = "../../../../packages/api-types/src/generated/permission-response.ts"
)]
pub struct PermissionResponse {
    pub permission_id: String,
    pub role_id: String,
    pub resource_type: String,
    pub action: String,
    pub value: bool,
}

impl From<Permission> for PermissionResponse {
    fn from(value: Permission) -> Self {
        Self {
            permission_id: value.permission_id().to_string(),
            role_id: value.role_id().to_string(),
            resource_type: value.resource_type().as_str().to_owned(),
            action: value.action().as_str().to_owned(),
            value: value.value(),
        }
    }
}

/// Role together with its permission rows.
#[derive(Debug, Serialize, TS)]
#[ts(
    export,
    export_to = "../../../../packages/api-types/src/generated/role-definition-response.ts"
)]
pub struct RoleDefinitionResponse {
    pub role: RoleResponse,
    pub permissions: Vec<PermissionResponse>,
}

impl From<RoleDefinition> for RoleDefinitionResponse {
    fn from(value: RoleDefinition) -> Self {
        Self {
            role: RoleResponse::from(value.role),
            permissions: value
                .permissions
                .into_iter()
                .map(PermissionResponse::from)
                .collect(),
        }
    }
}

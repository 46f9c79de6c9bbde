use async_trait::async_trait;
use uuid::Uuid;
use workhive_core::{AppResult, NonEmptyString, WorkspaceId};
use workhive_domain::{Permission, Role};

/// Role together with its permission rows.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RoleDefinition {
    /// Role record.
    pub role: Role,
    /// Permission rows attached to the role.
    pub permissions: Vec<Permission>,
}

/// Repository port for workspace roles.
#[async_trait]
pub trait RoleRepository: Send + Sync {
    /// Lists every role of a workspace.
    async fn list_roles(&self, workspace_id: WorkspaceId) -> AppResult<Vec<Role>>;

    /// Returns one role with its permissions.
    async fn find_role(
        &self,
        workspace_id: WorkspaceId,
        role_id: Uuid,
    ) -> AppResult<Option<RoleDefinition>>;

    /// Creates a role and its permission rows atomically.
    ///
    /// Role names are unique per workspace.
    async fn create_role(&self, role: Role, permissions: Vec<Permission>)
    -> AppResult<RoleDefinition>;

    /// Renames a role.
    async fn rename_role(
        &self,
        workspace_id: WorkspaceId,
        role_id: Uuid,
        name: NonEmptyString,
    ) -> AppResult<Role>;

    /// Deletes a role no member references and that is not the workspace default.
    async fn delete_role(&self, workspace_id: WorkspaceId, role_id: Uuid) -> AppResult<()>;
}

/// Repository port for role permission rows.
#[async_trait]
pub trait PermissionRepository: Send + Sync {
    /// Lists the permission rows of a role in the workspace.
    async fn list_permissions(
        &self,
        workspace_id: WorkspaceId,
        role_id: Uuid,
    ) -> AppResult<Vec<Permission>>;

    /// Adds one permission row; at most one row per role, resource type and action.
    async fn create_permission(
        &self,
        workspace_id: WorkspaceId,
        permission: Permission,
    ) -> AppResult<Permission>;

    /// Sets the value of an existing permission row.
    async fn update_permission(
        &self,
        workspace_id: WorkspaceId,
        permission_id: Uuid,
        value: bool,
    ) -> AppResult<Permission>;
}

use super::*;

use workhive_application::{PermissionRepository, RoleDefinition, RoleRepository};
use workhive_core::NonEmptyString;

#[async_trait]
impl RoleRepository for InMemoryStore {
    async fn list_roles(&self, workspace_id: WorkspaceId) -> AppResult<Vec<Role>> {
        let state = self.state.read().await;
        let mut roles: Vec<Role> = state
            .roles
            .values()
            .filter(|role| role.workspace_id == workspace_id)
            .cloned()
            .collect();
        roles.sort_by(|left, right| left.name.as_str().cmp(right.name.as_str()));

        Ok(roles)
    }

    async fn find_role(
        &self,
        workspace_id: WorkspaceId,
        role_id: Uuid,
    ) -> AppResult<Option<RoleDefinition>> {
        let state = self.state.read().await;
        Ok(state
            .role(workspace_id, role_id)
            .ok()
            .map(|role| RoleDefinition {
                role: role.clone(),
                permissions: state.role_permissions(role_id),
            }))
    }

    async fn create_role(
        &self,
        role: Role,
        permissions: Vec<Permission>,
    ) -> AppResult<RoleDefinition> {
        let mut state = self.state.write().await;
        if state
            .roles
            .values()
            .any(|stored| stored.workspace_id == role.workspace_id && stored.name == role.name)
        {
            return Err(AppError::Conflict(format!(
                "role '{}' already exists",
                role.name
            )));
        }

        state.roles.insert(role.role_id, role.clone());
        state.permissions.extend(
            permissions
                .iter()
                .map(|permission| (permission.permission_id(), permission.clone())),
        );

        Ok(RoleDefinition { role, permissions })
    }

    async fn rename_role(
        &self,
        workspace_id: WorkspaceId,
        role_id: Uuid,
        name: NonEmptyString,
    ) -> AppResult<Role> {
        let mut state = self.state.write().await;
        state.role(workspace_id, role_id)?;
        if state.roles.values().any(|stored| {
            stored.workspace_id == workspace_id && stored.role_id != role_id && stored.name == name
        }) {
            return Err(AppError::Conflict(format!("role '{name}' already exists")));
        }

        let role = state
            .roles
            .get_mut(&role_id)
            .ok_or_else(|| AppError::NotFound(format!("role '{role_id}' does not exist")))?;
        role.name = name;

        Ok(role.clone())
    }

    async fn delete_role(&self, workspace_id: WorkspaceId, role_id: Uuid) -> AppResult<()> {
        let mut state = self.state.write().await;
        state.role(workspace_id, role_id)?;

        let is_default = state
            .workspaces
            .get(&workspace_id)
            .is_some_and(|workspace| workspace.default_role_id() == Some(role_id));
        if is_default {
            return Err(AppError::Conflict(
                "the workspace default role cannot be deleted".to_owned(),
            ));
        }
        if state.members.iter().any(|member| member.role_id == role_id) {
            return Err(AppError::Conflict(format!(
                "role '{role_id}' is still assigned to members"
            )));
        }

        state.roles.remove(&role_id);
        state
            .permissions
            .retain(|_, permission| permission.role_id() != role_id);
        Ok(())
    }
}

#[async_trait]
impl PermissionRepository for InMemoryStore {
    async fn list_permissions(
        &self,
        workspace_id: WorkspaceId,
        role_id: Uuid,
    ) -> AppResult<Vec<Permission>> {
        let state = self.state.read().await;
        state.role(workspace_id, role_id)?;

        Ok(state.role_permissions(role_id))
    }

    async fn create_permission(
        &self,
        workspace_id: WorkspaceId,
        permission: Permission,
    ) -> AppResult<Permission> {
        let mut state = self.state.write().await;
        state.role(workspace_id, permission.role_id())?;
        if state.permissions.values().any(|stored| {
            stored.role_id() == permission.role_id()
                && stored.resource_type() == permission.resource_type()
                && stored.action() == permission.action()
        }) {
            return Err(AppError::Conflict(format!(
                "permission '{}' on '{}' already exists for role",
                permission.action(),
                permission.resource_type()
            )));
        }

        state
            .permissions
            .insert(permission.permission_id(), permission.clone());
        Ok(permission)
    }

    async fn update_permission(
        &self,
        workspace_id: WorkspaceId,
        permission_id: Uuid,
        value: bool,
    ) -> AppResult<Permission> {
        let mut guard = self.state.write().await;
        let state = &mut *guard;
        let role_ids: Vec<Uuid> = state
            .roles
            .values()
            .filter(|role| role.workspace_id == workspace_id)
            .map(|role| role.role_id)
            .collect();

        let permission = state
            .permissions
            .get_mut(&permission_id)
            .filter(|permission| role_ids.contains(&permission.role_id()))
            .ok_or_else(|| {
                AppError::NotFound(format!("permission '{permission_id}' does not exist"))
            })?;
        *permission = permission.clone().with_value(value);

        Ok(permission.clone())
    }
}

use std::sync::Arc;

use uuid::Uuid;
use workhive_core::{ActorContext, AppError, AppResult, NonEmptyString};
use workhive_domain::{ActivityType, Operation, Permission, Role, default_permission_grants};

use crate::{ActivityEvent, ActivityRecorder, AuthorizationService, RoleDefinition, RoleRepository};

#[cfg(test)]
mod tests;

/// Builds the default permission rows for a freshly created role.
#[must_use]
pub fn seed_default_permissions(role_id: Uuid) -> Vec<Permission> {
    default_permission_grants()
        .into_iter()
        .map(|grant| Permission::new(Uuid::new_v4(), role_id, grant))
        .collect()
}

/// Application service for role lifecycle.
#[derive(Clone)]
pub struct RoleService {
    authorization_service: AuthorizationService,
    repository: Arc<dyn RoleRepository>,
    activity_recorder: ActivityRecorder,
}

impl RoleService {
    /// Creates a role service.
    #[must_use]
    pub fn new(
        authorization_service: AuthorizationService,
        repository: Arc<dyn RoleRepository>,
        activity_recorder: ActivityRecorder,
    ) -> Self {
        Self {
            authorization_service,
            repository,
            activity_recorder,
        }
    }

    /// Lists roles of the caller's workspace.
    pub async fn list_roles(&self, actor: &ActorContext) -> AppResult<Vec<Role>> {
        let workspace_id = self
            .authorization_service
            .require_workspace(actor, Operation::ListRoles)
            .await?;

        self.repository.list_roles(workspace_id).await
    }

    /// Returns one role with its permissions.
    pub async fn get_role(&self, actor: &ActorContext, role_id: Uuid) -> AppResult<RoleDefinition> {
        let workspace_id = self
            .authorization_service
            .require_workspace(actor, Operation::ReadPermissions)
            .await?;

        self.repository
            .find_role(workspace_id, role_id)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("role '{role_id}' does not exist")))
    }

    /// Creates a role seeded with the default permission set in one store call.
    pub async fn create_role(&self, actor: &ActorContext, name: &str) -> AppResult<RoleDefinition> {
        let workspace_id = self
            .authorization_service
            .require_workspace(actor, Operation::CreateRole)
            .await?;

        let role = Role {
            role_id: Uuid::new_v4(),
            workspace_id,
            name: NonEmptyString::new(name)?,
        };
        let permissions = seed_default_permissions(role.role_id);
        let definition = self.repository.create_role(role, permissions).await?;

        self.activity_recorder
            .record(ActivityEvent::new(
                workspace_id,
                actor.user_id(),
                ActivityType::RoleCreated,
                format!("created the role {}", definition.role.name),
            ))
            .await;

        Ok(definition)
    }

    /// Renames a role.
    pub async fn update_role(
        &self,
        actor: &ActorContext,
        role_id: Uuid,
        name: &str,
    ) -> AppResult<Role> {
        let workspace_id = self
            .authorization_service
            .require_workspace(actor, Operation::UpdateRole)
            .await?;

        let role = self
            .repository
            .rename_role(workspace_id, role_id, NonEmptyString::new(name)?)
            .await?;

        self.activity_recorder
            .record(ActivityEvent::new(
                workspace_id,
                actor.user_id(),
                ActivityType::RoleUpdated,
                format!("renamed the role to {}", role.name),
            ))
            .await;

        Ok(role)
    }

    /// Deletes a role that no member references.
    pub async fn delete_role(&self, actor: &ActorContext, role_id: Uuid) -> AppResult<()> {
        let workspace_id = self
            .authorization_service
            .require_workspace(actor, Operation::DeleteRole)
            .await?;

        self.repository.delete_role(workspace_id, role_id).await?;

        self.activity_recorder
            .record(ActivityEvent::new(
                workspace_id,
                actor.user_id(),
                ActivityType::RoleDeleted,
                "deleted a role",
            ))
            .await;

        Ok(())
    }
}

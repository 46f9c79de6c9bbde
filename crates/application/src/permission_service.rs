use std::sync::Arc;

use uuid::Uuid;
use workhive_core::{ActorContext, AppResult};
use workhive_domain::{
    ActivityType, Operation, Permission, PermissionAction, PermissionGrant, ResourceType,
};

use crate::{ActivityEvent, ActivityRecorder, AuthorizationService, PermissionRepository};

/// Application service over role permission rows.
#[derive(Clone)]
pub struct PermissionService {
    authorization_service: AuthorizationService,
    repository: Arc<dyn PermissionRepository>,
    activity_recorder: ActivityRecorder,
}

impl PermissionService {
    /// Creates a permission service.
    #[must_use]
    pub fn new(
        authorization_service: AuthorizationService,
        repository: Arc<dyn PermissionRepository>,
        activity_recorder: ActivityRecorder,
    ) -> Self {
        Self {
            authorization_service,
            repository,
            activity_recorder,
        }
    }

    /// Returns the permission rows of a role.
    pub async fn get_permissions(
        &self,
        actor: &ActorContext,
        role_id: Uuid,
    ) -> AppResult<Vec<Permission>> {
        let workspace_id = self
            .authorization_service
            .require_workspace(actor, Operation::ReadPermissions)
            .await?;

        self.repository.list_permissions(workspace_id, role_id).await
    }

    /// Adds a permission row after checking the action against the resource vocabulary.
    pub async fn create_permission(
        &self,
        actor: &ActorContext,
        role_id: Uuid,
        resource_type: ResourceType,
        action: PermissionAction,
        value: bool,
    ) -> AppResult<Permission> {
        let workspace_id = self
            .authorization_service
            .require_workspace(actor, Operation::CreatePermission)
            .await?;

        let grant = PermissionGrant::new(resource_type, action, value)?;
        let permission = self
            .repository
            .create_permission(workspace_id, Permission::new(Uuid::new_v4(), role_id, grant))
            .await?;

        self.activity_recorder
            .record(ActivityEvent::new(
                workspace_id,
                actor.user_id(),
                ActivityType::PermissionUpdated,
                format!("added permission '{action}' on '{resource_type}'"),
            ))
            .await;

        Ok(permission)
    }

    /// Sets the value of one permission row.
    pub async fn update_permission(
        &self,
        actor: &ActorContext,
        permission_id: Uuid,
        value: bool,
    ) -> AppResult<Permission> {
        let workspace_id = self
            .authorization_service
            .require_workspace(actor, Operation::UpdatePermission)
            .await?;

        let permission = self
            .repository
            .update_permission(workspace_id, permission_id, value)
            .await?;

        self.activity_recorder
            .record(ActivityEvent::new(
                workspace_id,
                actor.user_id(),
                ActivityType::PermissionUpdated,
                format!(
                    "set permission '{}' on '{}' to {}",
                    permission.action(),
                    permission.resource_type(),
                    permission.value()
                ),
            ))
            .await;

        Ok(permission)
    }
}

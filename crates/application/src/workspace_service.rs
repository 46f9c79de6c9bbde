use std::sync::Arc;

use chrono::Utc;
use uuid::Uuid;
use workhive_core::{ActorContext, AppError, AppResult, NonEmptyString, UserIdentity, WorkspaceId};
use workhive_domain::{
    ActivityType, DEFAULT_ROLE_NAME, MembershipStatus, Operation, Role, SubscriptionTier,
    UserAccount, Workspace, WorkspaceMember,
};

use crate::role_service::seed_default_permissions;
use crate::{
    ActivityEvent, ActivityRecorder, AuthorizationService, StreamRepository,
    WorkspaceProvisioning, WorkspaceRepository,
};

mod members;
mod streams;
mod teams;

/// Application service for workspaces, memberships, streams and teams.
#[derive(Clone)]
pub struct WorkspaceService {
    authorization_service: AuthorizationService,
    repository: Arc<dyn WorkspaceRepository>,
    stream_repository: Arc<dyn StreamRepository>,
    activity_recorder: ActivityRecorder,
}

impl WorkspaceService {
    /// Creates a workspace service.
    #[must_use]
    pub fn new(
        authorization_service: AuthorizationService,
        repository: Arc<dyn WorkspaceRepository>,
        stream_repository: Arc<dyn StreamRepository>,
        activity_recorder: ActivityRecorder,
    ) -> Self {
        Self {
            authorization_service,
            repository,
            stream_repository,
            activity_recorder,
        }
    }

    /// Upserts the user record behind an authenticated identity.
    pub async fn register_user(&self, identity: &UserIdentity) -> AppResult<UserAccount> {
        self.repository
            .save_user(UserAccount {
                user_id: identity.user_id(),
                display_name: NonEmptyString::new(identity.display_name())?,
                email: identity.email().map(ToOwned::to_owned),
                default_workspace_id: None,
            })
            .await
    }

    /// Creates a workspace owned by the caller.
    ///
    /// The workspace, its "Admin" role with default permissions and the
    /// owner's ACTIVE membership are written in one store call.
    pub async fn create_workspace(&self, actor: &ActorContext, name: &str) -> AppResult<Workspace> {
        self.authorization_service
            .authorize(actor, Operation::CreateWorkspace)
            .await?;

        let owner_id = actor.user_id();
        if self.repository.find_user(owner_id).await?.is_none() {
            return Err(AppError::NotFound(format!("user '{owner_id}' does not exist")));
        }

        let now = Utc::now();
        let workspace_id = WorkspaceId::new();
        let role = Role {
            role_id: Uuid::new_v4(),
            workspace_id,
            name: NonEmptyString::new(DEFAULT_ROLE_NAME)?,
        };
        let workspace = Workspace::new(
            workspace_id,
            name,
            owner_id,
            Uuid::new_v4(),
            SubscriptionTier::default(),
            now,
        )?
        .with_default_role(role.role_id);

        let provisioning = WorkspaceProvisioning {
            permissions: seed_default_permissions(role.role_id),
            owner_membership: WorkspaceMember {
                member_id: Uuid::new_v4(),
                workspace_id,
                user_id: owner_id,
                role_id: role.role_id,
                status: MembershipStatus::Active,
                joined_at: now,
            },
            workspace,
            role,
        };
        let workspace = self.repository.create_workspace(provisioning).await?;

        self.activity_recorder
            .record(ActivityEvent::new(
                workspace_id,
                owner_id,
                ActivityType::WorkspaceCreated,
                format!("created the workspace {}", workspace.name()),
            ))
            .await;

        Ok(workspace)
    }

    /// Lists workspaces the caller is an active member of.
    pub async fn my_workspaces(&self, actor: &ActorContext) -> AppResult<Vec<Workspace>> {
        self.repository
            .list_workspaces_for_user(actor.user_id())
            .await
    }

    /// Renames the caller's workspace.
    pub async fn update_workspace(&self, actor: &ActorContext, name: &str) -> AppResult<Workspace> {
        let workspace_id = self
            .authorization_service
            .require_workspace(actor, Operation::UpdateWorkspace)
            .await?;

        let mut workspace = self.load_workspace(workspace_id).await?;
        workspace.rename(name)?;
        let workspace = self.repository.save_workspace(workspace).await?;

        self.activity_recorder
            .record(ActivityEvent::new(
                workspace_id,
                actor.user_id(),
                ActivityType::WorkspaceUpdated,
                format!("renamed the workspace to {}", workspace.name()),
            ))
            .await;

        Ok(workspace)
    }

    /// Deletes the caller's workspace.
    pub async fn delete_workspace(&self, actor: &ActorContext) -> AppResult<()> {
        let workspace_id = self
            .authorization_service
            .require_workspace(actor, Operation::DeleteWorkspace)
            .await?;

        self.repository.delete_workspace(workspace_id).await?;
        tracing::info!(%workspace_id, user_id = %actor.user_id(), "deleted workspace");
        Ok(())
    }

    async fn load_workspace(&self, workspace_id: WorkspaceId) -> AppResult<Workspace> {
        self.repository
            .find_workspace(workspace_id)
            .await?
            .ok_or_else(|| {
                AppError::NotFound(format!("workspace '{workspace_id}' does not exist"))
            })
    }
}

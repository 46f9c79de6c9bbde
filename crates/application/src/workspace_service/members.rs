use super::*;

use workhive_core::UserId;

use crate::MemberListing;

impl WorkspaceService {
    /// Invites a user into the caller's workspace with the default role.
    pub async fn invite_member(
        &self,
        actor: &ActorContext,
        user_id: UserId,
    ) -> AppResult<WorkspaceMember> {
        let workspace_id = self
            .authorization_service
            .require_workspace(actor, Operation::InviteMember)
            .await?;

        let user = self
            .repository
            .find_user(user_id)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("user '{user_id}' does not exist")))?;
        let workspace = self.load_workspace(workspace_id).await?;
        let role_id = workspace.default_role_id().ok_or_else(|| {
            AppError::Conflict(format!("workspace '{workspace_id}' has no default role"))
        })?;

        let member = self
            .repository
            .invite_member(WorkspaceMember {
                member_id: Uuid::new_v4(),
                workspace_id,
                user_id,
                role_id,
                status: MembershipStatus::Pending,
                joined_at: Utc::now(),
            })
            .await?;

        self.activity_recorder
            .record(ActivityEvent::new(
                workspace_id,
                actor.user_id(),
                ActivityType::MemberInvited,
                format!("invited \"{}\" to the workspace", user.display_name),
            ))
            .await;

        Ok(member)
    }

    /// Accepts the caller's pending invitation.
    pub async fn accept_invite(
        &self,
        actor: &ActorContext,
        workspace_id: WorkspaceId,
    ) -> AppResult<WorkspaceMember> {
        self.authorization_service
            .authorize(actor, Operation::AcceptInvite)
            .await?;

        let member = self
            .repository
            .activate_member(workspace_id, actor.user_id())
            .await?;

        self.activity_recorder
            .record(ActivityEvent::new(
                workspace_id,
                actor.user_id(),
                ActivityType::MemberJoined,
                "joined the workspace",
            ))
            .await;

        Ok(member)
    }

    /// Deactivates a member; the owner cannot be removed.
    pub async fn remove_member(
        &self,
        actor: &ActorContext,
        user_id: UserId,
    ) -> AppResult<WorkspaceMember> {
        let workspace_id = self
            .authorization_service
            .require_workspace(actor, Operation::RemoveMember)
            .await?;

        let workspace = self.load_workspace(workspace_id).await?;
        if workspace.owner_id() == user_id {
            return Err(AppError::Conflict(
                "the workspace owner cannot be removed".to_owned(),
            ));
        }

        let member = self
            .repository
            .update_member_status(workspace_id, user_id, MembershipStatus::Inactive)
            .await?;

        self.activity_recorder
            .record(ActivityEvent::new(
                workspace_id,
                actor.user_id(),
                ActivityType::MemberRemoved,
                "removed a member from the workspace",
            ))
            .await;

        Ok(member)
    }

    /// Assigns another workspace role to a member; the owner keeps theirs.
    pub async fn change_member_role(
        &self,
        actor: &ActorContext,
        user_id: UserId,
        role_id: Uuid,
    ) -> AppResult<WorkspaceMember> {
        let workspace_id = self
            .authorization_service
            .require_workspace(actor, Operation::ChangeMemberRole)
            .await?;

        let workspace = self.load_workspace(workspace_id).await?;
        if workspace.owner_id() == user_id {
            return Err(AppError::Conflict(
                "the workspace owner's role cannot be changed".to_owned(),
            ));
        }

        let member = self
            .repository
            .update_member_role(workspace_id, user_id, role_id)
            .await?;

        self.activity_recorder
            .record(ActivityEvent::new(
                workspace_id,
                actor.user_id(),
                ActivityType::MemberRoleChanged,
                "changed a member's role",
            ))
            .await;

        Ok(member)
    }

    /// Lists members of the caller's workspace.
    pub async fn list_members(&self, actor: &ActorContext) -> AppResult<Vec<MemberListing>> {
        let workspace_id = self
            .authorization_service
            .require_workspace(actor, Operation::ListMembers)
            .await?;

        self.repository.list_members(workspace_id).await
    }
}

use super::*;

use workhive_core::UserId;
use workhive_domain::{Team, TeamMember};

use crate::TeamDetails;

impl WorkspaceService {
    /// Returns a team with its members.
    pub async fn get_team(&self, actor: &ActorContext, team_id: Uuid) -> AppResult<TeamDetails> {
        let workspace_id = self
            .authorization_service
            .require_workspace(actor, Operation::ReadTeam)
            .await?;

        let team = self.load_team(workspace_id, team_id).await?;
        let members = self
            .stream_repository
            .list_team_members(workspace_id, team_id)
            .await?;

        Ok(TeamDetails { team, members })
    }

    /// Deletes a team.
    pub async fn delete_team(&self, actor: &ActorContext, team_id: Uuid) -> AppResult<()> {
        let workspace_id = self
            .authorization_service
            .require_workspace(actor, Operation::DeleteTeam)
            .await?;

        let team = self.load_team(workspace_id, team_id).await?;
        self.stream_repository
            .delete_team(workspace_id, team_id)
            .await?;

        self.activity_recorder
            .record(
                ActivityEvent::new(
                    workspace_id,
                    actor.user_id(),
                    ActivityType::TeamDeleted,
                    format!("deleted the team {}", team.name),
                )
                .with_stream(team.stream_id),
            )
            .await;

        Ok(())
    }

    /// Adds a member of the team's stream to the team.
    pub async fn add_team_member(
        &self,
        actor: &ActorContext,
        team_id: Uuid,
        user_id: UserId,
    ) -> AppResult<TeamMember> {
        let workspace_id = self
            .authorization_service
            .require_workspace(actor, Operation::AddTeamMember)
            .await?;

        let team = self.load_team(workspace_id, team_id).await?;
        let user = self
            .repository
            .find_user(user_id)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("user '{user_id}' does not exist")))?;
        let member = self
            .stream_repository
            .add_team_member(
                workspace_id,
                TeamMember {
                    team_id,
                    user_id,
                    joined_at: Utc::now(),
                },
            )
            .await?;

        self.activity_recorder
            .record(
                ActivityEvent::new(
                    workspace_id,
                    actor.user_id(),
                    ActivityType::TeamMemberAdded,
                    format!("added \"{}\" to the team {}", user.display_name, team.name),
                )
                .with_stream(team.stream_id),
            )
            .await;

        Ok(member)
    }

    /// Removes a user from a team.
    pub async fn remove_team_member(
        &self,
        actor: &ActorContext,
        team_id: Uuid,
        user_id: UserId,
    ) -> AppResult<()> {
        let workspace_id = self
            .authorization_service
            .require_workspace(actor, Operation::RemoveTeamMember)
            .await?;

        let team = self.load_team(workspace_id, team_id).await?;
        self.stream_repository
            .remove_team_member(workspace_id, team_id, user_id)
            .await?;

        self.activity_recorder
            .record(
                ActivityEvent::new(
                    workspace_id,
                    actor.user_id(),
                    ActivityType::TeamMemberRemoved,
                    format!("removed a member from the team {}", team.name),
                )
                .with_stream(team.stream_id),
            )
            .await;

        Ok(())
    }

    async fn load_team(&self, workspace_id: WorkspaceId, team_id: Uuid) -> AppResult<Team> {
        self.stream_repository
            .find_team(workspace_id, team_id)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("team '{team_id}' does not exist")))
    }
}

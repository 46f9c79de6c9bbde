use std::collections::HashSet;

use super::*;

use workhive_core::UserId;
use workhive_domain::{Stream, StreamMember, Team};

use crate::StreamDetails;

impl WorkspaceService {
    /// Creates a stream in the caller's workspace.
    pub async fn create_stream(&self, actor: &ActorContext, name: &str) -> AppResult<Stream> {
        let workspace_id = self
            .authorization_service
            .require_workspace(actor, Operation::CreateStream)
            .await?;

        let stream = self
            .stream_repository
            .create_stream(Stream {
                stream_id: Uuid::new_v4(),
                workspace_id,
                name: NonEmptyString::new(name)?,
                created_by: actor.user_id(),
                created_at: Utc::now(),
            })
            .await?;

        self.activity_recorder
            .record(
                ActivityEvent::new(
                    workspace_id,
                    actor.user_id(),
                    ActivityType::StreamCreated,
                    format!("created the stream {}", stream.name),
                )
                .with_stream(stream.stream_id),
            )
            .await;

        Ok(stream)
    }

    /// Lists streams of the caller's workspace.
    pub async fn list_streams(&self, actor: &ActorContext) -> AppResult<Vec<Stream>> {
        let workspace_id = self
            .authorization_service
            .require_workspace(actor, Operation::ListStreams)
            .await?;

        self.stream_repository.list_streams(workspace_id).await
    }

    /// Deletes a stream that owns no projects.
    pub async fn delete_stream(&self, actor: &ActorContext, stream_id: Uuid) -> AppResult<()> {
        let workspace_id = self
            .authorization_service
            .require_workspace(actor, Operation::DeleteStream)
            .await?;

        self.stream_repository
            .delete_stream(workspace_id, stream_id)
            .await?;

        self.activity_recorder
            .record(ActivityEvent::new(
                workspace_id,
                actor.user_id(),
                ActivityType::StreamDeleted,
                "deleted a stream",
            ))
            .await;

        Ok(())
    }

    /// Creates a team inside a stream.
    pub async fn create_team(
        &self,
        actor: &ActorContext,
        stream_id: Uuid,
        name: &str,
    ) -> AppResult<Team> {
        let workspace_id = self
            .authorization_service
            .require_workspace(actor, Operation::CreateTeam)
            .await?;

        self.load_stream(workspace_id, stream_id).await?;

        let team = self
            .stream_repository
            .create_team(Team {
                team_id: Uuid::new_v4(),
                workspace_id,
                stream_id,
                name: NonEmptyString::new(name)?,
                created_at: Utc::now(),
            })
            .await?;

        self.activity_recorder
            .record(
                ActivityEvent::new(
                    workspace_id,
                    actor.user_id(),
                    ActivityType::TeamCreated,
                    format!("created the team {}", team.name),
                )
                .with_stream(stream_id),
            )
            .await;

        Ok(team)
    }

    /// Lists teams, optionally only those of one stream.
    pub async fn list_teams(
        &self,
        actor: &ActorContext,
        stream_id: Option<Uuid>,
    ) -> AppResult<Vec<Team>> {
        let workspace_id = self
            .authorization_service
            .require_workspace(actor, Operation::ListTeams)
            .await?;

        self.stream_repository
            .list_teams(workspace_id, stream_id)
            .await
    }

    /// Returns a stream with its members and teams.
    pub async fn get_stream(&self, actor: &ActorContext, stream_id: Uuid) -> AppResult<StreamDetails> {
        let workspace_id = self
            .authorization_service
            .require_workspace(actor, Operation::ReadStream)
            .await?;

        let stream = self.load_stream(workspace_id, stream_id).await?;
        let members = self
            .stream_repository
            .list_stream_members(workspace_id, stream_id)
            .await?;
        let teams = self
            .stream_repository
            .list_teams(workspace_id, Some(stream_id))
            .await?;

        Ok(StreamDetails {
            stream,
            members,
            teams,
        })
    }

    /// Lists members of a stream.
    pub async fn list_stream_members(
        &self,
        actor: &ActorContext,
        stream_id: Uuid,
    ) -> AppResult<Vec<StreamMember>> {
        let workspace_id = self
            .authorization_service
            .require_workspace(actor, Operation::ListStreamMembers)
            .await?;

        self.load_stream(workspace_id, stream_id).await?;
        self.stream_repository
            .list_stream_members(workspace_id, stream_id)
            .await
    }

    /// Adds ACTIVE workspace members to a stream.
    pub async fn add_stream_members(
        &self,
        actor: &ActorContext,
        stream_id: Uuid,
        user_ids: Vec<UserId>,
    ) -> AppResult<Vec<StreamMember>> {
        let workspace_id = self
            .authorization_service
            .require_workspace(actor, Operation::AddStreamMembers)
            .await?;

        let mut seen = HashSet::new();
        let user_ids: Vec<UserId> = user_ids
            .into_iter()
            .filter(|user_id| seen.insert(*user_id))
            .collect();
        if user_ids.is_empty() {
            return Err(AppError::Validation(
                "at least one user is required".to_owned(),
            ));
        }

        let stream = self.load_stream(workspace_id, stream_id).await?;
        for user_id in &user_ids {
            let member = self.repository.find_member(workspace_id, *user_id).await?;
            if !member.is_some_and(|member| member.status.is_active()) {
                return Err(AppError::Validation(format!(
                    "user '{user_id}' is not an active member of the workspace"
                )));
            }
        }

        let now = Utc::now();
        let members = self
            .stream_repository
            .add_stream_members(
                workspace_id,
                user_ids
                    .into_iter()
                    .map(|user_id| StreamMember {
                        stream_id,
                        user_id,
                        joined_at: now,
                    })
                    .collect(),
            )
            .await?;

        self.activity_recorder
            .record(
                ActivityEvent::new(
                    workspace_id,
                    actor.user_id(),
                    ActivityType::StreamMembersAdded,
                    format!("added {} member(s) to the stream {}", members.len(), stream.name),
                )
                .with_stream(stream_id),
            )
            .await;

        Ok(members)
    }

    /// Removes a user from a stream and its teams.
    pub async fn remove_stream_member(
        &self,
        actor: &ActorContext,
        stream_id: Uuid,
        user_id: UserId,
    ) -> AppResult<()> {
        let workspace_id = self
            .authorization_service
            .require_workspace(actor, Operation::RemoveStreamMember)
            .await?;

        let stream = self.load_stream(workspace_id, stream_id).await?;
        self.stream_repository
            .remove_stream_member(workspace_id, stream_id, user_id)
            .await?;

        self.activity_recorder
            .record(
                ActivityEvent::new(
                    workspace_id,
                    actor.user_id(),
                    ActivityType::StreamMemberRemoved,
                    format!("removed a member from the stream {}", stream.name),
                )
                .with_stream(stream_id),
            )
            .await;

        Ok(())
    }

    async fn load_stream(&self, workspace_id: WorkspaceId, stream_id: Uuid) -> AppResult<Stream> {
        self.stream_repository
            .find_stream(workspace_id, stream_id)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("stream '{stream_id}' does not exist")))
    }
}

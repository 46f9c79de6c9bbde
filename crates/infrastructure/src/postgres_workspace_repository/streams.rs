use workhive_application::StreamRepository;
use workhive_domain::{Stream, StreamMember, Team, TeamMember};

use crate::postgres_rows::{
    StreamMemberRow, StreamRow, TeamMemberRow, TeamRow, is_foreign_key_violation,
};

use super::*;

#[async_trait]
impl StreamRepository for PostgresWorkspaceRepository {
    async fn create_stream(&self, stream: Stream) -> AppResult<Stream> {
        let row = sqlx::query_as::<_, StreamRow>(
            r#"
            INSERT INTO streams (id, workspace_id, name, created_by, created_at)
            VALUES ($1, $2, $3, $4, $5)
            RETURNING id, workspace_id, name, created_by, created_at
            "#,
        )
        .bind(stream.stream_id)
        .bind(stream.workspace_id.as_uuid())
        .bind(stream.name.as_str())
        .bind(stream.created_by.as_uuid())
        .bind(stream.created_at)
        .fetch_one(&self.pool)
        .await
        .map_err(|error| {
            if is_unique_violation(&error) {
                return AppError::Conflict(format!("stream '{}' already exists", stream.name));
            }

            AppError::Internal(format!("failed to create stream: {error}"))
        })?;

        Stream::try_from(row)
    }

    async fn list_streams(&self, workspace_id: WorkspaceId) -> AppResult<Vec<Stream>> {
        let rows = sqlx::query_as::<_, StreamRow>(
            r#"
            SELECT id, workspace_id, name, created_by, created_at
            FROM streams
            WHERE workspace_id = $1
            ORDER BY created_at
            "#,
        )
        .bind(workspace_id.as_uuid())
        .fetch_all(&self.pool)
        .await
        .map_err(|error| AppError::Internal(format!("failed to list streams: {error}")))?;

        decode_rows(rows)
    }

    async fn find_stream(
        &self,
        workspace_id: WorkspaceId,
        stream_id: Uuid,
    ) -> AppResult<Option<Stream>> {
        sqlx::query_as::<_, StreamRow>(
            r#"
            SELECT id, workspace_id, name, created_by, created_at
            FROM streams
            WHERE workspace_id = $1
                AND id = $2
            "#,
        )
        .bind(workspace_id.as_uuid())
        .bind(stream_id)
        .fetch_optional(&self.pool)
        .await
        .map_err(|error| AppError::Internal(format!("failed to find stream: {error}")))?
        .map(Stream::try_from)
        .transpose()
    }

    async fn delete_stream(&self, workspace_id: WorkspaceId, stream_id: Uuid) -> AppResult<()> {
        let mut transaction =
            self.pool.begin().await.map_err(|error| {
                AppError::Internal(format!("failed to begin transaction: {error}"))
            })?;

        let owns_projects = sqlx::query_scalar::<_, bool>(
            r#"
            SELECT EXISTS (
                SELECT 1
                FROM projects
                WHERE workspace_id = $1
                    AND stream_id = $2
            )
            "#,
        )
        .bind(workspace_id.as_uuid())
        .bind(stream_id)
        .fetch_one(&mut *transaction)
        .await
        .map_err(|error| AppError::Internal(format!("failed to check stream projects: {error}")))?;
        if owns_projects {
            return Err(AppError::Conflict(format!(
                "stream '{stream_id}' still owns projects"
            )));
        }

        let deleted = sqlx::query(
            r#"
            DELETE FROM streams
            WHERE workspace_id = $1
                AND id = $2
            "#,
        )
        .bind(workspace_id.as_uuid())
        .bind(stream_id)
        .execute(&mut *transaction)
        .await
        .map_err(|error| AppError::Internal(format!("failed to delete stream: {error}")))?;
        if deleted.rows_affected() == 0 {
            return Err(AppError::NotFound(format!(
                "stream '{stream_id}' does not exist"
            )));
        }

        transaction.commit().await.map_err(|error| {
            AppError::Internal(format!("failed to commit transaction: {error}"))
        })?;

        Ok(())
    }

    async fn create_team(&self, team: Team) -> AppResult<Team> {
        let row = sqlx::query_as::<_, TeamRow>(
            r#"
            INSERT INTO teams (id, workspace_id, stream_id, name, created_at)
            SELECT $1, streams.workspace_id, streams.id, $4, $5
            FROM streams
            WHERE streams.workspace_id = $2
                AND streams.id = $3
            RETURNING id, workspace_id, stream_id, name, created_at
            "#,
        )
        .bind(team.team_id)
        .bind(team.workspace_id.as_uuid())
        .bind(team.stream_id)
        .bind(team.name.as_str())
        .bind(team.created_at)
        .fetch_optional(&self.pool)
        .await
        .map_err(|error| AppError::Internal(format!("failed to create team: {error}")))?
        .ok_or_else(|| {
            AppError::NotFound(format!("stream '{}' does not exist", team.stream_id))
        })?;

        Team::try_from(row)
    }

    async fn list_teams(
        &self,
        workspace_id: WorkspaceId,
        stream_id: Option<Uuid>,
    ) -> AppResult<Vec<Team>> {
        let rows = sqlx::query_as::<_, TeamRow>(
            r#"
            SELECT id, workspace_id, stream_id, name, created_at
            FROM teams
            WHERE workspace_id = $1
                AND ($2::uuid IS NULL OR stream_id = $2)
            ORDER BY created_at
            "#,
        )
        .bind(workspace_id.as_uuid())
        .bind(stream_id)
        .fetch_all(&self.pool)
        .await
        .map_err(|error| AppError::Internal(format!("failed to list teams: {error}")))?;

        decode_rows(rows)
    }

    async fn find_team(&self, workspace_id: WorkspaceId, team_id: Uuid) -> AppResult<Option<Team>> {
        sqlx::query_as::<_, TeamRow>(
            r#"
            SELECT id, workspace_id, stream_id, name, created_at
            FROM teams
            WHERE workspace_id = $1
                AND id = $2
            "#,
        )
        .bind(workspace_id.as_uuid())
        .bind(team_id)
        .fetch_optional(&self.pool)
        .await
        .map_err(|error| AppError::Internal(format!("failed to find team: {error}")))?
        .map(Team::try_from)
        .transpose()
    }

    async fn delete_team(&self, workspace_id: WorkspaceId, team_id: Uuid) -> AppResult<()> {
        // Projects drop the assignment and team rosters go with the team via foreign keys.
        let deleted = sqlx::query(
            r#"
            DELETE FROM teams
            WHERE workspace_id = $1
                AND id = $2
            "#,
        )
        .bind(workspace_id.as_uuid())
        .bind(team_id)
        .execute(&self.pool)
        .await
        .map_err(|error| AppError::Internal(format!("failed to delete team: {error}")))?;
        if deleted.rows_affected() == 0 {
            return Err(AppError::NotFound(format!("team '{team_id}' does not exist")));
        }

        Ok(())
    }

    async fn add_stream_members(
        &self,
        workspace_id: WorkspaceId,
        members: Vec<StreamMember>,
    ) -> AppResult<Vec<StreamMember>> {
        let mut transaction =
            self.pool.begin().await.map_err(|error| {
                AppError::Internal(format!("failed to begin transaction: {error}"))
            })?;

        let mut stored = Vec::with_capacity(members.len());
        for member in &members {
            let row = sqlx::query_as::<_, StreamMemberRow>(
                r#"
                INSERT INTO stream_members (stream_id, user_id, joined_at)
                SELECT streams.id, $3, $4
                FROM streams
                WHERE streams.workspace_id = $1
                    AND streams.id = $2
                RETURNING stream_id, user_id, joined_at
                "#,
            )
            .bind(workspace_id.as_uuid())
            .bind(member.stream_id)
            .bind(member.user_id.as_uuid())
            .bind(member.joined_at)
            .fetch_optional(&mut *transaction)
            .await
            .map_err(|error| {
                if is_unique_violation(&error) {
                    return AppError::Conflict(format!(
                        "user '{}' already belongs to the stream",
                        member.user_id
                    ));
                }

                AppError::Internal(format!("failed to add stream member: {error}"))
            })?
            .ok_or_else(|| {
                AppError::NotFound(format!("stream '{}' does not exist", member.stream_id))
            })?;
            stored.push(StreamMember::from(row));
        }

        transaction.commit().await.map_err(|error| {
            AppError::Internal(format!("failed to commit transaction: {error}"))
        })?;

        Ok(stored)
    }

    async fn list_stream_members(
        &self,
        workspace_id: WorkspaceId,
        stream_id: Uuid,
    ) -> AppResult<Vec<StreamMember>> {
        if self.find_stream(workspace_id, stream_id).await?.is_none() {
            return Err(AppError::NotFound(format!(
                "stream '{stream_id}' does not exist"
            )));
        }

        let rows = sqlx::query_as::<_, StreamMemberRow>(
            r#"
            SELECT stream_id, user_id, joined_at
            FROM stream_members
            WHERE stream_id = $1
            ORDER BY joined_at
            "#,
        )
        .bind(stream_id)
        .fetch_all(&self.pool)
        .await
        .map_err(|error| AppError::Internal(format!("failed to list stream members: {error}")))?;

        Ok(rows.into_iter().map(StreamMember::from).collect())
    }

    async fn remove_stream_member(
        &self,
        workspace_id: WorkspaceId,
        stream_id: Uuid,
        user_id: UserId,
    ) -> AppResult<()> {
        // Team rosters of the stream follow through the composite foreign key.
        let deleted = sqlx::query(
            r#"
            DELETE FROM stream_members
            USING streams
            WHERE stream_members.stream_id = streams.id
                AND streams.workspace_id = $1
                AND streams.id = $2
                AND stream_members.user_id = $3
            "#,
        )
        .bind(workspace_id.as_uuid())
        .bind(stream_id)
        .bind(user_id.as_uuid())
        .execute(&self.pool)
        .await
        .map_err(|error| AppError::Internal(format!("failed to remove stream member: {error}")))?;
        if deleted.rows_affected() == 0 {
            return Err(AppError::NotFound(format!(
                "user '{user_id}' is not a member of stream '{stream_id}'"
            )));
        }

        Ok(())
    }

    async fn add_team_member(
        &self,
        workspace_id: WorkspaceId,
        member: TeamMember,
    ) -> AppResult<TeamMember> {
        let row = sqlx::query_as::<_, TeamMemberRow>(
            r#"
            INSERT INTO team_members (team_id, stream_id, user_id, joined_at)
            SELECT teams.id, teams.stream_id, $3, $4
            FROM teams
            WHERE teams.workspace_id = $1
                AND teams.id = $2
            RETURNING team_id, user_id, joined_at
            "#,
        )
        .bind(workspace_id.as_uuid())
        .bind(member.team_id)
        .bind(member.user_id.as_uuid())
        .bind(member.joined_at)
        .fetch_optional(&self.pool)
        .await
        .map_err(|error| {
            if is_unique_violation(&error) {
                return AppError::Conflict(format!(
                    "user '{}' already belongs to the team",
                    member.user_id
                ));
            }
            if is_foreign_key_violation(&error) {
                return AppError::Validation(format!(
                    "user '{}' is not a member of the team's stream",
                    member.user_id
                ));
            }

            AppError::Internal(format!("failed to add team member: {error}"))
        })?
        .ok_or_else(|| AppError::NotFound(format!("team '{}' does not exist", member.team_id)))?;

        Ok(TeamMember::from(row))
    }

    async fn list_team_members(
        &self,
        workspace_id: WorkspaceId,
        team_id: Uuid,
    ) -> AppResult<Vec<TeamMember>> {
        if self.find_team(workspace_id, team_id).await?.is_none() {
            return Err(AppError::NotFound(format!("team '{team_id}' does not exist")));
        }

        let rows = sqlx::query_as::<_, TeamMemberRow>(
            r#"
            SELECT team_id, user_id, joined_at
            FROM team_members
            WHERE team_id = $1
            ORDER BY joined_at
            "#,
        )
        .bind(team_id)
        .fetch_all(&self.pool)
        .await
        .map_err(|error| AppError::Internal(format!("failed to list team members: {error}")))?;

        Ok(rows.into_iter().map(TeamMember::from).collect())
    }

    async fn remove_team_member(
        &self,
        workspace_id: WorkspaceId,
        team_id: Uuid,
        user_id: UserId,
    ) -> AppResult<()> {
        let deleted = sqlx::query(
            r#"
            DELETE FROM team_members
            USING teams
            WHERE team_members.team_id = teams.id
                AND teams.workspace_id = $1
                AND teams.id = $2
                AND team_members.user_id = $3
            "#,
        )
        .bind(workspace_id.as_uuid())
        .bind(team_id)
        .bind(user_id.as_uuid())
        .execute(&self.pool)
        .await
        .map_err(|error| AppError::Internal(format!("failed to remove team member: {error}")))?;
        if deleted.rows_affected() == 0 {
            return Err(AppError::NotFound(format!(
                "user '{user_id}' is not a member of team '{team_id}'"
            )));
        }

        Ok(())
    }
}

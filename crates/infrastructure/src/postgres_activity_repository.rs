use async_trait::async_trait;
use sqlx::PgPool;
use uuid::Uuid;

use workhive_application::ActivityRepository;
use workhive_core::{AppError, AppResult, WorkspaceId};
use workhive_domain::Activity;

use crate::postgres_rows::{ActivityRow, decode_rows};

/// PostgreSQL-backed append-only activity log.
#[derive(Clone)]
pub struct PostgresActivityRepository {
    pool: PgPool,
}

impl PostgresActivityRepository {
    /// Creates a repository with the provided connection pool.
    #[must_use]
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl ActivityRepository for PostgresActivityRepository {
    async fn append_activity(&self, activity: Activity) -> AppResult<()> {
        sqlx::query(
            r#"
            INSERT INTO activities (
                id,
                activity_type,
                description,
                actor_id,
                workspace_id,
                stream_id,
                project_id,
                task_id,
                channel_id,
                created_at
            )
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10)
            "#,
        )
        .bind(activity.activity_id)
        .bind(activity.activity_type.as_str())
        .bind(activity.description)
        .bind(activity.actor_id.as_uuid())
        .bind(activity.workspace_id.as_uuid())
        .bind(activity.stream_id)
        .bind(activity.project_id)
        .bind(activity.task_id)
        .bind(activity.channel_id)
        .bind(activity.created_at)
        .execute(&self.pool)
        .await
        .map_err(|error| AppError::Internal(format!("failed to append activity: {error}")))?;

        Ok(())
    }

    async fn list_recent_project_activities(
        &self,
        workspace_id: WorkspaceId,
        project_id: Uuid,
        limit: usize,
    ) -> AppResult<Vec<Activity>> {
        let capped_limit = limit.min(200) as i64;
        let rows = sqlx::query_as::<_, ActivityRow>(
            r#"
            SELECT
                id,
                activity_type,
                description,
                actor_id,
                workspace_id,
                stream_id,
                project_id,
                task_id,
                channel_id,
                created_at
            FROM activities
            WHERE workspace_id = $1
                AND project_id = $2
            ORDER BY created_at DESC
            LIMIT $3
            "#,
        )
        .bind(workspace_id.as_uuid())
        .bind(project_id)
        .bind(capped_limit)
        .fetch_all(&self.pool)
        .await
        .map_err(|error| AppError::Internal(format!("failed to list activities: {error}")))?;

        decode_rows(rows)
    }
}

#[cfg(test)]
mod tests;

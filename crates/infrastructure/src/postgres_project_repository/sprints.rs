use workhive_domain::SprintState;

use super::*;

const SPRINT_RETURNING: &str = "id, project_id, name, goal, position, state, start_date, end_date";

impl PostgresProjectRepository {
    pub(super) async fn create_sprint_impl(
        &self,
        workspace_id: WorkspaceId,
        sprint: Sprint,
    ) -> AppResult<Sprint> {
        let mut transaction =
            self.pool.begin().await.map_err(|error| {
                AppError::Internal(format!("failed to begin transaction: {error}"))
            })?;

        lock_project(&mut transaction, workspace_id, sprint.project_id).await?;

        let row = sqlx::query_as::<_, SprintRow>(&format!(
            r#"
            INSERT INTO sprints (id, project_id, name, goal, position, state, start_date, end_date)
            SELECT $1, $2, $3, $4, COALESCE(MAX(position), 0) + 1, $5, $6, $7
            FROM sprints
            WHERE project_id = $2
            RETURNING {SPRINT_RETURNING}
            "#
        ))
        .bind(sprint.sprint_id)
        .bind(sprint.project_id)
        .bind(sprint.name.as_str())
        .bind(sprint.goal.as_deref())
        .bind(sprint.state.as_str())
        .bind(sprint.start_date)
        .bind(sprint.end_date)
        .fetch_one(&mut *transaction)
        .await
        .map_err(|error| AppError::Internal(format!("failed to create sprint: {error}")))?;

        transaction.commit().await.map_err(|error| {
            AppError::Internal(format!("failed to commit transaction: {error}"))
        })?;

        Sprint::try_from(row)
    }

    pub(super) async fn save_sprint_impl(
        &self,
        workspace_id: WorkspaceId,
        sprint: Sprint,
    ) -> AppResult<Sprint> {
        let row = sqlx::query_as::<_, SprintRow>(
            r#"
            UPDATE sprints
            SET name = $3,
                goal = $4,
                start_date = $5,
                end_date = $6
            FROM projects
            WHERE sprints.id = $2
                AND projects.id = sprints.project_id
                AND projects.workspace_id = $1
            RETURNING
                sprints.id,
                sprints.project_id,
                sprints.name,
                sprints.goal,
                sprints.position,
                sprints.state,
                sprints.start_date,
                sprints.end_date
            "#,
        )
        .bind(workspace_id.as_uuid())
        .bind(sprint.sprint_id)
        .bind(sprint.name.as_str())
        .bind(sprint.goal.as_deref())
        .bind(sprint.start_date)
        .bind(sprint.end_date)
        .fetch_optional(&self.pool)
        .await
        .map_err(|error| AppError::Internal(format!("failed to save sprint: {error}")))?
        .ok_or_else(|| {
            AppError::NotFound(format!("sprint '{}' does not exist", sprint.sprint_id))
        })?;

        Sprint::try_from(row)
    }

    pub(super) async fn transition_sprint_impl(
        &self,
        workspace_id: WorkspaceId,
        transition: SprintTransition,
    ) -> AppResult<Sprint> {
        let mut transaction =
            self.pool.begin().await.map_err(|error| {
                AppError::Internal(format!("failed to begin transaction: {error}"))
            })?;

        // Activations serialize on the project row.
        let project_id = sqlx::query_scalar::<_, Uuid>(
            r#"
            SELECT projects.id
            FROM sprints
            INNER JOIN projects
                ON projects.id = sprints.project_id
            WHERE projects.workspace_id = $1
                AND sprints.id = $2
            FOR UPDATE OF projects
            "#,
        )
        .bind(workspace_id.as_uuid())
        .bind(transition.sprint_id)
        .fetch_optional(&mut *transaction)
        .await
        .map_err(|error| AppError::Internal(format!("failed to lock sprint project: {error}")))?
        .ok_or_else(|| {
            AppError::NotFound(format!("sprint '{}' does not exist", transition.sprint_id))
        })?;

        let row = sqlx::query_as::<_, SprintRow>(&format!(
            r#"
            SELECT {SPRINT_RETURNING}
            FROM sprints
            WHERE id = $1
            FOR UPDATE
            "#
        ))
        .bind(transition.sprint_id)
        .fetch_one(&mut *transaction)
        .await
        .map_err(|error| AppError::Internal(format!("failed to lock sprint: {error}")))?;
        let mut sprint = Sprint::try_from(row)?;

        if sprint.state != transition.from {
            return Err(AppError::Conflict(format!(
                "sprint '{}' is {}, expected {}",
                transition.sprint_id,
                sprint.state.as_str(),
                transition.from.as_str()
            )));
        }

        if transition.to == SprintState::Active && transition.enforce_single_active {
            let has_active = sqlx::query_scalar::<_, bool>(
                r#"
                SELECT EXISTS (
                    SELECT 1
                    FROM sprints
                    WHERE project_id = $1
                        AND id <> $2
                        AND state = $3
                )
                "#,
            )
            .bind(project_id)
            .bind(transition.sprint_id)
            .bind(SprintState::Active.as_str())
            .fetch_one(&mut *transaction)
            .await
            .map_err(|error| {
                AppError::Internal(format!("failed to check active sprints: {error}"))
            })?;
            if has_active {
                return Err(AppError::Conflict(format!(
                    "project '{project_id}' already has an active sprint"
                )));
            }
        }

        sprint.transition(transition.to, transition.at)?;

        sqlx::query(
            r#"
            UPDATE sprints
            SET state = $2,
                start_date = $3
            WHERE id = $1
            "#,
        )
        .bind(sprint.sprint_id)
        .bind(sprint.state.as_str())
        .bind(sprint.start_date)
        .execute(&mut *transaction)
        .await
        .map_err(|error| AppError::Internal(format!("failed to transition sprint: {error}")))?;

        transaction.commit().await.map_err(|error| {
            AppError::Internal(format!("failed to commit transaction: {error}"))
        })?;

        Ok(sprint)
    }

    pub(super) async fn delete_sprint_impl(
        &self,
        workspace_id: WorkspaceId,
        sprint_id: Uuid,
    ) -> AppResult<()> {
        let deleted = sqlx::query(
            r#"
            DELETE FROM sprints
            USING projects
            WHERE sprints.id = $2
                AND projects.id = sprints.project_id
                AND projects.workspace_id = $1
            "#,
        )
        .bind(workspace_id.as_uuid())
        .bind(sprint_id)
        .execute(&self.pool)
        .await
        .map_err(|error| AppError::Internal(format!("failed to delete sprint: {error}")))?;

        if deleted.rows_affected() == 0 {
            return Err(AppError::NotFound(format!(
                "sprint '{sprint_id}' does not exist"
            )));
        }

        Ok(())
    }
}

use sqlx::FromRow;

use super::*;

#[derive(Debug, FromRow)]
struct DependencyRow {
    id: Uuid,
    task_id: Uuid,
    depends_on_task_id: Uuid,
}

impl From<DependencyRow> for TaskDependency {
    fn from(row: DependencyRow) -> Self {
        Self {
            dependency_id: row.id,
            task_id: row.task_id,
            depends_on_task_id: row.depends_on_task_id,
        }
    }
}

impl PostgresTaskRepository {
    pub(super) async fn list_dependencies_impl(
        &self,
        workspace_id: WorkspaceId,
        task_id: Uuid,
    ) -> AppResult<Vec<TaskDependency>> {
        self.require_task(workspace_id, task_id).await?;

        let rows = sqlx::query_as::<_, DependencyRow>(
            r#"
            SELECT id, task_id, depends_on_task_id
            FROM task_dependencies
            WHERE task_id = $1
            "#,
        )
        .bind(task_id)
        .fetch_all(&self.pool)
        .await
        .map_err(|error| AppError::Internal(format!("failed to list dependencies: {error}")))?;

        Ok(rows.into_iter().map(TaskDependency::from).collect())
    }

    pub(super) async fn add_dependency_impl(
        &self,
        workspace_id: WorkspaceId,
        dependency: TaskDependency,
        reject_cycles: bool,
    ) -> AppResult<TaskDependency> {
        let mut transaction =
            self.pool.begin().await.map_err(|error| {
                AppError::Internal(format!("failed to begin transaction: {error}"))
            })?;

        // Edge additions of one workspace serialize on its row so the cycle check sees every edge.
        sqlx::query(
            r#"
            SELECT id
            FROM workspaces
            WHERE id = $1
            FOR NO KEY UPDATE
            "#,
        )
        .bind(workspace_id.as_uuid())
        .execute(&mut *transaction)
        .await
        .map_err(|error| AppError::Internal(format!("failed to lock workspace: {error}")))?;

        for task_id in [dependency.task_id, dependency.depends_on_task_id] {
            lock_task(&mut transaction, workspace_id, task_id).await?;
        }

        let edges = sqlx::query_as::<_, (Uuid, Uuid)>(&format!(
            r#"
            SELECT task_id, depends_on_task_id
            FROM task_dependencies
            WHERE task_id IN ({WORKSPACE_TASK_IDS})
            "#
        ))
        .bind(workspace_id.as_uuid())
        .fetch_all(&mut *transaction)
        .await
        .map_err(|error| AppError::Internal(format!("failed to load dependencies: {error}")))?;

        if edges.contains(&(dependency.task_id, dependency.depends_on_task_id)) {
            return Err(AppError::Conflict(
                "task already depends on that task".to_owned(),
            ));
        }

        if reject_cycles
            && creates_dependency_cycle(&edges, dependency.task_id, dependency.depends_on_task_id)
        {
            return Err(AppError::Conflict(
                "dependency would create a cycle".to_owned(),
            ));
        }

        sqlx::query(
            r#"
            INSERT INTO task_dependencies (id, task_id, depends_on_task_id)
            VALUES ($1, $2, $3)
            "#,
        )
        .bind(dependency.dependency_id)
        .bind(dependency.task_id)
        .bind(dependency.depends_on_task_id)
        .execute(&mut *transaction)
        .await
        .map_err(|error| {
            if is_unique_violation(&error) {
                return AppError::Conflict("task already depends on that task".to_owned());
            }

            AppError::Internal(format!("failed to add dependency: {error}"))
        })?;

        transaction.commit().await.map_err(|error| {
            AppError::Internal(format!("failed to commit transaction: {error}"))
        })?;

        Ok(dependency)
    }

    pub(super) async fn remove_dependency_impl(
        &self,
        workspace_id: WorkspaceId,
        task_id: Uuid,
        depends_on_task_id: Uuid,
    ) -> AppResult<()> {
        let deleted = sqlx::query(&format!(
            r#"
            DELETE FROM task_dependencies
            WHERE task_id = $2
                AND depends_on_task_id = $3
                AND task_id IN ({WORKSPACE_TASK_IDS})
            "#
        ))
        .bind(workspace_id.as_uuid())
        .bind(task_id)
        .bind(depends_on_task_id)
        .execute(&self.pool)
        .await
        .map_err(|error| AppError::Internal(format!("failed to remove dependency: {error}")))?;

        if deleted.rows_affected() == 0 {
            return Err(AppError::NotFound(format!(
                "task '{task_id}' does not depend on task '{depends_on_task_id}'"
            )));
        }

        Ok(())
    }
}

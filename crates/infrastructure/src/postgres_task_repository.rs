use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::{PgPool, Postgres, Transaction};
use uuid::Uuid;

use workhive_application::{CreatedTask, NewSubtask, NewTask, TaskRepository};
use workhive_core::{AppError, AppResult, UserId, WorkspaceId};
use workhive_domain::{
    Card, ChecklistItem, Task, TaskDependency, TaskKey, TaskPriority, creates_dependency_cycle,
};

use crate::postgres_rows::{
    CardRow, ChecklistItemRow, TASK_COLUMNS, TaskRow, decode_rows, is_unique_violation,
};

mod checklist;
mod relations;

/// Task identifiers visible inside the workspace bound to `$1`.
const WORKSPACE_TASK_IDS: &str = "SELECT tasks.id FROM tasks \
    INNER JOIN projects ON projects.id = tasks.project_id WHERE projects.workspace_id = $1";

/// PostgreSQL-backed repository for tasks, dependency edges and checklists.
#[derive(Clone)]
pub struct PostgresTaskRepository {
    pool: PgPool,
}

impl PostgresTaskRepository {
    /// Creates a repository with the provided connection pool.
    #[must_use]
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    async fn require_task(&self, workspace_id: WorkspaceId, task_id: Uuid) -> AppResult<Task> {
        self.find_task(workspace_id, task_id)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("task '{task_id}' does not exist")))
    }
}

async fn lock_task(
    transaction: &mut Transaction<'_, Postgres>,
    workspace_id: WorkspaceId,
    task_id: Uuid,
) -> AppResult<()> {
    sqlx::query_scalar::<_, Uuid>(&format!(
        r#"
        SELECT id
        FROM tasks
        WHERE id = $2
            AND id IN ({WORKSPACE_TASK_IDS})
        FOR UPDATE
        "#
    ))
    .bind(workspace_id.as_uuid())
    .bind(task_id)
    .fetch_optional(&mut **transaction)
    .await
    .map_err(|error| AppError::Internal(format!("failed to lock task: {error}")))?
    .map(|_| ())
    .ok_or_else(|| AppError::NotFound(format!("task '{task_id}' does not exist")))
}

#[async_trait]
impl TaskRepository for PostgresTaskRepository {
    async fn create_task(&self, workspace_id: WorkspaceId, task: NewTask) -> AppResult<CreatedTask> {
        let mut transaction =
            self.pool.begin().await.map_err(|error| {
                AppError::Internal(format!("failed to begin transaction: {error}"))
            })?;

        // The row lock taken by the increment serializes key generation per project.
        let (sequence, project_name) = sqlx::query_as::<_, (i64, String)>(
            r#"
            UPDATE projects
            SET task_sequence = task_sequence + 1
            WHERE workspace_id = $1
                AND id = $2
            RETURNING task_sequence, name
            "#,
        )
        .bind(workspace_id.as_uuid())
        .bind(task.project_id)
        .fetch_optional(&mut *transaction)
        .await
        .map_err(|error| AppError::Internal(format!("failed to advance task sequence: {error}")))?
        .ok_or_else(|| {
            AppError::NotFound(format!("project '{}' does not exist", task.project_id))
        })?;
        let key = TaskKey::for_project(project_name.as_str(), sequence)?;

        let task_row = sqlx::query_as::<_, TaskRow>(&format!(
            r#"
            INSERT INTO tasks (
                id, project_id, key, description, priority, due_date, labels, reporter_id,
                status_id, created_at, updated_at
            )
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $10)
            RETURNING {TASK_COLUMNS}
            "#
        ))
        .bind(task.task_id)
        .bind(task.project_id)
        .bind(key.as_str())
        .bind(task.description.as_str())
        .bind(task.priority.as_str())
        .bind(task.due_date)
        .bind(&task.labels)
        .bind(task.reporter_id.as_uuid())
        .bind(task.status_id)
        .bind(task.created_at)
        .fetch_one(&mut *transaction)
        .await
        .map_err(|error| {
            if is_unique_violation(&error) {
                return AppError::Conflict(format!("task key '{key}' already exists"));
            }

            AppError::Internal(format!("failed to create task: {error}"))
        })?;

        let card_row = sqlx::query_as::<_, CardRow>(
            r#"
            INSERT INTO cards (id, task_id, project_id, column_id, sprint_id, position)
            SELECT $1, $2, $3, $4, $5, COALESCE(MAX(position) + 1, 0)
            FROM cards
            WHERE project_id = $3
            RETURNING id, task_id, project_id, column_id, sprint_id, position
            "#,
        )
        .bind(task.card_id)
        .bind(task.task_id)
        .bind(task.project_id)
        .bind(task.column_id)
        .bind(task.sprint_id)
        .fetch_one(&mut *transaction)
        .await
        .map_err(|error| AppError::Internal(format!("failed to create card: {error}")))?;

        transaction.commit().await.map_err(|error| {
            AppError::Internal(format!("failed to commit transaction: {error}"))
        })?;

        Ok(CreatedTask {
            task: Task::try_from(task_row)?,
            card: Card::from(card_row),
        })
    }

    async fn create_subtask(&self, workspace_id: WorkspaceId, subtask: NewSubtask) -> AppResult<Task> {
        let mut transaction =
            self.pool.begin().await.map_err(|error| {
                AppError::Internal(format!("failed to begin transaction: {error}"))
            })?;

        let (sequence, parent_key, project_id) = sqlx::query_as::<_, (i64, String, Uuid)>(&format!(
            r#"
            UPDATE tasks
            SET subtask_sequence = subtask_sequence + 1
            WHERE id = $2
                AND id IN ({WORKSPACE_TASK_IDS})
            RETURNING subtask_sequence, key, project_id
            "#
        ))
        .bind(workspace_id.as_uuid())
        .bind(subtask.parent_id)
        .fetch_optional(&mut *transaction)
        .await
        .map_err(|error| {
            AppError::Internal(format!("failed to advance subtask sequence: {error}"))
        })?
        .ok_or_else(|| {
            AppError::NotFound(format!("task '{}' does not exist", subtask.parent_id))
        })?;
        let parent_key = TaskKey::from_stored(parent_key)
            .map_err(|error| AppError::Internal(format!("invalid stored task key: {error}")))?;
        let key = TaskKey::for_subtask(&parent_key, sequence)?;

        let row = sqlx::query_as::<_, TaskRow>(&format!(
            r#"
            INSERT INTO tasks (
                id, project_id, parent_id, key, description, priority, reporter_id, status_id,
                created_at, updated_at
            )
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $9)
            RETURNING {TASK_COLUMNS}
            "#
        ))
        .bind(subtask.task_id)
        .bind(project_id)
        .bind(subtask.parent_id)
        .bind(key.as_str())
        .bind(subtask.description.as_str())
        .bind(TaskPriority::default().as_str())
        .bind(subtask.reporter_id.as_uuid())
        .bind(subtask.status_id)
        .bind(subtask.created_at)
        .fetch_one(&mut *transaction)
        .await
        .map_err(|error| AppError::Internal(format!("failed to create subtask: {error}")))?;

        transaction.commit().await.map_err(|error| {
            AppError::Internal(format!("failed to commit transaction: {error}"))
        })?;

        Task::try_from(row)
    }

    async fn find_task(&self, workspace_id: WorkspaceId, task_id: Uuid) -> AppResult<Option<Task>> {
        sqlx::query_as::<_, TaskRow>(&format!(
            r#"
            SELECT {TASK_COLUMNS}
            FROM tasks
            WHERE id = $2
                AND id IN ({WORKSPACE_TASK_IDS})
            "#
        ))
        .bind(workspace_id.as_uuid())
        .bind(task_id)
        .fetch_optional(&self.pool)
        .await
        .map_err(|error| AppError::Internal(format!("failed to find task: {error}")))?
        .map(Task::try_from)
        .transpose()
    }

    async fn list_tasks(&self, workspace_id: WorkspaceId, project_id: Uuid) -> AppResult<Vec<Task>> {
        let project_exists = sqlx::query_scalar::<_, bool>(
            r#"
            SELECT EXISTS (
                SELECT 1 FROM projects WHERE workspace_id = $1 AND id = $2
            )
            "#,
        )
        .bind(workspace_id.as_uuid())
        .bind(project_id)
        .fetch_one(&self.pool)
        .await
        .map_err(|error| AppError::Internal(format!("failed to find project: {error}")))?;
        if !project_exists {
            return Err(AppError::NotFound(format!(
                "project '{project_id}' does not exist"
            )));
        }

        let rows = sqlx::query_as::<_, TaskRow>(&format!(
            r#"
            SELECT {TASK_COLUMNS}
            FROM tasks
            WHERE project_id = $1
            ORDER BY created_at
            "#
        ))
        .bind(project_id)
        .fetch_all(&self.pool)
        .await
        .map_err(|error| AppError::Internal(format!("failed to list tasks: {error}")))?;

        decode_rows(rows)
    }

    async fn list_subtasks(
        &self,
        workspace_id: WorkspaceId,
        parent_id: Uuid,
    ) -> AppResult<Vec<Task>> {
        self.require_task(workspace_id, parent_id).await?;

        let rows = sqlx::query_as::<_, TaskRow>(&format!(
            r#"
            SELECT {TASK_COLUMNS}
            FROM tasks
            WHERE parent_id = $1
            ORDER BY created_at
            "#
        ))
        .bind(parent_id)
        .fetch_all(&self.pool)
        .await
        .map_err(|error| AppError::Internal(format!("failed to list subtasks: {error}")))?;

        decode_rows(rows)
    }

    async fn find_card_for_task(
        &self,
        workspace_id: WorkspaceId,
        task_id: Uuid,
    ) -> AppResult<Option<Card>> {
        self.require_task(workspace_id, task_id).await?;

        let row = sqlx::query_as::<_, CardRow>(
            r#"
            SELECT id, task_id, project_id, column_id, sprint_id, position
            FROM cards
            WHERE task_id = $1
            "#,
        )
        .bind(task_id)
        .fetch_optional(&self.pool)
        .await
        .map_err(|error| AppError::Internal(format!("failed to find card: {error}")))?;

        Ok(row.map(Card::from))
    }

    async fn save_task(&self, workspace_id: WorkspaceId, task: Task) -> AppResult<Task> {
        let row = sqlx::query_as::<_, TaskRow>(&format!(
            r#"
            UPDATE tasks
            SET description = $3,
                priority = $4,
                due_date = $5,
                labels = $6,
                updated_at = $7
            WHERE id = $2
                AND id IN ({WORKSPACE_TASK_IDS})
            RETURNING {TASK_COLUMNS}
            "#
        ))
        .bind(workspace_id.as_uuid())
        .bind(task.task_id)
        .bind(task.description.as_str())
        .bind(task.priority.as_str())
        .bind(task.due_date)
        .bind(&task.labels)
        .bind(task.updated_at)
        .fetch_optional(&self.pool)
        .await
        .map_err(|error| AppError::Internal(format!("failed to save task: {error}")))?
        .ok_or_else(|| AppError::NotFound(format!("task '{}' does not exist", task.task_id)))?;

        Task::try_from(row)
    }

    async fn delete_task(&self, workspace_id: WorkspaceId, task_id: Uuid) -> AppResult<()> {
        // Subtasks, the card, edges and checklist rows cascade.
        let deleted = sqlx::query(&format!(
            r#"
            DELETE FROM tasks
            WHERE id = $2
                AND id IN ({WORKSPACE_TASK_IDS})
            "#
        ))
        .bind(workspace_id.as_uuid())
        .bind(task_id)
        .execute(&self.pool)
        .await
        .map_err(|error| AppError::Internal(format!("failed to delete task: {error}")))?;

        if deleted.rows_affected() == 0 {
            return Err(AppError::NotFound(format!("task '{task_id}' does not exist")));
        }

        Ok(())
    }

    async fn set_assignee(
        &self,
        workspace_id: WorkspaceId,
        task_id: Uuid,
        assignee_id: Option<UserId>,
        updated_at: DateTime<Utc>,
    ) -> AppResult<Task> {
        let row = sqlx::query_as::<_, TaskRow>(&format!(
            r#"
            UPDATE tasks
            SET assignee_id = $3,
                updated_at = $4
            WHERE id = $2
                AND id IN ({WORKSPACE_TASK_IDS})
            RETURNING {TASK_COLUMNS}
            "#
        ))
        .bind(workspace_id.as_uuid())
        .bind(task_id)
        .bind(assignee_id.map(|user_id| user_id.as_uuid()))
        .bind(updated_at)
        .fetch_optional(&self.pool)
        .await
        .map_err(|error| AppError::Internal(format!("failed to assign task: {error}")))?
        .ok_or_else(|| AppError::NotFound(format!("task '{task_id}' does not exist")))?;

        Task::try_from(row)
    }

    async fn list_dependencies(
        &self,
        workspace_id: WorkspaceId,
        task_id: Uuid,
    ) -> AppResult<Vec<TaskDependency>> {
        self.list_dependencies_impl(workspace_id, task_id).await
    }

    async fn add_dependency(
        &self,
        workspace_id: WorkspaceId,
        dependency: TaskDependency,
        reject_cycles: bool,
    ) -> AppResult<TaskDependency> {
        self.add_dependency_impl(workspace_id, dependency, reject_cycles)
            .await
    }

    async fn remove_dependency(
        &self,
        workspace_id: WorkspaceId,
        task_id: Uuid,
        depends_on_task_id: Uuid,
    ) -> AppResult<()> {
        self.remove_dependency_impl(workspace_id, task_id, depends_on_task_id)
            .await
    }

    async fn list_checklist_items(
        &self,
        workspace_id: WorkspaceId,
        task_id: Uuid,
    ) -> AppResult<Vec<ChecklistItem>> {
        self.list_checklist_items_impl(workspace_id, task_id).await
    }

    async fn add_checklist_item(
        &self,
        workspace_id: WorkspaceId,
        item: ChecklistItem,
    ) -> AppResult<ChecklistItem> {
        self.add_checklist_item_impl(workspace_id, item).await
    }

    async fn find_checklist_item(
        &self,
        workspace_id: WorkspaceId,
        item_id: Uuid,
    ) -> AppResult<Option<ChecklistItem>> {
        self.find_checklist_item_impl(workspace_id, item_id).await
    }

    async fn set_checklist_item_done(
        &self,
        workspace_id: WorkspaceId,
        item_id: Uuid,
        is_done: bool,
    ) -> AppResult<ChecklistItem> {
        self.set_checklist_item_done_impl(workspace_id, item_id, is_done)
            .await
    }

    async fn remove_checklist_item(
        &self,
        workspace_id: WorkspaceId,
        item_id: Uuid,
    ) -> AppResult<()> {
        self.remove_checklist_item_impl(workspace_id, item_id).await
    }
}

#[cfg(test)]
mod tests;

use std::collections::HashMap;

use async_trait::async_trait;
use sqlx::{FromRow, PgPool, Postgres, Transaction};
use uuid::Uuid;

use workhive_application::{
    CardColumnMove, CardEntry, ProjectProvisioning, ProjectRepository, SprintTransition,
};
use workhive_core::{AppError, AppResult, NonEmptyString, WorkspaceId};
use workhive_domain::{Board, BoardColumn, Card, Project, Sprint, Status, Task};

use crate::postgres_rows::{
    CardRow, ProjectRow, SprintRow, TASK_COLUMNS, TaskRow, decode_rows,
};

mod cards;
mod sprints;

/// PostgreSQL-backed repository for projects, boards, sprints and cards.
#[derive(Clone)]
pub struct PostgresProjectRepository {
    pool: PgPool,
}

impl PostgresProjectRepository {
    /// Creates a repository with the provided connection pool.
    #[must_use]
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[derive(Debug, FromRow)]
struct BoardRow {
    id: Uuid,
    name: String,
}

#[derive(Debug, FromRow)]
struct ColumnRow {
    id: Uuid,
    name: String,
    position: i32,
    is_initial: bool,
    is_terminal: bool,
    status_id: Uuid,
    status_name: String,
}

impl TryFrom<ColumnRow> for BoardColumn {
    type Error = AppError;

    fn try_from(row: ColumnRow) -> AppResult<Self> {
        let invalid =
            |error: AppError| AppError::Internal(format!("invalid stored column: {error}"));

        Ok(Self {
            column_id: row.id,
            name: NonEmptyString::new(row.name).map_err(invalid)?,
            position: row.position,
            is_initial: row.is_initial,
            is_terminal: row.is_terminal,
            status: Status {
                status_id: row.status_id,
                name: NonEmptyString::new(row.status_name).map_err(invalid)?,
            },
        })
    }
}

/// Locks a project row of the workspace, returning its name.
pub(crate) async fn lock_project(
    transaction: &mut Transaction<'_, Postgres>,
    workspace_id: WorkspaceId,
    project_id: Uuid,
) -> AppResult<String> {
    sqlx::query_scalar::<_, String>(
        r#"
        SELECT name
        FROM projects
        WHERE workspace_id = $1
            AND id = $2
        FOR UPDATE
        "#,
    )
    .bind(workspace_id.as_uuid())
    .bind(project_id)
    .fetch_optional(&mut **transaction)
    .await
    .map_err(|error| AppError::Internal(format!("failed to lock project: {error}")))?
    .ok_or_else(|| AppError::NotFound(format!("project '{project_id}' does not exist")))
}

#[async_trait]
impl ProjectRepository for PostgresProjectRepository {
    async fn create_project(&self, provisioning: ProjectProvisioning) -> AppResult<Project> {
        let ProjectProvisioning {
            project,
            board,
            sprint,
        } = provisioning;

        let mut transaction =
            self.pool.begin().await.map_err(|error| {
                AppError::Internal(format!("failed to begin transaction: {error}"))
            })?;

        let row = sqlx::query_as::<_, ProjectRow>(
            r#"
            INSERT INTO projects (
                id, workspace_id, stream_id, team_id, name, description, created_by, created_at
            )
            SELECT $1, streams.workspace_id, streams.id, $4, $5, $6, $7, $8
            FROM streams
            WHERE streams.workspace_id = $2
                AND streams.id = $3
            RETURNING
                id, workspace_id, stream_id, team_id, name, description, created_by, created_at
            "#,
        )
        .bind(project.project_id)
        .bind(project.workspace_id.as_uuid())
        .bind(project.stream_id)
        .bind(project.team_id)
        .bind(project.name.as_str())
        .bind(project.description.as_deref())
        .bind(project.created_by.as_uuid())
        .bind(project.created_at)
        .fetch_optional(&mut *transaction)
        .await
        .map_err(|error| AppError::Internal(format!("failed to create project: {error}")))?
        .ok_or_else(|| {
            AppError::NotFound(format!("stream '{}' does not exist", project.stream_id))
        })?;

        sqlx::query(
            r#"
            INSERT INTO boards (id, project_id, name)
            VALUES ($1, $2, $3)
            "#,
        )
        .bind(board.board_id())
        .bind(board.project_id())
        .bind(board.name().as_str())
        .execute(&mut *transaction)
        .await
        .map_err(|error| AppError::Internal(format!("failed to create board: {error}")))?;

        for column in board.columns() {
            sqlx::query(
                r#"
                INSERT INTO statuses (id, board_id, name)
                VALUES ($1, $2, $3)
                "#,
            )
            .bind(column.status.status_id)
            .bind(board.board_id())
            .bind(column.status.name.as_str())
            .execute(&mut *transaction)
            .await
            .map_err(|error| AppError::Internal(format!("failed to create status: {error}")))?;

            sqlx::query(
                r#"
                INSERT INTO board_columns (
                    id, board_id, status_id, name, position, is_initial, is_terminal
                )
                VALUES ($1, $2, $3, $4, $5, $6, $7)
                "#,
            )
            .bind(column.column_id)
            .bind(board.board_id())
            .bind(column.status.status_id)
            .bind(column.name.as_str())
            .bind(column.position)
            .bind(column.is_initial)
            .bind(column.is_terminal)
            .execute(&mut *transaction)
            .await
            .map_err(|error| AppError::Internal(format!("failed to create column: {error}")))?;
        }

        sqlx::query(
            r#"
            INSERT INTO sprints (id, project_id, name, goal, position, state)
            VALUES ($1, $2, $3, $4, $5, $6)
            "#,
        )
        .bind(sprint.sprint_id)
        .bind(sprint.project_id)
        .bind(sprint.name.as_str())
        .bind(sprint.goal.as_deref())
        .bind(sprint.position)
        .bind(sprint.state.as_str())
        .execute(&mut *transaction)
        .await
        .map_err(|error| AppError::Internal(format!("failed to create default sprint: {error}")))?;

        transaction.commit().await.map_err(|error| {
            AppError::Internal(format!("failed to commit transaction: {error}"))
        })?;

        Project::try_from(row)
    }

    async fn find_project(
        &self,
        workspace_id: WorkspaceId,
        project_id: Uuid,
    ) -> AppResult<Option<Project>> {
        sqlx::query_as::<_, ProjectRow>(
            r#"
            SELECT id, workspace_id, stream_id, team_id, name, description, created_by, created_at
            FROM projects
            WHERE workspace_id = $1
                AND id = $2
            "#,
        )
        .bind(workspace_id.as_uuid())
        .bind(project_id)
        .fetch_optional(&self.pool)
        .await
        .map_err(|error| AppError::Internal(format!("failed to find project: {error}")))?
        .map(Project::try_from)
        .transpose()
    }

    async fn list_projects(
        &self,
        workspace_id: WorkspaceId,
        stream_id: Uuid,
    ) -> AppResult<Vec<Project>> {
        let rows = sqlx::query_as::<_, ProjectRow>(
            r#"
            SELECT id, workspace_id, stream_id, team_id, name, description, created_by, created_at
            FROM projects
            WHERE workspace_id = $1
                AND stream_id = $2
            ORDER BY created_at
            "#,
        )
        .bind(workspace_id.as_uuid())
        .bind(stream_id)
        .fetch_all(&self.pool)
        .await
        .map_err(|error| AppError::Internal(format!("failed to list projects: {error}")))?;

        decode_rows(rows)
    }

    async fn save_project(&self, project: Project) -> AppResult<Project> {
        let row = sqlx::query_as::<_, ProjectRow>(
            r#"
            UPDATE projects
            SET name = $3,
                description = $4,
                team_id = $5
            WHERE workspace_id = $1
                AND id = $2
            RETURNING
                id, workspace_id, stream_id, team_id, name, description, created_by, created_at
            "#,
        )
        .bind(project.workspace_id.as_uuid())
        .bind(project.project_id)
        .bind(project.name.as_str())
        .bind(project.description.as_deref())
        .bind(project.team_id)
        .fetch_optional(&self.pool)
        .await
        .map_err(|error| AppError::Internal(format!("failed to save project: {error}")))?
        .ok_or_else(|| {
            AppError::NotFound(format!("project '{}' does not exist", project.project_id))
        })?;

        Project::try_from(row)
    }

    async fn delete_project(&self, workspace_id: WorkspaceId, project_id: Uuid) -> AppResult<()> {
        let deleted = sqlx::query(
            r#"
            DELETE FROM projects
            WHERE workspace_id = $1
                AND id = $2
            "#,
        )
        .bind(workspace_id.as_uuid())
        .bind(project_id)
        .execute(&self.pool)
        .await
        .map_err(|error| AppError::Internal(format!("failed to delete project: {error}")))?;

        if deleted.rows_affected() == 0 {
            return Err(AppError::NotFound(format!(
                "project '{project_id}' does not exist"
            )));
        }

        Ok(())
    }

    async fn find_board(&self, workspace_id: WorkspaceId, project_id: Uuid) -> AppResult<Board> {
        let board = sqlx::query_as::<_, BoardRow>(
            r#"
            SELECT boards.id, boards.name
            FROM boards
            INNER JOIN projects
                ON projects.id = boards.project_id
            WHERE projects.workspace_id = $1
                AND boards.project_id = $2
            "#,
        )
        .bind(workspace_id.as_uuid())
        .bind(project_id)
        .fetch_optional(&self.pool)
        .await
        .map_err(|error| AppError::Internal(format!("failed to find board: {error}")))?
        .ok_or_else(|| AppError::NotFound(format!("project '{project_id}' has no board")))?;

        let columns = sqlx::query_as::<_, ColumnRow>(
            r#"
            SELECT
                board_columns.id,
                board_columns.name,
                board_columns.position,
                board_columns.is_initial,
                board_columns.is_terminal,
                statuses.id AS status_id,
                statuses.name AS status_name
            FROM board_columns
            INNER JOIN statuses
                ON statuses.id = board_columns.status_id
            WHERE board_columns.board_id = $1
            ORDER BY board_columns.position
            "#,
        )
        .bind(board.id)
        .fetch_all(&self.pool)
        .await
        .map_err(|error| AppError::Internal(format!("failed to list board columns: {error}")))?;

        Board::new(board.id, project_id, board.name, decode_rows(columns)?).map_err(|error| {
            AppError::Internal(format!("invalid stored board '{}': {error}", board.id))
        })
    }

    async fn list_card_entries(
        &self,
        workspace_id: WorkspaceId,
        project_id: Uuid,
    ) -> AppResult<Vec<CardEntry>> {
        let cards = sqlx::query_as::<_, CardRow>(
            r#"
            SELECT cards.id, cards.task_id, cards.project_id, cards.column_id, cards.sprint_id,
                cards.position
            FROM cards
            INNER JOIN projects
                ON projects.id = cards.project_id
            WHERE projects.workspace_id = $1
                AND cards.project_id = $2
            ORDER BY cards.position
            "#,
        )
        .bind(workspace_id.as_uuid())
        .bind(project_id)
        .fetch_all(&self.pool)
        .await
        .map_err(|error| AppError::Internal(format!("failed to list cards: {error}")))?;

        let task_rows = sqlx::query_as::<_, TaskRow>(&format!(
            "SELECT {TASK_COLUMNS} FROM tasks WHERE project_id = $1 AND parent_id IS NULL"
        ))
        .bind(project_id)
        .fetch_all(&self.pool)
        .await
        .map_err(|error| AppError::Internal(format!("failed to list card tasks: {error}")))?;
        let mut tasks: HashMap<Uuid, Task> = decode_rows::<_, Task>(task_rows)?
            .into_iter()
            .map(|task| (task.task_id, task))
            .collect();

        Ok(cards
            .into_iter()
            .map(Card::from)
            .filter_map(|card| {
                tasks
                    .remove(&card.task_id)
                    .map(|task| CardEntry { card, task })
            })
            .collect())
    }

    async fn find_card(&self, workspace_id: WorkspaceId, card_id: Uuid) -> AppResult<Option<Card>> {
        let row = sqlx::query_as::<_, CardRow>(
            r#"
            SELECT cards.id, cards.task_id, cards.project_id, cards.column_id, cards.sprint_id,
                cards.position
            FROM cards
            INNER JOIN projects
                ON projects.id = cards.project_id
            WHERE projects.workspace_id = $1
                AND cards.id = $2
            "#,
        )
        .bind(workspace_id.as_uuid())
        .bind(card_id)
        .fetch_optional(&self.pool)
        .await
        .map_err(|error| AppError::Internal(format!("failed to find card: {error}")))?;

        Ok(row.map(Card::from))
    }

    async fn create_sprint(&self, workspace_id: WorkspaceId, sprint: Sprint) -> AppResult<Sprint> {
        self.create_sprint_impl(workspace_id, sprint).await
    }

    async fn list_sprints(
        &self,
        workspace_id: WorkspaceId,
        project_id: Uuid,
    ) -> AppResult<Vec<Sprint>> {
        let rows = sqlx::query_as::<_, SprintRow>(
            r#"
            SELECT sprints.id, sprints.project_id, sprints.name, sprints.goal, sprints.position,
                sprints.state, sprints.start_date, sprints.end_date
            FROM sprints
            INNER JOIN projects
                ON projects.id = sprints.project_id
            WHERE projects.workspace_id = $1
                AND sprints.project_id = $2
            ORDER BY sprints.position
            "#,
        )
        .bind(workspace_id.as_uuid())
        .bind(project_id)
        .fetch_all(&self.pool)
        .await
        .map_err(|error| AppError::Internal(format!("failed to list sprints: {error}")))?;

        decode_rows(rows)
    }

    async fn find_sprint(
        &self,
        workspace_id: WorkspaceId,
        sprint_id: Uuid,
    ) -> AppResult<Option<Sprint>> {
        sqlx::query_as::<_, SprintRow>(
            r#"
            SELECT sprints.id, sprints.project_id, sprints.name, sprints.goal, sprints.position,
                sprints.state, sprints.start_date, sprints.end_date
            FROM sprints
            INNER JOIN projects
                ON projects.id = sprints.project_id
            WHERE projects.workspace_id = $1
                AND sprints.id = $2
            "#,
        )
        .bind(workspace_id.as_uuid())
        .bind(sprint_id)
        .fetch_optional(&self.pool)
        .await
        .map_err(|error| AppError::Internal(format!("failed to find sprint: {error}")))?
        .map(Sprint::try_from)
        .transpose()
    }

    async fn save_sprint(&self, workspace_id: WorkspaceId, sprint: Sprint) -> AppResult<Sprint> {
        self.save_sprint_impl(workspace_id, sprint).await
    }

    async fn transition_sprint(
        &self,
        workspace_id: WorkspaceId,
        transition: SprintTransition,
    ) -> AppResult<Sprint> {
        self.transition_sprint_impl(workspace_id, transition).await
    }

    async fn delete_sprint(&self, workspace_id: WorkspaceId, sprint_id: Uuid) -> AppResult<()> {
        self.delete_sprint_impl(workspace_id, sprint_id).await
    }

    async fn move_card_to_sprint(
        &self,
        workspace_id: WorkspaceId,
        card_id: Uuid,
        sprint_id: Option<Uuid>,
    ) -> AppResult<Card> {
        self.move_card_to_sprint_impl(workspace_id, card_id, sprint_id)
            .await
    }

    async fn move_card_to_column(
        &self,
        workspace_id: WorkspaceId,
        change: CardColumnMove,
    ) -> AppResult<CardEntry> {
        self.move_card_to_column_impl(workspace_id, change).await
    }
}

#[cfg(test)]
mod tests;

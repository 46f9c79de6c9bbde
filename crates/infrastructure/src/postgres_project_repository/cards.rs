use workhive_domain::SprintState;

use super::*;

impl PostgresProjectRepository {
    pub(super) async fn move_card_to_sprint_impl(
        &self,
        workspace_id: WorkspaceId,
        card_id: Uuid,
        sprint_id: Option<Uuid>,
    ) -> AppResult<Card> {
        let mut transaction =
            self.pool.begin().await.map_err(|error| {
                AppError::Internal(format!("failed to begin transaction: {error}"))
            })?;

        let card = lock_card(&mut transaction, workspace_id, card_id).await?;

        if let Some(sprint_id) = sprint_id {
            let state = sqlx::query_scalar::<_, String>(
                r#"
                SELECT state
                FROM sprints
                WHERE id = $1
                    AND project_id = $2
                FOR SHARE
                "#,
            )
            .bind(sprint_id)
            .bind(card.project_id)
            .fetch_optional(&mut *transaction)
            .await
            .map_err(|error| AppError::Internal(format!("failed to find sprint: {error}")))?
            .ok_or_else(|| {
                AppError::NotFound(format!(
                    "sprint '{sprint_id}' does not exist in the card's project"
                ))
            })?;

            if state == SprintState::Completed.as_str() {
                return Err(AppError::Conflict(format!(
                    "sprint '{sprint_id}' is already completed"
                )));
            }
        }

        let row = sqlx::query_as::<_, CardRow>(
            r#"
            UPDATE cards
            SET sprint_id = $2
            WHERE id = $1
            RETURNING id, task_id, project_id, column_id, sprint_id, position
            "#,
        )
        .bind(card_id)
        .bind(sprint_id)
        .fetch_one(&mut *transaction)
        .await
        .map_err(|error| AppError::Internal(format!("failed to move card: {error}")))?;

        transaction.commit().await.map_err(|error| {
            AppError::Internal(format!("failed to commit transaction: {error}"))
        })?;

        Ok(Card::from(row))
    }

    pub(super) async fn move_card_to_column_impl(
        &self,
        workspace_id: WorkspaceId,
        change: CardColumnMove,
    ) -> AppResult<CardEntry> {
        let mut transaction =
            self.pool.begin().await.map_err(|error| {
                AppError::Internal(format!("failed to begin transaction: {error}"))
            })?;

        let card = lock_card(&mut transaction, workspace_id, change.card_id).await?;

        let column_matches = sqlx::query_scalar::<_, bool>(
            r#"
            SELECT EXISTS (
                SELECT 1
                FROM board_columns
                INNER JOIN boards
                    ON boards.id = board_columns.board_id
                WHERE boards.project_id = $1
                    AND board_columns.id = $2
                    AND board_columns.status_id = $3
            )
            "#,
        )
        .bind(card.project_id)
        .bind(change.column_id)
        .bind(change.status_id)
        .fetch_one(&mut *transaction)
        .await
        .map_err(|error| AppError::Internal(format!("failed to check board column: {error}")))?;
        if !column_matches {
            return Err(AppError::NotFound(format!(
                "column '{}' does not exist on the card's board",
                change.column_id
            )));
        }

        let task_row = sqlx::query_as::<_, TaskRow>(&format!(
            r#"
            UPDATE tasks
            SET status_id = $2,
                completed_at = CASE
                    WHEN $3::timestamptz IS NULL THEN NULL
                    ELSE COALESCE(completed_at, $3)
                END,
                updated_at = $4
            WHERE id = $1
            RETURNING {TASK_COLUMNS}
            "#
        ))
        .bind(card.task_id)
        .bind(change.status_id)
        .bind(change.completed_at)
        .bind(change.updated_at)
        .fetch_one(&mut *transaction)
        .await
        .map_err(|error| AppError::Internal(format!("failed to update task status: {error}")))?;

        let card_row = sqlx::query_as::<_, CardRow>(
            r#"
            UPDATE cards
            SET column_id = $2
            WHERE id = $1
            RETURNING id, task_id, project_id, column_id, sprint_id, position
            "#,
        )
        .bind(change.card_id)
        .bind(change.column_id)
        .fetch_one(&mut *transaction)
        .await
        .map_err(|error| AppError::Internal(format!("failed to move card: {error}")))?;

        transaction.commit().await.map_err(|error| {
            AppError::Internal(format!("failed to commit transaction: {error}"))
        })?;

        Ok(CardEntry {
            card: Card::from(card_row),
            task: Task::try_from(task_row)?,
        })
    }
}

async fn lock_card(
    transaction: &mut Transaction<'_, Postgres>,
    workspace_id: WorkspaceId,
    card_id: Uuid,
) -> AppResult<Card> {
    sqlx::query_as::<_, CardRow>(
        r#"
        SELECT cards.id, cards.task_id, cards.project_id, cards.column_id, cards.sprint_id,
            cards.position
        FROM cards
        INNER JOIN projects
            ON projects.id = cards.project_id
        WHERE projects.workspace_id = $1
            AND cards.id = $2
        FOR UPDATE OF cards
        "#,
    )
    .bind(workspace_id.as_uuid())
    .bind(card_id)
    .fetch_optional(&mut **transaction)
    .await
    .map_err(|error| AppError::Internal(format!("failed to lock card: {error}")))?
    .map(Card::from)
    .ok_or_else(|| AppError::NotFound(format!("card '{card_id}' does not exist")))
}

use super::*;

impl PostgresTaskRepository {
    pub(super) async fn list_checklist_items_impl(
        &self,
        workspace_id: WorkspaceId,
        task_id: Uuid,
    ) -> AppResult<Vec<ChecklistItem>> {
        self.require_task(workspace_id, task_id).await?;

        let rows = sqlx::query_as::<_, ChecklistItemRow>(
            r#"
            SELECT id, task_id, content, is_done, position
            FROM checklist_items
            WHERE task_id = $1
            ORDER BY position
            "#,
        )
        .bind(task_id)
        .fetch_all(&self.pool)
        .await
        .map_err(|error| AppError::Internal(format!("failed to list checklist items: {error}")))?;

        decode_rows(rows)
    }

    pub(super) async fn add_checklist_item_impl(
        &self,
        workspace_id: WorkspaceId,
        item: ChecklistItem,
    ) -> AppResult<ChecklistItem> {
        let mut transaction =
            self.pool.begin().await.map_err(|error| {
                AppError::Internal(format!("failed to begin transaction: {error}"))
            })?;

        lock_task(&mut transaction, workspace_id, item.task_id).await?;

        let row = sqlx::query_as::<_, ChecklistItemRow>(
            r#"
            INSERT INTO checklist_items (id, task_id, content, is_done, position)
            SELECT $1, $2, $3, $4, COALESCE(MAX(position) + 1, 0)
            FROM checklist_items
            WHERE task_id = $2
            RETURNING id, task_id, content, is_done, position
            "#,
        )
        .bind(item.item_id)
        .bind(item.task_id)
        .bind(item.content.as_str())
        .bind(item.is_done)
        .fetch_one(&mut *transaction)
        .await
        .map_err(|error| AppError::Internal(format!("failed to add checklist item: {error}")))?;

        transaction.commit().await.map_err(|error| {
            AppError::Internal(format!("failed to commit transaction: {error}"))
        })?;

        ChecklistItem::try_from(row)
    }

    pub(super) async fn find_checklist_item_impl(
        &self,
        workspace_id: WorkspaceId,
        item_id: Uuid,
    ) -> AppResult<Option<ChecklistItem>> {
        sqlx::query_as::<_, ChecklistItemRow>(&format!(
            r#"
            SELECT id, task_id, content, is_done, position
            FROM checklist_items
            WHERE id = $2
                AND task_id IN ({WORKSPACE_TASK_IDS})
            "#
        ))
        .bind(workspace_id.as_uuid())
        .bind(item_id)
        .fetch_optional(&self.pool)
        .await
        .map_err(|error| AppError::Internal(format!("failed to find checklist item: {error}")))?
        .map(ChecklistItem::try_from)
        .transpose()
    }

    pub(super) async fn set_checklist_item_done_impl(
        &self,
        workspace_id: WorkspaceId,
        item_id: Uuid,
        is_done: bool,
    ) -> AppResult<ChecklistItem> {
        let row = sqlx::query_as::<_, ChecklistItemRow>(&format!(
            r#"
            UPDATE checklist_items
            SET is_done = $3
            WHERE id = $2
                AND task_id IN ({WORKSPACE_TASK_IDS})
            RETURNING id, task_id, content, is_done, position
            "#
        ))
        .bind(workspace_id.as_uuid())
        .bind(item_id)
        .bind(is_done)
        .fetch_optional(&self.pool)
        .await
        .map_err(|error| AppError::Internal(format!("failed to update checklist item: {error}")))?
        .ok_or_else(|| AppError::NotFound(format!("checklist item '{item_id}' does not exist")))?;

        ChecklistItem::try_from(row)
    }

    pub(super) async fn remove_checklist_item_impl(
        &self,
        workspace_id: WorkspaceId,
        item_id: Uuid,
    ) -> AppResult<()> {
        let deleted = sqlx::query(&format!(
            r#"
            DELETE FROM checklist_items
            WHERE id = $2
                AND task_id IN ({WORKSPACE_TASK_IDS})
            "#
        ))
        .bind(workspace_id.as_uuid())
        .bind(item_id)
        .execute(&self.pool)
        .await
        .map_err(|error| AppError::Internal(format!("failed to remove checklist item: {error}")))?;

        if deleted.rows_affected() == 0 {
            return Err(AppError::NotFound(format!(
                "checklist item '{item_id}' does not exist"
            )));
        }

        Ok(())
    }
}

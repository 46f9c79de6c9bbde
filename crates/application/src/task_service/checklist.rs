use super::*;

use workhive_domain::ChecklistItem;

impl TaskService {
    /// Appends a checklist item to a task.
    pub async fn add_checklist_item(
        &self,
        actor: &ActorContext,
        task_id: Uuid,
        content: &str,
    ) -> AppResult<ChecklistItem> {
        let workspace_id = self
            .authorization_service
            .require_workspace(actor, Operation::AddChecklistItem)
            .await?;

        let task = self.load_task(workspace_id, task_id).await?;
        let item = self
            .repository
            .add_checklist_item(
                workspace_id,
                ChecklistItem {
                    item_id: Uuid::new_v4(),
                    task_id,
                    content: NonEmptyString::new(content.trim())?,
                    is_done: false,
                    position: 0,
                },
            )
            .await?;

        self.record_task_event(
            workspace_id,
            actor,
            &task,
            ActivityType::TaskAddChecklistItem,
            "added a checklist item to task".to_owned(),
        )
        .await;

        Ok(item)
    }

    /// Marks a checklist item as complete; repeated calls each record an activity.
    pub async fn mark_checklist_item_complete(
        &self,
        actor: &ActorContext,
        item_id: Uuid,
    ) -> AppResult<ChecklistItem> {
        self.set_checklist_item_done(actor, item_id, true).await
    }

    /// Marks a checklist item as incomplete.
    pub async fn mark_checklist_item_incomplete(
        &self,
        actor: &ActorContext,
        item_id: Uuid,
    ) -> AppResult<ChecklistItem> {
        self.set_checklist_item_done(actor, item_id, false).await
    }

    /// Removes a checklist item.
    pub async fn remove_checklist_item(&self, actor: &ActorContext, item_id: Uuid) -> AppResult<()> {
        let workspace_id = self
            .authorization_service
            .require_workspace(actor, Operation::RemoveChecklistItem)
            .await?;

        let (_, task) = self.load_checklist_item(workspace_id, item_id).await?;
        self.repository
            .remove_checklist_item(workspace_id, item_id)
            .await?;

        self.record_task_event(
            workspace_id,
            actor,
            &task,
            ActivityType::TaskRemoveChecklistItem,
            "removed a checklist item from task".to_owned(),
        )
        .await;

        Ok(())
    }

    async fn set_checklist_item_done(
        &self,
        actor: &ActorContext,
        item_id: Uuid,
        is_done: bool,
    ) -> AppResult<ChecklistItem> {
        let (operation, activity_type, description) = if is_done {
            (
                Operation::CheckChecklistItem,
                ActivityType::TaskCheckChecklistItem,
                "marked a checklist item as complete",
            )
        } else {
            (
                Operation::UncheckChecklistItem,
                ActivityType::TaskUncheckChecklistItem,
                "unmarked a checklist item as complete",
            )
        };

        let workspace_id = self
            .authorization_service
            .require_workspace(actor, operation)
            .await?;

        let (_, task) = self.load_checklist_item(workspace_id, item_id).await?;
        let item = self
            .repository
            .set_checklist_item_done(workspace_id, item_id, is_done)
            .await?;

        self.record_task_event(
            workspace_id,
            actor,
            &task,
            activity_type,
            description.to_owned(),
        )
        .await;

        Ok(item)
    }

    async fn load_checklist_item(
        &self,
        workspace_id: WorkspaceId,
        item_id: Uuid,
    ) -> AppResult<(ChecklistItem, Task)> {
        let item = self
            .repository
            .find_checklist_item(workspace_id, item_id)
            .await?
            .ok_or_else(|| {
                AppError::NotFound(format!("checklist item '{item_id}' does not exist"))
            })?;
        let task = self.load_task(workspace_id, item.task_id).await?;

        Ok((item, task))
    }
}

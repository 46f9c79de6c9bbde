use super::*;

use workhive_core::UserId;
use workhive_domain::UserAccount;

impl TaskService {
    /// Sets the task's assignee, replacing any previous one.
    pub async fn assign_task(
        &self,
        actor: &ActorContext,
        task_id: Uuid,
        assignee_id: UserId,
    ) -> AppResult<Task> {
        let workspace_id = self
            .authorization_service
            .require_workspace(actor, Operation::AssignTask)
            .await?;

        self.load_task(workspace_id, task_id).await?;
        let assignee = self.load_active_member(workspace_id, assignee_id).await?;
        let task = self
            .repository
            .set_assignee(workspace_id, task_id, Some(assignee_id), Utc::now())
            .await?;

        self.record_task_event(
            workspace_id,
            actor,
            &task,
            ActivityType::TaskAssignUser,
            format!("assigned task to \"{}\"", assignee.display_name),
        )
        .await;

        Ok(task)
    }

    /// Replaces the current assignee; fails when the task is unassigned.
    pub async fn reassign_task(
        &self,
        actor: &ActorContext,
        task_id: Uuid,
        assignee_id: UserId,
    ) -> AppResult<Task> {
        let workspace_id = self
            .authorization_service
            .require_workspace(actor, Operation::ReassignTask)
            .await?;

        let current = self.load_task(workspace_id, task_id).await?;
        if current.assignee_id.is_none() {
            return Err(AppError::Conflict(format!(
                "task '{}' has no assignee to replace",
                current.key
            )));
        }
        let assignee = self.load_active_member(workspace_id, assignee_id).await?;
        let task = self
            .repository
            .set_assignee(workspace_id, task_id, Some(assignee_id), Utc::now())
            .await?;

        self.record_task_event(
            workspace_id,
            actor,
            &task,
            ActivityType::TaskReassignUser,
            format!("reassigned task to \"{}\"", assignee.display_name),
        )
        .await;

        Ok(task)
    }

    /// Clears the task's assignee.
    pub async fn unassign_task(&self, actor: &ActorContext, task_id: Uuid) -> AppResult<Task> {
        let workspace_id = self
            .authorization_service
            .require_workspace(actor, Operation::UnassignTask)
            .await?;

        let current = self.load_task(workspace_id, task_id).await?;
        let Some(previous_id) = current.assignee_id else {
            return Err(AppError::Conflict(format!(
                "task '{}' has no assignee",
                current.key
            )));
        };
        let previous = self.workspace_repository.find_user(previous_id).await?;
        let task = self
            .repository
            .set_assignee(workspace_id, task_id, None, Utc::now())
            .await?;

        let display_name = previous
            .map(|user| user.display_name.to_string())
            .unwrap_or_else(|| previous_id.to_string());
        self.record_task_event(
            workspace_id,
            actor,
            &task,
            ActivityType::TaskUnassignUser,
            format!("unassigned \"{display_name}\" from task"),
        )
        .await;

        Ok(task)
    }

    async fn load_active_member(
        &self,
        workspace_id: WorkspaceId,
        user_id: UserId,
    ) -> AppResult<UserAccount> {
        let is_active = self
            .workspace_repository
            .find_member(workspace_id, user_id)
            .await?
            .is_some_and(|member| member.status.is_active());
        if !is_active {
            return Err(AppError::Validation(format!(
                "user '{user_id}' is not an active member of the workspace"
            )));
        }

        self.workspace_repository
            .find_user(user_id)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("user '{user_id}' does not exist")))
    }
}

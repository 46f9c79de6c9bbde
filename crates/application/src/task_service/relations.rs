use super::*;

use workhive_domain::TaskDependency;

use crate::NewSubtask;

impl TaskService {
    /// Adds a subtask keyed `<parentKey>-<n>`.
    pub async fn add_subtask(
        &self,
        actor: &ActorContext,
        parent_id: Uuid,
        description: &str,
    ) -> AppResult<Task> {
        let workspace_id = self
            .authorization_service
            .require_workspace(actor, Operation::AddSubtask)
            .await?;

        let parent = self.load_task(workspace_id, parent_id).await?;
        let board = self
            .project_repository
            .find_board(workspace_id, parent.project_id)
            .await?;
        let status_id = board.initial_column()?.status.status_id;

        let subtask = self
            .repository
            .create_subtask(
                workspace_id,
                NewSubtask {
                    task_id: Uuid::new_v4(),
                    parent_id,
                    description: NonEmptyString::new(description.trim())?,
                    reporter_id: actor.user_id(),
                    status_id,
                    created_at: Utc::now(),
                },
            )
            .await?;

        self.record_task_event(
            workspace_id,
            actor,
            &parent,
            ActivityType::TaskCreateSubtask,
            format!("created a new subtask in task {}", parent.key),
        )
        .await;

        Ok(subtask)
    }

    /// Records that `task_id` depends on `depends_on_task_id`.
    pub async fn add_dependency(
        &self,
        actor: &ActorContext,
        task_id: Uuid,
        depends_on_task_id: Uuid,
    ) -> AppResult<TaskDependency> {
        let workspace_id = self
            .authorization_service
            .require_workspace(actor, Operation::AddDependency)
            .await?;

        if task_id == depends_on_task_id {
            return Err(AppError::Validation(
                "a task cannot depend on itself".to_owned(),
            ));
        }

        let task = self.load_task(workspace_id, task_id).await?;
        let depends_on = self.load_task(workspace_id, depends_on_task_id).await?;
        let dependency = self
            .repository
            .add_dependency(
                workspace_id,
                TaskDependency {
                    dependency_id: Uuid::new_v4(),
                    task_id,
                    depends_on_task_id,
                },
                self.policy.reject_dependency_cycles,
            )
            .await?;

        self.record_task_event(
            workspace_id,
            actor,
            &task,
            ActivityType::TaskAddDependency,
            format!("added a dependency on task {}", depends_on.key),
        )
        .await;

        Ok(dependency)
    }

    /// Removes the edge from `task_id` to `depends_on_task_id`.
    pub async fn remove_dependency(
        &self,
        actor: &ActorContext,
        task_id: Uuid,
        depends_on_task_id: Uuid,
    ) -> AppResult<()> {
        let workspace_id = self
            .authorization_service
            .require_workspace(actor, Operation::RemoveDependency)
            .await?;

        let task = self.load_task(workspace_id, task_id).await?;
        let depends_on = self.load_task(workspace_id, depends_on_task_id).await?;
        self.repository
            .remove_dependency(workspace_id, task_id, depends_on_task_id)
            .await?;

        self.record_task_event(
            workspace_id,
            actor,
            &task,
            ActivityType::TaskRemoveDependency,
            format!("removed dependency from task {}", depends_on.key),
        )
        .await;

        Ok(())
    }
}

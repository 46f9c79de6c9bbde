use std::sync::Arc;

use chrono::Utc;
use uuid::Uuid;
use workhive_core::{ActorContext, AppError, AppResult, NonEmptyString, WorkspaceId};
use workhive_domain::{ActivityType, Operation, SprintState, Task, TaskUpdate, normalize_labels};

use crate::{
    ActivityEvent, ActivityRecorder, AuthorizationService, CreateTaskInput, CreatedTask, NewTask,
    ProjectRepository, TaskDetails, TaskRepository, WorkflowPolicy, WorkspaceRepository,
};

mod assignment;
mod checklist;
mod relations;
mod summary;

/// Task lifecycle manager.
///
/// Every mutation is authorized first and records an activity after it succeeds.
#[derive(Clone)]
pub struct TaskService {
    authorization_service: AuthorizationService,
    repository: Arc<dyn TaskRepository>,
    project_repository: Arc<dyn ProjectRepository>,
    workspace_repository: Arc<dyn WorkspaceRepository>,
    activity_recorder: ActivityRecorder,
    policy: WorkflowPolicy,
}

impl TaskService {
    /// Creates a task service.
    #[must_use]
    pub fn new(
        authorization_service: AuthorizationService,
        repository: Arc<dyn TaskRepository>,
        project_repository: Arc<dyn ProjectRepository>,
        workspace_repository: Arc<dyn WorkspaceRepository>,
        activity_recorder: ActivityRecorder,
        policy: WorkflowPolicy,
    ) -> Self {
        Self {
            authorization_service,
            repository,
            project_repository,
            workspace_repository,
            activity_recorder,
            policy,
        }
    }

    /// Creates a task and its card in the board's initial column.
    pub async fn create_task(
        &self,
        actor: &ActorContext,
        input: CreateTaskInput,
    ) -> AppResult<CreatedTask> {
        let workspace_id = self
            .authorization_service
            .require_workspace(actor, Operation::CreateTask)
            .await?;

        let project = self
            .project_repository
            .find_project(workspace_id, input.project_id)
            .await?
            .ok_or_else(|| {
                AppError::NotFound(format!("project '{}' does not exist", input.project_id))
            })?;
        let board = self
            .project_repository
            .find_board(workspace_id, project.project_id)
            .await?;
        let initial_column = board.initial_column()?;

        if let Some(sprint_id) = input.sprint_id {
            let sprint = self
                .project_repository
                .find_sprint(workspace_id, sprint_id)
                .await?
                .filter(|sprint| sprint.project_id == project.project_id)
                .ok_or_else(|| {
                    AppError::NotFound(format!("sprint '{sprint_id}' does not exist in project"))
                })?;
            if sprint.state == SprintState::Completed {
                return Err(AppError::Conflict(format!(
                    "sprint '{sprint_id}' is already completed"
                )));
            }
        }

        let created = self
            .repository
            .create_task(
                workspace_id,
                NewTask {
                    task_id: Uuid::new_v4(),
                    card_id: Uuid::new_v4(),
                    project_id: project.project_id,
                    description: NonEmptyString::new(input.description.trim())?,
                    priority: input.priority.unwrap_or_default(),
                    due_date: input.due_date,
                    labels: normalize_labels(input.labels),
                    reporter_id: actor.user_id(),
                    sprint_id: input.sprint_id,
                    column_id: initial_column.column_id,
                    status_id: initial_column.status.status_id,
                    created_at: Utc::now(),
                },
            )
            .await?;

        self.record_task_event(
            workspace_id,
            actor,
            &created.task,
            ActivityType::TaskCreated,
            "created a new task".to_owned(),
        )
        .await;

        Ok(created)
    }

    /// Returns a task with its card, subtasks, dependencies and checklist.
    pub async fn get_task(&self, actor: &ActorContext, task_id: Uuid) -> AppResult<TaskDetails> {
        let workspace_id = self
            .authorization_service
            .require_workspace(actor, Operation::ReadTasks)
            .await?;

        let task = self.load_task(workspace_id, task_id).await?;
        let card = self
            .repository
            .find_card_for_task(workspace_id, task_id)
            .await?;
        let subtasks = self.repository.list_subtasks(workspace_id, task_id).await?;
        let dependencies = self
            .repository
            .list_dependencies(workspace_id, task_id)
            .await?;
        let checklist = self
            .repository
            .list_checklist_items(workspace_id, task_id)
            .await?;

        Ok(TaskDetails {
            task,
            card,
            subtasks,
            dependencies,
            checklist,
        })
    }

    /// Lists tasks of a project.
    pub async fn list_tasks(&self, actor: &ActorContext, project_id: Uuid) -> AppResult<Vec<Task>> {
        let workspace_id = self
            .authorization_service
            .require_workspace(actor, Operation::ReadTasks)
            .await?;

        if self
            .project_repository
            .find_project(workspace_id, project_id)
            .await?
            .is_none()
        {
            return Err(AppError::NotFound(format!(
                "project '{project_id}' does not exist"
            )));
        }

        self.repository.list_tasks(workspace_id, project_id).await
    }

    /// Applies description, priority, due date and label changes.
    pub async fn update_task(
        &self,
        actor: &ActorContext,
        task_id: Uuid,
        update: TaskUpdate,
    ) -> AppResult<Task> {
        let workspace_id = self
            .authorization_service
            .require_workspace(actor, Operation::UpdateTask)
            .await?;

        let mut task = self.load_task(workspace_id, task_id).await?;
        update.apply_to(&mut task, Utc::now())?;
        let task = self.repository.save_task(workspace_id, task).await?;

        self.record_task_event(
            workspace_id,
            actor,
            &task,
            ActivityType::TaskUpdated,
            "updated the task".to_owned(),
        )
        .await;

        Ok(task)
    }

    /// Deletes a task with its card, subtasks and relations.
    pub async fn delete_task(&self, actor: &ActorContext, task_id: Uuid) -> AppResult<()> {
        let workspace_id = self
            .authorization_service
            .require_workspace(actor, Operation::DeleteTask)
            .await?;

        let task = self.load_task(workspace_id, task_id).await?;
        self.repository.delete_task(workspace_id, task_id).await?;

        self.activity_recorder
            .record(
                ActivityEvent::new(
                    workspace_id,
                    actor.user_id(),
                    ActivityType::TaskDeleted,
                    format!("deleted the task {}", task.key),
                )
                .with_project(task.project_id),
            )
            .await;

        Ok(())
    }

    async fn load_task(&self, workspace_id: WorkspaceId, task_id: Uuid) -> AppResult<Task> {
        self.repository
            .find_task(workspace_id, task_id)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("task '{task_id}' does not exist")))
    }

    async fn record_task_event(
        &self,
        workspace_id: WorkspaceId,
        actor: &ActorContext,
        task: &Task,
        activity_type: ActivityType,
        description: String,
    ) {
        self.activity_recorder
            .record(
                ActivityEvent::new(workspace_id, actor.user_id(), activity_type, description)
                    .with_project(task.project_id)
                    .with_task(task.task_id),
            )
            .await;
    }
}


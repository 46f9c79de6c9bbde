use async_trait::async_trait;
use chrono::{DateTime, Utc};
use uuid::Uuid;
use workhive_core::{AppResult, NonEmptyString, UserId, WorkspaceId};
use workhive_domain::{
    Activity, Card, ChecklistItem, StatusTaskCount, Task, TaskCountSummary, TaskDependency,
    TaskPriority,
};

/// Input payload for creating tasks.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CreateTaskInput {
    /// Owning project.
    pub project_id: Uuid,
    /// Task description.
    pub description: String,
    /// Priority; defaults to Medium.
    pub priority: Option<TaskPriority>,
    /// Optional due date.
    pub due_date: Option<DateTime<Utc>>,
    /// Labels.
    pub labels: Vec<String>,
    /// Sprint to plan the card into; `None` keeps it in the backlog.
    pub sprint_id: Option<Uuid>,
}

/// Task and card rows written by `createTask`; the store generates the key.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewTask {
    /// Task identifier.
    pub task_id: Uuid,
    /// Card identifier.
    pub card_id: Uuid,
    /// Owning project.
    pub project_id: Uuid,
    /// Validated description.
    pub description: NonEmptyString,
    /// Priority.
    pub priority: TaskPriority,
    /// Optional due date.
    pub due_date: Option<DateTime<Utc>>,
    /// Normalized labels.
    pub labels: Vec<String>,
    /// Reporting user.
    pub reporter_id: UserId,
    /// Optional sprint of the card.
    pub sprint_id: Option<Uuid>,
    /// Initial column of the project's board.
    pub column_id: Uuid,
    /// Status of the initial column.
    pub status_id: Uuid,
    /// Creation instant.
    pub created_at: DateTime<Utc>,
}

/// Subtask row; the store derives the key from the parent's.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewSubtask {
    /// Subtask identifier.
    pub task_id: Uuid,
    /// Parent task.
    pub parent_id: Uuid,
    /// Validated description.
    pub description: NonEmptyString,
    /// Reporting user.
    pub reporter_id: UserId,
    /// Status of the board's initial column.
    pub status_id: Uuid,
    /// Creation instant.
    pub created_at: DateTime<Utc>,
}

/// Result of `createTask`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CreatedTask {
    /// Stored task with its generated key.
    pub task: Task,
    /// Board placement.
    pub card: Card,
}

/// Task with its relations.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TaskDetails {
    /// Task record.
    pub task: Task,
    /// Board placement; subtasks have none.
    pub card: Option<Card>,
    /// Child tasks.
    pub subtasks: Vec<Task>,
    /// Outgoing dependency edges.
    pub dependencies: Vec<TaskDependency>,
    /// Checklist by position.
    pub checklist: Vec<ChecklistItem>,
}

/// Derived project summary.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProjectSummary {
    /// Counts over the rolling window.
    pub counts: TaskCountSummary,
    /// Per-status counts, zero counts included.
    pub statuses: Vec<StatusTaskCount>,
    /// Most recent project activities, newest first.
    pub recent_activities: Vec<Activity>,
}

/// Repository port for tasks and their relations.
#[async_trait]
pub trait TaskRepository: Send + Sync {
    /// Creates a task and its card, drawing the key from the project's sequence.
    ///
    /// Concurrent calls on one project never receive the same key.
    async fn create_task(&self, workspace_id: WorkspaceId, task: NewTask) -> AppResult<CreatedTask>;

    /// Creates a subtask, drawing the key from the parent's sequence.
    async fn create_subtask(&self, workspace_id: WorkspaceId, subtask: NewSubtask) -> AppResult<Task>;

    /// Returns one task.
    async fn find_task(&self, workspace_id: WorkspaceId, task_id: Uuid) -> AppResult<Option<Task>>;

    /// Lists every task of a project, subtasks included.
    async fn list_tasks(&self, workspace_id: WorkspaceId, project_id: Uuid) -> AppResult<Vec<Task>>;

    /// Lists child tasks of a task.
    async fn list_subtasks(&self, workspace_id: WorkspaceId, parent_id: Uuid)
    -> AppResult<Vec<Task>>;

    /// Returns the card of a task.
    async fn find_card_for_task(
        &self,
        workspace_id: WorkspaceId,
        task_id: Uuid,
    ) -> AppResult<Option<Card>>;

    /// Persists editable task fields.
    async fn save_task(&self, workspace_id: WorkspaceId, task: Task) -> AppResult<Task>;

    /// Deletes a task with its card, subtasks, edges and checklist.
    async fn delete_task(&self, workspace_id: WorkspaceId, task_id: Uuid) -> AppResult<()>;

    /// Replaces the single assignee slot.
    async fn set_assignee(
        &self,
        workspace_id: WorkspaceId,
        task_id: Uuid,
        assignee_id: Option<UserId>,
        updated_at: DateTime<Utc>,
    ) -> AppResult<Task>;

    /// Lists outgoing dependency edges of a task.
    async fn list_dependencies(
        &self,
        workspace_id: WorkspaceId,
        task_id: Uuid,
    ) -> AppResult<Vec<TaskDependency>>;

    /// Adds an edge after duplicate and, optionally, cycle checks in one transaction.
    async fn add_dependency(
        &self,
        workspace_id: WorkspaceId,
        dependency: TaskDependency,
        reject_cycles: bool,
    ) -> AppResult<TaskDependency>;

    /// Removes an edge.
    async fn remove_dependency(
        &self,
        workspace_id: WorkspaceId,
        task_id: Uuid,
        depends_on_task_id: Uuid,
    ) -> AppResult<()>;

    /// Lists checklist items of a task by position.
    async fn list_checklist_items(
        &self,
        workspace_id: WorkspaceId,
        task_id: Uuid,
    ) -> AppResult<Vec<ChecklistItem>>;

    /// Appends a checklist item; the store assigns the position.
    async fn add_checklist_item(
        &self,
        workspace_id: WorkspaceId,
        item: ChecklistItem,
    ) -> AppResult<ChecklistItem>;

    /// Returns one checklist item.
    async fn find_checklist_item(
        &self,
        workspace_id: WorkspaceId,
        item_id: Uuid,
    ) -> AppResult<Option<ChecklistItem>>;

    /// Sets a checklist item's completion flag.
    async fn set_checklist_item_done(
        &self,
        workspace_id: WorkspaceId,
        item_id: Uuid,
        is_done: bool,
    ) -> AppResult<ChecklistItem>;

    /// Removes a checklist item.
    async fn remove_checklist_item(&self, workspace_id: WorkspaceId, item_id: Uuid)
    -> AppResult<()>;
}

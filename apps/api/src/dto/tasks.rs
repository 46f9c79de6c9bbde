use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use ts_rs::TS;
use uuid::Uuid;
use workhive_application::{CreatedTask, ProjectSummary, TaskDetails};
use workhive_core::AppResult;
use workhive_domain::{Activity, ChecklistItem, Task, TaskDependency, TaskPriority, TaskUpdate};

use super::common::patch_field;
use super::projects::CardResponse;

/// Incoming payload for task creation.
#[derive(Debug, Deserialize, TS)]
#[ts(
    export,
    export_to = "../../../../packages/api-types/src/generated/create-task-request.ts"
)]
pub struct CreateTaskRequest {
    pub description: String,
    pub priority: Option<String>,
    #[ts(type = "string | null")]
    pub due_date: Option<DateTime<Utc>>,
    #[serde(default)]
    pub labels: Vec<String>,
    #[ts(type = "string | null")]
    pub sprint_id: Option<Uuid>,
}

/// Incoming payload for task edits. Explicit `null` clears the due date.
#[derive(Debug, Default, Deserialize, TS)]
#[ts(
    export,
    export_to = "../../../../packages/api-types/src/generated/update-task-request.ts"
)]
pub struct UpdateTaskRequest {
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub priority: Option<String>,
    #[serde(default, deserialize_with = "patch_field")]
    #[ts(type = "string | null")]
    pub due_date: Option<Option<DateTime<Utc>>>,
    #[serde(default)]
    pub labels: Option<Vec<String>>,
}

impl UpdateTaskRequest {
    pub fn into_update(self) -> AppResult<TaskUpdate> {
        Ok(TaskUpdate {
            description: self.description,
            priority: parse_priority(self.priority)?,
            due_date: self.due_date,
            labels: self.labels,
        })
    }
}

pub fn parse_priority(value: Option<String>) -> AppResult<Option<TaskPriority>> {
    value
        .map(|value| value.trim().to_ascii_uppercase().parse::<TaskPriority>())
        .transpose()
}

/// Incoming payload for subtask creation.
#[derive(Debug, Deserialize, TS)]
#[ts(
    export,
    export_to = "../../../../packages/api-types/src/generated/add-subtask-request.ts"
)]
pub struct AddSubtaskRequest {
    pub description: String,
}

/// Incoming payload for a new dependency edge.
#[derive(Debug, Deserialize, TS)]
#[ts(
    export,
    export_to = "../../../../packages/api-types/src/generated/add-dependency-request.ts"
)]
pub struct AddDependencyRequest {
    #[ts(type = "string")]
    pub depends_on_task_id: Uuid,
}

/// Incoming payload for assignment and reassignment.
#[derive(Debug, Deserialize, TS)]
#[ts(
    export,
    export_to = "../../../../packages/api-types/src/generated/assign-task-request.ts"
)]
pub struct AssignTaskRequest {
    #[ts(type = "string")]
    pub user_id: Uuid,
}

/// Incoming payload for a new checklist item.
#[derive(Debug, Deserialize, TS)]
#[ts(
    export,
    export_to = "../../../../packages/api-types/src/generated/add-checklist-item-request.ts"
)]
pub struct AddChecklistItemRequest {
    pub content: String,
}

/// Incoming payload toggling a checklist item.
#[derive(Debug, Deserialize, TS)]
#[ts(
    export,
    export_to = "../../../../packages/api-types/src/generated/set-checklist-item-done-request.ts"
)]
pub struct SetChecklistItemDoneRequest {
    pub is_done: bool,
}

/// API representation of a task.
#[derive(Debug, Serialize, TS)]
#[ts(
    export,
    export_to = "../../../../packages/api-types/src/generated/task-response.ts"
)]
pub struct TaskResponse {
    pub task_id: String,
    pub project_id: String,
    pub key: String,
    pub description: String,
    pub priority: String,
    pub due_date: Option<String>,
    pub labels: Vec<String>,
    pub reporter_id: String,
    pub assignee_id: Option<String>,
    pub parent_id: Option<String>,
    pub status_id: String,
    pub created_at: String,
    pub updated_at: String,
    pub completed_at: Option<String>,
}

impl From<Task> for TaskResponse {
    fn from(value: Task) -> Self {
        Self {
            task_id: value.task_id.to_string(),
            project_id: value.project_id.to_string(),
            key: value.key.to_string(),
            description: value.description.to_string(),
            priority: value.priority.as_str().to_owned(),
            due_date: value.due_date.map(|date| date.to_rfc3339()),
            labels: value.labels,
            reporter_id: value.reporter_id.to_string(),
            assignee_id: value.assignee_id.map(|user_id| user_id.to_string()),
            parent_id: value.parent_id.map(|task_id| task_id.to_string()),
            status_id: value.status_id.to_string(),
            created_at: value.created_at.to_rfc3339(),
            updated_at: value.updated_at.to_rfc3339(),
            completed_at: value.completed_at.map(|date| date.to_rfc3339()),
        }
    }
}

/// Newly created task and its board card.
#[derive(Debug, Serialize, TS)]
#[ts(
    export,
    export_to = "../../../../packages/api-types/src/generated/created-task-response.ts"
)]
pub struct CreatedTaskResponse {
    pub task: TaskResponse,
    pub card: CardResponse,
}

impl From<CreatedTask> for CreatedTaskResponse {
    fn from(value: CreatedTask) -> Self {
        Self {
            task: TaskResponse::from(value.task),
            card: CardResponse::from(value.card),
        }
    }
}

/// API representation of a dependency edge.
#[derive(Debug, Serialize, TS)]
#[ts(
    export,
    export_to = "../../../../packages/api-types/src/generated/dependency-response.ts"
)]
pub struct DependencyResponse {
    pub dependency_id: String,
    pub task_id: String,
    pub depends_on_task_id: String,
}

impl From<TaskDependency> for DependencyResponse {
    fn from(value: TaskDependency) -> Self {
        Self {
            dependency_id: value.dependency_id.to_string(),
            task_id: value.task_id.to_string(),
            depends_on_task_id: value.depends_on_task_id.to_string(),
        }
    }
}

/// API representation of a checklist item.
#[derive(Debug, Serialize, TS)]
#[ts(
    export,
    export_to = "../../../../packages/api-types/src/generated/checklist-item-response.ts"
)]
pub struct ChecklistItemResponse {
    pub item_id: String,
    pub task_id: String,
    pub content: String,
    pub is_done: bool,
    pub position: i32,
}

impl From<ChecklistItem> for ChecklistItemResponse {
    fn from(value: ChecklistItem) -> Self {
        Self {
            item_id: value.item_id.to_string(),
            task_id: value.task_id.to_string(),
            content: value.content.to_string(),
            is_done: value.is_done,
            position: value.position,
        }
    }
}

/// Task with its card, subtasks, dependencies and checklist.
#[derive(Debug, Serialize, TS)]
#[ts(
    export,
    export_to = "../../../../packages/api-types/src/generated/task-details-response.ts"
)]
pub struct TaskDetailsResponse {
    pub task: TaskResponse,
    pub card: Option<CardResponse>,
    pub subtasks: Vec<TaskResponse>,
    pub dependencies: Vec<DependencyResponse>,
    pub checklist: Vec<ChecklistItemResponse>,
}

impl From<TaskDetails> for TaskDetailsResponse {
    fn from(value: TaskDetails) -> Self {
        Self {
            task: TaskResponse::from(value.task),
            card: value.card.map(CardResponse::from),
            subtasks: value.subtasks.into_iter().map(TaskResponse::from).collect(),
            dependencies: value
                .dependencies
                .into_iter()
                .map(DependencyResponse::from)
                .collect(),
            checklist: value
                .checklist
                .into_iter()
                .map(ChecklistItemResponse::from)
                .collect(),
        }
    }
}

/// API representation of an activity record.
#[derive(Debug, Serialize, TS)]
#[ts(
    export,
    export_to = "../../../../packages/api-types/src/generated/activity-response.ts"
)]
pub struct ActivityResponse {
    pub activity_id: String,
    pub activity_type: String,
    pub description: String,
    pub actor_id: String,
    pub project_id: Option<String>,
    pub task_id: Option<String>,
    pub created_at: String,
}

impl From<Activity> for ActivityResponse {
    fn from(value: Activity) -> Self {
        Self {
            activity_id: value.activity_id.to_string(),
            activity_type: value.activity_type.as_str().to_owned(),
            description: value.description,
            actor_id: value.actor_id.to_string(),
            project_id: value.project_id.map(|project_id| project_id.to_string()),
            task_id: value.task_id.map(|task_id| task_id.to_string()),
            created_at: value.created_at.to_rfc3339(),
        }
    }
}

/// Per-status task count.
#[derive(Debug, Serialize, TS)]
#[ts(
    export,
    export_to = "../../../../packages/api-types/src/generated/status-count-response.ts"
)]
pub struct StatusCountResponse {
    pub status_id: String,
    pub status_name: String,
    pub task_count: i64,
}

/// Seven-day project summary.
#[derive(Debug, Serialize, TS)]
#[ts(
    export,
    export_to = "../../../../packages/api-types/src/generated/project-summary-response.ts"
)]
pub struct ProjectSummaryResponse {
    pub completed: i64,
    pub due: i64,
    pub overdue: i64,
    pub created: i64,
    pub updated: i64,
    pub statuses: Vec<StatusCountResponse>,
    pub recent_activities: Vec<ActivityResponse>,
}

impl From<ProjectSummary> for ProjectSummaryResponse {
    fn from(value: ProjectSummary) -> Self {
        Self {
            completed: value.counts.completed,
            due: value.counts.due,
            overdue: value.counts.overdue,
            created: value.counts.created,
            updated: value.counts.updated,
            statuses: value
                .statuses
                .into_iter()
                .map(|status| StatusCountResponse {
                    status_id: status.status_id.to_string(),
                    status_name: status.status_name,
                    task_count: status.task_count,
                })
                .collect(),
            recent_activities: value
                .recent_activities
                .into_iter()
                .map(ActivityResponse::from)
                .collect(),
        }
    }
}

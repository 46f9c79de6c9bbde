//! Domain entities and invariants.

#![forbid(unsafe_code)]

mod activity;
mod board;
mod operation;
mod project;
mod security;
mod summary;
mod task;
mod workspace;

pub use activity::{Activity, ActivityType};
pub use board::{
    Board, BoardColumn, CANONICAL_COLUMNS, Card, Sprint, SprintState, Status,
    validate_sprint_schedule,
};
pub use operation::Operation;
pub use project::{Project, project_key_prefix, validate_project_name};
pub use security::{
    Permission, PermissionAction, PermissionGrant, PermissionRequirement, ResourceType,
    default_permission_grants,
};
pub use summary::{
    SUMMARY_ACTIVITY_LIMIT, SUMMARY_WINDOW_DAYS, StatusTaskCount, SummaryWindow, TaskCountSummary,
    count_tasks_by_status, summarize_tasks,
};
pub use task::{
    ChecklistItem, Task, TaskDependency, TaskKey, TaskPriority, TaskUpdate,
    creates_dependency_cycle, normalize_labels,
};
pub use workspace::{
    DEFAULT_ROLE_NAME, MembershipStatus, Role, Stream, StreamMember, SubscriptionTier, Team,
    TeamMember, UserAccount, Workspace, WorkspaceMember,
};

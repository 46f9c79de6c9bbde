//! Application services and ports.

#![forbid(unsafe_code)]

mod activity_ports;
mod authorization_service;
mod permission_service;
mod project_ports;
mod project_service;
mod role_service;
mod security_ports;
mod task_ports;
mod task_service;
mod workflow_policy;
mod workspace_ports;
mod workspace_service;

pub use activity_ports::{ActivityEvent, ActivityRecorder, ActivityRepository};
pub use authorization_service::{
    Access, AuthorizationRepository, AuthorizationService, MemberAccess,
};
pub use permission_service::PermissionService;
pub use project_ports::{
    BacklogView, BoardColumnView, BoardView, CardColumnMove, CardEntry, CreateProjectInput,
    CreateSprintInput, ProjectProvisioning, ProjectRepository, SprintPlan, SprintTransition,
    UpdateProjectInput, UpdateSprintInput,
};
pub use project_service::ProjectService;
pub use role_service::{RoleService, seed_default_permissions};
pub use security_ports::{PermissionRepository, RoleDefinition, RoleRepository};
pub use task_ports::{
    CreateTaskInput, CreatedTask, NewSubtask, NewTask, ProjectSummary, TaskDetails,
    TaskRepository,
};
pub use task_service::TaskService;
pub use workflow_policy::WorkflowPolicy;
pub use workspace_ports::{
    MemberListing, StreamDetails, StreamRepository, TeamDetails, WorkspaceProvisioning,
    WorkspaceRepository,
};
pub use workspace_service::WorkspaceService;

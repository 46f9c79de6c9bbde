use workhive_application::{
    PermissionService, ProjectService, RoleService, TaskService, WorkspaceService,
};

/// Shared application state.
#[derive(Clone)]
pub struct AppState {
    pub workspace_service: WorkspaceService,
    pub project_service: ProjectService,
    pub task_service: TaskService,
    pub role_service: RoleService,
    pub permission_service: PermissionService,
    pub frontend_url: String,
    pub bootstrap_token: String,
}

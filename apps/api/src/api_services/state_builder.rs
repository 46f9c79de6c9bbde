use std::sync::Arc;

use sqlx::PgPool;
use workhive_application::{
    ActivityRecorder, AuthorizationService, PermissionService, ProjectService, RoleService,
    TaskService, WorkspaceService,
};
use workhive_infrastructure::{
    PostgresActivityRepository, PostgresAuthorizationRepository, PostgresProjectRepository,
    PostgresRoleRepository, PostgresTaskRepository, PostgresWorkspaceRepository,
};

use crate::api_config::ApiConfig;
use crate::state::AppState;

pub fn build_app_state(pool: PgPool, config: &ApiConfig) -> AppState {
    let workspace_repository = Arc::new(PostgresWorkspaceRepository::new(pool.clone()));
    let project_repository = Arc::new(PostgresProjectRepository::new(pool.clone()));
    let task_repository = Arc::new(PostgresTaskRepository::new(pool.clone()));
    let role_repository = Arc::new(PostgresRoleRepository::new(pool.clone()));

    let authorization_service =
        AuthorizationService::new(Arc::new(PostgresAuthorizationRepository::new(pool.clone())));
    let activity_recorder = ActivityRecorder::new(Arc::new(PostgresActivityRepository::new(pool)));
    let policy = config.workflow_policy;

    AppState {
        workspace_service: WorkspaceService::new(
            authorization_service.clone(),
            workspace_repository.clone(),
            workspace_repository.clone(),
            activity_recorder.clone(),
        ),
        project_service: ProjectService::new(
            authorization_service.clone(),
            project_repository.clone(),
            workspace_repository.clone(),
            activity_recorder.clone(),
            policy,
        ),
        task_service: TaskService::new(
            authorization_service.clone(),
            task_repository,
            project_repository,
            workspace_repository,
            activity_recorder.clone(),
            policy,
        ),
        role_service: RoleService::new(
            authorization_service.clone(),
            role_repository.clone(),
            activity_recorder.clone(),
        ),
        permission_service: PermissionService::new(
            authorization_service,
            role_repository,
            activity_recorder,
        ),
        frontend_url: config.frontend_url.clone(),
        bootstrap_token: config.bootstrap_token.clone(),
    }
}

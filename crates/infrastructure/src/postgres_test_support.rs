use std::sync::Arc;

use sqlx::PgPool;
use sqlx::migrate::Migrator;
use sqlx::postgres::PgPoolOptions;
use uuid::Uuid;
use workhive_application::{
    ActivityRecorder, AuthorizationService, CreateProjectInput, CreateTaskInput,
    PermissionService, ProjectService, RoleService, TaskService, WorkflowPolicy,
    WorkspaceService,
};
use workhive_core::{ActorContext, UserId, UserIdentity, WorkspaceId};
use workhive_domain::Project;

use crate::{
    PostgresActivityRepository, PostgresAuthorizationRepository, PostgresProjectRepository,
    PostgresRoleRepository, PostgresTaskRepository, PostgresWorkspaceRepository,
};

static MIGRATOR: Migrator = sqlx::migrate!("./migrations");

pub(crate) async fn test_pool() -> Option<PgPool> {
    let Ok(database_url) = std::env::var("DATABASE_URL") else {
        return None;
    };

    let pool = match PgPoolOptions::new()
        .max_connections(4)
        .connect(database_url.as_str())
        .await
    {
        Ok(pool) => pool,
        Err(error) => panic!("failed to connect to DATABASE_URL in test: {error}"),
    };

    if let Err(error) = MIGRATOR.run(&pool).await {
        panic!("failed to run migrations for postgres repository tests: {error}");
    }

    Some(pool)
}

/// Services wired over the PostgreSQL adapters.
pub(crate) struct Services {
    pub workspaces: WorkspaceService,
    pub projects: ProjectService,
    pub tasks: TaskService,
    pub roles: RoleService,
    pub permissions: PermissionService,
}

pub(crate) fn services(pool: PgPool) -> Services {
    let workspace_repository = Arc::new(PostgresWorkspaceRepository::new(pool.clone()));
    let project_repository = Arc::new(PostgresProjectRepository::new(pool.clone()));
    let task_repository = Arc::new(PostgresTaskRepository::new(pool.clone()));
    let role_repository = Arc::new(PostgresRoleRepository::new(pool.clone()));
    let authorization_service = AuthorizationService::new(Arc::new(
        PostgresAuthorizationRepository::new(pool.clone()),
    ));
    let activity_recorder =
        ActivityRecorder::new(Arc::new(PostgresActivityRepository::new(pool.clone())));
    let policy = WorkflowPolicy::default();

    Services {
        workspaces: WorkspaceService::new(
            authorization_service.clone(),
            workspace_repository.clone(),
            workspace_repository,
            activity_recorder.clone(),
        ),
        projects: ProjectService::new(
            authorization_service.clone(),
            project_repository.clone(),
            Arc::new(PostgresWorkspaceRepository::new(pool.clone())),
            activity_recorder.clone(),
            policy,
        ),
        tasks: TaskService::new(
            authorization_service.clone(),
            task_repository,
            project_repository,
            Arc::new(PostgresWorkspaceRepository::new(pool.clone())),
            activity_recorder.clone(),
            policy,
        ),
        roles: RoleService::new(
            authorization_service.clone(),
            role_repository.clone(),
            activity_recorder.clone(),
        ),
        permissions: PermissionService::new(authorization_service, role_repository, activity_recorder),
    }
}

pub(crate) struct Seeded {
    pub owner: ActorContext,
    pub workspace_id: WorkspaceId,
    pub project: Project,
}

pub(crate) async fn register(services: &Services, name: &str) -> ActorContext {
    let identity = UserIdentity::new(UserId::new(), name, None);
    let registered = services.workspaces.register_user(&identity).await;
    assert!(registered.is_ok());

    ActorContext::new(identity, None)
}

/// Creates an owner, a workspace, a stream and a project named `project_name`.
pub(crate) async fn seed(services: &Services, project_name: &str) -> Seeded {
    let owner = register(services, "Ada").await;
    let workspace = services
        .workspaces
        .create_workspace(&owner, "Acme")
        .await
        .unwrap_or_else(|_| unreachable!());
    let workspace_id = workspace.workspace_id();
    let owner = owner.in_workspace(workspace_id);

    let stream = services
        .workspaces
        .create_stream(&owner, "Product")
        .await
        .unwrap_or_else(|_| unreachable!());
    let project = services
        .projects
        .create_project(
            &owner,
            CreateProjectInput {
                stream_id: stream.stream_id,
                name: project_name.to_owned(),
                description: None,
                team_id: None,
            },
        )
        .await
        .unwrap_or_else(|_| unreachable!());

    Seeded {
        owner,
        workspace_id,
        project,
    }
}

pub(crate) fn task_input(project_id: Uuid, description: &str) -> CreateTaskInput {
    CreateTaskInput {
        project_id,
        description: description.to_owned(),
        priority: None,
        due_date: None,
        labels: Vec::new(),
        sprint_id: None,
    }
}

pub(crate) async fn join_as_member(
    services: &Services,
    seeded: &Seeded,
    name: &str,
) -> ActorContext {
    let member = register(services, name).await;
    let invited = services
        .workspaces
        .invite_member(&seeded.owner, member.user_id())
        .await;
    assert!(invited.is_ok());
    let accepted = services
        .workspaces
        .accept_invite(&member, seeded.workspace_id)
        .await;
    assert!(accepted.is_ok());

    member.in_workspace(seeded.workspace_id)
}

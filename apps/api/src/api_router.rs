use axum::Router;
use axum::middleware::{from_fn, from_fn_with_state};
use axum::routing::{delete, get, patch, post, put};
use tower_http::trace::TraceLayer;
use tower_sessions::SessionManagerLayer;
use tower_sessions_sqlx_store::PostgresStore;
use workhive_core::AppError;

use crate::state::AppState;
use crate::{auth, handlers, middleware};

mod cors;

use cors::build_cors_layer;

pub fn build_router(
    app_state: AppState,
    frontend_url: &str,
    session_layer: SessionManagerLayer<PostgresStore>,
) -> Result<Router, AppError> {
    Ok(Router::new()
        .route("/health", get(handlers::health::health_handler))
        .route("/auth/bootstrap", post(auth::bootstrap_handler))
        .route("/auth/logout", post(auth::logout_handler))
        .merge(protected_routes())
        .route_layer(from_fn_with_state(
            app_state.clone(),
            middleware::require_same_origin_for_mutations,
        ))
        .layer(TraceLayer::new_for_http())
        .layer(build_cors_layer(frontend_url)?)
        .layer(session_layer)
        .with_state(app_state))
}

fn protected_routes() -> Router<AppState> {
    Router::new()
        .route("/auth/me", get(auth::me_handler))
        .merge(workspace_routes())
        .merge(security_routes())
        .merge(project_routes())
        .merge(task_routes())
        .route_layer(from_fn(middleware::require_auth))
}

fn workspace_routes() -> Router<AppState> {
    Router::new()
        .route(
            "/api/workspaces",
            get(handlers::workspaces::my_workspaces_handler)
                .post(handlers::workspaces::create_workspace_handler),
        )
        .route(
            "/api/workspace",
            put(handlers::workspaces::update_workspace_handler)
                .delete(handlers::workspaces::delete_workspace_handler),
        )
        .route(
            "/api/workspace/members",
            get(handlers::workspaces::list_members_handler)
                .post(handlers::workspaces::invite_member_handler),
        )
        .route(
            "/api/workspace/members/{user_id}",
            delete(handlers::workspaces::remove_member_handler),
        )
        .route(
            "/api/workspace/members/{user_id}/role",
            put(handlers::workspaces::change_member_role_handler),
        )
        .route(
            "/api/workspaces/{workspace_id}/accept",
            post(handlers::workspaces::accept_invite_handler),
        )
        .route(
            "/api/streams",
            get(handlers::workspaces::list_streams_handler)
                .post(handlers::workspaces::create_stream_handler),
        )
        .route(
            "/api/streams/{stream_id}",
            get(handlers::workspaces::get_stream_handler)
                .delete(handlers::workspaces::delete_stream_handler),
        )
        .route(
            "/api/streams/{stream_id}/members",
            get(handlers::workspaces::list_stream_members_handler)
                .post(handlers::workspaces::add_stream_members_handler),
        )
        .route(
            "/api/streams/{stream_id}/members/{user_id}",
            delete(handlers::workspaces::remove_stream_member_handler),
        )
        .route(
            "/api/teams",
            get(handlers::workspaces::list_teams_handler)
                .post(handlers::workspaces::create_team_handler),
        )
        .route(
            "/api/teams/{team_id}",
            get(handlers::workspaces::get_team_handler)
                .delete(handlers::workspaces::delete_team_handler),
        )
        .route(
            "/api/teams/{team_id}/members",
            post(handlers::workspaces::add_team_member_handler),
        )
        .route(
            "/api/teams/{team_id}/members/{user_id}",
            delete(handlers::workspaces::remove_team_member_handler),
        )
}

fn security_routes() -> Router<AppState> {
    Router::new()
        .route(
            "/api/roles",
            get(handlers::security::list_roles_handler)
                .post(handlers::security::create_role_handler),
        )
        .route(
            "/api/roles/{role_id}",
            get(handlers::security::get_role_handler)
                .put(handlers::security::update_role_handler)
                .delete(handlers::security::delete_role_handler),
        )
        .route(
            "/api/roles/{role_id}/permissions",
            get(handlers::security::get_permissions_handler)
                .post(handlers::security::create_permission_handler),
        )
        .route(
            "/api/permissions/{permission_id}",
            put(handlers::security::update_permission_handler),
        )
}

fn project_routes() -> Router<AppState> {
    Router::new()
        .route(
            "/api/streams/{stream_id}/projects",
            get(handlers::projects::list_projects_handler),
        )
        .route(
            "/api/projects",
            post(handlers::projects::create_project_handler),
        )
        .route(
            "/api/projects/{project_id}",
            get(handlers::projects::get_project_handler)
                .put(handlers::projects::update_project_handler)
                .delete(handlers::projects::delete_project_handler),
        )
        .route(
            "/api/projects/{project_id}/team",
            put(handlers::projects::assign_project_team_handler),
        )
        .route(
            "/api/projects/{project_id}/board",
            get(handlers::projects::get_board_handler),
        )
        .route(
            "/api/projects/{project_id}/backlog",
            get(handlers::projects::get_backlog_handler),
        )
        .route(
            "/api/projects/{project_id}/summary",
            get(handlers::tasks::get_summary_handler),
        )
        .route(
            "/api/projects/{project_id}/sprints",
            get(handlers::sprints::list_sprints_handler)
                .post(handlers::sprints::create_sprint_handler),
        )
        .route(
            "/api/sprints/{sprint_id}",
            put(handlers::sprints::update_sprint_handler)
                .delete(handlers::sprints::delete_sprint_handler),
        )
        .route(
            "/api/sprints/{sprint_id}/start",
            post(handlers::sprints::start_sprint_handler),
        )
        .route(
            "/api/sprints/{sprint_id}/complete",
            post(handlers::sprints::complete_sprint_handler),
        )
        .route(
            "/api/cards/{card_id}/sprint",
            put(handlers::sprints::move_card_to_sprint_handler)
                .delete(handlers::sprints::move_card_to_backlog_handler),
        )
        .route(
            "/api/cards/{card_id}/column",
            put(handlers::sprints::move_card_to_column_handler),
        )
}

fn task_routes() -> Router<AppState> {
    Router::new()
        .route(
            "/api/projects/{project_id}/tasks",
            get(handlers::tasks::list_tasks_handler).post(handlers::tasks::create_task_handler),
        )
        .route(
            "/api/tasks/{task_id}",
            get(handlers::tasks::get_task_handler)
                .patch(handlers::tasks::update_task_handler)
                .delete(handlers::tasks::delete_task_handler),
        )
        .route(
            "/api/tasks/{task_id}/subtasks",
            post(handlers::tasks::add_subtask_handler),
        )
        .route(
            "/api/tasks/{task_id}/dependencies",
            post(handlers::tasks::add_dependency_handler),
        )
        .route(
            "/api/tasks/{task_id}/dependencies/{depends_on_task_id}",
            delete(handlers::tasks::remove_dependency_handler),
        )
        .route(
            "/api/tasks/{task_id}/assignee",
            post(handlers::tasks::assign_task_handler)
                .put(handlers::tasks::reassign_task_handler)
                .delete(handlers::tasks::unassign_task_handler),
        )
        .route(
            "/api/tasks/{task_id}/checklist",
            post(handlers::tasks::add_checklist_item_handler),
        )
        .route(
            "/api/checklist/{item_id}",
            patch(handlers::tasks::set_checklist_item_done_handler)
                .delete(handlers::tasks::remove_checklist_item_handler),
        )
}

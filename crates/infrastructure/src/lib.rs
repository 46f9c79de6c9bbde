//! Infrastructure adapters for application ports.

#![forbid(unsafe_code)]

mod in_memory_store;
mod postgres_activity_repository;
mod postgres_authorization_repository;
mod postgres_project_repository;
mod postgres_role_repository;
mod postgres_rows;
mod postgres_task_repository;
mod postgres_workspace_repository;

#[cfg(test)]
mod postgres_test_support;

pub use in_memory_store::InMemoryStore;
pub use postgres_activity_repository::PostgresActivityRepository;
pub use postgres_authorization_repository::PostgresAuthorizationRepository;
pub use postgres_project_repository::PostgresProjectRepository;
pub use postgres_role_repository::PostgresRoleRepository;
pub use postgres_task_repository::PostgresTaskRepository;
pub use postgres_workspace_repository::PostgresWorkspaceRepository;

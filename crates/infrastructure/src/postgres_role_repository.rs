use async_trait::async_trait;
use sqlx::PgPool;
use uuid::Uuid;

use workhive_application::{RoleDefinition, RoleRepository};
use workhive_core::{AppError, AppResult, NonEmptyString, WorkspaceId};
use workhive_domain::{Permission, Role};

use crate::postgres_rows::{PermissionRow, RoleRow, decode_rows, is_unique_violation};
use crate::postgres_workspace_repository::insert_permissions;

mod permissions;

/// PostgreSQL-backed repository for workspace roles and their permission rows.
#[derive(Clone)]
pub struct PostgresRoleRepository {
    pool: PgPool,
}

impl PostgresRoleRepository {
    /// Creates a repository with the provided connection pool.
    #[must_use]
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    async fn role_permissions(&self, role_id: Uuid) -> AppResult<Vec<Permission>> {
        let rows = sqlx::query_as::<_, PermissionRow>(
            r#"
            SELECT id, role_id, resource_type, action, value
            FROM permissions
            WHERE role_id = $1
            ORDER BY resource_type, action
            "#,
        )
        .bind(role_id)
        .fetch_all(&self.pool)
        .await
        .map_err(|error| AppError::Internal(format!("failed to list permissions: {error}")))?;

        decode_rows(rows)
    }
}

fn map_role_conflict(error: sqlx::Error, role_name: &str) -> AppError {
    if is_unique_violation(&error) {
        return AppError::Conflict(format!("role '{role_name}' already exists"));
    }

    AppError::Internal(format!("failed to save role: {error}"))
}

#[async_trait]
impl RoleRepository for PostgresRoleRepository {
    async fn list_roles(&self, workspace_id: WorkspaceId) -> AppResult<Vec<Role>> {
        let rows = sqlx::query_as::<_, RoleRow>(
            r#"
            SELECT id, workspace_id, name
            FROM roles
            WHERE workspace_id = $1
            ORDER BY name
            "#,
        )
        .bind(workspace_id.as_uuid())
        .fetch_all(&self.pool)
        .await
        .map_err(|error| AppError::Internal(format!("failed to list roles: {error}")))?;

        decode_rows(rows)
    }

    async fn find_role(
        &self,
        workspace_id: WorkspaceId,
        role_id: Uuid,
    ) -> AppResult<Option<RoleDefinition>> {
        let Some(row) = sqlx::query_as::<_, RoleRow>(
            r#"
            SELECT id, workspace_id, name
            FROM roles
            WHERE workspace_id = $1
                AND id = $2
            "#,
        )
        .bind(workspace_id.as_uuid())
        .bind(role_id)
        .fetch_optional(&self.pool)
        .await
        .map_err(|error| AppError::Internal(format!("failed to find role: {error}")))?
        else {
            return Ok(None);
        };

        Ok(Some(RoleDefinition {
            role: Role::try_from(row)?,
            permissions: self.role_permissions(role_id).await?,
        }))
    }

    async fn create_role(
        &self,
        role: Role,
        permissions: Vec<Permission>,
    ) -> AppResult<RoleDefinition> {
        let mut transaction =
            self.pool.begin().await.map_err(|error| {
                AppError::Internal(format!("failed to begin transaction: {error}"))
            })?;

        sqlx::query(
            r#"
            INSERT INTO roles (id, workspace_id, name)
            VALUES ($1, $2, $3)
            "#,
        )
        .bind(role.role_id)
        .bind(role.workspace_id.as_uuid())
        .bind(role.name.as_str())
        .execute(&mut *transaction)
        .await
        .map_err(|error| map_role_conflict(error, role.name.as_str()))?;

        insert_permissions(&mut transaction, &permissions).await?;

        transaction.commit().await.map_err(|error| {
            AppError::Internal(format!("failed to commit transaction: {error}"))
        })?;

        Ok(RoleDefinition { role, permissions })
    }

    async fn rename_role(
        &self,
        workspace_id: WorkspaceId,
        role_id: Uuid,
        name: NonEmptyString,
    ) -> AppResult<Role> {
        let row = sqlx::query_as::<_, RoleRow>(
            r#"
            UPDATE roles
            SET name = $3
            WHERE workspace_id = $1
                AND id = $2
            RETURNING id, workspace_id, name
            "#,
        )
        .bind(workspace_id.as_uuid())
        .bind(role_id)
        .bind(name.as_str())
        .fetch_optional(&self.pool)
        .await
        .map_err(|error| map_role_conflict(error, name.as_str()))?
        .ok_or_else(|| AppError::NotFound(format!("role '{role_id}' does not exist")))?;

        Role::try_from(row)
    }

    async fn delete_role(&self, workspace_id: WorkspaceId, role_id: Uuid) -> AppResult<()> {
        let mut transaction =
            self.pool.begin().await.map_err(|error| {
                AppError::Internal(format!("failed to begin transaction: {error}"))
            })?;

        let role_exists = sqlx::query_scalar::<_, Uuid>(
            r#"
            SELECT id
            FROM roles
            WHERE workspace_id = $1
                AND id = $2
            FOR UPDATE
            "#,
        )
        .bind(workspace_id.as_uuid())
        .bind(role_id)
        .fetch_optional(&mut *transaction)
        .await
        .map_err(|error| AppError::Internal(format!("failed to lock role: {error}")))?
        .is_some();
        if !role_exists {
            return Err(AppError::NotFound(format!("role '{role_id}' does not exist")));
        }

        let in_use = sqlx::query_scalar::<_, bool>(
            r#"
            SELECT EXISTS (
                SELECT 1 FROM workspaces WHERE id = $1 AND default_role_id = $2
            ) OR EXISTS (
                SELECT 1 FROM workspace_members WHERE role_id = $2
            )
            "#,
        )
        .bind(workspace_id.as_uuid())
        .bind(role_id)
        .fetch_one(&mut *transaction)
        .await
        .map_err(|error| AppError::Internal(format!("failed to check role usage: {error}")))?;
        if in_use {
            return Err(AppError::Conflict(format!(
                "role '{role_id}' is the default role or still assigned to members"
            )));
        }

        sqlx::query(
            r#"
            DELETE FROM roles
            WHERE id = $1
            "#,
        )
        .bind(role_id)
        .execute(&mut *transaction)
        .await
        .map_err(|error| AppError::Internal(format!("failed to delete role: {error}")))?;

        transaction.commit().await.map_err(|error| {
            AppError::Internal(format!("failed to commit transaction: {error}"))
        })?;

        Ok(())
    }
}

use async_trait::async_trait;

use workhive_application::{AuthorizationRepository, MemberAccess};
use workhive_core::{AppError, AppResult, UserId, WorkspaceId};
use workhive_domain::{Permission, WorkspaceMember};

use sqlx::{FromRow, PgPool};
use uuid::Uuid;

use crate::postgres_rows::{MemberRow, PermissionRow, decode_rows};

/// PostgreSQL-backed repository for membership and permission lookups.
#[derive(Clone)]
pub struct PostgresAuthorizationRepository {
    pool: PgPool,
}

impl PostgresAuthorizationRepository {
    /// Creates a repository with the provided connection pool.
    #[must_use]
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[derive(Debug, FromRow)]
struct MemberPermissionRow {
    member_id: Uuid,
    workspace_id: Uuid,
    user_id: Uuid,
    role_id: Uuid,
    status: String,
    joined_at: chrono::DateTime<chrono::Utc>,
    permission_id: Option<Uuid>,
    resource_type: Option<String>,
    action: Option<String>,
    value: Option<bool>,
}

#[async_trait]
impl AuthorizationRepository for PostgresAuthorizationRepository {
    async fn find_default_workspace(&self, user_id: UserId) -> AppResult<Option<WorkspaceId>> {
        let workspace_id = sqlx::query_scalar::<_, Option<Uuid>>(
            r#"
            SELECT default_workspace_id
            FROM users
            WHERE id = $1
            "#,
        )
        .bind(user_id.as_uuid())
        .fetch_optional(&self.pool)
        .await
        .map_err(|error| {
            AppError::Internal(format!("failed to resolve default workspace: {error}"))
        })?;

        Ok(workspace_id.flatten().map(WorkspaceId::from_uuid))
    }

    async fn find_member_access(
        &self,
        workspace_id: WorkspaceId,
        user_id: UserId,
    ) -> AppResult<Option<MemberAccess>> {
        let rows = sqlx::query_as::<_, MemberPermissionRow>(
            r#"
            SELECT
                members.id AS member_id,
                members.workspace_id,
                members.user_id,
                members.role_id,
                members.status,
                members.joined_at,
                permissions.id AS permission_id,
                permissions.resource_type,
                permissions.action,
                permissions.value
            FROM workspace_members AS members
            LEFT JOIN permissions
                ON permissions.role_id = members.role_id
            WHERE members.workspace_id = $1
                AND members.user_id = $2
            "#,
        )
        .bind(workspace_id.as_uuid())
        .bind(user_id.as_uuid())
        .fetch_all(&self.pool)
        .await
        .map_err(|error| AppError::Internal(format!("failed to load member access: {error}")))?;

        let Some(first) = rows.first() else {
            return Ok(None);
        };
        let member = WorkspaceMember::try_from(MemberRow {
            id: first.member_id,
            workspace_id: first.workspace_id,
            user_id: first.user_id,
            role_id: first.role_id,
            status: first.status.clone(),
            joined_at: first.joined_at,
        })?;

        let permission_rows = rows
            .into_iter()
            .filter_map(|row| {
                Some(PermissionRow {
                    id: row.permission_id?,
                    role_id: row.role_id,
                    resource_type: row.resource_type?,
                    action: row.action?,
                    value: row.value?,
                })
            })
            .collect();
        let permissions: Vec<Permission> = decode_rows(permission_rows)?;

        Ok(Some(MemberAccess {
            member,
            permissions,
        }))
    }
}

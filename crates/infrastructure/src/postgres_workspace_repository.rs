use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::{FromRow, PgPool, Postgres, Transaction};
use uuid::Uuid;

use workhive_application::{MemberListing, WorkspaceProvisioning, WorkspaceRepository};
use workhive_core::{AppError, AppResult, UserId, WorkspaceId};
use workhive_domain::{
    MembershipStatus, Permission, SubscriptionTier, UserAccount, Workspace, WorkspaceMember,
};

use crate::postgres_rows::{MemberRow, UserRow, decode_rows, is_unique_violation};

mod streams;

/// PostgreSQL-backed repository for users, workspaces, memberships, streams and teams.
#[derive(Clone)]
pub struct PostgresWorkspaceRepository {
    pool: PgPool,
}

impl PostgresWorkspaceRepository {
    /// Creates a repository with the provided connection pool.
    #[must_use]
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[derive(Debug, FromRow)]
struct WorkspaceRow {
    id: Uuid,
    name: String,
    owner_id: Uuid,
    default_role_id: Option<Uuid>,
    invite_link: Uuid,
    subscription_tier: String,
    created_at: DateTime<Utc>,
}

impl TryFrom<WorkspaceRow> for Workspace {
    type Error = AppError;

    fn try_from(row: WorkspaceRow) -> AppResult<Self> {
        let tier = row
            .subscription_tier
            .parse::<SubscriptionTier>()
            .map_err(|error| AppError::Internal(format!("invalid stored tier: {error}")))?;
        let workspace = Workspace::new(
            WorkspaceId::from_uuid(row.id),
            row.name,
            UserId::from_uuid(row.owner_id),
            row.invite_link,
            tier,
            row.created_at,
        )
        .map_err(|error| {
            AppError::Internal(format!("invalid stored workspace '{}': {error}", row.id))
        })?;

        Ok(match row.default_role_id {
            Some(role_id) => workspace.with_default_role(role_id),
            None => workspace,
        })
    }
}

#[derive(Debug, FromRow)]
struct MemberListingRow {
    #[sqlx(flatten)]
    member: MemberRow,
    display_name: String,
    email: Option<String>,
    default_workspace_id: Option<Uuid>,
}

pub(crate) async fn insert_permissions(
    transaction: &mut Transaction<'_, Postgres>,
    permissions: &[Permission],
) -> AppResult<()> {
    for permission in permissions {
        sqlx::query(
            r#"
            INSERT INTO permissions (id, role_id, resource_type, action, value)
            VALUES ($1, $2, $3, $4, $5)
            "#,
        )
        .bind(permission.permission_id())
        .bind(permission.role_id())
        .bind(permission.resource_type().as_str())
        .bind(permission.action().as_str())
        .bind(permission.value())
        .execute(&mut **transaction)
        .await
        .map_err(|error| {
            if is_unique_violation(&error) {
                return AppError::Conflict(format!(
                    "permission '{}' on '{}' already exists for role",
                    permission.action(),
                    permission.resource_type()
                ));
            }

            AppError::Internal(format!("failed to insert permission: {error}"))
        })?;
    }

    Ok(())
}

#[async_trait]
impl WorkspaceRepository for PostgresWorkspaceRepository {
    async fn save_user(&self, user: UserAccount) -> AppResult<UserAccount> {
        let row = sqlx::query_as::<_, UserRow>(
            r#"
            INSERT INTO users (id, display_name, email)
            VALUES ($1, $2, $3)
            ON CONFLICT (id) DO UPDATE
            SET display_name = EXCLUDED.display_name,
                email = EXCLUDED.email
            RETURNING id, display_name, email, default_workspace_id
            "#,
        )
        .bind(user.user_id.as_uuid())
        .bind(user.display_name.as_str())
        .bind(user.email.as_deref())
        .fetch_one(&self.pool)
        .await
        .map_err(|error| AppError::Internal(format!("failed to save user: {error}")))?;

        UserAccount::try_from(row)
    }

    async fn find_user(&self, user_id: UserId) -> AppResult<Option<UserAccount>> {
        sqlx::query_as::<_, UserRow>(
            r#"
            SELECT id, display_name, email, default_workspace_id
            FROM users
            WHERE id = $1
            "#,
        )
        .bind(user_id.as_uuid())
        .fetch_optional(&self.pool)
        .await
        .map_err(|error| AppError::Internal(format!("failed to find user: {error}")))?
        .map(UserAccount::try_from)
        .transpose()
    }

    async fn create_workspace(&self, provisioning: WorkspaceProvisioning) -> AppResult<Workspace> {
        let WorkspaceProvisioning {
            workspace,
            role,
            permissions,
            owner_membership,
        } = provisioning;

        let mut transaction =
            self.pool.begin().await.map_err(|error| {
                AppError::Internal(format!("failed to begin transaction: {error}"))
            })?;

        sqlx::query(
            r#"
            INSERT INTO workspaces (id, name, owner_id, invite_link, subscription_tier, created_at)
            VALUES ($1, $2, $3, $4, $5, $6)
            "#,
        )
        .bind(workspace.workspace_id().as_uuid())
        .bind(workspace.name().as_str())
        .bind(workspace.owner_id().as_uuid())
        .bind(workspace.invite_link())
        .bind(workspace.subscription_tier().as_str())
        .bind(workspace.created_at())
        .execute(&mut *transaction)
        .await
        .map_err(|error| AppError::Internal(format!("failed to create workspace: {error}")))?;

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
        .map_err(|error| AppError::Internal(format!("failed to create default role: {error}")))?;

        insert_permissions(&mut transaction, &permissions).await?;

        sqlx::query(
            r#"
            UPDATE workspaces
            SET default_role_id = $2
            WHERE id = $1
            "#,
        )
        .bind(workspace.workspace_id().as_uuid())
        .bind(workspace.default_role_id())
        .execute(&mut *transaction)
        .await
        .map_err(|error| AppError::Internal(format!("failed to set default role: {error}")))?;

        sqlx::query(
            r#"
            INSERT INTO workspace_members (id, workspace_id, user_id, role_id, status, joined_at)
            VALUES ($1, $2, $3, $4, $5, $6)
            "#,
        )
        .bind(owner_membership.member_id)
        .bind(owner_membership.workspace_id.as_uuid())
        .bind(owner_membership.user_id.as_uuid())
        .bind(owner_membership.role_id)
        .bind(owner_membership.status.as_str())
        .bind(owner_membership.joined_at)
        .execute(&mut *transaction)
        .await
        .map_err(|error| {
            AppError::Internal(format!("failed to create owner membership: {error}"))
        })?;

        sqlx::query(
            r#"
            UPDATE users
            SET default_workspace_id = $2
            WHERE id = $1
                AND default_workspace_id IS NULL
            "#,
        )
        .bind(workspace.owner_id().as_uuid())
        .bind(workspace.workspace_id().as_uuid())
        .execute(&mut *transaction)
        .await
        .map_err(|error| {
            AppError::Internal(format!("failed to set default workspace: {error}"))
        })?;

        transaction.commit().await.map_err(|error| {
            AppError::Internal(format!("failed to commit transaction: {error}"))
        })?;

        Ok(workspace)
    }

    async fn find_workspace(&self, workspace_id: WorkspaceId) -> AppResult<Option<Workspace>> {
        sqlx::query_as::<_, WorkspaceRow>(
            r#"
            SELECT id, name, owner_id, default_role_id, invite_link, subscription_tier, created_at
            FROM workspaces
            WHERE id = $1
            "#,
        )
        .bind(workspace_id.as_uuid())
        .fetch_optional(&self.pool)
        .await
        .map_err(|error| AppError::Internal(format!("failed to find workspace: {error}")))?
        .map(Workspace::try_from)
        .transpose()
    }

    async fn list_workspaces_for_user(&self, user_id: UserId) -> AppResult<Vec<Workspace>> {
        let rows = sqlx::query_as::<_, WorkspaceRow>(
            r#"
            SELECT
                workspaces.id,
                workspaces.name,
                workspaces.owner_id,
                workspaces.default_role_id,
                workspaces.invite_link,
                workspaces.subscription_tier,
                workspaces.created_at
            FROM workspaces
            INNER JOIN workspace_members AS members
                ON members.workspace_id = workspaces.id
            WHERE members.user_id = $1
                AND members.status = 'ACTIVE'
            ORDER BY workspaces.created_at
            "#,
        )
        .bind(user_id.as_uuid())
        .fetch_all(&self.pool)
        .await
        .map_err(|error| AppError::Internal(format!("failed to list workspaces: {error}")))?;

        decode_rows(rows)
    }

    async fn save_workspace(&self, workspace: Workspace) -> AppResult<Workspace> {
        let updated = sqlx::query(
            r#"
            UPDATE workspaces
            SET name = $2,
                default_role_id = $3,
                subscription_tier = $4
            WHERE id = $1
            "#,
        )
        .bind(workspace.workspace_id().as_uuid())
        .bind(workspace.name().as_str())
        .bind(workspace.default_role_id())
        .bind(workspace.subscription_tier().as_str())
        .execute(&self.pool)
        .await
        .map_err(|error| AppError::Internal(format!("failed to save workspace: {error}")))?;

        if updated.rows_affected() == 0 {
            return Err(AppError::NotFound(format!(
                "workspace '{}' does not exist",
                workspace.workspace_id()
            )));
        }

        Ok(workspace)
    }

    async fn delete_workspace(&self, workspace_id: WorkspaceId) -> AppResult<()> {
        let deleted = sqlx::query(
            r#"
            DELETE FROM workspaces
            WHERE id = $1
            "#,
        )
        .bind(workspace_id.as_uuid())
        .execute(&self.pool)
        .await
        .map_err(|error| AppError::Internal(format!("failed to delete workspace: {error}")))?;

        if deleted.rows_affected() == 0 {
            return Err(AppError::NotFound(format!(
                "workspace '{workspace_id}' does not exist"
            )));
        }

        Ok(())
    }

    async fn find_member(
        &self,
        workspace_id: WorkspaceId,
        user_id: UserId,
    ) -> AppResult<Option<WorkspaceMember>> {
        sqlx::query_as::<_, MemberRow>(
            r#"
            SELECT id, workspace_id, user_id, role_id, status, joined_at
            FROM workspace_members
            WHERE workspace_id = $1
                AND user_id = $2
            "#,
        )
        .bind(workspace_id.as_uuid())
        .bind(user_id.as_uuid())
        .fetch_optional(&self.pool)
        .await
        .map_err(|error| AppError::Internal(format!("failed to find member: {error}")))?
        .map(WorkspaceMember::try_from)
        .transpose()
    }

    async fn list_members(&self, workspace_id: WorkspaceId) -> AppResult<Vec<MemberListing>> {
        let rows = sqlx::query_as::<_, MemberListingRow>(
            r#"
            SELECT
                members.id,
                members.workspace_id,
                members.user_id,
                members.role_id,
                members.status,
                members.joined_at,
                users.display_name,
                users.email,
                users.default_workspace_id
            FROM workspace_members AS members
            INNER JOIN users
                ON users.id = members.user_id
            WHERE members.workspace_id = $1
            ORDER BY members.joined_at
            "#,
        )
        .bind(workspace_id.as_uuid())
        .fetch_all(&self.pool)
        .await
        .map_err(|error| AppError::Internal(format!("failed to list members: {error}")))?;

        rows.into_iter()
            .map(|row| {
                let user = UserAccount::try_from(UserRow {
                    id: row.member.user_id,
                    display_name: row.display_name,
                    email: row.email,
                    default_workspace_id: row.default_workspace_id,
                })?;
                Ok(MemberListing {
                    member: WorkspaceMember::try_from(row.member)?,
                    user,
                })
            })
            .collect()
    }

    async fn invite_member(&self, member: WorkspaceMember) -> AppResult<WorkspaceMember> {
        let row = sqlx::query_as::<_, MemberRow>(
            r#"
            INSERT INTO workspace_members (id, workspace_id, user_id, role_id, status, joined_at)
            VALUES ($1, $2, $3, $4, $5, $6)
            ON CONFLICT (workspace_id, user_id) DO UPDATE
            SET status = EXCLUDED.status,
                role_id = EXCLUDED.role_id,
                joined_at = EXCLUDED.joined_at
            WHERE workspace_members.status = 'INACTIVE'
            RETURNING id, workspace_id, user_id, role_id, status, joined_at
            "#,
        )
        .bind(member.member_id)
        .bind(member.workspace_id.as_uuid())
        .bind(member.user_id.as_uuid())
        .bind(member.role_id)
        .bind(MembershipStatus::Pending.as_str())
        .bind(member.joined_at)
        .fetch_optional(&self.pool)
        .await
        .map_err(|error| AppError::Internal(format!("failed to invite member: {error}")))?
        .ok_or_else(|| {
            AppError::Conflict(format!(
                "user '{}' is already invited to or a member of workspace '{}'",
                member.user_id, member.workspace_id
            ))
        })?;

        WorkspaceMember::try_from(row)
    }

    async fn activate_member(
        &self,
        workspace_id: WorkspaceId,
        user_id: UserId,
    ) -> AppResult<WorkspaceMember> {
        let mut transaction =
            self.pool.begin().await.map_err(|error| {
                AppError::Internal(format!("failed to begin transaction: {error}"))
            })?;

        let current = sqlx::query_scalar::<_, String>(
            r#"
            SELECT status
            FROM workspace_members
            WHERE workspace_id = $1
                AND user_id = $2
            FOR UPDATE
            "#,
        )
        .bind(workspace_id.as_uuid())
        .bind(user_id.as_uuid())
        .fetch_optional(&mut *transaction)
        .await
        .map_err(|error| AppError::Internal(format!("failed to lock membership: {error}")))?
        .ok_or_else(|| {
            AppError::NotFound(format!(
                "no pending invitation for user '{user_id}' in workspace '{workspace_id}'"
            ))
        })?;
        if current != MembershipStatus::Pending.as_str() {
            return Err(AppError::Conflict(format!(
                "membership is {current}, not PENDING"
            )));
        }

        let row = sqlx::query_as::<_, MemberRow>(
            r#"
            UPDATE workspace_members
            SET status = 'ACTIVE',
                joined_at = now()
            WHERE workspace_id = $1
                AND user_id = $2
            RETURNING id, workspace_id, user_id, role_id, status, joined_at
            "#,
        )
        .bind(workspace_id.as_uuid())
        .bind(user_id.as_uuid())
        .fetch_one(&mut *transaction)
        .await
        .map_err(|error| AppError::Internal(format!("failed to activate member: {error}")))?;

        sqlx::query(
            r#"
            UPDATE users
            SET default_workspace_id = $2
            WHERE id = $1
                AND default_workspace_id IS NULL
            "#,
        )
        .bind(user_id.as_uuid())
        .bind(workspace_id.as_uuid())
        .execute(&mut *transaction)
        .await
        .map_err(|error| {
            AppError::Internal(format!("failed to set default workspace: {error}"))
        })?;

        transaction.commit().await.map_err(|error| {
            AppError::Internal(format!("failed to commit transaction: {error}"))
        })?;

        WorkspaceMember::try_from(row)
    }

    async fn update_member_status(
        &self,
        workspace_id: WorkspaceId,
        user_id: UserId,
        status: MembershipStatus,
    ) -> AppResult<WorkspaceMember> {
        let row = sqlx::query_as::<_, MemberRow>(
            r#"
            UPDATE workspace_members
            SET status = $3
            WHERE workspace_id = $1
                AND user_id = $2
            RETURNING id, workspace_id, user_id, role_id, status, joined_at
            "#,
        )
        .bind(workspace_id.as_uuid())
        .bind(user_id.as_uuid())
        .bind(status.as_str())
        .fetch_optional(&self.pool)
        .await
        .map_err(|error| AppError::Internal(format!("failed to update member status: {error}")))?
        .ok_or_else(|| {
            AppError::NotFound(format!(
                "user '{user_id}' is not a member of workspace '{workspace_id}'"
            ))
        })?;

        WorkspaceMember::try_from(row)
    }

    async fn update_member_role(
        &self,
        workspace_id: WorkspaceId,
        user_id: UserId,
        role_id: Uuid,
    ) -> AppResult<WorkspaceMember> {
        let row = sqlx::query_as::<_, MemberRow>(
            r#"
            UPDATE workspace_members AS members
            SET role_id = roles.id
            FROM roles
            WHERE members.workspace_id = $1
                AND members.user_id = $2
                AND roles.id = $3
                AND roles.workspace_id = members.workspace_id
            RETURNING
                members.id,
                members.workspace_id,
                members.user_id,
                members.role_id,
                members.status,
                members.joined_at
            "#,
        )
        .bind(workspace_id.as_uuid())
        .bind(user_id.as_uuid())
        .bind(role_id)
        .fetch_optional(&self.pool)
        .await
        .map_err(|error| AppError::Internal(format!("failed to update member role: {error}")))?
        .ok_or_else(|| {
            AppError::NotFound(format!(
                "member '{user_id}' or role '{role_id}' does not exist in workspace '{workspace_id}'"
            ))
        })?;

        WorkspaceMember::try_from(row)
    }
}

#[cfg(test)]
mod tests;

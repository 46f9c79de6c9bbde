use workhive_application::PermissionRepository;

use super::*;

#[async_trait]
impl PermissionRepository for PostgresRoleRepository {
    async fn list_permissions(
        &self,
        workspace_id: WorkspaceId,
        role_id: Uuid,
    ) -> AppResult<Vec<Permission>> {
        if self.find_role(workspace_id, role_id).await?.is_none() {
            return Err(AppError::NotFound(format!("role '{role_id}' does not exist")));
        }

        self.role_permissions(role_id).await
    }

    async fn create_permission(
        &self,
        workspace_id: WorkspaceId,
        permission: Permission,
    ) -> AppResult<Permission> {
        let row = sqlx::query_as::<_, PermissionRow>(
            r#"
            INSERT INTO permissions (id, role_id, resource_type, action, value)
            SELECT $1, roles.id, $4, $5, $6
            FROM roles
            WHERE roles.workspace_id = $2
                AND roles.id = $3
            RETURNING id, role_id, resource_type, action, value
            "#,
        )
        .bind(permission.permission_id())
        .bind(workspace_id.as_uuid())
        .bind(permission.role_id())
        .bind(permission.resource_type().as_str())
        .bind(permission.action().as_str())
        .bind(permission.value())
        .fetch_optional(&self.pool)
        .await
        .map_err(|error| {
            if is_unique_violation(&error) {
                return AppError::Conflict(format!(
                    "permission '{}' on '{}' already exists for role",
                    permission.action(),
                    permission.resource_type()
                ));
            }

            AppError::Internal(format!("failed to create permission: {error}"))
        })?
        .ok_or_else(|| {
            AppError::NotFound(format!("role '{}' does not exist", permission.role_id()))
        })?;

        Permission::try_from(row)
    }

    async fn update_permission(
        &self,
        workspace_id: WorkspaceId,
        permission_id: Uuid,
        value: bool,
    ) -> AppResult<Permission> {
        let row = sqlx::query_as::<_, PermissionRow>(
            r#"
            UPDATE permissions
            SET value = $3
            FROM roles
            WHERE permissions.id = $2
                AND roles.id = permissions.role_id
                AND roles.workspace_id = $1
            RETURNING
                permissions.id,
                permissions.role_id,
                permissions.resource_type,
                permissions.action,
                permissions.value
            "#,
        )
        .bind(workspace_id.as_uuid())
        .bind(permission_id)
        .bind(value)
        .fetch_optional(&self.pool)
        .await
        .map_err(|error| AppError::Internal(format!("failed to update permission: {error}")))?
        .ok_or_else(|| {
            AppError::NotFound(format!("permission '{permission_id}' does not exist"))
        })?;

        Permission::try_from(row)
    }
}

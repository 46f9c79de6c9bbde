use std::sync::Arc;

use async_trait::async_trait;
use chrono::Utc;
use tokio::sync::Mutex;
use uuid::Uuid;
use workhive_core::{
    ActorContext, AppError, AppResult, NonEmptyString, UserId, UserIdentity, WorkspaceId,
};
use workhive_domain::{
    Activity, ActivityType, MembershipStatus, Permission, PermissionAction, PermissionGrant,
    ResourceType, Role, WorkspaceMember, default_permission_grants,
};

use crate::{
    ActivityRecorder, ActivityRepository, AuthorizationRepository, AuthorizationService,
    MemberAccess, RoleDefinition, RoleRepository,
};

use super::RoleService;

struct FakeAuthorizationRepository {
    access: MemberAccess,
}

#[async_trait]
impl AuthorizationRepository for FakeAuthorizationRepository {
    async fn find_default_workspace(&self, _user_id: UserId) -> AppResult<Option<WorkspaceId>> {
        Ok(Some(self.access.member.workspace_id))
    }

    async fn find_member_access(
        &self,
        workspace_id: WorkspaceId,
        user_id: UserId,
    ) -> AppResult<Option<MemberAccess>> {
        Ok((self.access.member.workspace_id == workspace_id
            && self.access.member.user_id == user_id)
            .then(|| self.access.clone()))
    }
}

#[derive(Default)]
struct FakeRoleRepository {
    roles: Mutex<Vec<RoleDefinition>>,
}

#[async_trait]
impl RoleRepository for FakeRoleRepository {
    async fn list_roles(&self, workspace_id: WorkspaceId) -> AppResult<Vec<Role>> {
        Ok(self
            .roles
            .lock()
            .await
            .iter()
            .filter(|definition| definition.role.workspace_id == workspace_id)
            .map(|definition| definition.role.clone())
            .collect())
    }

    async fn find_role(
        &self,
        workspace_id: WorkspaceId,
        role_id: Uuid,
    ) -> AppResult<Option<RoleDefinition>> {
        Ok(self
            .roles
            .lock()
            .await
            .iter()
            .find(|definition| {
                definition.role.workspace_id == workspace_id && definition.role.role_id == role_id
            })
            .cloned())
    }

    async fn create_role(
        &self,
        role: Role,
        permissions: Vec<Permission>,
    ) -> AppResult<RoleDefinition> {
        let definition = RoleDefinition { role, permissions };
        self.roles.lock().await.push(definition.clone());
        Ok(definition)
    }

    async fn rename_role(
        &self,
        workspace_id: WorkspaceId,
        role_id: Uuid,
        name: NonEmptyString,
    ) -> AppResult<Role> {
        let mut roles = self.roles.lock().await;
        let definition = roles
            .iter_mut()
            .find(|definition| {
                definition.role.workspace_id == workspace_id && definition.role.role_id == role_id
            })
            .ok_or_else(|| AppError::NotFound(format!("role '{role_id}' does not exist")))?;
        definition.role.name = name;
        Ok(definition.role.clone())
    }

    async fn delete_role(&self, workspace_id: WorkspaceId, role_id: Uuid) -> AppResult<()> {
        self.roles.lock().await.retain(|definition| {
            !(definition.role.workspace_id == workspace_id && definition.role.role_id == role_id)
        });
        Ok(())
    }
}

#[derive(Default)]
struct FakeActivityRepository {
    activities: Mutex<Vec<Activity>>,
}

#[async_trait]
impl ActivityRepository for FakeActivityRepository {
    async fn append_activity(&self, activity: Activity) -> AppResult<()> {
        self.activities.lock().await.push(activity);
        Ok(())
    }

    async fn list_recent_project_activities(
        &self,
        _workspace_id: WorkspaceId,
        _project_id: Uuid,
        _limit: usize,
    ) -> AppResult<Vec<Activity>> {
        Ok(Vec::new())
    }
}

struct Harness {
    service: RoleService,
    actor: ActorContext,
    roles: Arc<FakeRoleRepository>,
    activities: Arc<FakeActivityRepository>,
}

fn harness(grants: Vec<PermissionGrant>) -> Harness {
    let workspace_id = WorkspaceId::new();
    let user_id = UserId::new();
    let role_id = Uuid::new_v4();
    let access = MemberAccess {
        member: WorkspaceMember {
            member_id: Uuid::new_v4(),
            workspace_id,
            user_id,
            role_id,
            status: MembershipStatus::Active,
            joined_at: Utc::now(),
        },
        permissions: grants
            .into_iter()
            .map(|grant| Permission::new(Uuid::new_v4(), role_id, grant))
            .collect(),
    };

    let roles = Arc::new(FakeRoleRepository::default());
    let activities = Arc::new(FakeActivityRepository::default());
    let service = RoleService::new(
        AuthorizationService::new(Arc::new(FakeAuthorizationRepository { access })),
        roles.clone(),
        ActivityRecorder::new(activities.clone()),
    );

    Harness {
        service,
        actor: ActorContext::new(
            UserIdentity::new(user_id, "Alice", None),
            Some(workspace_id),
        ),
        roles,
        activities,
    }
}

#[tokio::test]
async fn create_role_seeds_default_permissions() {
    let harness = harness(default_permission_grants());

    let result = harness.service.create_role(&harness.actor, "Reviewer").await;
    assert!(result.is_ok());

    let definition = result.unwrap_or_else(|_| unreachable!());
    assert_eq!(definition.role.name.as_str(), "Reviewer");
    assert_eq!(
        definition.permissions.len(),
        default_permission_grants().len()
    );
    assert!(
        definition
            .permissions
            .iter()
            .all(|permission| permission.role_id() == definition.role.role_id && permission.value())
    );

    let activities = harness.activities.activities.lock().await;
    assert_eq!(activities.len(), 1);
    assert_eq!(activities[0].activity_type, ActivityType::RoleCreated);
}

#[tokio::test]
async fn create_role_requires_workspace_update() {
    let harness = harness(vec![
        PermissionGrant::new(ResourceType::Workspace, PermissionAction::Update, false)
            .unwrap_or_else(|_| unreachable!()),
    ]);

    let result = harness.service.create_role(&harness.actor, "Reviewer").await;

    assert!(matches!(result, Err(AppError::Forbidden(_))));
    assert!(harness.roles.roles.lock().await.is_empty());
    assert!(harness.activities.activities.lock().await.is_empty());
}

#[tokio::test]
async fn update_role_rejects_blank_name() {
    let harness = harness(default_permission_grants());
    let created = harness
        .service
        .create_role(&harness.actor, "Reviewer")
        .await
        .unwrap_or_else(|_| unreachable!());

    let result = harness
        .service
        .update_role(&harness.actor, created.role.role_id, "   ")
        .await;
    assert!(matches!(result, Err(AppError::Validation(_))));

    let renamed = harness
        .service
        .update_role(&harness.actor, created.role.role_id, "Auditor")
        .await;
    assert_eq!(
        renamed.ok().map(|role| role.name.as_str().to_owned()),
        Some("Auditor".to_owned())
    );
}

#[tokio::test]
async fn get_role_outside_workspace_is_not_found() {
    let harness = harness(default_permission_grants());

    let result = harness.service.get_role(&harness.actor, Uuid::new_v4()).await;
    assert!(matches!(result, Err(AppError::NotFound(_))));
}

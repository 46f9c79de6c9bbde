use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;
use chrono::Utc;
use uuid::Uuid;
use workhive_core::{ActorContext, AppError, AppResult, UserId, UserIdentity, WorkspaceId};
use workhive_domain::{
    MembershipStatus, Operation, Permission, PermissionAction, PermissionGrant, ResourceType,
    WorkspaceMember, default_permission_grants,
};

use super::{Access, AuthorizationRepository, AuthorizationService, MemberAccess};

#[derive(Default)]
struct FakeAuthorizationRepository {
    defaults: HashMap<UserId, WorkspaceId>,
    access: HashMap<(WorkspaceId, UserId), MemberAccess>,
    offline: bool,
}

#[async_trait]
impl AuthorizationRepository for FakeAuthorizationRepository {
    async fn find_default_workspace(&self, user_id: UserId) -> AppResult<Option<WorkspaceId>> {
        if self.offline {
            return Err(AppError::Internal("store offline".to_owned()));
        }

        Ok(self.defaults.get(&user_id).copied())
    }

    async fn find_member_access(
        &self,
        workspace_id: WorkspaceId,
        user_id: UserId,
    ) -> AppResult<Option<MemberAccess>> {
        if self.offline {
            return Err(AppError::Internal("store offline".to_owned()));
        }

        Ok(self.access.get(&(workspace_id, user_id)).cloned())
    }
}

fn actor(user_id: UserId, workspace_id: Option<WorkspaceId>) -> ActorContext {
    ActorContext::new(UserIdentity::new(user_id, "Alice", None), workspace_id)
}

fn member_access(
    workspace_id: WorkspaceId,
    user_id: UserId,
    status: MembershipStatus,
    grants: Vec<PermissionGrant>,
) -> MemberAccess {
    let role_id = Uuid::new_v4();
    MemberAccess {
        member: WorkspaceMember {
            member_id: Uuid::new_v4(),
            workspace_id,
            user_id,
            role_id,
            status,
            joined_at: Utc::now(),
        },
        permissions: grants
            .into_iter()
            .map(|grant| Permission::new(Uuid::new_v4(), role_id, grant))
            .collect(),
    }
}

fn grant(resource_type: ResourceType, action: PermissionAction, value: bool) -> PermissionGrant {
    PermissionGrant::new(resource_type, action, value).unwrap_or_else(|_| unreachable!())
}

fn service_with(
    workspace_id: WorkspaceId,
    user_id: UserId,
    status: MembershipStatus,
    grants: Vec<PermissionGrant>,
) -> AuthorizationService {
    let repository = FakeAuthorizationRepository {
        defaults: HashMap::new(),
        access: HashMap::from([(
            (workspace_id, user_id),
            member_access(workspace_id, user_id, status, grants),
        )]),
        offline: false,
    };

    AuthorizationService::new(Arc::new(repository))
}

#[tokio::test]
async fn authorize_allows_active_member_with_default_grants() {
    let workspace_id = WorkspaceId::new();
    let user_id = UserId::new();
    let service = service_with(
        workspace_id,
        user_id,
        MembershipStatus::Active,
        default_permission_grants(),
    );

    let result = service
        .authorize(&actor(user_id, Some(workspace_id)), Operation::UpdateTask)
        .await;
    assert!(result.is_ok());

    let access = result.unwrap_or_else(|_| unreachable!());
    assert!(access.member().is_some());
    assert_eq!(access.workspace_id().ok(), Some(workspace_id));
}

#[tokio::test]
async fn authorize_falls_back_to_default_workspace() {
    let workspace_id = WorkspaceId::new();
    let user_id = UserId::new();
    let repository = FakeAuthorizationRepository {
        defaults: HashMap::from([(user_id, workspace_id)]),
        access: HashMap::from([(
            (workspace_id, user_id),
            member_access(
                workspace_id,
                user_id,
                MembershipStatus::Active,
                default_permission_grants(),
            ),
        )]),
        offline: false,
    };
    let service = AuthorizationService::new(Arc::new(repository));

    let workspace = service
        .require_workspace(&actor(user_id, None), Operation::ReadBoard)
        .await;
    assert_eq!(workspace.ok(), Some(workspace_id));
}

#[tokio::test]
async fn authorize_denies_missing_permission_naming_only_the_action() {
    let workspace_id = WorkspaceId::new();
    let user_id = UserId::new();
    let service = service_with(
        workspace_id,
        user_id,
        MembershipStatus::Active,
        vec![grant(ResourceType::Task, PermissionAction::Read, true)],
    );

    let result = service
        .authorize(&actor(user_id, Some(workspace_id)), Operation::UpdateTask)
        .await;

    match result {
        Err(AppError::Forbidden(message)) => {
            assert_eq!(message, "missing permission 'update' on 'TASK'");
        }
        other => panic!("expected forbidden, got {other:?}"),
    }
}

#[tokio::test]
async fn authorize_treats_false_rows_as_missing() {
    let workspace_id = WorkspaceId::new();
    let user_id = UserId::new();
    let service = service_with(
        workspace_id,
        user_id,
        MembershipStatus::Active,
        vec![grant(ResourceType::Task, PermissionAction::Update, false)],
    );

    let result = service
        .authorize(&actor(user_id, Some(workspace_id)), Operation::UpdateTask)
        .await;
    assert!(matches!(result, Err(AppError::Forbidden(_))));
}

#[tokio::test]
async fn authorize_ors_duplicate_rows() {
    let workspace_id = WorkspaceId::new();
    let user_id = UserId::new();
    let service = service_with(
        workspace_id,
        user_id,
        MembershipStatus::Active,
        vec![
            grant(ResourceType::Task, PermissionAction::Update, false),
            grant(ResourceType::Task, PermissionAction::Update, true),
        ],
    );

    let result = service
        .authorize(&actor(user_id, Some(workspace_id)), Operation::UpdateTask)
        .await;
    assert!(result.is_ok());
}

#[tokio::test]
async fn authorize_denies_every_declared_operation_for_non_active_members() {
    let operations = [
        Operation::ReadBoard,
        Operation::CreateTask,
        Operation::UpdateTask,
        Operation::DeleteTask,
        Operation::CreateProject,
        Operation::ListRoles,
        Operation::InviteMember,
        Operation::CreateStream,
    ];

    for status in [MembershipStatus::Pending, MembershipStatus::Inactive] {
        let workspace_id = WorkspaceId::new();
        let user_id = UserId::new();
        let service = service_with(workspace_id, user_id, status, default_permission_grants());

        for operation in operations {
            let result = service
                .authorize(&actor(user_id, Some(workspace_id)), operation)
                .await;
            assert!(
                matches!(result, Err(AppError::Forbidden(_))),
                "{} allowed for {} member",
                operation.name(),
                status.as_str()
            );
        }
    }
}

#[tokio::test]
async fn authorize_denies_non_member() {
    let workspace_id = WorkspaceId::new();
    let service = service_with(
        workspace_id,
        UserId::new(),
        MembershipStatus::Active,
        default_permission_grants(),
    );

    let result = service
        .authorize(&actor(UserId::new(), Some(workspace_id)), Operation::ReadTasks)
        .await;
    assert!(matches!(result, Err(AppError::Forbidden(_))));
}

#[tokio::test]
async fn authorize_denies_without_any_workspace() {
    let service = AuthorizationService::new(Arc::new(FakeAuthorizationRepository::default()));

    let result = service
        .authorize(&actor(UserId::new(), None), Operation::CreateProject)
        .await;
    assert!(matches!(result, Err(AppError::Forbidden(_))));
}

#[tokio::test]
async fn public_operations_skip_the_store() {
    let service = AuthorizationService::new(Arc::new(FakeAuthorizationRepository {
        offline: true,
        ..FakeAuthorizationRepository::default()
    }));

    let result = service
        .authorize(&actor(UserId::new(), None), Operation::CreateWorkspace)
        .await;
    assert_eq!(result.ok(), Some(Access::Session { workspace_id: None }));
}

#[tokio::test]
async fn resolve_active_membership_reports_unauthorized_for_pending_member() {
    let workspace_id = WorkspaceId::new();
    let user_id = UserId::new();
    let service = service_with(
        workspace_id,
        user_id,
        MembershipStatus::Pending,
        default_permission_grants(),
    );

    let result = service
        .resolve_active_membership(user_id, workspace_id)
        .await;
    assert!(matches!(result, Err(AppError::Unauthorized(_))));
}

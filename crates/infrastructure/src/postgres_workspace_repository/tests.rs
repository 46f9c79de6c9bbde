use workhive_core::AppError;
use workhive_domain::{MembershipStatus, PermissionAction, ResourceType};

use crate::postgres_test_support::{join_as_member, register, seed, services, test_pool};

#[tokio::test]
async fn created_workspace_has_active_owner_and_default_role() {
    let Some(pool) = test_pool().await else {
        return;
    };
    let services = services(pool);
    let seeded = seed(&services, "Launch").await;

    let members = services.workspaces.list_members(&seeded.owner).await;
    assert!(members.is_ok());
    let members = members.unwrap_or_else(|_| unreachable!());
    assert_eq!(members.len(), 1);
    assert_eq!(members[0].member.status, MembershipStatus::Active);
    assert_eq!(members[0].user.display_name.as_str(), "Ada");
    assert_eq!(
        members[0].user.default_workspace_id,
        Some(seeded.workspace_id)
    );

    let roles = services
        .roles
        .list_roles(&seeded.owner)
        .await
        .unwrap_or_else(|_| unreachable!());
    assert_eq!(roles.len(), 1);
    assert_eq!(members[0].member.role_id, roles[0].role_id);
}

#[tokio::test]
async fn invite_is_pending_until_accepted_and_cannot_repeat() {
    let Some(pool) = test_pool().await else {
        return;
    };
    let services = services(pool);
    let seeded = seed(&services, "Launch").await;
    let invitee = register(&services, "Linus").await;

    let invited = services
        .workspaces
        .invite_member(&seeded.owner, invitee.user_id())
        .await;
    assert!(invited.is_ok_and(|member| member.status == MembershipStatus::Pending));

    let repeated = services
        .workspaces
        .invite_member(&seeded.owner, invitee.user_id())
        .await;
    assert!(matches!(repeated, Err(AppError::Conflict(_))));

    let denied = services
        .projects
        .list_projects(
            &invitee.in_workspace(seeded.workspace_id),
            seeded.project.stream_id,
        )
        .await;
    assert!(matches!(denied, Err(AppError::Forbidden(_))));

    let accepted = services
        .workspaces
        .accept_invite(&invitee, seeded.workspace_id)
        .await;
    assert!(accepted.is_ok_and(|member| member.status == MembershipStatus::Active));

    let accepted_again = services
        .workspaces
        .accept_invite(&invitee, seeded.workspace_id)
        .await;
    assert!(matches!(accepted_again, Err(AppError::Conflict(_))));
}

#[tokio::test]
async fn revoked_permission_denies_member_through_stored_rows() {
    let Some(pool) = test_pool().await else {
        return;
    };
    let services = services(pool);
    let seeded = seed(&services, "Launch").await;

    let viewer = services
        .roles
        .create_role(&seeded.owner, "Viewer")
        .await
        .unwrap_or_else(|_| unreachable!());
    let project_delete = viewer
        .permissions
        .iter()
        .find(|permission| {
            permission.resource_type() == ResourceType::Project
                && permission.action() == PermissionAction::Delete
        })
        .unwrap_or_else(|| unreachable!());
    let revoked = services
        .permissions
        .update_permission(&seeded.owner, project_delete.permission_id(), false)
        .await;
    assert!(revoked.is_ok_and(|permission| !permission.value()));

    let member = join_as_member(&services, &seeded, "Grace").await;
    let changed = services
        .workspaces
        .change_member_role(&seeded.owner, member.user_id(), viewer.role.role_id)
        .await;
    assert!(changed.is_ok());

    let result = services
        .projects
        .delete_project(&member, seeded.project.project_id)
        .await;
    assert!(
        matches!(result, Err(AppError::Forbidden(message)) if message == "missing permission 'delete' on 'PROJECT'")
    );

    let still_there = services
        .projects
        .get_project(&seeded.owner, seeded.project.project_id)
        .await;
    assert!(still_there.is_ok());
}

#[tokio::test]
async fn stream_with_projects_cannot_be_deleted() {
    let Some(pool) = test_pool().await else {
        return;
    };
    let services = services(pool);
    let seeded = seed(&services, "Launch").await;

    let blocked = services
        .workspaces
        .delete_stream(&seeded.owner, seeded.project.stream_id)
        .await;
    assert!(matches!(blocked, Err(AppError::Conflict(_))));

    let duplicate = services
        .workspaces
        .create_stream(&seeded.owner, "Product")
        .await;
    assert!(matches!(duplicate, Err(AppError::Conflict(_))));

    let empty = services
        .workspaces
        .create_stream(&seeded.owner, "Research")
        .await
        .unwrap_or_else(|_| unreachable!());
    let deleted = services
        .workspaces
        .delete_stream(&seeded.owner, empty.stream_id)
        .await;
    assert!(deleted.is_ok());
}

#[tokio::test]
async fn team_rosters_follow_stream_membership() {
    let Some(pool) = test_pool().await else {
        return;
    };
    let services = services(pool);
    let seeded = seed(&services, "Launch").await;
    let stream_id = seeded.project.stream_id;
    let member = join_as_member(&services, &seeded, "Grace").await;
    let team = services
        .workspaces
        .create_team(&seeded.owner, stream_id, "Platform")
        .await
        .unwrap_or_else(|_| unreachable!());

    let outsider = services
        .workspaces
        .add_team_member(&seeded.owner, team.team_id, member.user_id())
        .await;
    assert!(matches!(outsider, Err(AppError::Validation(_))));

    let added = services
        .workspaces
        .add_stream_members(&seeded.owner, stream_id, vec![member.user_id()])
        .await;
    assert!(added.is_ok_and(|members| members.len() == 1));
    let repeated = services
        .workspaces
        .add_stream_members(&seeded.owner, stream_id, vec![member.user_id()])
        .await;
    assert!(matches!(repeated, Err(AppError::Conflict(_))));

    let joined = services
        .workspaces
        .add_team_member(&seeded.owner, team.team_id, member.user_id())
        .await;
    assert!(joined.is_ok());

    let removed = services
        .workspaces
        .remove_stream_member(&seeded.owner, stream_id, member.user_id())
        .await;
    assert!(removed.is_ok());
    let details = services
        .workspaces
        .get_team(&seeded.owner, team.team_id)
        .await
        .unwrap_or_else(|_| unreachable!());
    assert!(details.members.is_empty());

    let deleted = services
        .workspaces
        .delete_team(&seeded.owner, team.team_id)
        .await;
    assert!(deleted.is_ok());
    let missing = services.workspaces.get_team(&seeded.owner, team.team_id).await;
    assert!(matches!(missing, Err(AppError::NotFound(_))));
}

#[tokio::test]
async fn roles_in_use_cannot_be_deleted() {
    let Some(pool) = test_pool().await else {
        return;
    };
    let services = services(pool);
    let seeded = seed(&services, "Launch").await;
    let default_role = services
        .roles
        .list_roles(&seeded.owner)
        .await
        .unwrap_or_else(|_| unreachable!())
        .into_iter()
        .next()
        .unwrap_or_else(|| unreachable!());

    let blocked = services
        .roles
        .delete_role(&seeded.owner, default_role.role_id)
        .await;
    assert!(matches!(blocked, Err(AppError::Conflict(_))));

    let spare = services
        .roles
        .create_role(&seeded.owner, "Spare")
        .await
        .unwrap_or_else(|_| unreachable!());
    let deleted = services
        .roles
        .delete_role(&seeded.owner, spare.role.role_id)
        .await;
    assert!(deleted.is_ok());
}

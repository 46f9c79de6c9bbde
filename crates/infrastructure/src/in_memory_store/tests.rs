use std::sync::Arc;

use chrono::{Duration, Utc};
use uuid::Uuid;
use workhive_application::{
    ActivityRecorder, AuthorizationService, CreateProjectInput, CreateSprintInput,
    CreateTaskInput, PermissionService, ProjectService, RoleService, TaskService,
    WorkflowPolicy, WorkspaceService,
};
use workhive_core::{ActorContext, AppError, UserId, UserIdentity, WorkspaceId};
use workhive_domain::{
    MembershipStatus, PermissionAction, Project, ResourceType, SprintState, TaskPriority,
    TaskUpdate,
};

use super::InMemoryStore;

struct Harness {
    store: Arc<InMemoryStore>,
    workspaces: WorkspaceService,
    projects: ProjectService,
    tasks: TaskService,
    roles: RoleService,
    permissions: PermissionService,
}

fn harness() -> Harness {
    harness_with_policy(WorkflowPolicy::default())
}

fn permissive_harness() -> Harness {
    harness_with_policy(WorkflowPolicy {
        enforce_single_active_sprint: false,
        reject_dependency_cycles: false,
    })
}

fn harness_with_policy(policy: WorkflowPolicy) -> Harness {
    let store = Arc::new(InMemoryStore::new());
    let authorization_service = AuthorizationService::new(store.clone());
    let activity_recorder = ActivityRecorder::new(store.clone());

    Harness {
        workspaces: WorkspaceService::new(
            authorization_service.clone(),
            store.clone(),
            store.clone(),
            activity_recorder.clone(),
        ),
        projects: ProjectService::new(
            authorization_service.clone(),
            store.clone(),
            store.clone(),
            activity_recorder.clone(),
            policy,
        ),
        tasks: TaskService::new(
            authorization_service.clone(),
            store.clone(),
            store.clone(),
            store.clone(),
            activity_recorder.clone(),
            policy,
        ),
        roles: RoleService::new(
            authorization_service.clone(),
            store.clone(),
            activity_recorder.clone(),
        ),
        permissions: PermissionService::new(authorization_service, store.clone(), activity_recorder),
        store,
    }
}

struct Seeded {
    owner: ActorContext,
    workspace_id: WorkspaceId,
    project: Project,
}

async fn register(harness: &Harness, name: &str) -> ActorContext {
    let identity = UserIdentity::new(UserId::new(), name, None);
    let registered = harness.workspaces.register_user(&identity).await;
    assert!(registered.is_ok());

    ActorContext::new(identity, None)
}

async fn seed(harness: &Harness) -> Seeded {
    let owner = register(harness, "Ada").await;
    let workspace = harness
        .workspaces
        .create_workspace(&owner, "Acme")
        .await
        .unwrap_or_else(|_| unreachable!());
    let workspace_id = workspace.workspace_id();
    let owner = owner.in_workspace(workspace_id);

    let stream = harness
        .workspaces
        .create_stream(&owner, "Product")
        .await
        .unwrap_or_else(|_| unreachable!());
    let project = harness
        .projects
        .create_project(
            &owner,
            CreateProjectInput {
                stream_id: stream.stream_id,
                name: "Launch".to_owned(),
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

fn task_input(project_id: Uuid, description: &str) -> CreateTaskInput {
    CreateTaskInput {
        project_id,
        description: description.to_owned(),
        priority: None,
        due_date: None,
        labels: Vec::new(),
        sprint_id: None,
    }
}

async fn join_as_member(harness: &Harness, seeded: &Seeded, name: &str) -> ActorContext {
    let member = register(harness, name).await;
    let invited = harness
        .workspaces
        .invite_member(&seeded.owner, member.user_id())
        .await;
    assert!(invited.is_ok());
    let accepted = harness
        .workspaces
        .accept_invite(&member, seeded.workspace_id)
        .await;
    assert!(accepted.is_ok());

    member.in_workspace(seeded.workspace_id)
}

async fn activity_count(store: &InMemoryStore) -> usize {
    store.state.read().await.activities.len()
}

#[tokio::test]
async fn first_task_lands_in_initial_column_with_project_key() {
    let harness = harness();
    let seeded = seed(&harness).await;

    let created = harness
        .tasks
        .create_task(&seeded.owner, task_input(seeded.project.project_id, "Draft plan"))
        .await;
    assert!(created.is_ok());
    let created = created.unwrap_or_else(|_| unreachable!());
    assert_eq!(created.task.key.as_str(), "LAUNCH-1");
    assert_eq!(created.task.priority, TaskPriority::Medium);
    assert_eq!(created.card.sprint_id, None);

    let state = harness.store.state.read().await;
    let board = state
        .boards
        .get(&seeded.project.project_id)
        .unwrap_or_else(|| unreachable!());
    assert_eq!(board.columns().len(), 3);
    let initial = board.initial_column().unwrap_or_else(|_| unreachable!());
    assert_eq!(initial.name.as_str(), "To Do");
    assert_eq!(created.card.column_id, initial.column_id);
    assert_eq!(created.task.status_id, initial.status.status_id);
}

#[tokio::test]
async fn concurrent_task_creation_never_reuses_keys() {
    let harness = harness();
    let seeded = seed(&harness).await;
    let project_id = seeded.project.project_id;

    let (left, right) = tokio::join!(
        harness
            .tasks
            .create_task(&seeded.owner, task_input(project_id, "Left")),
        harness
            .tasks
            .create_task(&seeded.owner, task_input(project_id, "Right")),
    );
    assert!(left.is_ok());
    assert!(right.is_ok());

    let mut keys = vec![
        left.unwrap_or_else(|_| unreachable!()).task.key.to_string(),
        right.unwrap_or_else(|_| unreachable!()).task.key.to_string(),
    ];
    keys.sort();
    assert_eq!(keys, vec!["LAUNCH-1".to_owned(), "LAUNCH-2".to_owned()]);
}

#[tokio::test]
async fn member_without_task_update_is_forbidden_and_nothing_changes() {
    let harness = harness();
    let seeded = seed(&harness).await;
    let created = harness
        .tasks
        .create_task(&seeded.owner, task_input(seeded.project.project_id, "Draft plan"))
        .await
        .unwrap_or_else(|_| unreachable!());

    let viewer = harness
        .roles
        .create_role(&seeded.owner, "Viewer")
        .await
        .unwrap_or_else(|_| unreachable!());
    let task_update = viewer
        .permissions
        .iter()
        .find(|permission| {
            permission.resource_type() == ResourceType::Task
                && permission.action() == PermissionAction::Update
        })
        .unwrap_or_else(|| unreachable!());
    let revoked = harness
        .permissions
        .update_permission(&seeded.owner, task_update.permission_id(), false)
        .await;
    assert!(revoked.is_ok());

    let member = join_as_member(&harness, &seeded, "Grace").await;
    let changed = harness
        .workspaces
        .change_member_role(&seeded.owner, member.user_id(), viewer.role.role_id)
        .await;
    assert!(changed.is_ok());

    let activities_before = activity_count(&harness.store).await;
    let result = harness
        .tasks
        .update_task(
            &member,
            created.task.task_id,
            TaskUpdate {
                description: Some("Hijacked".to_owned()),
                ..TaskUpdate::default()
            },
        )
        .await;

    assert!(
        matches!(result, Err(AppError::Forbidden(message)) if message == "missing permission 'update' on 'TASK'")
    );
    assert_eq!(activity_count(&harness.store).await, activities_before);
    let stored = harness
        .store
        .state
        .read()
        .await
        .tasks
        .get(&created.task.task_id)
        .cloned()
        .unwrap_or_else(|| unreachable!());
    assert_eq!(stored.description.as_str(), "Draft plan");
}

#[tokio::test]
async fn pending_member_is_denied_until_invite_is_accepted() {
    let harness = harness();
    let seeded = seed(&harness).await;
    let invitee = register(&harness, "Linus").await;
    let invited = harness
        .workspaces
        .invite_member(&seeded.owner, invitee.user_id())
        .await;
    assert!(invited.is_ok());

    let invitee_in_workspace = invitee.in_workspace(seeded.workspace_id);
    let denied = harness
        .tasks
        .list_tasks(&invitee_in_workspace, seeded.project.project_id)
        .await;
    assert!(matches!(denied, Err(AppError::Forbidden(_))));

    let accepted = harness
        .workspaces
        .accept_invite(&invitee, seeded.workspace_id)
        .await;
    assert!(accepted.is_ok());

    let allowed = harness
        .tasks
        .list_tasks(&invitee_in_workspace, seeded.project.project_id)
        .await;
    assert!(allowed.is_ok());
}

#[tokio::test]
async fn completing_a_checklist_item_twice_records_two_activities() {
    let harness = harness();
    let seeded = seed(&harness).await;
    let created = harness
        .tasks
        .create_task(&seeded.owner, task_input(seeded.project.project_id, "Draft plan"))
        .await
        .unwrap_or_else(|_| unreachable!());
    let item = harness
        .tasks
        .add_checklist_item(&seeded.owner, created.task.task_id, "Outline")
        .await
        .unwrap_or_else(|_| unreachable!());

    let activities_before = activity_count(&harness.store).await;
    let first = harness
        .tasks
        .mark_checklist_item_complete(&seeded.owner, item.item_id)
        .await;
    let second = harness
        .tasks
        .mark_checklist_item_complete(&seeded.owner, item.item_id)
        .await;

    assert!(first.is_ok());
    assert!(second.is_ok_and(|item| item.is_done));
    assert_eq!(activity_count(&harness.store).await, activities_before + 2);
}

#[tokio::test]
async fn moving_card_between_sprints_keeps_one_sprint() {
    let harness = harness();
    let seeded = seed(&harness).await;
    let project_id = seeded.project.project_id;
    let created = harness
        .tasks
        .create_task(&seeded.owner, task_input(project_id, "Draft plan"))
        .await
        .unwrap_or_else(|_| unreachable!());

    let sprint_a = harness
        .projects
        .create_sprint(
            &seeded.owner,
            CreateSprintInput {
                project_id,
                name: "Sprint A".to_owned(),
                goal: None,
            },
        )
        .await
        .unwrap_or_else(|_| unreachable!());
    let sprint_b = harness
        .projects
        .create_sprint(
            &seeded.owner,
            CreateSprintInput {
                project_id,
                name: "Sprint B".to_owned(),
                goal: None,
            },
        )
        .await
        .unwrap_or_else(|_| unreachable!());
    assert!(sprint_b.position > sprint_a.position);

    let first = harness
        .projects
        .move_card_to_sprint(&seeded.owner, created.card.card_id, sprint_a.sprint_id)
        .await;
    assert!(first.is_ok_and(|card| card.sprint_id == Some(sprint_a.sprint_id)));

    let second = harness
        .projects
        .move_card_to_sprint(&seeded.owner, created.card.card_id, sprint_b.sprint_id)
        .await;
    assert!(second.is_ok_and(|card| card.sprint_id == Some(sprint_b.sprint_id)));

    let backlog = harness
        .projects
        .get_backlog(&seeded.owner, project_id)
        .await
        .unwrap_or_else(|_| unreachable!());
    assert!(backlog.backlog.is_empty());
    let planned: Vec<Uuid> = backlog
        .sprints
        .iter()
        .filter(|plan| !plan.cards.is_empty())
        .map(|plan| plan.sprint.sprint_id)
        .collect();
    assert_eq!(planned, vec![sprint_b.sprint_id]);
}

#[tokio::test]
async fn board_shows_only_cards_of_the_active_sprint() {
    let harness = harness();
    let seeded = seed(&harness).await;
    let project_id = seeded.project.project_id;
    let planned = harness
        .tasks
        .create_task(&seeded.owner, task_input(project_id, "Planned"))
        .await
        .unwrap_or_else(|_| unreachable!());
    let backlog_only = harness
        .tasks
        .create_task(&seeded.owner, task_input(project_id, "Later"))
        .await
        .unwrap_or_else(|_| unreachable!());

    let default_sprint = harness
        .projects
        .list_sprints(&seeded.owner, project_id)
        .await
        .unwrap_or_else(|_| unreachable!())
        .into_iter()
        .next()
        .unwrap_or_else(|| unreachable!());
    assert_eq!(default_sprint.name.as_str(), "Launch Sprint");

    let moved = harness
        .projects
        .move_card_to_sprint(&seeded.owner, planned.card.card_id, default_sprint.sprint_id)
        .await;
    assert!(moved.is_ok());

    let before_start = harness
        .projects
        .get_board(&seeded.owner, project_id)
        .await
        .unwrap_or_else(|_| unreachable!());
    assert!(before_start.active_sprints.is_empty());
    assert!(before_start.columns.iter().all(|column| column.cards.is_empty()));

    let started = harness
        .projects
        .start_sprint(&seeded.owner, default_sprint.sprint_id)
        .await;
    assert!(started.is_ok_and(|sprint| sprint.state == SprintState::Active));

    let board = harness
        .projects
        .get_board(&seeded.owner, project_id)
        .await
        .unwrap_or_else(|_| unreachable!());
    let shown: Vec<Uuid> = board
        .columns
        .iter()
        .flat_map(|column| column.cards.iter().map(|entry| entry.card.card_id))
        .collect();
    assert_eq!(shown, vec![planned.card.card_id]);
    assert!(!shown.contains(&backlog_only.card.card_id));
    assert_eq!(board.columns[0].cards.len(), 1);
}

#[tokio::test]
async fn terminal_column_completes_and_leaving_reopens() {
    let harness = harness();
    let seeded = seed(&harness).await;
    let project_id = seeded.project.project_id;
    let created = harness
        .tasks
        .create_task(&seeded.owner, task_input(project_id, "Ship it"))
        .await
        .unwrap_or_else(|_| unreachable!());
    let (done_column, todo_column) = {
        let state = harness.store.state.read().await;
        let board = state
            .boards
            .get(&project_id)
            .unwrap_or_else(|| unreachable!());
        let done = board
            .columns()
            .iter()
            .find(|column| column.is_terminal)
            .map(|column| column.column_id)
            .unwrap_or_else(|| unreachable!());
        let todo = board
            .initial_column()
            .map(|column| column.column_id)
            .unwrap_or_else(|_| unreachable!());
        (done, todo)
    };

    let completed = harness
        .projects
        .move_card_to_column(&seeded.owner, created.card.card_id, done_column)
        .await
        .unwrap_or_else(|_| unreachable!());
    assert!(completed.task.completed_at.is_some());

    let reopened = harness
        .projects
        .move_card_to_column(&seeded.owner, created.card.card_id, todo_column)
        .await
        .unwrap_or_else(|_| unreachable!());
    assert!(reopened.task.completed_at.is_none());
    assert_eq!(reopened.card.column_id, todo_column);
}

#[tokio::test]
async fn dependency_cycles_are_rejected() {
    let harness = harness();
    let seeded = seed(&harness).await;
    let project_id = seeded.project.project_id;
    let first = harness
        .tasks
        .create_task(&seeded.owner, task_input(project_id, "First"))
        .await
        .unwrap_or_else(|_| unreachable!());
    let second = harness
        .tasks
        .create_task(&seeded.owner, task_input(project_id, "Second"))
        .await
        .unwrap_or_else(|_| unreachable!());

    let added = harness
        .tasks
        .add_dependency(&seeded.owner, second.task.task_id, first.task.task_id)
        .await;
    assert!(added.is_ok());

    let duplicate = harness
        .tasks
        .add_dependency(&seeded.owner, second.task.task_id, first.task.task_id)
        .await;
    assert!(matches!(duplicate, Err(AppError::Conflict(_))));

    let cycle = harness
        .tasks
        .add_dependency(&seeded.owner, first.task.task_id, second.task.task_id)
        .await;
    assert!(matches!(cycle, Err(AppError::Conflict(_))));
}

#[tokio::test]
async fn only_one_sprint_may_be_active() {
    let harness = harness();
    let seeded = seed(&harness).await;
    let project_id = seeded.project.project_id;
    let sprints = harness
        .projects
        .list_sprints(&seeded.owner, project_id)
        .await
        .unwrap_or_else(|_| unreachable!());
    let started = harness
        .projects
        .start_sprint(&seeded.owner, sprints[0].sprint_id)
        .await;
    assert!(started.is_ok());

    let next = harness
        .projects
        .create_sprint(
            &seeded.owner,
            CreateSprintInput {
                project_id,
                name: "Next".to_owned(),
                goal: Some("Polish".to_owned()),
            },
        )
        .await
        .unwrap_or_else(|_| unreachable!());
    let second_start = harness
        .projects
        .start_sprint(&seeded.owner, next.sprint_id)
        .await;
    assert!(matches!(second_start, Err(AppError::Conflict(_))));

    let completed = harness
        .projects
        .complete_sprint(&seeded.owner, sprints[0].sprint_id)
        .await;
    assert!(completed.is_ok_and(|sprint| sprint.state == SprintState::Completed));
    let restart = harness
        .projects
        .start_sprint(&seeded.owner, sprints[0].sprint_id)
        .await;
    assert!(matches!(restart, Err(AppError::Conflict(_))));
}

#[tokio::test]
async fn relaxed_policy_shows_cards_of_every_active_sprint() {
    let harness = permissive_harness();
    let seeded = seed(&harness).await;
    let project_id = seeded.project.project_id;
    let first_sprint = harness
        .projects
        .list_sprints(&seeded.owner, project_id)
        .await
        .unwrap_or_else(|_| unreachable!())
        .into_iter()
        .next()
        .unwrap_or_else(|| unreachable!());
    let second_sprint = harness
        .projects
        .create_sprint(
            &seeded.owner,
            CreateSprintInput {
                project_id,
                name: "Parallel".to_owned(),
                goal: None,
            },
        )
        .await
        .unwrap_or_else(|_| unreachable!());

    let mut placed = Vec::new();
    for (description, sprint_id) in [
        ("Front", first_sprint.sprint_id),
        ("Back", second_sprint.sprint_id),
    ] {
        let created = harness
            .tasks
            .create_task(&seeded.owner, task_input(project_id, description))
            .await
            .unwrap_or_else(|_| unreachable!());
        let moved = harness
            .projects
            .move_card_to_sprint(&seeded.owner, created.card.card_id, sprint_id)
            .await;
        assert!(moved.is_ok());
        placed.push(created.card.card_id);
    }

    for sprint_id in [first_sprint.sprint_id, second_sprint.sprint_id] {
        let started = harness.projects.start_sprint(&seeded.owner, sprint_id).await;
        assert!(started.is_ok_and(|sprint| sprint.state == SprintState::Active));
    }

    let board = harness
        .projects
        .get_board(&seeded.owner, project_id)
        .await
        .unwrap_or_else(|_| unreachable!());
    assert_eq!(board.active_sprints.len(), 2);
    let mut shown: Vec<Uuid> = board
        .columns
        .iter()
        .flat_map(|column| column.cards.iter().map(|entry| entry.card.card_id))
        .collect();
    shown.sort();
    placed.sort();
    assert_eq!(shown, placed);
}

#[tokio::test]
async fn relaxed_policy_accepts_cyclic_dependencies() {
    let harness = permissive_harness();
    let seeded = seed(&harness).await;
    let project_id = seeded.project.project_id;
    let first = harness
        .tasks
        .create_task(&seeded.owner, task_input(project_id, "First"))
        .await
        .unwrap_or_else(|_| unreachable!());
    let second = harness
        .tasks
        .create_task(&seeded.owner, task_input(project_id, "Second"))
        .await
        .unwrap_or_else(|_| unreachable!());

    let forward = harness
        .tasks
        .add_dependency(&seeded.owner, second.task.task_id, first.task.task_id)
        .await;
    assert!(forward.is_ok());
    let backward = harness
        .tasks
        .add_dependency(&seeded.owner, first.task.task_id, second.task.task_id)
        .await;
    assert!(backward.is_ok());

    let self_edge = harness
        .tasks
        .add_dependency(&seeded.owner, first.task.task_id, first.task.task_id)
        .await;
    assert!(matches!(self_edge, Err(AppError::Validation(_))));
    assert_eq!(harness.store.state.read().await.dependencies.len(), 2);
}

#[tokio::test]
async fn stream_members_must_be_active_workspace_members() {
    let harness = harness();
    let seeded = seed(&harness).await;
    let stream_id = seeded.project.stream_id;
    let member = join_as_member(&harness, &seeded, "Grace").await;
    let invitee = register(&harness, "Linus").await;
    let invited = harness
        .workspaces
        .invite_member(&seeded.owner, invitee.user_id())
        .await;
    assert!(invited.is_ok());

    let pending = harness
        .workspaces
        .add_stream_members(&seeded.owner, stream_id, vec![invitee.user_id()])
        .await;
    assert!(matches!(pending, Err(AppError::Validation(_))));
    let empty = harness
        .workspaces
        .add_stream_members(&seeded.owner, stream_id, Vec::new())
        .await;
    assert!(matches!(empty, Err(AppError::Validation(_))));

    let activities_before = activity_count(&harness.store).await;
    let added = harness
        .workspaces
        .add_stream_members(
            &seeded.owner,
            stream_id,
            vec![member.user_id(), member.user_id()],
        )
        .await;
    assert!(added.is_ok_and(|members| members.len() == 1));
    assert_eq!(activity_count(&harness.store).await, activities_before + 1);

    let repeated = harness
        .workspaces
        .add_stream_members(&seeded.owner, stream_id, vec![member.user_id()])
        .await;
    assert!(matches!(repeated, Err(AppError::Conflict(_))));

    let details = harness
        .workspaces
        .get_stream(&seeded.owner, stream_id)
        .await
        .unwrap_or_else(|_| unreachable!());
    assert_eq!(details.stream.stream_id, stream_id);
    assert_eq!(details.members.len(), 1);
    assert_eq!(details.members[0].user_id, member.user_id());

    let removed = harness
        .workspaces
        .remove_stream_member(&seeded.owner, stream_id, member.user_id())
        .await;
    assert!(removed.is_ok());
    let removed_again = harness
        .workspaces
        .remove_stream_member(&seeded.owner, stream_id, member.user_id())
        .await;
    assert!(matches!(removed_again, Err(AppError::NotFound(_))));
    let listed = harness
        .workspaces
        .list_stream_members(&seeded.owner, stream_id)
        .await;
    assert!(listed.is_ok_and(|members| members.is_empty()));
}

#[tokio::test]
async fn team_roster_follows_stream_membership() {
    let harness = harness();
    let seeded = seed(&harness).await;
    let stream_id = seeded.project.stream_id;
    let member = join_as_member(&harness, &seeded, "Grace").await;
    let team = harness
        .workspaces
        .create_team(&seeded.owner, stream_id, "Platform")
        .await
        .unwrap_or_else(|_| unreachable!());

    let outsider = harness
        .workspaces
        .add_team_member(&seeded.owner, team.team_id, member.user_id())
        .await;
    assert!(matches!(outsider, Err(AppError::Validation(_))));

    let added = harness
        .workspaces
        .add_stream_members(&seeded.owner, stream_id, vec![member.user_id()])
        .await;
    assert!(added.is_ok());
    let joined = harness
        .workspaces
        .add_team_member(&seeded.owner, team.team_id, member.user_id())
        .await;
    assert!(joined.is_ok_and(|joined| joined.user_id == member.user_id()));
    let joined_again = harness
        .workspaces
        .add_team_member(&seeded.owner, team.team_id, member.user_id())
        .await;
    assert!(matches!(joined_again, Err(AppError::Conflict(_))));

    let left_stream = harness
        .workspaces
        .remove_stream_member(&seeded.owner, stream_id, member.user_id())
        .await;
    assert!(left_stream.is_ok());
    let details = harness
        .workspaces
        .get_team(&seeded.owner, team.team_id)
        .await
        .unwrap_or_else(|_| unreachable!());
    assert!(details.members.is_empty());
    let not_in_team = harness
        .workspaces
        .remove_team_member(&seeded.owner, team.team_id, member.user_id())
        .await;
    assert!(matches!(not_in_team, Err(AppError::NotFound(_))));

    let assigned = harness
        .projects
        .assign_project_to_team(&seeded.owner, seeded.project.project_id, Some(team.team_id))
        .await;
    assert!(assigned.is_ok_and(|project| project.team_id == Some(team.team_id)));

    let deleted = harness
        .workspaces
        .delete_team(&seeded.owner, team.team_id)
        .await;
    assert!(deleted.is_ok());
    let project = harness
        .projects
        .get_project(&seeded.owner, seeded.project.project_id)
        .await
        .unwrap_or_else(|_| unreachable!());
    assert_eq!(project.team_id, None);
    let missing = harness.workspaces.get_team(&seeded.owner, team.team_id).await;
    assert!(matches!(missing, Err(AppError::NotFound(_))));
}

#[tokio::test]
async fn member_without_stream_add_members_is_forbidden() {
    let harness = harness();
    let seeded = seed(&harness).await;
    let stream_id = seeded.project.stream_id;
    let restricted = harness
        .roles
        .create_role(&seeded.owner, "Restricted")
        .await
        .unwrap_or_else(|_| unreachable!());
    let add_members = restricted
        .permissions
        .iter()
        .find(|permission| {
            permission.resource_type() == ResourceType::Stream
                && permission.action() == PermissionAction::AddMembers
        })
        .unwrap_or_else(|| unreachable!());
    let revoked = harness
        .permissions
        .update_permission(&seeded.owner, add_members.permission_id(), false)
        .await;
    assert!(revoked.is_ok());

    let member = join_as_member(&harness, &seeded, "Grace").await;
    let changed = harness
        .workspaces
        .change_member_role(&seeded.owner, member.user_id(), restricted.role.role_id)
        .await;
    assert!(changed.is_ok());

    let result = harness
        .workspaces
        .add_stream_members(&member, stream_id, vec![member.user_id()])
        .await;
    assert!(
        matches!(result, Err(AppError::Forbidden(message)) if message == "missing permission 'add-members' on 'STREAM'")
    );
    assert!(harness.store.state.read().await.stream_members.is_empty());

    let readable = harness.workspaces.get_stream(&member, stream_id).await;
    assert!(readable.is_ok());
}

#[tokio::test]
async fn roles_in_use_cannot_be_deleted() {
    let harness = harness();
    let seeded = seed(&harness).await;
    let workspace = harness
        .store
        .state
        .read()
        .await
        .workspaces
        .get(&seeded.workspace_id)
        .cloned()
        .unwrap_or_else(|| unreachable!());
    let default_role_id = workspace.default_role_id().unwrap_or_else(|| unreachable!());

    let default_delete = harness
        .roles
        .delete_role(&seeded.owner, default_role_id)
        .await;
    assert!(matches!(default_delete, Err(AppError::Conflict(_))));

    let spare = harness
        .roles
        .create_role(&seeded.owner, "Spare")
        .await
        .unwrap_or_else(|_| unreachable!());
    let spare_delete = harness
        .roles
        .delete_role(&seeded.owner, spare.role.role_id)
        .await;
    assert!(spare_delete.is_ok());
    assert!(
        harness
            .store
            .state
            .read()
            .await
            .permissions
            .values()
            .all(|permission| permission.role_id() != spare.role.role_id)
    );
}

#[tokio::test]
async fn deleting_a_task_removes_its_subtasks_and_card() {
    let harness = harness();
    let seeded = seed(&harness).await;
    let created = harness
        .tasks
        .create_task(&seeded.owner, task_input(seeded.project.project_id, "Parent"))
        .await
        .unwrap_or_else(|_| unreachable!());
    let subtask = harness
        .tasks
        .add_subtask(&seeded.owner, created.task.task_id, "Child")
        .await
        .unwrap_or_else(|_| unreachable!());
    assert_eq!(subtask.key.as_str(), "LAUNCH-1-1");

    let deleted = harness
        .tasks
        .delete_task(&seeded.owner, created.task.task_id)
        .await;
    assert!(deleted.is_ok());

    let state = harness.store.state.read().await;
    assert!(state.tasks.is_empty());
    assert!(state.cards.is_empty());
}

#[tokio::test]
async fn other_workspaces_cannot_see_resources() {
    let harness = harness();
    let seeded = seed(&harness).await;
    let outsider = register(&harness, "Mallory").await;
    let other = harness
        .workspaces
        .create_workspace(&outsider, "Elsewhere")
        .await
        .unwrap_or_else(|_| unreachable!());
    let outsider = outsider.in_workspace(other.workspace_id());

    let result = harness
        .projects
        .get_project(&outsider, seeded.project.project_id)
        .await;
    assert!(matches!(result, Err(AppError::NotFound(_))));
}

#[tokio::test]
async fn removed_member_can_be_invited_again_but_owner_stays() {
    let harness = harness();
    let seeded = seed(&harness).await;
    let member = join_as_member(&harness, &seeded, "Grace").await;

    let owner_removal = harness
        .workspaces
        .remove_member(&seeded.owner, seeded.owner.user_id())
        .await;
    assert!(matches!(owner_removal, Err(AppError::Conflict(_))));

    let removed = harness
        .workspaces
        .remove_member(&seeded.owner, member.user_id())
        .await;
    assert!(removed.is_ok_and(|membership| membership.status == MembershipStatus::Inactive));

    let denied = harness
        .tasks
        .list_tasks(&member, seeded.project.project_id)
        .await;
    assert!(matches!(denied, Err(AppError::Forbidden(_))));

    let reinvited = harness
        .workspaces
        .invite_member(&seeded.owner, member.user_id())
        .await;
    assert!(reinvited.is_ok_and(|membership| membership.status == MembershipStatus::Pending));
}

#[tokio::test]
async fn owner_role_cannot_be_changed() {
    let harness = harness();
    let seeded = seed(&harness).await;
    let planner = harness
        .roles
        .create_role(&seeded.owner, "Planner")
        .await
        .unwrap_or_else(|_| unreachable!());

    let changed = harness
        .workspaces
        .change_member_role(&seeded.owner, seeded.owner.user_id(), planner.role.role_id)
        .await;
    assert!(matches!(changed, Err(AppError::Conflict(_))));

    let owner_role = harness
        .store
        .state
        .read()
        .await
        .member(seeded.workspace_id, seeded.owner.user_id())
        .map(|member| member.role_id);
    assert!(owner_role.is_some_and(|role_id| role_id != planner.role.role_id));
}

#[tokio::test]
async fn permission_rows_follow_the_resource_vocabulary() {
    let harness = harness();
    let seeded = seed(&harness).await;
    let role = harness
        .roles
        .create_role(&seeded.owner, "Planner")
        .await
        .unwrap_or_else(|_| unreachable!());

    let unknown_action = harness
        .permissions
        .create_permission(
            &seeded.owner,
            role.role.role_id,
            ResourceType::Project,
            PermissionAction::AddMembers,
            true,
        )
        .await;
    assert!(matches!(unknown_action, Err(AppError::Validation(_))));

    let duplicate = harness
        .permissions
        .create_permission(
            &seeded.owner,
            role.role.role_id,
            ResourceType::Task,
            PermissionAction::Update,
            true,
        )
        .await;
    assert!(matches!(duplicate, Err(AppError::Conflict(_))));

    let added = harness
        .permissions
        .create_permission(
            &seeded.owner,
            role.role.role_id,
            ResourceType::Workspace,
            PermissionAction::Read,
            true,
        )
        .await;
    assert!(added.is_ok());

    let listed = harness
        .permissions
        .get_permissions(&seeded.owner, role.role.role_id)
        .await
        .unwrap_or_else(|_| unreachable!());
    assert_eq!(listed.len(), role.permissions.len() + 1);
}

#[tokio::test]
async fn summary_counts_open_due_and_overdue_work() {
    let harness = harness();
    let seeded = seed(&harness).await;
    let project_id = seeded.project.project_id;
    let now = Utc::now();

    let mut soon = task_input(project_id, "Due soon");
    soon.due_date = Some(now + Duration::days(2));
    let mut late = task_input(project_id, "Overdue");
    late.due_date = Some(now - Duration::days(1));
    for input in [soon, late, task_input(project_id, "Undated")] {
        assert!(harness.tasks.create_task(&seeded.owner, input).await.is_ok());
    }

    let summary = harness
        .tasks
        .get_summary(&seeded.owner, project_id)
        .await
        .unwrap_or_else(|_| unreachable!());
    assert_eq!(summary.counts.created, 3);
    assert_eq!(summary.counts.due, 1);
    assert_eq!(summary.counts.overdue, 1);
    assert_eq!(summary.counts.completed, 0);
    assert_eq!(summary.statuses[0].task_count, 3);
    assert!(!summary.recent_activities.is_empty());
}

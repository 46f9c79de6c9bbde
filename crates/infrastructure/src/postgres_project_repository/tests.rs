use uuid::Uuid;
use workhive_application::{CreateSprintInput, ProjectRepository};
use workhive_core::AppError;
use workhive_domain::SprintState;

use super::PostgresProjectRepository;
use crate::postgres_test_support::{seed, services, task_input, test_pool};

#[tokio::test]
async fn project_creation_stores_canonical_board_and_default_sprint() {
    let Some(pool) = test_pool().await else {
        return;
    };
    let services = services(pool.clone());
    let seeded = seed(&services, "Launch").await;
    let repository = PostgresProjectRepository::new(pool);

    let board = repository
        .find_board(seeded.workspace_id, seeded.project.project_id)
        .await;
    assert!(board.is_ok());
    let board = board.unwrap_or_else(|_| unreachable!());
    let names: Vec<&str> = board
        .columns()
        .iter()
        .map(|column| column.name.as_str())
        .collect();
    assert_eq!(names, vec!["To Do", "In Progress", "Done"]);
    assert!(board.initial_column().is_ok_and(|column| column.position == 0));

    let sprints = repository
        .list_sprints(seeded.workspace_id, seeded.project.project_id)
        .await
        .unwrap_or_else(|_| unreachable!());
    assert_eq!(sprints.len(), 1);
    assert_eq!(sprints[0].name.as_str(), "Launch Sprint");
    assert_eq!(sprints[0].state, SprintState::Inactive);
}

#[tokio::test]
async fn sprint_positions_grow_and_single_active_is_enforced() {
    let Some(pool) = test_pool().await else {
        return;
    };
    let services = services(pool);
    let seeded = seed(&services, "Launch").await;
    let project_id = seeded.project.project_id;

    let next = services
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
    let sprints = services
        .projects
        .list_sprints(&seeded.owner, project_id)
        .await
        .unwrap_or_else(|_| unreachable!());
    assert_eq!(sprints.len(), 2);
    assert!(next.position > sprints[0].position);

    let started = services
        .projects
        .start_sprint(&seeded.owner, sprints[0].sprint_id)
        .await;
    assert!(started.is_ok_and(|sprint| sprint.start_date.is_some()));

    let second = services
        .projects
        .start_sprint(&seeded.owner, next.sprint_id)
        .await;
    assert!(matches!(second, Err(AppError::Conflict(_))));

    let completed = services
        .projects
        .complete_sprint(&seeded.owner, sprints[0].sprint_id)
        .await;
    assert!(completed.is_ok_and(|sprint| sprint.state == SprintState::Completed));

    let now_allowed = services
        .projects
        .start_sprint(&seeded.owner, next.sprint_id)
        .await;
    assert!(now_allowed.is_ok());
}

#[tokio::test]
async fn completed_sprint_rejects_cards_and_deleting_a_sprint_returns_cards_to_backlog() {
    let Some(pool) = test_pool().await else {
        return;
    };
    let services = services(pool);
    let seeded = seed(&services, "Launch").await;
    let project_id = seeded.project.project_id;
    let created = services
        .tasks
        .create_task(&seeded.owner, task_input(project_id, "Draft plan"))
        .await
        .unwrap_or_else(|_| unreachable!());
    let sprint = services
        .projects
        .create_sprint(
            &seeded.owner,
            CreateSprintInput {
                project_id,
                name: "Short".to_owned(),
                goal: None,
            },
        )
        .await
        .unwrap_or_else(|_| unreachable!());

    let planned = services
        .projects
        .move_card_to_sprint(&seeded.owner, created.card.card_id, sprint.sprint_id)
        .await;
    assert!(planned.is_ok_and(|card| card.sprint_id == Some(sprint.sprint_id)));

    let deleted = services
        .projects
        .delete_sprint(&seeded.owner, sprint.sprint_id)
        .await;
    assert!(deleted.is_ok());

    let backlog = services
        .projects
        .get_backlog(&seeded.owner, project_id)
        .await
        .unwrap_or_else(|_| unreachable!());
    let backlog_cards: Vec<Uuid> = backlog
        .backlog
        .iter()
        .map(|entry| entry.card.card_id)
        .collect();
    assert_eq!(backlog_cards, vec![created.card.card_id]);

    let default_sprint = backlog.sprints[0].sprint.sprint_id;
    let started = services
        .projects
        .start_sprint(&seeded.owner, default_sprint)
        .await;
    assert!(started.is_ok());
    let completed = services
        .projects
        .complete_sprint(&seeded.owner, default_sprint)
        .await;
    assert!(completed.is_ok());

    let rejected = services
        .projects
        .move_card_to_sprint(&seeded.owner, created.card.card_id, default_sprint)
        .await;
    assert!(matches!(rejected, Err(AppError::Conflict(_))));
}

#[tokio::test]
async fn column_moves_keep_the_first_completion_stamp() {
    let Some(pool) = test_pool().await else {
        return;
    };
    let services = services(pool.clone());
    let seeded = seed(&services, "Launch").await;
    let project_id = seeded.project.project_id;
    let created = services
        .tasks
        .create_task(&seeded.owner, task_input(project_id, "Ship it"))
        .await
        .unwrap_or_else(|_| unreachable!());
    let board = PostgresProjectRepository::new(pool)
        .find_board(seeded.workspace_id, project_id)
        .await
        .unwrap_or_else(|_| unreachable!());
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

    let completed = services
        .projects
        .move_card_to_column(&seeded.owner, created.card.card_id, done)
        .await
        .unwrap_or_else(|_| unreachable!());
    let first_stamp = completed.task.completed_at;
    assert!(first_stamp.is_some());

    let again = services
        .projects
        .move_card_to_column(&seeded.owner, created.card.card_id, done)
        .await
        .unwrap_or_else(|_| unreachable!());
    assert_eq!(again.task.completed_at, first_stamp);

    let reopened = services
        .projects
        .move_card_to_column(&seeded.owner, created.card.card_id, todo)
        .await
        .unwrap_or_else(|_| unreachable!());
    assert!(reopened.task.completed_at.is_none());
    assert_eq!(reopened.card.column_id, todo);

    let foreign_column = services
        .projects
        .move_card_to_column(&seeded.owner, created.card.card_id, Uuid::new_v4())
        .await;
    assert!(matches!(foreign_column, Err(AppError::NotFound(_))));
}

#[tokio::test]
async fn other_workspaces_cannot_reach_project_rows() {
    let Some(pool) = test_pool().await else {
        return;
    };
    let services = services(pool.clone());
    let first = seed(&services, "Launch").await;
    let second = seed(&services, "Orbit").await;
    let repository = PostgresProjectRepository::new(pool);

    let project = repository
        .find_project(second.workspace_id, first.project.project_id)
        .await;
    assert!(project.is_ok_and(|project| project.is_none()));

    let board = repository
        .find_board(second.workspace_id, first.project.project_id)
        .await;
    assert!(matches!(board, Err(AppError::NotFound(_))));

    let deleted = repository
        .delete_project(second.workspace_id, first.project.project_id)
        .await;
    assert!(matches!(deleted, Err(AppError::NotFound(_))));
}

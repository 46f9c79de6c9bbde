use workhive_application::TaskRepository;
use workhive_core::AppError;
use workhive_domain::TaskUpdate;

use super::PostgresTaskRepository;
use crate::postgres_test_support::{join_as_member, register, seed, services, task_input, test_pool};

#[tokio::test]
async fn concurrent_task_creation_draws_distinct_keys() {
    let Some(pool) = test_pool().await else {
        return;
    };
    let services = services(pool);
    let seeded = seed(&services, "Launch").await;
    let project_id = seeded.project.project_id;

    let (left, middle, right) = tokio::join!(
        services
            .tasks
            .create_task(&seeded.owner, task_input(project_id, "Left")),
        services
            .tasks
            .create_task(&seeded.owner, task_input(project_id, "Middle")),
        services
            .tasks
            .create_task(&seeded.owner, task_input(project_id, "Right")),
    );

    let mut keys: Vec<String> = [left, middle, right]
        .into_iter()
        .map(|created| created.unwrap_or_else(|_| unreachable!()).task.key.to_string())
        .collect();
    keys.sort();
    assert_eq!(keys, vec!["LAUNCH-1", "LAUNCH-2", "LAUNCH-3"]);
}

#[tokio::test]
async fn subtasks_extend_parent_key_and_cascade_on_delete() {
    let Some(pool) = test_pool().await else {
        return;
    };
    let services = services(pool.clone());
    let seeded = seed(&services, "Launch").await;
    let parent = services
        .tasks
        .create_task(&seeded.owner, task_input(seeded.project.project_id, "Parent"))
        .await
        .unwrap_or_else(|_| unreachable!());

    let first = services
        .tasks
        .add_subtask(&seeded.owner, parent.task.task_id, "First step")
        .await
        .unwrap_or_else(|_| unreachable!());
    let second = services
        .tasks
        .add_subtask(&seeded.owner, parent.task.task_id, "Second step")
        .await
        .unwrap_or_else(|_| unreachable!());
    assert_eq!(first.key.as_str(), "LAUNCH-1-1");
    assert_eq!(second.key.as_str(), "LAUNCH-1-2");
    assert_eq!(first.parent_id, Some(parent.task.task_id));

    let repository = PostgresTaskRepository::new(pool);
    let subtask_card = repository
        .find_card_for_task(seeded.workspace_id, first.task_id)
        .await;
    assert!(subtask_card.is_ok_and(|card| card.is_none()));

    let deleted = services
        .tasks
        .delete_task(&seeded.owner, parent.task.task_id)
        .await;
    assert!(deleted.is_ok());

    let orphan = repository
        .find_task(seeded.workspace_id, first.task_id)
        .await;
    assert!(orphan.is_ok_and(|task| task.is_none()));
    let remaining = repository
        .list_tasks(seeded.workspace_id, seeded.project.project_id)
        .await;
    assert!(remaining.is_ok_and(|tasks| tasks.is_empty()));
}

#[tokio::test]
async fn dependency_edges_reject_duplicates_and_cycles() {
    let Some(pool) = test_pool().await else {
        return;
    };
    let services = services(pool);
    let seeded = seed(&services, "Launch").await;
    let project_id = seeded.project.project_id;
    let mut tasks = Vec::new();
    for description in ["Design", "Build", "Ship"] {
        tasks.push(
            services
                .tasks
                .create_task(&seeded.owner, task_input(project_id, description))
                .await
                .unwrap_or_else(|_| unreachable!())
                .task
                .task_id,
        );
    }

    let build_after_design = services
        .tasks
        .add_dependency(&seeded.owner, tasks[1], tasks[0])
        .await;
    assert!(build_after_design.is_ok());
    let ship_after_build = services
        .tasks
        .add_dependency(&seeded.owner, tasks[2], tasks[1])
        .await;
    assert!(ship_after_build.is_ok());

    let duplicate = services
        .tasks
        .add_dependency(&seeded.owner, tasks[2], tasks[1])
        .await;
    assert!(
        matches!(duplicate, Err(AppError::Conflict(message)) if message == "task already depends on that task")
    );

    let cycle = services
        .tasks
        .add_dependency(&seeded.owner, tasks[0], tasks[2])
        .await;
    assert!(
        matches!(cycle, Err(AppError::Conflict(message)) if message == "dependency would create a cycle")
    );

    let removed = services
        .tasks
        .remove_dependency(&seeded.owner, tasks[2], tasks[1])
        .await;
    assert!(removed.is_ok());
    let removed_again = services
        .tasks
        .remove_dependency(&seeded.owner, tasks[2], tasks[1])
        .await;
    assert!(matches!(removed_again, Err(AppError::NotFound(_))));
}

#[tokio::test]
async fn checklist_items_append_in_order_and_toggle() {
    let Some(pool) = test_pool().await else {
        return;
    };
    let services = services(pool);
    let seeded = seed(&services, "Launch").await;
    let created = services
        .tasks
        .create_task(&seeded.owner, task_input(seeded.project.project_id, "Draft plan"))
        .await
        .unwrap_or_else(|_| unreachable!());

    let outline = services
        .tasks
        .add_checklist_item(&seeded.owner, created.task.task_id, "Outline")
        .await
        .unwrap_or_else(|_| unreachable!());
    let review = services
        .tasks
        .add_checklist_item(&seeded.owner, created.task.task_id, "Review")
        .await
        .unwrap_or_else(|_| unreachable!());
    assert_eq!(outline.position, 0);
    assert_eq!(review.position, 1);

    let done = services
        .tasks
        .mark_checklist_item_complete(&seeded.owner, review.item_id)
        .await;
    assert!(done.is_ok_and(|item| item.is_done));

    let details = services
        .tasks
        .get_task(&seeded.owner, created.task.task_id)
        .await
        .unwrap_or_else(|_| unreachable!());
    let contents: Vec<&str> = details
        .checklist
        .iter()
        .map(|item| item.content.as_str())
        .collect();
    assert_eq!(contents, vec!["Outline", "Review"]);
    assert!(details.card.is_some());

    let removed = services
        .tasks
        .remove_checklist_item(&seeded.owner, outline.item_id)
        .await;
    assert!(removed.is_ok());
}

#[tokio::test]
async fn only_active_members_can_be_assigned() {
    let Some(pool) = test_pool().await else {
        return;
    };
    let services = services(pool);
    let seeded = seed(&services, "Launch").await;
    let created = services
        .tasks
        .create_task(&seeded.owner, task_input(seeded.project.project_id, "Draft plan"))
        .await
        .unwrap_or_else(|_| unreachable!());

    let outsider = register(&services, "Eve").await;
    let rejected = services
        .tasks
        .assign_task(&seeded.owner, created.task.task_id, outsider.user_id())
        .await;
    assert!(rejected.is_err());

    let member = join_as_member(&services, &seeded, "Grace").await;
    let assigned = services
        .tasks
        .assign_task(&seeded.owner, created.task.task_id, member.user_id())
        .await;
    assert!(assigned.is_ok_and(|task| task.assignee_id == Some(member.user_id())));

    let updated = services
        .tasks
        .update_task(
            &member,
            created.task.task_id,
            TaskUpdate {
                labels: Some(vec!["docs".to_owned(), "docs".to_owned()]),
                ..TaskUpdate::default()
            },
        )
        .await;
    assert!(updated.is_ok_and(|task| task.labels == vec!["docs".to_owned()]));
}

use workhive_application::ActivityRepository;
use workhive_domain::ActivityType;

use super::PostgresActivityRepository;
use crate::postgres_test_support::{seed, services, task_input, test_pool};

#[tokio::test]
async fn recent_project_activities_are_newest_first_and_limited() {
    let Some(pool) = test_pool().await else {
        return;
    };
    let services = services(pool.clone());
    let seeded = seed(&services, "Launch").await;
    let project_id = seeded.project.project_id;

    for description in ["First", "Second", "Third"] {
        let created = services
            .tasks
            .create_task(&seeded.owner, task_input(project_id, description))
            .await;
        assert!(created.is_ok());
    }

    let repository = PostgresActivityRepository::new(pool);
    let recent = repository
        .list_recent_project_activities(seeded.workspace_id, project_id, 2)
        .await;
    assert!(recent.is_ok());
    let recent = recent.unwrap_or_else(|_| unreachable!());
    assert_eq!(recent.len(), 2);
    assert!(recent[0].created_at >= recent[1].created_at);
    assert!(
        recent
            .iter()
            .all(|activity| activity.activity_type == ActivityType::TaskCreated)
    );
}

#[tokio::test]
async fn project_summary_reads_stored_activity_log() {
    let Some(pool) = test_pool().await else {
        return;
    };
    let services = services(pool);
    let seeded = seed(&services, "Launch").await;
    let project_id = seeded.project.project_id;
    let created = services
        .tasks
        .create_task(&seeded.owner, task_input(project_id, "Draft plan"))
        .await;
    assert!(created.is_ok());

    let summary = services
        .tasks
        .get_summary(&seeded.owner, project_id)
        .await;
    assert!(summary.is_ok());
    let summary = summary.unwrap_or_else(|_| unreachable!());
    assert_eq!(summary.counts.created, 1);
    assert_eq!(summary.statuses.len(), 3);
    assert!(
        summary
            .recent_activities
            .iter()
            .any(|activity| activity.activity_type == ActivityType::TaskCreated)
    );
}

use std::sync::Arc;

use async_trait::async_trait;
use chrono::Utc;
use uuid::Uuid;
use workhive_core::{AppResult, UserId, WorkspaceId};
use workhive_domain::{Activity, ActivityType};

/// Activity payload emitted by application services after a mutation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ActivityEvent {
    /// Workspace scope for the event.
    pub workspace_id: WorkspaceId,
    /// User that performed the change.
    pub actor_id: UserId,
    /// Event kind.
    pub activity_type: ActivityType,
    /// Human-readable description.
    pub description: String,
    /// Related stream.
    pub stream_id: Option<Uuid>,
    /// Related project.
    pub project_id: Option<Uuid>,
    /// Related task.
    pub task_id: Option<Uuid>,
}

impl ActivityEvent {
    /// Creates an event without resource references.
    #[must_use]
    pub fn new(
        workspace_id: WorkspaceId,
        actor_id: UserId,
        activity_type: ActivityType,
        description: impl Into<String>,
    ) -> Self {
        Self {
            workspace_id,
            actor_id,
            activity_type,
            description: description.into(),
            stream_id: None,
            project_id: None,
            task_id: None,
        }
    }

    /// References a stream.
    #[must_use]
    pub fn with_stream(mut self, stream_id: Uuid) -> Self {
        self.stream_id = Some(stream_id);
        self
    }

    /// References a project.
    #[must_use]
    pub fn with_project(mut self, project_id: Uuid) -> Self {
        self.project_id = Some(project_id);
        self
    }

    /// References a task.
    #[must_use]
    pub fn with_task(mut self, task_id: Uuid) -> Self {
        self.task_id = Some(task_id);
        self
    }
}

/// Port for the append-only activity log.
#[async_trait]
pub trait ActivityRepository: Send + Sync {
    /// Persists one activity record.
    async fn append_activity(&self, activity: Activity) -> AppResult<()>;

    /// Lists the most recent activities of a project, newest first.
    async fn list_recent_project_activities(
        &self,
        workspace_id: WorkspaceId,
        project_id: Uuid,
        limit: usize,
    ) -> AppResult<Vec<Activity>>;
}

/// Best-effort activity writer.
///
/// A failed write is logged and never fails the mutation that produced it.
#[derive(Clone)]
pub struct ActivityRecorder {
    repository: Arc<dyn ActivityRepository>,
}

impl ActivityRecorder {
    /// Creates a recorder over an activity repository.
    #[must_use]
    pub fn new(repository: Arc<dyn ActivityRepository>) -> Self {
        Self { repository }
    }

    /// Appends an activity record, logging failures.
    pub async fn record(&self, event: ActivityEvent) {
        let activity_type = event.activity_type;
        let workspace_id = event.workspace_id;
        let activity = Activity {
            activity_id: Uuid::new_v4(),
            activity_type: event.activity_type,
            description: event.description,
            actor_id: event.actor_id,
            workspace_id: event.workspace_id,
            stream_id: event.stream_id,
            project_id: event.project_id,
            task_id: event.task_id,
            channel_id: None,
            created_at: Utc::now(),
        };

        if let Err(error) = self.repository.append_activity(activity).await {
            tracing::warn!(
                %error,
                %workspace_id,
                activity_type = activity_type.as_str(),
                "failed to record activity"
            );
        }
    }

    /// Lists recent project activities.
    pub async fn recent_for_project(
        &self,
        workspace_id: WorkspaceId,
        project_id: Uuid,
        limit: usize,
    ) -> AppResult<Vec<Activity>> {
        self.repository
            .list_recent_project_activities(workspace_id, project_id, limit)
            .await
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use async_trait::async_trait;
    use tokio::sync::Mutex;
    use uuid::Uuid;
    use workhive_core::{AppError, AppResult, UserId, WorkspaceId};
    use workhive_domain::{Activity, ActivityType};

    use super::{ActivityEvent, ActivityRecorder, ActivityRepository};

    #[derive(Default)]
    struct FakeActivityRepository {
        fail: bool,
        activities: Mutex<Vec<Activity>>,
    }

    #[async_trait]
    impl ActivityRepository for FakeActivityRepository {
        async fn append_activity(&self, activity: Activity) -> AppResult<()> {
            if self.fail {
                return Err(AppError::Internal("activity store offline".to_owned()));
            }

            self.activities.lock().await.push(activity);
            Ok(())
        }

        async fn list_recent_project_activities(
            &self,
            _workspace_id: WorkspaceId,
            _project_id: Uuid,
            _limit: usize,
        ) -> AppResult<Vec<Activity>> {
            Ok(self.activities.lock().await.clone())
        }
    }

    #[tokio::test]
    async fn record_persists_event_references() {
        let repository = Arc::new(FakeActivityRepository::default());
        let recorder = ActivityRecorder::new(repository.clone());
        let task_id = Uuid::new_v4();
        let project_id = Uuid::new_v4();

        recorder
            .record(
                ActivityEvent::new(
                    WorkspaceId::new(),
                    UserId::new(),
                    ActivityType::TaskCreated,
                    "created a new task",
                )
                .with_project(project_id)
                .with_task(task_id),
            )
            .await;

        let activities = repository.activities.lock().await;
        assert_eq!(activities.len(), 1);
        assert_eq!(activities[0].task_id, Some(task_id));
        assert_eq!(activities[0].project_id, Some(project_id));
        assert_eq!(activities[0].description, "created a new task");
    }

    #[tokio::test]
    async fn record_swallows_store_failures() {
        let repository = Arc::new(FakeActivityRepository {
            fail: true,
            activities: Mutex::new(Vec::new()),
        });
        let recorder = ActivityRecorder::new(repository.clone());

        recorder
            .record(ActivityEvent::new(
                WorkspaceId::new(),
                UserId::new(),
                ActivityType::TaskUpdated,
                "updated the task",
            ))
            .await;

        assert!(repository.activities.lock().await.is_empty());
    }
}

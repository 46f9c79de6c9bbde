use super::*;

use std::cmp::Reverse;

use workhive_application::ActivityRepository;

#[async_trait]
impl ActivityRepository for InMemoryStore {
    async fn append_activity(&self, activity: Activity) -> AppResult<()> {
        self.state.write().await.activities.push(activity);
        Ok(())
    }

    async fn list_recent_project_activities(
        &self,
        workspace_id: WorkspaceId,
        project_id: Uuid,
        limit: usize,
    ) -> AppResult<Vec<Activity>> {
        let state = self.state.read().await;
        let mut activities: Vec<Activity> = state
            .activities
            .iter()
            .filter(|activity| {
                activity.workspace_id == workspace_id && activity.project_id == Some(project_id)
            })
            .cloned()
            .collect();
        activities.sort_by_key(|activity| Reverse(activity.created_at));
        activities.truncate(limit);

        Ok(activities)
    }
}

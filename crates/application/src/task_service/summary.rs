use super::*;

use workhive_domain::{
    SUMMARY_ACTIVITY_LIMIT, SummaryWindow, count_tasks_by_status, summarize_tasks,
};

use crate::ProjectSummary;

impl TaskService {
    /// Recomputes the project summary over the rolling window.
    pub async fn get_summary(
        &self,
        actor: &ActorContext,
        project_id: Uuid,
    ) -> AppResult<ProjectSummary> {
        let workspace_id = self
            .authorization_service
            .require_workspace(actor, Operation::ReadSummary)
            .await?;

        if self
            .project_repository
            .find_project(workspace_id, project_id)
            .await?
            .is_none()
        {
            return Err(AppError::NotFound(format!(
                "project '{project_id}' does not exist"
            )));
        }

        let board = self
            .project_repository
            .find_board(workspace_id, project_id)
            .await?;
        let tasks = self.repository.list_tasks(workspace_id, project_id).await?;
        let recent_activities = self
            .activity_recorder
            .recent_for_project(workspace_id, project_id, SUMMARY_ACTIVITY_LIMIT)
            .await?;

        Ok(ProjectSummary {
            counts: summarize_tasks(&tasks, SummaryWindow::around(Utc::now())),
            statuses: count_tasks_by_status(board.columns(), &tasks),
            recent_activities,
        })
    }
}

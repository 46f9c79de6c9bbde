use super::*;

use workhive_domain::validate_sprint_schedule;

use crate::{CreateSprintInput, SprintTransition, UpdateSprintInput};

impl ProjectService {
    /// Creates an Inactive sprint after the project's last sprint.
    pub async fn create_sprint(
        &self,
        actor: &ActorContext,
        input: CreateSprintInput,
    ) -> AppResult<Sprint> {
        let workspace_id = self
            .authorization_service
            .require_workspace(actor, Operation::CreateSprint)
            .await?;

        let project = self.load_project(workspace_id, input.project_id).await?;
        let sprint = self
            .repository
            .create_sprint(
                workspace_id,
                Sprint {
                    sprint_id: Uuid::new_v4(),
                    project_id: project.project_id,
                    name: NonEmptyString::new(input.name.trim())?,
                    goal: non_blank(input.goal),
                    position: 0,
                    state: SprintState::Inactive,
                    start_date: None,
                    end_date: None,
                },
            )
            .await?;

        self.record_sprint_event(
            workspace_id,
            actor,
            &sprint,
            ActivityType::SprintCreated,
            format!("created the sprint {}", sprint.name),
        )
        .await;

        Ok(sprint)
    }

    /// Lists sprints of a project by position.
    pub async fn list_sprints(
        &self,
        actor: &ActorContext,
        project_id: Uuid,
    ) -> AppResult<Vec<Sprint>> {
        let workspace_id = self
            .authorization_service
            .require_workspace(actor, Operation::ListSprints)
            .await?;

        self.load_project(workspace_id, project_id).await?;
        self.repository.list_sprints(workspace_id, project_id).await
    }

    /// Updates sprint name, goal and schedule.
    pub async fn update_sprint(
        &self,
        actor: &ActorContext,
        sprint_id: Uuid,
        input: UpdateSprintInput,
    ) -> AppResult<Sprint> {
        let workspace_id = self
            .authorization_service
            .require_workspace(actor, Operation::UpdateSprint)
            .await?;

        let mut sprint = self.load_sprint(workspace_id, sprint_id).await?;
        if let Some(name) = input.name {
            sprint.name = NonEmptyString::new(name.trim())?;
        }
        if let Some(goal) = input.goal {
            sprint.goal = non_blank(goal);
        }
        if let Some(start_date) = input.start_date {
            sprint.start_date = start_date;
        }
        if let Some(end_date) = input.end_date {
            sprint.end_date = end_date;
        }
        validate_sprint_schedule(sprint.start_date, sprint.end_date)?;

        let sprint = self.repository.save_sprint(workspace_id, sprint).await?;

        self.record_sprint_event(
            workspace_id,
            actor,
            &sprint,
            ActivityType::SprintUpdated,
            format!("updated the sprint {}", sprint.name),
        )
        .await;

        Ok(sprint)
    }

    /// Moves an Inactive sprint to Active.
    pub async fn start_sprint(&self, actor: &ActorContext, sprint_id: Uuid) -> AppResult<Sprint> {
        let workspace_id = self
            .authorization_service
            .require_workspace(actor, Operation::StartSprint)
            .await?;

        let sprint = self
            .transition(workspace_id, sprint_id, SprintState::Active)
            .await?;

        self.record_sprint_event(
            workspace_id,
            actor,
            &sprint,
            ActivityType::SprintStarted,
            format!("started the sprint {}", sprint.name),
        )
        .await;

        Ok(sprint)
    }

    /// Moves an Active sprint to Completed.
    pub async fn complete_sprint(
        &self,
        actor: &ActorContext,
        sprint_id: Uuid,
    ) -> AppResult<Sprint> {
        let workspace_id = self
            .authorization_service
            .require_workspace(actor, Operation::CompleteSprint)
            .await?;

        let sprint = self
            .transition(workspace_id, sprint_id, SprintState::Completed)
            .await?;

        self.record_sprint_event(
            workspace_id,
            actor,
            &sprint,
            ActivityType::SprintCompleted,
            format!("completed the sprint {}", sprint.name),
        )
        .await;

        Ok(sprint)
    }

    /// Deletes a sprint; its cards return to the backlog.
    pub async fn delete_sprint(&self, actor: &ActorContext, sprint_id: Uuid) -> AppResult<()> {
        let workspace_id = self
            .authorization_service
            .require_workspace(actor, Operation::DeleteSprint)
            .await?;

        let sprint = self.load_sprint(workspace_id, sprint_id).await?;
        self.repository.delete_sprint(workspace_id, sprint_id).await?;

        self.record_sprint_event(
            workspace_id,
            actor,
            &sprint,
            ActivityType::SprintDeleted,
            format!("deleted the sprint {}", sprint.name),
        )
        .await;

        Ok(())
    }

    async fn transition(
        &self,
        workspace_id: WorkspaceId,
        sprint_id: Uuid,
        next: SprintState,
    ) -> AppResult<Sprint> {
        let sprint = self.load_sprint(workspace_id, sprint_id).await?;
        sprint.state.transition_to(next)?;

        self.repository
            .transition_sprint(
                workspace_id,
                SprintTransition {
                    sprint_id,
                    from: sprint.state,
                    to: next,
                    at: Utc::now(),
                    enforce_single_active: self.policy.enforce_single_active_sprint,
                },
            )
            .await
    }

    pub(super) async fn load_sprint(
        &self,
        workspace_id: WorkspaceId,
        sprint_id: Uuid,
    ) -> AppResult<Sprint> {
        self.repository
            .find_sprint(workspace_id, sprint_id)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("sprint '{sprint_id}' does not exist")))
    }

    async fn record_sprint_event(
        &self,
        workspace_id: WorkspaceId,
        actor: &ActorContext,
        sprint: &Sprint,
        activity_type: ActivityType,
        description: String,
    ) {
        self.activity_recorder
            .record(
                ActivityEvent::new(workspace_id, actor.user_id(), activity_type, description)
                    .with_project(sprint.project_id),
            )
            .await;
    }
}

use std::sync::Arc;

use chrono::Utc;
use uuid::Uuid;
use workhive_core::{ActorContext, AppError, AppResult, NonEmptyString, WorkspaceId};
use workhive_domain::{
    ActivityType, Board, Operation, Project, Sprint, SprintState, validate_project_name,
};

use crate::{
    ActivityEvent, ActivityRecorder, AuthorizationService, CreateProjectInput, ProjectProvisioning,
    ProjectRepository, StreamRepository, UpdateProjectInput, WorkflowPolicy,
};

mod board;
mod cards;
mod sprints;

/// Position of the sprint provisioned with every project.
const DEFAULT_SPRINT_POSITION: i32 = 1;

/// Project workflow engine: projects, boards, sprints and card placement.
#[derive(Clone)]
pub struct ProjectService {
    authorization_service: AuthorizationService,
    repository: Arc<dyn ProjectRepository>,
    stream_repository: Arc<dyn StreamRepository>,
    activity_recorder: ActivityRecorder,
    policy: WorkflowPolicy,
}

impl ProjectService {
    /// Creates a project service.
    #[must_use]
    pub fn new(
        authorization_service: AuthorizationService,
        repository: Arc<dyn ProjectRepository>,
        stream_repository: Arc<dyn StreamRepository>,
        activity_recorder: ActivityRecorder,
        policy: WorkflowPolicy,
    ) -> Self {
        Self {
            authorization_service,
            repository,
            stream_repository,
            activity_recorder,
            policy,
        }
    }

    /// Creates a project with its canonical board and default sprint.
    pub async fn create_project(
        &self,
        actor: &ActorContext,
        input: CreateProjectInput,
    ) -> AppResult<Project> {
        let workspace_id = self
            .authorization_service
            .require_workspace(actor, Operation::CreateProject)
            .await?;

        if self
            .stream_repository
            .find_stream(workspace_id, input.stream_id)
            .await?
            .is_none()
        {
            return Err(AppError::NotFound(format!(
                "stream '{}' does not exist",
                input.stream_id
            )));
        }
        if let Some(team_id) = input.team_id {
            self.require_team_in_stream(workspace_id, team_id, input.stream_id)
                .await?;
        }

        let name = validate_project_name(input.name)?;
        let project_id = Uuid::new_v4();
        let board = Board::canonical(project_id, name.as_str())?;
        let sprint = Sprint {
            sprint_id: Uuid::new_v4(),
            project_id,
            name: NonEmptyString::new(format!("{name} Sprint"))?,
            goal: None,
            position: DEFAULT_SPRINT_POSITION,
            state: SprintState::Inactive,
            start_date: None,
            end_date: None,
        };
        let project = Project {
            project_id,
            workspace_id,
            stream_id: input.stream_id,
            team_id: input.team_id,
            name,
            description: non_blank(input.description),
            created_by: actor.user_id(),
            created_at: Utc::now(),
        };

        let project = self
            .repository
            .create_project(ProjectProvisioning {
                project,
                board,
                sprint,
            })
            .await?;

        self.activity_recorder
            .record(
                ActivityEvent::new(
                    workspace_id,
                    actor.user_id(),
                    ActivityType::ProjectCreated,
                    format!("created the project {}", project.name),
                )
                .with_stream(project.stream_id)
                .with_project(project.project_id),
            )
            .await;

        Ok(project)
    }

    /// Lists projects of a stream.
    pub async fn list_projects(
        &self,
        actor: &ActorContext,
        stream_id: Uuid,
    ) -> AppResult<Vec<Project>> {
        let workspace_id = self
            .authorization_service
            .require_workspace(actor, Operation::ListProjects)
            .await?;

        self.repository.list_projects(workspace_id, stream_id).await
    }

    /// Returns one project.
    pub async fn get_project(&self, actor: &ActorContext, project_id: Uuid) -> AppResult<Project> {
        let workspace_id = self
            .authorization_service
            .require_workspace(actor, Operation::ReadProject)
            .await?;

        self.load_project(workspace_id, project_id).await
    }

    /// Updates project name and description.
    ///
    /// Existing task keys keep the prefix they were created with.
    pub async fn update_project(
        &self,
        actor: &ActorContext,
        project_id: Uuid,
        input: UpdateProjectInput,
    ) -> AppResult<Project> {
        let workspace_id = self
            .authorization_service
            .require_workspace(actor, Operation::UpdateProject)
            .await?;

        if input.name.is_none() && input.description.is_none() {
            return Err(AppError::Validation(
                "project update must change at least one field".to_owned(),
            ));
        }

        let mut project = self.load_project(workspace_id, project_id).await?;
        if let Some(name) = input.name {
            project.name = validate_project_name(name)?;
        }
        if let Some(description) = input.description {
            project.description = non_blank(description);
        }
        let project = self.repository.save_project(project).await?;

        self.activity_recorder
            .record(
                ActivityEvent::new(
                    workspace_id,
                    actor.user_id(),
                    ActivityType::ProjectUpdated,
                    "updated the project",
                )
                .with_stream(project.stream_id)
                .with_project(project.project_id),
            )
            .await;

        Ok(project)
    }

    /// Assigns the project to a team of its stream, or clears the assignment.
    pub async fn assign_project_to_team(
        &self,
        actor: &ActorContext,
        project_id: Uuid,
        team_id: Option<Uuid>,
    ) -> AppResult<Project> {
        let workspace_id = self
            .authorization_service
            .require_workspace(actor, Operation::AssignProjectTeam)
            .await?;

        let mut project = self.load_project(workspace_id, project_id).await?;
        if let Some(team_id) = team_id {
            self.require_team_in_stream(workspace_id, team_id, project.stream_id)
                .await?;
        }
        project.team_id = team_id;
        let project = self.repository.save_project(project).await?;

        let description = if team_id.is_some() {
            "assigned the project to a team"
        } else {
            "removed the project from its team"
        };
        self.activity_recorder
            .record(
                ActivityEvent::new(
                    workspace_id,
                    actor.user_id(),
                    ActivityType::ProjectUpdated,
                    description,
                )
                .with_stream(project.stream_id)
                .with_project(project.project_id),
            )
            .await;

        Ok(project)
    }

    /// Deletes a project with its board, sprints and tasks.
    pub async fn delete_project(&self, actor: &ActorContext, project_id: Uuid) -> AppResult<()> {
        let workspace_id = self
            .authorization_service
            .require_workspace(actor, Operation::DeleteProject)
            .await?;

        let project = self.load_project(workspace_id, project_id).await?;
        self.repository
            .delete_project(workspace_id, project_id)
            .await?;

        self.activity_recorder
            .record(
                ActivityEvent::new(
                    workspace_id,
                    actor.user_id(),
                    ActivityType::ProjectDeleted,
                    format!("deleted the project {}", project.name),
                )
                .with_stream(project.stream_id),
            )
            .await;

        Ok(())
    }

    async fn load_project(&self, workspace_id: WorkspaceId, project_id: Uuid) -> AppResult<Project> {
        self.repository
            .find_project(workspace_id, project_id)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("project '{project_id}' does not exist")))
    }

    async fn require_team_in_stream(
        &self,
        workspace_id: WorkspaceId,
        team_id: Uuid,
        stream_id: Uuid,
    ) -> AppResult<()> {
        let team = self
            .stream_repository
            .find_team(workspace_id, team_id)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("team '{team_id}' does not exist")))?;

        if team.stream_id != stream_id {
            return Err(AppError::Validation(format!(
                "team '{team_id}' does not belong to stream '{stream_id}'"
            )));
        }

        Ok(())
    }
}

fn non_blank(value: Option<String>) -> Option<String> {
    value
        .map(|value| value.trim().to_owned())
        .filter(|value| !value.is_empty())
}

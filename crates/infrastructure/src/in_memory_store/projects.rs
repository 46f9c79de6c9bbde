use super::*;

use workhive_application::{
    CardColumnMove, CardEntry, ProjectProvisioning, ProjectRepository, SprintTransition,
};
use workhive_domain::SprintState;

#[async_trait]
impl ProjectRepository for InMemoryStore {
    async fn create_project(&self, provisioning: ProjectProvisioning) -> AppResult<Project> {
        let mut state = self.state.write().await;
        let ProjectProvisioning {
            project,
            board,
            sprint,
        } = provisioning;

        if state.stream(project.workspace_id, project.stream_id).is_none() {
            return Err(AppError::NotFound(format!(
                "stream '{}' does not exist",
                project.stream_id
            )));
        }

        state.boards.insert(project.project_id, board);
        state.sprints.insert(sprint.sprint_id, sprint);
        state.task_sequences.insert(project.project_id, 0);
        state.projects.insert(project.project_id, project.clone());

        Ok(project)
    }

    async fn find_project(
        &self,
        workspace_id: WorkspaceId,
        project_id: Uuid,
    ) -> AppResult<Option<Project>> {
        Ok(self
            .state
            .read()
            .await
            .project(workspace_id, project_id)
            .ok()
            .cloned())
    }

    async fn list_projects(
        &self,
        workspace_id: WorkspaceId,
        stream_id: Uuid,
    ) -> AppResult<Vec<Project>> {
        let state = self.state.read().await;
        let mut projects: Vec<Project> = state
            .projects
            .values()
            .filter(|project| project.workspace_id == workspace_id && project.stream_id == stream_id)
            .cloned()
            .collect();
        projects.sort_by_key(|project| project.created_at);

        Ok(projects)
    }

    async fn save_project(&self, project: Project) -> AppResult<Project> {
        let mut state = self.state.write().await;
        state.project(project.workspace_id, project.project_id)?;
        state.projects.insert(project.project_id, project.clone());

        Ok(project)
    }

    async fn delete_project(&self, workspace_id: WorkspaceId, project_id: Uuid) -> AppResult<()> {
        let mut state = self.state.write().await;
        state.project(workspace_id, project_id)?;
        state.remove_projects(&[project_id]);

        Ok(())
    }

    async fn find_board(&self, workspace_id: WorkspaceId, project_id: Uuid) -> AppResult<Board> {
        let state = self.state.read().await;
        state.project(workspace_id, project_id)?;

        state.boards.get(&project_id).cloned().ok_or_else(|| {
            AppError::NotFound(format!("project '{project_id}' has no board"))
        })
    }

    async fn list_card_entries(
        &self,
        workspace_id: WorkspaceId,
        project_id: Uuid,
    ) -> AppResult<Vec<CardEntry>> {
        let state = self.state.read().await;
        state.project(workspace_id, project_id)?;

        let mut entries: Vec<CardEntry> = state
            .cards
            .values()
            .filter(|card| card.project_id == project_id)
            .filter_map(|card| {
                state.tasks.get(&card.task_id).map(|task| CardEntry {
                    card: card.clone(),
                    task: task.clone(),
                })
            })
            .collect();
        entries.sort_by_key(|entry| entry.card.position);

        Ok(entries)
    }

    async fn find_card(&self, workspace_id: WorkspaceId, card_id: Uuid) -> AppResult<Option<Card>> {
        Ok(self
            .state
            .read()
            .await
            .card(workspace_id, card_id)
            .ok()
            .cloned())
    }

    async fn create_sprint(&self, workspace_id: WorkspaceId, mut sprint: Sprint) -> AppResult<Sprint> {
        let mut state = self.state.write().await;
        state.project(workspace_id, sprint.project_id)?;

        sprint.position = state
            .sprints
            .values()
            .filter(|stored| stored.project_id == sprint.project_id)
            .map(|stored| stored.position)
            .max()
            .unwrap_or(0)
            + 1;
        state.sprints.insert(sprint.sprint_id, sprint.clone());

        Ok(sprint)
    }

    async fn list_sprints(
        &self,
        workspace_id: WorkspaceId,
        project_id: Uuid,
    ) -> AppResult<Vec<Sprint>> {
        let state = self.state.read().await;
        state.project(workspace_id, project_id)?;

        let mut sprints: Vec<Sprint> = state
            .sprints
            .values()
            .filter(|sprint| sprint.project_id == project_id)
            .cloned()
            .collect();
        sprints.sort_by_key(|sprint| sprint.position);

        Ok(sprints)
    }

    async fn find_sprint(
        &self,
        workspace_id: WorkspaceId,
        sprint_id: Uuid,
    ) -> AppResult<Option<Sprint>> {
        Ok(self
            .state
            .read()
            .await
            .sprint(workspace_id, sprint_id)
            .ok()
            .cloned())
    }

    async fn save_sprint(&self, workspace_id: WorkspaceId, sprint: Sprint) -> AppResult<Sprint> {
        let mut state = self.state.write().await;
        state.sprint(workspace_id, sprint.sprint_id)?;

        let stored = state.sprints.get_mut(&sprint.sprint_id).ok_or_else(|| {
            AppError::NotFound(format!("sprint '{}' does not exist", sprint.sprint_id))
        })?;
        stored.name = sprint.name;
        stored.goal = sprint.goal;
        stored.start_date = sprint.start_date;
        stored.end_date = sprint.end_date;

        Ok(stored.clone())
    }

    async fn transition_sprint(
        &self,
        workspace_id: WorkspaceId,
        transition: SprintTransition,
    ) -> AppResult<Sprint> {
        let mut state = self.state.write().await;
        let current = state.sprint(workspace_id, transition.sprint_id)?;
        if current.state != transition.from {
            return Err(AppError::Conflict(format!(
                "sprint '{}' is {}, expected {}",
                transition.sprint_id,
                current.state.as_str(),
                transition.from.as_str()
            )));
        }

        let project_id = current.project_id;
        if transition.to == SprintState::Active
            && transition.enforce_single_active
            && state.sprints.values().any(|sprint| {
                sprint.project_id == project_id
                    && sprint.sprint_id != transition.sprint_id
                    && sprint.state == SprintState::Active
            })
        {
            return Err(AppError::Conflict(format!(
                "project '{project_id}' already has an active sprint"
            )));
        }

        let sprint = state
            .sprints
            .get_mut(&transition.sprint_id)
            .ok_or_else(|| {
                AppError::NotFound(format!("sprint '{}' does not exist", transition.sprint_id))
            })?;
        sprint.transition(transition.to, transition.at)?;

        Ok(sprint.clone())
    }

    async fn delete_sprint(&self, workspace_id: WorkspaceId, sprint_id: Uuid) -> AppResult<()> {
        let mut state = self.state.write().await;
        state.sprint(workspace_id, sprint_id)?;

        for card in state.cards.values_mut() {
            if card.sprint_id == Some(sprint_id) {
                card.sprint_id = None;
            }
        }
        state.sprints.remove(&sprint_id);

        Ok(())
    }

    async fn move_card_to_sprint(
        &self,
        workspace_id: WorkspaceId,
        card_id: Uuid,
        sprint_id: Option<Uuid>,
    ) -> AppResult<Card> {
        let mut state = self.state.write().await;
        let project_id = state.card(workspace_id, card_id)?.project_id;

        if let Some(sprint_id) = sprint_id {
            let sprint = state
                .sprint(workspace_id, sprint_id)
                .ok()
                .filter(|sprint| sprint.project_id == project_id)
                .ok_or_else(|| {
                    AppError::NotFound(format!(
                        "sprint '{sprint_id}' does not exist in the card's project"
                    ))
                })?;
            if sprint.state == SprintState::Completed {
                return Err(AppError::Conflict(format!(
                    "sprint '{sprint_id}' is already completed"
                )));
            }
        }

        let card = state
            .cards
            .get_mut(&card_id)
            .ok_or_else(|| AppError::NotFound(format!("card '{card_id}' does not exist")))?;
        card.sprint_id = sprint_id;

        Ok(card.clone())
    }

    async fn move_card_to_column(
        &self,
        workspace_id: WorkspaceId,
        change: CardColumnMove,
    ) -> AppResult<CardEntry> {
        let mut guard = self.state.write().await;
        let state = &mut *guard;
        let card = state.card(workspace_id, change.card_id)?;
        let (project_id, task_id) = (card.project_id, card.task_id);

        let column_matches = state.boards.get(&project_id).is_some_and(|board| {
            board
                .column(change.column_id)
                .is_some_and(|column| column.status.status_id == change.status_id)
        });
        if !column_matches {
            return Err(AppError::NotFound(format!(
                "column '{}' does not exist on the card's board",
                change.column_id
            )));
        }

        let task = state
            .tasks
            .get_mut(&task_id)
            .ok_or_else(|| AppError::NotFound(format!("task '{task_id}' does not exist")))?;
        let previous_completion = task.completed_at;
        task.status_id = change.status_id;
        task.completed_at = change
            .completed_at
            .map(|completed_at| previous_completion.unwrap_or(completed_at));
        task.updated_at = change.updated_at;
        let task = task.clone();

        let card = state
            .cards
            .get_mut(&change.card_id)
            .ok_or_else(|| {
                AppError::NotFound(format!("card '{}' does not exist", change.card_id))
            })?;
        card.column_id = change.column_id;

        Ok(CardEntry {
            card: card.clone(),
            task,
        })
    }
}

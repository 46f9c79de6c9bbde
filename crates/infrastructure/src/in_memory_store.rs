use std::collections::HashMap;

use async_trait::async_trait;
use tokio::sync::RwLock;
use uuid::Uuid;
use workhive_application::{AuthorizationRepository, MemberAccess};
use workhive_core::{AppError, AppResult, UserId, WorkspaceId};
use workhive_domain::{
    Activity, Board, Card, ChecklistItem, Permission, Project, Role, Sprint, Stream, StreamMember,
    Task, TaskDependency, Team, TeamMember, UserAccount, Workspace, WorkspaceMember,
};

mod activities;
mod projects;
mod security;
mod tasks;
mod workspaces;

#[cfg(test)]
mod tests;

/// In-memory store implementing every repository port.
///
/// All state sits behind one lock so each port call is atomic, which gives
/// the same guarantees as the PostgreSQL adapters' transactions.
#[derive(Debug, Default)]
pub struct InMemoryStore {
    state: RwLock<StoreState>,
}

impl InMemoryStore {
    /// Creates an empty store.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }
}

#[derive(Debug, Default)]
struct StoreState {
    users: HashMap<UserId, UserAccount>,
    workspaces: HashMap<WorkspaceId, Workspace>,
    roles: HashMap<Uuid, Role>,
    permissions: HashMap<Uuid, Permission>,
    members: Vec<WorkspaceMember>,
    streams: HashMap<Uuid, Stream>,
    teams: HashMap<Uuid, Team>,
    stream_members: Vec<StreamMember>,
    team_members: Vec<TeamMember>,
    projects: HashMap<Uuid, Project>,
    boards: HashMap<Uuid, Board>,
    sprints: HashMap<Uuid, Sprint>,
    cards: HashMap<Uuid, Card>,
    tasks: HashMap<Uuid, Task>,
    task_sequences: HashMap<Uuid, i64>,
    subtask_sequences: HashMap<Uuid, i64>,
    dependencies: Vec<TaskDependency>,
    checklist_items: HashMap<Uuid, ChecklistItem>,
    activities: Vec<Activity>,
}

impl StoreState {
    fn role(&self, workspace_id: WorkspaceId, role_id: Uuid) -> AppResult<&Role> {
        self.roles
            .get(&role_id)
            .filter(|role| role.workspace_id == workspace_id)
            .ok_or_else(|| AppError::NotFound(format!("role '{role_id}' does not exist")))
    }

    fn role_permissions(&self, role_id: Uuid) -> Vec<Permission> {
        let mut permissions: Vec<Permission> = self
            .permissions
            .values()
            .filter(|permission| permission.role_id() == role_id)
            .cloned()
            .collect();
        permissions.sort_by_key(|permission| {
            (
                permission.resource_type().as_str(),
                permission.action().as_str(),
            )
        });
        permissions
    }

    fn member(&self, workspace_id: WorkspaceId, user_id: UserId) -> Option<&WorkspaceMember> {
        self.members
            .iter()
            .find(|member| member.workspace_id == workspace_id && member.user_id == user_id)
    }

    fn member_mut(
        &mut self,
        workspace_id: WorkspaceId,
        user_id: UserId,
    ) -> AppResult<&mut WorkspaceMember> {
        self.members
            .iter_mut()
            .find(|member| member.workspace_id == workspace_id && member.user_id == user_id)
            .ok_or_else(|| {
                AppError::NotFound(format!(
                    "user '{user_id}' is not a member of workspace '{workspace_id}'"
                ))
            })
    }

    fn stream(&self, workspace_id: WorkspaceId, stream_id: Uuid) -> Option<&Stream> {
        self.streams
            .get(&stream_id)
            .filter(|stream| stream.workspace_id == workspace_id)
    }

    fn team(&self, workspace_id: WorkspaceId, team_id: Uuid) -> AppResult<&Team> {
        self.teams
            .get(&team_id)
            .filter(|team| team.workspace_id == workspace_id)
            .ok_or_else(|| AppError::NotFound(format!("team '{team_id}' does not exist")))
    }

    /// Drops stream and team memberships whose stream or team is gone.
    fn prune_memberships(&mut self) {
        let streams = &self.streams;
        self.stream_members
            .retain(|member| streams.contains_key(&member.stream_id));
        let teams = &self.teams;
        self.team_members
            .retain(|member| teams.contains_key(&member.team_id));
    }

    fn project(&self, workspace_id: WorkspaceId, project_id: Uuid) -> AppResult<&Project> {
        self.projects
            .get(&project_id)
            .filter(|project| project.workspace_id == workspace_id)
            .ok_or_else(|| AppError::NotFound(format!("project '{project_id}' does not exist")))
    }

    fn sprint(&self, workspace_id: WorkspaceId, sprint_id: Uuid) -> AppResult<&Sprint> {
        self.sprints
            .get(&sprint_id)
            .filter(|sprint| self.project(workspace_id, sprint.project_id).is_ok())
            .ok_or_else(|| AppError::NotFound(format!("sprint '{sprint_id}' does not exist")))
    }

    fn card(&self, workspace_id: WorkspaceId, card_id: Uuid) -> AppResult<&Card> {
        self.cards
            .get(&card_id)
            .filter(|card| self.project(workspace_id, card.project_id).is_ok())
            .ok_or_else(|| AppError::NotFound(format!("card '{card_id}' does not exist")))
    }

    fn task(&self, workspace_id: WorkspaceId, task_id: Uuid) -> AppResult<&Task> {
        self.tasks
            .get(&task_id)
            .filter(|task| self.project(workspace_id, task.project_id).is_ok())
            .ok_or_else(|| AppError::NotFound(format!("task '{task_id}' does not exist")))
    }

    fn checklist_item(&self, workspace_id: WorkspaceId, item_id: Uuid) -> AppResult<&ChecklistItem> {
        self.checklist_items
            .get(&item_id)
            .filter(|item| self.task(workspace_id, item.task_id).is_ok())
            .ok_or_else(|| {
                AppError::NotFound(format!("checklist item '{item_id}' does not exist"))
            })
    }

    /// Removes tasks with every card, edge and checklist item attached to them.
    fn remove_tasks(&mut self, task_ids: &[Uuid]) {
        self.tasks.retain(|task_id, _| !task_ids.contains(task_id));
        self.cards.retain(|_, card| !task_ids.contains(&card.task_id));
        self.dependencies.retain(|dependency| {
            !task_ids.contains(&dependency.task_id)
                && !task_ids.contains(&dependency.depends_on_task_id)
        });
        self.checklist_items
            .retain(|_, item| !task_ids.contains(&item.task_id));
        for task_id in task_ids {
            self.subtask_sequences.remove(task_id);
        }
    }

    fn remove_projects(&mut self, project_ids: &[Uuid]) {
        let task_ids: Vec<Uuid> = self
            .tasks
            .values()
            .filter(|task| project_ids.contains(&task.project_id))
            .map(|task| task.task_id)
            .collect();
        self.remove_tasks(&task_ids);
        self.sprints
            .retain(|_, sprint| !project_ids.contains(&sprint.project_id));
        for project_id in project_ids {
            self.projects.remove(project_id);
            self.boards.remove(project_id);
            self.task_sequences.remove(project_id);
        }
    }
}

#[async_trait]
impl AuthorizationRepository for InMemoryStore {
    async fn find_default_workspace(&self, user_id: UserId) -> AppResult<Option<WorkspaceId>> {
        let state = self.state.read().await;
        Ok(state
            .users
            .get(&user_id)
            .and_then(|user| user.default_workspace_id))
    }

    async fn find_member_access(
        &self,
        workspace_id: WorkspaceId,
        user_id: UserId,
    ) -> AppResult<Option<MemberAccess>> {
        let state = self.state.read().await;
        Ok(state
            .member(workspace_id, user_id)
            .map(|member| MemberAccess {
                permissions: state.role_permissions(member.role_id),
                member: member.clone(),
            }))
    }
}

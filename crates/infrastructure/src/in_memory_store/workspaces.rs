use super::*;

use chrono::Utc;
use workhive_application::{
    MemberListing, StreamRepository, WorkspaceProvisioning, WorkspaceRepository,
};
use workhive_domain::{MembershipStatus, StreamMember, TeamMember};

#[async_trait]
impl WorkspaceRepository for InMemoryStore {
    async fn save_user(&self, user: UserAccount) -> AppResult<UserAccount> {
        let mut state = self.state.write().await;
        let stored = state
            .users
            .entry(user.user_id)
            .and_modify(|stored| {
                stored.display_name = user.display_name.clone();
                stored.email = user.email.clone();
            })
            .or_insert(user);

        Ok(stored.clone())
    }

    async fn find_user(&self, user_id: UserId) -> AppResult<Option<UserAccount>> {
        Ok(self.state.read().await.users.get(&user_id).cloned())
    }

    async fn create_workspace(&self, provisioning: WorkspaceProvisioning) -> AppResult<Workspace> {
        let mut guard = self.state.write().await;
        let state = &mut *guard;
        let WorkspaceProvisioning {
            workspace,
            role,
            permissions,
            owner_membership,
        } = provisioning;

        let owner = state
            .users
            .get_mut(&workspace.owner_id())
            .ok_or_else(|| {
                AppError::NotFound(format!("user '{}' does not exist", workspace.owner_id()))
            })?;
        if owner.default_workspace_id.is_none() {
            owner.default_workspace_id = Some(workspace.workspace_id());
        }

        state.roles.insert(role.role_id, role);
        state.permissions.extend(
            permissions
                .into_iter()
                .map(|permission| (permission.permission_id(), permission)),
        );
        state.members.push(owner_membership);
        state
            .workspaces
            .insert(workspace.workspace_id(), workspace.clone());

        Ok(workspace)
    }

    async fn find_workspace(&self, workspace_id: WorkspaceId) -> AppResult<Option<Workspace>> {
        Ok(self.state.read().await.workspaces.get(&workspace_id).cloned())
    }

    async fn list_workspaces_for_user(&self, user_id: UserId) -> AppResult<Vec<Workspace>> {
        let state = self.state.read().await;
        let mut workspaces: Vec<Workspace> = state
            .members
            .iter()
            .filter(|member| member.user_id == user_id && member.status.is_active())
            .filter_map(|member| state.workspaces.get(&member.workspace_id).cloned())
            .collect();
        workspaces.sort_by_key(Workspace::created_at);

        Ok(workspaces)
    }

    async fn save_workspace(&self, workspace: Workspace) -> AppResult<Workspace> {
        let mut state = self.state.write().await;
        let stored = state
            .workspaces
            .get_mut(&workspace.workspace_id())
            .ok_or_else(|| {
                AppError::NotFound(format!(
                    "workspace '{}' does not exist",
                    workspace.workspace_id()
                ))
            })?;
        *stored = workspace.clone();

        Ok(workspace)
    }

    async fn delete_workspace(&self, workspace_id: WorkspaceId) -> AppResult<()> {
        let mut guard = self.state.write().await;
        let state = &mut *guard;
        if state.workspaces.remove(&workspace_id).is_none() {
            return Err(AppError::NotFound(format!(
                "workspace '{workspace_id}' does not exist"
            )));
        }

        let project_ids: Vec<Uuid> = state
            .projects
            .values()
            .filter(|project| project.workspace_id == workspace_id)
            .map(|project| project.project_id)
            .collect();
        state.remove_projects(&project_ids);

        let role_ids: Vec<Uuid> = state
            .roles
            .values()
            .filter(|role| role.workspace_id == workspace_id)
            .map(|role| role.role_id)
            .collect();
        state
            .permissions
            .retain(|_, permission| !role_ids.contains(&permission.role_id()));
        state.roles.retain(|_, role| role.workspace_id != workspace_id);
        state
            .members
            .retain(|member| member.workspace_id != workspace_id);
        state
            .streams
            .retain(|_, stream| stream.workspace_id != workspace_id);
        state.teams.retain(|_, team| team.workspace_id != workspace_id);
        state.prune_memberships();
        state
            .activities
            .retain(|activity| activity.workspace_id != workspace_id);
        for user in state.users.values_mut() {
            if user.default_workspace_id == Some(workspace_id) {
                user.default_workspace_id = None;
            }
        }

        Ok(())
    }

    async fn find_member(
        &self,
        workspace_id: WorkspaceId,
        user_id: UserId,
    ) -> AppResult<Option<WorkspaceMember>> {
        Ok(self
            .state
            .read()
            .await
            .member(workspace_id, user_id)
            .cloned())
    }

    async fn list_members(&self, workspace_id: WorkspaceId) -> AppResult<Vec<MemberListing>> {
        let state = self.state.read().await;
        let mut members: Vec<MemberListing> = state
            .members
            .iter()
            .filter(|member| member.workspace_id == workspace_id)
            .filter_map(|member| {
                state.users.get(&member.user_id).map(|user| MemberListing {
                    member: member.clone(),
                    user: user.clone(),
                })
            })
            .collect();
        members.sort_by_key(|listing| listing.member.joined_at);

        Ok(members)
    }

    async fn invite_member(&self, member: WorkspaceMember) -> AppResult<WorkspaceMember> {
        let mut state = self.state.write().await;
        if let Ok(existing) = state.member_mut(member.workspace_id, member.user_id) {
            if existing.status != MembershipStatus::Inactive {
                return Err(AppError::Conflict(format!(
                    "user '{}' is already {} in workspace '{}'",
                    member.user_id,
                    existing.status.as_str(),
                    member.workspace_id
                )));
            }

            existing.status = MembershipStatus::Pending;
            existing.role_id = member.role_id;
            existing.joined_at = member.joined_at;
            return Ok(existing.clone());
        }

        state.members.push(member.clone());
        Ok(member)
    }

    async fn activate_member(
        &self,
        workspace_id: WorkspaceId,
        user_id: UserId,
    ) -> AppResult<WorkspaceMember> {
        let mut guard = self.state.write().await;
        let state = &mut *guard;
        let member = state.member_mut(workspace_id, user_id).map_err(|_| {
            AppError::NotFound(format!(
                "no pending invitation for user '{user_id}' in workspace '{workspace_id}'"
            ))
        })?;
        if member.status != MembershipStatus::Pending {
            return Err(AppError::Conflict(format!(
                "membership is {}, not PENDING",
                member.status.as_str()
            )));
        }

        member.status = MembershipStatus::Active;
        member.joined_at = Utc::now();
        let member = member.clone();

        if let Some(user) = state.users.get_mut(&user_id)
            && user.default_workspace_id.is_none()
        {
            user.default_workspace_id = Some(workspace_id);
        }

        Ok(member)
    }

    async fn update_member_status(
        &self,
        workspace_id: WorkspaceId,
        user_id: UserId,
        status: MembershipStatus,
    ) -> AppResult<WorkspaceMember> {
        let mut state = self.state.write().await;
        let member = state.member_mut(workspace_id, user_id)?;
        member.status = status;

        Ok(member.clone())
    }

    async fn update_member_role(
        &self,
        workspace_id: WorkspaceId,
        user_id: UserId,
        role_id: Uuid,
    ) -> AppResult<WorkspaceMember> {
        let mut state = self.state.write().await;
        state.role(workspace_id, role_id)?;
        let member = state.member_mut(workspace_id, user_id)?;
        member.role_id = role_id;

        Ok(member.clone())
    }
}

#[async_trait]
impl StreamRepository for InMemoryStore {
    async fn create_stream(&self, stream: Stream) -> AppResult<Stream> {
        let mut state = self.state.write().await;
        if state.streams.values().any(|stored| {
            stored.workspace_id == stream.workspace_id && stored.name == stream.name
        }) {
            return Err(AppError::Conflict(format!(
                "stream '{}' already exists",
                stream.name
            )));
        }

        state.streams.insert(stream.stream_id, stream.clone());
        Ok(stream)
    }

    async fn list_streams(&self, workspace_id: WorkspaceId) -> AppResult<Vec<Stream>> {
        let state = self.state.read().await;
        let mut streams: Vec<Stream> = state
            .streams
            .values()
            .filter(|stream| stream.workspace_id == workspace_id)
            .cloned()
            .collect();
        streams.sort_by_key(|stream| stream.created_at);

        Ok(streams)
    }

    async fn find_stream(
        &self,
        workspace_id: WorkspaceId,
        stream_id: Uuid,
    ) -> AppResult<Option<Stream>> {
        Ok(self
            .state
            .read()
            .await
            .stream(workspace_id, stream_id)
            .cloned())
    }

    async fn delete_stream(&self, workspace_id: WorkspaceId, stream_id: Uuid) -> AppResult<()> {
        let mut state = self.state.write().await;
        if state.stream(workspace_id, stream_id).is_none() {
            return Err(AppError::NotFound(format!(
                "stream '{stream_id}' does not exist"
            )));
        }
        if state
            .projects
            .values()
            .any(|project| project.stream_id == stream_id)
        {
            return Err(AppError::Conflict(format!(
                "stream '{stream_id}' still owns projects"
            )));
        }

        state.streams.remove(&stream_id);
        state.teams.retain(|_, team| team.stream_id != stream_id);
        state.prune_memberships();
        Ok(())
    }

    async fn create_team(&self, team: Team) -> AppResult<Team> {
        let mut state = self.state.write().await;
        if state.stream(team.workspace_id, team.stream_id).is_none() {
            return Err(AppError::NotFound(format!(
                "stream '{}' does not exist",
                team.stream_id
            )));
        }

        state.teams.insert(team.team_id, team.clone());
        Ok(team)
    }

    async fn list_teams(
        &self,
        workspace_id: WorkspaceId,
        stream_id: Option<Uuid>,
    ) -> AppResult<Vec<Team>> {
        let state = self.state.read().await;
        let mut teams: Vec<Team> = state
            .teams
            .values()
            .filter(|team| {
                team.workspace_id == workspace_id
                    && stream_id.is_none_or(|stream_id| team.stream_id == stream_id)
            })
            .cloned()
            .collect();
        teams.sort_by_key(|team| team.created_at);

        Ok(teams)
    }

    async fn find_team(&self, workspace_id: WorkspaceId, team_id: Uuid) -> AppResult<Option<Team>> {
        Ok(self
            .state
            .read()
            .await
            .team(workspace_id, team_id)
            .ok()
            .cloned())
    }

    async fn delete_team(&self, workspace_id: WorkspaceId, team_id: Uuid) -> AppResult<()> {
        let mut state = self.state.write().await;
        state.team(workspace_id, team_id)?;

        state.teams.remove(&team_id);
        state.prune_memberships();
        for project in state.projects.values_mut() {
            if project.team_id == Some(team_id) {
                project.team_id = None;
            }
        }

        Ok(())
    }

    async fn add_stream_members(
        &self,
        workspace_id: WorkspaceId,
        members: Vec<StreamMember>,
    ) -> AppResult<Vec<StreamMember>> {
        let mut state = self.state.write().await;
        for member in &members {
            if state.stream(workspace_id, member.stream_id).is_none() {
                return Err(AppError::NotFound(format!(
                    "stream '{}' does not exist",
                    member.stream_id
                )));
            }
            if state.stream_members.iter().any(|stored| {
                stored.stream_id == member.stream_id && stored.user_id == member.user_id
            }) {
                return Err(AppError::Conflict(format!(
                    "user '{}' already belongs to the stream",
                    member.user_id
                )));
            }
        }

        state.stream_members.extend(members.iter().cloned());
        Ok(members)
    }

    async fn list_stream_members(
        &self,
        workspace_id: WorkspaceId,
        stream_id: Uuid,
    ) -> AppResult<Vec<StreamMember>> {
        let state = self.state.read().await;
        if state.stream(workspace_id, stream_id).is_none() {
            return Err(AppError::NotFound(format!(
                "stream '{stream_id}' does not exist"
            )));
        }

        let mut members: Vec<StreamMember> = state
            .stream_members
            .iter()
            .filter(|member| member.stream_id == stream_id)
            .cloned()
            .collect();
        members.sort_by_key(|member| member.joined_at);

        Ok(members)
    }

    async fn remove_stream_member(
        &self,
        workspace_id: WorkspaceId,
        stream_id: Uuid,
        user_id: UserId,
    ) -> AppResult<()> {
        let mut guard = self.state.write().await;
        let state = &mut *guard;
        if state.stream(workspace_id, stream_id).is_none() {
            return Err(AppError::NotFound(format!(
                "stream '{stream_id}' does not exist"
            )));
        }

        let before = state.stream_members.len();
        state
            .stream_members
            .retain(|member| !(member.stream_id == stream_id && member.user_id == user_id));
        if state.stream_members.len() == before {
            return Err(AppError::NotFound(format!(
                "user '{user_id}' is not a member of stream '{stream_id}'"
            )));
        }

        let teams = &state.teams;
        state.team_members.retain(|member| {
            member.user_id != user_id
                || teams
                    .get(&member.team_id)
                    .is_some_and(|team| team.stream_id != stream_id)
        });

        Ok(())
    }

    async fn add_team_member(
        &self,
        workspace_id: WorkspaceId,
        member: TeamMember,
    ) -> AppResult<TeamMember> {
        let mut state = self.state.write().await;
        let stream_id = state.team(workspace_id, member.team_id)?.stream_id;
        if !state
            .stream_members
            .iter()
            .any(|stored| stored.stream_id == stream_id && stored.user_id == member.user_id)
        {
            return Err(AppError::Validation(format!(
                "user '{}' is not a member of the team's stream",
                member.user_id
            )));
        }
        if state
            .team_members
            .iter()
            .any(|stored| stored.team_id == member.team_id && stored.user_id == member.user_id)
        {
            return Err(AppError::Conflict(format!(
                "user '{}' already belongs to the team",
                member.user_id
            )));
        }

        state.team_members.push(member.clone());
        Ok(member)
    }

    async fn list_team_members(
        &self,
        workspace_id: WorkspaceId,
        team_id: Uuid,
    ) -> AppResult<Vec<TeamMember>> {
        let state = self.state.read().await;
        state.team(workspace_id, team_id)?;

        let mut members: Vec<TeamMember> = state
            .team_members
            .iter()
            .filter(|member| member.team_id == team_id)
            .cloned()
            .collect();
        members.sort_by_key(|member| member.joined_at);

        Ok(members)
    }

    async fn remove_team_member(
        &self,
        workspace_id: WorkspaceId,
        team_id: Uuid,
        user_id: UserId,
    ) -> AppResult<()> {
        let mut state = self.state.write().await;
        state.team(workspace_id, team_id)?;

        let before = state.team_members.len();
        state
            .team_members
            .retain(|member| !(member.team_id == team_id && member.user_id == user_id));
        if state.team_members.len() == before {
            return Err(AppError::NotFound(format!(
                "user '{user_id}' is not a member of team '{team_id}'"
            )));
        }

        Ok(())
    }
}

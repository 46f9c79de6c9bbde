use async_trait::async_trait;
use uuid::Uuid;
use workhive_core::{AppResult, UserId, WorkspaceId};
use workhive_domain::{
    MembershipStatus, Permission, Role, Stream, StreamMember, Team, TeamMember, UserAccount,
    Workspace, WorkspaceMember,
};

/// Everything written when a workspace is created.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WorkspaceProvisioning {
    /// Workspace record, default role already set.
    pub workspace: Workspace,
    /// Default role.
    pub role: Role,
    /// Default role's seeded permissions.
    pub permissions: Vec<Permission>,
    /// Owner's ACTIVE membership.
    pub owner_membership: WorkspaceMember,
}

/// Membership row joined with the member's user record.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MemberListing {
    /// Membership row.
    pub member: WorkspaceMember,
    /// Member's user record.
    pub user: UserAccount,
}

/// Stream with its members and teams.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StreamDetails {
    /// Stream record.
    pub stream: Stream,
    /// Stream members.
    pub members: Vec<StreamMember>,
    /// Teams of the stream.
    pub teams: Vec<Team>,
}

/// Team with its members.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TeamDetails {
    /// Team record.
    pub team: Team,
    /// Team members.
    pub members: Vec<TeamMember>,
}

/// Repository port for users, workspaces and memberships.
#[async_trait]
pub trait WorkspaceRepository: Send + Sync {
    /// Inserts or refreshes a user, keeping any stored default workspace.
    async fn save_user(&self, user: UserAccount) -> AppResult<UserAccount>;

    /// Returns one user.
    async fn find_user(&self, user_id: UserId) -> AppResult<Option<UserAccount>>;

    /// Creates a workspace with its default role, permissions and owner membership atomically.
    ///
    /// The owner's default workspace is set when unset.
    async fn create_workspace(&self, provisioning: WorkspaceProvisioning) -> AppResult<Workspace>;

    /// Returns one workspace.
    async fn find_workspace(&self, workspace_id: WorkspaceId) -> AppResult<Option<Workspace>>;

    /// Lists workspaces the user holds an ACTIVE membership in.
    async fn list_workspaces_for_user(&self, user_id: UserId) -> AppResult<Vec<Workspace>>;

    /// Persists workspace attribute changes.
    async fn save_workspace(&self, workspace: Workspace) -> AppResult<Workspace>;

    /// Deletes a workspace and everything it owns.
    async fn delete_workspace(&self, workspace_id: WorkspaceId) -> AppResult<()>;

    /// Returns a user's membership in a workspace.
    async fn find_member(
        &self,
        workspace_id: WorkspaceId,
        user_id: UserId,
    ) -> AppResult<Option<WorkspaceMember>>;

    /// Lists memberships of a workspace with their users.
    async fn list_members(&self, workspace_id: WorkspaceId) -> AppResult<Vec<MemberListing>>;

    /// Creates a PENDING membership or reopens an INACTIVE one.
    ///
    /// Fails with `Conflict` when the user is already PENDING or ACTIVE.
    async fn invite_member(&self, member: WorkspaceMember) -> AppResult<WorkspaceMember>;

    /// Moves the user's PENDING membership to ACTIVE and sets their default
    /// workspace when unset.
    async fn activate_member(
        &self,
        workspace_id: WorkspaceId,
        user_id: UserId,
    ) -> AppResult<WorkspaceMember>;

    /// Sets a membership's status.
    async fn update_member_status(
        &self,
        workspace_id: WorkspaceId,
        user_id: UserId,
        status: MembershipStatus,
    ) -> AppResult<WorkspaceMember>;

    /// Points a membership at another role of the same workspace.
    async fn update_member_role(
        &self,
        workspace_id: WorkspaceId,
        user_id: UserId,
        role_id: Uuid,
    ) -> AppResult<WorkspaceMember>;
}

/// Repository port for streams and teams.
#[async_trait]
pub trait StreamRepository: Send + Sync {
    /// Persists a new stream.
    async fn create_stream(&self, stream: Stream) -> AppResult<Stream>;

    /// Lists streams of a workspace.
    async fn list_streams(&self, workspace_id: WorkspaceId) -> AppResult<Vec<Stream>>;

    /// Returns one stream.
    async fn find_stream(
        &self,
        workspace_id: WorkspaceId,
        stream_id: Uuid,
    ) -> AppResult<Option<Stream>>;

    /// Deletes a stream that owns no projects.
    async fn delete_stream(&self, workspace_id: WorkspaceId, stream_id: Uuid) -> AppResult<()>;

    /// Persists a new team.
    async fn create_team(&self, team: Team) -> AppResult<Team>;

    /// Lists teams of a workspace, optionally restricted to a stream.
    async fn list_teams(
        &self,
        workspace_id: WorkspaceId,
        stream_id: Option<Uuid>,
    ) -> AppResult<Vec<Team>>;

    /// Returns one team.
    async fn find_team(&self, workspace_id: WorkspaceId, team_id: Uuid) -> AppResult<Option<Team>>;

    /// Deletes a team; projects assigned to it lose the assignment.
    async fn delete_team(&self, workspace_id: WorkspaceId, team_id: Uuid) -> AppResult<()>;

    /// Adds users to a stream in one write.
    ///
    /// Fails with `Conflict`, writing nothing, when any user already belongs.
    async fn add_stream_members(
        &self,
        workspace_id: WorkspaceId,
        members: Vec<StreamMember>,
    ) -> AppResult<Vec<StreamMember>>;

    /// Lists members of a stream.
    async fn list_stream_members(
        &self,
        workspace_id: WorkspaceId,
        stream_id: Uuid,
    ) -> AppResult<Vec<StreamMember>>;

    /// Removes a user from a stream and from every team of that stream.
    async fn remove_stream_member(
        &self,
        workspace_id: WorkspaceId,
        stream_id: Uuid,
        user_id: UserId,
    ) -> AppResult<()>;

    /// Adds a member of the team's stream to the team.
    ///
    /// Fails with `Validation` when the user is not a stream member and with
    /// `Conflict` when already in the team.
    async fn add_team_member(
        &self,
        workspace_id: WorkspaceId,
        member: TeamMember,
    ) -> AppResult<TeamMember>;

    /// Lists members of a team.
    async fn list_team_members(
        &self,
        workspace_id: WorkspaceId,
        team_id: Uuid,
    ) -> AppResult<Vec<TeamMember>>;

    /// Removes a user from a team.
    async fn remove_team_member(
        &self,
        workspace_id: WorkspaceId,
        team_id: Uuid,
        user_id: UserId,
    ) -> AppResult<()>;
}

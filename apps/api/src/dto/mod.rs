mod common;
mod projects;
mod security;
mod tasks;
mod workspaces;

pub use common::{BootstrapRequest, HealthResponse, UserIdentityResponse};
pub use projects::{
    AssignProjectTeamRequest, BacklogResponse, BoardResponse, CardEntryResponse, CardResponse,
    CreateProjectRequest, CreateSprintRequest, MoveCardToColumnRequest, MoveCardToSprintRequest,
    ProjectResponse, SprintResponse, UpdateProjectRequest, UpdateSprintRequest,
};
pub use security::{
    CreatePermissionRequest, PermissionResponse, RoleDefinitionResponse, RoleNameRequest,
    RoleResponse, UpdatePermissionRequest,
};
pub use tasks::{
    AddChecklistItemRequest, AddDependencyRequest, AddSubtaskRequest, AssignTaskRequest,
    ChecklistItemResponse, CreateTaskRequest, CreatedTaskResponse, DependencyResponse,
    ProjectSummaryResponse, SetChecklistItemDoneRequest, TaskDetailsResponse, TaskResponse,
    UpdateTaskRequest, parse_priority,
};
pub use workspaces::{
    AddStreamMembersRequest, AddTeamMemberRequest, ChangeMemberRoleRequest, CreateStreamRequest,
    CreateTeamRequest, InviteMemberRequest, ListTeamsQuery, MemberListingResponse, MemberResponse,
    StreamDetailsResponse, StreamMemberResponse, StreamResponse, TeamDetailsResponse,
    TeamMemberResponse, TeamResponse, WorkspaceNameRequest, WorkspaceResponse,
};

#[cfg(test)]
mod tests;

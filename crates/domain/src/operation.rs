use crate::security::{PermissionAction, PermissionRequirement, ResourceType};

const fn grant(action: PermissionAction, resource_type: ResourceType) -> PermissionRequirement {
    PermissionRequirement::granted(action, resource_type)
}

const PUBLIC: &[PermissionRequirement] = &[];
const WORKSPACE_UPDATE: &[PermissionRequirement] =
    &[grant(PermissionAction::Update, ResourceType::Workspace)];
const WORKSPACE_DELETE: &[PermissionRequirement] =
    &[grant(PermissionAction::Delete, ResourceType::Workspace)];
const WORKSPACE_ADD_MEMBERS: &[PermissionRequirement] =
    &[grant(PermissionAction::AddMembers, ResourceType::Workspace)];
const WORKSPACE_REMOVE_MEMBER: &[PermissionRequirement] =
    &[grant(PermissionAction::RemoveMember, ResourceType::Workspace)];
const STREAM_CREATE: &[PermissionRequirement] =
    &[grant(PermissionAction::Create, ResourceType::Stream)];
const STREAM_READ: &[PermissionRequirement] = &[grant(PermissionAction::Read, ResourceType::Stream)];
const STREAM_DELETE: &[PermissionRequirement] =
    &[grant(PermissionAction::Delete, ResourceType::Stream)];
const STREAM_ADD_MEMBERS: &[PermissionRequirement] =
    &[grant(PermissionAction::AddMembers, ResourceType::Stream)];
const STREAM_REMOVE_MEMBER: &[PermissionRequirement] =
    &[grant(PermissionAction::RemoveMember, ResourceType::Stream)];
const TEAM_CREATE: &[PermissionRequirement] = &[grant(PermissionAction::Create, ResourceType::Team)];
const TEAM_READ: &[PermissionRequirement] = &[grant(PermissionAction::Read, ResourceType::Team)];
const TEAM_DELETE: &[PermissionRequirement] = &[grant(PermissionAction::Delete, ResourceType::Team)];
const TEAM_ADD_MEMBERS: &[PermissionRequirement] =
    &[grant(PermissionAction::AddMembers, ResourceType::Team)];
const TEAM_REMOVE_MEMBER: &[PermissionRequirement] =
    &[grant(PermissionAction::RemoveMember, ResourceType::Team)];
const PROJECT_CREATE: &[PermissionRequirement] =
    &[grant(PermissionAction::Create, ResourceType::Project)];
const PROJECT_READ: &[PermissionRequirement] =
    &[grant(PermissionAction::Read, ResourceType::Project)];
const PROJECT_UPDATE: &[PermissionRequirement] =
    &[grant(PermissionAction::Update, ResourceType::Project)];
const PROJECT_DELETE: &[PermissionRequirement] =
    &[grant(PermissionAction::Delete, ResourceType::Project)];
const TASK_CREATE: &[PermissionRequirement] = &[grant(PermissionAction::Create, ResourceType::Task)];
const TASK_READ: &[PermissionRequirement] = &[grant(PermissionAction::Read, ResourceType::Task)];
const TASK_UPDATE: &[PermissionRequirement] = &[grant(PermissionAction::Update, ResourceType::Task)];
const TASK_DELETE: &[PermissionRequirement] = &[grant(PermissionAction::Delete, ResourceType::Task)];

/// Every operation routed through the authorization guard.
///
/// Each variant positively declares its required permissions. An empty list
/// marks an operation as public within an authenticated session.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Operation {
    /// Create a new workspace owned by the caller.
    CreateWorkspace,
    /// Accept a pending invitation into a workspace.
    AcceptInvite,
    /// Rename a workspace.
    UpdateWorkspace,
    /// Delete a workspace.
    DeleteWorkspace,
    /// Invite a user into the workspace.
    InviteMember,
    /// Deactivate a workspace member.
    RemoveMember,
    /// Change a member's role.
    ChangeMemberRole,
    /// List workspace members.
    ListMembers,
    /// List workspace roles.
    ListRoles,
    /// Create a role.
    CreateRole,
    /// Rename a role.
    UpdateRole,
    /// Delete a role.
    DeleteRole,
    /// Read a role's permissions.
    ReadPermissions,
    /// Add a permission row to a role.
    CreatePermission,
    /// Flip a permission row's value.
    UpdatePermission,
    /// Create a stream.
    CreateStream,
    /// List streams.
    ListStreams,
    /// Delete a stream.
    DeleteStream,
    /// Read one stream with its members and teams.
    ReadStream,
    /// List stream members.
    ListStreamMembers,
    /// Add users to a stream.
    AddStreamMembers,
    /// Remove a user from a stream.
    RemoveStreamMember,
    /// Create a team.
    CreateTeam,
    /// List teams.
    ListTeams,
    /// Read one team with its members.
    ReadTeam,
    /// Delete a team.
    DeleteTeam,
    /// Add a stream member to a team.
    AddTeamMember,
    /// Remove a member from a team.
    RemoveTeamMember,
    /// Create a project with its board and default sprint.
    CreateProject,
    /// List projects of a stream.
    ListProjects,
    /// Read one project.
    ReadProject,
    /// Update project details.
    UpdateProject,
    /// Assign a project to a team.
    AssignProjectTeam,
    /// Delete a project.
    DeleteProject,
    /// Create a sprint.
    CreateSprint,
    /// List sprints of a project.
    ListSprints,
    /// Update sprint details.
    UpdateSprint,
    /// Start a sprint.
    StartSprint,
    /// Complete a sprint.
    CompleteSprint,
    /// Delete a sprint.
    DeleteSprint,
    /// Read the live board.
    ReadBoard,
    /// Read backlog and sprint planning data.
    ReadBacklog,
    /// Read the project summary.
    ReadSummary,
    /// Read tasks.
    ReadTasks,
    /// Create a task.
    CreateTask,
    /// Update a task.
    UpdateTask,
    /// Delete a task.
    DeleteTask,
    /// Add a subtask.
    AddSubtask,
    /// Add a task dependency.
    AddDependency,
    /// Remove a task dependency.
    RemoveDependency,
    /// Add a checklist item.
    AddChecklistItem,
    /// Mark a checklist item as complete.
    CheckChecklistItem,
    /// Mark a checklist item as incomplete.
    UncheckChecklistItem,
    /// Remove a checklist item.
    RemoveChecklistItem,
    /// Assign a task.
    AssignTask,
    /// Reassign a task.
    ReassignTask,
    /// Clear a task's assignee.
    UnassignTask,
    /// Move a card between sprints or into the backlog.
    MoveCardToSprint,
    /// Move a card to another board column.
    MoveCardToColumn,
}

impl Operation {
    /// Returns a stable operation name.
    #[must_use]
    pub fn name(&self) -> &'static str {
        match self {
            Self::CreateWorkspace => "createWorkspace",
            Self::AcceptInvite => "acceptInvite",
            Self::UpdateWorkspace => "updateWorkspace",
            Self::DeleteWorkspace => "deleteWorkspace",
            Self::InviteMember => "inviteMember",
            Self::RemoveMember => "removeMember",
            Self::ChangeMemberRole => "changeMemberRole",
            Self::ListMembers => "listMembers",
            Self::ListRoles => "listRoles",
            Self::CreateRole => "createRole",
            Self::UpdateRole => "updateRole",
            Self::DeleteRole => "deleteRole",
            Self::ReadPermissions => "getPermissions",
            Self::CreatePermission => "createPermission",
            Self::UpdatePermission => "updatePermission",
            Self::CreateStream => "createStream",
            Self::ListStreams => "listStreams",
            Self::DeleteStream => "deleteStream",
            Self::ReadStream => "getStream",
            Self::ListStreamMembers => "getStreamMembers",
            Self::AddStreamMembers => "addMembersToStream",
            Self::RemoveStreamMember => "removeMemberFromStream",
            Self::CreateTeam => "createTeam",
            Self::ListTeams => "listTeams",
            Self::ReadTeam => "getTeam",
            Self::DeleteTeam => "deleteTeam",
            Self::AddTeamMember => "addMemberToTeam",
            Self::RemoveTeamMember => "removeMemberFromTeam",
            Self::CreateProject => "createProject",
            Self::ListProjects => "listProjects",
            Self::ReadProject => "getProject",
            Self::UpdateProject => "updateProject",
            Self::AssignProjectTeam => "assignProjectToTeam",
            Self::DeleteProject => "deleteProject",
            Self::CreateSprint => "createSprint",
            Self::ListSprints => "listSprints",
            Self::UpdateSprint => "updateSprint",
            Self::StartSprint => "startSprint",
            Self::CompleteSprint => "completeSprint",
            Self::DeleteSprint => "deleteSprint",
            Self::ReadBoard => "getBoard",
            Self::ReadBacklog => "getBacklogData",
            Self::ReadSummary => "getSummary",
            Self::ReadTasks => "getTasks",
            Self::CreateTask => "createTask",
            Self::UpdateTask => "updateTask",
            Self::DeleteTask => "deleteTask",
            Self::AddSubtask => "addSubtask",
            Self::AddDependency => "addDependency",
            Self::RemoveDependency => "removeDependency",
            Self::AddChecklistItem => "addChecklistItem",
            Self::CheckChecklistItem => "markChecklistItemAsComplete",
            Self::UncheckChecklistItem => "markChecklistItemAsIncomplete",
            Self::RemoveChecklistItem => "removeChecklistItem",
            Self::AssignTask => "assignTask",
            Self::ReassignTask => "reassignTask",
            Self::UnassignTask => "unassignTask",
            Self::MoveCardToSprint => "moveCardToSprint",
            Self::MoveCardToColumn => "moveCardToColumn",
        }
    }

    /// Returns the declared required-permission list.
    #[must_use]
    pub fn required_permissions(&self) -> &'static [PermissionRequirement] {
        match self {
            Self::CreateWorkspace | Self::AcceptInvite => PUBLIC,
            Self::UpdateWorkspace
            | Self::ChangeMemberRole
            | Self::ListMembers
            | Self::ListRoles
            | Self::CreateRole
            | Self::UpdateRole
            | Self::DeleteRole
            | Self::ReadPermissions
            | Self::CreatePermission
            | Self::UpdatePermission => WORKSPACE_UPDATE,
            Self::DeleteWorkspace => WORKSPACE_DELETE,
            Self::InviteMember => WORKSPACE_ADD_MEMBERS,
            Self::RemoveMember => WORKSPACE_REMOVE_MEMBER,
            Self::CreateStream => STREAM_CREATE,
            Self::ListStreams | Self::ReadStream | Self::ListStreamMembers => STREAM_READ,
            Self::DeleteStream => STREAM_DELETE,
            Self::AddStreamMembers => STREAM_ADD_MEMBERS,
            Self::RemoveStreamMember => STREAM_REMOVE_MEMBER,
            Self::CreateTeam => TEAM_CREATE,
            Self::ListTeams | Self::ReadTeam => TEAM_READ,
            Self::DeleteTeam => TEAM_DELETE,
            Self::AddTeamMember => TEAM_ADD_MEMBERS,
            Self::RemoveTeamMember => TEAM_REMOVE_MEMBER,
            Self::CreateProject => PROJECT_CREATE,
            Self::ListProjects | Self::ReadProject | Self::ListSprints => PROJECT_READ,
            Self::UpdateProject
            | Self::AssignProjectTeam
            | Self::CreateSprint
            | Self::UpdateSprint
            | Self::StartSprint
            | Self::CompleteSprint
            | Self::DeleteSprint => PROJECT_UPDATE,
            Self::DeleteProject => PROJECT_DELETE,
            Self::ReadBoard | Self::ReadBacklog | Self::ReadSummary | Self::ReadTasks => TASK_READ,
            Self::CreateTask => TASK_CREATE,
            Self::UpdateTask
            | Self::AddSubtask
            | Self::AddDependency
            | Self::RemoveDependency
            | Self::AddChecklistItem
            | Self::CheckChecklistItem
            | Self::UncheckChecklistItem
            | Self::RemoveChecklistItem
            | Self::AssignTask
            | Self::ReassignTask
            | Self::UnassignTask
            | Self::MoveCardToSprint
            | Self::MoveCardToColumn => TASK_UPDATE,
            Self::DeleteTask => TASK_DELETE,
        }
    }

    /// Returns whether the operation skips membership checks.
    #[must_use]
    pub fn is_public(&self) -> bool {
        self.required_permissions().is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::Operation;
    use crate::security::{PermissionAction, ResourceType, default_permission_grants};

    #[test]
    fn only_workspace_entry_points_are_public() {
        assert!(Operation::CreateWorkspace.is_public());
        assert!(Operation::AcceptInvite.is_public());
        assert!(!Operation::ReadBoard.is_public());
        assert!(!Operation::ListRoles.is_public());
    }

    #[test]
    fn task_update_requires_task_update_grant() {
        let requirements = Operation::UpdateTask.required_permissions();
        assert_eq!(requirements.len(), 1);
        assert_eq!(requirements[0].action, PermissionAction::Update);
        assert_eq!(requirements[0].resource_type, ResourceType::Task);
        assert!(requirements[0].value);
    }

    #[test]
    fn default_role_satisfies_every_declared_operation() {
        let grants = default_permission_grants();
        let operations = [
            Operation::UpdateWorkspace,
            Operation::DeleteWorkspace,
            Operation::InviteMember,
            Operation::RemoveMember,
            Operation::ListRoles,
            Operation::CreateStream,
            Operation::AddStreamMembers,
            Operation::RemoveStreamMember,
            Operation::ListTeams,
            Operation::DeleteTeam,
            Operation::AddTeamMember,
            Operation::RemoveTeamMember,
            Operation::CreateProject,
            Operation::ListSprints,
            Operation::ReadBoard,
            Operation::CreateTask,
            Operation::MoveCardToColumn,
            Operation::DeleteTask,
        ];

        for operation in operations {
            for requirement in operation.required_permissions() {
                assert!(
                    grants.iter().any(|grant| grant.action() == requirement.action
                        && grant.resource_type() == requirement.resource_type),
                    "default role cannot run {}",
                    operation.name()
                );
            }
        }
    }

    #[test]
    fn membership_operations_use_membership_actions() {
        let cases = [
            (Operation::AddStreamMembers, PermissionAction::AddMembers, ResourceType::Stream),
            (Operation::RemoveStreamMember, PermissionAction::RemoveMember, ResourceType::Stream),
            (Operation::AddTeamMember, PermissionAction::AddMembers, ResourceType::Team),
            (Operation::RemoveTeamMember, PermissionAction::RemoveMember, ResourceType::Team),
        ];

        for (operation, action, resource_type) in cases {
            let requirements = operation.required_permissions();
            assert_eq!(requirements.len(), 1);
            assert_eq!(requirements[0].action, action);
            assert_eq!(requirements[0].resource_type, resource_type);
        }
    }

    #[test]
    fn requirements_stay_inside_vocabulary() {
        let operations = [
            Operation::InviteMember,
            Operation::RemoveMember,
            Operation::ListStreams,
            Operation::AddStreamMembers,
            Operation::RemoveTeamMember,
            Operation::AssignProjectTeam,
            Operation::AddDependency,
        ];

        for operation in operations {
            for requirement in operation.required_permissions() {
                assert!(requirement.resource_type.supports(requirement.action));
            }
        }
    }
}

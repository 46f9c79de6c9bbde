use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;
use workhive_core::{AppError, UserId, WorkspaceId};

/// Kinds of audit records emitted by workspace, project and task changes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ActivityType {
    /// A workspace was created.
    WorkspaceCreated,
    /// A workspace was renamed.
    WorkspaceUpdated,
    /// A user was invited.
    MemberInvited,
    /// An invitation was accepted.
    MemberJoined,
    /// A member was deactivated.
    MemberRemoved,
    /// A member's role changed.
    MemberRoleChanged,
    /// A role was created.
    RoleCreated,
    /// A role was renamed.
    RoleUpdated,
    /// A role was deleted.
    RoleDeleted,
    /// A permission row was added or changed.
    PermissionUpdated,
    /// A stream was created.
    StreamCreated,
    /// A stream was deleted.
    StreamDeleted,
    /// Users joined a stream.
    StreamMembersAdded,
    /// A user left a stream.
    StreamMemberRemoved,
    /// A team was created.
    TeamCreated,
    /// A team was deleted.
    TeamDeleted,
    /// A stream member joined a team.
    TeamMemberAdded,
    /// A member left a team.
    TeamMemberRemoved,
    /// A channel was created.
    ChannelCreated,
    /// A project was created.
    ProjectCreated,
    /// A project was updated.
    ProjectUpdated,
    /// A project was deleted.
    ProjectDeleted,
    /// A sprint was created.
    SprintCreated,
    /// A sprint was updated.
    SprintUpdated,
    /// A sprint was started.
    SprintStarted,
    /// A sprint was completed.
    SprintCompleted,
    /// A sprint was deleted.
    SprintDeleted,
    /// A card moved between sprints or into the backlog.
    CardMovedToSprint,
    /// A card moved to another column.
    CardMovedToColumn,
    /// A task was created.
    TaskCreated,
    /// A task was updated.
    TaskUpdated,
    /// A task was deleted.
    TaskDeleted,
    /// A dependency was added.
    TaskAddDependency,
    /// A dependency was removed.
    TaskRemoveDependency,
    /// A checklist item was added.
    TaskAddChecklistItem,
    /// A checklist item was removed.
    TaskRemoveChecklistItem,
    /// A checklist item was checked.
    TaskCheckChecklistItem,
    /// A checklist item was unchecked.
    TaskUncheckChecklistItem,
    /// A subtask was created.
    TaskCreateSubtask,
    /// A task got its first assignee.
    TaskAssignUser,
    /// A task's assignee was replaced.
    TaskReassignUser,
    /// A task's assignee was cleared.
    TaskUnassignUser,
}

impl ActivityType {
    /// Returns a stable storage value for the activity type.
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::WorkspaceCreated => "WORKSPACE_CREATED",
            Self::WorkspaceUpdated => "WORKSPACE_UPDATED",
            Self::MemberInvited => "MEMBER_INVITED",
            Self::MemberJoined => "MEMBER_JOINED",
            Self::MemberRemoved => "MEMBER_REMOVED",
            Self::MemberRoleChanged => "MEMBER_ROLE_CHANGED",
            Self::RoleCreated => "ROLE_CREATED",
            Self::RoleUpdated => "ROLE_UPDATED",
            Self::RoleDeleted => "ROLE_DELETED",
            Self::PermissionUpdated => "PERMISSION_UPDATED",
            Self::StreamCreated => "STREAM_CREATED",
            Self::StreamDeleted => "STREAM_DELETED",
            Self::StreamMembersAdded => "STREAM_MEMBERS_ADDED",
            Self::StreamMemberRemoved => "STREAM_MEMBER_REMOVED",
            Self::TeamCreated => "TEAM_CREATED",
            Self::TeamDeleted => "TEAM_DELETED",
            Self::TeamMemberAdded => "TEAM_MEMBER_ADDED",
            Self::TeamMemberRemoved => "TEAM_MEMBER_REMOVED",
            Self::ChannelCreated => "CHANNEL_CREATED",
            Self::ProjectCreated => "PROJECT_CREATED",
            Self::ProjectUpdated => "PROJECT_UPDATED",
            Self::ProjectDeleted => "PROJECT_DELETED",
            Self::SprintCreated => "SPRINT_CREATED",
            Self::SprintUpdated => "SPRINT_UPDATED",
            Self::SprintStarted => "SPRINT_STARTED",
            Self::SprintCompleted => "SPRINT_COMPLETED",
            Self::SprintDeleted => "SPRINT_DELETED",
            Self::CardMovedToSprint => "CARD_MOVED_TO_SPRINT",
            Self::CardMovedToColumn => "CARD_MOVED_TO_COLUMN",
            Self::TaskCreated => "TASK_CREATED",
            Self::TaskUpdated => "TASK_UPDATED",
            Self::TaskDeleted => "TASK_DELETED",
            Self::TaskAddDependency => "TASK_ADD_DEPENDENCY",
            Self::TaskRemoveDependency => "TASK_REMOVE_DEPENDENCY",
            Self::TaskAddChecklistItem => "TASK_ADD_CHECKLIST_ITEM",
            Self::TaskRemoveChecklistItem => "TASK_REMOVE_CHECKLIST_ITEM",
            Self::TaskCheckChecklistItem => "TASK_CHECK_CHECKLIST_ITEM",
            Self::TaskUncheckChecklistItem => "TASK_UNCHECK_CHECKLIST_ITEM",
            Self::TaskCreateSubtask => "TASK_CREATE_SUBTASK",
            Self::TaskAssignUser => "TASK_ASSIGN_USER",
            Self::TaskReassignUser => "TASK_REASSIGN_USER",
            Self::TaskUnassignUser => "TASK_UNASSIGN_USER",
        }
    }

    /// Returns all activity types.
    #[must_use]
    pub fn all() -> &'static [Self] {
        const ALL: &[ActivityType] = &[
            ActivityType::WorkspaceCreated,
            ActivityType::WorkspaceUpdated,
            ActivityType::MemberInvited,
            ActivityType::MemberJoined,
            ActivityType::MemberRemoved,
            ActivityType::MemberRoleChanged,
            ActivityType::RoleCreated,
            ActivityType::RoleUpdated,
            ActivityType::RoleDeleted,
            ActivityType::PermissionUpdated,
            ActivityType::StreamCreated,
            ActivityType::StreamDeleted,
            ActivityType::StreamMembersAdded,
            ActivityType::StreamMemberRemoved,
            ActivityType::TeamCreated,
            ActivityType::TeamDeleted,
            ActivityType::TeamMemberAdded,
            ActivityType::TeamMemberRemoved,
            ActivityType::ChannelCreated,
            ActivityType::ProjectCreated,
            ActivityType::ProjectUpdated,
            ActivityType::ProjectDeleted,
            ActivityType::SprintCreated,
            ActivityType::SprintUpdated,
            ActivityType::SprintStarted,
            ActivityType::SprintCompleted,
            ActivityType::SprintDeleted,
            ActivityType::CardMovedToSprint,
            ActivityType::CardMovedToColumn,
            ActivityType::TaskCreated,
            ActivityType::TaskUpdated,
            ActivityType::TaskDeleted,
            ActivityType::TaskAddDependency,
            ActivityType::TaskRemoveDependency,
            ActivityType::TaskAddChecklistItem,
            ActivityType::TaskRemoveChecklistItem,
            ActivityType::TaskCheckChecklistItem,
            ActivityType::TaskUncheckChecklistItem,
            ActivityType::TaskCreateSubtask,
            ActivityType::TaskAssignUser,
            ActivityType::TaskReassignUser,
            ActivityType::TaskUnassignUser,
        ];

        ALL
    }
}

impl FromStr for ActivityType {
    type Err = AppError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        Self::all()
            .iter()
            .copied()
            .find(|activity_type| activity_type.as_str() == value)
            .ok_or_else(|| AppError::Validation(format!("unknown activity type '{value}'")))
    }
}

/// Immutable audit record.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Activity {
    /// Activity identifier.
    pub activity_id: Uuid,
    /// Event kind.
    pub activity_type: ActivityType,
    /// Human-readable description.
    pub description: String,
    /// Acting user.
    pub actor_id: UserId,
    /// Workspace scope.
    pub workspace_id: WorkspaceId,
    /// Related stream.
    pub stream_id: Option<Uuid>,
    /// Related project.
    pub project_id: Option<Uuid>,
    /// Related task.
    pub task_id: Option<Uuid>,
    /// Related channel.
    pub channel_id: Option<Uuid>,
    /// Event timestamp.
    pub created_at: DateTime<Utc>,
}

#[cfg(test)]
mod tests {
    use std::str::FromStr;

    use super::ActivityType;

    #[test]
    fn every_activity_type_parses_back() {
        for activity_type in ActivityType::all() {
            assert_eq!(
                ActivityType::from_str(activity_type.as_str()).ok(),
                Some(*activity_type)
            );
        }
    }
}

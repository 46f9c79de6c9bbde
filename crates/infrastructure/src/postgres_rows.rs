//! Row types shared by the PostgreSQL repositories.

use std::str::FromStr;

use chrono::{DateTime, Utc};
use sqlx::FromRow;
use uuid::Uuid;
use workhive_core::{AppError, AppResult, NonEmptyString, UserId, WorkspaceId};
use workhive_domain::{
    Activity, ActivityType, Card, ChecklistItem, MembershipStatus, Permission, PermissionAction,
    PermissionGrant, Project, ResourceType, Role, Sprint, SprintState, Stream, StreamMember, Task,
    TaskKey, TaskPriority, Team, TeamMember, UserAccount, WorkspaceMember,
};

pub(crate) fn is_unique_violation(error: &sqlx::Error) -> bool {
    matches!(
        error,
        sqlx::Error::Database(database_error) if database_error.code().as_deref() == Some("23505")
    )
}

pub(crate) fn is_foreign_key_violation(error: &sqlx::Error) -> bool {
    matches!(
        error,
        sqlx::Error::Database(database_error) if database_error.code().as_deref() == Some("23503")
    )
}

fn stored_text(value: String, column: &str) -> AppResult<NonEmptyString> {
    NonEmptyString::new(value).map_err(|error| {
        AppError::Internal(format!("invalid stored {column}: {error}"))
    })
}

fn stored_enum<T>(value: &str, column: &str) -> AppResult<T>
where
    T: FromStr<Err = AppError>,
{
    T::from_str(value)
        .map_err(|error| AppError::Internal(format!("invalid stored {column}: {error}")))
}

#[derive(Debug, FromRow)]
pub(crate) struct UserRow {
    pub id: Uuid,
    pub display_name: String,
    pub email: Option<String>,
    pub default_workspace_id: Option<Uuid>,
}

impl TryFrom<UserRow> for UserAccount {
    type Error = AppError;

    fn try_from(row: UserRow) -> AppResult<Self> {
        Ok(Self {
            user_id: UserId::from_uuid(row.id),
            display_name: stored_text(row.display_name, "user display name")?,
            email: row.email,
            default_workspace_id: row.default_workspace_id.map(WorkspaceId::from_uuid),
        })
    }
}

#[derive(Debug, FromRow)]
pub(crate) struct RoleRow {
    pub id: Uuid,
    pub workspace_id: Uuid,
    pub name: String,
}

impl TryFrom<RoleRow> for Role {
    type Error = AppError;

    fn try_from(row: RoleRow) -> AppResult<Self> {
        Ok(Self {
            role_id: row.id,
            workspace_id: WorkspaceId::from_uuid(row.workspace_id),
            name: stored_text(row.name, "role name")?,
        })
    }
}

#[derive(Debug, FromRow)]
pub(crate) struct PermissionRow {
    pub id: Uuid,
    pub role_id: Uuid,
    pub resource_type: String,
    pub action: String,
    pub value: bool,
}

impl TryFrom<PermissionRow> for Permission {
    type Error = AppError;

    fn try_from(row: PermissionRow) -> AppResult<Self> {
        let grant = PermissionGrant::new(
            stored_enum::<ResourceType>(row.resource_type.as_str(), "resource type")?,
            stored_enum::<PermissionAction>(row.action.as_str(), "permission action")?,
            row.value,
        )
        .map_err(|error| {
            AppError::Internal(format!("invalid stored permission '{}': {error}", row.id))
        })?;

        Ok(Self::new(row.id, row.role_id, grant))
    }
}

#[derive(Debug, FromRow)]
pub(crate) struct MemberRow {
    pub id: Uuid,
    pub workspace_id: Uuid,
    pub user_id: Uuid,
    pub role_id: Uuid,
    pub status: String,
    pub joined_at: DateTime<Utc>,
}

impl TryFrom<MemberRow> for WorkspaceMember {
    type Error = AppError;

    fn try_from(row: MemberRow) -> AppResult<Self> {
        Ok(Self {
            member_id: row.id,
            workspace_id: WorkspaceId::from_uuid(row.workspace_id),
            user_id: UserId::from_uuid(row.user_id),
            role_id: row.role_id,
            status: stored_enum::<MembershipStatus>(row.status.as_str(), "membership status")?,
            joined_at: row.joined_at,
        })
    }
}

#[derive(Debug, FromRow)]
pub(crate) struct StreamRow {
    pub id: Uuid,
    pub workspace_id: Uuid,
    pub name: String,
    pub created_by: Uuid,
    pub created_at: DateTime<Utc>,
}

impl TryFrom<StreamRow> for Stream {
    type Error = AppError;

    fn try_from(row: StreamRow) -> AppResult<Self> {
        Ok(Self {
            stream_id: row.id,
            workspace_id: WorkspaceId::from_uuid(row.workspace_id),
            name: stored_text(row.name, "stream name")?,
            created_by: UserId::from_uuid(row.created_by),
            created_at: row.created_at,
        })
    }
}

#[derive(Debug, FromRow)]
pub(crate) struct TeamRow {
    pub id: Uuid,
    pub workspace_id: Uuid,
    pub stream_id: Uuid,
    pub name: String,
    pub created_at: DateTime<Utc>,
}

impl TryFrom<TeamRow> for Team {
    type Error = AppError;

    fn try_from(row: TeamRow) -> AppResult<Self> {
        Ok(Self {
            team_id: row.id,
            workspace_id: WorkspaceId::from_uuid(row.workspace_id),
            stream_id: row.stream_id,
            name: stored_text(row.name, "team name")?,
            created_at: row.created_at,
        })
    }
}

#[derive(Debug, FromRow)]
pub(crate) struct StreamMemberRow {
    pub stream_id: Uuid,
    pub user_id: Uuid,
    pub joined_at: DateTime<Utc>,
}

impl From<StreamMemberRow> for StreamMember {
    fn from(row: StreamMemberRow) -> Self {
        Self {
            stream_id: row.stream_id,
            user_id: UserId::from_uuid(row.user_id),
            joined_at: row.joined_at,
        }
    }
}

#[derive(Debug, FromRow)]
pub(crate) struct TeamMemberRow {
    pub team_id: Uuid,
    pub user_id: Uuid,
    pub joined_at: DateTime<Utc>,
}

impl From<TeamMemberRow> for TeamMember {
    fn from(row: TeamMemberRow) -> Self {
        Self {
            team_id: row.team_id,
            user_id: UserId::from_uuid(row.user_id),
            joined_at: row.joined_at,
        }
    }
}

#[derive(Debug, FromRow)]
pub(crate) struct ProjectRow {
    pub id: Uuid,
    pub workspace_id: Uuid,
    pub stream_id: Uuid,
    pub team_id: Option<Uuid>,
    pub name: String,
    pub description: Option<String>,
    pub created_by: Uuid,
    pub created_at: DateTime<Utc>,
}

impl TryFrom<ProjectRow> for Project {
    type Error = AppError;

    fn try_from(row: ProjectRow) -> AppResult<Self> {
        Ok(Self {
            project_id: row.id,
            workspace_id: WorkspaceId::from_uuid(row.workspace_id),
            stream_id: row.stream_id,
            team_id: row.team_id,
            name: stored_text(row.name, "project name")?,
            description: row.description,
            created_by: UserId::from_uuid(row.created_by),
            created_at: row.created_at,
        })
    }
}

#[derive(Debug, FromRow)]
pub(crate) struct SprintRow {
    pub id: Uuid,
    pub project_id: Uuid,
    pub name: String,
    pub goal: Option<String>,
    pub position: i32,
    pub state: String,
    pub start_date: Option<DateTime<Utc>>,
    pub end_date: Option<DateTime<Utc>>,
}

impl TryFrom<SprintRow> for Sprint {
    type Error = AppError;

    fn try_from(row: SprintRow) -> AppResult<Self> {
        Ok(Self {
            sprint_id: row.id,
            project_id: row.project_id,
            name: stored_text(row.name, "sprint name")?,
            goal: row.goal,
            position: row.position,
            state: stored_enum::<SprintState>(row.state.as_str(), "sprint state")?,
            start_date: row.start_date,
            end_date: row.end_date,
        })
    }
}

#[derive(Debug, FromRow)]
pub(crate) struct CardRow {
    pub id: Uuid,
    pub task_id: Uuid,
    pub project_id: Uuid,
    pub column_id: Uuid,
    pub sprint_id: Option<Uuid>,
    pub position: i32,
}

impl From<CardRow> for Card {
    fn from(row: CardRow) -> Self {
        Self {
            card_id: row.id,
            task_id: row.task_id,
            project_id: row.project_id,
            column_id: row.column_id,
            sprint_id: row.sprint_id,
            position: row.position,
        }
    }
}

#[derive(Debug, FromRow)]
pub(crate) struct TaskRow {
    pub id: Uuid,
    pub project_id: Uuid,
    pub parent_id: Option<Uuid>,
    pub key: String,
    pub description: String,
    pub priority: String,
    pub due_date: Option<DateTime<Utc>>,
    pub labels: Vec<String>,
    pub reporter_id: Uuid,
    pub assignee_id: Option<Uuid>,
    pub status_id: Uuid,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    pub completed_at: Option<DateTime<Utc>>,
}

impl TryFrom<TaskRow> for Task {
    type Error = AppError;

    fn try_from(row: TaskRow) -> AppResult<Self> {
        Ok(Self {
            task_id: row.id,
            project_id: row.project_id,
            key: TaskKey::from_stored(row.key)
                .map_err(|error| AppError::Internal(format!("invalid stored task key: {error}")))?,
            description: stored_text(row.description, "task description")?,
            priority: stored_enum::<TaskPriority>(row.priority.as_str(), "task priority")?,
            due_date: row.due_date,
            labels: row.labels,
            reporter_id: UserId::from_uuid(row.reporter_id),
            assignee_id: row.assignee_id.map(UserId::from_uuid),
            parent_id: row.parent_id,
            status_id: row.status_id,
            created_at: row.created_at,
            updated_at: row.updated_at,
            completed_at: row.completed_at,
        })
    }
}

/// Column list shared by every task query.
pub(crate) const TASK_COLUMNS: &str = "id, project_id, parent_id, key, description, priority, \
    due_date, labels, reporter_id, assignee_id, status_id, created_at, updated_at, completed_at";

#[derive(Debug, FromRow)]
pub(crate) struct ChecklistItemRow {
    pub id: Uuid,
    pub task_id: Uuid,
    pub content: String,
    pub is_done: bool,
    pub position: i32,
}

impl TryFrom<ChecklistItemRow> for ChecklistItem {
    type Error = AppError;

    fn try_from(row: ChecklistItemRow) -> AppResult<Self> {
        Ok(Self {
            item_id: row.id,
            task_id: row.task_id,
            content: stored_text(row.content, "checklist content")?,
            is_done: row.is_done,
            position: row.position,
        })
    }
}

#[derive(Debug, FromRow)]
pub(crate) struct ActivityRow {
    pub id: Uuid,
    pub activity_type: String,
    pub description: String,
    pub actor_id: Uuid,
    pub workspace_id: Uuid,
    pub stream_id: Option<Uuid>,
    pub project_id: Option<Uuid>,
    pub task_id: Option<Uuid>,
    pub channel_id: Option<Uuid>,
    pub created_at: DateTime<Utc>,
}

impl TryFrom<ActivityRow> for Activity {
    type Error = AppError;

    fn try_from(row: ActivityRow) -> AppResult<Self> {
        Ok(Self {
            activity_id: row.id,
            activity_type: stored_enum::<ActivityType>(row.activity_type.as_str(), "activity type")?,
            description: row.description,
            actor_id: UserId::from_uuid(row.actor_id),
            workspace_id: WorkspaceId::from_uuid(row.workspace_id),
            stream_id: row.stream_id,
            project_id: row.project_id,
            task_id: row.task_id,
            channel_id: row.channel_id,
            created_at: row.created_at,
        })
    }
}

/// Converts fetched rows, failing on the first undecodable one.
pub(crate) fn decode_rows<R, T>(rows: Vec<R>) -> AppResult<Vec<T>>
where
    T: TryFrom<R, Error = AppError>,
{
    rows.into_iter().map(T::try_from).collect()
}

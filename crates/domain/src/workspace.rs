use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;
use workhive_core::{AppError, AppResult, NonEmptyString, UserId, WorkspaceId};

/// Name of the role provisioned with every new workspace.
pub const DEFAULT_ROLE_NAME: &str = "Admin";

const WORKSPACE_NAME_MIN_LENGTH: usize = 3;

/// Workspace billing tier.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum SubscriptionTier {
    /// Free tier.
    #[default]
    Free,
    /// Paid tier.
    Pro,
    /// Enterprise contract.
    Enterprise,
}

impl SubscriptionTier {
    /// Returns a stable storage value for the tier.
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Free => "FREE",
            Self::Pro => "PRO",
            Self::Enterprise => "ENTERPRISE",
        }
    }
}

impl FromStr for SubscriptionTier {
    type Err = AppError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value {
            "FREE" => Ok(Self::Free),
            "PRO" => Ok(Self::Pro),
            "ENTERPRISE" => Ok(Self::Enterprise),
            _ => Err(AppError::Validation(format!(
                "unknown subscription tier '{value}'"
            ))),
        }
    }
}

/// Tenant boundary owning streams, roles and members.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Workspace {
    workspace_id: WorkspaceId,
    name: NonEmptyString,
    owner_id: UserId,
    default_role_id: Option<Uuid>,
    invite_link: Uuid,
    subscription_tier: SubscriptionTier,
    created_at: DateTime<Utc>,
}

impl Workspace {
    /// Creates a workspace with a validated name.
    pub fn new(
        workspace_id: WorkspaceId,
        name: impl Into<String>,
        owner_id: UserId,
        invite_link: Uuid,
        subscription_tier: SubscriptionTier,
        created_at: DateTime<Utc>,
    ) -> AppResult<Self> {
        Ok(Self {
            workspace_id,
            name: validate_workspace_name(name.into())?,
            owner_id,
            default_role_id: None,
            invite_link,
            subscription_tier,
            created_at,
        })
    }

    /// Returns a copy pointing at the given default role.
    #[must_use]
    pub fn with_default_role(mut self, role_id: Uuid) -> Self {
        self.default_role_id = Some(role_id);
        self
    }

    /// Renames the workspace.
    pub fn rename(&mut self, name: impl Into<String>) -> AppResult<()> {
        self.name = validate_workspace_name(name.into())?;
        Ok(())
    }

    /// Returns the workspace identifier.
    #[must_use]
    pub fn workspace_id(&self) -> WorkspaceId {
        self.workspace_id
    }

    /// Returns the workspace name.
    #[must_use]
    pub fn name(&self) -> &NonEmptyString {
        &self.name
    }

    /// Returns the single owner.
    #[must_use]
    pub fn owner_id(&self) -> UserId {
        self.owner_id
    }

    /// Returns the role given to invited members.
    #[must_use]
    pub fn default_role_id(&self) -> Option<Uuid> {
        self.default_role_id
    }

    /// Returns the shareable invite token.
    #[must_use]
    pub fn invite_link(&self) -> Uuid {
        self.invite_link
    }

    /// Returns the billing tier.
    #[must_use]
    pub fn subscription_tier(&self) -> SubscriptionTier {
        self.subscription_tier
    }

    /// Returns the creation timestamp.
    #[must_use]
    pub fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }
}

fn validate_workspace_name(name: String) -> AppResult<NonEmptyString> {
    let trimmed = name.trim();
    if trimmed.chars().count() < WORKSPACE_NAME_MIN_LENGTH {
        return Err(AppError::Validation(format!(
            "workspace name must be at least {WORKSPACE_NAME_MIN_LENGTH} characters"
        )));
    }

    NonEmptyString::new(trimmed)
}

/// Membership lifecycle state.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum MembershipStatus {
    /// Invited, not yet accepted.
    Pending,
    /// Full member; the only authorized state.
    Active,
    /// Removed from the workspace.
    Inactive,
}

impl MembershipStatus {
    /// Returns a stable storage value for the status.
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Pending => "PENDING",
            Self::Active => "ACTIVE",
            Self::Inactive => "INACTIVE",
        }
    }

    /// Returns whether the membership may be authorized.
    #[must_use]
    pub fn is_active(&self) -> bool {
        matches!(self, Self::Active)
    }
}

impl FromStr for MembershipStatus {
    type Err = AppError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value {
            "PENDING" => Ok(Self::Pending),
            "ACTIVE" => Ok(Self::Active),
            "INACTIVE" => Ok(Self::Inactive),
            _ => Err(AppError::Validation(format!(
                "unknown membership status '{value}'"
            ))),
        }
    }
}

/// Binding of one user to one workspace with one role.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WorkspaceMember {
    /// Membership identifier.
    pub member_id: Uuid,
    /// Workspace scope.
    pub workspace_id: WorkspaceId,
    /// Member user.
    pub user_id: UserId,
    /// Assigned role.
    pub role_id: Uuid,
    /// Lifecycle state.
    pub status: MembershipStatus,
    /// Membership creation timestamp.
    pub joined_at: DateTime<Utc>,
}

/// Named permission bundle scoped to one workspace.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Role {
    /// Role identifier.
    pub role_id: Uuid,
    /// Workspace scope.
    pub workspace_id: WorkspaceId,
    /// Role name.
    pub name: NonEmptyString,
}

/// Known user profile.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserAccount {
    /// User identifier.
    pub user_id: UserId,
    /// Display name used in activity descriptions.
    pub display_name: NonEmptyString,
    /// Optional email.
    pub email: Option<String>,
    /// Workspace used when a request names none.
    pub default_workspace_id: Option<WorkspaceId>,
}

/// Grouping of projects and teams inside a workspace.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Stream {
    /// Stream identifier.
    pub stream_id: Uuid,
    /// Workspace scope.
    pub workspace_id: WorkspaceId,
    /// Stream name.
    pub name: NonEmptyString,
    /// Creator.
    pub created_by: UserId,
    /// Creation timestamp.
    pub created_at: DateTime<Utc>,
}

/// Team inside a stream.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Team {
    /// Team identifier.
    pub team_id: Uuid,
    /// Workspace scope.
    pub workspace_id: WorkspaceId,
    /// Owning stream.
    pub stream_id: Uuid,
    /// Team name.
    pub name: NonEmptyString,
    /// Creation timestamp.
    pub created_at: DateTime<Utc>,
}

/// User's membership in a stream; only ACTIVE workspace members may join.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StreamMember {
    /// Stream joined.
    pub stream_id: Uuid,
    /// Member.
    pub user_id: UserId,
    /// Join timestamp.
    pub joined_at: DateTime<Utc>,
}

/// Stream member placed in one of the stream's teams.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TeamMember {
    /// Team joined.
    pub team_id: Uuid,
    /// Member.
    pub user_id: UserId,
    /// Join timestamp.
    pub joined_at: DateTime<Utc>,
}

#[cfg(test)]
mod tests {
    use chrono::Utc;
    use uuid::Uuid;
    use workhive_core::{UserId, WorkspaceId};

    use super::{MembershipStatus, SubscriptionTier, Workspace};

    #[test]
    fn workspace_name_needs_three_characters() {
        let result = Workspace::new(
            WorkspaceId::new(),
            " ab ",
            UserId::new(),
            Uuid::new_v4(),
            SubscriptionTier::Free,
            Utc::now(),
        );
        assert!(result.is_err());
    }

    #[test]
    fn workspace_name_is_trimmed() {
        let workspace = Workspace::new(
            WorkspaceId::new(),
            "  Acme  ",
            UserId::new(),
            Uuid::new_v4(),
            SubscriptionTier::Free,
            Utc::now(),
        );
        assert!(workspace.is_ok());
        let workspace = workspace.unwrap_or_else(|_| unreachable!());
        assert_eq!(workspace.name().as_str(), "Acme");
        assert!(workspace.default_role_id().is_none());
    }

    #[test]
    fn only_active_membership_is_authorizable() {
        assert!(MembershipStatus::Active.is_active());
        assert!(!MembershipStatus::Pending.is_active());
        assert!(!MembershipStatus::Inactive.is_active());
    }
}

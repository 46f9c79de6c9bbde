use std::fmt::{Display, Formatter};
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use uuid::Uuid;
use workhive_core::{AppError, AppResult};

/// Resource types that permissions are granted on.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ResourceType {
    /// The workspace itself (settings, members, roles).
    Workspace,
    /// Chat channels.
    Channel,
    /// Streams grouping projects and teams.
    Stream,
    /// Projects and their boards and sprints.
    Project,
    /// Tasks, cards and their relations.
    Task,
    /// Teams inside a stream.
    Team,
}

impl ResourceType {
    /// Returns a stable storage value for this resource type.
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Workspace => "WORKSPACE",
            Self::Channel => "CHANNEL",
            Self::Stream => "STREAM",
            Self::Project => "PROJECT",
            Self::Task => "TASK",
            Self::Team => "TEAM",
        }
    }

    /// Returns all known resource types.
    #[must_use]
    pub fn all() -> &'static [Self] {
        const ALL: &[ResourceType] = &[
            ResourceType::Workspace,
            ResourceType::Channel,
            ResourceType::Stream,
            ResourceType::Project,
            ResourceType::Task,
            ResourceType::Team,
        ];

        ALL
    }

    /// Returns the closed action vocabulary for this resource type.
    #[must_use]
    pub fn known_actions(&self) -> &'static [PermissionAction] {
        use PermissionAction::{AddMembers, Create, Delete, Read, RemoveMember, Update};

        match self {
            Self::Workspace => &[Read, Update, Delete, AddMembers, RemoveMember],
            Self::Channel | Self::Stream | Self::Team => {
                &[Create, Read, Update, Delete, AddMembers, RemoveMember]
            }
            Self::Project | Self::Task => &[Create, Read, Update, Delete],
        }
    }

    /// Returns the actions granted to a freshly created role.
    #[must_use]
    pub fn default_actions(&self) -> &'static [PermissionAction] {
        use PermissionAction::{AddMembers, Create, Delete, Read, RemoveMember, Update};

        match self {
            Self::Workspace => &[Update, Delete, AddMembers, RemoveMember],
            Self::Channel | Self::Stream | Self::Team => {
                &[Create, Read, Update, Delete, AddMembers, RemoveMember]
            }
            Self::Project | Self::Task => &[Create, Read, Update, Delete],
        }
    }

    /// Returns whether the action belongs to this resource type's vocabulary.
    #[must_use]
    pub fn supports(&self, action: PermissionAction) -> bool {
        self.known_actions().contains(&action)
    }
}

impl Display for ResourceType {
    fn fmt(&self, formatter: &mut Formatter<'_>) -> std::fmt::Result {
        formatter.write_str(self.as_str())
    }
}

impl FromStr for ResourceType {
    type Err = AppError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value {
            "WORKSPACE" => Ok(Self::Workspace),
            "CHANNEL" => Ok(Self::Channel),
            "STREAM" => Ok(Self::Stream),
            "PROJECT" => Ok(Self::Project),
            "TASK" => Ok(Self::Task),
            "TEAM" => Ok(Self::Team),
            _ => Err(AppError::Validation(format!(
                "unknown resource type '{value}'"
            ))),
        }
    }
}

/// Action names a permission can grant.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum PermissionAction {
    /// Create new resources.
    Create,
    /// Read resources.
    Read,
    /// Modify resources.
    Update,
    /// Remove resources.
    Delete,
    /// Add members to a resource.
    AddMembers,
    /// Remove a member from a resource.
    RemoveMember,
}

impl PermissionAction {
    /// Returns a stable storage value for this action.
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Create => "create",
            Self::Read => "read",
            Self::Update => "update",
            Self::Delete => "delete",
            Self::AddMembers => "add-members",
            Self::RemoveMember => "remove-member",
        }
    }
}

impl Display for PermissionAction {
    fn fmt(&self, formatter: &mut Formatter<'_>) -> std::fmt::Result {
        formatter.write_str(self.as_str())
    }
}

impl FromStr for PermissionAction {
    type Err = AppError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value {
            "create" => Ok(Self::Create),
            "read" => Ok(Self::Read),
            "update" => Ok(Self::Update),
            "delete" => Ok(Self::Delete),
            "add-members" => Ok(Self::AddMembers),
            "remove-member" => Ok(Self::RemoveMember),
            _ => Err(AppError::Validation(format!(
                "unknown permission action '{value}'"
            ))),
        }
    }
}

/// One entry of an operation's required-permission list.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct PermissionRequirement {
    /// Required action name.
    pub action: PermissionAction,
    /// Resource type the action applies to.
    pub resource_type: ResourceType,
    /// Expected grant value.
    pub value: bool,
}

impl PermissionRequirement {
    /// Requires a granted (`true`) permission row.
    #[must_use]
    pub const fn granted(action: PermissionAction, resource_type: ResourceType) -> Self {
        Self {
            action,
            resource_type,
            value: true,
        }
    }

    /// Returns whether at least one permission row matches this requirement.
    #[must_use]
    pub fn is_satisfied_by(&self, permissions: &[Permission]) -> bool {
        permissions.iter().any(|permission| {
            permission.action() == self.action
                && permission.resource_type() == self.resource_type
                && permission.value() == self.value
        })
    }
}

/// A validated (resource type, action) pair with its boolean value.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct PermissionGrant {
    resource_type: ResourceType,
    action: PermissionAction,
    value: bool,
}

impl PermissionGrant {
    /// Creates a grant, rejecting actions outside the resource type's vocabulary.
    pub fn new(resource_type: ResourceType, action: PermissionAction, value: bool) -> AppResult<Self> {
        if !resource_type.supports(action) {
            return Err(AppError::Validation(format!(
                "action '{action}' is not defined for resource type '{resource_type}'"
            )));
        }

        Ok(Self {
            resource_type,
            action,
            value,
        })
    }

    /// Returns the resource type.
    #[must_use]
    pub fn resource_type(&self) -> ResourceType {
        self.resource_type
    }

    /// Returns the action.
    #[must_use]
    pub fn action(&self) -> PermissionAction {
        self.action
    }

    /// Returns the grant value.
    #[must_use]
    pub fn value(&self) -> bool {
        self.value
    }
}

/// Returns the fixed permission set seeded into every new role.
#[must_use]
pub fn default_permission_grants() -> Vec<PermissionGrant> {
    ResourceType::all()
        .iter()
        .flat_map(|resource_type| {
            resource_type
                .default_actions()
                .iter()
                .map(move |action| PermissionGrant {
                    resource_type: *resource_type,
                    action: *action,
                    value: true,
                })
        })
        .collect()
}

/// Persisted permission row owned by one role.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Permission {
    permission_id: Uuid,
    role_id: Uuid,
    resource_type: ResourceType,
    action: PermissionAction,
    value: bool,
}

impl Permission {
    /// Creates a permission row from a validated grant.
    #[must_use]
    pub fn new(permission_id: Uuid, role_id: Uuid, grant: PermissionGrant) -> Self {
        Self {
            permission_id,
            role_id,
            resource_type: grant.resource_type,
            action: grant.action,
            value: grant.value,
        }
    }

    /// Returns the permission identifier.
    #[must_use]
    pub fn permission_id(&self) -> Uuid {
        self.permission_id
    }

    /// Returns the owning role identifier.
    #[must_use]
    pub fn role_id(&self) -> Uuid {
        self.role_id
    }

    /// Returns the resource type.
    #[must_use]
    pub fn resource_type(&self) -> ResourceType {
        self.resource_type
    }

    /// Returns the action name.
    #[must_use]
    pub fn action(&self) -> PermissionAction {
        self.action
    }

    /// Returns the boolean grant value.
    #[must_use]
    pub fn value(&self) -> bool {
        self.value
    }

    /// Returns a copy with a different grant value.
    #[must_use]
    pub fn with_value(mut self, value: bool) -> Self {
        self.value = value;
        self
    }
}

#[cfg(test)]
mod tests {
    use std::str::FromStr;

    use uuid::Uuid;

    use super::{
        Permission, PermissionAction, PermissionGrant, PermissionRequirement, ResourceType,
        default_permission_grants,
    };

    fn permission(resource_type: ResourceType, action: PermissionAction, value: bool) -> Permission {
        Permission::new(
            Uuid::new_v4(),
            Uuid::new_v4(),
            PermissionGrant::new(resource_type, action, value).unwrap_or_else(|_| unreachable!()),
        )
    }

    #[test]
    fn action_round_trips_through_storage_value() {
        for action in ResourceType::Channel.known_actions() {
            let parsed = PermissionAction::from_str(action.as_str());
            assert_eq!(parsed.ok(), Some(*action));
        }
    }

    #[test]
    fn unknown_action_is_rejected() {
        assert!(PermissionAction::from_str("updte").is_err());
        assert!(ResourceType::from_str("BOARD").is_err());
    }

    #[test]
    fn grant_rejects_action_outside_vocabulary() {
        let result = PermissionGrant::new(ResourceType::Task, PermissionAction::AddMembers, true);
        assert!(result.is_err());

        let result = PermissionGrant::new(ResourceType::Workspace, PermissionAction::Create, true);
        assert!(result.is_err());
    }

    #[test]
    fn default_grants_match_curated_set() {
        let grants = default_permission_grants();
        assert_eq!(grants.len(), 4 + 6 + 6 + 4 + 4 + 6);
        assert!(grants.iter().all(PermissionGrant::value));
        assert!(!grants.iter().any(|grant| {
            grant.resource_type() == ResourceType::Workspace
                && grant.action() == PermissionAction::Read
        }));
    }

    #[test]
    fn requirement_matches_any_duplicate_row() {
        let requirement =
            PermissionRequirement::granted(PermissionAction::Update, ResourceType::Task);
        let rows = vec![
            permission(ResourceType::Task, PermissionAction::Update, false),
            permission(ResourceType::Task, PermissionAction::Update, true),
        ];

        assert!(requirement.is_satisfied_by(&rows));
    }

    #[test]
    fn requirement_needs_identical_resource_type_and_value() {
        let requirement =
            PermissionRequirement::granted(PermissionAction::Update, ResourceType::Task);
        let rows = vec![
            permission(ResourceType::Project, PermissionAction::Update, true),
            permission(ResourceType::Task, PermissionAction::Update, false),
        ];

        assert!(!requirement.is_satisfied_by(&rows));
    }
}

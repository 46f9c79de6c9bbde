use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;
use workhive_core::{AppError, AppResult, NonEmptyString, UserId, WorkspaceId};

/// Project inside a stream, owning exactly one board.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Project {
    /// Project identifier.
    pub project_id: Uuid,
    /// Workspace scope.
    pub workspace_id: WorkspaceId,
    /// Parent stream.
    pub stream_id: Uuid,
    /// Optional responsible team.
    pub team_id: Option<Uuid>,
    /// Project name, also the source of task key prefixes.
    pub name: NonEmptyString,
    /// Optional description.
    pub description: Option<String>,
    /// Creator.
    pub created_by: UserId,
    /// Creation timestamp.
    pub created_at: DateTime<Utc>,
}

impl Project {
    /// Returns the prefix used for task keys in this project.
    #[must_use]
    pub fn key_prefix(&self) -> String {
        project_key_prefix(self.name.as_str())
    }
}

/// Uppercases a project name and drops all whitespace.
#[must_use]
pub fn project_key_prefix(name: &str) -> String {
    name.chars()
        .filter(|character| !character.is_whitespace())
        .flat_map(char::to_uppercase)
        .collect()
}

/// Validates a project name.
pub fn validate_project_name(name: impl Into<String>) -> AppResult<NonEmptyString> {
    let name = name.into();
    let trimmed = name.trim();
    if project_key_prefix(trimmed).is_empty() {
        return Err(AppError::Validation(
            "project name must contain visible characters".to_owned(),
        ));
    }

    NonEmptyString::new(trimmed)
}

#[cfg(test)]
mod tests {
    use super::{project_key_prefix, validate_project_name};

    #[test]
    fn key_prefix_uppercases_and_strips_spaces() {
        assert_eq!(project_key_prefix("Launch"), "LAUNCH");
        assert_eq!(project_key_prefix("Mobile app v2"), "MOBILEAPPV2");
    }

    #[test]
    fn project_name_rejects_blank() {
        assert!(validate_project_name("  ").is_err());
        assert!(validate_project_name(" Launch ").is_ok());
    }
}

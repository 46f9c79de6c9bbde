use serde::{Deserialize, Serialize};

use crate::{UserId, WorkspaceId};

/// User information persisted in the authenticated session.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserIdentity {
    user_id: UserId,
    display_name: String,
    email: Option<String>,
}

impl UserIdentity {
    /// Creates a user identity from authentication data.
    #[must_use]
    pub fn new(user_id: UserId, display_name: impl Into<String>, email: Option<String>) -> Self {
        Self {
            user_id,
            display_name: display_name.into(),
            email,
        }
    }

    /// Returns the stable user identifier.
    #[must_use]
    pub fn user_id(&self) -> UserId {
        self.user_id
    }

    /// Returns the display name for the current user.
    #[must_use]
    pub fn display_name(&self) -> &str {
        self.display_name.as_str()
    }

    /// Returns the email, if the provider returned one.
    #[must_use]
    pub fn email(&self) -> Option<&str> {
        self.email.as_deref()
    }
}

/// Caller context attached to every operation.
///
/// The workspace is optional: when absent, authorization falls back to the
/// caller's persisted default workspace.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ActorContext {
    identity: UserIdentity,
    workspace_id: Option<WorkspaceId>,
}

impl ActorContext {
    /// Creates a caller context with an optional explicit workspace.
    #[must_use]
    pub fn new(identity: UserIdentity, workspace_id: Option<WorkspaceId>) -> Self {
        Self {
            identity,
            workspace_id,
        }
    }

    /// Returns the authenticated identity.
    #[must_use]
    pub fn identity(&self) -> &UserIdentity {
        &self.identity
    }

    /// Returns the caller's user identifier.
    #[must_use]
    pub fn user_id(&self) -> UserId {
        self.identity.user_id()
    }

    /// Returns the workspace explicitly named by the request.
    #[must_use]
    pub fn requested_workspace(&self) -> Option<WorkspaceId> {
        self.workspace_id
    }

    /// Returns a copy of the context scoped to the given workspace.
    #[must_use]
    pub fn in_workspace(&self, workspace_id: WorkspaceId) -> Self {
        Self {
            identity: self.identity.clone(),
            workspace_id: Some(workspace_id),
        }
    }
}

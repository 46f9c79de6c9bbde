use std::sync::Arc;

use async_trait::async_trait;
use workhive_core::{ActorContext, AppError, AppResult, UserId, WorkspaceId};
use workhive_domain::{Operation, Permission, WorkspaceMember};

mod membership;

#[cfg(test)]
mod tests;

/// Membership together with its role's permission rows.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MemberAccess {
    /// Resolved membership.
    pub member: WorkspaceMember,
    /// Full permission set of the member's role, duplicates included.
    pub permissions: Vec<Permission>,
}

/// Repository port for membership and permission lookups.
#[async_trait]
pub trait AuthorizationRepository: Send + Sync {
    /// Returns the user's persisted default workspace.
    async fn find_default_workspace(&self, user_id: UserId) -> AppResult<Option<WorkspaceId>>;

    /// Loads a user's membership in a workspace with its role's permissions.
    async fn find_member_access(
        &self,
        workspace_id: WorkspaceId,
        user_id: UserId,
    ) -> AppResult<Option<MemberAccess>>;
}

/// Outcome of a successful authorization check.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Access {
    /// Operation declared no permissions; no membership was consulted.
    Session {
        /// Workspace named by the request, if any.
        workspace_id: Option<WorkspaceId>,
    },
    /// Caller is an active member holding every required permission.
    Member(MemberAccess),
}

impl Access {
    /// Returns the workspace the operation runs in.
    pub fn workspace_id(&self) -> AppResult<WorkspaceId> {
        match self {
            Self::Session {
                workspace_id: Some(workspace_id),
            } => Ok(*workspace_id),
            Self::Session { workspace_id: None } => Err(AppError::Validation(
                "operation requires a workspace".to_owned(),
            )),
            Self::Member(access) => Ok(access.member.workspace_id),
        }
    }

    /// Returns the caller's membership when one was resolved.
    #[must_use]
    pub fn member(&self) -> Option<&WorkspaceMember> {
        match self {
            Self::Session { .. } => None,
            Self::Member(access) => Some(&access.member),
        }
    }
}

/// Guard applied before every protected operation.
///
/// Reads membership and permissions fresh from the store on every call.
#[derive(Clone)]
pub struct AuthorizationService {
    repository: Arc<dyn AuthorizationRepository>,
}

impl AuthorizationService {
    /// Creates a new authorization service from a repository implementation.
    #[must_use]
    pub fn new(repository: Arc<dyn AuthorizationRepository>) -> Self {
        Self { repository }
    }

    /// Checks the operation's declared permissions for the caller.
    ///
    /// Every required entry must be matched by at least one permission row
    /// with the same action, resource type and value.
    pub async fn authorize(
        &self,
        actor: &ActorContext,
        operation: Operation,
    ) -> AppResult<Access> {
        let requirements = operation.required_permissions();
        if requirements.is_empty() {
            return Ok(Access::Session {
                workspace_id: actor.requested_workspace(),
            });
        }

        let Some(workspace_id) = self.resolve_workspace(actor).await? else {
            tracing::debug!(
                user_id = %actor.user_id(),
                operation = operation.name(),
                "denied operation without workspace"
            );
            return Err(AppError::Forbidden(format!(
                "'{}' requires an active workspace membership",
                operation.name()
            )));
        };

        let access = match self
            .resolve_active_membership(actor.user_id(), workspace_id)
            .await
        {
            Ok(access) => access,
            Err(AppError::Unauthorized(_)) => {
                tracing::debug!(
                    user_id = %actor.user_id(),
                    %workspace_id,
                    operation = operation.name(),
                    "denied operation for inactive or missing membership"
                );
                return Err(AppError::Forbidden(format!(
                    "'{}' requires an active workspace membership",
                    operation.name()
                )));
            }
            Err(error) => return Err(error),
        };

        if let Some(missing) = requirements
            .iter()
            .find(|requirement| !requirement.is_satisfied_by(&access.permissions))
        {
            tracing::debug!(
                user_id = %actor.user_id(),
                %workspace_id,
                operation = operation.name(),
                "denied operation for missing permission"
            );
            return Err(AppError::Forbidden(format!(
                "missing permission '{}' on '{}'",
                missing.action, missing.resource_type
            )));
        }

        Ok(Access::Member(access))
    }

    /// Authorizes the operation and returns the workspace it runs in.
    pub async fn require_workspace(
        &self,
        actor: &ActorContext,
        operation: Operation,
    ) -> AppResult<WorkspaceId> {
        self.authorize(actor, operation).await?.workspace_id()
    }
}

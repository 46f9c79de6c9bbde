use super::*;

impl AuthorizationService {
    /// Resolves the workspace for a request.
    ///
    /// An explicit workspace wins; otherwise the user's persisted default is used.
    pub async fn resolve_workspace(&self, actor: &ActorContext) -> AppResult<Option<WorkspaceId>> {
        if let Some(workspace_id) = actor.requested_workspace() {
            return Ok(Some(workspace_id));
        }

        self.repository.find_default_workspace(actor.user_id()).await
    }

    /// Returns the caller's ACTIVE membership and its permissions.
    pub async fn resolve_active_membership(
        &self,
        user_id: UserId,
        workspace_id: WorkspaceId,
    ) -> AppResult<MemberAccess> {
        self.repository
            .find_member_access(workspace_id, user_id)
            .await?
            .filter(|access| access.member.status.is_active())
            .ok_or_else(|| {
                AppError::Unauthorized(format!(
                    "user '{user_id}' has no active membership in workspace '{workspace_id}'"
                ))
            })
    }
}

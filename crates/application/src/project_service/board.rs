use std::collections::HashSet;

use super::*;

use crate::{BacklogView, BoardColumnView, BoardView, CardEntry, SprintPlan};

impl ProjectService {
    /// Returns the live board.
    ///
    /// Only cards of Active sprints are placed in columns; backlog cards and
    /// cards of Inactive or Completed sprints are left out.
    pub async fn get_board(&self, actor: &ActorContext, project_id: Uuid) -> AppResult<BoardView> {
        let workspace_id = self
            .authorization_service
            .require_workspace(actor, Operation::ReadBoard)
            .await?;

        self.load_project(workspace_id, project_id).await?;
        let board = self.repository.find_board(workspace_id, project_id).await?;
        let active_sprints: Vec<Sprint> = self
            .repository
            .list_sprints(workspace_id, project_id)
            .await?
            .into_iter()
            .filter(|sprint| sprint.state == SprintState::Active)
            .collect();
        let active_sprint_ids: HashSet<Uuid> =
            active_sprints.iter().map(|sprint| sprint.sprint_id).collect();

        let mut entries: Vec<CardEntry> = self
            .repository
            .list_card_entries(workspace_id, project_id)
            .await?
            .into_iter()
            .filter(|entry| {
                entry
                    .card
                    .sprint_id
                    .is_some_and(|sprint_id| active_sprint_ids.contains(&sprint_id))
            })
            .collect();
        entries.sort_by_key(|entry| entry.card.position);

        let columns = board
            .columns()
            .iter()
            .map(|column| BoardColumnView {
                column: column.clone(),
                cards: entries
                    .iter()
                    .filter(|entry| entry.card.column_id == column.column_id)
                    .cloned()
                    .collect(),
            })
            .collect();

        Ok(BoardView {
            board_id: board.board_id(),
            project_id,
            name: board.name().as_str().to_owned(),
            active_sprints,
            columns,
        })
    }

    /// Returns backlog cards and every sprint with its cards.
    pub async fn get_backlog(
        &self,
        actor: &ActorContext,
        project_id: Uuid,
    ) -> AppResult<BacklogView> {
        let workspace_id = self
            .authorization_service
            .require_workspace(actor, Operation::ReadBacklog)
            .await?;

        self.load_project(workspace_id, project_id).await?;
        let sprints = self.repository.list_sprints(workspace_id, project_id).await?;
        let mut entries = self
            .repository
            .list_card_entries(workspace_id, project_id)
            .await?;
        entries.sort_by_key(|entry| entry.card.position);

        let (backlog, planned): (Vec<CardEntry>, Vec<CardEntry>) = entries
            .into_iter()
            .partition(|entry| entry.card.sprint_id.is_none());

        let sprints = sprints
            .into_iter()
            .map(|sprint| SprintPlan {
                cards: planned
                    .iter()
                    .filter(|entry| entry.card.sprint_id == Some(sprint.sprint_id))
                    .cloned()
                    .collect(),
                sprint,
            })
            .collect();

        Ok(BacklogView { backlog, sprints })
    }
}

use super::*;

use workhive_domain::Card;

use crate::{CardColumnMove, CardEntry};

impl ProjectService {
    /// Places a card into a sprint in one atomic update.
    pub async fn move_card_to_sprint(
        &self,
        actor: &ActorContext,
        card_id: Uuid,
        sprint_id: Uuid,
    ) -> AppResult<Card> {
        self.reassign_card(actor, card_id, Some(sprint_id)).await
    }

    /// Returns a card to the backlog.
    pub async fn move_card_to_backlog(&self, actor: &ActorContext, card_id: Uuid) -> AppResult<Card> {
        self.reassign_card(actor, card_id, None).await
    }

    /// Moves a card to another column of its board.
    ///
    /// The task takes the column's status; entering the terminal column
    /// completes it and leaving it reopens it.
    pub async fn move_card_to_column(
        &self,
        actor: &ActorContext,
        card_id: Uuid,
        column_id: Uuid,
    ) -> AppResult<CardEntry> {
        let workspace_id = self
            .authorization_service
            .require_workspace(actor, Operation::MoveCardToColumn)
            .await?;

        let card = self
            .repository
            .find_card(workspace_id, card_id)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("card '{card_id}' does not exist")))?;
        let board = self
            .repository
            .find_board(workspace_id, card.project_id)
            .await?;
        let column = board.column(column_id).ok_or_else(|| {
            AppError::NotFound(format!(
                "column '{column_id}' does not exist on the card's board"
            ))
        })?;

        let now = Utc::now();
        let entry = self
            .repository
            .move_card_to_column(
                workspace_id,
                CardColumnMove {
                    card_id,
                    column_id,
                    status_id: column.status.status_id,
                    completed_at: column.is_terminal.then_some(now),
                    updated_at: now,
                },
            )
            .await?;

        self.activity_recorder
            .record(
                ActivityEvent::new(
                    workspace_id,
                    actor.user_id(),
                    ActivityType::CardMovedToColumn,
                    format!("moved the task {} to {}", entry.task.key, column.name),
                )
                .with_project(card.project_id)
                .with_task(card.task_id),
            )
            .await;

        Ok(entry)
    }

    async fn reassign_card(
        &self,
        actor: &ActorContext,
        card_id: Uuid,
        sprint_id: Option<Uuid>,
    ) -> AppResult<Card> {
        let workspace_id = self
            .authorization_service
            .require_workspace(actor, Operation::MoveCardToSprint)
            .await?;

        let description = match sprint_id {
            Some(sprint_id) => {
                let sprint = self.load_sprint(workspace_id, sprint_id).await?;
                format!("moved the card to the sprint {}", sprint.name)
            }
            None => "moved the card to the backlog".to_owned(),
        };
        let card = self
            .repository
            .move_card_to_sprint(workspace_id, card_id, sprint_id)
            .await?;

        self.activity_recorder
            .record(
                ActivityEvent::new(
                    workspace_id,
                    actor.user_id(),
                    ActivityType::CardMovedToSprint,
                    description,
                )
                .with_project(card.project_id)
                .with_task(card.task_id),
            )
            .await;

        Ok(card)
    }
}

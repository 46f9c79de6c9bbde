use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use ts_rs::TS;
use uuid::Uuid;
use workhive_application::{
    BacklogView, BoardColumnView, BoardView, CardEntry, SprintPlan, UpdateProjectInput,
    UpdateSprintInput,
};
use workhive_domain::{Card, Project, Sprint};

use super::common::patch_field;
use super::tasks::TaskResponse;

/// Incoming payload for project creation.
#[derive(Debug, Deserialize, TS)]
#[ts(
    export,
    export_to = "../../../../packages/api-types/src/generated/create-project-request.ts"
)]
pub struct CreateProjectRequest {
    #[ts(type = "string")]
    pub stream_id: Uuid,
    pub name: String,
    pub description: Option<String>,
    #[ts(type = "string | null")]
    pub team_id: Option<Uuid>,
}

/// Incoming payload for project edits. Missing fields stay unchanged.
#[derive(Debug, Default, Deserialize, TS)]
#[ts(
    export,
    export_to = "../../../../packages/api-types/src/generated/update-project-request.ts"
)]
pub struct UpdateProjectRequest {
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default, deserialize_with = "patch_field")]
    #[ts(type = "string | null")]
    pub description: Option<Option<String>>,
}

impl From<UpdateProjectRequest> for UpdateProjectInput {
    fn from(value: UpdateProjectRequest) -> Self {
        Self {
            name: value.name,
            description: value.description,
        }
    }
}

/// Incoming payload for moving a project between teams.
#[derive(Debug, Deserialize, TS)]
#[ts(
    export,
    export_to = "../../../../packages/api-types/src/generated/assign-project-team-request.ts"
)]
pub struct AssignProjectTeamRequest {
    #[ts(type = "string | null")]
    pub team_id: Option<Uuid>,
}

/// API representation of a project.
#[derive(Debug, Serialize, TS)]
#[ts(
    export,
    export_to = "../../../../packages/api-types/src/generated/project-response.ts"
)]
pub struct ProjectResponse {
    pub project_id: String,
    pub stream_id: String,
    pub team_id: Option<String>,
    pub name: String,
    pub key_prefix: String,
    pub description: Option<String>,
    pub created_by: String,
    pub created_at: String,
}

impl From<Project> for ProjectResponse {
    fn from(value: Project) -> Self {
        Self {
            key_prefix: value.key_prefix(),
            project_id: value.project_id.to_string(),
            stream_id: value.stream_id.to_string(),
            team_id: value.team_id.map(|team_id| team_id.to_string()),
            name: value.name.to_string(),
            description: value.description,
            created_by: value.created_by.to_string(),
            created_at: value.created_at.to_rfc3339(),
        }
    }
}

/// Incoming payload for sprint creation.
#[derive(Debug, Deserialize, TS)]
#[ts(
    export,
    export_to = "../../../../packages/api-types/src/generated/create-sprint-request.ts"
)]
pub struct CreateSprintRequest {
    pub name: String,
    pub goal: Option<String>,
}

/// Incoming payload for sprint edits. Explicit `null` clears a field.
#[derive(Debug, Default, Deserialize, TS)]
#[ts(
    export,
    export_to = "../../../../packages/api-types/src/generated/update-sprint-request.ts"
)]
pub struct UpdateSprintRequest {
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default, deserialize_with = "patch_field")]
    #[ts(type = "string | null")]
    pub goal: Option<Option<String>>,
    #[serde(default, deserialize_with = "patch_field")]
    #[ts(type = "string | null")]
    pub start_date: Option<Option<DateTime<Utc>>>,
    #[serde(default, deserialize_with = "patch_field")]
    #[ts(type = "string | null")]
    pub end_date: Option<Option<DateTime<Utc>>>,
}

impl From<UpdateSprintRequest> for UpdateSprintInput {
    fn from(value: UpdateSprintRequest) -> Self {
        Self {
            name: value.name,
            goal: value.goal,
            start_date: value.start_date,
            end_date: value.end_date,
        }
    }
}

/// API representation of a sprint.
#[derive(Debug, Serialize, TS)]
#[ts(
    export,
    export_to = "../../../../packages/api-types/src/generated/sprint-response.ts"
)]
pub struct SprintResponse {
    pub sprint_id: String,
    pub project_id: String,
    pub name: String,
    pub goal: Option<String>,
    pub position: i32,
    pub state: String,
    pub start_date: Option<String>,
    pub end_date: Option<String>,
}

impl From<Sprint> for SprintResponse {
    fn from(value: Sprint) -> Self {
        Self {
            sprint_id: value.sprint_id.to_string(),
            project_id: value.project_id.to_string(),
            name: value.name.to_string(),
            goal: value.goal,
            position: value.position,
            state: value.state.as_str().to_owned(),
            start_date: value.start_date.map(|date| date.to_rfc3339()),
            end_date: value.end_date.map(|date| date.to_rfc3339()),
        }
    }
}

/// Incoming payload for planning a card into a sprint.
#[derive(Debug, Deserialize, TS)]
#[ts(
    export,
    export_to = "../../../../packages/api-types/src/generated/move-card-to-sprint-request.ts"
)]
pub struct MoveCardToSprintRequest {
    #[ts(type = "string")]
    pub sprint_id: Uuid,
}

/// Incoming payload for moving a card across board columns.
#[derive(Debug, Deserialize, TS)]
#[ts(
    export,
    export_to = "../../../../packages/api-types/src/generated/move-card-to-column-request.ts"
)]
pub struct MoveCardToColumnRequest {
    #[ts(type = "string")]
    pub column_id: Uuid,
}

/// API representation of a board card.
#[derive(Debug, Serialize, TS)]
#[ts(
    export,
    export_to = "../../../../packages/api-types/src/generated/card-response.ts"
)]
pub struct CardResponse {
    pub card_id: String,
    pub task_id: String,
    pub column_id: String,
    pub sprint_id: Option<String>,
    pub position: i32,
}

impl From<Card> for CardResponse {
    fn from(value: Card) -> Self {
        Self {
            card_id: value.card_id.to_string(),
            task_id: value.task_id.to_string(),
            column_id: value.column_id.to_string(),
            sprint_id: value.sprint_id.map(|sprint_id| sprint_id.to_string()),
            position: value.position,
        }
    }
}

/// Card together with the task it carries.
#[derive(Debug, Serialize, TS)]
#[ts(
    export,
    export_to = "../../../../packages/api-types/src/generated/card-entry-response.ts"
)]
pub struct CardEntryResponse {
    pub card: CardResponse,
    pub task: TaskResponse,
}

impl From<CardEntry> for CardEntryResponse {
    fn from(value: CardEntry) -> Self {
        Self {
            card: CardResponse::from(value.card),
            task: TaskResponse::from(value.task),
        }
    }
}

/// Board column with its cards in position order.
#[derive(Debug, Serialize, TS)]
#[ts(
    export,
    export_to = "../../../../packages/api-types/src/generated/board-column-response.ts"
)]
pub struct BoardColumnResponse {
    pub column_id: String,
    pub name: String,
    pub position: i32,
    pub is_initial: bool,
    pub is_terminal: bool,
    pub status_id: String,
    pub status_name: String,
    pub cards: Vec<CardEntryResponse>,
}

impl From<BoardColumnView> for BoardColumnResponse {
    fn from(value: BoardColumnView) -> Self {
        let column = value.column;
        Self {
            column_id: column.column_id.to_string(),
            name: column.name.to_string(),
            position: column.position,
            is_initial: column.is_initial,
            is_terminal: column.is_terminal,
            status_id: column.status.status_id.to_string(),
            status_name: column.status.name.to_string(),
            cards: value.cards.into_iter().map(CardEntryResponse::from).collect(),
        }
    }
}

/// Project board scoped to the active sprints.
#[derive(Debug, Serialize, TS)]
#[ts(
    export,
    export_to = "../../../../packages/api-types/src/generated/board-response.ts"
)]
pub struct BoardResponse {
    pub board_id: String,
    pub project_id: String,
    pub name: String,
    pub active_sprints: Vec<SprintResponse>,
    pub columns: Vec<BoardColumnResponse>,
}

impl From<BoardView> for BoardResponse {
    fn from(value: BoardView) -> Self {
        Self {
            board_id: value.board_id.to_string(),
            project_id: value.project_id.to_string(),
            name: value.name,
            active_sprints: value
                .active_sprints
                .into_iter()
                .map(SprintResponse::from)
                .collect(),
            columns: value
                .columns
                .into_iter()
                .map(BoardColumnResponse::from)
                .collect(),
        }
    }
}

/// Sprint with the cards planned into it.
#[derive(Debug, Serialize, TS)]
#[ts(
    export,
    export_to = "../../../../packages/api-types/src/generated/sprint-plan-response.ts"
)]
pub struct SprintPlanResponse {
    pub sprint: SprintResponse,
    pub cards: Vec<CardEntryResponse>,
}

impl From<SprintPlan> for SprintPlanResponse {
    fn from(value: SprintPlan) -> Self {
        Self {
            sprint: SprintResponse::from(value.sprint),
            cards: value.cards.into_iter().map(CardEntryResponse::from).collect(),
        }
    }
}

/// Backlog cards plus every sprint with its planned cards.
#[derive(Debug, Serialize, TS)]
#[ts(
    export,
    export_to = "../../../../packages/api-types/src/generated/backlog-response.ts"
)]
pub struct BacklogResponse {
    pub backlog: Vec<CardEntryResponse>,
    pub sprints: Vec<SprintPlanResponse>,
}

impl From<BacklogView> for BacklogResponse {
    fn from(value: BacklogView) -> Self {
        Self {
            backlog: value
                .backlog
                .into_iter()
                .map(CardEntryResponse::from)
                .collect(),
            sprints: value
                .sprints
                .into_iter()
                .map(SprintPlanResponse::from)
                .collect(),
        }
    }
}

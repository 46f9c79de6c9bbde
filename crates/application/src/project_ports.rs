use async_trait::async_trait;
use chrono::{DateTime, Utc};
use uuid::Uuid;
use workhive_core::{AppResult, WorkspaceId};
use workhive_domain::{Board, BoardColumn, Card, Project, Sprint, SprintState, Task};

/// Everything written when a project is created.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProjectProvisioning {
    /// Project record.
    pub project: Project,
    /// Board with its canonical columns and statuses.
    pub board: Board,
    /// Default sprint.
    pub sprint: Sprint,
}

/// Conditional sprint state change.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SprintTransition {
    /// Sprint to transition.
    pub sprint_id: Uuid,
    /// State the sprint must currently be in.
    pub from: SprintState,
    /// Target state.
    pub to: SprintState,
    /// Instant of the change; stamps the start date on activation when unset.
    pub at: DateTime<Utc>,
    /// Rejects activation while another sprint of the project is Active.
    pub enforce_single_active: bool,
}

/// Card placement paired with its task.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CardEntry {
    /// Board placement.
    pub card: Card,
    /// Task behind the card.
    pub task: Task,
}

/// Column move applied to a card and its task together.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CardColumnMove {
    /// Card to move.
    pub card_id: Uuid,
    /// Destination column.
    pub column_id: Uuid,
    /// Status bound to the destination column.
    pub status_id: Uuid,
    /// Completion stamp for the task; `None` clears it and an existing stamp is kept.
    pub completed_at: Option<DateTime<Utc>>,
    /// Task update stamp.
    pub updated_at: DateTime<Utc>,
}

/// Input payload for creating projects.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CreateProjectInput {
    /// Parent stream.
    pub stream_id: Uuid,
    /// Project name; also the task key prefix source.
    pub name: String,
    /// Optional description.
    pub description: Option<String>,
    /// Optional owning team of the same stream.
    pub team_id: Option<Uuid>,
}

/// Input payload for editing projects; `None` leaves a field unchanged.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct UpdateProjectInput {
    /// New name.
    pub name: Option<String>,
    /// New description; `Some(None)` clears it.
    pub description: Option<Option<String>>,
}

/// Input payload for creating sprints.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CreateSprintInput {
    /// Owning project.
    pub project_id: Uuid,
    /// Sprint name.
    pub name: String,
    /// Optional goal.
    pub goal: Option<String>,
}

/// Input payload for editing sprints; `None` leaves a field unchanged.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct UpdateSprintInput {
    /// New name.
    pub name: Option<String>,
    /// New goal; `Some(None)` clears it.
    pub goal: Option<Option<String>>,
    /// New start date; `Some(None)` clears it.
    pub start_date: Option<Option<DateTime<Utc>>>,
    /// New end date; `Some(None)` clears it.
    pub end_date: Option<Option<DateTime<Utc>>>,
}

/// Column with the cards shown in it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BoardColumnView {
    /// Column with its status.
    pub column: BoardColumn,
    /// Cards in the column ordered by position.
    pub cards: Vec<CardEntry>,
}

/// Live board: only cards of Active sprints are shown.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BoardView {
    /// Board identifier.
    pub board_id: Uuid,
    /// Owning project.
    pub project_id: Uuid,
    /// Board name.
    pub name: String,
    /// Active sprints; at most one unless the workflow policy allows more.
    pub active_sprints: Vec<Sprint>,
    /// Columns in board order.
    pub columns: Vec<BoardColumnView>,
}

/// Sprint with its cards.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SprintPlan {
    /// Sprint record.
    pub sprint: Sprint,
    /// Cards planned into the sprint.
    pub cards: Vec<CardEntry>,
}

/// Sprint-planning data of a project.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BacklogView {
    /// Cards without a sprint.
    pub backlog: Vec<CardEntry>,
    /// Every sprint by position with its cards.
    pub sprints: Vec<SprintPlan>,
}

/// Repository port for projects, boards, sprints and cards.
#[async_trait]
pub trait ProjectRepository: Send + Sync {
    /// Creates project, board, columns, statuses and default sprint atomically.
    async fn create_project(&self, provisioning: ProjectProvisioning) -> AppResult<Project>;

    /// Returns one project.
    async fn find_project(
        &self,
        workspace_id: WorkspaceId,
        project_id: Uuid,
    ) -> AppResult<Option<Project>>;

    /// Lists projects of a stream.
    async fn list_projects(
        &self,
        workspace_id: WorkspaceId,
        stream_id: Uuid,
    ) -> AppResult<Vec<Project>>;

    /// Persists project attribute changes.
    async fn save_project(&self, project: Project) -> AppResult<Project>;

    /// Deletes a project and everything it owns.
    async fn delete_project(&self, workspace_id: WorkspaceId, project_id: Uuid) -> AppResult<()>;

    /// Returns the project's board with its ordered columns.
    async fn find_board(&self, workspace_id: WorkspaceId, project_id: Uuid) -> AppResult<Board>;

    /// Lists every card of a project with its task.
    async fn list_card_entries(
        &self,
        workspace_id: WorkspaceId,
        project_id: Uuid,
    ) -> AppResult<Vec<CardEntry>>;

    /// Returns one card.
    async fn find_card(&self, workspace_id: WorkspaceId, card_id: Uuid) -> AppResult<Option<Card>>;

    /// Persists a sprint; the store assigns the next position in the project.
    async fn create_sprint(&self, workspace_id: WorkspaceId, sprint: Sprint) -> AppResult<Sprint>;

    /// Lists sprints of a project by position.
    async fn list_sprints(
        &self,
        workspace_id: WorkspaceId,
        project_id: Uuid,
    ) -> AppResult<Vec<Sprint>>;

    /// Returns one sprint.
    async fn find_sprint(
        &self,
        workspace_id: WorkspaceId,
        sprint_id: Uuid,
    ) -> AppResult<Option<Sprint>>;

    /// Persists sprint name, goal and schedule.
    async fn save_sprint(&self, workspace_id: WorkspaceId, sprint: Sprint) -> AppResult<Sprint>;

    /// Applies a state transition when the sprint is still in the expected state.
    async fn transition_sprint(
        &self,
        workspace_id: WorkspaceId,
        transition: SprintTransition,
    ) -> AppResult<Sprint>;

    /// Deletes a sprint, returning its cards to the backlog.
    async fn delete_sprint(&self, workspace_id: WorkspaceId, sprint_id: Uuid) -> AppResult<()>;

    /// Reassigns a card's sprint in one update; `None` moves it to the backlog.
    ///
    /// The sprint must belong to the card's project and not be Completed.
    async fn move_card_to_sprint(
        &self,
        workspace_id: WorkspaceId,
        card_id: Uuid,
        sprint_id: Option<Uuid>,
    ) -> AppResult<Card>;

    /// Moves a card to a column and sets its task's status in one transaction.
    async fn move_card_to_column(
        &self,
        workspace_id: WorkspaceId,
        change: CardColumnMove,
    ) -> AppResult<CardEntry>;
}

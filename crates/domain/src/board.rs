use std::collections::HashSet;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;
use workhive_core::{AppError, AppResult, NonEmptyString};

/// Canonical columns provisioned for every new board, in order.
pub const CANONICAL_COLUMNS: [&str; 3] = ["To Do", "In Progress", "Done"];

/// Workflow status bound 1:1 to a board column.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Status {
    /// Status identifier.
    pub status_id: Uuid,
    /// Status name, equal to the column name.
    pub name: NonEmptyString,
}

/// Board lane.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BoardColumn {
    /// Column identifier.
    pub column_id: Uuid,
    /// Column name.
    pub name: NonEmptyString,
    /// Left-to-right ordering.
    pub position: i32,
    /// Landing column for new tasks.
    pub is_initial: bool,
    /// Entering this column completes the task.
    pub is_terminal: bool,
    /// The column's status.
    pub status: Status,
}

/// Kanban board of a project.
///
/// Columns are kept ordered by position and exactly one of them is initial.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Board {
    board_id: Uuid,
    project_id: Uuid,
    name: NonEmptyString,
    columns: Vec<BoardColumn>,
}

impl Board {
    /// Creates a board after validating its column invariants.
    pub fn new(
        board_id: Uuid,
        project_id: Uuid,
        name: impl Into<String>,
        mut columns: Vec<BoardColumn>,
    ) -> AppResult<Self> {
        let initial_count = columns.iter().filter(|column| column.is_initial).count();
        if initial_count != 1 {
            return Err(AppError::Validation(format!(
                "board must have exactly one initial column, found {initial_count}"
            )));
        }

        if columns.iter().filter(|column| column.is_terminal).count() > 1 {
            return Err(AppError::Validation(
                "board must have at most one terminal column".to_owned(),
            ));
        }

        let mut statuses = HashSet::new();
        if !columns
            .iter()
            .all(|column| statuses.insert(column.status.status_id))
        {
            return Err(AppError::Validation(
                "each board column needs its own status".to_owned(),
            ));
        }

        columns.sort_by_key(|column| column.position);

        Ok(Self {
            board_id,
            project_id,
            name: NonEmptyString::new(name)?,
            columns,
        })
    }

    /// Builds the board of a new project with the three canonical columns.
    pub fn canonical(project_id: Uuid, project_name: &str) -> AppResult<Self> {
        let last = CANONICAL_COLUMNS.len() - 1;
        let columns = CANONICAL_COLUMNS
            .iter()
            .enumerate()
            .map(|(index, name)| -> AppResult<BoardColumn> {
                Ok(BoardColumn {
                    column_id: Uuid::new_v4(),
                    name: NonEmptyString::new(*name)?,
                    position: i32::try_from(index).map_err(|error| {
                        AppError::Internal(format!("invalid column position: {error}"))
                    })?,
                    is_initial: index == 0,
                    is_terminal: index == last,
                    status: Status {
                        status_id: Uuid::new_v4(),
                        name: NonEmptyString::new(*name)?,
                    },
                })
            })
            .collect::<AppResult<Vec<_>>>()?;

        Self::new(
            Uuid::new_v4(),
            project_id,
            format!("{project_name} Board"),
            columns,
        )
    }

    /// Returns the board identifier.
    #[must_use]
    pub fn board_id(&self) -> Uuid {
        self.board_id
    }

    /// Returns the owning project.
    #[must_use]
    pub fn project_id(&self) -> Uuid {
        self.project_id
    }

    /// Returns the board name.
    #[must_use]
    pub fn name(&self) -> &NonEmptyString {
        &self.name
    }

    /// Returns columns ordered by position.
    #[must_use]
    pub fn columns(&self) -> &[BoardColumn] {
        &self.columns
    }

    /// Returns the unique initial column.
    pub fn initial_column(&self) -> AppResult<&BoardColumn> {
        self.columns
            .iter()
            .find(|column| column.is_initial)
            .ok_or_else(|| {
                AppError::Internal(format!("board '{}' has no initial column", self.board_id))
            })
    }

    /// Finds a column by identifier.
    #[must_use]
    pub fn column(&self, column_id: Uuid) -> Option<&BoardColumn> {
        self.columns
            .iter()
            .find(|column| column.column_id == column_id)
    }

    /// Finds the column bound to a status.
    #[must_use]
    pub fn column_for_status(&self, status_id: Uuid) -> Option<&BoardColumn> {
        self.columns
            .iter()
            .find(|column| column.status.status_id == status_id)
    }
}

/// Sprint lifecycle state.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum SprintState {
    /// Planned, not started.
    Inactive,
    /// Currently running; its cards are on the live board.
    Active,
    /// Finished.
    Completed,
}

impl SprintState {
    /// Returns a stable storage value for the state.
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Inactive => "Inactive",
            Self::Active => "Active",
            Self::Completed => "Completed",
        }
    }

    /// Validates a transition, allowing only Inactive to Active and Active to Completed.
    pub fn transition_to(self, next: SprintState) -> AppResult<SprintState> {
        match (self, next) {
            (Self::Inactive, Self::Active) | (Self::Active, Self::Completed) => Ok(next),
            _ => Err(AppError::Conflict(format!(
                "sprint cannot move from '{}' to '{}'",
                self.as_str(),
                next.as_str()
            ))),
        }
    }
}

impl FromStr for SprintState {
    type Err = AppError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value {
            "Inactive" => Ok(Self::Inactive),
            "Active" => Ok(Self::Active),
            "Completed" => Ok(Self::Completed),
            _ => Err(AppError::Validation(format!(
                "unknown sprint state '{value}'"
            ))),
        }
    }
}

/// Time-boxed grouping of cards.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Sprint {
    /// Sprint identifier.
    pub sprint_id: Uuid,
    /// Owning project.
    pub project_id: Uuid,
    /// Sprint name.
    pub name: NonEmptyString,
    /// Optional sprint goal.
    pub goal: Option<String>,
    /// Ordering within the project.
    pub position: i32,
    /// Lifecycle state.
    pub state: SprintState,
    /// Planned or actual start.
    pub start_date: Option<DateTime<Utc>>,
    /// Planned end.
    pub end_date: Option<DateTime<Utc>>,
}

impl Sprint {
    /// Applies a state transition, stamping the start date when starting.
    pub fn transition(&mut self, next: SprintState, now: DateTime<Utc>) -> AppResult<()> {
        self.state = self.state.transition_to(next)?;
        if next == SprintState::Active && self.start_date.is_none() {
            self.start_date = Some(now);
        }

        Ok(())
    }
}

/// Validates that a sprint window does not end before it starts.
pub fn validate_sprint_schedule(
    start_date: Option<DateTime<Utc>>,
    end_date: Option<DateTime<Utc>>,
) -> AppResult<()> {
    if let (Some(start_date), Some(end_date)) = (start_date, end_date)
        && end_date < start_date
    {
        return Err(AppError::Validation(
            "sprint end date must not precede its start date".to_owned(),
        ));
    }

    Ok(())
}

/// Board placement of a task.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Card {
    /// Card identifier.
    pub card_id: Uuid,
    /// Task shown by the card.
    pub task_id: Uuid,
    /// Owning project.
    pub project_id: Uuid,
    /// Current column.
    pub column_id: Uuid,
    /// Sprint, or `None` for the backlog.
    pub sprint_id: Option<Uuid>,
    /// Card ordering, independent of task priority.
    pub position: i32,
}

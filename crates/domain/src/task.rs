use std::collections::{HashMap, HashSet, VecDeque};
use std::fmt::{Display, Formatter};
use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;
use workhive_core::{AppError, AppResult, NonEmptyString, UserId};

use crate::project::project_key_prefix;

/// Human-readable task key such as `LAUNCH-1` or `LAUNCH-1-2`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct TaskKey(String);

impl TaskKey {
    /// Builds a top-level key from a project name and sequence number.
    pub fn for_project(project_name: &str, sequence: i64) -> AppResult<Self> {
        let prefix = project_key_prefix(project_name);
        if prefix.is_empty() {
            return Err(AppError::Validation(
                "project name produces an empty key prefix".to_owned(),
            ));
        }

        Ok(Self(format!("{prefix}-{}", validate_sequence(sequence)?)))
    }

    /// Builds a subtask key from the parent key and the parent's sequence number.
    pub fn for_subtask(parent: &TaskKey, sequence: i64) -> AppResult<Self> {
        Ok(Self(format!("{}-{}", parent.0, validate_sequence(sequence)?)))
    }

    /// Rehydrates a stored key.
    pub fn from_stored(value: impl Into<String>) -> AppResult<Self> {
        Ok(Self(NonEmptyString::new(value)?.into()))
    }

    /// Returns the key string.
    #[must_use]
    pub fn as_str(&self) -> &str {
        self.0.as_str()
    }
}

impl Display for TaskKey {
    fn fmt(&self, formatter: &mut Formatter<'_>) -> std::fmt::Result {
        formatter.write_str(self.0.as_str())
    }
}

fn validate_sequence(sequence: i64) -> AppResult<i64> {
    if sequence < 1 {
        return Err(AppError::Validation(format!(
            "task sequence must be positive, got {sequence}"
        )));
    }

    Ok(sequence)
}

/// Task priority.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Default, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum TaskPriority {
    /// Lowest priority.
    Lowest,
    /// Low priority.
    Low,
    /// Default priority.
    #[default]
    Medium,
    /// High priority.
    High,
    /// Highest priority.
    Highest,
}

impl TaskPriority {
    /// Returns a stable storage value for the priority.
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Lowest => "LOWEST",
            Self::Low => "LOW",
            Self::Medium => "MEDIUM",
            Self::High => "HIGH",
            Self::Highest => "HIGHEST",
        }
    }
}

impl FromStr for TaskPriority {
    type Err = AppError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value {
            "LOWEST" => Ok(Self::Lowest),
            "LOW" => Ok(Self::Low),
            "MEDIUM" => Ok(Self::Medium),
            "HIGH" => Ok(Self::High),
            "HIGHEST" => Ok(Self::Highest),
            _ => Err(AppError::Validation(format!(
                "unknown task priority '{value}'"
            ))),
        }
    }
}

/// Work item.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Task {
    /// Task identifier.
    pub task_id: Uuid,
    /// Owning project.
    pub project_id: Uuid,
    /// Unique key within the project.
    pub key: TaskKey,
    /// Free-text description.
    pub description: NonEmptyString,
    /// Priority.
    pub priority: TaskPriority,
    /// Optional due date.
    pub due_date: Option<DateTime<Utc>>,
    /// Normalized labels.
    pub labels: Vec<String>,
    /// Reporting user.
    pub reporter_id: UserId,
    /// Single assignee slot.
    pub assignee_id: Option<UserId>,
    /// Parent task for subtasks.
    pub parent_id: Option<Uuid>,
    /// Current status.
    pub status_id: Uuid,
    /// Creation timestamp.
    pub created_at: DateTime<Utc>,
    /// Last modification timestamp.
    pub updated_at: DateTime<Utc>,
    /// Set while the task sits in the terminal column.
    pub completed_at: Option<DateTime<Utc>>,
}

/// Editable task fields; `None` leaves a field unchanged.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TaskUpdate {
    /// New description.
    pub description: Option<String>,
    /// New priority.
    pub priority: Option<TaskPriority>,
    /// New due date; `Some(None)` clears it.
    pub due_date: Option<Option<DateTime<Utc>>>,
    /// Replacement label set.
    pub labels: Option<Vec<String>>,
}

impl TaskUpdate {
    /// Returns whether the update changes nothing.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.description.is_none()
            && self.priority.is_none()
            && self.due_date.is_none()
            && self.labels.is_none()
    }

    /// Applies the update to a task and bumps its modification time.
    pub fn apply_to(self, task: &mut Task, now: DateTime<Utc>) -> AppResult<()> {
        if self.is_empty() {
            return Err(AppError::Validation(
                "task update must change at least one field".to_owned(),
            ));
        }

        if let Some(description) = self.description {
            task.description = NonEmptyString::new(description.trim())?;
        }
        if let Some(priority) = self.priority {
            task.priority = priority;
        }
        if let Some(due_date) = self.due_date {
            task.due_date = due_date;
        }
        if let Some(labels) = self.labels {
            task.labels = normalize_labels(labels);
        }
        task.updated_at = now;

        Ok(())
    }
}

/// Trims labels and drops blanks and duplicates while keeping order.
#[must_use]
pub fn normalize_labels(labels: Vec<String>) -> Vec<String> {
    let mut seen = HashSet::new();
    labels
        .into_iter()
        .map(|label| label.trim().to_owned())
        .filter(|label| !label.is_empty() && seen.insert(label.clone()))
        .collect()
}

/// Directed edge: `task_id` depends on `depends_on_task_id`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TaskDependency {
    /// Edge identifier.
    pub dependency_id: Uuid,
    /// Dependent task.
    pub task_id: Uuid,
    /// Task that must be done first.
    pub depends_on_task_id: Uuid,
}

/// Checklist entry of a task.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChecklistItem {
    /// Item identifier.
    pub item_id: Uuid,
    /// Owning task.
    pub task_id: Uuid,
    /// Item text.
    pub content: NonEmptyString,
    /// Completion flag.
    pub is_done: bool,
    /// Ordering within the task.
    pub position: i32,
}

/// Returns whether adding `task_id -> depends_on` would close a cycle.
///
/// `edges` holds existing `(task_id, depends_on_task_id)` pairs.
#[must_use]
pub fn creates_dependency_cycle(edges: &[(Uuid, Uuid)], task_id: Uuid, depends_on: Uuid) -> bool {
    if task_id == depends_on {
        return true;
    }

    let mut adjacency: HashMap<Uuid, Vec<Uuid>> = HashMap::new();
    for (from, to) in edges {
        adjacency.entry(*from).or_default().push(*to);
    }

    let mut visited = HashSet::new();
    let mut queue = VecDeque::from([depends_on]);
    while let Some(current) = queue.pop_front() {
        if current == task_id {
            return true;
        }
        if !visited.insert(current) {
            continue;
        }
        if let Some(next) = adjacency.get(&current) {
            queue.extend(next.iter().copied());
        }
    }

    false
}

#[cfg(test)]
mod tests {
    use proptest::prelude::*;
    use uuid::Uuid;

    use super::{TaskKey, creates_dependency_cycle, normalize_labels};

    #[test]
    fn project_key_uses_uppercase_prefix() {
        let key = TaskKey::for_project("Launch", 1);
        assert_eq!(key.ok().map(|key| key.as_str().to_owned()), Some("LAUNCH-1".to_owned()));
    }

    #[test]
    fn subtask_key_extends_parent_key() {
        let parent = TaskKey::for_project("Launch", 3).unwrap_or_else(|_| unreachable!());
        let child = TaskKey::for_subtask(&parent, 2);
        assert_eq!(child.ok().map(|key| key.to_string()), Some("LAUNCH-3-2".to_owned()));
    }

    #[test]
    fn zero_sequence_is_rejected() {
        assert!(TaskKey::for_project("Launch", 0).is_err());
    }

    #[test]
    fn labels_are_trimmed_and_deduplicated() {
        let labels = normalize_labels(vec![
            " backend ".to_owned(),
            "backend".to_owned(),
            "  ".to_owned(),
            "ui".to_owned(),
        ]);
        assert_eq!(labels, vec!["backend".to_owned(), "ui".to_owned()]);
    }

    #[test]
    fn detects_transitive_cycle() {
        let a = Uuid::new_v4();
        let b = Uuid::new_v4();
        let c = Uuid::new_v4();
        let edges = vec![(a, b), (b, c)];

        assert!(creates_dependency_cycle(&edges, c, a));
        assert!(!creates_dependency_cycle(&edges, a, c));
    }

    proptest! {
        #[test]
        fn project_keys_never_contain_whitespace(name in "[A-Za-z][A-Za-z0-9 ]{0,20}", sequence in 1_i64..10_000) {
            let key = TaskKey::for_project(&name, sequence);
            prop_assert!(key.is_ok());
            let key = key.unwrap_or_else(|_| unreachable!());
            prop_assert!(!key.as_str().contains(char::is_whitespace));
            let expected_suffix = format!("-{sequence}");
            prop_assert!(key.as_str().ends_with(&expected_suffix));
            prop_assert_eq!(key.as_str().to_uppercase(), key.as_str().to_owned());
        }

        #[test]
        fn chain_edges_never_accept_back_edge(length in 2_usize..12) {
            let nodes: Vec<Uuid> = (0..length).map(|_| Uuid::new_v4()).collect();
            let edges: Vec<(Uuid, Uuid)> = nodes.windows(2).map(|pair| (pair[0], pair[1])).collect();

            prop_assert!(creates_dependency_cycle(&edges, nodes[length - 1], nodes[0]));
            prop_assert!(!creates_dependency_cycle(&edges, nodes[0], nodes[length - 1]));
        }
    }
}

use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::board::BoardColumn;
use crate::task::Task;

/// Days covered on each side of "now" by the project summary.
pub const SUMMARY_WINDOW_DAYS: i64 = 7;

/// Number of recent activities included in the project summary.
pub const SUMMARY_ACTIVITY_LIMIT: usize = 10;

/// Rolling window around a reference instant.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SummaryWindow {
    now: DateTime<Utc>,
    since: DateTime<Utc>,
    until: DateTime<Utc>,
}

impl SummaryWindow {
    /// Builds the ±7 day window around `now`.
    #[must_use]
    pub fn around(now: DateTime<Utc>) -> Self {
        let span = Duration::days(SUMMARY_WINDOW_DAYS);
        Self {
            now,
            since: now - span,
            until: now + span,
        }
    }

    /// Returns the reference instant.
    #[must_use]
    pub fn now(&self) -> DateTime<Utc> {
        self.now
    }

    fn is_recent(&self, instant: DateTime<Utc>) -> bool {
        instant >= self.since && instant <= self.now
    }

    fn is_upcoming(&self, instant: DateTime<Utc>) -> bool {
        instant >= self.now && instant <= self.until
    }
}

/// Task counts over the summary window.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TaskCountSummary {
    /// Completed during the last 7 days.
    pub completed: i64,
    /// Open tasks due in the next 7 days.
    pub due: i64,
    /// Open tasks past their due date.
    pub overdue: i64,
    /// Created during the last 7 days.
    pub created: i64,
    /// Updated during the last 7 days.
    pub updated: i64,
}

/// Task count for one status, zero counts included.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StatusTaskCount {
    /// Status identifier.
    pub status_id: Uuid,
    /// Status name.
    pub status_name: String,
    /// Number of tasks in the status.
    pub task_count: i64,
}

/// Counts tasks against the rolling window.
#[must_use]
pub fn summarize_tasks(tasks: &[Task], window: SummaryWindow) -> TaskCountSummary {
    tasks
        .iter()
        .fold(TaskCountSummary::default(), |mut summary, task| {
            if task.completed_at.is_some_and(|instant| window.is_recent(instant)) {
                summary.completed += 1;
            }
            if task.completed_at.is_none()
                && let Some(due_date) = task.due_date
            {
                if window.is_upcoming(due_date) {
                    summary.due += 1;
                } else if due_date < window.now() {
                    summary.overdue += 1;
                }
            }
            if window.is_recent(task.created_at) {
                summary.created += 1;
            }
            if window.is_recent(task.updated_at) {
                summary.updated += 1;
            }
            summary
        })
}

/// Counts tasks per board status in column order.
#[must_use]
pub fn count_tasks_by_status(columns: &[BoardColumn], tasks: &[Task]) -> Vec<StatusTaskCount> {
    columns
        .iter()
        .map(|column| StatusTaskCount {
            status_id: column.status.status_id,
            status_name: column.status.name.as_str().to_owned(),
            task_count: tasks
                .iter()
                .filter(|task| task.status_id == column.status.status_id)
                .count() as i64,
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use chrono::{DateTime, Duration, Utc};
    use uuid::Uuid;
    use workhive_core::{NonEmptyString, UserId};

    use super::{SummaryWindow, count_tasks_by_status, summarize_tasks};
    use crate::board::Board;
    use crate::task::{Task, TaskKey, TaskPriority};

    fn task(status_id: Uuid, now: DateTime<Utc>) -> Task {
        Task {
            task_id: Uuid::new_v4(),
            project_id: Uuid::new_v4(),
            key: TaskKey::for_project("Launch", 1).unwrap_or_else(|_| unreachable!()),
            description: NonEmptyString::new("Ship it").unwrap_or_else(|_| unreachable!()),
            priority: TaskPriority::Medium,
            due_date: None,
            labels: Vec::new(),
            reporter_id: UserId::new(),
            assignee_id: None,
            parent_id: None,
            status_id,
            created_at: now,
            updated_at: now,
            completed_at: None,
        }
    }

    #[test]
    fn counts_due_overdue_and_completed() {
        let now = Utc::now();
        let status_id = Uuid::new_v4();

        let mut due_soon = task(status_id, now);
        due_soon.due_date = Some(now + Duration::days(3));

        let mut overdue = task(status_id, now);
        overdue.due_date = Some(now - Duration::days(1));

        let mut done_overdue = task(status_id, now);
        done_overdue.due_date = Some(now - Duration::days(2));
        done_overdue.completed_at = Some(now - Duration::days(1));

        let mut old = task(status_id, now);
        old.created_at = now - Duration::days(30);
        old.updated_at = now - Duration::days(20);
        old.due_date = Some(now + Duration::days(30));

        let summary = summarize_tasks(
            &[due_soon, overdue, done_overdue, old],
            SummaryWindow::around(now),
        );

        assert_eq!(summary.due, 1);
        assert_eq!(summary.overdue, 1);
        assert_eq!(summary.completed, 1);
        assert_eq!(summary.created, 3);
        assert_eq!(summary.updated, 3);
    }

    #[test]
    fn status_breakdown_includes_empty_statuses() {
        let board = Board::canonical(Uuid::new_v4(), "Launch").unwrap_or_else(|_| unreachable!());
        let to_do = board.columns()[0].status.status_id;
        let now = Utc::now();

        let counts =
            count_tasks_by_status(board.columns(), &[task(to_do, now), task(to_do, now)]);

        assert_eq!(counts.len(), 3);
        assert_eq!(counts[0].task_count, 2);
        assert_eq!(counts[1].task_count, 0);
        assert_eq!(counts[2].status_name, "Done");
    }
}

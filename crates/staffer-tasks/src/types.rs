//! Core types for employees, tasks, and assignment results.
//!
//! Field names stay `snake_case` on the wire (`parent_task_id`,
//! `employee_name`, ...), matching the HTTP contract.

use chrono::{DateTime, NaiveDate, NaiveDateTime, Utc};
use serde::{Deserialize, Deserializer, Serialize, de};

/// Status value meaning the task has an executor working on it.
pub const STATUS_IN_PROGRESS: &str = "в работе";

/// Status value removed first by cleanup.
pub const STATUS_COMPLETED: &str = "completed";

// ─────────────────────────────────────────────────────────────────────────────
// Entities
// ─────────────────────────────────────────────────────────────────────────────

/// An employee who can execute tasks.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Employee {
    /// Store-assigned identifier.
    pub id: i64,
    /// Display name.
    pub name: String,
    /// Job title.
    pub position: String,
}

/// A unit of work, optionally nested under a parent task.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Task {
    /// Store-assigned identifier.
    pub id: i64,
    /// Task title.
    pub name: String,
    /// Parent task, if this is a subtask.
    pub parent_task_id: Option<i64>,
    /// Employee executing the task, if assigned.
    pub executor_id: Option<i64>,
    /// Due time.
    pub deadline: DateTime<Utc>,
    /// Free-form status; [`STATUS_IN_PROGRESS`] is the only value with
    /// meaning to the service besides [`STATUS_COMPLETED`].
    pub status: String,
}

impl Task {
    /// Whether the task is currently being worked on.
    pub fn is_in_progress(&self) -> bool {
        self.status == STATUS_IN_PROGRESS
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Parameter types
// ─────────────────────────────────────────────────────────────────────────────

/// Parameters for creating an employee.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct EmployeeCreateParams {
    /// Display name (required, non-blank).
    pub name: String,
    /// Job title.
    pub position: String,
}

/// Parameters for creating a task.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TaskCreateParams {
    /// Task title (required, non-blank).
    pub name: String,
    /// Existing parent task.
    #[serde(default)]
    pub parent_task_id: Option<i64>,
    /// Existing employee to execute the task.
    #[serde(default)]
    pub executor_id: Option<i64>,
    /// Due time. See [`parse_deadline`] for the accepted forms.
    #[serde(deserialize_with = "deserialize_deadline")]
    pub deadline: DateTime<Utc>,
    /// Initial status (required, non-blank).
    pub status: String,
}

/// Parse a deadline timestamp.
///
/// RFC 3339 values are converted to UTC. Values without an offset
/// (`2026-05-20T09:30:00`, `2026-05-20 09:30:00`, or a bare date meaning
/// midnight) are taken as UTC.
pub fn parse_deadline(raw: &str) -> Option<DateTime<Utc>> {
    let raw = raw.trim();
    if let Ok(dt) = DateTime::parse_from_rfc3339(raw) {
        return Some(dt.with_timezone(&Utc));
    }
    if let Ok(naive) = raw.parse::<NaiveDateTime>() {
        return Some(naive.and_utc());
    }
    if let Ok(naive) = NaiveDateTime::parse_from_str(raw, "%Y-%m-%d %H:%M:%S%.f") {
        return Some(naive.and_utc());
    }
    raw.parse::<NaiveDate>()
        .ok()
        .and_then(|date| date.and_hms_opt(0, 0, 0))
        .map(|naive| naive.and_utc())
}

fn deserialize_deadline<'de, D>(deserializer: D) -> Result<DateTime<Utc>, D::Error>
where
    D: Deserializer<'de>,
{
    let raw = String::deserialize(deserializer)?;
    parse_deadline(&raw)
        .ok_or_else(|| de::Error::custom(format!("invalid deadline timestamp: {raw:?}")))
}

// ─────────────────────────────────────────────────────────────────────────────
// Result types
// ─────────────────────────────────────────────────────────────────────────────

/// Outcome of a successful assignment.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AssignedTask {
    /// Name of the new executor.
    pub employee_name: String,
    /// Name of the assigned task.
    pub task_name: String,
}

/// A proposed executor for an unassigned subtask.
///
/// `employee_name` is `None` when there are no employees at all.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Recommendation {
    /// Name of the proposed executor.
    pub employee_name: Option<String>,
    /// Name of the task being staffed.
    pub task_name: String,
}

/// Row counts removed by a cleanup.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct CleanupReport {
    /// Tasks removed because their status was [`STATUS_COMPLETED`].
    pub completed_tasks: usize,
    /// Remaining tasks removed.
    pub tasks: usize,
    /// Employees removed.
    pub employees: usize,
}

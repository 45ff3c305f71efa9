use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use uuid::Uuid;

use crate::error::RotaError;
use crate::model::Weekday;

/// Lifecycle state of one automation run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum RunStatus {
    #[default]
    Idle,
    Starting,
    NavigatingToLogin,
    AwaitingLogin,
    NavigatingToSchedule,
    Running,
    Complete,
    Error,
}

/// Why a single shift could not be entered. Soft failures only; any of
/// these leaves the rest of the run untouched.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FailureReason {
    /// No cell strategy produced a usable day cell
    CellNotFound,
    /// The shift form's inputs could not be located
    InputNotFound,
    /// The form was filled but no save control was found
    SaveControlNotFound,
    /// Save was clicked but the portal showed errors or never settled
    SaveUnconfirmed,
    /// Any other per-shift error, with its message
    Error(String),
}

impl fmt::Display for FailureReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FailureReason::CellNotFound => f.write_str("cell_not_found"),
            FailureReason::InputNotFound => f.write_str("input_not_found"),
            FailureReason::SaveControlNotFound => f.write_str("save_control_not_found"),
            FailureReason::SaveUnconfirmed => f.write_str("save_unconfirmed"),
            FailureReason::Error(msg) => write!(f, "error: {msg}"),
        }
    }
}

impl From<&RotaError> for FailureReason {
    fn from(err: &RotaError) -> Self {
        match err {
            RotaError::DayCellNotFound { .. } => FailureReason::CellNotFound,
            RotaError::InputNotFound(_) => FailureReason::InputNotFound,
            RotaError::SaveControlNotFound => FailureReason::SaveControlNotFound,
            other => FailureReason::Error(other.to_string()),
        }
    }
}

/// One shift that could not be entered automatically.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ShiftFailure {
    pub employee: String,
    pub day: Weekday,
    pub reason: FailureReason,
}

/// Accumulated result of one automation run.
///
/// The only mutable core state: owned by the orchestrator for the
/// duration of a run and reset at the start of each run. Surfaced to
/// the driving layer so a human can finish the misses by hand.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AutomationOutcome {
    pub run_id: Uuid,
    pub status: RunStatus,
    /// Names that never resolved to a row; their shifts were skipped.
    pub missing_employees: Vec<String>,
    /// Individual shifts that failed, in processing order.
    pub failed_shifts: Vec<ShiftFailure>,
    pub steps_completed: u32,
    pub steps_total: u32,
    /// True when the caller cancelled mid-run; the counters and lists
    /// reflect the work done before the cancellation point.
    pub cancelled: bool,
    pub started_at: DateTime<Utc>,
    pub finished_at: Option<DateTime<Utc>>,
}

impl AutomationOutcome {
    pub fn new(run_id: Uuid, steps_total: u32) -> Self {
        Self {
            run_id,
            status: RunStatus::Starting,
            missing_employees: Vec::new(),
            failed_shifts: Vec::new(),
            steps_completed: 0,
            steps_total,
            cancelled: false,
            started_at: Utc::now(),
            finished_at: None,
        }
    }

    /// Record an employee whose row never resolved. Set semantics on
    /// insertion order.
    pub fn record_missing_employee(&mut self, name: &str) {
        if !self.missing_employees.iter().any(|n| n == name) {
            self.missing_employees.push(name.to_string());
        }
    }

    pub fn record_failed_shift(&mut self, employee: &str, day: Weekday, reason: FailureReason) {
        self.failed_shifts.push(ShiftFailure {
            employee: employee.to_string(),
            day,
            reason,
        });
    }

    /// True when every shift was entered and every employee resolved.
    pub fn is_clean(&self) -> bool {
        self.missing_employees.is_empty() && self.failed_shifts.is_empty() && !self.cancelled
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_missing_employee_set_semantics() {
        let mut outcome = AutomationOutcome::new(Uuid::new_v4(), 4);
        outcome.record_missing_employee("Rob");
        outcome.record_missing_employee("Jane");
        outcome.record_missing_employee("Rob");
        assert_eq!(outcome.missing_employees, vec!["Rob", "Jane"]);
    }

    #[test]
    fn test_is_clean() {
        let mut outcome = AutomationOutcome::new(Uuid::new_v4(), 1);
        assert!(outcome.is_clean());

        outcome.record_failed_shift("Rob", Weekday::Monday, FailureReason::CellNotFound);
        assert!(!outcome.is_clean());
    }

    #[test]
    fn test_failure_reason_from_error() {
        let err = RotaError::DayCellNotFound {
            employee: "Rob".to_string(),
            day: Weekday::Monday,
        };
        assert_eq!(FailureReason::from(&err), FailureReason::CellNotFound);

        let err = RotaError::SaveControlNotFound;
        assert_eq!(FailureReason::from(&err), FailureReason::SaveControlNotFound);

        let err = RotaError::DriverRequest("boom".to_string());
        assert!(matches!(FailureReason::from(&err), FailureReason::Error(_)));
    }
}

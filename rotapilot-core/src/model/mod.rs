//! Data model for schedules and run outcomes.

mod outcome;
mod shift;

pub use outcome::{AutomationOutcome, FailureReason, RunStatus, ShiftFailure};
pub use shift::{EmployeeSchedule, ShiftKind, ShiftSlot, Weekday};

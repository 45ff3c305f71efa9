use serde::{Deserialize, Serialize};
use std::fmt;

use crate::error::{RotaError, RotaResult};

/// Day of the week a shift slot belongs to. Ordering is Monday-first to
/// match the portal's grid columns.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Weekday {
    Monday,
    Tuesday,
    Wednesday,
    Thursday,
    Friday,
    Saturday,
    Sunday,
}

impl Weekday {
    pub const ALL: [Weekday; 7] = [
        Weekday::Monday,
        Weekday::Tuesday,
        Weekday::Wednesday,
        Weekday::Thursday,
        Weekday::Friday,
        Weekday::Saturday,
        Weekday::Sunday,
    ];

    /// Zero-based column index in the scheduling grid (Monday = 0).
    pub fn index(&self) -> usize {
        *self as usize
    }

    /// Full display name, as the portal renders day headers.
    pub fn name(&self) -> &'static str {
        match self {
            Weekday::Monday => "Monday",
            Weekday::Tuesday => "Tuesday",
            Weekday::Wednesday => "Wednesday",
            Weekday::Thursday => "Thursday",
            Weekday::Friday => "Friday",
            Weekday::Saturday => "Saturday",
            Weekday::Sunday => "Sunday",
        }
    }

    /// Three-letter abbreviation, used to skip day tokens when sifting
    /// row text for candidate names.
    pub fn abbrev(&self) -> &'static str {
        &self.name()[..3]
    }
}

impl fmt::Display for Weekday {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Whether a day holds no work, one contiguous shift, or a split shift
/// with two slots.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum ShiftKind {
    #[default]
    None,
    Single,
    Double,
}

/// One day's work assignment for one employee.
///
/// Constructed by the schedule source and consumed read-only here.
/// Invariants: `kind == None` means no time fields at all; a Double
/// carries both slot pairs, and the break always belongs to the gap
/// between slot 1 and slot 2, never to the second slot itself.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ShiftSlot {
    pub day: Weekday,
    #[serde(default)]
    pub kind: ShiftKind,
    #[serde(default)]
    pub start1: Option<f64>,
    #[serde(default)]
    pub end1: Option<f64>,
    #[serde(default)]
    pub break1_minutes: u32,
    #[serde(default)]
    pub start2: Option<f64>,
    #[serde(default)]
    pub end2: Option<f64>,
}

impl ShiftSlot {
    pub fn none(day: Weekday) -> Self {
        Self {
            day,
            kind: ShiftKind::None,
            start1: None,
            end1: None,
            break1_minutes: 0,
            start2: None,
            end2: None,
        }
    }

    pub fn single(day: Weekday, start: f64, end: f64, break_minutes: u32) -> Self {
        Self {
            day,
            kind: ShiftKind::Single,
            start1: Some(start),
            end1: Some(end),
            break1_minutes: break_minutes,
            start2: None,
            end2: None,
        }
    }

    pub fn double(
        day: Weekday,
        start1: f64,
        end1: f64,
        break_minutes: u32,
        start2: f64,
        end2: f64,
    ) -> Self {
        Self {
            day,
            kind: ShiftKind::Double,
            start1: Some(start1),
            end1: Some(end1),
            break1_minutes: break_minutes,
            start2: Some(start2),
            end2: Some(end2),
        }
    }

    /// Number of fill+save cycles this slot contributes to a run.
    pub fn step_count(&self) -> u32 {
        match self.kind {
            ShiftKind::None => 0,
            ShiftKind::Single => 1,
            ShiftKind::Double => 2,
        }
    }

    /// Check the invariants the schedule source is expected to uphold.
    pub fn validate(&self) -> RotaResult<()> {
        match self.kind {
            ShiftKind::None => {
                if self.start1.is_some()
                    || self.end1.is_some()
                    || self.start2.is_some()
                    || self.end2.is_some()
                {
                    return Err(RotaError::InvalidSchedule(format!(
                        "{} has kind none but carries time fields",
                        self.day
                    )));
                }
            }
            ShiftKind::Single => {
                if self.start1.is_none() || self.end1.is_none() {
                    return Err(RotaError::InvalidSchedule(format!(
                        "{} single shift is missing start or end",
                        self.day
                    )));
                }
            }
            ShiftKind::Double => {
                if self.start1.is_none()
                    || self.end1.is_none()
                    || self.start2.is_none()
                    || self.end2.is_none()
                {
                    return Err(RotaError::InvalidSchedule(format!(
                        "{} double shift is missing a slot boundary",
                        self.day
                    )));
                }
            }
        }
        Ok(())
    }
}

/// One employee's week: a display name plus up to seven slots in
/// weekday order. Read-only to the automation core.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EmployeeSchedule {
    pub name: String,
    #[serde(default)]
    pub shifts: Vec<ShiftSlot>,
}

impl EmployeeSchedule {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            shifts: Vec::new(),
        }
    }

    pub fn with_shift(mut self, shift: ShiftSlot) -> Self {
        self.shifts.push(shift);
        self
    }

    /// Total fill+save cycles across all worked days.
    pub fn total_steps(&self) -> u32 {
        self.shifts.iter().map(ShiftSlot::step_count).sum()
    }

    pub fn validate(&self) -> RotaResult<()> {
        if self.name.trim().is_empty() {
            return Err(RotaError::InvalidSchedule(
                "employee with empty name".to_string(),
            ));
        }
        if self.shifts.len() > 7 {
            return Err(RotaError::InvalidSchedule(format!(
                "{} has {} shift slots, expected at most 7",
                self.name,
                self.shifts.len()
            )));
        }
        for shift in &self.shifts {
            shift.validate()?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_weekday_index_and_names() {
        assert_eq!(Weekday::Monday.index(), 0);
        assert_eq!(Weekday::Sunday.index(), 6);
        assert_eq!(Weekday::Wednesday.name(), "Wednesday");
        assert_eq!(Weekday::Thursday.abbrev(), "Thu");
    }

    #[test]
    fn test_step_counts() {
        assert_eq!(ShiftSlot::none(Weekday::Monday).step_count(), 0);
        assert_eq!(ShiftSlot::single(Weekday::Monday, 9.0, 17.0, 30).step_count(), 1);
        assert_eq!(
            ShiftSlot::double(Weekday::Monday, 9.0, 14.0, 60, 17.0, 22.0).step_count(),
            2
        );
    }

    #[test]
    fn test_validate_rejects_inconsistent_slots() {
        let mut slot = ShiftSlot::none(Weekday::Friday);
        slot.start1 = Some(9.0);
        assert!(slot.validate().is_err());

        let mut single = ShiftSlot::single(Weekday::Friday, 9.0, 17.0, 0);
        single.end1 = None;
        assert!(single.validate().is_err());

        let mut double = ShiftSlot::double(Weekday::Friday, 9.0, 14.0, 0, 17.0, 22.0);
        double.start2 = None;
        assert!(double.validate().is_err());
    }

    #[test]
    fn test_schedule_totals_and_validation() {
        let schedule = EmployeeSchedule::new("Rob")
            .with_shift(ShiftSlot::single(Weekday::Monday, 9.0, 17.0, 30))
            .with_shift(ShiftSlot::double(Weekday::Tuesday, 9.0, 14.0, 60, 17.0, 22.0))
            .with_shift(ShiftSlot::none(Weekday::Wednesday));
        assert_eq!(schedule.total_steps(), 3);
        assert!(schedule.validate().is_ok());

        assert!(EmployeeSchedule::new("  ").validate().is_err());
    }
}

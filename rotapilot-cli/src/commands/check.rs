use colored::Colorize;
use rotapilot_core::{to_clock_string, ShiftKind};

use super::read_schedules;

/// Validate a schedule file offline and show what a run would enter.
pub async fn handle_check_command(file: &str) -> anyhow::Result<()> {
    let schedules = read_schedules(file)?;

    println!("{}", "Checking schedule file...".cyan().bold());
    println!();

    let mut total_steps = 0;
    for schedule in &schedules {
        schedule.validate()?;
        let steps = schedule.total_steps();
        total_steps += steps;

        println!("  {} ({} step(s))", schedule.name.bold(), steps);
        for shift in &schedule.shifts {
            match shift.kind {
                ShiftKind::None => {}
                ShiftKind::Single => {
                    println!(
                        "      {} {} {}-{} break {}m",
                        "·".normal(),
                        shift.day,
                        to_clock_string(shift.start1.unwrap_or_default()),
                        to_clock_string(shift.end1.unwrap_or_default()),
                        shift.break1_minutes
                    );
                }
                ShiftKind::Double => {
                    println!(
                        "      {} {} {}-{} break {}m, then {}-{}",
                        "·".normal(),
                        shift.day,
                        to_clock_string(shift.start1.unwrap_or_default()),
                        to_clock_string(shift.end1.unwrap_or_default()),
                        shift.break1_minutes,
                        to_clock_string(shift.start2.unwrap_or_default()),
                        to_clock_string(shift.end2.unwrap_or_default())
                    );
                }
            }
        }
    }

    println!();
    println!(
        "{} {} employee(s), {} shift step(s) total",
        "✓".green(),
        schedules.len(),
        total_steps
    );
    Ok(())
}

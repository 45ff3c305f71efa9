use std::sync::Arc;

use colored::Colorize;
use rotapilot_core::{AutomationOrchestrator, AutomationOutcome, ProgressSink, ProgressStatus};
use tracing::warn;

use super::{connect, load_config, read_schedules};

pub async fn handle_run_command(
    file: &str,
    session: Option<String>,
    webdriver_url: Option<String>,
) -> anyhow::Result<()> {
    let config = load_config(webdriver_url)?;
    let schedules = read_schedules(file)?;
    if schedules.is_empty() {
        println!("{}", "Schedule file contains no employees.".yellow());
        return Ok(());
    }

    println!("{}", "Starting automation run...".cyan().bold());
    println!(
        "  {} {} employees, WebDriver at {}",
        "→".blue(),
        schedules.len(),
        config.webdriver.url
    );
    println!();

    let backend = connect(&config, session).await?;
    let dom = Arc::new(backend);

    let (sink, mut events) = ProgressSink::channel();
    let orchestrator = AutomationOrchestrator::new(dom, config).with_sink(sink);

    // Ctrl-C requests a clean stop at the next employee or shift
    // boundary; the partial outcome is still reported.
    let cancel = orchestrator.cancel_handle();
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            eprintln!("{}", "Cancellation requested, finishing current shift...".yellow());
            cancel.request_cancel();
        }
    });

    let printer = tokio::spawn(async move {
        while let Some(event) = events.recv().await {
            print_event(&event.status);
        }
    });

    let outcome = orchestrator.run(&schedules).await?;
    if printer.await.is_err() {
        warn!("progress printer task failed");
    }

    println!();
    print_summary(&outcome);
    Ok(())
}

fn print_event(status: &ProgressStatus) {
    match status {
        ProgressStatus::Starting {
            employees,
            total_steps,
        } => {
            println!(
                "  {} {} employees, {} shift steps",
                "→".blue(),
                employees,
                total_steps
            );
        }
        ProgressStatus::LoginRequired => {
            println!(
                "  {} {}",
                "!".yellow(),
                "Login required - please sign in to the portal".yellow()
            );
        }
        ProgressStatus::ProcessingEmployee {
            employee,
            index,
            total,
        } => {
            println!(
                "  {} [{}/{}] {}",
                "→".blue(),
                index + 1,
                total,
                employee.bold()
            );
        }
        ProgressStatus::ProcessingShift { day, kind, .. } => {
            println!("      {} {} ({:?})", "·".normal(), day, kind);
        }
        ProgressStatus::Progress { completed, total } => {
            println!("      {} {}/{}", "✓".green(), completed, total);
        }
        ProgressStatus::EmployeeNotFound { employee, .. } => {
            println!("  {} {} not found on the page", "✗".red(), employee.red());
        }
        ProgressStatus::EmployeeError { employee, error } => {
            println!("  {} {}: {}", "✗".red(), employee, error);
        }
        ProgressStatus::ShiftError {
            employee,
            day,
            error,
        } => {
            println!("      {} {} {}: {}", "✗".red(), employee, day, error);
        }
        ProgressStatus::Complete { .. } => {}
        ProgressStatus::Error { error } => {
            println!("  {} {}", "✗".red().bold(), error.red());
        }
    }
}

fn print_summary(outcome: &AutomationOutcome) {
    if outcome.cancelled {
        println!("{}", "Run cancelled.".yellow().bold());
    } else {
        println!("{}", "Run complete.".green().bold());
    }
    println!(
        "  {} {}/{} shift steps attempted",
        "→".blue(),
        outcome.steps_completed,
        outcome.steps_total
    );

    if !outcome.missing_employees.is_empty() {
        println!();
        println!(
            "{}",
            "Employees that could not be found (enter by hand):".yellow()
        );
        for name in &outcome.missing_employees {
            println!("  {} {}", "✗".red(), name);
        }
    }

    if !outcome.failed_shifts.is_empty() {
        println!();
        println!("{}", "Shifts that failed (enter by hand):".yellow());
        for failure in &outcome.failed_shifts {
            println!(
                "  {} {} {} - {}",
                "✗".red(),
                failure.employee,
                failure.day,
                failure.reason
            );
        }
    }

    if outcome.is_clean() {
        println!("  {} {}", "✓".green(), "No misses recorded".green());
    }
}

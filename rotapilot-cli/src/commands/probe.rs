use std::sync::Arc;

use colored::Colorize;
use rotapilot_core::dom::DomBackend;
use rotapilot_core::NavigationController;

use super::{connect, load_config};

/// Report what the browser is showing: reachable frames, whether the
/// login form is up, and whether the scheduling grid is detected.
pub async fn handle_probe_command(
    session: Option<String>,
    webdriver_url: Option<String>,
) -> anyhow::Result<()> {
    let config = load_config(webdriver_url)?;
    let backend = connect(&config, session).await?;
    let dom: Arc<dyn DomBackend> = Arc::new(backend);

    println!("{}", "Probing the current page...".cyan().bold());

    let contexts = dom.contexts().await?;
    println!(
        "  {} {} accessible document context(s)",
        "→".blue(),
        contexts.len()
    );

    let nav = NavigationController::new(dom, config.timing.clone(), config.webdriver.clone());

    if nav.is_login_page().await {
        println!("  {} {}", "!".yellow(), "Login form is showing".yellow());
    } else {
        println!("  {} No login form detected", "✓".green());
    }

    if nav.is_scheduling_page().await {
        println!("  {} {}", "✓".green(), "Scheduling page detected".green());
    } else {
        println!(
            "  {} {}",
            "✗".red(),
            "Scheduling page not detected - 'run' will attempt navigation".red()
        );
    }

    Ok(())
}

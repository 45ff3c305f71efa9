pub mod check;
pub mod probe;
pub mod run;

pub use check::handle_check_command;
pub use probe::handle_probe_command;
pub use run::handle_run_command;

use anyhow::Context;
use rotapilot_core::driver::WebDriverBackend;
use rotapilot_core::{EmployeeSchedule, RotaConfig};

/// Load config, letting a CLI flag override the WebDriver endpoint.
pub(crate) fn load_config(webdriver_url: Option<String>) -> anyhow::Result<RotaConfig> {
    let mut config = RotaConfig::load().context("failed to load configuration")?;
    if let Some(url) = webdriver_url {
        config.webdriver.url = url;
    }
    Ok(config)
}

/// Attach to an existing session when one is given (the usual flow:
/// the user logs in by hand first), otherwise open a fresh session and
/// point it at the portal.
pub(crate) async fn connect(
    config: &RotaConfig,
    session: Option<String>,
) -> anyhow::Result<WebDriverBackend> {
    match session {
        Some(id) => Ok(WebDriverBackend::attach(&config.webdriver.url, &id)),
        None => {
            let backend = WebDriverBackend::new_session(&config.webdriver.url)
                .await
                .context("failed to open a WebDriver session")?;
            backend
                .goto(&config.webdriver.portal_url)
                .await
                .context("failed to open the portal")?;
            Ok(backend)
        }
    }
}

/// Read and parse a JSON schedule file.
pub(crate) fn read_schedules(path: &str) -> anyhow::Result<Vec<EmployeeSchedule>> {
    let raw = std::fs::read_to_string(path)
        .with_context(|| format!("failed to read schedule file '{path}'"))?;
    let schedules: Vec<EmployeeSchedule> =
        serde_json::from_str(&raw).context("schedule file is not valid JSON")?;
    Ok(schedules)
}

//! Configuration for the automation core.
//!
//! Layered the usual way: built-in defaults, then an optional TOML file
//! (`rotapilot.toml` in the working directory or the platform config
//! dir), then `ROTAPILOT_*` environment overrides. The timing section
//! centralizes every settle delay and poll budget so the pacing of a
//! run can be tuned against a slow portal without touching code.

use config::{Config as ConfigBuilder, Environment, File};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

use crate::error::RotaResult;

#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct RotaConfig {
    #[serde(default)]
    pub timing: TimingConfig,
    #[serde(default)]
    pub matching: MatchingConfig,
    #[serde(default)]
    pub webdriver: WebDriverConfig,
    #[serde(default)]
    pub logging: LoggingConfig,
}

/// Settle delays and poll budgets, all in milliseconds / attempts.
///
/// Expiry of a budget is never fatal by itself: page-state checks
/// degrade to "assume best effort succeeded", element checks degrade
/// to a recorded per-shift failure.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TimingConfig {
    /// Wait after opening a shift form before touching its inputs.
    #[serde(default = "default_form_settle_ms")]
    pub form_settle_ms: u64,

    /// Wait after saving the first slot of a double shift before
    /// re-clicking the day cell; the host needs time to close the
    /// first sub-form.
    #[serde(default = "default_double_settle_ms")]
    pub double_settle_ms: u64,

    /// Wait after clicking save before inspecting the page.
    #[serde(default = "default_save_start_ms")]
    pub save_start_ms: u64,

    /// Spinner-disappearance poll interval and budget.
    #[serde(default = "default_save_poll_interval_ms")]
    pub save_poll_interval_ms: u64,
    #[serde(default = "default_save_poll_attempts")]
    pub save_poll_attempts: u32,

    /// Final settle after a save looks clean.
    #[serde(default = "default_post_save_settle_ms")]
    pub post_save_settle_ms: u64,

    /// Navigation-confirmation poll interval and budget.
    #[serde(default = "default_nav_poll_interval_ms")]
    pub nav_poll_interval_ms: u64,
    #[serde(default = "default_nav_poll_attempts")]
    pub nav_poll_attempts: u32,

    /// Wait after a navigation click before re-checking the page.
    #[serde(default = "default_nav_click_settle_ms")]
    pub nav_click_settle_ms: u64,

    /// Wait after opening a burger menu before looking for items.
    #[serde(default = "default_menu_open_ms")]
    pub menu_open_ms: u64,

    /// Wait after rewriting a frame URL.
    #[serde(default = "default_frame_nav_settle_ms")]
    pub frame_nav_settle_ms: u64,

    /// Login poll interval. The login wait itself is unbounded; a
    /// human has to act.
    #[serde(default = "default_login_poll_interval_ms")]
    pub login_poll_interval_ms: u64,

    /// Recovery pause after a shift-level error before continuing.
    #[serde(default = "default_recovery_ms")]
    pub recovery_ms: u64,

    /// Wait after clicking a day cell for the shift form to open.
    #[serde(default = "default_cell_click_settle_ms")]
    pub cell_click_settle_ms: u64,
}

impl Default for TimingConfig {
    fn default() -> Self {
        Self {
            form_settle_ms: default_form_settle_ms(),
            double_settle_ms: default_double_settle_ms(),
            save_start_ms: default_save_start_ms(),
            save_poll_interval_ms: default_save_poll_interval_ms(),
            save_poll_attempts: default_save_poll_attempts(),
            post_save_settle_ms: default_post_save_settle_ms(),
            nav_poll_interval_ms: default_nav_poll_interval_ms(),
            nav_poll_attempts: default_nav_poll_attempts(),
            nav_click_settle_ms: default_nav_click_settle_ms(),
            menu_open_ms: default_menu_open_ms(),
            frame_nav_settle_ms: default_frame_nav_settle_ms(),
            login_poll_interval_ms: default_login_poll_interval_ms(),
            recovery_ms: default_recovery_ms(),
            cell_click_settle_ms: default_cell_click_settle_ms(),
        }
    }
}

impl TimingConfig {
    /// All-zero delays with small poll budgets. Test configs only.
    pub fn instant() -> Self {
        Self {
            form_settle_ms: 0,
            double_settle_ms: 0,
            save_start_ms: 0,
            save_poll_interval_ms: 0,
            save_poll_attempts: 2,
            post_save_settle_ms: 0,
            nav_poll_interval_ms: 0,
            nav_poll_attempts: 2,
            nav_click_settle_ms: 0,
            menu_open_ms: 0,
            frame_nav_settle_ms: 0,
            login_poll_interval_ms: 0,
            recovery_ms: 0,
            cell_click_settle_ms: 0,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MatchingConfig {
    /// Reduce names to their first whitespace token before comparison.
    /// On by default: the rota carries first names only.
    #[serde(default = "default_true")]
    pub first_name_only: bool,
}

impl Default for MatchingConfig {
    fn default() -> Self {
        Self {
            first_name_only: true,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WebDriverConfig {
    /// WebDriver endpoint, e.g. a local chromedriver.
    #[serde(default = "default_webdriver_url")]
    pub url: String,

    /// Portal entry URL for fresh sessions.
    #[serde(default = "default_portal_url")]
    pub portal_url: String,

    /// Known relative URL of the scheduling screen, used by the
    /// direct frame-rewrite navigation fallback.
    #[serde(default = "default_schedule_frame_url")]
    pub schedule_frame_url: String,
}

impl Default for WebDriverConfig {
    fn default() -> Self {
        Self {
            url: default_webdriver_url(),
            portal_url: default_portal_url(),
            schedule_frame_url: default_schedule_frame_url(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoggingConfig {
    #[serde(default = "default_log_level")]
    pub level: String,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
        }
    }
}

impl RotaConfig {
    /// Load configuration from files and environment.
    pub fn load() -> RotaResult<Self> {
        let mut builder = ConfigBuilder::builder();

        if let Some(path) = Self::user_config_path() {
            builder = builder.add_source(File::from(path).required(false));
        }
        builder = builder.add_source(File::with_name("rotapilot").required(false));
        builder = builder.add_source(
            Environment::with_prefix("ROTAPILOT")
                .separator("__")
                .try_parsing(true),
        );

        let config = builder.build()?;
        Ok(config.try_deserialize()?)
    }

    fn user_config_path() -> Option<PathBuf> {
        dirs::config_dir().map(|dir| dir.join("rotapilot").join("config.toml"))
    }
}

fn default_form_settle_ms() -> u64 {
    1000
}
fn default_double_settle_ms() -> u64 {
    2000
}
fn default_save_start_ms() -> u64 {
    500
}
fn default_save_poll_interval_ms() -> u64 {
    500
}
fn default_save_poll_attempts() -> u32 {
    10
}
fn default_post_save_settle_ms() -> u64 {
    1000
}
fn default_nav_poll_interval_ms() -> u64 {
    1000
}
fn default_nav_poll_attempts() -> u32 {
    10
}
fn default_nav_click_settle_ms() -> u64 {
    2000
}
fn default_menu_open_ms() -> u64 {
    1000
}
fn default_frame_nav_settle_ms() -> u64 {
    3000
}
fn default_login_poll_interval_ms() -> u64 {
    1000
}
fn default_recovery_ms() -> u64 {
    2000
}
fn default_cell_click_settle_ms() -> u64 {
    1000
}
fn default_true() -> bool {
    true
}
fn default_webdriver_url() -> String {
    "http://localhost:9515".to_string()
}
fn default_portal_url() -> String {
    "https://portal.example.com/portal/menus/frameset.asp".to_string()
}
fn default_schedule_frame_url() -> String {
    "../modules/labourproductivity/homepage.asp".to_string()
}
fn default_log_level() -> String {
    "info".to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = RotaConfig::default();
        assert_eq!(config.timing.form_settle_ms, 1000);
        assert_eq!(config.timing.save_poll_attempts, 10);
        assert!(config.matching.first_name_only);
        assert_eq!(config.webdriver.url, "http://localhost:9515");
    }

    #[test]
    fn test_instant_timing_is_flat() {
        let timing = TimingConfig::instant();
        assert_eq!(timing.form_settle_ms, 0);
        assert_eq!(timing.recovery_ms, 0);
        assert!(timing.save_poll_attempts > 0);
    }

    #[test]
    fn test_partial_toml_fills_defaults() {
        let parsed: TimingConfig = toml_str("form_settle_ms = 5");
        assert_eq!(parsed.form_settle_ms, 5);
        assert_eq!(parsed.double_settle_ms, 2000);
    }

    fn toml_str(s: &str) -> TimingConfig {
        config::Config::builder()
            .add_source(config::File::from_str(s, config::FileFormat::Toml))
            .build()
            .unwrap()
            .try_deserialize()
            .unwrap()
    }
}

//! Error types for the Rotapilot core library.
//!
//! # Error Codes Reference
//!
//! | Code Range | Category | Description |
//! |------------|----------|-------------|
//! | E1001-E1099 | Driver | WebDriver transport and protocol errors |
//! | E2001-E2099 | Config | Config file, environment, and validation errors |
//! | E3001-E3099 | Resolution | Employee/cell/input/save-control lookup failures |
//! | E4001-E4099 | Navigation | Portal page-state and navigation errors |
//! | E5001-E5099 | Run | Run lifecycle errors (cancellation, bad input) |
//! | E9001-E9099 | General | Internal, IO, serialization errors |
//!
//! Resolution errors (E3xxx) are soft by design: the orchestrator records
//! them in the run outcome and keeps going. Only driver, config, and run
//! setup errors abort a run.

use thiserror::Error;

use crate::model::Weekday;

/// The main error type for the Rotapilot core library.
#[derive(Debug, Error)]
pub enum RotaError {
    // ========================================================================
    // Driver Errors (E1001-E1099)
    // ========================================================================
    /// Transport-level failure talking to the WebDriver endpoint
    #[error("[E1001] WebDriver request failed: {0}")]
    DriverRequest(String),

    /// The WebDriver endpoint answered with an error payload
    #[error("[E1002] WebDriver protocol error: {0}")]
    DriverProtocol(String),

    /// No WebDriver session has been established
    #[error("[E1003] WebDriver session not established")]
    NoSession,

    /// The located element no longer exists in the host document
    #[error("[E1004] Stale element reference: {0}")]
    StaleElement(String),

    // ========================================================================
    // Configuration Errors (E2001-E2099)
    // ========================================================================
    /// Configuration load or parse error
    #[error("[E2001] Configuration error: {0}")]
    Config(String),

    /// Invalid configuration value
    #[error("[E2002] Invalid configuration value for '{key}': {message}")]
    InvalidConfigValue { key: String, message: String },

    // ========================================================================
    // Resolution Errors (E3001-E3099)
    // ========================================================================
    /// No row in any accessible document context matched the employee name
    #[error("[E3001] Employee not found: {0}")]
    EmployeeNotFound(String),

    /// No cell strategy produced a usable day cell for this shift
    #[error("[E3002] Day cell not found for {employee} on {day}")]
    DayCellNotFound { employee: String, day: Weekday },

    /// A required shift form input could not be located
    #[error("[E3003] Form input not found: {0}")]
    InputNotFound(String),

    /// No save control was found after exhausting all strategies
    #[error("[E3004] Save control not found")]
    SaveControlNotFound,

    // ========================================================================
    // Navigation Errors (E4001-E4099)
    // ========================================================================
    /// Every navigation method was exhausted without reaching the grid
    #[error("[E4001] Could not navigate to the scheduling page: {0}")]
    NavigationFailed(String),

    // ========================================================================
    // Run Errors (E5001-E5099)
    // ========================================================================
    /// The caller requested cancellation before the run could start
    #[error("[E5001] Automation run cancelled")]
    Cancelled,

    /// The schedule input violated a model invariant
    #[error("[E5002] Invalid schedule data: {0}")]
    InvalidSchedule(String),

    // ========================================================================
    // General Errors (E9001-E9099)
    // ========================================================================
    /// Internal error (catch-all for unexpected conditions)
    #[error("[E9001] Internal error: {0}")]
    Internal(String),

    /// IO error
    #[error("[E9002] IO error: {0}")]
    Io(String),

    /// Serialization/deserialization error
    #[error("[E9003] Serialization error: {0}")]
    Serialization(String),
}

/// Result type alias for Rotapilot operations.
pub type RotaResult<T> = Result<T, RotaError>;

impl RotaError {
    /// Returns true if this error is a soft resolution failure: it is
    /// recorded against the shift or employee and the run continues.
    pub fn is_resolution_failure(&self) -> bool {
        matches!(
            self,
            RotaError::EmployeeNotFound(_)
                | RotaError::DayCellNotFound { .. }
                | RotaError::InputNotFound(_)
                | RotaError::SaveControlNotFound
        )
    }

    /// Returns true if this error is related to the WebDriver transport.
    pub fn is_driver_error(&self) -> bool {
        matches!(
            self,
            RotaError::DriverRequest(_)
                | RotaError::DriverProtocol(_)
                | RotaError::NoSession
                | RotaError::StaleElement(_)
        )
    }

    /// Returns true if this error aborts the run rather than being
    /// recorded as a per-item failure.
    pub fn is_fatal(&self) -> bool {
        matches!(
            self,
            RotaError::Config(_)
                | RotaError::InvalidConfigValue { .. }
                | RotaError::NoSession
                | RotaError::Cancelled
                | RotaError::InvalidSchedule(_)
                | RotaError::Internal(_)
        )
    }

    /// Returns an error code suitable for logging or external reporting.
    pub fn error_code(&self) -> &'static str {
        match self {
            RotaError::DriverRequest(_) => "E1001",
            RotaError::DriverProtocol(_) => "E1002",
            RotaError::NoSession => "E1003",
            RotaError::StaleElement(_) => "E1004",
            RotaError::Config(_) => "E2001",
            RotaError::InvalidConfigValue { .. } => "E2002",
            RotaError::EmployeeNotFound(_) => "E3001",
            RotaError::DayCellNotFound { .. } => "E3002",
            RotaError::InputNotFound(_) => "E3003",
            RotaError::SaveControlNotFound => "E3004",
            RotaError::NavigationFailed(_) => "E4001",
            RotaError::Cancelled => "E5001",
            RotaError::InvalidSchedule(_) => "E5002",
            RotaError::Internal(_) => "E9001",
            RotaError::Io(_) => "E9002",
            RotaError::Serialization(_) => "E9003",
        }
    }
}

// ============================================================================
// From trait implementations for seamless error propagation
// ============================================================================

impl From<reqwest::Error> for RotaError {
    fn from(err: reqwest::Error) -> Self {
        RotaError::DriverRequest(err.to_string())
    }
}

impl From<serde_json::Error> for RotaError {
    fn from(err: serde_json::Error) -> Self {
        RotaError::Serialization(err.to_string())
    }
}

impl From<std::io::Error> for RotaError {
    fn from(err: std::io::Error) -> Self {
        RotaError::Io(err.to_string())
    }
}

impl From<config::ConfigError> for RotaError {
    fn from(err: config::ConfigError) -> Self {
        match err {
            config::ConfigError::NotFound(key) => RotaError::InvalidConfigValue {
                key,
                message: "Key not found".to_string(),
            },
            other => RotaError::Config(other.to_string()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display_includes_code() {
        let err = RotaError::EmployeeNotFound("Rob".to_string());
        assert!(err.to_string().contains("E3001"));
        assert!(err.to_string().contains("Rob"));

        let err = RotaError::DayCellNotFound {
            employee: "Rob".to_string(),
            day: Weekday::Monday,
        };
        assert!(err.to_string().contains("E3002"));
        assert!(err.to_string().contains("Monday"));
    }

    #[test]
    fn test_resolution_failures_are_not_fatal() {
        let errors = [
            RotaError::EmployeeNotFound("x".to_string()),
            RotaError::DayCellNotFound {
                employee: "x".to_string(),
                day: Weekday::Friday,
            },
            RotaError::InputNotFound("start".to_string()),
            RotaError::SaveControlNotFound,
        ];
        for err in errors {
            assert!(err.is_resolution_failure(), "{err}");
            assert!(!err.is_fatal(), "{err}");
        }
    }

    #[test]
    fn test_fatal_categorization() {
        assert!(RotaError::Cancelled.is_fatal());
        assert!(RotaError::NoSession.is_fatal());
        assert!(RotaError::InvalidSchedule("bad".to_string()).is_fatal());
        // Navigation failure is advisory, the run proceeds best-effort.
        assert!(!RotaError::NavigationFailed("no link".to_string()).is_fatal());
        assert!(!RotaError::DriverRequest("timeout".to_string()).is_fatal());
    }

    #[test]
    fn test_error_codes() {
        assert_eq!(RotaError::NoSession.error_code(), "E1003");
        assert_eq!(RotaError::SaveControlNotFound.error_code(), "E3004");
        assert_eq!(RotaError::Cancelled.error_code(), "E5001");
    }

    #[test]
    fn test_from_io_error() {
        let io_err = std::io::Error::new(std::io::ErrorKind::NotFound, "missing");
        let err: RotaError = io_err.into();
        assert!(matches!(err, RotaError::Io(_)));
    }

    #[test]
    fn test_from_serde_json_error() {
        let json_err = serde_json::from_str::<serde_json::Value>("not json").unwrap_err();
        let err: RotaError = json_err.into();
        assert!(matches!(err, RotaError::Serialization(_)));
    }
}

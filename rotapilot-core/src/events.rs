//! Progress events emitted during an automation run.
//!
//! The sole observability channel: the orchestrator pushes one event
//! per status change onto an unbounded mpsc channel, in emission order.
//! Payloads are serde-tagged so the driving layer can forward them as
//! JSON unchanged.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tokio::sync::mpsc;
use uuid::Uuid;

use crate::model::{ShiftKind, Weekday};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProgressEvent {
    pub run_id: Uuid,
    pub timestamp: DateTime<Utc>,
    #[serde(flatten)]
    pub status: ProgressStatus,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "status", content = "data", rename_all = "snake_case")]
pub enum ProgressStatus {
    Starting {
        employees: usize,
        total_steps: u32,
    },
    LoginRequired,
    ProcessingEmployee {
        employee: String,
        index: usize,
        total: usize,
    },
    ProcessingShift {
        employee: String,
        day: Weekday,
        kind: ShiftKind,
    },
    /// One fill+save cycle finished (successfully or not; progress
    /// counts attempts, not confirmed saves).
    Progress {
        completed: u32,
        total: u32,
    },
    EmployeeNotFound {
        employee: String,
        index: usize,
        total: usize,
    },
    EmployeeError {
        employee: String,
        error: String,
    },
    ShiftError {
        employee: String,
        day: Weekday,
        error: String,
    },
    Complete {
        missing_employees: Vec<String>,
        failed_shifts: usize,
    },
    Error {
        error: String,
    },
}

/// Emitter half of the progress channel. Send failures are swallowed:
/// a departed listener must never disturb the run.
#[derive(Debug, Clone, Default)]
pub struct ProgressSink {
    sender: Option<mpsc::UnboundedSender<ProgressEvent>>,
}

impl ProgressSink {
    /// A sink nobody listens to.
    pub fn disconnected() -> Self {
        Self::default()
    }

    /// Create a connected sink and its receiving end.
    pub fn channel() -> (Self, mpsc::UnboundedReceiver<ProgressEvent>) {
        let (tx, rx) = mpsc::unbounded_channel();
        (Self { sender: Some(tx) }, rx)
    }

    pub fn emit(&self, run_id: Uuid, status: ProgressStatus) {
        if let Some(sender) = &self.sender {
            let _ = sender.send(ProgressEvent {
                run_id,
                timestamp: Utc::now(),
                status,
            });
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_event_serialization_shape() {
        let event = ProgressEvent {
            run_id: Uuid::nil(),
            timestamp: Utc::now(),
            status: ProgressStatus::ProcessingShift {
                employee: "Rob".to_string(),
                day: Weekday::Monday,
                kind: ShiftKind::Single,
            },
        };
        let json = serde_json::to_value(&event).unwrap();
        assert_eq!(json["status"], "processing_shift");
        assert_eq!(json["data"]["employee"], "Rob");
        assert_eq!(json["data"]["day"], "monday");
    }

    #[test]
    fn test_sink_preserves_order() {
        let (sink, mut rx) = ProgressSink::channel();
        let run_id = Uuid::new_v4();
        sink.emit(run_id, ProgressStatus::LoginRequired);
        sink.emit(
            run_id,
            ProgressStatus::Progress {
                completed: 1,
                total: 2,
            },
        );

        assert_eq!(rx.try_recv().unwrap().status, ProgressStatus::LoginRequired);
        assert!(matches!(
            rx.try_recv().unwrap().status,
            ProgressStatus::Progress { completed: 1, .. }
        ));
    }

    #[test]
    fn test_disconnected_sink_does_not_panic() {
        let sink = ProgressSink::disconnected();
        sink.emit(Uuid::new_v4(), ProgressStatus::LoginRequired);
    }

    #[test]
    fn test_dropped_receiver_is_tolerated() {
        let (sink, rx) = ProgressSink::channel();
        drop(rx);
        sink.emit(Uuid::new_v4(), ProgressStatus::LoginRequired);
    }
}

//! Core automation engine for entering shift schedules into a
//! web-based workforce-scheduling portal that has no API.
//!
//! The portal's markup is unstable and frame-nested, so everything
//! here is heuristic: names are matched fuzzily, elements are resolved
//! through ranked strategy ladders that degrade gracefully, and saves
//! are verified only as far as "no error banner appeared". Failures at
//! the employee or shift level are recorded and skipped; the run
//! carries on and reports what a human must finish by hand.
//!
//! Entry point is [`AutomationOrchestrator`], which sequences
//! navigation, row and cell resolution, form filling, and save
//! verification over any [`dom::DomBackend`]. A live WebDriver backend
//! and an in-memory mock ship in [`driver`].

pub mod clock;
pub mod config;
pub mod dom;
pub mod driver;
pub mod error;
pub mod events;
pub mod filler;
pub mod locator;
pub mod model;
pub mod names;
pub mod navigation;
pub mod orchestrator;
pub mod verify;
pub mod wait;

pub use clock::{from_clock_string, to_clock_string};
pub use config::{MatchingConfig, RotaConfig, TimingConfig, WebDriverConfig};
pub use dom::{ContextId, DomBackend, DomNode, Query, ResolvedElement, Selector};
pub use error::{RotaError, RotaResult};
pub use events::{ProgressEvent, ProgressSink, ProgressStatus};
pub use filler::{FillValues, FormFiller};
pub use locator::ElementLocator;
pub use model::{
    AutomationOutcome, EmployeeSchedule, FailureReason, RunStatus, ShiftFailure, ShiftKind,
    ShiftSlot, Weekday,
};
pub use names::NameResolver;
pub use navigation::NavigationController;
pub use orchestrator::AutomationOrchestrator;
pub use verify::SaveVerifier;
pub use wait::CancelHandle;

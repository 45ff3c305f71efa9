//! Shift form filling.

use std::sync::Arc;

use tracing::{debug, warn};

use crate::config::TimingConfig;
use crate::dom::{ContextId, DomBackend};
use crate::error::{RotaError, RotaResult};
use crate::locator::{ElementLocator, InputRole};
use crate::verify::SaveVerifier;
use crate::wait::sleep_ms;

/// Values for one fill+save cycle, already rendered for input fields.
#[derive(Debug, Clone, PartialEq)]
pub struct FillValues {
    pub start_clock: String,
    pub end_clock: String,
    /// `None` skips the break field entirely; `Some(0)` writes an
    /// explicit zero to overwrite any default the form carries.
    pub break_minutes: Option<u32>,
}

/// Fills the open shift form and activates its save control.
///
/// Each write goes through the backend's `set_value`, which dispatches
/// synthetic input and change events so the host page's own bindings
/// observe the edit.
pub struct FormFiller {
    dom: Arc<dyn DomBackend>,
    timing: TimingConfig,
    verifier: SaveVerifier,
}

impl FormFiller {
    pub fn new(dom: Arc<dyn DomBackend>, timing: TimingConfig) -> Self {
        let verifier = SaveVerifier::new(dom.clone(), timing.clone());
        Self {
            dom,
            timing,
            verifier,
        }
    }

    /// Fill the form open in `context` and save it. `Ok(true)` means
    /// the save looked clean, `Ok(false)` means it could not be
    /// confirmed; both count as an attempt made. Errors only when the
    /// form itself is unusable: no time inputs at all, or no save
    /// control (nothing is clicked in that case).
    pub async fn fill(
        &self,
        locator: &ElementLocator,
        context: ContextId,
        values: &FillValues,
    ) -> RotaResult<bool> {
        sleep_ms(self.timing.form_settle_ms).await;

        let start = locator.find_form_input(context, InputRole::Start).await;
        let end = locator.find_form_input(context, InputRole::End).await;
        if start.is_none() && end.is_none() {
            return Err(RotaError::InputNotFound("start/end time".to_string()));
        }

        if let Some(input) = &start {
            self.dom.set_value(&input.node, &values.start_clock).await?;
        } else {
            warn!("start input missing, writing end time only");
        }
        if let Some(input) = &end {
            self.dom.set_value(&input.node, &values.end_clock).await?;
        } else {
            warn!("end input missing, writing start time only");
        }

        if let Some(minutes) = values.break_minutes {
            match locator.find_form_input(context, InputRole::Break).await {
                Some(input) => {
                    self.dom
                        .set_value(&input.node, &minutes.to_string())
                        .await?;
                }
                // A missing break field is tolerated; many portal
                // skins only show it for longer shifts.
                None => debug!(minutes, "break input not found, skipping"),
            }
        }

        let save = locator
            .find_save_control(context)
            .await
            .ok_or(RotaError::SaveControlNotFound)?;
        self.dom.click(&save.node).await?;

        Ok(self.verifier.confirm(context).await)
    }
}

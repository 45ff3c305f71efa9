//! The per-employee, per-shift state machine.
//!
//! Strictly sequential: the portal's UI is modal, and opening a second
//! shift form before the first is saved corrupts its state. One
//! employee, one shift, one slot at a time, with the first slot's save
//! awaited before a double's second cell click.
//!
//! Failure policy follows the taxonomy in [`crate::error`]: resolution
//! misses and unconfirmed saves are recorded and skipped, navigation
//! failure is advisory, and only setup failures abort the run.

use std::sync::Arc;

use tracing::{error, info, warn};
use uuid::Uuid;

use crate::clock::to_clock_string;
use crate::config::RotaConfig;
use crate::dom::{DomBackend, ResolvedElement};
use crate::error::{RotaError, RotaResult};
use crate::events::{ProgressSink, ProgressStatus};
use crate::filler::{FillValues, FormFiller};
use crate::locator::ElementLocator;
use crate::model::{
    AutomationOutcome, EmployeeSchedule, FailureReason, RunStatus, ShiftKind, ShiftSlot,
};
use crate::names::NameResolver;
use crate::navigation::NavigationController;
use crate::wait::{sleep_ms, CancelHandle};

/// Drives one automation run end to end.
pub struct AutomationOrchestrator {
    dom: Arc<dyn DomBackend>,
    config: RotaConfig,
    locator: ElementLocator,
    filler: FormFiller,
    navigation: NavigationController,
    sink: ProgressSink,
    cancel: CancelHandle,
}

impl AutomationOrchestrator {
    pub fn new(dom: Arc<dyn DomBackend>, config: RotaConfig) -> Self {
        let resolver = NameResolver::new(config.matching.first_name_only);
        let locator = ElementLocator::new(dom.clone(), resolver);
        let filler = FormFiller::new(dom.clone(), config.timing.clone());
        let navigation = NavigationController::new(
            dom.clone(),
            config.timing.clone(),
            config.webdriver.clone(),
        );
        Self {
            dom,
            config,
            locator,
            filler,
            navigation,
            sink: ProgressSink::disconnected(),
            cancel: CancelHandle::new(),
        }
    }

    /// Attach a progress listener. Events are delivered in emission
    /// order for as long as the receiver lives.
    pub fn with_sink(mut self, sink: ProgressSink) -> Self {
        self.sink = sink;
        self
    }

    /// Handle the caller keeps to stop the run. Honored at the top of
    /// each employee and shift, and inside the login wait.
    pub fn cancel_handle(&self) -> CancelHandle {
        self.cancel.clone()
    }

    /// Run the full schedule. Resolves with a summary even when
    /// individual employees or shifts failed; errors only on setup or
    /// infrastructure failure before the per-employee loop.
    pub async fn run(&self, schedules: &[EmployeeSchedule]) -> RotaResult<AutomationOutcome> {
        let run_id = Uuid::new_v4();
        match self.run_inner(run_id, schedules).await {
            Ok(outcome) => Ok(outcome),
            Err(err) => {
                error!(%err, "run aborted");
                self.sink.emit(
                    run_id,
                    ProgressStatus::Error {
                        error: err.to_string(),
                    },
                );
                Err(err)
            }
        }
    }

    async fn run_inner(
        &self,
        run_id: Uuid,
        schedules: &[EmployeeSchedule],
    ) -> RotaResult<AutomationOutcome> {
        for schedule in schedules {
            schedule.validate()?;
        }
        let total_steps: u32 = schedules.iter().map(EmployeeSchedule::total_steps).sum();
        let mut outcome = AutomationOutcome::new(run_id, total_steps);

        info!(
            employees = schedules.len(),
            total_steps, "starting automation run"
        );
        self.sink.emit(
            run_id,
            ProgressStatus::Starting {
                employees: schedules.len(),
                total_steps,
            },
        );
        self.sink.emit(
            run_id,
            ProgressStatus::Progress {
                completed: 0,
                total: total_steps,
            },
        );

        if self.navigation.is_login_page().await {
            outcome.status = RunStatus::AwaitingLogin;
            self.sink.emit(run_id, ProgressStatus::LoginRequired);
            self.navigation.wait_for_login(&self.cancel).await?;
        }

        outcome.status = RunStatus::NavigatingToSchedule;
        self.ensure_scheduling_page().await;

        outcome.status = RunStatus::Running;
        self.process_employees(run_id, schedules, &mut outcome).await;

        outcome.status = RunStatus::Complete;
        outcome.finished_at = Some(chrono::Utc::now());
        info!(
            missing = outcome.missing_employees.len(),
            failed = outcome.failed_shifts.len(),
            cancelled = outcome.cancelled,
            "run complete"
        );
        self.sink.emit(
            run_id,
            ProgressStatus::Complete {
                missing_employees: outcome.missing_employees.clone(),
                failed_shifts: outcome.failed_shifts.len(),
            },
        );
        Ok(outcome)
    }

    /// Best-effort gate: try the ladder, re-check, try a broad click,
    /// and proceed regardless. Heuristic detection has false
    /// negatives, so an unconfirmed page is not worth aborting over.
    async fn ensure_scheduling_page(&self) {
        if self.navigation.is_scheduling_page().await {
            return;
        }
        if self.navigation.navigate_to_scheduling_page().await.is_ok() {
            return;
        }
        if self.navigation.is_scheduling_page().await {
            return;
        }
        self.navigation.broad_fallback_click().await;
        if !self.navigation.is_scheduling_page().await {
            warn!("could not confirm scheduling page, proceeding anyway");
        }
    }

    async fn process_employees(
        &self,
        run_id: Uuid,
        schedules: &[EmployeeSchedule],
        outcome: &mut AutomationOutcome,
    ) {
        let total = schedules.len();
        'employees: for (index, schedule) in schedules.iter().enumerate() {
            if self.cancel.is_cancelled() {
                info!("cancellation honored before employee {}", schedule.name);
                outcome.cancelled = true;
                break;
            }
            self.sink.emit(
                run_id,
                ProgressStatus::ProcessingEmployee {
                    employee: schedule.name.clone(),
                    index,
                    total,
                },
            );

            let Some(row) = self.locator.find_employee_row(&schedule.name).await else {
                warn!(employee = %schedule.name, "no row found, skipping employee");
                outcome.record_missing_employee(&schedule.name);
                self.sink.emit(
                    run_id,
                    ProgressStatus::EmployeeNotFound {
                        employee: schedule.name.clone(),
                        index,
                        total,
                    },
                );
                continue;
            };

            for shift in &schedule.shifts {
                if shift.kind == ShiftKind::None {
                    continue;
                }
                if self.cancel.is_cancelled() {
                    info!("cancellation honored before {} {}", schedule.name, shift.day);
                    outcome.cancelled = true;
                    break 'employees;
                }
                self.sink.emit(
                    run_id,
                    ProgressStatus::ProcessingShift {
                        employee: schedule.name.clone(),
                        day: shift.day,
                        kind: shift.kind,
                    },
                );

                if let Err(err) = self
                    .process_shift(run_id, &schedule.name, &row, shift, outcome)
                    .await
                {
                    outcome.record_failed_shift(&schedule.name, shift.day, (&err).into());
                    if err.is_fatal() {
                        // A fatal error would hit every remaining
                        // shift; skip to the next employee.
                        warn!(
                            employee = %schedule.name,
                            %err,
                            "employee abandoned after fatal error"
                        );
                        self.sink.emit(
                            run_id,
                            ProgressStatus::EmployeeError {
                                employee: schedule.name.clone(),
                                error: err.to_string(),
                            },
                        );
                        sleep_ms(self.config.timing.recovery_ms).await;
                        continue 'employees;
                    }
                    warn!(
                        employee = %schedule.name,
                        day = %shift.day,
                        %err,
                        "shift failed, continuing"
                    );
                    self.sink.emit(
                        run_id,
                        ProgressStatus::ShiftError {
                            employee: schedule.name.clone(),
                            day: shift.day,
                            error: err.to_string(),
                        },
                    );
                    sleep_ms(self.config.timing.recovery_ms).await;
                }
            }
        }
    }

    /// One shift: click its day cell and run the fill+save cycle once
    /// for a single, twice for a double. Progress advances per attempt
    /// made, not per confirmed save; unconfirmed saves are recorded as
    /// soft failures.
    async fn process_shift(
        &self,
        run_id: Uuid,
        employee: &str,
        row: &ResolvedElement,
        shift: &ShiftSlot,
        outcome: &mut AutomationOutcome,
    ) -> RotaResult<()> {
        let cell = self.open_day_cell(employee, row, shift).await?;
        let context = cell.node.context;

        let first = FillValues {
            start_clock: to_clock_string(shift.start1.unwrap_or_default()),
            end_clock: to_clock_string(shift.end1.unwrap_or_default()),
            break_minutes: (shift.break1_minutes > 0).then_some(shift.break1_minutes),
        };
        let confirmed = self.filler.fill(&self.locator, context, &first).await?;
        self.advance(run_id, outcome);
        if !confirmed {
            outcome.record_failed_shift(employee, shift.day, FailureReason::SaveUnconfirmed);
        }

        if shift.kind == ShiftKind::Double {
            // The host needs time to close the first sub-form before
            // the cell can take a second click.
            sleep_ms(self.config.timing.double_settle_ms).await;
            let cell = self.open_day_cell(employee, row, shift).await?;

            let second = FillValues {
                start_clock: to_clock_string(shift.start2.unwrap_or_default()),
                end_clock: to_clock_string(shift.end2.unwrap_or_default()),
                // The break sits in the gap between slots; the second
                // slot always gets an explicit zero.
                break_minutes: Some(0),
            };
            let confirmed = self
                .filler
                .fill(&self.locator, cell.node.context, &second)
                .await?;
            self.advance(run_id, outcome);
            if !confirmed {
                outcome.record_failed_shift(employee, shift.day, FailureReason::SaveUnconfirmed);
            }
        }
        Ok(())
    }

    /// Re-resolve and click the day cell. Resolution is never cached
    /// across the fill; the DOM may have re-rendered since.
    async fn open_day_cell(
        &self,
        employee: &str,
        row: &ResolvedElement,
        shift: &ShiftSlot,
    ) -> RotaResult<ResolvedElement> {
        let cell = self
            .locator
            .find_day_cell(row, shift.day)
            .await
            .ok_or_else(|| RotaError::DayCellNotFound {
                employee: employee.to_string(),
                day: shift.day,
            })?;
        self.dom.click(&cell.node).await?;
        sleep_ms(self.config.timing.cell_click_settle_ms).await;
        Ok(cell)
    }

    fn advance(&self, run_id: Uuid, outcome: &mut AutomationOutcome) {
        outcome.steps_completed += 1;
        self.sink.emit(
            run_id,
            ProgressStatus::Progress {
                completed: outcome.steps_completed,
                total: outcome.steps_total,
            },
        );
    }
}

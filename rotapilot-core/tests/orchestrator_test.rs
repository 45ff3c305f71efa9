//! End-to-end runs against mock documents.

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, OnceLock};

use async_trait::async_trait;
use rotapilot_core::driver::{el, MockDom, NodeSpec};
use rotapilot_core::{
    AutomationOrchestrator, CancelHandle, ContextId, DomBackend, DomNode, EmployeeSchedule,
    FailureReason, ProgressSink, ProgressStatus, Query, RotaConfig, RotaError, RotaResult,
    RunStatus, ShiftSlot, TimingConfig, Weekday,
};

fn test_config() -> RotaConfig {
    RotaConfig {
        timing: TimingConfig::instant(),
        ..RotaConfig::default()
    }
}

/// One schedule grid row: a name cell plus seven day cells.
fn employee_row(name: &str) -> NodeSpec {
    el("tr")
        .child(el("td").attr("class", "name-cell").text(name))
        .children((0..7).map(|_| el("td").attr("class", "day-cell")))
}

/// A scheduling page with the given rows and a working shift form.
fn schedule_page(rows: Vec<NodeSpec>) -> MockDom {
    MockDom::with_body([
        el("div").attr("class", "schedule-grid"),
        el("table").child(el("tbody").children(rows)),
        el("input").attr("name", "startTime"),
        el("input").attr("name", "endTime"),
        el("input").attr("name", "breakDuration"),
        el("button").attr("type", "submit").text("Save"),
    ])
}

fn single_monday(name: &str) -> EmployeeSchedule {
    EmployeeSchedule::new(name).with_shift(ShiftSlot::single(Weekday::Monday, 9.0, 17.0, 30))
}

fn written_values(dom: &MockDom) -> Vec<String> {
    dom.fills().into_iter().map(|(_, value)| value).collect()
}

#[tokio::test]
async fn test_single_shift_end_to_end() {
    let dom = Arc::new(schedule_page(vec![employee_row("Robert Smith")]));
    let orchestrator = AutomationOrchestrator::new(dom.clone(), test_config());

    let outcome = orchestrator.run(&[single_monday("Rob")]).await.unwrap();

    assert_eq!(outcome.status, RunStatus::Complete);
    assert!(outcome.is_clean());
    assert_eq!(outcome.steps_completed, 1);
    assert_eq!(outcome.steps_total, 1);
    assert_eq!(written_values(&dom), vec!["09:00", "17:00", "30"]);
    // One cell click plus one save click.
    let clicks = dom.clicks();
    assert_eq!(clicks.len(), 2);
    assert_eq!(dom.tag_of(&clicks[0]).as_deref(), Some("td"));
    assert_eq!(dom.tag_of(&clicks[1]).as_deref(), Some("button"));
}

#[tokio::test]
async fn test_double_shift_fills_twice_with_zero_second_break() {
    let dom = Arc::new(schedule_page(vec![employee_row("Robert Smith")]));
    let orchestrator = AutomationOrchestrator::new(dom.clone(), test_config());

    let schedule = EmployeeSchedule::new("Rob").with_shift(ShiftSlot::double(
        Weekday::Friday,
        9.0,
        13.0,
        45,
        18.0,
        22.5,
    ));
    let outcome = orchestrator.run(&[schedule]).await.unwrap();

    assert!(outcome.is_clean());
    assert_eq!(outcome.steps_completed, 2);
    assert_eq!(
        written_values(&dom),
        vec!["09:00", "13:00", "45", "18:00", "22:30", "0"]
    );
    // Two cell clicks and two save clicks.
    assert_eq!(dom.clicks().len(), 4);
}

#[tokio::test]
async fn test_zero_break_is_skipped_on_single_shift() {
    let dom = Arc::new(schedule_page(vec![employee_row("Robert Smith")]));
    let orchestrator = AutomationOrchestrator::new(dom.clone(), test_config());

    let schedule =
        EmployeeSchedule::new("Rob").with_shift(ShiftSlot::single(Weekday::Monday, 9.0, 17.0, 0));
    orchestrator.run(&[schedule]).await.unwrap();

    assert_eq!(written_values(&dom), vec!["09:00", "17:00"]);
}

#[tokio::test]
async fn test_missing_employee_is_recorded_and_run_continues() {
    let dom = Arc::new(schedule_page(vec![employee_row("Robert Smith")]));
    let orchestrator = AutomationOrchestrator::new(dom.clone(), test_config());

    let outcome = orchestrator
        .run(&[single_monday("Zzyzx Qwk"), single_monday("Rob")])
        .await
        .unwrap();

    assert_eq!(outcome.status, RunStatus::Complete);
    assert_eq!(outcome.missing_employees, vec!["Zzyzx Qwk"]);
    assert!(outcome.failed_shifts.is_empty());
    // Only the resolvable employee produced a fill.
    assert_eq!(outcome.steps_completed, 1);
    assert_eq!(written_values(&dom).len(), 3);
}

#[tokio::test]
async fn test_cell_not_found_fails_shift_but_not_employee() {
    // This row resolves by name but has no cells at all.
    let bare_row = el("div")
        .attr("class", "employee-row")
        .text("Jane Doe");
    let dom = Arc::new(schedule_page(vec![bare_row]));
    let orchestrator = AutomationOrchestrator::new(dom.clone(), test_config());

    let schedule = EmployeeSchedule::new("Jane")
        .with_shift(ShiftSlot::single(Weekday::Monday, 9.0, 17.0, 0))
        .with_shift(ShiftSlot::single(Weekday::Tuesday, 10.0, 18.0, 0));
    let outcome = orchestrator.run(&[schedule]).await.unwrap();

    assert_eq!(outcome.status, RunStatus::Complete);
    assert!(outcome.missing_employees.is_empty());
    // Both shifts were attempted; the Monday failure did not abort
    // the Tuesday attempt.
    assert_eq!(outcome.failed_shifts.len(), 2);
    assert!(outcome
        .failed_shifts
        .iter()
        .all(|f| f.reason == FailureReason::CellNotFound));
    assert_eq!(outcome.failed_shifts[0].day, Weekday::Monday);
    assert_eq!(outcome.failed_shifts[1].day, Weekday::Tuesday);
    assert!(written_values(&dom).is_empty());
}

#[tokio::test]
async fn test_unconfirmed_save_is_a_soft_failure() {
    let dom = Arc::new(MockDom::with_body([
        el("div").attr("class", "schedule-grid"),
        el("table").child(el("tbody").child(employee_row("Robert Smith"))),
        el("input").attr("name", "startTime"),
        el("input").attr("name", "endTime"),
        el("button").attr("type", "submit").text("Save"),
        el("div").attr("class", "error").text("Overlapping shift"),
    ]));
    let orchestrator = AutomationOrchestrator::new(dom.clone(), test_config());

    let outcome = orchestrator.run(&[single_monday("Rob")]).await.unwrap();

    // Progress still advanced; the miss is recorded, not fatal.
    assert_eq!(outcome.status, RunStatus::Complete);
    assert_eq!(outcome.steps_completed, 1);
    assert_eq!(outcome.failed_shifts.len(), 1);
    assert_eq!(
        outcome.failed_shifts[0].reason,
        FailureReason::SaveUnconfirmed
    );
}

#[tokio::test]
async fn test_progress_events_arrive_in_order() {
    let dom = Arc::new(schedule_page(vec![employee_row("Robert Smith")]));
    let (sink, mut events) = ProgressSink::channel();
    let orchestrator = AutomationOrchestrator::new(dom, test_config()).with_sink(sink);

    orchestrator.run(&[single_monday("Rob")]).await.unwrap();

    let mut statuses = Vec::new();
    while let Ok(event) = events.try_recv() {
        statuses.push(event.status);
    }

    assert!(matches!(
        statuses.first(),
        Some(ProgressStatus::Starting {
            employees: 1,
            total_steps: 1
        })
    ));
    assert!(statuses
        .iter()
        .any(|s| matches!(s, ProgressStatus::ProcessingEmployee { .. })));
    assert!(statuses.iter().any(|s| matches!(
        s,
        ProgressStatus::Progress {
            completed: 1,
            total: 1
        }
    )));
    assert!(matches!(
        statuses.last(),
        Some(ProgressStatus::Complete { .. })
    ));
}

/// Delegating backend that requests cancellation once a given number
/// of clicks has happened, so the stop lands at a deterministic point
/// mid-run.
struct CancelAfterClicks {
    inner: Arc<MockDom>,
    clicks: AtomicUsize,
    threshold: usize,
    cancel: OnceLock<CancelHandle>,
}

impl CancelAfterClicks {
    fn new(inner: Arc<MockDom>, threshold: usize) -> Self {
        Self {
            inner,
            clicks: AtomicUsize::new(0),
            threshold,
            cancel: OnceLock::new(),
        }
    }
}

#[async_trait]
impl DomBackend for CancelAfterClicks {
    async fn contexts(&self) -> RotaResult<Vec<ContextId>> {
        self.inner.contexts().await
    }
    async fn query(&self, context: ContextId, query: &Query) -> RotaResult<Vec<DomNode>> {
        self.inner.query(context, query).await
    }
    async fn query_within(&self, node: &DomNode, query: &Query) -> RotaResult<Vec<DomNode>> {
        self.inner.query_within(node, query).await
    }
    async fn children(&self, node: &DomNode) -> RotaResult<Vec<DomNode>> {
        self.inner.children(node).await
    }
    async fn text(&self, node: &DomNode) -> RotaResult<String> {
        self.inner.text(node).await
    }
    async fn tag_name(&self, node: &DomNode) -> RotaResult<String> {
        self.inner.tag_name(node).await
    }
    async fn attr(&self, node: &DomNode, name: &str) -> RotaResult<Option<String>> {
        self.inner.attr(node, name).await
    }
    async fn is_displayed(&self, node: &DomNode) -> RotaResult<bool> {
        self.inner.is_displayed(node).await
    }
    async fn click(&self, node: &DomNode) -> RotaResult<()> {
        self.inner.click(node).await?;
        let done = self.clicks.fetch_add(1, Ordering::SeqCst) + 1;
        if done == self.threshold {
            if let Some(cancel) = self.cancel.get() {
                cancel.request_cancel();
            }
        }
        Ok(())
    }
    async fn set_value(&self, node: &DomNode, value: &str) -> RotaResult<()> {
        self.inner.set_value(node, value).await
    }
    async fn set_frame_url(&self, context: ContextId, url: &str) -> RotaResult<()> {
        self.inner.set_frame_url(context, url).await
    }
}

#[tokio::test]
async fn test_cancellation_between_employees_keeps_partial_outcome() {
    let mock = Arc::new(schedule_page(vec![
        employee_row("Robert Smith"),
        employee_row("Samantha Jones"),
        employee_row("Patricia Lee"),
    ]));
    // Employee 1's shift takes two clicks (cell + save); cancel fires
    // right after the second.
    let backend = Arc::new(CancelAfterClicks::new(mock.clone(), 2));
    let orchestrator = AutomationOrchestrator::new(backend.clone(), test_config());
    backend
        .cancel
        .set(orchestrator.cancel_handle())
        .expect("cancel handle already set");

    let outcome = orchestrator
        .run(&[
            single_monday("Rob"),
            single_monday("Sam"),
            single_monday("Pat"),
        ])
        .await
        .unwrap();

    assert!(outcome.cancelled);
    assert_eq!(outcome.status, RunStatus::Complete);
    // Employee 1's work survived; employees 2 and 3 were never touched.
    assert_eq!(outcome.steps_completed, 1);
    assert_eq!(written_values(&mock), vec!["09:00", "17:00", "30"]);
    assert_eq!(mock.clicks().len(), 2);
}

/// Delegating backend whose writes fail as if the session had died.
struct LostSessionOnWrite {
    inner: Arc<MockDom>,
}

#[async_trait]
impl DomBackend for LostSessionOnWrite {
    async fn contexts(&self) -> RotaResult<Vec<ContextId>> {
        self.inner.contexts().await
    }
    async fn query(&self, context: ContextId, query: &Query) -> RotaResult<Vec<DomNode>> {
        self.inner.query(context, query).await
    }
    async fn query_within(&self, node: &DomNode, query: &Query) -> RotaResult<Vec<DomNode>> {
        self.inner.query_within(node, query).await
    }
    async fn children(&self, node: &DomNode) -> RotaResult<Vec<DomNode>> {
        self.inner.children(node).await
    }
    async fn text(&self, node: &DomNode) -> RotaResult<String> {
        self.inner.text(node).await
    }
    async fn tag_name(&self, node: &DomNode) -> RotaResult<String> {
        self.inner.tag_name(node).await
    }
    async fn attr(&self, node: &DomNode, name: &str) -> RotaResult<Option<String>> {
        self.inner.attr(node, name).await
    }
    async fn is_displayed(&self, node: &DomNode) -> RotaResult<bool> {
        self.inner.is_displayed(node).await
    }
    async fn click(&self, node: &DomNode) -> RotaResult<()> {
        self.inner.click(node).await
    }
    async fn set_value(&self, _node: &DomNode, _value: &str) -> RotaResult<()> {
        Err(RotaError::NoSession)
    }
    async fn set_frame_url(&self, context: ContextId, url: &str) -> RotaResult<()> {
        self.inner.set_frame_url(context, url).await
    }
}

#[tokio::test]
async fn test_fatal_shift_error_abandons_employee_and_continues_run() {
    let mock = Arc::new(schedule_page(vec![
        employee_row("Robert Smith"),
        employee_row("Samantha Jones"),
    ]));
    let backend = Arc::new(LostSessionOnWrite {
        inner: mock.clone(),
    });
    let (sink, mut events) = ProgressSink::channel();
    let orchestrator = AutomationOrchestrator::new(backend, test_config()).with_sink(sink);

    // Robert has two shifts; the fatal write failure on Monday must
    // skip his Tuesday shift, not retry into the same dead session.
    let robert = EmployeeSchedule::new("Rob")
        .with_shift(ShiftSlot::single(Weekday::Monday, 9.0, 17.0, 0))
        .with_shift(ShiftSlot::single(Weekday::Tuesday, 10.0, 18.0, 0));
    let outcome = orchestrator
        .run(&[robert, single_monday("Sam")])
        .await
        .unwrap();

    assert_eq!(outcome.status, RunStatus::Complete);
    assert!(!outcome.cancelled);
    // One recorded failure per employee, nothing for Tuesday.
    assert_eq!(outcome.failed_shifts.len(), 2);
    assert_eq!(outcome.failed_shifts[0].employee, "Rob");
    assert_eq!(outcome.failed_shifts[0].day, Weekday::Monday);
    assert_eq!(outcome.failed_shifts[1].employee, "Sam");
    assert_eq!(outcome.steps_completed, 0);

    let mut statuses = Vec::new();
    while let Ok(event) = events.try_recv() {
        statuses.push(event.status);
    }
    let employee_errors: Vec<_> = statuses
        .iter()
        .filter_map(|s| match s {
            ProgressStatus::EmployeeError { employee, .. } => Some(employee.as_str()),
            _ => None,
        })
        .collect();
    assert_eq!(employee_errors, vec!["Rob", "Sam"]);
    assert!(!statuses
        .iter()
        .any(|s| matches!(s, ProgressStatus::ShiftError { .. })));
}

#[tokio::test]
async fn test_empty_schedule_completes_immediately() {
    let dom = Arc::new(schedule_page(vec![]));
    let orchestrator = AutomationOrchestrator::new(dom, test_config());

    let outcome = orchestrator.run(&[]).await.unwrap();
    assert_eq!(outcome.status, RunStatus::Complete);
    assert_eq!(outcome.steps_total, 0);
    assert!(outcome.is_clean());
}

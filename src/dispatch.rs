// src/dispatch.rs

use chrono::{NaiveDate, NaiveTime};
use std::sync::Arc;
use thiserror::Error;
use tokio::task::JoinHandle;
use tracing::{debug, info, warn};

use crate::date_set::format_days;
use crate::hr_client::{
    BreakDefinition, BulkBreakPayload, BulkDeletePayload, BulkShiftPayload, HrApiError, ScheduleApi,
};

/// Backend type id for regular shift schedule rows.
pub const REGULAR_SCHEDULE_TYPE_ID: &str = "1";

/// The three named break windows a work day carries. Each maps to its own
/// schedule type id on the backend, so break deletes fan out per kind.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BreakKind {
    First,
    Second,
    Lunch,
}

impl BreakKind {
    pub const ALL: [BreakKind; 3] = [BreakKind::First, BreakKind::Second, BreakKind::Lunch];

    pub fn label(&self) -> &'static str {
        match self {
            BreakKind::First => "FIRST BREAK",
            BreakKind::Second => "SECOND BREAK",
            BreakKind::Lunch => "LUNCH BREAK",
        }
    }

    pub fn schedule_type_id(&self) -> &'static str {
        match self {
            BreakKind::First => "3",
            BreakKind::Second => "4",
            BreakKind::Lunch => "5",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ShiftWindow {
    pub shift_in: NaiveTime,
    pub shift_out: NaiveTime,
}

impl ShiftWindow {
    pub fn new(shift_in: NaiveTime, shift_out: NaiveTime) -> Self {
        Self {
            shift_in,
            shift_out,
        }
    }

    fn in_string(&self) -> String {
        self.shift_in.format("%H:%M").to_string()
    }

    fn out_string(&self) -> String {
        self.shift_out.format("%H:%M").to_string()
    }
}

/// Which schedule kinds a bulk delete covers. Overtime rows are typed, so
/// the caller supplies the overtime type ids it fetched beforehand.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DeleteScope {
    /// Regular and overtime schedules together.
    Both { overtime_type_ids: Vec<String> },
    Regular,
    Overtime { overtime_type_ids: Vec<String> },
    Breaks,
}

/// One submission from the scheduling form, already reduced to the payload
/// template the backend needs.
#[derive(Debug, Clone)]
pub enum ScheduleMutation {
    Regular {
        window: ShiftWindow,
        schedule_type_id: String,
    },
    Overtime {
        window: ShiftWindow,
        overtime_type_id: String,
    },
    Break {
        first: ShiftWindow,
        second: ShiftWindow,
        lunch: ShiftWindow,
    },
    Delete {
        scope: DeleteScope,
    },
}

// Pre-flight validation failures; none of these ever reach the network.
#[derive(Error, Debug, PartialEq, Eq)]
pub enum ValidationError {
    #[error("no schedule days resolved from the selection")]
    NoDays,

    #[error("no employees selected")]
    NoEmployees,

    #[error("no overtime type chosen")]
    MissingOvertimeType,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DispatchFailure {
    /// Which call of the fan-out failed (break kind, schedule type, ...).
    pub context: String,
    pub error: String,
}

/// Aggregate tally of one submission's fan-out. Every issued call lands in
/// exactly one bucket; failures keep their context for the partial-success
/// report.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DispatchSummary {
    pub successful: usize,
    pub failed: usize,
    pub failures: Vec<DispatchFailure>,
}

impl DispatchSummary {
    fn record(&mut self, context: &str, outcome: Result<(), String>) {
        match outcome {
            Ok(()) => self.successful += 1,
            Err(error) => {
                self.failed += 1;
                self.failures.push(DispatchFailure {
                    context: context.to_string(),
                    error,
                });
            }
        }
    }

    pub fn total(&self) -> usize {
        self.successful + self.failed
    }

    pub fn all_succeeded(&self) -> bool {
        self.failed == 0 && self.successful > 0
    }

    pub fn all_failed(&self) -> bool {
        self.successful == 0 && self.failed > 0
    }

    pub fn is_partial(&self) -> bool {
        self.successful > 0 && self.failed > 0
    }
}

/// Rejects a submission before any network call is made.
pub fn validate(
    days: &[NaiveDate],
    employee_ids: &[String],
    mutation: &ScheduleMutation,
) -> Result<(), ValidationError> {
    if days.is_empty() {
        return Err(ValidationError::NoDays);
    }
    if employee_ids.is_empty() {
        return Err(ValidationError::NoEmployees);
    }
    match mutation {
        ScheduleMutation::Overtime {
            overtime_type_id, ..
        } if overtime_type_id.is_empty() => Err(ValidationError::MissingOvertimeType),
        ScheduleMutation::Delete {
            scope: DeleteScope::Overtime { overtime_type_ids },
        }
        | ScheduleMutation::Delete {
            scope: DeleteScope::Both { overtime_type_ids },
        } if overtime_type_ids.is_empty() => Err(ValidationError::MissingOvertimeType),
        _ => Ok(()),
    }
}

type CallHandle = (String, JoinHandle<Result<(), HrApiError>>);

/// Dispatches one submission: validates, fans the required calls out as
/// concurrent tasks, then waits for every one of them to settle before
/// reporting the aggregate. A failing call never aborts its siblings, and
/// per-call errors surface only inside the returned summary.
pub async fn dispatch<A>(
    api: Arc<A>,
    admin_emp_id: &str,
    employee_ids: &[String],
    days: &[NaiveDate],
    mutation: &ScheduleMutation,
) -> Result<DispatchSummary, ValidationError>
where
    A: ScheduleApi + Send + Sync + 'static,
{
    validate(days, employee_ids, mutation)?;

    let day_strings = format_days(days);
    let employees = employee_ids.to_vec();
    let admin_emp_id = admin_emp_id.to_string();

    let handles: Vec<CallHandle> = match mutation {
        ScheduleMutation::Regular {
            window,
            schedule_type_id,
        } => {
            let payload = BulkShiftPayload {
                array_employee_emp_id: employees,
                admin_emp_id,
                shift_in: window.in_string(),
                shift_out: window.out_string(),
                array_selected_days: day_strings,
                schedule_type_id: schedule_type_id.clone(),
            };
            vec![spawn_shift_create(api.clone(), "regular shift", payload)]
        }
        ScheduleMutation::Overtime {
            window,
            overtime_type_id,
        } => {
            let payload = BulkShiftPayload {
                array_employee_emp_id: employees,
                admin_emp_id,
                shift_in: window.in_string(),
                shift_out: window.out_string(),
                array_selected_days: day_strings,
                schedule_type_id: overtime_type_id.clone(),
            };
            let context = format!("overtime shift (type {})", overtime_type_id);
            vec![spawn_shift_create(api.clone(), &context, payload)]
        }
        ScheduleMutation::Break {
            first,
            second,
            lunch,
        } => {
            let windows = [
                (BreakKind::First, first),
                (BreakKind::Second, second),
                (BreakKind::Lunch, lunch),
            ];
            windows
                .iter()
                .map(|(kind, window)| {
                    let payload = BulkBreakPayload {
                        array_employee_emp_id: employees.clone(),
                        admin_emp_id: admin_emp_id.clone(),
                        array_selected_days: day_strings.clone(),
                        array_break: vec![BreakDefinition {
                            name: kind.label().to_string(),
                            shift_in: window.in_string(),
                            shift_out: window.out_string(),
                            schedule_type: kind.schedule_type_id().to_string(),
                        }],
                    };
                    spawn_break_create(api.clone(), kind.label(), payload)
                })
                .collect()
        }
        ScheduleMutation::Delete { scope } => {
            let payload = BulkDeletePayload {
                array_employee_emp_id: employees,
                array_selected_days: day_strings,
            };
            delete_targets(scope)
                .into_iter()
                .map(|(context, type_id)| {
                    spawn_delete(api.clone(), &context, type_id, payload.clone())
                })
                .collect()
        }
    };

    info!(
        "Dispatching {} call(s) for {} day(s)",
        handles.len(),
        days.len()
    );

    let mut summary = DispatchSummary::default();
    for (context, handle) in handles {
        // Settle-all barrier: every call is awaited, whatever its siblings did.
        let outcome = match handle.await {
            Ok(result) => result.map_err(|e| e.to_string()),
            Err(join_err) => Err(format!("schedule call task did not complete: {}", join_err)),
        };
        summary.record(&context, outcome);
    }

    if summary.failed > 0 {
        warn!(
            "Dispatch finished with failures: {} ok, {} failed",
            summary.successful, summary.failed
        );
    } else {
        debug!("Dispatch finished: {} call(s) succeeded", summary.successful);
    }

    Ok(summary)
}

/// Deletes the schedule of one calendar cell: exactly one call, scoped to a
/// single employee and day no matter what else is selected in the form.
pub async fn delete_single<A>(
    api: &A,
    employee_id: &str,
    day: NaiveDate,
    schedule_type_id: &str,
) -> Result<(), HrApiError>
where
    A: ScheduleApi + ?Sized,
{
    let payload = BulkDeletePayload {
        array_employee_emp_id: vec![employee_id.to_string()],
        array_selected_days: vec![day.format("%Y-%m-%d").to_string()],
    };
    api.delete_schedules(schedule_type_id, &payload).await
}

/// Expands a delete scope into the (context, schedule type id) calls it
/// requires: one for regular rows, one per overtime type id, one per break
/// kind.
fn delete_targets(scope: &DeleteScope) -> Vec<(String, String)> {
    let mut targets = Vec::new();
    let regular = || {
        (
            "regular schedules".to_string(),
            REGULAR_SCHEDULE_TYPE_ID.to_string(),
        )
    };
    let overtime = |ids: &[String]| {
        ids.iter()
            .map(|id| (format!("overtime schedules (type {})", id), id.clone()))
            .collect::<Vec<_>>()
    };
    let breaks = || {
        BreakKind::ALL
            .iter()
            .map(|kind| {
                (
                    format!("{} schedules", kind.label().to_lowercase()),
                    kind.schedule_type_id().to_string(),
                )
            })
            .collect::<Vec<_>>()
    };

    match scope {
        DeleteScope::Both { overtime_type_ids } => {
            targets.push(regular());
            targets.extend(overtime(overtime_type_ids));
        }
        DeleteScope::Regular => targets.push(regular()),
        DeleteScope::Overtime { overtime_type_ids } => {
            targets.extend(overtime(overtime_type_ids));
        }
        DeleteScope::Breaks => targets.extend(breaks()),
    }
    targets
}

fn spawn_shift_create<A>(api: Arc<A>, context: &str, payload: BulkShiftPayload) -> CallHandle
where
    A: ScheduleApi + Send + Sync + 'static,
{
    let label = context.to_string();
    debug!("Issuing bulk shift create: {}", label);
    (
        label,
        tokio::spawn(async move { api.create_shift_schedules(&payload).await }),
    )
}

fn spawn_break_create<A>(api: Arc<A>, context: &str, payload: BulkBreakPayload) -> CallHandle
where
    A: ScheduleApi + Send + Sync + 'static,
{
    let label = context.to_string();
    debug!("Issuing bulk break create: {}", label);
    (
        label,
        tokio::spawn(async move { api.create_break_schedules(&payload).await }),
    )
}

fn spawn_delete<A>(
    api: Arc<A>,
    context: &str,
    schedule_type_id: String,
    payload: BulkDeletePayload,
) -> CallHandle
where
    A: ScheduleApi + Send + Sync + 'static,
{
    let label = context.to_string();
    debug!("Issuing bulk delete: {}", label);
    (
        label,
        tokio::spawn(async move { api.delete_schedules(&schedule_type_id, &payload).await }),
    )
}

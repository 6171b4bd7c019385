// src/main.rs
use anyhow::{bail, Context, Result};
use chrono::{Datelike, Local, NaiveDate, NaiveTime};
use clap::{Args, Parser, Subcommand, ValueEnum};
use std::{env, sync::Arc};
use thiserror::Error;
use tracing::{error, info, warn, Level};
use tracing_subscriber::FmtSubscriber;

mod date_set;
mod dispatch;
mod hr_client;

mod date_set_tests;
mod hr_client_tests;

use date_set::{build_date_set, DaySelection};
use dispatch::{
    delete_single, dispatch, DeleteScope, DispatchSummary, ScheduleMutation, ShiftWindow,
    REGULAR_SCHEDULE_TYPE_ID,
};
use hr_client::{HrApiClient, HrApiConfig, ScheduleApi, DEFAULT_REQUEST_TIMEOUT_SECS};

#[derive(Error, Debug)]
pub enum AppError {
    #[error("Missing environment variable: {0}")]
    MissingEnvVar(String),
}

#[derive(Parser, Debug)]
#[command(
    name = "shiftdesk",
    version,
    about = "Bulk schedule management against the HR/payroll backend"
)]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Args, Debug)]
struct SelectionArgs {
    /// Apply to the reference day itself (not narrowed by --weekend-only)
    #[arg(long)]
    current_day: bool,

    /// Apply to the whole Sunday-start week containing the reference day
    #[arg(long)]
    this_week: bool,

    /// Apply to the whole calendar month containing the reference day
    #[arg(long)]
    this_month: bool,

    /// Restrict week/month expansion to Saturdays and Sundays; alone it
    /// stands for the weekend of the reference week
    #[arg(long)]
    weekend_only: bool,

    /// Explicit day to include; repeatable
    #[arg(long = "day", value_name = "YYYY-MM-DD")]
    days: Vec<NaiveDate>,

    /// Reference date anchoring week/month expansion (defaults to today)
    #[arg(long, value_name = "YYYY-MM-DD")]
    reference: Option<NaiveDate>,
}

impl SelectionArgs {
    fn resolve_days(&self) -> Vec<NaiveDate> {
        let selection = DaySelection {
            current_day: self.current_day,
            this_week: self.this_week,
            this_month: self.this_month,
            weekend_only: self.weekend_only,
        };
        let reference = self.reference.unwrap_or_else(|| Local::now().date_naive());
        build_date_set(&selection, &self.days, reference)
    }
}

#[derive(Args, Debug)]
struct EmployeeArgs {
    /// Employee id to apply the mutation to; repeatable
    #[arg(long = "employee", value_name = "EMP_ID", required = true)]
    employees: Vec<String>,
}

#[derive(ValueEnum, Debug, Clone, Copy)]
enum DeleteScopeArg {
    /// Regular and overtime schedules
    Both,
    Regular,
    Overtime,
    Breaks,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Create regular shift schedules
    Regular {
        #[command(flatten)]
        selection: SelectionArgs,
        #[command(flatten)]
        employees: EmployeeArgs,
        #[arg(long, value_name = "HH:MM")]
        shift_in: NaiveTime,
        #[arg(long, value_name = "HH:MM")]
        shift_out: NaiveTime,
        #[arg(long, value_name = "TYPE_ID", default_value = REGULAR_SCHEDULE_TYPE_ID)]
        schedule_type: String,
    },
    /// Create overtime shift schedules
    Overtime {
        #[command(flatten)]
        selection: SelectionArgs,
        #[command(flatten)]
        employees: EmployeeArgs,
        #[arg(long, value_name = "HH:MM")]
        shift_in: NaiveTime,
        #[arg(long, value_name = "HH:MM")]
        shift_out: NaiveTime,
        /// Overtime type id (see `shiftdesk types`)
        #[arg(long, value_name = "TYPE_ID")]
        overtime_type: String,
    },
    /// Create the three break windows (first, second, lunch)
    Breaks {
        #[command(flatten)]
        selection: SelectionArgs,
        #[command(flatten)]
        employees: EmployeeArgs,
        #[arg(long, value_name = "HH:MM-HH:MM", value_parser = parse_window)]
        first: ShiftWindow,
        #[arg(long, value_name = "HH:MM-HH:MM", value_parser = parse_window)]
        second: ShiftWindow,
        #[arg(long, value_name = "HH:MM-HH:MM", value_parser = parse_window)]
        lunch: ShiftWindow,
    },
    /// Delete schedules in bulk for the selected days and employees
    Delete {
        #[command(flatten)]
        selection: SelectionArgs,
        #[command(flatten)]
        employees: EmployeeArgs,
        #[arg(long, value_enum)]
        scope: DeleteScopeArg,
    },
    /// Delete the schedule of a single calendar cell (one employee, one day)
    DeleteCell {
        #[arg(long, value_name = "EMP_ID")]
        employee: String,
        #[arg(long, value_name = "YYYY-MM-DD")]
        day: NaiveDate,
        #[arg(long, value_name = "TYPE_ID", default_value = REGULAR_SCHEDULE_TYPE_ID)]
        schedule_type: String,
    },
    /// List schedules for a date range (defaults to the current month)
    List {
        #[arg(long, value_name = "YYYY-MM-DD")]
        from: Option<NaiveDate>,
        #[arg(long, value_name = "YYYY-MM-DD")]
        to: Option<NaiveDate>,
    },
    /// List the schedule and overtime types the backend knows
    Types,
}

fn parse_window(s: &str) -> Result<ShiftWindow, String> {
    let (start, end) = s
        .split_once('-')
        .ok_or_else(|| format!("expected HH:MM-HH:MM, got '{}'", s))?;
    let shift_in: NaiveTime = start
        .trim()
        .parse()
        .map_err(|e| format!("invalid start time '{}': {}", start, e))?;
    let shift_out: NaiveTime = end
        .trim()
        .parse()
        .map_err(|e| format!("invalid end time '{}': {}", end, e))?;
    Ok(ShiftWindow::new(shift_in, shift_out))
}

#[tokio::main]
async fn main() -> Result<()> {
    dotenv::dotenv().ok();
    let subscriber = FmtSubscriber::builder()
        .with_max_level(Level::INFO)
        .finish();
    tracing::subscriber::set_global_default(subscriber)
        .context("Setting tracing subscriber failed")?;

    let cli = Cli::parse();
    let config = load_api_config()?;
    let client = Arc::new(HrApiClient::new(config)?);

    match cli.command {
        Command::Regular {
            selection,
            employees,
            shift_in,
            shift_out,
            schedule_type,
        } => {
            let mutation = ScheduleMutation::Regular {
                window: ShiftWindow::new(shift_in, shift_out),
                schedule_type_id: schedule_type,
            };
            run_submission(client, &selection, &employees.employees, &mutation).await
        }
        Command::Overtime {
            selection,
            employees,
            shift_in,
            shift_out,
            overtime_type,
        } => {
            let mutation = ScheduleMutation::Overtime {
                window: ShiftWindow::new(shift_in, shift_out),
                overtime_type_id: overtime_type,
            };
            run_submission(client, &selection, &employees.employees, &mutation).await
        }
        Command::Breaks {
            selection,
            employees,
            first,
            second,
            lunch,
        } => {
            let mutation = ScheduleMutation::Break {
                first,
                second,
                lunch,
            };
            run_submission(client, &selection, &employees.employees, &mutation).await
        }
        Command::Delete {
            selection,
            employees,
            scope,
        } => {
            let scope = resolve_delete_scope(client.as_ref(), scope).await?;
            let mutation = ScheduleMutation::Delete { scope };
            run_submission(client, &selection, &employees.employees, &mutation).await
        }
        Command::DeleteCell {
            employee,
            day,
            schedule_type,
        } => {
            delete_single(client.as_ref(), &employee, day, &schedule_type)
                .await
                .with_context(|| {
                    format!("Failed to delete schedule for {} on {}", employee, day)
                })?;
            info!("Deleted schedule for {} on {}", employee, day);
            Ok(())
        }
        Command::List { from, to } => list_schedules(client.as_ref(), from, to).await,
        Command::Types => list_types(client.as_ref()).await,
    }
}

/// Resolves the day selection, dispatches the mutation, reports the
/// aggregate outcome, and re-fetches the authoritative schedule list when
/// anything was applied.
async fn run_submission(
    client: Arc<HrApiClient>,
    selection: &SelectionArgs,
    employees: &[String],
    mutation: &ScheduleMutation,
) -> Result<()> {
    let days = selection.resolve_days();
    let admin_emp_id = client.admin_emp_id().to_string();

    let summary = match dispatch(client.clone(), &admin_emp_id, employees, &days, mutation).await {
        Ok(summary) => summary,
        Err(validation) => bail!("Submission rejected: {}", validation),
    };

    report_summary(&summary);

    if summary.successful > 0 {
        refresh_schedules(client.as_ref(), &admin_emp_id, &days).await;
    }

    if summary.all_failed() {
        bail!("No schedule changes were applied");
    }
    Ok(())
}

fn report_summary(summary: &DispatchSummary) {
    if summary.all_succeeded() {
        info!(
            "All {} schedule call(s) applied successfully",
            summary.successful
        );
    } else if summary.all_failed() {
        error!("All {} schedule call(s) failed", summary.failed);
        for failure in &summary.failures {
            error!("  {}: {}", failure.context, failure.error);
        }
    } else {
        warn!(
            "Partially applied: {} succeeded, {} failed",
            summary.successful, summary.failed
        );
        for failure in &summary.failures {
            warn!("  {}: {}", failure.context, failure.error);
        }
    }
}

/// Best-effort re-fetch after an applied mutation; a listing failure only
/// warns, the mutation outcome stands.
async fn refresh_schedules(client: &HrApiClient, admin_emp_id: &str, days: &[NaiveDate]) {
    let (Some(from), Some(to)) = (days.first(), days.last()) else {
        return;
    };
    match client.fetch_schedules(admin_emp_id, *from, *to).await {
        Ok(rows) => info!(
            "Schedule list refreshed: {} row(s) between {} and {}",
            rows.len(),
            from,
            to
        ),
        Err(e) => warn!("Failed to refresh schedule list: {}", e),
    }
}

async fn resolve_delete_scope(client: &HrApiClient, scope: DeleteScopeArg) -> Result<DeleteScope> {
    let fetch_overtime_ids = || async {
        let types = client
            .fetch_overtime_types()
            .await
            .context("Failed to fetch overtime types for delete scope")?;
        Ok::<Vec<String>, anyhow::Error>(types.into_iter().map(|t| t.id).collect())
    };

    Ok(match scope {
        DeleteScopeArg::Both => DeleteScope::Both {
            overtime_type_ids: fetch_overtime_ids().await?,
        },
        DeleteScopeArg::Regular => DeleteScope::Regular,
        DeleteScopeArg::Overtime => DeleteScope::Overtime {
            overtime_type_ids: fetch_overtime_ids().await?,
        },
        DeleteScopeArg::Breaks => DeleteScope::Breaks,
    })
}

async fn list_schedules(
    client: &HrApiClient,
    from: Option<NaiveDate>,
    to: Option<NaiveDate>,
) -> Result<()> {
    let today = Local::now().date_naive();
    let from = from.unwrap_or_else(|| today.with_day(1).expect("day 1 exists in every month"));
    let to = to.unwrap_or_else(|| last_day_of_month(today));

    let rows = client
        .fetch_schedules(client.admin_emp_id(), from, to)
        .await
        .context("Failed to fetch schedules")?;

    info!("{} schedule row(s) between {} and {}", rows.len(), from, to);
    for row in rows {
        println!(
            "{}  {}  {} - {}  (type {})",
            row.date,
            row.emp_id,
            row.shift_in.as_deref().unwrap_or("--:--"),
            row.shift_out.as_deref().unwrap_or("--:--"),
            row.schedule_type_id.as_deref().unwrap_or("?")
        );
    }
    Ok(())
}

async fn list_types(client: &HrApiClient) -> Result<()> {
    let schedule_types = client
        .fetch_schedule_types()
        .await
        .context("Failed to fetch schedule types")?;
    let overtime_types = client
        .fetch_overtime_types()
        .await
        .context("Failed to fetch overtime types")?;

    println!("Schedule types:");
    for t in schedule_types {
        println!("  {}  {}", t.id, t.name);
    }
    println!("Overtime types:");
    for t in overtime_types {
        println!("  {}  {}", t.id, t.name);
    }
    Ok(())
}

fn last_day_of_month(date: NaiveDate) -> NaiveDate {
    let (year, month) = if date.month() == 12 {
        (date.year() + 1, 1)
    } else {
        (date.year(), date.month() + 1)
    };
    NaiveDate::from_ymd_opt(year, month, 1).expect("valid first of month")
        - chrono::Duration::days(1)
}

fn load_api_config() -> Result<HrApiConfig, AppError> {
    Ok(HrApiConfig {
        base_url: env::var("HR_API_BASE_URL")
            .map_err(|_| AppError::MissingEnvVar("HR_API_BASE_URL".to_string()))?,
        auth_token: env::var("HR_API_TOKEN")
            .map_err(|_| AppError::MissingEnvVar("HR_API_TOKEN".to_string()))?,
        admin_emp_id: env::var("HR_ADMIN_EMP_ID")
            .map_err(|_| AppError::MissingEnvVar("HR_ADMIN_EMP_ID".to_string()))?,
        request_timeout_secs: env::var("HR_API_TIMEOUT_SECS")
            .ok()
            .and_then(|s| s.parse().ok())
            .unwrap_or(DEFAULT_REQUEST_TIMEOUT_SECS),
    })
}

// src/date_set.rs

use chrono::{Datelike, Duration, NaiveDate, Weekday};
use std::collections::BTreeSet;

/// Coarse day-selection toggles from the scheduling form. `weekend_only`
/// narrows the week/month expansions to Saturday/Sunday; it does NOT filter
/// `current_day` or explicitly picked dates.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct DaySelection {
    pub current_day: bool,
    pub this_week: bool,
    pub this_month: bool,
    pub weekend_only: bool,
}

impl DaySelection {
    /// True when `weekend_only` is the sole active toggle, which stands for
    /// "the weekend of the current week" on its own.
    fn weekend_only_alone(&self) -> bool {
        self.weekend_only && !self.current_day && !self.this_week && !self.this_month
    }
}

/// Sunday and Saturday bounding the Sunday-start week that contains `date`.
pub fn week_bounds(date: NaiveDate) -> (NaiveDate, NaiveDate) {
    let sunday = date - Duration::days(date.weekday().num_days_from_sunday() as i64);
    (sunday, sunday + Duration::days(6))
}

pub fn is_weekend(date: NaiveDate) -> bool {
    matches!(date.weekday(), Weekday::Sat | Weekday::Sun)
}

/// All days of the calendar month containing `date`, in order.
fn month_days(date: NaiveDate) -> Vec<NaiveDate> {
    let first = date.with_day(1).expect("day 1 exists in every month");
    let mut days = Vec::with_capacity(31);
    let mut current = first;
    while current.month() == date.month() {
        days.push(current);
        current = match current.succ_opt() {
            Some(next) => next,
            None => break,
        };
    }
    days
}

/// Expands the form's day selection into the concrete set of days a mutation
/// applies to: explicitly picked dates plus whatever the toggles resolve to,
/// anchored at `reference`. The result is deduplicated and ascending.
///
/// An empty selection yields an empty vec; callers must refuse to dispatch
/// on it (see `dispatch::validate`).
pub fn build_date_set(
    selection: &DaySelection,
    explicit_dates: &[NaiveDate],
    reference: NaiveDate,
) -> Vec<NaiveDate> {
    let mut days: BTreeSet<NaiveDate> = explicit_dates.iter().copied().collect();

    let (sunday, saturday) = week_bounds(reference);

    if selection.weekend_only_alone() {
        days.insert(sunday);
        days.insert(saturday);
    } else {
        // The current-day toggle is exempt from the weekend filter.
        if selection.current_day {
            days.insert(reference);
        }
        if selection.this_week {
            if selection.weekend_only {
                days.insert(sunday);
                days.insert(saturday);
            } else {
                for offset in 0..7 {
                    days.insert(sunday + Duration::days(offset));
                }
            }
        }
        if selection.this_month {
            for day in month_days(reference) {
                if !selection.weekend_only || is_weekend(day) {
                    days.insert(day);
                }
            }
        }
    }

    days.into_iter().collect()
}

/// Formats a day set the way the backend expects it in `array_selected_days`.
pub fn format_days(days: &[NaiveDate]) -> Vec<String> {
    days.iter()
        .map(|d| d.format("%Y-%m-%d").to_string())
        .collect()
}

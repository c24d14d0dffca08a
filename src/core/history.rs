//! Aggregations over a user's ledger: averages, best-ever, monthly goal
//! progress and the attendance calendar.
use crate::core::error::TrackerError;
use crate::core::record::{DATE_FORMAT, EarningsRecord, YearMonth};
use chrono::{Datelike, NaiveDate, NaiveDateTime};
use std::collections::BTreeMap;

pub const RECENT_AVERAGE_WINDOW: usize = 10;
pub const TREND_WINDOW: usize = 30;

/// True when `candidate_net` ties or beats every prior record. An empty
/// history counts as a best of 0.
pub fn is_new_best(prior: &[EarningsRecord], candidate_net: i64) -> bool {
    candidate_net >= all_time_max(prior)
}

/// Highest `net_local` in the ledger, or 0 when it is empty.
pub fn all_time_max(ledger: &[EarningsRecord]) -> i64 {
    ledger.iter().map(|r| r.net_local).max().unwrap_or(0)
}

/// Records ordered by timestamp descending. Equal timestamps keep insertion
/// order.
pub fn sorted_newest_first(ledger: &[EarningsRecord]) -> Vec<&EarningsRecord> {
    let mut sorted: Vec<&EarningsRecord> = ledger.iter().collect();
    sorted.sort_by(|a, b| b.timestamp.cmp(&a.timestamp));
    sorted
}

/// Mean net pay of the `n` most recent records, ignoring days with no
/// positive pay, rounded up.
pub fn recent_average(ledger: &[EarningsRecord], n: usize) -> i64 {
    let positives: Vec<i64> = sorted_newest_first(ledger)
        .into_iter()
        .take(n)
        .map(|r| r.net_local)
        .filter(|net| *net > 0)
        .collect();

    if positives.is_empty() {
        return 0;
    }
    let sum = positives.iter().fold(0i64, |acc, net| acc.saturating_add(*net));
    (sum as f64 / positives.len() as f64).ceil() as i64
}

/// Net total for `month`, saturating at the `i64` bounds.
pub fn monthly_total(ledger: &[EarningsRecord], month: YearMonth) -> i64 {
    ledger
        .iter()
        .filter(|r| month.contains(&r.timestamp))
        .fold(0i64, |acc, r| acc.saturating_add(r.net_local))
}

/// Net totals for every month that has at least one record.
pub fn monthly_totals(ledger: &[EarningsRecord]) -> BTreeMap<YearMonth, i64> {
    let mut totals = BTreeMap::new();
    for record in ledger {
        let total = totals.entry(record.year_month()).or_insert(0i64);
        *total = total.saturating_add(record.net_local);
    }
    totals
}

/// Percentage of `goal` reached. Not clamped; may exceed 100.
pub fn goal_progress(monthly_total: i64, goal: i64) -> f64 {
    if goal > 0 {
        monthly_total as f64 / goal as f64 * 100.0
    } else {
        0.0
    }
}

pub fn progress_display(progress: f64) -> i64 {
    progress.floor() as i64
}

/// Fill level for a progress bar, in `[0, 100]`.
pub fn progress_bar_fill(progress: f64) -> u8 {
    progress_display(progress).clamp(0, 100) as u8
}

pub fn goal_reached(progress: f64) -> bool {
    progress >= 100.0
}

/// The most recent records in chronological order, for trend display.
#[derive(Debug, Clone, PartialEq)]
pub struct Trend {
    pub points: Vec<(NaiveDateTime, i64)>,
    pub average: f64,
}

pub fn recent_trend(ledger: &[EarningsRecord], n: usize) -> Trend {
    let mut oldest_first: Vec<&EarningsRecord> = ledger.iter().collect();
    oldest_first.sort_by_key(|r| r.timestamp);
    let skip = oldest_first.len().saturating_sub(n);
    let points: Vec<(NaiveDateTime, i64)> = oldest_first
        .into_iter()
        .skip(skip)
        .map(|r| (r.timestamp, r.net_local))
        .collect();

    let average = if points.is_empty() {
        0.0
    } else {
        points.iter().map(|(_, net)| *net as f64).sum::<f64>() / points.len() as f64
    };
    Trend { points, average }
}

/// One calendar month with a mark for each day that has a saved record.
#[derive(Debug, Clone, PartialEq)]
pub struct MonthAttendance {
    pub month: YearMonth,
    /// Weekday of the 1st, Monday = 0.
    pub first_weekday: u32,
    pub days_in_month: u32,
    /// Keyed by `YYYY-MM-DD`.
    pub days: BTreeMap<String, bool>,
}

impl MonthAttendance {
    pub fn is_attended(&self, day: u32) -> bool {
        let key = format!("{}-{:02}", self.month, day);
        self.days.get(&key).copied().unwrap_or(false)
    }

    pub fn attended_count(&self) -> usize {
        self.days.values().filter(|v| **v).count()
    }

    /// Lays the month out as Monday-first weeks. Cells outside the month
    /// are `None`.
    pub fn weeks(&self) -> Vec<[Option<u32>; 7]> {
        let mut weeks = Vec::new();
        let mut week = [None; 7];
        let mut column = self.first_weekday as usize;

        for day in 1..=self.days_in_month {
            week[column] = Some(day);
            column += 1;
            if column == 7 {
                weeks.push(week);
                week = [None; 7];
                column = 0;
            }
        }
        if column > 0 {
            weeks.push(week);
        }
        weeks
    }
}

pub fn days_in_month(year: i32, month: u32) -> Result<u32, TrackerError> {
    let first = NaiveDate::from_ymd_opt(year, month, 1)
        .ok_or(TrackerError::InvalidMonth { year, month })?;
    let next_first = if month == 12 {
        NaiveDate::from_ymd_opt(year + 1, 1, 1)
    } else {
        NaiveDate::from_ymd_opt(year, month + 1, 1)
    }
    .ok_or(TrackerError::InvalidMonth { year, month })?;
    Ok(next_first.signed_duration_since(first).num_days() as u32)
}

pub fn calendar_attendance(
    ledger: &[EarningsRecord],
    year: i32,
    month: u32,
) -> Result<MonthAttendance, TrackerError> {
    let first = NaiveDate::from_ymd_opt(year, month, 1)
        .ok_or(TrackerError::InvalidMonth { year, month })?;
    let day_count = days_in_month(year, month)?;

    let mut days: BTreeMap<String, bool> = first
        .iter_days()
        .take(day_count as usize)
        .map(|d| (d.format(DATE_FORMAT).to_string(), false))
        .collect();

    for record in ledger {
        let key = record.date().format(DATE_FORMAT).to_string();
        if let Some(mark) = days.get_mut(&key) {
            *mark = true;
        }
    }

    Ok(MonthAttendance {
        month: YearMonth { year, month },
        first_weekday: first.weekday().num_days_from_monday(),
        days_in_month: day_count,
        days,
    })
}

/// Statistics shown after a save.
#[derive(Debug, Clone, PartialEq)]
pub struct HistorySummary {
    pub recent_average: i64,
    pub all_time_max: i64,
    pub month: YearMonth,
    pub monthly_total: i64,
    pub goal: i64,
    pub progress: f64,
}

pub fn summarize(ledger: &[EarningsRecord], goal: i64, month: YearMonth) -> HistorySummary {
    let total = monthly_total(ledger, month);
    HistorySummary {
        recent_average: recent_average(ledger, RECENT_AVERAGE_WINDOW),
        all_time_max: all_time_max(ledger),
        month,
        monthly_total: total,
        goal,
        progress: goal_progress(total, goal),
    }
}

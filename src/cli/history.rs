use super::ui;
use crate::core::history::{
    HistorySummary, MonthAttendance, RECENT_AVERAGE_WINDOW, Trend, goal_reached,
    progress_bar_fill, progress_display,
};
use crate::core::record::{DATE_FORMAT, EarningsRecord, TIMESTAMP_FORMAT, YearMonth};
use crate::core::{HistoryReport, Session};
use crate::store::LedgerStore;
use anyhow::Result;
use comfy_table::{Cell, CellAlignment};
use std::collections::BTreeMap;
use tracing::debug;

const WEEKDAYS: [&str; 7] = ["Mon", "Tue", "Wed", "Thu", "Fri", "Sat", "Sun"];
const ATTENDANCE_MARK: &str = "🎙";
const BAR_WIDTH: usize = 30;

const ENCOURAGEMENTS: [&str; 5] = [
    "Keep it up, the goal is within reach!",
    "The numbers show your effort.",
    "Today's stream is tomorrow's foundation.",
    "Showing up this consistently is already impressive.",
    "Small steps add up to big changes.",
];

/// Picks a message for a month where the goal is still open. Stable for a
/// given day.
pub fn encouragement(day_of_month: u32) -> &'static str {
    ENCOURAGEMENTS[day_of_month as usize % ENCOURAGEMENTS.len()]
}

pub fn display_history_table(history: &[EarningsRecord], currency: &str) -> String {
    let mut table = ui::new_styled_table();
    table.set_header(vec![
        ui::header_cell("Date"),
        ui::header_cell("Revenue"),
        ui::header_cell("Rate"),
        ui::header_cell(&format!("Gross ({currency})")),
        ui::header_cell(&format!("Tax ({currency})")),
        ui::header_cell(&format!("Net ({currency})")),
    ]);

    for record in history {
        table.add_row(vec![
            Cell::new(record.timestamp.format(TIMESTAMP_FORMAT)),
            Cell::new(format!("{:.2}", record.foreign_amount)).set_alignment(CellAlignment::Right),
            Cell::new(format!("{:.2}", record.rate)).set_alignment(CellAlignment::Right),
            ui::amount_cell(record.gross_local),
            ui::amount_cell(record.tax_withheld),
            ui::total_cell(record.net_local),
        ]);
    }

    table.to_string()
}

pub fn display_summary(summary: &HistorySummary, currency: &str, day_of_month: u32) -> String {
    let mut output = format!(
        "Average of last {} saves: {}\n",
        RECENT_AVERAGE_WINDOW,
        ui::style_text(
            &ui::format_money(summary.recent_average, currency),
            ui::StyleType::TotalValue
        )
    );
    output.push_str(&format!(
        "Best day ever: {}\n\n",
        ui::style_text(
            &ui::format_money(summary.all_time_max, currency),
            ui::StyleType::TotalValue
        )
    ));
    output.push_str(&format!(
        "Goal for {}: {}\n",
        summary.month,
        ui::style_text(
            &ui::format_money(summary.goal, currency),
            ui::StyleType::TotalLabel
        )
    ));
    output.push_str(&format!(
        "Earned so far: {} ({}%)\n",
        ui::format_money(summary.monthly_total, currency),
        progress_display(summary.progress)
    ));
    output.push_str(&ui::progress_line(progress_bar_fill(summary.progress), BAR_WIDTH));
    output.push('\n');

    if goal_reached(summary.progress) {
        output.push_str(&ui::style_text(
            "Goal reached, congratulations!",
            ui::StyleType::Celebrate,
        ));
    } else {
        output.push_str(encouragement(day_of_month));
    }
    output
}

pub fn display_trend(trend: &Trend, currency: &str) -> String {
    if trend.points.is_empty() {
        return ui::style_text("No saved days yet.", ui::StyleType::Subtle);
    }
    let max = trend.points.iter().map(|(_, net)| *net).max().unwrap_or(0);

    let mut table = ui::new_styled_table();
    table.set_header(vec![
        ui::header_cell("Date"),
        ui::header_cell(&format!("Net ({currency})")),
        ui::header_cell(""),
    ]);
    for (timestamp, net) in &trend.points {
        table.add_row(vec![
            Cell::new(timestamp.format(DATE_FORMAT)),
            ui::amount_cell(*net),
            Cell::new(ui::bar(*net, max, BAR_WIDTH)),
        ]);
    }

    format!(
        "{}\nAverage: {}",
        table,
        ui::format_money(trend.average.round() as i64, currency)
    )
}

pub fn display_monthly_totals(totals: &BTreeMap<YearMonth, i64>, currency: &str) -> String {
    let max = totals.values().copied().max().unwrap_or(0);

    let mut table = ui::new_styled_table();
    table.set_header(vec![
        ui::header_cell("Month"),
        ui::header_cell(&format!("Net ({currency})")),
        ui::header_cell(""),
    ]);
    for (month, total) in totals {
        table.add_row(vec![
            Cell::new(month.to_string()),
            ui::total_cell(*total),
            Cell::new(ui::bar(*total, max, BAR_WIDTH)),
        ]);
    }
    table.to_string()
}

pub fn display_calendar(attendance: &MonthAttendance) -> String {
    let mut table = ui::new_styled_table();
    table.set_header(WEEKDAYS.iter().map(|d| ui::header_cell(d)).collect::<Vec<_>>());

    for week in attendance.weeks() {
        table.add_row(week.iter().map(|cell| match cell {
            Some(day) if attendance.is_attended(*day) => {
                Cell::new(format!("{day}{ATTENDANCE_MARK}")).set_alignment(CellAlignment::Center)
            }
            Some(day) => Cell::new(day).set_alignment(CellAlignment::Center),
            None => Cell::new(""),
        }));
    }

    format!(
        "{}\n{} day(s) streamed",
        table,
        attendance.attended_count()
    )
}

pub fn print_report(report: &HistoryReport, currency: &str, day_of_month: u32) {
    println!(
        "{}\n",
        ui::style_text("Earnings history", ui::StyleType::Title)
    );
    println!("{}", display_history_table(&report.history, currency));
    ui::print_separator();
    println!("{}", display_summary(&report.summary, currency, day_of_month));
    ui::print_separator();
    println!(
        "{}\n",
        ui::style_text("Recent trend", ui::StyleType::Title)
    );
    println!("{}", display_trend(&report.trend, currency));
    ui::print_separator();
    println!(
        "{}\n",
        ui::style_text("Monthly totals", ui::StyleType::Title)
    );
    println!("{}", display_monthly_totals(&report.monthly_totals, currency));
    ui::print_separator();
    println!(
        "{}\n",
        ui::style_text(
            &format!("Activity for {}", report.attendance.month),
            ui::StyleType::Title
        )
    );
    println!("{}", display_calendar(&report.attendance));
}

/// Shows the history view without fetching a rate or saving.
pub fn run(
    session: &Session,
    store: &dyn LedgerStore,
    currency: &str,
    month: YearMonth,
    day_of_month: u32,
) -> Result<()> {
    let ledger = session.load_ledger(store)?;
    debug!(records = ledger.len(), "Loaded ledger for history view");
    let report = session.report(&ledger, month)?;
    print_report(&report, currency, day_of_month);
    Ok(())
}

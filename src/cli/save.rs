use super::{calc, history, ui};
use crate::core::config::CurrencyPair;
use crate::core::{EarningsCalculator, ExchangeRateProvider, Session, YearMonth};
use crate::store::LedgerStore;
use anyhow::Result;
use chrono::{Datelike, NaiveDateTime};

/// Computes today's earnings, appends them to the ledger and shows the
/// updated history.
pub async fn run(
    session: &Session,
    provider: &(dyn ExchangeRateProvider + Send + Sync),
    store: &dyn LedgerStore,
    currency: &CurrencyPair,
    calculator: &EarningsCalculator,
    amount: &str,
    now: NaiveDateTime,
) -> Result<()> {
    let breakdown = calc::quote(session, provider, currency, calculator, amount).await?;
    println!("{}", calc::display_breakdown(&breakdown, currency));

    let outcome = session.save(store, breakdown, now)?;
    println!(
        "\n{}",
        ui::style_text(
            &format!(
                "Saved {} for {}",
                ui::format_money(outcome.record.net_local, &currency.to),
                session.user_id()
            ),
            ui::StyleType::TotalValue
        )
    );
    if outcome.is_new_best {
        println!(
            "{}",
            ui::style_text(
                "New personal best! Congratulations!",
                ui::StyleType::Celebrate
            )
        );
    }
    ui::print_separator();

    let month = YearMonth::from_date(now.date());
    let report = session.report(&outcome.ledger, month)?;
    history::print_report(&report, &currency.to, now.day());
    Ok(())
}

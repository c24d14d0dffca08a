use super::ui;
use crate::core::config::CurrencyPair;
use crate::core::{EarningsBreakdown, EarningsCalculator, ExchangeRateProvider, Session};
use anyhow::Result;
use comfy_table::{Cell, CellAlignment};
use tracing::info;

pub fn display_breakdown(breakdown: &EarningsBreakdown, currency: &CurrencyPair) -> String {
    let mut table = ui::new_styled_table();
    table.set_header(vec![ui::header_cell("Item"), ui::header_cell("Amount")]);
    table.add_row(vec![
        Cell::new(format!("Revenue ({})", currency.from)),
        Cell::new(format!("{:.2}", breakdown.foreign_amount)).set_alignment(CellAlignment::Right),
    ]);
    table.add_row(vec![
        Cell::new(format!("{}/{} rate", currency.from, currency.to)),
        Cell::new(format!("{:.2}", breakdown.rate.value())).set_alignment(CellAlignment::Right),
    ]);
    table.add_row(vec![
        Cell::new(format!("Before tax ({})", currency.to)),
        ui::amount_cell(breakdown.gross_local),
    ]);
    table.add_row(vec![
        Cell::new(format!("Withholding ({})", currency.to)),
        ui::amount_cell(-breakdown.tax_withheld),
    ]);
    table.add_row(vec![
        Cell::new(format!("Take-home ({})", currency.to)),
        ui::total_cell(breakdown.net_local),
    ]);
    table.to_string()
}

/// Fetches the current rate and computes a preview.
pub async fn quote(
    session: &Session,
    provider: &(dyn ExchangeRateProvider + Send + Sync),
    currency: &CurrencyPair,
    calculator: &EarningsCalculator,
    amount: &str,
) -> Result<EarningsBreakdown> {
    let pb = ui::new_spinner("Fetching exchange rate...");
    let result = session
        .quote(provider, &currency.from, &currency.to, calculator, amount)
        .await;
    pb.finish_and_clear();
    Ok(result?)
}

/// Shows what a day's revenue is worth without saving it.
pub async fn run(
    session: &Session,
    provider: &(dyn ExchangeRateProvider + Send + Sync),
    currency: &CurrencyPair,
    calculator: &EarningsCalculator,
    amount: &str,
) -> Result<()> {
    let breakdown = quote(session, provider, currency, calculator, amount).await?;
    info!(user = session.user_id(), net = breakdown.net_local, "Previewed earnings");

    println!("{}", display_breakdown(&breakdown, currency));
    println!(
        "\n{}",
        ui::style_text(
            "Not saved. Run `save` with the same amount to record it.",
            ui::StyleType::Subtle
        )
    );
    Ok(())
}

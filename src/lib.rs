pub mod cli;
pub mod core;
pub mod providers;
pub mod store;

use crate::core::config::{AppConfig, Credentials, Goals};
use crate::core::{EarningsCalculator, Session, YearMonth};
use anyhow::Result;
use chrono::{Datelike, Local};
use std::time::Duration;
use tracing::{debug, info};

/// Commands that need a loaded configuration and a logged-in user.
#[derive(Debug, Clone)]
pub enum AppCommand {
    /// Preview take-home pay for an amount without saving.
    Calc {
        user: String,
        password: String,
        amount: String,
    },
    /// Compute, save and show history.
    Save {
        user: String,
        password: String,
        amount: String,
    },
    /// Show history for a month (current month when `None`).
    History {
        user: String,
        password: String,
        month: Option<YearMonth>,
    },
}

impl AppCommand {
    fn credentials(&self) -> (&str, &str) {
        match self {
            AppCommand::Calc { user, password, .. }
            | AppCommand::Save { user, password, .. }
            | AppCommand::History { user, password, .. } => (user, password),
        }
    }
}

pub async fn run_command(command: AppCommand, config_path: Option<&str>) -> Result<()> {
    info!("Earnings tracker starting...");

    let config = match config_path {
        Some(path) => AppConfig::load_from_path(path)?,
        None => AppConfig::load()?,
    };
    debug!("Loaded config: {config:#?}");

    let credentials = Credentials::load_or_empty(&config.credentials_file()?);
    let goals = Goals::load_or_default(&config.goals_file()?, config.default_goal);

    let (user, password) = command.credentials();
    let session = Session::login(&credentials, &goals, user, password)?;

    let store = store::CsvLedgerStore::new(config.ledger_dir()?);
    debug!("Ledger directory: {}", store.root().display());

    let provider_config = config.exchange_rate_provider();
    let provider = providers::OpenErApiProvider::new(
        &provider_config.base_url,
        Duration::from_secs(provider_config.timeout_secs),
    );
    let calculator = EarningsCalculator::new(config.earnings);
    let now = Local::now().naive_local();

    match command {
        AppCommand::Calc { amount, .. } => {
            cli::calc::run(&session, &provider, &config.currency, &calculator, &amount).await
        }
        AppCommand::Save { amount, .. } => {
            cli::save::run(
                &session,
                &provider,
                &store,
                &config.currency,
                &calculator,
                &amount,
                now,
            )
            .await
        }
        AppCommand::History { month, .. } => {
            let month = month.unwrap_or_else(|| YearMonth::from_date(now.date()));
            cli::history::run(&session, &store, &config.currency.to, month, now.day())
        }
    }
}

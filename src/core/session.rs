//! Per-user flow: login, quote, save, report.

use crate::core::config::{Credentials, Goals};
use crate::core::earnings::{
    EarningsBreakdown, EarningsCalculator, ExchangeRate, parse_foreign_amount,
};
use crate::core::error::TrackerError;
use crate::core::history::{self, HistorySummary, MonthAttendance, TREND_WINDOW, Trend};
use crate::core::rate::ExchangeRateProvider;
use crate::core::record::{EarningsRecord, YearMonth};
use crate::store::LedgerStore;
use chrono::{NaiveDateTime, SubsecRound};
use std::collections::BTreeMap;
use tracing::{debug, info, warn};

/// A logged-in user together with their monthly goal.
#[derive(Debug, Clone)]
pub struct Session {
    user_id: String,
    goal: i64,
}

/// Outcome of a confirmed save.
#[derive(Debug, Clone)]
pub struct SaveOutcome {
    pub record: EarningsRecord,
    pub is_new_best: bool,
    pub ledger: Vec<EarningsRecord>,
}

/// Everything the history view renders.
#[derive(Debug, Clone)]
pub struct HistoryReport {
    pub history: Vec<EarningsRecord>,
    pub summary: HistorySummary,
    pub trend: Trend,
    pub monthly_totals: BTreeMap<YearMonth, i64>,
    pub attendance: MonthAttendance,
}

impl Session {
    pub fn login(
        credentials: &Credentials,
        goals: &Goals,
        user_id: &str,
        password: &str,
    ) -> Result<Self, TrackerError> {
        if !credentials.verify(user_id, password) {
            warn!(user = user_id, "Login rejected");
            return Err(TrackerError::InvalidCredentials);
        }
        info!(user = user_id, "Login succeeded");
        Ok(Session {
            user_id: user_id.to_string(),
            goal: goals.goal_for(user_id),
        })
    }

    pub fn user_id(&self) -> &str {
        &self.user_id
    }

    pub fn goal(&self) -> i64 {
        self.goal
    }

    /// Fetches a rate once. Any failure becomes `RateUnavailable`.
    pub async fn fetch_rate(
        &self,
        provider: &(dyn ExchangeRateProvider + Send + Sync),
        from: &str,
        to: &str,
    ) -> Result<ExchangeRate, TrackerError> {
        let raw = provider.get_rate(from, to).await.map_err(|e| {
            warn!(error = %e, "Exchange rate fetch failed");
            TrackerError::RateUnavailable(e.to_string())
        })?;
        ExchangeRate::try_from(raw)
    }

    /// Computes a preview for `amount_input`. Nothing is stored.
    pub async fn quote(
        &self,
        provider: &(dyn ExchangeRateProvider + Send + Sync),
        from: &str,
        to: &str,
        calculator: &EarningsCalculator,
        amount_input: &str,
    ) -> Result<EarningsBreakdown, TrackerError> {
        let rate = self.fetch_rate(provider, from, to).await?;
        let amount = parse_foreign_amount(amount_input)?;
        let breakdown = calculator.compute(amount, rate)?;
        debug!(?breakdown, "Computed earnings");
        Ok(breakdown)
    }

    pub fn save(
        &self,
        store: &dyn LedgerStore,
        breakdown: EarningsBreakdown,
        now: NaiveDateTime,
    ) -> Result<SaveOutcome, TrackerError> {
        // The ledger keeps whole seconds
        let record = breakdown.into_record(now.trunc_subsecs(0));
        let ledger = store.append(&self.user_id, record.clone())?;
        let prior = &ledger[..ledger.len() - 1];
        let is_new_best = history::is_new_best(prior, record.net_local);
        if is_new_best {
            info!(user = %self.user_id, net = record.net_local, "New best day");
        }
        Ok(SaveOutcome {
            record,
            is_new_best,
            ledger,
        })
    }

    pub fn load_ledger(
        &self,
        store: &dyn LedgerStore,
    ) -> Result<Vec<EarningsRecord>, TrackerError> {
        store.load(&self.user_id)
    }

    pub fn report(
        &self,
        ledger: &[EarningsRecord],
        month: YearMonth,
    ) -> Result<HistoryReport, TrackerError> {
        let attendance = history::calendar_attendance(ledger, month.year, month.month)?;
        Ok(HistoryReport {
            history: history::sorted_newest_first(ledger)
                .into_iter()
                .cloned()
                .collect(),
            summary: history::summarize(ledger, self.goal, month),
            trend: history::recent_trend(ledger, TREND_WINDOW),
            monthly_totals: history::monthly_totals(ledger),
            attendance,
        })
    }
}

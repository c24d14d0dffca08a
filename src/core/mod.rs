//! Earnings computation and ledger aggregation

pub mod config;
pub mod earnings;
pub mod error;
pub mod history;
pub mod log;
pub mod rate;
pub mod record;
pub mod session;

// Re-export main types for cleaner imports
pub use earnings::{EarningsBreakdown, EarningsCalculator, EarningsConfig, ExchangeRate};
pub use error::TrackerError;
pub use rate::ExchangeRateProvider;
pub use record::{EarningsRecord, YearMonth};
pub use session::{HistoryReport, SaveOutcome, Session};

//! Exchange rate abstractions

use anyhow::Result;
use async_trait::async_trait;

#[async_trait]
pub trait ExchangeRateProvider: Send + Sync {
    /// Fetches how many units of `to` one unit of `from` buys.
    async fn get_rate(&self, from: &str, to: &str) -> Result<f64>;
}

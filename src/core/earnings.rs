//! Converts a day's foreign-currency revenue into local take-home pay.

use crate::core::error::TrackerError;
use crate::core::record::EarningsRecord;
use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};

pub const DEFAULT_REWARD_RATE: f64 = 0.6;
pub const DEFAULT_TAX_RATE: f64 = 0.1021;

/// Smallest gross amount that no longer fits in an `i64`.
const MAX_LOCAL_AMOUNT: f64 = i64::MAX as f64;

/// Contract rates applied to every computation.
#[derive(Debug, Clone, Copy, PartialEq, Deserialize, Serialize)]
pub struct EarningsConfig {
    /// Share of the gross revenue paid out to the streamer.
    #[serde(default = "default_reward_rate")]
    pub reward_rate: f64,
    /// Withholding tax applied to the payout.
    #[serde(default = "default_tax_rate")]
    pub tax_rate: f64,
}

fn default_reward_rate() -> f64 {
    DEFAULT_REWARD_RATE
}

fn default_tax_rate() -> f64 {
    DEFAULT_TAX_RATE
}

impl Default for EarningsConfig {
    fn default() -> Self {
        EarningsConfig {
            reward_rate: DEFAULT_REWARD_RATE,
            tax_rate: DEFAULT_TAX_RATE,
        }
    }
}

impl EarningsConfig {
    pub fn validate(&self) -> Result<(), TrackerError> {
        if !self.reward_rate.is_finite() || self.reward_rate <= 0.0 {
            return Err(TrackerError::InvalidConfig(format!(
                "reward_rate must be positive, got {}",
                self.reward_rate
            )));
        }
        if !self.tax_rate.is_finite() || !(0.0..1.0).contains(&self.tax_rate) {
            return Err(TrackerError::InvalidConfig(format!(
                "tax_rate must be within [0, 1), got {}",
                self.tax_rate
            )));
        }
        Ok(())
    }
}

/// A foreign-to-local exchange rate. Always finite and strictly positive.
#[derive(Debug, Clone, Copy, PartialEq, PartialOrd)]
pub struct ExchangeRate(f64);

impl ExchangeRate {
    pub fn new(value: f64) -> Option<Self> {
        (value.is_finite() && value > 0.0).then_some(ExchangeRate(value))
    }

    pub fn value(&self) -> f64 {
        self.0
    }
}

impl TryFrom<f64> for ExchangeRate {
    type Error = TrackerError;

    fn try_from(value: f64) -> Result<Self, Self::Error> {
        ExchangeRate::new(value).ok_or_else(|| {
            TrackerError::RateUnavailable(format!("rate must be positive, got {value}"))
        })
    }
}

/// Result of one computation, with both the exact and the rounded-up values.
#[derive(Debug, Clone, PartialEq)]
pub struct EarningsBreakdown {
    pub foreign_amount: f64,
    pub rate: ExchangeRate,
    pub gross_unrounded: f64,
    pub tax_unrounded: f64,
    pub net_unrounded: f64,
    pub gross_local: i64,
    pub tax_withheld: i64,
    pub net_local: i64,
}

impl EarningsBreakdown {
    pub fn into_record(self, timestamp: NaiveDateTime) -> EarningsRecord {
        EarningsRecord {
            timestamp,
            foreign_amount: self.foreign_amount,
            rate: self.rate.value(),
            gross_local: self.gross_local,
            tax_withheld: self.tax_withheld,
            net_local: self.net_local,
        }
    }
}

#[derive(Debug, Clone, Copy, Default)]
pub struct EarningsCalculator {
    config: EarningsConfig,
}

impl EarningsCalculator {
    pub fn new(config: EarningsConfig) -> Self {
        EarningsCalculator { config }
    }

    /// Computes gross, tax and net amounts in local currency.
    ///
    /// Each amount is rounded up from its own unrounded base, so `net_local`
    /// may exceed `gross_local - tax_withheld` by one unit. Amounts whose
    /// gross does not fit in an `i64` are refused as `InvalidInput`.
    pub fn compute(
        &self,
        foreign_amount: f64,
        rate: ExchangeRate,
    ) -> Result<EarningsBreakdown, TrackerError> {
        let gross_unrounded = foreign_amount * rate.value() * self.config.reward_rate;
        // tax_rate is in [0, 1), so tax and net never exceed gross.
        if !gross_unrounded.is_finite() || gross_unrounded.ceil() >= MAX_LOCAL_AMOUNT {
            return Err(TrackerError::InvalidInput(foreign_amount.to_string()));
        }
        let tax_unrounded = gross_unrounded * self.config.tax_rate;
        let net_unrounded = gross_unrounded - tax_unrounded;

        Ok(EarningsBreakdown {
            foreign_amount,
            rate,
            gross_unrounded,
            tax_unrounded,
            net_unrounded,
            gross_local: gross_unrounded.ceil() as i64,
            tax_withheld: tax_unrounded.ceil() as i64,
            net_local: net_unrounded.ceil() as i64,
        })
    }
}

/// Parses the user-supplied daily revenue.
pub fn parse_foreign_amount(input: &str) -> Result<f64, TrackerError> {
    let trimmed = input.trim();
    let amount: f64 = trimmed
        .parse()
        .map_err(|_| TrackerError::InvalidInput(input.to_string()))?;
    if !amount.is_finite() || amount < 0.0 {
        return Err(TrackerError::InvalidInput(input.to_string()));
    }
    Ok(amount)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn rate(value: f64) -> ExchangeRate {
        ExchangeRate::new(value).unwrap()
    }

    #[test]
    fn test_reference_example() {
        let calc = EarningsCalculator::default();
        let result = calc.compute(200.0, rate(150.0)).unwrap();

        assert!((result.gross_unrounded - 18000.0).abs() < 1e-9);
        assert!((result.tax_unrounded - 1837.8).abs() < 1e-9);
        assert!((result.net_unrounded - 16162.2).abs() < 1e-9);
        assert_eq!(result.gross_local, 18000);
        assert_eq!(result.tax_withheld, 1838);
        assert_eq!(result.net_local, 16163);
    }

    #[test]
    fn test_net_is_rounded_independently() {
        let calc = EarningsCalculator::default();
        let result = calc.compute(200.0, rate(150.0)).unwrap();

        // 18000 - 1838 = 16162, but net rounds up from 16162.2
        assert_eq!(result.gross_local - result.tax_withheld, 16162);
        assert_eq!(result.net_local, 16163);
    }

    #[test]
    fn test_matches_formula_for_fractional_inputs() {
        let calc = EarningsCalculator::default();
        for (amount, r) in [(12.34, 149.87), (0.5, 151.02), (1234.0, 143.5)] {
            let result = calc.compute(amount, rate(r)).unwrap();
            let gross = amount * r * 0.6;
            let tax = gross * 0.1021;
            assert_eq!(result.gross_local, gross.ceil() as i64);
            assert_eq!(result.tax_withheld, tax.ceil() as i64);
            assert_eq!(result.net_local, (gross - tax).ceil() as i64);
        }
    }

    #[test]
    fn test_zero_amount() {
        let calc = EarningsCalculator::default();
        let result = calc.compute(0.0, rate(150.0)).unwrap();
        assert_eq!(result.gross_local, 0);
        assert_eq!(result.tax_withheld, 0);
        assert_eq!(result.net_local, 0);
    }

    #[test]
    fn test_custom_config() {
        let calc = EarningsCalculator::new(EarningsConfig {
            reward_rate: 0.5,
            tax_rate: 0.0,
        });
        let result = calc.compute(100.0, rate(100.0)).unwrap();
        assert_eq!(result.gross_local, 5000);
        assert_eq!(result.tax_withheld, 0);
        assert_eq!(result.net_local, 5000);
    }

    #[test]
    fn test_amount_too_large_for_ledger_is_refused() {
        let calc = EarningsCalculator::default();
        for amount in [1e18, 1e30, f64::MAX] {
            let result = calc.compute(amount, rate(150.0));
            assert!(
                matches!(result, Err(TrackerError::InvalidInput(_))),
                "{amount} should be refused"
            );
        }

        // Just under the limit still computes without saturating.
        let result = calc.compute(1e17, rate(150.0)).unwrap();
        assert!((result.gross_local as f64 - 9e18).abs() < 1e4);
        assert!(result.gross_local < i64::MAX);
        assert!(result.net_local < result.gross_local);
    }

    #[test]
    fn test_non_positive_rate_is_refused() {
        for bad in [0.0, -1.0, f64::NAN, f64::INFINITY] {
            let result = ExchangeRate::try_from(bad);
            assert!(matches!(result, Err(TrackerError::RateUnavailable(_))));
        }
    }

    #[test]
    fn test_parse_foreign_amount() {
        assert_eq!(parse_foreign_amount("200").unwrap(), 200.0);
        assert_eq!(parse_foreign_amount(" 12.5 ").unwrap(), 12.5);
        assert_eq!(parse_foreign_amount("0").unwrap(), 0.0);

        for bad in ["", "   ", "abc", "-3", "NaN", "inf", "1,000"] {
            assert!(
                matches!(parse_foreign_amount(bad), Err(TrackerError::InvalidInput(_))),
                "expected {bad:?} to be rejected"
            );
        }
    }

    #[test]
    fn test_config_validation() {
        assert!(EarningsConfig::default().validate().is_ok());
        assert!(
            EarningsConfig {
                reward_rate: 0.0,
                tax_rate: 0.1
            }
            .validate()
            .is_err()
        );
        assert!(
            EarningsConfig {
                reward_rate: 0.6,
                tax_rate: 1.0
            }
            .validate()
            .is_err()
        );
        assert!(
            EarningsConfig {
                reward_rate: 0.6,
                tax_rate: -0.1
            }
            .validate()
            .is_err()
        );
    }

    #[test]
    fn test_into_record_copies_rounded_values() {
        let calc = EarningsCalculator::default();
        let ts = chrono::NaiveDate::from_ymd_opt(2024, 3, 1)
            .unwrap()
            .and_hms_opt(21, 30, 0)
            .unwrap();
        let record = calc.compute(200.0, rate(150.0)).unwrap().into_record(ts);
        assert_eq!(record.timestamp, ts);
        assert_eq!(record.foreign_amount, 200.0);
        assert_eq!(record.rate, 150.0);
        assert_eq!(record.gross_local, 18000);
        assert_eq!(record.tax_withheld, 1838);
        assert_eq!(record.net_local, 16163);
    }
}

use anyhow::{Result, anyhow};
use async_trait::async_trait;
use serde::Deserialize;
use std::collections::HashMap;
use std::time::Duration;
use tracing::{debug, instrument};

use crate::core::rate::ExchangeRateProvider;

/// Latest rates from the open ExchangeRate-API endpoint (`/v6/latest/{base}`).
pub struct OpenErApiProvider {
    base_url: String,
    timeout: Duration,
}

impl OpenErApiProvider {
    pub fn new(base_url: &str, timeout: Duration) -> Self {
        OpenErApiProvider {
            base_url: base_url.trim_end_matches('/').to_string(),
            timeout,
        }
    }
}

#[derive(Debug, Deserialize)]
struct LatestRatesResponse {
    rates: HashMap<String, f64>,
}

#[async_trait]
impl ExchangeRateProvider for OpenErApiProvider {
    #[instrument(name = "ExchangeRateFetch", skip(self), fields(from = %from, to = %to))]
    async fn get_rate(&self, from: &str, to: &str) -> Result<f64> {
        let url = format!("{}/v6/latest/{}", self.base_url, from);
        debug!("Requesting exchange rate from {}", url);

        let client = reqwest::Client::builder()
            .user_agent("streampay/0.1")
            .timeout(self.timeout)
            .build()?;

        let response = client
            .get(&url)
            .send()
            .await
            .map_err(|e| anyhow!("Request error: {} for currency pair: {}{}", e, from, to))?;

        if !response.status().is_success() {
            return Err(anyhow!(
                "HTTP error: {} for currency pair: {}{}",
                response.status(),
                from,
                to
            ));
        }

        let text = response.text().await?;

        let data: LatestRatesResponse = serde_json::from_str(&text)
            .map_err(|e| anyhow!("Failed to parse JSON response for {}{}: {}", from, to, e))?;

        let rate = data
            .rates
            .get(to)
            .copied()
            .ok_or_else(|| anyhow!("No rate data found for currency: {}", to))?;

        if !rate.is_finite() || rate <= 0.0 {
            return Err(anyhow!("Invalid rate {} for currency pair: {}{}", rate, from, to));
        }

        debug!(rate, "Received exchange rate");
        Ok(rate)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use wiremock::matchers::{method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    const LATEST_PATH: &str = "/v6/latest/USD";

    async fn create_mock_server(response: ResponseTemplate) -> MockServer {
        let mock_server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path(LATEST_PATH))
            .respond_with(response)
            .mount(&mock_server)
            .await;
        mock_server
    }

    fn provider(mock_server: &MockServer) -> OpenErApiProvider {
        OpenErApiProvider::new(&mock_server.uri(), Duration::from_secs(5))
    }

    #[tokio::test]
    async fn test_successful_rate_fetch() {
        let mock_response = r#"{
            "result": "success",
            "base_code": "USD",
            "rates": {
                "USD": 1,
                "EUR": 0.92,
                "JPY": 151.37
            }
        }"#;
        let mock_server =
            create_mock_server(ResponseTemplate::new(200).set_body_string(mock_response)).await;

        let rate = provider(&mock_server)
            .get_rate("USD", "JPY")
            .await
            .expect("Failed to get rate");
        assert_eq!(rate, 151.37);
    }

    #[tokio::test]
    async fn test_missing_currency_key() {
        let mock_response = r#"{"rates": {"EUR": 0.92}}"#;
        let mock_server =
            create_mock_server(ResponseTemplate::new(200).set_body_string(mock_response)).await;

        let result = provider(&mock_server).get_rate("USD", "JPY").await;
        assert!(result.is_err());
        assert_eq!(
            result.unwrap_err().to_string(),
            "No rate data found for currency: JPY"
        );
    }

    #[tokio::test]
    async fn test_api_error_response() {
        let mock_server = create_mock_server(ResponseTemplate::new(500)).await;

        let result = provider(&mock_server).get_rate("USD", "JPY").await;
        assert!(result.is_err());
        assert_eq!(
            result.unwrap_err().to_string(),
            "HTTP error: 500 Internal Server Error for currency pair: USDJPY"
        );
    }

    #[tokio::test]
    async fn test_malformed_response() {
        let mock_response = r#"{"conversion_rates": {"JPY": 151.0}}"#;
        let mock_server =
            create_mock_server(ResponseTemplate::new(200).set_body_string(mock_response)).await;

        let result = provider(&mock_server).get_rate("USD", "JPY").await;
        assert!(result.is_err());
        assert!(
            result
                .unwrap_err()
                .to_string()
                .contains("Failed to parse JSON response for USDJPY")
        );
    }

    #[tokio::test]
    async fn test_zero_rate_is_rejected() {
        let mock_response = r#"{"rates": {"JPY": 0}}"#;
        let mock_server =
            create_mock_server(ResponseTemplate::new(200).set_body_string(mock_response)).await;

        let result = provider(&mock_server).get_rate("USD", "JPY").await;
        assert!(result.is_err());
        assert!(result.unwrap_err().to_string().starts_with("Invalid rate 0"));
    }

    #[tokio::test]
    async fn test_slow_response_times_out() {
        let mock_response = r#"{"rates": {"JPY": 151.0}}"#;
        let mock_server = create_mock_server(
            ResponseTemplate::new(200)
                .set_body_string(mock_response)
                .set_delay(Duration::from_millis(500)),
        )
        .await;

        let provider = OpenErApiProvider::new(&mock_server.uri(), Duration::from_millis(50));
        let result = provider.get_rate("USD", "JPY").await;
        assert!(result.is_err());
        assert!(result.unwrap_err().to_string().starts_with("Request error"));
    }
}

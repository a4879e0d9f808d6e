use async_trait::async_trait;
use chrono::{NaiveDate, Utc};
use serde::Deserialize;
use std::collections::BTreeMap;
use tracing::{debug, instrument};

use crate::error::FeedError;
use crate::rate_provider::RateProvider;
use crate::snapshot::RateSnapshot;

pub const DEFAULT_BASE_URL: &str = "https://openexchangerates.org/api";

/// Open Exchange Rates historical endpoint, one request per date.
pub struct OpenExchangeRatesProvider {
    base_url: String,
    app_id: String,
    base_currency: String,
}

impl OpenExchangeRatesProvider {
    pub fn new(base_url: &str, app_id: &str, base_currency: &str) -> Self {
        OpenExchangeRatesProvider {
            base_url: base_url.to_string(),
            app_id: app_id.to_string(),
            base_currency: base_currency.to_string(),
        }
    }
}

#[derive(Deserialize, Debug)]
struct HistoricalResponse {
    base: String,
    rates: BTreeMap<String, f64>,
}

// Error body shape: {"error": true, "status": 401, "message": "...", "description": "..."}
#[derive(Deserialize, Debug)]
struct ApiErrorBody {
    description: Option<String>,
    message: Option<String>,
}

#[async_trait]
impl RateProvider for OpenExchangeRatesProvider {
    #[instrument(name = "OxrFetch", skip(self), fields(date = %date))]
    async fn fetch_rates(&self, date: NaiveDate) -> Result<RateSnapshot, FeedError> {
        let url = format!(
            "{}/historical/{}.json?app_id={}&base={}",
            self.base_url, date, self.app_id, self.base_currency
        );
        debug!("Requesting historical rates for {}", date);

        let client = reqwest::Client::builder()
            .user_agent("fxfeed/0.2")
            .build()
            .map_err(|source| FeedError::Request { date, source })?;

        let response = client
            .get(&url)
            .send()
            .await
            .map_err(|source| FeedError::Request { date, source })?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            let description = serde_json::from_str::<ApiErrorBody>(&body)
                .ok()
                .and_then(|e| e.description.or(e.message))
                .unwrap_or_else(|| status.to_string());
            return Err(FeedError::Api {
                date,
                status: status.as_u16(),
                description,
            });
        }

        let text = response
            .text()
            .await
            .map_err(|source| FeedError::Request { date, source })?;

        let parsed: HistoricalResponse =
            serde_json::from_str(&text).map_err(|source| FeedError::Parse { date, source })?;

        debug!(
            currencies = parsed.rates.len(),
            "Fetched rates for {} against {}", date, parsed.base
        );

        Ok(RateSnapshot {
            date,
            base: parsed.base,
            rates: parsed.rates,
            last_update: Utc::now(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use wiremock::matchers::{method, path, query_param};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    async fn create_mock_server(
        day: &str,
        status_code: u16,
        mock_response: &str,
    ) -> wiremock::MockServer {
        let mock_server = MockServer::start().await;
        let request_path = format!("/historical/{day}.json");

        Mock::given(method("GET"))
            .and(path(request_path))
            .and(query_param("app_id", "test-app-id"))
            .and(query_param("base", "USD"))
            .respond_with(ResponseTemplate::new(status_code).set_body_string(mock_response))
            .mount(&mock_server)
            .await;

        mock_server
    }

    #[tokio::test]
    async fn test_successful_rates_fetch() {
        let mock_response = r#"{
            "disclaimer": "Usage subject to terms",
            "license": "https://openexchangerates.org/license",
            "timestamp": 1609545599,
            "base": "USD",
            "rates": {
                "AED": 3.6732,
                "EUR": 0.8218,
                "JPY": 103.245
            }
        }"#;

        let mock_server = create_mock_server("2021-01-01", 200, mock_response).await;
        let provider = OpenExchangeRatesProvider::new(&mock_server.uri(), "test-app-id", "USD");

        let snapshot = provider.fetch_rates(date(2021, 1, 1)).await.unwrap();
        assert_eq!(snapshot.date, date(2021, 1, 1));
        assert_eq!(snapshot.base, "USD");
        assert_eq!(snapshot.rates.len(), 3);
        assert_eq!(snapshot.rates["EUR"], 0.8218);
    }

    #[tokio::test]
    async fn test_api_error_carries_description() {
        let mock_response = r#"{
            "error": true,
            "status": 401,
            "message": "invalid_app_id",
            "description": "Invalid App ID provided"
        }"#;

        let mock_server = create_mock_server("2021-01-01", 401, mock_response).await;
        let provider = OpenExchangeRatesProvider::new(&mock_server.uri(), "test-app-id", "USD");

        let result = provider.fetch_rates(date(2021, 1, 1)).await;
        match result {
            Err(FeedError::Api {
                status,
                description,
                ..
            }) => {
                assert_eq!(status, 401);
                assert_eq!(description, "Invalid App ID provided");
            }
            other => panic!("Expected Api error, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_api_error_with_unparseable_body_falls_back_to_status() {
        let mock_server = create_mock_server("2021-01-01", 500, "upstream exploded").await;
        let provider = OpenExchangeRatesProvider::new(&mock_server.uri(), "test-app-id", "USD");

        let result = provider.fetch_rates(date(2021, 1, 1)).await;
        match result {
            Err(FeedError::Api {
                status,
                description,
                ..
            }) => {
                assert_eq!(status, 500);
                assert!(description.contains("500"));
            }
            other => panic!("Expected Api error, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_malformed_body_is_a_parse_error() {
        let mock_server = create_mock_server("2021-01-01", 200, r#"{"base": "USD", "rates":"#).await;
        let provider = OpenExchangeRatesProvider::new(&mock_server.uri(), "test-app-id", "USD");

        let result = provider.fetch_rates(date(2021, 1, 1)).await;
        assert!(matches!(result, Err(FeedError::Parse { .. })));
    }

    #[tokio::test]
    async fn test_base_currency_is_sent_as_query_param() {
        let mock_server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/historical/2021-01-01.json"))
            .and(query_param("app_id", "test-app-id"))
            .and(query_param("base", "EUR"))
            .respond_with(ResponseTemplate::new(200).set_body_string(
                r#"{"base": "EUR", "rates": {"USD": 1.2167}}"#,
            ))
            .mount(&mock_server)
            .await;

        let provider = OpenExchangeRatesProvider::new(&mock_server.uri(), "test-app-id", "EUR");
        let snapshot = provider.fetch_rates(date(2021, 1, 1)).await.unwrap();
        assert_eq!(snapshot.base, "EUR");
        assert_eq!(snapshot.rates["USD"], 1.2167);
    }
}

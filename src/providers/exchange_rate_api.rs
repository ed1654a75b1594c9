use super::util::{RetryPolicy, with_retry};
use crate::core::config::ProviderConfig;
use crate::core::currency::{CurrencyCode, RatePayload};
use crate::core::error::{FetchError, ProviderErrorKind, ValidationError};
use crate::core::rates::RateProvider;
use anyhow::Result;
use async_trait::async_trait;
use chrono::{TimeZone, Utc};
use serde::Deserialize;
use std::collections::HashMap;
use std::time::Duration;
use tracing::{debug, instrument, warn};

#[derive(Debug, Deserialize)]
struct LatestResponse {
    result: Option<String>,
    #[serde(rename = "error-type")]
    error_type: Option<String>,
    base_code: Option<String>,
    time_last_update_unix: Option<i64>,
    conversion_rates: Option<HashMap<String, f64>>,
}

/// Client for the ExchangeRate-API `latest` endpoint.
pub struct ExchangeRateApiProvider {
    base_url: String,
    api_key: String,
    client: reqwest::Client,
    retry: RetryPolicy,
}

impl ExchangeRateApiProvider {
    pub fn new(config: &ProviderConfig) -> Result<Self> {
        let client = reqwest::Client::builder()
            .user_agent("cambio/0.1")
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()?;

        Ok(ExchangeRateApiProvider {
            base_url: config.base_url.trim_end_matches('/').to_string(),
            api_key: config.api_key.clone(),
            client,
            retry: RetryPolicy::new(config.retries, config.retry_delay_ms),
        })
    }

    fn endpoint(&self, base: &CurrencyCode) -> String {
        format!("/v6/{}/latest/{}", self.api_key, base)
    }
}

#[async_trait]
impl RateProvider for ExchangeRateApiProvider {
    #[instrument(name = "LatestRatesFetch", skip(self), fields(base = %base))]
    async fn latest(&self, base: &CurrencyCode) -> Result<RatePayload, FetchError> {
        let url = format!("{}{}", self.base_url, self.endpoint(base));
        debug!("Requesting rates from {}/v6/***/latest/{}", self.base_url, base);

        let response = with_retry(
            || self.client.get(&url).send(),
            self.retry,
            |err: &reqwest::Error| err.is_connect() || err.is_timeout(),
        )
        .await
        .map_err(|e| FetchError::Network(format!("Request error: {e} for base: {base}")))?;

        if !response.status().is_success() {
            warn!(status = %response.status(), "Rate provider returned an error status");
            return Err(FetchError::Network(format!(
                "HTTP error: {} for base: {}",
                response.status(),
                base
            )));
        }

        let text = response
            .text()
            .await
            .map_err(|e| FetchError::Network(format!("Failed to read response body: {e}")))?;

        let data: LatestResponse = serde_json::from_str(&text).map_err(|e| {
            ValidationError::MalformedBody(format!("Failed to parse JSON response for {base}: {e}"))
        })?;

        if data.result.as_deref() == Some("error") {
            let kind = ProviderErrorKind::from_code(data.error_type.as_deref());
            debug!(error_type = ?data.error_type, ?kind, "Provider reported an error");
            return Err(FetchError::Provider(kind));
        }

        Ok(RatePayload {
            base: data.base_code,
            rates: data.conversion_rates,
            last_updated: data
                .time_last_update_unix
                .and_then(|ts| Utc.timestamp_opt(ts, 0).single()),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use wiremock::matchers::{method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    const API_KEY: &str = "test-key";

    fn provider_for(server: &MockServer) -> ExchangeRateApiProvider {
        provider_at(&server.uri())
    }

    fn provider_at(base_url: &str) -> ExchangeRateApiProvider {
        provider_with(base_url, 5, 0)
    }

    fn provider_with(base_url: &str, timeout_secs: u64, retries: usize) -> ExchangeRateApiProvider {
        ExchangeRateApiProvider::new(&ProviderConfig {
            base_url: base_url.to_string(),
            api_key: API_KEY.to_string(),
            timeout_secs,
            retries,
            retry_delay_ms: 0,
        })
        .unwrap()
    }

    async fn create_slow_server(delay: Duration) -> MockServer {
        let mock_server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path(format!("/v6/{API_KEY}/latest/USD")))
            .respond_with(
                ResponseTemplate::new(200)
                    .set_body_string(r#"{"result": "success", "conversion_rates": {"BRL": 5.0}}"#)
                    .set_delay(delay),
            )
            .mount(&mock_server)
            .await;
        mock_server
    }

    async fn create_mock_server(base: &str, status: u16, mock_response: &str) -> MockServer {
        let mock_server = MockServer::start().await;
        let request_path = format!("/v6/{API_KEY}/latest/{base}");

        Mock::given(method("GET"))
            .and(path(request_path))
            .respond_with(ResponseTemplate::new(status).set_body_string(mock_response))
            .mount(&mock_server)
            .await;

        mock_server
    }

    #[tokio::test]
    async fn test_successful_fetch() {
        let mock_response = r#"{
            "result": "success",
            "time_last_update_unix": 1700000000,
            "base_code": "USD",
            "conversion_rates": {
                "USD": 1,
                "BRL": 5.0615,
                "EUR": 0.93
            }
        }"#;
        let server = create_mock_server("USD", 200, mock_response).await;
        let provider = provider_for(&server);

        let payload = provider.latest(&CurrencyCode::usd()).await.unwrap();
        assert_eq!(payload.base.as_deref(), Some("USD"));
        let rates = payload.rates.unwrap();
        assert_eq!(rates.len(), 3);
        assert_eq!(rates["BRL"], 5.0615);
        assert_eq!(payload.last_updated.unwrap().timestamp(), 1700000000);
    }

    #[tokio::test]
    async fn test_success_without_rates_is_left_for_validation() {
        let server = create_mock_server("USD", 200, r#"{"result": "success"}"#).await;
        let provider = provider_for(&server);

        let payload = provider.latest(&CurrencyCode::usd()).await.unwrap();
        assert!(payload.rates.is_none());
    }

    #[tokio::test]
    async fn test_provider_error_codes() {
        let cases = [
            ("unsupported-code", ProviderErrorKind::UnsupportedCode),
            ("invalid-key", ProviderErrorKind::InvalidKey),
            ("quota-reached", ProviderErrorKind::QuotaReached),
            ("something-new", ProviderErrorKind::ServerError),
        ];

        for (code, expected) in cases {
            let body = format!(r#"{{"result": "error", "error-type": "{code}"}}"#);
            let server = create_mock_server("USD", 200, &body).await;
            let provider = provider_for(&server);

            let result = provider.latest(&CurrencyCode::usd()).await;
            assert_eq!(result, Err(FetchError::Provider(expected)));
        }
    }

    #[tokio::test]
    async fn test_error_without_type_is_server_error() {
        let server = create_mock_server("USD", 200, r#"{"result": "error"}"#).await;
        let provider = provider_for(&server);

        let result = provider.latest(&CurrencyCode::usd()).await;
        assert_eq!(
            result,
            Err(FetchError::Provider(ProviderErrorKind::ServerError))
        );
    }

    #[tokio::test]
    async fn test_http_error_is_network_error() {
        let server = create_mock_server("USD", 500, "").await;
        let provider = provider_for(&server);

        let result = provider.latest(&CurrencyCode::usd()).await;
        match result {
            Err(FetchError::Network(msg)) => {
                assert_eq!(msg, "HTTP error: 500 Internal Server Error for base: USD")
            }
            other => panic!("Expected network error, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_unreachable_server_is_network_error() {
        // Nothing listens on port 1
        let provider = provider_at("http://127.0.0.1:1");

        let result = provider.latest(&CurrencyCode::usd()).await;
        assert!(matches!(result, Err(FetchError::Network(_))));
    }

    #[tokio::test]
    async fn test_malformed_body() {
        let server = create_mock_server("USD", 200, "<html>oops</html>").await;
        let provider = provider_for(&server);

        let result = provider.latest(&CurrencyCode::usd()).await;
        match result {
            Err(FetchError::Validation(ValidationError::MalformedBody(msg))) => {
                assert!(msg.contains("Failed to parse JSON response for USD"))
            }
            other => panic!("Expected malformed body error, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_slow_response_times_out() {
        let server = create_slow_server(Duration::from_secs(3)).await;
        let provider = provider_with(&server.uri(), 1, 0);

        let result = provider.latest(&CurrencyCode::usd()).await;
        match result {
            Err(FetchError::Network(msg)) => assert!(msg.contains("for base: USD")),
            other => panic!("Expected network error, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_timeouts_are_retried() {
        let server = create_slow_server(Duration::from_secs(3)).await;
        let provider = provider_with(&server.uri(), 1, 2);

        let result = provider.latest(&CurrencyCode::usd()).await;
        assert!(matches!(result, Err(FetchError::Network(_))));

        let requests = server.received_requests().await.unwrap();
        assert_eq!(requests.len(), 3);
    }

    #[tokio::test]
    async fn test_http_errors_are_not_retried() {
        let server = create_mock_server("USD", 503, "").await;
        let provider = provider_with(&server.uri(), 5, 2);

        let result = provider.latest(&CurrencyCode::usd()).await;
        assert!(matches!(result, Err(FetchError::Network(_))));

        let requests = server.received_requests().await.unwrap();
        assert_eq!(requests.len(), 1);
    }
}

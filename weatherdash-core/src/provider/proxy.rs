use async_trait::async_trait;
use chrono::Utc;
use reqwest::{
    Client, RequestBuilder, StatusCode,
    header::{ACCEPT, CONTENT_TYPE},
};
use serde_json::Value;
use std::time::Duration;

use crate::{
    config::{CURRENT_WEATHER_PATH, ClientConfig, FORECAST_PATH, HEALTH_PATH},
    error::{API_ERROR_FALLBACK, WeatherError},
    model::{CurrentWeather, ForecastDay, Unit},
    provider::{WeatherProvider, normalize, validate_city},
};

const USER_AGENT: &str = concat!("weatherdash/", env!("CARGO_PKG_VERSION"));
const JSON_MIME: &str = "application/json";

/// Talks to the weather proxy's JSON API.
///
/// Every call is a single GET bounded by the configured timeout. Failures
/// are classified into [`WeatherError`] variants and never retried.
#[derive(Debug, Clone)]
pub struct ProxyClient {
    base_url: String,
    timeout: Duration,
    http: Client,
}

/// Decoded `{ success, data, error }` wrapper around every proxy response.
#[derive(Debug)]
struct Envelope {
    status: StatusCode,
    body: Value,
}

impl Envelope {
    /// The `data` member of a successful response.
    fn into_data(self) -> Result<Value, WeatherError> {
        let success = self.body.get("success").and_then(Value::as_bool).unwrap_or(false);
        if !self.status.is_success() || !success {
            let message = self
                .body
                .get("error")
                .and_then(Value::as_str)
                .filter(|m| !m.trim().is_empty())
                .unwrap_or(API_ERROR_FALLBACK)
                .to_string();
            return Err(WeatherError::Api { status: Some(self.status.as_u16()), message });
        }

        let mut body = self.body;
        Ok(body.get_mut("data").map(Value::take).unwrap_or(Value::Null))
    }
}

impl ProxyClient {
    pub fn new(config: ClientConfig) -> Result<Self, WeatherError> {
        let http = Client::builder()
            .user_agent(USER_AGENT)
            .build()
            .map_err(|e| WeatherError::Unknown(format!("failed to build HTTP client: {e}")))?;

        Ok(Self {
            base_url: config.base_url.trim_end_matches('/').to_string(),
            timeout: config.timeout,
            http,
        })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn weather_request(&self, path: &str, city: &str, unit: Unit) -> RequestBuilder {
        self.http
            .get(format!("{}{}", self.base_url, path))
            .query(&[("city", city), ("unit", unit.as_str())])
    }

    /// Sends the request and decodes the JSON body, all within the timeout.
    /// Dropping the in-flight future on expiry aborts the connection.
    async fn send(&self, request: RequestBuilder) -> Result<Envelope, WeatherError> {
        let request = request
            .header(ACCEPT, JSON_MIME)
            .build()
            .map_err(|e| WeatherError::Unknown(format!("failed to build request: {e}")))?;
        let url = request.url().clone();

        tracing::debug!(%url, "requesting weather proxy");

        match tokio::time::timeout(self.timeout, self.exchange(request)).await {
            Ok(result) => {
                if let Err(e) = &result {
                    tracing::debug!(%url, error = %e, "weather proxy request failed");
                }
                result
            }
            Err(_) => {
                tracing::warn!(
                    %url,
                    timeout_ms = self.timeout.as_millis() as u64,
                    "weather proxy request timed out"
                );
                Err(WeatherError::Timeout { after: self.timeout })
            }
        }
    }

    async fn exchange(&self, request: reqwest::Request) -> Result<Envelope, WeatherError> {
        let response = self.http.execute(request).await.map_err(classify_transport)?;
        let status = response.status();

        let content_type = response
            .headers()
            .get(CONTENT_TYPE)
            .and_then(|v| v.to_str().ok())
            .unwrap_or_default()
            .to_ascii_lowercase();
        if !content_type.contains(JSON_MIME) {
            return Err(WeatherError::backend_unavailable(format!(
                "expected a JSON response but got content type {content_type:?} (HTTP {status})"
            )));
        }

        let bytes = response.bytes().await.map_err(|e| {
            WeatherError::backend_unavailable(format!("failed to read response body: {e}"))
        })?;
        let body: Value = serde_json::from_slice(&bytes).map_err(|e| {
            WeatherError::backend_unavailable(format!("response body is not valid JSON: {e}"))
        })?;

        tracing::debug!(%status, "weather proxy responded");
        Ok(Envelope { status, body })
    }
}

fn classify_transport(e: reqwest::Error) -> WeatherError {
    if e.is_builder() {
        WeatherError::Unknown(e.to_string())
    } else {
        WeatherError::Network(e)
    }
}

#[async_trait]
impl WeatherProvider for ProxyClient {
    async fn fetch_current(&self, city: &str, unit: Unit) -> Result<CurrentWeather, WeatherError> {
        let city = validate_city(city)?;
        let data = self
            .send(self.weather_request(CURRENT_WEATHER_PATH, city, unit))
            .await?
            .into_data()?;
        Ok(normalize::current_weather(&data, Utc::now()))
    }

    async fn fetch_forecast(
        &self,
        city: &str,
        unit: Unit,
    ) -> Result<Vec<ForecastDay>, WeatherError> {
        let city = validate_city(city)?;
        let data = self.send(self.weather_request(FORECAST_PATH, city, unit)).await?.into_data()?;
        Ok(normalize::forecast(&data, Utc::now().date_naive()))
    }

    async fn check_health(&self) -> Result<bool, WeatherError> {
        let envelope = self.send(self.http.get(format!("{}{}", self.base_url, HEALTH_PATH))).await?;
        let healthy = envelope.status.is_success()
            && envelope.body.get("status").and_then(Value::as_str) == Some("healthy");
        Ok(healthy)
    }
}

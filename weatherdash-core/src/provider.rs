use crate::{
    Config, CurrentWeather, ForecastDay, Unit, error::WeatherError, provider::proxy::ProxyClient,
};
use async_trait::async_trait;
use std::fmt::Debug;

pub mod normalize;
pub mod proxy;

/// Longest accepted city name, in characters, after trimming.
pub const MAX_CITY_LEN: usize = 100;

/// Source of weather data for the dashboard.
///
/// Implementations make a single attempt per call; retrying is up to the caller.
#[async_trait]
pub trait WeatherProvider: Send + Sync + Debug {
    async fn fetch_current(&self, city: &str, unit: Unit) -> Result<CurrentWeather, WeatherError>;

    async fn fetch_forecast(&self, city: &str, unit: Unit)
    -> Result<Vec<ForecastDay>, WeatherError>;

    /// `true` when the backend reports itself healthy.
    async fn check_health(&self) -> Result<bool, WeatherError>;
}

/// Returns the trimmed city, or [`WeatherError::InvalidCity`] when it is
/// empty or longer than [`MAX_CITY_LEN`] characters.
pub fn validate_city(city: &str) -> Result<&str, WeatherError> {
    let trimmed = city.trim();
    let len = trimmed.chars().count();
    if len == 0 || len > MAX_CITY_LEN {
        return Err(WeatherError::InvalidCity(city.to_string()));
    }
    Ok(trimmed)
}

/// Construct the proxy-backed provider described by `config`.
pub fn provider_from_config(config: &Config) -> anyhow::Result<Box<dyn WeatherProvider>> {
    config.validate()?;
    let client = ProxyClient::new(config.client_config())?;
    Ok(Box::new(client))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn validate_city_trims() {
        assert_eq!(validate_city("  New York ").unwrap(), "New York");
    }

    #[test]
    fn validate_city_rejects_blank() {
        for city in ["", "   ", "\t\n"] {
            assert!(validate_city(city).unwrap_err().is_invalid_city(), "{city:?}");
        }
    }

    #[test]
    fn validate_city_length_bounds() {
        assert!(validate_city(&"a".repeat(MAX_CITY_LEN)).is_ok());
        assert!(validate_city(&"a".repeat(MAX_CITY_LEN + 1)).is_err());
        // Surrounding whitespace does not count.
        assert!(validate_city(&format!("  {}  ", "a".repeat(MAX_CITY_LEN))).is_ok());
    }

    #[test]
    fn validate_city_counts_characters_not_bytes() {
        let city = "é".repeat(MAX_CITY_LEN);
        assert!(city.len() > MAX_CITY_LEN);
        assert!(validate_city(&city).is_ok());
    }

    #[test]
    fn provider_from_config_rejects_invalid_config() {
        let cfg = Config { backend_url: "localhost".into(), ..Config::default() };
        let err = provider_from_config(&cfg).unwrap_err();
        assert!(err.to_string().contains("Invalid backend_url"));
    }

    #[test]
    fn provider_from_config_works_with_defaults() {
        assert!(provider_from_config(&Config::default()).is_ok());
    }
}

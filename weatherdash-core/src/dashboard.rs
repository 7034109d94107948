//! Application state for one dashboard session.
//!
//! The dashboard owns what is on screen (current conditions, forecast), the
//! loaded preferences and the history service. The weather provider and the
//! history manager stay stateless; the dashboard passes them what they need.

use std::sync::Arc;

use crate::{
    error::WeatherError,
    format::sanitize_input,
    history::HistoryManager,
    model::{CurrentWeather, ForecastDay, HistoryEntry, Unit},
    preferences::Preferences,
    provider::{WeatherProvider, validate_city},
    store::LocalStore,
};

/// A search that has been issued but not yet applied.
///
/// Tickets increase monotonically per dashboard. Only the result of the most
/// recently issued ticket is applied; older ones are reported as superseded.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SearchTicket {
    pub seq: u64,
    pub city: String,
    pub unit: Unit,
}

#[derive(Debug, Clone, PartialEq)]
pub enum SearchOutcome {
    /// The result is now the displayed weather and has been added to history.
    Applied(CurrentWeather),
    /// A newer search was issued while this one was in flight.
    Superseded,
}

#[derive(Debug)]
pub struct Dashboard {
    provider: Arc<dyn WeatherProvider>,
    store: LocalStore,
    history: HistoryManager,
    preferences: Preferences,
    last_issued: u64,
    current: Option<CurrentWeather>,
    forecast: Option<Vec<ForecastDay>>,
}

impl Dashboard {
    /// Loads preferences from `store` once; later changes are written back.
    pub fn new(provider: Arc<dyn WeatherProvider>, store: LocalStore) -> Self {
        let preferences = Preferences::load(&store);
        tracing::debug!(
            unit = %preferences.unit,
            last_city = ?preferences.last_city,
            "loaded preferences"
        );

        Self {
            provider,
            history: HistoryManager::new(store.clone()),
            store,
            preferences,
            last_issued: 0,
            current: None,
            forecast: None,
        }
    }

    pub fn provider(&self) -> Arc<dyn WeatherProvider> {
        Arc::clone(&self.provider)
    }

    pub fn unit(&self) -> Unit {
        self.preferences.unit
    }

    pub fn last_city(&self) -> Option<&str> {
        self.preferences.last_city.as_deref()
    }

    pub fn current(&self) -> Option<&CurrentWeather> {
        self.current.as_ref()
    }

    pub fn forecast(&self) -> Option<&[ForecastDay]> {
        self.forecast.as_deref()
    }

    /// Sanitizes and validates `raw_city`, then issues a new ticket that
    /// supersedes every earlier one.
    pub fn begin_search(&mut self, raw_city: &str) -> Result<SearchTicket, WeatherError> {
        let sanitized = sanitize_input(raw_city);
        let city = validate_city(&sanitized)?.to_string();

        self.last_issued += 1;
        Ok(SearchTicket { seq: self.last_issued, city, unit: self.preferences.unit })
    }

    /// Applies the result of `ticket`'s fetch if it is still the latest search.
    ///
    /// Superseded tickets are dropped whatever their result, so a slow failing
    /// search cannot replace a newer one either.
    pub fn finish_search(
        &mut self,
        ticket: SearchTicket,
        result: Result<CurrentWeather, WeatherError>,
    ) -> Result<SearchOutcome, WeatherError> {
        if ticket.seq != self.last_issued {
            tracing::warn!(
                city = %ticket.city,
                seq = ticket.seq,
                latest = self.last_issued,
                "discarding result of superseded search"
            );
            return Ok(SearchOutcome::Superseded);
        }

        let weather = result?;
        self.history.record(&weather, ticket.unit);
        self.preferences.set_last_city(&self.store, &ticket.city);
        self.current = Some(weather.clone());
        self.forecast = None;
        Ok(SearchOutcome::Applied(weather))
    }

    /// Fetches current conditions for `raw_city` and records the search.
    pub async fn search(&mut self, raw_city: &str) -> Result<SearchOutcome, WeatherError> {
        let ticket = self.begin_search(raw_city)?;
        let result = self.provider.fetch_current(&ticket.city, ticket.unit).await;
        self.finish_search(ticket, result)
    }

    /// Fetches the forecast for `city`, falling back to the last searched city.
    pub async fn load_forecast(
        &mut self,
        city: Option<&str>,
    ) -> Result<&[ForecastDay], WeatherError> {
        let city = match city {
            Some(c) => sanitize_input(c),
            None => self.preferences.last_city.clone().unwrap_or_default(),
        };
        let city = validate_city(&city)?;

        let days = self.provider.fetch_forecast(city, self.preferences.unit).await?;
        tracing::debug!(city, days = days.len(), "loaded forecast");
        let days: &[ForecastDay] = self.forecast.insert(days);
        Ok(days)
    }

    /// Persists the new unit. When weather is on display it is fetched again
    /// in the new unit and the outcome of that search is returned.
    pub async fn change_unit(&mut self, unit: Unit) -> Result<Option<SearchOutcome>, WeatherError> {
        self.preferences.set_unit(&self.store, unit);

        let city = match (&self.current, &self.preferences.last_city) {
            (Some(_), Some(city)) => city.clone(),
            _ => return Ok(None),
        };
        self.search(&city).await.map(Some)
    }

    pub fn history(&self) -> Vec<HistoryEntry> {
        self.history.list()
    }

    pub fn clear_history(&self) {
        self.history.clear();
    }

    /// Probes the backend; any failure counts as unavailable.
    pub async fn backend_available(&self) -> bool {
        match self.provider.check_health().await {
            Ok(healthy) => healthy,
            Err(e) => {
                tracing::warn!(error = %e, "backend health check failed");
                false
            }
        }
    }
}

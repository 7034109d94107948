use chrono::Utc;
use uuid::Uuid;

use crate::{
    model::{CurrentWeather, HistoryEntry, Unit},
    store::{HISTORY_KEY, LocalStore},
};

/// Maximum number of searches kept.
pub const HISTORY_LIMIT: usize = 20;

/// Bounded, most-recent-first log of successful searches.
///
/// Places are matched on exact, case-sensitive (city, country) strings; no
/// whitespace or diacritic folding is done, so "Zurich" and "Zürich" are two
/// entries.
#[derive(Debug, Clone)]
pub struct HistoryManager {
    store: LocalStore,
}

impl HistoryManager {
    pub fn new(store: LocalStore) -> Self {
        Self { store }
    }

    /// Prepends an entry for `weather`, replacing any earlier entry for the
    /// same place, and returns the new entry.
    pub fn record(&self, weather: &CurrentWeather, unit: Unit) -> HistoryEntry {
        let entry = HistoryEntry {
            id: Uuid::new_v4().to_string(),
            city: weather.city.clone(),
            country: weather.country.clone(),
            temperature: weather.temperature,
            description: weather.description.clone(),
            unit,
            timestamp: Utc::now(),
        };

        let mut history = self.list();
        history.retain(|item| !item.same_place(&entry.city, &entry.country));
        history.insert(0, entry.clone());
        history.truncate(HISTORY_LIMIT);

        self.store.save(HISTORY_KEY, &history);
        tracing::info!(
            city = %entry.city,
            country = %entry.country,
            len = history.len(),
            "recorded search"
        );
        entry
    }

    pub fn list(&self) -> Vec<HistoryEntry> {
        self.store.load(HISTORY_KEY, Vec::new())
    }

    pub fn clear(&self) {
        self.store.clear(HISTORY_KEY);
        tracing::info!("cleared search history");
    }
}

use serde::{Deserialize, Serialize};

use crate::{
    model::Unit,
    store::{LAST_CITY_KEY, LocalStore, SETTINGS_KEY},
};

/// Persisted settings document. Unknown fields are ignored and a missing or
/// unrecognised unit falls back to the default.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
struct Settings {
    #[serde(default, deserialize_with = "lenient_unit")]
    unit: Unit,
}

fn lenient_unit<'de, D>(deserializer: D) -> Result<Unit, D::Error>
where
    D: serde::Deserializer<'de>,
{
    let raw = Option::<serde_json::Value>::deserialize(deserializer)?;
    Ok(raw
        .as_ref()
        .and_then(serde_json::Value::as_str)
        .and_then(|s| Unit::try_from(s).ok())
        .unwrap_or_default())
}

/// Unit preference and last searched city.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Preferences {
    pub unit: Unit,
    pub last_city: Option<String>,
}

impl Preferences {
    pub fn load(store: &LocalStore) -> Self {
        let settings: Settings = store.load(SETTINGS_KEY, Settings::default());
        let last_city = store
            .load::<Option<String>>(LAST_CITY_KEY, None)
            .filter(|city| !city.trim().is_empty());

        Self { unit: settings.unit, last_city }
    }

    pub fn set_unit(&mut self, store: &LocalStore, unit: Unit) {
        self.unit = unit;
        store.save(SETTINGS_KEY, &Settings { unit });
    }

    pub fn set_last_city(&mut self, store: &LocalStore, city: &str) {
        self.last_city = Some(city.to_string());
        store.save(LAST_CITY_KEY, city);
    }
}

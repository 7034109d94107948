//! Core library for the `weatherdash` dashboard.
//!
//! This crate defines:
//! - Configuration handling
//! - The weather proxy client and its error taxonomy
//! - Local persistence of search history and preferences
//! - Display formatting and the dashboard's application state
//!
//! It is used by `weatherdash-cli`, but can also be reused by other front ends.

pub mod config;
pub mod dashboard;
pub mod error;
pub mod format;
pub mod history;
pub mod model;
pub mod preferences;
pub mod provider;
pub mod store;

pub use config::{ClientConfig, Config};
pub use dashboard::{Dashboard, SearchOutcome, SearchTicket};
pub use error::{StoreError, WeatherError};
pub use history::HistoryManager;
pub use model::{Coordinates, CurrentWeather, ForecastDay, HistoryEntry, Unit};
pub use preferences::Preferences;
pub use provider::{WeatherProvider, proxy::ProxyClient};
pub use store::{FileStore, KeyValueStore, LocalStore, MemoryStore};

use std::sync::Arc;

use anyhow::{Context, anyhow};
use clap::{Parser, Subcommand};
use inquire::{Confirm, CustomType, Text};
use weatherdash_core::{
    Config, Dashboard, SearchOutcome, Unit, WeatherError, WeatherProvider,
    provider::provider_from_config,
};

use crate::render;

/// Top-level CLI struct.
#[derive(Debug, Parser)]
#[command(name = "weatherdash", version, about = "Weather dashboard")]
pub struct Cli {
    /// Use this weather proxy URL instead of the configured one.
    #[arg(long, global = true)]
    pub backend: Option<String>,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Show current conditions for a city.
    Current {
        /// City name; defaults to the last searched city.
        city: Option<String>,

        /// Switch to this unit (and remember it) before searching.
        #[arg(long)]
        unit: Option<Unit>,
    },

    /// Show the multi-day forecast for a city.
    Forecast {
        /// City name; defaults to the last searched city.
        city: Option<String>,

        #[arg(long)]
        unit: Option<Unit>,
    },

    /// List recent searches, or clear them.
    History {
        #[arg(long)]
        clear: bool,

        /// Skip the confirmation prompt when clearing.
        #[arg(long, short)]
        yes: bool,
    },

    /// Remember the preferred unit: "metric" or "imperial".
    Unit { unit: Unit },

    /// Check whether the weather proxy is reachable.
    Health,

    /// Interactively set the proxy URL and request timeout.
    Configure,
}

impl Cli {
    pub async fn run(self) -> anyhow::Result<()> {
        let config = with_backend_override(Config::load()?, self.backend);
        execute(self.command, &config).await
    }
}

/// Applies `--backend` on top of the stored config. The stored file is not
/// validated here, so a broken URL on disk can still be overridden.
fn with_backend_override(mut config: Config, backend: Option<String>) -> Config {
    if let Some(url) = backend {
        config.backend_url = url;
    }
    config
}

fn open_dashboard(config: &Config) -> anyhow::Result<Dashboard> {
    let provider: Arc<dyn WeatherProvider> = Arc::from(provider_from_config(config)?);
    Ok(Dashboard::new(provider, config.local_store()?))
}

async fn execute(command: Command, config: &Config) -> anyhow::Result<()> {
    match command {
        Command::Current { city, unit } => {
            let mut dash = open_dashboard(config)?;
            if let Some(unit) = unit {
                dash.change_unit(unit).await.map_err(user_error)?;
            }
            let city = city_or_last(city, &dash)?;
            match dash.search(&city).await.map_err(user_error)? {
                SearchOutcome::Applied(weather) => {
                    print!("{}", render::current(&weather, dash.unit()));
                }
                SearchOutcome::Superseded => {}
            }
        }
        Command::Forecast { city, unit } => {
            let mut dash = open_dashboard(config)?;
            if let Some(unit) = unit {
                dash.change_unit(unit).await.map_err(user_error)?;
            }
            let city = city_or_last(city, &dash)?;
            let unit = dash.unit();
            let days = dash.load_forecast(Some(city.as_str())).await.map_err(user_error)?;
            print!("{}", render::forecast(&city, days, unit));
        }
        Command::History { clear: true, yes } => {
            let dash = open_dashboard(config)?;
            let confirmed = yes
                || Confirm::new("Are you sure you want to clear all search history?")
                    .with_default(false)
                    .prompt()?;
            if confirmed {
                dash.clear_history();
                println!("Search history cleared.");
            }
        }
        Command::History { clear: false, .. } => {
            let dash = open_dashboard(config)?;
            print!("{}", render::history(&dash.history()));
        }
        Command::Unit { unit } => {
            let mut dash = open_dashboard(config)?;
            dash.change_unit(unit).await.map_err(user_error)?;
            println!("Units set to {unit}.");
        }
        Command::Health => {
            let dash = open_dashboard(config)?;
            if !dash.backend_available().await {
                return Err(anyhow!(
                    "Backend server not running at {}.\n\
                     Hint: start the weather proxy or run `weatherdash configure`.",
                    config.backend_url
                ));
            }
            println!("Backend is healthy at {}.", config.backend_url);
        }
        // Needs no dashboard, so it works even when the stored config is unusable.
        Command::Configure => configure(config.clone())?,
    }

    Ok(())
}

fn city_or_last(city: Option<String>, dash: &Dashboard) -> anyhow::Result<String> {
    city.or_else(|| dash.last_city().map(str::to_string)).ok_or_else(|| {
        anyhow!(
            "No city given and no previous search.\n\
             Hint: run `weatherdash current <CITY>`."
        )
    })
}

/// Keeps the technical detail in the logs and shows the stable message.
fn user_error(err: WeatherError) -> anyhow::Error {
    tracing::debug!(error = ?err, "weather request failed");
    anyhow!("{}", err.user_message())
}

fn configure(mut config: Config) -> anyhow::Result<()> {
    config.backend_url = Text::new("Weather proxy URL:")
        .with_default(&config.backend_url)
        .prompt()?
        .trim()
        .to_string();

    config.timeout_ms = CustomType::<u64>::new("Request timeout (ms):")
        .with_default(config.timeout_ms)
        .with_error_message("Please enter a whole number of milliseconds")
        .prompt()?;

    config.save().context("Failed to save configuration")?;
    println!("Configuration saved to {}", Config::config_file_path()?.display());
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_current_with_unit() {
        let cli = Cli::try_parse_from(["weatherdash", "current", "New York", "--unit", "imperial"])
            .expect("should parse");
        match cli.command {
            Command::Current { city, unit } => {
                assert_eq!(city.as_deref(), Some("New York"));
                assert_eq!(unit, Some(Unit::Imperial));
            }
            other => panic!("unexpected command: {other:?}"),
        }
    }

    #[test]
    fn rejects_unknown_unit() {
        assert!(Cli::try_parse_from(["weatherdash", "unit", "kelvin"]).is_err());
    }

    #[test]
    fn backend_flag_is_global() {
        let cli =
            Cli::try_parse_from(["weatherdash", "health", "--backend", "http://10.0.0.2:5000"])
                .expect("should parse");
        assert_eq!(cli.backend.as_deref(), Some("http://10.0.0.2:5000"));
    }

    #[test]
    fn history_clear_flags() {
        let cli =
            Cli::try_parse_from(["weatherdash", "history", "--clear", "-y"]).expect("should parse");
        assert!(matches!(cli.command, Command::History { clear: true, yes: true }));
    }

    #[test]
    fn backend_flag_repairs_invalid_stored_config() {
        let stored = Config::from_toml("backend_url = \"localhost:5000\"\n")
            .expect("stored config should load without validation");
        assert!(open_dashboard(&stored).is_err());

        let config = with_backend_override(stored, Some("http://127.0.0.1:5000".into()));
        assert_eq!(config.backend_url, "http://127.0.0.1:5000");
        assert!(provider_from_config(&config).is_ok());
    }

    #[test]
    fn no_backend_flag_keeps_stored_url() {
        let stored = Config { backend_url: "https://wx.example.com".into(), ..Config::default() };
        let config = with_backend_override(stored, None);
        assert_eq!(config.backend_url, "https://wx.example.com");
    }

    #[test]
    fn user_error_uses_stable_message() {
        let err = user_error(WeatherError::Timeout { after: std::time::Duration::from_secs(10) });
        assert_eq!(err.to_string(), "Request timed out. Please try again.");
    }
}

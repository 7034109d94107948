//! Display formatting for weather values.
//!
//! Every function is total: absent or non-finite input yields [`PLACEHOLDER`]
//! (or a unit-suffixed variant of it) instead of an error.

use chrono::{DateTime, NaiveDate, Utc};

use crate::model::Unit;

pub const PLACEHOLDER: &str = "--";

const ICON_BASE_URL: &str = "https://openweathermap.org/img/wn";
const DEFAULT_ICON: &str = "01d";
const KNOWN_ICONS: &[&str] = &[
    "01d", "01n", "02d", "02n", "03d", "03n", "04d", "04n", "09d", "09n", "10d", "10n", "11d",
    "11n", "13d", "13n", "50d", "50n",
];

const COMPASS_POINTS: [&str; 16] = [
    "N", "NNE", "NE", "ENE", "E", "ESE", "SE", "SSE", "S", "SSW", "SW", "WSW", "W", "WNW", "NW",
    "NNW",
];

fn finite(value: Option<f64>) -> Option<f64> {
    value.filter(|v| v.is_finite())
}

// Halves round up toward positive infinity; casting drops the sign of a
// rounded negative zero.
fn rounded(value: f64) -> i64 {
    (value + 0.5).floor() as i64
}

/// `21.6` in metric becomes `"22°C"`.
pub fn temperature(value: Option<f64>, unit: Unit) -> String {
    match finite(value) {
        Some(v) => format!("{}{}", rounded(v), unit.temperature_symbol()),
        None => PLACEHOLDER.to_string(),
    }
}

pub fn wind_speed(value: Option<f64>, unit: Unit) -> String {
    match finite(value) {
        Some(v) => format!("{} {}", rounded(v), unit.wind_speed_label()),
        None => PLACEHOLDER.to_string(),
    }
}

/// Pressure arrives from the proxy already converted to inches of mercury.
pub fn pressure(value: Option<f64>) -> String {
    match finite(value) {
        Some(v) => format!("{v:.2} inHg"),
        None => format!("{PLACEHOLDER} inHg"),
    }
}

/// Meters in, kilometers out.
pub fn visibility(meters: Option<f64>) -> String {
    match finite(meters) {
        Some(v) => format!("{:.1} km", v / 1000.0),
        None => PLACEHOLDER.to_string(),
    }
}

pub fn humidity(percent: Option<u8>) -> String {
    match percent {
        Some(p) => format!("{p}%"),
        None => format!("{PLACEHOLDER}%"),
    }
}

pub fn wind_direction(degrees: Option<f64>) -> String {
    let Some(deg) = finite(degrees) else {
        return PLACEHOLDER.to_string();
    };
    let normalized = deg.rem_euclid(360.0);
    let index = ((normalized / 22.5).round() as usize) % COMPASS_POINTS.len();
    COMPASS_POINTS[index].to_string()
}

/// Long form, e.g. `"Monday, January 1, 2024"`.
pub fn date(value: Option<DateTime<Utc>>) -> String {
    match value {
        Some(dt) => dt.format("%A, %B %-d, %Y").to_string(),
        None => PLACEHOLDER.to_string(),
    }
}

/// Forecast card label, e.g. `"Mon, Jan 1"`.
pub fn short_date(day: NaiveDate) -> String {
    day.format("%a, %b %-d").to_string()
}

/// Two-digit 12-hour clock, e.g. `"02:05 PM"`.
pub fn time(value: Option<DateTime<Utc>>) -> String {
    match value {
        Some(dt) => dt.format("%I:%M %p").to_string(),
        None => PLACEHOLDER.to_string(),
    }
}

/// Upper-cases the first letter of each space-separated word and lower-cases the rest.
pub fn capitalize(text: &str) -> String {
    text.split(' ')
        .map(|word| {
            let mut chars = word.chars();
            match chars.next() {
                Some(first) => first
                    .to_uppercase()
                    .chain(chars.flat_map(char::to_lowercase))
                    .collect::<String>(),
                None => String::new(),
            }
        })
        .collect::<Vec<String>>()
        .join(" ")
}

pub fn icon_url(code: &str) -> String {
    let code = if KNOWN_ICONS.contains(&code) { code } else { DEFAULT_ICON };
    format!("{ICON_BASE_URL}/{code}@2x.png")
}

/// Trims and strips angle brackets from raw user input.
pub fn sanitize_input(input: &str) -> String {
    input.trim().chars().filter(|c| !matches!(c, '<' | '>')).collect()
}

//! Converts the proxy's `data` payloads into [`CurrentWeather`] and
//! [`ForecastDay`] values.
//!
//! Every field is read independently with a fallback, so a missing or
//! wrongly typed field degrades that field only and never fails the request.

use chrono::{DateTime, NaiveDate, NaiveDateTime, Utc};
use serde_json::Value;

use crate::model::{Coordinates, CurrentWeather, ForecastDay};

const DEFAULT_ICON: &str = "01d";

pub fn current_weather(data: &Value, now: DateTime<Utc>) -> CurrentWeather {
    CurrentWeather {
        city: text(data, "city"),
        country: text(data, "country"),
        temperature: number(data, "temperature"),
        feels_like: number(data, "feelsLike"),
        humidity: percent(data, "humidity"),
        pressure: number(data, "pressure"),
        visibility: number(data, "visibility"),
        wind_speed: number(data, "windSpeed"),
        wind_direction: number(data, "windDirection"),
        description: text(data, "description"),
        main: text(data, "main"),
        icon: icon(data),
        sunrise: instant(data, "sunrise"),
        sunset: instant(data, "sunset"),
        observed_at: instant(data, "timestamp").unwrap_or(now),
        coordinates: coordinates(data),
    }
}

/// Anything other than a JSON array yields no days.
pub fn forecast(data: &Value, today: NaiveDate) -> Vec<ForecastDay> {
    let Some(days) = data.as_array() else {
        return Vec::new();
    };

    days.iter()
        .map(|day| ForecastDay {
            date: instant(day, "date").map(|dt| dt.date_naive()).unwrap_or(today),
            temperature: number(day, "temperature"),
            description: text(day, "description"),
            main: text(day, "main"),
            icon: icon(day),
            items: day.get("items").and_then(Value::as_array).cloned().unwrap_or_default(),
        })
        .collect()
}

/// Accepts RFC 3339, naive ISO-8601 (taken as UTC), a bare date, RFC 2822 /
/// HTTP-date strings, or integer epoch milliseconds.
pub fn parse_instant(value: &Value) -> Option<DateTime<Utc>> {
    match value {
        Value::Number(n) => n.as_i64().and_then(DateTime::from_timestamp_millis),
        Value::String(s) => parse_instant_str(s.trim()),
        _ => None,
    }
}

fn parse_instant_str(s: &str) -> Option<DateTime<Utc>> {
    if s.is_empty() {
        return None;
    }
    if let Ok(dt) = DateTime::parse_from_rfc3339(s) {
        return Some(dt.with_timezone(&Utc));
    }
    if let Ok(ndt) = NaiveDateTime::parse_from_str(s, "%Y-%m-%dT%H:%M:%S%.f") {
        return Some(ndt.and_utc());
    }
    if let Ok(date) = NaiveDate::parse_from_str(s, "%Y-%m-%d") {
        return date.and_hms_opt(0, 0, 0).map(|ndt| ndt.and_utc());
    }
    DateTime::parse_from_rfc2822(s).ok().map(|dt| dt.with_timezone(&Utc))
}

fn text(data: &Value, key: &str) -> String {
    data.get(key).and_then(Value::as_str).unwrap_or_default().to_string()
}

fn icon(data: &Value) -> String {
    match data.get("icon").and_then(Value::as_str) {
        Some(code) if !code.is_empty() => code.to_string(),
        _ => DEFAULT_ICON.to_string(),
    }
}

fn number(data: &Value, key: &str) -> Option<f64> {
    data.get(key).and_then(Value::as_f64).filter(|v| v.is_finite())
}

fn percent(data: &Value, key: &str) -> Option<u8> {
    number(data, key).filter(|v| (0.0..=100.0).contains(v)).map(|v| v.round() as u8)
}

fn instant(data: &Value, key: &str) -> Option<DateTime<Utc>> {
    data.get(key).and_then(parse_instant)
}

fn coordinates(data: &Value) -> Option<Coordinates> {
    let coord = data.get("coord")?;
    Some(Coordinates { lat: number(coord, "lat")?, lon: number(coord, "lon")? })
}

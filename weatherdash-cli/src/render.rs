//! Plain-text views of dashboard data.

use std::fmt::Write;

use chrono::Utc;
use weatherdash_core::{CurrentWeather, ForecastDay, HistoryEntry, Unit, format};

fn or_placeholder(text: &str) -> &str {
    if text.is_empty() { format::PLACEHOLDER } else { text }
}

pub fn current(weather: &CurrentWeather, unit: Unit) -> String {
    let mut out = String::new();

    let _ = writeln!(
        out,
        "{}, {}",
        or_placeholder(&weather.city),
        or_placeholder(&weather.country)
    );
    let _ = writeln!(out, "{}", format::date(Some(Utc::now())));
    let _ = writeln!(out);
    let _ = writeln!(
        out,
        "  {}  {}",
        format::temperature(weather.temperature, unit),
        or_placeholder(&format::capitalize(&weather.description))
    );
    let _ = writeln!(out);

    let rows = [
        ("Feels like", format::temperature(weather.feels_like, unit)),
        ("Humidity", format::humidity(weather.humidity)),
        (
            "Wind",
            format!(
                "{} {}",
                format::wind_speed(weather.wind_speed, unit),
                format::wind_direction(weather.wind_direction)
            ),
        ),
        ("Pressure", format::pressure(weather.pressure)),
        ("Visibility", format::visibility(weather.visibility)),
        ("Sunrise", format::time(weather.sunrise)),
        ("Sunset", format::time(weather.sunset)),
    ];
    for (label, value) in rows {
        let _ = writeln!(out, "  {label:<11} {value}");
    }

    let _ = writeln!(out);
    let _ = writeln!(out, "  Icon: {}", format::icon_url(&weather.icon));
    out
}

pub fn forecast(city: &str, days: &[ForecastDay], unit: Unit) -> String {
    if days.is_empty() {
        return "No forecast data available.\n".to_string();
    }

    let mut out = String::new();
    let _ = writeln!(out, "Forecast for {city}");
    for day in days {
        let _ = writeln!(
            out,
            "  {:<12} {:>6}  {}",
            format::short_date(day.date),
            format::temperature(day.temperature, unit),
            or_placeholder(&format::capitalize(&day.description))
        );
    }
    out
}

pub fn history(entries: &[HistoryEntry]) -> String {
    if entries.is_empty() {
        return "No search history yet.\n".to_string();
    }

    let mut out = String::new();
    for entry in entries {
        let place = format!("{}, {}", entry.city, entry.country);
        let _ = writeln!(
            out,
            "  {:<28} {:>6}  {} {}",
            place,
            format::temperature(entry.temperature, entry.unit),
            format::short_date(entry.timestamp.date_naive()),
            format::time(Some(entry.timestamp))
        );
    }
    out
}

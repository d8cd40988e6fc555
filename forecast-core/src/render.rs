//! Reducer and text projection of the view state.

use chrono::NaiveDate;

use crate::{
    error::{FetchError, WidgetError},
    model::{DailyRecord, ForecastDay, ProviderResponse, ViewState},
};

/// Shown when nothing has been loaded yet.
pub const EMPTY_PLACEHOLDER: &str = "No weather data available.";

/// Map the outcome of one query onto the next view state.
pub fn reduce(result: Result<ProviderResponse, WidgetError>) -> ViewState {
    let response = match result {
        Ok(response) => response,
        Err(err) => return ViewState::Error { message: err.user_message() },
    };

    let (city_name, records) = response.into_parts();
    let mut days = parse_days(records).into_iter();
    match days.next() {
        Some(current) => ViewState::Loaded { city_name, current, forecast: days.collect() },
        // ProviderResponse never holds zero records.
        None => ViewState::Error { message: FetchError::NoData.to_string() },
    }
}

pub fn parse_days(records: Vec<DailyRecord>) -> Vec<ForecastDay> {
    records.into_iter().map(ForecastDay::from).collect()
}

/// Long English weekday name, e.g. "Monday".
pub fn weekday_name(date: NaiveDate) -> String {
    date.format("%A").to_string()
}

/// Floors to whole degrees: 23.9 → "23°C".
pub fn format_temperature(celsius: f64) -> String {
    format!("{}°C", celsius.floor() as i64)
}

/// Exactly one decimal: 5 → "5.0". Exact ties round away from zero, so
/// 6.25 → "6.3".
pub fn format_wind_speed(kmh: f64) -> String {
    // `{:.1}` breaks ties to even. A double sits exactly on a tie only when
    // it is an odd number of quarters; those are scaled and rounded exactly.
    let quarters = kmh * 4.0;
    if quarters.fract() == 0.0 && quarters % 2.0 != 0.0 {
        return format!("{:.1}", (kmh * 10.0).round() / 10.0);
    }
    format!("{kmh:.1}")
}

/// Observable output for a view state, one display line per entry.
pub fn render_lines(state: &ViewState) -> Vec<String> {
    match state {
        ViewState::Empty => vec![EMPTY_PLACEHOLDER.to_string()],
        ViewState::Error { message } => vec![message.clone()],
        ViewState::Loaded { city_name, current, forecast } => {
            let mut lines = vec![
                city_name.clone(),
                format!(
                    "{}  {}",
                    format_temperature(current.temperature()),
                    current.description()
                ),
                format!("Humidity: {}%", current.humidity()),
                format!("Wind Speed: {} km/hr", format_wind_speed(current.wind_speed())),
            ];

            if !forecast.is_empty() {
                lines.push(String::new());
            }
            lines.extend(forecast.iter().map(forecast_line));
            lines
        }
    }
}

pub fn render(state: &ViewState) -> String {
    render_lines(state).join("\n")
}

fn forecast_line(day: &ForecastDay) -> String {
    format!(
        "{}  {:<9}  {:>5}  {}  Humidity: {}%  Wind Speed: {} km/hr",
        day.date(),
        day.weekday(),
        format_temperature(day.temperature()),
        day.description(),
        day.humidity(),
        format_wind_speed(day.wind_speed()),
    )
}

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::fmt;

use crate::{error::FetchError, render::weekday_name};

/// A trimmed, non-empty city name. Only `query::submit_query` builds one.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Query(String);

impl Query {
    pub(crate) fn new_unchecked(city: String) -> Self {
        Self(city)
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for Query {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// One entry of the provider's `data` array, as received.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct DailyRecord {
    pub temp: f64,
    pub rh: f64,
    pub wind_spd: f64,
    pub valid_date: NaiveDate,
    pub weather: RecordWeather,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct RecordWeather {
    pub description: String,
    pub icon: String,
}

/// A successful provider answer. Always holds at least one daily record.
#[derive(Debug, Clone, PartialEq)]
pub struct ProviderResponse {
    city_name: String,
    days: Vec<DailyRecord>,
}

impl ProviderResponse {
    /// Fails with [`FetchError::NoData`] when `days` is empty.
    pub fn new(city_name: impl Into<String>, days: Vec<DailyRecord>) -> Result<Self, FetchError> {
        if days.is_empty() {
            return Err(FetchError::NoData);
        }
        Ok(Self { city_name: city_name.into(), days })
    }

    pub fn city_name(&self) -> &str {
        &self.city_name
    }

    pub fn days(&self) -> &[DailyRecord] {
        &self.days
    }

    pub fn into_parts(self) -> (String, Vec<DailyRecord>) {
        (self.city_name, self.days)
    }
}

/// A parsed day of weather, temperature in °C and wind in km/h.
///
/// Only built from a [`DailyRecord`]; read-only afterwards.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ForecastDay {
    date: NaiveDate,
    temperature: f64,
    humidity: u8,
    wind_speed: f64,
    description: String,
    icon_code: String,
}

impl ForecastDay {
    pub fn date(&self) -> NaiveDate {
        self.date
    }

    pub fn temperature(&self) -> f64 {
        self.temperature
    }

    /// Relative humidity, 0–100.
    pub fn humidity(&self) -> u8 {
        self.humidity
    }

    pub fn wind_speed(&self) -> f64 {
        self.wind_speed
    }

    pub fn description(&self) -> &str {
        &self.description
    }

    pub fn icon_code(&self) -> &str {
        &self.icon_code
    }

    pub fn weekday(&self) -> String {
        weekday_name(self.date)
    }
}

impl From<DailyRecord> for ForecastDay {
    fn from(record: DailyRecord) -> Self {
        Self {
            date: record.valid_date,
            temperature: record.temp,
            humidity: record.rh.round().clamp(0.0, 100.0) as u8,
            wind_speed: record.wind_spd,
            description: record.weather.description,
            icon_code: record.weather.icon,
        }
    }
}

/// What the widget currently displays. Replaced wholesale, never merged.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(tag = "state", rename_all = "snake_case")]
pub enum ViewState {
    #[default]
    Empty,
    Loaded {
        city_name: String,
        /// First provider entry, treated as today.
        current: ForecastDay,
        /// Remaining entries, in provider order.
        forecast: Vec<ForecastDay>,
    },
    Error {
        message: String,
    },
}

impl ViewState {
    pub fn is_loaded(&self) -> bool {
        matches!(self, Self::Loaded { .. })
    }

    pub fn error_message(&self) -> Option<&str> {
        match self {
            Self::Error { message } => Some(message),
            _ => None,
        }
    }
}

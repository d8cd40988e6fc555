//! Core library for the `forecast` widget.
//!
//! This crate defines:
//! - Query intake and validation
//! - The forecast provider abstraction and the Weatherbit client
//! - The view-state reducer and its text rendering
//! - Configuration & credentials handling
//!
//! It is used by `forecast-cli`, but has no terminal I/O of its own.

pub mod config;
pub mod error;
pub mod model;
pub mod provider;
pub mod query;
pub mod render;
pub mod widget;

pub use config::Config;
pub use error::{ConfigError, FetchError, ValidationError, WidgetError};
pub use model::{DailyRecord, ForecastDay, ProviderResponse, Query, ViewState};
pub use provider::{ForecastProvider, WeatherbitProvider};
pub use query::submit_query;
pub use render::{reduce, render, weekday_name};
pub use widget::{CompletedFetch, ForecastWidget, PendingFetch, RequestId};

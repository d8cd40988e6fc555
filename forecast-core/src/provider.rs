use async_trait::async_trait;
use std::fmt::Debug;

use crate::{
    error::FetchError,
    model::{ProviderResponse, Query},
};

pub mod weatherbit;

pub use weatherbit::WeatherbitProvider;

/// Number of days requested from the provider, today included.
pub const FORECAST_HORIZON_DAYS: u8 = 7;

/// The single outbound seam: one query in, one classified outcome out.
///
/// Implementations issue exactly one request per call and never retry.
#[async_trait]
pub trait ForecastProvider: Send + Sync + Debug {
    async fn fetch_forecast(&self, query: &Query) -> Result<ProviderResponse, FetchError>;
}

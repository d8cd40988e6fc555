use async_trait::async_trait;
use reqwest::{Client, Url};
use serde::Deserialize;
use tracing::{debug, instrument, warn};

use crate::{
    config::Config,
    error::{ConfigError, FetchError},
    model::{DailyRecord, ProviderResponse, Query},
};

use super::{FORECAST_HORIZON_DAYS, ForecastProvider};

/// Weatherbit daily forecast client.
#[derive(Debug, Clone)]
pub struct WeatherbitProvider {
    api_key: Option<String>,
    base_url: String,
    http: Client,
}

impl WeatherbitProvider {
    /// A missing key is accepted here and reported on the first fetch.
    pub fn new(config: &Config) -> Self {
        Self {
            api_key: config.api_key().map(str::to_owned),
            base_url: config.base_url.clone(),
            http: Client::new(),
        }
    }

    /// `{base_url}?city=..&key=..&days=7`
    fn forecast_url(&self, query: &Query) -> Result<Url, FetchError> {
        let key = self.api_key.as_deref().ok_or(ConfigError::MissingKey)?;
        let days = FORECAST_HORIZON_DAYS.to_string();

        Url::parse_with_params(
            &self.base_url,
            &[("city", query.as_str()), ("key", key), ("days", days.as_str())],
        )
        .map_err(|_| ConfigError::InvalidBaseUrl(self.base_url.clone()).into())
    }
}

#[derive(Debug, Deserialize)]
struct WbForecastResponse {
    #[serde(default)]
    city_name: String,
    #[serde(default)]
    data: Option<Vec<DailyRecord>>,
}

#[async_trait]
impl ForecastProvider for WeatherbitProvider {
    #[instrument(skip_all, fields(city = %query))]
    async fn fetch_forecast(&self, query: &Query) -> Result<ProviderResponse, FetchError> {
        let url = self.forecast_url(query)?;

        let res = self.http.get(url).send().await.map_err(FetchError::network)?;

        let status = res.status();
        if !status.is_success() {
            warn!(%status, "Weatherbit request failed");
            return Err(FetchError::Http(status.as_u16()));
        }

        let body = res.text().await.map_err(FetchError::network)?;

        // Unknown cities come back as 204 with no body.
        if body.trim().is_empty() {
            debug!(%status, "Weatherbit returned an empty body");
            return Err(FetchError::NoData);
        }

        let parsed: WbForecastResponse = serde_json::from_str(&body).map_err(|e| {
            warn!(error = %e, "Failed to parse Weatherbit forecast JSON");
            FetchError::Decode { detail: e.to_string() }
        })?;

        let days = parsed.data.unwrap_or_default();
        debug!(days = days.len(), city_name = %parsed.city_name, "Weatherbit forecast received");

        ProviderResponse::new(parsed.city_name, days)
    }
}

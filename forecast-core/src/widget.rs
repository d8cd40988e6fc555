//! The forecast widget: a single-owner [`ViewState`] driven by queries.
//!
//! Every submission gets a fresh [`RequestId`]. A completed fetch is applied
//! only if its id is still the latest one issued, so a slow earlier response
//! can never overwrite the result of a later search. Blank submissions also
//! advance the id, which discards anything still in flight.

use std::sync::Arc;
use tracing::debug;

use crate::{
    error::{FetchError, WidgetError},
    model::{ProviderResponse, Query, ViewState},
    provider::ForecastProvider,
    query::submit_query,
    render::reduce,
};

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct RequestId(u64);

impl RequestId {
    fn next(self) -> Self {
        Self(self.0 + 1)
    }
}

/// A validated query waiting to be sent.
#[derive(Debug, Clone)]
pub struct PendingFetch {
    id: RequestId,
    query: Query,
}

impl PendingFetch {
    pub fn id(&self) -> RequestId {
        self.id
    }

    pub fn query(&self) -> &Query {
        &self.query
    }

    /// Perform the fetch. Does not touch any widget state, so it can run on
    /// another task.
    pub async fn run(self, provider: &dyn ForecastProvider) -> CompletedFetch {
        let result = provider.fetch_forecast(&self.query).await;
        CompletedFetch { id: self.id, result }
    }
}

#[derive(Debug)]
pub struct CompletedFetch {
    pub id: RequestId,
    pub result: Result<ProviderResponse, FetchError>,
}

#[derive(Debug)]
pub struct ForecastWidget {
    provider: Arc<dyn ForecastProvider>,
    default_city: String,
    state: ViewState,
    latest: RequestId,
}

impl ForecastWidget {
    pub fn new(provider: Arc<dyn ForecastProvider>, default_city: impl Into<String>) -> Self {
        Self {
            provider,
            default_city: default_city.into(),
            state: ViewState::Empty,
            latest: RequestId::default(),
        }
    }

    pub fn state(&self) -> &ViewState {
        &self.state
    }

    pub fn default_city(&self) -> &str {
        &self.default_city
    }

    pub fn provider(&self) -> Arc<dyn ForecastProvider> {
        Arc::clone(&self.provider)
    }

    /// Accept raw input. Blank input replaces the state with the validation
    /// error immediately and returns `None`; otherwise the returned fetch is
    /// the only one whose result will be applied.
    pub fn submit(&mut self, raw: &str) -> Option<PendingFetch> {
        self.latest = self.latest.next();

        match submit_query(raw) {
            Ok(query) => {
                debug!(id = self.latest.0, city = %query, "query accepted");
                Some(PendingFetch { id: self.latest, query })
            }
            Err(err) => {
                debug!(id = self.latest.0, "query rejected");
                self.state = reduce(Err(WidgetError::from(err)));
                None
            }
        }
    }

    /// Apply a finished fetch. Returns `false` when it was superseded.
    pub fn complete(&mut self, done: CompletedFetch) -> bool {
        if done.id != self.latest {
            debug!(id = done.id.0, latest = self.latest.0, "dropping stale response");
            return false;
        }
        self.state = reduce(done.result.map_err(WidgetError::from));
        true
    }

    /// Submit and fetch in one step.
    pub async fn search(&mut self, raw: &str) -> &ViewState {
        if let Some(pending) = self.submit(raw) {
            let provider = self.provider();
            let done = pending.run(provider.as_ref()).await;
            self.complete(done);
        }
        &self.state
    }

    /// Initial load for the configured default city.
    pub async fn load_default(&mut self) -> &ViewState {
        let city = self.default_city.clone();
        self.search(&city).await
    }
}

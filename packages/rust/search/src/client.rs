//! Fail-soft client for a Serper-compatible search API.

use std::sync::Arc;
use std::time::Duration;

use futures::future::join_all;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use tokio::sync::Semaphore;
use tracing::{debug, instrument, warn};

use dmfinder_shared::{DmfinderError, Hit, Result, SearchConfig, SearchResult};

/// User-Agent string for search requests.
const USER_AGENT: &str = concat!("dmfinder/", env!("CARGO_PKG_VERSION"));

/// Request body sent to the provider.
#[derive(Debug, Serialize)]
struct SearchRequest<'a> {
    q: &'a str,
    gl: &'a str,
    autocorrect: bool,
    num: u32,
}

/// The parts of the provider response we read.
#[derive(Debug, Deserialize)]
struct SearchResponse {
    /// Decoded entry by entry so one malformed hit cannot drop its siblings.
    #[serde(default)]
    organic: Vec<serde_json::Value>,
    #[serde(default, rename = "searchParameters")]
    search_parameters: Option<SearchParameters>,
}

#[derive(Debug, Deserialize)]
struct SearchParameters {
    #[serde(default)]
    q: Option<String>,
}

/// Search client shared by every company pipeline in a run.
///
/// Cloning is cheap: clones share the connection pool and the in-flight
/// request budget.
#[derive(Clone)]
pub struct SearchClient {
    client: Client,
    endpoint: String,
    api_key: String,
    country: String,
    results_per_query: u32,
    in_flight: Arc<Semaphore>,
}

impl SearchClient {
    /// Build a client from config. `max_in_flight` caps concurrent requests
    /// across all clones.
    pub fn new(
        config: &SearchConfig,
        api_key: impl Into<String>,
        max_in_flight: usize,
    ) -> Result<Self> {
        let client = Client::builder()
            .user_agent(USER_AGENT)
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()
            .map_err(|e| DmfinderError::Network(format!("failed to build HTTP client: {e}")))?;

        Ok(Self {
            client,
            endpoint: config.endpoint.clone(),
            api_key: api_key.into(),
            country: config.country.clone(),
            results_per_query: config.results_per_query,
            in_flight: Arc::new(Semaphore::new(max_in_flight.max(1))),
        })
    }

    /// Run one query. Never fails: any provider or transport problem is
    /// logged and yields an empty result that keeps the query.
    #[instrument(skip(self), fields(hits = tracing::field::Empty))]
    pub async fn search(&self, query: &str) -> SearchResult {
        let result = match self.try_search(query).await {
            Ok(result) => result,
            Err(e) => {
                warn!(error = %e, "search failed, continuing with no hits");
                SearchResult::empty(query)
            }
        };
        tracing::Span::current().record("hits", result.hits.len());
        result
    }

    /// Run all queries concurrently; results come back in query order.
    pub async fn search_all(&self, queries: &[String]) -> Vec<SearchResult> {
        join_all(queries.iter().map(|q| self.search(q))).await
    }

    async fn try_search(&self, query: &str) -> Result<SearchResult> {
        let _permit = self
            .in_flight
            .acquire()
            .await
            .map_err(|e| DmfinderError::Network(format!("search budget closed: {e}")))?;

        let body = SearchRequest {
            q: query,
            gl: &self.country,
            autocorrect: false,
            num: self.results_per_query,
        };

        let response = self
            .client
            .post(&self.endpoint)
            .header("X-API-KEY", &self.api_key)
            .json(&body)
            .send()
            .await
            .map_err(|e| DmfinderError::Network(format!("search request failed: {e}")))?;

        let status = response.status();
        if !status.is_success() {
            return Err(DmfinderError::Network(format!("search API returned HTTP {status}")));
        }

        let parsed: SearchResponse = response
            .json()
            .await
            .map_err(|e| DmfinderError::parse(format!("invalid search response: {e}")))?;

        let total = parsed.organic.len();
        let hits: Vec<Hit> = parsed
            .organic
            .into_iter()
            .filter_map(|entry| match Hit::deserialize(entry) {
                Ok(hit) => Some(hit),
                Err(e) => {
                    debug!(error = %e, "dropping malformed search hit");
                    None
                }
            })
            .collect();
        debug!(total, hits = hits.len(), "search response received");

        let echoed = parsed.search_parameters.and_then(|p| p.q);
        Ok(SearchResult {
            query: echoed.unwrap_or_else(|| query.to_string()),
            hits,
        })
    }
}

//! HTTP client for the catalog service that answers candidate queries.
//!
//! Each [`FetchStrategy`] maps to one GET request under the base URL. Responses
//! are decoded record by record; a malformed record is logged and skipped so it
//! cannot take the rest of its source down with it.

use std::time::Duration;

use reqwest::{Client, Url};
use shopslot_core::Candidate;

use crate::error::CatalogError;
use crate::strategy::FetchStrategy;
use crate::types::CandidatePayload;

/// Client for the catalog's candidate endpoints.
///
/// Use [`CatalogClient::new`] with the configured base URL; tests point it at a
/// wiremock server the same way.
#[derive(Debug, Clone)]
pub struct CatalogClient {
    client: Client,
    base_url: Url,
    fetch_timeout: Duration,
}

impl CatalogClient {
    /// Creates a client with a per-request timeout and `User-Agent`.
    ///
    /// # Errors
    ///
    /// Returns [`CatalogError::Http`] if the underlying `reqwest::Client`
    /// cannot be constructed, or [`CatalogError::InvalidBaseUrl`] if
    /// `base_url` does not parse.
    pub fn new(base_url: &str, timeout_ms: u64, user_agent: &str) -> Result<Self, CatalogError> {
        let fetch_timeout = Duration::from_millis(timeout_ms);
        let client = Client::builder()
            .timeout(fetch_timeout)
            .connect_timeout(fetch_timeout)
            .user_agent(user_agent)
            .build()?;

        // Exactly one trailing slash, so `join` appends instead of replacing
        // the last path segment.
        let normalised = format!("{}/", base_url.trim().trim_end_matches('/'));
        let parsed = Url::parse(&normalised).map_err(|e| CatalogError::InvalidBaseUrl {
            base_url: base_url.to_owned(),
            reason: e.to_string(),
        })?;
        if parsed.cannot_be_a_base() {
            return Err(CatalogError::InvalidBaseUrl {
                base_url: base_url.to_owned(),
                reason: "URL cannot be used as a base".to_string(),
            });
        }

        Ok(Self {
            client,
            base_url: parsed,
            fetch_timeout,
        })
    }

    /// Budget for a single strategy fetch.
    #[must_use]
    pub fn fetch_timeout(&self) -> Duration {
        self.fetch_timeout
    }

    /// Builds the request URL for a strategy.
    ///
    /// # Errors
    ///
    /// Returns [`CatalogError::InvalidBaseUrl`] if the strategy path cannot
    /// be joined onto the base URL.
    pub fn strategy_url(&self, strategy: &FetchStrategy) -> Result<Url, CatalogError> {
        let mut url =
            self.base_url
                .join(strategy.path())
                .map_err(|e| CatalogError::InvalidBaseUrl {
                    base_url: self.base_url.to_string(),
                    reason: e.to_string(),
                })?;
        url.query_pairs_mut().extend_pairs(strategy.query_pairs());
        Ok(url)
    }

    /// Runs one strategy query and returns its candidates in response order.
    ///
    /// # Errors
    ///
    /// - [`CatalogError::Http`] on network failure or client-side timeout.
    /// - [`CatalogError::UnexpectedStatus`] on any non-2xx status.
    /// - [`CatalogError::Deserialize`] if the body is not a candidate list.
    pub async fn fetch(&self, strategy: &FetchStrategy) -> Result<Vec<Candidate>, CatalogError> {
        let url = self.strategy_url(strategy)?;

        let response = self
            .client
            .get(url.clone())
            .header(reqwest::header::ACCEPT, "application/json")
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            return Err(CatalogError::UnexpectedStatus {
                status: status.as_u16(),
                url: url.to_string(),
            });
        }

        let body = response.text().await?;
        let payload = serde_json::from_str::<CandidatePayload>(&body).map_err(|e| {
            CatalogError::Deserialize {
                context: format!("{strategy} response from {url}"),
                source: e,
            }
        })?;

        Ok(decode_records(strategy, payload.into_records()))
    }
}

fn decode_records(strategy: &FetchStrategy, records: Vec<serde_json::Value>) -> Vec<Candidate> {
    records
        .into_iter()
        .enumerate()
        .filter_map(
            |(index, record)| match serde_json::from_value::<Candidate>(record) {
                Ok(candidate) => Some(candidate),
                Err(e) => {
                    tracing::warn!(
                        source = %strategy,
                        index,
                        error = %e,
                        "skipping malformed candidate record"
                    );
                    None
                }
            },
        )
        .collect()
}

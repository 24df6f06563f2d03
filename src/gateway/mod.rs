//! Post-list gateway.
//!
//! This module issues the platform's fixed GraphQL posts query and normalizes
//! the result into [`ItemDescriptor`]s. The query shape is owned by the
//! remote service; the only caller-controlled input is how many posts to take.
//!
//! The pipeline depends on the [`PostSource`] trait rather than on
//! [`GraphqlGateway`] directly, so other sources can feed the same download
//! and packaging steps.

mod error;
mod response;

use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client;
use tracing::{debug, info, instrument, warn};

use crate::http::{ClientTimeouts, build_client};
use crate::item::ItemDescriptor;
use response::{QueryRequest, QueryResponse, QueryVariables};

pub use error::GatewayError;

/// Default GraphQL endpoint of the platform.
pub const DEFAULT_ENDPOINT: &str = "https://api.impakt.com/graphql";

/// Smallest number of posts a run may request.
pub const MIN_POST_COUNT: u32 = 1;

/// Largest number of posts a run may request.
pub const MAX_POST_COUNT: u32 = 100;

/// Timeout for the posts query.
const GATEWAY_TIMEOUT_SECS: u64 = 30;

/// Newest posts with an upload attached, newest first.
const POSTS_QUERY: &str = r"
query Posts($take: Int!) {
    posts(where: { uploadId: { gt: 0 } }, orderBy: [{ createdAt: Desc }], take: $take) {
        items {
            Media {
                ext
                url
            }
            Creator {
                username
            }
        }
    }
}
";

/// Source of item descriptors for an export run.
#[async_trait]
pub trait PostSource: Send + Sync {
    /// Fetches up to `count` item descriptors.
    ///
    /// An empty list is a valid answer and distinct from an error.
    ///
    /// # Errors
    ///
    /// Returns [`GatewayError`] when the count is out of range or the
    /// source cannot be queried.
    async fn fetch_posts(&self, count: u32) -> Result<Vec<ItemDescriptor>, GatewayError>;
}

/// Validates a requested post count against `MIN_POST_COUNT..=MAX_POST_COUNT`.
///
/// # Errors
///
/// Returns [`GatewayError::InvalidCount`] for out-of-range values.
pub fn validate_count(count: u32) -> Result<u32, GatewayError> {
    if (MIN_POST_COUNT..=MAX_POST_COUNT).contains(&count) {
        Ok(count)
    } else {
        Err(GatewayError::InvalidCount { count })
    }
}

/// GraphQL client for the platform's posts query.
#[derive(Debug, Clone)]
pub struct GraphqlGateway {
    client: Client,
    endpoint: String,
}

impl GraphqlGateway {
    /// Creates a gateway for `endpoint` with the default query timeout.
    ///
    /// # Errors
    ///
    /// Returns [`GatewayError::Client`] if the HTTP client cannot be built.
    pub fn new(endpoint: impl Into<String>) -> Result<Self, GatewayError> {
        Self::with_timeout(endpoint, Duration::from_secs(GATEWAY_TIMEOUT_SECS))
    }

    /// Creates a gateway with an explicit timeout for the whole query.
    ///
    /// # Errors
    ///
    /// Returns [`GatewayError::Client`] if the HTTP client cannot be built.
    pub fn with_timeout(
        endpoint: impl Into<String>,
        timeout: Duration,
    ) -> Result<Self, GatewayError> {
        let client = build_client(ClientTimeouts::Total(timeout)).map_err(GatewayError::Client)?;
        Ok(Self {
            client,
            endpoint: endpoint.into(),
        })
    }

    /// The GraphQL endpoint this gateway queries.
    #[must_use]
    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }
}

#[async_trait]
impl PostSource for GraphqlGateway {
    #[instrument(skip(self), fields(endpoint = %self.endpoint))]
    async fn fetch_posts(&self, count: u32) -> Result<Vec<ItemDescriptor>, GatewayError> {
        let take = validate_count(count)?;
        let request = QueryRequest {
            query: POSTS_QUERY,
            variables: QueryVariables { take },
        };

        debug!(take, "querying posts");
        let response = self
            .client
            .post(&self.endpoint)
            .json(&request)
            .send()
            .await
            .map_err(|e| GatewayError::from_reqwest(&self.endpoint, e))?;

        let status = response.status();
        if !status.is_success() {
            return Err(GatewayError::http_status(&self.endpoint, status.as_u16()));
        }

        let body = response
            .bytes()
            .await
            .map_err(|e| GatewayError::from_reqwest(&self.endpoint, e))?;
        let parsed: QueryResponse =
            serde_json::from_slice(&body).map_err(|source| GatewayError::InvalidResponse {
                endpoint: self.endpoint.clone(),
                source,
            })?;

        let items = normalize_response(&self.endpoint, parsed, take)?;
        info!(count = items.len(), requested = take, "fetched posts");
        Ok(items)
    }
}

/// Flattens the GraphQL document into descriptors, keeping at most `take`.
fn normalize_response(
    endpoint: &str,
    response: QueryResponse,
    take: u32,
) -> Result<Vec<ItemDescriptor>, GatewayError> {
    let errors = response.errors.unwrap_or_default();
    let raw_items = response
        .data
        .and_then(|data| data.posts)
        .and_then(|page| page.items);

    let raw_items = match raw_items {
        Some(items) => {
            if !errors.is_empty() {
                warn!(errors = errors.len(), "query returned partial data with errors");
            }
            items
        }
        None if errors.is_empty() => return Ok(Vec::new()),
        None => {
            let message = errors
                .iter()
                .map(|e| e.message.as_str())
                .collect::<Vec<_>>()
                .join("; ");
            return Err(GatewayError::Query {
                endpoint: endpoint.to_string(),
                message,
            });
        }
    };
    let limit = usize::try_from(take).unwrap_or(usize::MAX);

    let items = raw_items
        .into_iter()
        .filter_map(|raw| {
            let media = raw.media?;
            let username = raw.creator.and_then(|c| c.username).unwrap_or_default();
            let descriptor =
                ItemDescriptor::new(media.url.unwrap_or_default(), media.ext.as_deref(), username);
            if descriptor.is_none() {
                warn!("skipping post without a media URL");
            }
            descriptor
        })
        .take(limit)
        .collect();

    Ok(items)
}

//! Error types for the post-list gateway.

use thiserror::Error;

use super::{MAX_POST_COUNT, MIN_POST_COUNT};

/// Errors that can occur while fetching the post list.
///
/// Every variant is fatal for an export run: no downloads start.
#[derive(Debug, Error)]
pub enum GatewayError {
    /// Requested post count outside the accepted range.
    #[error("invalid post count {count}: must be between {MIN_POST_COUNT} and {MAX_POST_COUNT}")]
    InvalidCount {
        /// The rejected count.
        count: u32,
    },

    /// The HTTP client could not be constructed.
    #[error("failed to build HTTP client: {0}")]
    Client(#[source] reqwest::Error),

    /// Network-level error talking to the endpoint.
    #[error("network error querying {endpoint}: {source}")]
    Network {
        /// GraphQL endpoint.
        endpoint: String,
        /// The underlying network error.
        #[source]
        source: reqwest::Error,
    },

    /// The query timed out.
    #[error("timeout querying {endpoint}")]
    Timeout {
        /// GraphQL endpoint.
        endpoint: String,
    },

    /// The endpoint answered with a non-success status.
    #[error("HTTP {status} from {endpoint}")]
    HttpStatus {
        /// GraphQL endpoint.
        endpoint: String,
        /// The HTTP status code.
        status: u16,
    },

    /// The response body was not the expected JSON document.
    #[error("invalid response from {endpoint}: {source}")]
    InvalidResponse {
        /// GraphQL endpoint.
        endpoint: String,
        /// The JSON decoding error.
        #[source]
        source: serde_json::Error,
    },

    /// The query was rejected and no data came back.
    #[error("query rejected by {endpoint}: {message}")]
    Query {
        /// GraphQL endpoint.
        endpoint: String,
        /// Joined GraphQL error messages.
        message: String,
    },
}

impl GatewayError {
    /// Creates a network or timeout error from a reqwest error.
    pub fn from_reqwest(endpoint: impl Into<String>, source: reqwest::Error) -> Self {
        if source.is_timeout() {
            Self::Timeout {
                endpoint: endpoint.into(),
            }
        } else {
            Self::Network {
                endpoint: endpoint.into(),
                source,
            }
        }
    }

    /// Creates an HTTP status error.
    pub fn http_status(endpoint: impl Into<String>, status: u16) -> Self {
        Self::HttpStatus {
            endpoint: endpoint.into(),
            status,
        }
    }
}

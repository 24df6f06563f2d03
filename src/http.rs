//! Shared reqwest client construction for the gateway and the media fetcher.

use std::time::Duration;

use reqwest::Client;

use crate::user_agent;

/// Timeouts applied to one HTTP client.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum ClientTimeouts {
    /// Bound on the whole request, body included. Used for small JSON calls.
    Total(Duration),
    /// Bound on connecting and on each individual read. Used for streamed
    /// bodies whose total duration depends on file size.
    PerRead(Duration),
}

/// Builds a reqwest client with the project User-Agent and gzip support.
pub(crate) fn build_client(timeouts: ClientTimeouts) -> Result<Client, reqwest::Error> {
    let builder = Client::builder()
        .gzip(true)
        .user_agent(user_agent::default_user_agent());
    let builder = match timeouts {
        ClientTimeouts::Total(timeout) => builder.connect_timeout(timeout).timeout(timeout),
        ClientTimeouts::PerRead(timeout) => builder.connect_timeout(timeout).read_timeout(timeout),
    };
    builder.build()
}

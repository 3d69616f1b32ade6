//! # GitHub Driver
//!
//! Webhook parsing for GitHub deliveries and a REST client implementing the
//! full service set against the GitHub v3 API.
//!
//! Deliveries are signed with HMAC over the raw body. `X-Hub-Signature-256`
//! (`sha256=<hex>`) is preferred; the legacy `X-Hub-Signature` (`sha1=<hex>`)
//! is accepted when the SHA-256 header is absent.

mod content;
mod git;
mod issue;
mod pull_request;
mod repository;
mod user;
mod webhook;
pub(crate) mod wire;

pub use webhook::{
    GithubWebhookParser, DELIVERY_HEADER, EVENT_HEADER, SIGNATURE_256_HEADER, SIGNATURE_HEADER,
};

use crate::client::{ClientConfig, HttpTransport};
use crate::error::ApiError;

const ACCEPT: &str = "application/vnd.github+json";

/// REST client for the GitHub API.
///
/// Implements every service trait in [`crate::service`].
#[derive(Debug, Clone)]
pub struct GithubClient {
    transport: HttpTransport,
}

impl GithubClient {
    /// Create a client for `config`.
    ///
    /// # Errors
    ///
    /// Returns `ApiError::HttpClientError` if the HTTP client cannot be built.
    pub fn new(config: ClientConfig) -> Result<Self, ApiError> {
        Ok(Self {
            transport: HttpTransport::new(config, ACCEPT)?,
        })
    }
}

/// Append `opts` to a path that may already carry a query string.
fn with_page(path: &str, opts: &crate::pagination::ListOptions) -> String {
    let separator = if path.contains('?') { '&' } else { '?' };
    format!("{}{}{}", path, separator, opts.to_query())
}

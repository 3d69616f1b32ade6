//! Raw webhook request data.

use bytes::Bytes;
use std::collections::HashMap;
use tokio::io::{AsyncRead, AsyncReadExt};

use crate::error::WebhookError;

/// Upper bound on the number of body bytes a parser will ever look at.
///
/// Bytes past this limit are dropped before decoding.
pub const MAX_BODY_SIZE: usize = 10_000_000;

/// Headers, query parameters and bounded body of an incoming webhook.
///
/// Header names are matched case-insensitively.
///
/// # Examples
///
/// ```rust
/// use scm_bridge::WebhookRequest;
///
/// let request = WebhookRequest::new(
///     [("X-Gitea-Event", "push")],
///     b"{}".to_vec(),
/// )
/// .with_query("secret=s3cr3t");
///
/// assert_eq!(request.header("x-gitea-event"), Some("push"));
/// assert_eq!(request.form_value("secret"), Some("s3cr3t".to_string()));
/// ```
#[derive(Debug, Clone, Default)]
pub struct WebhookRequest {
    headers: HashMap<String, String>,
    query: Vec<(String, String)>,
    body: Bytes,
}

impl WebhookRequest {
    /// Create a request from headers and an in-memory body.
    ///
    /// The body is truncated to [`MAX_BODY_SIZE`] bytes.
    pub fn new<I, K, V>(headers: I, body: impl Into<Bytes>) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: AsRef<str>,
        V: Into<String>,
    {
        let mut body: Bytes = body.into();
        body.truncate(MAX_BODY_SIZE);
        Self {
            headers: normalize_headers(headers),
            query: Vec::new(),
            body,
        }
    }

    /// Create a request by reading at most [`MAX_BODY_SIZE`] bytes from `reader`.
    ///
    /// # Errors
    ///
    /// Returns `WebhookError::Body` if reading fails.
    pub async fn from_reader<I, K, V, R>(headers: I, reader: R) -> Result<Self, WebhookError>
    where
        I: IntoIterator<Item = (K, V)>,
        K: AsRef<str>,
        V: Into<String>,
        R: AsyncRead + Unpin,
    {
        let mut body = Vec::new();
        reader
            .take(MAX_BODY_SIZE as u64)
            .read_to_end(&mut body)
            .await
            .map_err(WebhookError::Body)?;

        Ok(Self {
            headers: normalize_headers(headers),
            query: Vec::new(),
            body: Bytes::from(body),
        })
    }

    /// Attach a URL query string (`a=1&b=2`, without the leading `?`).
    pub fn with_query(mut self, query: &str) -> Self {
        self.query = url::form_urlencoded::parse(query.trim_start_matches('?').as_bytes())
            .into_owned()
            .collect();
        self
    }

    /// Case-insensitive header lookup.
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers
            .get(&name.to_ascii_lowercase())
            .map(String::as_str)
    }

    /// Header value, treating an empty value as absent.
    pub fn non_empty_header(&self, name: &str) -> Option<&str> {
        self.header(name).filter(|v| !v.is_empty())
    }

    /// A form value from the query string, or from a
    /// `application/x-www-form-urlencoded` body.
    pub fn form_value(&self, name: &str) -> Option<String> {
        if let Some((_, value)) = self.query.iter().find(|(k, _)| k == name) {
            return Some(value.clone());
        }

        let is_form = self
            .header("content-type")
            .map(|ct| ct.starts_with("application/x-www-form-urlencoded"))
            .unwrap_or(false);
        if !is_form {
            return None;
        }

        url::form_urlencoded::parse(&self.body)
            .find(|(k, _)| k == name)
            .map(|(_, v)| v.into_owned())
    }

    pub fn body(&self) -> &[u8] {
        &self.body
    }
}

fn normalize_headers<I, K, V>(headers: I) -> HashMap<String, String>
where
    I: IntoIterator<Item = (K, V)>,
    K: AsRef<str>,
    V: Into<String>,
{
    headers
        .into_iter()
        .map(|(k, v)| (k.as_ref().to_ascii_lowercase(), v.into()))
        .collect()
}

#[cfg(test)]
#[path = "request_tests.rs"]
mod tests;

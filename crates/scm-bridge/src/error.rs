//! Error types for webhook parsing and provider API operations.
//!
//! Errors carry enough classification for callers to decide between
//! rejecting a delivery, retrying it, or alerting on it.

use thiserror::Error;

use crate::model::Webhook;

/// Broad classification of an error, used for logging and HTTP mapping.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorCategory {
    /// Temporary failure, retry may succeed
    Transient,
    /// Permanent failure, do not retry
    Permanent,
    /// Authenticity failure
    Security,
}

/// Errors produced while turning a webhook request into a canonical [`Webhook`].
///
/// Two variants carry the decoded but unverified hook so callers can log
/// or audit a rejected delivery. Never treat that hook as trusted.
#[derive(Debug, Error)]
pub enum WebhookError {
    /// The event signal named an event kind this driver does not handle.
    #[error("Unknown webhook event: {event}")]
    UnknownEvent { event: String },

    /// The signature or token did not authenticate the payload.
    #[error("Invalid webhook signature")]
    SignatureInvalid { hook: Box<Webhook> },

    /// The payload was not valid JSON for the expected event shape.
    #[error("Failed to decode webhook payload: {0}")]
    Decode(#[from] serde_json::Error),

    /// The payload decoded but is structurally unusable.
    #[error("Malformed webhook payload: {message}")]
    MalformedPayload { message: String },

    /// Reading the request body failed.
    #[error("Failed to read webhook body: {0}")]
    Body(#[source] std::io::Error),

    /// The secret resolver failed.
    #[error("Secret resolution failed: {source}")]
    Secret {
        #[source]
        source: SecretError,
        hook: Box<Webhook>,
    },
}

impl WebhookError {
    /// The decoded, unverified hook carried by this error, if any.
    pub fn hook(&self) -> Option<&Webhook> {
        match self {
            Self::SignatureInvalid { hook } | Self::Secret { hook, .. } => Some(hook),
            _ => None,
        }
    }

    /// Consume the error, returning the unverified hook if present.
    pub fn into_hook(self) -> Option<Webhook> {
        match self {
            Self::SignatureInvalid { hook } | Self::Secret { hook, .. } => Some(*hook),
            _ => None,
        }
    }

    /// Check if this error represents a transient condition that may succeed if retried.
    ///
    /// Only secret-store outages and body read failures are transient; a bad
    /// payload or signature stays bad no matter how often it is replayed.
    pub fn is_transient(&self) -> bool {
        match self {
            Self::UnknownEvent { .. } => false,
            Self::SignatureInvalid { .. } => false,
            Self::Decode(_) => false,
            Self::MalformedPayload { .. } => false,
            Self::Body(_) => true,
            Self::Secret { source, .. } => source.is_transient(),
        }
    }

    /// Alias for `is_transient()` to support different retry policy conventions.
    pub fn should_retry(&self) -> bool {
        self.is_transient()
    }

    /// Get error category for logging and HTTP mapping.
    pub fn error_category(&self) -> ErrorCategory {
        match self {
            Self::SignatureInvalid { .. } => ErrorCategory::Security,
            Self::Secret {
                source: SecretError::NotFound { .. },
                ..
            } => ErrorCategory::Security,
            _ if self.is_transient() => ErrorCategory::Transient,
            _ => ErrorCategory::Permanent,
        }
    }

    /// HTTP status code a receiving endpoint should answer with.
    pub fn status_code(&self) -> u16 {
        match self {
            Self::UnknownEvent { .. } => 400,
            Self::Decode(_) => 400,
            Self::MalformedPayload { .. } => 400,
            Self::SignatureInvalid { .. } => 401,
            Self::Secret {
                source: SecretError::NotFound { .. },
                ..
            } => 401,
            Self::Secret { .. } => 500,
            Self::Body(_) => 500,
        }
    }
}

/// Errors returned by a [`SecretResolver`](crate::webhook::SecretResolver).
#[derive(Debug, Error)]
pub enum SecretError {
    /// No secret is configured for the hook's repository.
    #[error("Secret not found: {key}")]
    NotFound { key: String },

    /// Access to the secret was denied due to permissions.
    #[error("Access denied to secret: {key}")]
    AccessDenied { key: String },

    /// The secret storage provider is unavailable (retryable).
    #[error("Secret provider unavailable: {0}")]
    ProviderUnavailable(String),
}

impl SecretError {
    /// Only `ProviderUnavailable` is considered transient.
    pub fn is_transient(&self) -> bool {
        matches!(self, Self::ProviderUnavailable(_))
    }
}

/// Errors during provider API operations.
///
/// These errors represent failures when talking to a provider's REST API,
/// including HTTP errors and response parsing failures.
#[derive(Debug, Error)]
pub enum ApiError {
    /// HTTP error response from the provider.
    #[error("HTTP error: {status} - {message}")]
    HttpError { status: u16, message: String },

    /// Request to the provider timed out.
    #[error("Request timeout")]
    Timeout,

    /// The request was invalid (client error).
    #[error("Invalid request: {message}")]
    InvalidRequest { message: String },

    /// Authentication to the provider failed.
    #[error("Authentication failed")]
    AuthenticationFailed,

    /// Authorization check failed (insufficient permissions).
    #[error("Authorization failed")]
    AuthorizationFailed,

    /// The requested resource was not found.
    #[error("Resource not found")]
    NotFound,

    /// The driver has no implementation for the requested service.
    #[error("{service} is not supported by the {driver} driver")]
    NotSupported {
        driver: String,
        service: &'static str,
    },

    /// Failed to parse a JSON response.
    #[error("JSON parsing error: {0}")]
    JsonError(#[from] serde_json::Error),

    /// HTTP client error (network, TLS, etc.).
    #[error("HTTP client error: {0}")]
    HttpClientError(#[from] reqwest::Error),
}

impl ApiError {
    /// Check if this error represents a transient condition that may succeed if retried.
    ///
    /// Transient conditions include:
    /// - Server errors (5xx)
    /// - Rate limiting (429)
    /// - Request timeouts
    /// - Network/transport errors
    pub fn is_transient(&self) -> bool {
        match self {
            Self::HttpError { status, .. } => *status >= 500 || *status == 429,
            Self::Timeout => true,
            Self::InvalidRequest { .. } => false,
            Self::AuthenticationFailed => false,
            Self::AuthorizationFailed => false,
            Self::NotFound => false,
            Self::NotSupported { .. } => false,
            Self::JsonError(_) => false,
            Self::HttpClientError(e) => !e.is_decode(),
        }
    }
}

#[cfg(test)]
#[path = "error_tests.rs"]
mod tests;

//! # Webhook Parsing
//!
//! Every driver implements [`WebhookParser`]. The provided
//! [`WebhookParser::parse`] method runs the shared pipeline:
//!
//! 1. Read the bounded body ([`WebhookRequest`] enforces [`MAX_BODY_SIZE`])
//! 2. Dispatch on the provider's event signal, or fail with `UnknownEvent`
//! 3. Decode the provider payload and normalise it into a [`Webhook`]
//! 4. Ask the [`SecretResolver`] for a key, passing the unverified hook
//! 5. An empty key means "skip verification" and the hook is returned
//! 6. Otherwise verify the signature or token with the driver's rules
//! 7. Return the hook, or `SignatureInvalid` carrying it
//!
//! Drivers only supply steps 2, 3 and 6.

mod request;
mod secret;

pub use request::{WebhookRequest, MAX_BODY_SIZE};
pub use secret::{SecretResolver, StaticSecret};

use async_trait::async_trait;
use tracing::{debug, info, instrument, warn};

use crate::drivers::Driver;
use crate::error::WebhookError;
use crate::hmac::{self, HashAlgorithm};
use crate::model::Webhook;

/// A normalised hook plus any secret the provider transmitted in-band.
///
/// Some providers (Gitea) can send the shared secret inside the payload
/// instead of signing it. The parser keeps that value here so the
/// verification step can compare it to the resolved key.
#[derive(Clone)]
pub struct DecodedHook {
    pub hook: Webhook,
    pub embedded_secret: Option<String>,
}

impl DecodedHook {
    pub fn new(hook: Webhook) -> Self {
        Self {
            hook,
            embedded_secret: None,
        }
    }

    pub fn with_embedded_secret(mut self, secret: Option<String>) -> Self {
        self.embedded_secret = secret.filter(|s| !s.is_empty());
        self
    }
}

// Security: Don't expose secrets in debug output
impl std::fmt::Debug for DecodedHook {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DecodedHook")
            .field("hook", &self.hook.kind())
            .field(
                "embedded_secret",
                &self.embedded_secret.as_ref().map(|_| "<REDACTED>"),
            )
            .finish()
    }
}

/// Provider-specific webhook parsing.
#[async_trait]
pub trait WebhookParser: Send + Sync {
    /// Driver this parser belongs to.
    fn driver(&self) -> Driver;

    /// Dispatch on the event signal and normalise the payload.
    ///
    /// # Errors
    ///
    /// - `WebhookError::UnknownEvent` for event kinds the driver does not handle
    /// - `WebhookError::Decode` / `MalformedPayload` for unusable payloads
    fn decode(&self, request: &WebhookRequest) -> Result<DecodedHook, WebhookError>;

    /// Check the request's signature or token against `key`.
    ///
    /// Only called with a non-empty key. Any missing or malformed signature
    /// is `false`.
    async fn verify(&self, request: &WebhookRequest, decoded: &DecodedHook, key: &str) -> bool;

    /// Run the full parse pipeline.
    ///
    /// # Errors
    ///
    /// See [`WebhookError`]. `SignatureInvalid` and `Secret` carry the
    /// unverified hook.
    #[instrument(skip(self, request, secrets), fields(driver = %self.driver()))]
    async fn parse(
        &self,
        request: &WebhookRequest,
        secrets: &dyn SecretResolver,
    ) -> Result<Webhook, WebhookError> {
        let decoded = self.decode(request)?;
        debug!(kind = %decoded.hook.kind(), "Decoded webhook payload");

        let key = match secrets.resolve(&decoded.hook).await {
            Ok(key) => key,
            Err(source) => {
                warn!(
                    repository = %decoded.hook.repository().full_name,
                    error = %source,
                    "Failed to resolve webhook secret"
                );
                return Err(WebhookError::Secret {
                    source,
                    hook: Box::new(decoded.hook),
                });
            }
        };

        if key.is_empty() {
            info!(
                kind = %decoded.hook.kind(),
                repository = %decoded.hook.repository().full_name,
                "No secret configured, skipping signature verification"
            );
            return Ok(decoded.hook);
        }

        if !self.verify(request, &decoded, &key).await {
            warn!(
                kind = %decoded.hook.kind(),
                repository = %decoded.hook.repository().full_name,
                "Webhook signature verification failed"
            );
            return Err(WebhookError::SignatureInvalid {
                hook: Box::new(decoded.hook),
            });
        }

        Ok(decoded.hook)
    }
}

/// Verification for providers that either sign the payload or transmit the
/// shared secret itself.
///
/// | signature | transmitted secret | result |
/// |-----------|--------------------|--------|
/// | absent | absent | invalid |
/// | absent | present | valid iff it equals `key` |
/// | present | any | valid iff it is the hex HMAC-SHA256 of `body` |
pub(crate) fn verify_signature_or_secret(
    body: &[u8],
    signature: Option<&str>,
    transmitted_secret: Option<&str>,
    key: &str,
) -> bool {
    let signature = signature.filter(|s| !s.is_empty());
    let transmitted_secret = transmitted_secret.filter(|s| !s.is_empty());

    match (signature, transmitted_secret) {
        (Some(signature), _) => {
            hmac::validate_encoded(HashAlgorithm::Sha256, body, key.as_bytes(), signature)
        }
        (None, Some(secret)) => hmac::constant_time_eq(secret.as_bytes(), key.as_bytes()),
        (None, None) => false,
    }
}

#[cfg(test)]
#[path = "mod_tests.rs"]
mod tests;

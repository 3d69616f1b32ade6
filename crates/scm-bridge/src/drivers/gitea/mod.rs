//! # Gitea Driver
//!
//! Gitea signs deliveries with a hex HMAC-SHA256 in `X-Gitea-Signature`.
//! Older releases sent the shared secret instead, either inside the JSON
//! payload or as a `secret` form field; both are still accepted.

pub(crate) mod wire;

use async_trait::async_trait;

use crate::drivers::Driver;
use crate::error::WebhookError;
use crate::webhook::{verify_signature_or_secret, DecodedHook, WebhookParser, WebhookRequest};
use wire::{decode_event, embedded_secret, GogsEvent};

pub const EVENT_HEADER: &str = "X-Gitea-Event";
pub const SIGNATURE_HEADER: &str = "X-Gitea-Signature";

/// Webhook parser for Gitea.
#[derive(Debug, Clone, Copy, Default)]
pub struct GiteaWebhookParser;

impl GiteaWebhookParser {
    pub fn new() -> Self {
        Self
    }
}

#[async_trait]
impl WebhookParser for GiteaWebhookParser {
    fn driver(&self) -> Driver {
        Driver::Gitea
    }

    fn decode(&self, request: &WebhookRequest) -> Result<DecodedHook, WebhookError> {
        let event = request.header(EVENT_HEADER).unwrap_or_default();
        let kind = GogsEvent::from_header(event).ok_or_else(|| WebhookError::UnknownEvent {
            event: event.to_string(),
        })?;

        let hook = decode_event(kind, request.body())?;
        Ok(DecodedHook::new(hook).with_embedded_secret(embedded_secret(request.body())))
    }

    async fn verify(&self, request: &WebhookRequest, decoded: &DecodedHook, key: &str) -> bool {
        let transmitted = request
            .form_value("secret")
            .filter(|s| !s.is_empty())
            .or_else(|| decoded.embedded_secret.clone());

        verify_signature_or_secret(
            request.body(),
            request.non_empty_header(SIGNATURE_HEADER),
            transmitted.as_deref(),
            key,
        )
    }
}

#[cfg(test)]
#[path = "mod_tests.rs"]
mod tests;

//! # Gogs Driver
//!
//! Payloads are the Gitea format. Every delivery must carry a hex
//! HMAC-SHA256 of the body in `X-Gogs-Signature`.

use async_trait::async_trait;

use crate::drivers::gitea::wire::{decode_event, GogsEvent};
use crate::drivers::Driver;
use crate::error::WebhookError;
use crate::hmac::{self, HashAlgorithm};
use crate::webhook::{DecodedHook, WebhookParser, WebhookRequest};

pub const EVENT_HEADER: &str = "X-Gogs-Event";
pub const SIGNATURE_HEADER: &str = "X-Gogs-Signature";

/// Webhook parser for Gogs.
#[derive(Debug, Clone, Copy, Default)]
pub struct GogsWebhookParser;

impl GogsWebhookParser {
    pub fn new() -> Self {
        Self
    }
}

#[async_trait]
impl WebhookParser for GogsWebhookParser {
    fn driver(&self) -> Driver {
        Driver::Gogs
    }

    fn decode(&self, request: &WebhookRequest) -> Result<DecodedHook, WebhookError> {
        let event = request.header(EVENT_HEADER).unwrap_or_default();
        let kind = GogsEvent::from_header(event).ok_or_else(|| WebhookError::UnknownEvent {
            event: event.to_string(),
        })?;

        Ok(DecodedHook::new(decode_event(kind, request.body())?))
    }

    async fn verify(&self, request: &WebhookRequest, _decoded: &DecodedHook, key: &str) -> bool {
        request
            .non_empty_header(SIGNATURE_HEADER)
            .map(|signature| {
                hmac::validate_encoded(
                    HashAlgorithm::Sha256,
                    request.body(),
                    key.as_bytes(),
                    signature,
                )
            })
            .unwrap_or(false)
    }
}

#[cfg(test)]
#[path = "mod_tests.rs"]
mod tests;

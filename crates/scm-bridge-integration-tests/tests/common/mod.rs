//! Common test utilities for scm-bridge integration tests
//!
//! This module provides:
//! - Fixture loading
//! - Correctly signed deliveries for every driver
//! - Test implementations of the SNS verifier and secret resolver

use async_trait::async_trait;
use scm_bridge::drivers::codecommit::{SnsEnvelope, SnsVerifier};
use scm_bridge::hmac::{self, HashAlgorithm};
use scm_bridge::{Driver, SecretError, SecretResolver, Webhook, WebhookRequest};
use std::collections::HashMap;
use std::path::Path;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

pub const SECRET: &str = "topsecret";

// ============================================================================
// Fixtures
// ============================================================================

/// Read `tests/fixtures/<name>`.
pub fn fixture(name: &str) -> Vec<u8> {
    let path = Path::new(env!("CARGO_MANIFEST_DIR"))
        .join("tests")
        .join("fixtures")
        .join(name);
    std::fs::read(&path).unwrap_or_else(|e| panic!("fixture {}: {}", path.display(), e))
}

/// Push fixture and event header value for each driver.
pub fn push_fixture(driver: Driver) -> (&'static str, Vec<u8>) {
    match driver {
        Driver::Github => ("push", fixture("github/push.json")),
        Driver::Gitlab => ("Push Hook", fixture("gitlab/push.json")),
        Driver::Gitea => ("push", fixture("gitea/push.json")),
        Driver::Gogs => ("push", fixture("gogs/push.json")),
        Driver::Stash => ("repo:refs_changed", fixture("stash/refs_changed.json")),
        Driver::Gitee => ("Push Hook", fixture("gitee/push.json")),
        Driver::CodeCommit => ("", fixture("codecommit/notification.json")),
        Driver::Harness => ("branch_updated", fixture("harness/branch_updated.json")),
    }
}

// ============================================================================
// Requests
// ============================================================================

/// Signature header value the provider would send for `body` under `secret`.
///
/// CodeCommit has no shared-secret signature and yields `None`.
pub fn provider_signature(driver: Driver, secret: &str, body: &[u8]) -> Option<String> {
    let hex = hmac::sign_encoded(HashAlgorithm::Sha256, secret.as_bytes(), body);
    match driver {
        Driver::Github | Driver::Stash => Some(format!("sha256={}", hex)),
        Driver::Gitea | Driver::Gogs | Driver::Harness => Some(hex),
        Driver::Gitlab | Driver::Gitee => Some(secret.to_string()),
        Driver::CodeCommit => None,
    }
}

/// Request carrying only the event header.
pub fn unsigned_request(driver: Driver, event: &str, body: Vec<u8>) -> WebhookRequest {
    let mut headers = Vec::new();
    if let Some(header) = driver.event_header() {
        headers.push((header.to_string(), event.to_string()));
    }
    WebhookRequest::new(headers, body)
}

/// Request signed the way `driver` signs deliveries.
pub fn signed_request(driver: Driver, event: &str, body: Vec<u8>, secret: &str) -> WebhookRequest {
    let mut headers = Vec::new();
    if let Some(header) = driver.event_header() {
        headers.push((header.to_string(), event.to_string()));
    }
    if let (Some(header), Some(signature)) = (
        driver.signature_header(),
        provider_signature(driver, secret, &body),
    ) {
        headers.push((header.to_string(), signature));
    }
    WebhookRequest::new(headers, body)
}

/// The driver's push fixture, correctly signed with [`SECRET`].
pub fn signed_push(driver: Driver) -> WebhookRequest {
    let (event, body) = push_fixture(driver);
    signed_request(driver, event, body, SECRET)
}

// ============================================================================
// Collaborators
// ============================================================================

/// SNS verifier with a fixed answer that counts its calls.
#[derive(Default)]
pub struct FixedSnsVerifier {
    accept: bool,
    calls: AtomicUsize,
}

impl FixedSnsVerifier {
    pub fn accepting() -> Arc<Self> {
        Arc::new(Self {
            accept: true,
            calls: AtomicUsize::new(0),
        })
    }

    #[allow(dead_code)]
    pub fn rejecting() -> Arc<Self> {
        Arc::new(Self::default())
    }

    #[allow(dead_code)]
    pub fn call_count(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl SnsVerifier for FixedSnsVerifier {
    async fn verify(&self, envelope: &SnsEnvelope) -> bool {
        self.calls.fetch_add(1, Ordering::SeqCst);
        assert!(envelope.string_to_sign().starts_with("Message\n"));
        self.accept
    }
}

/// Per-repository secrets that records which repositories it was asked about.
#[derive(Default)]
#[allow(dead_code)]
pub struct RepositorySecrets {
    secrets: HashMap<String, String>,
    requested: Mutex<Vec<String>>,
}

#[allow(dead_code)]
impl RepositorySecrets {
    pub fn new<'a>(entries: impl IntoIterator<Item = (&'a str, &'a str)>) -> Self {
        Self {
            secrets: entries
                .into_iter()
                .map(|(repo, secret)| (repo.to_string(), secret.to_string()))
                .collect(),
            requested: Mutex::new(Vec::new()),
        }
    }

    pub fn requested(&self) -> Vec<String> {
        self.requested.lock().unwrap().clone()
    }
}

#[async_trait]
impl SecretResolver for RepositorySecrets {
    async fn resolve(&self, hook: &Webhook) -> Result<String, SecretError> {
        let repo = hook.repository().full_name.clone();
        self.requested.lock().unwrap().push(repo.clone());
        self.secrets
            .get(&repo)
            .cloned()
            .ok_or(SecretError::NotFound { key: repo })
    }
}

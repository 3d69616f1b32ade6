//! Secret resolution for webhook verification.
//!
//! The resolver receives the decoded (still unverified) hook so a caller can
//! look up a per-repository secret. Returning an empty string disables
//! verification for that hook.

use async_trait::async_trait;

use crate::error::SecretError;
use crate::model::Webhook;

/// Supplies the verification key for a decoded hook.
#[async_trait]
pub trait SecretResolver: Send + Sync {
    /// Resolve the key for `hook`. An empty key skips verification.
    ///
    /// # Errors
    ///
    /// Errors are propagated unchanged to the caller of `parse`.
    async fn resolve(&self, hook: &Webhook) -> Result<String, SecretError>;
}

#[async_trait]
impl<F> SecretResolver for F
where
    F: Fn(&Webhook) -> Result<String, SecretError> + Send + Sync,
{
    async fn resolve(&self, hook: &Webhook) -> Result<String, SecretError> {
        self(hook)
    }
}

/// The same secret for every hook.
#[derive(Clone, Default)]
pub struct StaticSecret {
    secret: String,
}

impl StaticSecret {
    pub fn new(secret: impl Into<String>) -> Self {
        Self {
            secret: secret.into(),
        }
    }

    /// A resolver that always skips verification.
    pub fn none() -> Self {
        Self::default()
    }
}

#[async_trait]
impl SecretResolver for StaticSecret {
    async fn resolve(&self, _hook: &Webhook) -> Result<String, SecretError> {
        Ok(self.secret.clone())
    }
}

// Security: Don't expose secrets in debug output
impl std::fmt::Debug for StaticSecret {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("StaticSecret")
            .field("secret", &"<REDACTED>")
            .finish()
    }
}

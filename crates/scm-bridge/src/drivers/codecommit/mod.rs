//! # AWS CodeCommit Driver
//!
//! CodeCommit repository triggers publish to an SNS topic, and SNS delivers
//! to the webhook endpoint. There is no event header: the SNS envelope's
//! `Message` holds the trigger document and its first reference decides the
//! event. Authenticity is the SNS message signature, checked by an
//! [`SnsVerifier`].

mod sns;

pub use sns::{SnsEnvelope, SnsVerifier};

#[cfg(test)]
pub use sns::MockSnsVerifier;

use async_trait::async_trait;
use serde::Deserialize;
use std::sync::Arc;
use tracing::warn;

use crate::drivers::lenient::{datetime, nullable};
use crate::drivers::{decode_payload, Driver};
use crate::error::WebhookError;
use crate::model::{
    is_tag, join_full_name, Action, BranchHook, Commit, PushHook, Reference, Repository,
    Signature, TagHook, User, Visibility, Webhook, BRANCH_PREFIX, TAG_PREFIX,
};
use crate::webhook::{DecodedHook, WebhookParser, WebhookRequest};

#[derive(Debug, Deserialize)]
struct TriggerDocument {
    #[serde(rename = "Records", default)]
    records: Vec<TriggerRecord>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct TriggerRecord {
    #[serde(default, deserialize_with = "nullable")]
    aws_region: String,
    #[serde(default, deserialize_with = "nullable")]
    codecommit: TriggerReferences,
    #[serde(default, deserialize_with = "nullable")]
    event_id: String,
    #[serde(rename = "eventSourceARN", default, deserialize_with = "nullable")]
    event_source_arn: String,
    #[serde(default, deserialize_with = "datetime")]
    event_time: Option<chrono::DateTime<chrono::Utc>>,
    #[serde(rename = "userIdentityARN", default, deserialize_with = "nullable")]
    user_identity_arn: String,
}

#[derive(Debug, Default, Deserialize)]
struct TriggerReferences {
    #[serde(default, deserialize_with = "nullable")]
    references: Vec<TriggerReference>,
}

#[derive(Debug, Deserialize)]
struct TriggerReference {
    #[serde(default, deserialize_with = "nullable")]
    commit: String,
    #[serde(rename = "ref")]
    reference: String,
    #[serde(default, deserialize_with = "nullable")]
    created: bool,
    #[serde(default, deserialize_with = "nullable")]
    deleted: bool,
}

/// Webhook parser for CodeCommit triggers delivered through SNS.
#[derive(Clone, Default)]
pub struct CodeCommitWebhookParser {
    verifier: Option<Arc<dyn SnsVerifier>>,
}

impl CodeCommitWebhookParser {
    /// A parser without a verifier. It rejects every delivery unless the
    /// secret resolver disables verification.
    pub fn new() -> Self {
        Self { verifier: None }
    }

    pub fn with_verifier(verifier: Arc<dyn SnsVerifier>) -> Self {
        Self {
            verifier: Some(verifier),
        }
    }
}

impl std::fmt::Debug for CodeCommitWebhookParser {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CodeCommitWebhookParser")
            .field("verifier", &self.verifier.is_some())
            .finish()
    }
}

#[async_trait]
impl WebhookParser for CodeCommitWebhookParser {
    fn driver(&self) -> Driver {
        Driver::CodeCommit
    }

    fn decode(&self, request: &WebhookRequest) -> Result<DecodedHook, WebhookError> {
        let envelope: SnsEnvelope = decode_payload(request.body())?;
        if envelope.message_type != SnsEnvelope::NOTIFICATION {
            return Err(WebhookError::UnknownEvent {
                event: envelope.message_type,
            });
        }

        let document: TriggerDocument = serde_json::from_str(&envelope.message)?;
        let record = document
            .records
            .into_iter()
            .next()
            .ok_or_else(|| malformed("trigger document without records"))?;

        Ok(DecodedHook::new(convert_record(record)?))
    }

    async fn verify(&self, request: &WebhookRequest, _decoded: &DecodedHook, _key: &str) -> bool {
        let Some(verifier) = &self.verifier else {
            warn!("No SNS verifier configured, rejecting CodeCommit delivery");
            return false;
        };

        let envelope: SnsEnvelope = match serde_json::from_slice(request.body()) {
            Ok(envelope) => envelope,
            Err(_) => return false,
        };
        if !envelope.has_supported_signature_version() || !envelope.has_trusted_cert_url() {
            return false;
        }

        verifier.verify(&envelope).await
    }
}

fn malformed(message: &str) -> WebhookError {
    WebhookError::MalformedPayload {
        message: message.to_string(),
    }
}

/// Split `arn:aws:codecommit:<region>:<account>:<name>`.
fn parse_repository_arn(arn: &str) -> Option<(&str, &str, &str)> {
    let mut parts = arn.splitn(6, ':');
    let (Some("arn"), Some(_partition), Some("codecommit")) =
        (parts.next(), parts.next(), parts.next())
    else {
        return None;
    };
    match (parts.next(), parts.next(), parts.next()) {
        (Some(region), Some(account), Some(name)) if !name.is_empty() => {
            Some((region, account, name))
        }
        _ => None,
    }
}

fn convert_repository(arn: &str, fallback_region: &str) -> Result<Repository, WebhookError> {
    let (region, account, name) =
        parse_repository_arn(arn).ok_or_else(|| malformed("invalid eventSourceARN"))?;
    let region = if region.is_empty() {
        fallback_region
    } else {
        region
    };

    Ok(Repository {
        id: arn.to_string(),
        namespace: account.to_string(),
        name: name.to_string(),
        full_name: join_full_name(account, name),
        perm: None,
        branch: String::new(),
        archived: false,
        private: true,
        visibility: Visibility::Private,
        clone: format!(
            "https://git-codecommit.{}.amazonaws.com/v1/repos/{}",
            region, name
        ),
        clone_ssh: format!(
            "ssh://git-codecommit.{}.amazonaws.com/v1/repos/{}",
            region, name
        ),
        link: format!(
            "https://{}.console.aws.amazon.com/codesuite/codecommit/repositories/{}/browse",
            region, name
        ),
        created: None,
        updated: None,
    })
}

/// The IAM identity's last path segment is its login, e.g. `user/jane`
/// is `jane` and the account root is `root`.
fn convert_identity(arn: &str) -> User {
    let resource = arn.rsplit(':').next().unwrap_or_default();
    let login = resource.rsplit('/').next().unwrap_or(resource);

    User {
        id: arn.to_string(),
        login: login.to_string(),
        name: login.to_string(),
        ..Default::default()
    }
}

fn convert_record(record: TriggerRecord) -> Result<Webhook, WebhookError> {
    let reference = record
        .codecommit
        .references
        .into_iter()
        .next()
        .ok_or_else(|| malformed("trigger record without references"))?;

    let repo = convert_repository(&record.event_source_arn, &record.aws_region)?;
    let sender = convert_identity(&record.user_identity_arn);
    let prefix = if is_tag(&reference.reference) {
        TAG_PREFIX
    } else {
        BRANCH_PREFIX
    };

    let action = if reference.created {
        Some(Action::Create)
    } else if reference.deleted {
        Some(Action::Delete)
    } else {
        None
    };

    if let Some(action) = action {
        let reference = Reference::new(&reference.reference, prefix, reference.commit);
        return Ok(if prefix == TAG_PREFIX {
            Webhook::Tag(TagHook {
                reference,
                repo,
                action,
                sender,
            })
        } else {
            Webhook::Branch(BranchHook {
                reference,
                repo,
                action,
                sender,
            })
        });
    }

    let signature = Signature {
        name: sender.name.clone(),
        email: String::new(),
        login: sender.login.clone(),
        avatar: String::new(),
        date: record.event_time,
    };

    Ok(Webhook::Push(PushHook {
        reference: Reference::new(&reference.reference, prefix, "").path,
        base_ref: String::new(),
        repo,
        before: String::new(),
        after: reference.commit.clone(),
        commit: Commit {
            sha: reference.commit,
            message: String::new(),
            committer: signature.clone(),
            author: signature,
            link: String::new(),
        },
        sender,
        commits: Vec::new(),
        guid: record.event_id,
    }))
}

#[cfg(test)]
#[path = "mod_tests.rs"]
mod tests;

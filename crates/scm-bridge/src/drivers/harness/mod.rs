//! # Harness Driver
//!
//! The trigger name arrives in `X-Harness-Trigger`. Deliveries are signed
//! with a hex HMAC-SHA256 in `X-Harness-Signature`, or carry the shared
//! secret as a `secret` form value.

mod wire;

use async_trait::async_trait;

use crate::drivers::{decode_payload, Driver};
use crate::error::WebhookError;
use crate::model::{
    Action, BranchHook, Commit, PullRequestCommentHook, PullRequestHook, PushHook, Reference,
    TagHook, Webhook, BRANCH_PREFIX, TAG_PREFIX,
};
use crate::webhook::{verify_signature_or_secret, DecodedHook, WebhookParser, WebhookRequest};
use wire::{
    convert_comment, convert_commit, convert_principal, convert_pull_request, convert_repository,
    principal_signature, HnPayload,
};

pub const EVENT_HEADER: &str = "X-Harness-Trigger";
pub const SIGNATURE_HEADER: &str = "X-Harness-Signature";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum HarnessTrigger {
    Push { prefix: &'static str },
    BranchDeleted,
    TagDeleted,
    PullRequest(Action),
    PullRequestComment,
}

impl HarnessTrigger {
    fn from_header(value: &str) -> Option<Self> {
        match value {
            "branch_created" | "branch_updated" => Some(Self::Push {
                prefix: BRANCH_PREFIX,
            }),
            "tag_created" | "tag_updated" => Some(Self::Push { prefix: TAG_PREFIX }),
            "branch_deleted" => Some(Self::BranchDeleted),
            "tag_deleted" => Some(Self::TagDeleted),
            "pullreq_created" => Some(Self::PullRequest(Action::Open)),
            "pullreq_reopened" => Some(Self::PullRequest(Action::Reopen)),
            "pullreq_branch_updated" => Some(Self::PullRequest(Action::Sync)),
            "pullreq_closed" => Some(Self::PullRequest(Action::Close)),
            "pullreq_merged" => Some(Self::PullRequest(Action::Merge)),
            "pullreq_comment_created" => Some(Self::PullRequestComment),
            _ => None,
        }
    }
}

/// Webhook parser for Harness Code.
#[derive(Debug, Clone, Copy, Default)]
pub struct HarnessWebhookParser;

impl HarnessWebhookParser {
    pub fn new() -> Self {
        Self
    }
}

#[async_trait]
impl WebhookParser for HarnessWebhookParser {
    fn driver(&self) -> Driver {
        Driver::Harness
    }

    fn decode(&self, request: &WebhookRequest) -> Result<DecodedHook, WebhookError> {
        let event = request.header(EVENT_HEADER).unwrap_or_default();
        let trigger =
            HarnessTrigger::from_header(event).ok_or_else(|| WebhookError::UnknownEvent {
                event: event.to_string(),
            })?;

        let payload: HnPayload = decode_payload(request.body())?;
        let hook = match trigger {
            HarnessTrigger::Push { prefix } => convert_push_hook(payload, prefix),
            HarnessTrigger::BranchDeleted => convert_delete_hook(payload, BRANCH_PREFIX),
            HarnessTrigger::TagDeleted => convert_delete_hook(payload, TAG_PREFIX),
            HarnessTrigger::PullRequest(action) => convert_pull_request_hook(payload, action)?,
            HarnessTrigger::PullRequestComment => convert_comment_hook(payload)?,
        };

        Ok(DecodedHook::new(hook))
    }

    async fn verify(&self, request: &WebhookRequest, _decoded: &DecodedHook, key: &str) -> bool {
        let secret = request.form_value("secret");
        verify_signature_or_secret(
            request.body(),
            request.non_empty_header(SIGNATURE_HEADER),
            secret.as_deref(),
            key,
        )
    }
}

/// Creating or updating a ref is reported as a push.
fn convert_push_hook(src: HnPayload, prefix: &str) -> Webhook {
    let sender = convert_principal(src.principal);
    let reference = Reference::new(&src.reference.name, prefix, src.sha.clone());

    let commit = match src.commit.or(src.head_commit) {
        Some(commit) => convert_commit(commit),
        None => {
            let signature = principal_signature(&sender);
            Commit {
                sha: src.sha.clone(),
                message: String::new(),
                committer: signature.clone(),
                author: signature,
                link: String::new(),
            }
        }
    };

    Webhook::Push(PushHook {
        reference: reference.path,
        base_ref: String::new(),
        repo: convert_repository(src.repo),
        before: src.old_sha,
        after: src.sha,
        commit,
        sender,
        commits: src.commits.into_iter().map(convert_commit).collect(),
        guid: String::new(),
    })
}

fn convert_delete_hook(src: HnPayload, prefix: &str) -> Webhook {
    let reference = Reference::new(&src.reference.name, prefix, src.old_sha);
    let repo = convert_repository(src.repo);
    let sender = convert_principal(src.principal);
    let action = Action::Delete;

    if prefix == TAG_PREFIX {
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
    }
}

fn missing_pull_request() -> WebhookError {
    WebhookError::MalformedPayload {
        message: "pull request trigger without pull_req".to_string(),
    }
}

fn convert_pull_request_hook(src: HnPayload, action: Action) -> Result<Webhook, WebhookError> {
    let pull_request = src.pull_req.ok_or_else(missing_pull_request)?;
    let fork = src.repo.path.clone();

    Ok(Webhook::PullRequest(PullRequestHook {
        action,
        pull_request: convert_pull_request(pull_request, &src.sha, &fork),
        repo: convert_repository(src.repo),
        sender: convert_principal(src.principal),
    }))
}

fn convert_comment_hook(src: HnPayload) -> Result<Webhook, WebhookError> {
    let pull_request = src.pull_req.ok_or_else(missing_pull_request)?;
    let comment = src.comment.ok_or_else(|| WebhookError::MalformedPayload {
        message: "comment trigger without comment".to_string(),
    })?;
    let fork = src.repo.path.clone();
    let sender = convert_principal(src.principal);

    Ok(Webhook::PullRequestComment(PullRequestCommentHook {
        action: Action::Create,
        pull_request: convert_pull_request(pull_request, &src.sha, &fork),
        repo: convert_repository(src.repo),
        comment: convert_comment(comment, sender.clone()),
        sender,
    }))
}

#[cfg(test)]
#[path = "mod_tests.rs"]
mod tests;

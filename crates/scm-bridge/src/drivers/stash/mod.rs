//! # Bitbucket Server (Stash) Driver
//!
//! Event kinds arrive in `X-Event-Key`. Signatures are `<alg>=<hex>` in
//! `X-Hub-Signature`, where `<alg>` is `sha1` or `sha256`.

mod wire;

use async_trait::async_trait;

use crate::drivers::{decode_payload, Driver};
use crate::error::WebhookError;
use crate::hmac;
use crate::model::{
    Action, BranchHook, Commit, PullRequestCommentHook, PullRequestHook, PushHook, Reference,
    TagHook, Webhook, BRANCH_PREFIX, TAG_PREFIX,
};
use crate::webhook::{DecodedHook, WebhookParser, WebhookRequest};
use wire::{
    commit_link, convert_comment, convert_pull_request, convert_repository, convert_user,
    signature, StCommentHook, StPullRequestHook, StPushHook,
};

pub const EVENT_HEADER: &str = "X-Event-Key";
pub const SIGNATURE_HEADER: &str = "X-Hub-Signature";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum StashEvent {
    RefsChanged,
    PullRequest(Action),
    Comment(Action),
}

impl StashEvent {
    fn from_header(value: &str) -> Option<Self> {
        match value {
            "repo:refs_changed" => Some(Self::RefsChanged),
            "pr:opened" => Some(Self::PullRequest(Action::Open)),
            "pr:from_ref_updated" => Some(Self::PullRequest(Action::Sync)),
            "pr:modified" => Some(Self::PullRequest(Action::Update)),
            "pr:declined" | "pr:deleted" => Some(Self::PullRequest(Action::Close)),
            "pr:merged" => Some(Self::PullRequest(Action::Merge)),
            "pr:comment:added" => Some(Self::Comment(Action::Create)),
            "pr:comment:edited" => Some(Self::Comment(Action::Edited)),
            "pr:comment:deleted" => Some(Self::Comment(Action::Delete)),
            _ => None,
        }
    }
}

/// Webhook parser for Bitbucket Server.
#[derive(Debug, Clone, Copy, Default)]
pub struct StashWebhookParser;

impl StashWebhookParser {
    pub fn new() -> Self {
        Self
    }
}

#[async_trait]
impl WebhookParser for StashWebhookParser {
    fn driver(&self) -> Driver {
        Driver::Stash
    }

    fn decode(&self, request: &WebhookRequest) -> Result<DecodedHook, WebhookError> {
        let event = request.header(EVENT_HEADER).unwrap_or_default();
        let kind = StashEvent::from_header(event).ok_or_else(|| WebhookError::UnknownEvent {
            event: event.to_string(),
        })?;

        let body = request.body();
        let hook = match kind {
            StashEvent::RefsChanged => convert_push_hook(decode_payload(body)?)?,
            StashEvent::PullRequest(action) => {
                convert_pull_request_hook(decode_payload(body)?, action)
            }
            StashEvent::Comment(action) => convert_comment_hook(decode_payload(body)?, action),
        };

        Ok(DecodedHook::new(hook))
    }

    async fn verify(&self, request: &WebhookRequest, _decoded: &DecodedHook, key: &str) -> bool {
        request
            .non_empty_header(SIGNATURE_HEADER)
            .map(|sig| hmac::validate_prefix(request.body(), key.as_bytes(), sig))
            .unwrap_or(false)
    }
}

/// Only the first change is considered. An `ADD` or `DELETE` of a branch or
/// tag is a ref event; everything else is a push.
fn convert_push_hook(src: StPushHook) -> Result<Webhook, WebhookError> {
    let change = src
        .changes
        .into_iter()
        .next()
        .ok_or_else(|| WebhookError::MalformedPayload {
            message: "refs_changed event without changes".to_string(),
        })?;

    let repo = convert_repository(src.repository);
    let sender = convert_user(src.actor);
    let path = if change.reference.id.is_empty() {
        change.ref_id.clone()
    } else {
        change.reference.id.clone()
    };
    let is_tag = change.reference.ref_type == "TAG";
    let prefix = if is_tag { TAG_PREFIX } else { BRANCH_PREFIX };

    let ref_action = match change.change_type.as_str() {
        "ADD" => Some((Action::Create, change.to_hash.clone())),
        "DELETE" => Some((Action::Delete, change.from_hash.clone())),
        _ => None,
    };

    if let Some((action, sha)) = ref_action {
        let reference = Reference::new(&path, prefix, sha);
        match change.reference.ref_type.as_str() {
            "BRANCH" => {
                return Ok(Webhook::Branch(BranchHook {
                    reference,
                    repo,
                    action,
                    sender,
                }))
            }
            "TAG" => {
                return Ok(Webhook::Tag(TagHook {
                    reference,
                    repo,
                    action,
                    sender,
                }))
            }
            _ => {}
        }
    }

    let author = signature(&sender);
    let reference = Reference::new(&path, prefix, change.to_hash.clone());

    Ok(Webhook::Push(PushHook {
        reference: reference.path,
        base_ref: String::new(),
        before: change.from_hash,
        commit: Commit {
            sha: change.to_hash.clone(),
            message: String::new(),
            committer: author.clone(),
            author,
            link: commit_link(&repo, &change.to_hash),
        },
        after: change.to_hash,
        repo,
        sender,
        commits: Vec::new(),
        guid: String::new(),
    }))
}

fn convert_pull_request_hook(src: StPullRequestHook, action: Action) -> Webhook {
    let repo = convert_repository(src.pull_request.to_ref.repository.clone());

    Webhook::PullRequest(PullRequestHook {
        action,
        repo,
        pull_request: convert_pull_request(src.pull_request),
        sender: convert_user(src.actor),
    })
}

fn convert_comment_hook(src: StCommentHook, action: Action) -> Webhook {
    let repo = convert_repository(src.pull_request.to_ref.repository.clone());

    Webhook::PullRequestComment(PullRequestCommentHook {
        action,
        repo,
        pull_request: convert_pull_request(src.pull_request),
        comment: convert_comment(src.comment),
        sender: convert_user(src.actor),
    })
}

#[cfg(test)]
#[path = "mod_tests.rs"]
mod tests;

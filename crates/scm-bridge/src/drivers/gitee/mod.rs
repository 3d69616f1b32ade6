//! # Gitee Driver
//!
//! Gitee sends either the plain webhook password in `X-Gitee-Token`, or,
//! when signing is enabled, `base64(HMAC-SHA256(key, "<timestamp>\n<key>"))`
//! with the timestamp in `X-Gitee-Timestamp`.

mod wire;

use async_trait::async_trait;
use base64::engine::general_purpose::STANDARD;
use base64::Engine as _;

use crate::drivers::{decode_payload, Driver};
use crate::error::WebhookError;
use crate::hmac::{self, HashAlgorithm};
use crate::model::{
    expand_ref, Action, BranchHook, Commit, IssueCommentHook, IssueHook, PullRequestCommentHook,
    PullRequestHook, PushHook, Reference, Signature, TagHook, Webhook, BRANCH_PREFIX, TAG_PREFIX,
};
use crate::webhook::{DecodedHook, WebhookParser, WebhookRequest};
use wire::{
    convert_comment, convert_commit, convert_issue, convert_pull_request, convert_repository,
    convert_user, is_closed_issue, GeIssueHook, GeMergeRequestHook, GeNoteHook, GePushHook,
};

pub const EVENT_HEADER: &str = "X-Gitee-Event";
pub const TOKEN_HEADER: &str = "X-Gitee-Token";
pub const TIMESTAMP_HEADER: &str = "X-Gitee-Timestamp";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum GiteeEvent {
    Push,
    TagPush,
    MergeRequest,
    Issue,
    Note,
}

impl GiteeEvent {
    fn from_header(value: &str) -> Option<Self> {
        match value {
            "Push Hook" => Some(Self::Push),
            "Tag Push Hook" => Some(Self::TagPush),
            "Merge Request Hook" => Some(Self::MergeRequest),
            "Issue Hook" => Some(Self::Issue),
            "Note Hook" => Some(Self::Note),
            _ => None,
        }
    }
}

/// Webhook parser for Gitee.
#[derive(Debug, Clone, Copy, Default)]
pub struct GiteeWebhookParser;

impl GiteeWebhookParser {
    pub fn new() -> Self {
        Self
    }
}

#[async_trait]
impl WebhookParser for GiteeWebhookParser {
    fn driver(&self) -> Driver {
        Driver::Gitee
    }

    fn decode(&self, request: &WebhookRequest) -> Result<DecodedHook, WebhookError> {
        let event = request.header(EVENT_HEADER).unwrap_or_default();
        let kind = GiteeEvent::from_header(event).ok_or_else(|| WebhookError::UnknownEvent {
            event: event.to_string(),
        })?;

        let body = request.body();
        let hook = match kind {
            GiteeEvent::Push => convert_push_hook(decode_payload(body)?, BRANCH_PREFIX),
            GiteeEvent::TagPush => convert_push_hook(decode_payload(body)?, TAG_PREFIX),
            GiteeEvent::MergeRequest => convert_merge_request_hook(decode_payload(body)?),
            GiteeEvent::Issue => convert_issue_hook(decode_payload(body)?),
            GiteeEvent::Note => convert_note_hook(decode_payload(body)?)?,
        };

        Ok(DecodedHook::new(hook))
    }

    async fn verify(&self, request: &WebhookRequest, _decoded: &DecodedHook, key: &str) -> bool {
        let Some(token) = request.non_empty_header(TOKEN_HEADER) else {
            return false;
        };

        match request.non_empty_header(TIMESTAMP_HEADER) {
            Some(timestamp) => {
                let expected = signed_token(key, timestamp);
                hmac::constant_time_eq(unescape_base64(token).as_bytes(), expected.as_bytes())
            }
            None => hmac::constant_time_eq(token.as_bytes(), key.as_bytes()),
        }
    }
}

/// The token Gitee sends for `timestamp` when signing with `key`.
pub fn signed_token(key: &str, timestamp: &str) -> String {
    let message = format!("{}\n{}", timestamp, key);
    STANDARD.encode(hmac::sign(
        HashAlgorithm::Sha256,
        key.as_bytes(),
        message.as_bytes(),
    ))
}

/// Undo URL escaping of the base64 alphabet's reserved characters.
fn unescape_base64(token: &str) -> String {
    if !token.contains('%') {
        return token.to_string();
    }
    token
        .replace("%2B", "+")
        .replace("%2b", "+")
        .replace("%2F", "/")
        .replace("%2f", "/")
        .replace("%3D", "=")
        .replace("%3d", "=")
}

fn convert_push_hook(src: GePushHook, prefix: &str) -> Webhook {
    let reference = expand_ref(&src.reference, prefix);
    let repo = convert_repository(src.repository);
    let sender = convert_user(src.sender);

    let ref_action = if src.created {
        Some((Action::Create, src.after.clone()))
    } else if src.deleted {
        Some((Action::Delete, src.before.clone()))
    } else {
        None
    };

    if let Some((action, sha)) = ref_action {
        let reference = Reference::new(&reference, prefix, sha);
        return if prefix == TAG_PREFIX {
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
        };
    }

    let head = src
        .head_commit
        .clone()
        .or_else(|| src.commits.iter().find(|c| c.id == src.after).cloned())
        .or_else(|| src.commits.last().cloned());

    let commit = match head {
        Some(commit) => convert_commit(commit),
        None => {
            let pusher = convert_user(src.pusher);
            let signature = Signature {
                name: pusher.name,
                email: pusher.email,
                login: pusher.login,
                avatar: pusher.avatar,
                date: None,
            };
            Commit {
                sha: src.after.clone(),
                message: String::new(),
                author: signature.clone(),
                committer: signature,
                link: src.compare.clone(),
            }
        }
    };

    Webhook::Push(PushHook {
        reference,
        base_ref: String::new(),
        repo,
        before: src.before,
        after: src.after,
        commit,
        sender,
        commits: src.commits.into_iter().map(convert_commit).collect(),
        guid: String::new(),
    })
}

fn merge_request_action(action: &str, action_desc: &str) -> Action {
    match action {
        "open" => Action::Open,
        "close" => Action::Close,
        "reopen" => Action::Reopen,
        "merge" => Action::Merge,
        "update" if action_desc == "source_branch_changed" => Action::Sync,
        "update" => Action::Update,
        _ => Action::Unknown,
    }
}

fn convert_merge_request_hook(src: GeMergeRequestHook) -> Webhook {
    Webhook::PullRequest(PullRequestHook {
        action: merge_request_action(&src.action, &src.action_desc),
        repo: convert_repository(src.repository),
        pull_request: convert_pull_request(src.pull_request),
        sender: convert_user(src.sender),
    })
}

/// `state_change` is reported for closing and reopening alike.
fn issue_action(action: &str, state: &str) -> Action {
    match action {
        "open" => Action::Open,
        "delete" => Action::Delete,
        "state_change" if is_closed_issue(state) => Action::Close,
        "state_change" if state == "open" => Action::Reopen,
        "state_change" | "assign" | "update" => Action::Update,
        _ => Action::Unknown,
    }
}

fn convert_issue_hook(src: GeIssueHook) -> Webhook {
    Webhook::Issue(IssueHook {
        action: issue_action(&src.action, &src.issue.state),
        repo: convert_repository(src.repository),
        issue: convert_issue(src.issue),
        sender: convert_user(src.sender),
    })
}

fn note_action(action: &str) -> Action {
    match action {
        "comment" | "" => Action::Create,
        "edited" => Action::Edited,
        "deleted" => Action::Delete,
        _ => Action::Unknown,
    }
}

fn convert_note_hook(src: GeNoteHook) -> Result<Webhook, WebhookError> {
    let action = note_action(&src.action);
    let repo = convert_repository(src.repository);
    let comment = convert_comment(src.comment);
    let sender = convert_user(src.sender);

    match (src.noteable_type.as_str(), src.pull_request, src.issue) {
        ("PullRequest", Some(pr), _) => Ok(Webhook::PullRequestComment(PullRequestCommentHook {
            action,
            repo,
            pull_request: convert_pull_request(pr),
            comment,
            sender,
        })),
        ("Issue", _, Some(issue)) => Ok(Webhook::IssueComment(IssueCommentHook {
            action,
            repo,
            issue: convert_issue(issue),
            comment,
            sender,
        })),
        ("PullRequest", None, _) | ("Issue", _, None) => Err(WebhookError::MalformedPayload {
            message: format!("{} note without its target", src.noteable_type),
        }),
        (other, _, _) => Err(WebhookError::UnknownEvent {
            event: format!("Note Hook:{}", other),
        }),
    }
}

#[cfg(test)]
#[path = "mod_tests.rs"]
mod tests;

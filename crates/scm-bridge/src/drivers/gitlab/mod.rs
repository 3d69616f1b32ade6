//! # GitLab Driver
//!
//! GitLab does not sign deliveries. The webhook's secret token is sent back
//! verbatim in `X-Gitlab-Token` and compared to the resolved key in
//! constant time.

mod wire;

use async_trait::async_trait;

use crate::drivers::{decode_payload, Driver};
use crate::error::WebhookError;
use crate::hmac;
use crate::model::{
    expand_ref, is_empty_commit, Action, BranchHook, Commit, IssueCommentHook, IssueHook,
    PullRequestCommentHook, PullRequestHook, PushHook, Reference, TagHook, User, Webhook,
    BRANCH_PREFIX, TAG_PREFIX,
};
use crate::webhook::{DecodedHook, WebhookParser, WebhookRequest};
use wire::{
    convert_commit, convert_issue, convert_merge_request, convert_note, convert_project,
    convert_user, push_sender, GlIssueHook, GlMergeRequestHook, GlNoteHook, GlPushHook,
};

pub const EVENT_HEADER: &str = "X-Gitlab-Event";
pub const TOKEN_HEADER: &str = "X-Gitlab-Token";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum GitlabEvent {
    Push,
    TagPush,
    MergeRequest,
    Issue,
    Note,
}

impl GitlabEvent {
    fn from_header(value: &str) -> Option<Self> {
        match value {
            "Push Hook" => Some(Self::Push),
            "Tag Push Hook" => Some(Self::TagPush),
            "Merge Request Hook" => Some(Self::MergeRequest),
            "Issue Hook" | "Confidential Issue Hook" => Some(Self::Issue),
            "Note Hook" | "Confidential Note Hook" => Some(Self::Note),
            _ => None,
        }
    }
}

/// Webhook parser for GitLab.
#[derive(Debug, Clone, Copy, Default)]
pub struct GitlabWebhookParser;

impl GitlabWebhookParser {
    pub fn new() -> Self {
        Self
    }
}

#[async_trait]
impl WebhookParser for GitlabWebhookParser {
    fn driver(&self) -> Driver {
        Driver::Gitlab
    }

    fn decode(&self, request: &WebhookRequest) -> Result<DecodedHook, WebhookError> {
        let event = request.header(EVENT_HEADER).unwrap_or_default();
        let kind = GitlabEvent::from_header(event).ok_or_else(|| WebhookError::UnknownEvent {
            event: event.to_string(),
        })?;

        let body = request.body();
        let hook = match kind {
            GitlabEvent::Push => convert_push_hook(decode_payload(body)?, BRANCH_PREFIX),
            GitlabEvent::TagPush => convert_push_hook(decode_payload(body)?, TAG_PREFIX),
            GitlabEvent::MergeRequest => convert_merge_request_hook(decode_payload(body)?),
            GitlabEvent::Issue => convert_issue_hook(decode_payload(body)?),
            GitlabEvent::Note => convert_note_hook(decode_payload(body)?)?,
        };

        Ok(DecodedHook::new(hook))
    }

    async fn verify(&self, request: &WebhookRequest, _decoded: &DecodedHook, key: &str) -> bool {
        request
            .non_empty_header(TOKEN_HEADER)
            .map(|token| hmac::constant_time_eq(token.as_bytes(), key.as_bytes()))
            .unwrap_or(false)
    }
}

/// A zero `before` creates the ref, a zero `after` deletes it; anything else
/// is an ordinary push.
fn convert_push_hook(src: GlPushHook, prefix: &str) -> Webhook {
    let (sender, pusher) = push_sender(&src);
    let reference = expand_ref(&src.reference, prefix);
    let repo = convert_project(src.project);

    let ref_action = if is_empty_commit(&src.before) {
        Some((Action::Create, src.after.clone()))
    } else if is_empty_commit(&src.after) {
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
        .commits
        .iter()
        .position(|c| c.id == src.after)
        .or_else(|| src.commits.len().checked_sub(1));

    let commit = match head {
        Some(index) => convert_commit(src.commits[index].clone()),
        None => Commit {
            sha: if src.checkout_sha.is_empty() {
                src.after.clone()
            } else {
                src.checkout_sha.clone()
            },
            message: String::new(),
            author: pusher.clone(),
            committer: pusher,
            link: String::new(),
        },
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

fn merge_request_action(action: &str, oldrev: &str) -> Action {
    match action {
        "open" => Action::Open,
        "close" => Action::Close,
        "reopen" => Action::Reopen,
        "merge" => Action::Merge,
        "update" if !oldrev.is_empty() => Action::Sync,
        "update" => Action::Update,
        _ => Action::Unknown,
    }
}

fn convert_merge_request_hook(src: GlMergeRequestHook) -> Webhook {
    let action = merge_request_action(
        &src.object_attributes.action,
        &src.object_attributes.oldrev,
    );
    let sender = convert_user(src.user);

    Webhook::PullRequest(PullRequestHook {
        action,
        repo: convert_project(src.project),
        pull_request: convert_merge_request(src.object_attributes, src.labels, sender.clone()),
        sender,
    })
}

fn issue_action(action: &str) -> Action {
    match action {
        "open" => Action::Open,
        "close" => Action::Close,
        "reopen" => Action::Reopen,
        "update" => Action::Update,
        _ => Action::Unknown,
    }
}

fn convert_issue_hook(src: GlIssueHook) -> Webhook {
    let sender = convert_user(src.user);

    Webhook::Issue(IssueHook {
        action: issue_action(&src.object_attributes.action),
        repo: convert_project(src.project),
        issue: convert_issue(src.object_attributes, src.labels, sender.clone()),
        sender,
    })
}

/// Notes carry no sub-action in older GitLab versions; treat those as new.
fn note_action(action: &str) -> Action {
    match action {
        "" | "create" => Action::Create,
        "update" => Action::Edited,
        "delete" => Action::Delete,
        _ => Action::Unknown,
    }
}

fn convert_note_hook(src: GlNoteHook) -> Result<Webhook, WebhookError> {
    let action = note_action(&src.object_attributes.action);
    let sender = convert_user(src.user);
    let repo = convert_project(src.project);
    let noteable_type = src.object_attributes.noteable_type.clone();
    let comment = convert_note(src.object_attributes, sender.clone());

    match (noteable_type.as_str(), src.merge_request, src.issue) {
        ("MergeRequest", Some(mr), _) => Ok(Webhook::PullRequestComment(PullRequestCommentHook {
            action,
            repo,
            pull_request: convert_merge_request(mr, Vec::new(), User::default()),
            comment,
            sender,
        })),
        ("Issue", _, Some(issue)) => Ok(Webhook::IssueComment(IssueCommentHook {
            action,
            repo,
            issue: convert_issue(issue, Vec::new(), User::default()),
            comment,
            sender,
        })),
        ("MergeRequest", None, _) | ("Issue", _, None) => Err(WebhookError::MalformedPayload {
            message: format!("{} note without its {} object", noteable_type, noteable_type),
        }),
        (other, _, _) => Err(WebhookError::UnknownEvent {
            event: format!("Note Hook:{}", other),
        }),
    }
}

#[cfg(test)]
#[path = "mod_tests.rs"]
mod tests;

//! GitHub webhook parsing.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::Deserialize;

use super::wire::{
    convert_comment, convert_issue, convert_pull_request, convert_repository,
    convert_review_comment, convert_user, pull_request_from_issue, reference_for, GhComment,
    GhIssue, GhPullRequest, GhRepository, GhReviewComment, GhUser,
};
use crate::drivers::lenient::{datetime, nullable};
use crate::drivers::{decode_payload, github_style_action, Driver};
use crate::error::WebhookError;
use crate::hmac::{self, HashAlgorithm};
use crate::model::{
    expand_ref, is_tag, Action, BranchHook, Commit, DeployHook, IssueCommentHook, IssueHook,
    PullRequestCommentHook, PullRequestHook, PushHook, Reference, ReviewCommentHook, Signature,
    TagHook, Webhook, BRANCH_PREFIX,
};
use crate::webhook::{DecodedHook, WebhookParser, WebhookRequest};

pub const EVENT_HEADER: &str = "X-GitHub-Event";
pub const DELIVERY_HEADER: &str = "X-GitHub-Delivery";
pub const SIGNATURE_HEADER: &str = "X-Hub-Signature";
pub const SIGNATURE_256_HEADER: &str = "X-Hub-Signature-256";

/// Event kinds the GitHub driver understands.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum GithubEvent {
    Push,
    Create,
    Delete,
    PullRequest,
    PullRequestReviewComment,
    Issues,
    IssueComment,
    Deployment,
}

impl GithubEvent {
    fn from_header(value: &str) -> Option<Self> {
        match value {
            "push" => Some(Self::Push),
            "create" => Some(Self::Create),
            "delete" => Some(Self::Delete),
            "pull_request" => Some(Self::PullRequest),
            "pull_request_review_comment" => Some(Self::PullRequestReviewComment),
            "issues" => Some(Self::Issues),
            "issue_comment" => Some(Self::IssueComment),
            "deployment" => Some(Self::Deployment),
            _ => None,
        }
    }
}

// ============================================================================
// Payloads
// ============================================================================

#[derive(Debug, Deserialize)]
struct PushPayload {
    #[serde(rename = "ref")]
    reference: String,
    #[serde(default, deserialize_with = "nullable")]
    base_ref: String,
    #[serde(default, deserialize_with = "nullable")]
    before: String,
    #[serde(default, deserialize_with = "nullable")]
    after: String,
    #[serde(default, deserialize_with = "nullable")]
    compare: String,
    #[serde(default)]
    head_commit: Option<HookCommit>,
    #[serde(default, deserialize_with = "nullable")]
    commits: Vec<HookCommit>,
    repository: GhRepository,
    #[serde(default, deserialize_with = "nullable")]
    pusher: HookIdentity,
    #[serde(default, deserialize_with = "nullable")]
    sender: GhUser,
}

#[derive(Debug, Default, Deserialize)]
struct HookCommit {
    id: String,
    #[serde(default, deserialize_with = "nullable")]
    message: String,
    #[serde(default, deserialize_with = "datetime")]
    timestamp: Option<DateTime<Utc>>,
    #[serde(default, deserialize_with = "nullable")]
    url: String,
    #[serde(default, deserialize_with = "nullable")]
    author: HookIdentity,
    #[serde(default, deserialize_with = "nullable")]
    committer: HookIdentity,
}

#[derive(Debug, Default, Deserialize)]
struct HookIdentity {
    #[serde(default, deserialize_with = "nullable")]
    name: String,
    #[serde(default, deserialize_with = "nullable")]
    email: String,
    #[serde(default, deserialize_with = "nullable")]
    username: String,
}

/// Payload of `create` and `delete` events.
#[derive(Debug, Deserialize)]
struct RefPayload {
    #[serde(rename = "ref")]
    reference: String,
    ref_type: String,
    repository: GhRepository,
    #[serde(default, deserialize_with = "nullable")]
    sender: GhUser,
}

#[derive(Debug, Deserialize)]
struct PullRequestPayload {
    action: String,
    pull_request: GhPullRequest,
    repository: GhRepository,
    #[serde(default, deserialize_with = "nullable")]
    sender: GhUser,
}

#[derive(Debug, Deserialize)]
struct IssuesPayload {
    action: String,
    issue: GhIssue,
    repository: GhRepository,
    #[serde(default, deserialize_with = "nullable")]
    sender: GhUser,
}

#[derive(Debug, Deserialize)]
struct IssueCommentPayload {
    action: String,
    issue: GhIssue,
    comment: GhComment,
    repository: GhRepository,
    #[serde(default, deserialize_with = "nullable")]
    sender: GhUser,
}

#[derive(Debug, Deserialize)]
struct ReviewCommentPayload {
    action: String,
    comment: GhReviewComment,
    pull_request: GhPullRequest,
    repository: GhRepository,
    #[serde(default, deserialize_with = "nullable")]
    sender: GhUser,
}

#[derive(Debug, Deserialize)]
struct DeploymentPayload {
    deployment: Deployment,
    repository: GhRepository,
    #[serde(default, deserialize_with = "nullable")]
    sender: GhUser,
}

#[derive(Debug, Deserialize)]
struct Deployment {
    #[serde(default)]
    sha: String,
    #[serde(rename = "ref", default)]
    reference: String,
    #[serde(default, deserialize_with = "nullable")]
    task: String,
    #[serde(default, deserialize_with = "nullable")]
    environment: String,
    #[serde(default, deserialize_with = "nullable")]
    description: String,
    #[serde(default)]
    payload: serde_json::Value,
    #[serde(default, deserialize_with = "nullable")]
    url: String,
}

// ============================================================================
// Parser
// ============================================================================

/// Webhook parser for GitHub and GitHub Enterprise.
#[derive(Debug, Clone, Copy, Default)]
pub struct GithubWebhookParser;

impl GithubWebhookParser {
    pub fn new() -> Self {
        Self
    }
}

#[async_trait]
impl WebhookParser for GithubWebhookParser {
    fn driver(&self) -> Driver {
        Driver::Github
    }

    fn decode(&self, request: &WebhookRequest) -> Result<DecodedHook, WebhookError> {
        let event = request.header(EVENT_HEADER).unwrap_or_default();
        let kind = GithubEvent::from_header(event).ok_or_else(|| WebhookError::UnknownEvent {
            event: event.to_string(),
        })?;

        let body = request.body();
        let hook = match kind {
            GithubEvent::Push => {
                let guid = request.header(DELIVERY_HEADER).unwrap_or_default();
                Webhook::Push(convert_push_hook(decode_payload(body)?, guid))
            }
            GithubEvent::Create => convert_ref_hook(event, decode_payload(body)?, Action::Create)?,
            GithubEvent::Delete => convert_ref_hook(event, decode_payload(body)?, Action::Delete)?,
            GithubEvent::PullRequest => convert_pull_request_hook(decode_payload(body)?),
            GithubEvent::PullRequestReviewComment => convert_review_comment_hook(decode_payload(body)?),
            GithubEvent::Issues => convert_issue_hook(decode_payload(body)?),
            GithubEvent::IssueComment => convert_issue_comment_hook(decode_payload(body)?),
            GithubEvent::Deployment => convert_deployment_hook(decode_payload(body)?),
        };

        Ok(DecodedHook::new(hook))
    }

    async fn verify(&self, request: &WebhookRequest, _decoded: &DecodedHook, key: &str) -> bool {
        let body = request.body();
        let key = key.as_bytes();

        if let Some(signature) = request.non_empty_header(SIGNATURE_256_HEADER) {
            return signature
                .strip_prefix("sha256=")
                .map(|hex| hmac::validate_encoded(HashAlgorithm::Sha256, body, key, hex))
                .unwrap_or(false);
        }

        request
            .non_empty_header(SIGNATURE_HEADER)
            .and_then(|signature| signature.strip_prefix("sha1="))
            .map(|hex| hmac::validate_encoded(HashAlgorithm::Sha1, body, key, hex))
            .unwrap_or(false)
    }
}

// ============================================================================
// Normalisation
// ============================================================================

fn convert_hook_signature(identity: HookIdentity, date: Option<DateTime<Utc>>) -> Signature {
    Signature {
        name: identity.name,
        email: identity.email,
        login: identity.username,
        avatar: String::new(),
        date,
    }
}

fn convert_hook_commit(src: HookCommit) -> Commit {
    Commit {
        sha: src.id,
        message: src.message,
        author: convert_hook_signature(src.author, src.timestamp),
        committer: convert_hook_signature(src.committer, src.timestamp),
        link: src.url,
    }
}

fn convert_push_hook(src: PushPayload, guid: &str) -> PushHook {
    let reference = expand_ref(&src.reference, BRANCH_PREFIX);
    let sender = convert_user(src.sender);
    let mut after = src.after;

    let commit = match src.head_commit {
        Some(head) => {
            // A tag push reports the tag object in `after`; use the commit.
            if is_tag(&reference) {
                after = head.id.clone();
            }
            Commit {
                sha: head.id,
                message: head.message,
                author: convert_hook_signature(head.author, head.timestamp),
                committer: convert_hook_signature(head.committer, head.timestamp),
                link: src.compare,
            }
        }
        None => {
            let pusher = Signature {
                name: src.pusher.name,
                email: src.pusher.email,
                login: sender.login.clone(),
                avatar: sender.avatar.clone(),
                date: None,
            };
            Commit {
                sha: after.clone(),
                message: String::new(),
                author: pusher.clone(),
                committer: pusher,
                link: src.compare,
            }
        }
    };

    PushHook {
        reference,
        base_ref: src.base_ref,
        repo: convert_repository(src.repository),
        before: src.before,
        after,
        commit,
        sender,
        commits: src.commits.into_iter().map(convert_hook_commit).collect(),
        guid: guid.to_string(),
    }
}

fn convert_ref_hook(event: &str, src: RefPayload, action: Action) -> Result<Webhook, WebhookError> {
    let repo = convert_repository(src.repository);
    let sender = convert_user(src.sender);

    match src.ref_type.as_str() {
        "branch" => Ok(Webhook::Branch(BranchHook {
            reference: Reference::branch(&src.reference, ""),
            repo,
            action,
            sender,
        })),
        "tag" => Ok(Webhook::Tag(TagHook {
            reference: Reference::tag(&src.reference, ""),
            repo,
            action,
            sender,
        })),
        other => Err(WebhookError::UnknownEvent {
            event: format!("{}:{}", event, other),
        }),
    }
}

fn convert_pull_request_hook(src: PullRequestPayload) -> Webhook {
    let pull_request = convert_pull_request(src.pull_request);
    let action = match github_style_action(&src.action) {
        Action::Close if pull_request.merged => Action::Merge,
        action => action,
    };

    Webhook::PullRequest(PullRequestHook {
        action,
        repo: convert_repository(src.repository),
        pull_request,
        sender: convert_user(src.sender),
    })
}

fn convert_review_comment_hook(src: ReviewCommentPayload) -> Webhook {
    Webhook::ReviewComment(ReviewCommentHook {
        action: github_style_action(&src.action),
        repo: convert_repository(src.repository),
        pull_request: convert_pull_request(src.pull_request),
        review: convert_review_comment(src.comment),
        sender: convert_user(src.sender),
    })
}

fn convert_issue_hook(src: IssuesPayload) -> Webhook {
    Webhook::Issue(IssueHook {
        action: github_style_action(&src.action),
        repo: convert_repository(src.repository),
        issue: convert_issue(src.issue),
        sender: convert_user(src.sender),
    })
}

/// Comments on pull requests arrive as issue comments whose issue carries a
/// `pull_request` link.
fn convert_issue_comment_hook(src: IssueCommentPayload) -> Webhook {
    let action = github_style_action(&src.action);
    let repo = convert_repository(src.repository);
    let comment = convert_comment(src.comment);
    let sender = convert_user(src.sender);

    if src.issue.pull_request.is_some() {
        Webhook::PullRequestComment(PullRequestCommentHook {
            action,
            repo,
            pull_request: pull_request_from_issue(src.issue),
            comment,
            sender,
        })
    } else {
        Webhook::IssueComment(IssueCommentHook {
            action,
            repo,
            issue: convert_issue(src.issue),
            comment,
            sender,
        })
    }
}

fn convert_deployment_hook(src: DeploymentPayload) -> Webhook {
    let deployment = src.deployment;
    Webhook::Deploy(DeployHook {
        data: deployment.payload,
        desc: deployment.description,
        reference: reference_for(&deployment.reference, &deployment.sha),
        repo: convert_repository(src.repository),
        sender: convert_user(src.sender),
        target: deployment.environment,
        target_url: deployment.url,
        task: deployment.task,
    })
}

#[cfg(test)]
#[path = "webhook_tests.rs"]
mod tests;

//! Gitea and Gogs webhook payloads.
//!
//! Gogs defined the payload format and Gitea kept it, so both drivers
//! decode through this module and only differ in how they authenticate.

use chrono::{DateTime, Utc};
use serde::Deserialize;

use crate::drivers::lenient::{datetime, id_string, nullable};
use crate::drivers::{decode_payload, github_style_action};
use crate::error::WebhookError;
use crate::model::{
    expand_ref, split_full_name, Action, BranchHook, Comment, Commit, Issue, IssueCommentHook,
    IssueHook, Label, PullRequest, PullRequestCommentHook, PullRequestHook, PushHook, Reference,
    Repository, Signature, TagHook, User, Visibility, Webhook, BRANCH_PREFIX,
};

/// Event kinds shared by Gitea and Gogs.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum GogsEvent {
    Push,
    Create,
    Delete,
    Issues,
    IssueComment,
    PullRequest,
}

impl GogsEvent {
    pub(crate) fn from_header(value: &str) -> Option<Self> {
        match value {
            "push" => Some(Self::Push),
            "create" => Some(Self::Create),
            "delete" => Some(Self::Delete),
            "issues" => Some(Self::Issues),
            "issue_comment" => Some(Self::IssueComment),
            "pull_request" => Some(Self::PullRequest),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
pub(crate) struct GtUser {
    #[serde(default, deserialize_with = "id_string")]
    pub id: String,
    #[serde(default, deserialize_with = "nullable")]
    pub login: String,
    #[serde(default, deserialize_with = "nullable")]
    pub username: String,
    #[serde(default, deserialize_with = "nullable")]
    pub full_name: String,
    #[serde(default, deserialize_with = "nullable")]
    pub email: String,
    #[serde(default, deserialize_with = "nullable")]
    pub avatar_url: String,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub(crate) struct GtRepository {
    #[serde(default, deserialize_with = "id_string")]
    pub id: String,
    #[serde(default, deserialize_with = "nullable")]
    pub owner: GtUser,
    #[serde(default, deserialize_with = "nullable")]
    pub name: String,
    #[serde(default, deserialize_with = "nullable")]
    pub full_name: String,
    #[serde(default, deserialize_with = "nullable")]
    pub private: bool,
    #[serde(default, deserialize_with = "nullable")]
    pub archived: bool,
    #[serde(default, deserialize_with = "nullable")]
    pub html_url: String,
    #[serde(default, deserialize_with = "nullable")]
    pub clone_url: String,
    #[serde(default, deserialize_with = "nullable")]
    pub ssh_url: String,
    #[serde(default, deserialize_with = "nullable")]
    pub default_branch: String,
    #[serde(default, deserialize_with = "datetime")]
    pub created_at: Option<DateTime<Utc>>,
    #[serde(default, deserialize_with = "datetime")]
    pub updated_at: Option<DateTime<Utc>>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub(crate) struct GtIdentity {
    #[serde(default, deserialize_with = "nullable")]
    pub name: String,
    #[serde(default, deserialize_with = "nullable")]
    pub email: String,
    #[serde(default, deserialize_with = "nullable")]
    pub username: String,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub(crate) struct GtCommit {
    pub id: String,
    #[serde(default, deserialize_with = "nullable")]
    pub message: String,
    #[serde(default, deserialize_with = "nullable")]
    pub url: String,
    #[serde(default, deserialize_with = "nullable")]
    pub author: GtIdentity,
    #[serde(default, deserialize_with = "nullable")]
    pub committer: GtIdentity,
    #[serde(default, deserialize_with = "datetime")]
    pub timestamp: Option<DateTime<Utc>>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub(crate) struct GtLabel {
    #[serde(default, deserialize_with = "nullable")]
    pub name: String,
    #[serde(default, deserialize_with = "nullable")]
    pub color: String,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub(crate) struct GtBranch {
    #[serde(rename = "ref", default, deserialize_with = "nullable")]
    pub ref_name: String,
    #[serde(default, deserialize_with = "nullable")]
    pub sha: String,
    #[serde(default)]
    pub repo: Option<GtRepository>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub(crate) struct GtPullRequest {
    pub number: i64,
    #[serde(default, deserialize_with = "nullable")]
    pub user: GtUser,
    #[serde(default, deserialize_with = "nullable")]
    pub title: String,
    #[serde(default, deserialize_with = "nullable")]
    pub body: String,
    #[serde(default, deserialize_with = "nullable")]
    pub state: String,
    #[serde(default, deserialize_with = "nullable")]
    pub labels: Vec<GtLabel>,
    #[serde(default, deserialize_with = "nullable")]
    pub html_url: String,
    #[serde(default, deserialize_with = "nullable")]
    pub diff_url: String,
    #[serde(default, deserialize_with = "nullable")]
    pub merged: bool,
    #[serde(default, deserialize_with = "nullable")]
    pub merge_commit_sha: String,
    #[serde(default, deserialize_with = "nullable")]
    pub base: GtBranch,
    #[serde(default, deserialize_with = "nullable")]
    pub head: GtBranch,
    #[serde(default, deserialize_with = "datetime")]
    pub created_at: Option<DateTime<Utc>>,
    #[serde(default, deserialize_with = "datetime")]
    pub updated_at: Option<DateTime<Utc>>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub(crate) struct GtIssue {
    pub number: i64,
    #[serde(default, deserialize_with = "nullable")]
    pub user: GtUser,
    #[serde(default, deserialize_with = "nullable")]
    pub title: String,
    #[serde(default, deserialize_with = "nullable")]
    pub body: String,
    #[serde(default, deserialize_with = "nullable")]
    pub state: String,
    #[serde(default, deserialize_with = "nullable")]
    pub labels: Vec<GtLabel>,
    #[serde(default, deserialize_with = "nullable")]
    pub html_url: String,
    #[serde(default, deserialize_with = "nullable")]
    pub url: String,
    #[serde(default, deserialize_with = "nullable")]
    pub is_locked: bool,
    #[serde(default)]
    pub pull_request: Option<serde_json::Value>,
    #[serde(default, deserialize_with = "datetime")]
    pub created_at: Option<DateTime<Utc>>,
    #[serde(default, deserialize_with = "datetime")]
    pub updated_at: Option<DateTime<Utc>>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub(crate) struct GtComment {
    #[serde(default)]
    pub id: i64,
    #[serde(default, deserialize_with = "nullable")]
    pub html_url: String,
    #[serde(default, deserialize_with = "nullable")]
    pub user: GtUser,
    #[serde(default, deserialize_with = "nullable")]
    pub body: String,
    #[serde(default, deserialize_with = "datetime")]
    pub created_at: Option<DateTime<Utc>>,
    #[serde(default, deserialize_with = "datetime")]
    pub updated_at: Option<DateTime<Utc>>,
}

#[derive(Debug, Deserialize)]
struct PushPayload {
    #[serde(rename = "ref")]
    reference: String,
    #[serde(default, deserialize_with = "nullable")]
    before: String,
    #[serde(default, deserialize_with = "nullable")]
    after: String,
    #[serde(default, deserialize_with = "nullable")]
    compare_url: String,
    #[serde(default, deserialize_with = "nullable")]
    commits: Vec<GtCommit>,
    repository: GtRepository,
    #[serde(default, deserialize_with = "nullable")]
    pusher: GtUser,
    #[serde(default, deserialize_with = "nullable")]
    sender: GtUser,
}

#[derive(Debug, Deserialize)]
struct RefPayload {
    #[serde(rename = "ref")]
    reference: String,
    #[serde(default, deserialize_with = "nullable")]
    ref_type: String,
    #[serde(default, deserialize_with = "nullable")]
    sha: String,
    repository: GtRepository,
    #[serde(default, deserialize_with = "nullable")]
    sender: GtUser,
}

#[derive(Debug, Deserialize)]
struct IssuePayload {
    #[serde(default, deserialize_with = "nullable")]
    action: String,
    issue: GtIssue,
    repository: GtRepository,
    #[serde(default, deserialize_with = "nullable")]
    sender: GtUser,
}

#[derive(Debug, Deserialize)]
struct IssueCommentPayload {
    #[serde(default, deserialize_with = "nullable")]
    action: String,
    issue: GtIssue,
    comment: GtComment,
    repository: GtRepository,
    #[serde(default, deserialize_with = "nullable")]
    sender: GtUser,
    #[serde(default, deserialize_with = "nullable")]
    is_pull: bool,
}

#[derive(Debug, Deserialize)]
struct PullRequestPayload {
    #[serde(default, deserialize_with = "nullable")]
    action: String,
    pull_request: GtPullRequest,
    repository: GtRepository,
    #[serde(default, deserialize_with = "nullable")]
    sender: GtUser,
}

/// The `secret` field some versions embed in every payload.
#[derive(Debug, Default, Deserialize)]
struct EmbeddedSecret {
    #[serde(default, deserialize_with = "nullable")]
    secret: String,
}

/// Secret embedded in the payload, if any.
pub(crate) fn embedded_secret(body: &[u8]) -> Option<String> {
    serde_json::from_slice::<EmbeddedSecret>(body)
        .ok()
        .map(|p| p.secret)
        .filter(|s| !s.is_empty())
}

/// Decode a payload for `event`.
pub(crate) fn decode_event(event: GogsEvent, body: &[u8]) -> Result<Webhook, WebhookError> {
    match event {
        GogsEvent::Push => Ok(convert_push_hook(decode_payload(body)?)),
        GogsEvent::Create => convert_ref_hook(decode_payload(body)?, Action::Create),
        GogsEvent::Delete => convert_ref_hook(decode_payload(body)?, Action::Delete),
        GogsEvent::Issues => Ok(convert_issue_hook(decode_payload(body)?)),
        GogsEvent::IssueComment => Ok(convert_issue_comment_hook(decode_payload(body)?)),
        GogsEvent::PullRequest => Ok(convert_pull_request_hook(decode_payload(body)?)),
    }
}

// ============================================================================
// Converters
// ============================================================================

pub(crate) fn convert_user(src: GtUser) -> User {
    User {
        id: src.id,
        login: if src.login.is_empty() {
            src.username
        } else {
            src.login
        },
        name: src.full_name,
        email: src.email,
        avatar: src.avatar_url,
        created: None,
        updated: None,
    }
}

pub(crate) fn convert_repository(src: GtRepository) -> Repository {
    let namespace = if src.owner.login.is_empty() && src.owner.username.is_empty() {
        split_full_name(&src.full_name).0.to_string()
    } else {
        convert_user(src.owner).login
    };

    Repository {
        id: src.id,
        namespace,
        name: src.name,
        full_name: src.full_name,
        perm: None,
        branch: src.default_branch,
        archived: src.archived,
        private: src.private,
        visibility: Visibility::from_provider(None, src.private),
        clone: src.clone_url,
        clone_ssh: src.ssh_url,
        link: src.html_url,
        created: src.created_at,
        updated: src.updated_at,
    }
}

fn convert_labels(labels: Vec<GtLabel>) -> Vec<Label> {
    labels
        .into_iter()
        .map(|l| Label {
            name: l.name,
            color: l.color,
        })
        .collect()
}

fn convert_identity(src: GtIdentity, date: Option<DateTime<Utc>>) -> Signature {
    Signature {
        name: src.name,
        email: src.email,
        login: src.username,
        avatar: String::new(),
        date,
    }
}

fn convert_commit(src: GtCommit) -> Commit {
    Commit {
        sha: src.id,
        message: src.message,
        author: convert_identity(src.author, src.timestamp),
        committer: convert_identity(src.committer, src.timestamp),
        link: src.url,
    }
}

pub(crate) fn convert_pull_request(src: GtPullRequest) -> PullRequest {
    let fork = src
        .head
        .repo
        .as_ref()
        .map(|r| r.full_name.clone())
        .unwrap_or_default();

    PullRequest {
        number: src.number,
        title: src.title,
        body: src.body,
        sha: src.head.sha.clone(),
        ref_name: format!("refs/pull/{}/head", src.number),
        source: src.head.ref_name.clone(),
        target: src.base.ref_name.clone(),
        fork,
        link: src.html_url,
        diff: src.diff_url,
        draft: false,
        closed: src.state == "closed",
        merged: src.merged,
        merge: src.merge_commit_sha,
        base: Reference::new(&src.base.ref_name, BRANCH_PREFIX, src.base.sha),
        head: Reference::new(&src.head.ref_name, BRANCH_PREFIX, src.head.sha),
        author: convert_user(src.user),
        created: src.created_at,
        updated: src.updated_at,
        labels: convert_labels(src.labels),
    }
}

fn issue_link(src: &GtIssue) -> String {
    if src.html_url.is_empty() {
        src.url.clone()
    } else {
        src.html_url.clone()
    }
}

pub(crate) fn convert_issue(src: GtIssue) -> Issue {
    Issue {
        number: src.number,
        link: issue_link(&src),
        title: src.title,
        body: src.body,
        labels: src.labels.into_iter().map(|l| l.name).collect(),
        closed: src.state == "closed",
        locked: src.is_locked,
        author: convert_user(src.user),
        created: src.created_at,
        updated: src.updated_at,
    }
}

/// Pull request view of an issue comment payload's issue.
fn pull_request_from_issue(src: GtIssue) -> PullRequest {
    PullRequest {
        number: src.number,
        ref_name: format!("refs/pull/{}/head", src.number),
        link: issue_link(&src),
        title: src.title,
        body: src.body,
        closed: src.state == "closed",
        author: convert_user(src.user),
        created: src.created_at,
        updated: src.updated_at,
        labels: convert_labels(src.labels),
        ..Default::default()
    }
}

pub(crate) fn convert_comment(src: GtComment) -> Comment {
    Comment {
        id: src.id,
        body: src.body,
        author: convert_user(src.user),
        link: src.html_url,
        created: src.created_at,
        updated: src.updated_at,
    }
}

fn convert_push_hook(src: PushPayload) -> Webhook {
    let pusher = convert_user(src.pusher);
    let signature = Signature {
        name: pusher.name.clone(),
        email: pusher.email.clone(),
        login: pusher.login.clone(),
        avatar: pusher.avatar.clone(),
        date: None,
    };
    let message = src
        .commits
        .iter()
        .find(|c| c.id == src.after)
        .or_else(|| src.commits.first())
        .map(|c| c.message.clone())
        .unwrap_or_default();

    Webhook::Push(PushHook {
        reference: expand_ref(&src.reference, BRANCH_PREFIX),
        base_ref: String::new(),
        repo: convert_repository(src.repository),
        before: src.before,
        commit: Commit {
            sha: src.after.clone(),
            message,
            author: signature.clone(),
            committer: signature,
            link: src.compare_url,
        },
        after: src.after,
        sender: convert_user(src.sender),
        commits: src.commits.into_iter().map(convert_commit).collect(),
        guid: String::new(),
    })
}

fn convert_ref_hook(src: RefPayload, action: Action) -> Result<Webhook, WebhookError> {
    let repo = convert_repository(src.repository);
    let sender = convert_user(src.sender);

    match src.ref_type.as_str() {
        "branch" => Ok(Webhook::Branch(BranchHook {
            reference: Reference::branch(&src.reference, src.sha),
            repo,
            action,
            sender,
        })),
        "tag" => Ok(Webhook::Tag(TagHook {
            reference: Reference::tag(&src.reference, src.sha),
            repo,
            action,
            sender,
        })),
        other => Err(WebhookError::UnknownEvent {
            event: format!("{}:{}", action, other),
        }),
    }
}

fn convert_issue_hook(src: IssuePayload) -> Webhook {
    Webhook::Issue(IssueHook {
        action: github_style_action(&src.action),
        repo: convert_repository(src.repository),
        issue: convert_issue(src.issue),
        sender: convert_user(src.sender),
    })
}

fn convert_issue_comment_hook(src: IssueCommentPayload) -> Webhook {
    let action = github_style_action(&src.action);
    let repo = convert_repository(src.repository);
    let comment = convert_comment(src.comment);
    let sender = convert_user(src.sender);
    let is_pull = src.is_pull || src.issue.pull_request.as_ref().is_some_and(|v| !v.is_null());

    if is_pull {
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

fn pull_request_action(action: &str, merged: bool) -> Action {
    match action {
        "label_updated" => Action::Label,
        "label_cleared" => Action::Unlabel,
        "closed" if merged => Action::Merge,
        other => github_style_action(other),
    }
}

fn convert_pull_request_hook(src: PullRequestPayload) -> Webhook {
    let pull_request = convert_pull_request(src.pull_request);

    Webhook::PullRequest(PullRequestHook {
        action: pull_request_action(&src.action, pull_request.merged),
        repo: convert_repository(src.repository),
        pull_request,
        sender: convert_user(src.sender),
    })
}

#[cfg(test)]
#[path = "wire_tests.rs"]
mod tests;

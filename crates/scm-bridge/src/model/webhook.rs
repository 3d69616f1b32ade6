//! Canonical webhook events.
//!
//! Every driver normalises its provider's deliveries into one of the
//! [`Webhook`] variants below. Each variant exposes the repository it
//! concerns through [`Webhook::repository`].

use serde::{Deserialize, Serialize};
use std::fmt;

use super::action::Action;
use super::git::{Commit, Reference};
use super::pull_request::{Comment, Issue, PullRequest, Review};
use super::repository::Repository;
use super::user::User;

/// A normalised webhook delivery.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", content = "hook", rename_all = "snake_case")]
pub enum Webhook {
    Push(PushHook),
    Branch(BranchHook),
    Tag(TagHook),
    Issue(IssueHook),
    IssueComment(IssueCommentHook),
    PullRequest(PullRequestHook),
    PullRequestComment(PullRequestCommentHook),
    ReviewComment(ReviewCommentHook),
    Deploy(DeployHook),
}

impl Webhook {
    /// The repository the event concerns.
    pub fn repository(&self) -> &Repository {
        match self {
            Self::Push(h) => &h.repo,
            Self::Branch(h) => &h.repo,
            Self::Tag(h) => &h.repo,
            Self::Issue(h) => &h.repo,
            Self::IssueComment(h) => &h.repo,
            Self::PullRequest(h) => &h.repo,
            Self::PullRequestComment(h) => &h.repo,
            Self::ReviewComment(h) => &h.repo,
            Self::Deploy(h) => &h.repo,
        }
    }

    /// The user that triggered the event.
    pub fn sender(&self) -> &User {
        match self {
            Self::Push(h) => &h.sender,
            Self::Branch(h) => &h.sender,
            Self::Tag(h) => &h.sender,
            Self::Issue(h) => &h.sender,
            Self::IssueComment(h) => &h.sender,
            Self::PullRequest(h) => &h.sender,
            Self::PullRequestComment(h) => &h.sender,
            Self::ReviewComment(h) => &h.sender,
            Self::Deploy(h) => &h.sender,
        }
    }

    /// The action carried by the event. Push and deploy events have none.
    pub fn action(&self) -> Action {
        match self {
            Self::Push(_) | Self::Deploy(_) => Action::Unknown,
            Self::Branch(h) => h.action,
            Self::Tag(h) => h.action,
            Self::Issue(h) => h.action,
            Self::IssueComment(h) => h.action,
            Self::PullRequest(h) => h.action,
            Self::PullRequestComment(h) => h.action,
            Self::ReviewComment(h) => h.action,
        }
    }

    pub fn kind(&self) -> WebhookKind {
        match self {
            Self::Push(_) => WebhookKind::Push,
            Self::Branch(_) => WebhookKind::Branch,
            Self::Tag(_) => WebhookKind::Tag,
            Self::Issue(_) => WebhookKind::Issue,
            Self::IssueComment(_) => WebhookKind::IssueComment,
            Self::PullRequest(_) => WebhookKind::PullRequest,
            Self::PullRequestComment(_) => WebhookKind::PullRequestComment,
            Self::ReviewComment(_) => WebhookKind::ReviewComment,
            Self::Deploy(_) => WebhookKind::Deploy,
        }
    }
}

/// Discriminant of a [`Webhook`], used for logging and routing.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum WebhookKind {
    Push,
    Branch,
    Tag,
    Issue,
    IssueComment,
    PullRequest,
    PullRequestComment,
    ReviewComment,
    Deploy,
}

impl WebhookKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Push => "push",
            Self::Branch => "branch",
            Self::Tag => "tag",
            Self::Issue => "issue",
            Self::IssueComment => "issue_comment",
            Self::PullRequest => "pull_request",
            Self::PullRequestComment => "pull_request_comment",
            Self::ReviewComment => "review_comment",
            Self::Deploy => "deploy",
        }
    }
}

impl fmt::Display for WebhookKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Commits pushed to a branch or tag.
///
/// `reference` is always fully qualified (`refs/heads/...` or `refs/tags/...`).
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PushHook {
    #[serde(rename = "ref")]
    pub reference: String,
    pub base_ref: String,
    pub repo: Repository,
    pub before: String,
    pub after: String,
    /// Head commit of the push
    pub commit: Commit,
    pub sender: User,
    pub commits: Vec<Commit>,
    /// Provider delivery identifier, when one is sent
    pub guid: String,
}

/// A branch was created or deleted.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct BranchHook {
    #[serde(rename = "ref")]
    pub reference: Reference,
    pub repo: Repository,
    pub action: Action,
    pub sender: User,
}

/// A tag was created or deleted.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TagHook {
    #[serde(rename = "ref")]
    pub reference: Reference,
    pub repo: Repository,
    pub action: Action,
    pub sender: User,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct IssueHook {
    pub action: Action,
    pub repo: Repository,
    pub issue: Issue,
    pub sender: User,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct IssueCommentHook {
    pub action: Action,
    pub repo: Repository,
    pub issue: Issue,
    pub comment: Comment,
    pub sender: User,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PullRequestHook {
    pub action: Action,
    pub repo: Repository,
    pub pull_request: PullRequest,
    pub sender: User,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PullRequestCommentHook {
    pub action: Action,
    pub repo: Repository,
    pub pull_request: PullRequest,
    pub comment: Comment,
    pub sender: User,
}

/// A comment on a line of a pull request diff.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReviewCommentHook {
    pub action: Action,
    pub repo: Repository,
    pub pull_request: PullRequest,
    pub review: Review,
    pub sender: User,
}

/// A deployment was requested.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct DeployHook {
    /// Provider-defined deployment payload
    pub data: serde_json::Value,
    pub desc: String,
    #[serde(rename = "ref")]
    pub reference: Reference,
    pub repo: Repository,
    pub sender: User,
    /// Deployment environment
    pub target: String,
    pub target_url: String,
    pub task: String,
}

#[cfg(test)]
#[path = "webhook_tests.rs"]
mod tests;

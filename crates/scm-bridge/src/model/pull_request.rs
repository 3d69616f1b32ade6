//! Pull requests, issues, comments and review comments.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::git::Reference;
use super::user::User;

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Label {
    pub name: String,
    pub color: String,
}

/// A pull request (merge request on GitLab and Gitee).
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PullRequest {
    pub number: i64,
    pub title: String,
    pub body: String,
    /// Head commit
    pub sha: String,
    /// Provider ref that tracks the head, e.g. `refs/pull/1/head`
    #[serde(rename = "ref")]
    pub ref_name: String,
    /// Source branch name
    pub source: String,
    /// Target branch name
    pub target: String,
    /// Full name of the fork the change comes from
    pub fork: String,
    pub link: String,
    pub diff: String,
    pub draft: bool,
    pub closed: bool,
    pub merged: bool,
    /// Merge commit
    pub merge: String,
    pub base: Reference,
    pub head: Reference,
    pub author: User,
    pub created: Option<DateTime<Utc>>,
    pub updated: Option<DateTime<Utc>>,
    pub labels: Vec<Label>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PullRequestInput {
    pub title: String,
    pub body: String,
    pub source: String,
    pub target: String,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Issue {
    pub number: i64,
    pub title: String,
    pub body: String,
    pub link: String,
    pub labels: Vec<String>,
    pub closed: bool,
    pub locked: bool,
    pub author: User,
    pub created: Option<DateTime<Utc>>,
    pub updated: Option<DateTime<Utc>>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct IssueInput {
    pub title: String,
    pub body: String,
}

/// A comment on an issue or pull request conversation.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Comment {
    pub id: i64,
    pub body: String,
    pub author: User,
    pub link: String,
    pub created: Option<DateTime<Utc>>,
    pub updated: Option<DateTime<Utc>>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CommentInput {
    pub body: String,
}

/// A review comment anchored to a line of a pull request diff.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Review {
    pub id: i64,
    pub body: String,
    pub path: String,
    pub sha: String,
    pub line: i64,
    pub link: String,
    pub author: User,
    pub created: Option<DateTime<Utc>>,
    pub updated: Option<DateTime<Utc>>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReviewInput {
    pub body: String,
    pub sha: String,
    pub path: String,
    pub line: i64,
}

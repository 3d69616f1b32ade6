//! Gitee webhook payloads.

use chrono::{DateTime, Utc};
use serde::Deserialize;

use crate::drivers::lenient::{datetime, id_string, nullable};
use crate::model::{
    split_full_name, Comment, Commit, Issue, Label, PullRequest, Reference, Repository,
    Signature, User, Visibility, BRANCH_PREFIX,
};

#[derive(Debug, Clone, Default, Deserialize)]
pub(crate) struct GeUser {
    #[serde(default, deserialize_with = "id_string")]
    pub id: String,
    #[serde(default, deserialize_with = "nullable")]
    pub login: String,
    #[serde(default, deserialize_with = "nullable")]
    pub username: String,
    #[serde(default, deserialize_with = "nullable")]
    pub name: String,
    #[serde(default, deserialize_with = "nullable")]
    pub email: String,
    #[serde(default, deserialize_with = "nullable")]
    pub avatar_url: String,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub(crate) struct GeRepository {
    #[serde(default, deserialize_with = "id_string")]
    pub id: String,
    #[serde(default, deserialize_with = "nullable")]
    pub name: String,
    #[serde(default, deserialize_with = "nullable")]
    pub path: String,
    #[serde(default, deserialize_with = "nullable")]
    pub full_name: String,
    #[serde(default, deserialize_with = "nullable")]
    pub namespace: String,
    #[serde(default, deserialize_with = "nullable")]
    pub private: bool,
    #[serde(default, deserialize_with = "nullable")]
    pub html_url: String,
    #[serde(default, deserialize_with = "nullable")]
    pub git_http_url: String,
    #[serde(default, deserialize_with = "nullable")]
    pub git_ssh_url: String,
    #[serde(default, deserialize_with = "nullable")]
    pub default_branch: String,
    #[serde(default, deserialize_with = "datetime")]
    pub created_at: Option<DateTime<Utc>>,
    #[serde(default, deserialize_with = "datetime")]
    pub updated_at: Option<DateTime<Utc>>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub(crate) struct GeIdentity {
    #[serde(default, deserialize_with = "nullable")]
    pub name: String,
    #[serde(default, deserialize_with = "nullable")]
    pub email: String,
    #[serde(default, deserialize_with = "nullable")]
    pub username: String,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub(crate) struct GeCommit {
    pub id: String,
    #[serde(default, deserialize_with = "nullable")]
    pub message: String,
    #[serde(default, deserialize_with = "nullable")]
    pub url: String,
    #[serde(default, deserialize_with = "nullable")]
    pub author: GeIdentity,
    #[serde(default, deserialize_with = "nullable")]
    pub committer: GeIdentity,
    #[serde(default, deserialize_with = "datetime")]
    pub timestamp: Option<DateTime<Utc>>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub(crate) struct GeLabel {
    #[serde(default, deserialize_with = "nullable")]
    pub name: String,
    #[serde(default, deserialize_with = "nullable")]
    pub color: String,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub(crate) struct GeBranch {
    #[serde(rename = "ref", default, deserialize_with = "nullable")]
    pub ref_name: String,
    #[serde(default, deserialize_with = "nullable")]
    pub sha: String,
    #[serde(default)]
    pub repo: Option<GeRepository>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub(crate) struct GePullRequest {
    pub number: i64,
    #[serde(default, deserialize_with = "nullable")]
    pub title: String,
    #[serde(default, deserialize_with = "nullable")]
    pub body: String,
    #[serde(default, deserialize_with = "nullable")]
    pub state: String,
    #[serde(default, deserialize_with = "nullable")]
    pub html_url: String,
    #[serde(default, deserialize_with = "nullable")]
    pub diff_url: String,
    #[serde(default, deserialize_with = "nullable")]
    pub merged: bool,
    #[serde(default, deserialize_with = "nullable")]
    pub draft: bool,
    #[serde(default, deserialize_with = "nullable")]
    pub merge_commit_sha: String,
    #[serde(default, deserialize_with = "nullable")]
    pub labels: Vec<GeLabel>,
    #[serde(default, deserialize_with = "nullable")]
    pub head: GeBranch,
    #[serde(default, deserialize_with = "nullable")]
    pub base: GeBranch,
    #[serde(default, deserialize_with = "nullable")]
    pub user: GeUser,
    #[serde(default, deserialize_with = "datetime")]
    pub created_at: Option<DateTime<Utc>>,
    #[serde(default, deserialize_with = "datetime")]
    pub updated_at: Option<DateTime<Utc>>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub(crate) struct GeIssue {
    #[serde(default)]
    pub id: i64,
    /// Gitee issue numbers are identifiers such as `I1EL99`.
    #[serde(default, deserialize_with = "id_string")]
    pub number: String,
    #[serde(default, deserialize_with = "nullable")]
    pub title: String,
    #[serde(default, deserialize_with = "nullable")]
    pub body: String,
    #[serde(default, deserialize_with = "nullable")]
    pub state: String,
    #[serde(default, deserialize_with = "nullable")]
    pub html_url: String,
    #[serde(default, deserialize_with = "nullable")]
    pub labels: Vec<GeLabel>,
    #[serde(default, deserialize_with = "nullable")]
    pub user: GeUser,
    #[serde(default, deserialize_with = "datetime")]
    pub created_at: Option<DateTime<Utc>>,
    #[serde(default, deserialize_with = "datetime")]
    pub updated_at: Option<DateTime<Utc>>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub(crate) struct GeComment {
    #[serde(default)]
    pub id: i64,
    #[serde(default, deserialize_with = "nullable")]
    pub body: String,
    #[serde(default, deserialize_with = "nullable")]
    pub html_url: String,
    #[serde(default, deserialize_with = "nullable")]
    pub user: GeUser,
    #[serde(default, deserialize_with = "datetime")]
    pub created_at: Option<DateTime<Utc>>,
    #[serde(default, deserialize_with = "datetime")]
    pub updated_at: Option<DateTime<Utc>>,
}

#[derive(Debug, Deserialize)]
pub(crate) struct GePushHook {
    #[serde(rename = "ref")]
    pub reference: String,
    #[serde(default, deserialize_with = "nullable")]
    pub before: String,
    #[serde(default, deserialize_with = "nullable")]
    pub after: String,
    #[serde(default, deserialize_with = "nullable")]
    pub created: bool,
    #[serde(default, deserialize_with = "nullable")]
    pub deleted: bool,
    #[serde(default, deserialize_with = "nullable")]
    pub compare: String,
    #[serde(default, deserialize_with = "nullable")]
    pub commits: Vec<GeCommit>,
    #[serde(default)]
    pub head_commit: Option<GeCommit>,
    pub repository: GeRepository,
    #[serde(default, deserialize_with = "nullable")]
    pub pusher: GeUser,
    #[serde(default, deserialize_with = "nullable")]
    pub sender: GeUser,
}

#[derive(Debug, Deserialize)]
pub(crate) struct GeMergeRequestHook {
    #[serde(default, deserialize_with = "nullable")]
    pub action: String,
    #[serde(default, deserialize_with = "nullable")]
    pub action_desc: String,
    pub pull_request: GePullRequest,
    pub repository: GeRepository,
    #[serde(default, deserialize_with = "nullable")]
    pub sender: GeUser,
}

#[derive(Debug, Deserialize)]
pub(crate) struct GeIssueHook {
    #[serde(default, deserialize_with = "nullable")]
    pub action: String,
    pub issue: GeIssue,
    pub repository: GeRepository,
    #[serde(default, deserialize_with = "nullable")]
    pub sender: GeUser,
}

#[derive(Debug, Deserialize)]
pub(crate) struct GeNoteHook {
    #[serde(default, deserialize_with = "nullable")]
    pub action: String,
    pub comment: GeComment,
    #[serde(default, deserialize_with = "nullable")]
    pub noteable_type: String,
    #[serde(default)]
    pub issue: Option<GeIssue>,
    #[serde(default)]
    pub pull_request: Option<GePullRequest>,
    pub repository: GeRepository,
    #[serde(default, deserialize_with = "nullable")]
    pub sender: GeUser,
}

// ============================================================================
// Converters
// ============================================================================

pub(crate) fn convert_user(src: GeUser) -> User {
    User {
        id: src.id,
        login: if src.login.is_empty() {
            src.username
        } else {
            src.login
        },
        name: src.name,
        email: src.email,
        avatar: src.avatar_url,
        created: None,
        updated: None,
    }
}

pub(crate) fn convert_repository(src: GeRepository) -> Repository {
    let namespace = if src.namespace.is_empty() {
        split_full_name(&src.full_name).0.to_string()
    } else {
        src.namespace
    };
    let private = src.private;

    Repository {
        id: src.id,
        namespace,
        name: if src.path.is_empty() { src.name } else { src.path },
        full_name: src.full_name,
        perm: None,
        branch: src.default_branch,
        archived: false,
        private,
        visibility: Visibility::from_provider(None, private),
        clone: src.git_http_url,
        clone_ssh: src.git_ssh_url,
        link: src.html_url,
        created: src.created_at,
        updated: src.updated_at,
    }
}

fn convert_identity(src: GeIdentity, date: Option<DateTime<Utc>>) -> Signature {
    Signature {
        name: src.name,
        email: src.email,
        login: src.username,
        avatar: String::new(),
        date,
    }
}

pub(crate) fn convert_commit(src: GeCommit) -> Commit {
    Commit {
        sha: src.id,
        message: src.message,
        author: convert_identity(src.author, src.timestamp),
        committer: convert_identity(src.committer, src.timestamp),
        link: src.url,
    }
}

fn convert_labels(labels: Vec<GeLabel>) -> Vec<Label> {
    labels
        .into_iter()
        .map(|l| Label {
            name: l.name,
            color: l.color,
        })
        .collect()
}

pub(crate) fn convert_pull_request(src: GePullRequest) -> PullRequest {
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
        draft: src.draft,
        closed: src.state != "open",
        merged: src.merged || src.state == "merged",
        merge: src.merge_commit_sha,
        base: Reference::new(&src.base.ref_name, BRANCH_PREFIX, src.base.sha),
        head: Reference::new(&src.head.ref_name, BRANCH_PREFIX, src.head.sha),
        author: convert_user(src.user),
        created: src.created_at,
        updated: src.updated_at,
        labels: convert_labels(src.labels),
    }
}

pub(crate) fn is_closed_issue(state: &str) -> bool {
    matches!(state, "closed" | "rejected")
}

pub(crate) fn convert_issue(src: GeIssue) -> Issue {
    Issue {
        number: src.number.parse().unwrap_or(src.id),
        title: src.title,
        body: src.body,
        link: src.html_url,
        labels: src.labels.into_iter().map(|l| l.name).collect(),
        closed: is_closed_issue(&src.state),
        locked: false,
        author: convert_user(src.user),
        created: src.created_at,
        updated: src.updated_at,
    }
}

pub(crate) fn convert_comment(src: GeComment) -> Comment {
    Comment {
        id: src.id,
        body: src.body,
        author: convert_user(src.user),
        link: src.html_url,
        created: src.created_at,
        updated: src.updated_at,
    }
}

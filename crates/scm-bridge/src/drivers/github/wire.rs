//! GitHub wire types shared by the webhook parser and the REST services,
//! with pure converters into the canonical model.

use chrono::{DateTime, Utc};
use serde::Deserialize;

use crate::drivers::lenient::{datetime, nullable};
use crate::model::{
    split_full_name, Change, Comment, Commit, Issue, Label, Perm, PullRequest,
    Reference, Repository, Review, Signature, User, Visibility, BRANCH_PREFIX,
};

#[derive(Debug, Clone, Default, Deserialize)]
pub(crate) struct GhUser {
    #[serde(default)]
    pub id: i64,
    #[serde(default, deserialize_with = "nullable")]
    pub login: String,
    #[serde(default, deserialize_with = "nullable")]
    pub name: String,
    #[serde(default, deserialize_with = "nullable")]
    pub email: String,
    #[serde(default, deserialize_with = "nullable")]
    pub avatar_url: String,
    #[serde(default, deserialize_with = "datetime")]
    pub created_at: Option<DateTime<Utc>>,
    #[serde(default, deserialize_with = "datetime")]
    pub updated_at: Option<DateTime<Utc>>,
}

#[derive(Debug, Clone, Copy, Default, Deserialize)]
pub(crate) struct GhPermissions {
    #[serde(default)]
    pub admin: bool,
    #[serde(default)]
    pub push: bool,
    #[serde(default)]
    pub pull: bool,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub(crate) struct GhRepository {
    #[serde(default)]
    pub id: i64,
    #[serde(default, deserialize_with = "nullable")]
    pub owner: GhUser,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub full_name: String,
    #[serde(default)]
    pub private: bool,
    #[serde(default)]
    pub archived: bool,
    #[serde(default)]
    pub visibility: Option<String>,
    #[serde(default, deserialize_with = "nullable")]
    pub default_branch: String,
    #[serde(default)]
    pub permissions: Option<GhPermissions>,
    #[serde(default, deserialize_with = "nullable")]
    pub clone_url: String,
    #[serde(default, deserialize_with = "nullable")]
    pub ssh_url: String,
    #[serde(default, deserialize_with = "nullable")]
    pub html_url: String,
    // Push events send Unix seconds here, every other event RFC 3339.
    #[serde(default, deserialize_with = "datetime")]
    pub created_at: Option<DateTime<Utc>>,
    #[serde(default, deserialize_with = "datetime")]
    pub updated_at: Option<DateTime<Utc>>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub(crate) struct GhLabel {
    #[serde(default)]
    pub name: String,
    #[serde(default, deserialize_with = "nullable")]
    pub color: String,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub(crate) struct GhBranchRef {
    #[serde(rename = "ref", default)]
    pub ref_name: String,
    #[serde(default)]
    pub sha: String,
    #[serde(default)]
    pub repo: Option<GhRepository>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub(crate) struct GhPullRequest {
    pub number: i64,
    #[serde(default)]
    pub state: String,
    #[serde(default, deserialize_with = "nullable")]
    pub title: String,
    #[serde(default, deserialize_with = "nullable")]
    pub body: String,
    #[serde(default, deserialize_with = "nullable")]
    pub html_url: String,
    #[serde(default, deserialize_with = "nullable")]
    pub diff_url: String,
    #[serde(default, deserialize_with = "nullable")]
    pub user: GhUser,
    #[serde(default, deserialize_with = "nullable")]
    pub draft: bool,
    #[serde(default, deserialize_with = "nullable")]
    pub merged: bool,
    #[serde(default, deserialize_with = "datetime")]
    pub merged_at: Option<DateTime<Utc>>,
    #[serde(default, deserialize_with = "nullable")]
    pub merge_commit_sha: String,
    #[serde(default)]
    pub head: GhBranchRef,
    #[serde(default)]
    pub base: GhBranchRef,
    #[serde(default, deserialize_with = "datetime")]
    pub created_at: Option<DateTime<Utc>>,
    #[serde(default, deserialize_with = "datetime")]
    pub updated_at: Option<DateTime<Utc>>,
    #[serde(default, deserialize_with = "nullable")]
    pub labels: Vec<GhLabel>,
}

/// Present on issues that are really pull requests.
#[derive(Debug, Clone, Default, Deserialize)]
pub(crate) struct GhIssuePullRequest {
    #[serde(default, deserialize_with = "nullable")]
    pub html_url: String,
    #[serde(default, deserialize_with = "nullable")]
    pub diff_url: String,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub(crate) struct GhIssue {
    pub number: i64,
    #[serde(default, deserialize_with = "nullable")]
    pub title: String,
    #[serde(default, deserialize_with = "nullable")]
    pub body: String,
    #[serde(default, deserialize_with = "nullable")]
    pub html_url: String,
    #[serde(default)]
    pub state: String,
    #[serde(default)]
    pub locked: bool,
    #[serde(default, deserialize_with = "nullable")]
    pub user: GhUser,
    #[serde(default, deserialize_with = "nullable")]
    pub labels: Vec<GhLabel>,
    #[serde(default)]
    pub pull_request: Option<GhIssuePullRequest>,
    #[serde(default, deserialize_with = "datetime")]
    pub created_at: Option<DateTime<Utc>>,
    #[serde(default, deserialize_with = "datetime")]
    pub updated_at: Option<DateTime<Utc>>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub(crate) struct GhComment {
    pub id: i64,
    #[serde(default, deserialize_with = "nullable")]
    pub body: String,
    #[serde(default, deserialize_with = "nullable")]
    pub html_url: String,
    #[serde(default, deserialize_with = "nullable")]
    pub user: GhUser,
    #[serde(default, deserialize_with = "datetime")]
    pub created_at: Option<DateTime<Utc>>,
    #[serde(default, deserialize_with = "datetime")]
    pub updated_at: Option<DateTime<Utc>>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub(crate) struct GhReviewComment {
    pub id: i64,
    #[serde(default, deserialize_with = "nullable")]
    pub body: String,
    #[serde(default, deserialize_with = "nullable")]
    pub path: String,
    #[serde(default, deserialize_with = "nullable")]
    pub commit_id: String,
    #[serde(default)]
    pub line: Option<i64>,
    #[serde(default)]
    pub original_line: Option<i64>,
    #[serde(default, deserialize_with = "nullable")]
    pub html_url: String,
    #[serde(default, deserialize_with = "nullable")]
    pub user: GhUser,
    #[serde(default, deserialize_with = "datetime")]
    pub created_at: Option<DateTime<Utc>>,
    #[serde(default, deserialize_with = "datetime")]
    pub updated_at: Option<DateTime<Utc>>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub(crate) struct GhGitIdentity {
    #[serde(default, deserialize_with = "nullable")]
    pub name: String,
    #[serde(default, deserialize_with = "nullable")]
    pub email: String,
    #[serde(default, deserialize_with = "datetime")]
    pub date: Option<DateTime<Utc>>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub(crate) struct GhGitCommit {
    #[serde(default, deserialize_with = "nullable")]
    pub message: String,
    #[serde(default)]
    pub author: GhGitIdentity,
    #[serde(default)]
    pub committer: GhGitIdentity,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub(crate) struct GhFile {
    #[serde(default)]
    pub filename: String,
    #[serde(default, deserialize_with = "nullable")]
    pub previous_filename: String,
    #[serde(default)]
    pub status: String,
    #[serde(default, deserialize_with = "nullable")]
    pub sha: String,
}

/// A commit as returned by the REST commits API.
#[derive(Debug, Clone, Default, Deserialize)]
pub(crate) struct GhCommit {
    pub sha: String,
    #[serde(default, deserialize_with = "nullable")]
    pub html_url: String,
    #[serde(default)]
    pub commit: GhGitCommit,
    #[serde(default)]
    pub author: Option<GhUser>,
    #[serde(default)]
    pub committer: Option<GhUser>,
    #[serde(default, deserialize_with = "nullable")]
    pub files: Vec<GhFile>,
}

// ============================================================================
// Converters
// ============================================================================

pub(crate) fn convert_user(src: GhUser) -> User {
    User {
        id: if src.id == 0 {
            String::new()
        } else {
            src.id.to_string()
        },
        login: src.login,
        name: src.name,
        email: src.email,
        avatar: src.avatar_url,
        created: src.created_at,
        updated: src.updated_at,
    }
}

pub(crate) fn convert_perm(src: GhPermissions) -> Perm {
    Perm {
        pull: src.pull,
        push: src.push,
        admin: src.admin,
    }
}

pub(crate) fn convert_repository(src: GhRepository) -> Repository {
    let namespace = if src.owner.login.is_empty() {
        split_full_name(&src.full_name).0.to_string()
    } else {
        src.owner.login
    };

    Repository {
        id: src.id.to_string(),
        namespace,
        name: src.name,
        full_name: src.full_name,
        perm: src.permissions.map(convert_perm),
        branch: src.default_branch,
        archived: src.archived,
        private: src.private,
        visibility: Visibility::from_provider(src.visibility.as_deref(), src.private),
        clone: src.clone_url,
        clone_ssh: src.ssh_url,
        link: src.html_url,
        created: src.created_at,
        updated: src.updated_at,
    }
}

fn convert_label(src: GhLabel) -> Label {
    Label {
        name: src.name,
        color: src.color,
    }
}

pub(crate) fn convert_pull_request(src: GhPullRequest) -> PullRequest {
    let merged = src.merged || src.merged_at.is_some();
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
        closed: src.state == "closed",
        merged,
        merge: src.merge_commit_sha,
        base: Reference::new(&src.base.ref_name, BRANCH_PREFIX, src.base.sha),
        head: Reference::new(&src.head.ref_name, BRANCH_PREFIX, src.head.sha),
        author: convert_user(src.user),
        created: src.created_at,
        updated: src.updated_at,
        labels: src.labels.into_iter().map(convert_label).collect(),
    }
}

pub(crate) fn convert_issue(src: GhIssue) -> Issue {
    Issue {
        number: src.number,
        title: src.title,
        body: src.body,
        link: src.html_url,
        labels: src.labels.into_iter().map(|l| l.name).collect(),
        closed: src.state == "closed",
        locked: src.locked,
        author: convert_user(src.user),
        created: src.created_at,
        updated: src.updated_at,
    }
}

/// The pull request view of an issue that is a pull request.
///
/// Issue payloads lack branch information, so only the conversation fields
/// are filled in.
pub(crate) fn pull_request_from_issue(src: GhIssue) -> PullRequest {
    let (link, diff) = match src.pull_request {
        Some(pr) if !pr.html_url.is_empty() => (pr.html_url, pr.diff_url),
        Some(pr) => (src.html_url, pr.diff_url),
        None => (src.html_url, String::new()),
    };

    PullRequest {
        number: src.number,
        title: src.title,
        body: src.body,
        ref_name: format!("refs/pull/{}/head", src.number),
        link,
        diff,
        closed: src.state == "closed",
        author: convert_user(src.user),
        created: src.created_at,
        updated: src.updated_at,
        labels: src.labels.into_iter().map(convert_label).collect(),
        ..Default::default()
    }
}

pub(crate) fn convert_comment(src: GhComment) -> Comment {
    Comment {
        id: src.id,
        body: src.body,
        author: convert_user(src.user),
        link: src.html_url,
        created: src.created_at,
        updated: src.updated_at,
    }
}

pub(crate) fn convert_review_comment(src: GhReviewComment) -> Review {
    Review {
        id: src.id,
        body: src.body,
        path: src.path,
        sha: src.commit_id,
        line: src.line.or(src.original_line).unwrap_or_default(),
        link: src.html_url,
        author: convert_user(src.user),
        created: src.created_at,
        updated: src.updated_at,
    }
}

fn convert_git_signature(identity: GhGitIdentity, user: Option<GhUser>) -> Signature {
    let user = user.unwrap_or_default();
    Signature {
        name: identity.name,
        email: identity.email,
        login: user.login,
        avatar: user.avatar_url,
        date: identity.date,
    }
}

pub(crate) fn convert_commit(src: GhCommit) -> Commit {
    Commit {
        sha: src.sha,
        message: src.commit.message,
        author: convert_git_signature(src.commit.author, src.author),
        committer: convert_git_signature(src.commit.committer, src.committer),
        link: src.html_url,
    }
}

pub(crate) fn convert_file(src: GhFile) -> Change {
    Change {
        added: src.status == "added",
        renamed: src.status == "renamed",
        deleted: src.status == "removed",
        path: src.filename,
        previous_path: src.previous_filename,
        sha: src.sha,
    }
}

/// Reference for a ref that may be a branch, a tag or a bare SHA.
pub(crate) fn reference_for(reference: &str, sha: &str) -> Reference {
    if reference == sha {
        Reference {
            name: reference.to_string(),
            path: String::new(),
            sha: sha.to_string(),
        }
    } else {
        Reference::new(reference, BRANCH_PREFIX, sha)
    }
}

//! GitLab webhook payloads and their conversion into the canonical model.

use chrono::{DateTime, Utc};
use serde::Deserialize;

use crate::drivers::lenient::{datetime, id_string, nullable};
use crate::model::{
    split_full_name, Comment, Commit, Issue, Label, PullRequest, Reference, Repository,
    Signature, User, Visibility, BRANCH_PREFIX,
};

/// GitLab's numeric visibility levels.
const VISIBILITY_PRIVATE: i64 = 0;
const VISIBILITY_INTERNAL: i64 = 10;
const VISIBILITY_PUBLIC: i64 = 20;

#[derive(Debug, Clone, Default, Deserialize)]
pub(crate) struct GlProject {
    #[serde(default, deserialize_with = "id_string")]
    pub id: String,
    #[serde(default, deserialize_with = "nullable")]
    pub name: String,
    #[serde(default, deserialize_with = "nullable")]
    pub path_with_namespace: String,
    #[serde(default, deserialize_with = "nullable")]
    pub default_branch: String,
    #[serde(default)]
    pub visibility_level: Option<i64>,
    #[serde(default, deserialize_with = "nullable")]
    pub web_url: String,
    #[serde(default, deserialize_with = "nullable")]
    pub git_http_url: String,
    #[serde(default, deserialize_with = "nullable")]
    pub git_ssh_url: String,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub(crate) struct GlUser {
    #[serde(default, deserialize_with = "id_string")]
    pub id: String,
    #[serde(default, deserialize_with = "nullable")]
    pub name: String,
    #[serde(default, deserialize_with = "nullable")]
    pub username: String,
    #[serde(default, deserialize_with = "nullable")]
    pub email: String,
    #[serde(default, deserialize_with = "nullable")]
    pub avatar_url: String,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub(crate) struct GlAuthor {
    #[serde(default, deserialize_with = "nullable")]
    pub name: String,
    #[serde(default, deserialize_with = "nullable")]
    pub email: String,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub(crate) struct GlCommit {
    pub id: String,
    #[serde(default, deserialize_with = "nullable")]
    pub message: String,
    #[serde(default, deserialize_with = "datetime")]
    pub timestamp: Option<DateTime<Utc>>,
    #[serde(default, deserialize_with = "nullable")]
    pub url: String,
    #[serde(default, deserialize_with = "nullable")]
    pub author: GlAuthor,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub(crate) struct GlLabel {
    #[serde(default, deserialize_with = "nullable")]
    pub title: String,
    #[serde(default, deserialize_with = "nullable")]
    pub color: String,
}

/// Push and tag push events.
#[derive(Debug, Deserialize)]
pub(crate) struct GlPushHook {
    #[serde(default)]
    pub object_kind: String,
    #[serde(default, deserialize_with = "nullable")]
    pub before: String,
    #[serde(default, deserialize_with = "nullable")]
    pub after: String,
    #[serde(rename = "ref")]
    pub reference: String,
    #[serde(default, deserialize_with = "nullable")]
    pub checkout_sha: String,
    #[serde(default, deserialize_with = "id_string")]
    pub user_id: String,
    #[serde(default, deserialize_with = "nullable")]
    pub user_name: String,
    #[serde(default, deserialize_with = "nullable")]
    pub user_username: String,
    #[serde(default, deserialize_with = "nullable")]
    pub user_email: String,
    #[serde(default, deserialize_with = "nullable")]
    pub user_avatar: String,
    pub project: GlProject,
    #[serde(default, deserialize_with = "nullable")]
    pub commits: Vec<GlCommit>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub(crate) struct GlMergeRequestSide {
    #[serde(default, deserialize_with = "nullable")]
    pub path_with_namespace: String,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub(crate) struct GlMergeRequest {
    #[serde(default)]
    pub iid: i64,
    #[serde(default, deserialize_with = "nullable")]
    pub title: String,
    #[serde(default, deserialize_with = "nullable")]
    pub description: String,
    #[serde(default, deserialize_with = "nullable")]
    pub state: String,
    #[serde(default, deserialize_with = "nullable")]
    pub url: String,
    #[serde(default, deserialize_with = "nullable")]
    pub source_branch: String,
    #[serde(default, deserialize_with = "nullable")]
    pub target_branch: String,
    #[serde(default, deserialize_with = "nullable")]
    pub source: GlMergeRequestSide,
    #[serde(default)]
    pub last_commit: Option<GlCommit>,
    #[serde(default, deserialize_with = "nullable")]
    pub merge_commit_sha: String,
    #[serde(default, deserialize_with = "nullable")]
    pub work_in_progress: bool,
    #[serde(default, deserialize_with = "nullable")]
    pub action: String,
    #[serde(default, deserialize_with = "nullable")]
    pub oldrev: String,
    #[serde(default, deserialize_with = "datetime")]
    pub created_at: Option<DateTime<Utc>>,
    #[serde(default, deserialize_with = "datetime")]
    pub updated_at: Option<DateTime<Utc>>,
}

#[derive(Debug, Deserialize)]
pub(crate) struct GlMergeRequestHook {
    #[serde(default, deserialize_with = "nullable")]
    pub user: GlUser,
    pub project: GlProject,
    pub object_attributes: GlMergeRequest,
    #[serde(default, deserialize_with = "nullable")]
    pub labels: Vec<GlLabel>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub(crate) struct GlIssue {
    #[serde(default)]
    pub iid: i64,
    #[serde(default, deserialize_with = "nullable")]
    pub title: String,
    #[serde(default, deserialize_with = "nullable")]
    pub description: String,
    #[serde(default, deserialize_with = "nullable")]
    pub state: String,
    #[serde(default, deserialize_with = "nullable")]
    pub url: String,
    #[serde(default, deserialize_with = "nullable")]
    pub discussion_locked: bool,
    #[serde(default, deserialize_with = "nullable")]
    pub action: String,
    #[serde(default, deserialize_with = "datetime")]
    pub created_at: Option<DateTime<Utc>>,
    #[serde(default, deserialize_with = "datetime")]
    pub updated_at: Option<DateTime<Utc>>,
}

#[derive(Debug, Deserialize)]
pub(crate) struct GlIssueHook {
    #[serde(default, deserialize_with = "nullable")]
    pub user: GlUser,
    pub project: GlProject,
    pub object_attributes: GlIssue,
    #[serde(default, deserialize_with = "nullable")]
    pub labels: Vec<GlLabel>,
}

#[derive(Debug, Deserialize)]
pub(crate) struct GlNote {
    #[serde(default)]
    pub id: i64,
    #[serde(default, deserialize_with = "nullable")]
    pub note: String,
    #[serde(default, deserialize_with = "nullable")]
    pub noteable_type: String,
    #[serde(default, deserialize_with = "nullable")]
    pub url: String,
    #[serde(default, deserialize_with = "nullable")]
    pub action: String,
    #[serde(default, deserialize_with = "datetime")]
    pub created_at: Option<DateTime<Utc>>,
    #[serde(default, deserialize_with = "datetime")]
    pub updated_at: Option<DateTime<Utc>>,
}

#[derive(Debug, Deserialize)]
pub(crate) struct GlNoteHook {
    #[serde(default, deserialize_with = "nullable")]
    pub user: GlUser,
    pub project: GlProject,
    pub object_attributes: GlNote,
    #[serde(default)]
    pub merge_request: Option<GlMergeRequest>,
    #[serde(default)]
    pub issue: Option<GlIssue>,
}

// ============================================================================
// Converters
// ============================================================================

pub(crate) fn convert_project(src: GlProject) -> Repository {
    let (namespace, _) = split_full_name(&src.path_with_namespace);
    let level = src.visibility_level.unwrap_or(VISIBILITY_PRIVATE);
    let visibility = match level {
        VISIBILITY_PUBLIC => Visibility::Public,
        VISIBILITY_INTERNAL => Visibility::Internal,
        _ => Visibility::Private,
    };

    Repository {
        id: src.id,
        namespace: namespace.to_string(),
        name: src.name,
        full_name: src.path_with_namespace.clone(),
        perm: None,
        branch: src.default_branch,
        archived: false,
        private: level != VISIBILITY_PUBLIC,
        visibility,
        clone: src.git_http_url,
        clone_ssh: src.git_ssh_url,
        link: src.web_url,
        created: None,
        updated: None,
    }
}

pub(crate) fn convert_user(src: GlUser) -> User {
    User {
        id: src.id,
        login: src.username,
        name: src.name,
        email: src.email,
        avatar: src.avatar_url,
        created: None,
        updated: None,
    }
}

fn convert_labels(labels: Vec<GlLabel>) -> Vec<Label> {
    labels
        .into_iter()
        .map(|l| Label {
            name: l.title,
            color: l.color,
        })
        .collect()
}

pub(crate) fn convert_commit(src: GlCommit) -> Commit {
    let author = Signature {
        name: src.author.name,
        email: src.author.email,
        login: String::new(),
        avatar: String::new(),
        date: src.timestamp,
    };
    Commit {
        sha: src.id,
        message: src.message,
        committer: author.clone(),
        author,
        link: src.url,
    }
}

/// The pusher of a push event, as a user and as a commit signature.
pub(crate) fn push_sender(src: &GlPushHook) -> (User, Signature) {
    let user = User {
        id: src.user_id.clone(),
        login: src.user_username.clone(),
        name: src.user_name.clone(),
        email: src.user_email.clone(),
        avatar: src.user_avatar.clone(),
        created: None,
        updated: None,
    };
    let signature = Signature {
        name: src.user_name.clone(),
        email: src.user_email.clone(),
        login: src.user_username.clone(),
        avatar: src.user_avatar.clone(),
        date: None,
    };
    (user, signature)
}

pub(crate) fn convert_merge_request(
    src: GlMergeRequest,
    labels: Vec<GlLabel>,
    author: User,
) -> PullRequest {
    let sha = src
        .last_commit
        .as_ref()
        .map(|c| c.id.clone())
        .unwrap_or_default();

    PullRequest {
        number: src.iid,
        title: src.title,
        body: src.description,
        ref_name: format!("refs/merge-requests/{}/head", src.iid),
        source: src.source_branch.clone(),
        target: src.target_branch.clone(),
        fork: src.source.path_with_namespace,
        link: src.url,
        diff: String::new(),
        draft: src.work_in_progress,
        closed: src.state != "opened",
        merged: src.state == "merged",
        merge: src.merge_commit_sha,
        base: Reference::new(&src.target_branch, BRANCH_PREFIX, ""),
        head: Reference::new(&src.source_branch, BRANCH_PREFIX, sha.clone()),
        sha,
        author,
        created: src.created_at,
        updated: src.updated_at,
        labels: convert_labels(labels),
    }
}

pub(crate) fn convert_issue(src: GlIssue, labels: Vec<GlLabel>, author: User) -> Issue {
    Issue {
        number: src.iid,
        title: src.title,
        body: src.description,
        link: src.url,
        labels: labels.into_iter().map(|l| l.title).collect(),
        closed: src.state == "closed",
        locked: src.discussion_locked,
        author,
        created: src.created_at,
        updated: src.updated_at,
    }
}

pub(crate) fn convert_note(src: GlNote, author: User) -> Comment {
    Comment {
        id: src.id,
        body: src.note,
        author,
        link: src.url,
        created: src.created_at,
        updated: src.updated_at,
    }
}

//! Harness Code webhook payloads.
//!
//! Every trigger shares one envelope; which fields are populated depends on
//! the trigger.

use chrono::{DateTime, Utc};
use serde::Deserialize;

use crate::drivers::lenient::{datetime, id_string, nullable};
use crate::model::{
    split_full_name, Comment, Commit, PullRequest, Reference, Repository, Signature, User,
    Visibility, BRANCH_PREFIX,
};

#[derive(Debug, Clone, Default, Deserialize)]
pub(crate) struct HnRepository {
    #[serde(default, deserialize_with = "id_string")]
    pub id: String,
    #[serde(default, deserialize_with = "nullable")]
    pub path: String,
    #[serde(default, deserialize_with = "nullable")]
    pub identifier: String,
    #[serde(default, deserialize_with = "nullable")]
    pub default_branch: String,
    #[serde(default, deserialize_with = "nullable")]
    pub is_public: bool,
    #[serde(default, deserialize_with = "nullable")]
    pub git_url: String,
    #[serde(default, deserialize_with = "nullable")]
    pub git_ssh_url: String,
    #[serde(default, deserialize_with = "nullable")]
    pub url: String,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub(crate) struct HnPrincipal {
    #[serde(default, deserialize_with = "id_string")]
    pub id: String,
    #[serde(default, deserialize_with = "nullable")]
    pub uid: String,
    #[serde(default, deserialize_with = "nullable")]
    pub display_name: String,
    #[serde(default, deserialize_with = "nullable")]
    pub email: String,
    #[serde(default, deserialize_with = "datetime")]
    pub created: Option<DateTime<Utc>>,
    #[serde(default, deserialize_with = "datetime")]
    pub updated: Option<DateTime<Utc>>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub(crate) struct HnRef {
    #[serde(default, deserialize_with = "nullable")]
    pub name: String,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub(crate) struct HnIdentity {
    #[serde(default, deserialize_with = "nullable")]
    pub name: String,
    #[serde(default, deserialize_with = "nullable")]
    pub email: String,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub(crate) struct HnSignature {
    #[serde(default, deserialize_with = "nullable")]
    pub identity: HnIdentity,
    #[serde(default, deserialize_with = "datetime")]
    pub when: Option<DateTime<Utc>>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub(crate) struct HnCommit {
    #[serde(default, deserialize_with = "nullable")]
    pub sha: String,
    #[serde(default, deserialize_with = "nullable")]
    pub message: String,
    #[serde(default, deserialize_with = "nullable")]
    pub author: HnSignature,
    #[serde(default, deserialize_with = "nullable")]
    pub committer: HnSignature,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub(crate) struct HnPullRequest {
    pub number: i64,
    #[serde(default, deserialize_with = "nullable")]
    pub state: String,
    #[serde(default, deserialize_with = "nullable")]
    pub is_draft: bool,
    #[serde(default, deserialize_with = "nullable")]
    pub title: String,
    #[serde(default, deserialize_with = "nullable")]
    pub description: String,
    #[serde(default, deserialize_with = "nullable")]
    pub source_branch: String,
    #[serde(default, deserialize_with = "nullable")]
    pub target_branch: String,
    #[serde(default, deserialize_with = "nullable")]
    pub merge_sha: String,
    #[serde(default, deserialize_with = "nullable")]
    pub author: HnPrincipal,
    #[serde(default, deserialize_with = "nullable")]
    pub pr_url: String,
    #[serde(default, deserialize_with = "datetime")]
    pub created: Option<DateTime<Utc>>,
    #[serde(default, deserialize_with = "datetime")]
    pub edited: Option<DateTime<Utc>>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub(crate) struct HnComment {
    #[serde(default)]
    pub id: i64,
    #[serde(default, deserialize_with = "nullable")]
    pub text: String,
}

#[derive(Debug, Deserialize)]
pub(crate) struct HnPayload {
    #[serde(default, deserialize_with = "nullable")]
    pub repo: HnRepository,
    #[serde(default, deserialize_with = "nullable")]
    pub principal: HnPrincipal,
    #[serde(rename = "ref", default, deserialize_with = "nullable")]
    pub reference: HnRef,
    #[serde(default, deserialize_with = "nullable")]
    pub sha: String,
    #[serde(default, deserialize_with = "nullable")]
    pub old_sha: String,
    #[serde(default)]
    pub commit: Option<HnCommit>,
    #[serde(default)]
    pub head_commit: Option<HnCommit>,
    #[serde(default, deserialize_with = "nullable")]
    pub commits: Vec<HnCommit>,
    #[serde(default)]
    pub pull_req: Option<HnPullRequest>,
    #[serde(default)]
    pub comment: Option<HnComment>,
}

// ============================================================================
// Converters
// ============================================================================

pub(crate) fn convert_repository(src: HnRepository) -> Repository {
    let namespace = split_full_name(&src.path).0.to_string();
    let private = !src.is_public;

    Repository {
        id: src.id,
        namespace,
        name: src.identifier,
        full_name: src.path,
        perm: None,
        branch: src.default_branch,
        archived: false,
        private,
        visibility: Visibility::from_provider(None, private),
        clone: src.git_url,
        clone_ssh: src.git_ssh_url,
        link: src.url,
        created: None,
        updated: None,
    }
}

pub(crate) fn convert_principal(src: HnPrincipal) -> User {
    User {
        id: src.id,
        login: src.uid,
        name: src.display_name,
        email: src.email,
        avatar: String::new(),
        created: src.created,
        updated: src.updated,
    }
}

fn convert_signature(src: HnSignature) -> Signature {
    Signature {
        name: src.identity.name,
        email: src.identity.email,
        login: String::new(),
        avatar: String::new(),
        date: src.when,
    }
}

pub(crate) fn convert_commit(src: HnCommit) -> Commit {
    Commit {
        sha: src.sha,
        message: src.message,
        author: convert_signature(src.author),
        committer: convert_signature(src.committer),
        link: String::new(),
    }
}

/// Commit signature standing in for the pusher when no commit is attached.
pub(crate) fn principal_signature(user: &User) -> Signature {
    Signature {
        name: user.name.clone(),
        email: user.email.clone(),
        login: user.login.clone(),
        avatar: user.avatar.clone(),
        date: None,
    }
}

pub(crate) fn convert_pull_request(src: HnPullRequest, sha: &str, fork: &str) -> PullRequest {
    PullRequest {
        number: src.number,
        title: src.title,
        body: src.description,
        sha: sha.to_string(),
        ref_name: format!("refs/pullreq/{}/head", src.number),
        base: Reference::new(&src.target_branch, BRANCH_PREFIX, ""),
        head: Reference::new(&src.source_branch, BRANCH_PREFIX, sha),
        source: src.source_branch,
        target: src.target_branch,
        fork: fork.to_string(),
        link: src.pr_url,
        diff: String::new(),
        draft: src.is_draft,
        closed: src.state != "open",
        merged: src.state == "merged",
        merge: src.merge_sha,
        author: convert_principal(src.author),
        created: src.created,
        updated: src.edited,
        labels: Vec::new(),
    }
}

pub(crate) fn convert_comment(src: HnComment, author: User) -> Comment {
    Comment {
        id: src.id,
        body: src.text,
        author,
        link: String::new(),
        created: None,
        updated: None,
    }
}

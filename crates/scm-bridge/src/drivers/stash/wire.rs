//! Bitbucket Server webhook payloads.

use chrono::{DateTime, Utc};
use serde::Deserialize;

use crate::drivers::lenient::{datetime, id_string, nullable};
use crate::model::{
    join_full_name, Comment, PullRequest, Reference, Repository, Signature, User, Visibility,
    BRANCH_PREFIX,
};

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct StUser {
    #[serde(default, deserialize_with = "id_string")]
    pub id: String,
    #[serde(default, deserialize_with = "nullable")]
    pub name: String,
    #[serde(default, deserialize_with = "nullable")]
    pub slug: String,
    #[serde(default, deserialize_with = "nullable")]
    pub display_name: String,
    #[serde(default, deserialize_with = "nullable")]
    pub email_address: String,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub(crate) struct StLink {
    #[serde(default, deserialize_with = "nullable")]
    pub href: String,
    #[serde(default, deserialize_with = "nullable")]
    pub name: String,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub(crate) struct StLinks {
    #[serde(default, deserialize_with = "nullable")]
    pub clone: Vec<StLink>,
    #[serde(rename = "self", default, deserialize_with = "nullable")]
    pub self_link: Vec<StLink>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub(crate) struct StProject {
    #[serde(default, deserialize_with = "nullable")]
    pub key: String,
    #[serde(default, deserialize_with = "nullable")]
    pub public: bool,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub(crate) struct StRepository {
    #[serde(default, deserialize_with = "id_string")]
    pub id: String,
    #[serde(default, deserialize_with = "nullable")]
    pub slug: String,
    #[serde(default, deserialize_with = "nullable")]
    pub name: String,
    #[serde(default, deserialize_with = "nullable")]
    pub project: StProject,
    #[serde(default, deserialize_with = "nullable")]
    pub public: bool,
    #[serde(default, deserialize_with = "nullable")]
    pub archived: bool,
    #[serde(default, deserialize_with = "nullable")]
    pub links: StLinks,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct StRef {
    #[serde(default, deserialize_with = "nullable")]
    pub id: String,
    #[serde(default, deserialize_with = "nullable")]
    pub display_id: String,
    #[serde(rename = "type", default, deserialize_with = "nullable")]
    pub ref_type: String,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct StChange {
    #[serde(rename = "ref", default, deserialize_with = "nullable")]
    pub reference: StRef,
    #[serde(default, deserialize_with = "nullable")]
    pub ref_id: String,
    #[serde(default, deserialize_with = "nullable")]
    pub from_hash: String,
    #[serde(default, deserialize_with = "nullable")]
    pub to_hash: String,
    #[serde(rename = "type", default, deserialize_with = "nullable")]
    pub change_type: String,
}

#[derive(Debug, Deserialize)]
pub(crate) struct StPushHook {
    #[serde(default, deserialize_with = "nullable")]
    pub actor: StUser,
    pub repository: StRepository,
    #[serde(default, deserialize_with = "nullable")]
    pub changes: Vec<StChange>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct StPullRequestRef {
    #[serde(default, deserialize_with = "nullable")]
    pub id: String,
    #[serde(default, deserialize_with = "nullable")]
    pub display_id: String,
    #[serde(default, deserialize_with = "nullable")]
    pub latest_commit: String,
    #[serde(default, deserialize_with = "nullable")]
    pub repository: StRepository,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub(crate) struct StParticipant {
    #[serde(default, deserialize_with = "nullable")]
    pub user: StUser,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct StPullRequest {
    pub id: i64,
    #[serde(default, deserialize_with = "nullable")]
    pub title: String,
    #[serde(default, deserialize_with = "nullable")]
    pub description: String,
    #[serde(default, deserialize_with = "nullable")]
    pub state: String,
    #[serde(default, deserialize_with = "nullable")]
    pub closed: bool,
    #[serde(default, deserialize_with = "nullable")]
    pub from_ref: StPullRequestRef,
    #[serde(default, deserialize_with = "nullable")]
    pub to_ref: StPullRequestRef,
    #[serde(default, deserialize_with = "nullable")]
    pub author: StParticipant,
    #[serde(default, deserialize_with = "nullable")]
    pub links: StLinks,
    #[serde(default, deserialize_with = "datetime")]
    pub created_date: Option<DateTime<Utc>>,
    #[serde(default, deserialize_with = "datetime")]
    pub updated_date: Option<DateTime<Utc>>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct StPullRequestHook {
    #[serde(default, deserialize_with = "nullable")]
    pub actor: StUser,
    pub pull_request: StPullRequest,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct StComment {
    pub id: i64,
    #[serde(default, deserialize_with = "nullable")]
    pub text: String,
    #[serde(default, deserialize_with = "nullable")]
    pub author: StUser,
    #[serde(default, deserialize_with = "datetime")]
    pub created_date: Option<DateTime<Utc>>,
    #[serde(default, deserialize_with = "datetime")]
    pub updated_date: Option<DateTime<Utc>>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct StCommentHook {
    #[serde(default, deserialize_with = "nullable")]
    pub actor: StUser,
    pub pull_request: StPullRequest,
    pub comment: StComment,
}

// ============================================================================
// Converters
// ============================================================================

pub(crate) fn convert_user(src: StUser) -> User {
    User {
        id: src.id,
        login: if src.slug.is_empty() { src.name } else { src.slug },
        name: src.display_name,
        email: src.email_address,
        avatar: String::new(),
        created: None,
        updated: None,
    }
}

pub(crate) fn signature(user: &User) -> Signature {
    Signature {
        name: user.name.clone(),
        email: user.email.clone(),
        login: user.login.clone(),
        avatar: user.avatar.clone(),
        date: None,
    }
}

fn clone_link(links: &StLinks, name: &str) -> String {
    links
        .clone
        .iter()
        .find(|l| l.name == name)
        .map(|l| l.href.clone())
        .unwrap_or_default()
}

fn self_link(links: &StLinks) -> String {
    links
        .self_link
        .first()
        .map(|l| l.href.clone())
        .unwrap_or_default()
}

/// Bitbucket Server does not report a default branch in webhooks.
pub(crate) fn convert_repository(src: StRepository) -> Repository {
    let private = !src.public;

    Repository {
        id: src.id,
        full_name: join_full_name(&src.project.key, &src.slug),
        namespace: src.project.key,
        name: src.slug,
        perm: None,
        branch: "master".to_string(),
        archived: src.archived,
        private,
        visibility: Visibility::from_provider(None, private),
        clone: clone_link(&src.links, "http"),
        clone_ssh: clone_link(&src.links, "ssh"),
        link: self_link(&src.links),
        created: None,
        updated: None,
    }
}

/// Browse link of a commit, derived from the repository's browse link.
pub(crate) fn commit_link(repo: &Repository, sha: &str) -> String {
    match repo.link.strip_suffix("/browse") {
        Some(base) => format!("{}/commits/{}", base, sha),
        None => String::new(),
    }
}

pub(crate) fn convert_pull_request(src: StPullRequest) -> PullRequest {
    let fork = {
        let repo = &src.from_ref.repository;
        join_full_name(&repo.project.key, &repo.slug)
    };

    PullRequest {
        number: src.id,
        title: src.title,
        body: src.description,
        sha: src.from_ref.latest_commit.clone(),
        ref_name: format!("refs/pull-requests/{}/from", src.id),
        source: src.from_ref.display_id.clone(),
        target: src.to_ref.display_id.clone(),
        fork,
        link: self_link(&src.links),
        diff: String::new(),
        draft: false,
        closed: src.closed,
        merged: src.state == "MERGED",
        merge: String::new(),
        base: Reference::new(&src.to_ref.id, BRANCH_PREFIX, src.to_ref.latest_commit),
        head: Reference::new(&src.from_ref.id, BRANCH_PREFIX, src.from_ref.latest_commit),
        author: convert_user(src.author.user),
        created: src.created_date,
        updated: src.updated_date,
        labels: Vec::new(),
    }
}

pub(crate) fn convert_comment(src: StComment) -> Comment {
    Comment {
        id: src.id,
        body: src.text,
        author: convert_user(src.author),
        link: String::new(),
        created: src.created_date,
        updated: src.updated_date,
    }
}

//! Git references, commits and ref-name helpers.

use chrono::{DateTime, Utc};
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::sync::LazyLock;

/// Prefix of fully qualified branch refs.
pub const BRANCH_PREFIX: &str = "refs/heads/";

/// Prefix of fully qualified tag refs.
pub const TAG_PREFIX: &str = "refs/tags/";

/// The all-zero SHA providers send for the missing side of a create or delete.
pub const EMPTY_COMMIT: &str = "0000000000000000000000000000000000000000";

static PULL_REQUEST_REF: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^refs/(?:pull|merge-requests)/(\d+)/(?:head|merge)$")
        .expect("pull request ref regex is valid")
});

/// A named git reference.
///
/// `name` never carries a `refs/` prefix; `path` is the fully qualified form.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Reference {
    pub name: String,
    pub path: String,
    pub sha: String,
}

impl Reference {
    /// Build a reference from any ref spelling, qualifying it with `prefix`
    /// when it is short.
    pub fn new(reference: &str, prefix: &str, sha: impl Into<String>) -> Self {
        let path = expand_ref(reference, prefix);
        Self {
            name: short_name(&path).to_string(),
            path,
            sha: sha.into(),
        }
    }

    /// Reference to a branch.
    pub fn branch(name: &str, sha: impl Into<String>) -> Self {
        Self::new(name, BRANCH_PREFIX, sha)
    }

    /// Reference to a tag.
    pub fn tag(name: &str, sha: impl Into<String>) -> Self {
        Self::new(name, TAG_PREFIX, sha)
    }
}

/// Author or committer identity attached to a commit.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Signature {
    pub name: String,
    pub email: String,
    pub login: String,
    pub avatar: String,
    pub date: Option<DateTime<Utc>>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Commit {
    pub sha: String,
    pub message: String,
    pub author: Signature,
    pub committer: Signature,
    pub link: String,
}

/// A file changed by a commit or pull request.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Change {
    pub path: String,
    pub previous_path: String,
    pub added: bool,
    pub renamed: bool,
    pub deleted: bool,
    pub sha: String,
}

/// Strip a `refs/heads/` or `refs/tags/` prefix.
///
/// # Examples
///
/// ```rust
/// use scm_bridge::model::trim_ref;
///
/// assert_eq!(trim_ref("refs/heads/main"), "main");
/// assert_eq!(trim_ref("refs/tags/v1.0"), "v1.0");
/// assert_eq!(trim_ref("main"), "main");
/// ```
pub fn trim_ref(reference: &str) -> &str {
    reference
        .strip_prefix(BRANCH_PREFIX)
        .or_else(|| reference.strip_prefix(TAG_PREFIX))
        .unwrap_or(reference)
}

/// Display name for a qualified ref: branch and tag prefixes are trimmed,
/// any other ref loses its leading `refs/` (`refs/pull/5/head` is `pull/5/head`).
fn short_name(path: &str) -> &str {
    let trimmed = trim_ref(path);
    trimmed.strip_prefix("refs/").unwrap_or(trimmed)
}

/// Qualify a short ref name with `prefix`. Names already under `refs/` are
/// returned unchanged.
///
/// ```rust
/// use scm_bridge::model::expand_ref;
///
/// assert_eq!(expand_ref("main", "refs/heads/"), "refs/heads/main");
/// assert_eq!(expand_ref("refs/tags/v1", "refs/heads/"), "refs/tags/v1");
/// ```
pub fn expand_ref(reference: &str, prefix: &str) -> String {
    if reference.starts_with("refs/") {
        reference.to_string()
    } else {
        format!("{}{}", prefix, reference)
    }
}

pub fn is_branch(reference: &str) -> bool {
    reference.starts_with(BRANCH_PREFIX)
}

pub fn is_tag(reference: &str) -> bool {
    reference.starts_with(TAG_PREFIX)
}

/// True for GitHub `refs/pull/<n>/...` and GitLab `refs/merge-requests/<n>/...` refs.
pub fn is_pull_request(reference: &str) -> bool {
    PULL_REQUEST_REF.is_match(reference)
}

/// Pull request number encoded in a pull request ref.
///
/// ```rust
/// use scm_bridge::model::extract_pull_request;
///
/// assert_eq!(extract_pull_request("refs/pull/42/head"), Some(42));
/// assert_eq!(extract_pull_request("refs/merge-requests/7/head"), Some(7));
/// assert_eq!(extract_pull_request("refs/heads/main"), None);
/// ```
pub fn extract_pull_request(reference: &str) -> Option<i64> {
    PULL_REQUEST_REF
        .captures(reference)
        .and_then(|caps| caps.get(1))
        .and_then(|m| m.as_str().parse().ok())
}

/// True when `sha` is empty or the all-zero SHA.
pub fn is_empty_commit(sha: &str) -> bool {
    sha.is_empty() || sha.chars().all(|c| c == '0')
}

/// Split `namespace/name` at the last slash. Nested namespaces stay intact.
///
/// ```rust
/// use scm_bridge::model::split_full_name;
///
/// assert_eq!(split_full_name("group/sub/project"), ("group/sub", "project"));
/// assert_eq!(split_full_name("project"), ("", "project"));
/// ```
pub fn split_full_name(full_name: &str) -> (&str, &str) {
    match full_name.rsplit_once('/') {
        Some((namespace, name)) => (namespace, name),
        None => ("", full_name),
    }
}

pub fn join_full_name(namespace: &str, name: &str) -> String {
    if namespace.is_empty() {
        name.to_string()
    } else {
        format!("{}/{}", namespace, name)
    }
}

#[cfg(test)]
#[path = "git_tests.rs"]
mod tests;

//! # Driver Service Set
//!
//! Provider-neutral service interfaces. A driver that talks to its
//! provider's REST API implements these traits; callers reach them through
//! [`Client`](crate::Client).
//!
//! Repositories are addressed by their full name (`namespace/name`).

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::error::ApiError;
use crate::model::{
    Change, Comment, CommentInput, Commit, Content, ContentParams, Hook, HookInput, Issue,
    IssueInput, Membership, Organization, Perm, PullRequest, PullRequestInput, Reference,
    Repository, Review, ReviewInput, Status, StatusInput, User,
};
use crate::pagination::{ListOptions, PagedResponse};

// ============================================================================
// Option Types
// ============================================================================

/// Options for listing commits.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CommitListOptions {
    /// Branch, tag or SHA to list from. Empty means the default branch.
    #[serde(rename = "ref")]
    pub ref_name: String,
    /// Only commits touching this path
    pub path: String,
    pub page: ListOptions,
}

/// Options for listing pull requests and issues.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct StateListOptions {
    pub page: ListOptions,
    pub open: bool,
    pub closed: bool,
}

impl StateListOptions {
    /// Provider `state` filter for these flags.
    pub fn state(&self) -> &'static str {
        match (self.open, self.closed) {
            (true, false) => "open",
            (false, true) => "closed",
            _ => "all",
        }
    }
}

// ============================================================================
// Service Traits
// ============================================================================

#[async_trait]
pub trait RepositoryService: Send + Sync {
    async fn find(&self, repo: &str) -> Result<Repository, ApiError>;

    /// Permissions of the authenticated user on `repo`.
    async fn find_perms(&self, repo: &str) -> Result<Perm, ApiError>;

    /// Repositories visible to the authenticated user.
    async fn list(&self, opts: &ListOptions) -> Result<PagedResponse<Repository>, ApiError>;

    async fn list_hooks(
        &self,
        repo: &str,
        opts: &ListOptions,
    ) -> Result<PagedResponse<Hook>, ApiError>;

    async fn find_hook(&self, repo: &str, id: &str) -> Result<Hook, ApiError>;

    async fn create_hook(&self, repo: &str, input: &HookInput) -> Result<Hook, ApiError>;

    async fn delete_hook(&self, repo: &str, id: &str) -> Result<(), ApiError>;

    async fn list_status(
        &self,
        repo: &str,
        reference: &str,
        opts: &ListOptions,
    ) -> Result<PagedResponse<Status>, ApiError>;

    async fn create_status(
        &self,
        repo: &str,
        reference: &str,
        input: &StatusInput,
    ) -> Result<Status, ApiError>;
}

#[async_trait]
pub trait GitService: Send + Sync {
    async fn find_branch(&self, repo: &str, name: &str) -> Result<Reference, ApiError>;

    async fn find_commit(&self, repo: &str, reference: &str) -> Result<Commit, ApiError>;

    async fn find_tag(&self, repo: &str, name: &str) -> Result<Reference, ApiError>;

    async fn list_branches(
        &self,
        repo: &str,
        opts: &ListOptions,
    ) -> Result<PagedResponse<Reference>, ApiError>;

    async fn list_tags(
        &self,
        repo: &str,
        opts: &ListOptions,
    ) -> Result<PagedResponse<Reference>, ApiError>;

    async fn list_commits(
        &self,
        repo: &str,
        opts: &CommitListOptions,
    ) -> Result<PagedResponse<Commit>, ApiError>;

    /// Files changed by a single commit.
    async fn list_changes(
        &self,
        repo: &str,
        sha: &str,
        opts: &ListOptions,
    ) -> Result<PagedResponse<Change>, ApiError>;

    /// Files changed between two refs.
    async fn compare_changes(
        &self,
        repo: &str,
        source: &str,
        target: &str,
        opts: &ListOptions,
    ) -> Result<PagedResponse<Change>, ApiError>;
}

#[async_trait]
pub trait PullRequestService: Send + Sync {
    async fn find(&self, repo: &str, number: i64) -> Result<PullRequest, ApiError>;

    async fn list(
        &self,
        repo: &str,
        opts: &StateListOptions,
    ) -> Result<PagedResponse<PullRequest>, ApiError>;

    async fn create(&self, repo: &str, input: &PullRequestInput)
        -> Result<PullRequest, ApiError>;

    async fn merge(&self, repo: &str, number: i64) -> Result<(), ApiError>;

    async fn close(&self, repo: &str, number: i64) -> Result<(), ApiError>;

    async fn list_changes(
        &self,
        repo: &str,
        number: i64,
        opts: &ListOptions,
    ) -> Result<PagedResponse<Change>, ApiError>;

    async fn find_comment(&self, repo: &str, number: i64, id: i64)
        -> Result<Comment, ApiError>;

    async fn list_comments(
        &self,
        repo: &str,
        number: i64,
        opts: &ListOptions,
    ) -> Result<PagedResponse<Comment>, ApiError>;

    async fn create_comment(
        &self,
        repo: &str,
        number: i64,
        input: &CommentInput,
    ) -> Result<Comment, ApiError>;

    async fn delete_comment(&self, repo: &str, number: i64, id: i64) -> Result<(), ApiError>;
}

#[async_trait]
pub trait IssueService: Send + Sync {
    async fn find(&self, repo: &str, number: i64) -> Result<Issue, ApiError>;

    async fn list(
        &self,
        repo: &str,
        opts: &StateListOptions,
    ) -> Result<PagedResponse<Issue>, ApiError>;

    async fn create(&self, repo: &str, input: &IssueInput) -> Result<Issue, ApiError>;

    async fn close(&self, repo: &str, number: i64) -> Result<(), ApiError>;

    async fn lock(&self, repo: &str, number: i64) -> Result<(), ApiError>;

    async fn unlock(&self, repo: &str, number: i64) -> Result<(), ApiError>;

    async fn find_comment(&self, repo: &str, number: i64, id: i64)
        -> Result<Comment, ApiError>;

    async fn list_comments(
        &self,
        repo: &str,
        number: i64,
        opts: &ListOptions,
    ) -> Result<PagedResponse<Comment>, ApiError>;

    async fn create_comment(
        &self,
        repo: &str,
        number: i64,
        input: &CommentInput,
    ) -> Result<Comment, ApiError>;

    async fn delete_comment(&self, repo: &str, number: i64, id: i64) -> Result<(), ApiError>;
}

#[async_trait]
pub trait UserService: Send + Sync {
    /// The authenticated user.
    async fn find(&self) -> Result<User, ApiError>;

    async fn find_login(&self, login: &str) -> Result<User, ApiError>;

    /// Primary email of the authenticated user.
    async fn find_email(&self) -> Result<String, ApiError>;
}

#[async_trait]
pub trait OrganizationService: Send + Sync {
    async fn find(&self, name: &str) -> Result<Organization, ApiError>;

    /// Organizations of the authenticated user.
    async fn list(&self, opts: &ListOptions) -> Result<PagedResponse<Organization>, ApiError>;

    async fn find_membership(&self, name: &str, user: &str) -> Result<Membership, ApiError>;
}

/// Line comments on pull request diffs.
#[async_trait]
pub trait ReviewService: Send + Sync {
    async fn find(&self, repo: &str, number: i64, id: i64) -> Result<Review, ApiError>;

    async fn list(
        &self,
        repo: &str,
        number: i64,
        opts: &ListOptions,
    ) -> Result<PagedResponse<Review>, ApiError>;

    async fn create(
        &self,
        repo: &str,
        number: i64,
        input: &ReviewInput,
    ) -> Result<Review, ApiError>;

    async fn delete(&self, repo: &str, number: i64, id: i64) -> Result<(), ApiError>;
}

#[async_trait]
pub trait ContentService: Send + Sync {
    /// Read a file at `reference`.
    async fn find(&self, repo: &str, path: &str, reference: &str) -> Result<Content, ApiError>;

    async fn create(&self, repo: &str, path: &str, params: &ContentParams)
        -> Result<(), ApiError>;

    async fn update(&self, repo: &str, path: &str, params: &ContentParams)
        -> Result<(), ApiError>;

    async fn delete(&self, repo: &str, path: &str, params: &ContentParams)
        -> Result<(), ApiError>;
}

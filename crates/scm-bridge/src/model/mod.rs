//! # Canonical Domain Model
//!
//! Provider-neutral types shared by every driver. Drivers convert their
//! native payloads into these types; nothing here knows about any provider.

mod action;
mod git;
mod pull_request;
mod repository;
mod user;
mod webhook;

pub use action::{Action, State};
pub use git::{
    expand_ref, extract_pull_request, is_branch, is_empty_commit, is_pull_request, is_tag,
    join_full_name, split_full_name, trim_ref, Change, Commit, Reference, Signature,
    BRANCH_PREFIX, EMPTY_COMMIT, TAG_PREFIX,
};
pub use pull_request::{
    Comment, CommentInput, Issue, IssueInput, Label, PullRequest, PullRequestInput, Review,
    ReviewInput,
};
pub use repository::{Hook, HookEvents, HookInput, Perm, Repository, Status, StatusInput, Visibility};
pub use user::{Content, ContentParams, Membership, Organization, Role, User};
pub use webhook::{
    BranchHook, DeployHook, IssueCommentHook, IssueHook, PullRequestCommentHook, PullRequestHook,
    PushHook, ReviewCommentHook, TagHook, Webhook, WebhookKind,
};

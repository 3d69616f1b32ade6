//! Repositories, repository webhooks and commit statuses.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::action::State;

/// A hosted repository.
///
/// `id` is opaque: some providers use integers, others path strings.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Repository {
    pub id: String,
    pub namespace: String,
    pub name: String,
    pub full_name: String,
    pub perm: Option<Perm>,
    /// Default branch
    pub branch: String,
    pub archived: bool,
    pub private: bool,
    pub visibility: Visibility,
    pub clone: String,
    pub clone_ssh: String,
    pub link: String,
    pub created: Option<DateTime<Utc>>,
    pub updated: Option<DateTime<Utc>>,
}

/// Caller's permissions on a repository.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Perm {
    pub pull: bool,
    pub push: bool,
    pub admin: bool,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Visibility {
    #[default]
    Undefined,
    Public,
    Internal,
    Private,
}

impl Visibility {
    /// Map a provider visibility string. Unrecognised values fall back to the
    /// `private` flag.
    pub fn from_provider(value: Option<&str>, private: bool) -> Self {
        match value {
            Some("public") => Self::Public,
            Some("internal") => Self::Internal,
            Some("private") => Self::Private,
            _ if private => Self::Private,
            _ => Self::Public,
        }
    }
}

/// A webhook registered on a repository.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Hook {
    pub id: String,
    pub name: String,
    pub target: String,
    pub events: Vec<String>,
    pub active: bool,
    pub skip_verify: bool,
}

/// Parameters for registering a webhook.
#[derive(Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct HookInput {
    pub name: String,
    pub target: String,
    pub secret: String,
    pub events: HookEvents,
    /// Provider-native event names, used verbatim in addition to `events`
    pub native_events: Vec<String>,
    pub skip_verify: bool,
}

// Keep the shared secret out of logs.
impl std::fmt::Debug for HookInput {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("HookInput")
            .field("name", &self.name)
            .field("target", &self.target)
            .field("secret", &"<REDACTED>")
            .field("events", &self.events)
            .field("native_events", &self.native_events)
            .field("skip_verify", &self.skip_verify)
            .finish()
    }
}

/// Canonical event selection for a webhook registration.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct HookEvents {
    pub branch: bool,
    pub deployment: bool,
    pub issue: bool,
    pub issue_comment: bool,
    pub pull_request: bool,
    pub pull_request_comment: bool,
    pub push: bool,
    pub review_comment: bool,
    pub tag: bool,
}

/// A commit status.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Status {
    pub state: State,
    pub label: String,
    pub desc: String,
    pub target: String,
}

/// Parameters for creating a commit status.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct StatusInput {
    pub state: State,
    pub label: String,
    pub desc: String,
    pub target: String,
}

//! Webhook actions and commit status states.
//!
//! Both enums are lossy on input: an unrecognised string decodes to the
//! `Unknown` variant instead of failing, so a provider adding a new
//! sub-action never breaks parsing.

use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;

/// What happened to the resource a webhook describes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum Action {
    #[default]
    Unknown,
    Create,
    Update,
    Delete,
    Open,
    Reopen,
    Close,
    Label,
    Unlabel,
    Sync,
    Merge,
    Assigned,
    Unassigned,
    ReviewRequested,
    ReviewRequestRemoved,
    ReadyForReview,
    Edited,
    Submitted,
    Dismissed,
}

impl Action {
    const ALL: [Action; 19] = [
        Action::Unknown,
        Action::Create,
        Action::Update,
        Action::Delete,
        Action::Open,
        Action::Reopen,
        Action::Close,
        Action::Label,
        Action::Unlabel,
        Action::Sync,
        Action::Merge,
        Action::Assigned,
        Action::Unassigned,
        Action::ReviewRequested,
        Action::ReviewRequestRemoved,
        Action::ReadyForReview,
        Action::Edited,
        Action::Submitted,
        Action::Dismissed,
    ];

    /// Wire string for this action. `Unknown` renders as the empty string.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Unknown => "",
            Self::Create => "created",
            Self::Update => "updated",
            Self::Delete => "deleted",
            Self::Open => "opened",
            Self::Reopen => "reopened",
            Self::Close => "closed",
            Self::Label => "labeled",
            Self::Unlabel => "unlabeled",
            Self::Sync => "synchronized",
            Self::Merge => "merged",
            Self::Assigned => "assigned",
            Self::Unassigned => "unassigned",
            Self::ReviewRequested => "review_requested",
            Self::ReviewRequestRemoved => "review_request_removed",
            Self::ReadyForReview => "ready_for_review",
            Self::Edited => "edited",
            Self::Submitted => "submitted",
            Self::Dismissed => "dismissed",
        }
    }

    /// Parse a wire string, yielding `Unknown` for anything unrecognised.
    pub fn parse_lossy(value: &str) -> Self {
        Self::ALL
            .into_iter()
            .find(|a| *a != Self::Unknown && a.as_str() == value)
            .unwrap_or(Self::Unknown)
    }
}

impl fmt::Display for Action {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl Serialize for Action {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.as_str())
    }
}

impl<'de> Deserialize<'de> for Action {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let value = String::deserialize(deserializer)?;
        Ok(Self::parse_lossy(&value))
    }
}

/// Commit status state.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum State {
    #[default]
    Unknown,
    Pending,
    Running,
    Success,
    Failure,
    Canceled,
    Error,
}

impl State {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Unknown => "unknown",
            Self::Pending => "pending",
            Self::Running => "running",
            Self::Success => "success",
            Self::Failure => "failure",
            Self::Canceled => "canceled",
            Self::Error => "error",
        }
    }

    /// Parse a wire string, yielding `Unknown` for anything unrecognised.
    pub fn parse_lossy(value: &str) -> Self {
        match value {
            "pending" => Self::Pending,
            "running" => Self::Running,
            "success" => Self::Success,
            "failure" => Self::Failure,
            "canceled" => Self::Canceled,
            "error" => Self::Error,
            _ => Self::Unknown,
        }
    }
}

impl fmt::Display for State {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl Serialize for State {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.as_str())
    }
}

impl<'de> Deserialize<'de> for State {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let value = String::deserialize(deserializer)?;
        Ok(Self::parse_lossy(&value))
    }
}

#[cfg(test)]
#[path = "action_tests.rs"]
mod tests;

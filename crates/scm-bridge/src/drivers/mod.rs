//! # Provider Drivers
//!
//! One module per source-code-hosting provider. Each driver owns its wire
//! types and translates them into the canonical [`model`](crate::model).
//!
//! | Driver | Event signal | Authenticity |
//! |--------|--------------|--------------|
//! | GitHub | `X-GitHub-Event` | `X-Hub-Signature-256` / `X-Hub-Signature` |
//! | GitLab | `X-Gitlab-Event` | `X-Gitlab-Token` |
//! | Gitea | `X-Gitea-Event` | `X-Gitea-Signature` or transmitted secret |
//! | Gogs | `X-Gogs-Event` | `X-Gogs-Signature` |
//! | Stash | `X-Event-Key` | `X-Hub-Signature` |
//! | Gitee | `X-Gitee-Event` | `X-Gitee-Token` (+ `X-Gitee-Timestamp`) |
//! | CodeCommit | SNS envelope | SNS message signature |
//! | Harness | `X-Harness-Trigger` | `X-Harness-Signature` or form secret |

pub mod codecommit;
pub mod gitea;
pub mod gitee;
pub mod github;
pub mod gitlab;
pub mod gogs;
pub mod harness;
pub mod stash;

pub(crate) mod lenient;

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use std::sync::Arc;

use crate::webhook::WebhookParser;

/// Identity of a provider driver.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Driver {
    Github,
    Gitlab,
    Gitea,
    Gogs,
    Stash,
    Gitee,
    #[serde(rename = "codecommit")]
    CodeCommit,
    Harness,
}

impl Driver {
    pub const ALL: [Driver; 8] = [
        Driver::Github,
        Driver::Gitlab,
        Driver::Gitea,
        Driver::Gogs,
        Driver::Stash,
        Driver::Gitee,
        Driver::CodeCommit,
        Driver::Harness,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Github => "github",
            Self::Gitlab => "gitlab",
            Self::Gitea => "gitea",
            Self::Gogs => "gogs",
            Self::Stash => "stash",
            Self::Gitee => "gitee",
            Self::CodeCommit => "codecommit",
            Self::Harness => "harness",
        }
    }

    /// Header carrying the event kind. CodeCommit deliveries have none.
    pub fn event_header(&self) -> Option<&'static str> {
        match self {
            Self::Github => Some(github::EVENT_HEADER),
            Self::Gitlab => Some(gitlab::EVENT_HEADER),
            Self::Gitea => Some(gitea::EVENT_HEADER),
            Self::Gogs => Some(gogs::EVENT_HEADER),
            Self::Stash => Some(stash::EVENT_HEADER),
            Self::Gitee => Some(gitee::EVENT_HEADER),
            Self::CodeCommit => None,
            Self::Harness => Some(harness::EVENT_HEADER),
        }
    }

    /// Header carrying the signature or token.
    pub fn signature_header(&self) -> Option<&'static str> {
        match self {
            Self::Github => Some(github::SIGNATURE_256_HEADER),
            Self::Gitlab => Some(gitlab::TOKEN_HEADER),
            Self::Gitea => Some(gitea::SIGNATURE_HEADER),
            Self::Gogs => Some(gogs::SIGNATURE_HEADER),
            Self::Stash => Some(stash::SIGNATURE_HEADER),
            Self::Gitee => Some(gitee::TOKEN_HEADER),
            Self::CodeCommit => None,
            Self::Harness => Some(harness::SIGNATURE_HEADER),
        }
    }

    /// Webhook parser for this driver with default settings.
    ///
    /// The CodeCommit parser built here has no SNS verifier and therefore
    /// rejects every delivery when a secret is configured. Use
    /// [`codecommit::CodeCommitWebhookParser::with_verifier`] to supply one.
    pub fn webhook_parser(&self) -> Arc<dyn WebhookParser> {
        match self {
            Self::Github => Arc::new(github::GithubWebhookParser::new()),
            Self::Gitlab => Arc::new(gitlab::GitlabWebhookParser::new()),
            Self::Gitea => Arc::new(gitea::GiteaWebhookParser::new()),
            Self::Gogs => Arc::new(gogs::GogsWebhookParser::new()),
            Self::Stash => Arc::new(stash::StashWebhookParser::new()),
            Self::Gitee => Arc::new(gitee::GiteeWebhookParser::new()),
            Self::CodeCommit => Arc::new(codecommit::CodeCommitWebhookParser::new()),
            Self::Harness => Arc::new(harness::HarnessWebhookParser::new()),
        }
    }
}

impl fmt::Display for Driver {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Error returned when a driver name is not recognised.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("Unknown driver: {0}")]
pub struct ParseDriverError(pub String);

impl FromStr for Driver {
    type Err = ParseDriverError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "github" => Ok(Self::Github),
            "gitlab" => Ok(Self::Gitlab),
            "gitea" => Ok(Self::Gitea),
            "gogs" => Ok(Self::Gogs),
            "stash" | "bitbucket-server" => Ok(Self::Stash),
            "gitee" => Ok(Self::Gitee),
            "codecommit" | "aws-codecommit" => Ok(Self::CodeCommit),
            "harness" => Ok(Self::Harness),
            _ => Err(ParseDriverError(s.to_string())),
        }
    }
}

/// Lossy sub-action mapping shared by the GitHub-family drivers.
pub(crate) fn github_style_action(action: &str) -> crate::model::Action {
    use crate::model::Action;

    match action {
        "created" => Action::Create,
        "deleted" => Action::Delete,
        "opened" => Action::Open,
        "reopened" => Action::Reopen,
        "closed" => Action::Close,
        "edited" => Action::Edited,
        "labeled" => Action::Label,
        "unlabeled" => Action::Unlabel,
        "synchronize" | "synchronized" => Action::Sync,
        "assigned" => Action::Assigned,
        "unassigned" => Action::Unassigned,
        "review_requested" => Action::ReviewRequested,
        "review_request_removed" => Action::ReviewRequestRemoved,
        "ready_for_review" => Action::ReadyForReview,
        "submitted" => Action::Submitted,
        "dismissed" => Action::Dismissed,
        _ => Action::Unknown,
    }
}

/// Decode a JSON payload into a driver wire type.
pub(crate) fn decode_payload<T: serde::de::DeserializeOwned>(
    body: &[u8],
) -> Result<T, crate::error::WebhookError> {
    Ok(serde_json::from_slice(body)?)
}

#[cfg(test)]
#[path = "mod_tests.rs"]
mod tests;

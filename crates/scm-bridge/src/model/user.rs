//! Users, organizations and repository content.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct User {
    pub id: String,
    pub login: String,
    pub name: String,
    pub email: String,
    pub avatar: String,
    pub created: Option<DateTime<Utc>>,
    pub updated: Option<DateTime<Utc>>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Organization {
    pub name: String,
    pub avatar: String,
}

/// A user's membership in an organization.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Membership {
    pub active: bool,
    pub role: Role,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Role {
    #[default]
    Undefined,
    Member,
    Admin,
}

/// A file read from a repository.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Content {
    pub path: String,
    pub data: Vec<u8>,
    pub sha: String,
    pub blob_id: String,
}

/// Parameters for writing a file to a repository.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ContentParams {
    #[serde(rename = "ref")]
    pub ref_name: String,
    pub branch: String,
    pub message: String,
    pub data: Vec<u8>,
    /// Blob SHA of the file being replaced or deleted
    pub sha: String,
}

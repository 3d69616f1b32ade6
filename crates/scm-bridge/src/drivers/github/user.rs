//! User and organization operations.

use async_trait::async_trait;
use serde::Deserialize;
use tracing::instrument;

use super::wire::{convert_user, GhUser};
use super::{with_page, GithubClient};
use crate::drivers::lenient::nullable;
use crate::error::ApiError;
use crate::model::{Membership, Organization, Role, User};
use crate::pagination::{ListOptions, PagedResponse};
use crate::service::{OrganizationService, UserService};

#[derive(Debug, Deserialize)]
struct GhEmail {
    email: String,
    #[serde(default)]
    primary: bool,
}

#[derive(Debug, Deserialize)]
struct GhOrganization {
    login: String,
    #[serde(default, deserialize_with = "nullable")]
    avatar_url: String,
}

#[derive(Debug, Deserialize)]
struct GhMembership {
    #[serde(default)]
    state: String,
    #[serde(default)]
    role: String,
}

fn convert_organization(src: GhOrganization) -> Organization {
    Organization {
        name: src.login,
        avatar: src.avatar_url,
    }
}

fn convert_membership(src: GhMembership) -> Membership {
    Membership {
        active: src.state == "active",
        role: match src.role.as_str() {
            "admin" => Role::Admin,
            "member" => Role::Member,
            _ => Role::Undefined,
        },
    }
}

#[async_trait]
impl UserService for GithubClient {
    #[instrument(skip(self))]
    async fn find(&self) -> Result<User, ApiError> {
        let src: GhUser = self.transport.get("/user").await?;
        Ok(convert_user(src))
    }

    #[instrument(skip(self))]
    async fn find_login(&self, login: &str) -> Result<User, ApiError> {
        let src: GhUser = self.transport.get(&format!("/users/{}", login)).await?;
        Ok(convert_user(src))
    }

    #[instrument(skip(self))]
    async fn find_email(&self) -> Result<String, ApiError> {
        let emails: Vec<GhEmail> = self.transport.get("/user/emails").await?;
        emails
            .into_iter()
            .find(|e| e.primary)
            .map(|e| e.email)
            .ok_or(ApiError::NotFound)
    }
}

#[async_trait]
impl OrganizationService for GithubClient {
    #[instrument(skip(self))]
    async fn find(&self, name: &str) -> Result<Organization, ApiError> {
        let src: GhOrganization = self.transport.get(&format!("/orgs/{}", name)).await?;
        Ok(convert_organization(src))
    }

    #[instrument(skip(self))]
    async fn list(&self, opts: &ListOptions) -> Result<PagedResponse<Organization>, ApiError> {
        let page = self
            .transport
            .get_page::<GhOrganization>(&with_page("/user/orgs", opts))
            .await?;
        Ok(page.map(convert_organization))
    }

    #[instrument(skip(self))]
    async fn find_membership(&self, name: &str, user: &str) -> Result<Membership, ApiError> {
        let src: GhMembership = self
            .transport
            .get(&format!("/orgs/{}/memberships/{}", name, user))
            .await?;
        Ok(convert_membership(src))
    }
}

#[cfg(test)]
#[path = "user_tests.rs"]
mod tests;

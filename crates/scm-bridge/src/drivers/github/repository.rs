//! Repository, hook and commit status operations.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use tracing::{info, instrument};

use super::wire::{convert_perm, convert_repository, GhRepository};
use super::{with_page, GithubClient};
use crate::drivers::lenient::{id_string, nullable};
use crate::error::ApiError;
use crate::model::{Hook, HookEvents, HookInput, Perm, Repository, State, Status, StatusInput};
use crate::pagination::{ListOptions, PagedResponse};
use crate::service::RepositoryService;

#[derive(Debug, Deserialize)]
struct GhHook {
    #[serde(deserialize_with = "id_string")]
    id: String,
    #[serde(default, deserialize_with = "nullable")]
    name: String,
    #[serde(default)]
    active: bool,
    #[serde(default, deserialize_with = "nullable")]
    events: Vec<String>,
    #[serde(default)]
    config: GhHookConfig,
}

#[derive(Debug, Default, Deserialize)]
struct GhHookConfig {
    #[serde(default, deserialize_with = "nullable")]
    url: String,
    // Sent as "0"/"1" strings or as numbers depending on the API version.
    #[serde(default, deserialize_with = "id_string")]
    insecure_ssl: String,
}

#[derive(Debug, Serialize)]
struct GhHookCreate<'a> {
    name: &'static str,
    active: bool,
    events: Vec<String>,
    config: GhHookCreateConfig<'a>,
}

#[derive(Debug, Serialize)]
struct GhHookCreateConfig<'a> {
    url: &'a str,
    #[serde(skip_serializing_if = "str::is_empty")]
    secret: &'a str,
    content_type: &'static str,
    insecure_ssl: &'static str,
}

#[derive(Debug, Deserialize)]
struct GhStatus {
    #[serde(default)]
    state: String,
    #[serde(default, deserialize_with = "nullable")]
    context: String,
    #[serde(default, deserialize_with = "nullable")]
    description: String,
    #[serde(default, deserialize_with = "nullable")]
    target_url: String,
}

#[derive(Debug, Serialize)]
struct GhStatusCreate<'a> {
    state: &'static str,
    context: &'a str,
    description: &'a str,
    #[serde(skip_serializing_if = "str::is_empty")]
    target_url: &'a str,
}

fn convert_hook(src: GhHook) -> Hook {
    Hook {
        id: src.id,
        name: src.name,
        target: src.config.url,
        events: src.events,
        active: src.active,
        skip_verify: src.config.insecure_ssl == "1",
    }
}

/// GitHub event names for the canonical hook event flags, followed by any
/// native events, without duplicates.
pub(crate) fn hook_events(events: &HookEvents, native: &[String]) -> Vec<String> {
    let mut out: Vec<String> = Vec::new();
    let mut push = |name: &str| {
        if !out.iter().any(|e| e == name) {
            out.push(name.to_string());
        }
    };

    if events.branch || events.tag {
        push("create");
        push("delete");
    }
    if events.deployment {
        push("deployment");
    }
    if events.issue {
        push("issues");
    }
    if events.issue_comment || events.pull_request_comment {
        push("issue_comment");
    }
    if events.pull_request {
        push("pull_request");
    }
    if events.push {
        push("push");
    }
    if events.review_comment {
        push("pull_request_review_comment");
    }
    for name in native {
        push(name);
    }

    out
}

fn convert_status(src: GhStatus) -> Status {
    Status {
        state: State::parse_lossy(&src.state),
        label: src.context,
        desc: src.description,
        target: src.target_url,
    }
}

/// GitHub only knows four commit states.
fn github_state(state: State) -> &'static str {
    match state {
        State::Pending | State::Running => "pending",
        State::Success => "success",
        State::Failure => "failure",
        _ => "error",
    }
}

#[async_trait]
impl RepositoryService for GithubClient {
    #[instrument(skip(self))]
    async fn find(&self, repo: &str) -> Result<Repository, ApiError> {
        let src: GhRepository = self.transport.get(&format!("/repos/{}", repo)).await?;
        Ok(convert_repository(src))
    }

    #[instrument(skip(self))]
    async fn find_perms(&self, repo: &str) -> Result<Perm, ApiError> {
        let src: GhRepository = self.transport.get(&format!("/repos/{}", repo)).await?;
        Ok(src.permissions.map(convert_perm).unwrap_or_default())
    }

    #[instrument(skip(self))]
    async fn list(&self, opts: &ListOptions) -> Result<PagedResponse<Repository>, ApiError> {
        let page = self
            .transport
            .get_page::<GhRepository>(&with_page("/user/repos", opts))
            .await?;
        Ok(page.map(convert_repository))
    }

    #[instrument(skip(self))]
    async fn list_hooks(
        &self,
        repo: &str,
        opts: &ListOptions,
    ) -> Result<PagedResponse<Hook>, ApiError> {
        let path = with_page(&format!("/repos/{}/hooks", repo), opts);
        let page = self.transport.get_page::<GhHook>(&path).await?;
        Ok(page.map(convert_hook))
    }

    #[instrument(skip(self))]
    async fn find_hook(&self, repo: &str, id: &str) -> Result<Hook, ApiError> {
        let src: GhHook = self
            .transport
            .get(&format!("/repos/{}/hooks/{}", repo, id))
            .await?;
        Ok(convert_hook(src))
    }

    #[instrument(skip(self, input), fields(target = %input.target))]
    async fn create_hook(&self, repo: &str, input: &HookInput) -> Result<Hook, ApiError> {
        let body = GhHookCreate {
            name: "web",
            active: true,
            events: hook_events(&input.events, &input.native_events),
            config: GhHookCreateConfig {
                url: &input.target,
                secret: &input.secret,
                content_type: "json",
                insecure_ssl: if input.skip_verify { "1" } else { "0" },
            },
        };

        let src: GhHook = self
            .transport
            .post(&format!("/repos/{}/hooks", repo), &body)
            .await?;

        info!(repo = %repo, hook_id = %src.id, "Created repository webhook");
        Ok(convert_hook(src))
    }

    #[instrument(skip(self))]
    async fn delete_hook(&self, repo: &str, id: &str) -> Result<(), ApiError> {
        self.transport
            .delete(&format!("/repos/{}/hooks/{}", repo, id))
            .await
    }

    #[instrument(skip(self))]
    async fn list_status(
        &self,
        repo: &str,
        reference: &str,
        opts: &ListOptions,
    ) -> Result<PagedResponse<Status>, ApiError> {
        let path = with_page(
            &format!("/repos/{}/commits/{}/statuses", repo, reference),
            opts,
        );
        let page = self.transport.get_page::<GhStatus>(&path).await?;
        Ok(page.map(convert_status))
    }

    #[instrument(skip(self, input), fields(state = %input.state))]
    async fn create_status(
        &self,
        repo: &str,
        reference: &str,
        input: &StatusInput,
    ) -> Result<Status, ApiError> {
        let body = GhStatusCreate {
            state: github_state(input.state),
            context: &input.label,
            description: &input.desc,
            target_url: &input.target,
        };

        let src: GhStatus = self
            .transport
            .post(&format!("/repos/{}/statuses/{}", repo, reference), &body)
            .await?;
        Ok(convert_status(src))
    }
}

#[cfg(test)]
#[path = "repository_tests.rs"]
mod tests;

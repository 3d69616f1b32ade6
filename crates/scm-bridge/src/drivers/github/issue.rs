//! Issue and issue comment operations.

use async_trait::async_trait;
use serde::de::IgnoredAny;
use serde::Serialize;
use tracing::{info, instrument};

use super::pull_request::{GhCommentCreate, GhStateUpdate};
use super::wire::{convert_comment, convert_issue, GhComment, GhIssue};
use super::{with_page, GithubClient};
use crate::error::ApiError;
use crate::model::{Comment, CommentInput, Issue, IssueInput};
use crate::pagination::{ListOptions, PagedResponse};
use crate::service::{IssueService, StateListOptions};

#[derive(Debug, Serialize)]
struct GhIssueCreate<'a> {
    title: &'a str,
    body: &'a str,
}

#[async_trait]
impl IssueService for GithubClient {
    #[instrument(skip(self))]
    async fn find(&self, repo: &str, number: i64) -> Result<Issue, ApiError> {
        let src: GhIssue = self
            .transport
            .get(&format!("/repos/{}/issues/{}", repo, number))
            .await?;
        Ok(convert_issue(src))
    }

    #[instrument(skip(self))]
    async fn list(
        &self,
        repo: &str,
        opts: &StateListOptions,
    ) -> Result<PagedResponse<Issue>, ApiError> {
        let path = with_page(
            &format!("/repos/{}/issues?state={}", repo, opts.state()),
            &opts.page,
        );
        let page = self.transport.get_page::<GhIssue>(&path).await?;
        Ok(page.map(convert_issue))
    }

    #[instrument(skip(self, input), fields(title = %input.title))]
    async fn create(&self, repo: &str, input: &IssueInput) -> Result<Issue, ApiError> {
        let body = GhIssueCreate {
            title: &input.title,
            body: &input.body,
        };
        let src: GhIssue = self
            .transport
            .post(&format!("/repos/{}/issues", repo), &body)
            .await?;

        info!(repo = %repo, number = src.number, "Created issue");
        Ok(convert_issue(src))
    }

    #[instrument(skip(self))]
    async fn close(&self, repo: &str, number: i64) -> Result<(), ApiError> {
        let _: IgnoredAny = self
            .transport
            .patch(
                &format!("/repos/{}/issues/{}", repo, number),
                &GhStateUpdate { state: "closed" },
            )
            .await?;
        Ok(())
    }

    #[instrument(skip(self))]
    async fn lock(&self, repo: &str, number: i64) -> Result<(), ApiError> {
        self.transport
            .put(
                &format!("/repos/{}/issues/{}/lock", repo, number),
                &serde_json::json!({}),
            )
            .await
    }

    #[instrument(skip(self))]
    async fn unlock(&self, repo: &str, number: i64) -> Result<(), ApiError> {
        self.transport
            .delete(&format!("/repos/{}/issues/{}/lock", repo, number))
            .await
    }

    #[instrument(skip(self))]
    async fn find_comment(&self, repo: &str, _number: i64, id: i64) -> Result<Comment, ApiError> {
        let src: GhComment = self
            .transport
            .get(&format!("/repos/{}/issues/comments/{}", repo, id))
            .await?;
        Ok(convert_comment(src))
    }

    #[instrument(skip(self))]
    async fn list_comments(
        &self,
        repo: &str,
        number: i64,
        opts: &ListOptions,
    ) -> Result<PagedResponse<Comment>, ApiError> {
        let path = with_page(&format!("/repos/{}/issues/{}/comments", repo, number), opts);
        let page = self.transport.get_page::<GhComment>(&path).await?;
        Ok(page.map(convert_comment))
    }

    #[instrument(skip(self, input))]
    async fn create_comment(
        &self,
        repo: &str,
        number: i64,
        input: &CommentInput,
    ) -> Result<Comment, ApiError> {
        let src: GhComment = self
            .transport
            .post(
                &format!("/repos/{}/issues/{}/comments", repo, number),
                &GhCommentCreate { body: &input.body },
            )
            .await?;
        Ok(convert_comment(src))
    }

    #[instrument(skip(self))]
    async fn delete_comment(&self, repo: &str, _number: i64, id: i64) -> Result<(), ApiError> {
        self.transport
            .delete(&format!("/repos/{}/issues/comments/{}", repo, id))
            .await
    }
}

#[cfg(test)]
#[path = "issue_tests.rs"]
mod tests;

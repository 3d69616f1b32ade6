//! Pull request, pull request comment and review comment operations.
//!
//! GitHub stores conversation comments on pull requests as issue comments,
//! so those calls go through the issues API. Line comments on the diff are
//! served by [`ReviewService`].

use async_trait::async_trait;
use serde::de::IgnoredAny;
use serde::Serialize;
use tracing::{info, instrument};

use super::wire::{
    convert_comment, convert_file, convert_pull_request, convert_review_comment, GhComment,
    GhFile, GhPullRequest, GhReviewComment,
};
use super::{with_page, GithubClient};
use crate::error::ApiError;
use crate::model::{
    Change, Comment, CommentInput, PullRequest, PullRequestInput, Review, ReviewInput,
};
use crate::pagination::{ListOptions, PagedResponse};
use crate::service::{PullRequestService, ReviewService, StateListOptions};

#[derive(Debug, Serialize)]
struct GhPullRequestCreate<'a> {
    title: &'a str,
    body: &'a str,
    head: &'a str,
    base: &'a str,
}

#[derive(Debug, Serialize)]
pub(crate) struct GhStateUpdate {
    pub state: &'static str,
}

#[derive(Debug, Serialize)]
pub(crate) struct GhCommentCreate<'a> {
    pub body: &'a str,
}

#[derive(Debug, Serialize)]
struct GhReviewCommentCreate<'a> {
    body: &'a str,
    commit_id: &'a str,
    path: &'a str,
    line: i64,
}

#[async_trait]
impl PullRequestService for GithubClient {
    #[instrument(skip(self))]
    async fn find(&self, repo: &str, number: i64) -> Result<PullRequest, ApiError> {
        let src: GhPullRequest = self
            .transport
            .get(&format!("/repos/{}/pulls/{}", repo, number))
            .await?;
        Ok(convert_pull_request(src))
    }

    #[instrument(skip(self))]
    async fn list(
        &self,
        repo: &str,
        opts: &StateListOptions,
    ) -> Result<PagedResponse<PullRequest>, ApiError> {
        let path = with_page(
            &format!("/repos/{}/pulls?state={}", repo, opts.state()),
            &opts.page,
        );
        let page = self.transport.get_page::<GhPullRequest>(&path).await?;
        Ok(page.map(convert_pull_request))
    }

    #[instrument(skip(self, input), fields(source = %input.source, target = %input.target))]
    async fn create(
        &self,
        repo: &str,
        input: &PullRequestInput,
    ) -> Result<PullRequest, ApiError> {
        let body = GhPullRequestCreate {
            title: &input.title,
            body: &input.body,
            head: &input.source,
            base: &input.target,
        };
        let src: GhPullRequest = self
            .transport
            .post(&format!("/repos/{}/pulls", repo), &body)
            .await?;

        info!(repo = %repo, number = src.number, "Created pull request");
        Ok(convert_pull_request(src))
    }

    #[instrument(skip(self))]
    async fn merge(&self, repo: &str, number: i64) -> Result<(), ApiError> {
        self.transport
            .put(
                &format!("/repos/{}/pulls/{}/merge", repo, number),
                &serde_json::json!({}),
            )
            .await?;

        info!(repo = %repo, number = number, "Merged pull request");
        Ok(())
    }

    #[instrument(skip(self))]
    async fn close(&self, repo: &str, number: i64) -> Result<(), ApiError> {
        let _: IgnoredAny = self
            .transport
            .patch(
                &format!("/repos/{}/pulls/{}", repo, number),
                &GhStateUpdate { state: "closed" },
            )
            .await?;
        Ok(())
    }

    #[instrument(skip(self))]
    async fn list_changes(
        &self,
        repo: &str,
        number: i64,
        opts: &ListOptions,
    ) -> Result<PagedResponse<Change>, ApiError> {
        let path = with_page(&format!("/repos/{}/pulls/{}/files", repo, number), opts);
        let page = self.transport.get_page::<GhFile>(&path).await?;
        Ok(page.map(convert_file))
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

#[async_trait]
impl ReviewService for GithubClient {
    #[instrument(skip(self))]
    async fn find(&self, repo: &str, _number: i64, id: i64) -> Result<Review, ApiError> {
        let src: GhReviewComment = self
            .transport
            .get(&format!("/repos/{}/pulls/comments/{}", repo, id))
            .await?;
        Ok(convert_review_comment(src))
    }

    #[instrument(skip(self))]
    async fn list(
        &self,
        repo: &str,
        number: i64,
        opts: &ListOptions,
    ) -> Result<PagedResponse<Review>, ApiError> {
        let path = with_page(&format!("/repos/{}/pulls/{}/comments", repo, number), opts);
        let page = self.transport.get_page::<GhReviewComment>(&path).await?;
        Ok(page.map(convert_review_comment))
    }

    #[instrument(skip(self, input), fields(path = %input.path, line = input.line))]
    async fn create(
        &self,
        repo: &str,
        number: i64,
        input: &ReviewInput,
    ) -> Result<Review, ApiError> {
        let body = GhReviewCommentCreate {
            body: &input.body,
            commit_id: &input.sha,
            path: &input.path,
            line: input.line,
        };
        let src: GhReviewComment = self
            .transport
            .post(&format!("/repos/{}/pulls/{}/comments", repo, number), &body)
            .await?;
        Ok(convert_review_comment(src))
    }

    #[instrument(skip(self))]
    async fn delete(&self, repo: &str, _number: i64, id: i64) -> Result<(), ApiError> {
        self.transport
            .delete(&format!("/repos/{}/pulls/comments/{}", repo, id))
            .await
    }
}

#[cfg(test)]
#[path = "pull_request_tests.rs"]
mod tests;

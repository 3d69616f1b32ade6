//! Branch, tag, commit and change operations.

use async_trait::async_trait;
use serde::Deserialize;
use tracing::instrument;

use super::wire::{convert_commit, convert_file, GhCommit, GhFile};
use super::{with_page, GithubClient};
use crate::error::ApiError;
use crate::model::{Change, Commit, Reference, TAG_PREFIX};
use crate::pagination::{ListOptions, PagedResponse};
use crate::service::{CommitListOptions, GitService};

#[derive(Debug, Deserialize)]
struct GhBranch {
    name: String,
    commit: GhObject,
}

/// Entry of the tags listing.
#[derive(Debug, Deserialize)]
struct GhTag {
    name: String,
    commit: GhObject,
}

#[derive(Debug, Deserialize)]
struct GhObject {
    sha: String,
}

/// A single git ref.
#[derive(Debug, Deserialize)]
struct GhRef {
    #[serde(rename = "ref")]
    ref_name: String,
    object: GhObject,
}

#[derive(Debug, Deserialize)]
struct GhCompare {
    #[serde(default)]
    files: Vec<GhFile>,
}

fn commits_path(repo: &str, opts: &CommitListOptions) -> String {
    let mut query = url::form_urlencoded::Serializer::new(String::new());
    if !opts.ref_name.is_empty() {
        query.append_pair("sha", &opts.ref_name);
    }
    if !opts.path.is_empty() {
        query.append_pair("path", &opts.path);
    }
    let query = query.finish();

    let base = if query.is_empty() {
        format!("/repos/{}/commits", repo)
    } else {
        format!("/repos/{}/commits?{}", repo, query)
    };
    with_page(&base, &opts.page)
}

/// Apply list options to a slice of changes returned in one response.
fn page_of(changes: Vec<Change>, opts: &ListOptions) -> PagedResponse<Change> {
    let size = opts.size.max(1) as usize;
    let skip = (opts.page.max(1) as usize - 1) * size;
    let items = changes.into_iter().skip(skip).take(size).collect();
    PagedResponse::new(items, Default::default())
}

#[async_trait]
impl GitService for GithubClient {
    #[instrument(skip(self))]
    async fn find_branch(&self, repo: &str, name: &str) -> Result<Reference, ApiError> {
        let src: GhBranch = self
            .transport
            .get(&format!("/repos/{}/branches/{}", repo, name))
            .await?;
        Ok(Reference::branch(&src.name, src.commit.sha))
    }

    #[instrument(skip(self))]
    async fn find_commit(&self, repo: &str, reference: &str) -> Result<Commit, ApiError> {
        let src: GhCommit = self
            .transport
            .get(&format!("/repos/{}/commits/{}", repo, reference))
            .await?;
        Ok(convert_commit(src))
    }

    #[instrument(skip(self))]
    async fn find_tag(&self, repo: &str, name: &str) -> Result<Reference, ApiError> {
        let src: GhRef = self
            .transport
            .get(&format!("/repos/{}/git/ref/tags/{}", repo, name))
            .await?;
        Ok(Reference::new(&src.ref_name, TAG_PREFIX, src.object.sha))
    }

    #[instrument(skip(self))]
    async fn list_branches(
        &self,
        repo: &str,
        opts: &ListOptions,
    ) -> Result<PagedResponse<Reference>, ApiError> {
        let path = with_page(&format!("/repos/{}/branches", repo), opts);
        let page = self.transport.get_page::<GhBranch>(&path).await?;
        Ok(page.map(|b| Reference::branch(&b.name, b.commit.sha)))
    }

    #[instrument(skip(self))]
    async fn list_tags(
        &self,
        repo: &str,
        opts: &ListOptions,
    ) -> Result<PagedResponse<Reference>, ApiError> {
        let path = with_page(&format!("/repos/{}/tags", repo), opts);
        let page = self.transport.get_page::<GhTag>(&path).await?;
        Ok(page.map(|t| Reference::tag(&t.name, t.commit.sha)))
    }

    #[instrument(skip(self))]
    async fn list_commits(
        &self,
        repo: &str,
        opts: &CommitListOptions,
    ) -> Result<PagedResponse<Commit>, ApiError> {
        let page = self
            .transport
            .get_page::<GhCommit>(&commits_path(repo, opts))
            .await?;
        Ok(page.map(convert_commit))
    }

    #[instrument(skip(self))]
    async fn list_changes(
        &self,
        repo: &str,
        sha: &str,
        opts: &ListOptions,
    ) -> Result<PagedResponse<Change>, ApiError> {
        let src: GhCommit = self
            .transport
            .get(&format!("/repos/{}/commits/{}", repo, sha))
            .await?;
        Ok(page_of(
            src.files.into_iter().map(convert_file).collect(),
            opts,
        ))
    }

    #[instrument(skip(self))]
    async fn compare_changes(
        &self,
        repo: &str,
        source: &str,
        target: &str,
        opts: &ListOptions,
    ) -> Result<PagedResponse<Change>, ApiError> {
        let src: GhCompare = self
            .transport
            .get(&format!("/repos/{}/compare/{}...{}", repo, source, target))
            .await?;
        Ok(page_of(
            src.files.into_iter().map(convert_file).collect(),
            opts,
        ))
    }
}

#[cfg(test)]
#[path = "git_tests.rs"]
mod tests;

//! Repository file content operations.

use async_trait::async_trait;
use base64::engine::general_purpose::STANDARD;
use base64::Engine;
use serde::Deserialize;
use serde::Serialize;
use tracing::{info, instrument};

use super::GithubClient;
use crate::drivers::lenient::nullable;
use crate::error::ApiError;
use crate::model::{Content, ContentParams};
use crate::service::ContentService;

#[derive(Debug, Deserialize)]
struct GhContent {
    path: String,
    sha: String,
    #[serde(default, deserialize_with = "nullable")]
    content: String,
    #[serde(default, deserialize_with = "nullable")]
    encoding: String,
}

#[derive(Debug, Serialize)]
struct GhContentWrite<'a> {
    message: &'a str,
    #[serde(skip_serializing_if = "Option::is_none")]
    content: Option<String>,
    #[serde(skip_serializing_if = "str::is_empty")]
    branch: &'a str,
    #[serde(skip_serializing_if = "str::is_empty")]
    sha: &'a str,
}

impl<'a> GhContentWrite<'a> {
    fn new(params: &'a ContentParams, with_content: bool) -> Self {
        Self {
            message: &params.message,
            content: with_content.then(|| STANDARD.encode(&params.data)),
            branch: &params.branch,
            sha: &params.sha,
        }
    }
}

fn contents_path(repo: &str, path: &str) -> String {
    format!("/repos/{}/contents/{}", repo, path.trim_start_matches('/'))
}

/// Decode file content. GitHub wraps the base64 text at 60 columns.
fn decode_content(src: &GhContent) -> Result<Vec<u8>, ApiError> {
    if src.encoding != "base64" {
        return Ok(src.content.as_bytes().to_vec());
    }
    let compact: String = src
        .content
        .chars()
        .filter(|c| !c.is_ascii_whitespace())
        .collect();
    STANDARD
        .decode(compact)
        .map_err(|e| ApiError::InvalidRequest {
            message: format!("invalid base64 content for {}: {}", src.path, e),
        })
}

#[async_trait]
impl ContentService for GithubClient {
    #[instrument(skip(self))]
    async fn find(&self, repo: &str, path: &str, reference: &str) -> Result<Content, ApiError> {
        let mut url = contents_path(repo, path);
        if !reference.is_empty() {
            let query = url::form_urlencoded::Serializer::new(String::new())
                .append_pair("ref", reference)
                .finish();
            url = format!("{}?{}", url, query);
        }

        let src: GhContent = self.transport.get(&url).await?;
        let data = decode_content(&src)?;
        Ok(Content {
            path: src.path,
            data,
            blob_id: src.sha.clone(),
            sha: src.sha,
        })
    }

    #[instrument(skip(self, params), fields(branch = %params.branch))]
    async fn create(&self, repo: &str, path: &str, params: &ContentParams) -> Result<(), ApiError> {
        self.transport
            .put(&contents_path(repo, path), &GhContentWrite::new(params, true))
            .await?;
        info!(repo = %repo, path = %path, "Created file");
        Ok(())
    }

    #[instrument(skip(self, params), fields(branch = %params.branch))]
    async fn update(&self, repo: &str, path: &str, params: &ContentParams) -> Result<(), ApiError> {
        self.transport
            .put(&contents_path(repo, path), &GhContentWrite::new(params, true))
            .await?;
        info!(repo = %repo, path = %path, "Updated file");
        Ok(())
    }

    #[instrument(skip(self, params), fields(branch = %params.branch))]
    async fn delete(&self, repo: &str, path: &str, params: &ContentParams) -> Result<(), ApiError> {
        self.transport
            .delete_with_body(&contents_path(repo, path), &GhContentWrite::new(params, false))
            .await?;
        info!(repo = %repo, path = %path, "Deleted file");
        Ok(())
    }
}

#[cfg(test)]
#[path = "content_tests.rs"]
mod tests;

//! Authenticated JSON transport over reqwest.

use reqwest::header::{ACCEPT, LINK};
use reqwest::{Method, RequestBuilder, Response};
use serde::de::DeserializeOwned;
use serde::Serialize;
use tracing::debug;

use super::ClientConfig;
use crate::error::ApiError;
use crate::pagination::{parse_link_header, PagedResponse};

/// Shared HTTP plumbing for drivers that call a provider REST API.
///
/// Adds the bearer token and `Accept` header to every request and maps
/// non-success status codes onto [`ApiError`].
#[derive(Debug, Clone)]
pub struct HttpTransport {
    http: reqwest::Client,
    config: ClientConfig,
    accept: &'static str,
}

impl HttpTransport {
    /// Build a transport for `config`, sending `accept` as the `Accept` header.
    ///
    /// # Errors
    ///
    /// Returns `ApiError::HttpClientError` if the underlying client cannot be built.
    pub fn new(config: ClientConfig, accept: &'static str) -> Result<Self, ApiError> {
        let http = reqwest::Client::builder()
            .timeout(config.timeout)
            .user_agent(config.user_agent.clone())
            .build()?;

        Ok(Self {
            http,
            config,
            accept,
        })
    }

    pub fn config(&self) -> &ClientConfig {
        &self.config
    }

    pub async fn get<T: DeserializeOwned>(&self, path: &str) -> Result<T, ApiError> {
        let response = self.send(self.request(Method::GET, path)).await?;
        Ok(response.json().await?)
    }

    /// GET a JSON array, reading neighbouring pages from the `Link` header.
    pub async fn get_page<T: DeserializeOwned>(
        &self,
        path: &str,
    ) -> Result<PagedResponse<T>, ApiError> {
        let response = self.send(self.request(Method::GET, path)).await?;
        let pagination = parse_link_header(
            response
                .headers()
                .get(LINK)
                .and_then(|value| value.to_str().ok()),
        );
        let items = response.json().await?;
        Ok(PagedResponse::new(items, pagination))
    }

    pub async fn post<B, T>(&self, path: &str, body: &B) -> Result<T, ApiError>
    where
        B: Serialize + ?Sized + Sync,
        T: DeserializeOwned,
    {
        let response = self
            .send(self.request(Method::POST, path).json(body))
            .await?;
        Ok(response.json().await?)
    }

    pub async fn patch<B, T>(&self, path: &str, body: &B) -> Result<T, ApiError>
    where
        B: Serialize + ?Sized + Sync,
        T: DeserializeOwned,
    {
        let response = self
            .send(self.request(Method::PATCH, path).json(body))
            .await?;
        Ok(response.json().await?)
    }

    /// PUT, discarding any response body.
    pub async fn put<B>(&self, path: &str, body: &B) -> Result<(), ApiError>
    where
        B: Serialize + ?Sized + Sync,
    {
        self.send(self.request(Method::PUT, path).json(body))
            .await?;
        Ok(())
    }

    pub async fn delete(&self, path: &str) -> Result<(), ApiError> {
        self.send(self.request(Method::DELETE, path)).await?;
        Ok(())
    }

    /// DELETE with a JSON body, as required by some content APIs.
    pub async fn delete_with_body<B>(&self, path: &str, body: &B) -> Result<(), ApiError>
    where
        B: Serialize + ?Sized + Sync,
    {
        self.send(self.request(Method::DELETE, path).json(body))
            .await?;
        Ok(())
    }

    fn url(&self, path: &str) -> String {
        format!(
            "{}/{}",
            self.config.base_url.trim_end_matches('/'),
            path.trim_start_matches('/')
        )
    }

    fn request(&self, method: Method, path: &str) -> RequestBuilder {
        let builder = self
            .http
            .request(method, self.url(path))
            .header(ACCEPT, self.accept);

        match &self.config.token {
            Some(token) => builder.bearer_auth(token),
            None => builder,
        }
    }

    async fn send(&self, builder: RequestBuilder) -> Result<Response, ApiError> {
        let response = builder.send().await.map_err(|e| {
            if e.is_timeout() {
                ApiError::Timeout
            } else {
                ApiError::HttpClientError(e)
            }
        })?;

        let status = response.status();
        debug!(status = status.as_u16(), url = %response.url(), "Provider API response");

        if status.is_success() {
            return Ok(response);
        }

        Err(match status.as_u16() {
            401 => ApiError::AuthenticationFailed,
            403 => ApiError::AuthorizationFailed,
            404 => ApiError::NotFound,
            422 => ApiError::InvalidRequest {
                message: error_message(response).await,
            },
            code => ApiError::HttpError {
                status: code,
                message: error_message(response).await,
            },
        })
    }
}

/// Provider error message, preferring a JSON `message` field over the raw body.
async fn error_message(response: Response) -> String {
    let text = response
        .text()
        .await
        .unwrap_or_else(|_| "Unknown error".to_string());

    serde_json::from_str::<serde_json::Value>(&text)
        .ok()
        .and_then(|v| v.get("message").and_then(|m| m.as_str()).map(str::to_string))
        .unwrap_or(text)
}

//! Client composition root.
//!
//! A [`Client`] bundles one driver's webhook parser with, where the driver
//! provides one, its REST service set. Callers pick a driver once and then
//! use provider-neutral operations.

mod transport;

pub use transport::HttpTransport;

use std::sync::Arc;
use std::time::Duration;

use crate::drivers::codecommit::{CodeCommitWebhookParser, SnsVerifier};
use crate::drivers::github::GithubClient;
use crate::drivers::Driver;
use crate::error::{ApiError, WebhookError};
use crate::model::Webhook;
use crate::service::{
    ContentService, GitService, IssueService, OrganizationService, PullRequestService,
    RepositoryService, ReviewService, UserService,
};
use crate::webhook::{SecretResolver, WebhookParser, WebhookRequest};

/// Configuration for provider API access.
///
/// # Examples
///
/// ```
/// use scm_bridge::ClientConfig;
/// use std::time::Duration;
///
/// let config = ClientConfig::default()
///     .with_base_url("https://github.example.com/api/v3")
///     .with_token("ghp_example")
///     .with_timeout(Duration::from_secs(60));
/// ```
#[derive(Clone)]
pub struct ClientConfig {
    /// API base URL
    pub base_url: String,
    /// User agent string for API requests
    pub user_agent: String,
    /// Request timeout duration
    pub timeout: Duration,
    /// Bearer token, if the API calls are authenticated
    pub token: Option<String>,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            base_url: "https://api.github.com".to_string(),
            user_agent: format!("scm-bridge/{}", env!("CARGO_PKG_VERSION")),
            timeout: Duration::from_secs(30),
            token: None,
        }
    }
}

impl ClientConfig {
    /// Set the API base URL.
    pub fn with_base_url(mut self, url: impl Into<String>) -> Self {
        self.base_url = url.into();
        self
    }

    /// Set the user agent string.
    pub fn with_user_agent(mut self, user_agent: impl Into<String>) -> Self {
        self.user_agent = user_agent.into();
        self
    }

    /// Set the request timeout.
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Set the bearer token.
    pub fn with_token(mut self, token: impl Into<String>) -> Self {
        self.token = Some(token.into());
        self
    }
}

// Security: Don't expose tokens in debug output
impl std::fmt::Debug for ClientConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ClientConfig")
            .field("base_url", &self.base_url)
            .field("user_agent", &self.user_agent)
            .field("timeout", &self.timeout)
            .field("token", &self.token.as_ref().map(|_| "<REDACTED>"))
            .finish()
    }
}

/// The REST service set of one driver.
#[derive(Clone)]
struct Services {
    repositories: Arc<dyn RepositoryService>,
    git: Arc<dyn GitService>,
    pull_requests: Arc<dyn PullRequestService>,
    issues: Arc<dyn IssueService>,
    users: Arc<dyn UserService>,
    organizations: Arc<dyn OrganizationService>,
    reviews: Arc<dyn ReviewService>,
    contents: Arc<dyn ContentService>,
}

impl Services {
    fn from_github(client: GithubClient) -> Self {
        let client = Arc::new(client);
        Self {
            repositories: client.clone(),
            git: client.clone(),
            pull_requests: client.clone(),
            issues: client.clone(),
            users: client.clone(),
            organizations: client.clone(),
            reviews: client.clone(),
            contents: client,
        }
    }
}

/// Provider-neutral client for one driver.
///
/// # Examples
///
/// ```rust,no_run
/// use scm_bridge::{Client, ClientConfig, Driver};
///
/// # async fn example() -> Result<(), Box<dyn std::error::Error>> {
/// let client = Client::builder(Driver::Github)
///     .config(ClientConfig::default().with_token("ghp_example"))
///     .build()?;
///
/// let repo = client.repositories()?.find("octocat/Hello-World").await?;
/// println!("default branch: {}", repo.branch);
/// # Ok(())
/// # }
/// ```
#[derive(Clone)]
pub struct Client {
    driver: Driver,
    webhooks: Arc<dyn WebhookParser>,
    services: Option<Services>,
}

impl Client {
    /// Webhook-only client for `driver`.
    pub fn new(driver: Driver) -> Self {
        Self {
            driver,
            webhooks: driver.webhook_parser(),
            services: None,
        }
    }

    pub fn builder(driver: Driver) -> ClientBuilder {
        ClientBuilder::new(driver)
    }

    pub fn driver(&self) -> Driver {
        self.driver
    }

    pub fn webhooks(&self) -> &dyn WebhookParser {
        self.webhooks.as_ref()
    }

    /// Parse and verify a webhook delivery with this client's driver.
    ///
    /// # Errors
    ///
    /// See [`WebhookParser::parse`].
    pub async fn parse_webhook(
        &self,
        request: &WebhookRequest,
        secrets: &dyn SecretResolver,
    ) -> Result<Webhook, WebhookError> {
        self.webhooks.parse(request, secrets).await
    }

    pub fn repositories(&self) -> Result<&dyn RepositoryService, ApiError> {
        Ok(self.services("repositories")?.repositories.as_ref())
    }

    pub fn git(&self) -> Result<&dyn GitService, ApiError> {
        Ok(self.services("git")?.git.as_ref())
    }

    pub fn pull_requests(&self) -> Result<&dyn PullRequestService, ApiError> {
        Ok(self.services("pull requests")?.pull_requests.as_ref())
    }

    pub fn issues(&self) -> Result<&dyn IssueService, ApiError> {
        Ok(self.services("issues")?.issues.as_ref())
    }

    pub fn users(&self) -> Result<&dyn UserService, ApiError> {
        Ok(self.services("users")?.users.as_ref())
    }

    pub fn organizations(&self) -> Result<&dyn OrganizationService, ApiError> {
        Ok(self.services("organizations")?.organizations.as_ref())
    }

    pub fn reviews(&self) -> Result<&dyn ReviewService, ApiError> {
        Ok(self.services("reviews")?.reviews.as_ref())
    }

    pub fn contents(&self) -> Result<&dyn ContentService, ApiError> {
        Ok(self.services("contents")?.contents.as_ref())
    }

    fn services(&self, service: &'static str) -> Result<&Services, ApiError> {
        self.services.as_ref().ok_or_else(|| ApiError::NotSupported {
            driver: self.driver.to_string(),
            service,
        })
    }
}

impl std::fmt::Debug for Client {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Client")
            .field("driver", &self.driver)
            .field("services", &self.services.is_some())
            .finish()
    }
}

/// Builder for [`Client`].
pub struct ClientBuilder {
    driver: Driver,
    config: Option<ClientConfig>,
    sns_verifier: Option<Arc<dyn SnsVerifier>>,
}

impl ClientBuilder {
    pub fn new(driver: Driver) -> Self {
        Self {
            driver,
            config: None,
            sns_verifier: None,
        }
    }

    /// Enable the driver's REST service set with this configuration.
    pub fn config(mut self, config: ClientConfig) -> Self {
        self.config = Some(config);
        self
    }

    /// SNS signature verifier used by the CodeCommit driver.
    pub fn sns_verifier(mut self, verifier: Arc<dyn SnsVerifier>) -> Self {
        self.sns_verifier = Some(verifier);
        self
    }

    /// Build the client.
    ///
    /// # Errors
    ///
    /// - `ApiError::NotSupported` if a configuration is given for a driver
    ///   without a REST service set, or an SNS verifier for a driver other
    ///   than CodeCommit
    /// - `ApiError::HttpClientError` if the HTTP client cannot be built
    pub fn build(self) -> Result<Client, ApiError> {
        let webhooks: Arc<dyn WebhookParser> = match (self.driver, self.sns_verifier) {
            (Driver::CodeCommit, Some(verifier)) => {
                Arc::new(CodeCommitWebhookParser::with_verifier(verifier))
            }
            (driver, Some(_)) => {
                return Err(ApiError::NotSupported {
                    driver: driver.to_string(),
                    service: "SNS verification",
                })
            }
            (driver, None) => driver.webhook_parser(),
        };

        let services = match (self.driver, self.config) {
            (_, None) => None,
            (Driver::Github, Some(config)) => {
                Some(Services::from_github(GithubClient::new(config)?))
            }
            (driver, Some(_)) => {
                return Err(ApiError::NotSupported {
                    driver: driver.to_string(),
                    service: "REST services",
                })
            }
        };

        Ok(Client {
            driver: self.driver,
            webhooks,
            services,
        })
    }
}

#[cfg(test)]
#[path = "mod_tests.rs"]
mod tests;

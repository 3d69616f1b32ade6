//! # scm-bridge CLI
//!
//! Command-line interface for scm-bridge.
//!
//! This module provides CLI commands for:
//! - Parsing a captured webhook delivery with any driver
//! - Signing payloads for test deliveries
//! - Inspecting drivers and configuration
//! - Looking up a repository through a driver's REST services

use clap::{CommandFactory, Parser, Subcommand};
use scm_bridge::hmac::{self, HashAlgorithm};
use scm_bridge::{ApiError, Client, ClientConfig, Driver, StaticSecret, WebhookError, WebhookRequest};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use std::time::Duration;
use tokio::io::{AsyncRead, AsyncReadExt};
use tracing::{debug, info, warn};
use tracing_subscriber::EnvFilter;

/// Configuration file looked up in the working directory when `--config` is absent.
pub const DEFAULT_CONFIG_FILE: &str = "scm-bridge";

/// Prefix of environment variables overriding configuration values,
/// e.g. `SCM_BRIDGE__SECRETS__GITHUB`.
pub const ENV_PREFIX: &str = "SCM_BRIDGE";

const REDACTED: &str = "<REDACTED>";

// ============================================================================
// CLI Structure
// ============================================================================

/// scm-bridge CLI - webhook tooling for source-code-hosting providers
#[derive(Parser)]
#[command(name = "scm-bridge")]
#[command(version = env!("CARGO_PKG_VERSION"))]
#[command(about = "Parse and verify webhooks from source-code-hosting providers")]
pub struct Cli {
    /// Configuration file path
    #[arg(short, long, env = "SCM_BRIDGE_CONFIG")]
    pub config: Option<PathBuf>,

    /// Logging level or filter directive, overrides RUST_LOG and the config file
    #[arg(short, long)]
    pub log_level: Option<String>,

    /// Enable JSON logging
    #[arg(long)]
    pub json_logs: bool,

    /// Subcommand to execute
    #[command(subcommand)]
    pub command: Commands,
}

/// Available CLI commands
#[derive(Subcommand)]
pub enum Commands {
    /// Parse and verify a captured webhook delivery
    Parse {
        /// Provider driver
        #[arg(short, long)]
        driver: Driver,

        /// File holding the request body, or `-` for stdin
        #[arg(short, long)]
        body: PathBuf,

        /// Request header as `Name: value`, repeatable
        #[arg(short = 'H', long = "header")]
        headers: Vec<String>,

        /// URL query string of the delivery
        #[arg(short, long)]
        query: Option<String>,

        /// Shared secret, overrides `secrets.<driver>` from the configuration
        #[arg(short, long)]
        secret: Option<String>,
    },

    /// Compute the HMAC signature of a payload
    Sign {
        /// Hash algorithm
        #[arg(short, long, value_enum, default_value = "sha256")]
        algorithm: SignAlgorithm,

        /// Shared secret
        #[arg(short, long)]
        secret: String,

        /// File holding the payload, or `-` for stdin
        #[arg(short, long)]
        body: PathBuf,

        /// Prefix the signature with `<algorithm>=`
        #[arg(short, long)]
        prefix: bool,
    },

    /// List supported drivers and their headers
    Drivers,

    /// Validate configuration
    Config {
        /// Show resolved configuration
        #[arg(short, long)]
        show: bool,
    },

    /// Look up a repository through a driver's REST services
    Repo {
        /// Provider driver
        #[arg(short, long)]
        driver: Driver,

        /// Repository as `owner/name`
        repository: String,
    },

    /// Generate shell completions
    Completions {
        /// Shell to generate completions for
        #[arg(value_enum)]
        shell: clap_complete::Shell,
    },
}

/// Hash algorithms accepted by `sign`
#[derive(Clone, Copy, Debug, PartialEq, Eq, clap::ValueEnum)]
pub enum SignAlgorithm {
    Sha1,
    Sha256,
}

impl From<SignAlgorithm> for HashAlgorithm {
    fn from(algorithm: SignAlgorithm) -> Self {
        match algorithm {
            SignAlgorithm::Sha1 => HashAlgorithm::Sha1,
            SignAlgorithm::Sha256 => HashAlgorithm::Sha256,
        }
    }
}

// ============================================================================
// Error Types
// ============================================================================

/// CLI operation errors
#[derive(Debug, thiserror::Error)]
pub enum CliError {
    #[error("Configuration error: {0}")]
    Configuration(#[from] ConfigError),

    #[error("Webhook error: {0}")]
    Webhook(#[from] WebhookError),

    #[error("API error: {0}")]
    Api(#[from] ApiError),

    #[error("Invalid argument: {arg} - {message}")]
    InvalidArgument { arg: String, message: String },

    #[error("Failed to read {path}: {source}")]
    ReadInput {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to render output: {0}")]
    Output(#[from] serde_json::Error),

    #[error("Logging initialization failed: {message}")]
    Logging { message: String },
}

impl CliError {
    /// Process exit code for this error.
    ///
    /// | Code | Meaning |
    /// |------|---------|
    /// | 2 | unknown webhook event |
    /// | 3 | invalid webhook signature |
    /// | 4 | malformed webhook payload |
    /// | 1 | anything else |
    pub fn exit_code(&self) -> i32 {
        match self {
            Self::Webhook(WebhookError::UnknownEvent { .. }) => 2,
            Self::Webhook(WebhookError::SignatureInvalid { .. }) => 3,
            Self::Webhook(WebhookError::Decode(_) | WebhookError::MalformedPayload { .. }) => 4,
            _ => 1,
        }
    }
}

/// Configuration-related errors
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Configuration file not found: {path}")]
    FileNotFound { path: PathBuf },

    #[error("Failed to load configuration: {0}")]
    Load(#[from] config::ConfigError),

    #[error("Failed to render configuration: {0}")]
    Render(#[from] toml::ser::Error),

    #[error("Invalid configuration value for {key}: {message}")]
    InvalidValue { key: String, message: String },
}

// ============================================================================
// Configuration Types
// ============================================================================

/// CLI configuration structure
#[derive(Clone, Default, Deserialize, Serialize)]
#[serde(default)]
pub struct CliConfig {
    /// Logging configuration
    pub logging: LoggingConfig,

    /// Webhook secrets keyed by driver name
    pub secrets: BTreeMap<String, String>,

    /// Provider API access
    pub api: ApiConfig,
}

impl CliConfig {
    /// Secret configured for `driver`, if any.
    pub fn secret_for(&self, driver: Driver) -> Option<&str> {
        self.secrets.get(driver.as_str()).map(String::as_str)
    }

    /// Copy of this configuration with secrets and tokens masked.
    pub fn redacted(&self) -> Self {
        let mut config = self.clone();
        for secret in config.secrets.values_mut() {
            *secret = REDACTED.to_string();
        }
        if config.api.token.is_some() {
            config.api.token = Some(REDACTED.to_string());
        }
        config
    }

    /// Check values the type system cannot.
    pub fn validate(&self) -> Result<(), ConfigError> {
        EnvFilter::try_new(&self.logging.level).map_err(|e| ConfigError::InvalidValue {
            key: "logging.level".to_string(),
            message: e.to_string(),
        })?;

        for name in self.secrets.keys() {
            name.parse::<Driver>()
                .map_err(|e| ConfigError::InvalidValue {
                    key: format!("secrets.{}", name),
                    message: e.to_string(),
                })?;
        }

        if self.api.timeout_seconds == 0 {
            return Err(ConfigError::InvalidValue {
                key: "api.timeout_seconds".to_string(),
                message: "must be greater than zero".to_string(),
            });
        }

        Ok(())
    }
}

// Security: Don't expose secrets in debug output
impl std::fmt::Debug for CliConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let redacted = self.redacted();
        f.debug_struct("CliConfig")
            .field("logging", &redacted.logging)
            .field("secrets", &redacted.secrets)
            .field("api", &redacted.api)
            .finish()
    }
}

/// Logging configuration
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct LoggingConfig {
    pub level: String,
    pub json: bool,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            json: false,
        }
    }
}

/// Provider API configuration
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct ApiConfig {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub base_url: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub token: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub user_agent: Option<String>,
    pub timeout_seconds: u64,
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            base_url: None,
            token: None,
            user_agent: None,
            timeout_seconds: 30,
        }
    }
}

impl ApiConfig {
    /// Library client configuration for these settings.
    pub fn client_config(&self) -> ClientConfig {
        let mut config =
            ClientConfig::default().with_timeout(Duration::from_secs(self.timeout_seconds));
        if let Some(base_url) = &self.base_url {
            config = config.with_base_url(base_url);
        }
        if let Some(user_agent) = &self.user_agent {
            config = config.with_user_agent(user_agent);
        }
        if let Some(token) = &self.token {
            config = config.with_token(token);
        }
        config
    }
}

// ============================================================================
// Main Entry Point
// ============================================================================

/// Main CLI entry point
pub async fn run_cli() -> Result<(), CliError> {
    let cli = Cli::parse();

    let config = load_configuration(cli.config.as_deref())?;
    initialize_logging(&cli, &config)?;

    let output = execute_command(cli.command, &config).await?;
    if !output.is_empty() {
        println!("{}", output);
    }
    Ok(())
}

/// Run one command and return what it prints.
pub async fn execute_command(command: Commands, config: &CliConfig) -> Result<String, CliError> {
    match command {
        Commands::Parse {
            driver,
            body,
            headers,
            query,
            secret,
        } => execute_parse_command(driver, &body, &headers, query.as_deref(), secret, config).await,
        Commands::Sign {
            algorithm,
            secret,
            body,
            prefix,
        } => execute_sign_command(algorithm, &secret, &body, prefix).await,
        Commands::Drivers => Ok(execute_drivers_command()),
        Commands::Config { show } => execute_config_command(show, config),
        Commands::Repo { driver, repository } => {
            execute_repo_command(driver, &repository, config).await
        }
        Commands::Completions { shell } => execute_completions_command(shell),
    }
}

// ============================================================================
// Setup
// ============================================================================

/// Load configuration from the default file, an explicit file and the environment.
///
/// Later sources override earlier ones. An explicit file must exist.
pub fn load_configuration(config_path: Option<&Path>) -> Result<CliConfig, ConfigError> {
    let mut builder = config::Config::builder()
        .add_source(config::File::with_name(DEFAULT_CONFIG_FILE).required(false));

    if let Some(path) = config_path {
        if !path.exists() {
            return Err(ConfigError::FileNotFound {
                path: path.to_path_buf(),
            });
        }
        builder = builder.add_source(config::File::from(path).required(true));
    }

    let config: CliConfig = builder
        .add_source(
            config::Environment::with_prefix(ENV_PREFIX)
                .prefix_separator("__")
                .separator("__")
                .try_parsing(true),
        )
        .build()?
        .try_deserialize()?;

    config.validate()?;
    Ok(config)
}

/// Initialize logging based on CLI arguments and configuration.
///
/// `--log-level` wins over `RUST_LOG`, which wins over `logging.level`.
/// Logs go to stderr so command output on stdout stays machine readable.
pub fn initialize_logging(cli: &Cli, config: &CliConfig) -> Result<(), CliError> {
    let filter = match &cli.log_level {
        Some(level) => EnvFilter::try_new(level).map_err(|e| CliError::InvalidArgument {
            arg: "log-level".to_string(),
            message: e.to_string(),
        })?,
        None => EnvFilter::try_from_default_env()
            .or_else(|_| EnvFilter::try_new(&config.logging.level))
            .map_err(|e| CliError::Logging {
                message: e.to_string(),
            })?,
    };

    let builder = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr);

    let result = if cli.json_logs || config.logging.json {
        builder.json().try_init()
    } else {
        builder.try_init()
    };

    result.map_err(|e| CliError::Logging {
        message: e.to_string(),
    })
}

// ============================================================================
// Command Implementations
// ============================================================================

/// Execute parse command
async fn execute_parse_command(
    driver: Driver,
    body: &Path,
    headers: &[String],
    query: Option<&str>,
    secret: Option<String>,
    config: &CliConfig,
) -> Result<String, CliError> {
    let headers = headers
        .iter()
        .map(|raw| parse_header(raw))
        .collect::<Result<Vec<_>, _>>()?;

    let mut request = WebhookRequest::from_reader(headers, open_input(body).await?).await?;
    if let Some(query) = query {
        request = request.with_query(query);
    }

    let secret = secret
        .or_else(|| config.secret_for(driver).map(str::to_string))
        .unwrap_or_default();
    if secret.is_empty() {
        info!(driver = %driver, "No secret configured, signature will not be verified");
    }

    debug!(driver = %driver, body_len = request.body().len(), "Parsing webhook");
    let hook = match Client::new(driver)
        .parse_webhook(&request, &StaticSecret::new(secret))
        .await
    {
        Ok(hook) => hook,
        Err(e) => {
            if let Some(hook) = e.hook() {
                warn!(
                    driver = %driver,
                    kind = hook.kind().as_str(),
                    repository = %hook.repository().full_name,
                    "Rejected unverified webhook"
                );
            }
            return Err(e.into());
        }
    };

    info!(
        driver = %driver,
        kind = hook.kind().as_str(),
        repository = %hook.repository().full_name,
        "Parsed webhook"
    );
    Ok(serde_json::to_string_pretty(&hook)?)
}

/// Execute sign command
async fn execute_sign_command(
    algorithm: SignAlgorithm,
    secret: &str,
    body: &Path,
    prefix: bool,
) -> Result<String, CliError> {
    let mut payload = Vec::new();
    open_input(body)
        .await?
        .read_to_end(&mut payload)
        .await
        .map_err(|source| CliError::ReadInput {
            path: body.to_path_buf(),
            source,
        })?;

    let algorithm = HashAlgorithm::from(algorithm);
    let signature = hmac::sign_encoded(algorithm, secret.as_bytes(), &payload);
    Ok(if prefix {
        format!("{}={}", algorithm, signature)
    } else {
        signature
    })
}

/// Execute drivers command
fn execute_drivers_command() -> String {
    let mut lines = vec![format!("{:<12} {:<20} {}", "DRIVER", "EVENT", "SIGNATURE")];
    for driver in Driver::ALL {
        lines.push(format!(
            "{:<12} {:<20} {}",
            driver.as_str(),
            driver.event_header().unwrap_or("(SNS envelope)"),
            driver.signature_header().unwrap_or("SNS message signature"),
        ));
    }
    lines.join("\n")
}

/// Execute config command
fn execute_config_command(show: bool, config: &CliConfig) -> Result<String, CliError> {
    config.validate()?;
    if !show {
        return Ok("Configuration is valid".to_string());
    }
    Ok(toml::to_string_pretty(&config.redacted()).map_err(ConfigError::from)?)
}

/// Execute repo command
async fn execute_repo_command(
    driver: Driver,
    repository: &str,
    config: &CliConfig,
) -> Result<String, CliError> {
    match repository.split_once('/') {
        Some((owner, name)) if !owner.is_empty() && !name.is_empty() => {}
        _ => {
            return Err(CliError::InvalidArgument {
                arg: "repository".to_string(),
                message: format!("expected owner/name, got '{}'", repository),
            })
        }
    }

    info!(driver = %driver, repository = %repository, "Looking up repository");
    let client = Client::builder(driver)
        .config(config.api.client_config())
        .build()?;
    let repo = client.repositories()?.find(repository).await?;

    Ok(serde_json::to_string_pretty(&repo)?)
}

/// Execute completions command
fn execute_completions_command(shell: clap_complete::Shell) -> Result<String, CliError> {
    let mut buffer = Vec::new();
    clap_complete::generate(shell, &mut Cli::command(), "scm-bridge", &mut buffer);
    Ok(String::from_utf8_lossy(&buffer).into_owned())
}

// ============================================================================
// Helpers
// ============================================================================

/// Split a `Name: value` header argument.
fn parse_header(raw: &str) -> Result<(String, String), CliError> {
    match raw.split_once(':') {
        Some((name, value)) if !name.trim().is_empty() => {
            Ok((name.trim().to_string(), value.trim().to_string()))
        }
        _ => Err(CliError::InvalidArgument {
            arg: "header".to_string(),
            message: format!("expected 'Name: value', got '{}'", raw),
        }),
    }
}

/// Open a file argument, `-` meaning stdin.
async fn open_input(path: &Path) -> Result<Box<dyn AsyncRead + Unpin + Send>, CliError> {
    if path == Path::new("-") {
        return Ok(Box::new(tokio::io::stdin()));
    }

    let file = tokio::fs::File::open(path)
        .await
        .map_err(|source| CliError::ReadInput {
            path: path.to_path_buf(),
            source,
        })?;
    Ok(Box::new(file))
}

#[cfg(test)]
#[path = "lib_tests.rs"]
mod tests;

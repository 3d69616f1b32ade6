//! # scm-bridge
//!
//! One client abstraction over several source-code-hosting providers. Every
//! driver translates its provider's native JSON shapes into the canonical
//! [`model`] so callers can handle a GitHub push and a Gitea push with the
//! same code.
//!
//! The crate is organised bottom-up:
//!
//! | Module | Responsibility |
//! |--------|----------------|
//! | [`model`] | Canonical domain types and the [`Webhook`] enum |
//! | [`hmac`] | Constant-time HMAC signature checks |
//! | [`webhook`] | Bounded webhook requests, secret resolution, the parser contract |
//! | [`drivers`] | One module per provider plus the [`Driver`] identity |
//! | [`service`] | Provider-neutral service traits (repositories, pull requests, ...) |
//! | [`client`] | The [`Client`] composition root and HTTP transport |
//!
//! # Examples
//!
//! ```rust,no_run
//! use scm_bridge::{Client, Driver, StaticSecret, WebhookRequest};
//!
//! # async fn example(body: Vec<u8>) -> Result<(), Box<dyn std::error::Error>> {
//! let client = Client::new(Driver::Github);
//! let request = WebhookRequest::new(
//!     [("X-GitHub-Event", "push"), ("X-Hub-Signature-256", "sha256=...")],
//!     body,
//! );
//!
//! let hook = client
//!     .parse_webhook(&request, &StaticSecret::new("topsecret"))
//!     .await?;
//! println!("{} on {}", hook.kind(), hook.repository().full_name);
//! # Ok(())
//! # }
//! ```

pub mod client;
pub mod drivers;
pub mod error;
pub mod hmac;
pub mod model;
pub mod pagination;
pub mod service;
pub mod webhook;

pub use client::{Client, ClientBuilder, ClientConfig};
pub use drivers::Driver;
pub use error::{ApiError, ErrorCategory, SecretError, WebhookError};
pub use model::{Action, State, Webhook, WebhookKind};
pub use pagination::{ListOptions, PagedResponse, Pagination};
pub use webhook::{SecretResolver, StaticSecret, WebhookParser, WebhookRequest, MAX_BODY_SIZE};

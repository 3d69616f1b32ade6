//! Amazon SNS message envelope and its signature prerequisites.

use async_trait::async_trait;
use regex::Regex;
use serde::Deserialize;
use std::sync::LazyLock;

static SNS_CERT_HOST: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^sns\.[a-z0-9-]+\.amazonaws\.com(\.cn)?$").expect("SNS host regex is valid")
});

/// An SNS HTTP(S) delivery.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct SnsEnvelope {
    #[serde(rename = "Type")]
    pub message_type: String,
    pub message_id: String,
    pub topic_arn: String,
    #[serde(default)]
    pub subject: Option<String>,
    pub message: String,
    pub timestamp: String,
    #[serde(default)]
    pub signature_version: String,
    #[serde(default)]
    pub signature: String,
    #[serde(rename = "SigningCertURL", default)]
    pub signing_cert_url: String,
    #[serde(rename = "SubscribeURL", default)]
    pub subscribe_url: Option<String>,
    #[serde(default)]
    pub token: Option<String>,
}

impl SnsEnvelope {
    pub const NOTIFICATION: &'static str = "Notification";

    /// The canonical string SNS signs for this message type.
    pub fn string_to_sign(&self) -> String {
        let mut out = String::new();
        let mut field = |name: &str, value: &str| {
            out.push_str(name);
            out.push('\n');
            out.push_str(value);
            out.push('\n');
        };

        field("Message", &self.message);
        field("MessageId", &self.message_id);
        if self.message_type == Self::NOTIFICATION {
            if let Some(subject) = &self.subject {
                field("Subject", subject);
            }
        } else if let Some(url) = &self.subscribe_url {
            field("SubscribeURL", url);
        }
        field("Timestamp", &self.timestamp);
        if self.message_type != Self::NOTIFICATION {
            if let Some(token) = &self.token {
                field("Token", token);
            }
        }
        field("TopicArn", &self.topic_arn);
        field("Type", &self.message_type);
        out
    }

    /// SignatureVersion 1 is SHA1withRSA, 2 is SHA256withRSA.
    pub fn has_supported_signature_version(&self) -> bool {
        matches!(self.signature_version.as_str(), "1" | "2")
    }

    /// The certificate must be served over HTTPS from an SNS endpoint.
    pub fn has_trusted_cert_url(&self) -> bool {
        let Ok(url) = url::Url::parse(&self.signing_cert_url) else {
            return false;
        };
        url.scheme() == "https"
            && url
                .host_str()
                .map(|host| SNS_CERT_HOST.is_match(host))
                .unwrap_or(false)
    }
}

/// Checks the RSA signature of an SNS message.
///
/// Implementations fetch the certificate at `signing_cert_url` and verify
/// `signature` over [`SnsEnvelope::string_to_sign`].
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait SnsVerifier: Send + Sync {
    async fn verify(&self, envelope: &SnsEnvelope) -> bool;
}

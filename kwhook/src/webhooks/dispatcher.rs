//! Webhook delivery: one JSON POST per message.
//!
//! ```text
//! WebhookClient::new(config)
//!   ├─ url: required, must parse
//!   ├─ tls_skip → accept invalid certs (warned)
//!   ├─ cert → read PEM bundle → add each as trusted root
//!   └─ timeout → per-request deadline
//!
//! WebhookClient::deliver(message)
//!   ├─ serialize to JSON
//!   ├─ POST url, Content-Type: application/json
//!   └─ 2xx → Ok, other status → UnexpectedStatus, no response → Transport
//! ```
//!
//! The HTTP client is built once with its trust settings and shared by every delivery.
//! There is no retry.

use std::path::Path;

use url::Url;

use crate::config::WebhookConfig;
use crate::errors::{Error, Result};
use crate::webhooks::events::OutboundMessage;

pub struct WebhookClient {
    url: Url,
    http_client: reqwest::Client,
}

impl WebhookClient {
    /// Build the client from resolved webhook settings.
    pub fn new(config: &WebhookConfig) -> Result<Self> {
        let raw = config.url.as_deref().map(str::trim).filter(|u| !u.is_empty()).ok_or(Error::MissingWebhookUrl)?;
        let url = Url::parse(raw).map_err(|source| Error::InvalidWebhookUrl {
            url: raw.to_string(),
            source,
        })?;

        let mut builder = reqwest::Client::builder();

        if config.tls_skip {
            tracing::warn!("Webhook TLS verification disabled, server certificates are not checked");
            builder = builder.danger_accept_invalid_certs(true);
        }

        match config.cert.as_deref().filter(|p| !p.as_os_str().is_empty()) {
            Some(path) => {
                for cert in load_certificates(path)? {
                    builder = builder.add_root_certificate(cert);
                }
                tracing::debug!(path = %path.display(), "Trusting webhook cert");
            }
            None => tracing::info!("No webhook cert is given"),
        }

        if let Some(timeout) = config.timeout {
            builder = builder.timeout(timeout);
        }

        let http_client = builder.build().map_err(Error::HttpClient)?;

        Ok(Self { url, http_client })
    }

    pub fn url(&self) -> &Url {
        &self.url
    }

    /// POST one message to the endpoint.
    pub async fn deliver(&self, message: &OutboundMessage) -> Result<()> {
        let body = serde_json::to_string(message)?;

        tracing::debug!(url = %self.url, kind = %message.message_type, name = %message.name, "Sending webhook HTTP request");

        let response = self
            .http_client
            .post(self.url.clone())
            .header("Content-Type", "application/json")
            .body(body)
            .send()
            .await
            .map_err(Error::Transport)?;

        let status = response.status();
        if !status.is_success() {
            return Err(Error::UnexpectedStatus { status: status.as_u16() });
        }

        tracing::debug!(status = status.as_u16(), "Webhook delivered");
        Ok(())
    }
}

/// Read a PEM bundle and parse every certificate in it.
fn load_certificates(path: &Path) -> Result<Vec<reqwest::Certificate>> {
    let pem = std::fs::read(path).map_err(|source| Error::CertificateRead {
        path: path.to_path_buf(),
        source,
    })?;

    let certs = reqwest::Certificate::from_pem_bundle(&pem).map_err(|e| Error::CertificateParse {
        path: path.to_path_buf(),
        reason: e.to_string(),
    })?;

    if certs.is_empty() {
        return Err(Error::CertificateParse {
            path: path.to_path_buf(),
            reason: "no PEM certificates found".to_string(),
        });
    }

    Ok(certs)
}

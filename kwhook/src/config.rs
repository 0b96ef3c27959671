//! Handler configuration.
//!
//! Configuration is loaded from a YAML file with environment variable and command line
//! overrides. The file path defaults to `config.yaml` but can be specified via `-f` or
//! `KWHOOK_CONFIG`. A missing file is not an error.
//!
//! ## Loading Priority
//!
//! Sources are merged in the following order (later sources override earlier ones):
//!
//! 1. **Legacy environment** - `KW_WEBHOOK_URL`, `KW_WEBHOOK_CERT`, `KW_WEBHOOK_TLS_SKIP`
//! 2. **YAML config file** - Base configuration (default: `config.yaml`)
//! 3. **Environment variables** - Variables prefixed with `KWHOOK_`; nested values use double
//!    underscores, e.g. `KWHOOK_WEBHOOK__TIMEOUT=5s`
//! 4. **Command line flags** - `--url/-u`, `--cert`, `--tls-skip`
//!
//! A blank `url` or `cert` counts as unset at every level, so `url: ""` in the file still
//! lets `KW_WEBHOOK_URL` through, and an empty cert means the default trust roots.
//!
//! ## Example
//!
//! ```yaml
//! handler: webhook
//! webhook:
//!   url: https://hooks.example.com/cluster-changes
//!   cert: /etc/kwhook/ca.pem
//!   timeout: 10s
//! suppressions:
//!   - namespace: kube-system
//!     kind: ConfigMap
//!   # Listing suppressions replaces the defaults, e.g. adding a noisy cluster namespace:
//!   - namespace: gke-cluster-dataproc-pgv2-poc
//!     kind: ConfigMap
//! ```

use std::path::PathBuf;
use std::time::Duration;

use clap::Parser;
use figment::{
    Figment,
    providers::{Env, Format, Yaml},
};
use serde::{Deserialize, Serialize};
use url::Url;

use crate::errors::Error;
use crate::filter::{SuppressionRule, default_suppressions};

/// Command line arguments
#[derive(Parser, Debug, Default)]
#[command(author, version, about, long_about = None)]
pub struct Args {
    /// Path to configuration file
    #[arg(short = 'f', long, env = "KWHOOK_CONFIG", default_value = "config.yaml")]
    pub config: String,

    /// Validate configuration and exit without reading events.
    #[arg(long)]
    pub validate: bool,

    /// Webhook URL, overrides every other source
    #[arg(short = 'u', long)]
    pub url: Option<String>,

    /// PEM certificate (or bundle) to trust for the webhook endpoint
    #[arg(long)]
    pub cert: Option<PathBuf>,

    /// Skip TLS verification of the webhook endpoint
    #[arg(long)]
    pub tls_skip: bool,

    /// Newline-delimited JSON events to process; stdin when absent
    #[arg(long)]
    pub events: Option<PathBuf>,
}

/// Which handler receives events
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum HandlerKind {
    /// Post notifications to the configured webhook
    #[default]
    Webhook,
    /// Log notifications without sending them
    Log,
}

/// Root configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default, deny_unknown_fields)]
pub struct Config {
    pub handler: HandlerKind,
    pub webhook: WebhookConfig,
    /// (namespace, kind) pairs that never notify
    pub suppressions: Vec<SuppressionRule>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            handler: HandlerKind::default(),
            webhook: WebhookConfig::default(),
            suppressions: default_suppressions(),
        }
    }
}

/// Webhook endpoint and trust settings.
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
#[serde(default, deny_unknown_fields)]
pub struct WebhookConfig {
    pub url: Option<String>,
    /// Extra trust root for self-signed endpoints
    pub cert: Option<PathBuf>,
    /// Disable certificate verification entirely
    pub tls_skip: bool,
    /// Per-request timeout; none when unset
    #[serde(with = "humantime_serde")]
    pub timeout: Option<Duration>,
}

impl WebhookConfig {
    /// Replace blank `url` and `cert` values with the ones from `fallback`.
    fn fill_blanks_from(&mut self, fallback: WebhookConfig) {
        self.url = non_blank(self.url.take()).or_else(|| non_blank(fallback.url));
        self.cert = non_blank_path(self.cert.take()).or_else(|| non_blank_path(fallback.cert));
    }
}

fn non_blank(value: Option<String>) -> Option<String> {
    value.filter(|v| !v.trim().is_empty())
}

fn non_blank_path(value: Option<PathBuf>) -> Option<PathBuf> {
    value.filter(|p| !p.as_os_str().is_empty())
}

impl Config {
    pub fn load(args: &Args) -> Result<Self, figment::Error> {
        let mut config: Self = Self::figment(args).extract()?;

        // A blank value in a higher layer must not hide the legacy variables
        let legacy: Self = Figment::from(Self::legacy_env()).extract()?;
        config.webhook.fill_blanks_from(legacy.webhook);

        if let Some(url) = non_blank(args.url.clone()) {
            config.webhook.url = Some(url);
        }
        if let Some(cert) = non_blank_path(args.cert.clone()) {
            config.webhook.cert = Some(cert);
        }
        if args.tls_skip {
            config.webhook.tls_skip = true;
        }

        config.validate().map_err(|e| figment::Error::from(e.to_string()))?;
        Ok(config)
    }

    /// Validate the configuration for consistency and required fields
    pub fn validate(&self) -> Result<(), Error> {
        if self.handler != HandlerKind::Webhook {
            return Ok(());
        }

        let url = self
            .webhook
            .url
            .as_deref()
            .map(str::trim)
            .filter(|u| !u.is_empty())
            .ok_or(Error::MissingWebhookUrl)?;

        Url::parse(url).map_err(|source| Error::InvalidWebhookUrl {
            url: url.to_string(),
            source,
        })?;

        Ok(())
    }

    pub fn figment(args: &Args) -> Figment {
        Figment::new()
            // Legacy variables fill in only what nothing else sets
            .merge(Self::legacy_env())
            .merge(Yaml::file(&args.config))
            .merge(Env::prefixed("KWHOOK_").ignore(&["config"]).split("__"))
    }

    /// `KW_WEBHOOK_URL`, `KW_WEBHOOK_CERT` and `KW_WEBHOOK_TLS_SKIP`, nested under `webhook`
    fn legacy_env() -> Env {
        Env::prefixed("KW_WEBHOOK_")
            .only(&["url", "cert", "tls_skip"])
            .map(|key| format!("webhook.{key}").into())
    }
}

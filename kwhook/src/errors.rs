use std::path::PathBuf;

use thiserror::Error as ThisError;

/// Usage hint attached to the missing-URL error.
const WEBHOOK_USAGE: &str = "You need to set the webhook url, and the webhook cert if you use self signed certificates, \
using \"--url/-u\" and \"--cert\", or using environment variables:\n\n\
export KW_WEBHOOK_URL=webhook_url\n\
export KW_WEBHOOK_CERT=/path/of/cert\n\n\
Command line flags and the config file override environment variables";

#[derive(ThisError, Debug)]
pub enum Error {
    /// No webhook URL after resolving config, environment and flags
    #[error("Missing webhook url\n\n{}", WEBHOOK_USAGE)]
    MissingWebhookUrl,

    /// The configured webhook URL does not parse
    #[error("Invalid webhook url {url}: {source}")]
    InvalidWebhookUrl {
        url: String,
        #[source]
        source: url::ParseError,
    },

    /// A certificate path was supplied but could not be read
    #[error("Failed to read webhook cert {}: {source}", .path.display())]
    CertificateRead {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// The certificate file was read but holds no usable PEM certificates
    #[error("Failed to parse webhook cert {}: {reason}", .path.display())]
    CertificateParse { path: PathBuf, reason: String },

    /// The HTTP client could not be constructed
    #[error("Failed to build webhook HTTP client: {0}")]
    HttpClient(#[source] reqwest::Error),

    /// Outbound message could not be encoded
    #[error("Failed to serialize webhook message: {0}")]
    Serialization(#[from] serde_json::Error),

    /// Connection, TLS or timeout failure while posting
    #[error("Webhook request failed: {0}")]
    Transport(#[source] reqwest::Error),

    /// The endpoint answered with a non-2xx status
    #[error("Webhook endpoint responded with HTTP {status}")]
    UnexpectedStatus { status: u16 },
}

impl Error {
    /// Whether this error belongs to a single event rather than to handler setup.
    ///
    /// Per-event errors are logged and the event is dropped; initialization errors are fatal.
    pub fn is_per_event(&self) -> bool {
        matches!(self, Error::Serialization(_) | Error::Transport(_) | Error::UnexpectedStatus { .. })
    }
}

/// Type alias for handler and transport results
pub type Result<T> = std::result::Result<T, Error>;

//! Webhook notification output.
//!
//! - [`events`]: outbound message type and the builder that derives it from an event
//! - [`dispatcher`]: TLS-configured HTTP client that posts messages

pub mod dispatcher;
pub mod events;

pub use dispatcher::WebhookClient;
pub use events::{OutboundMessage, RiskLevel};

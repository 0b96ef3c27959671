//! # kwhook: cluster change notifications over webhooks
//!
//! `kwhook` is a notification handler for cluster resource change events. A watch dispatcher
//! observes create, update and delete events on workloads, networking, RBAC, storage and
//! config objects; `kwhook` decides which of them are worth telling anyone about, reshapes
//! them into a flat JSON record and posts that record to an HTTP(S) webhook.
//!
//! ## Pipeline
//!
//! ```text
//! Event ──▶ filter::should_notify ──▶ OutboundMessage::build ──▶ WebhookClient::deliver
//!              │                          ├─ resources::get_metadata (labels)
//!              │                          └─ extract::extract (current / previous payload)
//!              └─ suppressed or unchanged: dropped
//! ```
//!
//! - The **significance filter** drops hard-suppressed (namespace, kind) pairs and updates
//!   that did not change the object's desired state.
//! - The **kind extractor** picks the meaningful payload per kind: `spec` for workloads,
//!   `data` for config maps and secrets, `rules` for roles, a subject/role summary for
//!   bindings.
//! - The **message builder** adds the acting controller and a risk level from static kind
//!   tables.
//! - The **delivery transport** owns one HTTP client with its TLS trust (extra CA bundle or
//!   verification disabled) fixed at startup.
//!
//! Delivery is fire-and-forget: failures are logged by the handler and the event is dropped.
//!
//! ## Handlers
//!
//! [`handlers::Handler`] is the seam the dispatcher talks to. [`handlers::create_handler`]
//! returns the webhook handler or a log-only dry-run handler depending on configuration.
//!
//! ## Binary
//!
//! The `kwhook` binary reads newline-delimited JSON events from a file or stdin and feeds them
//! to the configured handler. See [`config`] for configuration sources.

pub mod config;
pub mod errors;
pub mod event;
pub mod extract;
pub mod filter;
pub mod handlers;
pub mod intake;
pub mod resources;
pub mod telemetry;
pub mod webhooks;

#[cfg(test)]
mod test_utils;

pub use config::Config;
pub use event::Event;
pub use handlers::{Handler, create_handler};
pub use resources::{Kind, ResourceObject};

#[cfg(test)]
mod test;

//! Notification handler abstraction
//!
//! A handler is initialized once from configuration and then receives every event the
//! dispatcher observes. Handlers own their failure reporting: nothing they do per event is
//! surfaced to the caller.

use async_trait::async_trait;

use crate::config::{Config, HandlerKind};
use crate::errors::Result;
use crate::event::Event;

pub mod log;
pub mod webhook;

pub use log::LogHandler;
pub use webhook::WebhookHandler;

/// Create the handler selected by configuration
///
/// Adding a handler requires adding a match arm here.
pub fn create_handler(config: &Config) -> Result<Box<dyn Handler>> {
    Ok(match config.handler {
        HandlerKind::Webhook => Box::new(WebhookHandler::init(config)?),
        HandlerKind::Log => Box::new(LogHandler::init(config)?),
    })
}

/// Receives change events and turns them into notifications
#[async_trait]
pub trait Handler: Send + Sync {
    /// Build the handler from resolved configuration
    ///
    /// Errors here are fatal: the process should not start without a working handler.
    fn init(config: &Config) -> Result<Self>
    where
        Self: Sized;

    /// Process one event. Never fails from the caller's point of view.
    async fn handle(&self, event: &Event);
}

/// Outcome of offering one event to a handler
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Outcome {
    /// A notification was produced and handed on
    Notified,
    /// The significance filter dropped the event
    Suppressed,
}

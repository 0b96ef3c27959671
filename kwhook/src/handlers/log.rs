//! Dry-run handler: applies the same filter and builds the same message as the webhook
//! handler, then logs the JSON body instead of posting it.

use async_trait::async_trait;

use crate::config::Config;
use crate::errors::Result;
use crate::event::Event;
use crate::filter::{SuppressionRule, should_notify};
use crate::handlers::{Handler, Outcome};
use crate::webhooks::OutboundMessage;

pub struct LogHandler {
    suppressions: Vec<SuppressionRule>,
}

impl LogHandler {
    pub fn new(suppressions: Vec<SuppressionRule>) -> Self {
        Self { suppressions }
    }

    /// The message that would be sent, or `None` when the event is filtered out.
    pub fn render(&self, event: &Event) -> Result<(Outcome, Option<String>)> {
        if !should_notify(event, &self.suppressions) {
            return Ok((Outcome::Suppressed, None));
        }
        let body = serde_json::to_string(&OutboundMessage::build(event))?;
        Ok((Outcome::Notified, Some(body)))
    }
}

#[async_trait]
impl Handler for LogHandler {
    fn init(config: &Config) -> Result<Self> {
        tracing::info!("Log handler initialized, notifications will not be sent");
        Ok(Self::new(config.suppressions.clone()))
    }

    async fn handle(&self, event: &Event) {
        match self.render(event) {
            Ok((_, Some(body))) => tracing::info!(kind = %event.kind, name = %event.name, message = %body, "Notification"),
            Ok((_, None)) => {}
            Err(e) => tracing::error!(error = %e, kind = %event.kind, name = %event.name, "Failed to render notification"),
        }
    }
}

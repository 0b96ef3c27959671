//! Webhook handler: filter, build, post.

use async_trait::async_trait;

use crate::config::Config;
use crate::errors::Result;
use crate::event::Event;
use crate::filter::{SuppressionRule, should_notify};
use crate::handlers::{Handler, Outcome};
use crate::webhooks::{OutboundMessage, WebhookClient};

pub struct WebhookHandler {
    suppressions: Vec<SuppressionRule>,
    client: WebhookClient,
}

impl WebhookHandler {
    pub fn new(client: WebhookClient, suppressions: Vec<SuppressionRule>) -> Self {
        Self { suppressions, client }
    }

    /// Run one event through the pipeline and report what happened.
    pub async fn notify(&self, event: &Event) -> Result<Outcome> {
        if !should_notify(event, &self.suppressions) {
            return Ok(Outcome::Suppressed);
        }

        let message = OutboundMessage::build(event);
        self.client.deliver(&message).await?;
        Ok(Outcome::Notified)
    }
}

#[async_trait]
impl Handler for WebhookHandler {
    fn init(config: &Config) -> Result<Self> {
        let client = WebhookClient::new(&config.webhook)?;
        tracing::info!(url = %client.url(), suppressions = config.suppressions.len(), "Webhook handler initialized");
        Ok(Self::new(client, config.suppressions.clone()))
    }

    async fn handle(&self, event: &Event) {
        match self.notify(event).await {
            Ok(Outcome::Notified) => {
                tracing::info!(url = %self.client.url(), kind = %event.kind, name = %event.name, "Message successfully sent");
            }
            Ok(Outcome::Suppressed) => {}
            Err(e) => {
                tracing::error!(error = %e, kind = %event.kind, name = %event.name, "Failed to send webhook message");
            }
        }
    }
}

//! Inbound change event, as handed over by the watch dispatcher.

use serde::Deserialize;

use crate::resources::{Kind, ResourceObject};

/// One observed change to a cluster object.
///
/// Built by the dispatcher, consumed synchronously by a handler and then dropped.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Event {
    pub kind: Kind,
    pub name: String,
    #[serde(default)]
    pub namespace: String,
    /// Short machine reason, e.g. `Created`, `Updated`, `Deleted`
    pub reason: String,
    /// Severity reported by the dispatcher, e.g. `Normal`, `Warning`, `Danger`.
    /// Carried for other handlers; the webhook risk level comes from the kind.
    #[serde(default)]
    pub status: String,
    /// Overrides the derived human-readable message
    #[serde(default)]
    pub message: Option<String>,
    /// Current snapshot
    #[serde(default, alias = "object")]
    pub new_object: Option<ResourceObject>,
    /// Previous snapshot, absent on creation
    #[serde(default)]
    pub old_object: Option<ResourceObject>,
}

impl Event {
    /// Human-readable summary of the change.
    pub fn message(&self) -> String {
        if let Some(message) = &self.message {
            return message.clone();
        }

        let kind = self.kind.lowercase();
        let reason = self.reason.to_lowercase();
        if self.kind.is_cluster_scoped() {
            format!("A `{kind}` `{}` has been `{reason}`", self.name)
        } else {
            format!("A `{kind}` in namespace `{}` has been `{reason}`:\n`{}`", self.namespace, self.name)
        }
    }

    /// Whether the event describes a newly observed object
    pub fn is_create(&self) -> bool {
        self.old_object.is_none()
    }
}

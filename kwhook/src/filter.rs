//! Significance filter: decides whether an event is worth a notification.
//!
//! Policy, in order:
//!
//! 1. Hard suppressions: a [`SuppressionRule`] matching the object's namespace and the
//!    event kind drops the event, whatever changed.
//! 2. Creations (no previous snapshot) always pass.
//! 3. Kinds with a non-zero generation pass only when the generation moved, which skips
//!    status-only updates such as scaling refreshes.
//! 4. Everything else passes when the resource version moved.

use serde::{Deserialize, Serialize};

use crate::event::Event;
use crate::resources::{Kind, get_metadata};

/// A (namespace, kind) pair whose events are never notified.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct SuppressionRule {
    pub namespace: String,
    pub kind: Kind,
}

impl SuppressionRule {
    pub fn new(namespace: impl Into<String>, kind: Kind) -> Self {
        Self {
            namespace: namespace.into(),
            kind,
        }
    }

    fn matches(&self, namespace: &str, kind: &Kind) -> bool {
        self.namespace == namespace && &self.kind == kind
    }
}

/// Suppressions applied when the configuration does not list its own.
pub fn default_suppressions() -> Vec<SuppressionRule> {
    vec![SuppressionRule::new("kube-system", Kind::ConfigMap)]
}

/// Decide whether `event` should produce a notification.
pub fn should_notify(event: &Event, suppressions: &[SuppressionRule]) -> bool {
    let new = get_metadata(event.new_object.as_ref());
    let old = get_metadata(event.old_object.as_ref());

    let namespace = if new.namespace.is_empty() {
        event.namespace.as_str()
    } else {
        new.namespace.as_str()
    };

    if suppressions.iter().any(|rule| rule.matches(namespace, &event.kind)) {
        tracing::debug!(kind = %event.kind, namespace, name = %event.name, "Event suppressed by namespace rule");
        return false;
    }

    if event.is_create() {
        return true;
    }

    let changed = if new.generation != 0 {
        new.generation != old.generation
    } else {
        new.resource_version != old.resource_version
    };

    if !changed {
        tracing::debug!(
            kind = %event.kind,
            name = %event.name,
            generation = new.generation,
            resource_version = %new.resource_version,
            "No significant change, skipping notification"
        );
    }

    changed
}

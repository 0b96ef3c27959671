//! Outbound webhook message and its builder.
//!
//! Defines the wire record posted to the webhook endpoint and the static kind tables that
//! derive who acted on a resource and how risky a change to it is.

use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::event::Event;
use crate::extract::{ExtractedPayload, extract};
use crate::resources::{Kind, get_metadata};

/// Severity attached to a change, derived from the resource kind.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RiskLevel {
    Low,
    Medium,
    High,
}

impl std::fmt::Display for RiskLevel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Low => write!(f, "low"),
            Self::Medium => write!(f, "medium"),
            Self::High => write!(f, "high"),
        }
    }
}

/// Controller credited with changes to a kind.
pub fn action_by(kind: &Kind) -> &'static str {
    match kind {
        Kind::Deployment => "deployment-controller",
        Kind::Service => "service-controller",
        Kind::ConfigMap => "configmap-controller",
        Kind::Secret => "secret-controller",
        Kind::Namespace => "namespace-controller",
        Kind::DaemonSet => "daemonset-controller",
        Kind::StatefulSet => "statefulset-controller",
        Kind::Ingress => "ingress-controller",
        Kind::ReplicaSet
        | Kind::Job
        | Kind::HorizontalPodAutoscaler
        | Kind::PersistentVolume
        | Kind::ServiceAccount
        | Kind::Role
        | Kind::RoleBinding
        | Kind::ClusterRole
        | Kind::ClusterRoleBinding
        | Kind::Other(_) => "kubernetes-controller",
    }
}

/// Risk of a change to a kind.
pub fn risk_level(kind: &Kind) -> RiskLevel {
    match kind {
        Kind::Service | Kind::Namespace | Kind::StatefulSet | Kind::Ingress => RiskLevel::High,
        Kind::DaemonSet => RiskLevel::Low,
        Kind::Deployment
        | Kind::ConfigMap
        | Kind::Secret
        | Kind::ReplicaSet
        | Kind::Job
        | Kind::HorizontalPodAutoscaler
        | Kind::PersistentVolume
        | Kind::ServiceAccount
        | Kind::Role
        | Kind::RoleBinding
        | Kind::ClusterRole
        | Kind::ClusterRoleBinding
        | Kind::Other(_) => RiskLevel::Medium,
    }
}

/// Current and previous object details.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ObjectData {
    pub current_config_name: String,
    pub current_config_namespace: String,
    pub current_config_spec: serde_json::Value,
    pub old_config_name: String,
    pub old_config_namespace: String,
    pub old_config_spec: serde_json::Value,
}

impl ObjectData {
    pub fn new(current: ExtractedPayload, previous: ExtractedPayload) -> Self {
        Self {
            current_config_name: current.name,
            current_config_namespace: current.namespace,
            current_config_spec: current.spec,
            old_config_name: previous.name,
            old_config_namespace: previous.namespace,
            old_config_spec: previous.spec,
        }
    }
}

/// Complete webhook message payload.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OutboundMessage {
    /// Lower-cased resource kind
    #[serde(rename = "type")]
    pub message_type: String,
    pub name: String,
    pub summary: String,
    pub pod: String,
    pub entity: String,
    pub env: String,
    pub service_name: String,
    /// Lower-cased event reason
    pub action: String,
    pub created_at: DateTime<Utc>,
    pub action_by: String,
    pub risk_level: RiskLevel,
    /// Reserved, always empty
    pub metadata: BTreeMap<String, String>,
    pub data: ObjectData,
}

impl OutboundMessage {
    /// Build the message for an event, stamped with the current time.
    pub fn build(event: &Event) -> Self {
        Self::build_at(event, Utc::now())
    }

    pub fn build_at(event: &Event, created_at: DateTime<Utc>) -> Self {
        let labels = get_metadata(event.new_object.as_ref());
        let (current, previous) = extract(event);

        Self {
            message_type: event.kind.lowercase(),
            name: event.name.clone(),
            summary: event.message(),
            pod: labels.label("pod").to_string(),
            entity: labels.label("entity").to_string(),
            env: labels.label("environment").to_string(),
            service_name: labels.label("service").to_string(),
            action: event.reason.to_lowercase(),
            created_at,
            action_by: action_by(&event.kind).to_string(),
            risk_level: risk_level(&event.kind),
            metadata: BTreeMap::new(),
            data: ObjectData::new(current, previous),
        }
    }
}

//! Kind extractor: normalizes heterogeneous objects into (name, namespace, spec).
//!
//! Every typed kind implements [`Normalize`], which picks the field that carries the
//! object's meaningful payload:
//!
//! - config maps and secrets: their `data`
//! - roles and cluster roles: their `rules`
//! - bindings: a composite description of subjects and role reference
//! - service accounts: their secret and token settings
//! - everything else: the desired-state `spec`
//!
//! Name and namespace come from the shared object metadata. Extraction never fails: absent,
//! mismatched or unserializable objects become a zero-valued [`ExtractedPayload`].

use k8s_openapi::api::apps::v1::{DaemonSet, Deployment, ReplicaSet, StatefulSet};
use k8s_openapi::api::autoscaling::v2::HorizontalPodAutoscaler;
use k8s_openapi::api::batch::v1::Job;
use k8s_openapi::api::core::v1::{ConfigMap, Namespace, PersistentVolume, Secret, Service, ServiceAccount};
use k8s_openapi::api::networking::v1::Ingress;
use k8s_openapi::api::rbac::v1::{ClusterRole, ClusterRoleBinding, Role, RoleBinding, RoleRef, Subject};
use serde_json::{Map, Value};

use crate::event::Event;
use crate::resources::{Kind, ResourceObject};

/// Normalized view of one snapshot.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ExtractedPayload {
    pub name: String,
    pub namespace: String,
    /// Kind-dependent payload, `Null` when zero-valued
    pub spec: Value,
}

/// Selects the payload that best describes an object of a given kind.
pub trait Normalize {
    fn spec_payload(&self) -> serde_json::Result<Value>;
}

macro_rules! normalize_spec {
    ($($ty:ty),+ $(,)?) => {
        $(
            impl Normalize for $ty {
                fn spec_payload(&self) -> serde_json::Result<Value> {
                    serde_json::to_value(&self.spec)
                }
            }
        )+
    };
}

normalize_spec!(
    Deployment,
    DaemonSet,
    StatefulSet,
    ReplicaSet,
    Job,
    Service,
    Ingress,
    HorizontalPodAutoscaler,
    PersistentVolume,
    Namespace,
);

impl Normalize for ConfigMap {
    fn spec_payload(&self) -> serde_json::Result<Value> {
        match &self.binary_data {
            Some(binary) if !binary.is_empty() => {
                let mut payload = Map::new();
                payload.insert("data".to_string(), serde_json::to_value(&self.data)?);
                payload.insert("binaryData".to_string(), serde_json::to_value(binary)?);
                Ok(Value::Object(payload))
            }
            _ => serde_json::to_value(&self.data),
        }
    }
}

impl Normalize for Secret {
    fn spec_payload(&self) -> serde_json::Result<Value> {
        serde_json::to_value(&self.data)
    }
}

impl Normalize for ServiceAccount {
    fn spec_payload(&self) -> serde_json::Result<Value> {
        let mut payload = Map::new();
        payload.insert("secrets".to_string(), serde_json::to_value(&self.secrets)?);
        payload.insert("imagePullSecrets".to_string(), serde_json::to_value(&self.image_pull_secrets)?);
        payload.insert(
            "automountServiceAccountToken".to_string(),
            serde_json::to_value(self.automount_service_account_token)?,
        );
        Ok(Value::Object(payload))
    }
}

impl Normalize for Role {
    fn spec_payload(&self) -> serde_json::Result<Value> {
        serde_json::to_value(&self.rules)
    }
}

impl Normalize for ClusterRole {
    fn spec_payload(&self) -> serde_json::Result<Value> {
        serde_json::to_value(&self.rules)
    }
}

impl Normalize for RoleBinding {
    fn spec_payload(&self) -> serde_json::Result<Value> {
        Ok(Value::String(describe_binding(self.subjects.as_deref(), &self.role_ref)))
    }
}

impl Normalize for ClusterRoleBinding {
    fn spec_payload(&self) -> serde_json::Result<Value> {
        Ok(Value::String(describe_binding(self.subjects.as_deref(), &self.role_ref)))
    }
}

/// `Subjects: [User/alice, ServiceAccount/ops/deployer], RoleRef: ClusterRole/admin`
fn describe_binding(subjects: Option<&[Subject]>, role_ref: &RoleRef) -> String {
    let subjects = subjects
        .unwrap_or_default()
        .iter()
        .map(|subject| match subject.namespace.as_deref() {
            Some(namespace) if !namespace.is_empty() => format!("{}/{}/{}", subject.kind, namespace, subject.name),
            _ => format!("{}/{}", subject.kind, subject.name),
        })
        .collect::<Vec<_>>()
        .join(", ");

    format!("Subjects: [{subjects}], RoleRef: {}/{}", role_ref.kind, role_ref.name)
}

impl ResourceObject {
    /// Kind-specific payload; unstructured objects have none.
    pub fn spec_payload(&self) -> serde_json::Result<Value> {
        match self {
            ResourceObject::Deployment(o) => o.spec_payload(),
            ResourceObject::DaemonSet(o) => o.spec_payload(),
            ResourceObject::StatefulSet(o) => o.spec_payload(),
            ResourceObject::ReplicaSet(o) => o.spec_payload(),
            ResourceObject::Job(o) => o.spec_payload(),
            ResourceObject::Service(o) => o.spec_payload(),
            ResourceObject::Ingress(o) => o.spec_payload(),
            ResourceObject::HorizontalPodAutoscaler(o) => o.spec_payload(),
            ResourceObject::PersistentVolume(o) => o.spec_payload(),
            ResourceObject::ConfigMap(o) => o.spec_payload(),
            ResourceObject::Secret(o) => o.spec_payload(),
            ResourceObject::ServiceAccount(o) => o.spec_payload(),
            ResourceObject::Namespace(o) => o.spec_payload(),
            ResourceObject::Role(o) => o.spec_payload(),
            ResourceObject::RoleBinding(o) => o.spec_payload(),
            ResourceObject::ClusterRole(o) => o.spec_payload(),
            ResourceObject::ClusterRoleBinding(o) => o.spec_payload(),
            ResourceObject::Unstructured { .. } => Ok(Value::Null),
        }
    }
}

/// Extract the (current, previous) payloads of an event.
pub fn extract(event: &Event) -> (ExtractedPayload, ExtractedPayload) {
    if !event.kind.is_supported() {
        tracing::info!(kind = %event.kind, name = %event.name, "Unhandled object kind, sending without object details");
        return (ExtractedPayload::default(), ExtractedPayload::default());
    }

    (
        normalize(&event.kind, event.new_object.as_ref(), "current"),
        normalize(&event.kind, event.old_object.as_ref(), "previous"),
    )
}

fn normalize(kind: &Kind, object: Option<&ResourceObject>, side: &'static str) -> ExtractedPayload {
    let Some(object) = object else {
        tracing::debug!(%kind, side, "No object snapshot, using empty payload");
        return ExtractedPayload::default();
    };

    let actual = object.kind();
    if &actual != kind {
        tracing::warn!(expected = %kind, actual = %actual, side, "Object is not of the event's kind, using empty payload");
        return ExtractedPayload::default();
    }

    let meta = object.metadata();
    let spec = match object.spec_payload() {
        Ok(spec) => spec,
        Err(e) => {
            tracing::warn!(error = %e, %kind, side, "Failed to encode object payload, leaving spec empty");
            Value::Null
        }
    };

    ExtractedPayload {
        name: meta.name.clone().unwrap_or_default(),
        namespace: meta.namespace.clone().unwrap_or_default(),
        spec,
    }
}

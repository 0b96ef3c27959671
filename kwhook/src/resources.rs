//! Resource kinds, typed resource snapshots and the metadata accessor.
//!
//! Events carry the changed object as a [`ResourceObject`]: one variant per supported kind,
//! wrapping the `k8s-openapi` definition, plus [`ResourceObject::Unstructured`] for anything
//! without a typed variant. [`get_metadata`] turns an optional snapshot into the flat
//! [`ResourceMetadata`] view the significance filter and message builder work from.
//!
//! # Kinds
//!
//! [`Kind`] is a closed enumeration. Tags are matched case-insensitively, so `Deployment`,
//! `deployment` and `DEPLOYMENT` all parse to [`Kind::Deployment`]; unknown tags are kept
//! verbatim in [`Kind::Other`].

use std::collections::BTreeMap;
use std::fmt;

use k8s_openapi::Metadata;
use k8s_openapi::api::apps::v1::{DaemonSet, Deployment, ReplicaSet, StatefulSet};
use k8s_openapi::api::autoscaling::v2::HorizontalPodAutoscaler;
use k8s_openapi::api::batch::v1::Job;
use k8s_openapi::api::core::v1::{ConfigMap, Namespace, PersistentVolume, Secret, Service, ServiceAccount};
use k8s_openapi::api::networking::v1::Ingress;
use k8s_openapi::api::rbac::v1::{ClusterRole, ClusterRoleBinding, Role, RoleBinding};
use k8s_openapi::apimachinery::pkg::apis::meta::v1::ObjectMeta;
use serde::{Deserialize, Deserializer, Serialize};

/// Type tag of a cluster object.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum Kind {
    Deployment,
    DaemonSet,
    StatefulSet,
    ReplicaSet,
    Job,
    Service,
    Ingress,
    HorizontalPodAutoscaler,
    PersistentVolume,
    ConfigMap,
    Secret,
    ServiceAccount,
    Namespace,
    Role,
    RoleBinding,
    ClusterRole,
    ClusterRoleBinding,
    /// Any kind without dedicated handling, as received
    Other(String),
}

impl Kind {
    /// Canonical CamelCase tag, as used in `kind:` fields
    pub fn as_str(&self) -> &str {
        match self {
            Kind::Deployment => "Deployment",
            Kind::DaemonSet => "DaemonSet",
            Kind::StatefulSet => "StatefulSet",
            Kind::ReplicaSet => "ReplicaSet",
            Kind::Job => "Job",
            Kind::Service => "Service",
            Kind::Ingress => "Ingress",
            Kind::HorizontalPodAutoscaler => "HorizontalPodAutoscaler",
            Kind::PersistentVolume => "PersistentVolume",
            Kind::ConfigMap => "ConfigMap",
            Kind::Secret => "Secret",
            Kind::ServiceAccount => "ServiceAccount",
            Kind::Namespace => "Namespace",
            Kind::Role => "Role",
            Kind::RoleBinding => "RoleBinding",
            Kind::ClusterRole => "ClusterRole",
            Kind::ClusterRoleBinding => "ClusterRoleBinding",
            Kind::Other(kind) => kind,
        }
    }

    /// Lower-cased tag, the form used on the wire
    pub fn lowercase(&self) -> String {
        self.as_str().to_lowercase()
    }

    /// Kinds that live outside any namespace
    pub fn is_cluster_scoped(&self) -> bool {
        matches!(
            self,
            Kind::Namespace | Kind::PersistentVolume | Kind::ClusterRole | Kind::ClusterRoleBinding
        )
    }

    /// Whether the extractor has a rule for this kind
    pub fn is_supported(&self) -> bool {
        !matches!(self, Kind::Other(_))
    }
}

impl From<&str> for Kind {
    fn from(s: &str) -> Self {
        match s.to_ascii_lowercase().as_str() {
            "deployment" => Kind::Deployment,
            "daemonset" => Kind::DaemonSet,
            "statefulset" => Kind::StatefulSet,
            "replicaset" => Kind::ReplicaSet,
            "job" => Kind::Job,
            "service" => Kind::Service,
            "ingress" => Kind::Ingress,
            "horizontalpodautoscaler" => Kind::HorizontalPodAutoscaler,
            "persistentvolume" => Kind::PersistentVolume,
            "configmap" => Kind::ConfigMap,
            "secret" => Kind::Secret,
            "serviceaccount" => Kind::ServiceAccount,
            "namespace" => Kind::Namespace,
            "role" => Kind::Role,
            "rolebinding" => Kind::RoleBinding,
            "clusterrole" => Kind::ClusterRole,
            "clusterrolebinding" => Kind::ClusterRoleBinding,
            _ => Kind::Other(s.to_string()),
        }
    }
}

impl From<String> for Kind {
    fn from(s: String) -> Self {
        Kind::from(s.as_str())
    }
}

impl From<Kind> for String {
    fn from(kind: Kind) -> Self {
        kind.as_str().to_string()
    }
}

impl fmt::Display for Kind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Snapshot of a cluster object as delivered by the watch dispatcher.
#[derive(Debug, Clone, PartialEq)]
pub enum ResourceObject {
    Deployment(Box<Deployment>),
    DaemonSet(Box<DaemonSet>),
    StatefulSet(Box<StatefulSet>),
    ReplicaSet(Box<ReplicaSet>),
    Job(Box<Job>),
    Service(Box<Service>),
    Ingress(Box<Ingress>),
    HorizontalPodAutoscaler(Box<HorizontalPodAutoscaler>),
    PersistentVolume(Box<PersistentVolume>),
    ConfigMap(Box<ConfigMap>),
    Secret(Box<Secret>),
    ServiceAccount(Box<ServiceAccount>),
    Namespace(Box<Namespace>),
    Role(Box<Role>),
    RoleBinding(Box<RoleBinding>),
    ClusterRole(Box<ClusterRole>),
    ClusterRoleBinding(Box<ClusterRoleBinding>),
    /// An object of a kind without a typed variant, or one whose typed form failed to parse
    Unstructured { kind: String, metadata: ObjectMeta },
}

impl ResourceObject {
    /// The kind of the wrapped object
    pub fn kind(&self) -> Kind {
        match self {
            ResourceObject::Deployment(_) => Kind::Deployment,
            ResourceObject::DaemonSet(_) => Kind::DaemonSet,
            ResourceObject::StatefulSet(_) => Kind::StatefulSet,
            ResourceObject::ReplicaSet(_) => Kind::ReplicaSet,
            ResourceObject::Job(_) => Kind::Job,
            ResourceObject::Service(_) => Kind::Service,
            ResourceObject::Ingress(_) => Kind::Ingress,
            ResourceObject::HorizontalPodAutoscaler(_) => Kind::HorizontalPodAutoscaler,
            ResourceObject::PersistentVolume(_) => Kind::PersistentVolume,
            ResourceObject::ConfigMap(_) => Kind::ConfigMap,
            ResourceObject::Secret(_) => Kind::Secret,
            ResourceObject::ServiceAccount(_) => Kind::ServiceAccount,
            ResourceObject::Namespace(_) => Kind::Namespace,
            ResourceObject::Role(_) => Kind::Role,
            ResourceObject::RoleBinding(_) => Kind::RoleBinding,
            ResourceObject::ClusterRole(_) => Kind::ClusterRole,
            ResourceObject::ClusterRoleBinding(_) => Kind::ClusterRoleBinding,
            ResourceObject::Unstructured { kind, .. } => Kind::from(kind.as_str()),
        }
    }

    /// Object metadata, common to every kind
    pub fn metadata(&self) -> &ObjectMeta {
        match self {
            ResourceObject::Deployment(o) => o.metadata(),
            ResourceObject::DaemonSet(o) => o.metadata(),
            ResourceObject::StatefulSet(o) => o.metadata(),
            ResourceObject::ReplicaSet(o) => o.metadata(),
            ResourceObject::Job(o) => o.metadata(),
            ResourceObject::Service(o) => o.metadata(),
            ResourceObject::Ingress(o) => o.metadata(),
            ResourceObject::HorizontalPodAutoscaler(o) => o.metadata(),
            ResourceObject::PersistentVolume(o) => o.metadata(),
            ResourceObject::ConfigMap(o) => o.metadata(),
            ResourceObject::Secret(o) => o.metadata(),
            ResourceObject::ServiceAccount(o) => o.metadata(),
            ResourceObject::Namespace(o) => o.metadata(),
            ResourceObject::Role(o) => o.metadata(),
            ResourceObject::RoleBinding(o) => o.metadata(),
            ResourceObject::ClusterRole(o) => o.metadata(),
            ResourceObject::ClusterRoleBinding(o) => o.metadata(),
            ResourceObject::Unstructured { metadata, .. } => metadata,
        }
    }

    /// Build a snapshot from a JSON object, dispatching on its `kind` field.
    ///
    /// A typed variant that fails to parse (wrong `apiVersion`, missing required field) degrades
    /// to [`ResourceObject::Unstructured`] so the event can still be filtered and reported.
    pub fn from_value(value: serde_json::Value) -> Self {
        let kind = value.get("kind").and_then(|k| k.as_str()).unwrap_or_default().to_string();

        let typed = match Kind::from(kind.as_str()) {
            Kind::Deployment => parse(&value).map(ResourceObject::Deployment),
            Kind::DaemonSet => parse(&value).map(ResourceObject::DaemonSet),
            Kind::StatefulSet => parse(&value).map(ResourceObject::StatefulSet),
            Kind::ReplicaSet => parse(&value).map(ResourceObject::ReplicaSet),
            Kind::Job => parse(&value).map(ResourceObject::Job),
            Kind::Service => parse(&value).map(ResourceObject::Service),
            Kind::Ingress => parse(&value).map(ResourceObject::Ingress),
            Kind::HorizontalPodAutoscaler => parse(&value).map(ResourceObject::HorizontalPodAutoscaler),
            Kind::PersistentVolume => parse(&value).map(ResourceObject::PersistentVolume),
            Kind::ConfigMap => parse(&value).map(ResourceObject::ConfigMap),
            Kind::Secret => parse(&value).map(ResourceObject::Secret),
            Kind::ServiceAccount => parse(&value).map(ResourceObject::ServiceAccount),
            Kind::Namespace => parse(&value).map(ResourceObject::Namespace),
            Kind::Role => parse(&value).map(ResourceObject::Role),
            Kind::RoleBinding => parse(&value).map(ResourceObject::RoleBinding),
            Kind::ClusterRole => parse(&value).map(ResourceObject::ClusterRole),
            Kind::ClusterRoleBinding => parse(&value).map(ResourceObject::ClusterRoleBinding),
            Kind::Other(_) => None,
        };

        typed.unwrap_or_else(|| {
            let metadata = value
                .get("metadata")
                .cloned()
                .and_then(|m| serde_json::from_value(m).ok())
                .unwrap_or_default();
            ResourceObject::Unstructured { kind, metadata }
        })
    }
}

fn parse<T: serde::de::DeserializeOwned>(value: &serde_json::Value) -> Option<Box<T>> {
    match serde_json::from_value(value.clone()) {
        Ok(object) => Some(Box::new(object)),
        Err(e) => {
            tracing::debug!(error = %e, "Object did not match its declared kind, keeping it unstructured");
            None
        }
    }
}

impl<'de> Deserialize<'de> for ResourceObject {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let value = serde_json::Value::deserialize(deserializer)?;
        if !value.is_object() {
            return Err(serde::de::Error::custom("resource object must be a JSON object"));
        }
        Ok(ResourceObject::from_value(value))
    }
}

/// Flat view of the identity fields shared by every kind.
///
/// Zero-valued when derived from an absent object.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ResourceMetadata {
    pub name: String,
    pub namespace: String,
    pub labels: BTreeMap<String, String>,
    /// 0 when the kind does not track generations
    pub generation: i64,
    pub resource_version: String,
}

impl ResourceMetadata {
    /// Label value by key, empty when absent
    pub fn label(&self, key: &str) -> &str {
        self.labels.get(key).map(String::as_str).unwrap_or_default()
    }
}

/// Extract identity and change-tracking metadata from an optional snapshot.
pub fn get_metadata(object: Option<&ResourceObject>) -> ResourceMetadata {
    let Some(object) = object else {
        return ResourceMetadata::default();
    };

    let meta = object.metadata();
    ResourceMetadata {
        name: meta.name.clone().unwrap_or_default(),
        namespace: meta.namespace.clone().unwrap_or_default(),
        labels: meta.labels.clone().unwrap_or_default(),
        generation: meta.generation.unwrap_or_default(),
        resource_version: meta.resource_version.clone().unwrap_or_default(),
    }
}

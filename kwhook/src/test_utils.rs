//! Builders for events and resource snapshots used across the unit tests.

use std::collections::BTreeMap;

use k8s_openapi::api::apps::v1::{Deployment, DeploymentSpec};
use k8s_openapi::api::core::v1::{ConfigMap, Service, ServicePort, ServiceSpec};
use k8s_openapi::api::rbac::v1::{ClusterRole, ClusterRoleBinding, PolicyRule, RoleRef, Subject};
use k8s_openapi::apimachinery::pkg::apis::meta::v1::ObjectMeta;

use crate::event::Event;
use crate::resources::{Kind, ResourceObject};

pub fn meta(name: &str, namespace: &str, generation: i64, resource_version: &str) -> ObjectMeta {
    ObjectMeta {
        name: Some(name.to_string()),
        namespace: (!namespace.is_empty()).then(|| namespace.to_string()),
        generation: (generation != 0).then_some(generation),
        resource_version: (!resource_version.is_empty()).then(|| resource_version.to_string()),
        ..Default::default()
    }
}

pub fn deployment(name: &str, namespace: &str, generation: i64, resource_version: &str) -> ResourceObject {
    ResourceObject::Deployment(Box::new(Deployment {
        metadata: meta(name, namespace, generation, resource_version),
        spec: Some(DeploymentSpec {
            replicas: Some(generation as i32),
            ..Default::default()
        }),
        ..Default::default()
    }))
}

pub fn service(name: &str, namespace: &str, resource_version: &str) -> ResourceObject {
    ResourceObject::Service(Box::new(Service {
        metadata: meta(name, namespace, 0, resource_version),
        spec: Some(ServiceSpec {
            ports: Some(vec![ServicePort {
                port: 80,
                ..Default::default()
            }]),
            ..Default::default()
        }),
        ..Default::default()
    }))
}

pub fn config_map(name: &str, namespace: &str, resource_version: &str, data: &[(&str, &str)]) -> ResourceObject {
    ResourceObject::ConfigMap(Box::new(ConfigMap {
        metadata: meta(name, namespace, 0, resource_version),
        data: Some(data.iter().map(|(k, v)| (k.to_string(), v.to_string())).collect()),
        ..Default::default()
    }))
}

pub fn cluster_role(name: &str, resource_version: &str, verbs: &[&str]) -> ResourceObject {
    ResourceObject::ClusterRole(Box::new(ClusterRole {
        metadata: meta(name, "", 0, resource_version),
        rules: Some(vec![PolicyRule {
            api_groups: Some(vec![String::new()]),
            resources: Some(vec!["pods".to_string()]),
            verbs: verbs.iter().map(|v| v.to_string()).collect(),
            ..Default::default()
        }]),
        ..Default::default()
    }))
}

pub fn cluster_role_binding(name: &str, resource_version: &str, users: &[&str], role: &str) -> ResourceObject {
    ResourceObject::ClusterRoleBinding(Box::new(ClusterRoleBinding {
        metadata: meta(name, "", 0, resource_version),
        role_ref: RoleRef {
            api_group: "rbac.authorization.k8s.io".to_string(),
            kind: "ClusterRole".to_string(),
            name: role.to_string(),
        },
        subjects: Some(
            users
                .iter()
                .map(|user| Subject {
                    api_group: Some("rbac.authorization.k8s.io".to_string()),
                    kind: "User".to_string(),
                    name: user.to_string(),
                    namespace: None,
                })
                .collect(),
        ),
    }))
}

/// Copy of `object` with `labels` set on its metadata.
pub fn with_labels(object: ResourceObject, labels: &[(&str, &str)]) -> ResourceObject {
    let labels: BTreeMap<String, String> = labels.iter().map(|(k, v)| (k.to_string(), v.to_string())).collect();
    match object {
        ResourceObject::Deployment(mut o) => {
            o.metadata.labels = Some(labels);
            ResourceObject::Deployment(o)
        }
        ResourceObject::Service(mut o) => {
            o.metadata.labels = Some(labels);
            ResourceObject::Service(o)
        }
        ResourceObject::ConfigMap(mut o) => {
            o.metadata.labels = Some(labels);
            ResourceObject::ConfigMap(o)
        }
        other => panic!("with_labels not wired for {}", other.kind()),
    }
}

/// Event whose name and namespace are taken from the new snapshot.
pub fn event_for(kind: Kind, reason: &str, new_object: ResourceObject, old_object: Option<ResourceObject>) -> Event {
    let name = new_object.metadata().name.clone().unwrap_or_default();
    let namespace = new_object.metadata().namespace.clone().unwrap_or_default();
    Event {
        kind,
        name,
        namespace,
        reason: reason.to_string(),
        status: "Normal".to_string(),
        message: None,
        new_object: Some(new_object),
        old_object,
    }
}

use serde_json::{Value, json};
use wiremock::matchers::{header, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

use crate::config::{Config, WebhookConfig};
use crate::create_handler;
use crate::intake;

async fn mock_endpoint(status: u16) -> MockServer {
    let mock_server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/notify"))
        .and(header("Content-Type", "application/json"))
        .respond_with(ResponseTemplate::new(status))
        .mount(&mock_server)
        .await;
    mock_server
}

fn config_for(mock_server: &MockServer) -> Config {
    Config {
        webhook: WebhookConfig {
            url: Some(format!("{}/notify", mock_server.uri())),
            ..Default::default()
        },
        ..Default::default()
    }
}

async fn received_bodies(mock_server: &MockServer) -> Vec<Value> {
    mock_server
        .received_requests()
        .await
        .unwrap()
        .iter()
        .map(|r| serde_json::from_slice(&r.body).unwrap())
        .collect()
}

fn lines(events: &[Value]) -> String {
    events.iter().map(|e| format!("{e}\n")).collect()
}

fn deployment(generation: i64, resource_version: &str, replicas: i32) -> Value {
    json!({
        "apiVersion": "apps/v1",
        "kind": "Deployment",
        "metadata": {
            "name": "web",
            "namespace": "default",
            "generation": generation,
            "resourceVersion": resource_version,
            "labels": {"service": "web", "environment": "staging"}
        },
        "spec": {
            "replicas": replicas,
            "selector": {"matchLabels": {"app": "web"}},
            "template": {"metadata": {"labels": {"app": "web"}}}
        }
    })
}

/// A generation bump on a Deployment is delivered with both snapshots and derived metadata
#[test_log::test(tokio::test)]
async fn test_deployment_update_end_to_end() {
    let mock_server = mock_endpoint(200).await;
    let handler = create_handler(&config_for(&mock_server)).unwrap();

    let input = lines(&[json!({
        "kind": "Deployment",
        "name": "web",
        "namespace": "default",
        "reason": "Updated",
        "status": "Normal",
        "object": deployment(2, "20", 3),
        "oldObject": deployment(1, "10", 1)
    })]);

    let stats = intake::run(input.as_bytes(), handler.as_ref(), std::future::pending()).await.unwrap();
    assert_eq!(stats.handled, 1);

    let bodies = received_bodies(&mock_server).await;
    assert_eq!(bodies.len(), 1);
    let body = &bodies[0];

    assert_eq!(body["type"], "deployment");
    assert_eq!(body["name"], "web");
    assert_eq!(body["action"], "updated");
    assert_eq!(body["actionBy"], "deployment-controller");
    assert_eq!(body["riskLevel"], "medium");
    assert_eq!(body["serviceName"], "web");
    assert_eq!(body["env"], "staging");
    assert_eq!(body["pod"], "");
    assert_eq!(body["metadata"], json!({}));
    assert_eq!(body["summary"], "A `deployment` in namespace `default` has been `updated`:\n`web`");
    assert_eq!(body["data"]["currentConfigName"], "web");
    assert_eq!(body["data"]["currentConfigNamespace"], "default");
    assert_eq!(body["data"]["currentConfigSpec"]["replicas"], 3);
    assert_eq!(body["data"]["oldConfigSpec"]["replicas"], 1);
    assert!(body["createdAt"].is_string());
}

/// Only significant events reach the endpoint; the stream keeps going past bad lines
#[test_log::test(tokio::test)]
async fn test_mixed_stream_only_delivers_significant_events() {
    let mock_server = mock_endpoint(200).await;
    let handler = create_handler(&config_for(&mock_server)).unwrap();

    let kube_system_cm = |rv: &str| json!({"kind": "ConfigMap", "metadata": {"name": "coredns", "namespace": "kube-system", "resourceVersion": rv}, "data": {"Corefile": "."}});

    let input = lines(&[
        // Suppressed namespace/kind pair
        json!({"kind": "ConfigMap", "name": "coredns", "namespace": "kube-system", "reason": "Updated",
               "object": kube_system_cm("6"), "oldObject": kube_system_cm("5")}),
        // Status-only update: same generation
        json!({"kind": "Deployment", "name": "web", "namespace": "default", "reason": "Updated",
               "object": deployment(4, "41", 2), "oldObject": deployment(4, "40", 2)}),
        // Cluster-scoped creation
        json!({"kind": "ClusterRoleBinding", "name": "admins", "reason": "Created",
               "object": {
                   "kind": "ClusterRoleBinding",
                   "metadata": {"name": "admins", "resourceVersion": "1"},
                   "subjects": [{"kind": "User", "name": "alice", "apiGroup": "rbac.authorization.k8s.io"}],
                   "roleRef": {"kind": "ClusterRole", "name": "cluster-admin", "apiGroup": "rbac.authorization.k8s.io"}
               }}),
    ]) + "{ not json\n";

    let stats = intake::run(input.as_bytes(), handler.as_ref(), std::future::pending()).await.unwrap();
    assert_eq!(stats.handled, 3);
    assert_eq!(stats.malformed, 1);

    let bodies = received_bodies(&mock_server).await;
    assert_eq!(bodies.len(), 1);
    assert_eq!(bodies[0]["type"], "clusterrolebinding");
    assert_eq!(bodies[0]["summary"], "A `clusterrolebinding` `admins` has been `created`");
    assert_eq!(
        bodies[0]["data"]["currentConfigSpec"],
        "Subjects: [User/alice], RoleRef: ClusterRole/cluster-admin"
    );
    assert_eq!(bodies[0]["data"]["oldConfigName"], "");
}

/// Unknown kinds still notify, without object details
#[test_log::test(tokio::test)]
async fn test_unhandled_kind_is_sent_without_details() {
    let mock_server = mock_endpoint(200).await;
    let handler = create_handler(&config_for(&mock_server)).unwrap();

    let input = lines(&[json!({
        "kind": "CronJob",
        "name": "nightly",
        "namespace": "batch",
        "reason": "Created",
        "object": {"kind": "CronJob", "metadata": {"name": "nightly", "namespace": "batch"}, "spec": {"schedule": "@daily"}}
    })]);

    intake::run(input.as_bytes(), handler.as_ref(), std::future::pending()).await.unwrap();

    let bodies = received_bodies(&mock_server).await;
    assert_eq!(bodies.len(), 1);
    assert_eq!(bodies[0]["type"], "cronjob");
    assert_eq!(bodies[0]["actionBy"], "kubernetes-controller");
    assert_eq!(bodies[0]["riskLevel"], "medium");
    assert_eq!(bodies[0]["data"]["currentConfigName"], "");
    assert_eq!(bodies[0]["data"]["currentConfigSpec"], Value::Null);
}

/// A failing endpoint does not stop later events from being processed
#[test_log::test(tokio::test)]
async fn test_endpoint_errors_do_not_stop_the_stream() {
    let mock_server = mock_endpoint(500).await;
    let handler = create_handler(&config_for(&mock_server)).unwrap();

    let service = |name: &str| {
        json!({"kind": "Service", "name": name, "namespace": "default", "reason": "Created",
               "object": {"kind": "Service", "metadata": {"name": name, "namespace": "default"}, "spec": {"ports": [{"port": 80}]}}})
    };
    let input = lines(&[service("a"), service("b")]);

    let stats = intake::run(input.as_bytes(), handler.as_ref(), std::future::pending()).await.unwrap();

    assert_eq!(stats.handled, 2);
    assert_eq!(received_bodies(&mock_server).await.len(), 2);
}

//! Traversal tests
//!
//! Builds graphs against in-memory clusters and checks the properties every
//! traversal must hold, plus the behaviors of individual relationship rules.

use kubedag::graph::status::ResourceStatus;
use kubedag::graph::{
    Graph, GraphBuilder, GraphError, GraphOptions, NodeColor, VisitedSet, build_graph,
};
use kubedag::kube::{ClusterError, ClusterSnapshot};
use kubedag::models::{DedupKeyStrategy, ResourceIdentity, ResourceKind};
use serde_json::{Value, json};
use std::collections::HashSet;

fn owner(kind: &str, name: &str) -> Value {
    let api_version = if kind == "Deployment" || kind == "ReplicaSet" {
        "apps/v1"
    } else {
        "v1"
    };
    json!({
        "apiVersion": api_version,
        "kind": kind,
        "name": name,
        "uid": format!("uid-{}", name),
        "controller": true
    })
}

fn deployment(namespace: &str, name: &str, service_account: Option<&str>) -> Value {
    let mut pod_spec = json!({ "containers": [ { "name": "app", "image": "nginx:1.27" } ] });
    if let Some(account) = service_account {
        pod_spec["serviceAccountName"] = json!(account);
    }
    json!({
        "apiVersion": "apps/v1",
        "kind": "Deployment",
        "metadata": { "name": name, "namespace": namespace, "labels": { "app": name } },
        "spec": {
            "selector": { "matchLabels": { "app": name } },
            "strategy": { "type": "RollingUpdate" },
            "template": {
                "metadata": { "labels": { "app": name } },
                "spec": pod_spec
            }
        },
        "status": {
            "conditions": [
                {
                    "type": "Available",
                    "status": "True",
                    "lastTransitionTime": "2024-05-01T10:00:00Z"
                }
            ]
        }
    })
}

fn replica_set(namespace: &str, name: &str, deployment: &str, replicas: i32) -> Value {
    json!({
        "apiVersion": "apps/v1",
        "kind": "ReplicaSet",
        "metadata": {
            "name": name,
            "namespace": namespace,
            "labels": { "app": deployment },
            "ownerReferences": [ owner("Deployment", deployment) ]
        },
        "spec": {
            "replicas": replicas,
            "selector": { "matchLabels": { "app": deployment } }
        },
        "status": { "replicas": replicas }
    })
}

fn pod(namespace: &str, name: &str, app: &str, spec: Value) -> Value {
    json!({
        "apiVersion": "v1",
        "kind": "Pod",
        "metadata": { "name": name, "namespace": namespace, "labels": { "app": app } },
        "spec": spec
    })
}

fn owned_pod(namespace: &str, name: &str, app: &str, replica_set: &str, spec: Value) -> Value {
    let mut pod = pod(namespace, name, app, spec);
    pod["metadata"]["ownerReferences"] = json!([owner("ReplicaSet", replica_set)]);
    pod
}

fn service(namespace: &str, name: &str, selector: Value) -> Value {
    json!({
        "apiVersion": "v1",
        "kind": "Service",
        "metadata": { "name": name, "namespace": namespace },
        "spec": {
            "selector": selector,
            "sessionAffinity": "None",
            "ports": [ { "port": 80 } ]
        }
    })
}

fn simple(api_version: &str, kind: &str, namespace: &str, name: &str) -> Value {
    json!({
        "apiVersion": api_version,
        "kind": kind,
        "metadata": { "name": name, "namespace": namespace }
    })
}

fn containers() -> Value {
    json!([ { "name": "app", "image": "nginx:1.27" } ])
}

/// A web workload exercising every relationship rule
fn web_shop() -> ClusterSnapshot {
    let pod_spec = json!({
        "serviceAccountName": "web",
        "volumes": [
            { "name": "data", "persistentVolumeClaim": { "claimName": "web-data" } },
            { "name": "conf", "configMap": { "name": "web-conf" } }
        ],
        "containers": [
            {
                "name": "app",
                "image": "nginx:1.27",
                "env": [
                    {
                        "name": "API_KEY",
                        "valueFrom": { "secretKeyRef": { "name": "web-secret", "key": "key" } }
                    }
                ]
            }
        ]
    });

    let mut account = simple("v1", "ServiceAccount", "prod", "web");
    account["imagePullSecrets"] = json!([{ "name": "registry" }]);

    let mut ingress = simple("networking.k8s.io/v1", "Ingress", "prod", "web");
    ingress["spec"] = json!({
        "tls": [ { "hosts": ["shop.example.com"], "secretName": "web-tls" } ],
        "rules": [
            {
                "host": "shop.example.com",
                "http": {
                    "paths": [
                        {
                            "path": "/",
                            "pathType": "Prefix",
                            "backend": { "service": { "name": "web", "port": { "number": 80 } } }
                        }
                    ]
                }
            }
        ]
    });

    let mut autoscaler = simple("autoscaling/v2", "HorizontalPodAutoscaler", "prod", "web");
    autoscaler["spec"] = json!({
        "scaleTargetRef": { "apiVersion": "apps/v1", "kind": "Deployment", "name": "web" },
        "minReplicas": 2,
        "maxReplicas": 10
    });

    let mut budget = simple("policy/v1", "PodDisruptionBudget", "prod", "web");
    budget["spec"] = json!({ "minAvailable": 1, "selector": { "matchLabels": { "app": "web" } } });

    let mut policy = simple("networking.k8s.io/v1", "NetworkPolicy", "prod", "deny-all");
    policy["spec"] = json!({ "podSelector": {}, "policyTypes": ["Ingress"] });

    ClusterSnapshot::from_objects(vec![
        deployment("prod", "web", Some("web")),
        replica_set("prod", "web-7d9", "web", 2),
        owned_pod("prod", "web-7d9-a", "web", "web-7d9", pod_spec.clone()),
        owned_pod("prod", "web-7d9-b", "web", "web-7d9", pod_spec),
        service("prod", "web", json!({ "app": "web" })),
        ingress,
        account,
        simple("v1", "Secret", "prod", "registry"),
        simple("v1", "Secret", "prod", "web-tls"),
        simple("v1", "ConfigMap", "prod", "web-conf"),
        simple("v1", "PersistentVolumeClaim", "prod", "web-data"),
        autoscaler,
        budget,
        policy,
    ])
    .unwrap()
}

fn root(kind: ResourceKind, namespace: &str, name: &str) -> ResourceIdentity {
    ResourceIdentity::new(kind, namespace, name)
}

fn node_ids(graph: &Graph) -> Vec<&str> {
    graph.nodes.iter().map(|node| node.id.as_str()).collect()
}

fn has_edge(graph: &Graph, source: &str, target: &str) -> bool {
    graph
        .edges
        .iter()
        .any(|edge| edge.source == source && edge.target == target)
}

fn complete() -> GraphOptions {
    GraphOptions {
        skip_visited_kinds: false,
        ..GraphOptions::default()
    }
}

#[tokio::test]
async fn test_nodes_are_unique() {
    let cluster = web_shop();
    for options in [GraphOptions::default(), complete()] {
        let graph = GraphBuilder::new(&cluster)
            .with_options(options)
            .build(root(ResourceKind::Deployment, "prod", "web"))
            .await
            .unwrap();

        let ids = node_ids(&graph);
        let unique: HashSet<_> = ids.iter().collect();
        assert_eq!(ids.len(), unique.len(), "duplicate nodes in {:?}", ids);
    }
}

#[tokio::test]
async fn test_depth_first_order() {
    let cluster = web_shop();
    let graph = build_graph(&cluster, root(ResourceKind::Deployment, "prod", "web"))
        .await
        .unwrap();

    assert_eq!(
        node_ids(&graph),
        vec![
            "web-Deployment",
            "web-7d9-ReplicaSet",
            "web-7d9-a-Pod",
            "web-data-PersistentVolumeClaim",
            "web-conf-ConfigMap",
            "web-secret-Secret",
            "web-ServiceAccount",
            "registry-Secret",
            "web-Service",
            "web-Ingress",
            "web-7d9-b-Pod",
            "web-HorizontalPodAutoscaler",
        ]
    );

    let from_deployment: Vec<_> = graph
        .edges
        .iter()
        .filter(|edge| edge.source == "web-Deployment")
        .map(|edge| edge.target.as_str())
        .collect();
    assert_eq!(
        from_deployment,
        vec![
            "web-7d9-ReplicaSet",
            "web-ServiceAccount",
            "web-Service",
            "web-HorizontalPodAutoscaler",
        ]
    );
}

#[tokio::test]
async fn test_rebuild_is_identical() {
    let cluster = web_shop();
    let first = build_graph(&cluster, root(ResourceKind::Deployment, "prod", "web"))
        .await
        .unwrap();
    let second = build_graph(&cluster, root(ResourceKind::Deployment, "prod", "web"))
        .await
        .unwrap();

    assert_eq!(first.to_json().unwrap(), second.to_json().unwrap());
}

#[tokio::test]
async fn test_color_matches_health() {
    let cluster = web_shop();
    let graph = build_graph(&cluster, root(ResourceKind::Deployment, "prod", "web"))
        .await
        .unwrap();

    for node in &graph.nodes {
        let expected = if node.status.is_ok() {
            NodeColor::Healthy
        } else {
            NodeColor::Unhealthy
        };
        assert_eq!(node.color, expected, "{}", node.id);
    }
    assert!(graph.nodes.iter().any(|node| node.color == NodeColor::Unhealthy));
}

#[tokio::test]
async fn test_kinds_without_rules_leave_dangling_edges() {
    let cluster = web_shop();
    let graph = build_graph(&cluster, root(ResourceKind::Deployment, "prod", "web"))
        .await
        .unwrap();

    let dangling: HashSet<_> = graph
        .dangling_edges()
        .map(|edge| edge.target.as_str())
        .collect();
    assert_eq!(
        dangling,
        HashSet::from(["web-PodDisruptionBudget", "deny-all-NetworkPolicy"])
    );
    assert!(has_edge(&graph, "web-7d9-b-Pod", "web-PodDisruptionBudget"));
}

#[tokio::test]
async fn test_autoscaler_targeting_deployment() {
    let cluster = web_shop();
    let graph = build_graph(&cluster, root(ResourceKind::Deployment, "prod", "web"))
        .await
        .unwrap();

    assert!(has_edge(&graph, "web-Deployment", "web-HorizontalPodAutoscaler"));
    assert!(!has_edge(&graph, "web-7d9-ReplicaSet", "web-HorizontalPodAutoscaler"));

    let node = graph.node("web-HorizontalPodAutoscaler").unwrap();
    match &node.status {
        ResourceStatus::HorizontalPodAutoscaler(status) => {
            assert_eq!(status.scale_target, "Deployment/web");
            assert!(status.base.ok);
        }
        other => panic!("unexpected status {:?}", other),
    }
}

#[tokio::test]
async fn test_skipping_visited_kinds_drops_relations() {
    let cluster = web_shop();
    let identity = root(ResourceKind::Deployment, "prod", "web");

    let fast = build_graph(&cluster, identity.clone()).await.unwrap();
    let full = GraphBuilder::new(&cluster)
        .with_options(complete())
        .build(identity)
        .await
        .unwrap();

    // The Ingress TLS secret is only found when secrets seen elsewhere don't stop discovery
    assert!(!fast.contains_node("web-tls-Secret"));
    assert!(full.contains_node("web-tls-Secret"));

    assert!(!has_edge(&fast, "web-Service", "web-7d9-a-Pod"));
    assert!(has_edge(&full, "web-Service", "web-7d9-a-Pod"));
    assert!(has_edge(&full, "web-Service", "web-Deployment"));
    assert!(has_edge(&full, "web-7d9-ReplicaSet", "web-Deployment"));

    let fast_nodes: HashSet<_> = node_ids(&fast).into_iter().collect();
    let full_nodes: HashSet<_> = node_ids(&full).into_iter().collect();
    assert!(fast_nodes.is_subset(&full_nodes));
}

#[tokio::test]
async fn test_zero_replica_sets_are_left_out() {
    let cluster = ClusterSnapshot::from_objects(vec![
        deployment("prod", "web", None),
        replica_set("prod", "web-old", "web", 0),
        replica_set("prod", "web-live", "web", 3),
        owned_pod(
            "prod",
            "web-live-x1",
            "web",
            "web-live",
            json!({ "containers": containers() }),
        ),
    ])
    .unwrap();

    let graph = build_graph(&cluster, root(ResourceKind::Deployment, "prod", "web"))
        .await
        .unwrap();

    let replica_sets: Vec<_> = graph
        .nodes
        .iter()
        .filter(|node| node.description == "ReplicaSet")
        .map(|node| node.id.as_str())
        .collect();
    assert_eq!(replica_sets, vec!["web-live-ReplicaSet"]);
    assert!(graph.edges.iter().all(|edge| edge.target != "web-old-ReplicaSet"));
    assert!(graph.contains_node("web-live-x1-Pod"));

    match &graph.node("web-live-ReplicaSet").unwrap().status {
        ResourceStatus::ReplicaSet(status) => {
            assert_eq!(status.current_replicas, "3");
            assert_eq!(status.desired_replicas, "3");
        }
        other => panic!("unexpected status {:?}", other),
    }
}

#[tokio::test]
async fn test_ready_pod_gets_default_message() {
    let mut db = pod("prod", "db-0", "db", json!({ "containers": containers() }));
    db["status"] = json!({
        "conditions": [ { "type": "Ready", "status": "True", "message": "" } ]
    });
    let cluster = ClusterSnapshot::from_objects(vec![db]).unwrap();

    let graph = build_graph(&cluster, root(ResourceKind::Pod, "prod", "db-0"))
        .await
        .unwrap();

    assert_eq!(graph.nodes.len(), 1);
    let node = graph.node("db-0-Pod").unwrap();
    assert_eq!(node.status.message(), "Pod is OK");
    assert_eq!(node.color, NodeColor::Healthy);
}

#[tokio::test]
async fn test_missing_secret_does_not_abort() {
    let spec = json!({
        "containers": [
            {
                "name": "app",
                "image": "nginx:1.27",
                "envFrom": [ { "secretRef": { "name": "db-creds" } } ]
            }
        ]
    });
    let cluster = ClusterSnapshot::from_objects(vec![pod("prod", "web-1", "web", spec)]).unwrap();

    let graph = build_graph(&cluster, root(ResourceKind::Pod, "prod", "web-1"))
        .await
        .unwrap();

    let secret = graph.node("db-creds-Secret").unwrap();
    assert!(!secret.status.is_ok());
    assert_eq!(secret.status.message(), "secrets \"db-creds\" not found");
    assert_eq!(secret.color, NodeColor::Unhealthy);
    assert!(has_edge(&graph, "web-1-Pod", "db-creds-Secret"));
}

#[tokio::test]
async fn test_service_with_only_a_matching_deployment() {
    let cluster = ClusterSnapshot::from_objects(vec![
        service("prod", "web", json!({ "app": "web" })),
        deployment("prod", "web", None),
        deployment("prod", "worker", None),
    ])
    .unwrap();

    let graph = build_graph(&cluster, root(ResourceKind::Service, "prod", "web"))
        .await
        .unwrap();

    let from_service: Vec<_> = graph
        .edges
        .iter()
        .filter(|edge| edge.source == "web-Service")
        .map(|edge| edge.target.as_str())
        .collect();
    assert_eq!(from_service, vec!["web-Deployment"]);
    assert!(
        graph
            .nodes
            .iter()
            .all(|node| node.description != "Ingress" && node.description != "Pod")
    );
    assert!(!graph.contains_node("worker-Deployment"));
}

#[tokio::test]
async fn test_service_without_selector_selects_nothing() {
    let cluster = ClusterSnapshot::from_objects(vec![
        service("prod", "external", json!({})),
        deployment("prod", "web", None),
        pod("prod", "web-1", "web", json!({ "containers": containers() })),
    ])
    .unwrap();

    let graph = build_graph(&cluster, root(ResourceKind::Service, "prod", "external"))
        .await
        .unwrap();

    assert_eq!(node_ids(&graph), vec!["external-Service"]);
    assert!(graph.edges.is_empty());
}

#[tokio::test]
async fn test_cyclic_relations_terminate() {
    let cluster = ClusterSnapshot::from_objects(vec![
        service("prod", "web", json!({ "app": "web" })),
        pod("prod", "web-1", "web", json!({ "containers": containers() })),
    ])
    .unwrap();

    let graph = build_graph(&cluster, root(ResourceKind::Service, "prod", "web"))
        .await
        .unwrap();

    assert_eq!(node_ids(&graph), vec!["web-Service", "web-1-Pod"]);
    assert!(has_edge(&graph, "web-Service", "web-1-Pod"));
    assert!(has_edge(&graph, "web-1-Pod", "web-Service"));
    assert_eq!(graph.edges.len(), 2);
}

#[test]
fn test_same_name_across_namespaces_shares_a_key() {
    let prod = root(ResourceKind::ReplicaSet, "prod", "rs-a");
    let staging = root(ResourceKind::ReplicaSet, "staging", "rs-a");

    let mut by_name = VisitedSet::new(DedupKeyStrategy::KindName);
    assert!(by_name.insert(&prod));
    assert!(!by_name.insert(&staging));
    assert_eq!(
        DedupKeyStrategy::KindName.node_id(&prod),
        DedupKeyStrategy::KindName.node_id(&staging)
    );

    let mut by_namespace = VisitedSet::new(DedupKeyStrategy::KindNamespaceName);
    assert!(by_namespace.insert(&prod));
    assert!(by_namespace.insert(&staging));
}

#[tokio::test]
async fn test_namespace_collision_under_each_strategy() {
    let mut account = simple("v1", "ServiceAccount", "prod", "builder");
    account["secrets"] = json!([
        { "name": "token" },
        { "name": "token", "namespace": "infra" }
    ]);
    let cluster = ClusterSnapshot::from_objects(vec![
        account,
        simple("v1", "Secret", "prod", "token"),
        simple("v1", "Secret", "infra", "token"),
    ])
    .unwrap();
    let identity = root(ResourceKind::ServiceAccount, "prod", "builder");

    let merged = build_graph(&cluster, identity.clone()).await.unwrap();
    assert_eq!(node_ids(&merged), vec!["builder-ServiceAccount", "token-Secret"]);
    assert_eq!(merged.edges.len(), 2);

    let separate = GraphBuilder::new(&cluster)
        .with_options(GraphOptions {
            dedup_key: DedupKeyStrategy::KindNamespaceName,
            ..GraphOptions::default()
        })
        .build(identity)
        .await
        .unwrap();
    assert_eq!(
        node_ids(&separate),
        vec![
            "prod/builder-ServiceAccount",
            "prod/token-Secret",
            "infra/token-Secret",
        ]
    );
    assert_eq!(separate.dangling_edges().count(), 0);
}

#[tokio::test]
async fn test_missing_root_aborts() {
    let cluster = ClusterSnapshot::new();
    let err = build_graph(&cluster, root(ResourceKind::Deployment, "prod", "web"))
        .await
        .unwrap_err();

    assert_eq!(err.to_string(), "unable to get related resources for Deployment");
    match err {
        GraphError::Resolve { kind, source } => {
            assert_eq!(kind, ResourceKind::Deployment);
            assert!(matches!(source, ClusterError::NotFound { .. }));
        }
        other => panic!("unexpected error {:?}", other),
    }
}

#[tokio::test]
async fn test_missing_claim_aborts_whole_graph() {
    let spec = json!({
        "volumes": [ { "name": "data", "persistentVolumeClaim": { "claimName": "gone" } } ],
        "containers": containers()
    });
    let cluster = ClusterSnapshot::from_objects(vec![pod("prod", "web-1", "web", spec)]).unwrap();

    let err = build_graph(&cluster, root(ResourceKind::Pod, "prod", "web-1"))
        .await
        .unwrap_err();

    assert!(matches!(
        err,
        GraphError::Resolve {
            kind: ResourceKind::PersistentVolumeClaim,
            ..
        }
    ));
}

#[tokio::test]
async fn test_unsupported_root_yields_empty_graph() {
    let cluster = ClusterSnapshot::new();
    let graph = build_graph(&cluster, root(ResourceKind::NetworkPolicy, "prod", "deny-all"))
        .await
        .unwrap();

    assert!(graph.nodes.is_empty());
    assert!(graph.edges.is_empty());
}

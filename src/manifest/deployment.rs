//! Deployment manifest construction.

use std::collections::BTreeMap;

use k8s_openapi::api::apps::v1::{Deployment, DeploymentSpec};
use k8s_openapi::api::core::v1::{
    Container, ContainerPort, PodSpec, PodTemplateSpec, ResourceRequirements,
};
use k8s_openapi::apimachinery::pkg::api::resource::Quantity;
use k8s_openapi::apimachinery::pkg::apis::meta::v1::{LabelSelector, ObjectMeta};

use crate::crd::SimpleWebSpec;

use super::{child_metadata, selector_labels, DEFAULT_REPLICAS, HTTP_PORT_NAME};

/// Fixed resource requests applied to every workload container.
const MEMORY_REQUEST: &str = "64Mi";
const CPU_REQUEST: &str = "50m";

/// Fixed resource limits applied to every workload container.
const MEMORY_LIMIT: &str = "128Mi";
const CPU_LIMIT: &str = "100m";

/// Builds the desired Deployment for a `SimpleWeb`.
///
/// Pure and idempotent: identical inputs always produce identical documents.
/// Spec fields are passed through without validation; `replicas` defaults to
/// [`DEFAULT_REPLICAS`] when unset. An absent image or port yields a
/// deployment the scheduler will reject downstream, which is accepted.
#[must_use]
pub fn build_deployment(name: &str, namespace: &str, spec: &SimpleWebSpec) -> Deployment {
    Deployment {
        metadata: child_metadata(name, namespace, spec),
        spec: Some(DeploymentSpec {
            replicas: Some(spec.replicas.unwrap_or(DEFAULT_REPLICAS)),
            selector: LabelSelector {
                match_labels: Some(selector_labels(name)),
                ..LabelSelector::default()
            },
            template: PodTemplateSpec {
                metadata: Some(ObjectMeta {
                    labels: Some(selector_labels(name)),
                    ..ObjectMeta::default()
                }),
                spec: Some(PodSpec {
                    containers: vec![workload_container(name, spec)],
                    ..PodSpec::default()
                }),
            },
            ..DeploymentSpec::default()
        }),
        ..Deployment::default()
    }
}

/// The single workload container, with the fixed resource quartet.
fn workload_container(name: &str, spec: &SimpleWebSpec) -> Container {
    Container {
        name: String::from(name),
        image: spec.image.clone(),
        // The typed schema requires a number; an absent port surfaces as 0
        // and is rejected downstream.
        ports: Some(vec![ContainerPort {
            container_port: spec.port.unwrap_or_default(),
            name: Some(String::from(HTTP_PORT_NAME)),
            ..ContainerPort::default()
        }]),
        resources: Some(workload_resources()),
        ..Container::default()
    }
}

fn workload_resources() -> ResourceRequirements {
    ResourceRequirements {
        requests: Some(BTreeMap::from([
            (String::from("memory"), Quantity(String::from(MEMORY_REQUEST))),
            (String::from("cpu"), Quantity(String::from(CPU_REQUEST))),
        ])),
        limits: Some(BTreeMap::from([
            (String::from("memory"), Quantity(String::from(MEMORY_LIMIT))),
            (String::from("cpu"), Quantity(String::from(CPU_LIMIT))),
        ])),
        ..ResourceRequirements::default()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn sample_spec() -> SimpleWebSpec {
        SimpleWebSpec {
            image: Some(String::from("nginx:1.25")),
            port: Some(8080),
            replicas: Some(3),
        }
    }

    #[test]
    fn replicas_default_to_one_when_absent() {
        let spec = SimpleWebSpec {
            image: Some(String::from("nginx:1.25")),
            port: Some(8080),
            replicas: None,
        };
        let deployment = build_deployment("web1", "ns", &spec);
        assert_eq!(deployment.spec.unwrap().replicas, Some(1));
    }

    #[test]
    fn container_entry_matches_expected_document() {
        let deployment = build_deployment("web1", "ns", &sample_spec());
        let dep_spec = deployment.spec.unwrap();
        assert_eq!(dep_spec.replicas, Some(3));

        let container = &dep_spec.template.spec.unwrap().containers[0];
        let rendered = serde_json::to_value(container).unwrap();
        assert_eq!(
            rendered,
            json!({
                "name": "web1",
                "image": "nginx:1.25",
                "ports": [{"containerPort": 8080, "name": "http"}],
                "resources": {
                    "requests": {"memory": "64Mi", "cpu": "50m"},
                    "limits": {"memory": "128Mi", "cpu": "100m"}
                }
            })
        );
    }

    #[test]
    fn selector_and_template_labels_agree() {
        let deployment = build_deployment("web1", "ns", &sample_spec());
        let dep_spec = deployment.spec.unwrap();
        let selector = dep_spec.selector.match_labels.unwrap();
        let template_labels = dep_spec.template.metadata.unwrap().labels.unwrap();
        assert_eq!(selector, template_labels);
        assert_eq!(selector.get("app").map(String::as_str), Some("web1"));
    }

    #[test]
    fn construction_is_idempotent() {
        let spec = sample_spec();
        let first = build_deployment("web1", "ns", &spec);
        let second = build_deployment("web1", "ns", &spec);
        assert_eq!(
            serde_json::to_value(&first).unwrap(),
            serde_json::to_value(&second).unwrap()
        );
    }

    #[test]
    fn absent_image_is_passed_through() {
        let spec = SimpleWebSpec {
            image: None,
            port: Some(8080),
            replicas: None,
        };
        let deployment = build_deployment("web1", "ns", &spec);
        let container = &deployment.spec.unwrap().template.spec.unwrap().containers[0];
        assert_eq!(container.image, None);
    }
}

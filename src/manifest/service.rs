//! Service manifest construction.

use k8s_openapi::api::core::v1::{Service, ServicePort, ServiceSpec};
use k8s_openapi::apimachinery::pkg::util::intstr::IntOrString;

use crate::crd::SimpleWebSpec;

use super::{child_metadata, selector_labels, HTTP_PORT_NAME};

/// Builds the desired ClusterIP Service for a `SimpleWeb`.
///
/// Same contract as [`build_deployment`](super::build_deployment): pure,
/// idempotent, no validation. The single exposed port forwards to the same
/// port on the pods (`port == targetPort`).
#[must_use]
pub fn build_service(name: &str, namespace: &str, spec: &SimpleWebSpec) -> Service {
    let port = spec.port.unwrap_or_default();
    Service {
        metadata: child_metadata(name, namespace, spec),
        spec: Some(ServiceSpec {
            type_: Some(String::from("ClusterIP")),
            selector: Some(selector_labels(name)),
            ports: Some(vec![ServicePort {
                port,
                target_port: Some(IntOrString::Int(port)),
                protocol: Some(String::from("TCP")),
                name: Some(String::from(HTTP_PORT_NAME)),
                ..ServicePort::default()
            }]),
            ..ServiceSpec::default()
        }),
        ..Service::default()
    }
}

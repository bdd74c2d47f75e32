//! Desired-state manifests for SimpleWeb child resources.
//!
//! Pure construction only: given a parent name, namespace, and spec, these
//! functions produce the full child documents. No I/O, no validation, no
//! error paths. Owner linkage is attached by the reconciler, not here.

mod deployment;
mod hash;
mod service;

pub use deployment::build_deployment;
pub use hash::SpecHasher;
pub use service::build_service;

use std::collections::BTreeMap;

use k8s_openapi::apimachinery::pkg::apis::meta::v1::ObjectMeta;

use crate::crd::SimpleWebSpec;

/// Label identifying the workload a child belongs to.
pub const APP_LABEL: &str = "app";

/// Label marking a child as managed by this operator.
pub const MANAGED_BY_LABEL: &str = "managed-by";

/// Value of the `managed-by` label.
pub const MANAGED_BY: &str = "simpleweb-operator";

/// Name given to the single exposed port on both children.
pub const HTTP_PORT_NAME: &str = "http";

/// Annotation carrying the hash of the spec a child was built from.
pub const SPEC_HASH_ANNOTATION: &str = "simplewebs.ops.example.com/spec-hash";

/// Replica count applied when the spec leaves it unset.
pub const DEFAULT_REPLICAS: i32 = 1;

/// The kinds of child resource derived from a `SimpleWeb`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ChildKind {
    /// The scalable container-group child.
    Deployment,
    /// The stable network endpoint child.
    Service,
}

impl std::fmt::Display for ChildKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            Self::Deployment => "Deployment",
            Self::Service => "Service",
        };
        write!(f, "{s}")
    }
}

/// Labels stamped on both children.
#[must_use]
pub fn child_labels(name: &str) -> BTreeMap<String, String> {
    BTreeMap::from([
        (String::from(APP_LABEL), String::from(name)),
        (String::from(MANAGED_BY_LABEL), String::from(MANAGED_BY)),
    ])
}

/// Selector labels matching the workload pods.
#[must_use]
pub fn selector_labels(name: &str) -> BTreeMap<String, String> {
    BTreeMap::from([(String::from(APP_LABEL), String::from(name))])
}

/// Shared metadata for both children: identity, labels, and the spec-hash
/// annotation. Owner references are left empty here.
#[must_use]
pub fn child_metadata(name: &str, namespace: &str, spec: &SimpleWebSpec) -> ObjectMeta {
    let hash = SpecHasher::new().hash_spec(name, spec);
    ObjectMeta {
        name: Some(String::from(name)),
        namespace: Some(String::from(namespace)),
        labels: Some(child_labels(name)),
        annotations: Some(BTreeMap::from([(
            String::from(SPEC_HASH_ANNOTATION),
            hash,
        )])),
        ..ObjectMeta::default()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn child_labels_carry_app_and_managed_by() {
        let labels = child_labels("web1");
        assert_eq!(labels.get(APP_LABEL).map(String::as_str), Some("web1"));
        assert_eq!(
            labels.get(MANAGED_BY_LABEL).map(String::as_str),
            Some(MANAGED_BY)
        );
    }

    #[test]
    fn selector_only_matches_on_app() {
        let selector = selector_labels("web1");
        assert_eq!(selector.len(), 1);
        assert_eq!(selector.get(APP_LABEL).map(String::as_str), Some("web1"));
    }

    #[test]
    fn metadata_is_stamped_with_spec_hash() {
        let spec = SimpleWebSpec {
            image: Some(String::from("nginx:1.25")),
            port: Some(8080),
            replicas: None,
        };
        let meta = child_metadata("web1", "ns", &spec);
        let annotations = meta.annotations.unwrap();
        let hash = annotations.get(SPEC_HASH_ANNOTATION).unwrap();
        assert_eq!(hash, &SpecHasher::new().hash_spec("web1", &spec));
    }
}

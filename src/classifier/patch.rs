//! Deployment patch derivation from a change-set.

use serde_json::{json, Value};

use crate::manifest::HTTP_PORT_NAME;

use super::change::ChangeSet;

/// A merge-patch document targeting the Deployment only.
///
/// The patch is non-strategic: the container list is replaced wholesale, so
/// the single container entry carries only the fields being changed and any
/// field not present in the entry is implicitly reset by the patch
/// semantics. The Service is never patched; a port change leaves its port
/// stale until the Service is recreated out of band.
#[derive(Debug, Clone, PartialEq)]
pub struct DeploymentPatch {
    body: Value,
}

impl DeploymentPatch {
    /// Merges the fragments for every changed watched field into a single
    /// patch document. Returns `None` when nothing actionable changed.
    #[must_use]
    pub fn from_change_set(name: &str, changes: &ChangeSet) -> Option<Self> {
        if changes.is_empty() {
            return None;
        }

        let mut spec = serde_json::Map::new();

        if let Some(replicas) = &changes.replicas {
            spec.insert(String::from("replicas"), json!(replicas.new));
        }

        // Image and port both rewrite the container entry; when both changed
        // in one event their fragments merge into one entry.
        if changes.image.is_some() || changes.port.is_some() {
            let mut container = serde_json::Map::new();
            container.insert(String::from("name"), json!(name));

            if let Some(image) = &changes.image {
                container.insert(String::from("image"), json!(image.new));
            }
            if let Some(port) = &changes.port {
                container.insert(
                    String::from("ports"),
                    json!([{"containerPort": port.new, "name": HTTP_PORT_NAME}]),
                );
            }

            spec.insert(
                String::from("template"),
                json!({"spec": {"containers": [Value::Object(container)]}}),
            );
        }

        Some(Self {
            body: json!({"spec": Value::Object(spec)}),
        })
    }

    /// The patch document to send to the API server.
    #[must_use]
    pub const fn body(&self) -> &Value {
        &self.body
    }

    /// Consumes the patch, returning the document.
    #[must_use]
    pub fn into_body(self) -> Value {
        self.body
    }
}

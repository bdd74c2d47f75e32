//! Operator runtime settings.
//!
//! These knobs configure the controller runtime around the core, not the
//! core itself: finalizer bookkeeping, status posting, and watch scope.

use serde::{Deserialize, Serialize};

/// Settings for the controller runtime.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct OperatorSettings {
    /// Finalizer recorded on watched resources so deletes are observed
    /// before the resource disappears.
    #[serde(default = "default_finalizer")]
    pub finalizer: String,
    /// Whether reconcile outcomes are posted to the resource status.
    #[serde(default = "default_post_status")]
    pub post_status: bool,
    /// Namespace to watch; all namespaces when unset.
    #[serde(default)]
    pub namespace: Option<String>,
}

impl Default for OperatorSettings {
    fn default() -> Self {
        Self {
            finalizer: default_finalizer(),
            post_status: default_post_status(),
            namespace: None,
        }
    }
}

impl OperatorSettings {
    /// Sets the namespace to watch.
    #[must_use]
    pub fn with_namespace(mut self, namespace: impl Into<String>) -> Self {
        self.namespace = Some(namespace.into());
        self
    }

    /// Disables status posting.
    #[must_use]
    pub const fn without_status_posting(mut self) -> Self {
        self.post_status = false;
        self
    }
}

fn default_finalizer() -> String {
    String::from("simplewebs.ops.example.com/finalizer")
}

const fn default_post_status() -> bool {
    true
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_match_the_operator_identity() {
        let settings = OperatorSettings::default();
        assert_eq!(settings.finalizer, "simplewebs.ops.example.com/finalizer");
        assert!(settings.post_status);
        assert_eq!(settings.namespace, None);
    }

    #[test]
    fn empty_document_deserializes_to_defaults() {
        let settings: OperatorSettings = serde_json::from_value(serde_json::json!({})).unwrap();
        assert_eq!(settings, OperatorSettings::default());
    }

    #[test]
    fn builders_override_single_fields() {
        let settings = OperatorSettings::default()
            .with_namespace("prod")
            .without_status_posting();
        assert_eq!(settings.namespace.as_deref(), Some("prod"));
        assert!(!settings.post_status);
    }
}

//! Spec hashing for child-resource traceability.
//!
//! Children are annotated with a deterministic hash of the spec they were
//! built from, so an operator inspecting the cluster can tell which desired
//! state a child reflects.

use sha2::{Digest, Sha256};

use crate::crd::SimpleWebSpec;

use super::DEFAULT_REPLICAS;

/// Hasher for computing spec hashes.
#[derive(Debug, Default)]
pub struct SpecHasher;

impl SpecHasher {
    /// Creates a new spec hasher.
    #[must_use]
    pub const fn new() -> Self {
        Self
    }

    /// Computes a deterministic hash over the parent name and the fields
    /// that shape the child manifests.
    #[must_use]
    pub fn hash_spec(&self, name: &str, spec: &SimpleWebSpec) -> String {
        let mut hasher = Sha256::new();

        hasher.update(name.as_bytes());
        if let Some(image) = &spec.image {
            hasher.update(image.as_bytes());
        }
        if let Some(port) = spec.port {
            hasher.update(port.to_be_bytes());
        }
        hasher.update(spec.replicas.unwrap_or(DEFAULT_REPLICAS).to_be_bytes());

        hex::encode(hasher.finalize())
    }

    /// Computes a short hash (first 8 characters) for display purposes.
    #[must_use]
    pub fn short_hash(&self, hash: &str) -> String {
        hash.chars().take(8).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn spec(image: &str, port: i32, replicas: Option<i32>) -> SimpleWebSpec {
        SimpleWebSpec {
            image: Some(String::from(image)),
            port: Some(port),
            replicas,
        }
    }

    #[test]
    fn hash_is_deterministic() {
        let hasher = SpecHasher::new();
        let s = spec("nginx:1.25", 8080, Some(3));
        assert_eq!(hasher.hash_spec("web1", &s), hasher.hash_spec("web1", &s));
    }

    #[test]
    fn different_specs_hash_differently() {
        let hasher = SpecHasher::new();
        let a = spec("nginx:1.25", 8080, Some(3));
        let b = spec("nginx:1.26", 8080, Some(3));
        assert_ne!(hasher.hash_spec("web1", &a), hasher.hash_spec("web1", &b));
    }

    #[test]
    fn absent_replicas_hash_like_the_default() {
        let hasher = SpecHasher::new();
        let absent = spec("nginx:1.25", 8080, None);
        let explicit = spec("nginx:1.25", 8080, Some(DEFAULT_REPLICAS));
        assert_eq!(
            hasher.hash_spec("web1", &absent),
            hasher.hash_spec("web1", &explicit)
        );
    }

    #[test]
    fn short_hash_truncates() {
        let hasher = SpecHasher::new();
        assert_eq!(hasher.short_hash("abcdef1234567890"), "abcdef12");
    }
}

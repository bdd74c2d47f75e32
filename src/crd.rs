//! The `SimpleWeb` custom resource definition.
//!
//! `SimpleWeb` is the parent resource of the operator: a small declarative
//! description of a web workload (image, port, replica count) from which the
//! reconciler derives a `Deployment` and a `Service`.

use k8s_openapi::apimachinery::pkg::apis::meta::v1::OwnerReference;
use kube::{CustomResource, Resource};
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

/// API group of the `SimpleWeb` resource.
pub const API_GROUP: &str = "ops.example.com";

/// Desired state of a `SimpleWeb` workload.
///
/// Fields mirror exactly what a user declares; none of them are validated
/// here. An absent image or port is passed through to the child manifests
/// as-is and surfaces downstream as an unschedulable workload.
#[derive(CustomResource, Serialize, Deserialize, Debug, Clone, JsonSchema, PartialEq, Eq)]
#[kube(
    group = "ops.example.com",
    version = "v1",
    kind = "SimpleWeb",
    plural = "simplewebs",
    namespaced,
    status = "SimpleWebStatus"
)]
pub struct SimpleWebSpec {
    /// Container image to run.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub image: Option<String>,
    /// Port the container listens on; also exposed by the Service.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub port: Option<i32>,
    /// Number of replicas. Defaults to 1 when absent.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub replicas: Option<i32>,
}

/// Observed state posted back onto the `SimpleWeb` resource.
#[derive(Serialize, Deserialize, Debug, Clone, Default, JsonSchema, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct SimpleWebStatus {
    /// Name of the Deployment created for this resource.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub deployment: Option<String>,
    /// Name of the Service created for this resource.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub service: Option<String>,
    /// Human-readable outcome of the last reconcile.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
    /// RFC 3339 timestamp of the last reconcile.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub last_reconcile: Option<String>,
    /// Generation of the spec the last reconcile observed.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub observed_generation: Option<i64>,
}

impl SimpleWeb {
    /// Builds the owner reference that links a child resource back to this
    /// `SimpleWeb`.
    ///
    /// The reference is consumed solely by the cluster's garbage collector
    /// to cascade-delete children; the operator never dereferences it.
    /// Returns `None` when the resource has not been persisted yet (no UID).
    #[must_use]
    pub fn owner_reference(&self) -> Option<OwnerReference> {
        self.controller_owner_ref(&())
    }
}

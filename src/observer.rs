//! Observability hook for the reconcile core.
//!
//! The reconciler never logs through a process-global logger; it reports
//! through this trait instead, so tests can assert on diagnostics without
//! capturing output. The production implementation forwards to `tracing`.

use tracing::{info, warn};

use crate::manifest::ChildKind;

/// Receiver for reconcile diagnostics.
///
/// Methods default to no-ops so implementations only override what they
/// care about.
pub trait ReconcileObserver: Send + Sync {
    /// A reconcile invocation started handling an event.
    fn reconcile_started(&self, name: &str, namespace: &str, event: &str) {
        let _ = (name, namespace, event);
    }

    /// A child resource was created.
    fn child_created(&self, kind: ChildKind, name: &str, detail: &str) {
        let _ = (kind, name, detail);
    }

    /// A child create call was rejected.
    fn child_create_failed(&self, kind: ChildKind, name: &str, error: &str) {
        let _ = (kind, name, error);
    }

    /// A watched field changed, with old and new values rendered.
    fn field_changed(&self, name: &str, path: &str, old: &str, new: &str) {
        let _ = (name, path, old, new);
    }

    /// The port changed, leaving the Service port stale.
    fn service_port_stale(&self, name: &str, new_port: &str) {
        let _ = (name, new_port);
    }

    /// The Deployment patch was applied.
    fn deployment_patched(&self, name: &str) {
        let _ = name;
    }

    /// The Deployment patch was rejected.
    fn patch_failed(&self, name: &str, error: &str) {
        let _ = (name, error);
    }

    /// An update event touched none of the watched fields.
    fn no_actionable_change(&self, name: &str) {
        let _ = name;
    }

    /// The parent is being deleted; children are left to the garbage
    /// collector.
    fn delete_observed(&self, name: &str, namespace: &str) {
        let _ = (name, namespace);
    }
}

/// Observer that forwards every diagnostic to `tracing`.
#[derive(Debug, Clone, Copy, Default)]
pub struct TracingObserver;

impl ReconcileObserver for TracingObserver {
    fn reconcile_started(&self, name: &str, namespace: &str, event: &str) {
        info!("Handling {event} for SimpleWeb '{name}' in namespace '{namespace}'");
    }

    fn child_created(&self, kind: ChildKind, name: &str, detail: &str) {
        info!("Created {kind} '{name}' {detail}");
    }

    fn child_create_failed(&self, kind: ChildKind, name: &str, error: &str) {
        warn!("Failed to create {kind} '{name}': {error}");
    }

    fn field_changed(&self, name: &str, path: &str, old: &str, new: &str) {
        info!("'{name}': {path} changed: {old} -> {new}");
    }

    fn service_port_stale(&self, name: &str, new_port: &str) {
        warn!(
            "Port changed to {new_port} for '{name}': the Service port is left stale and \
             requires recreating the Service; only the Deployment container port is updated"
        );
    }

    fn deployment_patched(&self, name: &str) {
        info!("Patched Deployment '{name}'");
    }

    fn patch_failed(&self, name: &str, error: &str) {
        warn!("Failed to patch Deployment '{name}': {error}");
    }

    fn no_actionable_change(&self, name: &str) {
        info!("No actionable changes detected for '{name}'");
    }

    fn delete_observed(&self, name: &str, namespace: &str) {
        info!(
            "SimpleWeb '{name}' in namespace '{namespace}' is being deleted; \
             children will be garbage collected via owner references"
        );
    }
}

/// Observer that discards every diagnostic.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoopObserver;

impl ReconcileObserver for NoopObserver {}

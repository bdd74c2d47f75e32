// ============================================================================
// Strict linting - Dangerous or non-idiomatic practices are forbidden
// ============================================================================

#![deny(warnings)]                    // All warnings are treated as errors
#![deny(unsafe_code)]                 // Unsafe code is forbidden
#![deny(missing_docs)]                // All public items must be documented
#![deny(dead_code)]                   // Unused code is forbidden
#![deny(non_camel_case_types)]        // Types must follow CamelCase convention

// Additional strictness - Leave nothing unchecked
#![deny(unused_imports)]              // Unused imports are forbidden
#![deny(unused_variables)]            // Unused variables are forbidden
#![deny(unused_must_use)]             // Must handle Result and Option explicitly
#![deny(non_snake_case)]              // Variables and functions must be snake_case
#![deny(non_upper_case_globals)]      // Constants must be UPPER_CASE
#![deny(nonstandard_style)]           // Non-standard code style is forbidden
#![forbid(unsafe_op_in_unsafe_fn)]    // Unsafe ops in unsafe fns are forbidden

// Clippy lints (warnings only)
#![warn(clippy::all)]                 // All standard Clippy lints
#![warn(clippy::pedantic)]            // Very strict Clippy lints
#![warn(clippy::nursery)]             // Experimental lints
#![warn(clippy::unwrap_used)]         // unwrap() warning
#![warn(clippy::expect_used)]         // expect() warning
#![warn(clippy::panic)]               // panic!() warning
#![warn(clippy::print_stdout)]        // println!() warning
#![warn(clippy::todo)]                // TODO warning
#![warn(clippy::unimplemented)]       // unimplemented!() warning
#![warn(clippy::missing_const_for_fn)] // Force const when possible
#![warn(clippy::unwrap_in_result)]    // unwrap() in Result warning
#![warn(clippy::module_inception)]    // Module with same name as crate warning
#![warn(clippy::redundant_clone)]     // Useless clones warning
#![warn(clippy::shadow_unrelated)]    // Shadowing unrelated variables warning
#![warn(clippy::too_many_arguments)]  // Limit function arguments
#![warn(clippy::cognitive_complexity)] // Limit cognitive complexity

// Safety and robustness lints
#![deny(overflowing_literals)]        // Overflowing literals are forbidden
#![deny(arithmetic_overflow)]         // Arithmetic overflow is forbidden

// ============================================================================
// Crate Documentation
// ============================================================================

//! # SimpleWeb Operator
//!
//! A Kubernetes operator that derives a Deployment and a Service from each
//! `SimpleWeb` custom resource and keeps them consistent with the parent's
//! desired state over its lifetime.
//!
//! ## Overview
//!
//! A `SimpleWeb` declares a web workload in three fields: container image,
//! port, and replica count. The operator:
//!
//! - Creates one Deployment and one ClusterIP Service per resource, both
//!   named after the parent, on first sight
//! - Patches the Deployment in place when a watched spec field changes
//! - Leaves deletion entirely to the cluster's garbage collector, driven
//!   by owner references on the children
//!
//! ## Architecture
//!
//! The reconcile core is change-driven: every invocation handles exactly
//! one lifecycle event delivered by the controller runtime.
//!
//! 1. **Desired state**: child manifests derived from the parent spec
//! 2. **Change records**: field-level diffs delivered with update events
//! 3. **Reconciler**: dispatches on the event and issues create/patch calls
//!
//! ## Modules
//!
//! - [`crd`]: the `SimpleWeb` custom resource definition
//! - [`manifest`]: desired-state manifests for the child resources
//! - [`classifier`]: typed change-set and Deployment patch derivation
//! - [`reconciler`]: event dispatch and child operations
//! - [`client`]: control-plane client abstraction
//! - [`observer`]: injectable diagnostics sink
//! - [`controller`]: watch/event delivery substrate
//! - [`settings`]: runtime settings (finalizer, status posting, scope)
//!
//! ## Example
//!
//! ```yaml
//! apiVersion: ops.example.com/v1
//! kind: SimpleWeb
//! metadata:
//!   name: web1
//! spec:
//!   image: nginx:1.25
//!   port: 8080
//!   replicas: 3
//! ```

// ============================================================================
// Modules
// ============================================================================

pub mod classifier;
pub mod client;
pub mod controller;
pub mod crd;
pub mod error;
pub mod manifest;
pub mod observer;
pub mod reconciler;
pub mod settings;

// ============================================================================
// Re-exports
// ============================================================================

pub use classifier::{ChangeRecord, ChangeSet, DeploymentPatch, FieldChange};
pub use client::{KubeResourceClient, ResourceClient};
pub use crd::{SimpleWeb, SimpleWebSpec, SimpleWebStatus};
pub use error::{
    ClientError, ErrorClass, ErrorPolicy, OperatorError, PermanentErrorPolicy, ReconcileError,
    Result,
};
pub use manifest::{build_deployment, build_service, ChildKind, SpecHasher};
pub use observer::{NoopObserver, ReconcileObserver, TracingObserver};
pub use reconciler::{ReconcileOutcome, ReconcileRequest, Reconciler, ResourceEvent};
pub use settings::OperatorSettings;

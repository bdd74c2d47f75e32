//! Control-plane client abstraction for child resources.
//!
//! The reconciler talks to the API server only through the
//! [`ResourceClient`] trait, so tests can substitute a mock and the
//! production path stays a thin wrapper over `kube`.

mod api;
mod kube;

#[cfg(test)]
pub use api::MockResourceClient;
pub use api::{ClientResult, ResourceClient};
pub use self::kube::KubeResourceClient;

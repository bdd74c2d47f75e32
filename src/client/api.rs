//! Resource client trait definition.

use async_trait::async_trait;
use k8s_openapi::api::apps::v1::Deployment;
use k8s_openapi::api::core::v1::Service;
use serde_json::Value;

#[cfg(test)]
use mockall::automock;

use crate::error::ClientError;

/// Result alias for client operations.
pub type ClientResult<T> = std::result::Result<T, ClientError>;

/// Abstraction over the control-plane API for child resources.
///
/// Every call is a blocking network round-trip from the caller's point of
/// view; timeouts, cancellation, and retries are owned by the invoking
/// framework, never by implementations of this trait.
#[cfg_attr(test, automock)]
#[async_trait]
pub trait ResourceClient: Send + Sync {
    /// Creates a Deployment in the given namespace.
    async fn create_deployment(
        &self,
        namespace: &str,
        manifest: &Deployment,
    ) -> ClientResult<Deployment>;

    /// Creates a Service in the given namespace.
    async fn create_service(&self, namespace: &str, manifest: &Service) -> ClientResult<Service>;

    /// Applies a merge patch to a Deployment.
    async fn patch_deployment(
        &self,
        namespace: &str,
        name: &str,
        patch: &Value,
    ) -> ClientResult<Deployment>;

    /// Reads a Deployment, returning `None` if it does not exist.
    async fn get_deployment(&self, namespace: &str, name: &str)
        -> ClientResult<Option<Deployment>>;

    /// Reads a Service, returning `None` if it does not exist.
    async fn get_service(&self, namespace: &str, name: &str) -> ClientResult<Option<Service>>;
}

#[async_trait]
impl ResourceClient for Box<dyn ResourceClient> {
    async fn create_deployment(
        &self,
        namespace: &str,
        manifest: &Deployment,
    ) -> ClientResult<Deployment> {
        (**self).create_deployment(namespace, manifest).await
    }

    async fn create_service(&self, namespace: &str, manifest: &Service) -> ClientResult<Service> {
        (**self).create_service(namespace, manifest).await
    }

    async fn patch_deployment(
        &self,
        namespace: &str,
        name: &str,
        patch: &Value,
    ) -> ClientResult<Deployment> {
        (**self).patch_deployment(namespace, name, patch).await
    }

    async fn get_deployment(
        &self,
        namespace: &str,
        name: &str,
    ) -> ClientResult<Option<Deployment>> {
        (**self).get_deployment(namespace, name).await
    }

    async fn get_service(&self, namespace: &str, name: &str) -> ClientResult<Option<Service>> {
        (**self).get_service(namespace, name).await
    }
}

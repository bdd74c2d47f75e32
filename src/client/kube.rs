//! `kube`-backed resource client implementation.

use async_trait::async_trait;
use k8s_openapi::api::apps::v1::Deployment;
use k8s_openapi::api::core::v1::Service;
use kube::api::{Api, Patch, PatchParams, PostParams};
use kube::Client;
use serde_json::Value;
use tracing::debug;

use crate::error::ClientError;

use super::api::{ClientResult, ResourceClient};

/// Resource client backed by a shared `kube` client.
///
/// Patches are issued as JSON merge patches, the non-strategic style the
/// classifier's fragments are written for.
#[derive(Clone)]
pub struct KubeResourceClient {
    /// Shared API client.
    client: Client,
}

impl std::fmt::Debug for KubeResourceClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("KubeResourceClient").finish_non_exhaustive()
    }
}

impl KubeResourceClient {
    /// Creates a new resource client.
    #[must_use]
    pub const fn new(client: Client) -> Self {
        Self { client }
    }

    fn deployments(&self, namespace: &str) -> Api<Deployment> {
        Api::namespaced(self.client.clone(), namespace)
    }

    fn services(&self, namespace: &str) -> Api<Service> {
        Api::namespaced(self.client.clone(), namespace)
    }
}

#[async_trait]
impl ResourceClient for KubeResourceClient {
    async fn create_deployment(
        &self,
        namespace: &str,
        manifest: &Deployment,
    ) -> ClientResult<Deployment> {
        debug!("Creating Deployment in namespace '{namespace}'");
        self.deployments(namespace)
            .create(&PostParams::default(), manifest)
            .await
            .map_err(ClientError::from)
    }

    async fn create_service(&self, namespace: &str, manifest: &Service) -> ClientResult<Service> {
        debug!("Creating Service in namespace '{namespace}'");
        self.services(namespace)
            .create(&PostParams::default(), manifest)
            .await
            .map_err(ClientError::from)
    }

    async fn patch_deployment(
        &self,
        namespace: &str,
        name: &str,
        patch: &Value,
    ) -> ClientResult<Deployment> {
        debug!("Patching Deployment '{name}' in namespace '{namespace}'");
        self.deployments(namespace)
            .patch(name, &PatchParams::default(), &Patch::Merge(patch))
            .await
            .map_err(ClientError::from)
    }

    async fn get_deployment(
        &self,
        namespace: &str,
        name: &str,
    ) -> ClientResult<Option<Deployment>> {
        self.deployments(namespace)
            .get_opt(name)
            .await
            .map_err(ClientError::from)
    }

    async fn get_service(&self, namespace: &str, name: &str) -> ClientResult<Option<Service>> {
        self.services(namespace)
            .get_opt(name)
            .await
            .map_err(ClientError::from)
    }
}

//! Reconciler for SimpleWeb lifecycle events.
//!
//! This is the control-flow core of the operator: one invocation per
//! resource-change event, dispatching on the event kind. Create builds and
//! creates both children; update classifies the change records and patches
//! the Deployment; delete does nothing and leaves the children to the
//! garbage collector. The reconciler holds no state between invocations,
//! so concurrent reconciles for different resources need no coordination.

use std::sync::Arc;

use k8s_openapi::apimachinery::pkg::apis::meta::v1::{ObjectMeta, OwnerReference};
use serde::Serialize;

use crate::classifier::{
    ChangeRecord, ChangeSet, DeploymentPatch, PATH_IMAGE, PATH_PORT, PATH_REPLICAS,
};
use crate::client::ResourceClient;
use crate::crd::SimpleWebSpec;
use crate::error::{
    ErrorClass, ErrorPolicy, OperatorError, PermanentErrorPolicy, ReconcileError, Result,
};
use crate::manifest::{build_deployment, build_service, ChildKind, DEFAULT_REPLICAS};
use crate::observer::{ReconcileObserver, TracingObserver};

/// One resource-change event to reconcile.
#[derive(Debug, Clone)]
pub struct ReconcileRequest {
    /// Name of the SimpleWeb resource.
    pub name: String,
    /// Namespace of the SimpleWeb resource.
    pub namespace: String,
    /// Owner reference to attach to created children, when available.
    pub owner: Option<OwnerReference>,
    /// The lifecycle event being delivered.
    pub event: ResourceEvent,
}

/// Lifecycle event kinds delivered by the event substrate.
#[derive(Debug, Clone)]
pub enum ResourceEvent {
    /// The resource was created; no children exist yet.
    Created {
        /// Desired state at creation time.
        spec: SimpleWebSpec,
    },
    /// The resource was updated.
    Updated {
        /// Spec before the update.
        old: SimpleWebSpec,
        /// Spec after the update.
        new: SimpleWebSpec,
        /// Ordered field-level change records for the update.
        changes: Vec<ChangeRecord>,
    },
    /// The resource is being deleted.
    Deleted,
}

impl ResourceEvent {
    /// Short name of the event kind, for diagnostics.
    #[must_use]
    pub const fn kind(&self) -> &'static str {
        match self {
            Self::Created { .. } => "create",
            Self::Updated { .. } => "update",
            Self::Deleted => "delete",
        }
    }
}

impl ReconcileRequest {
    /// Builds a create request.
    #[must_use]
    pub fn create(
        name: impl Into<String>,
        namespace: impl Into<String>,
        owner: Option<OwnerReference>,
        spec: SimpleWebSpec,
    ) -> Self {
        Self {
            name: name.into(),
            namespace: namespace.into(),
            owner,
            event: ResourceEvent::Created { spec },
        }
    }

    /// Builds an update request.
    #[must_use]
    pub fn update(
        name: impl Into<String>,
        namespace: impl Into<String>,
        old: SimpleWebSpec,
        new: SimpleWebSpec,
        changes: Vec<ChangeRecord>,
    ) -> Self {
        Self {
            name: name.into(),
            namespace: namespace.into(),
            owner: None,
            event: ResourceEvent::Updated { old, new, changes },
        }
    }

    /// Builds a delete request.
    #[must_use]
    pub fn delete(name: impl Into<String>, namespace: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            namespace: namespace.into(),
            owner: None,
            event: ResourceEvent::Deleted,
        }
    }
}

/// Result of one reconcile invocation, mapped onto the resource status by
/// the controller runtime.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub enum ReconcileOutcome {
    /// Both children were created.
    Created {
        /// Name of the created Deployment.
        deployment: String,
        /// Name of the created Service.
        service: String,
        /// Status message.
        message: String,
    },
    /// The update was handled, with or without a patch being issued.
    Updated {
        /// Whether a Deployment patch was issued.
        patched: bool,
        /// Status message.
        message: String,
    },
    /// The delete was acknowledged; children are left to the garbage
    /// collector.
    Deleted {
        /// Status message.
        message: String,
    },
}

impl ReconcileOutcome {
    /// The status message for this outcome.
    #[must_use]
    pub fn message(&self) -> &str {
        match self {
            Self::Created { message, .. }
            | Self::Updated { message, .. }
            | Self::Deleted { message } => message,
        }
    }

    /// Name of the created Deployment, if this outcome created one.
    #[must_use]
    pub fn deployment(&self) -> Option<&str> {
        match self {
            Self::Created { deployment, .. } => Some(deployment),
            Self::Updated { .. } | Self::Deleted { .. } => None,
        }
    }

    /// Name of the created Service, if this outcome created one.
    #[must_use]
    pub fn service(&self) -> Option<&str> {
        match self {
            Self::Created { service, .. } => Some(service),
            Self::Updated { .. } | Self::Deleted { .. } => None,
        }
    }
}

impl std::fmt::Display for ReconcileOutcome {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.message())
    }
}

/// Reconciler for SimpleWeb resources.
pub struct Reconciler<C> {
    /// Control-plane client for child resources.
    client: C,
    /// Diagnostics sink.
    observer: Arc<dyn ReconcileObserver>,
    /// Error classification policy.
    policy: Box<dyn ErrorPolicy>,
}

impl<C: ResourceClient> Reconciler<C> {
    /// Creates a reconciler with tracing diagnostics and the default
    /// permanent-error policy.
    #[must_use]
    pub fn new(client: C) -> Self {
        Self {
            client,
            observer: Arc::new(TracingObserver),
            policy: Box::new(PermanentErrorPolicy),
        }
    }

    /// Replaces the diagnostics sink.
    #[must_use]
    pub fn with_observer(mut self, observer: Arc<dyn ReconcileObserver>) -> Self {
        self.observer = observer;
        self
    }

    /// Replaces the error classification policy.
    #[must_use]
    pub fn with_error_policy(mut self, policy: Box<dyn ErrorPolicy>) -> Self {
        self.policy = policy;
        self
    }

    /// Classifies a failed reconcile according to the configured policy.
    #[must_use]
    pub fn classify(&self, error: &OperatorError) -> ErrorClass {
        error
            .client_error()
            .map_or(ErrorClass::Permanent, |e| self.policy.classify(e))
    }

    /// Handles one lifecycle event.
    ///
    /// # Errors
    ///
    /// Returns an error when a child create or patch call is rejected by
    /// the control plane. No retries are attempted here; re-delivery is the
    /// calling framework's decision.
    pub async fn reconcile(&self, request: ReconcileRequest) -> Result<ReconcileOutcome> {
        let ReconcileRequest {
            name,
            namespace,
            owner,
            event,
        } = request;

        self.observer
            .reconcile_started(&name, &namespace, event.kind());

        match event {
            ResourceEvent::Created { spec } => {
                self.handle_create(&name, &namespace, owner.as_ref(), &spec)
                    .await
            }
            ResourceEvent::Updated { changes, .. } => {
                self.handle_update(&name, &namespace, &changes).await
            }
            ResourceEvent::Deleted => Ok(self.handle_delete(&name, &namespace)),
        }
    }

    /// Absent -> Present: create Deployment then Service, owner linkage on
    /// both. A failure on either call is terminal; the error records which
    /// children were already created.
    async fn handle_create(
        &self,
        name: &str,
        namespace: &str,
        owner: Option<&OwnerReference>,
        spec: &SimpleWebSpec,
    ) -> Result<ReconcileOutcome> {
        let mut created: Vec<ChildKind> = Vec::new();

        let mut deployment = build_deployment(name, namespace, spec);
        attach_owner(&mut deployment.metadata, owner);

        match self.client.create_deployment(namespace, &deployment).await {
            Ok(_) => {
                let replicas = spec.replicas.unwrap_or(DEFAULT_REPLICAS);
                self.observer.child_created(
                    ChildKind::Deployment,
                    name,
                    &format!("with {replicas} replicas"),
                );
                created.push(ChildKind::Deployment);
            }
            Err(source) => {
                self.observer
                    .child_create_failed(ChildKind::Deployment, name, &source.to_string());
                return Err(ReconcileError::ChildCreateFailed {
                    kind: ChildKind::Deployment,
                    name: String::from(name),
                    created,
                    source,
                }
                .into());
            }
        }

        let mut service = build_service(name, namespace, spec);
        attach_owner(&mut service.metadata, owner);

        match self.client.create_service(namespace, &service).await {
            Ok(_) => {
                self.observer.child_created(
                    ChildKind::Service,
                    name,
                    &format!("on port {}", render(spec.port.as_ref())),
                );
            }
            Err(source) => {
                self.observer
                    .child_create_failed(ChildKind::Service, name, &source.to_string());
                return Err(ReconcileError::ChildCreateFailed {
                    kind: ChildKind::Service,
                    name: String::from(name),
                    created,
                    source,
                }
                .into());
            }
        }

        Ok(ReconcileOutcome::Created {
            deployment: String::from(name),
            service: String::from(name),
            message: format!("Successfully created Deployment and Service for {name}"),
        })
    }

    /// Present -> Present: classify the change records and issue at most
    /// one merge patch against the Deployment. The Service is never
    /// patched here; a port change leaves it stale by design.
    async fn handle_update(
        &self,
        name: &str,
        namespace: &str,
        changes: &[ChangeRecord],
    ) -> Result<ReconcileOutcome> {
        let change_set = ChangeSet::from_records(changes);

        if let Some(replicas) = &change_set.replicas {
            self.observer.field_changed(
                name,
                PATH_REPLICAS,
                &render(replicas.old.as_ref()),
                &render(replicas.new.as_ref()),
            );
        }
        if let Some(image) = &change_set.image {
            self.observer.field_changed(
                name,
                PATH_IMAGE,
                &render(image.old.as_ref()),
                &render(image.new.as_ref()),
            );
        }
        if let Some(port) = &change_set.port {
            self.observer.field_changed(
                name,
                PATH_PORT,
                &render(port.old.as_ref()),
                &render(port.new.as_ref()),
            );
            self.observer
                .service_port_stale(name, &render(port.new.as_ref()));
        }

        let Some(patch) = DeploymentPatch::from_change_set(name, &change_set) else {
            self.observer.no_actionable_change(name);
            return Ok(ReconcileOutcome::Updated {
                patched: false,
                message: format!("Successfully updated {name}"),
            });
        };

        match self
            .client
            .patch_deployment(namespace, name, patch.body())
            .await
        {
            Ok(_) => self.observer.deployment_patched(name),
            Err(source) => {
                self.observer.patch_failed(name, &source.to_string());
                return Err(ReconcileError::PatchFailed {
                    name: String::from(name),
                    source,
                }
                .into());
            }
        }

        Ok(ReconcileOutcome::Updated {
            patched: true,
            message: format!("Successfully updated {name}"),
        })
    }

    /// Present -> Deleted: no child calls. The owner references drive
    /// cascade deletion in the control plane.
    fn handle_delete(&self, name: &str, namespace: &str) -> ReconcileOutcome {
        self.observer.delete_observed(name, namespace);
        ReconcileOutcome::Deleted {
            message: format!("SimpleWeb {name} deleted. Child resources will be garbage collected."),
        }
    }
}

/// Attaches the owner linkage to a child's metadata.
fn attach_owner(metadata: &mut ObjectMeta, owner: Option<&OwnerReference>) {
    if let Some(reference) = owner {
        metadata.owner_references = Some(vec![reference.clone()]);
    }
}

/// Renders an optional value for diagnostics.
fn render<T: std::fmt::Display>(value: Option<&T>) -> String {
    value.map_or_else(|| String::from("<absent>"), ToString::to_string)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::client::MockResourceClient;
    use crate::error::ClientError;
    use crate::manifest::MANAGED_BY;
    use mockall::predicate::eq;
    use mockall::Sequence;
    use serde_json::json;
    use std::sync::Mutex;

    /// Observer that records diagnostics for assertions.
    #[derive(Default)]
    struct RecordingObserver {
        events: Mutex<Vec<String>>,
    }

    impl RecordingObserver {
        fn events(&self) -> Vec<String> {
            self.events.lock().unwrap().clone()
        }

        fn push(&self, event: String) {
            self.events.lock().unwrap().push(event);
        }
    }

    impl ReconcileObserver for RecordingObserver {
        fn field_changed(&self, name: &str, path: &str, old: &str, new: &str) {
            self.push(format!("changed:{name}:{path}:{old}->{new}"));
        }

        fn service_port_stale(&self, name: &str, new_port: &str) {
            self.push(format!("port-stale:{name}:{new_port}"));
        }

        fn no_actionable_change(&self, name: &str) {
            self.push(format!("no-change:{name}"));
        }

        fn delete_observed(&self, name: &str, _namespace: &str) {
            self.push(format!("deleted:{name}"));
        }
    }

    fn sample_spec() -> SimpleWebSpec {
        SimpleWebSpec {
            image: Some(String::from("nginx:1.25")),
            port: Some(8080),
            replicas: Some(3),
        }
    }

    fn owner() -> OwnerReference {
        OwnerReference {
            api_version: String::from("ops.example.com/v1"),
            kind: String::from("SimpleWeb"),
            name: String::from("web1"),
            uid: String::from("uid-1234"),
            controller: Some(true),
            ..OwnerReference::default()
        }
    }

    #[tokio::test]
    async fn create_issues_deployment_then_service_with_owner_linkage() {
        let mut client = MockResourceClient::new();
        let mut seq = Sequence::new();

        client
            .expect_create_deployment()
            .once()
            .in_sequence(&mut seq)
            .withf(|namespace, manifest| {
                let owners = manifest.metadata.owner_references.as_ref().unwrap();
                namespace == "ns"
                    && owners.len() == 1
                    && owners[0].kind == "SimpleWeb"
                    && manifest
                        .metadata
                        .labels
                        .as_ref()
                        .is_some_and(|l| l.get("managed-by").map(String::as_str) == Some(MANAGED_BY))
            })
            .returning(|_, manifest| Ok(manifest.clone()));

        client
            .expect_create_service()
            .once()
            .in_sequence(&mut seq)
            .withf(|namespace, manifest| {
                namespace == "ns"
                    && manifest
                        .metadata
                        .owner_references
                        .as_ref()
                        .is_some_and(|o| o.len() == 1)
            })
            .returning(|_, manifest| Ok(manifest.clone()));

        let reconciler = Reconciler::new(client);
        let outcome = reconciler
            .reconcile(ReconcileRequest::create(
                "web1",
                "ns",
                Some(owner()),
                sample_spec(),
            ))
            .await
            .unwrap();

        assert_eq!(outcome.deployment(), Some("web1"));
        assert_eq!(outcome.service(), Some("web1"));
        assert!(outcome.message().contains("web1"));
    }

    #[tokio::test]
    async fn service_create_failure_reports_the_deployment_as_created() {
        let mut client = MockResourceClient::new();

        client
            .expect_create_deployment()
            .once()
            .returning(|_, manifest| Ok(manifest.clone()));
        client
            .expect_create_service()
            .once()
            .returning(|_, _| Err(ClientError::api_rejected(403, "quota exceeded")));

        let reconciler = Reconciler::new(client);
        let err = reconciler
            .reconcile(ReconcileRequest::create(
                "web1",
                "ns",
                Some(owner()),
                sample_spec(),
            ))
            .await
            .unwrap_err();

        match err {
            OperatorError::Reconcile(ReconcileError::ChildCreateFailed {
                kind, created, ..
            }) => {
                assert_eq!(kind, ChildKind::Service);
                assert_eq!(created, vec![ChildKind::Deployment]);
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[tokio::test]
    async fn deployment_create_failure_reports_nothing_created() {
        let mut client = MockResourceClient::new();

        client
            .expect_create_deployment()
            .once()
            .returning(|_, _| Err(ClientError::api_rejected(409, "already exists")));

        let reconciler = Reconciler::new(client);
        let err = reconciler
            .reconcile(ReconcileRequest::create("web1", "ns", None, sample_spec()))
            .await
            .unwrap_err();

        match err {
            OperatorError::Reconcile(ReconcileError::ChildCreateFailed {
                kind, created, ..
            }) => {
                assert_eq!(kind, ChildKind::Deployment);
                assert!(created.is_empty());
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[tokio::test]
    async fn update_without_actionable_change_issues_no_client_call() {
        // No expectations registered: any client call would panic the mock.
        let client = MockResourceClient::new();
        let recorder = Arc::new(RecordingObserver::default());

        let reconciler = Reconciler::new(client).with_observer(recorder.clone());
        let outcome = reconciler
            .reconcile(ReconcileRequest::update(
                "web1",
                "ns",
                sample_spec(),
                sample_spec(),
                vec![],
            ))
            .await
            .unwrap();

        assert_eq!(
            outcome,
            ReconcileOutcome::Updated {
                patched: false,
                message: String::from("Successfully updated web1"),
            }
        );
        assert_eq!(recorder.events(), vec![String::from("no-change:web1")]);
    }

    #[tokio::test]
    async fn port_change_patches_the_deployment_and_warns_about_the_service() {
        let mut client = MockResourceClient::new();
        let recorder = Arc::new(RecordingObserver::default());

        client
            .expect_patch_deployment()
            .once()
            .with(
                eq("ns"),
                eq("web1"),
                eq(json!({"spec": {"template": {"spec": {"containers": [
                    {"name": "web1", "ports": [{"containerPort": 9090, "name": "http"}]}
                ]}}}})),
            )
            .returning(|_, _, _| Ok(k8s_openapi::api::apps::v1::Deployment::default()));

        let reconciler = Reconciler::new(client).with_observer(recorder.clone());
        let changes = vec![ChangeRecord::new(
            "spec.port",
            Some(json!(8080)),
            Some(json!(9090)),
        )];
        let old = sample_spec();
        let new = SimpleWebSpec {
            port: Some(9090),
            ..sample_spec()
        };

        let outcome = reconciler
            .reconcile(ReconcileRequest::update("web1", "ns", old, new, changes))
            .await
            .unwrap();

        assert_eq!(
            outcome,
            ReconcileOutcome::Updated {
                patched: true,
                message: String::from("Successfully updated web1"),
            }
        );
        let events = recorder.events();
        assert!(events.contains(&String::from("changed:web1:spec.port:8080->9090")));
        assert!(events.contains(&String::from("port-stale:web1:9090")));
    }

    #[tokio::test]
    async fn patch_rejection_surfaces_as_a_patch_failure() {
        let mut client = MockResourceClient::new();
        client
            .expect_patch_deployment()
            .once()
            .returning(|_, _, _| Err(ClientError::network("connection reset")));

        let reconciler = Reconciler::new(client);
        let changes = vec![ChangeRecord::new(
            "spec.replicas",
            Some(json!(1)),
            Some(json!(2)),
        )];
        let err = reconciler
            .reconcile(ReconcileRequest::update(
                "web1",
                "ns",
                sample_spec(),
                sample_spec(),
                changes,
            ))
            .await
            .unwrap_err();

        assert!(matches!(
            err,
            OperatorError::Reconcile(ReconcileError::PatchFailed { .. })
        ));
    }

    #[tokio::test]
    async fn delete_issues_no_client_calls_and_succeeds() {
        let client = MockResourceClient::new();
        let recorder = Arc::new(RecordingObserver::default());

        let reconciler = Reconciler::new(client).with_observer(recorder.clone());
        let outcome = reconciler
            .reconcile(ReconcileRequest::delete("web1", "ns"))
            .await
            .unwrap();

        assert!(matches!(outcome, ReconcileOutcome::Deleted { .. }));
        assert!(outcome.message().contains("garbage collected"));
        assert_eq!(recorder.events(), vec![String::from("deleted:web1")]);
    }

    #[test]
    fn classification_uses_the_configured_policy() {
        struct RetryNetwork;
        impl ErrorPolicy for RetryNetwork {
            fn classify(&self, error: &ClientError) -> ErrorClass {
                match error {
                    ClientError::Network { .. } => ErrorClass::Transient,
                    _ => ErrorClass::Permanent,
                }
            }
        }

        let reconciler =
            Reconciler::new(MockResourceClient::new()).with_error_policy(Box::new(RetryNetwork));

        let network = OperatorError::from(ClientError::network("timeout"));
        let rejected = OperatorError::from(ClientError::api_rejected(409, "conflict"));
        assert_eq!(reconciler.classify(&network), ErrorClass::Transient);
        assert_eq!(reconciler.classify(&rejected), ErrorClass::Permanent);
    }
}

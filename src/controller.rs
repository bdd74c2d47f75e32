//! Controller runtime around the reconcile core.
//!
//! This is the event-delivery substrate the core treats as a collaborator:
//! it watches `SimpleWeb` resources, decides which lifecycle event a change
//! represents, derives the field-level change records, and invokes the
//! reconciler exactly once per delivered event. Child resources are not
//! watched; the operator is change-driven, not state-driven.
//!
//! Create vs update is decided by a last-applied-spec annotation on the
//! parent, written after each successful reconcile. Deletes are observed
//! through a finalizer so the core can acknowledge them before the resource
//! disappears.

use std::collections::BTreeSet;
use std::sync::Arc;
use std::time::Duration;

use chrono::Utc;
use futures::StreamExt;
use kube::api::{Api, Patch, PatchParams};
use kube::runtime::controller::{Action, Controller};
use kube::runtime::finalizer::{finalizer, Error as FinalizerError, Event as Finalizer};
use kube::runtime::watcher;
use kube::{Client, ResourceExt};
use serde_json::{json, Value};
use tracing::{debug, error, info, warn};

use crate::classifier::ChangeRecord;
use crate::client::KubeResourceClient;
use crate::crd::{SimpleWeb, SimpleWebSpec, SimpleWebStatus};
use crate::error::{ErrorClass, OperatorError, Result};
use crate::reconciler::{ReconcileOutcome, ReconcileRequest, Reconciler};
use crate::settings::OperatorSettings;

/// Annotation recording the spec the children were last reconciled from.
pub const LAST_APPLIED_ANNOTATION: &str = "simplewebs.ops.example.com/last-applied";

/// Requeue delay applied when a policy classifies an error as transient.
const TRANSIENT_REQUEUE_SECS: u64 = 300;

/// Shared state handed to every reconcile invocation.
struct Context {
    /// API client for parent bookkeeping (annotations, status).
    client: Client,
    /// The reconcile core.
    reconciler: Reconciler<KubeResourceClient>,
    /// Runtime settings.
    settings: OperatorSettings,
}

impl Context {
    fn webs(&self, namespace: &str) -> Api<SimpleWeb> {
        Api::namespaced(self.client.clone(), namespace)
    }
}

type CtrlResult = std::result::Result<Action, FinalizerError<OperatorError>>;

/// Runs the controller until the watch stream ends.
///
/// # Errors
///
/// Returns an error if the initial watch cannot be established.
pub async fn run(client: Client, settings: OperatorSettings) -> Result<()> {
    let webs: Api<SimpleWeb> = settings.namespace.as_deref().map_or_else(
        || Api::all(client.clone()),
        |namespace| Api::namespaced(client.clone(), namespace),
    );

    match settings.namespace.as_deref() {
        Some(namespace) => info!("Watching SimpleWeb resources in namespace '{namespace}'"),
        None => info!("Watching SimpleWeb resources in all namespaces"),
    }

    let context = Arc::new(Context {
        reconciler: Reconciler::new(KubeResourceClient::new(client.clone())),
        client,
        settings,
    });

    Controller::new(webs, watcher::Config::default())
        .run(reconcile, error_policy, context)
        .for_each(|result| async {
            match result {
                Ok((object, _)) => debug!("Reconciled '{}'", object.name),
                Err(e) => warn!("Reconcile stream error: {e}"),
            }
        })
        .await;

    Ok(())
}

/// Entry point for one delivered change: routes through the finalizer
/// helper so deletes are observed before the resource disappears.
async fn reconcile(web: Arc<SimpleWeb>, ctx: Arc<Context>) -> CtrlResult {
    let namespace = web.namespace().ok_or(FinalizerError::UnnamedObject)?;
    let api = ctx.webs(&namespace);

    let finalizer_name = ctx.settings.finalizer.clone();
    finalizer(&api, &finalizer_name, web, |event| async {
        match event {
            Finalizer::Apply(web) => apply(&web, &ctx).await,
            Finalizer::Cleanup(web) => cleanup(&web, &ctx).await,
        }
    })
    .await
}

/// Handles a non-delete change: first sight of a resource is a create,
/// everything after that is an update diffed against the last-applied spec.
async fn apply(web: &SimpleWeb, ctx: &Context) -> Result<Action> {
    let name = web.name_any();
    let namespace = web
        .namespace()
        .ok_or_else(|| OperatorError::internal("SimpleWeb has no namespace"))?;

    let request = match last_applied(web)? {
        None => ReconcileRequest::create(
            name.clone(),
            namespace.clone(),
            web.owner_reference(),
            web.spec.clone(),
        ),
        Some(old) => {
            let changes = diff_spec_fields(&old, &web.spec);
            ReconcileRequest::update(
                name.clone(),
                namespace.clone(),
                old,
                web.spec.clone(),
                changes,
            )
        }
    };

    let outcome = ctx.reconciler.reconcile(request).await?;

    record_last_applied(ctx, web, &name, &namespace).await?;
    if ctx.settings.post_status {
        post_status(ctx, web, &name, &namespace, &outcome).await;
    }

    Ok(Action::await_change())
}

/// Handles a delete: the core issues no child calls, so this only
/// acknowledges and lets the finalizer unblock garbage collection.
async fn cleanup(web: &SimpleWeb, ctx: &Context) -> Result<Action> {
    let name = web.name_any();
    let namespace = web
        .namespace()
        .ok_or_else(|| OperatorError::internal("SimpleWeb has no namespace"))?;

    let outcome = ctx
        .reconciler
        .reconcile(ReconcileRequest::delete(name, namespace))
        .await?;
    debug!("{}", outcome.message());

    Ok(Action::await_change())
}

/// Maps failed reconciles onto requeue behavior. The default policy
/// classifies everything permanent, so failed events wait for the next
/// change rather than being retried.
fn error_policy(
    web: Arc<SimpleWeb>,
    err: &FinalizerError<OperatorError>,
    ctx: Arc<Context>,
) -> Action {
    let class = match err {
        FinalizerError::ApplyFailed(inner) | FinalizerError::CleanupFailed(inner) => {
            ctx.reconciler.classify(inner)
        }
        _ => ErrorClass::Permanent,
    };

    match class {
        ErrorClass::Permanent => {
            error!(
                "Reconcile failed permanently for '{}': {err}",
                web.name_any()
            );
            Action::await_change()
        }
        ErrorClass::Transient => {
            warn!(
                "Reconcile failed for '{}', requeueing: {err}",
                web.name_any()
            );
            Action::requeue(Duration::from_secs(TRANSIENT_REQUEUE_SECS))
        }
    }
}

/// Reads the last-applied spec from the parent's annotations.
fn last_applied(web: &SimpleWeb) -> Result<Option<SimpleWebSpec>> {
    web.annotations()
        .get(LAST_APPLIED_ANNOTATION)
        .map(|raw| {
            serde_json::from_str(raw).map_err(|e| {
                OperatorError::internal(format!("corrupt last-applied annotation: {e}"))
            })
        })
        .transpose()
}

/// Records the spec just reconciled as the new last-applied state.
async fn record_last_applied(
    ctx: &Context,
    web: &SimpleWeb,
    name: &str,
    namespace: &str,
) -> Result<()> {
    let raw = serde_json::to_string(&web.spec)
        .map_err(|e| OperatorError::internal(format!("serialize last-applied spec: {e}")))?;
    let patch = json!({"metadata": {"annotations": {LAST_APPLIED_ANNOTATION: raw}}});

    ctx.webs(namespace)
        .patch(name, &PatchParams::default(), &Patch::Merge(&patch))
        .await
        .map_err(|e| OperatorError::Client(e.into()))?;

    Ok(())
}

/// Posts the reconcile outcome to the resource status. Failures are logged
/// and swallowed; status is informational and must not fail the reconcile.
async fn post_status(
    ctx: &Context,
    web: &SimpleWeb,
    name: &str,
    namespace: &str,
    outcome: &ReconcileOutcome,
) {
    let status = SimpleWebStatus {
        deployment: outcome.deployment().map(String::from),
        service: outcome.service().map(String::from),
        message: Some(String::from(outcome.message())),
        last_reconcile: Some(Utc::now().to_rfc3339()),
        observed_generation: web.metadata.generation,
    };
    let patch = json!({"status": status});

    if let Err(e) = ctx
        .webs(namespace)
        .patch_status(name, &PatchParams::default(), &Patch::Merge(&patch))
        .await
    {
        warn!("Failed to post status for '{name}': {e}");
    }
}

/// Shallow field diff of two specs, producing the ordered change records
/// the classifier consumes. This is the substrate's half of the contract:
/// it reports every changed top-level spec field; the classifier decides
/// which ones are actionable.
fn diff_spec_fields(old: &SimpleWebSpec, new: &SimpleWebSpec) -> Vec<ChangeRecord> {
    let old_fields = spec_fields(old);
    let new_fields = spec_fields(new);

    let keys: BTreeSet<&String> = old_fields.keys().chain(new_fields.keys()).collect();

    keys.into_iter()
        .filter_map(|key| {
            let old_value = old_fields.get(key).cloned();
            let new_value = new_fields.get(key).cloned();
            (old_value != new_value)
                .then(|| ChangeRecord::new(format!("spec.{key}"), old_value, new_value))
        })
        .collect()
}

fn spec_fields(spec: &SimpleWebSpec) -> serde_json::Map<String, Value> {
    serde_json::to_value(spec)
        .ok()
        .and_then(|value| value.as_object().cloned())
        .unwrap_or_default()
}

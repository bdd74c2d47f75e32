//! Error types for the SimpleWeb operator.
//!
//! The hierarchy covers the two places an operation can fail: the
//! control-plane API (`ClientError`) and the reconcile control flow
//! (`ReconcileError`). Manifest construction cannot fail and has no error
//! type of its own.

use thiserror::Error;

use crate::manifest::ChildKind;

/// The main error type for the SimpleWeb operator.
#[derive(Debug, Error)]
pub enum OperatorError {
    /// Control-plane API errors.
    #[error("API client error: {0}")]
    Client(#[from] ClientError),

    /// Reconciliation errors.
    #[error("Reconciliation error: {0}")]
    Reconcile(#[from] ReconcileError),

    /// Generic internal error.
    #[error("Internal error: {0}")]
    Internal(String),
}

/// Errors surfaced by the control-plane API.
#[derive(Debug, Error)]
pub enum ClientError {
    /// The API server rejected the request.
    #[error("API request rejected ({status}): {message}")]
    ApiRejected {
        /// HTTP status code reported by the API server.
        status: u16,
        /// Error message from the API server.
        message: String,
    },

    /// A requested resource does not exist.
    #[error("{kind} '{name}' not found")]
    NotFound {
        /// Kind of the missing resource.
        kind: String,
        /// Name of the missing resource.
        name: String,
    },

    /// The response could not be interpreted.
    #[error("Invalid response from API server: {message}")]
    InvalidResponse {
        /// Description of the response issue.
        message: String,
    },

    /// Transport-level failure reaching the API server.
    #[error("Network error communicating with API server: {message}")]
    Network {
        /// Description of the network error.
        message: String,
    },
}

/// Reconciliation errors.
#[derive(Debug, Error)]
pub enum ReconcileError {
    /// A child resource could not be created.
    ///
    /// `created` lists the children that had already been created when the
    /// failure occurred, so partial creation is diagnosable from the error
    /// alone.
    #[error("Failed to create {kind} '{name}' (created so far: {created:?}): {source}")]
    ChildCreateFailed {
        /// Kind of the child that failed to create.
        kind: ChildKind,
        /// Name of the child resource.
        name: String,
        /// Children created before the failure, in creation order.
        created: Vec<ChildKind>,
        /// Underlying API error.
        source: ClientError,
    },

    /// The Deployment patch was rejected.
    #[error("Failed to patch Deployment '{name}': {source}")]
    PatchFailed {
        /// Name of the Deployment.
        name: String,
        /// Underlying API error.
        source: ClientError,
    },
}

/// Classification of a failed reconcile attempt.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorClass {
    /// The triggering event must not be retried automatically.
    Permanent,
    /// The event may be re-delivered later.
    Transient,
}

/// Extension point for classifying client errors.
///
/// The default classifies every error as permanent, matching the operator's
/// current policy of never retrying internally. Alternative policies can
/// distinguish retryable conditions (rate limits, conflicts) without
/// touching the reconcile control flow.
pub trait ErrorPolicy: Send + Sync {
    /// Classifies a client error.
    fn classify(&self, error: &ClientError) -> ErrorClass {
        let _ = error;
        ErrorClass::Permanent
    }
}

/// The default policy: every client error is permanent.
#[derive(Debug, Clone, Copy, Default)]
pub struct PermanentErrorPolicy;

impl ErrorPolicy for PermanentErrorPolicy {}

/// Result type alias for operator operations.
pub type Result<T> = std::result::Result<T, OperatorError>;

impl OperatorError {
    /// Creates a new internal error with the given message.
    #[must_use]
    pub fn internal(message: impl Into<String>) -> Self {
        Self::Internal(message.into())
    }

    /// Returns the underlying client error, if this error wraps one.
    #[must_use]
    pub const fn client_error(&self) -> Option<&ClientError> {
        match self {
            Self::Client(e)
            | Self::Reconcile(
                ReconcileError::ChildCreateFailed { source: e, .. }
                | ReconcileError::PatchFailed { source: e, .. },
            ) => Some(e),
            Self::Internal(_) => None,
        }
    }
}

impl ClientError {
    /// Creates an API rejection error.
    #[must_use]
    pub fn api_rejected(status: u16, message: impl Into<String>) -> Self {
        Self::ApiRejected {
            status,
            message: message.into(),
        }
    }

    /// Creates a network error.
    #[must_use]
    pub fn network(message: impl Into<String>) -> Self {
        Self::Network {
            message: message.into(),
        }
    }
}

impl From<kube::Error> for ClientError {
    fn from(err: kube::Error) -> Self {
        match err {
            kube::Error::Api(response) => Self::ApiRejected {
                status: response.code,
                message: response.message,
            },
            kube::Error::SerdeError(e) => Self::InvalidResponse {
                message: e.to_string(),
            },
            other => Self::Network {
                message: other.to_string(),
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_policy_classifies_everything_permanent() {
        let policy = PermanentErrorPolicy;
        let rate_limited = ClientError::api_rejected(429, "slow down");
        let conflict = ClientError::api_rejected(409, "already exists");
        assert_eq!(policy.classify(&rate_limited), ErrorClass::Permanent);
        assert_eq!(policy.classify(&conflict), ErrorClass::Permanent);
    }

    #[test]
    fn child_create_failure_reports_partial_creation() {
        let err = ReconcileError::ChildCreateFailed {
            kind: ChildKind::Service,
            name: String::from("web1"),
            created: vec![ChildKind::Deployment],
            source: ClientError::api_rejected(403, "quota exceeded"),
        };
        let rendered = err.to_string();
        assert!(rendered.contains("Service 'web1'"));
        assert!(rendered.contains("Deployment"));
        assert!(rendered.contains("quota exceeded"));
    }

    #[test]
    fn client_error_is_reachable_through_wrappers() {
        let err = OperatorError::from(ReconcileError::PatchFailed {
            name: String::from("web1"),
            source: ClientError::network("connection refused"),
        });
        assert!(matches!(
            err.client_error(),
            Some(ClientError::Network { .. })
        ));
    }
}

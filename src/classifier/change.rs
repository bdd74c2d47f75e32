//! Typed change-set over the watched spec fields.
//!
//! Change records arrive as raw (path, old, new) triples. Rather than
//! membership-testing tuples, the records are folded into one named field
//! per watched path, which keeps the classifier insensitive to record
//! ordering and shape and makes every case directly testable.

use serde_json::Value;

/// Watched path: replica count.
pub const PATH_REPLICAS: &str = "spec.replicas";

/// Watched path: container image.
pub const PATH_IMAGE: &str = "spec.image";

/// Watched path: container/service port.
pub const PATH_PORT: &str = "spec.port";

/// A single field-level change as delivered by the event substrate.
#[derive(Debug, Clone, PartialEq)]
pub struct ChangeRecord {
    /// Dotted field path (e.g. `spec.replicas`).
    pub path: String,
    /// Value before the change, absent if the field was added.
    pub old: Option<Value>,
    /// Value after the change, absent if the field was removed.
    pub new: Option<Value>,
}

impl ChangeRecord {
    /// Creates a new change record.
    #[must_use]
    pub fn new(path: impl Into<String>, old: Option<Value>, new: Option<Value>) -> Self {
        Self {
            path: path.into(),
            old,
            new,
        }
    }

    /// Returns true if old and new are actually distinct.
    #[must_use]
    pub fn is_distinct(&self) -> bool {
        self.old != self.new
    }
}

/// Old/new pair for a single watched field.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FieldChange<T> {
    /// Value before the change.
    pub old: Option<T>,
    /// Value after the change.
    pub new: Option<T>,
}

/// The watched fields that changed in one update event.
///
/// Each field is `Some` only when a change record for its path carried
/// distinct old/new values. Everything else in the records is ignored;
/// status-only updates therefore produce an empty set.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ChangeSet {
    /// Change to `spec.replicas`, if any.
    pub replicas: Option<FieldChange<i32>>,
    /// Change to `spec.image`, if any.
    pub image: Option<FieldChange<String>>,
    /// Change to `spec.port`, if any.
    pub port: Option<FieldChange<i32>>,
}

impl ChangeSet {
    /// Folds an ordered sequence of change records into a typed change-set.
    ///
    /// Later records for the same path win. Records whose old and new
    /// values are equal are not changes and are dropped.
    #[must_use]
    pub fn from_records(records: &[ChangeRecord]) -> Self {
        let mut set = Self::default();

        for record in records {
            if !record.is_distinct() {
                continue;
            }
            match record.path.as_str() {
                PATH_REPLICAS => {
                    set.replicas = Some(FieldChange {
                        old: record.old.as_ref().and_then(as_i32),
                        new: record.new.as_ref().and_then(as_i32),
                    });
                }
                PATH_IMAGE => {
                    set.image = Some(FieldChange {
                        old: record.old.as_ref().and_then(as_string),
                        new: record.new.as_ref().and_then(as_string),
                    });
                }
                PATH_PORT => {
                    set.port = Some(FieldChange {
                        old: record.old.as_ref().and_then(as_i32),
                        new: record.new.as_ref().and_then(as_i32),
                    });
                }
                _ => {}
            }
        }

        set
    }

    /// Returns true if none of the watched fields changed.
    #[must_use]
    pub const fn is_empty(&self) -> bool {
        self.replicas.is_none() && self.image.is_none() && self.port.is_none()
    }

    /// Names of the fields that changed, for diagnostics.
    #[must_use]
    pub fn changed_paths(&self) -> Vec<&'static str> {
        let mut paths = Vec::new();
        if self.replicas.is_some() {
            paths.push(PATH_REPLICAS);
        }
        if self.image.is_some() {
            paths.push(PATH_IMAGE);
        }
        if self.port.is_some() {
            paths.push(PATH_PORT);
        }
        paths
    }
}

fn as_i32(value: &Value) -> Option<i32> {
    value.as_i64().and_then(|n| i32::try_from(n).ok())
}

fn as_string(value: &Value) -> Option<String> {
    value.as_str().map(String::from)
}

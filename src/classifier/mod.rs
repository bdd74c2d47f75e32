//! Change classification for update events.
//!
//! The event substrate delivers an ordered list of field-level change
//! records. This module narrows them to the three watched spec fields and
//! derives the minimal Deployment patch for whatever actually changed.

mod change;
mod patch;

pub use change::{ChangeRecord, ChangeSet, FieldChange, PATH_IMAGE, PATH_PORT, PATH_REPLICAS};
pub use patch::DeploymentPatch;

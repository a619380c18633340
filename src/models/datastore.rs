//! Datastore snapshot returned to the dashboard on bootstrap.

use serde::{Deserialize, Serialize};

use super::{Lead, Notification};

/// Everything the dashboard needs in one round trip, already filtered to what
/// the acting user is allowed to see.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Datastore {
    pub schema_version: i32,
    pub generated_at: String,
    pub revision_id: i64,
    pub leads: Vec<Lead>,
    pub notifications: Vec<Notification>,
}

/// Revision information for change detection.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RevisionInfo {
    pub revision_id: i64,
    pub generated_at: String,
}

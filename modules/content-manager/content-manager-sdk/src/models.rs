use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Body of a bulk delete request.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct BulkDeleteInput {
    pub ids: Vec<Uuid>,
}

/// Outcome of a bulk delete: how many records were removed.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct BulkDeleteResult {
    pub count: u64,
}

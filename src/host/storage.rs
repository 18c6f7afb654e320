// Project persistence interface - code text keyed by name, routed to local
// or cloud storage by the host

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Where a stored project lives.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum StorageKind {
    Local,
    Cloud,
}

/// One entry in a project listing.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProjectMeta {
    pub name: String,
    pub updated_at: DateTime<Utc>,
    pub storage: StorageKind,
}

#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    #[error("project `{0}` not found")]
    NotFound(String),

    #[error("storage backend error: {0}")]
    Backend(String),
}

/// Save/load/list/delete of project code text.
pub trait ProjectStore {
    fn save(&mut self, name: &str, code: &str) -> Result<(), StoreError>;
    fn load(&self, name: &str) -> Result<String, StoreError>;

    /// All stored projects, newest first.
    fn list(&self) -> Result<Vec<ProjectMeta>, StoreError>;

    fn delete(&mut self, name: &str) -> Result<(), StoreError>;
}

use serde::{Deserialize, Serialize};

/// Opaque options bag forwarded verbatim to the entity store.
///
/// The recognized keys are defined by the store implementation.
pub type Params = serde_json::Map<String, serde_json::Value>;

/// Options used when loading a single entity by identifier.
///
/// By default soft-deleted records are visible and no store params are set.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LoadOptions {
    #[serde(default)]
    pub params: Params,
    #[serde(default = "include_deleted_default")]
    pub include_deleted: bool,
}

// TODO: confirm with product whether soft-deleted records should stay visible by default
fn include_deleted_default() -> bool {
    true
}

impl Default for LoadOptions {
    fn default() -> Self {
        Self {
            params: Params::new(),
            include_deleted: include_deleted_default(),
        }
    }
}

impl LoadOptions {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_param(mut self, key: impl Into<String>, value: impl Into<serde_json::Value>) -> Self {
        self.params.insert(key.into(), value.into());
        self
    }

    pub fn with_params(mut self, params: Params) -> Self {
        self.params = params;
        self
    }

    /// Excludes soft-deleted records from the lookup.
    pub fn hide_deleted(mut self) -> Self {
        self.include_deleted = false;
        self
    }
}

//! Index registry configuration

use serde::{Deserialize, Serialize};

/// What Create Index does when the name is already registered
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DuplicateNamePolicy {
    /// Fail with a conflict; the existing index is untouched
    #[default]
    Reject,
    /// Last writer wins; the previous index is dropped from the registry
    Replace,
}

/// Index registry configuration
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct RegistryConfig {
    #[serde(default)]
    pub duplicate_names: DuplicateNamePolicy,
}

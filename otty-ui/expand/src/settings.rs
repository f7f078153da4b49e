use serde::{Deserialize, Serialize};

use crate::errors::ExpandError;
use crate::key::RowKey;
use crate::row::DEFAULT_CHILDREN_COLUMN;

/// Data-only part of the expansion configuration.
///
/// Callbacks cannot be serialized, so they are attached to
/// [`ExpandOptions`](crate::ExpandOptions) after loading.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ExpandSettings {
    pub default_expanded_row_keys: Option<Vec<RowKey>>,
    pub default_expand_all_rows: bool,
    pub children_column_name: String,
    pub expanded_row_keys: Option<Vec<RowKey>>,
}

impl Default for ExpandSettings {
    fn default() -> Self {
        Self {
            default_expanded_row_keys: None,
            default_expand_all_rows: false,
            children_column_name: String::from(DEFAULT_CHILDREN_COLUMN),
            expanded_row_keys: None,
        }
    }
}

impl ExpandSettings {
    /// Parse settings from a JSON object. Missing members take defaults.
    pub fn from_json(text: &str) -> Result<Self, ExpandError> {
        Ok(serde_json::from_str(text)?)
    }
}

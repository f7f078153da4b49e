use thiserror::Error;

/// Errors emitted while loading expansion settings.
#[derive(Debug, Error)]
pub enum ExpandError {
    #[error("expansion settings JSON failed: {0}")]
    Json(#[from] serde_json::Error),
}

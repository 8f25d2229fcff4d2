//! Error type shared by the registry, configuration and world API.

use thiserror::Error;

/// Everything that can go wrong in the simulation core.
///
/// None of these are fatal: callers decide whether to skip, log or abort.
#[derive(Debug, Error)]
pub enum SimError {
    /// Every slot of the fixed-capacity registry has been handed out.
    #[error("entity capacity exhausted ({capacity} slots allocated)")]
    CapacityExhausted { capacity: usize },

    /// A handle outside `[0, entity_count)` was used.
    #[error("invalid entity handle {index} (entity count {count})")]
    InvalidHandle { index: usize, count: usize },

    #[error("invalid configuration: {0}")]
    InvalidConfig(String),

    #[error("json: {0}")]
    Json(#[from] serde_json::Error),
}

pub type Result<T> = std::result::Result<T, SimError>;

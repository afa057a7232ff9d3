//! Error taxonomy for autosave components.
//!
//! ERROR HANDLING
//! ==============
//! Nothing here is fatal. Saver failures are routed to the configured error
//! hook (or the log); draft failures are logged and handed back as `Result`
//! so the host can decide whether to surface them.

// =============================================================================
// STORE ERRORS
// =============================================================================

/// Failure reported by a [`crate::store::KvStore`] implementation.
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    /// Underlying file or device I/O failed.
    #[error("store io failed: {0}")]
    Io(#[from] std::io::Error),

    /// The backing file exists but does not hold a JSON object of strings.
    #[error("store contents are corrupt: {0}")]
    Corrupt(String),

    /// Writing would push the store past its byte quota.
    #[error("store quota exceeded (limit {limit} bytes, requested {requested} bytes)")]
    QuotaExceeded { limit: usize, requested: usize },
}

// =============================================================================
// AUTOSAVE ERRORS
// =============================================================================

/// Every failure an autosave component can surface.
#[derive(Debug, thiserror::Error)]
pub enum AutosaveError {
    /// A value could not be encoded, or stored text could not be decoded.
    #[error("serialization failed: {0}")]
    Serialization(#[from] serde_json::Error),

    /// The key-value store rejected a read, write, or remove.
    #[error("persistence failed: {0}")]
    Persistence(#[from] StoreError),

    /// The caller-supplied save operation reported failure.
    #[error("save operation failed: {0}")]
    SaveOperation(String),

    /// `observe` ran outside a Tokio runtime, so no timer could be scheduled.
    #[error("no async runtime available to schedule the save")]
    RuntimeUnavailable,
}

impl AutosaveError {
    /// Build a [`AutosaveError::SaveOperation`] from any displayable reason.
    pub fn save_failed(reason: impl std::fmt::Display) -> Self {
        Self::SaveOperation(reason.to_string())
    }
}

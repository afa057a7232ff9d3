//! Draft store — recover and explicitly save a locally persisted draft.
//!
//! DESIGN
//! ======
//! The stored draft is read exactly once, at construction. Absent keys,
//! unreadable stores, and corrupt text all fall back to the caller's
//! default. `save` and `clear` take effect immediately: there is no
//! debounce and no in-flight tracking.
//!
//! ERROR HANDLING
//! ==============
//! The held value changes only after the store accepts the write or remove.
//! On failure the previous value is kept, the error is logged, and it is
//! returned so the host can surface it. The store itself may be left in
//! whatever state its own failure semantics produce.

use std::sync::Arc;

use serde::Serialize;
use serde::de::DeserializeOwned;
use tracing::{debug, warn};

use crate::codec;
use crate::error::AutosaveError;
use crate::store::KvStore;

/// A recoverable draft held in memory and mirrored to a store key.
pub struct DraftStore<T> {
    store: Arc<dyn KvStore>,
    key: String,
    default: T,
    current: T,
}

impl<T> DraftStore<T>
where
    T: Clone + Serialize + DeserializeOwned,
{
    /// Load the draft under `key`, or start from `default`.
    pub fn init(store: Arc<dyn KvStore>, key: impl Into<String>, default: T) -> Self {
        let key = key.into();
        let current = load_or_default(store.as_ref(), &key, &default);
        Self { store, key, default, current }
    }

    /// Write `value` to the store, then hold it.
    ///
    /// # Errors
    ///
    /// Returns the encode or store failure; the held value is unchanged.
    pub fn save(&mut self, value: T) -> Result<(), AutosaveError> {
        let written = codec::encode(&value).and_then(|raw| self.store.write(&self.key, &raw).map_err(AutosaveError::from));
        if let Err(e) = written {
            warn!(key = %self.key, error = %e, "draft save failed");
            return Err(e);
        }
        self.current = value;
        debug!(key = %self.key, "draft saved");
        Ok(())
    }

    /// Remove the stored draft, then reset to the default.
    ///
    /// # Errors
    ///
    /// Returns the store failure; the held value is unchanged.
    pub fn clear(&mut self) -> Result<(), AutosaveError> {
        if let Err(e) = self.store.remove(&self.key) {
            warn!(key = %self.key, error = %e, "draft clear failed");
            return Err(e.into());
        }
        self.current = self.default.clone();
        debug!(key = %self.key, "draft cleared");
        Ok(())
    }

    #[must_use]
    pub fn value(&self) -> &T {
        &self.current
    }

    #[must_use]
    pub fn default_value(&self) -> &T {
        &self.default
    }

    #[must_use]
    pub fn key(&self) -> &str {
        &self.key
    }
}

fn load_or_default<T>(store: &dyn KvStore, key: &str, default: &T) -> T
where
    T: Clone + DeserializeOwned,
{
    let raw = match store.read(key) {
        Ok(Some(raw)) => raw,
        Ok(None) => return default.clone(),
        Err(e) => {
            warn!(key, error = %e, "draft read failed; using default");
            return default.clone();
        }
    };
    match codec::decode(&raw) {
        Ok(value) => {
            debug!(key, "draft restored");
            value
        }
        Err(e) => {
            warn!(key, error = %e, "stored draft is corrupt; using default");
            default.clone()
        }
    }
}

#[cfg(test)]
#[path = "draft_test.rs"]
mod tests;

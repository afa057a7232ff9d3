//! Form persister — debounced writes of form state to a key-value store.
//!
//! SYSTEM CONTEXT
//! ==============
//! Pages feed their current form state into [`FormPersister::observe`] on
//! every edit. After the quiet period the encoded state is written under a
//! fixed key, so a reload can restore it through a `DraftStore`.

use std::sync::Arc;
use std::time::Duration;

use serde::Serialize;
use tokio::sync::watch;
use tracing::error;

use crate::codec;
use crate::error::AutosaveError;
use crate::saver::{DebouncedSaver, PendingSave, SaveStatus, SaverConfig, SaverPhase};
use crate::store::KvStore;

/// Debounced saver bound to one store key.
pub struct FormPersister<T: Clone> {
    key: String,
    saver: DebouncedSaver<T>,
    config: SaverConfig<T>,
}

impl<T> FormPersister<T>
where
    T: Clone + Serialize + Send + Sync + 'static,
{
    /// Persist observed values to `store` under `key`.
    pub fn new(store: Arc<dyn KvStore>, key: impl Into<String>) -> Self {
        let key = key.into();
        let save_key = key.clone();
        let error_key = key.clone();
        let config = SaverConfig::new(move |data: T| {
            let store = Arc::clone(&store);
            let key = save_key.clone();
            async move {
                let raw = codec::encode(&data)?;
                store.write(&key, &raw)?;
                Ok::<(), AutosaveError>(())
            }
        })
        .with_on_error(move |e| error!(key = %error_key, error = %e, "save failed for {error_key}"));

        Self { saver: DebouncedSaver::new(key.clone()), key, config }
    }

    #[must_use]
    pub fn with_delay(mut self, delay: Duration) -> Self {
        self.config = self.config.with_delay(delay);
        self
    }

    /// Skip observations for which `check` returns true.
    #[must_use]
    pub fn with_empty_check<F>(mut self, check: F) -> Self
    where
        F: Fn(&T) -> bool + Send + Sync + 'static,
    {
        self.config = self.config.with_empty_check(check);
        self
    }

    pub fn set_enabled(&mut self, enabled: bool) {
        self.config.enabled = enabled;
    }

    #[must_use]
    pub fn is_enabled(&self) -> bool {
        self.config.enabled
    }

    #[must_use]
    pub fn key(&self) -> &str {
        &self.key
    }

    /// Offer the current form state. See [`DebouncedSaver::observe`].
    pub fn observe(&self, data: T) -> Option<PendingSave<T>> {
        self.saver.observe(data, &self.config)
    }

    pub fn teardown(&self) {
        self.saver.teardown();
    }

    #[must_use]
    pub fn is_saving(&self) -> bool {
        self.saver.is_saving()
    }

    #[must_use]
    pub fn last_saved(&self) -> Option<T> {
        self.saver.last_saved()
    }

    #[must_use]
    pub fn status(&self) -> SaveStatus<T> {
        self.saver.status()
    }

    #[must_use]
    pub fn phase(&self) -> SaverPhase {
        self.saver.phase()
    }

    #[must_use]
    pub fn subscribe(&self) -> watch::Receiver<SaveStatus<T>> {
        self.saver.subscribe()
    }
}

#[cfg(test)]
#[path = "form_test.rs"]
mod tests;

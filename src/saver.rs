//! Debounced saver — persist a changing value once it stops changing.
//!
//! DESIGN
//! ======
//! The host calls [`DebouncedSaver::observe`] with every candidate value.
//! Each observation cancels the previous pending timer and, if the value's
//! encoding differs from the last saved encoding, spawns a one-shot Tokio
//! timer. When a timer expires it first claims itself (it must still be the
//! current pending timer), then runs the save. Claiming detaches the save
//! from the timer, so cancelling a finalizer or re-observing never aborts a
//! save that has already started.
//!
//! STATE MACHINE
//! =============
//! `Idle -> PendingTimer` on a differing value, `PendingTimer -> PendingTimer`
//! on re-observe, `PendingTimer -> Saving` on expiry, `Saving -> Idle` once
//! the save resolves. Expiry while another save is in flight is a no-op.
//! Teardown returns to `Idle` from anywhere without side effects.
//!
//! ERROR HANDLING
//! ==============
//! `last_saved` advances only after a successful save. Failures go to the
//! configured error hook, or to the log when none is set. `is_saving` is
//! reset by a drop guard, so a panicking save or hook cannot wedge the saver.

use std::future::Future;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError, Weak};
use std::time::Duration;

use futures::future::BoxFuture;
use serde::Serialize;
use tokio::sync::watch;
use tokio::task::AbortHandle;
use tracing::{debug, error, trace};

use crate::codec;
use crate::config::{AutosaveSettings, DEFAULT_SAVE_DELAY_MS};
use crate::error::AutosaveError;

/// Future returned by a boxed save operation.
pub type SaveFuture = BoxFuture<'static, Result<(), AutosaveError>>;

type SaveFn<T> = Arc<dyn Fn(T) -> SaveFuture + Send + Sync>;
type ErrorHook = Arc<dyn Fn(&AutosaveError) + Send + Sync>;
type EmptyCheck<T> = Arc<dyn Fn(&T) -> bool + Send + Sync>;

// =============================================================================
// CONFIGURATION
// =============================================================================

/// Per-observation configuration for a [`DebouncedSaver`].
pub struct SaverConfig<T> {
    /// Quiet period between the last observation and the save.
    pub delay: Duration,
    /// Disabled configs never schedule anything.
    pub enabled: bool,
    save: SaveFn<T>,
    on_error: Option<ErrorHook>,
    is_empty: Option<EmptyCheck<T>>,
}

impl<T> Clone for SaverConfig<T> {
    fn clone(&self) -> Self {
        Self {
            delay: self.delay,
            enabled: self.enabled,
            save: Arc::clone(&self.save),
            on_error: self.on_error.clone(),
            is_empty: self.is_empty.clone(),
        }
    }
}

impl<T: 'static> SaverConfig<T> {
    /// Build an enabled config with the default 1000 ms delay.
    pub fn new<F, Fut>(save: F) -> Self
    where
        F: Fn(T) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = Result<(), AutosaveError>> + Send + 'static,
    {
        Self {
            delay: Duration::from_millis(DEFAULT_SAVE_DELAY_MS),
            enabled: true,
            save: Arc::new(move |value| -> SaveFuture { Box::pin(save(value)) }),
            on_error: None,
            is_empty: None,
        }
    }

    /// Build a config whose delay and enabled flag come from `settings`.
    pub fn from_settings<F, Fut>(settings: AutosaveSettings, save: F) -> Self
    where
        F: Fn(T) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = Result<(), AutosaveError>> + Send + 'static,
    {
        Self::new(save)
            .with_delay(settings.delay())
            .with_enabled(settings.enabled)
    }

    #[must_use]
    pub fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = delay;
        self
    }

    #[must_use]
    pub fn with_enabled(mut self, enabled: bool) -> Self {
        self.enabled = enabled;
        self
    }

    /// Route save failures to `hook` instead of the log.
    #[must_use]
    pub fn with_on_error<F>(mut self, hook: F) -> Self
    where
        F: Fn(&AutosaveError) + Send + Sync + 'static,
    {
        self.on_error = Some(Arc::new(hook));
        self
    }

    /// Treat values matching `check` as "nothing to save yet".
    #[must_use]
    pub fn with_empty_check<F>(mut self, check: F) -> Self
    where
        F: Fn(&T) -> bool + Send + Sync + 'static,
    {
        self.is_empty = Some(Arc::new(check));
        self
    }

    fn value_is_empty(&self, value: &T) -> bool {
        self.is_empty.as_ref().is_some_and(|check| check(value))
    }

    fn report(&self, label: &str, err: &AutosaveError) {
        match &self.on_error {
            Some(hook) => hook(err),
            None => error!(saver = %label, error = %err, "autosave failed"),
        }
    }
}

// =============================================================================
// STATUS
// =============================================================================

/// Snapshot of a saver's observable state.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SaveStatus<T> {
    pub is_saving: bool,
    pub last_saved: Option<T>,
}

/// Current state-machine phase.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SaverPhase {
    Idle,
    PendingTimer,
    Saving,
}

// =============================================================================
// SHARED STATE
// =============================================================================

struct PendingTimer {
    generation: u64,
    abort: AbortHandle,
}

struct SaverState<T> {
    pending: Option<PendingTimer>,
    last_saved: Option<T>,
    last_saved_encoded: Option<String>,
    is_saving: bool,
    generation: u64,
}

struct Shared<T> {
    label: String,
    state: Mutex<SaverState<T>>,
    status: watch::Sender<SaveStatus<T>>,
}

impl<T: Clone> Shared<T> {
    fn lock(&self) -> MutexGuard<'_, SaverState<T>> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn publish(&self, state: &SaverState<T>) {
        self.status.send_replace(SaveStatus {
            is_saving: state.is_saving,
            last_saved: state.last_saved.clone(),
        });
    }

    /// Take ownership of the pending slot if `generation` still holds it.
    fn claim_timer(&self, generation: u64) -> bool {
        let mut state = self.lock();
        if state.pending.as_ref().is_some_and(|p| p.generation == generation) {
            state.pending = None;
            true
        } else {
            false
        }
    }

    fn cancel_timer(&self, generation: Option<u64>) -> bool {
        let mut state = self.lock();
        cancel_pending(&mut state, generation)
    }

    fn record_saved(&self, value: T, encoded: String) {
        let mut state = self.lock();
        state.last_saved = Some(value);
        state.last_saved_encoded = Some(encoded);
        self.publish(&state);
    }
}

/// Abort the pending timer; when `generation` is given, only if it matches.
fn cancel_pending<T>(state: &mut SaverState<T>, generation: Option<u64>) -> bool {
    let matches = match (&state.pending, generation) {
        (Some(_), None) => true,
        (Some(p), Some(g)) => p.generation == g,
        (None, _) => false,
    };
    if !matches {
        return false;
    }
    if let Some(pending) = state.pending.take() {
        pending.abort.abort();
    }
    true
}

/// Holds `is_saving` for the duration of one save.
struct SavingGuard<'a, T: Clone> {
    shared: &'a Shared<T>,
}

impl<'a, T: Clone> SavingGuard<'a, T> {
    fn acquire(shared: &'a Shared<T>) -> Option<Self> {
        let mut state = shared.lock();
        if state.is_saving {
            return None;
        }
        state.is_saving = true;
        shared.publish(&state);
        Some(Self { shared })
    }
}

impl<T: Clone> Drop for SavingGuard<'_, T> {
    fn drop(&mut self) {
        let mut state = self.shared.lock();
        state.is_saving = false;
        self.shared.publish(&state);
    }
}

// =============================================================================
// FINALIZER
// =============================================================================

/// Finalizer for one scheduled save, returned by [`DebouncedSaver::observe`].
///
/// Dropping it does nothing; call [`PendingSave::cancel`] to discard the
/// scheduled save before it fires.
pub struct PendingSave<T> {
    shared: Weak<Shared<T>>,
    generation: u64,
}

impl<T: Clone> PendingSave<T> {
    /// Cancel this timer if it has not fired. Returns whether it was cancelled.
    ///
    /// A save that already started is never interrupted.
    pub fn cancel(&self) -> bool {
        self.shared
            .upgrade()
            .is_some_and(|shared| shared.cancel_timer(Some(self.generation)))
    }
}

// =============================================================================
// DEBOUNCED SAVER
// =============================================================================

/// Debounce-and-guard controller for one logical thing being saved.
pub struct DebouncedSaver<T: Clone> {
    shared: Arc<Shared<T>>,
}

impl<T> DebouncedSaver<T>
where
    T: Clone + Serialize + Send + Sync + 'static,
{
    /// Create an idle saver. `label` tags every log event it emits.
    pub fn new(label: impl Into<String>) -> Self {
        let (status, _) = watch::channel(SaveStatus { is_saving: false, last_saved: None });
        Self {
            shared: Arc::new(Shared {
                label: label.into(),
                state: Mutex::new(SaverState {
                    pending: None,
                    last_saved: None,
                    last_saved_encoded: None,
                    is_saving: false,
                    generation: 0,
                }),
                status,
            }),
        }
    }

    #[must_use]
    pub fn label(&self) -> &str {
        &self.shared.label
    }

    /// Offer a new candidate value.
    ///
    /// Returns a finalizer for the scheduled save, or `None` when nothing was
    /// scheduled (disabled, empty, unchanged, or unencodable). Outside a Tokio
    /// runtime nothing is scheduled and [`AutosaveError::RuntimeUnavailable`]
    /// is reported through the error hook.
    pub fn observe(&self, value: T, config: &SaverConfig<T>) -> Option<PendingSave<T>> {
        let label = &self.shared.label;
        if !config.enabled || config.value_is_empty(&value) {
            trace!(saver = %label, enabled = config.enabled, "observation skipped");
            return None;
        }

        let mut state = self.shared.lock();
        cancel_pending(&mut state, None);

        let encoded = match codec::encode(&value) {
            Ok(encoded) => encoded,
            Err(e) => {
                drop(state);
                config.report(label, &e);
                return None;
            }
        };
        if state.last_saved_encoded.as_deref() == Some(encoded.as_str()) {
            trace!(saver = %label, "value unchanged since last save");
            return None;
        }

        let Ok(runtime) = tokio::runtime::Handle::try_current() else {
            drop(state);
            config.report(label, &AutosaveError::RuntimeUnavailable);
            return None;
        };

        state.generation += 1;
        let generation = state.generation;
        let shared = Arc::clone(&self.shared);
        let task_config = config.clone();
        let task = runtime.spawn(async move {
            tokio::time::sleep(task_config.delay).await;
            if !shared.claim_timer(generation) {
                return;
            }
            attempt_save(&shared, value, encoded, &task_config).await;
        });

        // The timer cannot claim itself before this store: it needs the lock we hold.
        state.pending = Some(PendingTimer { generation, abort: task.abort_handle() });
        debug!(saver = %label, generation, delay = ?config.delay, "save scheduled");

        Some(PendingSave { shared: Arc::downgrade(&self.shared), generation })
    }
}

impl<T: Clone> DebouncedSaver<T> {
    /// Cancel any pending timer. An in-flight save is left to finish.
    pub fn teardown(&self) {
        if self.shared.cancel_timer(None) {
            debug!(saver = %self.shared.label, "pending save discarded on teardown");
        }
    }

    #[must_use]
    pub fn is_saving(&self) -> bool {
        self.shared.lock().is_saving
    }

    #[must_use]
    pub fn last_saved(&self) -> Option<T> {
        self.shared.lock().last_saved.clone()
    }

    #[must_use]
    pub fn status(&self) -> SaveStatus<T> {
        let state = self.shared.lock();
        SaveStatus { is_saving: state.is_saving, last_saved: state.last_saved.clone() }
    }

    #[must_use]
    pub fn phase(&self) -> SaverPhase {
        let state = self.shared.lock();
        if state.is_saving {
            SaverPhase::Saving
        } else if state.pending.as_ref().is_some_and(|p| !p.abort.is_finished()) {
            SaverPhase::PendingTimer
        } else {
            SaverPhase::Idle
        }
    }

    /// Receive a fresh [`SaveStatus`] every time `is_saving` or `last_saved` changes.
    #[must_use]
    pub fn subscribe(&self) -> watch::Receiver<SaveStatus<T>> {
        self.shared.status.subscribe()
    }
}

impl<T: Clone> Drop for DebouncedSaver<T> {
    fn drop(&mut self) {
        self.teardown();
    }
}

async fn attempt_save<T: Clone + 'static>(shared: &Shared<T>, value: T, encoded: String, config: &SaverConfig<T>) {
    let Some(_guard) = SavingGuard::acquire(shared) else {
        debug!(saver = %shared.label, "save already in flight; skipping");
        return;
    };

    match (config.save)(value.clone()).await {
        Ok(()) => {
            shared.record_saved(value, encoded);
            debug!(saver = %shared.label, "save completed");
        }
        Err(e) => config.report(&shared.label, &e),
    }
}

#[cfg(test)]
#[path = "saver_test.rs"]
mod tests;

//! Debounced autosave for in-memory editing state.
//!
//! [`DebouncedSaver`] waits for a value to stop changing before saving it,
//! never runs two saves at once, and skips values identical to the last
//! saved one. [`FormPersister`] points that machinery at a [`KvStore`] key;
//! [`DraftStore`] recovers a draft from the same kind of store and saves or
//! clears it directly.

pub mod codec;
pub mod config;
pub mod draft;
pub mod error;
pub mod form;
pub mod saver;
pub mod store;

pub use config::AutosaveSettings;
pub use draft::DraftStore;
pub use error::{AutosaveError, StoreError};
pub use form::FormPersister;
pub use saver::{DebouncedSaver, PendingSave, SaveStatus, SaverConfig, SaverPhase};
pub use store::{FileStore, KvStore, MemoryStore};

//! Storage backends behind one trait.

use std::cell::{Cell, RefCell};

use thiserror::Error;

/// Completion callback for a storage request. Backends may call it
/// synchronously or later from a host event.
pub type Completion<T> = Box<dyn FnOnce(Result<T, StorageError>)>;

#[derive(Debug, Error)]
pub enum StorageError {
    #[error("{0} is not available")]
    Unavailable(&'static str),

    #[error("{store} failed: {message}")]
    Backend {
        store: &'static str,
        message: String,
    },

    #[error("save payload is corrupt: {0}")]
    Corrupt(#[from] serde_json::Error),
}

impl StorageError {
    pub fn backend(store: &'static str, message: impl Into<String>) -> Self {
        StorageError::Backend {
            store,
            message: message.into(),
        }
    }
}

/// A single-slot key/value store holding the serialized save.
pub trait SaveStore {
    /// Short name for log lines.
    fn label(&self) -> &'static str;

    fn is_available(&self) -> bool;

    fn put(&self, payload: String, done: Completion<()>);

    /// Completes with `None` when nothing has been saved yet.
    fn get(&self, done: Completion<Option<String>>);
}

/// In-memory store for native hosts and tests. Completes synchronously.
pub struct MemoryStore {
    label: &'static str,
    slot: RefCell<Option<String>>,
    available: Cell<bool>,
    failing: Cell<bool>,
    writes: Cell<u32>,
}

impl MemoryStore {
    pub fn new(label: &'static str) -> Self {
        Self {
            label,
            slot: RefCell::new(None),
            available: Cell::new(true),
            failing: Cell::new(false),
            writes: Cell::new(0),
        }
    }

    pub fn with_payload(label: &'static str, payload: &str) -> Self {
        let store = Self::new(label);
        *store.slot.borrow_mut() = Some(payload.to_string());
        store
    }

    pub fn set_available(&self, available: bool) {
        self.available.set(available);
    }

    /// Make every subsequent request fail with a backend error.
    pub fn set_failing(&self, failing: bool) {
        self.failing.set(failing);
    }

    pub fn payload(&self) -> Option<String> {
        self.slot.borrow().clone()
    }

    /// Successful writes so far.
    pub fn writes(&self) -> u32 {
        self.writes.get()
    }

    fn check(&self) -> Result<(), StorageError> {
        if !self.available.get() {
            return Err(StorageError::Unavailable(self.label));
        }
        if self.failing.get() {
            return Err(StorageError::backend(self.label, "simulated failure"));
        }
        Ok(())
    }
}

impl SaveStore for MemoryStore {
    fn label(&self) -> &'static str {
        self.label
    }

    fn is_available(&self) -> bool {
        self.available.get()
    }

    fn put(&self, payload: String, done: Completion<()>) {
        let result = self.check().map(|()| {
            *self.slot.borrow_mut() = Some(payload);
            self.writes.set(self.writes.get() + 1);
        });
        done(result);
    }

    fn get(&self, done: Completion<Option<String>>) {
        let result = self.check().map(|()| self.slot.borrow().clone());
        done(result);
    }
}

//! Key-value persistence seam.
//!
//! The ledger only ever needs `get`/`set`/`remove` on a single key, so the
//! transport is hidden behind [`PersistentStore`]. Writes are synchronous:
//! when `set` returns `Ok`, the next `get` observes the new value.

use std::cell::{Cell, RefCell};
use std::collections::HashMap;

use crate::error::StorageError;

pub trait PersistentStore {
    fn get(&self, key: &str) -> Result<Option<String>, StorageError>;
    fn set(&self, key: &str, value: &str) -> Result<(), StorageError>;
    fn remove(&self, key: &str) -> Result<(), StorageError>;
}

impl<S: PersistentStore + ?Sized> PersistentStore for &S {
    fn get(&self, key: &str) -> Result<Option<String>, StorageError> {
        (**self).get(key)
    }

    fn set(&self, key: &str, value: &str) -> Result<(), StorageError> {
        (**self).set(key, value)
    }

    fn remove(&self, key: &str) -> Result<(), StorageError> {
        (**self).remove(key)
    }
}

/// In-process store for tests and embedding.
///
/// `set_offline(true)` makes every call fail with
/// [`StorageError::Unavailable`], which is how tests exercise the
/// log-and-continue path. `set_read_only(true)` fails only writes.
#[derive(Debug, Default)]
pub struct MemoryStore {
    entries: RefCell<HashMap<String, String>>,
    offline: Cell<bool>,
    read_only: Cell<bool>,
    writes: Cell<usize>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set_offline(&self, offline: bool) {
        self.offline.set(offline);
    }

    pub fn set_read_only(&self, read_only: bool) {
        self.read_only.set(read_only);
    }

    /// Number of successful `set`/`remove` calls so far.
    pub fn write_count(&self) -> usize {
        self.writes.get()
    }

    fn check_online(&self) -> Result<(), StorageError> {
        if self.offline.get() {
            return Err(StorageError::Unavailable("memory store is offline".into()));
        }
        Ok(())
    }

    fn check_writable(&self) -> Result<(), StorageError> {
        self.check_online()?;
        if self.read_only.get() {
            return Err(StorageError::Unavailable("memory store is read-only".into()));
        }
        Ok(())
    }
}

impl PersistentStore for MemoryStore {
    fn get(&self, key: &str) -> Result<Option<String>, StorageError> {
        self.check_online()?;
        Ok(self.entries.borrow().get(key).cloned())
    }

    fn set(&self, key: &str, value: &str) -> Result<(), StorageError> {
        self.check_writable()?;
        self.entries
            .borrow_mut()
            .insert(key.to_string(), value.to_string());
        self.writes.set(self.writes.get() + 1);
        Ok(())
    }

    fn remove(&self, key: &str) -> Result<(), StorageError> {
        self.check_writable()?;
        self.entries.borrow_mut().remove(key);
        self.writes.set(self.writes.get() + 1);
        Ok(())
    }
}

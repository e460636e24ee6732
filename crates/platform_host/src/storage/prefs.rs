//! Preference storage: raw JSON text per key.
//!
//! Typed values are encoded by their owners; the store only moves strings.

use std::{
    cell::{Cell, RefCell},
    collections::BTreeMap,
    rc::Rc,
};

use futures::future::LocalBoxFuture;

/// Boxed future returned by [`PrefsStore`] methods.
pub type PrefsStoreFuture<'a, T> = LocalBoxFuture<'a, T>;

/// Host service for preference values.
pub trait PrefsStore {
    /// Raw JSON stored under `key`, if any.
    fn load_pref<'a>(
        &'a self,
        key: &'a str,
    ) -> PrefsStoreFuture<'a, Result<Option<String>, String>>;

    /// Stores `raw_json` under `key`, replacing any earlier value.
    fn save_pref<'a>(
        &'a self,
        key: &'a str,
        raw_json: &'a str,
    ) -> PrefsStoreFuture<'a, Result<(), String>>;
}

#[derive(Debug, Clone, Copy, Default)]
/// Store for hosts without preference storage: nothing is kept.
pub struct NoopPrefsStore;

impl PrefsStore for NoopPrefsStore {
    fn load_pref<'a>(
        &'a self,
        _key: &'a str,
    ) -> PrefsStoreFuture<'a, Result<Option<String>, String>> {
        Box::pin(async { Ok(None) })
    }

    fn save_pref<'a>(
        &'a self,
        _key: &'a str,
        _raw_json: &'a str,
    ) -> PrefsStoreFuture<'a, Result<(), String>> {
        Box::pin(async { Ok(()) })
    }
}

#[derive(Debug, Clone, Default)]
/// Shared in-memory store. Clones see the same entries, so a test can keep one clone and hand
/// another to the shell.
pub struct MemoryPrefsStore {
    entries: Rc<RefCell<BTreeMap<String, String>>>,
    writes: Rc<Cell<usize>>,
}

impl MemoryPrefsStore {
    /// Store seeded with one raw entry; seeding is not counted as a write.
    pub fn with_entry(key: impl Into<String>, raw_json: impl Into<String>) -> Self {
        let store = Self::default();
        store
            .entries
            .borrow_mut()
            .insert(key.into(), raw_json.into());
        store
    }

    /// Raw JSON currently stored under `key`.
    pub fn raw(&self, key: &str) -> Option<String> {
        self.entries.borrow().get(key).cloned()
    }

    /// Number of `save_pref` calls served.
    pub fn write_count(&self) -> usize {
        self.writes.get()
    }
}

impl PrefsStore for MemoryPrefsStore {
    fn load_pref<'a>(
        &'a self,
        key: &'a str,
    ) -> PrefsStoreFuture<'a, Result<Option<String>, String>> {
        Box::pin(async move { Ok(self.raw(key)) })
    }

    fn save_pref<'a>(
        &'a self,
        key: &'a str,
        raw_json: &'a str,
    ) -> PrefsStoreFuture<'a, Result<(), String>> {
        Box::pin(async move {
            self.entries
                .borrow_mut()
                .insert(key.to_string(), raw_json.to_string());
            self.writes.set(self.writes.get() + 1);
            Ok(())
        })
    }
}

//! Launch-assist (jump list) metadata contracts and adapters.
//!
//! The shell only touches this metadata once, during boot: it loads the current list, hides the
//! host's system-managed group, and saves the list back.

use std::{
    cell::{Cell, RefCell},
    rc::Rc,
};

use futures::future::LocalBoxFuture;
use serde::{Deserialize, Serialize};

/// Object-safe boxed future used by [`LaunchAssistStore`] async methods.
pub type LaunchAssistFuture<'a, T> = LocalBoxFuture<'a, T>;

/// System-managed group the host appends to the launch list.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum SystemGroupKind {
    /// No system group is shown.
    None,
    /// Recently used items.
    #[default]
    Recent,
    /// Frequently used items.
    Frequent,
}

/// One app-authored launch entry.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LaunchAssistItem {
    /// Argument string handed back in the launch args when the entry is picked.
    pub arguments: String,
    /// User-visible label.
    pub display_name: String,
    /// Optional group heading.
    #[serde(default)]
    pub group_name: Option<String>,
}

/// Launch-assist metadata as stored by the host.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct LaunchAssistMetadata {
    /// System-managed group shown alongside app items.
    pub system_group: SystemGroupKind,
    /// App-authored items.
    #[serde(default)]
    pub items: Vec<LaunchAssistItem>,
}

/// Host service for the launch-assist list.
pub trait LaunchAssistStore {
    /// Whether the host supports a launch-assist list at all.
    fn is_supported(&self) -> bool;

    /// Loads the current metadata.
    fn load<'a>(&'a self) -> LaunchAssistFuture<'a, Result<LaunchAssistMetadata, String>>;

    /// Replaces the stored metadata.
    fn save<'a>(
        &'a self,
        metadata: &'a LaunchAssistMetadata,
    ) -> LaunchAssistFuture<'a, Result<(), String>>;
}

#[derive(Debug, Clone, Copy, Default)]
/// Launch-assist store for hosts without the feature.
pub struct NoopLaunchAssistStore;

impl LaunchAssistStore for NoopLaunchAssistStore {
    fn is_supported(&self) -> bool {
        false
    }

    fn load<'a>(&'a self) -> LaunchAssistFuture<'a, Result<LaunchAssistMetadata, String>> {
        Box::pin(async { Ok(LaunchAssistMetadata::default()) })
    }

    fn save<'a>(
        &'a self,
        _metadata: &'a LaunchAssistMetadata,
    ) -> LaunchAssistFuture<'a, Result<(), String>> {
        Box::pin(async { Ok(()) })
    }
}

#[derive(Debug, Clone, Default)]
/// In-memory launch-assist store; counts saves so callers can verify write-back.
pub struct MemoryLaunchAssistStore {
    inner: Rc<RefCell<LaunchAssistMetadata>>,
    saves: Rc<Cell<usize>>,
}

impl MemoryLaunchAssistStore {
    /// Creates a store seeded with `metadata`.
    pub fn with_metadata(metadata: LaunchAssistMetadata) -> Self {
        Self {
            inner: Rc::new(RefCell::new(metadata)),
            saves: Rc::default(),
        }
    }

    /// Returns the stored metadata.
    pub fn snapshot(&self) -> LaunchAssistMetadata {
        self.inner.borrow().clone()
    }

    /// Number of completed saves.
    pub fn save_count(&self) -> usize {
        self.saves.get()
    }
}

impl LaunchAssistStore for MemoryLaunchAssistStore {
    fn is_supported(&self) -> bool {
        true
    }

    fn load<'a>(&'a self) -> LaunchAssistFuture<'a, Result<LaunchAssistMetadata, String>> {
        Box::pin(async move { Ok(self.inner.borrow().clone()) })
    }

    fn save<'a>(
        &'a self,
        metadata: &'a LaunchAssistMetadata,
    ) -> LaunchAssistFuture<'a, Result<(), String>> {
        Box::pin(async move {
            *self.inner.borrow_mut() = metadata.clone();
            self.saves.set(self.saves.get() + 1);
            Ok(())
        })
    }
}

#[cfg(test)]
mod tests {
    use futures::executor::block_on;
    use pretty_assertions::assert_eq;
    use serde_json::json;

    use super::*;

    #[test]
    fn metadata_defaults_to_recent_group_and_no_items() {
        let parsed: LaunchAssistMetadata =
            serde_json::from_value(json!({"system_group": "frequent"})).expect("parse");
        assert_eq!(parsed.system_group, SystemGroupKind::Frequent);
        assert!(parsed.items.is_empty());
        assert_eq!(
            LaunchAssistMetadata::default().system_group,
            SystemGroupKind::Recent
        );
    }

    #[test]
    fn memory_store_round_trips_and_counts_saves() {
        let store = MemoryLaunchAssistStore::default();
        let store_obj: &dyn LaunchAssistStore = &store;
        let metadata = LaunchAssistMetadata {
            system_group: SystemGroupKind::None,
            items: vec![LaunchAssistItem {
                arguments: "open:notes.txt".to_string(),
                display_name: "notes.txt".to_string(),
                group_name: None,
            }],
        };

        block_on(store_obj.save(&metadata)).expect("save");
        assert_eq!(block_on(store_obj.load()).expect("load"), metadata);
        assert_eq!(store.save_count(), 1);
    }

    #[test]
    fn noop_store_is_unsupported_and_successful() {
        let store = NoopLaunchAssistStore;
        assert!(!store.is_supported());
        assert_eq!(
            block_on(store.load()).expect("load"),
            LaunchAssistMetadata::default()
        );
        block_on(store.save(&LaunchAssistMetadata::default())).expect("save");
    }
}

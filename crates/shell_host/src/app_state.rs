//! Directory-backed app-state store: one JSON envelope file per namespace.

use std::{
    fs,
    path::{Path, PathBuf},
};

use platform_host::{AppStateEnvelope, AppStateStore, AppStateStoreFuture};
use tracing::{debug, trace};

fn validate_namespace(namespace: &str) -> Result<(), String> {
    if namespace.is_empty() {
        return Err("Namespace must not be empty".to_string());
    }
    if !namespace
        .chars()
        .all(|ch| ch.is_ascii_alphanumeric() || matches!(ch, '.' | '_' | '-'))
    {
        return Err(format!(
            "Namespace `{namespace}` contains unsupported characters"
        ));
    }
    Ok(())
}

fn parse_envelope(path: &Path, raw: &str) -> Result<AppStateEnvelope, String> {
    serde_json::from_str(raw).map_err(|err| {
        format!(
            "failed to parse app-state envelope {}: {err}",
            path.display()
        )
    })
}

#[derive(Debug, Clone)]
/// App-state store rooted at a native directory.
pub struct DirectoryAppStateStore {
    root: PathBuf,
}

impl DirectoryAppStateStore {
    /// Creates the store, creating `root` when missing.
    pub fn from_root(root: impl AsRef<Path>) -> Result<Self, String> {
        let root = root.as_ref();
        fs::create_dir_all(root)
            .map_err(|err| format!("failed to create app-state dir {}: {err}", root.display()))?;
        Ok(Self {
            root: root.to_path_buf(),
        })
    }

    fn namespace_file(&self, namespace: &str) -> Result<PathBuf, String> {
        validate_namespace(namespace)?;
        Ok(self.root.join(format!("{namespace}.json")))
    }

    /// Loads the envelope stored for `namespace`.
    pub fn load(&self, namespace: &str) -> Result<Option<AppStateEnvelope>, String> {
        let path = self.namespace_file(namespace)?;
        if !path.exists() {
            return Ok(None);
        }
        let raw = fs::read_to_string(&path)
            .map_err(|err| format!("failed to read {}: {err}", path.display()))?;
        parse_envelope(&path, &raw).map(Some)
    }

    /// Writes `envelope`, unless the stored one is at least as recent.
    pub fn save(&self, envelope: &AppStateEnvelope) -> Result<(), String> {
        let path = self.namespace_file(&envelope.namespace)?;
        if let Some(existing) = self.load(&envelope.namespace).ok().flatten() {
            if existing.updated_at_unix_ms >= envelope.updated_at_unix_ms {
                trace!(namespace = %envelope.namespace, "stale app-state save skipped");
                return Ok(());
            }
        }

        let serialized = serde_json::to_string(envelope)
            .map_err(|err| format!("failed to serialize app-state envelope: {err}"))?;
        fs::write(&path, serialized)
            .map_err(|err| format!("failed to write {}: {err}", path.display()))?;
        debug!(path = %path.display(), "app state saved");
        Ok(())
    }

    /// Removes the envelope stored for `namespace`; missing files are fine.
    pub fn delete(&self, namespace: &str) -> Result<(), String> {
        let path = self.namespace_file(namespace)?;
        if !path.exists() {
            return Ok(());
        }
        fs::remove_file(&path).map_err(|err| format!("failed to delete {}: {err}", path.display()))
    }
}

impl AppStateStore for DirectoryAppStateStore {
    fn load_app_state_envelope<'a>(
        &'a self,
        namespace: &'a str,
    ) -> AppStateStoreFuture<'a, Result<Option<AppStateEnvelope>, String>> {
        Box::pin(async move { self.load(namespace) })
    }

    fn save_app_state_envelope<'a>(
        &'a self,
        envelope: &'a AppStateEnvelope,
    ) -> AppStateStoreFuture<'a, Result<(), String>> {
        Box::pin(async move { self.save(envelope) })
    }

    fn delete_app_state<'a>(
        &'a self,
        namespace: &'a str,
    ) -> AppStateStoreFuture<'a, Result<(), String>> {
        Box::pin(async move { self.delete(namespace) })
    }
}

#[cfg(test)]
mod tests {
    use std::fs;

    use futures::executor::block_on;
    use platform_host::{AppStateEnvelope, AppStateStore, SUSPEND_STATE_NAMESPACE};
    use pretty_assertions::assert_eq;
    use serde_json::json;

    use super::{validate_namespace, DirectoryAppStateStore};
    use crate::test_support::temp_dir_path;

    fn envelope(namespace: &str, updated_at_unix_ms: u64, payload: serde_json::Value) -> AppStateEnvelope {
        let mut envelope = AppStateEnvelope::new(namespace, 1, payload);
        envelope.updated_at_unix_ms = updated_at_unix_ms;
        envelope
    }

    #[test]
    fn validates_namespace_character_policy() {
        assert!(validate_namespace(SUSPEND_STATE_NAMESPACE).is_ok());
        assert!(validate_namespace("shell_tabs-v2").is_ok());
        assert!(validate_namespace("shell/tabs").is_err());
        assert!(validate_namespace("../escape").is_err());
        assert!(validate_namespace("").is_err());
    }

    #[test]
    fn envelopes_survive_a_new_store_instance() {
        let root = temp_dir_path("app_state");
        let store = DirectoryAppStateStore::from_root(&root).expect("init store");
        let saved = envelope(SUSPEND_STATE_NAMESPACE, 10, json!({"active": 1}));

        block_on(store.save_app_state_envelope(&saved)).expect("save");
        let reopened = DirectoryAppStateStore::from_root(&root).expect("reopen store");
        let loaded = block_on(reopened.load_app_state_envelope(SUSPEND_STATE_NAMESPACE))
            .expect("load");
        assert_eq!(loaded, Some(saved));

        block_on(reopened.delete_app_state(SUSPEND_STATE_NAMESPACE)).expect("delete");
        assert_eq!(reopened.load(SUSPEND_STATE_NAMESPACE), Ok(None));

        let _ = fs::remove_dir_all(root);
    }

    #[test]
    fn older_envelopes_do_not_overwrite_newer_ones() {
        let root = temp_dir_path("app_state_monotonic");
        let store = DirectoryAppStateStore::from_root(&root).expect("init store");
        store
            .save(&envelope("shell.tabs", 20, json!({"v": "new"})))
            .expect("save new");
        store
            .save(&envelope("shell.tabs", 5, json!({"v": "old"})))
            .expect("stale save is not an error");

        let loaded = store.load("shell.tabs").expect("load").expect("present");
        assert_eq!(loaded.payload, json!({"v": "new"}));

        let _ = fs::remove_dir_all(root);
    }

    #[test]
    fn reports_parse_failure_for_malformed_envelope() {
        let root = temp_dir_path("app_state_malformed");
        let store = DirectoryAppStateStore::from_root(&root).expect("init store");
        let bad_file = root.join("shell.bad.json");
        fs::write(&bad_file, "{\"envelope_version\":").expect("write malformed envelope");

        let err = store.load("shell.bad").expect_err("malformed envelope");
        assert!(
            err.starts_with(&format!(
                "failed to parse app-state envelope {}:",
                bad_file.display()
            )),
            "unexpected error: {err}"
        );

        let _ = fs::remove_dir_all(root);
    }
}

//! Preference store backed by a single JSON map file.

use std::{
    collections::BTreeMap,
    fs,
    path::{Path, PathBuf},
};

use platform_host::{PrefsStore, PrefsStoreFuture};

type PrefMap = BTreeMap<String, String>;

fn load_pref_map(path: &Path) -> Result<PrefMap, String> {
    if !path.exists() {
        return Ok(PrefMap::new());
    }
    let raw = fs::read_to_string(path)
        .map_err(|err| format!("failed to read {}: {err}", path.display()))?;
    if raw.trim().is_empty() {
        return Ok(PrefMap::new());
    }
    serde_json::from_str(&raw)
        .map_err(|err| format!("failed to parse prefs map {}: {err}", path.display()))
}

fn save_pref_map(path: &Path, map: &PrefMap) -> Result<(), String> {
    let serialized = serde_json::to_string_pretty(map)
        .map_err(|err| format!("failed to serialize prefs map: {err}"))?;
    fs::write(path, serialized).map_err(|err| format!("failed to write {}: {err}", path.display()))
}

fn validate_key(key: &str) -> Result<(), String> {
    if key.is_empty() {
        Err("Preference key must not be empty".to_string())
    } else {
        Ok(())
    }
}

#[derive(Debug, Clone)]
/// Preference store writing `prefs.json` under a root directory.
pub struct FilePrefsStore {
    file: PathBuf,
}

impl FilePrefsStore {
    /// Creates the store, creating `root` when missing.
    pub fn from_root(root: impl AsRef<Path>) -> Result<Self, String> {
        let root = root.as_ref();
        fs::create_dir_all(root)
            .map_err(|err| format!("failed to create prefs dir {}: {err}", root.display()))?;
        Ok(Self {
            file: root.join("prefs.json"),
        })
    }

    /// Raw JSON stored under `key`.
    pub fn load(&self, key: &str) -> Result<Option<String>, String> {
        validate_key(key)?;
        Ok(load_pref_map(&self.file)?.remove(key))
    }

    /// Stores raw JSON under `key`.
    pub fn save(&self, key: &str, raw_json: &str) -> Result<(), String> {
        validate_key(key)?;
        let mut map = load_pref_map(&self.file)?;
        map.insert(key.to_string(), raw_json.to_string());
        save_pref_map(&self.file, &map)
    }
}

impl PrefsStore for FilePrefsStore {
    fn load_pref<'a>(
        &'a self,
        key: &'a str,
    ) -> PrefsStoreFuture<'a, Result<Option<String>, String>> {
        Box::pin(async move { self.load(key) })
    }

    fn save_pref<'a>(
        &'a self,
        key: &'a str,
        raw_json: &'a str,
    ) -> PrefsStoreFuture<'a, Result<(), String>> {
        Box::pin(async move { self.save(key, raw_json) })
    }
}

#[cfg(test)]
mod tests {
    use std::fs;

    use futures::executor::block_on;
    use pretty_assertions::assert_eq;
    use shell_runtime::{ShellPreferences, SHELL_PREFERENCES_KEY};

    use super::FilePrefsStore;
    use crate::test_support::temp_dir_path;

    #[test]
    fn typed_preferences_persist_across_instances() {
        let root = temp_dir_path("prefs");
        let store = FilePrefsStore::from_root(&root).expect("init prefs store");
        let prefs = ShellPreferences {
            supported_file_types: vec![".txt".to_string(), ".csv".to_string()],
        };

        block_on(prefs.save(&store)).expect("save");
        let reopened = FilePrefsStore::from_root(&root).expect("reopen prefs store");
        let loaded = block_on(ShellPreferences::load(&reopened)).expect("load");

        assert_eq!(loaded, Some(prefs));
        assert_eq!(reopened.load("missing"), Ok(None));

        let _ = fs::remove_dir_all(root);
    }

    #[test]
    fn rejects_empty_keys() {
        let root = temp_dir_path("prefs_empty_key");
        let store = FilePrefsStore::from_root(&root).expect("init prefs store");

        let expected = "Preference key must not be empty";
        assert_eq!(store.load("").expect_err("load"), expected);
        assert_eq!(store.save("", "{}").expect_err("save"), expected);

        let _ = fs::remove_dir_all(root);
    }

    #[test]
    fn reports_malformed_map_parse_error() {
        let root = temp_dir_path("prefs_malformed");
        let prefs_path = root.join("prefs.json");
        fs::write(&prefs_path, "{\"bad\":").expect("write malformed prefs map");
        let store = FilePrefsStore::from_root(&root).expect("init prefs store");

        let err = store
            .load(SHELL_PREFERENCES_KEY)
            .expect_err("malformed prefs map should fail");
        assert!(
            err.starts_with(&format!(
                "failed to parse prefs map {}:",
                prefs_path.display()
            )),
            "unexpected error: {err}"
        );

        let _ = fs::remove_dir_all(root);
    }
}

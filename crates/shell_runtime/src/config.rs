//! Shell configuration (TOML) and persisted user preferences.

use std::{
    fs,
    path::{Path, PathBuf},
};

use platform_host::PrefsStore;
use serde::{Deserialize, Serialize};
use tracing::warn;

use crate::error::ConfigError;

/// Preference key under which [`ShellPreferences`] are stored.
pub const SHELL_PREFERENCES_KEY: &str = "shell.preferences.v1";

/// What the coordinator does when the host mounts the same surface a second time.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum RemountPolicy {
    /// Later mounts are absorbed; `on_xaml_load` runs once.
    #[default]
    Ignore,
    /// Later mounts fail with [`crate::LifecycleError::AlreadyMounted`].
    Reject,
}

/// Static shell configuration, read once at startup.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ShellConfig {
    /// Second-mount behavior for view coordinators.
    pub remount_policy: RemountPolicy,
    /// Default `tracing` filter directive when `RUST_LOG` is unset.
    pub log_filter: String,
    /// File extensions (lowercase, with leading dot) seeded into fresh preferences.
    pub supported_file_types: Vec<String>,
    /// Whether a suspend snapshot is persisted when state is captured.
    pub persist_suspend_state: bool,
    /// Directory for native host storage; the host picks a default when unset.
    pub data_dir: Option<PathBuf>,
}

impl Default for ShellConfig {
    fn default() -> Self {
        Self {
            remount_policy: RemountPolicy::Ignore,
            log_filter: "info".to_string(),
            supported_file_types: [".txt", ".md", ".rs", ".json", ".toml"]
                .into_iter()
                .map(str::to_string)
                .collect(),
            persist_suspend_state: true,
            data_dir: None,
        }
    }
}

impl ShellConfig {
    /// Parses a config from TOML text; missing keys take their defaults.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Parse`] when the text is not valid TOML for this type.
    pub fn from_toml_str(text: &str) -> Result<Self, ConfigError> {
        toml::from_str(text).map_err(|err| ConfigError::Parse(err.to_string()))
    }

    /// Reads and parses a config file.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Io`] when the file cannot be read and [`ConfigError::Parse`] when
    /// it is malformed.
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let text = fs::read_to_string(path).map_err(|err| ConfigError::Io {
            path: path.to_path_buf(),
            message: err.to_string(),
        })?;
        Self::from_toml_str(&text)
    }
}

/// User preferences persisted through the host prefs store.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ShellPreferences {
    /// File extensions the shell opens on file activation.
    pub supported_file_types: Vec<String>,
}

impl ShellPreferences {
    /// Fresh preferences derived from the static config.
    pub fn from_config(config: &ShellConfig) -> Self {
        Self {
            supported_file_types: config.supported_file_types.clone(),
        }
    }

    /// Reads the stored preferences.
    ///
    /// # Errors
    ///
    /// Returns the store error, or a decode error for a malformed entry.
    pub async fn load(store: &dyn PrefsStore) -> Result<Option<Self>, String> {
        let Some(raw) = store.load_pref(SHELL_PREFERENCES_KEY).await? else {
            return Ok(None);
        };
        serde_json::from_str(&raw)
            .map(Some)
            .map_err(|err| format!("malformed {SHELL_PREFERENCES_KEY}: {err}"))
    }

    /// Stored preferences, or fresh ones from `config` when nothing usable is stored.
    pub async fn load_or_config(store: &dyn PrefsStore, config: &ShellConfig) -> Self {
        match Self::load(store).await {
            Ok(Some(preferences)) => preferences,
            Ok(None) => Self::from_config(config),
            Err(err) => {
                warn!("shell preferences load failed: {err}");
                Self::from_config(config)
            }
        }
    }

    /// Writes these preferences to `store`.
    ///
    /// # Errors
    ///
    /// Returns the store error.
    pub async fn save(&self, store: &dyn PrefsStore) -> Result<(), String> {
        let raw = serde_json::to_string(self).map_err(|err| err.to_string())?;
        store.save_pref(SHELL_PREFERENCES_KEY, &raw).await
    }

    /// Whether `path` has one of the supported extensions (case-insensitive).
    pub fn supports_file(&self, path: &str) -> bool {
        let Some(extension) = Path::new(path).extension().and_then(|ext| ext.to_str()) else {
            return false;
        };
        let dotted = format!(".{}", extension.to_ascii_lowercase());
        self.supported_file_types
            .iter()
            .any(|ty| ty.eq_ignore_ascii_case(&dotted))
    }
}

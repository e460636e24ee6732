//! Launch-assist metadata kept in a JSON file next to the other host data.

use std::{
    fs,
    path::{Path, PathBuf},
};

use platform_host::{LaunchAssistFuture, LaunchAssistMetadata, LaunchAssistStore};

#[derive(Debug, Clone)]
/// File-backed launch-assist list.
pub struct FileLaunchAssistStore {
    file: PathBuf,
}

impl FileLaunchAssistStore {
    /// Creates the store, creating `root` when missing.
    pub fn from_root(root: impl AsRef<Path>) -> Result<Self, String> {
        let root = root.as_ref();
        fs::create_dir_all(root).map_err(|err| {
            format!("failed to create launch-assist dir {}: {err}", root.display())
        })?;
        Ok(Self {
            file: root.join("launch_assist.json"),
        })
    }

    /// Current metadata; a missing file reads as the host default.
    pub fn read(&self) -> Result<LaunchAssistMetadata, String> {
        if !self.file.exists() {
            return Ok(LaunchAssistMetadata::default());
        }
        let raw = fs::read_to_string(&self.file)
            .map_err(|err| format!("failed to read {}: {err}", self.file.display()))?;
        serde_json::from_str(&raw).map_err(|err| {
            format!(
                "failed to parse launch-assist metadata {}: {err}",
                self.file.display()
            )
        })
    }

    /// Replaces the stored metadata.
    pub fn write(&self, metadata: &LaunchAssistMetadata) -> Result<(), String> {
        let serialized = serde_json::to_string_pretty(metadata)
            .map_err(|err| format!("failed to serialize launch-assist metadata: {err}"))?;
        fs::write(&self.file, serialized)
            .map_err(|err| format!("failed to write {}: {err}", self.file.display()))
    }
}

impl LaunchAssistStore for FileLaunchAssistStore {
    fn is_supported(&self) -> bool {
        true
    }

    fn load<'a>(&'a self) -> LaunchAssistFuture<'a, Result<LaunchAssistMetadata, String>> {
        Box::pin(async move { self.read() })
    }

    fn save<'a>(
        &'a self,
        metadata: &'a LaunchAssistMetadata,
    ) -> LaunchAssistFuture<'a, Result<(), String>> {
        Box::pin(async move { self.write(metadata) })
    }
}

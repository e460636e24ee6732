//! One-time shell initialization, run by the first activation.
//!
//! Steps run in order and each awaits its host I/O before the next starts:
//! launch-assist metadata first, then user preferences.

use platform_host::{HostServices, LaunchAssistStore, SystemGroupKind};
use tracing::{debug, info};

use crate::{
    config::{ShellConfig, ShellPreferences},
    error::BootError,
};

/// Runs boot initialization and returns the preferences the shell starts with.
///
/// # Errors
///
/// Launch-assist load/save failures are returned to the caller. Preference failures are logged
/// and replaced by defaults derived from `config`.
pub async fn initialize(
    host: &HostServices,
    config: &ShellConfig,
) -> Result<ShellPreferences, BootError> {
    info!(host = host.host_strategy.as_str(), "booting shell");
    initialize_launch_assist(host.launch_assist.as_ref()).await?;
    Ok(ShellPreferences::load_or_config(host.prefs.as_ref(), config).await)
}

/// Loads the launch-assist list, hides the host-managed group, and writes it back.
///
/// # Errors
///
/// Returns [`BootError::LaunchAssistLoad`] or [`BootError::LaunchAssistSave`].
pub async fn initialize_launch_assist(store: &dyn LaunchAssistStore) -> Result<(), BootError> {
    if !store.is_supported() {
        debug!("launch assist unsupported on this host");
        return Ok(());
    }
    let mut metadata = store.load().await.map_err(BootError::LaunchAssistLoad)?;
    metadata.system_group = SystemGroupKind::None;
    store
        .save(&metadata)
        .await
        .map_err(BootError::LaunchAssistSave)?;
    debug!(items = metadata.items.len(), "launch assist initialized");
    Ok(())
}

//! Typed host-domain contracts used by the shell runtime.
//!
//! This crate is the boundary between the lifecycle core and the host platform. It exposes
//! object-safe service traits (share targets, launch-assist metadata, app-state envelopes,
//! preferences) together with no-op and in-memory adapters. Native adapters live in
//! `shell_host`.

#![warn(missing_docs, rustdoc::broken_intra_doc_links)]

pub mod host;
pub mod launch_assist;
pub mod share;
pub mod storage;

pub use host::{HostServices, HostStrategy};
pub use launch_assist::{
    LaunchAssistFuture, LaunchAssistItem, LaunchAssistMetadata, LaunchAssistStore,
    MemoryLaunchAssistStore, NoopLaunchAssistStore, SystemGroupKind,
};
pub use share::{
    MemoryShareTargetService, NoopShareTargetService, ShareTargetHandle, ShareTargetService,
};
pub use storage::app_state::{
    build_app_state_envelope, migrate_envelope_payload, next_monotonic_timestamp_ms,
    AppStateEnvelope, AppStateStore, AppStateStoreFuture, MemoryAppStateStore, NoopAppStateStore,
    APP_STATE_ENVELOPE_VERSION, SUSPEND_STATE_NAMESPACE,
};
pub use storage::prefs::{MemoryPrefsStore, NoopPrefsStore, PrefsStore, PrefsStoreFuture};

//! Durable storage contracts: namespaced app-state envelopes and key/value preferences.

pub mod app_state;
pub mod prefs;

//! Lifecycle core of the view shell.
//!
//! The runtime owns the per-view [`ViewLifecycleCoordinator`], the process-wide
//! [`SuspendResumeBridge`], the [`FrameBus`] carrying frame-created/changed notifications, and
//! the [`SelectionTracker`] tab model. [`ShellApp`] ties them to host activation and
//! suspend/resume signals. Everything is single-threaded and driven by direct calls.

#![warn(missing_docs, rustdoc::broken_intra_doc_links)]

pub mod app;
pub mod boot;
pub mod bridge;
pub mod config;
pub mod context;
pub mod coordinator;
pub mod error;
pub mod frame_bus;
pub mod selection;

pub use app::{ShellApp, SuspendSnapshot, ViewFactory, SUSPEND_SNAPSHOT_SCHEMA_VERSION};
pub use bridge::{ActivationHandler, RestoreOutcome, Subscriber, SuspendResumeBridge};
pub use config::{RemountPolicy, ShellConfig, ShellPreferences, SHELL_PREFERENCES_KEY};
pub use context::AppContext;
pub use coordinator::ViewLifecycleCoordinator;
pub use error::{AlreadyBoundError, BootError, ConfigError, LifecycleError, ShellError};
pub use frame_bus::{FrameBus, FrameStream, FrameSubscription};
pub use selection::SelectionTracker;

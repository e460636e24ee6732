//! Error types for the shell runtime.

use std::path::PathBuf;

use thiserror::Error;
use view_contract::ViewHandle;

/// A coordinator was asked to bind to a second [`ViewHandle`].
///
/// Two handles claiming the same view identity is a programming-contract violation; the first
/// binding stays in place.
#[derive(Debug, Error, Clone, Copy, PartialEq, Eq)]
#[error("cannot bind {attempted}: coordinator already owns {bound}")]
pub struct AlreadyBoundError {
    /// Handle the coordinator is bound to.
    pub bound: ViewHandle,
    /// Handle of the rejected bind.
    pub attempted: ViewHandle,
}

#[derive(Debug, Error, Clone, PartialEq, Eq)]
/// Contract violations raised while driving a view's lifecycle.
pub enum LifecycleError {
    /// See [`AlreadyBoundError`].
    #[error(transparent)]
    AlreadyBound(#[from] AlreadyBoundError),
    /// The host mounted a surface twice while remounts are rejected.
    #[error("view surface already mounted (view: {view:?})")]
    AlreadyMounted {
        /// Bound handle, when binding already happened.
        view: Option<ViewHandle>,
    },
    /// The handle does not name an open view.
    #[error("{0} is not an open view")]
    UnknownView(ViewHandle),
}

#[derive(Debug, Error, Clone, PartialEq, Eq)]
/// Failures of the one-time boot initialization.
pub enum BootError {
    /// Loading launch-assist metadata failed.
    #[error("launch-assist load failed: {0}")]
    LaunchAssistLoad(String),
    /// Saving launch-assist metadata failed.
    #[error("launch-assist save failed: {0}")]
    LaunchAssistSave(String),
}

#[derive(Debug, Error, Clone, PartialEq, Eq)]
/// Errors surfaced by [`crate::ShellApp`] entry points.
pub enum ShellError {
    /// Boot initialization failed; the shell is not ready.
    #[error(transparent)]
    Boot(#[from] BootError),
    /// A lifecycle contract was violated.
    #[error(transparent)]
    Lifecycle(#[from] LifecycleError),
    /// A host storage service failed.
    #[error("host storage failed: {0}")]
    Storage(String),
}

impl From<AlreadyBoundError> for ShellError {
    fn from(err: AlreadyBoundError) -> Self {
        Self::Lifecycle(err.into())
    }
}

#[derive(Debug, Error, Clone, PartialEq, Eq)]
/// Errors reading [`crate::ShellConfig`].
pub enum ConfigError {
    /// The config file could not be read.
    #[error("failed to read {}: {message}", path.display())]
    Io {
        /// Config file path.
        path: PathBuf,
        /// Underlying I/O message.
        message: String,
    },
    /// The config text is not valid TOML for [`crate::ShellConfig`].
    #[error("failed to parse shell config: {0}")]
    Parse(String),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn already_bound_message_names_both_handles() {
        let err = AlreadyBoundError {
            bound: ViewHandle(1),
            attempted: ViewHandle(2),
        };
        assert_eq!(
            err.to_string(),
            "cannot bind view-2: coordinator already owns view-1"
        );

        let wrapped: ShellError = err.into();
        assert_eq!(
            wrapped,
            ShellError::Lifecycle(LifecycleError::AlreadyBound(err))
        );
        assert_eq!(wrapped.to_string(), err.to_string());
    }
}

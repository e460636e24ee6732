//! Native desktop host for the view shell.
//!
//! Wires file-backed host services under a data directory, installs logging, and drives a
//! [`ShellApp`] through one activation/suspend/resume session from the command line.

#![warn(missing_docs, rustdoc::broken_intra_doc_links)]

mod app_state;
mod launch_assist;
pub mod logging;
mod prefs;
mod views;

use std::{
    env,
    path::{Path, PathBuf},
    process::ExitCode,
    rc::Rc,
};

use futures::executor::block_on;
use platform_host::{HostServices, HostStrategy, MemoryShareTargetService};
use serde_json::Value;
use shell_runtime::{AppContext, ShellApp, ShellConfig};
use tracing::{info, warn};
use view_contract::{ActivationRequest, ExecutionState, LaunchArgs};

pub use app_state::DirectoryAppStateStore;
pub use launch_assist::FileLaunchAssistStore;
pub use prefs::FilePrefsStore;
pub use views::{TracingView, TracingViewFactory};

const DEFAULT_DATA_DIR: &str = ".shell_host";

/// Builds the desktop service bundle rooted at `root`.
pub fn desktop_services(root: &Path) -> Result<HostServices, String> {
    Ok(HostServices {
        app_state: Rc::new(DirectoryAppStateStore::from_root(root.join("app_state"))?),
        prefs: Rc::new(FilePrefsStore::from_root(root.join("prefs"))?),
        launch_assist: Rc::new(FileLaunchAssistStore::from_root(root)?),
        share_targets: Rc::new(MemoryShareTargetService::default()),
        host_strategy: HostStrategy::Desktop,
    })
}

/// Parsed command line.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct CliOptions {
    /// `--config <path>`: TOML shell config.
    pub config: Option<PathBuf>,
    /// `--data-dir <path>`: overrides the configured data directory.
    pub data_dir: Option<PathBuf>,
    /// `--previous <state>`: how the previous run ended.
    pub previous: ExecutionState,
    /// `--open <path>`, repeatable: files handed over by file activation.
    pub open: Vec<String>,
}

fn parse_execution_state(raw: &str) -> Result<ExecutionState, String> {
    serde_json::from_value(Value::String(raw.to_string()))
        .map_err(|_| format!("unknown execution state: {raw}"))
}

/// Parses arguments following the program name.
pub fn parse_args(args: impl IntoIterator<Item = String>) -> Result<CliOptions, String> {
    let mut options = CliOptions::default();
    let mut args = args.into_iter();
    while let Some(flag) = args.next() {
        let mut value = || {
            args.next()
                .ok_or_else(|| format!("missing value for {flag}"))
        };
        match flag.as_str() {
            "--config" => options.config = Some(PathBuf::from(value()?)),
            "--data-dir" => options.data_dir = Some(PathBuf::from(value()?)),
            "--previous" => options.previous = parse_execution_state(&value()?)?,
            "--open" => options.open.push(value()?),
            other => return Err(format!("unknown argument: {other}")),
        }
    }
    Ok(options)
}

fn print_usage() {
    eprintln!(
        "Usage: shell_host [options]\n\
         \n\
         Options:\n\
           --config <path>     TOML shell config\n\
           --data-dir <path>   Host data directory (default: {DEFAULT_DATA_DIR})\n\
           --previous <state>  not-running | running | suspended | terminated | closed-by-user\n\
           --open <path>       Open a file in a new tab (repeatable)\n"
    );
}

fn activation_requests(options: &CliOptions) -> Vec<ActivationRequest> {
    let args = LaunchArgs::new(options.previous);
    if options.open.is_empty() {
        return vec![ActivationRequest::Launched { args }];
    }
    options
        .open
        .iter()
        .map(|path| ActivationRequest::FileActivated {
            args: args.clone(),
            path: path.clone(),
        })
        .collect()
}

/// Runs one shell session: activate, mount and cycle every tab, then suspend and resume.
pub fn run_session(app: &ShellApp, options: &CliOptions) -> Result<(), String> {
    for request in activation_requests(options) {
        if let Some(snapshot) = block_on(app.activate(&request)).map_err(|err| err.to_string())? {
            info!(
                active = ?snapshot.active,
                tabs = snapshot.open_views.len(),
                "restored previous session"
            );
        }
    }

    let views = app.context().selection.views();
    for handle in &views {
        app.mount_view(*handle).map_err(|err| err.to_string())?;
    }
    for handle in &views {
        app.select_view(*handle).map_err(|err| err.to_string())?;
    }

    let captured = block_on(app.suspending()).map_err(|err| err.to_string())?;
    if !captured {
        warn!("suspend captured no view state");
    }
    app.resuming();
    info!(tabs = views.len(), "session complete");
    Ok(())
}

fn run_with(options: CliOptions) -> Result<(), String> {
    let config = match &options.config {
        Some(path) => ShellConfig::load(path).map_err(|err| err.to_string())?,
        None => ShellConfig::default(),
    };
    logging::init(&config.log_filter);

    let root = options
        .data_dir
        .clone()
        .or_else(|| config.data_dir.clone())
        .unwrap_or_else(|| PathBuf::from(DEFAULT_DATA_DIR));
    let host = desktop_services(&root)?;
    info!(root = %root.display(), "desktop services ready");

    let app = ShellApp::new(AppContext::new(host, config), TracingViewFactory);
    run_session(&app, &options)
}

/// Entry point of the `shell_host` binary.
pub fn run() -> ExitCode {
    let args: Vec<String> = env::args().skip(1).collect();
    if args.iter().any(|arg| matches!(arg.as_str(), "help" | "--help" | "-h")) {
        print_usage();
        return ExitCode::SUCCESS;
    }
    let options = match parse_args(args) {
        Ok(options) => options,
        Err(err) => {
            eprintln!("error: {err}");
            print_usage();
            return ExitCode::from(2);
        }
    };

    match run_with(options) {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            eprintln!("error: {err}");
            ExitCode::from(1)
        }
    }
}

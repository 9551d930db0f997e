//! Unattended installation of Pydio Cells
//!
//! Deployment parameters come from environment variables so the installer
//! can run as a container entrypoint. The first run validates them, checks
//! the database and installs; every run ends by handing the process over to
//! the main application.
//!
//! # Behavior
//! - marker file present → hand off immediately, nothing else is read
//! - marker file absent → validate, check, install, write marker, hand off

mod detection;
mod environment;
mod error;
mod launcher;
mod orchestration;
mod ports;

pub mod core;
pub mod library;

use std::path::PathBuf;

pub use detection::{InstallationState, check_installation_state, write_marker};
pub use environment::{
    EnvSource, ProcessEnv, apply_overrides, external_url, internal_url, marker_path, parse_url,
    resolve_db_connection,
};
pub use error::InstallerError;
pub use launcher::{ExecLauncher, MainApplication};
pub use orchestration::{Bootstrapper, Outcome};
pub use ports::{available_port, ensure_micro_api_port};

/// Environment variable names understood by the installer
pub mod vars {
    pub use super::environment::{
        DATASOURCE_PATH, DB_CONNECTION_TYPE, DB_DSN, DB_NAME, DB_PASSWORD, DB_SOCKET_FILE,
        DB_TCP_HOST, DB_TCP_PORT, DB_USER, EXTERNAL_URL, FILE, FRONTEND_LOGIN, FRONTEND_PASSWORD,
        INTERNAL_URL, OPENID_CONNECT_CLIENT_ID, OPENID_CONNECT_CLIENT_SECRET,
    };
}

use crate::config::TomlConfigStore;
use library::LocalInstallLibrary;

/// Wiring of the production collaborators
#[derive(Debug, Clone)]
pub struct BootstrapOptions {
    /// Configuration file shared with the main application
    pub config_path: PathBuf,
    pub data_dir: PathBuf,
    /// Main application executable and its arguments
    pub program: String,
    pub args: Vec<String>,
}

/// Run the bootstrap sequence against the real process environment
///
/// Only returns on failure, or on platforms where the application runs as
/// a child process.
pub async fn bootstrap(options: &BootstrapOptions) -> Result<Outcome, InstallerError> {
    let env = ProcessEnv;
    let library = LocalInstallLibrary::new(&options.config_path, &options.data_dir);
    let app = ExecLauncher::new(options.program.clone(), options.args.clone());

    Bootstrapper::new(&env, library, &app)
        .run(|| TomlConfigStore::open(&options.config_path))
        .await
}

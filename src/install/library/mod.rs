//! Install collaborator seam
//!
//! The controller never touches schemas, credentials or service registration
//! itself; it drives an [`InstallLibrary`]. [`LocalInstallLibrary`] is the
//! implementation shipped with the binary.

mod local;
mod probe;

pub use local::LocalInstallLibrary;
pub use probe::{CONNECT_TIMEOUT, Endpoint, endpoint_for, parse_dsn, probe};

use super::core::{CheckResult, InstallConfiguration, ProgressSink};
use super::error::InstallerError;

/// Name of the database connectivity check
pub const DB_CHECK: &str = "DB";

/// Which parts of the installation to perform
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InstallScope {
    /// Every step, in order
    All,
    Database,
    Datasource,
    Frontend,
    IdentityProvider,
}

impl InstallScope {
    pub fn includes(self, step: InstallScope) -> bool {
        self == InstallScope::All || self == step
    }
}

/// External installation library
#[allow(async_fn_in_trait)]
pub trait InstallLibrary {
    /// Fresh configuration carrying the library defaults
    fn generate_default_config(&self) -> InstallConfiguration;

    /// Run the named pre-install check against `config`
    async fn perform_check(&self, check: &str, config: &InstallConfiguration) -> CheckResult;

    /// Perform the installation, reporting progress synchronously to `progress`
    async fn install(
        &mut self,
        config: &InstallConfiguration,
        scope: InstallScope,
        progress: &mut dyn ProgressSink,
    ) -> Result<(), InstallerError>;
}

//! Bootstrap controller
//!
//! Decides between first-run install and immediate hand-off, validates the
//! environment, drives the install collaborator exactly once and finally
//! replaces the installer with the main application.

use log::{error, info};

use super::core::{LogProgress, ProgressSink};
use super::detection::{InstallationState, check_installation_state, write_marker};
use super::environment::{self, EnvSource};
use super::error::InstallerError;
use super::launcher::MainApplication;
use super::library::{DB_CHECK, InstallLibrary, InstallScope};
use super::ports;
use crate::config::{ConfigStore, DEFAULTS_SECTION, EXTERNAL_URL_KEY, INTERNAL_URL_KEY};

/// How the run ended when the launcher hands control back
///
/// A real launcher never returns on success, so this is only observed with
/// launchers that run the application out of process.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Outcome {
    /// Marker was present, installation skipped
    AlreadyInstalled,
    /// Installation ran and the marker was written
    Installed,
}

/// Single-shot installer state machine
pub struct Bootstrapper<'a, L> {
    env: &'a dyn EnvSource,
    library: L,
    app: &'a dyn MainApplication,
    progress: Box<dyn ProgressSink + 'a>,
}

impl<'a, L: InstallLibrary> Bootstrapper<'a, L> {
    pub fn new(env: &'a dyn EnvSource, library: L, app: &'a dyn MainApplication) -> Self {
        Self {
            env,
            library,
            app,
            progress: Box::new(LogProgress),
        }
    }

    /// Route install progress somewhere other than the log
    pub fn with_progress(mut self, sink: impl ProgressSink + 'a) -> Self {
        self.progress = Box::new(sink);
        self
    }

    /// Give back the collaborator once the run is over
    pub fn into_library(self) -> L {
        self.library
    }

    /// Install if needed, then hand off to the main application
    ///
    /// `open_store` is only called on a first run: an installed container
    /// must start even when the configuration file is unreadable.
    pub async fn run<S, F>(&mut self, open_store: F) -> Result<Outcome, InstallerError>
    where
        S: ConfigStore,
        F: FnOnce() -> Result<S, InstallerError>,
    {
        let marker = environment::marker_path(self.env)?;

        if check_installation_state(&marker) == InstallationState::Installed {
            info!("Running cells");
            self.app.launch()?;
            return Ok(Outcome::AlreadyInstalled);
        }

        info!("Running install..");
        let mut store = open_store()?;
        self.install(&mut store).await?;

        // Creating installed flag
        write_marker(&marker)?;
        self.app.launch()?;
        Ok(Outcome::Installed)
    }

    /// First-run installation, up to but excluding the marker
    async fn install(&mut self, store: &mut dyn ConfigStore) -> Result<(), InstallerError> {
        ports::ensure_micro_api_port(store)?;

        let mut config = self.library.generate_default_config();

        // advertised address only, never part of the install record
        let external_url = environment::external_url(self.env)?;
        store.set(DEFAULTS_SECTION, EXTERNAL_URL_KEY, external_url.into());

        let internal_url = environment::internal_url(self.env)?;
        config.internal_url = internal_url.clone();
        store.set(DEFAULTS_SECTION, INTERNAL_URL_KEY, internal_url.into());

        store.save("cli", "Install / Setting default URLs")?;

        config.set_database(environment::resolve_db_connection(self.env)?);

        let check = self.library.perform_check(DB_CHECK, &config).await;
        if !check.success {
            return Err(InstallerError::DatabaseCheck(check.json_result.to_string()));
        }
        info!("Connected to the database");
        config.check_results.push(check);

        environment::apply_overrides(self.env, &mut config);

        info!("installConfig:");
        config.log_fields();

        // Installation failures are reported but do not stop the hand-off
        match self
            .library
            .install(&config, InstallScope::All, &mut *self.progress)
            .await
        {
            Ok(()) => {}
            Err(e @ InstallerError::Install(_)) => error!("{e}"),
            Err(e) => error!("Installation Error: {e}"),
        }
        info!("Installing 100/100: Success!");

        Ok(())
    }
}

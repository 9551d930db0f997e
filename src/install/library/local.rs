//! Installation library bundled with the binary
//!
//! Writes the installation choices into the shared configuration store where
//! the main application picks them up on its first start, and prepares the
//! datasource folder on disk.

use std::path::PathBuf;

use log::{info, warn};
use sha2::{Digest, Sha256};

use super::probe::{CONNECT_TIMEOUT, endpoint_for, probe};
use super::{DB_CHECK, InstallLibrary, InstallScope};
use crate::config::{ConfigStore, TomlConfigStore};
use crate::install::core::{
    CheckResult, DbConnection, InstallConfiguration, ProgressEvent, ProgressSink,
};
use crate::install::error::InstallerError;

const DEFAULT_DATASOURCE: &str = "pydiods1";
const DEFAULT_OIDC_CLIENT: &str = "cells-front";

/// File-backed installation library
#[derive(Debug, Clone)]
pub struct LocalInstallLibrary {
    config_path: PathBuf,
    data_dir: PathBuf,
}

impl LocalInstallLibrary {
    pub fn new(config_path: impl Into<PathBuf>, data_dir: impl Into<PathBuf>) -> Self {
        Self {
            config_path: config_path.into(),
            data_dir: data_dir.into(),
        }
    }

    /// Platform data directory of the main application
    pub fn default_data_dir() -> PathBuf {
        dirs::data_local_dir()
            .map(|dir| dir.join("pydio").join("cells"))
            .unwrap_or_else(|| PathBuf::from("/var/cells"))
    }

    /// The application presents these credentials to the database, so they
    /// are stored as given; the store keeps the file owner-only.
    fn save_database(store: &mut dyn ConfigStore, db: &DbConnection) {
        const S: &str = "database";
        store.set(S, "type", db.kind().into());
        match db {
            DbConnection::Tcp {
                hostname,
                port,
                user,
                password,
                name,
            } => {
                store.set(S, "host", hostname.as_str().into());
                store.set(S, "port", port.as_str().into());
                store.set(S, "user", user.as_str().into());
                store.set(S, "password", password.as_str().into());
                store.set(S, "name", name.as_str().into());
            }
            DbConnection::Socket {
                file,
                user,
                password,
                name,
            } => {
                store.set(S, "socket", file.as_str().into());
                store.set(S, "user", user.as_str().into());
                store.set(S, "password", password.as_str().into());
                store.set(S, "name", name.as_str().into());
            }
            DbConnection::Manual { dsn } => {
                store.set(S, "dsn", dsn.as_str().into());
            }
        }
    }

    async fn prepare_datasource(
        store: &mut dyn ConfigStore,
        config: &InstallConfiguration,
    ) -> Result<(), InstallerError> {
        const S: &str = "datasource";
        if config.ds_folder.is_empty() {
            return Err(InstallerError::Install(
                "datasource folder is not configured".to_string(),
            ));
        }
        tokio::fs::create_dir_all(&config.ds_folder)
            .await
            .map_err(|e| {
                InstallerError::Install(format!(
                    "Failed to create datasource folder {}: {e}",
                    config.ds_folder
                ))
            })?;

        store.set(S, "name", config.ds_name.as_str().into());
        store.set(S, "port", toml::Value::Integer(i64::from(config.ds_port)));
        store.set(S, "folder", config.ds_folder.as_str().into());
        Ok(())
    }

    fn save_frontend(
        store: &mut dyn ConfigStore,
        config: &InstallConfiguration,
    ) -> Result<(), InstallerError> {
        const S: &str = "frontend";
        store.set(S, "title", config.frontend_application_title.as_str().into());
        store.set(S, "language", config.frontend_default_language.as_str().into());
        store.set(S, "hosts", config.frontend_hosts.as_str().into());

        if config.frontend_password.is_empty() {
            warn!("No frontend password supplied, admin account is left to the running application");
            return Ok(());
        }
        if config.frontend_password != config.frontend_repeat_password {
            return Err(InstallerError::Install(
                "frontend passwords do not match".to_string(),
            ));
        }
        if config.frontend_login.is_empty() {
            return Err(InstallerError::Install(
                "frontend login is required with a password".to_string(),
            ));
        }

        // verified only, never presented to another service
        let digest = Sha256::digest(config.frontend_password.as_bytes());
        store.set(S, "admin_login", config.frontend_login.as_str().into());
        store.set(S, "admin_password_sha256", hex::encode(digest).into());
        Ok(())
    }

    fn save_identity_provider(store: &mut dyn ConfigStore, config: &InstallConfiguration) {
        const S: &str = "oidc";
        store.set(S, "client_id", config.external_dex_id.as_str().into());
        store.set(S, "client_secret", config.external_dex_secret.as_str().into());
    }
}

impl InstallLibrary for LocalInstallLibrary {
    fn generate_default_config(&self) -> InstallConfiguration {
        InstallConfiguration {
            database: Some(DbConnection::Tcp {
                hostname: "localhost".to_string(),
                port: "3306".to_string(),
                user: "root".to_string(),
                password: String::new(),
                name: "cells".to_string(),
            }),
            ds_name: DEFAULT_DATASOURCE.to_string(),
            ds_folder: self.data_dir.join("data").display().to_string(),
            external_dex_id: DEFAULT_OIDC_CLIENT.to_string(),
            external_dex_secret: uuid::Uuid::new_v4().simple().to_string(),
            frontend_login: "admin".to_string(),
            frontend_application_title: "Pydio Cells".to_string(),
            frontend_default_language: "en-us".to_string(),
            ..Default::default()
        }
    }

    async fn perform_check(&self, check: &str, config: &InstallConfiguration) -> CheckResult {
        if check != DB_CHECK {
            return CheckResult::failed(check, format!("unknown check '{check}'"));
        }

        let Some(db) = &config.database else {
            return CheckResult::failed(check, "no database connection configured");
        };

        let endpoint = match endpoint_for(db) {
            Ok(endpoint) => endpoint,
            Err(e) => return CheckResult::failed(check, e),
        };

        match probe(&endpoint, CONNECT_TIMEOUT).await {
            Ok(()) => CheckResult::passed(
                check,
                serde_json::json!({ "mode": db.kind(), "endpoint": endpoint.to_string() }),
            ),
            Err(e) => CheckResult {
                name: check.to_string(),
                success: false,
                json_result: serde_json::json!({
                    "mode": db.kind(),
                    "endpoint": endpoint.to_string(),
                    "error": e,
                }),
            },
        }
    }

    async fn install(
        &mut self,
        config: &InstallConfiguration,
        scope: InstallScope,
        progress: &mut dyn ProgressSink,
    ) -> Result<(), InstallerError> {
        let mut store = TomlConfigStore::open(&self.config_path)?;
        progress.on_progress(&ProgressEvent::new(0, "Starting installation"));

        if scope.includes(InstallScope::Database) {
            let db = config.database.as_ref().ok_or_else(|| {
                InstallerError::Install("no database connection configured".to_string())
            })?;
            Self::save_database(&mut store, db);
            progress.on_progress(&ProgressEvent::new(20, "Database connection configured"));
        }

        if scope.includes(InstallScope::Datasource) {
            Self::prepare_datasource(&mut store, config).await?;
            progress.on_progress(&ProgressEvent::new(
                50,
                format!("Datasource {} ready in {}", config.ds_name, config.ds_folder),
            ));
        }

        if scope.includes(InstallScope::Frontend) {
            Self::save_frontend(&mut store, config)?;
            progress.on_progress(&ProgressEvent::new(70, "Frontend configured"));
        }

        if scope.includes(InstallScope::IdentityProvider) {
            Self::save_identity_provider(&mut store, config);
            progress.on_progress(&ProgressEvent::new(90, "Identity provider configured"));
        }

        store.save("install", "Install / Setting all configurations")?;
        info!("Installation settings written to {}", store.path().display());
        progress.on_progress(&ProgressEvent::new(100, "Configuration saved"));
        Ok(())
    }
}

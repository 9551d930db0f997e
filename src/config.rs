//! Persisted key/value configuration shared with the main application.
//!
//! The installer only needs section/key access plus an explicit save, so the
//! controller depends on [`ConfigStore`] instead of a concrete file format.

use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};

use crate::install::InstallerError;

/// Section/key holding the service registry port
pub const PORTS_SECTION: &str = "ports";
pub const MICRO_API_KEY: &str = "micro_api";

/// Section holding the advertised and bind URLs
pub const DEFAULTS_SECTION: &str = "defaults";
pub const EXTERNAL_URL_KEY: &str = "url";
pub const INTERNAL_URL_KEY: &str = "urlInternal";

const META_SECTION: &str = "_meta";

/// Injected configuration service
pub trait ConfigStore {
    fn get(&self, section: &str, key: &str) -> Option<toml::Value>;

    fn set(&mut self, section: &str, key: &str, value: toml::Value);

    /// Persist pending changes, recording who saved and why
    fn save(&mut self, actor: &str, reason: &str) -> Result<(), InstallerError>;
}

impl<T: ConfigStore + ?Sized> ConfigStore for &mut T {
    fn get(&self, section: &str, key: &str) -> Option<toml::Value> {
        (**self).get(section, key)
    }

    fn set(&mut self, section: &str, key: &str, value: toml::Value) {
        (**self).set(section, key, value)
    }

    fn save(&mut self, actor: &str, reason: &str) -> Result<(), InstallerError> {
        (**self).save(actor, reason)
    }
}

/// TOML document on disk
#[derive(Debug)]
pub struct TomlConfigStore {
    path: PathBuf,
    doc: toml::Table,
}

impl TomlConfigStore {
    /// Load the store at `path`, starting empty when the file does not exist yet
    pub fn open(path: impl Into<PathBuf>) -> Result<Self, InstallerError> {
        let path = path.into();
        let doc = if path.exists() {
            let raw = fs::read_to_string(&path).map_err(|e| {
                InstallerError::ConfigStore(format!("Failed to read {}: {e}", path.display()))
            })?;
            toml::from_str::<toml::Table>(&raw).map_err(|e| {
                InstallerError::ConfigStore(format!("Failed to parse {}: {e}", path.display()))
            })?
        } else {
            toml::Table::new()
        };

        Ok(Self { path, doc })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn section_mut(&mut self, section: &str) -> &mut toml::Table {
        let entry = self
            .doc
            .entry(section)
            .or_insert(toml::Value::Table(toml::Table::new()));
        if !entry.is_table() {
            log::warn!("Config section '{section}' is not a table, replacing it");
            *entry = toml::Value::Table(toml::Table::new());
        }
        match entry {
            toml::Value::Table(table) => table,
            _ => unreachable!("section was just replaced by a table"),
        }
    }
}

impl ConfigStore for TomlConfigStore {
    fn get(&self, section: &str, key: &str) -> Option<toml::Value> {
        self.doc
            .get(section)
            .and_then(|s| s.as_table())
            .and_then(|t| t.get(key))
            .cloned()
    }

    fn set(&mut self, section: &str, key: &str, value: toml::Value) {
        self.section_mut(section).insert(key.to_string(), value);
    }

    fn save(&mut self, actor: &str, reason: &str) -> Result<(), InstallerError> {
        let meta = self.section_mut(META_SECTION);
        meta.insert("actor".into(), actor.into());
        meta.insert("reason".into(), reason.into());
        meta.insert("saved_at".into(), chrono::Utc::now().to_rfc3339().into());

        let content = toml::to_string_pretty(&self.doc)
            .map_err(|e| InstallerError::ConfigStore(format!("Failed to serialize config: {e}")))?;

        if let Some(parent) = self.path.parent()
            && !parent.as_os_str().is_empty()
        {
            fs::create_dir_all(parent).map_err(|e| {
                InstallerError::ConfigStore(format!(
                    "Failed to create config directory {}: {e}",
                    parent.display()
                ))
            })?;
        }

        // staged next to the target so the rename stays on one filesystem
        let staged = self.path.with_extension("toml.partial");
        let persist = || -> std::io::Result<()> {
            let mut file = fs::File::create(&staged)?;
            file.write_all(content.as_bytes())?;
            file.sync_all()?;

            // holds database and identity provider credentials
            #[cfg(unix)]
            {
                use std::os::unix::fs::PermissionsExt;

                fs::set_permissions(&staged, fs::Permissions::from_mode(0o600))?;
            }

            fs::rename(&staged, &self.path)
        };
        if let Err(e) = persist() {
            let _ = fs::remove_file(&staged);
            return Err(InstallerError::ConfigStore(format!(
                "Failed to write {}: {e}",
                self.path.display()
            )));
        }

        log::debug!("Saved config to {} ({actor}: {reason})", self.path.display());
        Ok(())
    }
}

/// Default location of the persisted configuration
///
/// Follows the per-user config directory the main application uses, falling
/// back to `/var/cells` inside minimal containers without a home directory.
pub fn default_config_path() -> PathBuf {
    dirs::config_dir()
        .map(|dir| dir.join("pydio").join("cells"))
        .unwrap_or_else(|| PathBuf::from("/var/cells"))
        .join("cells.toml")
}

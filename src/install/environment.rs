//! Deployment parameters read from the process environment
//!
//! Lookups go through [`EnvSource`] so validation can be exercised against an
//! in-memory map. Every validator returns a structured [`InstallerError`]; only
//! the binary turns those into a process exit.

use std::borrow::Cow;
use std::collections::HashMap;
use std::hash::BuildHasher;
use std::path::PathBuf;

use url::Url;

use super::core::{DbConnection, InstallConfiguration};
use super::error::InstallerError;

pub const FILE: &str = "FILE";
pub const EXTERNAL_URL: &str = "EXTERNAL_URL";
pub const INTERNAL_URL: &str = "INTERNAL_URL";
pub const DB_CONNECTION_TYPE: &str = "DB_CONNECTION_TYPE";
pub const DB_USER: &str = "DB_USER";
pub const DB_PASSWORD: &str = "DB_PASSWORD";
pub const DB_NAME: &str = "DB_NAME";
pub const DB_TCP_HOST: &str = "DB_TCP_HOST";
pub const DB_TCP_PORT: &str = "DB_TCP_PORT";
pub const DB_SOCKET_FILE: &str = "DB_SOCKET_FILE";
pub const DB_DSN: &str = "DB_DSN";
pub const FRONTEND_LOGIN: &str = "FRONTEND_LOGIN";
pub const FRONTEND_PASSWORD: &str = "FRONTEND_PASSWORD";
pub const DATASOURCE_PATH: &str = "DATASOURCE_PATH";
pub const OPENID_CONNECT_CLIENT_ID: &str = "OPENID_CONNECT_CLIENT_ID";
pub const OPENID_CONNECT_CLIENT_SECRET: &str = "OPENID_CONNECT_CLIENT_SECRET";

/// Source of environment variables
pub trait EnvSource {
    /// Value of `key`, `None` when unset
    fn var(&self, key: &str) -> Option<String>;
}

/// The real process environment
#[derive(Debug, Default, Clone, Copy)]
pub struct ProcessEnv;

impl EnvSource for ProcessEnv {
    fn var(&self, key: &str) -> Option<String> {
        std::env::var(key).ok()
    }
}

impl<S: BuildHasher> EnvSource for HashMap<String, String, S> {
    fn var(&self, key: &str) -> Option<String> {
        self.get(key).cloned()
    }
}

/// Value of `key`, treating unset the same as empty
fn value(env: &dyn EnvSource, key: &str) -> String {
    env.var(key).unwrap_or_default()
}

/// Path of the installation marker (`FILE`), always required
pub fn marker_path(env: &dyn EnvSource) -> Result<PathBuf, InstallerError> {
    let raw = value(env, FILE);
    if raw.is_empty() {
        return Err(InstallerError::MissingVariable { var: FILE });
    }
    Ok(PathBuf::from(raw))
}

/// Parse a URL, accepting bare `host:port` listen addresses
///
/// `0.0.0.0:8080` has no scheme, so it is read as `http://0.0.0.0:8080`.
/// Either way the result must carry a host.
pub fn parse_url(var: &'static str, raw: &str) -> Result<Url, InstallerError> {
    let candidate: Cow<'_, str> = if raw.contains("://") {
        Cow::Borrowed(raw)
    } else {
        Cow::Owned(format!("http://{raw}"))
    };

    let invalid = |reason: String| InstallerError::InvalidUrl {
        var,
        value: raw.to_string(),
        reason,
    };

    let url = Url::parse(&candidate).map_err(|e| invalid(e.to_string()))?;
    if url.host_str().is_none_or(str::is_empty) {
        return Err(invalid("missing host".to_string()));
    }
    Ok(url)
}

/// Externally advertised base URL, returned as given once it parses
///
/// An empty value is kept as is and left for the main application to fill.
pub fn external_url(env: &dyn EnvSource) -> Result<String, InstallerError> {
    let raw = value(env, EXTERNAL_URL);
    if !raw.is_empty() {
        parse_url(EXTERNAL_URL, &raw)?;
    }
    Ok(raw)
}

/// Bind address of the main application, mandatory
pub fn internal_url(env: &dyn EnvSource) -> Result<String, InstallerError> {
    let raw = value(env, INTERNAL_URL);
    if raw.is_empty() {
        return Err(InstallerError::EmptyInternalUrl);
    }
    parse_url(INTERNAL_URL, &raw)?;
    Ok(raw)
}

fn required(env: &dyn EnvSource, var: &'static str, mode: &'static str) -> Result<String, InstallerError> {
    let raw = value(env, var);
    if raw.is_empty() {
        return Err(InstallerError::MissingDbField { var, mode });
    }
    Ok(raw)
}

/// Resolve the database mode selected by `DB_CONNECTION_TYPE`
///
/// Fields are checked in a fixed order, so the first missing variable is the
/// one reported.
pub fn resolve_db_connection(env: &dyn EnvSource) -> Result<DbConnection, InstallerError> {
    let kind = value(env, DB_CONNECTION_TYPE);
    match kind.as_str() {
        "tcp" => Ok(DbConnection::Tcp {
            hostname: required(env, DB_TCP_HOST, "tcp")?,
            port: required(env, DB_TCP_PORT, "tcp")?,
            user: required(env, DB_USER, "tcp")?,
            password: required(env, DB_PASSWORD, "tcp")?,
            name: required(env, DB_NAME, "tcp")?,
        }),
        "socket" => Ok(DbConnection::Socket {
            file: required(env, DB_SOCKET_FILE, "socket")?,
            user: required(env, DB_USER, "socket")?,
            password: required(env, DB_PASSWORD, "socket")?,
            name: required(env, DB_NAME, "socket")?,
        }),
        "" => Ok(DbConnection::Manual {
            dsn: required(env, DB_DSN, "not set")?,
        }),
        other => Err(InstallerError::InvalidDbConnectionType(other.to_string())),
    }
}

/// Apply the optional frontend, datasource and identity-provider overrides
///
/// Empty values leave the collaborator defaults in place.
pub fn apply_overrides(env: &dyn EnvSource, config: &mut InstallConfiguration) {
    let login = value(env, FRONTEND_LOGIN);
    if !login.is_empty() {
        config.frontend_login = login;
    }

    let password = value(env, FRONTEND_PASSWORD);
    if !password.is_empty() {
        // the collaborator expects a confirmed password
        config.frontend_repeat_password = password.clone();
        config.frontend_password = password;
    }

    let ds_path = value(env, DATASOURCE_PATH);
    if !ds_path.is_empty() {
        config.ds_folder = ds_path;
    }

    let oidc_id = value(env, OPENID_CONNECT_CLIENT_ID);
    if !oidc_id.is_empty() {
        config.external_dex_id = oidc_id;
    }

    let oidc_secret = value(env, OPENID_CONNECT_CLIENT_SECRET);
    if !oidc_secret.is_empty() {
        config.external_dex_secret = oidc_secret;
    }
}

//! Error taxonomy for the bootstrap sequence
//!
//! Every variant except [`InstallerError::Install`] is fatal to the run. The
//! binary maps any of them to a diagnostic plus a non-zero exit status.

use std::path::PathBuf;

/// Errors raised while validating, installing or handing off
#[derive(Debug, thiserror::Error)]
pub enum InstallerError {
    /// A variable that must always be present is missing or empty
    #[error("Won't run as {var} environment variable is not present")]
    MissingVariable { var: &'static str },

    #[error("Unable to parse '{var}' environment variable '{value}' as valid URL: {reason}")]
    InvalidUrl {
        var: &'static str,
        value: String,
        reason: String,
    },

    #[error(
        "INTERNAL_URL environment variable is required to be a server listening address, e.g. 0.0.0.0:8080"
    )]
    EmptyInternalUrl,

    #[error(
        "Failed to parse environment variable DB_CONNECTION_TYPE: expected: tcp, socket or empty; got: {0}"
    )]
    InvalidDbConnectionType(String),

    /// A field required by the selected database mode is empty
    #[error("'{var}' should not be empty if DB_CONNECTION_TYPE is {mode}")]
    MissingDbField {
        var: &'static str,
        mode: &'static str,
    },

    #[error("Can't connect to the database, check your environment variables:\n {0}")]
    DatabaseCheck(String),

    #[error("Configuration store error: {0}")]
    ConfigStore(String),

    #[error("Unable to allocate a port for the service registry: {0}")]
    PortAllocation(#[source] std::io::Error),

    #[error("Unable to create installation marker {}: {source}", path.display())]
    Marker {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Unable to execute {program}: {reason}")]
    HandOff { program: String, reason: String },

    /// Reported by the install collaborator; logged, never fatal
    #[error("Installation Error: {0}")]
    Install(String),
}

impl InstallerError {
    /// Whether the bootstrap sequence must stop on this error
    pub fn is_fatal(&self) -> bool {
        !matches!(self, InstallerError::Install(_))
    }
}

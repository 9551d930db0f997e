//! Installation state detection
//!
//! A single marker file records that the first-run install completed. Only
//! its existence matters; the contents are never read.

use std::fs;
use std::path::Path;

use super::error::InstallerError;

/// Installation state enum
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InstallationState {
    /// No marker, first-run install required
    NotInstalled,
    /// Marker present, hand off straight away
    Installed,
}

/// Check whether the marker at `marker` exists
///
/// Any stat outcome other than "not found" counts as installed, so an
/// unreadable marker never triggers a second installation.
pub fn check_installation_state(marker: &Path) -> InstallationState {
    match fs::metadata(marker) {
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => InstallationState::NotInstalled,
        _ => InstallationState::Installed,
    }
}

/// Create (or truncate) the empty marker file
pub fn write_marker(marker: &Path) -> Result<(), InstallerError> {
    fs::File::create(marker)
        .map(drop)
        .map_err(|source| InstallerError::Marker {
            path: marker.to_path_buf(),
            source,
        })
}

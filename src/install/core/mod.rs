//! Core data types shared by the controller and the install collaborator

mod check;
mod install_config;
mod progress;

pub use check::CheckResult;
pub use install_config::{DbConnection, InstallConfiguration};
pub use progress::{LogProgress, ProgressEvent, ProgressSink};

//! Hand-off to the main application
//!
//! On unix the installer replaces its own process image, keeping the pid and
//! the environment, so the container runtime supervises the application
//! directly. Elsewhere the application is spawned, awaited, and its exit
//! status propagated.

use std::io::Write;
use std::path::PathBuf;
use std::process::Command;

use log::info;

use super::error::InstallerError;

/// Capability to start the main application in place of the installer
pub trait MainApplication {
    /// Start the application
    ///
    /// Real implementations never return `Ok`: the installer process is gone
    /// once the application runs.
    fn launch(&self) -> Result<(), InstallerError>;
}

/// Launches `program args...` found on `PATH`
#[derive(Debug, Clone)]
pub struct ExecLauncher {
    program: String,
    args: Vec<String>,
}

impl ExecLauncher {
    pub fn new(program: impl Into<String>, args: Vec<String>) -> Self {
        Self {
            program: program.into(),
            args,
        }
    }

    fn hand_off_error(&self, reason: impl ToString) -> InstallerError {
        InstallerError::HandOff {
            program: self.program.clone(),
            reason: reason.to_string(),
        }
    }

    /// Absolute path of the program, resolved against `PATH`
    pub fn resolve(&self) -> Result<PathBuf, InstallerError> {
        which::which(&self.program).map_err(|e| self.hand_off_error(e))
    }
}

impl MainApplication for ExecLauncher {
    fn launch(&self) -> Result<(), InstallerError> {
        let path = self.resolve()?;
        info!("execve {} {}...", path.display(), self.args.join(" "));

        // nothing buffered may be lost once the image is replaced
        let _ = std::io::stdout().flush();
        let _ = std::io::stderr().flush();

        let mut command = Command::new(&path);
        command.args(&self.args);

        let err = replace_process(command, &self.program);
        Err(self.hand_off_error(err))
    }
}

cfg_if::cfg_if! {
    if #[cfg(unix)] {
        /// Replace the current process image; only returns on failure
        fn replace_process(mut command: Command, arg0: &str) -> std::io::Error {
            use std::os::unix::process::CommandExt;

            command.arg0(arg0).exec()
        }
    } else {
        /// Run the application to completion and exit with its status
        fn replace_process(mut command: Command, _arg0: &str) -> std::io::Error {
            match command.status() {
                Ok(status) => std::process::exit(status.code().unwrap_or(1)),
                Err(e) => e,
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn missing_program_is_a_hand_off_error() {
        let launcher = ExecLauncher::new("cells-definitely-not-installed", vec!["start".into()]);
        match launcher.launch().unwrap_err() {
            InstallerError::HandOff { program, .. } => {
                assert_eq!(program, "cells-definitely-not-installed")
            }
            other => panic!("unexpected error {other}"),
        }
    }
}

use std::path::PathBuf;

use clap::Parser;

#[derive(Parser, Debug)]
#[command(version, about = "Unattended Pydio Cells installer and launcher")]
pub struct Args {
    /// Configuration file shared with the main application
    #[arg(long, short = 'c', env = "CELLS_CONFIG_FILE")]
    pub config: Option<PathBuf>,

    /// Directory holding datasources and application data
    #[arg(long, env = "CELLS_DATA_DIR")]
    pub data_dir: Option<PathBuf>,

    /// Main application executable, looked up on PATH
    #[arg(long, env = "CELLS_PROGRAM", default_value = "cells")]
    pub program: String,

    /// Arguments passed to the main application
    #[arg(trailing_var_arg = true, allow_hyphen_values = true, default_value = "start")]
    pub app_args: Vec<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_start_cells() {
        let args = Args::try_parse_from(["cells-autoinstall"]).unwrap();
        assert_eq!(args.program, "cells");
        assert_eq!(args.app_args, vec!["start".to_string()]);
    }

    #[test]
    fn trailing_arguments_override_start() {
        let args = Args::try_parse_from([
            "cells-autoinstall",
            "--program",
            "/opt/cells/bin/cells",
            "--",
            "start",
            "--log",
            "debug",
        ])
        .unwrap();
        assert_eq!(args.program, "/opt/cells/bin/cells");
        assert_eq!(args.app_args, vec!["start", "--log", "debug"]);
    }
}

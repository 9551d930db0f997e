mod cli;

use anyhow::{Context, Result};
use cells_autoinstall::config::default_config_path;
use cells_autoinstall::install::library::LocalInstallLibrary;
use cells_autoinstall::install::{self, BootstrapOptions, Outcome};
use clap::Parser;
use log::{error, info};

fn main() {
    // Log to stdout, which is what container runtimes collect
    env_logger::Builder::from_default_env()
        .format(|buf, record| {
            use std::io::Write;
            writeln!(
                buf,
                "[{} {} {}:{}] {}",
                buf.timestamp_millis(),
                record.level(),
                record.file().unwrap_or("unknown"),
                record.line().unwrap_or(0),
                record.args()
            )
        })
        .filter_level(log::LevelFilter::Info)
        .parse_default_env()
        .target(env_logger::Target::Stdout)
        .init();

    let rt = match tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()
    {
        Ok(rt) => rt,
        Err(e) => {
            eprintln!("FATAL: Failed to create Tokio runtime: {e}");
            std::process::exit(1);
        }
    };
    if let Err(e) = rt.block_on(real_main()) {
        error!("{e:#}");
        std::process::exit(1);
    }
}

async fn real_main() -> Result<()> {
    let args = cli::Args::parse();

    let options = BootstrapOptions {
        config_path: args.config.unwrap_or_else(default_config_path),
        data_dir: args
            .data_dir
            .unwrap_or_else(LocalInstallLibrary::default_data_dir),
        program: args.program,
        args: args.app_args,
    };
    info!("Using config from: {}", options.config_path.display());

    match install::bootstrap(&options)
        .await
        .context("Automatic installation aborted")?
    {
        Outcome::AlreadyInstalled => info!("{} exited", options.program),
        Outcome::Installed => info!("{} exited after installation", options.program),
    }
    Ok(())
}

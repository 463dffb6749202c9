//! suite-restore: restore PS Business Suites data from a backup archive

use anyhow::Result;
use clap::Parser;
use std::process::ExitCode;
use tracing_subscriber::EnvFilter;

use suite_restore::commands::restore::{self, RestoreOptions};
use suite_restore::config::{self, Environment};
use suite_restore::error::RestoreError;
use suite_restore::suite::AppKind;

#[derive(Parser)]
#[command(name = "suite-restore")]
#[command(about = "Restore PS Business Suites data from a backup archive", long_about = None)]
#[command(version)]
struct Cli {
    /// Path to the backup zip file
    #[arg(long)]
    backup: String,

    /// App the backup belongs to (detected from the archive if omitted)
    #[arg(long, value_enum)]
    app: Option<AppKind>,

    /// Override the data directory used for restore
    #[arg(long)]
    data_dir: Option<String>,

    /// Show what would be restored without writing files
    #[arg(short = 'n', long)]
    dry_run: bool,

    /// Enable debug logging (RUST_LOG takes precedence)
    #[arg(short, long)]
    verbose: bool,
}

fn main() -> Result<ExitCode> {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    let options = RestoreOptions {
        backup: config::expand_home(&cli.backup),
        app: cli.app,
        data_dir: cli.data_dir.as_deref().map(config::expand_home),
        dry_run: cli.dry_run,
    };
    match restore::execute_with(&options, Environment::from_env) {
        Ok(_) => Ok(ExitCode::SUCCESS),
        Err(err) => match err.downcast_ref::<RestoreError>() {
            Some(input_err) => {
                eprintln!("{}", input_err);
                Ok(ExitCode::from(input_err.exit_code()))
            }
            None => Err(err),
        },
    }
}

fn init_logging(verbose: bool) {
    let default = if verbose { "debug" } else { "warn" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();
}

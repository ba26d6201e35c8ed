pub mod batch;
pub mod cli;
pub mod config;
pub mod error;
pub mod finalize;
pub mod io_utils;
pub mod layout;
pub mod normalize;
pub mod pipeline;
pub mod reconcile;
pub mod recordset;
pub mod report;
pub mod sortkey;
pub mod table;

use std::{env, fs, io::Write, sync::OnceLock};

use anyhow::{Context, Result};
use clap::Parser;
use log::{LevelFilter, info};

use crate::cli::{Cli, Commands, InitConfigArgs};

static LOGGER: OnceLock<()> = OnceLock::new();

fn init_logging() {
    LOGGER.get_or_init(|| {
        let mut builder = env_logger::Builder::from_env(env_logger::Env::default());
        if env::var("RUST_LOG").is_err() {
            builder.filter_module("csv_reconcile", LevelFilter::Info);
        }
        let _ = builder.format_timestamp_millis().try_init();
    });
}

pub fn run() -> Result<()> {
    init_logging();
    let cli = Cli::parse();
    match cli.command {
        Commands::Reconcile(args) => batch::execute_reconcile(&args),
        Commands::Batch(args) => batch::execute_batch(&args),
        Commands::Layout(args) => batch::execute_layout(&args),
        Commands::InitConfig(args) => handle_init_config(&args),
    }
}

fn handle_init_config(args: &InitConfigArgs) -> Result<()> {
    let template = config::RunConfig::template();
    if io_utils::is_dash(&args.output) {
        std::io::stdout()
            .write_all(template.as_bytes())
            .context("Writing config template to stdout")?;
    } else {
        fs::write(&args.output, template)
            .with_context(|| format!("Writing config template to {:?}", args.output))?;
        info!("Starter configuration written to {:?}", args.output);
    }
    Ok(())
}

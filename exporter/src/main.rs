//! `export-tdesc`: write TDESC files for the tuned classes of a host module.
//!
//! Loads the host catalog (installing the standing hooks while it does),
//! resolves the output root above the tool location, and runs one export.

use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Parser;
use tdesc_export::exit_codes;
use tdesc_export::export::{Exporter, USAGE};
use tdesc_export::host::HostRuntime;
use tdesc_export::io::catalog::load_catalog;
use tdesc_export::io::config::load_config;
use tdesc_export::io::export_root::ExportRootLocator;
use tdesc_export::io::output::{Output, StdoutOutput};
use tdesc_export::io::tdesc::TdescWriter;
use tdesc_export::logging;
use tracing::debug;

#[derive(Parser)]
#[command(
    name = "export-tdesc",
    version,
    about = "Export TDESC files for tuned classes of a host module"
)]
struct Cli {
    /// Host catalog describing modules and tunables (TOML).
    #[arg(long, default_value = "catalog.toml")]
    catalog: PathBuf,

    /// Exporter configuration (TOML). Defaults apply when missing.
    #[arg(long, default_value = "export_tdesc.toml")]
    config: PathBuf,

    /// Directory to start the output root search from, instead of the
    /// executable's directory.
    #[arg(long)]
    from: Option<PathBuf>,

    /// Module to export, e.g. `my.module`.
    #[arg(default_value = "")]
    module_name: String,

    /// Single class of the module to export (matched case-insensitively).
    #[arg(default_value = "")]
    class_name: String,

    /// Raise diagnostic logging on stderr (-v info, -vv debug, -vvv trace).
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,
}

fn main() {
    let cli = Cli::parse();
    match logging::init(cli.verbose).and_then(|()| run(cli)) {
        Ok(code) => std::process::exit(code),
        Err(err) => {
            eprintln!("{:#}", err);
            std::process::exit(exit_codes::INVALID);
        }
    }
}

fn run(cli: Cli) -> Result<i32> {
    if cli.module_name.is_empty() {
        // Nothing to resolve: skip host start-up entirely.
        for line in USAGE {
            StdoutOutput.emit(line);
        }
        return Ok(exit_codes::OK);
    }

    let cfg = load_config(&cli.config)?;
    let catalog = load_catalog(&cli.catalog)?;
    let host = HostRuntime::from_catalog(&catalog).context("load host catalog")?;
    debug!(catalog = %cli.catalog.display(), "host loaded");

    let locator = match &cli.from {
        Some(dir) => ExportRootLocator::new(dir, &cfg),
        None => ExportRootLocator::from_current_exe(&cfg)?,
    };
    let writer = TdescWriter::new(&host, cfg.file_extension.clone());
    let exporter = Exporter::new(&host, &writer, &locator, cfg.nested_namespaces);

    let run = exporter.run(&cli.module_name, &cli.class_name, &mut StdoutOutput);
    if run.succeeded() {
        Ok(exit_codes::OK)
    } else {
        Ok(exit_codes::FAILED)
    }
}

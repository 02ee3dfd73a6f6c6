#![forbid(unsafe_code)]

//! Converts a saved playlist widget page into a flat JSON list.

use std::fs;
use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Parser;
use nicodata_tools::config::{DEFAULT_CONFIG_PATH, load_runtime_config};
use nicodata_tools::importer::parse_playlist_html;
use nicodata_tools::{logging, store};
use tracing::info;

#[derive(Parser, Debug)]
#[command(author, version, about = "Import a saved playlist HTML page as JSON.")]
struct Cli {
    #[arg(long = "input", value_name = "PATH", help = "Saved playlist HTML")]
    input: Option<PathBuf>,
    #[arg(long = "output", value_name = "PATH", help = "JSON file to write")]
    output: Option<PathBuf>,
    #[arg(long = "config", value_name = "PATH", default_value = DEFAULT_CONFIG_PATH, help = "Path to the config file")]
    config: PathBuf,
    #[arg(short = 'v', long = "verbose", help = "Enable debug logging")]
    verbose: bool,
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    logging::init(cli.verbose)?;

    let runtime = load_runtime_config(&cli.config)?;
    let input = cli.input.unwrap_or(runtime.import_html);
    let output = cli.output.unwrap_or(runtime.import_output);

    let html =
        fs::read_to_string(&input).with_context(|| format!("reading {}", input.display()))?;
    let entries = parse_playlist_html(&html);

    store::save_collection(&output, &entries)?;
    info!("Wrote {} entries to {}", entries.len(), output.display());
    Ok(())
}

#![forbid(unsafe_code)]

//! Draws a placeholder thumbnail for every record that lacks one and points
//! the record's `thumbnail` field at it.

use std::path::PathBuf;

use anyhow::Result;
use clap::Parser;
use nicodata_tools::config::{DEFAULT_CONFIG_PATH, load_runtime_config};
use nicodata_tools::logging;
use nicodata_tools::placeholder::{PlaceholderRenderer, resolve_font};
use nicodata_tools::thumbnails::ThumbnailPass;

#[derive(Parser, Debug)]
#[command(author, version, about = "Create placeholder thumbnails for the video data files.")]
struct Cli {
    #[arg(long = "data-root", value_name = "PATH", help = "Directory holding <year>/videos_*.json")]
    data_root: Option<PathBuf>,
    #[arg(long = "output-dir", value_name = "PATH", help = "Directory receiving <id>.jpg files")]
    output_dir: Option<PathBuf>,
    #[arg(long = "font", value_name = "PATH", help = "Preferred TrueType/OpenType font")]
    font: Option<PathBuf>,
    #[arg(long = "config", value_name = "PATH", default_value = DEFAULT_CONFIG_PATH, help = "Path to the config file")]
    config: PathBuf,
    #[arg(short = 'v', long = "verbose", help = "Enable debug logging")]
    verbose: bool,
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    logging::init(cli.verbose)?;

    let runtime = load_runtime_config(&cli.config)?;
    let data_root = cli.data_root.unwrap_or(runtime.data_root);
    let output_dir = cli.output_dir.unwrap_or(runtime.thumbnails_dir);
    let font_path = cli.font.or(runtime.font_path);

    let mut renderer = PlaceholderRenderer::new(resolve_font(font_path.as_deref()));
    let pass = ThumbnailPass::new(output_dir, runtime.thumbnail_url_prefix);
    pass.run(&data_root, &mut renderer)?;
    Ok(())
}

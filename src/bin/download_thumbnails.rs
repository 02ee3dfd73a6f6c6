#![forbid(unsafe_code)]

//! Downloads the platform thumbnail for every record that lacks a local one
//! and points the record's `thumbnail` field at it.

use std::path::PathBuf;
use std::time::Duration;

use anyhow::Result;
use clap::Parser;
use nicodata_tools::config::{DEFAULT_CONFIG_PATH, load_runtime_config};
use nicodata_tools::download::DownloadSource;
use nicodata_tools::http::{HttpClient, HttpConfig, Pacer};
use nicodata_tools::logging;
use nicodata_tools::thumbnails::ThumbnailPass;

const REQUEST_TIMEOUT: Duration = Duration::from_secs(10);
const REQUEST_INTERVAL: Duration = Duration::from_millis(500);

#[derive(Parser, Debug)]
#[command(author, version, about = "Download thumbnails for the video data files.")]
struct Cli {
    #[arg(long = "data-root", value_name = "PATH", help = "Directory holding <year>/videos_*.json")]
    data_root: Option<PathBuf>,
    #[arg(long = "output-dir", value_name = "PATH", help = "Directory receiving <id>.jpg files")]
    output_dir: Option<PathBuf>,
    #[arg(long = "config", value_name = "PATH", default_value = DEFAULT_CONFIG_PATH, help = "Path to the config file")]
    config: PathBuf,
    #[arg(short = 'v', long = "verbose", help = "Enable debug logging")]
    verbose: bool,
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    logging::init(cli.verbose)?;

    let runtime = load_runtime_config(&cli.config)?;
    let data_root = cli.data_root.unwrap_or(runtime.data_root.clone());
    let output_dir = cli.output_dir.unwrap_or(runtime.thumbnails_dir.clone());

    let client = HttpClient::new(&HttpConfig::from_runtime(&runtime, REQUEST_TIMEOUT));
    let mut source = DownloadSource::new(&client, Pacer::new(REQUEST_INTERVAL));
    let pass = ThumbnailPass::new(output_dir, runtime.thumbnail_url_prefix);
    pass.run(&data_root, &mut source)?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn cli_parses_overrides() {
        let cli = Cli::try_parse_from([
            "download_thumbnails",
            "--data-root=/srv/data",
            "--config",
            "/etc/nicodata.env",
            "-v",
        ])
        .unwrap();
        assert_eq!(cli.data_root, Some(PathBuf::from("/srv/data")));
        assert_eq!(cli.config, PathBuf::from("/etc/nicodata.env"));
        assert!(cli.output_dir.is_none());
        assert!(cli.verbose);
    }

    #[test]
    fn cli_rejects_unknown_flags() {
        assert!(Cli::try_parse_from(["download_thumbnails", "--bogus"]).is_err());
    }
}

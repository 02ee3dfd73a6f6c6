#![forbid(unsafe_code)]

//! Builds a JSON array of video records from a nicovideo mylist URL.

use std::path::PathBuf;
use std::time::Duration;

use anyhow::Result;
use clap::Parser;
use nicodata_tools::config::{DEFAULT_CONFIG_PATH, load_runtime_config};
use nicodata_tools::http::{HttpClient, HttpConfig, Pacer};
use nicodata_tools::nicovideo::PlaylistGenerator;
use nicodata_tools::{logging, store};
use tracing::info;

const REQUEST_TIMEOUT: Duration = Duration::from_secs(30);
const REQUEST_INTERVAL: Duration = Duration::from_secs(1);

#[derive(Parser, Debug)]
#[command(author, version, about = "Generate videos JSON from a nicovideo playlist.")]
struct Cli {
    #[arg(value_name = "PLAYLIST_URL", help = "nicovideo mylist URL")]
    playlist_url: String,
    #[arg(
        short = 'o',
        long = "output",
        value_name = "PATH",
        help = "Output file (default src/data/videos.json)"
    )]
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
    let output = cli.output.unwrap_or(runtime.playlist_output.clone());
    let client = HttpClient::new(&HttpConfig::from_runtime(&runtime, REQUEST_TIMEOUT));
    let today = chrono::Local::now().format("%Y-%m-%d").to_string();

    let mut generator = PlaylistGenerator::new(&client, Pacer::new(REQUEST_INTERVAL), today);
    let records = generator.generate(&cli.playlist_url);

    store::save_collection(&output, &records)?;
    info!("Wrote {} video(s) to {}", records.len(), output.display());
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn cli_accepts_short_output_flag() {
        let cli = Cli::try_parse_from([
            "generate_videos_json",
            "https://www.nicovideo.jp/mylist/1",
            "-o",
            "out.json",
        ])
        .unwrap();
        assert_eq!(cli.playlist_url, "https://www.nicovideo.jp/mylist/1");
        assert_eq!(cli.output, Some(PathBuf::from("out.json")));
        assert_eq!(cli.config, PathBuf::from(DEFAULT_CONFIG_PATH));
    }

    #[test]
    fn cli_requires_playlist_url() {
        assert!(Cli::try_parse_from(["generate_videos_json"]).is_err());
    }
}

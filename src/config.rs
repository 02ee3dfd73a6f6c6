use anyhow::{Context, Result};
use std::{
    fs,
    path::{Path, PathBuf},
};

pub const DEFAULT_CONFIG_PATH: &str = "nicodata.env";
pub const DEFAULT_DATA_ROOT: &str = "src/data";
pub const DEFAULT_THUMBNAILS_DIR: &str = "public/thumbnails";
pub const DEFAULT_THUMBNAIL_URL_PREFIX: &str = "/thumbnails";
pub const DEFAULT_PLAYLIST_OUTPUT: &str = "src/data/videos.json";
pub const DEFAULT_IMPORT_HTML: &str = "src/data/scripts/kiite_import.html";
pub const DEFAULT_IMPORT_OUTPUT: &str = "src/data/scripts/kiite_playlist.json";
pub const DEFAULT_USER_AGENT: &str = "Mozilla/5.0 (Macintosh; Intel Mac OS X 10_15_7) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/91.0.4472.124 Safari/537.36";

/// Values read from the env file. Every key is optional.
#[derive(Debug, Clone, Default)]
pub struct EnvConfig {
    pub data_root: Option<PathBuf>,
    pub thumbnails_dir: Option<PathBuf>,
    pub thumbnail_url_prefix: Option<String>,
    pub playlist_output: Option<PathBuf>,
    pub import_html: Option<PathBuf>,
    pub import_output: Option<PathBuf>,
    pub user_agent: Option<String>,
    pub font_path: Option<PathBuf>,
}

/// Fully resolved settings handed to the passes. Built once per run and passed
/// around explicitly.
#[derive(Debug, Clone)]
pub struct RuntimeConfig {
    pub data_root: PathBuf,
    pub thumbnails_dir: PathBuf,
    pub thumbnail_url_prefix: String,
    pub playlist_output: PathBuf,
    pub import_html: PathBuf,
    pub import_output: PathBuf,
    pub user_agent: String,
    pub font_path: Option<PathBuf>,
}

impl Default for RuntimeConfig {
    fn default() -> Self {
        Self::from_env(EnvConfig::default())
    }
}

impl RuntimeConfig {
    fn from_env(cfg: EnvConfig) -> Self {
        Self {
            data_root: cfg
                .data_root
                .unwrap_or_else(|| PathBuf::from(DEFAULT_DATA_ROOT)),
            thumbnails_dir: cfg
                .thumbnails_dir
                .unwrap_or_else(|| PathBuf::from(DEFAULT_THUMBNAILS_DIR)),
            thumbnail_url_prefix: cfg
                .thumbnail_url_prefix
                .unwrap_or_else(|| DEFAULT_THUMBNAIL_URL_PREFIX.to_string()),
            playlist_output: cfg
                .playlist_output
                .unwrap_or_else(|| PathBuf::from(DEFAULT_PLAYLIST_OUTPUT)),
            import_html: cfg
                .import_html
                .unwrap_or_else(|| PathBuf::from(DEFAULT_IMPORT_HTML)),
            import_output: cfg
                .import_output
                .unwrap_or_else(|| PathBuf::from(DEFAULT_IMPORT_OUTPUT)),
            user_agent: cfg
                .user_agent
                .unwrap_or_else(|| DEFAULT_USER_AGENT.to_string()),
            font_path: cfg.font_path,
        }
    }
}

pub fn read_env_config(path: &Path) -> Result<Option<EnvConfig>> {
    if !path.exists() {
        return Ok(None);
    }
    let content =
        fs::read_to_string(path).with_context(|| format!("Reading {}", path.display()))?;
    let mut cfg = EnvConfig::default();
    for line in content.lines() {
        let trimmed = line.trim();
        if trimmed.is_empty() || trimmed.starts_with('#') {
            continue;
        }
        if let Some((key, value_raw)) = trimmed.split_once('=') {
            let value = value_raw.trim().trim_matches('"');
            if value.is_empty() {
                continue;
            }
            match key.trim() {
                "DATA_ROOT" => cfg.data_root = Some(PathBuf::from(value)),
                "THUMBNAILS_DIR" => cfg.thumbnails_dir = Some(PathBuf::from(value)),
                "THUMBNAIL_URL_PREFIX" => {
                    cfg.thumbnail_url_prefix = Some(value.trim_end_matches('/').to_string());
                }
                "PLAYLIST_OUTPUT" => cfg.playlist_output = Some(PathBuf::from(value)),
                "IMPORT_HTML" => cfg.import_html = Some(PathBuf::from(value)),
                "IMPORT_OUTPUT" => cfg.import_output = Some(PathBuf::from(value)),
                "USER_AGENT" => cfg.user_agent = Some(value.to_string()),
                "FONT_PATH" => cfg.font_path = Some(PathBuf::from(value)),
                _ => {}
            }
        }
    }
    Ok(Some(cfg))
}

/// Loads the runtime configuration. A missing file simply yields the defaults.
pub fn load_runtime_config(path: impl AsRef<Path>) -> Result<RuntimeConfig> {
    let cfg = read_env_config(path.as_ref())?.unwrap_or_default();
    Ok(RuntimeConfig::from_env(cfg))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    fn make_config(contents: &str) -> NamedTempFile {
        let mut file = NamedTempFile::new().unwrap();
        write!(file, "{}", contents).unwrap();
        file
    }

    #[test]
    fn read_env_config_extracts_paths() {
        let cfg = make_config("DATA_ROOT=\"/data\"\n# comment\nTHUMBNAILS_DIR=/thumbs\n");
        let parsed = read_env_config(cfg.path()).unwrap().unwrap();
        assert_eq!(parsed.data_root, Some(PathBuf::from("/data")));
        assert_eq!(parsed.thumbnails_dir, Some(PathBuf::from("/thumbs")));
        assert!(parsed.user_agent.is_none());
    }

    #[test]
    fn missing_config_file_yields_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let runtime = load_runtime_config(dir.path().join("absent.env")).unwrap();
        assert_eq!(runtime.data_root, PathBuf::from(DEFAULT_DATA_ROOT));
        assert_eq!(runtime.thumbnail_url_prefix, DEFAULT_THUMBNAIL_URL_PREFIX);
        assert_eq!(runtime.user_agent, DEFAULT_USER_AGENT);
        assert!(runtime.font_path.is_none());
    }

    #[test]
    fn url_prefix_loses_trailing_slash() {
        let cfg = make_config("THUMBNAIL_URL_PREFIX=\"/static/thumbs/\"\nFONT_PATH=/f.ttf\n");
        let runtime = load_runtime_config(cfg.path()).unwrap();
        assert_eq!(runtime.thumbnail_url_prefix, "/static/thumbs");
        assert_eq!(runtime.font_path, Some(PathBuf::from("/f.ttf")));
        assert_eq!(runtime.import_output, PathBuf::from(DEFAULT_IMPORT_OUTPUT));
    }
}

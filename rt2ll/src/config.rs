use std::{
    fs,
    path::{Path, PathBuf},
    time::Duration,
};

use anyhow::{bail, Context};
use lubelogger::ApiConfig;
use serde::Deserialize;
use tracing::{debug, warn};

/// Location of the fallback config file, relative to the home directory.
pub const CONFIG_RELATIVE_PATH: &str = ".local/rt2ll/rt2ll.json";

/// Contents of the fallback JSON config file.
#[derive(Deserialize, Debug, Clone, Default)]
pub struct FileConfig {
    #[serde(rename = "ApiURI", alias = "apiURI", alias = "apiUri", default)]
    pub api_uri: String,
    #[serde(rename = "Authorization", alias = "authorization", default)]
    pub authorization: String,
}

impl FileConfig {
    pub fn load(path: &Path) -> anyhow::Result<Self> {
        let contents = fs::read_to_string(path)
            .with_context(|| format!("reading config file {}", path.display()))?;
        serde_json::from_str(&contents)
            .with_context(|| format!("decoding config file {}", path.display()))
    }
}

pub fn default_config_path() -> Option<PathBuf> {
    std::env::var_os("HOME")
        .or_else(|| std::env::var_os("USERPROFILE"))
        .map(|home| PathBuf::from(home).join(CONFIG_RELATIVE_PATH))
}

/// Builds the API settings from flags/environment, falling back to the config file when
/// either the URI or the credential is missing.
pub fn resolve_api_config(
    api_uri: Option<String>,
    authorization: Option<String>,
    config_path: Option<&Path>,
    timeout: Duration,
) -> anyhow::Result<ApiConfig> {
    let api_uri = api_uri.filter(|v| !v.trim().is_empty());
    let authorization = authorization.filter(|v| !v.trim().is_empty());

    if let (Some(api_uri), Some(authorization)) = (api_uri, authorization) {
        return Ok(ApiConfig::new(api_uri, authorization).with_timeout(timeout));
    }

    warn!("Missing API_URI or AUTHORIZATION environment variables");

    let path = match config_path {
        Some(path) => path.to_path_buf(),
        None => default_config_path().context("cannot locate home directory for config file")?,
    };
    debug!(filename = %path.display(), "Reading config file");

    let file = FileConfig::load(&path)?;
    if file.api_uri.trim().is_empty() || file.authorization.trim().is_empty() {
        bail!("No configuration found in file {}", path.display());
    }

    Ok(ApiConfig::new(file.api_uri, file.authorization).with_timeout(timeout))
}

#[cfg(test)]
mod tests {
    use super::*;

    const TIMEOUT: Duration = Duration::from_secs(5);

    #[test]
    fn flags_win_over_the_file() {
        let config = resolve_api_config(
            Some("https://ll.example.com/api".into()),
            Some("key".into()),
            Some(Path::new("/does/not/exist.json")),
            TIMEOUT,
        )
        .unwrap();
        assert_eq!(config.api_uri, "https://ll.example.com/api");
        assert_eq!(config.authorization, "key");
        assert_eq!(config.timeout, TIMEOUT);
    }

    #[test]
    fn falls_back_to_the_file_when_incomplete() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("rt2ll.json");
        fs::write(
            &path,
            r#"{"ApiURI": "https://file.example.com/api", "Authorization": "Basic abc"}"#,
        )
        .unwrap();

        let config =
            resolve_api_config(Some("https://ignored".into()), Some("  ".into()), Some(&path), TIMEOUT)
                .unwrap();
        assert_eq!(config.api_uri, "https://file.example.com/api");
        assert_eq!(config.authorization, "Basic abc");
    }

    #[test]
    fn missing_file_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        let err = resolve_api_config(None, None, Some(&dir.path().join("nope.json")), TIMEOUT)
            .unwrap_err();
        assert!(err.to_string().contains("reading config file"));
    }

    #[test]
    fn empty_file_values_are_an_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("rt2ll.json");
        fs::write(&path, r#"{"ApiURI": "", "Authorization": ""}"#).unwrap();

        let err = resolve_api_config(None, None, Some(&path), TIMEOUT).unwrap_err();
        assert!(err.to_string().contains("No configuration found"));
    }
}

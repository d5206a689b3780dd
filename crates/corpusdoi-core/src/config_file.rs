use std::path::{Path, PathBuf};

use serde::Deserialize;

use crate::CoreError;

/// On-disk TOML configuration structure.
/// All fields are optional so partial configs work (merge with defaults).
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ConfigFile {
    pub api_keys: Option<ApiKeysConfig>,
    pub requests: Option<RequestsConfig>,
    pub output: Option<OutputConfig>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct ApiKeysConfig {
    pub s2_api_key: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct RequestsConfig {
    pub api_base_url: Option<String>,
    pub timeout_secs: Option<u64>,
    pub delay_with_key_ms: Option<u64>,
    pub delay_without_key_ms: Option<u64>,
    pub max_rate_limit_retries: Option<u32>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct OutputConfig {
    pub path: Option<String>,
}

/// Platform config directory path: `<config_dir>/corpusdoi/config.toml`.
pub fn config_path() -> Option<PathBuf> {
    dirs::config_dir().map(|d| d.join("corpusdoi").join("config.toml"))
}

/// Load config by cascading CWD `.corpusdoi.toml` over platform config.
/// CWD values override platform values.
pub fn load_config() -> ConfigFile {
    let platform = config_path().and_then(|p| load_from_path(&p));
    let cwd = load_from_path(Path::new(".corpusdoi.toml"));

    match (platform, cwd) {
        (None, None) => ConfigFile::default(),
        (Some(p), None) => p,
        (None, Some(c)) => c,
        (Some(p), Some(c)) => merge(p, c),
    }
}

/// Load a config from a specific path. Returns `None` if the file doesn't
/// exist or can't be parsed.
pub fn load_from_path(path: &Path) -> Option<ConfigFile> {
    let content = std::fs::read_to_string(path).ok()?;
    match parse(&content) {
        Ok(config) => {
            tracing::info!(path = %path.display(), "loaded config file");
            Some(config)
        }
        Err(e) => {
            tracing::warn!(path = %path.display(), error = %e, "ignoring unparsable config file");
            None
        }
    }
}

pub fn parse(content: &str) -> Result<ConfigFile, CoreError> {
    toml::from_str(content).map_err(|e| CoreError::Config(e.to_string()))
}

/// Merge two configs: `overlay` values take precedence over `base`.
pub fn merge(base: ConfigFile, overlay: ConfigFile) -> ConfigFile {
    ConfigFile {
        api_keys: Some(ApiKeysConfig {
            s2_api_key: overlay
                .api_keys
                .as_ref()
                .and_then(|a| a.s2_api_key.clone())
                .or_else(|| base.api_keys.as_ref().and_then(|a| a.s2_api_key.clone())),
        }),
        requests: Some(RequestsConfig {
            api_base_url: overlay
                .requests
                .as_ref()
                .and_then(|r| r.api_base_url.clone())
                .or_else(|| base.requests.as_ref().and_then(|r| r.api_base_url.clone())),
            timeout_secs: overlay
                .requests
                .as_ref()
                .and_then(|r| r.timeout_secs)
                .or_else(|| base.requests.as_ref().and_then(|r| r.timeout_secs)),
            delay_with_key_ms: overlay
                .requests
                .as_ref()
                .and_then(|r| r.delay_with_key_ms)
                .or_else(|| base.requests.as_ref().and_then(|r| r.delay_with_key_ms)),
            delay_without_key_ms: overlay
                .requests
                .as_ref()
                .and_then(|r| r.delay_without_key_ms)
                .or_else(|| {
                    base.requests
                        .as_ref()
                        .and_then(|r| r.delay_without_key_ms)
                }),
            max_rate_limit_retries: overlay
                .requests
                .as_ref()
                .and_then(|r| r.max_rate_limit_retries)
                .or_else(|| {
                    base.requests
                        .as_ref()
                        .and_then(|r| r.max_rate_limit_retries)
                }),
        }),
        output: Some(OutputConfig {
            path: overlay
                .output
                .as_ref()
                .and_then(|o| o.path.clone())
                .or_else(|| base.output.as_ref().and_then(|o| o.path.clone())),
        }),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn full_file_parses() {
        let toml_str = r#"
[api_keys]
s2_api_key = "abc"

[requests]
api_base_url = "http://localhost:8080"
timeout_secs = 20
delay_with_key_ms = 1000
delay_without_key_ms = 5000
max_rate_limit_retries = 1

[output]
path = "out.txt"
"#;
        let parsed = parse(toml_str).unwrap();
        assert_eq!(parsed.api_keys.unwrap().s2_api_key.unwrap(), "abc");
        let requests = parsed.requests.unwrap();
        assert_eq!(requests.timeout_secs, Some(20));
        assert_eq!(requests.delay_without_key_ms, Some(5000));
        assert_eq!(parsed.output.unwrap().path.unwrap(), "out.txt");
    }

    #[test]
    fn absent_sections_deserialize_as_none() {
        let parsed = parse("[output]\npath = \"x.txt\"\n").unwrap();
        assert!(parsed.api_keys.is_none());
        assert!(parsed.requests.is_none());
    }

    #[test]
    fn invalid_toml_is_config_error() {
        let err = parse("[requests\ntimeout_secs = ").unwrap_err();
        assert!(matches!(err, CoreError::Config(_)));
    }

    #[test]
    fn merge_overlay_wins() {
        let base = ConfigFile {
            api_keys: Some(ApiKeysConfig {
                s2_api_key: Some("base".to_string()),
            }),
            requests: Some(RequestsConfig {
                timeout_secs: Some(30),
                delay_with_key_ms: Some(900),
                ..Default::default()
            }),
            ..Default::default()
        };
        let overlay = ConfigFile {
            api_keys: Some(ApiKeysConfig {
                s2_api_key: Some("overlay".to_string()),
            }),
            requests: Some(RequestsConfig {
                timeout_secs: Some(5),
                ..Default::default()
            }),
            ..Default::default()
        };
        let merged = merge(base, overlay);
        assert_eq!(merged.api_keys.unwrap().s2_api_key.unwrap(), "overlay");
        let requests = merged.requests.unwrap();
        assert_eq!(requests.timeout_secs, Some(5));
        assert_eq!(requests.delay_with_key_ms, Some(900));
    }

    #[test]
    fn merge_base_preserved_when_overlay_absent() {
        let base = ConfigFile {
            output: Some(OutputConfig {
                path: Some("/base/dois.txt".to_string()),
            }),
            ..Default::default()
        };
        let merged = merge(base, ConfigFile::default());
        assert_eq!(merged.output.unwrap().path.unwrap(), "/base/dois.txt");
    }

    #[test]
    fn load_from_path_missing_or_broken() {
        let dir = tempfile::tempdir().unwrap();
        assert!(load_from_path(&dir.path().join("nope.toml")).is_none());

        let broken = dir.path().join("broken.toml");
        std::fs::write(&broken, "not = [valid").unwrap();
        assert!(load_from_path(&broken).is_none());

        let good = dir.path().join("good.toml");
        std::fs::write(&good, "[api_keys]\ns2_api_key = \"k\"\n").unwrap();
        let loaded = load_from_path(&good).unwrap();
        assert_eq!(loaded.api_keys.unwrap().s2_api_key.unwrap(), "k");
    }
}

use std::path::{Path, PathBuf};
use std::time::Duration;
use thiserror::Error;

pub mod config_file;
pub mod export;
pub mod extract;
pub mod lookup;
pub mod rate_limit;
pub mod runner;

// Re-export for convenience
pub use export::{DEFAULT_OUTPUT_FILE, format_doi_list, write_doi_list};
pub use extract::{CORPUS_URL_PREFIX, extract_corpus_ids};
pub use lookup::{PaperLookup, SemanticScholar};
pub use rate_limit::{LookupError, Pacing};
pub use runner::resolve_all;

/// Semantic Scholar's numeric paper identifier, kept as the digit string.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct CorpusId(String);

impl CorpusId {
    pub fn new(digits: impl Into<String>) -> Self {
        Self(digits.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for CorpusId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

/// Outcome of resolving one CorpusID.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Resolution {
    Doi(String),
    /// The paper exists but has no DOI on record.
    NoDoi,
    /// Server returned 404.
    NotFound,
    /// Server returned 429 (after any configured retries).
    RateLimited,
    /// Transport error, unexpected status, or bad body.
    Failed(String),
}

impl Resolution {
    pub fn from_lookup(result: Result<Option<String>, LookupError>) -> Self {
        match result {
            Ok(Some(doi)) => Resolution::Doi(doi),
            Ok(None) => Resolution::NoDoi,
            Err(LookupError::NotFound) => Resolution::NotFound,
            Err(LookupError::RateLimited { .. }) => Resolution::RateLimited,
            Err(e) => Resolution::Failed(e.to_string()),
        }
    }

    pub fn doi(&self) -> Option<&str> {
        match self {
            Resolution::Doi(doi) => Some(doi),
            _ => None,
        }
    }
}

/// Progress events emitted while resolving.
#[derive(Debug, Clone)]
pub enum ProgressEvent {
    Resolving {
        index: usize,
        total: usize,
        corpus_id: CorpusId,
    },
    Resolved {
        index: usize,
        total: usize,
        corpus_id: CorpusId,
        resolution: Resolution,
    },
    RateLimitRetry {
        index: usize,
        corpus_id: CorpusId,
        attempt: u32,
        backoff: Duration,
    },
    /// Pausing before the next lookup.
    Waiting { delay: Duration },
}

/// Every resolution of a run, in extraction order.
#[derive(Debug, Clone, Default)]
pub struct RunReport {
    pub entries: Vec<(CorpusId, Resolution)>,
}

impl RunReport {
    /// DOIs that were found, in extraction order.
    pub fn dois(&self) -> Vec<&str> {
        self.entries.iter().filter_map(|(_, r)| r.doi()).collect()
    }

    pub fn stats(&self) -> RunStats {
        let mut stats = RunStats {
            total: self.entries.len(),
            ..RunStats::default()
        };
        for (_, resolution) in &self.entries {
            match resolution {
                Resolution::Doi(_) => stats.found += 1,
                Resolution::NoDoi => stats.no_doi += 1,
                Resolution::NotFound => stats.not_found += 1,
                Resolution::RateLimited => stats.rate_limited += 1,
                Resolution::Failed(_) => stats.failed += 1,
            }
        }
        stats
    }
}

/// Summary counts for a complete run.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RunStats {
    pub total: usize,
    pub found: usize,
    pub no_doi: usize,
    pub not_found: usize,
    pub rate_limited: usize,
    pub failed: usize,
}

#[derive(Error, Debug)]
pub enum CoreError {
    #[error("{}: {source}", .path.display())]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },
    #[error("HTTP client error: {0}")]
    Http(#[from] reqwest::Error),
    #[error("config error: {0}")]
    Config(String),
}

/// Configuration for a resolution run.
#[derive(Clone)]
pub struct Config {
    pub s2_api_key: Option<String>,
    pub api_base_url: String,
    pub timeout_secs: u64,
    pub pacing: Pacing,
    /// Extra attempts after a 429. Zero means a rate-limited ID is skipped.
    pub max_rate_limit_retries: u32,
}

impl std::fmt::Debug for Config {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Config")
            .field("s2_api_key", &self.s2_api_key.as_ref().map(|_| "***"))
            .field("api_base_url", &self.api_base_url)
            .field("timeout_secs", &self.timeout_secs)
            .field("pacing", &self.pacing)
            .field("max_rate_limit_retries", &self.max_rate_limit_retries)
            .finish()
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            s2_api_key: None,
            api_base_url: lookup::semantic_scholar::DEFAULT_API_BASE_URL.to_string(),
            timeout_secs: 10,
            pacing: Pacing::default(),
            max_rate_limit_retries: 0,
        }
    }
}

impl Config {
    /// Build a config from on-disk settings, falling back to defaults per field.
    pub fn from_file(file: &config_file::ConfigFile) -> Self {
        let defaults = Self::default();
        let requests = file.requests.as_ref();
        Self {
            s2_api_key: file
                .api_keys
                .as_ref()
                .and_then(|a| a.s2_api_key.clone())
                .filter(|k| !k.trim().is_empty()),
            api_base_url: requests
                .and_then(|r| r.api_base_url.clone())
                .unwrap_or(defaults.api_base_url),
            // A zero timeout would fail every request.
            timeout_secs: requests
                .and_then(|r| r.timeout_secs)
                .filter(|&t| t > 0)
                .unwrap_or(defaults.timeout_secs),
            pacing: Pacing {
                with_key: requests
                    .and_then(|r| r.delay_with_key_ms)
                    .map(Duration::from_millis)
                    .unwrap_or(defaults.pacing.with_key),
                without_key: requests
                    .and_then(|r| r.delay_without_key_ms)
                    .map(Duration::from_millis)
                    .unwrap_or(defaults.pacing.without_key),
            },
            max_rate_limit_retries: requests
                .and_then(|r| r.max_rate_limit_retries)
                .unwrap_or(defaults.max_rate_limit_retries),
        }
    }

    /// The configured API key, ignoring empty values.
    pub fn api_key(&self) -> Option<&str> {
        self.s2_api_key.as_deref().filter(|k| !k.trim().is_empty())
    }

    pub fn has_api_key(&self) -> bool {
        self.api_key().is_some()
    }

    /// Pause between consecutive lookups.
    pub fn request_delay(&self) -> Duration {
        self.pacing.delay(self.has_api_key())
    }

    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }

    pub fn semantic_scholar(&self) -> SemanticScholar {
        SemanticScholar::new(self.api_key().map(String::from)).with_base_url(&self.api_base_url)
    }

    pub fn build_client(&self) -> Result<reqwest::Client, CoreError> {
        Ok(reqwest::Client::builder().timeout(self.timeout()).build()?)
    }
}

/// Read a citations file wholesale.
pub fn read_citations(path: &Path) -> Result<String, CoreError> {
    std::fs::read_to_string(path).map_err(|source| CoreError::Io {
        path: path.to_path_buf(),
        source,
    })
}

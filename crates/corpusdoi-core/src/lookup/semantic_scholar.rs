use std::time::Duration;

use serde::Deserialize;

use super::{LookupFuture, PaperLookup};
use crate::CorpusId;
use crate::rate_limit::{LookupError, check_status};

/// Graph API root used when no override is configured.
pub const DEFAULT_API_BASE_URL: &str = "https://api.semanticscholar.org/graph/v1";

#[derive(Debug, Deserialize)]
struct PaperResponse {
    #[serde(rename = "externalIds")]
    external_ids: Option<ExternalIds>,
}

#[derive(Debug, Deserialize)]
struct ExternalIds {
    #[serde(rename = "DOI")]
    doi: Option<String>,
}

pub struct SemanticScholar {
    pub api_key: Option<String>,
    pub base_url: String,
}

impl SemanticScholar {
    pub fn new(api_key: Option<String>) -> Self {
        Self {
            api_key,
            base_url: DEFAULT_API_BASE_URL.to_string(),
        }
    }

    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into();
        self
    }

    /// Paper endpoint for a CorpusID, without query string.
    pub fn paper_url(&self, corpus_id: &CorpusId) -> String {
        format!(
            "{}/paper/CorpusId:{}",
            self.base_url.trim_end_matches('/'),
            corpus_id
        )
    }
}

impl PaperLookup for SemanticScholar {
    fn name(&self) -> &str {
        "Semantic Scholar"
    }

    fn lookup<'a>(
        &'a self,
        corpus_id: &'a CorpusId,
        client: &'a reqwest::Client,
        timeout: Duration,
    ) -> LookupFuture<'a> {
        Box::pin(async move {
            let url = self.paper_url(corpus_id);

            let mut req = client
                .get(&url)
                .query(&[("fields", "externalIds")])
                .header("User-Agent", "corpusdoi")
                .timeout(timeout);

            if let Some(ref key) = self.api_key {
                req = req.header("x-api-key", key);
            }

            tracing::debug!(%url, keyed = self.api_key.is_some(), "semantic scholar lookup");
            let resp = req.send().await?;
            check_status(&resp)?;

            let data: PaperResponse = resp
                .json()
                .await
                .map_err(|e| LookupError::Other(format!("Invalid response body: {}", e)))?;

            Ok(data
                .external_ids
                .and_then(|ids| ids.doi)
                .map(|doi| doi.trim().to_string())
                .filter(|doi| !doi.is_empty()))
        })
    }
}

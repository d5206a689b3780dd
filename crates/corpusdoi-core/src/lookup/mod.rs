//! Lookup backend trait and the Semantic Scholar implementation.

pub mod semantic_scholar;

#[cfg(test)]
pub(crate) mod mock;

use std::future::Future;
use std::pin::Pin;
use std::time::Duration;

use crate::CorpusId;
use crate::rate_limit::LookupError;

/// Boxed future returned by [`PaperLookup::lookup`].
///
/// `Ok(None)` means the paper exists but has no DOI.
pub type LookupFuture<'a> =
    Pin<Box<dyn Future<Output = Result<Option<String>, LookupError>> + Send + 'a>>;

/// A backend that resolves a CorpusID to a DOI.
pub trait PaperLookup: Send + Sync {
    /// Human-readable backend name used in log lines.
    fn name(&self) -> &str;

    /// Look up a single paper. Exactly one request per call.
    fn lookup<'a>(
        &'a self,
        corpus_id: &'a CorpusId,
        client: &'a reqwest::Client,
        timeout: Duration,
    ) -> LookupFuture<'a>;
}

pub use semantic_scholar::SemanticScholar;

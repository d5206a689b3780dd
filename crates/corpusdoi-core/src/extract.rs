use once_cell::sync::Lazy;
use regex::Regex;

use crate::CorpusId;

/// Prefix every Semantic Scholar CorpusID URL starts with.
pub const CORPUS_URL_PREFIX: &str = "https://api.semanticscholar.org/CorpusID:";

static CORPUS_URL: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"https://api\.semanticscholar\.org/CorpusID:(\d+)").unwrap()
});

/// Extract every CorpusID embedded in a Semantic Scholar URL.
///
/// Operates on raw text, so it works the same on BibTeX, plain text, or
/// anything else. Results keep source order and duplicates are preserved.
pub fn extract_corpus_ids(text: &str) -> Vec<CorpusId> {
    CORPUS_URL
        .captures_iter(text)
        .filter_map(|caps| caps.get(1))
        .map(|m| CorpusId::new(m.as_str()))
        .collect()
}

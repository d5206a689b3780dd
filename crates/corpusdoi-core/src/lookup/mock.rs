//! Mock lookup backend for testing.

use std::sync::Mutex;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;

use super::{LookupFuture, PaperLookup};
use crate::CorpusId;
use crate::rate_limit::LookupError;

/// A configurable mock response for [`MockLookup`].
#[derive(Clone, Debug)]
pub enum MockResponse {
    Doi(String),
    NoDoi,
    NotFound,
    RateLimited { retry_after: Option<Duration> },
    Error(String),
}

/// A hand-rolled mock implementing [`PaperLookup`].
///
/// Responses are keyed by CorpusID; unknown IDs get the fallback. Each ID can
/// also be given a sequence, consumed one per call with the last one repeated.
pub struct MockLookup {
    responses: Mutex<Vec<(String, Vec<MockResponse>)>>,
    fallback: MockResponse,
    calls: Mutex<Vec<String>>,
    call_count: AtomicUsize,
}

impl MockLookup {
    pub fn new(fallback: MockResponse) -> Self {
        Self {
            responses: Mutex::new(Vec::new()),
            fallback,
            calls: Mutex::new(Vec::new()),
            call_count: AtomicUsize::new(0),
        }
    }

    pub fn respond(self, id: &str, response: MockResponse) -> Self {
        self.respond_seq(id, vec![response])
    }

    pub fn respond_seq(self, id: &str, mut responses: Vec<MockResponse>) -> Self {
        assert!(!responses.is_empty(), "sequence must have at least one response");
        responses.reverse();
        self.responses
            .lock()
            .unwrap()
            .push((id.to_string(), responses));
        self
    }

    pub fn call_count(&self) -> usize {
        self.call_count.load(Ordering::SeqCst)
    }

    /// CorpusIDs looked up, in call order.
    pub fn calls(&self) -> Vec<String> {
        self.calls.lock().unwrap().clone()
    }

    fn next_response(&self, id: &str) -> MockResponse {
        let mut table = self.responses.lock().unwrap();
        match table.iter_mut().find(|(k, _)| k == id) {
            Some((_, seq)) if seq.len() > 1 => seq.pop().unwrap(),
            Some((_, seq)) => seq[0].clone(),
            None => self.fallback.clone(),
        }
    }
}

impl PaperLookup for MockLookup {
    fn name(&self) -> &str {
        "Mock"
    }

    fn lookup<'a>(
        &'a self,
        corpus_id: &'a CorpusId,
        _client: &'a reqwest::Client,
        _timeout: Duration,
    ) -> LookupFuture<'a> {
        self.call_count.fetch_add(1, Ordering::SeqCst);
        self.calls.lock().unwrap().push(corpus_id.to_string());
        let response = self.next_response(corpus_id.as_str());

        Box::pin(async move {
            match response {
                MockResponse::Doi(doi) => Ok(Some(doi)),
                MockResponse::NoDoi => Ok(None),
                MockResponse::NotFound => Err(LookupError::NotFound),
                MockResponse::RateLimited { retry_after } => {
                    Err(LookupError::RateLimited { retry_after })
                }
                MockResponse::Error(msg) => Err(LookupError::Other(msg)),
            }
        })
    }
}

//! Request pacing and 429 handling.
//!
//! Semantic Scholar allows roughly 100 keyless requests per 5 minutes and
//! about 1 request per second with a basic-tier key. Lookups are issued one at
//! a time with a fixed pause between them; which pause applies depends only on
//! whether an API key is configured.

use std::time::Duration;

/// Default pause between lookups when an API key is configured.
pub const DEFAULT_DELAY_WITH_KEY: Duration = Duration::from_millis(1500);

/// Default pause between lookups without an API key.
pub const DEFAULT_DELAY_WITHOUT_KEY: Duration = Duration::from_secs(3);

/// Error type for a single lookup, distinguishing the outcomes callers report separately.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LookupError {
    /// Server returned 404.
    NotFound,
    /// Server returned 429 Too Many Requests.
    RateLimited { retry_after: Option<Duration> },
    /// Any other non-success status.
    Status(u16),
    /// Transport failure or undecodable body.
    Other(String),
}

impl std::fmt::Display for LookupError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            LookupError::NotFound => write!(f, "Not found (404)"),
            LookupError::RateLimited {
                retry_after: Some(d),
            } => write!(f, "Rate limited (429), retry after {:.1}s", d.as_secs_f64()),
            LookupError::RateLimited { retry_after: None } => write!(f, "Rate limited (429)"),
            LookupError::Status(code) => write!(f, "HTTP {}", code),
            LookupError::Other(msg) => write!(f, "{}", msg),
        }
    }
}

impl std::error::Error for LookupError {}

impl From<reqwest::Error> for LookupError {
    fn from(e: reqwest::Error) -> Self {
        LookupError::Other(e.to_string())
    }
}

/// Delay selection for the lookup loop.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Pacing {
    pub with_key: Duration,
    pub without_key: Duration,
}

impl Default for Pacing {
    fn default() -> Self {
        Self {
            with_key: DEFAULT_DELAY_WITH_KEY,
            without_key: DEFAULT_DELAY_WITHOUT_KEY,
        }
    }
}

impl Pacing {
    /// The pause to take after each lookup.
    pub fn delay(&self, has_api_key: bool) -> Duration {
        if has_api_key {
            self.with_key
        } else {
            self.without_key
        }
    }
}

/// Map a non-success response to a [`LookupError`], extracting Retry-After on 429.
///
/// Returns `Ok(())` for 2xx responses.
pub fn check_status(resp: &reqwest::Response) -> Result<(), LookupError> {
    let status = resp.status();
    if status.is_success() {
        return Ok(());
    }
    match status.as_u16() {
        404 => Err(LookupError::NotFound),
        429 => {
            let retry_after = resp
                .headers()
                .get("retry-after")
                .and_then(|v| v.to_str().ok())
                .and_then(parse_retry_after);
            Err(LookupError::RateLimited { retry_after })
        }
        code => Err(LookupError::Status(code)),
    }
}

/// Parse a Retry-After header value (seconds or HTTP-date).
pub fn parse_retry_after(value: &str) -> Option<Duration> {
    if let Ok(secs) = value.trim().parse::<u64>() {
        return Some(Duration::from_secs(secs));
    }
    // HTTP-date: no date parser here, use a conservative fallback
    if value.contains(',') || value.contains("GMT") {
        return Some(Duration::from_secs(5));
    }
    None
}

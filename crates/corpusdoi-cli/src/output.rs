use std::io::Write;
use std::path::Path;

use corpusdoi_core::{CorpusId, ProgressEvent, Resolution, RunStats};
use owo_colors::OwoColorize;

/// Whether to use colored output.
#[derive(Debug, Clone, Copy)]
pub struct ColorMode(pub bool);

impl ColorMode {
    pub fn enabled(&self) -> bool {
        self.0
    }
}

/// Explain the keyless slowdown and where to get a key.
pub fn print_missing_key_warning(w: &mut dyn Write, color: ColorMode) -> std::io::Result<()> {
    let headline = "Warning: no Semantic Scholar API key configured";
    if color.enabled() {
        writeln!(w, "{}", headline.yellow())?;
    } else {
        writeln!(w, "{}", headline)?;
    }
    writeln!(
        w,
        "Requests will be sent without a key and paced more slowly to avoid rate limiting."
    )?;
    writeln!(
        w,
        "Set S2_API_KEY (or API_KEY) in the environment or a .env file, or pass --s2-api-key."
    )?;
    writeln!(
        w,
        "Get a free key at: https://www.semanticscholar.org/product/api"
    )?;
    writeln!(w)?;
    Ok(())
}

/// Print how many CorpusID URLs were found in the input.
pub fn print_extraction_summary(
    w: &mut dyn Write,
    file_name: &str,
    total: usize,
) -> std::io::Result<()> {
    writeln!(w, "Scanning {}...", file_name)?;
    writeln!(w, "Found {} Semantic Scholar URLs to process", total)?;
    writeln!(w)?;
    Ok(())
}

/// Print a real-time progress event.
pub fn print_progress(
    w: &mut dyn Write,
    event: &ProgressEvent,
    color: ColorMode,
) -> std::io::Result<()> {
    match event {
        ProgressEvent::Resolving {
            index,
            total,
            corpus_id,
        } => {
            writeln!(w, "[{}/{}] CorpusID:{}", index + 1, total, corpus_id)?;
        }
        ProgressEvent::Resolved {
            index,
            total,
            corpus_id,
            resolution,
        } => {
            let idx = index + 1;
            let (label, detail) = outcome_text(corpus_id, resolution);
            let label = if color.enabled() {
                match resolution {
                    Resolution::Doi(_) => label.green().to_string(),
                    Resolution::NoDoi => label.dimmed().to_string(),
                    Resolution::RateLimited => label.yellow().to_string(),
                    Resolution::NotFound | Resolution::Failed(_) => label.red().to_string(),
                }
            } else {
                label.to_string()
            };
            writeln!(w, "[{}/{}] -> {} {}", idx, total, label, detail)?;
        }
        ProgressEvent::RateLimitRetry {
            corpus_id,
            attempt,
            backoff,
            ..
        } => {
            let msg = format!(
                "Rate limited on CorpusID:{}, retry {} in {:.1}s",
                corpus_id,
                attempt,
                backoff.as_secs_f64()
            );
            if color.enabled() {
                writeln!(w, "  {}", msg.yellow())?;
            } else {
                writeln!(w, "  {}", msg)?;
            }
        }
        // Pauses are routine; keep them out of the console.
        ProgressEvent::Waiting { .. } => {}
    }
    Ok(())
}

fn outcome_text(corpus_id: &CorpusId, resolution: &Resolution) -> (&'static str, String) {
    match resolution {
        Resolution::Doi(doi) => ("DOI:", doi.clone()),
        Resolution::NoDoi => ("NO DOI", format!("for CorpusID:{}", corpus_id)),
        Resolution::NotFound => ("NOT FOUND", format!("CorpusID:{}", corpus_id)),
        Resolution::RateLimited => (
            "RATE LIMITED",
            "(consider an API key or a longer delay)".to_string(),
        ),
        Resolution::Failed(reason) => ("FAILED", truncate(reason, 120)),
    }
}

/// Print the joined DOI list and where it was saved.
pub fn print_dois(
    w: &mut dyn Write,
    joined: &str,
    count: usize,
    output_path: &Path,
    color: ColorMode,
) -> std::io::Result<()> {
    writeln!(w)?;
    if color.enabled() {
        writeln!(w, "{}", format!("Found {} DOIs:", count).bold())?;
    } else {
        writeln!(w, "Found {} DOIs:", count)?;
    }
    if count == 0 {
        writeln!(w, "No DOIs were found.")?;
    } else {
        writeln!(w, "{}", joined)?;
    }
    writeln!(w)?;
    writeln!(w, "DOIs also saved to {}", output_path.display())?;
    Ok(())
}

/// Print the final summary.
pub fn print_summary(w: &mut dyn Write, stats: &RunStats, color: ColorMode) -> std::io::Result<()> {
    writeln!(w)?;
    let sep = "=".repeat(60);
    if color.enabled() {
        writeln!(w, "{}", sep.bold())?;
        writeln!(w, "{}", "SUMMARY".bold())?;
        writeln!(w, "{}", sep.bold())?;
    } else {
        writeln!(w, "{}", sep)?;
        writeln!(w, "SUMMARY")?;
        writeln!(w, "{}", sep)?;
    }

    writeln!(w, "  CorpusIDs processed: {}", stats.total)?;
    if color.enabled() {
        writeln!(w, "  {} {}", "DOIs found:".green(), stats.found)?;
    } else {
        writeln!(w, "  DOIs found: {}", stats.found)?;
    }
    if stats.no_doi > 0 {
        writeln!(w, "  No DOI on record: {}", stats.no_doi)?;
    }
    if stats.not_found > 0 {
        if color.enabled() {
            writeln!(w, "  {} {}", "Not found:".red(), stats.not_found)?;
        } else {
            writeln!(w, "  Not found: {}", stats.not_found)?;
        }
    }
    if stats.rate_limited > 0 {
        if color.enabled() {
            writeln!(w, "  {} {}", "Rate limited:".yellow(), stats.rate_limited)?;
        } else {
            writeln!(w, "  Rate limited: {}", stats.rate_limited)?;
        }
    }
    if stats.failed > 0 {
        if color.enabled() {
            writeln!(w, "  {} {}", "Failed:".red(), stats.failed)?;
        } else {
            writeln!(w, "  Failed: {}", stats.failed)?;
        }
    }
    writeln!(w)?;
    Ok(())
}

fn truncate(s: &str, max: usize) -> String {
    match s.char_indices().nth(max) {
        Some((cut, _)) => format!("{}...", &s[..cut]),
        None => s.to_string(),
    }
}

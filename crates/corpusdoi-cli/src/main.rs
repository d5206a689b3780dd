use std::io::{IsTerminal, Write};
use std::path::{Path, PathBuf};

use clap::Parser;
use corpusdoi_core::config_file;
use corpusdoi_core::{Config, DEFAULT_OUTPUT_FILE, ProgressEvent};
use tracing_subscriber::EnvFilter;

mod output;

use output::ColorMode;

/// Resolve Semantic Scholar CorpusID links in a citations file to DOIs
#[derive(Parser, Debug)]
#[command(version, about, long_about = None)]
struct Cli {
    /// Path to the citations file (BibTeX or any text containing CorpusID URLs)
    file_path: PathBuf,

    /// Semantic Scholar API key
    #[arg(long)]
    s2_api_key: Option<String>,

    /// Where to write the comma-separated DOI list
    #[arg(short, long)]
    output: Option<PathBuf>,

    /// Disable colored output
    #[arg(long)]
    no_color: bool,

    /// Dry run: list the extracted CorpusIDs without querying the API
    #[arg(long)]
    dry_run: bool,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    let color = ColorMode(!cli.no_color && std::io::stdout().is_terminal());

    if cli.dry_run {
        dry_run(&cli.file_path, color)
    } else {
        resolve(cli, color).await
    }
}

async fn resolve(cli: Cli, color: ColorMode) -> anyhow::Result<()> {
    let file_config = config_file::load_config();
    let mut config = Config::from_file(&file_config);

    // Resolve configuration: CLI flags > env vars > config file > defaults
    config.s2_api_key = pick_api_key(
        cli.s2_api_key,
        env_non_empty("S2_API_KEY"),
        env_non_empty("API_KEY"),
        config.s2_api_key,
    );
    let output_path = cli
        .output
        .or_else(|| {
            file_config
                .output
                .and_then(|o| o.path)
                .map(PathBuf::from)
        })
        .unwrap_or_else(|| PathBuf::from(DEFAULT_OUTPUT_FILE));
    tracing::debug!(?config, output = %output_path.display(), "resolved configuration");

    let text = read_input(&cli.file_path)?;
    let ids = corpusdoi_core::extract_corpus_ids(&text);

    let mut writer = std::io::stdout();
    output::print_extraction_summary(&mut writer, &display_name(&cli.file_path), ids.len())?;

    if !ids.is_empty() && !config.has_api_key() {
        output::print_missing_key_warning(&mut writer, color)?;
    }

    let client = config.build_client()?;
    let s2 = config.semantic_scholar();

    let progress_cb = move |event: ProgressEvent| {
        let mut out = std::io::stdout().lock();
        let _ = output::print_progress(&mut out, &event, color);
        let _ = out.flush();
    };

    let report = corpusdoi_core::resolve_all(&ids, &s2, &client, &config, progress_cb).await;

    // Only written once every ID has been attempted.
    let dois = report.dois();
    corpusdoi_core::write_doi_list(&output_path, &dois)?;

    output::print_dois(
        &mut writer,
        &corpusdoi_core::format_doi_list(&dois),
        dois.len(),
        &output_path,
        color,
    )?;
    output::print_summary(&mut writer, &report.stats(), color)?;

    Ok(())
}

fn dry_run(file_path: &Path, color: ColorMode) -> anyhow::Result<()> {
    use owo_colors::OwoColorize;

    let text = read_input(file_path)?;
    let ids = corpusdoi_core::extract_corpus_ids(&text);
    let mut writer = std::io::stdout();

    if color.enabled() {
        writeln!(
            writer,
            "{} {} ({} CorpusID URLs)\n",
            "DRY RUN:".bold().cyan(),
            display_name(file_path).bold(),
            ids.len()
        )?;
    } else {
        writeln!(
            writer,
            "DRY RUN: {} ({} CorpusID URLs)\n",
            display_name(file_path),
            ids.len()
        )?;
    }

    for (i, id) in ids.iter().enumerate() {
        if color.enabled() {
            writeln!(writer, "{} {}", format!("[{}]", i + 1).bold().yellow(), id)?;
        } else {
            writeln!(writer, "[{}] {}", i + 1, id)?;
        }
    }

    writeln!(writer)?;
    writeln!(writer, "Total: {} CorpusIDs", ids.len())?;
    Ok(())
}

fn read_input(file_path: &Path) -> anyhow::Result<String> {
    if !file_path.exists() {
        anyhow::bail!("File not found: {}", file_path.display());
    }
    Ok(corpusdoi_core::read_citations(file_path)?)
}

fn display_name(file_path: &Path) -> String {
    file_path
        .file_name()
        .map(|n| n.to_string_lossy().to_string())
        .unwrap_or_else(|| file_path.display().to_string())
}

/// First non-blank key in precedence order: flag, `S2_API_KEY`, `API_KEY`, config file.
fn pick_api_key(
    flag: Option<String>,
    s2_env: Option<String>,
    api_env: Option<String>,
    file: Option<String>,
) -> Option<String> {
    [flag, s2_env, api_env, file]
        .into_iter()
        .flatten()
        .find(|k| !k.trim().is_empty())
}

fn env_non_empty(name: &str) -> Option<String> {
    std::env::var(name).ok().filter(|v| !v.trim().is_empty())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn key(s: &str) -> Option<String> {
        Some(s.to_string())
    }

    #[test]
    fn flag_wins_over_everything() {
        assert_eq!(
            pick_api_key(key("flag"), key("s2"), key("api"), key("file")),
            key("flag")
        );
    }

    #[test]
    fn blank_flag_falls_through() {
        assert_eq!(
            pick_api_key(key(""), key("s2"), key("api"), key("file")),
            key("s2")
        );
        assert_eq!(pick_api_key(key("  "), None, key("api"), None), key("api"));
        assert_eq!(pick_api_key(key(""), None, None, key("file")), key("file"));
    }

    #[test]
    fn blank_config_key_is_absent() {
        assert_eq!(pick_api_key(None, None, None, key(" ")), None);
        assert_eq!(pick_api_key(None, None, None, None), None);
    }
}

use std::io::Write;
use std::path::Path;

use crate::CoreError;

/// File name the DOI list is written to when no other path is configured.
pub const DEFAULT_OUTPUT_FILE: &str = "dois_output.txt";

/// Join DOIs with `", "`. No trailing separator or newline.
pub fn format_doi_list<S: AsRef<str>>(dois: &[S]) -> String {
    dois.iter()
        .map(|d| d.as_ref())
        .collect::<Vec<_>>()
        .join(", ")
}

/// Create or truncate `path` and write the formatted DOI list to it.
///
/// An empty list yields an empty file.
pub fn write_doi_list<S: AsRef<str>>(path: &Path, dois: &[S]) -> Result<(), CoreError> {
    let io_err = |source: std::io::Error| CoreError::Io {
        path: path.to_path_buf(),
        source,
    };
    let mut file = std::fs::File::create(path).map_err(io_err)?;
    file.write_all(format_doi_list(dois).as_bytes())
        .map_err(io_err)?;
    Ok(())
}

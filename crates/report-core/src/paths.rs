/// Output path helpers for generated reports
use crate::config::StorageConfig;
use crate::error::Result;
use once_cell::sync::Lazy;
use regex::Regex;
use std::path::{Path, PathBuf};

// Characters that are not allowed in file names on common platforms
static UNSAFE_FILENAME_CHARS: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r#"[<>:"/\\|?*]"#).expect("valid file name regex")
});

pub const REPORT_FILE_SUFFIX: &str = "_financial_report";
pub const DEFAULT_REPORT_STEM: &str = "financial_report";
pub const MARKDOWN_EXTENSION: &str = "md";

/// Replace characters that cannot appear in a file name, and spaces, with `_`
pub fn sanitize_file_stem(name: &str) -> String {
    UNSAFE_FILENAME_CHARS.replace_all(name, "_").replace(' ', "_")
}

/// File stem used when the caller gives no output file name
pub fn default_report_stem(company_name: Option<&str>) -> String {
    match company_name.filter(|name| !name.is_empty()) {
        Some(name) => format!("{}{}", sanitize_file_stem(name), REPORT_FILE_SUFFIX),
        None => DEFAULT_REPORT_STEM.to_string(),
    }
}

/// `{stem}_{year}Q{quarter}.md`
pub fn report_file_name(stem: &str, year: i64, quarter: i64) -> String {
    format!("{}_{}Q{}.{}", stem, year, quarter, MARKDOWN_EXTENSION)
}

/// Resolve where the Markdown report is written.
///
/// An explicit `save_path` wins. Otherwise the file goes into the
/// configured storage directory under a name derived from the output file
/// name or the company name.
pub fn resolve_report_path(
    storage: &StorageConfig,
    save_path: Option<&Path>,
    output_filename: Option<&str>,
    company_name: Option<&str>,
    year: i64,
    quarter: i64,
) -> PathBuf {
    if let Some(path) = save_path.filter(|p| !p.as_os_str().is_empty()) {
        return path.to_path_buf();
    }

    let stem = match output_filename.filter(|name| !name.is_empty()) {
        Some(name) => name.to_string(),
        None => default_report_stem(company_name),
    };

    storage.storage_dir.join(report_file_name(&stem, year, quarter))
}

/// Create the parent directory of `path` if it has one
pub fn ensure_parent_dir(path: &Path) -> Result<()> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        std::fs::create_dir_all(parent)?;
    }
    Ok(())
}

//! # Job File Input
//!
//! Helpers for accepting Talend job files from disk or from an upload:
//! extension checks, file name sanitizing and lossy UTF-8 decoding.

use std::path::Path;

/// File extensions accepted as Talend job definitions.
pub const SUPPORTED_EXTENSIONS: &[&str] = &["xml", "item"];

/// Stem used when an uploaded file name sanitizes to nothing.
pub const DEFAULT_JOB_STEM: &str = "talend_job";

/// Returns `true` when `file_name` ends in a supported extension (case-insensitive).
pub fn is_supported_job_file(file_name: &str) -> bool {
    let lower = file_name.to_ascii_lowercase();
    SUPPORTED_EXTENSIONS
        .iter()
        .any(|ext| lower.ends_with(&format!(".{ext}")))
}

/// Reduces a file name to a safe, portable form.
///
/// Non-ASCII characters are dropped, path separators and whitespace become
/// `_`, anything outside `[A-Za-z0-9._-]` is removed and leading or trailing
/// `.`/`_` are trimmed. The result may be empty.
pub fn secure_filename(name: &str) -> String {
    let ascii: String = name
        .chars()
        .filter(char::is_ascii)
        .map(|c| if c == '/' || c == '\\' { ' ' } else { c })
        .collect();
    let joined = ascii.split_whitespace().collect::<Vec<_>>().join("_");
    let cleaned: String = joined
        .chars()
        .filter(|c| c.is_ascii_alphanumeric() || matches!(*c, '_' | '.' | '-'))
        .collect();
    cleaned.trim_matches(|c: char| c == '.' || c == '_').to_string()
}

/// The sanitized stem of an uploaded file name, without its last extension.
pub fn job_file_stem(file_name: &str) -> String {
    let base = file_name
        .rsplit(|c: char| c == '/' || c == '\\')
        .next()
        .unwrap_or(file_name);
    let stem = match base.rfind('.') {
        Some(idx) if idx > 0 => &base[..idx],
        _ => base,
    };
    let safe = secure_filename(stem);
    if safe.is_empty() {
        DEFAULT_JOB_STEM.to_string()
    } else {
        safe
    }
}

/// Decodes job bytes as UTF-8, replacing invalid sequences.
pub fn decode_job_bytes(bytes: &[u8]) -> String {
    String::from_utf8_lossy(bytes).into_owned()
}

/// Reads a job file from disk with lossy UTF-8 decoding.
pub fn read_job_file(path: &Path) -> std::io::Result<String> {
    std::fs::read(path).map(|bytes| decode_job_bytes(&bytes))
}

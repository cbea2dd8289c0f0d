//! # Environment Placeholders
//!
//! `${VAR}` substitution for configuration files, shared by the server and
//! the CLI so both read the same file format.

use regex::{Captures, Regex};
use std::env;

/// Replaces every `${VAR}` (upper-case letters, digits, `_`) with the value of
/// the environment variable. Unset variables become empty strings.
pub fn substitute_env_placeholders(content: &str) -> Result<String, regex::Error> {
    let re = Regex::new(r"\$\{(?P<var>[A-Z0-9_]+)\}")?;
    let expanded = re.replace_all(content, |caps: &Captures| {
        env::var(&caps["var"]).unwrap_or_default()
    });
    Ok(expanded.into_owned())
}

use anyhow::{bail, Context, Result};
use std::path::Path;
use std::str::FromStr;

/// One value per line; blank lines and `#` comments are skipped.
fn parse_lines<T>(text: &str, what: &str) -> Result<Vec<T>>
where
    T: FromStr,
    T::Err: std::error::Error + Send + Sync + 'static,
{
    let mut out = Vec::new();
    for (idx, line) in text.lines().enumerate() {
        let trimmed = line.trim();
        if trimmed.is_empty() || trimmed.starts_with('#') {
            continue;
        }
        let value = trimmed
            .parse()
            .with_context(|| format!("line {} is not {}: {}", idx + 1, what, trimmed))?;
        out.push(value);
    }
    if out.is_empty() {
        bail!("no {} values found", what);
    }
    Ok(out)
}

fn read(path: &Path) -> Result<String> {
    std::fs::read_to_string(path).with_context(|| format!("failed to read {}", path.display()))
}

/// Parse newline-delimited samples of a single lead.
pub fn parse_f64_series(text: &str) -> Result<Vec<f64>> {
    parse_lines(text, "a sample")
}

pub fn read_f64_series(path: &Path) -> Result<Vec<f64>> {
    parse_f64_series(&read(path)?)
}

/// Parse newline-delimited beat sample indices.
pub fn parse_event_indices(text: &str) -> Result<Vec<usize>> {
    parse_lines(text, "a sample index")
}

pub fn read_event_indices(path: &Path) -> Result<Vec<usize>> {
    parse_event_indices(&read(path)?)
}

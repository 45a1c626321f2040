//! JSON request documents for commands that accept one.

use serde::de::DeserializeOwned;
use std::error::Error;
use std::fs;
use std::io::{self, Read};
use std::path::Path;

/// Deserialise a request from `--input <file>` or, failing that, from JSON
/// piped on stdin. `missing` is reported when neither is present.
pub fn read_request<T: DeserializeOwned>(
    path: Option<&str>,
    missing: &str,
) -> Result<T, Box<dyn Error>> {
    if let Some(path) = path {
        return read_file(Path::new(path));
    }
    match read_piped()? {
        Some(text) => serde_json::from_str(&text)
            .map_err(|e| format!("Failed to parse piped request: {}", e).into()),
        None => Err(missing.into()),
    }
}

fn read_file<T: DeserializeOwned>(path: &Path) -> Result<T, Box<dyn Error>> {
    if !path.is_file() {
        return Err(format!("Request file not found: {}", path.display()).into());
    }
    let contents = fs::read_to_string(path)
        .map_err(|e| format!("Failed to read '{}': {}", path.display(), e))?;
    serde_json::from_str(&contents)
        .map_err(|e| format!("Failed to parse '{}': {}", path.display(), e).into())
}

/// Text piped on stdin. Interactive terminals and blank input yield `None`.
fn read_piped() -> io::Result<Option<String>> {
    if atty::is(atty::Stream::Stdin) {
        return Ok(None);
    }
    let mut buffer = String::new();
    io::stdin().read_to_string(&mut buffer)?;
    let trimmed = buffer.trim();
    Ok((!trimmed.is_empty()).then(|| trimmed.to_string()))
}

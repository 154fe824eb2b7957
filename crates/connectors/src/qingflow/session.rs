//! Session cookie persistence
//!
//! The session file is plain text: `name=value` pairs joined by `;`. It is
//! read once when the client is built and overwritten when it is closed.

use std::path::Path;

use reqwest::Url;
use reqwest::cookie::{CookieStore, Jar};
use tracing::debug;

use crate::error::ConnectorError;

/// Split a session string into `name=value` cookie strings
///
/// A segment without `=` becomes a cookie with an empty value; empty segments
/// are dropped.
pub fn parse_cookie_pairs(content: &str) -> Vec<String> {
    content
        .split(';')
        .map(str::trim)
        .filter(|pair| !pair.is_empty())
        .map(|pair| match pair.split_once('=') {
            Some((name, value)) => format!("{}={}", name.trim(), value.trim()),
            None => format!("{}=", pair),
        })
        .collect()
}

/// Seed `jar` from the session file, if it exists
///
/// Returns the number of cookies loaded.
pub fn load_session(path: &Path, jar: &Jar, url: &Url) -> Result<usize, ConnectorError> {
    if !path.exists() {
        debug!(path = %path.display(), "no session file, starting with empty session");
        return Ok(0);
    }

    let content = std::fs::read_to_string(path).map_err(|source| ConnectorError::Session {
        path: path.to_path_buf(),
        source,
    })?;

    let pairs = parse_cookie_pairs(&content);
    for pair in &pairs {
        jar.add_cookie_str(pair, url);
    }
    Ok(pairs.len())
}

/// Overwrite the session file with the cookies `jar` holds for `url`
///
/// Returns the number of cookies written.
pub fn save_session(path: &Path, jar: &Jar, url: &Url) -> Result<usize, ConnectorError> {
    let header = jar
        .cookies(url)
        .and_then(|value| value.to_str().ok().map(str::to_string))
        .unwrap_or_default();

    let pairs = parse_cookie_pairs(&header);
    std::fs::write(path, pairs.join(";")).map_err(|source| ConnectorError::Session {
        path: path.to_path_buf(),
        source,
    })?;
    Ok(pairs.len())
}

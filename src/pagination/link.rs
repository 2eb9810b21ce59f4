//! RFC 5988 `link` header parsing
//!
//! Responses carry pagination cursors in a `link` header shaped like
//! `<https://api/x?page=2>; rel="next", <https://api/x?page=1>; rel="prev"`.
//! Only the `next` relation matters here; its absence means the end of the
//! result set, not an error.

use crate::error::{Error, Result};
use reqwest::header::HeaderMap;

/// Extract the `rel="next"` target from a response's `link` header.
///
/// Returns `Ok(None)` when the header is absent or carries no `next`
/// relation. An entry that is not enclosed in angle brackets is a malformed
/// header and fails rather than guessing.
pub fn next_link(headers: &HeaderMap) -> Result<Option<String>> {
    let Some(value) = headers.get("link") else {
        return Ok(None);
    };
    let value = value
        .to_str()
        .map_err(|_| Error::link_header("non-ascii header value"))?;

    parse_next(value)
}

/// Parse a raw `link` header value and return the `next` target, if any.
pub fn parse_next(header: &str) -> Result<Option<String>> {
    for entry in header.split(',') {
        let mut parts = entry.split(';');
        let target = parts.next().unwrap_or("").trim();

        if !(target.starts_with('<') && target.ends_with('>')) {
            return Err(Error::link_header(entry.trim()));
        }
        let url = &target[1..target.len() - 1];

        // Entries may carry several parameters; the relation is whichever
        // one mentions "next"
        if parts.any(|param| param.contains("next")) {
            return Ok(Some(url.to_string()));
        }
    }

    Ok(None)
}

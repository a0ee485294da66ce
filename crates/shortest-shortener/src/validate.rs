use crate::error::{Result, ShortenerError};
use url::Url;

const INVALID_URL_MESSAGE: &str = "invalid http/https url format";

/// Parses `raw` as an absolute `http`/`https` URL with a non-empty host.
///
/// The raw string is what gets digested and stored, so it must already be
/// in canonical `scheme://authority` form: no surrounding whitespace, no
/// control characters, and no scheme fix-ups such as `http:example.com`.
/// Only scheme and host are checked beyond that: the shortener does not
/// follow or otherwise validate the target.
pub fn parse_http_url(raw: &str) -> Result<Url> {
    if raw.trim() != raw || raw.chars().any(|c| c.is_control()) {
        return Err(invalid_url());
    }

    let (scheme, _) = raw.split_once("://").ok_or_else(invalid_url)?;
    if !scheme.eq_ignore_ascii_case("http") && !scheme.eq_ignore_ascii_case("https") {
        return Err(invalid_url());
    }

    let parsed = Url::parse(raw).map_err(|_| invalid_url())?;

    if !matches!(parsed.scheme(), "http" | "https") {
        return Err(invalid_url());
    }

    if parsed.host_str().map_or(true, str::is_empty) {
        return Err(invalid_url());
    }

    Ok(parsed)
}

/// Extracts the slug from a fully qualified short URL: its path without
/// the leading separator.
pub fn slug_from_short_url(raw: &str) -> Result<String> {
    let parsed = parse_http_url(raw)?;
    let path = parsed.path();
    Ok(path.strip_prefix('/').unwrap_or(path).to_owned())
}

fn invalid_url() -> ShortenerError {
    ShortenerError::InvalidUrl(INVALID_URL_MESSAGE.to_string())
}

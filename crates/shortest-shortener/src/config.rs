use crate::error::{Result, ShortenerError};
use shortest_core::digest::DIGEST_LEN;
use shortest_core::MAX_TTL;
use std::fmt::Display;
use std::time::Duration;
use typed_builder::TypedBuilder;

pub const DEFAULT_SLUG_LENGTH: usize = 6;

/// Public origin that short URLs are built under, e.g. `http://localhost:3000`.
///
/// The port is omitted from the rendered URL when it is the scheme's default.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PublicBaseUrl {
    scheme: String,
    host: String,
    port: u16,
}

impl PublicBaseUrl {
    pub fn new(scheme: impl Into<String>, host: impl Into<String>, port: u16) -> Result<Self> {
        let scheme = scheme.into().to_ascii_lowercase();
        let host = host.into();

        if !matches!(scheme.as_str(), "http" | "https") {
            return Err(ShortenerError::InvalidConfig(format!(
                "public scheme must be http or https, got '{scheme}'"
            )));
        }

        if host.is_empty() {
            return Err(ShortenerError::InvalidConfig(
                "public host cannot be empty".to_string(),
            ));
        }

        Ok(Self { scheme, host, port })
    }

    fn is_default_port(&self) -> bool {
        matches!(
            (self.scheme.as_str(), self.port),
            ("http", 80) | ("https", 443)
        )
    }
}

impl Display for PublicBaseUrl {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        if self.is_default_port() {
            write!(f, "{}://{}", self.scheme, self.host)
        } else {
            write!(f, "{}://{}:{}", self.scheme, self.host, self.port)
        }
    }
}

/// Settings for [`ShortenerService`](crate::ShortenerService).
#[derive(Debug, Clone, TypedBuilder)]
pub struct ShortenerConfig {
    /// Number of digest characters in a slug.
    #[builder(default = DEFAULT_SLUG_LENGTH)]
    pub slug_length: usize,
    /// Lifetime of a mapping; `None` or zero keeps it forever.
    #[builder(default)]
    pub ttl: Option<Duration>,
    /// Origin used to render fully qualified short URLs.
    pub base_url: PublicBaseUrl,
}

impl ShortenerConfig {
    /// Checks that the slug length yields at least one digest window and
    /// that the ttl is one every store accepts.
    pub fn validate(&self) -> Result<()> {
        if self.slug_length == 0 || self.slug_length > DIGEST_LEN {
            return Err(ShortenerError::InvalidConfig(format!(
                "slug length must be between 1 and {}, got {}",
                DIGEST_LEN, self.slug_length
            )));
        }

        if let Some(ttl) = self.ttl.filter(|ttl| *ttl > MAX_TTL) {
            return Err(ShortenerError::InvalidConfig(format!(
                "ttl {ttl:?} exceeds the maximum of {MAX_TTL:?}"
            )));
        }

        Ok(())
    }
}

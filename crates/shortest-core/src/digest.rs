use md5::{Digest as _, Md5};
use std::fmt::Display;

/// Length of a rendered digest in hex characters.
pub const DIGEST_LEN: usize = 32;

/// A deterministic 128-bit digest of a URL, rendered as lowercase hex.
///
/// The same input string produces the same digest on every machine, so the
/// candidate slugs derived from it are identical for every caller.
#[derive(Clone, PartialEq, Eq, Hash)]
pub struct Digest(String);

impl Digest {
    /// Hashes `url` with MD5 and renders the 16 bytes as 32 hex characters.
    pub fn of(url: &str) -> Self {
        let bytes = Md5::digest(url.as_bytes());
        Self(hex::encode(bytes))
    }

    /// Returns the digest as a string slice.
    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl std::fmt::Debug for Digest {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_tuple("Digest").field(&self.0).finish()
    }
}

impl Display for Digest {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

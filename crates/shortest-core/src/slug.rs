use crate::digest::DIGEST_LEN;
use serde::{Deserialize, Serialize};
use std::fmt::Display;

/// A slug: the short identifier a long URL is stored under.
///
/// Slugs are windows of a hex digest, so a well-formed slug is 1-32
/// lowercase hexadecimal characters.
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct Slug(String);

impl Slug {
    /// Creates a new `Slug` after validating the input.
    pub fn new(slug: impl Into<String>) -> Result<Self, InvalidSlug> {
        let slug = slug.into();
        Self::validate(&slug)?;
        Ok(Self(slug))
    }

    /// Creates a `Slug` without validation.
    ///
    /// Used for windows cut from a [`Digest`](crate::Digest), which are
    /// well-formed by construction.
    pub fn new_unchecked(slug: impl Into<String>) -> Self {
        Self(slug.into())
    }

    /// Builds the fully qualified short URL under `base_url`.
    pub fn to_url(&self, base_url: &str) -> String {
        format!("{}/{}", base_url.trim_end_matches('/'), self.0)
    }

    /// Returns the slug as a string slice.
    pub fn as_str(&self) -> &str {
        &self.0
    }

    fn validate(slug: &str) -> Result<(), InvalidSlug> {
        if slug.is_empty() || slug.len() > DIGEST_LEN {
            return Err(InvalidSlug(format!(
                "length must be between 1 and {}, got {}",
                DIGEST_LEN,
                slug.len()
            )));
        }

        if !slug
            .chars()
            .all(|c| c.is_ascii_digit() || ('a'..='f').contains(&c))
        {
            return Err(InvalidSlug(format!(
                "must contain only lowercase hexadecimal characters: '{}'",
                slug
            )));
        }

        Ok(())
    }
}

impl Display for Slug {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

impl TryFrom<String> for Slug {
    type Error = InvalidSlug;

    fn try_from(slug: String) -> Result<Self, Self::Error> {
        Self::new(slug)
    }
}

impl From<Slug> for String {
    fn from(slug: Slug) -> Self {
        slug.0
    }
}

impl AsRef<str> for Slug {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("invalid slug: {0}")]
pub struct InvalidSlug(pub String);

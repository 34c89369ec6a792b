//! URL-safe slug type derived from display names.

use core::fmt;

use serde::{Deserialize, Serialize};
use unicode_normalization::UnicodeNormalization;
use unicode_normalization::char::is_combining_mark;

/// Errors that can occur when deriving or parsing a [`Slug`].
#[derive(thiserror::Error, Debug, Clone)]
pub enum SlugError {
    /// The source name contains no usable characters.
    #[error("name yields an empty slug")]
    Empty,
    /// The input is not a valid slug.
    #[error("invalid slug: {0}")]
    Invalid(String),
}

/// A normalized, URL-safe identifier derived from a display name.
///
/// Slugs are lowercase, ASCII-alphanumeric-and-hyphen only, with no leading,
/// trailing, or doubled hyphens. Derivation is idempotent: deriving a slug
/// from an existing slug yields the same slug.
///
/// ## Examples
///
/// ```
/// use frechnel_core::Slug;
///
/// assert_eq!(Slug::derive("T-Shirts").unwrap().as_str(), "t-shirts");
/// assert_eq!(Slug::derive("Été 2024").unwrap().as_str(), "ete-2024");
/// assert!(Slug::derive("!!!").is_err());
/// ```
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(transparent)]
pub struct Slug(String);

impl Slug {
    /// Derive a slug from a display name.
    ///
    /// Lowercases, strips diacritics (Unicode NFD decomposition with
    /// combining marks removed), collapses every run of non-alphanumeric
    /// characters to a single hyphen, and trims leading/trailing hyphens.
    ///
    /// # Errors
    ///
    /// Returns [`SlugError::Empty`] if nothing remains after normalization.
    pub fn derive(name: &str) -> Result<Self, SlugError> {
        let folded: String = name
            .nfd()
            .filter(|c| !is_combining_mark(*c))
            .collect::<String>()
            .to_lowercase();

        let mut slug = String::with_capacity(folded.len());
        let mut pending_hyphen = false;
        for c in folded.chars() {
            if c.is_ascii_alphanumeric() {
                if pending_hyphen && !slug.is_empty() {
                    slug.push('-');
                }
                pending_hyphen = false;
                slug.push(c);
            } else {
                pending_hyphen = true;
            }
        }

        if slug.is_empty() {
            return Err(SlugError::Empty);
        }

        Ok(Self(slug))
    }

    /// Parse an already-normalized slug (e.g. a value read from storage).
    ///
    /// # Errors
    ///
    /// Returns [`SlugError::Invalid`] if the input is not in canonical form.
    pub fn parse(s: &str) -> Result<Self, SlugError> {
        let canonical = Self::derive(s).map_err(|_| SlugError::Invalid(s.to_owned()))?;
        if canonical.as_str() == s {
            Ok(canonical)
        } else {
            Err(SlugError::Invalid(s.to_owned()))
        }
    }

    /// Returns the slug as a string slice.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Consumes the `Slug` and returns its inner string.
    #[must_use]
    pub fn into_inner(self) -> String {
        self.0
    }
}

impl fmt::Display for Slug {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl AsRef<str> for Slug {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl std::str::FromStr for Slug {
    type Err = SlugError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

//! Strong type definitions for image identifiers.
//!
//! Identifiers are opaque newtypes so a repository name can never be
//! passed where a full image identifier is expected.

use serde::{Deserialize, Serialize};
use std::fmt;

use crate::error::CoreError;

/// An image identifier, unique within a registry namespace.
///
/// Usually `repository:tag`, but the engine treats it as opaque: two
/// identifiers are equal only if their strings are byte-for-byte equal.
#[derive(Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ImageId(String);

impl ImageId {
    /// Create an identifier without validation.
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    /// Parse and validate an identifier.
    ///
    /// Rejects empty strings and strings containing whitespace.
    pub fn parse(s: &str) -> Result<Self, CoreError> {
        if s.is_empty() {
            return Err(CoreError::EmptyImageId);
        }
        if s.chars().any(char::is_whitespace) {
            return Err(CoreError::InvalidImageId(s.to_string()));
        }
        Ok(Self(s.to_string()))
    }

    /// Build an identifier from a repository and tag.
    ///
    /// An empty tag yields the bare repository name.
    pub fn from_parts(repository: &str, tag: &str) -> Self {
        if tag.is_empty() {
            Self(repository.to_string())
        } else {
            Self(format!("{repository}:{tag}"))
        }
    }

    /// Get the identifier as a string slice.
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Split into repository and optional tag.
    pub fn reference(&self) -> ImageRef<'_> {
        ImageRef::split(&self.0)
    }
}

impl fmt::Debug for ImageId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "ImageId({})", self.0)
    }
}

impl fmt::Display for ImageId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl AsRef<str> for ImageId {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl From<&str> for ImageId {
    fn from(s: &str) -> Self {
        Self(s.to_string())
    }
}

impl From<String> for ImageId {
    fn from(s: String) -> Self {
        Self(s)
    }
}

/// A borrowed view of an identifier split into repository and tag.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ImageRef<'a> {
    pub repository: &'a str,
    pub tag: Option<&'a str>,
}

impl<'a> ImageRef<'a> {
    /// Split on the last `:` that follows the last `/`.
    ///
    /// A colon before the last slash belongs to a registry host port
    /// (`host:5000/app`), not to a tag.
    pub fn split(s: &'a str) -> Self {
        let name_start = s.rfind('/').map(|i| i + 1).unwrap_or(0);
        match s[name_start..].rfind(':') {
            Some(i) => {
                let at = name_start + i;
                Self {
                    repository: &s[..at],
                    tag: Some(&s[at + 1..]),
                }
            }
            None => Self {
                repository: s,
                tag: None,
            },
        }
    }

    /// Render a fully qualified reference, e.g. `gcr.io/google_containers/pause:3.1`.
    pub fn qualified(&self, registry: &str, namespace: &str) -> String {
        match self.tag {
            Some(tag) => format!("{registry}/{namespace}/{}:{tag}", self.repository),
            None => format!("{registry}/{namespace}/{}", self.repository),
        }
    }
}

//! Storage locations.
//!
//! A [`Uri`] is either `scheme://path` (routed to the backend registered for
//! `scheme`) or a bare path with no scheme (routed to the local default).
//! The path is kept verbatim; backends decide how to interpret it.

use std::fmt;
use std::str::FromStr;

use thiserror::Error;

/// A location string that failed to parse.
#[derive(Clone, Debug, PartialEq, Eq, Error)]
pub enum UriError {
    /// The input was empty.
    #[error("empty URI")]
    Empty,

    /// The part before `://` is not a valid scheme.
    #[error("invalid URI scheme in `{value}`")]
    InvalidScheme {
        /// The rejected input.
        value: String,
    },
}

/// A parsed storage location.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct Uri {
    scheme: Option<String>,
    path: String,
}

impl Uri {
    /// Parse a location string.
    ///
    /// # Errors
    /// Returns an error if the string is empty or its scheme is malformed.
    pub fn parse(s: &str) -> Result<Self, UriError> {
        if s.is_empty() {
            return Err(UriError::Empty);
        }
        let Some((scheme, path)) = s.split_once("://") else {
            return Ok(Self {
                scheme: None,
                path: s.to_owned(),
            });
        };
        if !is_valid_scheme(scheme) {
            return Err(UriError::InvalidScheme {
                value: s.to_owned(),
            });
        }
        Ok(Self {
            scheme: Some(scheme.to_ascii_lowercase()),
            path: path.to_owned(),
        })
    }

    /// The lowercase scheme, or `None` for a bare path.
    #[must_use]
    pub fn scheme(&self) -> Option<&str> {
        self.scheme.as_deref()
    }

    /// Everything after `scheme://` (or the whole input for a bare path).
    #[must_use]
    pub fn path(&self) -> &str {
        &self.path
    }

    /// Append a path component, inserting a `/` separator if needed.
    #[must_use]
    pub fn join(&self, name: &str) -> Self {
        let mut path = self.path.clone();
        if !path.is_empty() && !path.ends_with('/') {
            path.push('/');
        }
        path.push_str(name.trim_start_matches('/'));
        Self {
            scheme: self.scheme.clone(),
            path,
        }
    }
}

fn is_valid_scheme(scheme: &str) -> bool {
    let mut chars = scheme.chars();
    chars.next().is_some_and(|c| c.is_ascii_alphabetic())
        && chars.all(|c| c.is_ascii_alphanumeric() || matches!(c, '+' | '-' | '.'))
}

impl fmt::Display for Uri {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.scheme {
            Some(scheme) => write!(f, "{scheme}://{}", self.path),
            None => f.write_str(&self.path),
        }
    }
}

impl FromStr for Uri {
    type Err = UriError;
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

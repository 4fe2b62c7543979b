//! Error type shared by the system and process collectors.

use crate::collector::procfs::parser::{Field, ParseError};
use crate::collector::traits::FileSystem;
use std::path::Path;

/// Error type for collection failures.
#[derive(Debug)]
pub enum CollectError {
    /// File missing or unreadable (permission problems are not distinguished).
    Unavailable {
        path: String,
        source: std::io::Error,
    },
    /// The file was read but the expected key or line is absent.
    NotFound { path: String, key: String },
    /// Too few fields, or a non-numeric token where a number is required.
    Malformed { path: String, source: ParseError },
}

impl CollectError {
    pub(crate) fn not_found(path: &str, key: impl Into<String>) -> Self {
        CollectError::NotFound {
            path: path.to_string(),
            key: key.into(),
        }
    }

    pub(crate) fn malformed(path: &str, source: ParseError) -> Self {
        CollectError::Malformed {
            path: path.to_string(),
            source,
        }
    }

    /// Returns true when the underlying file could not be read at all.
    pub fn is_unavailable(&self) -> bool {
        matches!(self, CollectError::Unavailable { .. })
    }
}

impl std::fmt::Display for CollectError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            CollectError::Unavailable { path, source } => {
                write!(f, "{} unavailable: {}", path, source)
            }
            CollectError::NotFound { path, key } => write!(f, "{} has no {}", path, key),
            CollectError::Malformed { path, source } => {
                write!(f, "malformed {}: {}", path, source.message)
            }
        }
    }
}

impl std::error::Error for CollectError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            CollectError::Unavailable { source, .. } => Some(source),
            CollectError::Malformed { source, .. } => Some(source),
            CollectError::NotFound { .. } => None,
        }
    }
}

/// Reads a whole file, tagging failures with the path.
pub(crate) fn read_file<F: FileSystem>(fs: &F, path: &str) -> Result<String, CollectError> {
    fs.read_to_string(Path::new(path))
        .map_err(|source| CollectError::Unavailable {
            path: path.to_string(),
            source,
        })
}

/// Unwraps a keyed field: absent is `NotFound`, a bad line is `Malformed`.
pub(crate) fn required<T>(field: Field<T>, path: &str, key: &str) -> Result<T, CollectError> {
    match field {
        Some(Ok(value)) => Ok(value),
        Some(Err(e)) => Err(CollectError::malformed(path, e)),
        None => Err(CollectError::not_found(path, key)),
    }
}

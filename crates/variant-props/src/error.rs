//! Error and diagnostic types for overlay loading.

use serde::Serialize;
use std::fmt;
use std::io;
use std::path::PathBuf;

/// Fatal errors raised while reading the overlay or interpreting a value.
#[derive(Debug, thiserror::Error)]
pub enum PropertyError {
    #[error("failed to read overlay file {path}: {source}")]
    OverlayUnreadable {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("malformed overlay {path} at line {line}: {reason}")]
    MalformedOverlay {
        path: PathBuf,
        line: usize,
        reason: String,
    },

    #[error("property '{key}' must be a non-negative integer, got '{value}'")]
    MalformedNumericProperty { key: String, value: String },
}

/// Non-fatal conditions noticed while loading the overlay.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Diagnostic {
    /// The overlay file does not exist; lookups fall back to defaults.
    MissingOverlayFile { path: PathBuf },
}

impl fmt::Display for Diagnostic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::MissingOverlayFile { path } => {
                write!(f, "overlay file {} not found, using defaults", path.display())
            }
        }
    }
}

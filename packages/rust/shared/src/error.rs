//! Error types for castindex.
//!
//! Library crates use [`CastIndexError`] via `thiserror`.
//! The CLI wraps this with `color-eyre` for rich diagnostics.

use std::path::PathBuf;

/// Top-level error type for all castindex operations.
#[derive(Debug, thiserror::Error)]
pub enum CastIndexError {
    /// Configuration loading or validation error.
    #[error("config error: {message}")]
    Config { message: String },

    /// Filesystem I/O error. Always carries the offending path.
    #[error("I/O error at {path:?}: {source}")]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },

    /// The source directory yielded no episode documents.
    #[error("no episode documents found in {dir:?}")]
    EmptyCatalog { dir: PathBuf },

    /// A URL could not be built against the configured base URL.
    #[error("invalid URL '{input}': {source}")]
    Url {
        input: String,
        source: url::ParseError,
    },

    /// The sitemap document could not be serialized.
    #[error("xml error: {0}")]
    Xml(String),

    /// A background read/write task failed to complete.
    #[error("task error: {0}")]
    Task(String),
}

/// Convenience alias used throughout the codebase.
pub type Result<T> = std::result::Result<T, CastIndexError>;

impl CastIndexError {
    /// Create a config error from any displayable message.
    pub fn config(msg: impl Into<String>) -> Self {
        Self::Config {
            message: msg.into(),
        }
    }

    /// Wrap a `std::io::Error` with a path for context.
    pub fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Io {
            path: path.into(),
            source,
        }
    }

    /// Wrap a URL parse failure with the input that caused it.
    pub fn url(input: impl Into<String>, source: url::ParseError) -> Self {
        Self::Url {
            input: input.into(),
            source,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn error_display_formatting() {
        let err = CastIndexError::config("page_size must be positive");
        assert_eq!(err.to_string(), "config error: page_size must be positive");

        let err = CastIndexError::EmptyCatalog {
            dir: PathBuf::from("html"),
        };
        assert!(err.to_string().contains("no episode documents"));
        assert!(err.to_string().contains("html"));
    }

    #[test]
    fn io_error_names_the_path() {
        let err = CastIndexError::io(
            "/srv/site/page/2/index.html",
            std::io::Error::new(std::io::ErrorKind::PermissionDenied, "denied"),
        );
        let msg = err.to_string();
        assert!(msg.contains("/srv/site/page/2/index.html"));
        assert!(msg.contains("denied"));
    }
}

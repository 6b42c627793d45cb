//! Error types and error code constants for remold.
//!
//! This module provides a unified error type (`RemoldError`) that bridges
//! errors from the parsing, registry, and batch subsystems into a common
//! format suitable for CLI reporting.
//!
//! ## Error Code Mapping
//!
//! - `2`: Invalid arguments or configuration (duplicate registration, bad
//!   extension name)
//! - `3`: Resolution errors (unknown transform, bad file pattern)
//! - `4`: Parse errors (source violates the accepted grammar)
//! - `5`: Transform errors (a transform failed while mutating the tree)
//! - `6`: I/O errors (file read or write failure)
//!
//! None of these are recovered locally: every error propagates to the top
//! of the run and terminates it.

use std::fmt;

use thiserror::Error;

pub use remold_cst::ParseError;

// ============================================================================
// Output Error Codes
// ============================================================================

/// Stable numeric codes for CLI exit status and JSON error responses.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(u8)]
pub enum OutputErrorCode {
    /// Invalid arguments or startup configuration.
    InvalidArguments = 2,
    /// Resolution errors (unknown transform name, bad pattern).
    ResolutionError = 3,
    /// Source failed to parse.
    ParseFailed = 4,
    /// A transform raised an error.
    TransformFailed = 5,
    /// File read or write failure.
    IoError = 6,
}

impl OutputErrorCode {
    /// Get the numeric code value.
    pub fn code(&self) -> u8 {
        *self as u8
    }
}

impl fmt::Display for OutputErrorCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.code())
    }
}

// ============================================================================
// Transform Errors
// ============================================================================

/// An error raised from within transform logic while mutating the tree.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[error("{message}")]
pub struct TransformError {
    pub message: String,
}

impl TransformError {
    /// Create a transform error with the given message.
    pub fn msg(message: impl Into<String>) -> Self {
        TransformError {
            message: message.into(),
        }
    }
}

// ============================================================================
// Unified Error Type
// ============================================================================

/// Unified error type for the runner and CLI.
#[derive(Debug, Error)]
pub enum RemoldError {
    /// A transform name was registered twice at startup.
    #[error("transform '{name}' is already registered")]
    DuplicateTransform { name: String },

    /// The requested transform name is not registered.
    #[error("unknown transform '{name}'; registered transforms: {}", .known.join(", "))]
    UnknownTransform { name: String, known: Vec<String> },

    /// Source violates the accepted grammar.
    #[error(transparent)]
    Parse(#[from] ParseError),

    /// A transform failed while processing a file.
    #[error("transform '{name}' failed on {file}: {source}")]
    Transform {
        name: String,
        file: String,
        source: TransformError,
    },

    /// The file pattern did not compile.
    #[error("invalid file pattern '{pattern}': {message}")]
    Pattern { pattern: String, message: String },

    /// File read or write failure.
    #[error("I/O error on {path}: {source}")]
    Io {
        path: String,
        source: std::io::Error,
    },
}

impl RemoldError {
    /// Create an I/O error for the given path.
    pub fn io(path: impl Into<String>, source: std::io::Error) -> Self {
        RemoldError::Io {
            path: path.into(),
            source,
        }
    }

    /// Create a pattern error.
    pub fn pattern(pattern: impl Into<String>, message: impl Into<String>) -> Self {
        RemoldError::Pattern {
            pattern: pattern.into(),
            message: message.into(),
        }
    }

    /// Get the error code for this error.
    pub fn error_code(&self) -> OutputErrorCode {
        OutputErrorCode::from(self)
    }
}

// ============================================================================
// Error Code Mapping
// ============================================================================

impl From<&RemoldError> for OutputErrorCode {
    fn from(err: &RemoldError) -> Self {
        match err {
            RemoldError::DuplicateTransform { .. } => OutputErrorCode::InvalidArguments,
            RemoldError::UnknownTransform { .. } => OutputErrorCode::ResolutionError,
            RemoldError::Pattern { .. } => OutputErrorCode::ResolutionError,
            RemoldError::Parse(_) => OutputErrorCode::ParseFailed,
            RemoldError::Transform { .. } => OutputErrorCode::TransformFailed,
            RemoldError::Io { .. } => OutputErrorCode::IoError,
        }
    }
}

impl From<RemoldError> for OutputErrorCode {
    fn from(err: RemoldError) -> Self {
        OutputErrorCode::from(&err)
    }
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    mod error_code_mapping {
        use super::*;

        #[test]
        fn unknown_transform_maps_to_resolution_error() {
            let err = RemoldError::UnknownTransform {
                name: "nope".to_string(),
                known: vec!["a".to_string()],
            };
            assert_eq!(err.error_code(), OutputErrorCode::ResolutionError);
            assert_eq!(err.error_code().code(), 3);
        }

        #[test]
        fn duplicate_transform_maps_to_invalid_arguments() {
            let err = RemoldError::DuplicateTransform {
                name: "x".to_string(),
            };
            assert_eq!(err.error_code().code(), 2);
        }

        #[test]
        fn parse_maps_to_parse_failed() {
            let err = RemoldError::Parse(ParseError {
                path: "a.js".to_string(),
                line: 1,
                col: 2,
                message: "bad".to_string(),
            });
            assert_eq!(err.error_code().code(), 4);
        }

        #[test]
        fn transform_maps_to_transform_failed() {
            let err = RemoldError::Transform {
                name: "t".to_string(),
                file: "a.js".to_string(),
                source: TransformError::msg("boom"),
            };
            assert_eq!(err.error_code().code(), 5);
        }

        #[test]
        fn io_maps_to_io_error() {
            let err = RemoldError::io("a.js", std::io::Error::other("gone"));
            assert_eq!(err.error_code().code(), 6);
        }
    }

    mod error_display {
        use super::*;

        #[test]
        fn unknown_transform_enumerates_registered_names() {
            let err = RemoldError::UnknownTransform {
                name: "missing".to_string(),
                known: vec!["alpha".to_string(), "beta".to_string()],
            };
            assert_eq!(
                err.to_string(),
                "unknown transform 'missing'; registered transforms: alpha, beta"
            );
        }

        #[test]
        fn parse_error_shows_file_and_position() {
            let err = RemoldError::Parse(ParseError {
                path: "src/a.js".to_string(),
                line: 3,
                col: 7,
                message: "unterminated string literal".to_string(),
            });
            assert_eq!(err.to_string(), "src/a.js:3:7: unterminated string literal");
        }

        #[test]
        fn transform_error_names_transform_and_file() {
            let err = RemoldError::Transform {
                name: "default-to-namespace".to_string(),
                file: "src/a.js".to_string(),
                source: TransformError::msg("boom"),
            };
            assert_eq!(
                err.to_string(),
                "transform 'default-to-namespace' failed on src/a.js: boom"
            );
        }
    }
}

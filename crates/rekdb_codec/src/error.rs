//! Error types for the codec crate.

use thiserror::Error;

/// Result type for codec operations.
pub type CodecResult<T> = Result<T, CodecError>;

/// Errors that can occur during encoding or decoding.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum CodecError {
    /// Failed to encode a document.
    #[error("encoding failed: {message}")]
    EncodingFailed {
        /// Description of the encoding error.
        message: String,
    },

    /// The input is not a well-formed document.
    #[error("parse error: {message}")]
    ParseError {
        /// Description of the parse error.
        message: String,
    },

    /// The document declares a major version this decoder does not know.
    #[error("unsupported format version: {found}")]
    UnsupportedFormatVersion {
        /// The version tag found in the document.
        found: String,
    },
}

impl CodecError {
    /// Create an encoding failed error.
    pub fn encoding_failed(message: impl Into<String>) -> Self {
        Self::EncodingFailed {
            message: message.into(),
        }
    }

    /// Create a parse error.
    pub fn parse_error(message: impl Into<String>) -> Self {
        Self::ParseError {
            message: message.into(),
        }
    }

    /// Create an unsupported format version error.
    pub fn unsupported_version(found: impl Into<String>) -> Self {
        Self::UnsupportedFormatVersion {
            found: found.into(),
        }
    }
}

//! Platform error types.

use std::path::PathBuf;

use thiserror::Error;

/// Errors raised by the platform proxies.
#[derive(Error, Debug)]
pub enum PlatformError {
    /// An asset could not be read.
    #[error("failed to load asset {path}: {source}")]
    Asset {
        /// Resolved file path.
        path: PathBuf,
        /// Underlying I/O error.
        source: std::io::Error,
    },

    /// A text asset that is not valid UTF-8.
    #[error("asset {path} is not valid UTF-8: {source}")]
    InvalidText {
        /// Resolved file path.
        path: PathBuf,
        /// Decoding error, with the offset of the first bad byte.
        source: std::string::FromUtf8Error,
    },

    /// A resource path that cannot be resolved under the asset root.
    #[error("invalid resource path: {0}")]
    InvalidPath(String),
}

/// Result type for platform operations.
pub type PlatformResult<T> = Result<T, PlatformError>;

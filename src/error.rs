//! Error types for texword.

use std::io;
use std::path::PathBuf;
use std::time::Duration;
use thiserror::Error;

/// Result type alias for texword operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Fatal errors that abort a conversion run.
///
/// Recoverable problems (missing include files, unknown citation keys,
/// missing styles, ...) are never errors; they are reported as
/// [`Diagnostic`](crate::diagnostics::Diagnostic)s instead.
#[derive(Error, Debug)]
pub enum Error {
    /// I/O error when reading or writing files.
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    /// The input manuscript does not exist.
    #[error("Source file not found: {}", .0.display())]
    SourceNotFound(PathBuf),

    /// A required external tool is not installed.
    #[error("Required dependency not available: {0}")]
    MissingDependency(String),

    /// The input file type has no conversion route.
    #[error("Unsupported source format: {0}")]
    UnsupportedSource(String),

    /// The conversion engine exited with a non-zero status.
    #[error("Conversion engine failed with status {status}: {stderr}")]
    ConverterFailed {
        /// Exit status as reported by the OS
        status: String,
        /// Captured standard error
        stderr: String,
    },

    /// The conversion engine did not finish in time.
    #[error("Conversion engine timed out after {0:?}")]
    ConverterTimeout(Duration),

    /// The conversion engine finished but produced no output.
    #[error("Conversion engine produced no output at {}", .0.display())]
    MissingOutput(PathBuf),

    /// The DOCX package is structurally invalid.
    #[error("Invalid DOCX package: {0}")]
    InvalidPackage(String),

    /// Malformed XML inside a package part.
    #[error("XML error: {0}")]
    Xml(String),

    /// ZIP container error.
    #[error("ZIP error: {0}")]
    Zip(String),

    /// JSON (de)serialization error.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// Style configuration violates an invariant.
    #[error("Invalid style configuration: {0}")]
    InvalidConfig(String),

    /// Generic error with message.
    #[error("{0}")]
    Other(String),
}

impl From<zip::result::ZipError> for Error {
    fn from(err: zip::result::ZipError) -> Self {
        match err {
            zip::result::ZipError::Io(e) => Error::Io(e),
            _ => Error::Zip(err.to_string()),
        }
    }
}

impl From<quick_xml::Error> for Error {
    fn from(err: quick_xml::Error) -> Self {
        Error::Xml(err.to_string())
    }
}

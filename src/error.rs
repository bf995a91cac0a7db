//! Error types for SPE decoding.

use thiserror::Error;

/// Every way an SPE 3.0 decode can fail.
///
/// Variants carry the byte offset or footer path that was being read so a
/// failure points at the structural assumption that did not hold.
#[derive(Error, Debug)]
pub enum FormatError {
    /// Header version is below 3.0
    #[error("Unsupported SPE version {version:.1} (3.0 or newer required)")]
    UnsupportedVersion { version: f32 },

    /// Fewer bytes were available than a read required
    #[error("Truncated file: needed {needed} bytes at offset {offset}, only {available} available")]
    Truncated {
        offset: u64,
        needed: u64,
        available: u64,
    },

    /// Footer bytes are not UTF-8 or not well-formed XML
    #[error("Invalid XML footer at offset {offset}: {reason}")]
    InvalidFooterXml { offset: u64, reason: String },

    /// An expected footer element or attribute is absent
    #[error("Missing footer path: {path}")]
    MissingFooterPath { path: String },

    /// A path segment that must name one element matched several siblings
    #[error("Ambiguous footer path: {path} matches {count} elements")]
    AmbiguousFooterPath { path: String, count: usize },

    /// Raw dtype code outside {0, 1, 2, 3, 8}
    #[error("Unrecognized data type code {code}; expected one of {{0, 1, 2, 3, 8}}")]
    UnrecognizedDtypeCode { code: u16 },

    /// An attribute or text value failed to parse as a number
    #[error("Malformed value {value:?} for {attribute} at {path}")]
    MalformedAttribute {
        path: String,
        attribute: String,
        value: String,
    },

    /// Region blocks plus metadata record do not fit the declared frame stride
    #[error("Inconsistent frame layout: {consumed} bytes per frame against a stride of {stride}")]
    InconsistentLayout { consumed: u64, stride: u64 },

    /// I/O failure that is not an end-of-file condition
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

impl FormatError {
    /// Create a missing-path error from footer path segments.
    pub fn missing(path: impl Into<String>) -> Self {
        Self::MissingFooterPath { path: path.into() }
    }

    /// Create a malformed-attribute error.
    pub fn malformed(
        path: impl Into<String>,
        attribute: impl Into<String>,
        value: impl Into<String>,
    ) -> Self {
        Self::MalformedAttribute {
            path: path.into(),
            attribute: attribute.into(),
            value: value.into(),
        }
    }
}

/// Result type alias for SPE operations.
pub type Result<T> = std::result::Result<T, FormatError>;

//! Error types for ScanM recordings.

use std::path::PathBuf;
use thiserror::Error;

/// Result type for ScanM operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Errors raised while loading a ScanM recording.
#[derive(Error, Debug)]
pub enum Error {
    /// Header or pixel data file does not exist.
    #[error("file `{}` not found", .0.display())]
    FileNotFound(PathBuf),

    /// File I/O error.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Fewer than 64 bytes available at the pre-header offset.
    #[error("malformed pre-header at offset {offset}: {available} byte(s) available")]
    MalformedPreHeader { offset: u64, available: usize },

    /// The header file did not contain a single parameter line.
    #[error(".smh parameter not found")]
    NoParametersFound,

    /// A parameter line lacks its type or key/value separator.
    #[error("malformed parameter line `{0}`")]
    MalformedParameterLine(String),

    /// A parameter line carries a type tag other than String/REAL32/UINT32/UINT64.
    #[error("type `{0}` not implemented")]
    UnknownValueType(String),

    /// Operation called out of order (pixel data before header).
    #[error("invalid state: {0}")]
    InvalidState(&'static str),

    /// Scan mode value outside the known enumeration, or no scan mode at all.
    #[error(
        "unknown scan mode {}",
        .0.map_or_else(|| "(missing)".to_string(), |code| code.to_string())
    )]
    UnsupportedScanMode(Option<u64>),

    /// Recognized feature without an implementation.
    #[error("`{0}` not implemented")]
    NotImplemented(String),

    /// Pixel size other than 2 (u16) or 8 (f64) bytes.
    #[error("invalid pixel size: {0} byte(s)")]
    InvalidPixelSize(u64),

    /// Channel buffer length does not match the requested shape.
    #[error("cannot reshape {len} samples into {shape:?}")]
    ReshapeFailure { len: usize, shape: [usize; 3] },

    /// Pixel file ended before all buffers were read.
    #[error("end of pixel data file after {read} of {expected} buffer(s)")]
    UnexpectedEndOfFile { read: usize, expected: usize },

    /// A parameter required for pixel arithmetic is absent or null.
    #[error("parameter `{0}` missing")]
    MissingParameter(&'static str),

    /// A parameter value too large for the pixel arithmetic.
    #[error("parameter `{0}` out of range")]
    InvalidParameter(&'static str),
}

impl Error {
    /// Legacy numeric error code (0 is reserved for success).
    pub fn code(&self) -> u32 {
        match self {
            Error::NotImplemented(_) => 1,
            Error::FileNotFound(_) => 2,
            Error::InvalidState(_) => 3,
            Error::NoParametersFound => 4,
            Error::ReshapeFailure { .. } => 5,
            Error::UnsupportedScanMode(_) => 6,
            Error::Io(_)
            | Error::MalformedPreHeader { .. }
            | Error::MalformedParameterLine(_)
            | Error::UnknownValueType(_)
            | Error::InvalidPixelSize(_)
            | Error::UnexpectedEndOfFile { .. }
            | Error::MissingParameter(_)
            | Error::InvalidParameter(_) => 7,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_legacy_codes() {
        assert_eq!(Error::NotImplemented("Line".into()).code(), 1);
        assert_eq!(Error::InvalidState("load header first").code(), 3);
        assert_eq!(Error::NoParametersFound.code(), 4);
        assert_eq!(
            Error::ReshapeFailure {
                len: 10,
                shape: [1, 2, 3]
            }
            .code(),
            5
        );
    }

    #[test]
    fn test_unsupported_scan_mode_message() {
        let err = Error::UnsupportedScanMode(Some(12));
        assert_eq!(err.to_string(), "unknown scan mode 12");
        assert_eq!(err.code(), 6);
        let err = Error::UnsupportedScanMode(None);
        assert_eq!(err.to_string(), "unknown scan mode (missing)");
        assert_eq!(err.code(), 6);
    }

    #[test]
    fn test_not_implemented_message() {
        let err = Error::NotImplemented("XZYImage".into());
        assert_eq!(err.to_string(), "`XZYImage` not implemented");
    }
}

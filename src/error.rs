//! Error handling for the onedd library.
//!
//! This module defines all error types that can occur while decoding 1DD files,
//! including I/O errors, format validation errors, and processing errors.

use std::error::Error as StdError;
use thiserror::Error;

/// A specialized `Result` type for onedd operations.
///
/// It's equivalent to `std::result::Result<T, OneddError>`.
///
/// # Examples
///
/// ```rust
/// use onedd::{Header, Result};
///
/// fn build_header() -> Result<Header> {
///     let header = Header::new(1997, 1, 31, -99999.0);
///     header.days()?;
///     Ok(header)
/// }
/// ```
pub type Result<T> = std::result::Result<T, OneddError>;

/// Broad classification of an [`OneddError`].
///
/// Callers usually only need to know which family an error belongs to:
/// a malformed file, a bad day index, or a reader that was already closed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorKind {
    /// Failure in the underlying stream.
    Io,
    /// The bytes do not describe a valid 1DD file.
    Format,
    /// A day index outside `[0, day_count)`.
    Range,
    /// An operation on a reader after `close()`.
    Closed,
    /// Error raised by a user-supplied parallel processor.
    Process,
}

/// Error types for onedd operations.
///
/// # Examples
///
/// ```rust
/// use onedd::{ErrorKind, GridReader, OneddError};
/// use std::io::Cursor;
///
/// // A header block without a single `key=value` pair
/// let cursor = Cursor::new(vec![b' '; 1440]);
///
/// match GridReader::open(cursor) {
///     Err(OneddError::EmptyHeader) => println!("Not a 1DD file"),
///     Err(e) => assert_ne!(e.kind(), ErrorKind::Range),
///     Ok(_) => unreachable!(),
/// }
/// ```
#[derive(Error, Debug)]
pub enum OneddError {
    /// I/O error from the underlying stream.
    #[error("I/O error")]
    Io(#[from] std::io::Error),

    /// Compression/decompression error from niffler.
    #[cfg(feature = "niffler")]
    #[error("Niffler error")]
    Niffler(#[from] niffler::Error),

    /// The header block contains no `key=value` pairs.
    ///
    /// This usually indicates the file is not a 1DD file at all.
    #[error("Header block contains no key=value fields")]
    EmptyHeader,

    /// A required header field is absent.
    #[error("Missing required header field: {0}")]
    MissingField(String),

    /// A header field is present but its value cannot be interpreted.
    #[error("Invalid value for header field {field}: {value:?}")]
    InvalidField { field: String, value: String },

    /// A box-center field disagrees with the supported scan order.
    #[error("Unsupported scan order: {field} is {actual:?}, expected {expected:?}")]
    ScanOrderMismatch {
        field: &'static str,
        expected: &'static str,
        actual: String,
    },

    /// Header year/month and a day index do not form a calendar date.
    #[error("Invalid date: {year}-{month:02}-{day:02}")]
    InvalidDate { year: i32, month: u32, day: u32 },

    /// The stream ended inside the header block or a day record.
    #[error("Truncated record at position {pos}: expected {expected} bytes, found {actual}")]
    TruncatedRecord {
        pos: u64,
        expected: usize,
        actual: usize,
    },

    /// The rendered header does not fit in the fixed header block.
    #[error("Header of {0} bytes does not fit in the 1440 byte header block")]
    HeaderTooLong(usize),

    /// A day handed to the writer does not hold one reading per cell.
    #[error("Invalid day length: {0} (must be 64800)")]
    InvalidDayLength(usize),

    /// Day index is out of bounds.
    #[error("Invalid index ({idx}) - Must be less than {max}")]
    InvalidIndex { idx: usize, max: usize },

    /// The reader has been closed.
    #[error("Reader is closed")]
    Closed,

    /// Error occurred during parallel processing.
    #[error("Processing error: {0}")]
    Process(Box<dyn StdError + Send + Sync>),
}

impl OneddError {
    /// Returns the family this error belongs to.
    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::Io(_) => ErrorKind::Io,
            #[cfg(feature = "niffler")]
            Self::Niffler(_) => ErrorKind::Io,
            Self::EmptyHeader
            | Self::MissingField(_)
            | Self::InvalidField { .. }
            | Self::ScanOrderMismatch { .. }
            | Self::InvalidDate { .. }
            | Self::TruncatedRecord { .. }
            | Self::HeaderTooLong(_)
            | Self::InvalidDayLength(_) => ErrorKind::Format,
            Self::InvalidIndex { .. } => ErrorKind::Range,
            Self::Closed => ErrorKind::Closed,
            Self::Process(_) => ErrorKind::Process,
        }
    }
}

/// Trait for converting errors into `OneddError::Process` variants.
///
/// This lets a [`ParallelProcessor`](crate::ParallelProcessor) surface its own
/// error types through `process_parallel`.
///
/// # Examples
///
/// ```rust
/// use onedd::{IntoOneddError, OneddError};
///
/// let err = std::fmt::Error.into_onedd_error();
/// assert!(matches!(err, OneddError::Process(_)));
/// ```
pub trait IntoOneddError {
    /// Converts the error into an `OneddError`.
    fn into_onedd_error(self) -> OneddError;
}

impl<E> IntoOneddError for E
where
    E: std::error::Error + Send + Sync + 'static,
{
    fn into_onedd_error(self) -> OneddError {
        OneddError::Process(self.into())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fmt;

    #[derive(Debug)]
    struct CustomError(String);

    impl fmt::Display for CustomError {
        fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
            write!(f, "Custom error: {}", self.0)
        }
    }

    impl std::error::Error for CustomError {}

    #[test]
    fn test_error_display_messages() {
        let err = OneddError::MissingField("days".to_string());
        assert!(format!("{}", err).contains("days"));

        let err = OneddError::InvalidField {
            field: "year".to_string(),
            value: "19x7".to_string(),
        };
        let display = format!("{}", err);
        assert!(display.contains("year"));
        assert!(display.contains("19x7"));

        let err = OneddError::ScanOrderMismatch {
            field: "1st_box_center",
            expected: "(89.5N,0.5E)",
            actual: "(89.5S,0.5E)".to_string(),
        };
        let display = format!("{}", err);
        assert!(display.contains("1st_box_center"));
        assert!(display.contains("(89.5S,0.5E)"));

        let err = OneddError::InvalidDate {
            year: 1997,
            month: 2,
            day: 30,
        };
        assert_eq!(format!("{}", err), "Invalid date: 1997-02-30");

        let err = OneddError::TruncatedRecord {
            pos: 1440,
            expected: 259_200,
            actual: 12,
        };
        let display = format!("{}", err);
        assert!(display.contains("1440"));
        assert!(display.contains("259200"));

        let err = OneddError::InvalidIndex { idx: 31, max: 31 };
        let display = format!("{}", err);
        assert!(display.contains("(31)"));
        assert!(display.contains("less than 31"));

        let err = OneddError::Process(CustomError("test error".to_string()).into());
        assert!(format!("{}", err).contains("Processing error"));
    }

    #[test]
    fn test_error_kinds() {
        assert_eq!(OneddError::EmptyHeader.kind(), ErrorKind::Format);
        assert_eq!(
            OneddError::MissingField("year".into()).kind(),
            ErrorKind::Format
        );
        assert_eq!(
            OneddError::TruncatedRecord {
                pos: 0,
                expected: 1440,
                actual: 0
            }
            .kind(),
            ErrorKind::Format
        );
        assert_eq!(
            OneddError::InvalidIndex { idx: 0, max: 0 }.kind(),
            ErrorKind::Range
        );
        assert_eq!(OneddError::Closed.kind(), ErrorKind::Closed);
        let io_err = std::io::Error::new(std::io::ErrorKind::Other, "boom");
        assert_eq!(OneddError::from(io_err).kind(), ErrorKind::Io);
    }

    #[test]
    fn test_io_error_conversion() {
        let io_err = std::io::Error::new(std::io::ErrorKind::NotFound, "File not found");
        let err: OneddError = io_err.into();

        match err {
            OneddError::Io(inner) => {
                assert_eq!(inner.kind(), std::io::ErrorKind::NotFound);
            }
            _ => panic!("Expected Io variant"),
        }
    }

    #[test]
    fn test_into_onedd_error_trait() {
        let custom_err = CustomError("test".to_string());
        let err = custom_err.into_onedd_error();

        match err {
            OneddError::Process(boxed) => {
                assert!(format!("{}", boxed).contains("Custom error: test"));
            }
            _ => panic!("Expected Process variant"),
        }
    }

    #[test]
    fn test_error_source_chain() {
        let io_err = std::io::Error::new(std::io::ErrorKind::PermissionDenied, "Access denied");
        let err = OneddError::Io(io_err);

        let source = err.source().expect("io errors keep their source");
        let io_source = source.downcast_ref::<std::io::Error>();
        assert_eq!(
            io_source.map(|e| e.kind()),
            Some(std::io::ErrorKind::PermissionDenied)
        );
    }

    #[test]
    fn test_error_send_sync() {
        fn is_send<T: Send>() {}
        fn is_sync<T: Sync>() {}

        is_send::<OneddError>();
        is_sync::<OneddError>();
    }
}

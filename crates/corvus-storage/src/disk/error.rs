//! Error types for the disk manager.

use std::io;

use thiserror::Error;

/// Result type for disk operations.
pub type DiskResult<T> = Result<T, DiskError>;

/// Errors that can occur during page I/O.
#[derive(Debug, Error)]
#[allow(missing_docs)] // Fields are documented by variant docs
pub enum DiskError {
    /// Underlying file I/O failed.
    #[error("I/O error: {source}")]
    Io {
        #[from]
        source: io::Error,
    },

    /// Caller handed over a buffer that is not exactly one page long.
    #[error("buffer of {len} bytes does not match page size {expected}")]
    BufferSize { len: usize, expected: usize },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_display() {
        let err = DiskError::BufferSize {
            len: 100,
            expected: 4096,
        };
        assert_eq!(
            err.to_string(),
            "buffer of 100 bytes does not match page size 4096"
        );
    }

    #[test]
    fn test_from_io() {
        let io_err = io::Error::new(io::ErrorKind::NotFound, "gone");
        let err: DiskError = io_err.into();
        assert!(matches!(err, DiskError::Io { .. }));
    }
}

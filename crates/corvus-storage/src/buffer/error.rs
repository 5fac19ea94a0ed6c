//! Buffer pool errors.

use std::io;

use thiserror::Error;

use crate::disk::DiskError;

/// Result type for buffer pool operations.
pub type BufferResult<T> = Result<T, BufferError>;

/// Errors that can occur during buffer pool operations.
#[derive(Debug, Error)]
#[allow(missing_docs)] // Fields are documented by variant docs
pub enum BufferError {
    /// Every frame is pinned and no victim could be found.
    #[error("no free frames available, all pages are pinned")]
    NoFreeFrames,

    /// Configuration rejected at construction.
    #[error("configuration error: {message}")]
    Config { message: &'static str },

    /// Page I/O failed; the underlying error is passed through unchanged.
    #[error("disk I/O failed: {source}")]
    Disk {
        #[from]
        source: DiskError,
    },

    /// The log manager failed to flush before a page writeback.
    #[error("log flush failed: {source}")]
    Log {
        #[from]
        source: io::Error,
    },
}

impl BufferError {
    /// Returns true if retrying after pins are released can succeed.
    pub fn is_retryable(&self) -> bool {
        matches!(self, Self::NoFreeFrames)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_is_retryable() {
        assert!(BufferError::NoFreeFrames.is_retryable());
        assert!(!BufferError::Config { message: "bad" }.is_retryable());
    }

    #[test]
    fn test_display() {
        assert_eq!(
            BufferError::NoFreeFrames.to_string(),
            "no free frames available, all pages are pinned"
        );
    }
}

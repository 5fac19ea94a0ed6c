//! # corvus-storage
//!
//! Disk paging and the buffer pool for CorvusDB.
//!
//! This crate implements the page-level storage core:
//!
//! - **Disk manager**: blocking, page-granular I/O over a single data file
//! - **Buffer pool**: a fixed set of in-memory frames caching disk pages,
//!   with pin/unpin accounting and second-chance clock eviction
//! - **Log hook**: the flush-ordering seam a write-ahead log plugs into

#![warn(missing_docs)]
#![warn(clippy::all)]

/// Buffer pool implementation
pub mod buffer;

/// Disk manager and page-granular file I/O
pub mod disk;

/// Write-ahead-log flush ordering hook
pub mod wal;

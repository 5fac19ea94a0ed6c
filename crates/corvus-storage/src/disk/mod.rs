//! Page-granular disk I/O.
//!
//! The disk manager is the layer below the buffer pool: it reads and writes
//! whole pages at `page_id * PAGE_SIZE` offsets in a single data file. All
//! calls block the calling thread; the buffer pool serializes them per
//! instance under its own lock.

mod error;
mod manager;

pub use error::{DiskError, DiskResult};
pub use manager::{DiskManager, FileDiskManager};

//! Write-ahead-log flush ordering hook.
//!
//! The buffer pool never writes a dirty page whose last change has not yet
//! reached the durable log. It enforces that through this trait: before
//! writeback, if the frame's recorded LSN exceeds [`LogManager::last_flushed_lsn`],
//! the pool calls [`LogManager::flush_until`] and only proceeds once that
//! returns.

use std::io;

use corvus_common::Lsn;

/// The flush-ordering seam a write-ahead log plugs into.
pub trait LogManager: Send + Sync {
    /// Highest LSN known to be durable.
    fn last_flushed_lsn(&self) -> Lsn;

    /// Blocks until the log is durable up to `lsn`.
    fn flush_until(&self, lsn: Lsn) -> io::Result<()>;
}

/// Log manager for deployments running without a WAL.
///
/// Reports everything as already flushed, so page writeback never waits.
#[derive(Debug, Default, Clone, Copy)]
pub struct NoopLogManager;

impl LogManager for NoopLogManager {
    fn last_flushed_lsn(&self) -> Lsn {
        Lsn::MAX
    }

    fn flush_until(&self, _lsn: Lsn) -> io::Result<()> {
        Ok(())
    }
}

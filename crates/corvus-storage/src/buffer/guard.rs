//! RAII pin token for a page resident in the pool.

use std::sync::Arc;

use corvus_common::{Lsn, PageId};
use parking_lot::{RwLockReadGuard, RwLockWriteGuard};

use super::frame::{BufferFrame, FrameId};
use super::pool::BufferPool;

/// A pinned page.
///
/// Returned by [`BufferPool::fetch_page`] and [`BufferPool::new_page`].
/// Holding the guard keeps the page's frame out of the replacer; dropping
/// it releases the pin and reports whether this pinner dirtied the page.
///
/// The pool does not arbitrate between multiple pinners of the same page:
/// payload access goes through the frame's own read/write lock, taken per
/// call on [`data`](Self::data) and [`data_mut`](Self::data_mut). Release
/// the payload lock before calling pool-level flushes; a writeback of this
/// page waits on it.
pub struct PageGuard<'a> {
    pool: &'a BufferPool,
    frame: Arc<BufferFrame>,
    page_id: PageId,
    dirty: bool,
}

impl<'a> PageGuard<'a> {
    pub(crate) fn new(pool: &'a BufferPool, frame: Arc<BufferFrame>, page_id: PageId) -> Self {
        Self {
            pool,
            frame,
            page_id,
            dirty: false,
        }
    }

    /// Returns the page ID.
    #[inline]
    pub fn page_id(&self) -> PageId {
        self.page_id
    }

    /// Returns the frame the page currently occupies.
    #[inline]
    pub fn frame_id(&self) -> FrameId {
        self.frame.frame_id()
    }

    /// Read access to the page bytes.
    #[inline]
    pub fn data(&self) -> RwLockReadGuard<'_, Box<[u8]>> {
        self.frame.read_data()
    }

    /// Write access to the page bytes. Marks the pin dirty.
    #[inline]
    pub fn data_mut(&mut self) -> RwLockWriteGuard<'_, Box<[u8]>> {
        self.dirty = true;
        self.frame.write_data()
    }

    /// Marks the pin dirty without touching the bytes.
    #[inline]
    pub fn mark_dirty(&mut self) {
        self.dirty = true;
    }

    /// Records the LSN of the last logged change made through this pin, so
    /// the pool can flush the log that far before writing the page back.
    pub fn set_lsn(&mut self, lsn: Lsn) {
        self.pool.record_lsn(self.page_id, lsn);
    }

    /// Releases the pin, folding `dirty` into the flag accumulated by
    /// earlier [`data_mut`](Self::data_mut)/[`mark_dirty`](Self::mark_dirty)
    /// calls.
    pub fn unpin(mut self, dirty: bool) {
        self.dirty |= dirty;
    }
}

impl Drop for PageGuard<'_> {
    fn drop(&mut self) {
        self.pool.unpin_page(self.page_id, self.dirty);
    }
}

impl std::fmt::Debug for PageGuard<'_> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PageGuard")
            .field("page_id", &self.page_id)
            .field("frame_id", &self.frame.frame_id())
            .field("dirty", &self.dirty)
            .finish()
    }
}

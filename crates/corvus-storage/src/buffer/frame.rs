//! Page frames: the payload buffers and the per-frame bookkeeping.

use corvus_common::{Lsn, PageId, PAGE_SIZE};
use parking_lot::{RwLock, RwLockReadGuard, RwLockWriteGuard};

/// Frame identifier - index into the pool's frame array.
///
/// Frame identity is stable for the lifetime of the pool; the buffer behind
/// it is reused for many page ids.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct FrameId(usize);

impl FrameId {
    /// Creates a new frame ID.
    #[inline]
    pub const fn new(id: usize) -> Self {
        Self(id)
    }

    /// Returns the raw index.
    #[inline]
    pub const fn index(self) -> usize {
        self.0
    }
}

impl From<usize> for FrameId {
    fn from(id: usize) -> Self {
        Self::new(id)
    }
}

impl From<FrameId> for usize {
    fn from(id: FrameId) -> Self {
        id.0
    }
}

/// The payload buffer of one frame.
///
/// The bytes sit behind their own lock, separate from the pool's metadata
/// mutex: whoever holds a pin owns payload access and coordinates readers
/// and writers through this lock without going through the pool.
pub struct BufferFrame {
    frame_id: FrameId,
    data: RwLock<Box<[u8]>>,
}

impl BufferFrame {
    pub(crate) fn new(frame_id: FrameId) -> Self {
        Self {
            frame_id,
            data: RwLock::new(vec![0u8; PAGE_SIZE].into_boxed_slice()),
        }
    }

    /// Returns the frame ID.
    #[inline]
    pub fn frame_id(&self) -> FrameId {
        self.frame_id
    }

    /// Returns a read lock on the page bytes.
    #[inline]
    pub fn read_data(&self) -> RwLockReadGuard<'_, Box<[u8]>> {
        self.data.read()
    }

    /// Returns a write lock on the page bytes.
    #[inline]
    pub fn write_data(&self) -> RwLockWriteGuard<'_, Box<[u8]>> {
        self.data.write()
    }

    pub(crate) fn zero(&self) {
        self.data.write().fill(0);
    }
}

impl std::fmt::Debug for BufferFrame {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("BufferFrame")
            .field("frame_id", &self.frame_id)
            .finish()
    }
}

/// Bookkeeping for one frame. Lives in the pool's metadata vector, guarded
/// by the pool mutex together with the page table and the free list.
#[derive(Debug, Clone)]
pub(crate) struct FrameMeta {
    /// Page resident in the frame, or `INVALID` while on the free list.
    pub page_id: PageId,
    /// Outstanding pins. The frame is evictable only at zero.
    pub pin_count: u32,
    /// Set when the in-memory bytes diverge from disk; sticky until
    /// writeback.
    pub is_dirty: bool,
    /// LSN of the last change, for log-before-data ordering.
    pub lsn: Lsn,
}

impl FrameMeta {
    pub fn new() -> Self {
        Self {
            page_id: PageId::INVALID,
            pin_count: 0,
            is_dirty: false,
            lsn: Lsn::INVALID,
        }
    }

    /// Restores the state a frame has while it sits on the free list.
    pub fn reset(&mut self) {
        *self = Self::new();
    }

    #[inline]
    pub fn is_pinned(&self) -> bool {
        self.pin_count > 0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_frame_id_conversions() {
        let id = FrameId::new(42);
        assert_eq!(id.index(), 42);
        assert_eq!(usize::from(id), 42);
        assert_eq!(FrameId::from(42usize), id);
    }

    #[test]
    fn test_buffer_frame_data_access() {
        let frame = BufferFrame::new(FrameId::new(0));
        {
            let mut data = frame.write_data();
            data[0..4].copy_from_slice(&[1, 2, 3, 4]);
        }
        {
            let data = frame.read_data();
            assert_eq!(data.len(), PAGE_SIZE);
            assert_eq!(&data[0..4], &[1, 2, 3, 4]);
        }

        frame.zero();
        assert!(frame.read_data().iter().all(|&b| b == 0));
    }

    #[test]
    fn test_meta_reset() {
        let mut meta = FrameMeta::new();
        meta.page_id = PageId::new(9);
        meta.pin_count = 2;
        meta.is_dirty = true;
        meta.lsn = Lsn::new(77);
        assert!(meta.is_pinned());

        meta.reset();
        assert!(!meta.page_id.is_valid());
        assert_eq!(meta.pin_count, 0);
        assert!(!meta.is_dirty);
        assert!(!meta.lsn.is_valid());
    }
}

//! Victim-selection policy interface.

use super::frame::FrameId;

/// A replacement policy over the frames that are candidates for eviction.
///
/// The policy knows nothing about pages or disk; it tracks frame ids and a
/// pinned/evictable state per frame. Implementations serialize concurrent
/// callers internally, so the pool may call any method while holding its
/// own lock (pool lock before replacer lock, never the other way around).
pub trait Replacer: Send + Sync {
    /// Marks `frame_id` as in use and thus not evictable. Registers it
    /// first if the policy has not seen it yet.
    fn pin(&self, frame_id: FrameId);

    /// Marks `frame_id` evictable. Registers it (already evictable) if the
    /// policy has not seen it yet.
    fn unpin(&self, frame_id: FrameId);

    /// Selects a victim among the evictable frames and deregisters it, or
    /// returns `None` when nothing is evictable.
    fn victim(&self) -> Option<FrameId>;

    /// Deregisters `frame_id` entirely, e.g. when its page is deleted.
    fn remove(&self, frame_id: FrameId);

    /// Number of evictable frames.
    fn len(&self) -> usize;

    /// Returns true when no frame is evictable.
    fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

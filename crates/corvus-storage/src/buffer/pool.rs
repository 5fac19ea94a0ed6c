//! Buffer pool implementation.
//!
//! The pool owns a fixed slab of page frames and mediates every page-level
//! read and write between storage clients and the disk manager: page
//! lookups through the page table, frame reuse through the free list and
//! the replacer, dirty-page writeback before eviction, and page-id
//! allocation for this instance's shard.

use std::collections::{HashMap, VecDeque};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use corvus_common::{Lsn, PageId};
use parking_lot::Mutex;
use tracing::{debug, trace, warn};

use crate::disk::DiskManager;
use crate::wal::LogManager;

use super::clock::ClockReplacer;
use super::config::BufferPoolConfig;
use super::error::{BufferError, BufferResult};
use super::frame::{BufferFrame, FrameId, FrameMeta};
use super::guard::PageGuard;
use super::replacer::Replacer;
use super::BufferPoolStats;

/// Bookkeeping guarded by the pool mutex: the page table, the free list,
/// every frame's metadata, and the page-id allocator.
///
/// Two invariants tie the pieces together: a frame index is either on the
/// free list or reachable through the page table, never both; and a frame
/// on the free list is unpinned, clean, and holds no page.
struct PoolCore {
    metas: Vec<FrameMeta>,
    page_table: HashMap<PageId, FrameId>,
    free_list: VecDeque<FrameId>,
    next_page_id: u64,
}

/// One buffer pool instance.
///
/// All metadata transitions happen under a single mutex; page I/O is
/// performed while that mutex is held, which serializes disk traffic per
/// instance. Deployments that need more I/O parallelism run several
/// instances and route each page id to `instance = id % num_instances`.
///
/// Payload bytes are *not* covered by the pool mutex: each frame carries
/// its own read/write lock, and coordinating concurrent pinners of the same
/// page is the callers' business.
pub struct BufferPool {
    config: BufferPoolConfig,
    /// Payload buffers, index-aligned with `PoolCore::metas`.
    frames: Vec<Arc<BufferFrame>>,
    core: Mutex<PoolCore>,
    replacer: Box<dyn Replacer>,
    disk: Arc<dyn DiskManager>,
    log: Arc<dyn LogManager>,
    /// Fetch counter for statistics.
    fetch_count: AtomicU64,
    /// Hit counter for statistics.
    hit_count: AtomicU64,
    /// Miss counter for statistics.
    miss_count: AtomicU64,
    /// Eviction counter for statistics.
    eviction_count: AtomicU64,
    /// Flush counter for statistics.
    flush_count: AtomicU64,
}

impl BufferPool {
    /// Creates a pool with the default clock replacement policy.
    pub fn new(
        config: BufferPoolConfig,
        disk: Arc<dyn DiskManager>,
        log: Arc<dyn LogManager>,
    ) -> BufferResult<Self> {
        let replacer = Box::new(ClockReplacer::new(config.pool_size));
        Self::with_replacer(config, disk, log, replacer)
    }

    /// Creates a pool with a caller-chosen replacement policy. The policy
    /// must have capacity for `config.pool_size` frames.
    pub fn with_replacer(
        config: BufferPoolConfig,
        disk: Arc<dyn DiskManager>,
        log: Arc<dyn LogManager>,
        replacer: Box<dyn Replacer>,
    ) -> BufferResult<Self> {
        config
            .validate()
            .map_err(|message| BufferError::Config { message })?;

        let pool_size = config.pool_size;
        let frames = (0..pool_size)
            .map(|i| Arc::new(BufferFrame::new(FrameId::new(i))))
            .collect();

        // Initially every frame is on the free list, in index order.
        let core = PoolCore {
            metas: vec![FrameMeta::new(); pool_size],
            page_table: HashMap::with_capacity(pool_size),
            free_list: (0..pool_size).map(FrameId::new).collect(),
            next_page_id: u64::from(config.instance_index),
        };

        Ok(Self {
            config,
            frames,
            core: Mutex::new(core),
            replacer,
            disk,
            log,
            fetch_count: AtomicU64::new(0),
            hit_count: AtomicU64::new(0),
            miss_count: AtomicU64::new(0),
            eviction_count: AtomicU64::new(0),
            flush_count: AtomicU64::new(0),
        })
    }

    /// Fetches a page, pinning it for the caller.
    ///
    /// A resident page is pinned in place, on top of however many pins other
    /// callers already hold. Otherwise the page is read from disk into a
    /// reclaimed frame. Fails with [`BufferError::NoFreeFrames`] when every
    /// frame is pinned.
    pub fn fetch_page(&self, page_id: PageId) -> BufferResult<PageGuard<'_>> {
        self.fetch_count.fetch_add(1, Ordering::Relaxed);
        let mut core = self.core.lock();

        if let Some(&frame_id) = core.page_table.get(&page_id) {
            self.hit_count.fetch_add(1, Ordering::Relaxed);
            let meta = &mut core.metas[frame_id.index()];
            meta.pin_count += 1;
            self.replacer.pin(frame_id);
            trace!(%page_id, frame = frame_id.index(), pins = meta.pin_count, "fetch hit");
            return Ok(self.guard(page_id, frame_id));
        }

        self.miss_count.fetch_add(1, Ordering::Relaxed);
        let frame_id = self.take_frame(&mut core)?;

        {
            let mut data = self.frames[frame_id.index()].write_data();
            data.fill(0);
            if let Err(e) = self.disk.read_page(page_id, &mut data) {
                core.free_list.push_front(frame_id);
                return Err(e.into());
            }
        }

        let meta = &mut core.metas[frame_id.index()];
        meta.page_id = page_id;
        meta.pin_count = 1;
        meta.is_dirty = false;
        core.page_table.insert(page_id, frame_id);
        self.replacer.pin(frame_id);
        trace!(%page_id, frame = frame_id.index(), "fetch miss, loaded from disk");
        Ok(self.guard(page_id, frame_id))
    }

    /// Allocates a fresh page id for this instance's shard and pins an
    /// empty, zeroed frame for it.
    ///
    /// The new page is born dirty: even if the caller never writes a byte,
    /// eviction or a flush pushes the zeroed page to disk, so the id is
    /// observably allocated after a restart. Fails with
    /// [`BufferError::NoFreeFrames`] when every frame is pinned; no page id
    /// is consumed in that case.
    pub fn new_page(&self) -> BufferResult<PageGuard<'_>> {
        let mut core = self.core.lock();

        if core.metas.iter().all(FrameMeta::is_pinned) {
            return Err(BufferError::NoFreeFrames);
        }

        let frame_id = self.take_frame(&mut core)?;
        let page_id = self.allocate_page(&mut core);

        self.frames[frame_id.index()].zero();
        let meta = &mut core.metas[frame_id.index()];
        meta.page_id = page_id;
        meta.pin_count = 1;
        meta.is_dirty = true;
        core.page_table.insert(page_id, frame_id);
        self.replacer.pin(frame_id);
        debug!(%page_id, frame = frame_id.index(), "allocated page");
        Ok(self.guard(page_id, frame_id))
    }

    /// Releases one pin on `page_id`, folding `is_dirty` into the frame's
    /// dirty flag (once dirty, dirty until writeback).
    ///
    /// Returns false when the page is not resident or has no outstanding
    /// pins. The frame becomes evictable when the last pin goes.
    pub fn unpin_page(&self, page_id: PageId, is_dirty: bool) -> bool {
        let mut core = self.core.lock();
        let Some(&frame_id) = core.page_table.get(&page_id) else {
            warn!(%page_id, "unpin of a page that is not resident");
            return false;
        };

        let meta = &mut core.metas[frame_id.index()];
        if meta.pin_count == 0 {
            warn!(%page_id, "unpin of a page with no outstanding pins");
            return false;
        }

        meta.pin_count -= 1;
        meta.is_dirty |= is_dirty;
        if meta.pin_count == 0 {
            self.replacer.unpin(frame_id);
        }
        true
    }

    /// Writes `page_id`'s frame to disk and clears its dirty flag.
    ///
    /// Safe to call while the page is pinned; clean pages are written too.
    /// Returns `Ok(false)` when the page is not resident.
    pub fn flush_page(&self, page_id: PageId) -> BufferResult<bool> {
        let mut core = self.core.lock();
        let Some(&frame_id) = core.page_table.get(&page_id) else {
            return Ok(false);
        };

        self.write_frame(&core, frame_id)?;
        core.metas[frame_id.index()].is_dirty = false;
        Ok(true)
    }

    /// Writes every resident page to disk, clears the dirty flags, and
    /// syncs the data file. Returns the number of pages written.
    pub fn flush_all_pages(&self) -> BufferResult<usize> {
        let mut core = self.core.lock();
        let frame_ids: Vec<FrameId> = core.page_table.values().copied().collect();
        for &frame_id in &frame_ids {
            self.write_frame(&core, frame_id)?;
            core.metas[frame_id.index()].is_dirty = false;
        }
        self.disk.sync()?;
        Ok(frame_ids.len())
    }

    /// Deletes a page from the pool.
    ///
    /// A page that is not resident only triggers the disk deallocation
    /// hook. A pinned page cannot be deleted (`Ok(false)`). Otherwise the
    /// frame is reset and pushed to the *front* of the free list, so a
    /// freshly deleted frame is the next one reused. The page id itself is
    /// never reallocated.
    pub fn delete_page(&self, page_id: PageId) -> BufferResult<bool> {
        let mut core = self.core.lock();
        let Some(&frame_id) = core.page_table.get(&page_id) else {
            self.disk.deallocate_page(page_id)?;
            return Ok(true);
        };

        if core.metas[frame_id.index()].is_pinned() {
            return Ok(false);
        }

        core.metas[frame_id.index()].reset();
        core.page_table.remove(&page_id);
        core.free_list.push_front(frame_id);
        self.replacer.remove(frame_id);
        self.disk.deallocate_page(page_id)?;
        debug!(%page_id, frame = frame_id.index(), "deleted page");
        Ok(true)
    }

    /// Returns statistics about the buffer pool.
    pub fn stats(&self) -> BufferPoolStats {
        let core = self.core.lock();
        BufferPoolStats {
            fetches: self.fetch_count.load(Ordering::Relaxed),
            hits: self.hit_count.load(Ordering::Relaxed),
            misses: self.miss_count.load(Ordering::Relaxed),
            evictions: self.eviction_count.load(Ordering::Relaxed),
            flushes: self.flush_count.load(Ordering::Relaxed),
            pinned_frames: core.metas.iter().filter(|m| m.is_pinned()).count(),
            dirty_frames: core.metas.iter().filter(|m| m.is_dirty).count(),
        }
    }

    /// Returns the number of frames in the pool.
    pub fn pool_size(&self) -> usize {
        self.config.pool_size
    }

    /// Returns true if `page_id` is resident.
    pub fn contains(&self, page_id: PageId) -> bool {
        self.core.lock().page_table.contains_key(&page_id)
    }

    /// Returns the pin count of a resident page, or `None` if not resident.
    pub fn pin_count(&self, page_id: PageId) -> Option<u32> {
        let core = self.core.lock();
        core.page_table
            .get(&page_id)
            .map(|frame_id| core.metas[frame_id.index()].pin_count)
    }

    // -------------------------------------------------------------------------
    // Private helpers
    // -------------------------------------------------------------------------

    fn guard(&self, page_id: PageId, frame_id: FrameId) -> PageGuard<'_> {
        PageGuard::new(self, Arc::clone(&self.frames[frame_id.index()]), page_id)
    }

    /// Pops a reusable frame: free list first, then a replacer victim. A
    /// dirty victim is written back before its frame is handed out. The
    /// returned frame's metadata is reset and its page-table entry removed.
    fn take_frame(&self, core: &mut PoolCore) -> BufferResult<FrameId> {
        if let Some(frame_id) = core.free_list.pop_front() {
            return Ok(frame_id);
        }

        let frame_id = self.replacer.victim().ok_or(BufferError::NoFreeFrames)?;
        let (victim_page_id, dirty) = {
            let meta = &core.metas[frame_id.index()];
            debug_assert_eq!(meta.pin_count, 0, "replacer returned a pinned frame");
            (meta.page_id, meta.is_dirty)
        };

        if dirty {
            debug!(page_id = %victim_page_id, frame = frame_id.index(), "writing back dirty victim");
            if let Err(e) = self.write_frame(core, frame_id) {
                // Writeback failed: the victim stays resident, so hand it
                // back to the replacer before surfacing the error.
                self.replacer.unpin(frame_id);
                return Err(e);
            }
        }

        core.page_table.remove(&victim_page_id);
        core.metas[frame_id.index()].reset();
        self.eviction_count.fetch_add(1, Ordering::Relaxed);
        Ok(frame_id)
    }

    /// Writes one resident frame to disk, flushing the log first when the
    /// frame's LSN runs ahead of it. Callers hold the pool lock; the dirty
    /// flag is left for them.
    fn write_frame(&self, core: &PoolCore, frame_id: FrameId) -> BufferResult<()> {
        let meta = &core.metas[frame_id.index()];
        if meta.lsn > self.log.last_flushed_lsn() {
            self.log.flush_until(meta.lsn)?;
        }

        let data = self.frames[frame_id.index()].read_data();
        self.disk.write_page(meta.page_id, &data)?;
        self.flush_count.fetch_add(1, Ordering::Relaxed);
        Ok(())
    }

    /// Hands out the next page id of this instance's shard.
    fn allocate_page(&self, core: &mut PoolCore) -> PageId {
        let page_id = PageId::new(core.next_page_id);
        core.next_page_id += u64::from(self.config.num_instances);
        assert_eq!(
            page_id.shard_of(self.config.num_instances),
            self.config.instance_index,
            "allocated page id {page_id} outside this instance's shard"
        );
        page_id
    }

    pub(crate) fn record_lsn(&self, page_id: PageId, lsn: Lsn) {
        let mut core = self.core.lock();
        if let Some(&frame_id) = core.page_table.get(&page_id) {
            core.metas[frame_id.index()].lsn = lsn;
        }
    }
}

impl std::fmt::Debug for BufferPool {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let pages_cached = self.core.lock().page_table.len();
        f.debug_struct("BufferPool")
            .field("pool_size", &self.config.pool_size)
            .field("instance_index", &self.config.instance_index)
            .field("pages_cached", &pages_cached)
            .finish()
    }
}

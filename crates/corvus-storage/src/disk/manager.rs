//! Disk manager trait and the file-backed implementation.

use std::fs::{File, OpenOptions};
use std::io::ErrorKind;
use std::os::unix::fs::FileExt;
use std::path::{Path, PathBuf};

use corvus_common::{PageId, PAGE_SIZE};
use tracing::trace;

use super::error::{DiskError, DiskResult};

/// Blocking, page-granular I/O as consumed by the buffer pool.
///
/// Page ids are opaque here except for the offset arithmetic; allocation is
/// the pool's business. All methods take `&self` so a single manager can be
/// shared across pool instances.
pub trait DiskManager: Send + Sync {
    /// Reads one page into `buf`, which must be exactly `PAGE_SIZE` bytes.
    ///
    /// A page that was allocated but never written lies past the end of the
    /// file; the read succeeds and the buffer is zero-filled.
    fn read_page(&self, page_id: PageId, buf: &mut [u8]) -> DiskResult<()>;

    /// Writes one page from `data`, which must be exactly `PAGE_SIZE` bytes.
    fn write_page(&self, page_id: PageId, data: &[u8]) -> DiskResult<()>;

    /// Hook called when a page is deleted. Ids are never recycled, so this
    /// is bookkeeping only; implementations may reclaim space lazily.
    fn deallocate_page(&self, page_id: PageId) -> DiskResult<()>;

    /// Flushes file data to stable storage.
    fn sync(&self) -> DiskResult<()>;
}

/// Disk manager over a single data file, using positional reads and writes
/// so concurrent callers never fight over a shared cursor.
pub struct FileDiskManager {
    file: File,
    path: PathBuf,
}

impl FileDiskManager {
    /// Opens (or creates) the data file at `path`.
    pub fn open(path: impl AsRef<Path>) -> DiskResult<Self> {
        let path = path.as_ref();
        let file = OpenOptions::new()
            .read(true)
            .write(true)
            .create(true)
            .open(path)?;
        Ok(Self {
            file,
            path: path.to_path_buf(),
        })
    }

    /// Returns the data file path.
    pub fn path(&self) -> &Path {
        &self.path
    }

    fn check_len(len: usize) -> DiskResult<()> {
        if len != PAGE_SIZE {
            return Err(DiskError::BufferSize {
                len,
                expected: PAGE_SIZE,
            });
        }
        Ok(())
    }

    fn offset(page_id: PageId) -> u64 {
        page_id.as_u64() * PAGE_SIZE as u64
    }
}

impl DiskManager for FileDiskManager {
    fn read_page(&self, page_id: PageId, buf: &mut [u8]) -> DiskResult<()> {
        Self::check_len(buf.len())?;
        let offset = Self::offset(page_id);

        let mut read = 0;
        while read < buf.len() {
            match self.file.read_at(&mut buf[read..], offset + read as u64) {
                Ok(0) => break,
                Ok(n) => read += n,
                Err(e) if e.kind() == ErrorKind::Interrupted => continue,
                Err(e) => return Err(e.into()),
            }
        }
        if read < buf.len() {
            // The page lies (partly) past the end of the file: allocated but
            // never written. Hand back zeroes for the missing tail.
            trace!(%page_id, read, "short read past EOF, zero-filling");
            buf[read..].fill(0);
        }
        Ok(())
    }

    fn write_page(&self, page_id: PageId, data: &[u8]) -> DiskResult<()> {
        Self::check_len(data.len())?;
        self.file.write_all_at(data, Self::offset(page_id))?;
        Ok(())
    }

    fn deallocate_page(&self, page_id: PageId) -> DiskResult<()> {
        // Ids are never handed out twice, so the on-disk slot just goes
        // cold until an offline compaction reclaims it.
        trace!(%page_id, "deallocate page");
        Ok(())
    }

    fn sync(&self) -> DiskResult<()> {
        self.file.sync_data()?;
        Ok(())
    }
}

impl std::fmt::Debug for FileDiskManager {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FileDiskManager")
            .field("path", &self.path)
            .finish()
    }
}

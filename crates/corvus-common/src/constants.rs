//! System-wide constants for CorvusDB.

// =============================================================================
// Page and Memory Constants
// =============================================================================

/// Size of every disk page and every pool frame, in bytes (4 KB).
///
/// Fixed for the lifetime of a deployment: the disk manager computes on-disk
/// offsets as `page_id * PAGE_SIZE`, so changing it invalidates existing
/// data files.
pub const PAGE_SIZE: usize = 4 * 1024;

// =============================================================================
// Buffer Pool Constants
// =============================================================================

/// Default number of frames in a buffer pool instance (4 MB of pages).
pub const DEFAULT_POOL_SIZE: usize = 1024;

/// Smallest pool that still makes sense: one frame.
pub const MIN_POOL_SIZE: usize = 1;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_page_size() {
        assert!(PAGE_SIZE.is_power_of_two());
    }

    #[test]
    fn test_pool_sizes() {
        assert!(MIN_POOL_SIZE >= 1);
        assert!(DEFAULT_POOL_SIZE >= MIN_POOL_SIZE);
    }
}

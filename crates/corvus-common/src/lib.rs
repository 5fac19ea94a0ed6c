//! # corvus-common
//!
//! Shared types and constants for CorvusDB.
//!
//! This crate provides the foundational pieces used across the storage
//! engine:
//!
//! - **Types**: type-safe identifiers (`PageId`, `Lsn`)
//! - **Constants**: the page size and pool sizing defaults
//!
//! ## Example
//!
//! ```rust
//! use corvus_common::{PageId, PAGE_SIZE};
//!
//! let page_id = PageId::new(42);
//! assert!(page_id.is_valid());
//! assert_eq!(PAGE_SIZE, 4096);
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod constants;
pub mod types;

// Re-export commonly used items at the crate root
pub use constants::{DEFAULT_POOL_SIZE, PAGE_SIZE};
pub use types::{Lsn, PageId};

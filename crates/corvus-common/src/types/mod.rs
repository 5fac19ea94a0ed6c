//! Core type definitions.

mod ids;

pub use ids::{Lsn, PageId};

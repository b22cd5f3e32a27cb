//! Content store for research objects.
//!
//! Holds the bytes of internal resources, keyed by research object URI and
//! a path relative to it. The metadata describing those resources lives in
//! `rosr-graph`; the two stores are written one after the other and are not
//! updated atomically.
//!
//! # Storage Backends
//!
//! All backends implement the [`ContentStore`] trait:
//!
//! - [`InMemoryContentStore`] -- `HashMap`-based store for tests and embedding
//! - [`FsContentStore`] -- one directory per research object

pub mod error;
pub mod fs;
pub mod memory;
pub mod stats;
pub mod traits;

pub use error::{ContentError, ContentResult};
pub use fs::FsContentStore;
pub use memory::InMemoryContentStore;
pub use stats::PhysicalStats;
pub use traits::ContentStore;

//! Persistence collaborators and the facades built on top of them.
//!
//! The traits in this module describe what the facades need from the
//! underlying persistence layer: an [`EntityStore`] able to build and load
//! entities, a [`TypeRegistry`] resolving module names, and the
//! [`Relationship`] capability owned by each [`Entity`].
//!
//! [`MemoryRepository`] implements all of them in memory.

mod error;
pub use error::*;

mod traits;
pub use traits::*;

mod memory;
pub use memory::*;

mod facades;
pub use facades::*;

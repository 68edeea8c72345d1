//! # storage-adapters
//!
//! In-memory implementations of the `domains` persistence and collaborator
//! ports. They honour the same optimistic versioning contract a document
//! store would, which makes them suitable both for tests and for running
//! the board without external services.

pub mod counter;
pub mod memory;
pub mod search;

pub use counter::{MemoryCategories, MemorySequenceCounter};
pub use memory::{MemoryCommentRepository, MemoryGalleryRepository, MemoryPostRepository};
pub use search::TracingSearchIndex;

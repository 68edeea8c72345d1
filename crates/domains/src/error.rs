//! # BoardError
//!
//! Centralized error handling for the board core.
//! Domain rejections are terminal and handed to the caller untouched;
//! persistence and collaborator failures are folded into `Store` /
//! `Infrastructure` so callers can tell the two apart.

use thiserror::Error;

/// Primary error type for all lifecycle operations.
#[derive(Error, Debug)]
pub enum BoardError {
    #[error("post not found: {0}")]
    NotFoundPost(String),

    #[error("comment not found: {0}")]
    NotFoundComment(String),

    #[error("category not found: {0}")]
    NotFoundCategory(String),

    /// Actor is not the owning writer
    #[error("forbidden: user {0} does not own this resource")]
    Forbidden(String),

    #[error("writers cannot express feelings on their own content")]
    SelfFeeling,

    #[error("user {0} has already expressed a feeling")]
    DuplicateFeeling(String),

    #[error("notice is already enabled")]
    NoticeAlreadyEnabled,

    #[error("notice is already disabled")]
    NoticeAlreadyDisabled,

    /// Persistence failure (including exhausted write conflicts)
    #[error(transparent)]
    Store(#[from] StoreError),

    /// Other collaborator failure (sequence counter, category lookup)
    #[error("infrastructure failure: {0}")]
    Infrastructure(#[source] anyhow::Error),
}

impl BoardError {
    pub fn is_conflict(&self) -> bool {
        matches!(self, BoardError::Store(StoreError::Conflict { .. }))
    }
}

/// Failures reported by repository implementations.
#[derive(Error, Debug)]
pub enum StoreError {
    /// The stored version moved on (or the document vanished) since it was read.
    #[error("write conflict on {entity} {id}")]
    Conflict { entity: &'static str, id: String },

    #[error("duplicate {entity} {key}")]
    Duplicate { entity: &'static str, key: String },

    #[error("store backend error: {0}")]
    Backend(#[from] anyhow::Error),
}

/// Why [`crate::Feelings::register`] refused an entry.
#[derive(Error, Debug, Clone, Copy, PartialEq, Eq)]
pub enum FeelingRejection {
    #[error("actor owns the target")]
    OwnContent,
    #[error("actor already expressed a feeling")]
    AlreadyExpressed,
}

/// A specialized Result type for board logic.
pub type Result<T> = std::result::Result<T, BoardError>;

pub type StoreResult<T> = std::result::Result<T, StoreError>;

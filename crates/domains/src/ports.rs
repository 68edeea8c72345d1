//! # Ports
//!
//! Contracts the core consumes. Storage, the sequence counter, category
//! lookup and the search index are all supplied from outside; any adapter
//! must implement these traits to be wired into the services.

use std::collections::HashMap;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::error::StoreResult;
use crate::models::{
    BoardItem, CategoryFilter, Comment, Gallery, Page, Post, PostRanking, PostSummary, Writer,
};

#[cfg(feature = "testing")]
use mockall::automock;

/// Persistence contract for posts.
///
/// `update` and `delete` compare `version` against the stored document and
/// fail with [`crate::StoreError::Conflict`] when it moved on.
#[cfg_attr(feature = "testing", automock)]
#[async_trait]
pub trait PostRepository: Send + Sync {
    async fn find_by_id(&self, id: Uuid) -> StoreResult<Option<Post>>;
    async fn find_by_seq(&self, seq: i64) -> StoreResult<Option<Post>>;
    async fn insert(&self, post: &Post) -> StoreResult<()>;
    async fn update(&self, post: &Post) -> StoreResult<()>;
    async fn delete(&self, post: &Post) -> StoreResult<()>;
    async fn increment_views(&self, id: Uuid) -> StoreResult<()>;

    /// Newest seq first.
    async fn list(&self, filter: &CategoryFilter, page: u32, size: u32) -> StoreResult<Page<Post>>;
    async fn find_notices(&self) -> StoreResult<Vec<Post>>;
    async fn find_latest(&self, limit: usize) -> StoreResult<Vec<Post>>;

    /// Posts created at or after `since`, most liked first.
    async fn top_liked_since(
        &self,
        since: DateTime<Utc>,
        limit: usize,
    ) -> StoreResult<Vec<PostRanking>>;
    async fn find_summaries(&self, ids: &[Uuid]) -> StoreResult<Vec<PostSummary>>;
    /// Live posts of one writer older than `before` (when given), newest first.
    async fn find_by_writer(
        &self,
        user_id: &str,
        before: Option<Uuid>,
        limit: usize,
    ) -> StoreResult<Vec<PostSummary>>;
}

/// Persistence contract for comments.
#[cfg_attr(feature = "testing", automock)]
#[async_trait]
pub trait CommentRepository: Send + Sync {
    async fn find_by_id(&self, id: Uuid) -> StoreResult<Option<Comment>>;
    async fn insert(&self, comment: &Comment) -> StoreResult<()>;
    async fn update(&self, comment: &Comment) -> StoreResult<()>;
    async fn delete(&self, comment: &Comment) -> StoreResult<()>;

    async fn count_by_post(&self, post_id: Uuid) -> StoreResult<u64>;
    async fn count_by_posts(&self, post_ids: &[Uuid]) -> StoreResult<HashMap<Uuid, u64>>;
    /// Comment counts per post for comments created at or after `since`.
    async fn count_since(&self, since: DateTime<Utc>) -> StoreResult<HashMap<Uuid, u64>>;

    /// Comments of one post in creation order, optionally only those after `after`.
    async fn list_by_post(&self, post_seq: i64, after: Option<Uuid>) -> StoreResult<Vec<Comment>>;
    /// Newest first.
    async fn list(&self, page: u32, size: u32) -> StoreResult<Page<Comment>>;
}

/// Persistence contract for galleries.
#[cfg_attr(feature = "testing", automock)]
#[async_trait]
pub trait GalleryRepository: Send + Sync {
    async fn find_by_id(&self, id: Uuid) -> StoreResult<Option<Gallery>>;
    async fn find_by_ids(&self, ids: &[Uuid]) -> StoreResult<Vec<Gallery>>;
    async fn insert(&self, gallery: &Gallery) -> StoreResult<()>;
    async fn update(&self, gallery: &Gallery) -> StoreResult<()>;
}

/// Monotonic counter; a value is never handed out twice.
#[cfg_attr(feature = "testing", automock)]
#[async_trait]
pub trait SequenceCounter: Send + Sync {
    async fn next(&self, counter_name: &str) -> anyhow::Result<i64>;
}

#[cfg_attr(feature = "testing", automock)]
#[async_trait]
pub trait CategoryValidator: Send + Sync {
    async fn exists(&self, code: &str) -> anyhow::Result<bool>;
}

/// Search-index payload for a post.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PostDocument {
    pub id: Uuid,
    pub seq: i64,
    pub writer: Option<Writer>,
    pub subject: String,
    pub content: String,
    pub category: String,
}

impl From<&Post> for PostDocument {
    fn from(post: &Post) -> Self {
        Self {
            id: post.id,
            seq: post.seq,
            writer: post.writer.clone(),
            subject: post.subject.clone(),
            content: post.content.clone(),
            category: post.category.clone(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CommentDocument {
    pub id: Uuid,
    pub board_item: BoardItem,
    pub writer: Writer,
    pub content: String,
}

impl From<&Comment> for CommentDocument {
    fn from(comment: &Comment) -> Self {
        Self {
            id: comment.id,
            board_item: comment.board_item(),
            writer: comment.writer.clone(),
            content: comment.content.clone(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GalleryDocument {
    pub id: Uuid,
    pub writer: Option<Writer>,
    pub name: String,
}

impl From<&Gallery> for GalleryDocument {
    fn from(gallery: &Gallery) -> Self {
        Self {
            id: gallery.id,
            writer: gallery.writer.clone(),
            name: gallery.name.clone(),
        }
    }
}

/// Best-effort search index connector.
#[cfg_attr(feature = "testing", automock)]
#[async_trait]
pub trait SearchIndexGateway: Send + Sync {
    async fn index_post(&self, doc: PostDocument) -> anyhow::Result<()>;
    async fn index_comment(&self, doc: CommentDocument) -> anyhow::Result<()>;
    async fn index_gallery(&self, doc: GalleryDocument) -> anyhow::Result<()>;
    async fn delete_post(&self, id: Uuid) -> anyhow::Result<()>;
    async fn delete_comment(&self, id: Uuid) -> anyhow::Result<()>;
}

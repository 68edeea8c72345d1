//! In-memory repositories backed by `DashMap`.
//!
//! Versioned writes are checked and applied while holding the shard lock of
//! the entry, so a stale `version` can never overwrite a newer document.

use std::cmp::Reverse;
use std::collections::HashMap;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use dashmap::mapref::entry::Entry;
use dashmap::DashMap;
use domains::{
    CategoryFilter, Comment, CommentRepository, Gallery, GalleryRepository, Page, Post,
    PostRanking, PostRepository, PostSummary, StoreError, StoreResult,
};
use uuid::Uuid;

fn conflict(entity: &'static str, id: Uuid) -> StoreError {
    StoreError::Conflict {
        entity,
        id: id.to_string(),
    }
}

fn paginate<T>(mut items: Vec<T>, page: u32, size: u32) -> Page<T> {
    let total = items.len() as u64;
    let offset = Page::<T>::offset(page, size).min(items.len());
    let items = items
        .drain(offset..)
        .take(size as usize)
        .collect::<Vec<_>>();
    Page {
        items,
        page: page.max(1),
        size,
        total,
    }
}

#[derive(Default)]
pub struct MemoryPostRepository {
    posts: DashMap<Uuid, Post>,
    seq_index: DashMap<i64, Uuid>,
}

impl MemoryPostRepository {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.posts.len()
    }

    pub fn is_empty(&self) -> bool {
        self.posts.is_empty()
    }

    fn snapshot(&self) -> Vec<Post> {
        self.posts.iter().map(|entry| entry.value().clone()).collect()
    }
}

#[async_trait]
impl PostRepository for MemoryPostRepository {
    async fn find_by_id(&self, id: Uuid) -> StoreResult<Option<Post>> {
        Ok(self.posts.get(&id).map(|entry| entry.value().clone()))
    }

    async fn find_by_seq(&self, seq: i64) -> StoreResult<Option<Post>> {
        let Some(id) = self.seq_index.get(&seq).map(|entry| *entry.value()) else {
            return Ok(None);
        };
        self.find_by_id(id).await
    }

    async fn insert(&self, post: &Post) -> StoreResult<()> {
        match self.seq_index.entry(post.seq) {
            Entry::Occupied(_) => {
                return Err(StoreError::Duplicate {
                    entity: "post seq",
                    key: post.seq.to_string(),
                })
            }
            Entry::Vacant(slot) => {
                slot.insert(post.id);
            }
        }
        self.posts.insert(post.id, post.clone());
        Ok(())
    }

    async fn update(&self, post: &Post) -> StoreResult<()> {
        let mut stored = self
            .posts
            .get_mut(&post.id)
            .ok_or_else(|| conflict("post", post.id))?;
        if stored.version != post.version {
            return Err(conflict("post", post.id));
        }
        let mut next = post.clone();
        next.version += 1;
        *stored = next;
        Ok(())
    }

    async fn delete(&self, post: &Post) -> StoreResult<()> {
        let removed = self
            .posts
            .remove_if(&post.id, |_, stored| stored.version == post.version);
        match removed {
            Some((_, gone)) => {
                self.seq_index.remove(&gone.seq);
                Ok(())
            }
            None => Err(conflict("post", post.id)),
        }
    }

    async fn increment_views(&self, id: Uuid) -> StoreResult<()> {
        if let Some(mut stored) = self.posts.get_mut(&id) {
            stored.views += 1;
            stored.version += 1;
        }
        Ok(())
    }

    async fn list(&self, filter: &CategoryFilter, page: u32, size: u32) -> StoreResult<Page<Post>> {
        let mut posts: Vec<Post> = self
            .snapshot()
            .into_iter()
            .filter(|p| filter.matches(&p.category))
            .collect();
        posts.sort_by_key(|p| Reverse(p.seq));
        Ok(paginate(posts, page, size))
    }

    async fn find_notices(&self) -> StoreResult<Vec<Post>> {
        let mut posts: Vec<Post> = self
            .snapshot()
            .into_iter()
            .filter(|p| p.status.notice.is_enabled())
            .collect();
        posts.sort_by_key(|p| Reverse(p.seq));
        Ok(posts)
    }

    async fn find_latest(&self, limit: usize) -> StoreResult<Vec<Post>> {
        let mut posts: Vec<Post> = self
            .snapshot()
            .into_iter()
            .filter(|p| !p.status.deleted)
            .collect();
        posts.sort_by_key(|p| Reverse(p.seq));
        posts.truncate(limit);
        Ok(posts)
    }

    async fn top_liked_since(
        &self,
        since: DateTime<Utc>,
        limit: usize,
    ) -> StoreResult<Vec<PostRanking>> {
        let mut ranked: Vec<PostRanking> = self
            .posts
            .iter()
            .filter(|entry| {
                let p = entry.value();
                p.created_at >= since && !p.status.deleted && p.feelings.like_count() > 0
            })
            .map(|entry| {
                let p = entry.value();
                PostRanking {
                    id: p.id,
                    seq: p.seq,
                    subject: p.subject.clone(),
                    views: p.views,
                    count: p.feelings.like_count() as u64,
                }
            })
            .collect();
        ranked.sort_by_key(|r| (Reverse(r.count), Reverse(r.views)));
        ranked.truncate(limit);
        Ok(ranked)
    }

    /// Skips unknown ids and redacted posts.
    async fn find_summaries(&self, ids: &[Uuid]) -> StoreResult<Vec<PostSummary>> {
        Ok(ids
            .iter()
            .filter_map(|id| self.posts.get(id))
            .filter(|entry| !entry.status.deleted)
            .map(|entry| PostSummary {
                id: entry.id,
                seq: entry.seq,
                subject: entry.subject.clone(),
                views: entry.views,
            })
            .collect())
    }

    async fn find_by_writer(
        &self,
        user_id: &str,
        before: Option<Uuid>,
        limit: usize,
    ) -> StoreResult<Vec<PostSummary>> {
        let mut posts: Vec<Post> = self
            .snapshot()
            .into_iter()
            .filter(|p| !p.status.deleted && p.is_written_by(user_id))
            .filter(|p| before.map_or(true, |before| p.id < before))
            .collect();
        posts.sort_by_key(|p| Reverse(p.seq));
        Ok(posts
            .into_iter()
            .take(limit)
            .map(|p| PostSummary {
                id: p.id,
                seq: p.seq,
                subject: p.subject,
                views: p.views,
            })
            .collect())
    }
}

#[derive(Default)]
pub struct MemoryCommentRepository {
    comments: DashMap<Uuid, Comment>,
}

impl MemoryCommentRepository {
    pub fn new() -> Self {
        Self::default()
    }

    fn snapshot(&self) -> Vec<Comment> {
        self.comments
            .iter()
            .map(|entry| entry.value().clone())
            .collect()
    }
}

#[async_trait]
impl CommentRepository for MemoryCommentRepository {
    async fn find_by_id(&self, id: Uuid) -> StoreResult<Option<Comment>> {
        Ok(self.comments.get(&id).map(|entry| entry.value().clone()))
    }

    async fn insert(&self, comment: &Comment) -> StoreResult<()> {
        match self.comments.entry(comment.id) {
            Entry::Occupied(_) => Err(StoreError::Duplicate {
                entity: "comment",
                key: comment.id.to_string(),
            }),
            Entry::Vacant(slot) => {
                slot.insert(comment.clone());
                Ok(())
            }
        }
    }

    async fn update(&self, comment: &Comment) -> StoreResult<()> {
        let mut stored = self
            .comments
            .get_mut(&comment.id)
            .ok_or_else(|| conflict("comment", comment.id))?;
        if stored.version != comment.version {
            return Err(conflict("comment", comment.id));
        }
        let mut next = comment.clone();
        next.version += 1;
        *stored = next;
        Ok(())
    }

    async fn delete(&self, comment: &Comment) -> StoreResult<()> {
        self.comments
            .remove_if(&comment.id, |_, stored| stored.version == comment.version)
            .map(|_| ())
            .ok_or_else(|| conflict("comment", comment.id))
    }

    async fn count_by_post(&self, post_id: Uuid) -> StoreResult<u64> {
        Ok(self
            .comments
            .iter()
            .filter(|entry| entry.board_item().post_id == post_id)
            .count() as u64)
    }

    async fn count_by_posts(&self, post_ids: &[Uuid]) -> StoreResult<HashMap<Uuid, u64>> {
        let mut counts = HashMap::new();
        for entry in self.comments.iter() {
            let post_id = entry.board_item().post_id;
            if post_ids.contains(&post_id) {
                *counts.entry(post_id).or_insert(0) += 1;
            }
        }
        Ok(counts)
    }

    async fn count_since(&self, since: DateTime<Utc>) -> StoreResult<HashMap<Uuid, u64>> {
        let mut counts = HashMap::new();
        for entry in self.comments.iter().filter(|entry| entry.created_at >= since) {
            *counts.entry(entry.board_item().post_id).or_insert(0) += 1;
        }
        Ok(counts)
    }

    async fn list_by_post(&self, post_seq: i64, after: Option<Uuid>) -> StoreResult<Vec<Comment>> {
        let mut comments: Vec<Comment> = self
            .snapshot()
            .into_iter()
            .filter(|c| c.board_item().post_seq == post_seq)
            .filter(|c| after.map_or(true, |after| c.id > after))
            .collect();
        comments.sort_by_key(|c| (c.created_at, c.id));
        Ok(comments)
    }

    async fn list(&self, page: u32, size: u32) -> StoreResult<Page<Comment>> {
        let mut comments = self.snapshot();
        comments.sort_by_key(|c| Reverse((c.created_at, c.id)));
        Ok(paginate(comments, page, size))
    }
}

#[derive(Default)]
pub struct MemoryGalleryRepository {
    galleries: DashMap<Uuid, Gallery>,
}

impl MemoryGalleryRepository {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl GalleryRepository for MemoryGalleryRepository {
    async fn find_by_id(&self, id: Uuid) -> StoreResult<Option<Gallery>> {
        Ok(self.galleries.get(&id).map(|entry| entry.value().clone()))
    }

    async fn find_by_ids(&self, ids: &[Uuid]) -> StoreResult<Vec<Gallery>> {
        Ok(ids
            .iter()
            .filter_map(|id| self.galleries.get(id).map(|entry| entry.value().clone()))
            .collect())
    }

    async fn insert(&self, gallery: &Gallery) -> StoreResult<()> {
        match self.galleries.entry(gallery.id) {
            Entry::Occupied(_) => Err(StoreError::Duplicate {
                entity: "gallery",
                key: gallery.id.to_string(),
            }),
            Entry::Vacant(slot) => {
                slot.insert(gallery.clone());
                Ok(())
            }
        }
    }

    async fn update(&self, gallery: &Gallery) -> StoreResult<()> {
        let mut stored = self
            .galleries
            .get_mut(&gallery.id)
            .ok_or_else(|| conflict("gallery", gallery.id))?;
        if stored.version != gallery.version {
            return Err(conflict("gallery", gallery.id));
        }
        let mut next = gallery.clone();
        next.version += 1;
        *stored = next;
        Ok(())
    }
}

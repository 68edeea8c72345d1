//! # Post lifecycle
//!
//! Create, edit and delete of free-board posts plus the read paths the
//! board pages need. Ownership is checked against the writer the caller
//! hands in; nothing is looked up from an ambient session.

use std::collections::HashMap;
use std::sync::Arc;

use domains::{
    BoardError, BoardPolicy, CategoryFilter, CategoryValidator, CommentRepository, DeleteKind,
    Device, GalleryRef, GalleryRepository, HistoryKind, NewPost, Page, Post, PostDetail,
    PostRepository, PostSummary, Result, SequenceCounter, Writer,
};
use tracing::{info, instrument, warn};
use uuid::Uuid;

use crate::content::short_content;
use crate::gallery::GalleryLinker;
use crate::retry::retry_on_conflict;
use crate::search::{SearchDispatcher, SearchJob};

/// User-supplied fields of a post, shared by create and edit.
#[derive(Debug, Clone)]
pub struct PostDraft {
    pub subject: String,
    pub content: String,
    pub category: String,
    pub galleries: Vec<GalleryRef>,
    pub device: Device,
}

#[derive(Clone)]
pub struct PostService {
    posts: Arc<dyn PostRepository>,
    comments: Arc<dyn CommentRepository>,
    galleries: Arc<dyn GalleryRepository>,
    counter: Arc<dyn SequenceCounter>,
    categories: Arc<dyn CategoryValidator>,
    linker: GalleryLinker,
    search: SearchDispatcher,
    policy: Arc<BoardPolicy>,
}

impl PostService {
    #[allow(clippy::too_many_arguments)]
    pub fn new(
        posts: Arc<dyn PostRepository>,
        comments: Arc<dyn CommentRepository>,
        galleries: Arc<dyn GalleryRepository>,
        counter: Arc<dyn SequenceCounter>,
        categories: Arc<dyn CategoryValidator>,
        linker: GalleryLinker,
        search: SearchDispatcher,
        policy: Arc<BoardPolicy>,
    ) -> Self {
        Self {
            posts,
            comments,
            galleries,
            counter,
            categories,
            linker,
            search,
            policy,
        }
    }

    /// Writes a new post and returns its seq.
    #[instrument(skip(self, writer, draft), fields(user_id = %writer.user_id, category = %draft.category))]
    pub async fn create(&self, writer: &Writer, draft: PostDraft) -> Result<i64> {
        self.ensure_category(&draft.category).await?;

        let short = short_content(&draft.content, self.policy.short_content_length);
        let seq = self
            .counter
            .next(&self.policy.sequence_name)
            .await
            .map_err(BoardError::Infrastructure)?;

        let post = Post::new(
            seq,
            NewPost {
                writer: writer.clone(),
                subject: draft.subject,
                content: draft.content,
                short_content: short,
                category: draft.category,
                galleries: draft.galleries.iter().map(|g| g.id).collect(),
                device: draft.device,
            },
        );
        self.posts.insert(&post).await?;
        self.search.submit(SearchJob::IndexPost((&post).into()));

        // the post is stored; a failed link must not invite a duplicate retry
        if !draft.galleries.is_empty() {
            if let Err(err) = self
                .linker
                .link(post.board_item(), &post.subject, &draft.galleries)
                .await
            {
                warn!(seq, error = %err, "gallery linking failed for new post");
            }
        }

        info!(seq, subject = %post.subject, "new post created");
        Ok(seq)
    }

    /// Rewrites subject, content, category and gallery links of an owned post.
    #[instrument(skip(self, writer, draft), fields(user_id = %writer.user_id))]
    pub async fn edit(&self, writer: &Writer, seq: i64, draft: PostDraft) -> Result<i64> {
        let short = short_content(&draft.content, self.policy.short_content_length);
        let draft = &draft;
        let short = short.as_str();

        let post = retry_on_conflict(self.policy.conflict_retry_limit, "post.edit", move || async move {
            let mut post = self.load_owned(writer, seq).await?;

            post.subject = draft.subject.clone();
            post.content = draft.content.clone();
            post.short_content = short.to_owned();
            post.category = draft.category.clone();
            if !draft.galleries.is_empty() {
                post.galleries = draft.galleries.iter().map(|g| g.id).collect();
            }
            post.status.device = draft.device;
            post.record(HistoryKind::Edit, writer);

            self.posts.update(&post).await?;
            Ok::<_, BoardError>(post)
        })
        .await?;
        self.search.submit(SearchJob::IndexPost((&post).into()));

        if !draft.galleries.is_empty() {
            self.linker
                .link(post.board_item(), &post.subject, &draft.galleries)
                .await?;
        }

        info!(seq, subject = %post.subject, "post was edited");
        Ok(seq)
    }

    /// Deletes an owned post.
    ///
    /// Posts that still have comments are redacted and kept so comment
    /// counts stay intact; otherwise the document is removed.
    #[instrument(skip(self, writer), fields(user_id = %writer.user_id))]
    pub async fn delete(&self, writer: &Writer, seq: i64) -> Result<DeleteKind> {
        let (post, kind) = retry_on_conflict(self.policy.conflict_retry_limit, "post.delete", move || async move {
            let mut post = self.load_owned(writer, seq).await?;
            let comments = self.comments.count_by_post(post.id).await?;

            if comments > 0 {
                post.redact();
                post.record(HistoryKind::Delete, writer);
                self.posts.update(&post).await?;
                Ok::<_, BoardError>((post, DeleteKind::Content))
            } else {
                self.posts.delete(&post).await?;
                Ok((post, DeleteKind::All))
            }
        })
        .await?;

        self.search.submit(SearchJob::DeletePost(post.id));

        info!(seq, ?kind, "post was deleted");
        Ok(kind)
    }

    /// Loads a post with its galleries, optionally counting the view.
    #[instrument(skip(self))]
    pub async fn get(&self, seq: i64, count_view: bool) -> Result<PostDetail> {
        let mut post = self.load(seq).await?;
        if count_view {
            self.posts.increment_views(post.id).await?;
            post.views += 1;
        }

        let galleries = if post.galleries.is_empty() {
            Vec::new()
        } else {
            self.galleries.find_by_ids(&post.galleries).await?
        };
        Ok(PostDetail { post, galleries })
    }

    pub async fn find_by_seq(&self, seq: i64) -> Result<Post> {
        self.load(seq).await
    }

    pub async fn list(&self, filter: &CategoryFilter, page: u32, size: u32) -> Result<Page<Post>> {
        Ok(self.posts.list(filter, page, size).await?)
    }

    /// Pinned posts, newest first.
    pub async fn notices(&self) -> Result<Vec<Post>> {
        Ok(self.posts.find_notices().await?)
    }

    pub async fn latest(&self) -> Result<Vec<Post>> {
        Ok(self.posts.find_latest(self.policy.latest_limit).await?)
    }

    /// A writer's other posts, newest first, continuing below `before`.
    pub async fn list_by_writer(
        &self,
        user_id: &str,
        before: Option<Uuid>,
        limit: usize,
    ) -> Result<Vec<PostSummary>> {
        Ok(self.posts.find_by_writer(user_id, before, limit).await?)
    }

    /// Projections for search hits, keyed by post id. Unknown and redacted
    /// posts are left out.
    pub async fn summaries_by_ids(&self, ids: &[Uuid]) -> Result<HashMap<Uuid, PostSummary>> {
        let summaries = self.posts.find_summaries(ids).await?;
        Ok(summaries.into_iter().map(|s| (s.id, s)).collect())
    }

    async fn ensure_category(&self, code: &str) -> Result<()> {
        let exists = self
            .categories
            .exists(code)
            .await
            .map_err(BoardError::Infrastructure)?;
        if exists {
            Ok(())
        } else {
            Err(BoardError::NotFoundCategory(code.to_owned()))
        }
    }

    async fn load(&self, seq: i64) -> Result<Post> {
        self.posts
            .find_by_seq(seq)
            .await?
            .ok_or_else(|| BoardError::NotFoundPost(seq.to_string()))
    }

    async fn load_owned(&self, writer: &Writer, seq: i64) -> Result<Post> {
        let post = self.load(seq).await?;
        if !post.is_written_by(&writer.user_id) {
            return Err(BoardError::Forbidden(writer.user_id.clone()));
        }
        Ok(post)
    }
}

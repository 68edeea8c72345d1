//! # Comment lifecycle
//!
//! Comments hang off a post by `BoardItem`. They keep no history and are
//! always removed outright on delete.

use std::collections::HashMap;
use std::sync::Arc;

use domains::{
    BoardError, Comment, CommentRepository, Device, Page, Post, PostRepository, Result, Writer,
};
use tracing::{info, instrument, warn};
use uuid::Uuid;

use crate::retry::retry_on_conflict;
use crate::search::{SearchDispatcher, SearchJob};

#[derive(Clone)]
pub struct CommentService {
    posts: Arc<dyn PostRepository>,
    comments: Arc<dyn CommentRepository>,
    search: SearchDispatcher,
    retry_limit: u32,
}

impl CommentService {
    pub fn new(
        posts: Arc<dyn PostRepository>,
        comments: Arc<dyn CommentRepository>,
        search: SearchDispatcher,
        retry_limit: u32,
    ) -> Self {
        Self {
            posts,
            comments,
            search,
            retry_limit,
        }
    }

    /// Adds a comment to a post.
    ///
    /// After the insert the post's version is bumped, so a hard delete that
    /// counted comments before this one lands fails its versioned write and
    /// recounts. If the post vanished in between, the comment is removed again.
    #[instrument(skip(self, writer, content), fields(user_id = %writer.user_id))]
    pub async fn create(
        &self,
        writer: &Writer,
        post_seq: i64,
        content: &str,
        device: Device,
    ) -> Result<Comment> {
        let post = self.load_post(post_seq).await?;
        let post_id = post.id;

        let comment = Comment::new(post.board_item(), writer.clone(), content.to_owned(), device);
        self.comments.insert(&comment).await?;

        let touched = retry_on_conflict(self.retry_limit, "comment.create", move || async move {
            let Some(post) = self.posts.find_by_id(post_id).await? else {
                return Ok(false);
            };
            self.posts.update(&post).await?;
            Ok::<_, BoardError>(true)
        })
        .await;

        match touched {
            Ok(true) => {}
            Ok(false) => {
                self.discard(&comment).await;
                return Err(BoardError::NotFoundPost(post_seq.to_string()));
            }
            Err(err) => {
                self.discard(&comment).await;
                return Err(err);
            }
        }
        self.search.submit(SearchJob::IndexComment((&comment).into()));

        info!(post_seq, comment_id = %comment.id, "new comment created");
        Ok(comment)
    }

    /// Rewrites an owned comment. The post must still exist.
    #[instrument(skip(self, writer, content), fields(user_id = %writer.user_id))]
    pub async fn edit(
        &self,
        writer: &Writer,
        post_seq: i64,
        comment_id: Uuid,
        content: &str,
        device: Device,
    ) -> Result<Comment> {
        self.load_post(post_seq).await?;

        let comment = retry_on_conflict(self.retry_limit, "comment.edit", move || async move {
            let mut comment = self.load_owned(writer, comment_id).await?;
            comment.writer = writer.clone();
            comment.content = content.trim().to_owned();
            comment.status.device = device;
            self.comments.update(&comment).await?;
            Ok::<_, BoardError>(comment)
        })
        .await?;
        self.search.submit(SearchJob::IndexComment((&comment).into()));

        info!(post_seq, %comment_id, "comment was edited");
        Ok(comment)
    }

    #[instrument(skip(self, writer), fields(user_id = %writer.user_id))]
    pub async fn delete(&self, writer: &Writer, comment_id: Uuid) -> Result<()> {
        retry_on_conflict(self.retry_limit, "comment.delete", move || async move {
            let comment = self.load_owned(writer, comment_id).await?;
            self.comments.delete(&comment).await?;
            Ok::<_, BoardError>(())
        })
        .await?;
        self.search.submit(SearchJob::DeleteComment(comment_id));

        info!(%comment_id, "comment was deleted");
        Ok(())
    }

    pub async fn find_by_id(&self, comment_id: Uuid) -> Result<Comment> {
        self.comments
            .find_by_id(comment_id)
            .await?
            .ok_or_else(|| BoardError::NotFoundComment(comment_id.to_string()))
    }

    /// Comments of a post in creation order; `after` resumes past a known comment.
    pub async fn list_for_post(&self, post_seq: i64, after: Option<Uuid>) -> Result<Vec<Comment>> {
        Ok(self.comments.list_by_post(post_seq, after).await?)
    }

    pub async fn count_for_posts(&self, post_ids: &[Uuid]) -> Result<HashMap<Uuid, u64>> {
        Ok(self.comments.count_by_posts(post_ids).await?)
    }

    pub async fn list(&self, page: u32, size: u32) -> Result<Page<Comment>> {
        Ok(self.comments.list(page, size).await?)
    }

    async fn load_post(&self, seq: i64) -> Result<Post> {
        self.posts
            .find_by_seq(seq)
            .await?
            .ok_or_else(|| BoardError::NotFoundPost(seq.to_string()))
    }

    async fn discard(&self, comment: &Comment) {
        if let Err(err) = self.comments.delete(comment).await {
            warn!(comment_id = %comment.id, error = %err, "failed to remove comment of a vanished post");
        }
    }

    async fn load_owned(&self, writer: &Writer, comment_id: Uuid) -> Result<Comment> {
        let comment = self.find_by_id(comment_id).await?;
        if comment.writer.user_id != writer.user_id {
            return Err(BoardError::Forbidden(writer.user_id.clone()));
        }
        Ok(comment)
    }
}

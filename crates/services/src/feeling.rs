//! Like/dislike registration on posts and comments.

use std::sync::Arc;

use domains::{
    BoardError, Comment, CommentRepository, FeelingKind, FeelingRejection, FeelingTarget, Post,
    PostRepository, Result, Writer,
};
use tracing::{info, instrument};
use uuid::Uuid;

use crate::retry::retry_on_conflict;

/// Records feelings. There is no way to change or withdraw one.
#[derive(Clone)]
pub struct FeelingRegistry {
    posts: Arc<dyn PostRepository>,
    comments: Arc<dyn CommentRepository>,
    retry_limit: u32,
}

impl FeelingRegistry {
    pub fn new(
        posts: Arc<dyn PostRepository>,
        comments: Arc<dyn CommentRepository>,
        retry_limit: u32,
    ) -> Self {
        Self {
            posts,
            comments,
            retry_limit,
        }
    }

    #[instrument(skip(self, actor), fields(user_id = %actor.user_id))]
    pub async fn set_post_feeling(&self, seq: i64, actor: &Writer, kind: FeelingKind) -> Result<Post> {
        let post = retry_on_conflict(self.retry_limit, "post.feeling", move || async move {
            let mut post = self
                .posts
                .find_by_seq(seq)
                .await?
                .filter(|p| !p.status.deleted)
                .ok_or_else(|| BoardError::NotFoundPost(seq.to_string()))?;
            apply(&mut post, actor, kind)?;
            self.posts.update(&post).await?;
            Ok::<_, BoardError>(post)
        })
        .await?;

        info!(seq, ?kind, likes = post.feelings.like_count(), "feeling registered on post");
        Ok(post)
    }

    #[instrument(skip(self, actor), fields(user_id = %actor.user_id))]
    pub async fn set_comment_feeling(
        &self,
        comment_id: Uuid,
        actor: &Writer,
        kind: FeelingKind,
    ) -> Result<Comment> {
        let comment = retry_on_conflict(self.retry_limit, "comment.feeling", move || async move {
            let mut comment = self
                .comments
                .find_by_id(comment_id)
                .await?
                .ok_or_else(|| BoardError::NotFoundComment(comment_id.to_string()))?;
            apply(&mut comment, actor, kind)?;
            self.comments.update(&comment).await?;
            Ok::<_, BoardError>(comment)
        })
        .await?;

        info!(%comment_id, ?kind, likes = comment.feelings.like_count(), "feeling registered on comment");
        Ok(comment)
    }
}

fn apply<T: FeelingTarget>(target: &mut T, actor: &Writer, kind: FeelingKind) -> Result<()> {
    let owner = target.owner_id().map(str::to_owned);
    target
        .feelings_mut()
        .register(owner.as_deref(), actor, kind)
        .map(|_| ())
        .map_err(|rejection| match rejection {
            FeelingRejection::OwnContent => BoardError::SelfFeeling,
            FeelingRejection::AlreadyExpressed => BoardError::DuplicateFeeling(actor.user_id.clone()),
        })
}

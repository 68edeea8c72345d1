//! Weekly top-liked and top-commented posts.

use std::cmp::Reverse;
use std::sync::Arc;

use chrono::{DateTime, Duration, Utc};
use domains::{
    CommentRepository, PostRanking, PostRepository, Result, MAX_RANKING_WINDOW_DAYS,
};
use tracing::{debug, instrument};
use uuid::Uuid;

#[derive(Clone)]
pub struct TopRanking {
    posts: Arc<dyn PostRepository>,
    comments: Arc<dyn CommentRepository>,
    window: Duration,
    limit: usize,
}

impl TopRanking {
    /// `window_days` is clamped to `1..=MAX_RANKING_WINDOW_DAYS`.
    pub fn new(
        posts: Arc<dyn PostRepository>,
        comments: Arc<dyn CommentRepository>,
        window_days: i64,
        limit: usize,
    ) -> Self {
        Self {
            posts,
            comments,
            window: Duration::days(window_days.clamp(1, MAX_RANKING_WINDOW_DAYS)),
            limit,
        }
    }

    /// Most liked posts created in the trailing window.
    pub async fn top_likes(&self) -> Result<Vec<PostRanking>> {
        self.top_likes_at(Utc::now()).await
    }

    /// Most commented posts; comment count then views, both descending.
    pub async fn top_comments(&self) -> Result<Vec<PostRanking>> {
        self.top_comments_at(Utc::now()).await
    }

    fn since(&self, now: DateTime<Utc>) -> DateTime<Utc> {
        now.checked_sub_signed(self.window)
            .unwrap_or(DateTime::<Utc>::MIN_UTC)
    }

    #[instrument(skip(self))]
    pub async fn top_likes_at(&self, now: DateTime<Utc>) -> Result<Vec<PostRanking>> {
        let since = self.since(now);
        Ok(self.posts.top_liked_since(since, self.limit).await?)
    }

    #[instrument(skip(self))]
    pub async fn top_comments_at(&self, now: DateTime<Utc>) -> Result<Vec<PostRanking>> {
        let since = self.since(now);
        let counts = self.comments.count_since(since).await?;
        if counts.is_empty() {
            return Ok(Vec::new());
        }

        let ids: Vec<Uuid> = counts.keys().copied().collect();
        let summaries = self.posts.find_summaries(&ids).await?;
        debug!(posts = summaries.len(), "joining comment counts");

        let mut ranked: Vec<PostRanking> = summaries
            .into_iter()
            .map(|summary| {
                let count = counts.get(&summary.id).copied().unwrap_or_default();
                PostRanking::from_summary(summary, count)
            })
            .collect();
        ranked.sort_by_key(|r| (Reverse(r.count), Reverse(r.views)));
        ranked.truncate(self.limit);
        Ok(ranked)
    }
}

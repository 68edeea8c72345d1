//! Pin/unpin of posts.

use std::sync::Arc;

use domains::{BoardError, HistoryKind, NoticeState, PostRepository, Result, Writer};
use tracing::{info, instrument};

use crate::retry::retry_on_conflict;

#[derive(Clone)]
pub struct NoticeToggle {
    posts: Arc<dyn PostRepository>,
    retry_limit: u32,
}

impl NoticeToggle {
    pub fn new(posts: Arc<dyn PostRepository>, retry_limit: u32) -> Self {
        Self { posts, retry_limit }
    }

    /// Pins (`enable`) or unpins a post and records the change in its history.
    ///
    /// Unpinning clears the flag back to [`NoticeState::Unset`]. Only an
    /// explicit `Disabled` flag rejects an unpin; an unset flag does not.
    #[instrument(skip(self, writer), fields(user_id = %writer.user_id))]
    pub async fn set_notice(&self, writer: &Writer, seq: i64, enable: bool) -> Result<NoticeState> {
        let state = retry_on_conflict(self.retry_limit, "post.notice", move || async move {
            let mut post = self
                .posts
                .find_by_seq(seq)
                .await?
                .ok_or_else(|| BoardError::NotFoundPost(seq.to_string()))?;

            let (next, kind) = transition(post.status.notice, enable)?;
            post.status.notice = next;
            post.record(kind, writer);
            self.posts.update(&post).await?;
            Ok::<_, BoardError>(next)
        })
        .await?;

        info!(seq, notice = ?state, "notice updated");
        Ok(state)
    }
}

fn transition(current: NoticeState, enable: bool) -> Result<(NoticeState, HistoryKind)> {
    match (current, enable) {
        (NoticeState::Enabled, true) => Err(BoardError::NoticeAlreadyEnabled),
        (NoticeState::Unset | NoticeState::Disabled, true) => {
            Ok((NoticeState::Enabled, HistoryKind::EnableNotice))
        }
        (NoticeState::Enabled | NoticeState::Unset, false) => {
            Ok((NoticeState::Unset, HistoryKind::DisableNotice))
        }
        (NoticeState::Disabled, false) => Err(BoardError::NoticeAlreadyDisabled),
    }
}

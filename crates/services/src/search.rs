//! Fire-and-forget dispatch to the search index.
//!
//! Jobs are spawned onto the runtime after the primary write succeeded.
//! A failing gateway is retried a few times and then logged; it never
//! reaches the caller of the lifecycle operation.

use std::sync::{Arc, Mutex, MutexGuard};
use std::time::Duration;

use domains::{CommentDocument, GalleryDocument, PostDocument, SearchIndexGateway};
use tokio::task::JoinSet;
use tracing::{debug, error, warn};
use uuid::Uuid;

const RETRY_BACKOFF: Duration = Duration::from_millis(50);

#[derive(Debug, Clone, PartialEq)]
pub enum SearchJob {
    IndexPost(PostDocument),
    IndexComment(CommentDocument),
    IndexGallery(GalleryDocument),
    DeletePost(Uuid),
    DeleteComment(Uuid),
}

impl SearchJob {
    fn label(&self) -> &'static str {
        match self {
            SearchJob::IndexPost(_) => "index_post",
            SearchJob::IndexComment(_) => "index_comment",
            SearchJob::IndexGallery(_) => "index_gallery",
            SearchJob::DeletePost(_) => "delete_post",
            SearchJob::DeleteComment(_) => "delete_comment",
        }
    }

    fn target(&self) -> Uuid {
        match self {
            SearchJob::IndexPost(doc) => doc.id,
            SearchJob::IndexComment(doc) => doc.id,
            SearchJob::IndexGallery(doc) => doc.id,
            SearchJob::DeletePost(id) | SearchJob::DeleteComment(id) => *id,
        }
    }

    async fn send(&self, gateway: &dyn SearchIndexGateway) -> anyhow::Result<()> {
        match self {
            SearchJob::IndexPost(doc) => gateway.index_post(doc.clone()).await,
            SearchJob::IndexComment(doc) => gateway.index_comment(doc.clone()).await,
            SearchJob::IndexGallery(doc) => gateway.index_gallery(doc.clone()).await,
            SearchJob::DeletePost(id) => gateway.delete_post(*id).await,
            SearchJob::DeleteComment(id) => gateway.delete_comment(*id).await,
        }
    }
}

/// Spawns search jobs and keeps their handles so they can be awaited on shutdown.
#[derive(Clone)]
pub struct SearchDispatcher {
    gateway: Arc<dyn SearchIndexGateway>,
    attempts: u32,
    pending: Arc<Mutex<JoinSet<()>>>,
}

impl SearchDispatcher {
    pub fn new(gateway: Arc<dyn SearchIndexGateway>, attempts: u32) -> Self {
        Self {
            gateway,
            attempts: attempts.max(1),
            pending: Arc::new(Mutex::new(JoinSet::new())),
        }
    }

    /// Queues `job` without waiting for it. Must be called inside a Tokio runtime.
    pub fn submit(&self, job: SearchJob) {
        let gateway = Arc::clone(&self.gateway);
        let attempts = self.attempts;
        let mut pending = self.lock_pending();
        // reap finished jobs so the set does not grow unbounded
        while pending.try_join_next().is_some() {}
        pending.spawn(run_job(gateway, job, attempts));
    }

    /// Waits for every job submitted so far.
    pub async fn drain(&self) {
        let mut jobs = std::mem::take(&mut *self.lock_pending());
        while let Some(joined) = jobs.join_next().await {
            if let Err(err) = joined {
                error!(error = %err, "search job panicked");
            }
        }
    }

    fn lock_pending(&self) -> MutexGuard<'_, JoinSet<()>> {
        self.pending
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}

async fn run_job(gateway: Arc<dyn SearchIndexGateway>, job: SearchJob, attempts: u32) {
    for attempt in 1..=attempts {
        match job.send(gateway.as_ref()).await {
            Ok(()) => {
                debug!(job = job.label(), target = %job.target(), "search index updated");
                return;
            }
            Err(err) if attempt < attempts => {
                warn!(job = job.label(), target = %job.target(), attempt, error = %err, "search index call failed, retrying");
                tokio::time::sleep(RETRY_BACKOFF * attempt).await;
            }
            Err(err) => {
                error!(job = job.label(), target = %job.target(), attempts, error = %err, "search index call abandoned");
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use domains::MockSearchIndexGateway;
    use mockall::Sequence;

    #[tokio::test]
    async fn retries_then_succeeds() {
        let id = Uuid::now_v7();
        let mut gateway = MockSearchIndexGateway::new();
        let mut seq = Sequence::new();
        gateway
            .expect_delete_post()
            .times(1)
            .in_sequence(&mut seq)
            .returning(|_| Err(anyhow::anyhow!("index offline")));
        gateway
            .expect_delete_post()
            .withf(move |got| *got == id)
            .times(1)
            .in_sequence(&mut seq)
            .returning(|_| Ok(()));

        let dispatcher = SearchDispatcher::new(Arc::new(gateway), 3);
        dispatcher.submit(SearchJob::DeletePost(id));
        dispatcher.drain().await;
    }

    #[tokio::test]
    async fn gives_up_after_configured_attempts() {
        let mut gateway = MockSearchIndexGateway::new();
        gateway
            .expect_delete_comment()
            .times(2)
            .returning(|_| Err(anyhow::anyhow!("index offline")));

        let dispatcher = SearchDispatcher::new(Arc::new(gateway), 2);
        dispatcher.submit(SearchJob::DeleteComment(Uuid::now_v7()));
        dispatcher.drain().await;
    }
}

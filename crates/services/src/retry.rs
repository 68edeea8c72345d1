//! Optimistic concurrency loop.
//!
//! Every load-mutate-persist cycle runs inside [`retry_on_conflict`]: the
//! repositories reject writes whose `version` is stale, and the whole cycle
//! (including the load) is replayed against the fresh document.

use std::future::Future;

use domains::Result;
use tracing::debug;

pub(crate) async fn retry_on_conflict<T, F, Fut>(
    limit: u32,
    operation: &'static str,
    mut attempt_fn: F,
) -> Result<T>
where
    F: FnMut() -> Fut,
    Fut: Future<Output = Result<T>>,
{
    let limit = limit.max(1);
    let mut attempt = 1;
    loop {
        match attempt_fn().await {
            Err(err) if err.is_conflict() && attempt < limit => {
                debug!(operation, attempt, "write conflict, reloading");
                attempt += 1;
            }
            other => return other,
        }
    }
}

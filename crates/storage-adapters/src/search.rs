//! Search gateway that only logs the documents it receives.
//!
//! Useful where no index is deployed; the service treats indexing as
//! best-effort anyway.

use async_trait::async_trait;
use domains::{CommentDocument, GalleryDocument, PostDocument, SearchIndexGateway};
use tracing::debug;
use uuid::Uuid;

#[derive(Debug, Default, Clone, Copy)]
pub struct TracingSearchIndex;

#[async_trait]
impl SearchIndexGateway for TracingSearchIndex {
    async fn index_post(&self, doc: PostDocument) -> anyhow::Result<()> {
        debug!(document = %serde_json::to_string(&doc)?, "index post");
        Ok(())
    }

    async fn index_comment(&self, doc: CommentDocument) -> anyhow::Result<()> {
        debug!(document = %serde_json::to_string(&doc)?, "index comment");
        Ok(())
    }

    async fn index_gallery(&self, doc: GalleryDocument) -> anyhow::Result<()> {
        debug!(document = %serde_json::to_string(&doc)?, "index gallery");
        Ok(())
    }

    async fn delete_post(&self, id: Uuid) -> anyhow::Result<()> {
        debug!(%id, "delete post document");
        Ok(())
    }

    async fn delete_comment(&self, id: Uuid) -> anyhow::Result<()> {
        debug!(%id, "delete comment document");
        Ok(())
    }
}

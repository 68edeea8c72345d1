//! Post ↔ gallery cross-linking.

use std::sync::Arc;

use domains::{
    BoardItem, Gallery, GalleryOrigin, GalleryRef, GalleryRepository, GalleryState, Result,
};
use tracing::{instrument, warn};

use crate::retry::retry_on_conflict;
use crate::search::{SearchDispatcher, SearchJob};

/// Links galleries back to the posts that reference them.
///
/// Linking is additive: galleries missing from a later reference set keep
/// their back-reference.
#[derive(Clone)]
pub struct GalleryLinker {
    galleries: Arc<dyn GalleryRepository>,
    search: SearchDispatcher,
    retry_limit: u32,
}

impl GalleryLinker {
    pub fn new(
        galleries: Arc<dyn GalleryRepository>,
        search: SearchDispatcher,
        retry_limit: u32,
    ) -> Self {
        Self {
            galleries,
            search,
            retry_limit,
        }
    }

    /// Applies the full reference set of a post. Returns how many galleries were updated.
    ///
    /// Unknown gallery ids are skipped without an error.
    #[instrument(skip(self, subject, refs), fields(post_seq = item.post_seq, refs = refs.len()))]
    pub async fn link(&self, item: BoardItem, subject: &str, refs: &[GalleryRef]) -> Result<usize> {
        let mut linked = 0;
        for reference in refs {
            let updated = retry_on_conflict(self.retry_limit, "gallery.link", move || async move {
                self.link_one(item, subject, reference).await
            })
            .await?;

            match updated {
                Some(gallery) => {
                    self.search.submit(SearchJob::IndexGallery((&gallery).into()));
                    linked += 1;
                }
                None => warn!(gallery_id = %reference.id, "linked gallery does not exist, skipping"),
            }
        }
        Ok(linked)
    }

    async fn link_one(
        &self,
        item: BoardItem,
        subject: &str,
        reference: &GalleryRef,
    ) -> Result<Option<Gallery>> {
        let Some(mut gallery) = self.galleries.find_by_id(reference.id).await? else {
            return Ok(None);
        };

        if !gallery.links_post(item.post_id) {
            gallery.posts.push(item);
        }
        gallery.name = match reference.name.as_deref() {
            Some(name) if !name.is_empty() => name.to_owned(),
            _ => subject.to_owned(),
        };
        gallery.status.from = Some(GalleryOrigin::BoardFree);
        gallery.status.enable_state = GalleryState::Enable;

        self.galleries.update(&gallery).await?;
        Ok(Some(gallery))
    }
}

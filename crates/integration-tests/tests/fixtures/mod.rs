//! Shared wiring for the behaviour tests: a [`Board`] over the in-memory
//! adapters plus a search gateway that records what it was asked to do.
#![allow(dead_code)]

use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use configs::{init_tracing, LogSettings};
use domains::{
    BoardPolicy, CommentDocument, Device, GalleryDocument, GalleryRef, PostDocument,
    SearchIndexGateway, Writer,
};
use once_cell::sync::Lazy;
use services::{Board, BoardPorts, PostDraft};
use storage_adapters::{
    MemoryCategories, MemoryCommentRepository, MemoryGalleryRepository, MemoryPostRepository,
    MemorySequenceCounter,
};
use uuid::Uuid;

static TRACING: Lazy<()> = Lazy::new(|| {
    let _ = init_tracing(&LogSettings {
        level: "debug".to_string(),
        json: false,
    });
});

pub const CATEGORY: &str = "FREE";

/// Records search calls as `"<call>:<id>"`.
#[derive(Default)]
pub struct RecordingSearchIndex {
    calls: Mutex<Vec<String>>,
}

impl RecordingSearchIndex {
    pub fn calls(&self) -> Vec<String> {
        self.calls.lock().unwrap().clone()
    }

    fn record(&self, call: &str, id: Uuid) {
        self.calls.lock().unwrap().push(format!("{call}:{id}"));
    }
}

#[async_trait]
impl SearchIndexGateway for RecordingSearchIndex {
    async fn index_post(&self, doc: PostDocument) -> anyhow::Result<()> {
        self.record("index_post", doc.id);
        Ok(())
    }

    async fn index_comment(&self, doc: CommentDocument) -> anyhow::Result<()> {
        self.record("index_comment", doc.id);
        Ok(())
    }

    async fn index_gallery(&self, doc: GalleryDocument) -> anyhow::Result<()> {
        self.record("index_gallery", doc.id);
        Ok(())
    }

    async fn delete_post(&self, id: Uuid) -> anyhow::Result<()> {
        self.record("delete_post", id);
        Ok(())
    }

    async fn delete_comment(&self, id: Uuid) -> anyhow::Result<()> {
        self.record("delete_comment", id);
        Ok(())
    }
}

pub struct TestBoard {
    pub board: Board,
    pub posts: Arc<MemoryPostRepository>,
    pub comments: Arc<MemoryCommentRepository>,
    pub galleries: Arc<MemoryGalleryRepository>,
    pub search: Arc<RecordingSearchIndex>,
}

pub fn board() -> TestBoard {
    board_with_policy(BoardPolicy::default())
}

pub fn board_with_policy(policy: BoardPolicy) -> TestBoard {
    let search = Arc::new(RecordingSearchIndex::default());
    build(policy, search.clone(), search)
}

/// Sends search calls to `gateway`; `TestBoard::search` then stays empty.
pub fn board_with_search(gateway: Arc<dyn SearchIndexGateway>) -> TestBoard {
    build(
        BoardPolicy::default(),
        gateway,
        Arc::new(RecordingSearchIndex::default()),
    )
}

fn build(
    policy: BoardPolicy,
    gateway: Arc<dyn SearchIndexGateway>,
    search: Arc<RecordingSearchIndex>,
) -> TestBoard {
    Lazy::force(&TRACING);

    let posts = Arc::new(MemoryPostRepository::new());
    let comments = Arc::new(MemoryCommentRepository::new());
    let galleries = Arc::new(MemoryGalleryRepository::new());
    let ports = BoardPorts {
        posts: posts.clone(),
        comments: comments.clone(),
        galleries: galleries.clone(),
        counter: Arc::new(MemorySequenceCounter::new()),
        categories: Arc::new(MemoryCategories::new([CATEGORY, "FOOTBALL"])),
        search: gateway,
    };

    TestBoard {
        board: Board::new(ports, policy),
        posts,
        comments,
        galleries,
        search,
    }
}

pub fn writer(user_id: &str) -> Writer {
    Writer::new(user_id, format!("{user_id}-name"), "jakduk")
}

pub fn draft(subject: &str) -> PostDraft {
    PostDraft {
        subject: subject.to_string(),
        content: format!("<p>{subject} body</p>"),
        category: CATEGORY.to_string(),
        galleries: Vec::<GalleryRef>::new(),
        device: Device::Normal,
    }
}

pub fn draft_with_galleries(subject: &str, galleries: Vec<GalleryRef>) -> PostDraft {
    PostDraft {
        galleries,
        ..draft(subject)
    }
}

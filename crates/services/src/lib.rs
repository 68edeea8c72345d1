//! # services
//!
//! Lifecycle managers of the free board: posts, comments, feelings,
//! notices, gallery links and weekly rankings. Everything talks to the
//! outside world through the ports in `domains`; [`Board`] wires one
//! instance of each service over a shared set of ports.

pub mod comment_service;
pub mod content;
pub mod feeling;
pub mod gallery;
pub mod notice;
pub mod post_service;
pub mod ranking;
mod retry;
pub mod search;

use std::sync::Arc;

use domains::{
    BoardPolicy, CategoryValidator, CommentRepository, GalleryRepository, PostRepository,
    SearchIndexGateway, SequenceCounter,
};

pub use comment_service::CommentService;
pub use feeling::FeelingRegistry;
pub use gallery::GalleryLinker;
pub use notice::NoticeToggle;
pub use post_service::{PostDraft, PostService};
pub use ranking::TopRanking;
pub use search::{SearchDispatcher, SearchJob};

/// Adapters the services run on.
#[derive(Clone)]
pub struct BoardPorts {
    pub posts: Arc<dyn PostRepository>,
    pub comments: Arc<dyn CommentRepository>,
    pub galleries: Arc<dyn GalleryRepository>,
    pub counter: Arc<dyn SequenceCounter>,
    pub categories: Arc<dyn CategoryValidator>,
    pub search: Arc<dyn SearchIndexGateway>,
}

/// All board services over one set of ports.
#[derive(Clone)]
pub struct Board {
    pub posts: PostService,
    pub comments: CommentService,
    pub feelings: FeelingRegistry,
    pub notices: NoticeToggle,
    pub ranking: TopRanking,
    search: SearchDispatcher,
}

impl Board {
    pub fn new(ports: BoardPorts, policy: BoardPolicy) -> Self {
        let policy = Arc::new(policy);
        let retry_limit = policy.conflict_retry_limit;
        let search = SearchDispatcher::new(ports.search, policy.search_retry_attempts);
        let linker = GalleryLinker::new(Arc::clone(&ports.galleries), search.clone(), retry_limit);

        Self {
            posts: PostService::new(
                Arc::clone(&ports.posts),
                Arc::clone(&ports.comments),
                ports.galleries,
                ports.counter,
                ports.categories,
                linker,
                search.clone(),
                Arc::clone(&policy),
            ),
            comments: CommentService::new(
                Arc::clone(&ports.posts),
                Arc::clone(&ports.comments),
                search.clone(),
                retry_limit,
            ),
            feelings: FeelingRegistry::new(
                Arc::clone(&ports.posts),
                Arc::clone(&ports.comments),
                retry_limit,
            ),
            notices: NoticeToggle::new(Arc::clone(&ports.posts), retry_limit),
            ranking: TopRanking::new(
                ports.posts,
                ports.comments,
                policy.ranking_window_days,
                policy.top_limit,
            ),
            search,
        }
    }

    /// Waits for queued search index jobs, e.g. before shutdown.
    pub async fn drain_search(&self) {
        self.search.drain().await;
    }
}

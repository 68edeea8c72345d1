mod fixtures;

use std::collections::HashMap;
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use domains::{
    BoardError, BoardPolicy, Comment, CommentRepository, DeleteKind, Device, FeelingKind, Page,
    PostRepository, StoreResult,
};
use fixtures::{board, board_with_policy, draft, writer, CATEGORY};
use services::{Board, BoardPorts, CommentService, SearchDispatcher};
use storage_adapters::{
    MemoryCategories, MemoryCommentRepository, MemoryGalleryRepository, MemoryPostRepository,
    MemorySequenceCounter, TracingSearchIndex,
};
use uuid::Uuid;

/// Lets a comment land right after the post's comments were counted.
struct LateCommentRepository {
    inner: Arc<MemoryCommentRepository>,
    late: Mutex<Option<(CommentService, i64)>>,
}

#[async_trait]
impl CommentRepository for LateCommentRepository {
    async fn find_by_id(&self, id: Uuid) -> StoreResult<Option<Comment>> {
        self.inner.find_by_id(id).await
    }

    async fn insert(&self, comment: &Comment) -> StoreResult<()> {
        self.inner.insert(comment).await
    }

    async fn update(&self, comment: &Comment) -> StoreResult<()> {
        self.inner.update(comment).await
    }

    async fn delete(&self, comment: &Comment) -> StoreResult<()> {
        self.inner.delete(comment).await
    }

    async fn count_by_post(&self, post_id: Uuid) -> StoreResult<u64> {
        let count = self.inner.count_by_post(post_id).await?;
        let late = self.late.lock().unwrap().take();
        if let Some((comments, seq)) = late {
            comments
                .create(&writer("late"), seq, "just in time", Device::Normal)
                .await
                .unwrap();
        }
        Ok(count)
    }

    async fn count_by_posts(&self, post_ids: &[Uuid]) -> StoreResult<HashMap<Uuid, u64>> {
        self.inner.count_by_posts(post_ids).await
    }

    async fn count_since(&self, since: DateTime<Utc>) -> StoreResult<HashMap<Uuid, u64>> {
        self.inner.count_since(since).await
    }

    async fn list_by_post(&self, post_seq: i64, after: Option<Uuid>) -> StoreResult<Vec<Comment>> {
        self.inner.list_by_post(post_seq, after).await
    }

    async fn list(&self, page: u32, size: u32) -> StoreResult<Page<Comment>> {
        self.inner.list(page, size).await
    }
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn test_concurrent_same_user_feeling_registers_once() {
    let t = board();
    let seq = t.board.posts.create(&writer("alice"), draft("race")).await.unwrap();

    let mut handles = Vec::new();
    for i in 0..8 {
        let feelings = t.board.feelings.clone();
        let kind = if i % 2 == 0 { FeelingKind::Like } else { FeelingKind::Dislike };
        handles.push(tokio::spawn(async move {
            feelings.set_post_feeling(seq, &writer("bob"), kind).await
        }));
    }

    let mut accepted = 0;
    for handle in handles {
        match handle.await.unwrap() {
            Ok(_) => accepted += 1,
            Err(BoardError::DuplicateFeeling(_)) => {}
            Err(other) => panic!("unexpected error: {other}"),
        }
    }
    assert_eq!(accepted, 1);

    let post = t.board.posts.find_by_seq(seq).await.unwrap();
    assert_eq!(post.feelings.like_count() + post.feelings.dislike_count(), 1);
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn test_concurrent_feelings_from_many_users_are_all_kept() {
    let t = board_with_policy(BoardPolicy {
        conflict_retry_limit: 64,
        ..BoardPolicy::default()
    });
    let seq = t.board.posts.create(&writer("alice"), draft("crowd")).await.unwrap();

    let mut handles = Vec::new();
    for i in 0..16 {
        let feelings = t.board.feelings.clone();
        handles.push(tokio::spawn(async move {
            feelings
                .set_post_feeling(seq, &writer(&format!("fan{i}")), FeelingKind::Like)
                .await
        }));
    }
    for handle in handles {
        handle.await.unwrap().unwrap();
    }

    let post = t.board.posts.find_by_seq(seq).await.unwrap();
    assert_eq!(post.feelings.like_count(), 16);
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn test_concurrent_creates_never_share_a_seq() {
    let t = board();

    let mut handles = Vec::new();
    for i in 0..20 {
        let posts = t.board.posts.clone();
        handles.push(tokio::spawn(async move {
            posts.create(&writer("alice"), draft(&format!("p{i}"))).await
        }));
    }
    let mut seqs = Vec::new();
    for handle in handles {
        seqs.push(handle.await.unwrap().unwrap());
    }
    seqs.sort_unstable();
    assert_eq!(seqs, (1..=20).collect::<Vec<_>>());
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn test_edit_racing_views_keeps_both() {
    let t = board_with_policy(BoardPolicy {
        conflict_retry_limit: 64,
        ..BoardPolicy::default()
    });
    let alice = writer("alice");
    let seq = t.board.posts.create(&alice, draft("v1")).await.unwrap();

    let viewer = {
        let posts = t.board.posts.clone();
        tokio::spawn(async move {
            for _ in 0..20 {
                posts.get(seq, true).await.unwrap();
            }
        })
    };
    let editor = {
        let posts = t.board.posts.clone();
        tokio::spawn(async move {
            for i in 0..5 {
                posts.edit(&alice, seq, draft(&format!("v{}", i + 2))).await.unwrap();
            }
        })
    };
    viewer.await.unwrap();
    editor.await.unwrap();

    let post = t.board.posts.find_by_seq(seq).await.unwrap();
    assert_eq!(post.views, 20);
    assert_eq!(post.subject, "v6");
    assert_eq!(post.history().len(), 6);

    let comment = t
        .board
        .comments
        .create(&writer("bob"), seq, "done", Device::Normal)
        .await
        .unwrap();
    assert_eq!(comment.board_item().post_seq, seq);
}

#[tokio::test]
async fn test_comment_landing_after_count_turns_delete_into_redaction() {
    let posts = Arc::new(MemoryPostRepository::new());
    let stored_comments = Arc::new(MemoryCommentRepository::new());
    let search = SearchDispatcher::new(Arc::new(TracingSearchIndex), 1);
    let late_writer = CommentService::new(posts.clone(), stored_comments.clone(), search, 5);
    let comments = Arc::new(LateCommentRepository {
        inner: stored_comments.clone(),
        late: Mutex::new(None),
    });
    let board = Board::new(
        BoardPorts {
            posts: posts.clone(),
            comments: comments.clone(),
            galleries: Arc::new(MemoryGalleryRepository::new()),
            counter: Arc::new(MemorySequenceCounter::new()),
            categories: Arc::new(MemoryCategories::new([CATEGORY])),
            search: Arc::new(TracingSearchIndex),
        },
        BoardPolicy::default(),
    );

    let alice = writer("alice");
    let seq = board.posts.create(&alice, draft("contested")).await.unwrap();
    *comments.late.lock().unwrap() = Some((late_writer, seq));

    let kind = board.posts.delete(&alice, seq).await.unwrap();
    assert_eq!(kind, DeleteKind::Content);

    let post = posts.find_by_seq(seq).await.unwrap().unwrap();
    assert!(post.status.deleted);
    assert_eq!(stored_comments.count_by_post(post.id).await.unwrap(), 1);
}

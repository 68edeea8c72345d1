mod fixtures;

use chrono::{Duration, Utc};
use domains::{
    BoardItem, Comment, CommentRepository, Device, FeelingKind, NewPost, Post, PostRepository,
};
use fixtures::{board, draft, writer, TestBoard, CATEGORY};

async fn comment_n(t: &TestBoard, seq: i64, n: usize) {
    for i in 0..n {
        t.board
            .comments
            .create(&writer(&format!("c{i}")), seq, "comment", Device::Normal)
            .await
            .unwrap();
    }
}

async fn view_n(t: &TestBoard, seq: i64, n: usize) {
    for _ in 0..n {
        t.board.posts.get(seq, true).await.unwrap();
    }
}

#[tokio::test]
async fn test_top_comments_breaks_ties_by_views() {
    let t = board();
    let alice = writer("alice");
    let a = t.board.posts.create(&alice, draft("A")).await.unwrap();
    let b = t.board.posts.create(&alice, draft("B")).await.unwrap();
    let c = t.board.posts.create(&alice, draft("C")).await.unwrap();

    comment_n(&t, a, 5).await;
    comment_n(&t, b, 5).await;
    comment_n(&t, c, 3).await;
    view_n(&t, a, 10).await;
    view_n(&t, b, 20).await;
    view_n(&t, c, 1).await;

    let top = t.board.ranking.top_comments().await.unwrap();
    assert_eq!(top.iter().map(|r| r.seq).collect::<Vec<_>>(), vec![b, a, c]);
    assert_eq!(top.iter().map(|r| r.count).collect::<Vec<_>>(), vec![5, 5, 3]);
    assert_eq!(top[0].subject, "B");
    assert_eq!(top[0].views, 20);
}

#[tokio::test]
async fn test_top_comments_respects_window_and_limit() {
    let t = board();
    let alice = writer("alice");

    let mut old = Post::new(
        100,
        NewPost {
            writer: alice.clone(),
            subject: "last month".into(),
            content: "old".into(),
            short_content: "old".into(),
            category: CATEGORY.into(),
            galleries: vec![],
            device: Device::Normal,
        },
    );
    old.created_at = Utc::now() - Duration::days(30);
    t.posts.insert(&old).await.unwrap();
    for _ in 0..10 {
        let mut comment = Comment::new(
            BoardItem {
                post_id: old.id,
                post_seq: old.seq,
            },
            writer("bob"),
            "ancient".into(),
            Device::Normal,
        );
        comment.created_at = Utc::now() - Duration::days(20);
        t.comments.insert(&comment).await.unwrap();
    }

    let mut seqs = Vec::new();
    for i in 0..7 {
        let seq = t.board.posts.create(&alice, draft(&format!("fresh {i}"))).await.unwrap();
        comment_n(&t, seq, i + 1).await;
        seqs.push(seq);
    }

    let top = t.board.ranking.top_comments().await.unwrap();
    assert_eq!(top.len(), 5);
    assert!(top.iter().all(|r| r.seq != old.seq));
    assert_eq!(top[0].seq, seqs[6]);
    assert_eq!(top[0].count, 7);

    // from far enough in the future nothing is in the window
    let later = t
        .board
        .ranking
        .top_comments_at(Utc::now() + Duration::days(60))
        .await
        .unwrap();
    assert!(later.is_empty());
}

#[tokio::test]
async fn test_top_likes() {
    let t = board();
    let alice = writer("alice");
    let popular = t.board.posts.create(&alice, draft("popular")).await.unwrap();
    let liked = t.board.posts.create(&alice, draft("liked")).await.unwrap();
    let ignored = t.board.posts.create(&alice, draft("ignored")).await.unwrap();
    let removed = t.board.posts.create(&alice, draft("removed")).await.unwrap();

    for user in ["bob", "carol"] {
        t.board
            .feelings
            .set_post_feeling(popular, &writer(user), FeelingKind::Like)
            .await
            .unwrap();
    }
    t.board
        .feelings
        .set_post_feeling(liked, &writer("bob"), FeelingKind::Like)
        .await
        .unwrap();
    t.board
        .feelings
        .set_post_feeling(ignored, &writer("bob"), FeelingKind::Dislike)
        .await
        .unwrap();
    for user in ["bob", "carol", "dave"] {
        t.board
            .feelings
            .set_post_feeling(removed, &writer(user), FeelingKind::Like)
            .await
            .unwrap();
    }
    comment_n(&t, removed, 1).await;
    t.board.posts.delete(&alice, removed).await.unwrap();

    let top = t.board.ranking.top_likes().await.unwrap();
    assert_eq!(top.iter().map(|r| r.seq).collect::<Vec<_>>(), vec![popular, liked]);
    assert_eq!(top[0].count, 2);

    // redacted posts drop out of the comment ranking too
    let commented = t.board.ranking.top_comments().await.unwrap();
    assert!(commented.iter().all(|r| r.seq != removed));
}

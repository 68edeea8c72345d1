//! # Domain Models
//!
//! These structs represent the core entities of the free board.
//! We use UUID v7 for time-ordered, globally unique identification; the
//! human-facing post number is the separate `seq` handed out by the
//! sequence counter.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::error::FeelingRejection;

/// An already-authenticated author or actor.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Writer {
    pub user_id: String,
    pub username: String,
    /// Identity provider that authenticated the user (e.g. "jakduk", "facebook")
    pub provider_id: String,
}

impl Writer {
    pub fn new(
        user_id: impl Into<String>,
        username: impl Into<String>,
        provider_id: impl Into<String>,
    ) -> Self {
        Self {
            user_id: user_id.into(),
            username: username.into(),
            provider_id: provider_id.into(),
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Device {
    #[default]
    Normal,
    Mobile,
    Tablet,
}

/// Pin state of a post.
///
/// `Disabled` is never written by this crate; it only shows up in documents
/// persisted by older writers that stored a literal `false`.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum NoticeState {
    #[default]
    Unset,
    Enabled,
    Disabled,
}

impl NoticeState {
    pub fn is_enabled(self) -> bool {
        matches!(self, NoticeState::Enabled)
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PostStatus {
    pub device: Device,
    #[serde(default)]
    pub notice: NoticeState,
    #[serde(default)]
    pub deleted: bool,
}

impl PostStatus {
    pub fn new(device: Device) -> Self {
        Self {
            device,
            ..Self::default()
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum HistoryKind {
    Create,
    Edit,
    Delete,
    EnableNotice,
    DisableNotice,
}

/// One line of a post's audit trail.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HistoryEntry {
    pub id: Uuid,
    pub kind: HistoryKind,
    pub writer: Writer,
    pub timestamp: DateTime<Utc>,
}

impl HistoryEntry {
    pub fn new(kind: HistoryKind, writer: Writer) -> Self {
        Self {
            id: Uuid::now_v7(),
            kind,
            writer,
            timestamp: Utc::now(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum FeelingKind {
    Like,
    Dislike,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FeelingUser {
    pub id: Uuid,
    pub user_id: String,
    pub username: String,
}

/// Like/dislike membership of a post or comment.
///
/// A user id appears at most once across both lists. Entries are only ever
/// appended through [`Feelings::register`].
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Feelings {
    #[serde(default)]
    users_liking: Vec<FeelingUser>,
    #[serde(default)]
    users_disliking: Vec<FeelingUser>,
}

impl Feelings {
    pub fn users_liking(&self) -> &[FeelingUser] {
        &self.users_liking
    }

    pub fn users_disliking(&self) -> &[FeelingUser] {
        &self.users_disliking
    }

    pub fn like_count(&self) -> usize {
        self.users_liking.len()
    }

    pub fn dislike_count(&self) -> usize {
        self.users_disliking.len()
    }

    pub fn contains(&self, user_id: &str) -> bool {
        self.users_liking
            .iter()
            .chain(self.users_disliking.iter())
            .any(|u| u.user_id == user_id)
    }

    /// Appends `actor` to the list matching `kind`.
    ///
    /// `owner_id` is the user id of the target's writer; `None` for redacted
    /// documents. Both checks run before anything is mutated.
    pub fn register(
        &mut self,
        owner_id: Option<&str>,
        actor: &Writer,
        kind: FeelingKind,
    ) -> Result<&FeelingUser, FeelingRejection> {
        if owner_id == Some(actor.user_id.as_str()) {
            return Err(FeelingRejection::OwnContent);
        }
        if self.contains(&actor.user_id) {
            return Err(FeelingRejection::AlreadyExpressed);
        }

        let list = match kind {
            FeelingKind::Like => &mut self.users_liking,
            FeelingKind::Dislike => &mut self.users_disliking,
        };
        list.push(FeelingUser {
            id: Uuid::now_v7(),
            user_id: actor.user_id.clone(),
            username: actor.username.clone(),
        });
        Ok(&list[list.len() - 1])
    }
}

/// A post or comment that users can react to.
pub trait FeelingTarget {
    /// User id of the writer, if the document still has one.
    fn owner_id(&self) -> Option<&str>;
    fn feelings(&self) -> &Feelings;
    fn feelings_mut(&mut self) -> &mut Feelings;
}

/// The fundamental unit of conversation on the free board.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Post {
    pub id: Uuid,
    /// Public post number; assigned once by the sequence counter
    pub seq: i64,
    /// `None` once the post has been redacted by a soft delete
    pub writer: Option<Writer>,
    pub subject: String,
    pub content: String,
    /// Markup-free, truncated preview of `content`
    pub short_content: String,
    pub category: String,
    pub views: u64,
    /// Ids of linked galleries
    #[serde(default)]
    pub galleries: Vec<Uuid>,
    pub status: PostStatus,
    #[serde(default)]
    history: Vec<HistoryEntry>,
    #[serde(flatten)]
    pub feelings: Feelings,
    pub created_at: DateTime<Utc>,
    /// Optimistic concurrency token, bumped by the store on every write
    #[serde(default)]
    pub version: u64,
}

/// Everything needed to build a fresh post except its sequence number.
#[derive(Debug, Clone)]
pub struct NewPost {
    pub writer: Writer,
    pub subject: String,
    pub content: String,
    pub short_content: String,
    pub category: String,
    pub galleries: Vec<Uuid>,
    pub device: Device,
}

impl Post {
    /// Builds a post with an initial CREATE history entry.
    pub fn new(seq: i64, new: NewPost) -> Self {
        let history = vec![HistoryEntry::new(HistoryKind::Create, new.writer.clone())];
        Self {
            id: Uuid::now_v7(),
            seq,
            writer: Some(new.writer),
            subject: new.subject,
            content: new.content,
            short_content: new.short_content,
            category: new.category,
            views: 0,
            galleries: new.galleries,
            status: PostStatus::new(new.device),
            history,
            feelings: Feelings::default(),
            created_at: Utc::now(),
            version: 0,
        }
    }

    pub fn history(&self) -> &[HistoryEntry] {
        &self.history
    }

    pub fn record(&mut self, kind: HistoryKind, writer: &Writer) {
        self.history.push(HistoryEntry::new(kind, writer.clone()));
    }

    pub fn is_written_by(&self, user_id: &str) -> bool {
        self.writer.as_ref().is_some_and(|w| w.user_id == user_id)
    }

    /// Blanks the visible content but keeps the document and its history.
    pub fn redact(&mut self) {
        self.writer = None;
        self.subject.clear();
        self.content.clear();
        self.short_content.clear();
        self.status.deleted = true;
    }

    pub fn board_item(&self) -> BoardItem {
        BoardItem {
            post_id: self.id,
            post_seq: self.seq,
        }
    }
}

impl FeelingTarget for Post {
    fn owner_id(&self) -> Option<&str> {
        self.writer.as_ref().map(|w| w.user_id.as_str())
    }

    fn feelings(&self) -> &Feelings {
        &self.feelings
    }

    fn feelings_mut(&mut self) -> &mut Feelings {
        &mut self.feelings
    }
}

/// Back-reference from a comment or gallery to a post.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BoardItem {
    pub post_id: Uuid,
    pub post_seq: i64,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CommentStatus {
    pub device: Device,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Comment {
    pub id: Uuid,
    board_item: BoardItem,
    pub writer: Writer,
    pub content: String,
    pub status: CommentStatus,
    #[serde(flatten)]
    pub feelings: Feelings,
    pub created_at: DateTime<Utc>,
    #[serde(default)]
    pub version: u64,
}

impl Comment {
    pub fn new(board_item: BoardItem, writer: Writer, content: String, device: Device) -> Self {
        Self {
            id: Uuid::now_v7(),
            board_item,
            writer,
            content,
            status: CommentStatus { device },
            feelings: Feelings::default(),
            created_at: Utc::now(),
            version: 0,
        }
    }

    /// The post this comment belongs to. Fixed at creation.
    pub fn board_item(&self) -> BoardItem {
        self.board_item
    }
}

impl FeelingTarget for Comment {
    fn owner_id(&self) -> Option<&str> {
        Some(self.writer.user_id.as_str())
    }

    fn feelings(&self) -> &Feelings {
        &self.feelings
    }

    fn feelings_mut(&mut self) -> &mut Feelings {
        &mut self.feelings
    }
}

/// Where a gallery was attached from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum GalleryOrigin {
    #[serde(rename = "board-free-origin")]
    BoardFree,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum GalleryState {
    /// Uploaded but not yet attached to anything
    #[default]
    Temp,
    Enable,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GalleryStatus {
    pub from: Option<GalleryOrigin>,
    pub enable_state: GalleryState,
}

/// A photo gallery that posts can link to.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Gallery {
    pub id: Uuid,
    pub name: String,
    pub writer: Option<Writer>,
    pub status: GalleryStatus,
    #[serde(default)]
    pub posts: Vec<BoardItem>,
    #[serde(default)]
    pub version: u64,
}

impl Gallery {
    pub fn new(name: impl Into<String>, writer: Option<Writer>) -> Self {
        Self {
            id: Uuid::now_v7(),
            name: name.into(),
            writer,
            status: GalleryStatus::default(),
            posts: Vec::new(),
            version: 0,
        }
    }

    pub fn links_post(&self, post_id: Uuid) -> bool {
        self.posts.iter().any(|item| item.post_id == post_id)
    }
}

/// A gallery reference submitted together with a post.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GalleryRef {
    pub id: Uuid,
    /// Display name override; empty or missing falls back to the post subject
    pub name: Option<String>,
}

impl GalleryRef {
    pub fn new(id: Uuid) -> Self {
        Self { id, name: None }
    }

    pub fn named(id: Uuid, name: impl Into<String>) -> Self {
        Self {
            id,
            name: Some(name.into()),
        }
    }
}

/// Outcome of a post delete.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum DeleteKind {
    /// Comments exist: the post was redacted and kept
    Content,
    /// No comments: the document was removed
    All,
}

/// Category filter for post listings.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CategoryFilter {
    All,
    Code(String),
}

impl CategoryFilter {
    pub fn matches(&self, category: &str) -> bool {
        match self {
            CategoryFilter::All => true,
            CategoryFilter::Code(code) => code == category,
        }
    }
}

/// Minimal post projection used for rankings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PostSummary {
    pub id: Uuid,
    pub seq: i64,
    pub subject: String,
    pub views: u64,
}

/// A ranked post with the metric it was ranked by (likes or comments).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PostRanking {
    pub id: Uuid,
    pub seq: i64,
    pub subject: String,
    pub views: u64,
    pub count: u64,
}

impl PostRanking {
    pub fn from_summary(summary: PostSummary, count: u64) -> Self {
        Self {
            id: summary.id,
            seq: summary.seq,
            subject: summary.subject,
            views: summary.views,
            count,
        }
    }
}

/// A post together with the galleries it references.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PostDetail {
    pub post: Post,
    pub galleries: Vec<Gallery>,
}

/// One page of a listing. `page` is 1-based.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Page<T> {
    pub items: Vec<T>,
    pub page: u32,
    pub size: u32,
    pub total: u64,
}

impl<T> Page<T> {
    pub fn offset(page: u32, size: u32) -> usize {
        (page.max(1) as usize - 1) * size as usize
    }
}

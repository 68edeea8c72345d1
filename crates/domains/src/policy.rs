//! Tunables shared by the lifecycle services.

use serde::{Deserialize, Serialize};

/// Longest trailing window the rankings accept.
pub const MAX_RANKING_WINDOW_DAYS: i64 = 365;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct BoardPolicy {
    /// Max characters kept in `Post::short_content`
    pub short_content_length: usize,
    /// Entries returned by the weekly top rankings
    pub top_limit: usize,
    /// Trailing window of the weekly rankings
    pub ranking_window_days: i64,
    /// Entries returned by the "latest posts" listing
    pub latest_limit: usize,
    /// Attempts per load-mutate-persist cycle before a write conflict is surfaced
    pub conflict_retry_limit: u32,
    /// Attempts per search index call
    pub search_retry_attempts: u32,
    /// Counter name passed to the sequence counter for post numbers
    pub sequence_name: String,
}

impl Default for BoardPolicy {
    fn default() -> Self {
        Self {
            short_content_length: 100,
            top_limit: 5,
            ranking_window_days: 7,
            latest_limit: 5,
            conflict_retry_limit: 5,
            search_retry_attempts: 3,
            sequence_name: "BOARD_FREE".to_string(),
        }
    }
}

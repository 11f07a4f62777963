use serde::{Deserialize, Serialize};
use time::OffsetDateTime;

/// Timeline event kind emitted when a reviewer is asked to review.
pub const REVIEW_REQUESTED: &str = "review_requested";

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PullRequest {
    pub number: u64,
    pub url: String,
}

/// One raw entry from a pull request's timeline, as the data source hands it over.
///
/// `created_at` is kept as the source's RFC 3339 string; the normalizer
/// decides what to do with records that cannot be parsed.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TimelineEvent {
    pub event: String,
    #[serde(default)]
    pub created_at: Option<String>,
    #[serde(default)]
    pub requested_reviewer: Option<String>,
}

impl TimelineEvent {
    #[cfg(test)]
    pub fn review_requested(login: impl Into<String>, created_at: impl Into<String>) -> Self {
        Self {
            event: REVIEW_REQUESTED.to_string(),
            created_at: Some(created_at.into()),
            requested_reviewer: Some(login.into()),
        }
    }

    pub fn is_review_requested(&self) -> bool {
        self.event == REVIEW_REQUESTED
    }
}

/// A `review_requested` event that survived normalization.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReviewRequested {
    pub login: String,
    pub requested_at: OffsetDateTime,
}

use anyhow::Result;

use crate::domain::timeline::{PullRequest, TimelineEvent};

pub mod github;
pub mod memory;

/// Where pull request, review request and timeline data comes from.
pub trait ReviewSource {
    fn list_open_pull_requests(&self, owner: &str, repo: &str) -> Result<Vec<PullRequest>>;
    /// Logins currently requested as reviewers. May contain repeats.
    fn list_review_request_logins(&self, owner: &str, repo: &str, number: u64)
    -> Result<Vec<String>>;
    fn list_timeline_events(&self, owner: &str, repo: &str, number: u64)
    -> Result<Vec<TimelineEvent>>;
}

use std::path::Path;

use anyhow::{Context, Result, anyhow};
use serde::Deserialize;

use super::ReviewSource;
use crate::domain::timeline::{PullRequest, TimelineEvent};

#[derive(Debug, Clone, Deserialize)]
struct Entry {
    #[serde(flatten)]
    pull_request: PullRequest,
    #[serde(default)]
    reviewers: Vec<String>,
    #[serde(default)]
    timeline: Vec<TimelineEvent>,
    #[serde(skip)]
    fail: bool,
}

#[derive(Debug, Default, Deserialize)]
struct Fixture {
    pull_requests: Vec<Entry>,
}

/// Review data held in memory, either seeded in code or loaded from a JSON fixture.
#[derive(Debug, Default)]
pub struct InMemoryReviewSource {
    entries: Vec<Entry>,
}

impl InMemoryReviewSource {
    #[cfg(test)]
    pub fn with_pull_request(
        mut self,
        pull_request: PullRequest,
        reviewers: &[&str],
        timeline: Vec<TimelineEvent>,
    ) -> Self {
        self.entries.push(Entry {
            pull_request,
            reviewers: reviewers.iter().map(|s| s.to_string()).collect(),
            timeline,
            fail: false,
        });
        self
    }

    /// A pull request whose review requests cannot be fetched.
    #[cfg(test)]
    pub fn with_failing_pull_request(mut self, pull_request: PullRequest) -> Self {
        self.entries.push(Entry {
            pull_request,
            reviewers: Vec::new(),
            timeline: Vec::new(),
            fail: true,
        });
        self
    }

    /// Load `{"pull_requests": [{"number", "url", "reviewers", "timeline"}]}`.
    pub fn open(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("failed to read fixture {}", path.display()))?;
        let fixture: Fixture = serde_json::from_str(&content)
            .with_context(|| format!("failed to parse fixture {}", path.display()))?;
        Ok(Self {
            entries: fixture.pull_requests,
        })
    }

    fn entry(&self, number: u64) -> Result<&Entry> {
        let entry = self
            .entries
            .iter()
            .find(|e| e.pull_request.number == number)
            .ok_or_else(|| anyhow!("pull request #{number} not found"))?;
        if entry.fail {
            return Err(anyhow!("pull request #{number} is unavailable"));
        }
        Ok(entry)
    }
}

impl ReviewSource for InMemoryReviewSource {
    fn list_open_pull_requests(&self, _owner: &str, _repo: &str) -> Result<Vec<PullRequest>> {
        Ok(self.entries.iter().map(|e| e.pull_request.clone()).collect())
    }

    fn list_review_request_logins(
        &self,
        _owner: &str,
        _repo: &str,
        number: u64,
    ) -> Result<Vec<String>> {
        Ok(self.entry(number)?.reviewers.clone())
    }

    fn list_timeline_events(
        &self,
        _owner: &str,
        _repo: &str,
        number: u64,
    ) -> Result<Vec<TimelineEvent>> {
        Ok(self.entry(number)?.timeline.clone())
    }
}

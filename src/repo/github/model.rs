// REST payloads; only the fields the reminder job reads.

use crate::domain::timeline::{PullRequest, TimelineEvent};

#[derive(Debug, serde::Serialize)]
pub struct PageParams {
    pub per_page: u8,
    pub page: u32,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub state: Option<&'static str>,
}

#[derive(Debug, Clone, serde::Deserialize)]
pub struct User {
    pub login: String,
}

#[derive(Debug, Clone, serde::Deserialize)]
pub struct PullRequestItem {
    pub number: u64,
    pub html_url: String,
}

impl From<PullRequestItem> for PullRequest {
    fn from(item: PullRequestItem) -> Self {
        PullRequest {
            number: item.number,
            url: item.html_url,
        }
    }
}

/// `GET /pulls/{n}/requested_reviewers`. Team requests are not addressable
/// reviewers for this job and are ignored.
#[derive(Debug, Clone, Default, serde::Deserialize)]
pub struct RequestedReviewers {
    #[serde(default)]
    pub users: Vec<User>,
}

impl RequestedReviewers {
    pub fn logins(self) -> Vec<String> {
        self.users.into_iter().map(|u| u.login).collect()
    }
}

#[derive(Debug, Clone, serde::Deserialize)]
pub struct TimelineItem {
    #[serde(default)]
    pub event: Option<String>,
    #[serde(default)]
    pub created_at: Option<String>,
    #[serde(default)]
    pub requested_reviewer: Option<User>,
}

impl From<TimelineItem> for TimelineEvent {
    fn from(item: TimelineItem) -> Self {
        TimelineEvent {
            event: item.event.unwrap_or_default(),
            created_at: item.created_at,
            requested_reviewer: item.requested_reviewer.map(|u| u.login),
        }
    }
}

pub mod auth;
pub mod model;

use anyhow::{Result, anyhow};
use model::{PageParams, PullRequestItem, RequestedReviewers, TimelineItem};
use octocrab::Octocrab;
use serde::de::DeserializeOwned;
use tokio::runtime::Runtime;
use tracing::debug;

use super::ReviewSource;
use crate::domain::timeline::{PullRequest, TimelineEvent};

const PAGE_SIZE: u8 = 100;

async fn fetch_all_pages<T: DeserializeOwned>(
    octo: &Octocrab,
    route: &str,
    state: Option<&'static str>,
) -> Result<Vec<T>> {
    let mut out = Vec::new();
    let mut page = 1;
    loop {
        let params = PageParams {
            per_page: PAGE_SIZE,
            page,
            state,
        };
        let items: Vec<T> = octo
            .get(route, Some(&params))
            .await
            .map_err(|e| anyhow!("GitHub request {route} (page {page}) failed: {e:?}"))?;
        let fetched = items.len();
        out.extend(items);
        if fetched < usize::from(PAGE_SIZE) {
            break;
        }
        page += 1;
    }
    debug!(route, pages = page, items = out.len(), "fetched");
    Ok(out)
}

pub async fn list_open_pull_requests(
    octo: &Octocrab,
    owner: &str,
    repo: &str,
) -> Result<Vec<PullRequest>> {
    let route = format!("/repos/{owner}/{repo}/pulls");
    let items: Vec<PullRequestItem> = fetch_all_pages(octo, &route, Some("open")).await?;
    Ok(items.into_iter().map(Into::into).collect())
}

pub async fn list_review_request_logins(
    octo: &Octocrab,
    owner: &str,
    repo: &str,
    number: u64,
) -> Result<Vec<String>> {
    let route = format!("/repos/{owner}/{repo}/pulls/{number}/requested_reviewers");
    let reviewers: RequestedReviewers = octo
        .get(&route, None::<&()>)
        .await
        .map_err(|e| anyhow!("GitHub request {route} failed: {e:?}"))?;
    Ok(reviewers.logins())
}

pub async fn list_timeline_events(
    octo: &Octocrab,
    owner: &str,
    repo: &str,
    number: u64,
) -> Result<Vec<TimelineEvent>> {
    let route = format!("/repos/{owner}/{repo}/issues/{number}/timeline");
    let items: Vec<TimelineItem> = fetch_all_pages(octo, &route, None).await?;
    Ok(items.into_iter().map(Into::into).collect())
}

/// Synchronous facade over the GitHub REST API that owns its own Tokio runtime.
pub struct GitHubReviewSource {
    octo: Octocrab,
    rt: Runtime,
}

impl GitHubReviewSource {
    pub fn new(token: &str, api_base: Option<String>) -> Result<Self> {
        let token = token.to_owned();
        let rt = tokio::runtime::Builder::new_multi_thread()
            .enable_all()
            .build()
            .map_err(|e| anyhow!("failed to build tokio runtime: {e}"))?;

        let octo = rt.block_on(async move {
            let mut builder = Octocrab::builder().personal_token(token);
            if let Some(api) = api_base {
                builder = builder
                    .base_uri(api)
                    .map_err(|e| anyhow!("invalid GITHUB_API_URL: {e}"))?;
            }
            builder
                .build()
                .map_err(|e| anyhow!("failed to init GitHub client: {e}"))
        })?;

        Ok(Self { octo, rt })
    }
}

impl ReviewSource for GitHubReviewSource {
    fn list_open_pull_requests(&self, owner: &str, repo: &str) -> Result<Vec<PullRequest>> {
        self.rt
            .block_on(list_open_pull_requests(&self.octo, owner, repo))
    }

    fn list_review_request_logins(
        &self,
        owner: &str,
        repo: &str,
        number: u64,
    ) -> Result<Vec<String>> {
        self.rt
            .block_on(list_review_request_logins(&self.octo, owner, repo, number))
    }

    fn list_timeline_events(
        &self,
        owner: &str,
        repo: &str,
        number: u64,
    ) -> Result<Vec<TimelineEvent>> {
        self.rt
            .block_on(list_timeline_events(&self.octo, owner, repo, number))
    }
}

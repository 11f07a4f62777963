use anyhow::{Context, Result};
use time::OffsetDateTime;
use tracing::{debug, info, warn};

use super::normalize::normalize;
use crate::config::RunConfig;
use crate::domain::reminder::{Reminder, ReminderSet};
use crate::domain::timeline::{PullRequest, TimelineEvent};
use crate::domain::window::WindowPolicy;
use crate::repo::ReviewSource;

/// Everything the aggregator needs to know about one open pull request.
#[derive(Debug, Clone)]
pub struct PullRequestActivity {
    pub pull_request: PullRequest,
    /// Reviewer logins currently requested on the pull request.
    pub reviewers: Vec<String>,
    pub timeline: Vec<TimelineEvent>,
}

/// Build the per-reviewer reminder set from already fetched pull request data.
///
/// Pull requests are folded in the order given, so each login's list follows
/// that order. A pull request without requested reviewers contributes nothing.
pub fn aggregate<I>(activities: I, policy: &WindowPolicy, now: OffsetDateTime) -> ReminderSet
where
    I: IntoIterator<Item = PullRequestActivity>,
{
    let mut reminders = ReminderSet::new();
    for activity in activities {
        fold_pull_request(&mut reminders, &activity, policy, now);
    }
    reminders
}

fn fold_pull_request(
    reminders: &mut ReminderSet,
    activity: &PullRequestActivity,
    policy: &WindowPolicy,
    now: OffsetDateTime,
) {
    let number = activity.pull_request.number;
    if activity.reviewers.is_empty() {
        debug!(number, "no requested reviewers; skipping");
        return;
    }
    for login in &activity.reviewers {
        reminders.ensure_recipient(login);
    }

    for request in normalize(&activity.timeline, policy, now) {
        if !activity.reviewers.contains(&request.login) {
            // Timeline names someone who is no longer a requested reviewer
            // (already reviewed or removed).
            debug!(number, login = %request.login, "review request is no longer live");
            continue;
        }
        reminders.push(
            &request.login,
            Reminder {
                link: activity.pull_request.url.clone(),
                requested_at: request.requested_at,
            },
        );
    }
}

/// Order-preserving dedup; the source may repeat a login.
pub fn dedup_logins(logins: Vec<String>) -> Vec<String> {
    let mut out: Vec<String> = Vec::with_capacity(logins.len());
    for login in logins {
        if !out.contains(&login) {
            out.push(login);
        }
    }
    out
}

/// Fetch every open pull request of the configured repository and compute its reminders.
///
/// `now` is captured once by the caller and used for every window comparison.
pub fn compute_reminders<S: ReviewSource + ?Sized>(
    source: &S,
    config: &RunConfig,
    now: OffsetDateTime,
) -> Result<ReminderSet> {
    let (owner, repo) = (config.owner.as_str(), config.repo.as_str());
    let pull_requests = source
        .list_open_pull_requests(owner, repo)
        .with_context(|| format!("failed to list open pull requests for {owner}/{repo}"))?;
    info!(
        repository = %config.repository(),
        open = pull_requests.len(),
        window = %config.window.describe(),
        "computing review reminders"
    );

    let mut activities = Vec::with_capacity(pull_requests.len());
    for pull_request in pull_requests {
        match fetch_activity(source, owner, repo, pull_request) {
            Ok(activity) => activities.push(activity),
            Err(e) if config.best_effort => {
                warn!("skipping pull request: {e:#}");
            }
            Err(e) => return Err(e),
        }
    }

    let mut reminders = aggregate(activities, &config.window, now);
    if config.prune_empty {
        let pruned = reminders.prune_empty();
        debug!(pruned, "dropped reviewers without reminders");
    }
    for (login, pending) in reminders.iter() {
        debug!(login, pending = pending.len());
    }
    info!(
        reviewers = reminders.len(),
        reminders = reminders.total_reminders(),
        "review reminders computed"
    );
    Ok(reminders)
}

fn fetch_activity<S: ReviewSource + ?Sized>(
    source: &S,
    owner: &str,
    repo: &str,
    pull_request: PullRequest,
) -> Result<PullRequestActivity> {
    let number = pull_request.number;
    let reviewers = source
        .list_review_request_logins(owner, repo, number)
        .with_context(|| format!("failed to list review requests for #{number}"))?;
    let reviewers = dedup_logins(reviewers);

    let timeline = if reviewers.is_empty() {
        Vec::new()
    } else {
        source
            .list_timeline_events(owner, repo, number)
            .with_context(|| format!("failed to list timeline events for #{number}"))?
    };

    Ok(PullRequestActivity {
        pull_request,
        reviewers,
        timeline,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::repo::memory::InMemoryReviewSource;
    use crate::timeutil::format_github_datetime;
    use time::Duration;
    use time::macros::datetime;

    const NOW: OffsetDateTime = datetime!(2024-05-22 12:00 UTC);
    const EIGHT_HOURS: WindowPolicy = WindowPolicy::ReminderAfter { hours: 8 };

    fn at(h: i64) -> OffsetDateTime {
        NOW - Duration::hours(h)
    }

    fn requested(login: &str, h: i64) -> TimelineEvent {
        TimelineEvent::review_requested(login, format_github_datetime(at(h)))
    }

    fn pr(number: u64) -> PullRequest {
        PullRequest {
            number,
            url: format!("https://github.com/acme/widgets/pull/{number}"),
        }
    }

    fn activity(number: u64, reviewers: &[&str], timeline: Vec<TimelineEvent>) -> PullRequestActivity {
        PullRequestActivity {
            pull_request: pr(number),
            reviewers: reviewers.iter().map(|s| s.to_string()).collect(),
            timeline,
        }
    }

    fn config(window: WindowPolicy) -> RunConfig {
        RunConfig {
            owner: "acme".to_string(),
            repo: "widgets".to_string(),
            window,
            prune_empty: false,
            best_effort: false,
        }
    }

    #[test]
    fn scenario_single_pending_request() {
        let set = aggregate(
            vec![activity(42, &["alice"], vec![requested("alice", 10)])],
            &EIGHT_HOURS,
            NOW,
        );
        assert_eq!(
            set.get("alice"),
            Some(
                &[Reminder {
                    link: pr(42).url,
                    requested_at: at(10),
                }][..]
            )
        );
    }

    #[test]
    fn scenario_rerequest_inside_threshold() {
        let set = aggregate(
            vec![activity(7, &["bob"], vec![requested("bob", 20), requested("bob", 5)])],
            &EIGHT_HOURS,
            NOW,
        );
        let bob = set.get("bob").unwrap();
        assert_eq!(bob.len(), 1);
        assert_eq!(bob[0].requested_at, at(20));
    }

    #[test]
    fn scenario_live_reviewer_without_timeline_keeps_empty_key() {
        let commented = TimelineEvent {
            event: "commented".to_string(),
            created_at: Some(format_github_datetime(at(30))),
            requested_reviewer: None,
        };
        let set = aggregate(vec![activity(9, &["carol"], vec![commented])], &EIGHT_HOURS, NOW);
        assert_eq!(set.get("carol"), Some(&[][..]));
        assert_eq!(set.total_reminders(), 0);
    }

    #[test]
    fn scenario_reviewer_on_two_pull_requests() {
        let set = aggregate(
            vec![
                activity(1, &["dave"], vec![requested("dave", 30)]),
                activity(2, &["dave"], vec![requested("dave", 12)]),
            ],
            &EIGHT_HOURS,
            NOW,
        );
        let links: Vec<_> = set.get("dave").unwrap().iter().map(|r| r.link.as_str()).collect();
        assert_eq!(
            links,
            vec![
                "https://github.com/acme/widgets/pull/1",
                "https://github.com/acme/widgets/pull/2"
            ]
        );
    }

    #[test]
    fn pull_request_without_reviewers_contributes_nothing() {
        let set = aggregate(
            vec![activity(3, &[], vec![requested("erin", 40)])],
            &EIGHT_HOURS,
            NOW,
        );
        assert!(set.is_empty());
    }

    #[test]
    fn timeline_login_that_is_no_longer_requested_is_ignored() {
        let set = aggregate(
            vec![activity(5, &["alice"], vec![requested("alice", 10), requested("mallory", 10)])],
            &EIGHT_HOURS,
            NOW,
        );
        assert!(!set.contains("mallory"));
        assert_eq!(set.get("alice").map(<[Reminder]>::len), Some(1));
    }

    #[test]
    fn live_request_elsewhere_does_not_leak_into_other_pull_requests() {
        let set = aggregate(
            vec![
                activity(1, &["mallory"], vec![requested("mallory", 10)]),
                activity(2, &["alice"], vec![requested("mallory", 10)]),
            ],
            &EIGHT_HOURS,
            NOW,
        );
        let links: Vec<_> = set.get("mallory").unwrap().iter().map(|r| r.link.as_str()).collect();
        assert_eq!(links, vec!["https://github.com/acme/widgets/pull/1"]);
        assert_eq!(set.get("alice"), Some(&[][..]));
    }

    #[test]
    fn aggregate_is_idempotent() {
        let input = vec![
            activity(1, &["alice", "bob"], vec![requested("alice", 10), requested("bob", 3)]),
            activity(2, &["bob"], vec![requested("bob", 50)]),
        ];
        let first = aggregate(input.clone(), &EIGHT_HOURS, NOW);
        let second = aggregate(input, &EIGHT_HOURS, NOW);
        assert_eq!(first, second);
    }

    #[test]
    fn dedup_logins_preserves_first_seen_order() {
        let logins = vec!["b".to_string(), "a".to_string(), "b".to_string()];
        assert_eq!(dedup_logins(logins), vec!["b".to_string(), "a".to_string()]);
    }

    #[test]
    fn compute_reminders_reads_through_source() {
        let source = InMemoryReviewSource::default()
            .with_pull_request(pr(42), &["alice", "alice"], vec![requested("alice", 10)])
            .with_pull_request(pr(43), &[], vec![requested("zoe", 10)])
            .with_pull_request(pr(44), &["carol"], Vec::new());

        let set = compute_reminders(&source, &config(EIGHT_HOURS), NOW).unwrap();
        assert_eq!(set.logins().collect::<Vec<_>>(), vec!["alice", "carol"]);
        assert_eq!(set.get("alice").map(<[Reminder]>::len), Some(1));
        assert_eq!(set.get("carol"), Some(&[][..]));
    }

    #[test]
    fn compute_reminders_prunes_when_configured() {
        let source = InMemoryReviewSource::default()
            .with_pull_request(pr(44), &["carol"], Vec::new());
        let mut cfg = config(EIGHT_HOURS);
        cfg.prune_empty = true;

        let set = compute_reminders(&source, &cfg, NOW).unwrap();
        assert!(set.is_empty());
    }

    #[test]
    fn source_failure_aborts_the_run() {
        let source = InMemoryReviewSource::default()
            .with_pull_request(pr(1), &["alice"], vec![requested("alice", 10)])
            .with_failing_pull_request(pr(2));

        let err = compute_reminders(&source, &config(EIGHT_HOURS), NOW).unwrap_err();
        assert!(format!("{err:#}").contains("#2"));
    }

    #[test]
    fn best_effort_skips_failing_pull_requests() {
        let source = InMemoryReviewSource::default()
            .with_pull_request(pr(1), &["alice"], vec![requested("alice", 10)])
            .with_failing_pull_request(pr(2));
        let mut cfg = config(EIGHT_HOURS);
        cfg.best_effort = true;

        let set = compute_reminders(&source, &cfg, NOW).unwrap();
        assert_eq!(set.total_reminders(), 1);
    }
}

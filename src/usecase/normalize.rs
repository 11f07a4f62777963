use std::collections::HashSet;

use time::OffsetDateTime;
use tracing::{debug, warn};

use crate::domain::timeline::{ReviewRequested, TimelineEvent};
use crate::domain::window::WindowPolicy;
use crate::timeutil::parse_github_datetime;

/// Reduce a pull request timeline to at most one review request per reviewer.
///
/// Only `review_requested` events are considered. They are walked most recent
/// first (stable, so equal timestamps keep their timeline order) and the first
/// in-window event per login wins. Output is most recent first.
pub fn normalize(
    events: &[TimelineEvent],
    policy: &WindowPolicy,
    now: OffsetDateTime,
) -> Vec<ReviewRequested> {
    let mut requests: Vec<ReviewRequested> = events
        .iter()
        .filter(|e| e.is_review_requested())
        .filter_map(to_review_requested)
        .collect();

    requests.sort_by(|a, b| b.requested_at.cmp(&a.requested_at));

    let mut seen: HashSet<String> = HashSet::new();
    let mut out = Vec::new();
    for request in requests {
        if seen.contains(&request.login) {
            continue;
        }
        if !policy.includes(request.requested_at, now) {
            continue;
        }
        seen.insert(request.login.clone());
        out.push(request);
    }
    out
}

fn to_review_requested(event: &TimelineEvent) -> Option<ReviewRequested> {
    let Some(login) = event.requested_reviewer.as_deref() else {
        debug!("skipping review request without a user reviewer (team request?)");
        return None;
    };
    let Some(raw) = event.created_at.as_deref() else {
        warn!(login, "review_requested event has no created_at; ignoring it");
        return None;
    };
    let Some(requested_at) = parse_github_datetime(raw) else {
        warn!(login, created_at = raw, "review_requested event has an unparseable created_at; ignoring it");
        return None;
    };
    Some(ReviewRequested {
        login: login.to_string(),
        requested_at,
    })
}

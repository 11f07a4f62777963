// GitHub timestamps are RFC 3339 ("2024-05-22T09:56:00Z", sometimes with
// fractional seconds or an explicit offset).

use time::OffsetDateTime;
use time::format_description::well_known::Rfc3339;

pub fn parse_github_datetime(s: &str) -> Option<OffsetDateTime> {
    OffsetDateTime::parse(s.trim(), &Rfc3339).ok()
}

pub fn format_github_datetime(ts: OffsetDateTime) -> String {
    ts.format(&Rfc3339).unwrap_or_else(|_| ts.to_string())
}

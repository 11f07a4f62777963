use time::{Duration, OffsetDateTime};

/// Time-based predicate deciding whether a review request is reminder-worthy this run.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WindowPolicy {
    /// Keep requests that have been pending for at least `hours`.
    ReminderAfter { hours: u32 },
    /// Keep requests made less than `hours` ago.
    MinimumElapsed { hours: u32 },
}

impl Default for WindowPolicy {
    fn default() -> Self {
        WindowPolicy::ReminderAfter { hours: 24 }
    }
}

impl WindowPolicy {
    pub fn hours(&self) -> u32 {
        match self {
            WindowPolicy::ReminderAfter { hours } | WindowPolicy::MinimumElapsed { hours } => *hours,
        }
    }

    /// `now - hours`; the boundary every comparison is made against.
    pub fn cutoff(&self, now: OffsetDateTime) -> OffsetDateTime {
        now - Duration::hours(i64::from(self.hours()))
    }

    pub fn includes(&self, created_at: OffsetDateTime, now: OffsetDateTime) -> bool {
        let cutoff = self.cutoff(now);
        match self {
            WindowPolicy::ReminderAfter { .. } => created_at <= cutoff,
            WindowPolicy::MinimumElapsed { .. } => created_at > cutoff,
        }
    }

    pub fn describe(&self) -> String {
        match self {
            WindowPolicy::ReminderAfter { hours } => format!("pending for at least {hours}h"),
            WindowPolicy::MinimumElapsed { hours } => format!("requested within the last {hours}h"),
        }
    }
}

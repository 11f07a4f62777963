use std::collections::BTreeMap;

use serde::Serialize;
use time::OffsetDateTime;

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Reminder {
    pub link: String,
    #[serde(with = "time::serde::rfc3339")]
    pub requested_at: OffsetDateTime,
}

/// Pending reminders keyed by reviewer login.
///
/// A login is present once it is a live reviewer on some pull request, even
/// if none of its requests survived the window (see [`ReminderSet::prune_empty`]).
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct ReminderSet {
    by_login: BTreeMap<String, Vec<Reminder>>,
}

impl ReminderSet {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn ensure_recipient(&mut self, login: &str) {
        if !self.by_login.contains_key(login) {
            self.by_login.insert(login.to_string(), Vec::new());
        }
    }

    pub fn push(&mut self, login: &str, reminder: Reminder) {
        self.by_login
            .entry(login.to_string())
            .or_default()
            .push(reminder);
    }

    #[cfg(test)]
    pub fn get(&self, login: &str) -> Option<&[Reminder]> {
        self.by_login.get(login).map(Vec::as_slice)
    }

    #[cfg(test)]
    pub fn contains(&self, login: &str) -> bool {
        self.by_login.contains_key(login)
    }

    pub fn logins(&self) -> impl Iterator<Item = &str> {
        self.by_login.keys().map(String::as_str)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &[Reminder])> {
        self.by_login
            .iter()
            .map(|(login, reminders)| (login.as_str(), reminders.as_slice()))
    }

    /// Number of logins, including ones with no reminders.
    pub fn len(&self) -> usize {
        self.by_login.len()
    }

    pub fn is_empty(&self) -> bool {
        self.by_login.is_empty()
    }

    pub fn total_reminders(&self) -> usize {
        self.by_login.values().map(Vec::len).sum()
    }

    /// Drop logins that ended up with no reminders. Returns how many were removed.
    pub fn prune_empty(&mut self) -> usize {
        let before = self.by_login.len();
        self.by_login.retain(|_, reminders| !reminders.is_empty());
        before - self.by_login.len()
    }
}

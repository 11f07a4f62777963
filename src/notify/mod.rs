use std::io::Write;
use std::time::Duration;

use anyhow::{Context, Result};
use serde_json::{Map, Value};
use tracing::info;

use crate::domain::reminder::ReminderSet;

pub mod email;

const TIMEOUT: Duration = Duration::from_secs(5);

/// Consumer of a computed reminder set.
pub trait ReminderSink {
    fn deliver(&self, repository: &str, reminders: &ReminderSet) -> Result<()>;
}

/// `{"repository": "owner/name", "reminders": {login: [{link, requested_at}]}}`
pub fn render_json(repository: &str, reminders: &ReminderSet, include_empty: bool) -> Result<Value> {
    let mut by_login = Map::new();
    for (login, list) in reminders.iter() {
        if list.is_empty() && !include_empty {
            continue;
        }
        by_login.insert(login.to_string(), serde_json::to_value(list)?);
    }
    Ok(serde_json::json!({
        "repository": repository,
        "reminders": by_login,
    }))
}

/// Pretty-printed JSON on stdout, empty reviewers included.
pub struct StdoutSink;

impl ReminderSink for StdoutSink {
    fn deliver(&self, repository: &str, reminders: &ReminderSet) -> Result<()> {
        let payload = render_json(repository, reminders, true)?;
        let mut out = std::io::stdout().lock();
        serde_json::to_writer_pretty(&mut out, &payload)?;
        writeln!(out)?;
        Ok(())
    }
}

/// POSTs the reminder set as JSON. Reviewers without reminders are left out
/// and nothing is sent when no one has a reminder.
pub struct WebhookSink {
    url: String,
}

impl WebhookSink {
    pub fn new(url: impl Into<String>) -> Self {
        Self { url: url.into() }
    }
}

impl ReminderSink for WebhookSink {
    fn deliver(&self, repository: &str, reminders: &ReminderSet) -> Result<()> {
        if reminders.total_reminders() == 0 {
            info!("no pending reminders; webhook not called");
            return Ok(());
        }
        let body = serde_json::to_string(&render_json(repository, reminders, false)?)?;
        let agent = ureq::Agent::config_builder()
            .timeout_global(Some(TIMEOUT))
            .build()
            .new_agent();
        agent
            .post(&self.url)
            .header("Content-Type", "application/json")
            .send(&body)
            .with_context(|| format!("failed to POST reminders to {}", self.url))?;
        info!(url = %self.url, reviewers = reminders.len(), "reminders delivered to webhook");
        Ok(())
    }
}

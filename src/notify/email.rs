use std::fmt::Write as _;

use anyhow::{Context, Result, anyhow};
use lettre::message::Mailbox;
use lettre::message::header::ContentType;
use lettre::transport::smtp::authentication::Credentials;
use lettre::{Address, Message, SmtpTransport, Transport};
use tracing::{info, warn};

use super::{ReminderSink, TIMEOUT};
use crate::config::EmailSettings;
use crate::directory::Directory;
use crate::domain::reminder::{Reminder, ReminderSet};
use crate::timeutil::format_github_datetime;

const SUBJECT: &str = "Pull Requests awaiting your review";

/// One email per reviewer with pending reminders, addressed through the user directory.
///
/// Reviewers without reminders get nothing. A reviewer missing from the
/// directory is logged and skipped; the others are still sent.
pub struct EmailSink<T> {
    transport: T,
    from: Mailbox,
    directory: Directory,
}

impl EmailSink<SmtpTransport> {
    /// STARTTLS relay with username/password authentication.
    pub fn smtp(settings: &EmailSettings, directory: Directory) -> Result<Self> {
        let transport = SmtpTransport::starttls_relay(&settings.host)
            .with_context(|| format!("invalid SMTP host {}", settings.host))?
            .port(settings.port)
            .credentials(Credentials::new(
                settings.username.clone(),
                settings.password.clone(),
            ))
            .timeout(Some(TIMEOUT))
            .build();
        Self::new(transport, &settings.from, directory)
    }
}

impl<T> EmailSink<T> {
    pub fn new(transport: T, from: &str, directory: Directory) -> Result<Self> {
        let from: Mailbox = from
            .parse()
            .map_err(|e| anyhow!("invalid sender address {from:?}: {e}"))?;
        Ok(Self {
            transport,
            from,
            directory,
        })
    }
}

pub fn compose(from: &Mailbox, login: &str, address: &str, reminders: &[Reminder]) -> Result<Message> {
    let address: Address = address
        .parse()
        .map_err(|e| anyhow!("invalid email address {address:?} for {login}: {e}"))?;

    Message::builder()
        .from(from.clone())
        .to(Mailbox::new(Some(login.to_string()), address))
        .subject(SUBJECT)
        .header(ContentType::TEXT_PLAIN)
        .body(render_body(reminders))
        .with_context(|| format!("failed to build email for {login}"))
}

pub fn render_body(reminders: &[Reminder]) -> String {
    let mut body = String::from(
        "Please take some time to revisit the following Pull Requests,\nwhich are awaiting your review:\n\n",
    );
    for reminder in reminders {
        let _ = writeln!(
            body,
            "- {}\n  review requested on {}",
            reminder.link,
            format_github_datetime(reminder.requested_at)
        );
    }
    body
}

impl<T> ReminderSink for EmailSink<T>
where
    T: Transport,
    T::Error: std::error::Error + Send + Sync + 'static,
{
    fn deliver(&self, repository: &str, reminders: &ReminderSet) -> Result<()> {
        let mut sent = 0usize;
        let mut unknown = 0usize;
        for (login, list) in reminders.iter() {
            if list.is_empty() {
                continue;
            }
            let Some(address) = self.directory.email_for(login) else {
                warn!(login, "reviewer has no entry in the user directory; email not sent");
                unknown += 1;
                continue;
            };
            let message = compose(&self.from, login, address, list)?;
            self.transport
                .send(&message)
                .with_context(|| format!("failed to email reminders to {login}"))?;
            sent += 1;
        }
        info!(repository, sent, unknown, "reminder emails delivered");
        Ok(())
    }
}

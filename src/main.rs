mod config;
mod directory;
mod domain;
mod notify;
mod repo;
mod timeutil;
mod usecase;

use anyhow::Result;
use clap::Parser;
use time::OffsetDateTime;
use tracing::{debug, info, warn};
use tracing_subscriber::EnvFilter;

use config::{Args, RunConfig};
use directory::Directory;
use notify::email::EmailSink;
use notify::{ReminderSink, StdoutSink, WebhookSink};
use repo::ReviewSource;
use repo::github::GitHubReviewSource;
use repo::github::auth::resolve_github_token;
use repo::memory::InMemoryReviewSource;
use usecase::aggregate::compute_reminders;

fn main() -> Result<()> {
    init_logging();
    let args = Args::parse();
    let config = RunConfig::try_from(&args)?;

    let source: Box<dyn ReviewSource> = if let Some(path) = args.fixture.as_ref() {
        Box::new(InMemoryReviewSource::open(path)?)
    } else {
        let token = resolve_github_token(args.token.as_deref())?;
        Box::new(GitHubReviewSource::new(&token, args.api_base.clone())?)
    };

    let now = OffsetDateTime::now_utc();
    let reminders = compute_reminders(source.as_ref(), &config, now)?;

    if reminders.is_empty() {
        info!("no live review requests");
    }
    debug!(recipients = ?reminders.logins().collect::<Vec<_>>());

    let repository = config.repository();
    for sink in build_sinks(&args)? {
        sink.deliver(&repository, &reminders)?;
    }
    info!(
        repository = %repository,
        reviewers = reminders.len(),
        reminders = reminders.total_reminders(),
        "reminder run finished"
    );
    Ok(())
}

// Stdout when nothing else is configured or on --dry-run.
fn build_sinks(args: &Args) -> Result<Vec<Box<dyn ReminderSink>>> {
    let mut sinks: Vec<Box<dyn ReminderSink>> = Vec::new();
    if args.dry_run {
        sinks.push(Box::new(StdoutSink));
        return Ok(sinks);
    }
    if let Some(url) = args.webhook_url.as_deref() {
        sinks.push(Box::new(WebhookSink::new(url)));
    }
    if let Some(settings) = args.email_settings()? {
        let directory = Directory::open(&settings.user_data)?;
        if directory.is_empty() {
            warn!(path = %settings.user_data.display(), "user directory has no entries");
        }
        debug!(entries = directory.len(), "user directory loaded");
        sinks.push(Box::new(EmailSink::smtp(&settings, directory)?));
    }
    if sinks.is_empty() {
        sinks.push(Box::new(StdoutSink));
    }
    Ok(sinks)
}

// Logs go to stderr; stdout carries the reminder JSON.
fn init_logging() {
    let filter = EnvFilter::try_from_env("REVIEW_REMINDER_LOG")
        .unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

use std::path::PathBuf;

use anyhow::{Result, anyhow};
use clap::Parser;

use crate::domain::window::WindowPolicy;

#[derive(Parser, Debug)]
#[command(author, version, about = "review-reminder — nudge reviewers about pull requests waiting on them", long_about = None)]
pub struct Args {
    /// Repository to scan, as `owner/name`
    #[arg(long, env = "GITHUB_REPOSITORY")]
    pub repository: String,

    /// Remind about requests pending for at least this many hours (default 24)
    #[arg(long, env = "INPUT_HOURS_UNTIL_REMINDER", conflicts_with = "minimum_elapsed_hours")]
    pub hours_until_reminder: Option<u32>,

    /// Only consider requests made within this many hours
    #[arg(long, env = "INPUT_MINIMUM_ELAPSED_HOURS")]
    pub minimum_elapsed_hours: Option<u32>,

    /// GitHub API base URL (GitHub Enterprise)
    #[arg(long, env = "GITHUB_API_URL")]
    pub api_base: Option<String>,

    /// GitHub token (default: INPUT_GITHUB_ACCESS_TOKEN, GITHUB_TOKEN, then `gh auth token`)
    #[arg(long)]
    pub token: Option<String>,

    /// Read pull requests from a JSON fixture instead of GitHub
    #[arg(long)]
    pub fixture: Option<PathBuf>,

    /// POST the reminder set as JSON to this URL
    #[arg(long, env = "INPUT_WEBHOOK_URL")]
    pub webhook_url: Option<String>,

    /// SMTP relay used for reminder emails
    #[arg(long, env = "INPUT_SMTP_HOST", default_value = "smtp.mailgun.org")]
    pub smtp_host: String,

    #[arg(long, env = "INPUT_SMTP_PORT", default_value_t = 587)]
    pub smtp_port: u16,

    /// SMTP username; setting it enables email delivery
    #[arg(long, env = "INPUT_SMTP_USERNAME")]
    pub smtp_username: Option<String>,

    #[arg(long, env = "INPUT_SMTP_PASSWORD", hide_env_values = true)]
    pub smtp_password: Option<String>,

    /// Sender of reminder emails, e.g. `Review Bot <bot@example.com>`
    #[arg(long, env = "INPUT_EMAIL_FROM")]
    pub email_from: Option<String>,

    /// JSON file mapping GitHub logins to email addresses
    #[arg(long, env = "INPUT_USER_DATA", default_value = "/user-data.json")]
    pub user_data: PathBuf,

    /// Drop reviewers that have no pending reminders
    #[arg(long, default_value_t = false)]
    pub prune_empty: bool,

    /// Skip pull requests whose data cannot be fetched instead of failing the run
    #[arg(long, default_value_t = false)]
    pub best_effort: bool,

    /// Print the reminder set instead of sending it
    #[arg(long, default_value_t = false)]
    pub dry_run: bool,
}

/// What `compute_reminders` needs for one run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RunConfig {
    pub owner: String,
    pub repo: String,
    pub window: WindowPolicy,
    /// Drop logins with no reminders. Off by default: every live reviewer is a key.
    pub prune_empty: bool,
    pub best_effort: bool,
}

/// SMTP delivery settings, present only when a username was given.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EmailSettings {
    pub host: String,
    pub port: u16,
    pub username: String,
    pub password: String,
    pub from: String,
    pub user_data: PathBuf,
}

impl Args {
    pub fn email_settings(&self) -> Result<Option<EmailSettings>> {
        let Some(username) = self.smtp_username.as_deref().map(str::trim) else {
            return Ok(None);
        };
        if username.is_empty() {
            return Ok(None);
        }
        let password = self
            .smtp_password
            .clone()
            .ok_or_else(|| anyhow!("SMTP password is required when an SMTP username is set"))?;
        let from = self
            .email_from
            .clone()
            .ok_or_else(|| anyhow!("--email-from is required when an SMTP username is set"))?;
        Ok(Some(EmailSettings {
            host: self.smtp_host.clone(),
            port: self.smtp_port,
            username: username.to_string(),
            password,
            from,
            user_data: self.user_data.clone(),
        }))
    }
}

impl RunConfig {
    pub fn repository(&self) -> String {
        format!("{}/{}", self.owner, self.repo)
    }
}

impl TryFrom<&Args> for RunConfig {
    type Error = anyhow::Error;

    fn try_from(args: &Args) -> Result<Self> {
        let (owner, repo) = parse_repository(&args.repository)?;
        Ok(Self {
            owner,
            repo,
            window: window_policy(args.hours_until_reminder, args.minimum_elapsed_hours),
            prune_empty: args.prune_empty,
            best_effort: args.best_effort,
        })
    }
}

fn window_policy(hours_until_reminder: Option<u32>, minimum_elapsed_hours: Option<u32>) -> WindowPolicy {
    match (hours_until_reminder, minimum_elapsed_hours) {
        (Some(hours), _) => WindowPolicy::ReminderAfter { hours },
        (None, Some(hours)) => WindowPolicy::MinimumElapsed { hours },
        (None, None) => WindowPolicy::default(),
    }
}

pub fn parse_repository(raw: &str) -> Result<(String, String)> {
    let raw = raw.trim();
    let (owner, repo) = raw
        .split_once('/')
        .ok_or_else(|| anyhow!("repository must be `owner/name`, got {raw:?}"))?;
    if owner.is_empty() || repo.is_empty() || repo.contains('/') {
        return Err(anyhow!("repository must be `owner/name`, got {raw:?}"));
    }
    Ok((owner.to_string(), repo.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn args(extra: &[&str]) -> Result<Args> {
        let argv = ["review-reminder", "--repository", "acme/widgets"]
            .into_iter()
            .chain(extra.iter().copied());
        Ok(Args::try_parse_from(argv)?)
    }

    fn parse(extra: &[&str]) -> Result<RunConfig> {
        RunConfig::try_from(&args(extra)?)
    }

    #[test]
    fn repository_is_split_into_owner_and_name() {
        assert_eq!(
            parse_repository("acme/widgets").unwrap(),
            ("acme".to_string(), "widgets".to_string())
        );
        assert!(parse_repository("acme").is_err());
        assert!(parse_repository("/widgets").is_err());
        assert!(parse_repository("acme/widgets/extra").is_err());
    }

    #[test]
    fn hours_until_reminder_selects_reminder_after_window() {
        let cfg = parse(&["--hours-until-reminder", "8"]).unwrap();
        assert_eq!(cfg.window, WindowPolicy::ReminderAfter { hours: 8 });
        assert_eq!(cfg.repository(), "acme/widgets");
        assert!(!cfg.prune_empty);
    }

    #[test]
    fn minimum_elapsed_hours_selects_minimum_elapsed_window() {
        let cfg = parse(&["--minimum-elapsed-hours", "72", "--prune-empty"]).unwrap();
        assert_eq!(cfg.window, WindowPolicy::MinimumElapsed { hours: 72 });
        assert!(cfg.prune_empty);
    }

    #[test]
    fn window_defaults_to_a_day() {
        assert_eq!(window_policy(None, None), WindowPolicy::ReminderAfter { hours: 24 });
    }

    #[test]
    fn both_windows_conflict() {
        let err = parse(&["--hours-until-reminder", "8", "--minimum-elapsed-hours", "72"]);
        assert!(err.is_err());
    }

    #[test]
    fn email_settings_require_password_and_sender() {
        let mut a = args(&[]).unwrap();
        a.smtp_username = Some("postmaster".to_string());
        a.smtp_password = None;
        a.email_from = Some("bot@example.test".to_string());
        assert!(a.email_settings().is_err());

        a.smtp_password = Some("secret".to_string());
        a.email_from = None;
        assert!(a.email_settings().is_err());
    }

    #[test]
    fn email_settings_collects_smtp_options() {
        let mut a = args(&["--smtp-host", "smtp.example.test", "--user-data", "/tmp/users.json"]).unwrap();
        a.smtp_username = Some(" postmaster ".to_string());
        a.smtp_password = Some("secret".to_string());
        a.email_from = Some("bot@example.test".to_string());

        let settings = a.email_settings().unwrap().unwrap();
        assert_eq!(settings.host, "smtp.example.test");
        assert_eq!(settings.username, "postmaster");
        assert_eq!(settings.user_data, PathBuf::from("/tmp/users.json"));
    }

    #[test]
    fn email_is_disabled_without_username() {
        let mut a = args(&[]).unwrap();
        a.smtp_username = None;
        assert_eq!(a.email_settings().unwrap(), None);
        a.smtp_username = Some("  ".to_string());
        assert_eq!(a.email_settings().unwrap(), None);
    }
}

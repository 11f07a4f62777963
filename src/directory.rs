use std::collections::HashMap;
use std::path::Path;

use anyhow::{Context, Result};
use serde::Deserialize;

#[derive(Debug, Deserialize)]
struct UserData {
    users: Vec<UserEntry>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct UserEntry {
    github_login: String,
    email_address: String,
}

/// GitHub login to email address, loaded from
/// `{"users": [{"githubLogin": "...", "emailAddress": "..."}]}`.
#[derive(Debug, Default)]
pub struct Directory {
    emails: HashMap<String, String>,
}

impl Directory {
    pub fn open(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("failed to read user directory {}", path.display()))?;
        Self::from_json(&content)
            .with_context(|| format!("failed to parse user directory {}", path.display()))
    }

    pub fn from_json(content: &str) -> Result<Self> {
        let data: UserData = serde_json::from_str(content)?;
        // First entry wins when a login is listed twice.
        let mut emails = HashMap::with_capacity(data.users.len());
        for user in data.users {
            emails
                .entry(user.github_login)
                .or_insert(user.email_address);
        }
        Ok(Self { emails })
    }

    pub fn email_for(&self, login: &str) -> Option<&str> {
        self.emails.get(login).map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.emails.len()
    }

    pub fn is_empty(&self) -> bool {
        self.emails.is_empty()
    }
}

use std::process::Command;

use anyhow::{Result, anyhow};
use tracing::debug;

/// Token input of the packaged action, then the token most CI runners export.
const TOKEN_ENV_VARS: [&str; 2] = ["INPUT_GITHUB_ACCESS_TOKEN", "GITHUB_TOKEN"];

fn non_empty_token(name: &str, raw: &str) -> Result<String> {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return Err(anyhow!(
            "GitHub token from {name} is empty after trimming; please re-export"
        ));
    }
    Ok(trimmed.to_string())
}

fn token_from_env_var(name: &str) -> Result<Option<String>> {
    match std::env::var(name) {
        Ok(raw) => non_empty_token(name, &raw).map(Some),
        Err(std::env::VarError::NotPresent) => Ok(None),
        Err(e) => Err(anyhow!("failed to read env {name}: {e}")),
    }
}

fn token_from_gh_auth_token() -> Result<String> {
    let mut cmd = Command::new("gh");
    cmd.args(["auth", "token"]);

    if let Ok(host) = std::env::var("GH_HOST") {
        let host = host.trim();
        if !host.is_empty() {
            cmd.args(["--hostname", host]);
        }
    }

    let output = cmd
        .output()
        .map_err(|e| anyhow!("failed to execute `gh auth token`: {e}"))?;

    if !output.status.success() {
        let stderr = String::from_utf8_lossy(&output.stderr);
        return Err(anyhow!(
            "`gh auth token` failed (exit {}): {}",
            output.status,
            stderr.trim()
        ));
    }

    non_empty_token("`gh auth token`", &String::from_utf8_lossy(&output.stdout))
}

/// Resolve the GitHub token.
///
/// Priority:
/// 1) explicit `--token` value
/// 2) `INPUT_GITHUB_ACCESS_TOKEN`, then `GITHUB_TOKEN`
/// 3) `gh auth token` (optionally with `GH_HOST`)
pub fn resolve_github_token(explicit: Option<&str>) -> Result<String> {
    if let Some(raw) = explicit {
        return non_empty_token("--token", raw);
    }
    for name in TOKEN_ENV_VARS {
        if let Some(token) = token_from_env_var(name)? {
            debug!(source = name, "using GitHub token from environment");
            return Ok(token);
        }
    }
    token_from_gh_auth_token()
}

//! Logged-in account resolution.
//!
//! Resolution order:
//! 1) CLI --account (explicit)
//! 2) MISSIONS_ACCOUNT environment variable
//! 3) Persisted login in .missions/session.json
//!
//! With none of these the caller is not logged in.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};
use crate::lock;

pub const ACCOUNT_ENV: &str = "MISSIONS_ACCOUNT";

const SESSION_DIR: &str = ".missions";
const SESSION_FILENAME: &str = "session.json";

/// The login remembered between CLI invocations.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SavedSession {
    pub account_id: String,
    pub display_name: String,
}

/// Resolve the current account id using CLI, environment, and saved login.
pub fn resolve_account(base_dir: &Path, cli_account: Option<&str>) -> Result<String> {
    if let Some(account) = non_empty(cli_account) {
        return Ok(account.to_string());
    }

    if let Ok(env_account) = std::env::var(ACCOUNT_ENV) {
        if let Some(account) = non_empty(Some(env_account.as_str())) {
            return Ok(account.to_string());
        }
    }

    match load_session(base_dir)? {
        Some(session) => Ok(session.account_id),
        None => Err(Error::NotLoggedIn),
    }
}

/// Remember a login in `.missions/session.json`.
pub fn persist_session(base_dir: &Path, session: &SavedSession) -> Result<()> {
    let json = serde_json::to_vec_pretty(session)?;
    lock::replace_file(&session_path(base_dir), &json)
}

/// Load the remembered login, if present.
pub fn load_session(base_dir: &Path) -> Result<Option<SavedSession>> {
    let path = session_path(base_dir);
    if !path.exists() {
        return Ok(None);
    }

    let raw = std::fs::read_to_string(path)?;
    let session: SavedSession = serde_json::from_str(&raw)?;
    if non_empty(Some(session.account_id.as_str())).is_none() {
        return Ok(None);
    }
    Ok(Some(session))
}

/// Forget the remembered login. Returns whether one existed.
pub fn clear_session(base_dir: &Path) -> Result<bool> {
    let path = session_path(base_dir);
    if !path.exists() {
        return Ok(false);
    }
    std::fs::remove_file(path)?;
    Ok(true)
}

pub fn session_path(base_dir: &Path) -> PathBuf {
    base_dir.join(SESSION_DIR).join(SESSION_FILENAME)
}

fn non_empty(input: Option<&str>) -> Option<&str> {
    input.and_then(|value| {
        let trimmed = value.trim();
        if trimmed.is_empty() {
            None
        } else {
            Some(trimmed)
        }
    })
}

//! Storage layer for missions
//!
//! Each account is persisted as a single JSON record so that its balance,
//! completed tasks, claimed rewards, and proofs are always written (and
//! restored) together.
//!
//! # Directory Structure
//!
//! ```text
//! <data_dir>/
//!   accounts/
//!     <account-key>.json        # AccountRecord
//!     <account-key>.json.lock   # Per-account lock file
//! ```

use std::fs;
use std::path::{Path, PathBuf};

use chrono::{DateTime, Utc};
use serde::{de::DeserializeOwned, Deserialize, Serialize};

use crate::error::{Error, Result};
use crate::ledger::AccountState;
use crate::lock;

/// Schema tag stored in every account record
pub const ACCOUNT_SCHEMA_VERSION: &str = "missions.account.v1";

/// Name of the accounts directory under the data dir
pub const ACCOUNTS_DIR: &str = "accounts";

/// One persisted account.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AccountRecord {
    pub schema_version: String,
    pub account_id: String,
    pub display_name: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    pub state: AccountState,
}

impl AccountRecord {
    /// A fresh account: zero balance, nothing completed or claimed.
    pub fn new(account_id: impl Into<String>, display_name: impl Into<String>) -> Self {
        let now = Utc::now();
        Self {
            schema_version: ACCOUNT_SCHEMA_VERSION.to_string(),
            account_id: account_id.into(),
            display_name: display_name.into(),
            created_at: now,
            updated_at: now,
            state: AccountState::new(),
        }
    }
}

/// Path layout and JSON helpers for the data directory
#[derive(Debug, Clone)]
pub struct Storage {
    data_dir: PathBuf,
}

impl Storage {
    pub fn new(data_dir: impl Into<PathBuf>) -> Self {
        Self {
            data_dir: data_dir.into(),
        }
    }

    pub fn accounts_dir(&self) -> PathBuf {
        self.data_dir.join(ACCOUNTS_DIR)
    }

    pub fn account_file(&self, account_id: &str) -> PathBuf {
        self.accounts_dir()
            .join(format!("{}.json", account_key(account_id)))
    }

    pub fn account_lock_file(&self, account_id: &str) -> PathBuf {
        lock::lock_path_for(&self.account_file(account_id))
    }

    /// Read an account record; `Ok(None)` if it was never written.
    ///
    /// Callers hold the account lock.
    pub fn read_account(&self, account_id: &str) -> Result<Option<AccountRecord>> {
        let path = self.account_file(account_id);
        if !path.exists() {
            return Ok(None);
        }
        let record: AccountRecord = self.read_json(&path)?;
        if record.schema_version != ACCOUNT_SCHEMA_VERSION {
            return Err(Error::CorruptAccount {
                account: account_id.to_string(),
                reason: format!("unsupported schema '{}'", record.schema_version),
            });
        }
        if record.account_id != account_id {
            return Err(Error::CorruptAccount {
                account: account_id.to_string(),
                reason: format!("record belongs to '{}'", record.account_id),
            });
        }
        Ok(Some(record))
    }

    /// Replace an account record in one atomic write.
    ///
    /// Callers hold the account lock.
    pub fn write_account(&self, record: &AccountRecord) -> Result<()> {
        let path = self.account_file(&record.account_id);
        self.write_json(&path, record)
    }

    pub fn write_json<T: Serialize>(&self, path: &Path, data: &T) -> Result<()> {
        let json = serde_json::to_string_pretty(data)?;
        lock::replace_file(path, json.as_bytes())
    }

    pub fn read_json<T: DeserializeOwned>(&self, path: &Path) -> Result<T> {
        let content = fs::read_to_string(path)?;
        Ok(serde_json::from_str(&content)?)
    }
}

/// Filesystem-safe file stem for an account id.
///
/// ASCII alphanumerics and `@ _ - .` pass through; everything else
/// (including a leading dot) becomes `%XX` per UTF-8 byte, so distinct ids
/// never share a file.
pub fn account_key(account_id: &str) -> String {
    let mut key = String::with_capacity(account_id.len());
    for (idx, byte) in account_id.bytes().enumerate() {
        let keep = byte.is_ascii_alphanumeric()
            || matches!(byte, b'@' | b'_' | b'-')
            || (byte == b'.' && idx > 0);
        if keep {
            key.push(byte as char);
        } else {
            key.push_str(&format!("%{byte:02X}"));
        }
    }
    key
}

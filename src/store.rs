//! Account stores with per-account critical sections.
//!
//! Every read-modify-write of an account runs inside
//! [`AccountStore::with_account`]: the closure sees a private copy of the
//! record, and the copy replaces the stored record only when the closure
//! returns `Ok`. A rejected mutation therefore never leaves a trace, and two
//! concurrent mutations of one account are serialized. Distinct accounts
//! never contend.

use std::collections::HashMap;
use std::sync::{Arc, Mutex, MutexGuard};
use std::time::Duration;

use chrono::Utc;
use tracing::debug;

use crate::error::{Error, Result};
use crate::lock::AccountLock;
use crate::storage::{AccountRecord, Storage};

pub trait AccountStore: Send + Sync {
    /// Create the account if it does not exist. An existing record is
    /// returned as stored. The flag tells whether it was created.
    fn open_account(&self, account_id: &str, display_name: &str) -> Result<(AccountRecord, bool)>;

    /// Snapshot of an account, read under its lock.
    fn load_account(&self, account_id: &str) -> Result<Option<AccountRecord>>;

    /// Run `f` on a copy of the record under the account's exclusive lock
    /// and commit the copy if `f` succeeds and changed it.
    fn with_account<R, F>(&self, account_id: &str, f: F) -> Result<R>
    where
        F: FnOnce(&mut AccountRecord) -> Result<R>;
}

/// In-process store for embedding the tracker in a long-running service.
#[derive(Debug, Default)]
pub struct MemoryStore {
    accounts: Mutex<HashMap<String, Arc<Mutex<AccountRecord>>>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    fn handle(&self, account_id: &str) -> Result<Option<Arc<Mutex<AccountRecord>>>> {
        let accounts = lock_poisoned(&self.accounts)?;
        Ok(accounts.get(account_id).cloned())
    }
}

impl AccountStore for MemoryStore {
    fn open_account(&self, account_id: &str, display_name: &str) -> Result<(AccountRecord, bool)> {
        let handle = {
            let mut accounts = lock_poisoned(&self.accounts)?;
            if let Some(handle) = accounts.get(account_id) {
                Arc::clone(handle)
            } else {
                let record = AccountRecord::new(account_id, display_name);
                accounts.insert(account_id.to_string(), Arc::new(Mutex::new(record.clone())));
                debug!(account_id, "account created");
                return Ok((record, true));
            }
        };

        let record = lock_poisoned(&handle)?.clone();
        Ok((record, false))
    }

    fn load_account(&self, account_id: &str) -> Result<Option<AccountRecord>> {
        match self.handle(account_id)? {
            Some(handle) => Ok(Some(lock_poisoned(&handle)?.clone())),
            None => Ok(None),
        }
    }

    fn with_account<R, F>(&self, account_id: &str, f: F) -> Result<R>
    where
        F: FnOnce(&mut AccountRecord) -> Result<R>,
    {
        let handle = self
            .handle(account_id)?
            .ok_or_else(|| Error::AccountNotFound(account_id.to_string()))?;
        let mut guard = lock_poisoned(&handle)?;

        let mut draft = guard.clone();
        let result = f(&mut draft)?;
        if draft != *guard {
            draft.updated_at = Utc::now();
            *guard = draft;
        }
        Ok(result)
    }
}

/// File-backed store: one JSON record and one lock file per account.
///
/// The file lock serializes writers across threads and processes alike.
#[derive(Debug, Clone)]
pub struct FileStore {
    storage: Storage,
    lock_timeout: Duration,
}

impl FileStore {
    pub fn new(storage: Storage, lock_timeout_ms: u64) -> Self {
        Self {
            storage,
            lock_timeout: Duration::from_millis(lock_timeout_ms),
        }
    }

    fn lock(&self, account_id: &str) -> Result<AccountLock> {
        AccountLock::acquire(&self.storage.account_lock_file(account_id), self.lock_timeout)
    }
}

impl AccountStore for FileStore {
    fn open_account(&self, account_id: &str, display_name: &str) -> Result<(AccountRecord, bool)> {
        let _lock = self.lock(account_id)?;

        match self.storage.read_account(account_id)? {
            Some(record) => Ok((record, false)),
            None => {
                let record = AccountRecord::new(account_id, display_name);
                self.storage.write_account(&record)?;
                debug!(account_id, path = %self.storage.account_file(account_id).display(), "account created");
                Ok((record, true))
            }
        }
    }

    fn load_account(&self, account_id: &str) -> Result<Option<AccountRecord>> {
        let _lock = self.lock(account_id)?;
        self.storage.read_account(account_id)
    }

    fn with_account<R, F>(&self, account_id: &str, f: F) -> Result<R>
    where
        F: FnOnce(&mut AccountRecord) -> Result<R>,
    {
        let _lock = self.lock(account_id)?;
        let current = self
            .storage
            .read_account(account_id)?
            .ok_or_else(|| Error::AccountNotFound(account_id.to_string()))?;

        let mut draft = current.clone();
        let result = f(&mut draft)?;
        if draft != current {
            draft.updated_at = Utc::now();
            self.storage.write_account(&draft)?;
        }
        Ok(result)
    }
}

fn lock_poisoned<T>(mutex: &Mutex<T>) -> Result<MutexGuard<'_, T>> {
    mutex
        .lock()
        .map_err(|_| Error::OperationFailed("account lock poisoned".to_string()))
}

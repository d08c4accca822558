//! The tracker facade: catalogs, ledger, projector, store, and leaderboard
//! feed wired together behind account ids.
//!
//! Mutations go through [`AccountStore::with_account`], so the ledger's
//! check-then-act logic always runs inside the account's critical section.
//! Records coming out of a store are verified before use; a record that
//! breaks a ledger invariant is reported as corrupt instead of being
//! mutated further.

use tracing::{debug, info};

use crate::catalog::{Reward, RewardCatalog, RewardId, Task, TaskCatalog, TaskId};
use crate::config::Config;
use crate::error::{Error, Result};
use crate::leaderboard::{Leaderboard, LeaderboardFeed, Standing, StaticFeed};
use crate::ledger::{AccountLedger, AccountState, Completion, ProofAttachment, Redemption};
use crate::projection::{ProgressProjector, Projection};
use crate::store::AccountStore;
use crate::storage::AccountRecord;

/// Result of a login.
#[derive(Debug, Clone, PartialEq, Eq, serde::Serialize)]
pub struct Session {
    pub account_id: String,
    pub display_name: String,
    pub created: bool,
    pub balance: u64,
}

pub struct Tracker<S> {
    tasks: TaskCatalog,
    rewards: RewardCatalog,
    goal_threshold: u64,
    store: S,
    feed: Box<dyn LeaderboardFeed>,
}

impl<S: AccountStore> Tracker<S> {
    pub fn new(
        tasks: TaskCatalog,
        rewards: RewardCatalog,
        goal_threshold: u64,
        store: S,
        feed: Box<dyn LeaderboardFeed>,
    ) -> Self {
        Self {
            tasks,
            rewards,
            goal_threshold,
            store,
            feed,
        }
    }

    /// Build a tracker from validated configuration.
    pub fn from_config(config: &Config, store: S) -> Result<Self> {
        Ok(Self::new(
            config.task_catalog()?,
            config.reward_catalog()?,
            config.goal_threshold,
            store,
            Box::new(StaticFeed::new(config.leaderboard.peers.clone())),
        ))
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    pub fn list_tasks(&self) -> &[Task] {
        self.tasks.list_tasks()
    }

    pub fn list_rewards(&self) -> &[Reward] {
        self.rewards.list_rewards()
    }

    pub fn projector(&self) -> ProgressProjector<'_> {
        ProgressProjector::new(&self.tasks, &self.rewards, self.goal_threshold)
    }

    fn ledger(&self) -> AccountLedger<'_> {
        AccountLedger::new(&self.tasks, &self.rewards)
    }

    /// Open (or create) the account for an authenticated participant.
    ///
    /// A returning participant keeps their state; only the display name is
    /// refreshed, and only once the stored record has been verified.
    pub fn login(&self, account_id: &str, display_name: &str) -> Result<Session> {
        let account_id = valid_account_id(account_id)?;
        let display_name = required("name", display_name)?;

        let (mut record, created) = self.store.open_account(account_id, display_name)?;
        self.verify(&record)?;
        if record.display_name != display_name {
            record = self.store.with_account(account_id, |stored| {
                self.verify(stored)?;
                stored.display_name = display_name.to_string();
                Ok(stored.clone())
            })?;
        }
        info!(account_id, created, "login");

        Ok(Session {
            account_id: record.account_id,
            display_name: record.display_name,
            created,
            balance: record.state.balance,
        })
    }

    /// Full verified record for an account.
    pub fn account(&self, account_id: &str) -> Result<AccountRecord> {
        let account_id = valid_account_id(account_id)?;
        let record = self
            .store
            .load_account(account_id)?
            .ok_or_else(|| Error::AccountNotFound(account_id.to_string()))?;
        self.verify(&record)?;
        Ok(record)
    }

    /// Owned snapshot of an account's state.
    pub fn get_account_state(&self, account_id: &str) -> Result<AccountState> {
        Ok(self.account(account_id)?.state)
    }

    pub fn complete_task(
        &self,
        account_id: &str,
        task_id: TaskId,
        proof: Option<&str>,
    ) -> Result<Completion> {
        let account_id = valid_account_id(account_id)?;
        let ledger = self.ledger();
        let completion = self.store.with_account(account_id, |record| {
            self.verify(record)?;
            Ok(ledger.complete_task(&mut record.state, task_id, proof)?)
        })?;
        debug!(account_id, ?completion, "complete_task");
        Ok(completion)
    }

    pub fn redeem_reward(&self, account_id: &str, reward_id: RewardId) -> Result<Redemption> {
        let account_id = valid_account_id(account_id)?;
        let ledger = self.ledger();
        let redemption = self.store.with_account(account_id, |record| {
            self.verify(record)?;
            Ok(ledger.redeem_reward(&mut record.state, reward_id)?)
        })?;
        debug!(account_id, ?redemption, "redeem_reward");
        Ok(redemption)
    }

    pub fn attach_proof(
        &self,
        account_id: &str,
        task_id: TaskId,
        artifact: &str,
    ) -> Result<ProofAttachment> {
        let account_id = valid_account_id(account_id)?;
        let ledger = self.ledger();
        self.store.with_account(account_id, |record| {
            self.verify(record)?;
            Ok(ledger.attach_proof(&mut record.state, task_id, artifact)?)
        })
    }

    pub fn project(&self, state: &AccountState) -> Projection {
        self.projector().project(state)
    }

    /// This account's standing next to the external peer feed.
    pub fn leaderboard(&self, account_id: &str) -> Result<Leaderboard> {
        let record = self.account(account_id)?;
        let you = Standing {
            account_id: record.account_id,
            display_name: record.display_name,
            coins: record.state.balance,
        };
        Ok(Leaderboard::new(you, self.feed.peers()?))
    }

    fn verify(&self, record: &AccountRecord) -> Result<()> {
        record
            .state
            .check_invariants(&self.tasks, &self.rewards)
            .map_err(|reason| Error::CorruptAccount {
                account: record.account_id.clone(),
                reason,
            })
    }
}

/// Longest accepted account id in bytes. Escaped ids must still fit in a
/// file name together with the lock and temp suffixes.
pub const MAX_ACCOUNT_ID_LEN: usize = 64;

fn valid_account_id(account_id: &str) -> Result<&str> {
    let account_id = required("account id", account_id)?;
    if account_id.len() > MAX_ACCOUNT_ID_LEN {
        return Err(Error::InvalidArgument(format!(
            "account id is longer than {MAX_ACCOUNT_ID_LEN} bytes"
        )));
    }
    Ok(account_id)
}

fn required<'a>(what: &str, value: &'a str) -> Result<&'a str> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        return Err(Error::InvalidArgument(format!("{what} cannot be empty")));
    }
    Ok(trimmed)
}

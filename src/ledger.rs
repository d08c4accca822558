//! Account ledger: the only code that mutates an account.
//!
//! An [`AccountState`] holds the coin balance together with the tasks it
//! was earned from and the rewards it was spent on. [`AccountLedger`]
//! applies the three mutations (complete a task, attach a proof, redeem a
//! reward) and every one of them either fully applies or leaves the state
//! untouched.
//!
//! Invariants checked after every mutation:
//! 1. balance is never negative (the type enforces it)
//! 2. balance = sum of completed task values - sum of claimed reward costs
//! 3. a task is completed at most once
//! 4. a reward is claimed at most once
//! 5. a proof exists only for a completed task

use std::collections::{BTreeMap, BTreeSet};

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::{debug, warn};

use crate::catalog::{RewardCatalog, RewardId, TaskCatalog, TaskId};

/// Expected outcomes that refuse a mutation.
///
/// These are not faults: callers branch on them to drive UI feedback.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum Rejection {
    #[error("unknown task {0}")]
    UnknownTask(TaskId),

    #[error("unknown reward {0}")]
    UnknownReward(RewardId),

    #[error("reward {0} already claimed")]
    AlreadyClaimed(RewardId),

    #[error("insufficient balance: have {balance}, need {cost}")]
    InsufficientBalance { balance: u64, cost: u64 },

    #[error("task {0} is not completed")]
    TaskNotCompleted(TaskId),

    #[error("proof artifact name cannot be empty")]
    EmptyArtifact,
}

impl Rejection {
    /// Stable machine-readable name for the rejection.
    pub fn kind(&self) -> &'static str {
        match self {
            Rejection::UnknownTask(_) => "unknown_task",
            Rejection::UnknownReward(_) => "unknown_reward",
            Rejection::AlreadyClaimed(_) => "already_claimed",
            Rejection::InsufficientBalance { .. } => "insufficient_balance",
            Rejection::TaskNotCompleted(_) => "task_not_completed",
            Rejection::EmptyArtifact => "empty_artifact",
        }
    }

    pub fn details(&self) -> serde_json::Value {
        match self {
            Rejection::UnknownTask(id) | Rejection::TaskNotCompleted(id) => {
                serde_json::json!({ "rejection": self.kind(), "task_id": id })
            }
            Rejection::UnknownReward(id) | Rejection::AlreadyClaimed(id) => {
                serde_json::json!({ "rejection": self.kind(), "reward_id": id })
            }
            Rejection::InsufficientBalance { balance, cost } => serde_json::json!({
                "rejection": self.kind(),
                "balance": balance,
                "cost": cost,
            }),
            Rejection::EmptyArtifact => serde_json::json!({ "rejection": self.kind() }),
        }
    }
}

/// Evidence attached to a completed task.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProofAttachment {
    pub task_id: TaskId,
    pub artifact_name: String,
    pub attached_at: DateTime<Utc>,
}

/// Mutable aggregate for one participant.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct AccountState {
    pub balance: u64,
    #[serde(default)]
    pub completed_tasks: BTreeSet<TaskId>,
    #[serde(default)]
    pub claimed_rewards: BTreeSet<RewardId>,
    #[serde(default)]
    pub proofs: BTreeMap<TaskId, ProofAttachment>,
}

impl AccountState {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_completed(&self, task_id: TaskId) -> bool {
        self.completed_tasks.contains(&task_id)
    }

    pub fn is_claimed(&self, reward_id: RewardId) -> bool {
        self.claimed_rewards.contains(&reward_id)
    }

    pub fn proof(&self, task_id: TaskId) -> Option<&ProofAttachment> {
        self.proofs.get(&task_id)
    }

    /// Verify the state against the catalogs.
    ///
    /// Used when a state arrives from outside the ledger (e.g. loaded from
    /// disk). Returns a description of the first violated invariant.
    pub fn check_invariants(
        &self,
        tasks: &TaskCatalog,
        rewards: &RewardCatalog,
    ) -> std::result::Result<(), String> {
        let mut earned: u64 = 0;
        for id in &self.completed_tasks {
            let task = tasks
                .find_task(*id)
                .ok_or_else(|| format!("completed task {id} is not in the catalog"))?;
            earned = earned
                .checked_add(task.value)
                .ok_or_else(|| "earned coins overflow".to_string())?;
        }

        let mut spent: u64 = 0;
        for id in &self.claimed_rewards {
            let reward = rewards
                .find_reward(*id)
                .ok_or_else(|| format!("claimed reward {id} is not in the catalog"))?;
            spent = spent
                .checked_add(reward.cost)
                .ok_or_else(|| "spent coins overflow".to_string())?;
        }

        let expected = earned
            .checked_sub(spent)
            .ok_or_else(|| format!("spent {spent} exceeds earned {earned}"))?;
        if self.balance != expected {
            return Err(format!(
                "balance {} does not match earned {earned} - spent {spent}",
                self.balance
            ));
        }

        for (id, proof) in &self.proofs {
            if proof.task_id != *id {
                return Err(format!("proof keyed by task {id} names task {}", proof.task_id));
            }
            if !self.completed_tasks.contains(id) {
                return Err(format!("proof recorded for incomplete task {id}"));
            }
        }

        Ok(())
    }
}

/// Result of a task completion request.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum Completion {
    Completed { task_id: TaskId, awarded: u64, balance: u64 },
    AlreadyCompleted { task_id: TaskId, balance: u64 },
}

/// Result of a successful redemption.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Redemption {
    pub reward_id: RewardId,
    pub cost: u64,
    pub balance: u64,
}

/// Applies mutations to an [`AccountState`] against a pair of catalogs.
#[derive(Debug, Clone, Copy)]
pub struct AccountLedger<'a> {
    tasks: &'a TaskCatalog,
    rewards: &'a RewardCatalog,
}

impl<'a> AccountLedger<'a> {
    pub fn new(tasks: &'a TaskCatalog, rewards: &'a RewardCatalog) -> Self {
        Self { tasks, rewards }
    }

    /// Mark a task completed and credit its value.
    ///
    /// Completing an already-completed task is a no-op, and any proof passed
    /// alongside it is ignored; use [`AccountLedger::attach_proof`] to replace
    /// a proof afterwards.
    pub fn complete_task(
        &self,
        state: &mut AccountState,
        task_id: TaskId,
        proof: Option<&str>,
    ) -> Result<Completion, Rejection> {
        let task = self
            .tasks
            .find_task(task_id)
            .ok_or(Rejection::UnknownTask(task_id))?;

        if state.is_completed(task_id) {
            debug!(task_id, "task already completed");
            return Ok(Completion::AlreadyCompleted {
                task_id,
                balance: state.balance,
            });
        }

        let proof = match proof {
            Some(name) => Some(artifact_name(name)?),
            None => None,
        };

        state.balance += task.value;
        state.completed_tasks.insert(task_id);
        if let Some(artifact_name) = proof {
            state.proofs.insert(
                task_id,
                ProofAttachment {
                    task_id,
                    artifact_name,
                    attached_at: Utc::now(),
                },
            );
        }
        self.verify(state);

        debug!(task_id, awarded = task.value, balance = state.balance, "task completed");
        Ok(Completion::Completed {
            task_id,
            awarded: task.value,
            balance: state.balance,
        })
    }

    /// Spend coins on a reward. Each reward can be claimed once.
    pub fn redeem_reward(
        &self,
        state: &mut AccountState,
        reward_id: RewardId,
    ) -> Result<Redemption, Rejection> {
        let reward = self
            .rewards
            .find_reward(reward_id)
            .ok_or(Rejection::UnknownReward(reward_id))?;

        if state.is_claimed(reward_id) {
            warn!(reward_id, "reward already claimed");
            return Err(Rejection::AlreadyClaimed(reward_id));
        }
        if state.balance < reward.cost {
            warn!(reward_id, balance = state.balance, cost = reward.cost, "insufficient balance");
            return Err(Rejection::InsufficientBalance {
                balance: state.balance,
                cost: reward.cost,
            });
        }

        state.balance -= reward.cost;
        state.claimed_rewards.insert(reward_id);
        self.verify(state);

        debug!(reward_id, cost = reward.cost, balance = state.balance, "reward redeemed");
        Ok(Redemption {
            reward_id,
            cost: reward.cost,
            balance: state.balance,
        })
    }

    /// Record evidence for a completed task, replacing any earlier proof.
    pub fn attach_proof(
        &self,
        state: &mut AccountState,
        task_id: TaskId,
        artifact: &str,
    ) -> Result<ProofAttachment, Rejection> {
        if self.tasks.find_task(task_id).is_none() {
            return Err(Rejection::UnknownTask(task_id));
        }
        if !state.is_completed(task_id) {
            warn!(task_id, "proof for incomplete task");
            return Err(Rejection::TaskNotCompleted(task_id));
        }
        let artifact_name = artifact_name(artifact)?;

        let proof = ProofAttachment {
            task_id,
            artifact_name,
            attached_at: Utc::now(),
        };
        state.proofs.insert(task_id, proof.clone());
        self.verify(state);

        debug!(task_id, artifact = %proof.artifact_name, "proof attached");
        Ok(proof)
    }

    fn verify(&self, state: &AccountState) {
        if let Err(violation) = state.check_invariants(self.tasks, self.rewards) {
            panic!("account invariant violated: {violation}");
        }
    }
}

fn artifact_name(raw: &str) -> Result<String, Rejection> {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return Err(Rejection::EmptyArtifact);
    }
    Ok(trimmed.to_string())
}

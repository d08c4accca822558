//! Read model derived from an account snapshot.
//!
//! Nothing here mutates an [`AccountState`]; projections are cheap and are
//! recomputed after every mutation.

use serde::Serialize;

use crate::catalog::{RewardCatalog, RewardId, TaskCatalog, TaskId};
use crate::ledger::AccountState;

/// Coins needed for a full progress bar unless configured otherwise.
pub const DEFAULT_GOAL_THRESHOLD: u64 = 300;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum TaskStatus {
    Completed,
    Available,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Eligibility {
    Claimed,
    Affordable,
    Unaffordable,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TaskView {
    pub id: TaskId,
    pub title: String,
    pub value: u64,
    pub status: TaskStatus,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub proof: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RewardView {
    pub id: RewardId,
    pub label: String,
    pub cost: u64,
    pub eligibility: Eligibility,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Projection {
    pub balance: u64,
    pub goal_threshold: u64,
    pub progress_percent: u8,
    pub tasks: Vec<TaskView>,
    pub rewards: Vec<RewardView>,
}

#[derive(Debug, Clone, Copy)]
pub struct ProgressProjector<'a> {
    tasks: &'a TaskCatalog,
    rewards: &'a RewardCatalog,
    goal_threshold: u64,
}

impl<'a> ProgressProjector<'a> {
    /// A zero threshold is treated as an already reached goal.
    pub fn new(tasks: &'a TaskCatalog, rewards: &'a RewardCatalog, goal_threshold: u64) -> Self {
        Self {
            tasks,
            rewards,
            goal_threshold,
        }
    }

    pub fn goal_threshold(&self) -> u64 {
        self.goal_threshold
    }

    /// Percentage of the goal reached, floored and clamped to 0..=100.
    pub fn progress_percent(&self, state: &AccountState) -> u8 {
        if self.goal_threshold == 0 || state.balance >= self.goal_threshold {
            return 100;
        }
        // balance < goal here, so the quotient is below 100
        let percent = u128::from(state.balance) * 100 / u128::from(self.goal_threshold);
        percent as u8
    }

    pub fn task_status(&self, state: &AccountState, task_id: TaskId) -> TaskStatus {
        if state.is_completed(task_id) {
            TaskStatus::Completed
        } else {
            TaskStatus::Available
        }
    }

    /// Eligibility of a reward; `None` when the id is not in the catalog.
    pub fn reward_eligibility(&self, state: &AccountState, reward_id: RewardId) -> Option<Eligibility> {
        let reward = self.rewards.find_reward(reward_id)?;
        Some(eligibility(state, reward_id, reward.cost))
    }

    pub fn project(&self, state: &AccountState) -> Projection {
        let tasks = self
            .tasks
            .list_tasks()
            .iter()
            .map(|task| TaskView {
                id: task.id,
                title: task.title.clone(),
                value: task.value,
                status: self.task_status(state, task.id),
                proof: state.proof(task.id).map(|p| p.artifact_name.clone()),
            })
            .collect();

        let rewards = self
            .rewards
            .list_rewards()
            .iter()
            .map(|reward| RewardView {
                id: reward.id,
                label: reward.label.clone(),
                cost: reward.cost,
                eligibility: eligibility(state, reward.id, reward.cost),
            })
            .collect();

        Projection {
            balance: state.balance,
            goal_threshold: self.goal_threshold,
            progress_percent: self.progress_percent(state),
            tasks,
            rewards,
        }
    }
}

fn eligibility(state: &AccountState, reward_id: RewardId, cost: u64) -> Eligibility {
    if state.is_claimed(reward_id) {
        Eligibility::Claimed
    } else if state.balance >= cost {
        Eligibility::Affordable
    } else {
        Eligibility::Unaffordable
    }
}

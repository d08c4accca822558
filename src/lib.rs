//! missions - coin ledger for semester missions
//!
//! Participants complete tasks from a fixed catalog to earn coins, follow
//! their progress toward a goal, and redeem coins for rewards.
//!
//! # Core Concepts
//!
//! - **Catalogs**: fixed task and reward lists shared by all accounts
//! - **Ledger**: the only mutation paths for an account (complete, attach
//!   proof, redeem), each all-or-nothing
//! - **Projection**: read-only progress, task status, and reward eligibility
//! - **Stores**: per-account critical sections, in memory or on disk
//!
//! # Module Organization
//!
//! - `catalog`: task and reward catalogs
//! - `ledger`: account state, mutations, and rejections
//! - `projection`: progress and eligibility read model
//! - `store`: account stores with per-account locking
//! - `tracker`: facade used by the CLI and embedders
//! - `leaderboard`: external peer standings
//! - `session`: logged-in account resolution
//! - `cli`: command-line interface using clap
//! - `config`: configuration loading from `.missions.toml`
//! - `error`: error types and result aliases
//! - `events`: JSONL event output
//! - `lock`: file locking and atomic writes
//! - `output`: human and JSON output
//! - `storage`: account record files

pub mod catalog;
pub mod cli;
pub mod config;
pub mod error;
pub mod events;
pub mod leaderboard;
pub mod ledger;
pub mod lock;
pub mod output;
pub mod projection;
pub mod session;
pub mod storage;
pub mod store;
pub mod tracker;

pub use error::{Error, Result};

//! Command-line interface for missions
//!
//! This module defines the CLI structure using clap derive macros.
//! Commands are grouped into submodules by the part of the account they touch.

use std::path::{Path, PathBuf};

use clap::{Parser, Subcommand};
use serde::Serialize;
use tracing::warn;

use crate::catalog::{RewardId, TaskId};
use crate::config::Config;
use crate::error::Result;
use crate::events::{Event, EventDestination, EventKind, EventSink};
use crate::output::{OutputOptions, Report};
use crate::session;
use crate::storage::Storage;
use crate::store::FileStore;
use crate::tracker::Tracker;

mod board;
mod login;
mod rewards;
mod tasks;

/// missions - semester missions and coin rewards
///
/// Complete tasks to earn coins, track progress toward the semester goal,
/// and redeem coins for rewards.
#[derive(Parser, Debug)]
#[command(name = "missions")]
#[command(author, version, long_about = None)]
#[command(propagate_version = true)]
pub struct Cli {
    /// Working directory holding .missions.toml and .missions/ (defaults to current directory)
    #[arg(long, global = true, env = "MISSIONS_DIR")]
    pub dir: Option<PathBuf>,

    /// Path to the config file (defaults to <dir>/.missions.toml)
    #[arg(long, global = true)]
    pub config: Option<PathBuf>,

    /// Account to act as (overrides the saved login)
    #[arg(long, global = true, env = "MISSIONS_ACCOUNT")]
    pub account: Option<String>,

    /// Output in JSON format
    #[arg(long, global = true)]
    pub json: bool,

    /// Suppress non-essential output
    #[arg(short, long, global = true)]
    pub quiet: bool,

    /// Emit ledger events as JSON lines to a file, or "-" for stdout
    #[arg(long, global = true)]
    pub events: Option<String>,

    #[command(subcommand)]
    pub command: Commands,
}

/// Available subcommands
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Log in with an institutional account and display name
    Login {
        /// Account id (e.g. institutional e-mail)
        account: String,

        /// Full display name
        #[arg(long)]
        name: String,
    },

    /// Forget the saved login
    Logout,

    /// Show the logged-in account
    Whoami,

    /// Show balance and progress toward the goal
    Status,

    /// List tasks and their completion status
    Tasks,

    /// Complete a task and collect its coins
    Complete {
        /// Task id
        task: TaskId,

        /// Name of an uploaded proof artifact
        #[arg(long)]
        proof: Option<String>,
    },

    /// Attach a proof artifact to a completed task
    Proof {
        /// Task id
        task: TaskId,

        /// Name of the uploaded artifact
        artifact: String,
    },

    /// List rewards and whether they can be redeemed
    Rewards,

    /// Redeem coins for a reward
    Redeem {
        /// Reward id
        reward: RewardId,
    },

    /// Show your standing next to other participants
    Leaderboard,
}

/// Everything a command needs: resolved paths, config, tracker, output mode.
pub(crate) struct Context {
    base_dir: PathBuf,
    pub tracker: Tracker<FileStore>,
    pub output: OutputOptions,
    account: Option<String>,
    events: Option<EventSink>,
}

impl Context {
    fn open(cli: &Cli) -> Result<Self> {
        let base_dir = match &cli.dir {
            Some(dir) => dir.clone(),
            None => std::env::current_dir()?,
        };
        let config = match &cli.config {
            Some(path) => Config::load(path)?,
            None => Config::load_from_dir(&base_dir)?,
        };
        let storage = Storage::new(config.data_dir_in(&base_dir));
        let store = FileStore::new(storage, config.lock_timeout_ms);
        let tracker = Tracker::from_config(&config, store)?;

        let destination = EventDestination::parse(cli.events.as_deref());
        let events_to_stdout = destination == Some(EventDestination::Stdout);
        let events = destination.map(|dest| dest.open()).transpose()?;

        Ok(Self {
            base_dir,
            tracker,
            output: OutputOptions {
                // events on stdout would interleave with the JSON envelope
                json: cli.json && !events_to_stdout,
                quiet: cli.quiet || events_to_stdout,
            },
            account: cli.account.clone(),
            events,
        })
    }

    /// The account the command acts on.
    pub fn account_id(&self) -> Result<String> {
        session::resolve_account(&self.base_dir, self.account.as_deref())
    }

    pub fn base_dir(&self) -> &Path {
        &self.base_dir
    }

    /// Report a committed mutation to the `--events` sink.
    ///
    /// The ledger change already happened, so a failed write becomes a
    /// warning on the report instead of failing the command.
    pub fn record_event<T: Serialize>(
        &mut self,
        kind: EventKind,
        account_id: &str,
        data: &T,
        report: &mut Report,
    ) {
        let Some(sink) = self.events.as_mut() else {
            return;
        };
        let written = Event::new(kind, account_id)
            .with_data(data)
            .and_then(|event| sink.emit(&event));
        if let Err(err) = written {
            warn!(?kind, account_id, error = %err, "event not recorded");
            report.warn(format!("event not recorded: {err}"));
        }
    }
}

impl Cli {
    /// Whether error output should be JSON
    pub fn wants_json(&self) -> bool {
        let destination = EventDestination::parse(self.events.as_deref());
        self.json && destination != Some(EventDestination::Stdout)
    }

    /// Execute the CLI command
    pub fn run(self) -> Result<()> {
        let mut ctx = Context::open(&self)?;
        match self.command {
            Commands::Login { account, name } => login::run_login(&mut ctx, &account, &name),
            Commands::Logout => login::run_logout(&ctx),
            Commands::Whoami => login::run_whoami(&ctx),
            Commands::Status => board::run_status(&ctx),
            Commands::Tasks => tasks::run_list(&ctx),
            Commands::Complete { task, proof } => {
                tasks::run_complete(&mut ctx, task, proof.as_deref())
            }
            Commands::Proof { task, artifact } => tasks::run_proof(&mut ctx, task, &artifact),
            Commands::Rewards => rewards::run_list(&ctx),
            Commands::Redeem { reward } => rewards::run_redeem(&mut ctx, reward),
            Commands::Leaderboard => board::run_leaderboard(&ctx),
        }
    }
}

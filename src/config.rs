//! Configuration loading and management
//!
//! Handles parsing of `.missions.toml` configuration files.

use serde::Deserialize;
use std::path::{Path, PathBuf};

use crate::catalog::{self, Reward, RewardCatalog, Task, TaskCatalog};
use crate::leaderboard::Peer;
use crate::lock::DEFAULT_LOCK_TIMEOUT_MS;
use crate::projection::DEFAULT_GOAL_THRESHOLD;

/// Config file name looked up in the working directory
pub const CONFIG_FILE: &str = ".missions.toml";

/// Main configuration structure
#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    /// Coins that fill the progress bar
    #[serde(default = "default_goal_threshold")]
    pub goal_threshold: u64,

    /// Where account records live, relative to the config directory
    #[serde(default = "default_data_dir")]
    pub data_dir: PathBuf,

    /// How long to wait for an account lock
    #[serde(default = "default_lock_timeout_ms")]
    pub lock_timeout_ms: u64,

    /// Task catalog
    #[serde(default = "catalog::default_tasks")]
    pub tasks: Vec<Task>,

    /// Reward catalog
    #[serde(default = "catalog::default_rewards")]
    pub rewards: Vec<Reward>,

    /// Peer standings shown on the leaderboard
    #[serde(default)]
    pub leaderboard: LeaderboardConfig,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            goal_threshold: default_goal_threshold(),
            data_dir: default_data_dir(),
            lock_timeout_ms: default_lock_timeout_ms(),
            tasks: catalog::default_tasks(),
            rewards: catalog::default_rewards(),
            leaderboard: LeaderboardConfig::default(),
        }
    }
}

fn default_goal_threshold() -> u64 {
    DEFAULT_GOAL_THRESHOLD
}

fn default_data_dir() -> PathBuf {
    PathBuf::from(".missions").join("data")
}

fn default_lock_timeout_ms() -> u64 {
    DEFAULT_LOCK_TIMEOUT_MS
}

/// Leaderboard feed configuration
#[derive(Debug, Clone, Deserialize)]
pub struct LeaderboardConfig {
    #[serde(default = "default_peers")]
    pub peers: Vec<Peer>,
}

fn default_peers() -> Vec<Peer> {
    [("Ana Silva", 140), ("Carlos Souza", 120), ("Rafaela Lima", 95)]
        .into_iter()
        .map(|(name, coins)| Peer {
            name: name.to_string(),
            coins,
        })
        .collect()
}

impl Default for LeaderboardConfig {
    fn default() -> Self {
        Self {
            peers: default_peers(),
        }
    }
}

impl Config {
    /// Load configuration from a `.missions.toml` file
    pub fn load(path: &Path) -> crate::error::Result<Self> {
        let content = std::fs::read_to_string(path)?;
        let config: Config = toml::from_str(&content)?;
        config.validate()?;
        Ok(config)
    }

    /// Load configuration from a directory, or return defaults when the
    /// file is missing.
    pub fn load_from_dir(dir: &Path) -> crate::error::Result<Self> {
        let config_path = dir.join(CONFIG_FILE);
        if config_path.exists() {
            Self::load(&config_path)
        } else {
            Ok(Self::default())
        }
    }

    /// The data directory, resolved against `base` when relative.
    pub fn data_dir_in(&self, base: &Path) -> PathBuf {
        if self.data_dir.is_absolute() {
            self.data_dir.clone()
        } else {
            base.join(&self.data_dir)
        }
    }

    pub fn task_catalog(&self) -> crate::error::Result<TaskCatalog> {
        TaskCatalog::new(self.tasks.clone())
    }

    pub fn reward_catalog(&self) -> crate::error::Result<RewardCatalog> {
        RewardCatalog::new(self.rewards.clone())
    }

    fn validate(&self) -> crate::error::Result<()> {
        if self.goal_threshold == 0 {
            return Err(crate::error::Error::InvalidConfig(
                "goal_threshold must be > 0".to_string(),
            ));
        }
        if self.lock_timeout_ms == 0 {
            return Err(crate::error::Error::InvalidConfig(
                "lock_timeout_ms must be > 0".to_string(),
            ));
        }
        if self.data_dir.as_os_str().is_empty() {
            return Err(crate::error::Error::InvalidConfig(
                "data_dir cannot be empty".to_string(),
            ));
        }
        self.task_catalog()?;
        self.reward_catalog()?;
        for peer in &self.leaderboard.peers {
            if peer.name.trim().is_empty() {
                return Err(crate::error::Error::InvalidConfig(
                    "leaderboard.peers cannot include empty names".to_string(),
                ));
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;

    #[test]
    fn defaults_are_expected() {
        let cfg = Config::default();
        assert_eq!(cfg.goal_threshold, 300);
        assert_eq!(cfg.data_dir, PathBuf::from(".missions/data"));
        assert_eq!(cfg.lock_timeout_ms, 5000);
        assert_eq!(cfg.tasks.len(), 11);
        assert_eq!(cfg.rewards.len(), 7);
        assert_eq!(cfg.leaderboard.peers.len(), 3);
        assert_eq!(cfg.leaderboard.peers[0].name, "Ana Silva");
        assert_eq!(cfg.leaderboard.peers[0].coins, 140);
    }

    #[test]
    fn load_parses_overrides() {
        let dir = tempfile::tempdir().expect("tempdir");
        let path = dir.path().join(CONFIG_FILE);
        let content = r#"
goal_threshold = 500
data_dir = "state"
lock_timeout_ms = 250

[[tasks]]
id = 1
title = "Attend the kickoff"
value = 15

[[tasks]]
id = 2
title = "Submit the survey"
value = 5

[[rewards]]
id = 9
label = "Sticker pack"
cost = 10

[leaderboard]
peers = [{ name = "Dana", coins = 42 }]
"#;
        fs::write(&path, content.trim()).expect("write config");

        let cfg = Config::load(&path).expect("load config");
        assert_eq!(cfg.goal_threshold, 500);
        assert_eq!(cfg.data_dir, PathBuf::from("state"));
        assert_eq!(cfg.data_dir_in(dir.path()), dir.path().join("state"));
        assert_eq!(cfg.lock_timeout_ms, 250);
        assert_eq!(cfg.task_catalog().expect("tasks").len(), 2);
        assert_eq!(
            cfg.reward_catalog().expect("rewards").find_reward(9).map(|r| r.cost),
            Some(10)
        );
        assert_eq!(cfg.leaderboard.peers.len(), 1);
    }

    #[test]
    fn zero_goal_rejected() {
        let dir = tempfile::tempdir().expect("tempdir");
        let path = dir.path().join(CONFIG_FILE);
        fs::write(&path, "goal_threshold = 0").expect("write config");

        let err = Config::load(&path).expect_err("invalid config");
        match err {
            crate::error::Error::InvalidConfig(_) => {}
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[test]
    fn duplicate_task_ids_rejected() {
        let dir = tempfile::tempdir().expect("tempdir");
        let path = dir.path().join(CONFIG_FILE);
        let content = r#"
[[tasks]]
id = 1
title = "one"
value = 1

[[tasks]]
id = 1
title = "again"
value = 2
"#;
        fs::write(&path, content.trim()).expect("write config");

        let err = Config::load(&path).expect_err("invalid config");
        assert!(matches!(err, crate::error::Error::InvalidConfig(_)));
    }

    #[test]
    fn negative_value_fails_to_parse() {
        let dir = tempfile::tempdir().expect("tempdir");
        let path = dir.path().join(CONFIG_FILE);
        fs::write(&path, "[[rewards]]\nid = 1\nlabel = \"x\"\ncost = -5\n").expect("write");

        let err = Config::load(&path).expect_err("negative cost");
        assert!(matches!(err, crate::error::Error::TomlParse(_)));
    }

    #[test]
    fn load_from_dir_defaults_when_missing() {
        let dir = tempfile::tempdir().expect("tempdir");
        let cfg = Config::load_from_dir(dir.path()).expect("defaults");
        assert_eq!(cfg.goal_threshold, 300);
    }
}

#![allow(dead_code)]

use std::fs;
use std::path::{Path, PathBuf};

use assert_cmd::Command;
use missions::catalog::{Reward, RewardCatalog, Task, TaskCatalog};
use serde_json::Value;
use tempfile::TempDir;

/// A scratch working directory for the CLI.
pub struct TestDir {
    dir: TempDir,
}

impl TestDir {
    pub fn new() -> Self {
        Self {
            dir: tempfile::tempdir().expect("failed to create tempdir"),
        }
    }

    pub fn path(&self) -> &Path {
        self.dir.path()
    }

    pub fn write_config(&self, contents: &str) -> std::io::Result<PathBuf> {
        let path = self.dir.path().join(".missions.toml");
        fs::write(&path, contents)?;
        Ok(path)
    }

    pub fn account_file(&self, file_stem: &str) -> PathBuf {
        self.dir
            .path()
            .join(".missions")
            .join("data")
            .join("accounts")
            .join(format!("{file_stem}.json"))
    }

    /// CLI invocation rooted at this directory with a clean environment.
    pub fn cmd(&self) -> Command {
        let mut cmd = Command::cargo_bin("missions").expect("binary");
        cmd.current_dir(self.dir.path())
            .env_remove("MISSIONS_ACCOUNT")
            .env_remove("MISSIONS_DIR")
            .env_remove("RUST_LOG");
        cmd
    }

    /// Run a command with `--json` and parse the envelope.
    pub fn json(&self, args: &[&str]) -> Value {
        let output = self
            .cmd()
            .args(args)
            .arg("--json")
            .assert()
            .success()
            .get_output()
            .stdout
            .clone();
        serde_json::from_slice(&output).expect("json envelope")
    }
}

/// Small catalog where reward 5 becomes reachable through completions.
pub fn scenario_catalogs() -> (TaskCatalog, RewardCatalog) {
    let tasks = TaskCatalog::new(vec![
        Task {
            id: 1,
            title: "Study the digital content for 1h".to_string(),
            value: 4,
        },
        Task {
            id: 2,
            title: "Present a banner at an event".to_string(),
            value: 200,
        },
        Task {
            id: 3,
            title: "Raise the grade average".to_string(),
            value: 50,
        },
    ])
    .expect("tasks");
    let rewards = RewardCatalog::new(vec![
        Reward {
            id: 1,
            label: "Digital certificate".to_string(),
            cost: 50,
        },
        Reward {
            id: 5,
            label: "10% tuition discount".to_string(),
            cost: 250,
        },
    ])
    .expect("rewards");
    (tasks, rewards)
}

pub const SCENARIO_CONFIG: &str = r#"
goal_threshold = 300

[[tasks]]
id = 1
title = "Study the digital content for 1h"
value = 4

[[tasks]]
id = 2
title = "Present a banner at an event"
value = 200

[[tasks]]
id = 3
title = "Raise the grade average"
value = 50

[[rewards]]
id = 1
label = "Digital certificate"
cost = 50

[[rewards]]
id = 5
label = "10% tuition discount"
cost = 250
"#;

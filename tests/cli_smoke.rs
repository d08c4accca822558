mod support;

use predicates::prelude::*;
use predicates::str::contains;

use support::TestDir;

#[test]
fn missions_help_works() {
    let dir = TestDir::new();
    dir.cmd()
        .arg("--help")
        .assert()
        .success()
        .stdout(contains("missions - semester missions and coin rewards"))
        .stdout(contains("Complete tasks to earn coins").not());
}

#[test]
fn subcommand_help_works() {
    let dir = TestDir::new();
    let subcommands = [
        "login",
        "logout",
        "whoami",
        "status",
        "tasks",
        "complete",
        "proof",
        "rewards",
        "redeem",
        "leaderboard",
    ];

    for cmd in subcommands {
        dir.cmd().arg(cmd).arg("--help").assert().success();
    }
}

//! missions status/leaderboard

use crate::error::Result;
use crate::output::{emit_success, progress_bar, Report};
use crate::projection::{Eligibility, TaskStatus};

use super::Context;

const BAR_WIDTH: usize = 20;

#[derive(serde::Serialize)]
struct StatusReport {
    account_id: String,
    display_name: String,
    balance: u64,
    goal_threshold: u64,
    progress_percent: u8,
    tasks_completed: usize,
    tasks_total: usize,
    rewards_claimed: usize,
    rewards_affordable: usize,
}

pub fn run_status(ctx: &Context) -> Result<()> {
    let account_id = ctx.account_id()?;
    let record = ctx.tracker.account(&account_id)?;
    let projection = ctx.tracker.project(&record.state);

    let count_rewards = |wanted: Eligibility| {
        projection
            .rewards
            .iter()
            .filter(|reward| reward.eligibility == wanted)
            .count()
    };
    let report_data = StatusReport {
        account_id: record.account_id.clone(),
        display_name: record.display_name.clone(),
        balance: projection.balance,
        goal_threshold: projection.goal_threshold,
        progress_percent: projection.progress_percent,
        tasks_completed: projection
            .tasks
            .iter()
            .filter(|task| task.status == TaskStatus::Completed)
            .count(),
        tasks_total: projection.tasks.len(),
        rewards_claimed: count_rewards(Eligibility::Claimed),
        rewards_affordable: count_rewards(Eligibility::Affordable),
    };

    let mut report = Report::new(format!("missions status: {}", record.display_name));
    report
        .fact("coins", report_data.balance)
        .fact(
            "progress",
            format!(
                "{} of {}",
                progress_bar(report_data.progress_percent, BAR_WIDTH),
                report_data.goal_threshold
            ),
        )
        .fact(
            "tasks",
            format!("{}/{}", report_data.tasks_completed, report_data.tasks_total),
        )
        .fact("rewards redeemed", report_data.rewards_claimed);
    if report_data.rewards_affordable > 0 {
        report.hint("missions rewards");
    }

    emit_success(ctx.output, "status", &report_data, &report)
}

pub fn run_leaderboard(ctx: &Context) -> Result<()> {
    let account_id = ctx.account_id()?;
    let board = ctx.tracker.leaderboard(&account_id)?;

    let mut report = Report::new("missions leaderboard");
    report.fact(
        format!("you: {}", board.you.display_name),
        format!("{} coins", board.you.coins),
    );
    for peer in &board.peers {
        report.line(format!("{}. {} - {} coins", peer.position, peer.name, peer.coins));
    }

    emit_success(ctx.output, "leaderboard", &board, &report)
}

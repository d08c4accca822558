//! missions rewards/redeem

use crate::catalog::RewardId;
use crate::error::Result;
use crate::events::EventKind;
use crate::output::{emit_success, Report};
use crate::projection::Eligibility;

use super::Context;

pub fn run_list(ctx: &Context) -> Result<()> {
    let account_id = ctx.account_id()?;
    let state = ctx.tracker.get_account_state(&account_id)?;
    let projection = ctx.tracker.project(&state);

    let mut report = Report::new(format!("missions rewards: {} coins available", projection.balance));
    for reward in &projection.rewards {
        let tag = match reward.eligibility {
            Eligibility::Claimed => "redeemed",
            Eligibility::Affordable => "available",
            Eligibility::Unaffordable => "locked",
        };
        report.line(format!(
            "{}. {} coins - {} [{tag}]",
            reward.id, reward.cost, reward.label
        ));
    }
    if projection
        .rewards
        .iter()
        .any(|reward| reward.eligibility == Eligibility::Affordable)
    {
        report.hint("missions redeem <reward>");
    }

    emit_success(ctx.output, "rewards", &projection.rewards, &report)
}

pub fn run_redeem(ctx: &mut Context, reward_id: RewardId) -> Result<()> {
    let account_id = ctx.account_id()?;
    let redemption = ctx.tracker.redeem_reward(&account_id, reward_id)?;

    let label = ctx
        .tracker
        .list_rewards()
        .iter()
        .find(|reward| reward.id == reward_id)
        .map(|reward| reward.label.clone())
        .unwrap_or_default();

    let mut report = Report::new(format!("missions redeem: {label}"));
    report
        .fact("cost", redemption.cost)
        .fact("coins", redemption.balance);
    ctx.record_event(EventKind::RewardRedeemed, &account_id, &redemption, &mut report);

    emit_success(ctx.output, "redeem", &redemption, &report)
}

//! missions tasks/complete/proof

use crate::catalog::TaskId;
use crate::error::Result;
use crate::events::EventKind;
use crate::ledger::Completion;
use crate::output::{emit_success, progress_bar, Report};
use crate::projection::TaskStatus;

use super::Context;

const BAR_WIDTH: usize = 20;

pub fn run_list(ctx: &Context) -> Result<()> {
    let account_id = ctx.account_id()?;
    let state = ctx.tracker.get_account_state(&account_id)?;
    let projection = ctx.tracker.project(&state);

    let completed = projection
        .tasks
        .iter()
        .filter(|task| task.status == TaskStatus::Completed)
        .count();

    let mut report = Report::new(format!(
        "missions tasks: {completed}/{} completed",
        projection.tasks.len()
    ));
    report
        .fact("coins", projection.balance)
        .fact("progress", progress_bar(projection.progress_percent, BAR_WIDTH));
    for task in &projection.tasks {
        let mark = match task.status {
            TaskStatus::Completed => "x",
            TaskStatus::Available => " ",
        };
        let proof = task
            .proof
            .as_deref()
            .map(|name| format!(" proof: {name}"))
            .unwrap_or_default();
        report.line(format!(
            "[{mark}] {}. {} ({} coins){proof}",
            task.id, task.title, task.value
        ));
    }
    if completed < projection.tasks.len() {
        report.hint("missions complete <task> [--proof <file>]");
    }

    emit_success(ctx.output, "tasks", &projection.tasks, &report)
}

pub fn run_complete(ctx: &mut Context, task_id: TaskId, proof: Option<&str>) -> Result<()> {
    let account_id = ctx.account_id()?;
    let completion = ctx.tracker.complete_task(&account_id, task_id, proof)?;
    let proof = proof.map(str::trim);

    let mut report = match &completion {
        Completion::Completed { awarded, balance, .. } => {
            let mut report = Report::new(format!("missions complete: task {task_id} (+{awarded} coins)"));
            report.fact("coins", balance);
            if let Some(name) = proof {
                report.fact("proof", name);
            }
            ctx.record_event(
                EventKind::TaskCompleted,
                &account_id,
                &serde_json::json!({
                    "task_id": task_id,
                    "awarded": awarded,
                    "balance": balance,
                    "proof": proof,
                }),
                &mut report,
            );
            report
        }
        Completion::AlreadyCompleted { balance, .. } => {
            let mut report = Report::new(format!("missions complete: task {task_id} already completed"));
            report.fact("coins", balance);
            if proof.is_some() {
                report.warn(format!(
                    "proof ignored; use `missions proof {task_id} <file>` to replace it"
                ));
            }
            report
        }
    };
    report.hint("missions rewards");

    emit_success(ctx.output, "complete", &completion, &report)
}

pub fn run_proof(ctx: &mut Context, task_id: TaskId, artifact: &str) -> Result<()> {
    let account_id = ctx.account_id()?;
    let proof = ctx.tracker.attach_proof(&account_id, task_id, artifact)?;

    let mut report = Report::new(format!("missions proof: task {task_id}"));
    report.fact("artifact", &proof.artifact_name);
    ctx.record_event(EventKind::ProofAttached, &account_id, &proof, &mut report);

    emit_success(ctx.output, "proof", &proof, &report)
}

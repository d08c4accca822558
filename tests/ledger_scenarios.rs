mod support;

use missions::error::Error;
use missions::leaderboard::StaticFeed;
use missions::ledger::{AccountState, Completion, Rejection};
use missions::projection::ProgressProjector;
use missions::store::{AccountStore, MemoryStore};
use missions::tracker::Tracker;

use support::scenario_catalogs;

const ACCOUNT: &str = "ana@uni.edu";

fn tracker() -> Tracker<MemoryStore> {
    let (tasks, rewards) = scenario_catalogs();
    let tracker = Tracker::new(
        tasks,
        rewards,
        300,
        MemoryStore::new(),
        Box::new(StaticFeed::default()),
    );
    tracker.login(ACCOUNT, "Ana Souza").expect("login");
    tracker
}

#[test]
fn earn_then_redeem_once() {
    let tracker = tracker();
    assert_eq!(tracker.get_account_state(ACCOUNT).unwrap().balance, 0);

    let completion = tracker.complete_task(ACCOUNT, 1, None).unwrap();
    assert_eq!(
        completion,
        Completion::Completed {
            task_id: 1,
            awarded: 4,
            balance: 4
        }
    );
    let state = tracker.get_account_state(ACCOUNT).unwrap();
    assert_eq!(state.balance, 4);
    assert_eq!(state.completed_tasks.iter().copied().collect::<Vec<_>>(), vec![1]);

    let err = tracker.redeem_reward(ACCOUNT, 5).unwrap_err();
    assert_eq!(
        err.rejection(),
        Some(&Rejection::InsufficientBalance { balance: 4, cost: 250 })
    );
    assert_eq!(tracker.get_account_state(ACCOUNT).unwrap().balance, 4);

    tracker.complete_task(ACCOUNT, 2, None).unwrap();
    tracker.complete_task(ACCOUNT, 3, None).unwrap();
    assert_eq!(tracker.get_account_state(ACCOUNT).unwrap().balance, 254);

    let redemption = tracker.redeem_reward(ACCOUNT, 5).unwrap();
    assert_eq!(redemption.cost, 250);
    assert_eq!(redemption.balance, 4);
    let state = tracker.get_account_state(ACCOUNT).unwrap();
    assert_eq!(state.claimed_rewards.iter().copied().collect::<Vec<_>>(), vec![5]);

    let err = tracker.redeem_reward(ACCOUNT, 5).unwrap_err();
    assert_eq!(err.rejection(), Some(&Rejection::AlreadyClaimed(5)));
    assert_eq!(tracker.get_account_state(ACCOUNT).unwrap(), state);
}

#[test]
fn repeated_completion_keeps_first_proof() {
    let tracker = tracker();
    tracker.complete_task(ACCOUNT, 3, Some("grades.pdf")).unwrap();

    let again = tracker.complete_task(ACCOUNT, 3, Some("other.pdf")).unwrap();
    assert_eq!(
        again,
        Completion::AlreadyCompleted {
            task_id: 3,
            balance: 50
        }
    );
    let state = tracker.get_account_state(ACCOUNT).unwrap();
    assert_eq!(state.proof(3).unwrap().artifact_name, "grades.pdf");

    let replaced = tracker.attach_proof(ACCOUNT, 3, "other.pdf").unwrap();
    assert_eq!(replaced.artifact_name, "other.pdf");
    assert_eq!(tracker.get_account_state(ACCOUNT).unwrap().balance, 50);
}

#[test]
fn blank_proof_rejects_completion() {
    let tracker = tracker();
    let err = tracker.complete_task(ACCOUNT, 1, Some("  ")).unwrap_err();
    assert_eq!(err.rejection(), Some(&Rejection::EmptyArtifact));

    let state = tracker.get_account_state(ACCOUNT).unwrap();
    assert_eq!(state, AccountState::new());
}

#[test]
fn unknown_account_is_reported() {
    let tracker = tracker();
    let err = tracker.complete_task("nobody", 1, None).unwrap_err();
    assert!(matches!(err, Error::AccountNotFound(id) if id == "nobody"));
}

#[test]
fn relogin_keeps_balance() {
    let tracker = tracker();
    tracker.complete_task(ACCOUNT, 3, None).unwrap();

    let session = tracker.login(ACCOUNT, "Ana S.").unwrap();
    assert!(!session.created);
    assert_eq!(session.balance, 50);
    assert_eq!(session.display_name, "Ana S.");
}

#[test]
fn progress_is_clamped_at_goal() {
    let (tasks, rewards) = scenario_catalogs();
    let projector = ProgressProjector::new(&tasks, &rewards, 300);

    let mut state = AccountState::new();
    state.balance = 150;
    assert_eq!(projector.progress_percent(&state), 50);

    state.balance = 450;
    assert_eq!(projector.progress_percent(&state), 100);
}

#[test]
fn projection_follows_ledger() {
    let tracker = tracker();
    tracker.complete_task(ACCOUNT, 2, None).unwrap();
    tracker.complete_task(ACCOUNT, 3, None).unwrap();
    tracker.redeem_reward(ACCOUNT, 1).unwrap();

    let projection = tracker.project(&tracker.get_account_state(ACCOUNT).unwrap());
    assert_eq!(projection.balance, 200);
    assert_eq!(projection.progress_percent, 66);

    let eligibility: Vec<_> = projection
        .rewards
        .iter()
        .map(|reward| serde_json::to_value(reward.eligibility).unwrap())
        .collect();
    assert_eq!(eligibility, vec!["claimed", "unaffordable"]);
}

#[test]
fn store_rejects_tampered_balance() {
    let tracker = tracker();
    tracker
        .store()
        .with_account(ACCOUNT, |record| {
            record.state.balance = 1000;
            Ok(())
        })
        .unwrap();

    let err = tracker.redeem_reward(ACCOUNT, 1).unwrap_err();
    assert!(matches!(err, Error::CorruptAccount { .. }));
    assert_eq!(err.exit_code(), 4);
}

mod support;

use std::sync::Arc;
use std::thread;

use missions::leaderboard::StaticFeed;
use missions::ledger::Rejection;
use missions::storage::Storage;
use missions::store::{AccountStore, FileStore, MemoryStore};
use missions::tracker::Tracker;

use support::scenario_catalogs;

const THREADS: usize = 8;

fn tracker_with<S: AccountStore>(store: S) -> Tracker<S> {
    let (tasks, rewards) = scenario_catalogs();
    Tracker::new(tasks, rewards, 300, store, Box::new(StaticFeed::default()))
}

/// Fund `account` with 254 coins and race THREADS redemptions of reward 5.
fn race_redemptions<S: AccountStore + 'static>(tracker: Arc<Tracker<S>>, account: &'static str) {
    tracker.login(account, "Racer").unwrap();
    for id in 1..=3 {
        tracker.complete_task(account, id, None).unwrap();
    }

    let handles: Vec<_> = (0..THREADS)
        .map(|_| {
            let tracker = Arc::clone(&tracker);
            thread::spawn(move || tracker.redeem_reward(account, 5))
        })
        .collect();

    let mut successes = 0;
    for handle in handles {
        match handle.join().unwrap() {
            Ok(redemption) => {
                successes += 1;
                assert_eq!(redemption.balance, 4);
            }
            Err(err) => assert_eq!(err.rejection(), Some(&Rejection::AlreadyClaimed(5))),
        }
    }
    assert_eq!(successes, 1);

    let state = tracker.get_account_state(account).unwrap();
    assert_eq!(state.balance, 4);
    assert_eq!(state.claimed_rewards.len(), 1);
}

#[test]
fn memory_store_single_redemption() {
    race_redemptions(Arc::new(tracker_with(MemoryStore::new())), "ana@uni.edu");
}

#[test]
fn file_store_single_redemption() {
    let temp = tempfile::tempdir().unwrap();
    let store = FileStore::new(Storage::new(temp.path().join("data")), 10_000);
    race_redemptions(Arc::new(tracker_with(store)), "ana@uni.edu");
}

#[test]
fn file_store_concurrent_completions_all_count() {
    let temp = tempfile::tempdir().unwrap();
    let store = FileStore::new(Storage::new(temp.path().join("data")), 10_000);
    let tracker = Arc::new(tracker_with(store));
    tracker.login("bob@uni.edu", "Bob").unwrap();

    let handles: Vec<_> = (1..=3)
        .flat_map(|id| std::iter::repeat(id).take(3))
        .map(|id| {
            let tracker = Arc::clone(&tracker);
            thread::spawn(move || tracker.complete_task("bob@uni.edu", id, None))
        })
        .collect();
    for handle in handles {
        handle.join().unwrap().unwrap();
    }

    let state = tracker.get_account_state("bob@uni.edu").unwrap();
    assert_eq!(state.balance, 254);
    assert_eq!(state.completed_tasks.len(), 3);
}

#[test]
fn distinct_accounts_progress_independently() {
    let tracker = Arc::new(tracker_with(MemoryStore::new()));
    let accounts: Vec<String> = (0..THREADS).map(|i| format!("user{i}@uni.edu")).collect();

    let handles: Vec<_> = accounts
        .iter()
        .cloned()
        .map(|account| {
            let tracker = Arc::clone(&tracker);
            thread::spawn(move || -> missions::Result<u64> {
                tracker.login(&account, "Student")?;
                tracker.complete_task(&account, 3, None)?;
                Ok(tracker.redeem_reward(&account, 1)?.balance)
            })
        })
        .collect();
    for handle in handles {
        assert_eq!(handle.join().unwrap().unwrap(), 0);
    }

    for account in &accounts {
        let state = tracker.get_account_state(account).unwrap();
        assert!(state.is_claimed(1));
        assert!(state.is_completed(3));
    }
}

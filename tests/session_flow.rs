//! End-to-end tests over the public engine API: session lifecycle,
//! settlement guarantees, decision flow, and the timeout watchdog.

use std::sync::atomic::{AtomicU32, Ordering};
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use chatcraps::{
    BetType, BroadcastChannel, Decision, DiceRoller, EconomicLedger, Error, InMemoryLedger,
    LifecycleConfig, LifecycleState, NullChannel, PlayerId, Result, ScriptedRoller,
    SessionManager, UpdateReason,
};

const PLAYER: PlayerId = 7;

fn scripted(rolls: &[(u8, u8)]) -> Box<dyn DiceRoller> {
    Box::new(ScriptedRoller::new(rolls).unwrap())
}

fn manager_with(balance: u64, config: LifecycleConfig) -> (SessionManager, Arc<InMemoryLedger>) {
    let ledger = Arc::new(InMemoryLedger::new());
    ledger.credit(PLAYER, balance);
    let manager = SessionManager::new(
        Arc::clone(&ledger) as Arc<dyn EconomicLedger>,
        Arc::new(NullChannel),
        config,
    );
    (manager, ledger)
}

/// Ledger wrapper that rejects the first N settlements
struct FlakyLedger {
    inner: InMemoryLedger,
    failures_left: AtomicU32,
}

impl FlakyLedger {
    fn new(player: PlayerId, balance: u64, failures: u32) -> Self {
        let inner = InMemoryLedger::new();
        inner.credit(player, balance);
        Self { inner, failures_left: AtomicU32::new(failures) }
    }
}

#[async_trait]
impl EconomicLedger for FlakyLedger {
    async fn balance(&self, player: PlayerId) -> Result<u64> {
        self.inner.balance(player).await
    }

    async fn apply_profit(&self, player: PlayerId, delta: i64) -> Result<u64> {
        if self.failures_left.load(Ordering::SeqCst) > 0 {
            self.failures_left.fetch_sub(1, Ordering::SeqCst);
            return Err(Error::ledger("wallet service unavailable"));
        }
        self.inner.apply_profit(player, delta).await
    }
}

async fn wait_for_teardown(manager: &SessionManager) {
    let deadline = tokio::time::Instant::now() + Duration::from_secs(5);
    while manager.active_sessions() > 0 {
        assert!(
            tokio::time::Instant::now() < deadline,
            "session was never torn down"
        );
        tokio::time::sleep(Duration::from_millis(10)).await;
    }
}

#[tokio::test]
async fn seven_out_tears_down_and_settles_once() {
    let (manager, ledger) = manager_with(1_000, LifecycleConfig::default());
    manager
        .start_session_with_roller(PLAYER, 100, scripted(&[(2, 2), (3, 4)]))
        .await
        .unwrap();

    let (outcome, snapshot) = manager.roll(PLAYER).await.unwrap();
    assert_eq!(outcome.point_established, Some(4));
    assert_eq!(snapshot.lifecycle, LifecycleState::Active);

    let (outcome, snapshot) = manager.roll(PLAYER).await.unwrap();
    assert!(outcome.seven_out);
    assert!(snapshot.game_over);
    assert_eq!(snapshot.session_profit, -100);

    // settled exactly once and removed
    assert_eq!(ledger.balance(PLAYER).await.unwrap(), 900);
    assert_eq!(manager.active_sessions(), 0);
    assert!(matches!(manager.roll(PLAYER).await.unwrap_err(), Error::SessionNotFound));
}

#[tokio::test]
async fn placement_rules_enforced_through_manager() {
    let (manager, _) = manager_with(1_000, LifecycleConfig::default());
    manager
        .start_session_with_roller(PLAYER, 600, scripted(&[(2, 2)]))
        .await
        .unwrap();

    // come bets need a point
    let err = manager.place_bet(PLAYER, BetType::Come, 50).await.unwrap_err();
    assert!(matches!(err, Error::InvalidBet(_)));

    // committed stakes count against the balance
    let err = manager.place_bet(PLAYER, BetType::Field, 500).await.unwrap_err();
    assert!(matches!(err, Error::InsufficientChips { required: 500, available: 400 }));

    // duplicate bet types are rejected
    manager.place_bet(PLAYER, BetType::Field, 100).await.unwrap();
    let err = manager.place_bet(PLAYER, BetType::Field, 100).await.unwrap_err();
    assert!(matches!(err, Error::DuplicateBet(_)));
}

#[tokio::test]
async fn take_down_through_manager() {
    let (manager, _) = manager_with(10_000, LifecycleConfig::default());
    manager
        .start_session_with_roller(PLAYER, 100, scripted(&[(2, 2), (4, 4)]))
        .await
        .unwrap();

    manager.roll(PLAYER).await.unwrap(); // point 4
    manager.place_bet(PLAYER, BetType::Place8, 60).await.unwrap();
    let (outcome, snapshot) = manager.roll(PLAYER).await.unwrap(); // 8 the hard way
    assert_eq!(outcome.pending.get(&BetType::Place8), Some(&70));
    assert!(snapshot.actions.decidable.contains(&BetType::Place8));

    let (decided, snapshot) = manager
        .decide(PLAYER, BetType::Place8, Decision::TakeDown)
        .await
        .unwrap();
    assert_eq!(decided.winnings, 70);
    assert_eq!(decided.returned_stake, Some(60));
    assert!(snapshot.bets.iter().all(|line| line.bet_type != BetType::Place8));
    // the winnings were paid with the roll and stay in the session profit
    assert_eq!(snapshot.session_profit, 70);

    let err = manager
        .decide(PLAYER, BetType::Place8, Decision::Keep)
        .await
        .unwrap_err();
    assert!(matches!(err, Error::NoPendingDecision(_)));
}

#[tokio::test]
async fn keep_leaves_stake_riding() {
    let (manager, _) = manager_with(10_000, LifecycleConfig::default());
    manager
        .start_session_with_roller(PLAYER, 100, scripted(&[(2, 2), (4, 4)]))
        .await
        .unwrap();

    manager.roll(PLAYER).await.unwrap();
    manager.place_bet(PLAYER, BetType::Place8, 60).await.unwrap();
    manager.roll(PLAYER).await.unwrap();

    let (decided, snapshot) = manager
        .decide(PLAYER, BetType::Place8, Decision::Keep)
        .await
        .unwrap();
    assert_eq!(decided.returned_stake, None);
    let place8 = snapshot
        .bets
        .iter()
        .find(|line| line.bet_type == BetType::Place8)
        .expect("kept bet still staked");
    assert_eq!(place8.amount, 60);
}

#[tokio::test]
async fn session_times_out_and_resumes() {
    let config = LifecycleConfig {
        inactivity_timeout: Duration::from_millis(80),
        hard_timeout: Duration::from_secs(30),
        check_interval: Duration::from_millis(10),
    };
    let (manager, _) = manager_with(1_000, config);
    manager
        .start_session_with_roller(PLAYER, 100, scripted(&[(3, 4)]))
        .await
        .unwrap();

    tokio::time::sleep(Duration::from_millis(200)).await;
    let snapshot = manager.snapshot(PLAYER).await.unwrap();
    assert_eq!(snapshot.lifecycle, LifecycleState::TimedOut);
    assert!(snapshot.actions.can_resume);
    assert!(!snapshot.actions.can_roll);

    // no actions except resume while suspended
    assert!(matches!(manager.roll(PLAYER).await.unwrap_err(), Error::SessionTimedOut));
    assert!(matches!(
        manager.place_bet(PLAYER, BetType::Field, 10).await.unwrap_err(),
        Error::SessionTimedOut
    ));

    let snapshot = manager.resume(PLAYER).await.unwrap();
    assert_eq!(snapshot.lifecycle, LifecycleState::Active);
    let (outcome, _) = manager.roll(PLAYER).await.unwrap();
    assert_eq!(outcome.roll.total(), 7);

    // resuming an active session is a rejection
    assert!(matches!(manager.resume(PLAYER).await.unwrap_err(), Error::SessionActive));
}

#[tokio::test]
async fn auto_close_settles_exactly_once_despite_resume_race() {
    let config = LifecycleConfig {
        inactivity_timeout: Duration::from_millis(40),
        hard_timeout: Duration::from_millis(60),
        check_interval: Duration::from_millis(10),
    };
    let (manager, ledger) = manager_with(1_000, config);
    manager
        .start_session_with_roller(PLAYER, 100, scripted(&[(3, 4)]))
        .await
        .unwrap();

    // bank a natural win so settlement moves real money
    manager.roll(PLAYER).await.unwrap();

    // idle up to the hard expiry, then race resume attempts against the
    // watchdog's auto-close
    tokio::time::sleep(Duration::from_millis(95)).await;
    let attempts = futures::future::join_all((0..4).map(|_| {
        let manager = manager.clone();
        async move { manager.resume(PLAYER).await }
    }))
    .await;
    // at most one racer can have won the resume
    assert!(attempts.iter().filter(|result| result.is_ok()).count() <= 1);

    // with nobody touching the table the session must close; however the
    // race fell, the +100 profit lands exactly once
    wait_for_teardown(&manager).await;
    assert_eq!(ledger.balance(PLAYER).await.unwrap(), 1_100);
}

#[tokio::test]
async fn failed_settlement_is_retried_not_duplicated() {
    let config = LifecycleConfig {
        inactivity_timeout: Duration::from_secs(30),
        hard_timeout: Duration::from_secs(30),
        check_interval: Duration::from_millis(20),
    };
    let ledger = Arc::new(FlakyLedger::new(PLAYER, 1_000, 2));
    let manager = SessionManager::new(
        Arc::clone(&ledger) as Arc<dyn EconomicLedger>,
        Arc::new(NullChannel),
        config,
    );
    manager
        .start_session_with_roller(PLAYER, 100, scripted(&[(2, 2), (3, 4)]))
        .await
        .unwrap();

    manager.roll(PLAYER).await.unwrap();
    let (outcome, _) = manager.roll(PLAYER).await.unwrap();
    assert!(outcome.seven_out);

    // the first settlement attempt failed: terminal but still registered,
    // and no further player actions are accepted
    assert_eq!(manager.active_sessions(), 1);
    assert!(matches!(manager.roll(PLAYER).await.unwrap_err(), Error::SessionOver));
    assert_eq!(ledger.balance(PLAYER).await.unwrap(), 1_000);

    // the watchdog keeps retrying until the ledger confirms, exactly once
    wait_for_teardown(&manager).await;
    assert_eq!(ledger.balance(PLAYER).await.unwrap(), 900);
}

#[tokio::test]
async fn concurrent_rolls_serialize() {
    let (manager, _) = manager_with(10_000, LifecycleConfig::default());
    manager
        .start_session_with_roller(PLAYER, 100, scripted(&[(3, 4)]))
        .await
        .unwrap();

    // both rolls run; the per-session lock serializes them instead of
    // interleaving a double resolution
    let (first, second) = futures::join!(manager.roll(PLAYER), manager.roll(PLAYER));
    first.unwrap();
    second.unwrap();

    // the natural paid once; the second roll found an empty table
    let snapshot = manager.snapshot(PLAYER).await.unwrap();
    assert_eq!(snapshot.session_profit, 100);
}

#[tokio::test]
async fn updates_flow_to_presentation() {
    let ledger = Arc::new(InMemoryLedger::new());
    ledger.credit(PLAYER, 1_000);
    let channel = Arc::new(BroadcastChannel::new(32));
    let mut updates = channel.subscribe();
    let manager = SessionManager::new(
        Arc::clone(&ledger) as Arc<dyn EconomicLedger>,
        channel,
        LifecycleConfig::default(),
    );

    manager
        .start_session_with_roller(PLAYER, 100, scripted(&[(3, 4)]))
        .await
        .unwrap();
    let update = updates.recv().await.unwrap();
    assert_eq!(update.reason, UpdateReason::SessionStarted);
    assert!(update.snapshot.actions.can_roll);

    manager.roll(PLAYER).await.unwrap();
    let update = updates.recv().await.unwrap();
    assert_eq!(update.reason, UpdateReason::Rolled);
    assert_eq!(update.snapshot.narrative, vec!["Pass Line wins 100.".to_string()]);
    assert_eq!(update.snapshot.session_profit, 100);
}

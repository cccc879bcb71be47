//! Session registry, per-player action serialization, and the timeout
//! watchdog.
//!
//! Every session lives behind one `tokio::sync::Mutex`; player actions and
//! watchdog transitions all take that lock, so lifecycle changes can never
//! race a concurrent action. Settlement against the economic ledger happens
//! at most once per session: the settled flag only flips under the lock
//! after the ledger confirms, and a failed settlement is retried by the
//! watchdog on its next tick.

use std::sync::Arc;
use std::time::Instant;

use dashmap::mapref::entry::Entry;
use dashmap::DashMap;
use tokio::sync::Mutex;
use tokio::task::JoinHandle;
use tokio::time::interval;
use tracing::{debug, info, warn};

use crate::craps::decisions::Decision;
use crate::craps::{BetType, DiceRoller, PlayerId, RandomRoller, RollOutcome};
use crate::economy::EconomicLedger;
use crate::error::{Error, Result};
use crate::presentation::{PresentationChannel, TableSnapshot, TableUpdate, UpdateReason};

use super::lifecycle::{LifecycleConfig, LivenessCheck};
use super::{CrapsSession, DecisionOutcome};

/// One registered session plus its watchdog task
struct SessionHandle {
    session: Mutex<CrapsSession>,
    watchdog: parking_lot::Mutex<Option<JoinHandle<()>>>,
}

/// Registry of live sessions, at most one per player
#[derive(Clone)]
pub struct SessionManager {
    sessions: Arc<DashMap<PlayerId, Arc<SessionHandle>>>,
    economy: Arc<dyn EconomicLedger>,
    presentation: Arc<dyn PresentationChannel>,
    config: LifecycleConfig,
}

impl SessionManager {
    pub fn new(
        economy: Arc<dyn EconomicLedger>,
        presentation: Arc<dyn PresentationChannel>,
        config: LifecycleConfig,
    ) -> Self {
        Self {
            sessions: Arc::new(DashMap::new()),
            economy,
            presentation,
            config,
        }
    }

    /// Start a session with the standard random roller
    pub async fn start_session(&self, player: PlayerId, wager: u64) -> Result<TableSnapshot> {
        self.start_session_with_roller(player, wager, Box::new(RandomRoller::new()))
            .await
    }

    /// Start a session with a caller-supplied roller (seeded demos, tests)
    pub async fn start_session_with_roller(
        &self,
        player: PlayerId,
        wager: u64,
        roller: Box<dyn DiceRoller>,
    ) -> Result<TableSnapshot> {
        if self.sessions.contains_key(&player) {
            return Err(Error::SessionExists);
        }
        let balance = self.economy.balance(player).await?;
        if wager > balance {
            return Err(Error::InsufficientChips { required: wager, available: balance });
        }

        let session = CrapsSession::new(player, wager, roller)?;
        let snapshot = session.snapshot();
        let handle = Arc::new(SessionHandle {
            session: Mutex::new(session),
            watchdog: parking_lot::Mutex::new(None),
        });
        match self.sessions.entry(player) {
            Entry::Occupied(_) => return Err(Error::SessionExists),
            Entry::Vacant(vacant) => {
                vacant.insert(Arc::clone(&handle));
            }
        }
        let watchdog = self.spawn_watchdog(player, Arc::clone(&handle));
        *handle.watchdog.lock() = Some(watchdog);

        info!(player, session = %snapshot.session_id, wager, "craps session started");
        self.render(player, UpdateReason::SessionStarted, snapshot.clone()).await;
        Ok(snapshot)
    }

    /// Open an additional bet on the player's table
    pub async fn place_bet(
        &self,
        player: PlayerId,
        bet_type: BetType,
        amount: u64,
    ) -> Result<TableSnapshot> {
        let handle = self.handle(player)?;
        let mut session = handle.session.lock().await;
        let balance = self.economy.balance(player).await?;
        session.place_bet(bet_type, amount, balance)?;
        debug!(player, bet = bet_type.wire_name(), amount, "bet placed");
        let snapshot = session.snapshot();
        drop(session);
        self.render(player, UpdateReason::BetPlaced, snapshot.clone()).await;
        Ok(snapshot)
    }

    /// Roll the dice. On seven-out the session is settled and removed
    /// before this returns; if the ledger write fails the session stays
    /// registered (terminal, unsettled) and the watchdog retries.
    pub async fn roll(&self, player: PlayerId) -> Result<(RollOutcome, TableSnapshot)> {
        let handle = self.handle(player)?;
        let mut session = handle.session.lock().await;
        let outcome = session.roll()?;
        debug!(player, roll = %outcome.roll.display(), profit = outcome.profit, "dice rolled");

        if session.is_over() {
            match self.settle_locked(&mut session).await {
                Ok(profit) => {
                    info!(player, profit, "session settled after seven-out");
                    let snapshot = session.snapshot();
                    drop(session);
                    self.remove_session(player);
                    self.render(player, UpdateReason::SevenOut, snapshot.clone()).await;
                    return Ok((outcome, snapshot));
                }
                Err(err) => {
                    warn!(player, error = %err, "seven-out settlement failed; watchdog will retry");
                    let snapshot = session.snapshot();
                    drop(session);
                    self.render(player, UpdateReason::SevenOut, snapshot.clone()).await;
                    return Ok((outcome, snapshot));
                }
            }
        }

        let snapshot = session.snapshot();
        drop(session);
        self.render(player, UpdateReason::Rolled, snapshot.clone()).await;
        Ok((outcome, snapshot))
    }

    /// Answer a pending keep/take-down decision
    pub async fn decide(
        &self,
        player: PlayerId,
        bet_type: BetType,
        decision: Decision,
    ) -> Result<(DecisionOutcome, TableSnapshot)> {
        let handle = self.handle(player)?;
        let mut session = handle.session.lock().await;
        let decided = session.decide(bet_type, decision)?;
        debug!(player, bet = bet_type.wire_name(), ?decision, "decision resolved");
        let snapshot = session.snapshot();
        drop(session);
        self.render(player, UpdateReason::DecisionResolved, snapshot.clone()).await;
        Ok((decided, snapshot))
    }

    /// Bring a timed-out session back to life
    pub async fn resume(&self, player: PlayerId) -> Result<TableSnapshot> {
        let handle = self.handle(player)?;
        let mut session = handle.session.lock().await;
        session.resume()?;
        info!(player, "session resumed");
        let snapshot = session.snapshot();
        drop(session);
        self.render(player, UpdateReason::Resumed, snapshot.clone()).await;
        Ok(snapshot)
    }

    /// Current table state for a player
    pub async fn snapshot(&self, player: PlayerId) -> Result<TableSnapshot> {
        let handle = self.handle(player)?;
        let session = handle.session.lock().await;
        Ok(session.snapshot())
    }

    pub fn active_sessions(&self) -> usize {
        self.sessions.len()
    }

    fn handle(&self, player: PlayerId) -> Result<Arc<SessionHandle>> {
        self.sessions
            .get(&player)
            .map(|entry| Arc::clone(entry.value()))
            .ok_or(Error::SessionNotFound)
    }

    /// Apply the session's accumulated profit to the economic ledger,
    /// at most once. Caller must hold the session lock.
    async fn settle_locked(&self, session: &mut CrapsSession) -> Result<i64> {
        if session.is_settled() {
            return Err(Error::AlreadySettled);
        }
        let profit = session.session_profit();
        self.economy.apply_profit(session.player(), profit).await?;
        session.mark_settled();
        Ok(profit)
    }

    /// Drop a settled session and cancel its watchdog
    fn remove_session(&self, player: PlayerId) {
        if let Some((_, handle)) = self.sessions.remove(&player) {
            if let Some(watchdog) = handle.watchdog.lock().take() {
                watchdog.abort();
            }
        }
    }

    async fn render(&self, player: PlayerId, reason: UpdateReason, snapshot: TableSnapshot) {
        self.presentation
            .render(TableUpdate { player, reason, snapshot })
            .await;
    }

    /// Per-session liveness monitor. Shares the session mutex with player
    /// actions, so a suspension can never interleave with a roll. Exits
    /// when the session settles; removes itself from the registry rather
    /// than aborting its own task.
    fn spawn_watchdog(&self, player: PlayerId, handle: Arc<SessionHandle>) -> JoinHandle<()> {
        let manager = self.clone();
        tokio::spawn(async move {
            let mut ticker = interval(manager.config.check_interval);
            ticker.tick().await; // the first tick completes immediately
            loop {
                ticker.tick().await;
                let mut session = handle.session.lock().await;
                if session.is_settled() {
                    break;
                }
                if session.is_over() {
                    // a settlement that failed in the action path
                    match manager.settle_locked(&mut session).await {
                        Ok(profit) => {
                            info!(player, profit, "deferred settlement succeeded");
                            drop(session);
                            manager.sessions.remove(&player);
                            break;
                        }
                        Err(err) => {
                            warn!(player, error = %err, "deferred settlement failed; retrying");
                            continue;
                        }
                    }
                }
                let check = manager.config.evaluate(
                    session.lifecycle(),
                    session.last_action(),
                    session.timed_out_at(),
                    Instant::now(),
                );
                match check {
                    LivenessCheck::Healthy => {}
                    LivenessCheck::SuspendNow => {
                        session.mark_timed_out(Instant::now());
                        info!(player, "session timed out after inactivity");
                        let snapshot = session.snapshot();
                        drop(session);
                        manager.render(player, UpdateReason::TimedOut, snapshot).await;
                    }
                    LivenessCheck::AutoCloseNow => {
                        session.mark_auto_closed();
                        match manager.settle_locked(&mut session).await {
                            Ok(profit) => {
                                info!(player, profit, "session auto-closed and settled");
                                let snapshot = session.snapshot();
                                drop(session);
                                manager.sessions.remove(&player);
                                manager.render(player, UpdateReason::AutoClosed, snapshot).await;
                                break;
                            }
                            Err(err) => {
                                warn!(player, error = %err, "auto-close settlement failed; retrying");
                            }
                        }
                    }
                }
            }
            debug!(player, "watchdog stopped");
        })
    }
}

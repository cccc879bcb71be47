//! Renderable snapshots and the presentation channel contract.
//!
//! The engine never builds platform embeds or buttons; after every visible
//! state change it hands the surface a [`TableUpdate`] carrying a full
//! [`TableSnapshot`] plus the set of actions currently legal, and the
//! surface re-renders however it likes.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tokio::sync::broadcast;
use uuid::Uuid;

use crate::craps::{BetType, PlayerId, TablePhase};
use crate::session::lifecycle::LifecycleState;
use crate::utils::format_chips_short;

/// One open bet, pre-labelled for display
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BetLine {
    pub bet_type: BetType,
    pub label: String,
    pub amount: u64,
}

/// Actions the player may take right now
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AvailableActions {
    pub can_roll: bool,
    pub can_resume: bool,
    /// Bet types that may be opened in the current phase
    pub placeable: Vec<BetType>,
    /// Bets with a keep/take-down decision outstanding
    pub decidable: Vec<BetType>,
}

/// Full renderable state of one session
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TableSnapshot {
    pub session_id: Uuid,
    pub player: PlayerId,
    pub phase: TablePhase,
    pub point: Option<u8>,
    pub bets: Vec<BetLine>,
    pub come_points: Vec<(u8, u64)>,
    pub pending_decisions: Vec<(BetType, u64)>,
    pub last_roll: Option<String>,
    /// Narrative of the most recent visible event, ordered for display
    pub narrative: Vec<String>,
    pub session_profit: i64,
    pub lifecycle: LifecycleState,
    pub game_over: bool,
    pub created_at: DateTime<Utc>,
    pub actions: AvailableActions,
}

impl TableSnapshot {
    /// Text rendering of the felt: the point-number strip with POINT/PL/C
    /// markers, then the staked bet rows.
    pub fn layout(&self) -> String {
        let mut strip = Vec::with_capacity(6);
        for number in crate::craps::POINT_NUMBERS {
            let mut markers = Vec::new();
            if self.point == Some(number) {
                markers.push("POINT".to_string());
            }
            if self
                .bets
                .iter()
                .any(|line| line.bet_type.place_number() == Some(number))
            {
                markers.push("PL".to_string());
            }
            if let Some(&(_, amount)) = self.come_points.iter().find(|(p, _)| *p == number) {
                markers.push(format!("C{}", format_chips_short(amount)));
            }
            if markers.is_empty() {
                strip.push(format!("[{number}]"));
            } else {
                strip.push(format!("[{number} {}]", markers.join(":")));
            }
        }

        let mut sections = vec![strip.join(" ")];
        let rows: Vec<String> = self
            .bets
            .iter()
            .map(|line| format!("{}: {}", line.label, format_chips_short(line.amount)))
            .collect();
        if !rows.is_empty() {
            sections.push(rows.join(" | "));
        }
        sections.join("\n")
    }
}

/// Why a re-render is being requested
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum UpdateReason {
    SessionStarted,
    BetPlaced,
    Rolled,
    DecisionResolved,
    TimedOut,
    Resumed,
    SevenOut,
    AutoClosed,
}

/// "State changed, please re-render"
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TableUpdate {
    pub player: PlayerId,
    pub reason: UpdateReason,
    pub snapshot: TableSnapshot,
}

/// Rendering surface contract; implementations live outside the engine
#[async_trait]
pub trait PresentationChannel: Send + Sync {
    async fn render(&self, update: TableUpdate);
}

/// Discards every update; headless operation and tests
pub struct NullChannel;

#[async_trait]
impl PresentationChannel for NullChannel {
    async fn render(&self, _update: TableUpdate) {}
}

/// Fans updates out to any number of subscribers over a broadcast channel
pub struct BroadcastChannel {
    sender: broadcast::Sender<TableUpdate>,
}

impl BroadcastChannel {
    pub fn new(capacity: usize) -> Self {
        let (sender, _) = broadcast::channel(capacity);
        Self { sender }
    }

    pub fn subscribe(&self) -> broadcast::Receiver<TableUpdate> {
        self.sender.subscribe()
    }
}

#[async_trait]
impl PresentationChannel for BroadcastChannel {
    async fn render(&self, update: TableUpdate) {
        // a send with no subscribers is not an error worth surfacing
        let _ = self.sender.send(update);
    }
}

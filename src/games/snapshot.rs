//! Read-only view of the game for rendering

use crate::games::types::{Coins, Phase, Question, RankEntry, TimerKind};
use serde::Serialize;
use uuid::Uuid;

#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
pub struct PlayerView {
    pub name: String,
    pub balance: Coins,
    pub on_loan: bool,
    pub wants_answer: bool,
    pub wants_double: bool,
    pub invested: Coins,
}

#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
pub struct RoundView {
    pub ordinal: u32,
    /// Present only once bets are locked and the question is revealed
    pub question: Option<Question>,
    pub suggested_seconds: Option<u32>,
}

#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
pub struct CountdownView {
    pub kind: TimerKind,
    pub remaining: u32,
    pub time_up: bool,
}

/// Everything the display surface needs to draw one frame
#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
pub struct GameSnapshot {
    pub session_id: Uuid,
    #[serde(flatten)]
    pub phase: Phase,
    pub asked: u32,
    pub quota: u32,
    pub deck_remaining: usize,
    pub players: Vec<PlayerView>,
    pub round: Option<RoundView>,
    pub countdown: Option<CountdownView>,
    pub ranking: Option<Vec<RankEntry>>,
}

impl GameSnapshot {
    pub fn player(&self, name: &str) -> Option<&PlayerView> {
        self.players.iter().find(|p| p.name == name)
    }
}

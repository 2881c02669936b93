use serde::{Deserialize, Serialize};
use std::fmt;

/// Signed coin amount; balances may go negative
pub type Coins = i64;

/// Question difficulty; also the per-side stake unit
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[serde(try_from = "u8", into = "u8")]
pub struct Difficulty(u8);

impl Difficulty {
    /// Difficulty levels start at 1
    pub fn new(level: u8) -> Option<Self> {
        (level >= 1).then_some(Self(level))
    }

    pub fn level(self) -> u8 {
        self.0
    }

    /// Coins staked per side (answer, and again for a double)
    pub fn stake(self) -> Coins {
        self.0 as Coins
    }
}

impl TryFrom<u8> for Difficulty {
    type Error = String;

    fn try_from(level: u8) -> Result<Self, Self::Error> {
        Self::new(level).ok_or_else(|| format!("difficulty must be >= 1, got {}", level))
    }
}

impl From<Difficulty> for u8 {
    fn from(difficulty: Difficulty) -> Self {
        difficulty.0
    }
}

impl fmt::Display for Difficulty {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// An immutable deck entry
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Question {
    pub label: String,
    pub difficulty: Difficulty,
}

/// Round phases
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(tag = "phase", rename_all = "snake_case")]
pub enum Phase {
    /// No round open; a draw is permitted
    Idle,
    /// Question drawn but hidden, bets mutable, betting countdown running
    Betting,
    /// Bets locked and question shown; answer countdown running until `time_up`
    Revealed { time_up: bool },
    /// The moderator is marking bettors correct or incorrect
    AwaitingJudgment,
    /// Round closed, waiting for `next`
    Settled,
    GameOver,
}

impl fmt::Display for Phase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Phase::Idle => write!(f, "idle"),
            Phase::Betting => write!(f, "betting"),
            Phase::Revealed { time_up: false } => write!(f, "answering"),
            Phase::Revealed { time_up: true } => write!(f, "answering (time's up)"),
            Phase::AwaitingJudgment => write!(f, "awaiting judgment"),
            Phase::Settled => write!(f, "settled"),
            Phase::GameOver => write!(f, "game over"),
        }
    }
}

/// The two countdown windows of a round
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "lowercase")]
pub enum TimerKind {
    Betting,
    Answer,
}

impl fmt::Display for TimerKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TimerKind::Betting => write!(f, "betting"),
            TimerKind::Answer => write!(f, "answer"),
        }
    }
}

/// One line of the final standings
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct RankEntry {
    pub position: usize,
    pub player: String,
    pub balance: Coins,
}

/// Result of a draw request
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DrawOutcome {
    Drawn { ordinal: u32, cycled: bool },
    /// Quota exhausted; nothing was drawn
    QuotaReached,
}

/// Result of locking bets
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LockOutcome {
    Revealed {
        question: Question,
        suggested_seconds: u32,
        bettors: Vec<String>,
    },
    /// Nobody answered; the round is already closed
    NoAnswers,
}

/// Result of asking to judge the round
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum JudgmentRequest {
    /// Bettors to be marked, with what each has at stake
    Opened { bettors: Vec<(String, Coins)> },
    NothingToJudge,
}

/// Result of advancing past a closed round
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum NextOutcome {
    ReadyToDraw,
    GameOver { ranking: Vec<RankEntry> },
}

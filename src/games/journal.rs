//! Chronological narration of a game session
//!
//! Every journal entry is also emitted as a `tracing` event, so the same
//! story shows up in the terminal surface and in the logs.

use crate::games::types::{Coins, RankEntry};
use chrono::{DateTime, Utc};
use serde::Serialize;
use std::fmt;

#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
#[serde(tag = "event", rename_all = "snake_case")]
pub enum GameEvent {
    GameReady {
        players: usize,
        starting_balance: Coins,
        quota: u32,
    },
    QuestionDrawn {
        ordinal: u32,
        betting_seconds: u32,
    },
    DeckCycled {
        cycles: u32,
    },
    BetUpdated {
        player: String,
        wants_answer: bool,
        wants_double: bool,
    },
    StakeDebited {
        player: String,
        amount: Coins,
        difficulty: u8,
        doubled: bool,
    },
    LoanTaken {
        player: String,
        loan: Coins,
        staked: Coins,
    },
    BetsLocked {
        manual: bool,
    },
    NoAnswers,
    QuestionRevealed {
        label: String,
        difficulty: u8,
        suggested_seconds: u32,
    },
    AnswerTimeUp,
    JudgmentOpened {
        bettors: Vec<String>,
    },
    NothingToJudge,
    PlayerSettled {
        player: String,
        narrative: String,
        delta: Coins,
    },
    RemainderForfeited {
        coins: Coins,
    },
    RoundClosed {
        ordinal: u32,
    },
    AllQuestionsDone {
        quota: u32,
    },
    GameOver {
        ranking: Vec<RankEntry>,
    },
    Restarted {
        seed: u64,
    },
    Rejected {
        action: String,
        reason: String,
    },
}

impl fmt::Display for GameEvent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            GameEvent::GameReady {
                players,
                starting_balance,
                quota,
            } => write!(
                f,
                "Game ready: {} players with {} coins each, {} questions",
                players, starting_balance, quota
            ),
            GameEvent::QuestionDrawn {
                ordinal,
                betting_seconds,
            } => write!(
                f,
                "Question {} drawn (hidden). Place your bets within {} seconds",
                ordinal, betting_seconds
            ),
            GameEvent::DeckCycled { cycles } => {
                write!(f, "Deck exhausted; starting over from the top (pass {})", cycles + 1)
            }
            GameEvent::BetUpdated {
                player,
                wants_answer,
                wants_double,
            } => {
                let choice = match (wants_answer, wants_double) {
                    (true, true) => "answer and double",
                    (true, false) => "answer",
                    (false, true) => "double (needs answer)",
                    (false, false) => "pass",
                };
                write!(f, "{} will {}", player, choice)
            }
            GameEvent::StakeDebited {
                player,
                amount,
                difficulty,
                doubled,
            } => write!(
                f,
                "{} staked {} (difficulty {}{})",
                player,
                amount,
                difficulty,
                if *doubled { ", doubled" } else { "" }
            ),
            GameEvent::LoanTaken {
                player,
                loan,
                staked,
            } => write!(
                f,
                "{} took a loan of {} coins to answer (staked {})",
                player, loan, staked
            ),
            GameEvent::BetsLocked { manual: true } => write!(f, "Bets locked by the moderator"),
            GameEvent::BetsLocked { manual: false } => {
                write!(f, "Bets locked automatically (betting time is over)")
            }
            GameEvent::NoAnswers => write!(f, "Nobody answered this question"),
            GameEvent::QuestionRevealed {
                label,
                difficulty,
                suggested_seconds,
            } => write!(
                f,
                "Question: {} (difficulty {}, suggested time {} s)",
                label, difficulty, suggested_seconds
            ),
            GameEvent::AnswerTimeUp => write!(f, "Time's up! Please judge the answers"),
            GameEvent::JudgmentOpened { bettors } => {
                write!(f, "Judging: mark the correct answers among {}", bettors.join(", "))
            }
            GameEvent::NothingToJudge => {
                write!(f, "Nobody answered this question; nothing to judge, go to next")
            }
            GameEvent::PlayerSettled { narrative, .. } => write!(f, "{}", narrative),
            GameEvent::RemainderForfeited { coins } => write!(
                f,
                "{} coin(s) of the pooled loss could not be split evenly and are forfeited",
                coins
            ),
            GameEvent::RoundClosed { ordinal } => write!(f, "Round {} closed", ordinal),
            GameEvent::AllQuestionsDone { quota } => {
                write!(f, "All {} questions have been asked", quota)
            }
            GameEvent::GameOver { ranking } => {
                write!(f, "=== Game over: final ranking ===")?;
                for entry in ranking {
                    write!(f, "\n{}. {} - {} coins", entry.position, entry.player, entry.balance)?;
                }
                write!(f, "\nGAME OVER")
            }
            GameEvent::Restarted { seed } => write!(f, "Game restarted (deck seed {})", seed),
            GameEvent::Rejected { action, reason } => write!(f, "Ignored {}: {}", action, reason),
        }
    }
}

#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
pub struct JournalEntry {
    pub at: DateTime<Utc>,
    /// Ordinal of the round the event belongs to, if one was open
    pub round: Option<u32>,
    #[serde(flatten)]
    pub event: GameEvent,
}

impl fmt::Display for JournalEntry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[{}] {}", self.at.format("%H:%M:%S"), self.event)
    }
}

#[derive(Debug, Clone, Default)]
pub struct Journal {
    entries: Vec<JournalEntry>,
}

impl Journal {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn record(&mut self, round: Option<u32>, event: GameEvent) {
        match &event {
            GameEvent::Rejected { .. } => tracing::warn!(round, "{}", event),
            GameEvent::BetUpdated { .. } => tracing::debug!(round, "{}", event),
            _ => tracing::info!(round, "{}", event),
        }
        self.entries.push(JournalEntry {
            at: Utc::now(),
            round,
            event,
        });
    }

    pub fn entries(&self) -> &[JournalEntry] {
        &self.entries
    }

    /// Entries recorded after the first `offset`
    pub fn since(&self, offset: usize) -> &[JournalEntry] {
        self.entries.get(offset..).unwrap_or(&[])
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn last(&self) -> Option<&GameEvent> {
        self.entries.last().map(|e| &e.event)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_record_and_since() {
        let mut journal = Journal::new();
        journal.record(None, GameEvent::NoAnswers);
        journal.record(Some(2), GameEvent::RoundClosed { ordinal: 2 });

        assert_eq!(journal.len(), 2);
        assert_eq!(journal.since(1).len(), 1);
        assert_eq!(journal.since(1)[0].round, Some(2));
        assert!(journal.since(5).is_empty());
        assert_eq!(journal.last(), Some(&GameEvent::RoundClosed { ordinal: 2 }));
    }

    #[test]
    fn test_narration() {
        let loan = GameEvent::LoanTaken {
            player: "Tony".to_string(),
            loan: 3,
            staked: 8,
        };
        assert_eq!(loan.to_string(), "Tony took a loan of 3 coins to answer (staked 8)");

        let over = GameEvent::GameOver {
            ranking: vec![
                RankEntry { position: 1, player: "Eric".to_string(), balance: 12 },
                RankEntry { position: 2, player: "Tony".to_string(), balance: -1 },
            ],
        };
        let text = over.to_string();
        assert!(text.contains("1. Eric - 12 coins"));
        assert!(text.ends_with("GAME OVER"));
    }

    #[test]
    fn test_entry_serializes_flat() {
        let mut journal = Journal::new();
        journal.record(Some(1), GameEvent::BetsLocked { manual: true });

        let json = serde_json::to_value(&journal.entries()[0]).unwrap();
        assert_eq!(json["event"], "bets_locked");
        assert_eq!(json["manual"], true);
        assert_eq!(json["round"], 1);
    }
}

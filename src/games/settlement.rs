//! Settlement Engine
//!
//! Pure arithmetic for closing a judged round. Stakes were already debited at
//! lock time, so an incorrect bettor's delta is zero and a correct bettor's
//! delta returns the principal on top of the rewards.
//!
//! Rewards are not pooled: every correct bettor earns `difficulty` (and
//! `difficulty` again when doubled) regardless of how many others answered.
//! The incorrect stakes are pooled and each correct bettor receives the
//! pool floor-divided by the number of *incorrect* bettors. Whatever the floor
//! division leaves over is forfeited.

use crate::games::types::{Coins, Difficulty};
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;

/// One bettor's stake as frozen at lock time
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BetSnapshot {
    pub player: String,
    pub invested: Coins,
    pub doubled: bool,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum Verdict {
    Correct,
    Incorrect,
}

/// Settlement line for one bettor
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct PlayerSettlement {
    pub player: String,
    pub verdict: Verdict,
    /// Coins credited at settlement
    pub delta: Coins,
    /// Stake that was debited at lock time
    pub invested: Coins,
    pub principal_returned: Coins,
    pub base_reward: Coins,
    pub double_bonus: Coins,
    pub pooled_share: Coins,
}

impl PlayerSettlement {
    /// Net effect of the whole round on this player's balance
    pub fn net_change(&self) -> Coins {
        self.delta - self.invested
    }

    /// Human-readable account of the line
    pub fn narrative(&self) -> String {
        match self.verdict {
            Verdict::Correct => {
                let bonus = if self.double_bonus > 0 {
                    format!(" + double bonus {}", self.double_bonus)
                } else {
                    String::new()
                };
                format!(
                    "{} answered correctly: stake {} returned, reward {}{}, pooled-loss share {} (net {:+})",
                    self.player,
                    self.principal_returned,
                    self.base_reward,
                    bonus,
                    self.pooled_share,
                    self.net_change()
                )
            }
            Verdict::Incorrect => {
                format!("{} answered incorrectly: lost {}", self.player, self.invested)
            }
        }
    }
}

/// Outcome of a judged round
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Settlement {
    pub difficulty: Difficulty,
    /// Sum of the incorrect bettors' stakes
    pub pooled_loss: Coins,
    pub per_correct_share: Coins,
    /// Part of the pooled loss lost to floor division
    pub forfeited_remainder: Coins,
    /// Correct bettors first, then incorrect, each in bet order
    pub entries: Vec<PlayerSettlement>,
}

impl Settlement {
    pub fn delta_for(&self, player: &str) -> Option<Coins> {
        self.entries
            .iter()
            .find(|e| e.player == player)
            .map(|e| e.delta)
    }

    pub fn total_delta(&self) -> Coins {
        self.entries.iter().map(|e| e.delta).sum()
    }

    pub fn correct_count(&self) -> usize {
        self.entries
            .iter()
            .filter(|e| e.verdict == Verdict::Correct)
            .count()
    }
}

/// Compute the deltas for a judged round
///
/// Bettors whose names are in `correct` are correct; every other bettor is
/// incorrect. Names in `correct` that did not bet are ignored.
pub fn settle(difficulty: Difficulty, bets: &[BetSnapshot], correct: &BTreeSet<String>) -> Settlement {
    let (winners, losers): (Vec<&BetSnapshot>, Vec<&BetSnapshot>) =
        bets.iter().partition(|bet| correct.contains(&bet.player));

    let pooled_loss: Coins = losers.iter().map(|bet| bet.invested).sum();
    let (per_correct_share, forfeited_remainder) = if losers.is_empty() {
        (0, 0)
    } else {
        let n = losers.len() as Coins;
        (pooled_loss / n, pooled_loss % n)
    };

    let reward = difficulty.stake();
    let mut entries = Vec::with_capacity(bets.len());

    for bet in winners {
        let double_bonus = if bet.doubled { reward } else { 0 };
        entries.push(PlayerSettlement {
            player: bet.player.clone(),
            verdict: Verdict::Correct,
            delta: bet.invested + reward + double_bonus + per_correct_share,
            invested: bet.invested,
            principal_returned: bet.invested,
            base_reward: reward,
            double_bonus,
            pooled_share: per_correct_share,
        });
    }

    for bet in losers {
        entries.push(PlayerSettlement {
            player: bet.player.clone(),
            verdict: Verdict::Incorrect,
            delta: 0,
            invested: bet.invested,
            principal_returned: 0,
            base_reward: 0,
            double_bonus: 0,
            pooled_share: 0,
        });
    }

    Settlement {
        difficulty,
        pooled_loss,
        per_correct_share,
        forfeited_remainder,
        entries,
    }
}

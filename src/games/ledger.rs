//! Player balances and per-round bet state
//!
//! The ledger does not know about phases; the round engine decides when each
//! operation is legal.

use crate::errors::RoundError;
use crate::games::types::{Coins, Difficulty, RankEntry};
use serde::Serialize;

#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
pub struct Player {
    pub name: String,
    pub balance: Coins,
    pub wants_answer: bool,
    pub wants_double: bool,
    /// Coins at stake this round; zero outside lock..settlement
    pub invested: Coins,
}

impl Player {
    fn new(name: String, balance: Coins) -> Self {
        Self {
            name,
            balance,
            wants_answer: false,
            wants_double: false,
            invested: 0,
        }
    }

    /// A negative balance is an outstanding loan
    pub fn on_loan(&self) -> bool {
        self.balance < 0
    }

    fn clear_round(&mut self) {
        self.wants_answer = false;
        self.wants_double = false;
        self.invested = 0;
    }
}

/// What `apply_stake` debited from one player
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Stake {
    pub player: String,
    pub invested: Coins,
    pub doubled: bool,
    /// Size of the negative balance, when staking pushed the player below zero
    pub loan: Option<Coins>,
}

/// Roster-ordered player book
pub struct Ledger {
    players: Vec<Player>,
}

impl Ledger {
    pub fn new<I, S>(names: I, starting_balance: Coins) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            players: names
                .into_iter()
                .map(|name| Player::new(name.into(), starting_balance))
                .collect(),
        }
    }

    pub fn players(&self) -> &[Player] {
        &self.players
    }

    pub fn get(&self, name: &str) -> Option<&Player> {
        self.players.iter().find(|p| p.name == name)
    }

    fn get_mut(&mut self, name: &str) -> Result<&mut Player, RoundError> {
        self.players
            .iter_mut()
            .find(|p| p.name == name)
            .ok_or_else(|| RoundError::UnknownPlayer(name.to_string()))
    }

    pub fn balance(&self, name: &str) -> Option<Coins> {
        self.get(name).map(|p| p.balance)
    }

    /// Record a player's pending bet intent; nothing is debited yet
    pub fn set_intent(
        &mut self,
        name: &str,
        wants_answer: bool,
        wants_double: bool,
    ) -> Result<(), RoundError> {
        let player = self.get_mut(name)?;
        player.wants_answer = wants_answer;
        player.wants_double = wants_double;
        Ok(())
    }

    /// Debit the stake for a player's current intent
    ///
    /// Answering costs `difficulty`, plus `difficulty` again when doubling. The
    /// debit is unconditional: a short balance simply goes negative. A player
    /// who is not answering ends with nothing invested and no double.
    pub fn apply_stake(&mut self, name: &str, difficulty: Difficulty) -> Result<Stake, RoundError> {
        let player = self.get_mut(name)?;

        if !player.wants_answer {
            player.wants_double = false;
            player.invested = 0;
            return Ok(Stake {
                player: player.name.clone(),
                invested: 0,
                doubled: false,
                loan: None,
            });
        }

        let stake = difficulty.stake();
        let double_stake = if player.wants_double { stake } else { 0 };
        let total = stake + double_stake;

        player.balance -= total;
        player.invested = total;

        Ok(Stake {
            player: player.name.clone(),
            invested: total,
            doubled: player.wants_double,
            loan: player.on_loan().then(|| -player.balance),
        })
    }

    /// Credit a settlement delta and close out the player's round
    pub fn apply_settlement(&mut self, name: &str, delta: Coins) -> Result<Coins, RoundError> {
        let player = self.get_mut(name)?;
        player.balance += delta;
        player.clear_round();
        Ok(player.balance)
    }

    /// Forget every player's intent and stake
    pub fn reset_round(&mut self) {
        for player in &mut self.players {
            player.clear_round();
        }
    }

    pub fn reset_balances(&mut self, starting_balance: Coins) {
        for player in &mut self.players {
            player.balance = starting_balance;
            player.clear_round();
        }
    }

    /// Players with coins at stake, in roster order
    pub fn bettors(&self) -> impl Iterator<Item = &Player> {
        self.players.iter().filter(|p| p.invested > 0)
    }

    /// Standings by balance, richest first; ties keep roster order
    pub fn ranking(&self) -> Vec<RankEntry> {
        let mut ordered: Vec<&Player> = self.players.iter().collect();
        ordered.sort_by(|a, b| b.balance.cmp(&a.balance));
        ordered
            .into_iter()
            .enumerate()
            .map(|(i, p)| RankEntry {
                position: i + 1,
                player: p.name.clone(),
                balance: p.balance,
            })
            .collect()
    }
}

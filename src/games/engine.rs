//! Round state machine
//!
//! `Idle -> Betting -> Revealed -> AwaitingJudgment -> Settled -> Idle`, with
//! `GameOver` once the question quota is used up. A round where nobody answers
//! goes straight from `Betting` to `Settled`.
//!
//! All inputs (surface commands and timer pulses) arrive on one logical thread.
//! Refused operations return a [`RoundError`], are journaled as rejections and
//! leave the game untouched. Exhausted resources (quota reached, nobody to
//! judge) are ordinary outcomes, not errors.

use crate::config::QuizConfig;
use crate::errors::{ConfigurationError, RoundError};
use crate::games::alerts::{Alert, AlertPort};
use crate::games::deck::QuestionDeck;
use crate::games::journal::{GameEvent, Journal};
use crate::games::ledger::Ledger;
use crate::games::settlement::{settle, BetSnapshot, Settlement};
use crate::games::snapshot::{CountdownView, GameSnapshot, PlayerView, RoundView};
use crate::games::timer::{Countdown, CountdownStep, TimerService, TimerTicket};
use crate::games::types::{
    Coins, DrawOutcome, JudgmentRequest, LockOutcome, NextOutcome, Phase, Question, RankEntry,
    TimerKind,
};
use std::collections::BTreeSet;
use uuid::Uuid;

/// The open round
#[derive(Debug, Clone)]
struct Round {
    ordinal: u32,
    question: Question,
    revealed: bool,
    suggested_seconds: u32,
    bets: Vec<BetSnapshot>,
}

pub struct GameEngine {
    config: QuizConfig,
    session_id: Uuid,
    seed: u64,
    ledger: Ledger,
    deck: QuestionDeck,
    phase: Phase,
    round: Option<Round>,
    asked: u32,
    countdown: Option<Countdown>,
    generation: u64,
    final_ranking: Option<Vec<RankEntry>>,
    journal: Journal,
    timers: Box<dyn TimerService>,
    alerts: Box<dyn AlertPort>,
}

impl GameEngine {
    /// Build a ready-to-draw game
    ///
    /// The deck seed comes from the configuration, or is drawn at random.
    pub fn new(
        config: QuizConfig,
        timers: Box<dyn TimerService>,
        alerts: Box<dyn AlertPort>,
    ) -> Result<Self, ConfigurationError> {
        config.validate()?;

        let seed = config.deck.seed.unwrap_or_else(rand::random);
        let ledger = Ledger::new(config.game.players.iter().cloned(), config.game.starting_balance);
        let deck = QuestionDeck::generate(&config.deck, seed);
        let session_id = Uuid::new_v4();

        tracing::info!(session = %session_id, seed, deck = deck.len(), "Game session created");

        let mut engine = Self {
            config,
            session_id,
            seed,
            ledger,
            deck,
            phase: Phase::Idle,
            round: None,
            asked: 0,
            countdown: None,
            generation: 0,
            final_ranking: None,
            journal: Journal::new(),
            timers,
            alerts,
        };
        engine.record_ready();
        Ok(engine)
    }

    // ---------- queries ----------

    pub fn phase(&self) -> Phase {
        self.phase
    }

    pub fn config(&self) -> &QuizConfig {
        &self.config
    }

    pub fn session_id(&self) -> Uuid {
        self.session_id
    }

    pub fn seed(&self) -> u64 {
        self.seed
    }

    pub fn ledger(&self) -> &Ledger {
        &self.ledger
    }

    pub fn deck(&self) -> &QuestionDeck {
        &self.deck
    }

    pub fn journal(&self) -> &Journal {
        &self.journal
    }

    /// Questions drawn so far this game
    pub fn asked(&self) -> u32 {
        self.asked
    }

    pub fn quota(&self) -> u32 {
        self.config.game.question_quota
    }

    pub fn countdown(&self) -> Option<&Countdown> {
        self.countdown.as_ref()
    }

    /// Ticket of the countdown that currently accepts pulses
    pub fn active_ticket(&self) -> Option<TimerTicket> {
        self.countdown
            .as_ref()
            .filter(|c| c.remaining() > 0)
            .map(|c| c.ticket())
    }

    pub fn final_ranking(&self) -> Option<&[RankEntry]> {
        self.final_ranking.as_deref()
    }

    fn quota_reached(&self) -> bool {
        self.asked >= self.quota()
    }

    fn round_ordinal(&self) -> Option<u32> {
        self.round.as_ref().map(|r| r.ordinal)
    }

    // ---------- inbound events ----------

    /// Draw the next question and open the betting window
    ///
    /// Once the quota is used up a draw changes nothing and reports
    /// `QuotaReached`, including after the game is over.
    pub fn draw(&mut self) -> Result<DrawOutcome, RoundError> {
        if matches!(self.phase, Phase::Idle | Phase::GameOver) && self.quota_reached() {
            self.record(GameEvent::AllQuestionsDone { quota: self.quota() });
            return Ok(DrawOutcome::QuotaReached);
        }
        if self.phase != Phase::Idle {
            return Err(self.illegal("draw a question"));
        }

        let Some(draw) = self.deck.next() else {
            return Err(self.reject("draw a question", RoundError::DeckEmpty));
        };

        self.stop_timer(TimerKind::Answer);
        self.ledger.reset_round();
        self.asked += 1;
        let ordinal = self.asked;

        self.round = Some(Round {
            ordinal,
            question: draw.question,
            revealed: false,
            suggested_seconds: 0,
            bets: Vec::new(),
        });
        self.phase = Phase::Betting;

        if draw.cycled {
            self.record(GameEvent::DeckCycled {
                cycles: self.deck.cycles(),
            });
        }
        let betting_seconds = self.config.timing.betting_seconds;
        self.record(GameEvent::QuestionDrawn {
            ordinal,
            betting_seconds,
        });
        self.start_timer(TimerKind::Betting, betting_seconds);

        Ok(DrawOutcome::Drawn {
            ordinal,
            cycled: draw.cycled,
        })
    }

    /// Set a player's bet intent for the open betting window
    pub fn place_bet(
        &mut self,
        player: &str,
        wants_answer: bool,
        wants_double: bool,
    ) -> Result<(), RoundError> {
        if self.phase != Phase::Betting {
            return Err(self.illegal("place a bet"));
        }
        if let Err(e) = self.ledger.set_intent(player, wants_answer, wants_double) {
            return Err(self.reject("place a bet", e));
        }

        self.record(GameEvent::BetUpdated {
            player: player.to_string(),
            wants_answer,
            wants_double,
        });
        Ok(())
    }

    /// Close the betting window, debit stakes and reveal the question
    ///
    /// `manual` distinguishes a moderator action from betting-timer expiry.
    pub fn lock_bets(&mut self, manual: bool) -> Result<LockOutcome, RoundError> {
        if self.phase != Phase::Betting {
            return Err(self.illegal("lock bets"));
        }
        let Some(difficulty) = self.round.as_ref().map(|r| r.question.difficulty) else {
            return Err(self.illegal("lock bets"));
        };

        self.stop_timer(TimerKind::Betting);

        let names: Vec<String> = self.ledger.players().iter().map(|p| p.name.clone()).collect();
        let mut bets = Vec::new();
        for name in &names {
            let stake = self.ledger.apply_stake(name, difficulty)?;
            if stake.invested == 0 {
                continue;
            }
            self.record(GameEvent::StakeDebited {
                player: stake.player.clone(),
                amount: stake.invested,
                difficulty: difficulty.level(),
                doubled: stake.doubled,
            });
            if let Some(loan) = stake.loan {
                self.record(GameEvent::LoanTaken {
                    player: stake.player.clone(),
                    loan,
                    staked: stake.invested,
                });
            }
            bets.push(BetSnapshot {
                player: stake.player,
                invested: stake.invested,
                doubled: stake.doubled,
            });
        }

        self.record(GameEvent::BetsLocked { manual });

        if bets.is_empty() {
            self.record(GameEvent::NoAnswers);
            if let Some(ordinal) = self.round_ordinal() {
                self.record(GameEvent::RoundClosed { ordinal });
            }
            self.phase = Phase::Settled;
            return Ok(LockOutcome::NoAnswers);
        }

        let suggested_seconds = self.config.timing.answer_seconds(difficulty.level());
        let bettors: Vec<String> = bets.iter().map(|b| b.player.clone()).collect();
        let question = match self.round.as_mut() {
            Some(round) => {
                round.revealed = true;
                round.suggested_seconds = suggested_seconds;
                round.bets = bets;
                round.question.clone()
            }
            None => return Err(self.illegal("lock bets")),
        };

        self.record(GameEvent::QuestionRevealed {
            label: question.label.clone(),
            difficulty: difficulty.level(),
            suggested_seconds,
        });
        self.phase = Phase::Revealed { time_up: false };
        self.start_timer(TimerKind::Answer, suggested_seconds);

        Ok(LockOutcome::Revealed {
            question,
            suggested_seconds,
            bettors,
        })
    }

    /// Deliver one timer pulse
    ///
    /// Pulses from a cancelled or superseded countdown, or arriving in a phase
    /// the countdown no longer applies to, are dropped and return `None`.
    pub fn on_timer_pulse(&mut self, ticket: TimerTicket) -> Option<CountdownStep> {
        let phase_matches = match ticket.kind {
            TimerKind::Betting => self.phase == Phase::Betting,
            TimerKind::Answer => self.phase == Phase::Revealed { time_up: false },
        };
        let countdown = match self.countdown.as_mut() {
            Some(c) if phase_matches && c.ticket() == ticket && c.remaining() > 0 => c,
            _ => {
                tracing::trace!(kind = %ticket.kind, generation = ticket.generation, "Dropping stale timer pulse");
                return None;
            }
        };

        let step = countdown.advance();
        self.handle_step(ticket.kind, step);
        Some(step)
    }

    /// Open judgment for the current round
    pub fn request_judgment(&mut self) -> Result<JudgmentRequest, RoundError> {
        match self.phase {
            Phase::Revealed { .. } | Phase::AwaitingJudgment => {}
            // Nothing is invested before lock or after settlement
            Phase::Idle | Phase::Betting | Phase::Settled => {
                self.record(GameEvent::NothingToJudge);
                return Ok(JudgmentRequest::NothingToJudge);
            }
            Phase::GameOver => return Err(self.illegal("judge answers")),
        }

        let bettors: Vec<(String, Coins)> = self
            .ledger
            .bettors()
            .map(|p| (p.name.clone(), p.invested))
            .collect();
        if bettors.is_empty() {
            self.record(GameEvent::NothingToJudge);
            return Ok(JudgmentRequest::NothingToJudge);
        }

        if self.phase != Phase::AwaitingJudgment {
            self.stop_timer(TimerKind::Answer);
            self.phase = Phase::AwaitingJudgment;
            self.record(GameEvent::JudgmentOpened {
                bettors: bettors.iter().map(|(name, _)| name.clone()).collect(),
            });
        }

        Ok(JudgmentRequest::Opened { bettors })
    }

    /// Settle the round given the bettors judged correct
    ///
    /// Every bettor not named is judged incorrect.
    pub fn submit_judgment<I, S>(&mut self, correct: I) -> Result<Settlement, RoundError>
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        if self.phase != Phase::AwaitingJudgment {
            return Err(self.illegal("submit a judgment"));
        }
        let Some(round) = self.round.clone() else {
            return Err(self.illegal("submit a judgment"));
        };

        let correct: BTreeSet<String> = correct.into_iter().map(Into::into).collect();
        for name in &correct {
            if !round.bets.iter().any(|b| &b.player == name) {
                let err = if self.ledger.get(name).is_some() {
                    RoundError::NotABettor(name.clone())
                } else {
                    RoundError::UnknownPlayer(name.clone())
                };
                return Err(self.reject("submit a judgment", err));
            }
        }

        let settlement = settle(round.question.difficulty, &round.bets, &correct);
        for entry in &settlement.entries {
            self.ledger.apply_settlement(&entry.player, entry.delta)?;
            self.record(GameEvent::PlayerSettled {
                player: entry.player.clone(),
                narrative: entry.narrative(),
                delta: entry.delta,
            });
        }
        if settlement.forfeited_remainder > 0 {
            self.record(GameEvent::RemainderForfeited {
                coins: settlement.forfeited_remainder,
            });
        }

        self.raise(Alert::RoundSettled);
        self.record(GameEvent::RoundClosed {
            ordinal: round.ordinal,
        });

        if self.quota_reached() {
            self.finish_game();
        } else {
            self.phase = Phase::Settled;
        }

        Ok(settlement)
    }

    /// Leave a closed round and get ready for the next draw
    pub fn next(&mut self) -> Result<NextOutcome, RoundError> {
        if self.phase != Phase::Settled {
            return Err(self.illegal("move to the next question"));
        }

        self.stop_timer(TimerKind::Betting);
        self.stop_timer(TimerKind::Answer);
        self.ledger.reset_round();
        self.round = None;

        if self.quota_reached() {
            let ranking = self.finish_game();
            return Ok(NextOutcome::GameOver { ranking });
        }

        self.phase = Phase::Idle;
        Ok(NextOutcome::ReadyToDraw)
    }

    /// Start over with starting balances and a freshly built deck
    pub fn restart(&mut self) {
        self.stop_timer(TimerKind::Betting);
        self.stop_timer(TimerKind::Answer);

        self.ledger.reset_balances(self.config.game.starting_balance);
        self.deck = QuestionDeck::generate(&self.config.deck, self.seed);
        self.round = None;
        self.asked = 0;
        self.final_ranking = None;
        self.phase = Phase::Idle;

        self.record(GameEvent::Restarted { seed: self.seed });
        self.record_ready();
    }

    /// Current state for rendering
    pub fn snapshot(&self) -> GameSnapshot {
        let players = self
            .ledger
            .players()
            .iter()
            .map(|p| PlayerView {
                name: p.name.clone(),
                balance: p.balance,
                on_loan: p.on_loan(),
                wants_answer: p.wants_answer,
                wants_double: p.wants_double,
                invested: p.invested,
            })
            .collect();

        let round = self.round.as_ref().map(|r| RoundView {
            ordinal: r.ordinal,
            question: r.revealed.then(|| r.question.clone()),
            suggested_seconds: r.revealed.then_some(r.suggested_seconds),
        });

        let countdown = self.countdown.as_ref().map(|c| CountdownView {
            kind: c.kind(),
            remaining: c.remaining(),
            time_up: c.remaining() == 0,
        });

        GameSnapshot {
            session_id: self.session_id,
            phase: self.phase,
            asked: self.asked,
            quota: self.quota(),
            deck_remaining: self.deck.remaining_count(),
            players,
            round,
            countdown,
            ranking: self.final_ranking.clone(),
        }
    }

    // ---------- internals ----------

    fn record(&mut self, event: GameEvent) {
        let round = self.round_ordinal();
        self.journal.record(round, event);
    }

    fn record_ready(&mut self) {
        self.record(GameEvent::GameReady {
            players: self.ledger.players().len(),
            starting_balance: self.config.game.starting_balance,
            quota: self.quota(),
        });
    }

    fn illegal(&mut self, action: &'static str) -> RoundError {
        let err = RoundError::IllegalTransition {
            action,
            phase: self.phase.to_string(),
        };
        self.reject(action, err)
    }

    fn reject(&mut self, action: &str, err: RoundError) -> RoundError {
        self.record(GameEvent::Rejected {
            action: action.to_string(),
            reason: err.to_string(),
        });
        err
    }

    fn raise(&self, alert: Alert) {
        if let Err(e) = self.alerts.alert(alert) {
            tracing::debug!(?alert, "Alert not delivered: {}", e);
        }
    }

    fn start_timer(&mut self, kind: TimerKind, seconds: u32) {
        self.stop_timer(kind);

        self.generation += 1;
        let ticket = TimerTicket {
            kind,
            generation: self.generation,
        };
        let (countdown, step) = Countdown::start(ticket, seconds, self.config.timing.warning_seconds);
        self.countdown = Some(countdown);
        self.timers.start(ticket, seconds);
        self.handle_step(kind, step);
    }

    fn stop_timer(&mut self, kind: TimerKind) {
        self.timers.cancel(kind);
        if self.countdown.as_ref().map(|c| c.kind()) == Some(kind) {
            self.countdown = None;
        }
    }

    fn handle_step(&mut self, kind: TimerKind, step: CountdownStep) {
        match step {
            CountdownStep::Tick { warning, .. } => {
                if warning {
                    self.raise(Alert::CountdownWarning);
                }
            }
            CountdownStep::Expired => {
                self.raise(Alert::WindowClosed);
                match kind {
                    TimerKind::Betting => {
                        if self.phase == Phase::Betting {
                            // Outcome is already journaled
                            let _ = self.lock_bets(false);
                        }
                    }
                    TimerKind::Answer => {
                        if self.phase == (Phase::Revealed { time_up: false }) {
                            self.phase = Phase::Revealed { time_up: true };
                            self.record(GameEvent::AnswerTimeUp);
                        }
                    }
                }
            }
        }
    }

    fn finish_game(&mut self) -> Vec<RankEntry> {
        self.stop_timer(TimerKind::Betting);
        self.stop_timer(TimerKind::Answer);

        let ranking = self.ledger.ranking();
        self.round = None;
        self.phase = Phase::GameOver;
        self.final_ranking = Some(ranking.clone());

        self.record(GameEvent::AllQuestionsDone { quota: self.quota() });
        self.record(GameEvent::GameOver {
            ranking: ranking.clone(),
        });
        self.raise(Alert::GameOver);
        ranking
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::games::alerts::{RecordingAlerts, SilentAlerts};
    use crate::games::timer::ManualTimers;

    fn engine_with(config: QuizConfig) -> (GameEngine, ManualTimers) {
        let timers = ManualTimers::new();
        let engine = GameEngine::new(config, Box::new(timers.clone()), Box::new(SilentAlerts))
            .expect("valid config");
        (engine, timers)
    }

    fn classroom() -> (GameEngine, ManualTimers) {
        let mut config = QuizConfig::classroom();
        config.deck.seed = Some(11);
        engine_with(config)
    }

    #[test]
    fn test_draw_opens_betting_window() {
        let (mut engine, timers) = classroom();

        assert_eq!(
            engine.draw(),
            Ok(DrawOutcome::Drawn {
                ordinal: 1,
                cycled: false
            })
        );
        assert_eq!(engine.phase(), Phase::Betting);
        assert_eq!(engine.asked(), 1);

        let (ticket, seconds) = timers.running(TimerKind::Betting).unwrap();
        assert_eq!(seconds, 20);
        assert_eq!(engine.active_ticket(), Some(ticket));

        // The question stays hidden while betting
        let snapshot = engine.snapshot();
        assert_eq!(snapshot.round.as_ref().unwrap().question, None);
        assert_eq!(snapshot.countdown.unwrap().remaining, 20);
    }

    #[test]
    fn test_draw_while_betting_is_rejected() {
        let (mut engine, _) = classroom();
        engine.draw().unwrap();
        let journal_len = engine.journal().len();

        let err = engine.draw().unwrap_err();
        assert!(matches!(err, RoundError::IllegalTransition { .. }));
        assert_eq!(engine.asked(), 1);
        assert_eq!(engine.phase(), Phase::Betting);
        assert_eq!(engine.journal().len(), journal_len + 1);
        assert!(matches!(engine.journal().last(), Some(GameEvent::Rejected { .. })));
    }

    #[test]
    fn test_judging_while_betting_has_nothing_to_judge() {
        let (mut engine, timers) = classroom();
        engine.draw().unwrap();
        engine.place_bet("Eric", true, false).unwrap();

        assert_eq!(engine.request_judgment(), Ok(JudgmentRequest::NothingToJudge));
        assert_eq!(engine.phase(), Phase::Betting);
        assert!(timers.running(TimerKind::Betting).is_some());
        assert_eq!(engine.journal().last(), Some(&GameEvent::NothingToJudge));
        assert_eq!(engine.ledger().balance("Eric"), Some(5));
    }

    #[test]
    fn test_bets_only_during_betting() {
        let (mut engine, _) = classroom();
        assert!(engine.place_bet("Eric", true, false).is_err());

        engine.draw().unwrap();
        engine.place_bet("Eric", true, false).unwrap();
        assert_eq!(
            engine.place_bet("Nobody", true, false),
            Err(RoundError::UnknownPlayer("Nobody".to_string()))
        );

        // Intent only: nothing debited yet
        assert_eq!(engine.ledger().balance("Eric"), Some(5));
        assert!(engine.ledger().get("Eric").unwrap().wants_answer);
    }

    #[test]
    fn test_manual_lock_reveals_and_starts_answer_timer() {
        let (mut engine, timers) = classroom();
        engine.draw().unwrap();
        engine.place_bet("Tony", true, true).unwrap();

        let outcome = engine.lock_bets(true).unwrap();
        let LockOutcome::Revealed {
            question,
            suggested_seconds,
            bettors,
        } = outcome
        else {
            panic!("expected reveal");
        };

        assert_eq!(bettors, vec!["Tony".to_string()]);
        assert_eq!(
            suggested_seconds,
            engine.config().timing.answer_seconds(question.difficulty.level())
        );
        assert!(timers.running(TimerKind::Betting).is_none());
        assert_eq!(timers.running(TimerKind::Answer).unwrap().1, suggested_seconds);
        assert_eq!(engine.phase(), Phase::Revealed { time_up: false });

        let tony = engine.ledger().get("Tony").unwrap();
        assert_eq!(tony.invested, 2 * question.difficulty.stake());
        assert_eq!(tony.balance, 5 - tony.invested);

        let snapshot = engine.snapshot();
        assert_eq!(snapshot.round.unwrap().question, Some(question));
    }

    #[test]
    fn test_betting_timer_expiry_locks_once() {
        let (mut engine, timers) = classroom();
        engine.draw().unwrap();
        engine.place_bet("Eric", true, false).unwrap();
        let (ticket, seconds) = timers.running(TimerKind::Betting).unwrap();

        for _ in 0..seconds - 1 {
            assert!(matches!(
                engine.on_timer_pulse(ticket),
                Some(CountdownStep::Tick { .. })
            ));
        }
        assert_eq!(engine.on_timer_pulse(ticket), Some(CountdownStep::Expired));
        assert!(matches!(engine.phase(), Phase::Revealed { .. }));
        assert!(matches!(
            engine.journal().entries().iter().find(|e| matches!(e.event, GameEvent::BetsLocked { .. })).map(|e| &e.event),
            Some(GameEvent::BetsLocked { manual: false })
        ));

        let balance = engine.ledger().balance("Eric");
        // A late manual lock and a late pulse change nothing
        assert!(engine.lock_bets(true).is_err());
        assert_eq!(engine.on_timer_pulse(ticket), None);
        assert_eq!(engine.ledger().balance("Eric"), balance);
    }

    #[test]
    fn test_pulse_after_manual_lock_is_dropped() {
        let (mut engine, timers) = classroom();
        engine.draw().unwrap();
        engine.place_bet("Eric", true, false).unwrap();
        let (ticket, _) = timers.running(TimerKind::Betting).unwrap();

        engine.lock_bets(true).unwrap();
        let balance = engine.ledger().balance("Eric");
        let locks = engine
            .journal()
            .entries()
            .iter()
            .filter(|e| matches!(e.event, GameEvent::BetsLocked { .. }))
            .count();

        assert_eq!(engine.on_timer_pulse(ticket), None);
        assert_eq!(engine.ledger().balance("Eric"), balance);
        assert_eq!(
            engine
                .journal()
                .entries()
                .iter()
                .filter(|e| matches!(e.event, GameEvent::BetsLocked { .. }))
                .count(),
            locks
        );
    }

    #[test]
    fn test_answer_expiry_only_flags_time_up() {
        let (mut engine, timers) = classroom();
        engine.draw().unwrap();
        engine.place_bet("Eric", true, false).unwrap();
        engine.lock_bets(true).unwrap();

        let (ticket, seconds) = timers.running(TimerKind::Answer).unwrap();
        for _ in 0..seconds {
            engine.on_timer_pulse(ticket);
        }

        assert_eq!(engine.phase(), Phase::Revealed { time_up: true });
        assert_eq!(engine.journal().last(), Some(&GameEvent::AnswerTimeUp));
        assert!(engine.snapshot().countdown.unwrap().time_up);
        assert_eq!(engine.on_timer_pulse(ticket), None);

        // Judgment still has to be requested explicitly
        assert!(matches!(
            engine.request_judgment(),
            Ok(JudgmentRequest::Opened { .. })
        ));
        assert_eq!(engine.phase(), Phase::AwaitingJudgment);
    }

    #[test]
    fn test_no_answers_skips_answer_window() {
        let (mut engine, timers) = classroom();
        engine.draw().unwrap();

        assert_eq!(engine.lock_bets(true), Ok(LockOutcome::NoAnswers));
        assert_eq!(engine.phase(), Phase::Settled);
        assert!(timers.running(TimerKind::Answer).is_none());
        assert_eq!(engine.request_judgment(), Ok(JudgmentRequest::NothingToJudge));
        assert!(engine.submit_judgment(Vec::<String>::new()).is_err());
        assert_eq!(engine.next(), Ok(NextOutcome::ReadyToDraw));
        assert_eq!(engine.phase(), Phase::Idle);
    }

    #[test]
    fn test_judgment_rejects_non_bettors() {
        let (mut engine, _) = classroom();
        engine.draw().unwrap();
        engine.place_bet("Eric", true, false).unwrap();
        engine.lock_bets(true).unwrap();
        engine.request_judgment().unwrap();

        assert_eq!(
            engine.submit_judgment(["Tony"]),
            Err(RoundError::NotABettor("Tony".to_string()))
        );
        assert_eq!(
            engine.submit_judgment(["Ghost"]),
            Err(RoundError::UnknownPlayer("Ghost".to_string()))
        );
        assert_eq!(engine.phase(), Phase::AwaitingJudgment);
        assert!(engine.ledger().get("Eric").unwrap().invested > 0);
    }

    #[test]
    fn test_full_round_settles_balances() {
        let (mut engine, _) = classroom();
        engine.draw().unwrap();
        engine.place_bet("Eric", true, false).unwrap();
        engine.place_bet("Tony", true, true).unwrap();
        let LockOutcome::Revealed { question, .. } = engine.lock_bets(true).unwrap() else {
            panic!("expected reveal");
        };
        let d = question.difficulty.stake();

        engine.request_judgment().unwrap();
        let settlement = engine.submit_judgment(["Tony"]).unwrap();

        assert_eq!(settlement.delta_for("Tony"), Some(2 * d + d + d + d));
        assert_eq!(engine.ledger().balance("Tony"), Some(5 + 3 * d));
        assert_eq!(engine.ledger().balance("Eric"), Some(5 - d));
        assert_eq!(engine.ledger().balance("Vincent"), Some(5));
        assert!(engine.ledger().bettors().next().is_none());
        assert_eq!(engine.phase(), Phase::Settled);

        assert_eq!(engine.next(), Ok(NextOutcome::ReadyToDraw));
        assert!(engine.snapshot().round.is_none());
    }

    #[test]
    fn test_quota_ends_game_and_blocks_draw() {
        let mut config = QuizConfig::quick_round();
        config.game.question_quota = 1;
        let (mut engine, _) = engine_with(config);

        engine.draw().unwrap();
        engine.place_bet("Ada", true, false).unwrap();
        engine.lock_bets(true).unwrap();
        engine.request_judgment().unwrap();
        engine.submit_judgment(["Ada"]).unwrap();

        assert_eq!(engine.phase(), Phase::GameOver);
        let ranking = engine.final_ranking().unwrap();
        assert_eq!(ranking[0].player, "Ada");
        assert_eq!(engine.draw(), Ok(DrawOutcome::QuotaReached));
        assert_eq!(engine.phase(), Phase::GameOver);
        assert!(engine.next().is_err());
    }

    #[test]
    fn test_restart_restores_everything() {
        let (mut engine, timers) = classroom();
        engine.draw().unwrap();
        engine.place_bet("Eric", true, true).unwrap();
        engine.lock_bets(true).unwrap();
        let starts = timers.starts();

        engine.restart();
        assert_eq!(timers.starts(), starts);
        assert_eq!(engine.phase(), Phase::Idle);
        assert_eq!(engine.asked(), 0);
        assert_eq!(engine.ledger().balance("Eric"), Some(5));
        assert_eq!(engine.deck().remaining_count(), engine.deck().len());
        assert!(timers.running(TimerKind::Answer).is_none());
        assert!(engine.countdown().is_none());
        assert!(matches!(engine.journal().last(), Some(GameEvent::GameReady { .. })));
    }

    #[test]
    fn test_alerts_raised() {
        let mut config = QuizConfig::quick_round();
        config.timing.warning_seconds = 2;
        let timers = ManualTimers::new();
        let alerts = RecordingAlerts::new();
        let mut engine =
            GameEngine::new(config, Box::new(timers.clone()), Box::new(alerts.clone())).unwrap();

        engine.draw().unwrap();
        let (ticket, _) = timers.running(TimerKind::Betting).unwrap();
        engine.on_timer_pulse(ticket); // 2 left
        engine.on_timer_pulse(ticket); // 1 left
        engine.on_timer_pulse(ticket); // expired, nobody bet

        assert_eq!(alerts.count(Alert::CountdownWarning), 2);
        assert_eq!(alerts.count(Alert::WindowClosed), 1);
        assert_eq!(engine.phase(), Phase::Settled);
    }
}

//! Text surface: moderator commands in, status text out

use crate::games::snapshot::GameSnapshot;
use crate::games::types::{Phase, TimerKind};
use std::fmt::Write as _;
use std::str::FromStr;
use thiserror::Error;

pub const HELP: &str = "\
Commands:
  draw                          draw the next (hidden) question
  answer <name>                 toggle whether <name> answers
  double <name>                 toggle whether <name> doubles
  bet <name> <answer> <double>  set both choices (yes/no)
  lock                          lock bets and reveal the question
  judge                         stop the answer window and start judging
  correct [names...]            settle; everyone not named was wrong
  next                          close the round
  status                        show balances and the current round
  log                           replay the whole game journal
  restart                       start over with fresh balances
  quit                          leave the game
  help                          show this text";

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    Draw,
    ToggleAnswer(String),
    ToggleDouble(String),
    Bet {
        player: String,
        wants_answer: bool,
        wants_double: bool,
    },
    Lock,
    Judge,
    Correct(Vec<String>),
    Next,
    Status,
    Log,
    Restart,
    Quit,
    Help,
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ParseCommandError {
    #[error("empty command")]
    Empty,
    #[error("unknown command '{0}' (try 'help')")]
    Unknown(String),
    #[error("usage: {0}")]
    Usage(&'static str),
    #[error("expected yes or no, got '{0}'")]
    NotAChoice(String),
}

fn parse_choice(word: &str) -> Result<bool, ParseCommandError> {
    match word.to_ascii_lowercase().as_str() {
        "yes" | "y" | "true" | "1" => Ok(true),
        "no" | "n" | "false" | "0" => Ok(false),
        _ => Err(ParseCommandError::NotAChoice(word.to_string())),
    }
}

impl FromStr for Command {
    type Err = ParseCommandError;

    fn from_str(line: &str) -> Result<Self, Self::Err> {
        let mut words = line.split_whitespace();
        let Some(head) = words.next() else {
            return Err(ParseCommandError::Empty);
        };
        let rest: Vec<&str> = words.collect();

        let single_name = |usage: &'static str| match rest.as_slice() {
            [name] => Ok(name.to_string()),
            _ => Err(ParseCommandError::Usage(usage)),
        };
        let no_args = |command: Command, usage: &'static str| {
            if rest.is_empty() {
                Ok(command)
            } else {
                Err(ParseCommandError::Usage(usage))
            }
        };

        match head.to_ascii_lowercase().as_str() {
            "draw" => no_args(Command::Draw, "draw"),
            "answer" => single_name("answer <name>").map(Command::ToggleAnswer),
            "double" => single_name("double <name>").map(Command::ToggleDouble),
            "bet" => match rest.as_slice() {
                [player, answer, double] => Ok(Command::Bet {
                    player: player.to_string(),
                    wants_answer: parse_choice(answer)?,
                    wants_double: parse_choice(double)?,
                }),
                _ => Err(ParseCommandError::Usage("bet <name> <answer> <double>")),
            },
            "lock" => no_args(Command::Lock, "lock"),
            "judge" => no_args(Command::Judge, "judge"),
            "correct" => Ok(Command::Correct(rest.iter().map(|s| s.to_string()).collect())),
            "next" => no_args(Command::Next, "next"),
            "status" => no_args(Command::Status, "status"),
            "log" => no_args(Command::Log, "log"),
            "restart" => no_args(Command::Restart, "restart"),
            "quit" | "exit" => no_args(Command::Quit, "quit"),
            "help" | "?" => Ok(Command::Help),
            other => Err(ParseCommandError::Unknown(other.to_string())),
        }
    }
}

/// Render balances, bet choices and the open round
pub fn render_status(snapshot: &GameSnapshot) -> String {
    let mut out = String::new();
    let _ = writeln!(
        out,
        "Question {}/{} | {}",
        snapshot.asked, snapshot.quota, snapshot.phase
    );

    if let Some(round) = &snapshot.round {
        match (&round.question, round.suggested_seconds) {
            (Some(question), Some(seconds)) => {
                let _ = writeln!(
                    out,
                    "Round {}: {} (difficulty {}, suggested {} s)",
                    round.ordinal, question.label, question.difficulty, seconds
                );
            }
            _ => {
                let _ = writeln!(out, "Round {}: question hidden", round.ordinal);
            }
        }
    }

    if let Some(countdown) = &snapshot.countdown {
        let label = match countdown.kind {
            TimerKind::Betting => "Betting",
            TimerKind::Answer => "Answer",
        };
        if countdown.time_up {
            let _ = writeln!(out, "{} time: time's up", label);
        } else {
            let _ = writeln!(out, "{} time: {} s left", label, countdown.remaining);
        }
    }

    let show_choices = snapshot.phase == Phase::Betting;
    for player in &snapshot.players {
        let _ = write!(out, "  {:<10} {:>4} coins", player.name, player.balance);
        if player.on_loan {
            out.push_str(" (loan)");
        }
        if show_choices {
            let _ = write!(
                out,
                "  answer:{} double:{}",
                if player.wants_answer { "yes" } else { "no" },
                if player.wants_double { "yes" } else { "no" }
            );
        } else if player.invested > 0 {
            let _ = write!(out, "  staked {}", player.invested);
        }
        out.push('\n');
    }

    if let Some(ranking) = &snapshot.ranking {
        out.push_str("Final ranking:\n");
        for entry in ranking {
            let _ = writeln!(out, "  {}. {} - {} coins", entry.position, entry.player, entry.balance);
        }
    }

    out
}

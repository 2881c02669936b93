//! Interactive session loop
//!
//! Multiplexes moderator input lines and timer pulses onto the single-threaded
//! engine, and narrates every new journal entry to the output.

use crate::errors::{QuizResult, RoundError};
use crate::games::engine::GameEngine;
use crate::games::timer::{CountdownStep, TimerTicket};
use crate::games::types::{DrawOutcome, Phase, RankEntry};
use crate::surface::{render_status, Command, HELP};
use serde::Serialize;
use tokio::io::{AsyncBufRead, AsyncBufReadExt, AsyncWrite, AsyncWriteExt};
use tokio::sync::mpsc::UnboundedReceiver;
use uuid::Uuid;

/// How a session ended
#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
pub struct SessionSummary {
    pub session_id: Uuid,
    pub phase: Phase,
    pub asked: u32,
    pub quota: u32,
    pub ranking: Vec<RankEntry>,
    /// The moderator typed `quit` rather than closing the input
    pub quit: bool,
}

enum Flow {
    Continue,
    Quit,
}

/// Run the game until `quit` or end of input
pub async fn run_session<R, W>(
    engine: &mut GameEngine,
    mut pulses: UnboundedReceiver<TimerTicket>,
    input: R,
    mut output: W,
) -> QuizResult<SessionSummary>
where
    R: AsyncBufRead + Unpin,
    W: AsyncWrite + Unpin,
{
    let mut lines = input.lines();
    let mut quit = false;

    tracing::info!(session = %engine.session_id(), "Session started");
    output.write_all(b"Type 'help' for commands.\n").await?;
    let mut printed = flush_journal(engine, 0, &mut output).await?;

    loop {
        tokio::select! {
            line = lines.next_line() => {
                let Some(line) = line? else {
                    tracing::debug!("Input closed");
                    break;
                };
                if line.trim().is_empty() {
                    continue;
                }
                let flow = match line.parse::<Command>() {
                    Ok(command) => execute(engine, command, &mut output).await?,
                    Err(e) => {
                        output.write_all(format!("! {}\n", e).as_bytes()).await?;
                        Flow::Continue
                    }
                };
                printed = flush_journal(engine, printed, &mut output).await?;
                if let Flow::Quit = flow {
                    quit = true;
                    break;
                }
            }
            Some(ticket) = pulses.recv() => {
                if let Some(CountdownStep::Tick { remaining, warning: true }) = engine.on_timer_pulse(ticket) {
                    output
                        .write_all(format!("  {} time: {} s left\n", ticket.kind, remaining).as_bytes())
                        .await?;
                }
                printed = flush_journal(engine, printed, &mut output).await?;
            }
        }
        output.flush().await?;
    }

    output.flush().await?;
    let snapshot = engine.snapshot();
    let summary = SessionSummary {
        session_id: snapshot.session_id,
        phase: snapshot.phase,
        asked: snapshot.asked,
        quota: snapshot.quota,
        ranking: snapshot
            .ranking
            .unwrap_or_else(|| engine.ledger().ranking()),
        quit,
    };
    tracing::info!(session = %summary.session_id, asked = summary.asked, quit, "Session ended");
    Ok(summary)
}

async fn execute<W>(engine: &mut GameEngine, command: Command, output: &mut W) -> QuizResult<Flow>
where
    W: AsyncWrite + Unpin,
{
    let result: Result<(), RoundError> = match command {
        Command::Draw => engine.draw().map(|outcome| {
            if outcome == DrawOutcome::QuotaReached {
                tracing::debug!("Draw skipped, quota reached");
            }
        }),
        Command::ToggleAnswer(player) => {
            let (answer, double) = intent(engine, &player);
            engine.place_bet(&player, !answer, double)
        }
        Command::ToggleDouble(player) => {
            let (answer, double) = intent(engine, &player);
            engine.place_bet(&player, answer, !double)
        }
        Command::Bet {
            player,
            wants_answer,
            wants_double,
        } => engine.place_bet(&player, wants_answer, wants_double),
        Command::Lock => engine.lock_bets(true).map(|_| ()),
        Command::Judge => engine.request_judgment().map(|_| ()),
        Command::Correct(names) => engine.submit_judgment(names).map(|_| ()),
        Command::Next => engine.next().map(|_| ()),
        Command::Restart => {
            engine.restart();
            Ok(())
        }
        Command::Status => {
            output.write_all(render_status(&engine.snapshot()).as_bytes()).await?;
            Ok(())
        }
        Command::Log => {
            for entry in engine.journal().entries() {
                output.write_all(format!("{}\n", entry).as_bytes()).await?;
            }
            Ok(())
        }
        Command::Help => {
            output.write_all(HELP.as_bytes()).await?;
            output.write_all(b"\n").await?;
            Ok(())
        }
        Command::Quit => return Ok(Flow::Quit),
    };

    // Refusals are already in the journal
    if let Err(e) = result {
        tracing::debug!("Command refused: {}", e);
    }
    Ok(Flow::Continue)
}

fn intent(engine: &GameEngine, player: &str) -> (bool, bool) {
    engine
        .ledger()
        .get(player)
        .map(|p| (p.wants_answer, p.wants_double))
        .unwrap_or_default()
}

async fn flush_journal<W>(engine: &GameEngine, printed: usize, output: &mut W) -> QuizResult<usize>
where
    W: AsyncWrite + Unpin,
{
    let fresh = engine.journal().since(printed);
    for entry in fresh {
        output.write_all(format!("{}\n", entry).as_bytes()).await?;
    }
    Ok(printed + fresh.len())
}

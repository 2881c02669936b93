//! Countdown timers for the betting and answer windows
//!
//! A running timer only ever delivers *pulses*: one per elapsed second,
//! tagged with the [`TimerTicket`] it was started with. The engine owns the
//! [`Countdown`] arithmetic and drops any pulse whose ticket is no longer the
//! active one, which is how a pulse already in flight when a window is closed
//! manually becomes harmless.

use crate::games::types::TimerKind;
use serde::Serialize;
use std::cell::RefCell;
use std::collections::HashMap;
use std::rc::Rc;
use std::time::Duration;
use tokio::sync::mpsc;
use tokio::task::JoinHandle;

/// Identifies one started countdown
#[derive(Debug, Clone, Copy, Serialize, PartialEq, Eq, Hash)]
pub struct TimerTicket {
    pub kind: TimerKind,
    pub generation: u64,
}

/// Scheduling backend for countdown pulses
pub trait TimerService {
    /// Deliver `seconds` pulses for `ticket`, one per second, replacing any
    /// timer of the same kind that is still running
    fn start(&mut self, ticket: TimerTicket, seconds: u32);

    /// Stop pulses for `kind`; a no-op when nothing is running
    fn cancel(&mut self, kind: TimerKind);
}

/// What a countdown reports after starting or receiving a pulse
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CountdownStep {
    Tick { remaining: u32, warning: bool },
    Expired,
}

/// Pure countdown state: ticks N, N-1, ..., 1, then expires
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Countdown {
    ticket: TimerTicket,
    remaining: u32,
    warning_seconds: u32,
}

impl Countdown {
    /// Start a countdown, returning the step for the initial display
    pub fn start(ticket: TimerTicket, seconds: u32, warning_seconds: u32) -> (Self, CountdownStep) {
        let countdown = Self {
            ticket,
            remaining: seconds,
            warning_seconds,
        };
        let step = countdown.current_step();
        (countdown, step)
    }

    /// Consume one pulse
    pub fn advance(&mut self) -> CountdownStep {
        self.remaining = self.remaining.saturating_sub(1);
        self.current_step()
    }

    fn current_step(&self) -> CountdownStep {
        if self.remaining == 0 {
            CountdownStep::Expired
        } else {
            CountdownStep::Tick {
                remaining: self.remaining,
                warning: self.remaining <= self.warning_seconds,
            }
        }
    }

    pub fn ticket(&self) -> TimerTicket {
        self.ticket
    }

    pub fn kind(&self) -> TimerKind {
        self.ticket.kind
    }

    pub fn remaining(&self) -> u32 {
        self.remaining
    }
}

/// Timer backend running one tokio task per active kind
///
/// Must be used from within a tokio runtime.
pub struct TokioTimers {
    pulses: mpsc::UnboundedSender<TimerTicket>,
    tasks: HashMap<TimerKind, JoinHandle<()>>,
    period: Duration,
}

impl TokioTimers {
    /// Create the backend together with the receiver its pulses arrive on
    pub fn channel() -> (Self, mpsc::UnboundedReceiver<TimerTicket>) {
        let (tx, rx) = mpsc::unbounded_channel();
        (Self::new(tx), rx)
    }

    pub fn new(pulses: mpsc::UnboundedSender<TimerTicket>) -> Self {
        Self {
            pulses,
            tasks: HashMap::new(),
            period: Duration::from_secs(1),
        }
    }

    pub fn is_running(&self, kind: TimerKind) -> bool {
        self.tasks
            .get(&kind)
            .map(|task| !task.is_finished())
            .unwrap_or(false)
    }
}

impl TimerService for TokioTimers {
    fn start(&mut self, ticket: TimerTicket, seconds: u32) {
        self.cancel(ticket.kind);

        let pulses = self.pulses.clone();
        let period = self.period;
        let task = tokio::spawn(async move {
            let mut interval = tokio::time::interval(period);
            // First tick completes immediately
            interval.tick().await;
            for _ in 0..seconds {
                interval.tick().await;
                if pulses.send(ticket).is_err() {
                    break;
                }
            }
        });

        tracing::trace!(kind = %ticket.kind, generation = ticket.generation, seconds, "Timer started");
        self.tasks.insert(ticket.kind, task);
    }

    fn cancel(&mut self, kind: TimerKind) {
        if let Some(task) = self.tasks.remove(&kind) {
            task.abort();
            tracing::trace!(kind = %kind, "Timer cancelled");
        }
    }
}

impl Drop for TokioTimers {
    fn drop(&mut self) {
        for (_, task) in self.tasks.drain() {
            task.abort();
        }
    }
}

#[derive(Debug, Default)]
struct ManualState {
    running: HashMap<TimerKind, (TimerTicket, u32)>,
    starts: usize,
    cancels: usize,
}

/// Timer backend that never fires on its own
///
/// Records what the engine asked for; the caller delivers pulses by hand.
/// Clones share the same record.
#[derive(Debug, Clone, Default)]
pub struct ManualTimers {
    state: Rc<RefCell<ManualState>>,
}

impl ManualTimers {
    pub fn new() -> Self {
        Self::default()
    }

    /// Ticket and length of the running timer of `kind`
    pub fn running(&self, kind: TimerKind) -> Option<(TimerTicket, u32)> {
        self.state.borrow().running.get(&kind).copied()
    }

    pub fn starts(&self) -> usize {
        self.state.borrow().starts
    }

    /// Cancellations that actually stopped a running timer
    pub fn cancels(&self) -> usize {
        self.state.borrow().cancels
    }
}

impl TimerService for ManualTimers {
    fn start(&mut self, ticket: TimerTicket, seconds: u32) {
        let mut state = self.state.borrow_mut();
        state.running.insert(ticket.kind, (ticket, seconds));
        state.starts += 1;
    }

    fn cancel(&mut self, kind: TimerKind) {
        let mut state = self.state.borrow_mut();
        if state.running.remove(&kind).is_some() {
            state.cancels += 1;
        }
    }
}

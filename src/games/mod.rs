pub mod types;
pub mod deck;
pub mod ledger;
pub mod settlement;
pub mod timer;
pub mod alerts;
pub mod journal;
pub mod snapshot;
pub mod engine;

pub use types::*;
pub use deck::QuestionDeck;
pub use ledger::{Ledger, Player};
pub use settlement::{settle, Settlement};
pub use timer::{ManualTimers, TimerService, TimerTicket, TokioTimers};
pub use alerts::{Alert, AlertPort, RecordingAlerts, SilentAlerts, TerminalBell};
pub use journal::{GameEvent, Journal, JournalEntry};
pub use snapshot::GameSnapshot;
pub use engine::GameEngine;

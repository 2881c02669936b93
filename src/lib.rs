//! Coinquiz - classroom quiz game with coin betting
//!
//! Players bet coins on whether they will answer a hidden question, the
//! moderator reveals and judges it, and losers' stakes are shared among the
//! winners. The round engine is synchronous and single-threaded; timers and
//! the terminal surface feed it events from a tokio runtime.

pub mod config;
pub mod errors;
pub mod games;
pub mod session;
pub mod surface;

pub use config::{ConfigLoader, QuizConfig};
pub use errors::{QuizError, QuizResult, RoundError};
pub use games::GameEngine;

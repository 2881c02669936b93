//! Shuffled question deck
//!
//! Built once per session from the configured generation rule and permuted
//! with a seeded RNG, so a seed fully determines the question order.

use crate::config::DeckConfig;
use crate::games::types::{Difficulty, Question};
use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rand::SeedableRng;

/// A question handed out by the deck
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DeckDraw {
    pub question: Question,
    /// The deck ran out and restarted from its first question
    pub cycled: bool,
}

pub struct QuestionDeck {
    questions: Vec<Question>,
    cursor: usize,
    cycles: u32,
    seed: u64,
}

impl QuestionDeck {
    /// Build a deck from an already-ordered question list
    pub fn from_questions(questions: Vec<Question>, seed: u64) -> Self {
        Self {
            questions,
            cursor: 0,
            cycles: 0,
            seed,
        }
    }

    /// Generate and shuffle the deck described by `config`
    ///
    /// Invalid difficulties are skipped; `QuizConfig::validate` rejects them
    /// before a deck is ever built.
    pub fn generate(config: &DeckConfig, seed: u64) -> Self {
        let mut questions: Vec<Question> = if config.questions.is_empty() {
            (1..=config.identifiers)
                .flat_map(|id| {
                    config.difficulties.iter().filter_map(move |&level| {
                        Difficulty::new(level).map(|difficulty| Question {
                            label: format!("{} #{}", config.label_prefix, id),
                            difficulty,
                        })
                    })
                })
                .collect()
        } else {
            config
                .questions
                .iter()
                .filter_map(|entry| {
                    Difficulty::new(entry.difficulty).map(|difficulty| Question {
                        label: entry.label.clone(),
                        difficulty,
                    })
                })
                .collect()
        };

        let mut rng = StdRng::seed_from_u64(seed);
        questions.shuffle(&mut rng);

        tracing::debug!(seed, size = questions.len(), "Question deck shuffled");
        Self::from_questions(questions, seed)
    }

    /// Hand out the next question, wrapping to the start once exhausted
    ///
    /// Returns `None` only for an empty deck.
    pub fn next(&mut self) -> Option<DeckDraw> {
        if self.questions.is_empty() {
            return None;
        }

        let mut cycled = false;
        if self.cursor >= self.questions.len() {
            self.cursor = 0;
            self.cycles += 1;
            cycled = true;
            tracing::info!(cycles = self.cycles, "Question deck cycled");
        }

        let question = self.questions[self.cursor].clone();
        self.cursor += 1;
        Some(DeckDraw { question, cycled })
    }

    /// Distinct questions left before the deck would cycle
    pub fn remaining_count(&self) -> usize {
        self.questions.len().saturating_sub(self.cursor)
    }

    pub fn len(&self) -> usize {
        self.questions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.questions.is_empty()
    }

    /// How many times the deck has wrapped around
    pub fn cycles(&self) -> u32 {
        self.cycles
    }

    pub fn seed(&self) -> u64 {
        self.seed
    }
}

//! Four-phase turn sequencer for the matching game.
//!
//! `Idle → OneSelected → ComparisonPending → (Idle | Complete)`. The only
//! suspension point is the reveal delay before a pending comparison is
//! resolved; dropping that future discards the resolution before any side
//! effect is taken.

use std::time::Duration;

use serde::{Deserialize, Serialize};
use strum::Display;
use tracing::{debug, info, instrument};

use super::board::Board;

/// Points awarded for each matched pair.
pub const MATCH_POINTS: i32 = 10;

/// How long both cards stay face up before a pending comparison is
/// judged, so the player can register them.
pub const REVEAL_DELAY: Duration = Duration::from_millis(1000);

/// Engine phase.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Display, Serialize, Deserialize)]
pub enum Phase {
    /// No cards face up.
    Idle,
    /// Exactly one unmatched card face up.
    OneSelected,
    /// Two cards face up, resolution pending; input is ignored.
    ComparisonPending,
    /// Every card matched.
    Complete,
}

/// What a call to [`MatchEngine::select_card`] did.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SelectOutcome {
    /// Selection ignored: comparison pending, game complete, index out of
    /// range, or card already face up.
    Ignored,
    /// First card of a pair revealed.
    FirstRevealed,
    /// Second card revealed; a comparison is now pending resolution.
    ComparisonPending,
}

/// Completion event carrying the final tallies.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct GameComplete {
    /// Final score.
    pub score: i32,
    /// Total resolved attempts.
    pub attempts: i32,
}

/// Result of resolving a pending comparison.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Resolution {
    /// True if the two cards matched.
    pub matched: bool,
    /// Present when this resolution matched the final pair.
    pub completed: Option<GameComplete>,
}

/// In-memory state machine for one game session.
#[derive(Debug, Clone)]
pub struct MatchEngine {
    board: Board,
    first: Option<usize>,
    second: Option<usize>,
    score: i32,
    attempts: i32,
    phase: Phase,
}

impl MatchEngine {
    /// Creates an engine over a freshly shuffled standard board.
    #[instrument]
    pub fn new() -> Self {
        info!("Creating match engine");
        Self::with_board(Board::shuffled())
    }

    /// Creates an engine over a prepared board (deterministic tests).
    pub fn with_board(board: Board) -> Self {
        Self {
            board,
            first: None,
            second: None,
            score: 0,
            attempts: 0,
            phase: Phase::Idle,
        }
    }

    /// The board as currently visible.
    pub fn board(&self) -> &Board {
        &self.board
    }

    /// Current phase.
    pub fn phase(&self) -> Phase {
        self.phase
    }

    /// Current score.
    pub fn score(&self) -> i32 {
        self.score
    }

    /// Resolved attempts so far.
    pub fn attempts(&self) -> i32 {
        self.attempts
    }

    /// Selects a card.
    ///
    /// Ignored while a comparison is pending or the game is complete, and
    /// for out-of-range, already revealed, or already matched cards. The
    /// first valid pick reveals the card; the second arms a pending
    /// comparison that must be resolved before further input.
    #[instrument(skip(self), fields(phase = %self.phase))]
    pub fn select_card(&mut self, index: usize) -> SelectOutcome {
        if matches!(self.phase, Phase::ComparisonPending | Phase::Complete) {
            debug!(index, "Selection ignored: not accepting input");
            return SelectOutcome::Ignored;
        }

        let Some(slot) = self.board.slot(index) else {
            debug!(index, "Selection ignored: out of range");
            return SelectOutcome::Ignored;
        };
        if slot.revealed() || slot.matched() {
            debug!(index, "Selection ignored: card already face up");
            return SelectOutcome::Ignored;
        }

        self.board.reveal(index);
        match self.first {
            None => {
                self.first = Some(index);
                self.phase = Phase::OneSelected;
                debug!(index, "First card revealed");
                SelectOutcome::FirstRevealed
            }
            Some(first) => {
                self.second = Some(index);
                self.phase = Phase::ComparisonPending;
                debug!(first, second = index, "Comparison pending");
                SelectOutcome::ComparisonPending
            }
        }
    }

    /// Resolves the pending comparison immediately.
    ///
    /// Equal symbols: both cards become permanently matched and the score
    /// rises by [`MATCH_POINTS`]. Unequal: both flip back face down. The
    /// attempt counter increments either way. Returns `None` when no
    /// comparison is pending.
    #[instrument(skip(self), fields(phase = %self.phase))]
    pub fn resolve(&mut self) -> Option<Resolution> {
        if self.phase != Phase::ComparisonPending {
            return None;
        }
        let (first, second) = (self.first?, self.second?);

        let matched = self.board.slot(first)?.symbol() == self.board.slot(second)?.symbol();
        if matched {
            self.board.mark_matched(first);
            self.board.mark_matched(second);
            self.score += MATCH_POINTS;
        } else {
            self.board.hide(first);
            self.board.hide(second);
        }

        self.attempts += 1;
        self.first = None;
        self.second = None;

        let completed = if self.board.all_matched() {
            self.phase = Phase::Complete;
            info!(score = self.score, attempts = self.attempts, "Game complete");
            Some(GameComplete {
                score: self.score,
                attempts: self.attempts,
            })
        } else {
            self.phase = Phase::Idle;
            None
        };

        debug!(matched, attempts = self.attempts, "Comparison resolved");
        Some(Resolution { matched, completed })
    }

    /// Waits out the reveal delay, then resolves the pending comparison.
    ///
    /// Dropping the future before the delay elapses discards the
    /// resolution; no state is touched until the delay has passed.
    pub async fn resolve_after_delay(&mut self) -> Option<Resolution> {
        if self.phase != Phase::ComparisonPending {
            return None;
        }
        tokio::time::sleep(REVEAL_DELAY).await;
        self.resolve()
    }

    /// Starts over: freshly shuffled board, zeroed tallies, `Idle`.
    #[instrument(skip(self))]
    pub fn reset(&mut self) {
        info!("Resetting match engine");
        *self = Self::with_board(Board::shuffled());
    }
}

impl Default for MatchEngine {
    fn default() -> Self {
        Self::new()
    }
}

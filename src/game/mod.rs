//! Matching game: pair board and turn sequencer.

mod board;
mod engine;

pub use board::{Board, BoardError, SYMBOLS, Slot};
pub use engine::{
    GameComplete, MATCH_POINTS, MatchEngine, Phase, REVEAL_DELAY, Resolution, SelectOutcome,
};

//! Ephemeral pair board for one game session.

use rand::seq::SliceRandom;
use serde::{Deserialize, Serialize};

/// The fixed symbol set a standard board is built from. Each symbol
/// appears on exactly two slots, giving sixteen cards.
pub const SYMBOLS: [char; 8] = ['🍎', '🍌', '🍊', '🍇', '🍓', '🥝', '🍑', '🍒'];

/// One card slot on the board.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Slot {
    symbol: char,
    revealed: bool,
    matched: bool,
}

impl Slot {
    fn hidden(symbol: char) -> Self {
        Self {
            symbol,
            revealed: false,
            matched: false,
        }
    }

    /// The symbol printed on the card face.
    pub fn symbol(&self) -> char {
        self.symbol
    }

    /// True while the card is face up.
    pub fn revealed(&self) -> bool {
        self.revealed
    }

    /// True once the card's pair has been found; matched cards stay
    /// face up permanently.
    pub fn matched(&self) -> bool {
        self.matched
    }
}

/// Board construction error.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BoardError {
    /// A symbol did not appear exactly twice.
    UnbalancedPairs,
    /// The symbol list was empty.
    Empty,
}

impl std::fmt::Display for BoardError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            BoardError::UnbalancedPairs => write!(f, "Every symbol must appear exactly twice"),
            BoardError::Empty => write!(f, "Board needs at least one pair"),
        }
    }
}

impl std::error::Error for BoardError {}

/// Ordered sequence of card slots, in-memory only, one per game session.
///
/// Invariant: at most two slots are revealed-but-unmatched at any time
/// (the two actively compared cards). [`crate::MatchEngine`] maintains it.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Board {
    slots: Vec<Slot>,
}

impl Board {
    /// Creates a freshly shuffled board from the standard symbol set.
    pub fn shuffled() -> Self {
        let mut slots: Vec<Slot> = SYMBOLS
            .iter()
            .flat_map(|&s| [Slot::hidden(s), Slot::hidden(s)])
            .collect();
        slots.shuffle(&mut rand::thread_rng());
        Self { slots }
    }

    /// Creates a board with the given slot symbols in order, validating
    /// that each symbol appears exactly twice. Deterministic layouts for
    /// tests and replays.
    ///
    /// # Errors
    ///
    /// Returns [`BoardError`] for an empty list or an unbalanced multiset.
    pub fn from_symbols(symbols: Vec<char>) -> Result<Self, BoardError> {
        if symbols.is_empty() {
            return Err(BoardError::Empty);
        }

        let mut counts = std::collections::HashMap::new();
        for &s in &symbols {
            *counts.entry(s).or_insert(0u32) += 1;
        }
        if counts.values().any(|&c| c != 2) {
            return Err(BoardError::UnbalancedPairs);
        }

        Ok(Self {
            slots: symbols.into_iter().map(Slot::hidden).collect(),
        })
    }

    /// Number of card slots.
    pub fn len(&self) -> usize {
        self.slots.len()
    }

    /// True for a board with no slots (never produced by the constructors).
    pub fn is_empty(&self) -> bool {
        self.slots.is_empty()
    }

    /// The slot at the given index.
    pub fn slot(&self, index: usize) -> Option<&Slot> {
        self.slots.get(index)
    }

    /// All slots in board order.
    pub fn slots(&self) -> &[Slot] {
        &self.slots
    }

    /// True once every slot is matched.
    pub fn all_matched(&self) -> bool {
        self.slots.iter().all(|s| s.matched)
    }

    pub(crate) fn reveal(&mut self, index: usize) {
        if let Some(slot) = self.slots.get_mut(index) {
            slot.revealed = true;
        }
    }

    pub(crate) fn hide(&mut self, index: usize) {
        if let Some(slot) = self.slots.get_mut(index) {
            slot.revealed = false;
        }
    }

    pub(crate) fn mark_matched(&mut self, index: usize) {
        if let Some(slot) = self.slots.get_mut(index) {
            slot.matched = true;
            slot.revealed = true;
        }
    }
}

use thiserror::Error;

use crate::game::GameState;
use crate::pile::PileId;

/// Rejections reported by the state machine. None of them are fatal and the
/// layout is unchanged whenever one is returned.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum GameError {
    #[error("Illegal move: {reason}")]
    IllegalMove { reason: String },
    #[error("Unknown pile: {0}")]
    UnknownPile(String),
    #[error("Pile {0} is empty")]
    EmptyPile(PileId),
    #[error("Cannot move {requested} card(s) from {pile}, only {available} movable")]
    InvalidCount {
        pile: PileId,
        requested: usize,
        available: usize,
    },
    #[error("Card {0} is not on top of its pile")]
    NotOnTop(String),
    #[error("No source selected")]
    NoSelection,
    #[error("Game is not active (state: {state:?})")]
    NotActive { state: GameState },
    #[error("Pass limit exhausted after {used} pass(es)")]
    PassLimitExhausted { used: u32 },
    #[error("Stock and waste are both empty")]
    NothingToDraw,
    #[error("Invalid layout: {0}")]
    InvalidLayout(String),
}

impl GameError {
    pub(crate) fn illegal(reason: impl Into<String>) -> Self {
        GameError::IllegalMove {
            reason: reason.into(),
        }
    }
}

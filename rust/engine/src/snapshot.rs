use serde::{Deserialize, Serialize};

use crate::cards::Card;
use crate::fingerprint::TagStatus;
use crate::game::{Game, GameState};
use crate::pile::{FOUNDATION_PILES, TABLEAU_PILES};

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PileCounts {
    pub total: usize,
    pub face_up: usize,
}

/// Read-only view of a session for renderers and recorders.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Snapshot {
    pub seed: Option<u32>,
    pub state: GameState,
    pub moves: u32,
    pub passes_used: u32,
    /// `None` when the profile allows unlimited passes
    pub passes_remaining: Option<u32>,
    pub stock: usize,
    pub waste: usize,
    pub waste_top: Option<Card>,
    pub tableau: [PileCounts; TABLEAU_PILES],
    pub foundations: [usize; FOUNDATION_PILES],
    pub won: bool,
    pub tag: TagStatus,
}

impl Snapshot {
    pub fn capture(game: &Game, tag: TagStatus) -> Self {
        let layout = game.layout();
        let mut tableau = [PileCounts::default(); TABLEAU_PILES];
        for (slot, pile) in tableau.iter_mut().zip(layout.tableau.iter()) {
            *slot = PileCounts {
                total: pile.len(),
                face_up: pile.face_up_run(),
            };
        }
        let mut foundations = [0; FOUNDATION_PILES];
        for (slot, pile) in foundations.iter_mut().zip(layout.foundations.iter()) {
            *slot = pile.len();
        }
        Self {
            seed: game.seed(),
            state: game.state(),
            moves: game.moves(),
            passes_used: game.passes_used(),
            passes_remaining: game.passes_remaining(),
            stock: layout.stock.len(),
            waste: layout.waste.len(),
            waste_top: layout.waste.top().map(|c| c.card),
            tableau,
            foundations,
            won: game.is_won(),
            tag,
        }
    }

    pub fn foundation_total(&self) -> usize {
        self.foundations.iter().sum()
    }
}

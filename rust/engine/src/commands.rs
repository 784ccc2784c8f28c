//! Input-agnostic command surface.
//!
//! Pointer-drag and click-select front ends both reduce to
//! `SelectSource` followed by `DropOnDestination`.

use serde::{Deserialize, Serialize};

use crate::cards::Card;
use crate::errors::GameError;
use crate::game::{Game, MoveOutcome};
use crate::pile::PileId;
use crate::rules::MoveRequest;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Selection {
    pub pile: PileId,
    /// Index of the lowest selected card; everything above it moves too
    pub index: usize,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "command", rename_all = "snake_case")]
pub enum Command {
    NewGame { seed: Option<u32> },
    SelectSource { pile: PileId, index: usize },
    DropOnDestination { pile: PileId },
    /// Keyboard and automated players name the whole move at once
    Move { from: PileId, count: usize, to: PileId },
    DrawFromStock,
    RecycleStock,
    AutoPromote { card: Card },
    ClearSelection,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CommandOutcome {
    Dealt { seed: u32 },
    Selected(Selection),
    Moved(MoveOutcome),
    Drawn(usize),
    Recycled(usize),
    SelectionCleared,
}

impl From<MoveRequest> for Command {
    fn from(req: MoveRequest) -> Self {
        Command::Move {
            from: req.from,
            count: req.count,
            to: req.to,
        }
    }
}

impl Game {
    pub fn dispatch(&mut self, command: Command) -> Result<CommandOutcome, GameError> {
        match command {
            Command::NewGame { seed } => Ok(CommandOutcome::Dealt {
                seed: self.new_game(seed).seed(),
            }),
            Command::SelectSource { pile, index } => {
                self.select_source(pile, index).map(CommandOutcome::Selected)
            }
            Command::DropOnDestination { pile } => self.drop_on(pile).map(CommandOutcome::Moved),
            Command::Move { from, count, to } => self
                .request_move(MoveRequest::new(from, count, to))
                .map(CommandOutcome::Moved),
            Command::DrawFromStock => {
                let recycling = self.layout().stock.is_empty();
                let n = self.draw_from_stock()?;
                Ok(if recycling {
                    CommandOutcome::Recycled(n)
                } else {
                    CommandOutcome::Drawn(n)
                })
            }
            Command::RecycleStock => self.recycle_stock().map(CommandOutcome::Recycled),
            Command::AutoPromote { card } => self.auto_promote(card).map(CommandOutcome::Moved),
            Command::ClearSelection => {
                self.selection = None;
                Ok(CommandOutcome::SelectionCleared)
            }
        }
    }

    /// Marks the card at `index` of `pile` (and everything above it) as the
    /// pending source. The card must be face-up and able to lead a group:
    /// any face-up tableau card, or the top of the waste or a foundation.
    pub fn select_source(&mut self, pile: PileId, index: usize) -> Result<Selection, GameError> {
        if self.state() != crate::game::GameState::Active {
            return Err(GameError::NotActive {
                state: self.state(),
            });
        }
        let cards = self
            .layout()
            .pile(pile)
            .ok_or_else(|| GameError::UnknownPile(pile.to_string()))?;
        if cards.is_empty() {
            return Err(GameError::EmptyPile(pile));
        }
        let entry = cards.get(index).ok_or_else(|| GameError::InvalidCount {
            pile,
            requested: index.saturating_add(1),
            available: cards.len(),
        })?;
        let top_only = matches!(pile, PileId::Waste | PileId::Foundation(_));
        if pile == PileId::Stock
            || !entry.face_up
            || (top_only && index + 1 != cards.len())
        {
            return Err(GameError::NotOnTop(entry.card.to_string()));
        }
        let sel = Selection { pile, index };
        self.selection = Some(sel);
        Ok(sel)
    }

    /// Moves the pending selection onto `dest`. The selection is consumed
    /// whether or not the move succeeds.
    pub fn drop_on(&mut self, dest: PileId) -> Result<MoveOutcome, GameError> {
        let sel = self.selection.take().ok_or(GameError::NoSelection)?;
        let len = self.layout().pile(sel.pile).map_or(0, |p| p.len());
        let count = len.saturating_sub(sel.index);
        self.request_move(MoveRequest::new(sel.pile, count, dest))
    }
}

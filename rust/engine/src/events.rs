use std::sync::mpsc::{self, Receiver, Sender};

use serde::{Deserialize, Serialize};

use crate::cards::Card;
use crate::fingerprint::HandTag;
use crate::pile::PileId;

/// Outcome notifications published by [`crate::game::Game`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum GameEvent {
    DealStarted {
        seed: u32,
        draw: u8,
    },
    MoveApplied {
        from: PileId,
        to: PileId,
        count: usize,
        /// Tableau card turned face-up by this move, if any
        flipped: Option<Card>,
        moves: u32,
    },
    StockDrawn {
        count: usize,
        moves: u32,
    },
    StockRecycled {
        count: usize,
        passes_used: u32,
        moves: u32,
    },
    Won {
        seed: u32,
        moves: u32,
        passes_used: u32,
    },
    /// `seed` is `None` for games resumed with [`crate::game::Game::from_layout`]
    TagResolved {
        seed: Option<u32>,
        tag: HandTag,
    },
}

impl GameEvent {
    pub fn name(&self) -> &'static str {
        match self {
            GameEvent::DealStarted { .. } => "deal_started",
            GameEvent::MoveApplied { .. } => "move_applied",
            GameEvent::StockDrawn { .. } => "stock_drawn",
            GameEvent::StockRecycled { .. } => "stock_recycled",
            GameEvent::Won { .. } => "won",
            GameEvent::TagResolved { .. } => "tag_resolved",
        }
    }
}

/// Fan-out of events to any number of receivers. Receivers that were dropped
/// are pruned on the next publish.
#[derive(Debug, Default)]
pub struct EventBus {
    subscribers: Vec<Sender<GameEvent>>,
}

impl EventBus {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn subscribe(&mut self) -> Receiver<GameEvent> {
        let (tx, rx) = mpsc::channel();
        self.subscribers.push(tx);
        rx
    }

    pub fn publish(&mut self, event: GameEvent) {
        self.subscribers.retain(|tx| tx.send(event.clone()).is_ok());
    }

    pub fn subscriber_count(&self) -> usize {
        self.subscribers.len()
    }
}

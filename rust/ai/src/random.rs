//! Picks uniformly among legal moves and stock actions.

use klondike_engine::commands::Command;
use klondike_engine::game::Game;
use klondike_engine::rules::{legal_moves, validate_recycle};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

use crate::Player;

#[derive(Debug, Clone)]
pub struct RandomPlayer {
    rng: StdRng,
    seed: u64,
}

impl RandomPlayer {
    pub fn new(seed: u64) -> Self {
        Self {
            rng: StdRng::seed_from_u64(seed),
            seed,
        }
    }
}

impl Player for RandomPlayer {
    fn next_command(&mut self, game: &Game) -> Option<Command> {
        let layout = game.layout();
        let mut options: Vec<Command> = legal_moves(layout, game.profile())
            .into_iter()
            .map(Command::from)
            .collect();
        if !layout.stock.is_empty() {
            options.push(Command::DrawFromStock);
        } else if validate_recycle(layout, game.profile(), game.passes_used()).is_ok() {
            options.push(Command::RecycleStock);
        }
        if options.is_empty() {
            return None;
        }
        let pick = self.rng.random_range(0..options.len());
        Some(options.swap_remove(pick))
    }

    fn name(&self) -> &str {
        "RandomPlayer"
    }

    fn reset(&mut self) {
        self.rng = StdRng::seed_from_u64(self.seed);
    }
}

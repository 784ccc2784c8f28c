//! # klondike-ai: automated Klondike players
//!
//! Players drive a [`Game`] through the same command surface a human front
//! end uses, one [`Command`] at a time.
//!
//! ## Core Components
//!
//! - [`Player`] - Trait for choosing the next command
//! - [`greedy`] - Rule-based baseline without search
//! - [`random`] - Uniformly random legal play, for noise baselines
//! - [`create_player`] - Factory by kind name
//! - [`play_out`] - Drives a dealt game until it ends or stalls
//!
//! ## Quick Start
//!
//! ```rust
//! use klondike_ai::{create_player, play_out};
//! use klondike_engine::game::Game;
//! use klondike_engine::rules::RuleProfile;
//!
//! let mut game = Game::new(RuleProfile::classic());
//! game.new_game(Some(42));
//! let mut player = create_player("greedy").expect("known player");
//! let outcome = play_out(&mut game, player.as_mut(), 2_000);
//! assert!(outcome.steps <= 2_000);
//! assert_eq!(outcome.won, game.is_won());
//! ```

use klondike_engine::commands::Command;
use klondike_engine::game::{Game, GameState};
use tracing::debug;

pub mod greedy;
pub mod random;

/// A strategy that picks the next command for a game.
///
/// # Example Implementation
///
/// ```rust
/// use klondike_ai::Player;
/// use klondike_engine::commands::Command;
/// use klondike_engine::game::Game;
///
/// struct DrawOnly;
///
/// impl Player for DrawOnly {
///     fn next_command(&mut self, game: &Game) -> Option<Command> {
///         (!game.layout().stock.is_empty()).then_some(Command::DrawFromStock)
///     }
///
///     fn name(&self) -> &str {
///         "DrawOnly"
///     }
/// }
/// ```
pub trait Player: Send {
    /// The next command to dispatch, or `None` to give up.
    fn next_command(&mut self, game: &Game) -> Option<Command>;

    fn name(&self) -> &str;

    /// Forget per-deal state before a new deal.
    fn reset(&mut self) {}
}

/// Creates a player by kind: `"greedy"` or `"random"`. Unknown kinds give
/// `None`.
///
/// ```rust
/// use klondike_ai::create_player;
///
/// assert_eq!(create_player("greedy").map(|p| p.name().to_string()), Some("GreedyPlayer".into()));
/// assert!(create_player("solver").is_none());
/// ```
pub fn create_player(kind: &str) -> Option<Box<dyn Player>> {
    match kind.trim().to_ascii_lowercase().as_str() {
        "greedy" => Some(Box::new(greedy::GreedyPlayer::new())),
        "random" => Some(Box::new(random::RandomPlayer::new(0))),
        _ => None,
    }
}

pub const PLAYER_KINDS: [&str; 2] = ["greedy", "random"];

/// Summary of one automated game.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PlayOutcome {
    pub won: bool,
    pub moves: u32,
    pub passes_used: u32,
    /// Cards on the foundations when play stopped
    pub foundations: u32,
    /// Commands dispatched, accepted or not
    pub steps: u32,
}

/// Lets `player` play the current deal of `game` until it is won, the
/// player gives up, a command is rejected, or `max_steps` is reached.
pub fn play_out(game: &mut Game, player: &mut dyn Player, max_steps: u32) -> PlayOutcome {
    player.reset();
    let mut steps = 0;
    while steps < max_steps && game.state() == GameState::Active {
        let Some(command) = player.next_command(game) else {
            debug!(player = player.name(), steps, "player gave up");
            break;
        };
        steps += 1;
        if let Err(e) = game.dispatch(command) {
            debug!(player = player.name(), ?command, error = %e, "command rejected");
            break;
        }
    }
    PlayOutcome {
        won: game.is_won(),
        moves: game.moves(),
        passes_used: game.passes_used(),
        foundations: game.layout().foundation_total() as u32,
        steps,
    }
}

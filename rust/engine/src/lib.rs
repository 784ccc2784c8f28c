//! # klondike-engine: Klondike Solitaire game-state engine
//!
//! A deterministic single-deck Klondike engine. Deals are reproducible from a
//! 32-bit seed and every dealt layout gets a stable hand tag, so the same
//! deal is recognised across machines and sessions.
//!
//! ## Core Modules
//!
//! - [`cards`] - Card identity (Suit, Rank, Color) and the base deck order
//! - [`deck`] - Seeded ChaCha20 Fisher–Yates shuffle
//! - [`pile`] - Pile ids and ordered pile storage with face state
//! - [`layout`] - The 13-pile layout, dealing and the 52-card invariant
//! - [`rules`] - Move legality and rule profiles (draw size, pass limit)
//! - [`game`] - The session state machine (`Dealing → Active → Won`)
//! - [`commands`] - Select/drop command surface for input adapters
//! - [`encoding`] - Canonical, reversible byte form of a layout
//! - [`fingerprint`] - Hand tags and their asynchronous computation
//! - [`deck_key`] - 32-byte reversible key of a deck order
//! - [`events`] - Outcome events for subscribers
//! - [`snapshot`] - Read-only session view
//! - [`logger`] - Attempt records and the JSONL attempt log
//! - [`errors`] - Error types for game operations
//!
//! ## Quick Start
//!
//! ```rust
//! use klondike_engine::game::Game;
//! use klondike_engine::rules::RuleProfile;
//!
//! let mut game = Game::new(RuleProfile::classic());
//! game.new_game(Some(2024));
//! let drawn = game.draw_from_stock().unwrap();
//! assert_eq!(drawn, 3);
//! assert_eq!(game.layout().waste.len(), 3);
//! ```
//!
//! ## Deterministic Deals
//!
//! ```rust
//! use klondike_engine::game::Deal;
//!
//! let a = Deal::from_seed(42);
//! let b = Deal::from_seed(42);
//! assert_eq!(a.encoding(), b.encoding());
//! ```
//!
//! ## Move Validation
//!
//! ```rust
//! use klondike_engine::game::Game;
//! use klondike_engine::pile::PileId;
//! use klondike_engine::rules::{MoveRequest, RuleProfile};
//!
//! let mut game = Game::new(RuleProfile::default());
//! game.new_game(Some(7));
//! match game.request_move(MoveRequest::single(PileId::Tableau(0), PileId::Tableau(1))) {
//!     Ok(outcome) => println!("moved, {} moves so far", outcome.moves),
//!     Err(e) => println!("rejected: {}", e),
//! }
//! ```

pub mod cards;
pub mod commands;
pub mod deck;
pub mod deck_key;
pub mod encoding;
pub mod errors;
pub mod events;
pub mod fingerprint;
pub mod game;
pub mod layout;
pub mod logger;
pub mod pile;
pub mod rules;
pub mod snapshot;

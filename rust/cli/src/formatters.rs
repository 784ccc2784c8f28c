//! Text rendering of cards, piles and whole layouts for the terminal.
//!
//! Suits are drawn with Unicode symbols where the terminal is known to cope
//! and with the engine's letters (`c d h s`) otherwise. Face-down cards are
//! shown as `##`, or in parentheses when the rules allow peeking.
//!
//! ```rust
//! use klondike_engine::cards::{Card, Rank, Suit};
//! use klondike_cli::formatters::format_card;
//!
//! let queen = Card::new(Rank::Queen, Suit::Hearts);
//! assert!(format_card(queen) == "Q♥" || format_card(queen) == "Qh");
//! ```

use klondike_engine::cards::{Card, Suit};
use klondike_engine::commands::CommandOutcome;
use klondike_engine::game::Game;
use klondike_engine::layout::Layout;
use klondike_engine::pile::{Pile, PileCard, PileId};
use klondike_engine::rules::RuleProfile;

/// Windows consoles only render suit symbols in modern terminals.
pub fn supports_unicode() -> bool {
    if cfg!(windows) {
        std::env::var("WT_SESSION").is_ok()
            || std::env::var("TERM_PROGRAM").is_ok()
            || std::env::var("VSCODE_INJECTION").is_ok()
    } else {
        true
    }
}

pub fn format_suit(suit: Suit) -> String {
    if supports_unicode() {
        match suit {
            Suit::Hearts => "♥",
            Suit::Diamonds => "♦",
            Suit::Clubs => "♣",
            Suit::Spades => "♠",
        }
        .to_string()
    } else {
        suit.letter().to_string()
    }
}

pub fn format_card(card: Card) -> String {
    format!("{}{}", card.rank.label(), format_suit(card.suit))
}

pub fn format_pile_card(entry: PileCard, peek: bool) -> String {
    if entry.face_up {
        format_card(entry.card)
    } else if peek {
        format!("({})", format_card(entry.card))
    } else {
        "##".to_string()
    }
}

pub fn format_pile(pile: &Pile, peek: bool) -> String {
    if pile.is_empty() {
        return "--".to_string();
    }
    pile.cards()
        .iter()
        .map(|c| format_pile_card(*c, peek))
        .collect::<Vec<_>>()
        .join(" ")
}

/// Full board view: status line, foundations, then one line per tableau
/// pile from bottom to top. Only the top `draw` waste cards are shown.
pub fn format_layout(layout: &Layout, profile: &RuleProfile) -> String {
    let mut lines = Vec::with_capacity(9);
    let visible = layout.waste.len().min(profile.draw.max(1) as usize);
    let waste: Vec<String> = layout.waste.cards()[layout.waste.len() - visible..]
        .iter()
        .map(|c| format_card(c.card))
        .collect();
    lines.push(format!(
        "stock: {}  waste({}): [{}]",
        layout.stock.len(),
        layout.waste.len(),
        waste.join(" ")
    ));
    let foundations: Vec<String> = layout
        .foundations
        .iter()
        .zip(klondike_engine::cards::all_suits())
        .map(|(pile, suit)| {
            let top = pile
                .top()
                .map_or_else(|| "--".to_string(), |c| format_pile_card(c, false));
            format!("{}:{}", PileId::Foundation(suit), top)
        })
        .collect();
    lines.push(foundations.join("  "));
    for (i, pile) in layout.tableau.iter().enumerate() {
        lines.push(format!("{}: {}", PileId::Tableau(i as u8), format_pile(pile, profile.peek)));
    }
    lines.join("\n")
}

pub fn format_status(game: &Game) -> String {
    let passes = match game.passes_remaining() {
        Some(n) => format!("{} left", n),
        None => "unlimited".to_string(),
    };
    format!(
        "moves: {}  passes used: {} ({})  foundations: {}/52",
        game.moves(),
        game.passes_used(),
        passes,
        game.layout().foundation_total()
    )
}

pub fn format_outcome(outcome: &CommandOutcome) -> String {
    match outcome {
        CommandOutcome::Dealt { seed } => format!("Dealt seed {}", seed),
        CommandOutcome::Selected(sel) => format!("Selected {} from card {}", sel.pile, sel.index + 1),
        CommandOutcome::Moved(m) => {
            let mut s = format!("Moved {} card(s) {} -> {}", m.request.count, m.request.from, m.request.to);
            if let Some(card) = m.flipped {
                s.push_str(&format!(", revealed {}", format_card(card)));
            }
            s
        }
        CommandOutcome::Drawn(n) => format!("Drew {} card(s)", n),
        CommandOutcome::Recycled(n) => format!("Recycled {} card(s) into the stock", n),
        CommandOutcome::SelectionCleared => "Selection cleared".to_string(),
    }
}

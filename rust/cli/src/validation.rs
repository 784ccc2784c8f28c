//! Parsing of the interactive `play` input language.
//!
//! | input            | meaning                                       |
//! |------------------|-----------------------------------------------|
//! | `d`              | draw from stock (recycles when it is empty)   |
//! | `r`              | recycle the waste into the stock              |
//! | `m SRC [N] DST`  | move the top N cards (default 1)              |
//! | `s PILE IDX`     | select the card at 1-based position IDX       |
//! | `t PILE`         | drop the selection on PILE                    |
//! | `c`              | clear the selection                           |
//! | `a CARD`         | promote CARD to its foundation                |
//! | `aa`             | promote everything that can go up             |
//! | `show`           | redraw the board                              |
//! | `h`              | help                                          |
//! | `q`              | quit                                          |
//!
//! Piles are `stock`, `waste` (`w`), `t1`..`t7` and `fc fd fh fs`.

use klondike_engine::cards::Card;
use klondike_engine::commands::Command;
use klondike_engine::pile::PileId;

pub const PLAY_HELP: &str = "commands: d | r | m SRC [N] DST | s PILE IDX | t PILE | c | a CARD | aa | show | h | q";

const VERBS: [&str; 22] = [
    "d", "draw", "r", "recycle", "c", "clear", "aa", "show", "l", "h", "help", "?", "q", "quit",
    "m", "move", "s", "select", "t", "drop", "a", "promote",
];

#[derive(Debug, PartialEq)]
pub enum ParseResult {
    /// A command for the engine
    Command(Command),
    PromoteAll,
    Show,
    Help,
    Quit,
    Invalid(String),
}

fn parse_pile(token: &str) -> Result<PileId, String> {
    token
        .parse::<PileId>()
        .map_err(|_| format!("Unknown pile '{}'", token))
}

fn parse_count(token: &str) -> Result<usize, String> {
    match token.parse::<usize>() {
        Ok(n) if n >= 1 => Ok(n),
        _ => Err(format!("Expected a positive number, got '{}'", token)),
    }
}

/// Parses one line of play input.
///
/// ```rust
/// # use klondike_cli::validation::{parse_play_input, ParseResult};
/// use klondike_engine::commands::Command;
/// use klondike_engine::pile::PileId;
///
/// assert_eq!(parse_play_input("d"), ParseResult::Command(Command::DrawFromStock));
/// assert_eq!(
///     parse_play_input("m t7 2 t3"),
///     ParseResult::Command(Command::Move {
///         from: PileId::Tableau(6),
///         count: 2,
///         to: PileId::Tableau(2),
///     })
/// );
/// assert_eq!(parse_play_input("q"), ParseResult::Quit);
/// ```
pub fn parse_play_input(input: &str) -> ParseResult {
    let input = input.trim().to_lowercase();
    let parts: Vec<&str> = input.split_whitespace().collect();
    let Some((&verb, args)) = parts.split_first() else {
        return ParseResult::Invalid("Empty input".to_string());
    };

    let parsed = match (verb, args) {
        ("d" | "draw", []) => Ok(ParseResult::Command(Command::DrawFromStock)),
        ("r" | "recycle", []) => Ok(ParseResult::Command(Command::RecycleStock)),
        ("c" | "clear", []) => Ok(ParseResult::Command(Command::ClearSelection)),
        ("aa", []) => Ok(ParseResult::PromoteAll),
        ("show" | "l", []) => Ok(ParseResult::Show),
        ("h" | "help" | "?", []) => Ok(ParseResult::Help),
        ("q" | "quit", []) => Ok(ParseResult::Quit),
        ("m" | "move", [src, dst]) => parse_pile(src).and_then(|from| {
            parse_pile(dst).map(|to| ParseResult::Command(Command::Move { from, count: 1, to }))
        }),
        ("m" | "move", [src, n, dst]) => parse_pile(src).and_then(|from| {
            let count = parse_count(n)?;
            let to = parse_pile(dst)?;
            Ok(ParseResult::Command(Command::Move { from, count, to }))
        }),
        ("s" | "select", [pile, idx]) => parse_pile(pile).and_then(|pile| {
            let pos = parse_count(idx)?;
            Ok(ParseResult::Command(Command::SelectSource {
                pile,
                index: pos - 1,
            }))
        }),
        ("t" | "drop", [pile]) => {
            parse_pile(pile).map(|pile| ParseResult::Command(Command::DropOnDestination { pile }))
        }
        ("a" | "promote", [card]) => card
            .parse::<Card>()
            .map(|card| ParseResult::Command(Command::AutoPromote { card }))
            .map_err(|e| e.to_string()),
        _ if VERBS.contains(&verb) => {
            Err(format!("Wrong arguments for '{}'. {}", verb, PLAY_HELP))
        }
        _ => Err(format!("Unrecognized command '{}'. {}", verb, PLAY_HELP)),
    };
    parsed.unwrap_or_else(ParseResult::Invalid)
}

#[cfg(test)]
mod tests {
    use super::*;
    use klondike_engine::cards::{Rank, Suit};

    #[test]
    fn single_card_move_defaults_to_one() {
        assert_eq!(
            parse_play_input("M Waste T4"),
            ParseResult::Command(Command::Move {
                from: PileId::Waste,
                count: 1,
                to: PileId::Tableau(3),
            })
        );
    }

    #[test]
    fn select_index_is_one_based() {
        assert_eq!(
            parse_play_input("s t7 7"),
            ParseResult::Command(Command::SelectSource {
                pile: PileId::Tableau(6),
                index: 6,
            })
        );
        assert!(matches!(parse_play_input("s t7 0"), ParseResult::Invalid(_)));
    }

    #[test]
    fn promote_parses_card_labels() {
        assert_eq!(
            parse_play_input("a 10h"),
            ParseResult::Command(Command::AutoPromote {
                card: Card::new(Rank::Ten, Suit::Hearts),
            })
        );
        assert_eq!(parse_play_input("aa"), ParseResult::PromoteAll);
    }

    #[test]
    fn bad_input_is_reported() {
        match parse_play_input("fold") {
            ParseResult::Invalid(msg) => assert!(msg.contains("Unrecognized")),
            other => panic!("expected Invalid, got {:?}", other),
        }
        match parse_play_input("m t9 t1") {
            ParseResult::Invalid(msg) => assert!(msg.contains("Unknown pile")),
            other => panic!("expected Invalid, got {:?}", other),
        }
        match parse_play_input("d 3") {
            ParseResult::Invalid(msg) => assert!(msg.contains("Wrong arguments")),
            other => panic!("expected Invalid, got {:?}", other),
        }
        assert_eq!(parse_play_input("   "), ParseResult::Invalid("Empty input".into()));
    }
}

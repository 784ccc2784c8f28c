use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::cards::{all_suits, Card, Suit};

pub const TABLEAU_PILES: usize = 7;
pub const FOUNDATION_PILES: usize = 4;

/// Identifies one of the thirteen piles of a layout.
///
/// Textual form: `stock`, `waste`, `t1`..`t7` (1-based), `fc`, `fd`, `fh`, `fs`.
/// Tableau indices are stored 0-based.
#[derive(Debug, Copy, Clone, Eq, PartialEq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PileId {
    Stock,
    Waste,
    Tableau(u8),
    Foundation(Suit),
}

impl PileId {
    /// All pile ids in canonical encoding order: tableau 0..6, stock, waste,
    /// foundations in suit order.
    pub fn canonical_order() -> [PileId; 13] {
        let s = all_suits();
        [
            PileId::Tableau(0),
            PileId::Tableau(1),
            PileId::Tableau(2),
            PileId::Tableau(3),
            PileId::Tableau(4),
            PileId::Tableau(5),
            PileId::Tableau(6),
            PileId::Stock,
            PileId::Waste,
            PileId::Foundation(s[0]),
            PileId::Foundation(s[1]),
            PileId::Foundation(s[2]),
            PileId::Foundation(s[3]),
        ]
    }

    /// Position of the pile in [`PileId::canonical_order`].
    pub fn ordinal(self) -> usize {
        match self {
            PileId::Tableau(i) => i as usize,
            PileId::Stock => 7,
            PileId::Waste => 8,
            PileId::Foundation(s) => 9 + s.index(),
        }
    }

    pub fn from_ordinal(i: usize) -> Option<PileId> {
        Self::canonical_order().get(i).copied()
    }

    pub fn is_tableau(self) -> bool {
        matches!(self, PileId::Tableau(_))
    }

    pub fn is_foundation(self) -> bool {
        matches!(self, PileId::Foundation(_))
    }
}

impl fmt::Display for PileId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PileId::Stock => write!(f, "stock"),
            PileId::Waste => write!(f, "waste"),
            PileId::Tableau(i) => write!(f, "t{}", *i as usize + 1),
            PileId::Foundation(s) => write!(f, "f{}", s.letter()),
        }
    }
}

impl FromStr for PileId {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let t = s.trim().to_ascii_lowercase();
        match t.as_str() {
            "stock" | "st" => return Ok(PileId::Stock),
            "waste" | "w" => return Ok(PileId::Waste),
            _ => {}
        }
        if let Some(n) = t.strip_prefix('t') {
            return match n.parse::<usize>() {
                Ok(i) if (1..=TABLEAU_PILES).contains(&i) => Ok(PileId::Tableau((i - 1) as u8)),
                _ => Err(s.to_string()),
            };
        }
        if let Some(rest) = t.strip_prefix('f') {
            let rest = rest.trim_start_matches('-');
            let suit = match rest {
                "c" | "clubs" => Suit::Clubs,
                "d" | "diamonds" => Suit::Diamonds,
                "h" | "hearts" => Suit::Hearts,
                "s" | "spades" => Suit::Spades,
                _ => return Err(s.to_string()),
            };
            return Ok(PileId::Foundation(suit));
        }
        Err(s.to_string())
    }
}

/// A card as it sits in a pile, with its face state.
#[derive(Debug, Copy, Clone, Eq, PartialEq, Hash, Serialize, Deserialize)]
pub struct PileCard {
    pub card: Card,
    pub face_up: bool,
}

impl PileCard {
    pub fn up(card: Card) -> Self {
        Self {
            card,
            face_up: true,
        }
    }

    pub fn down(card: Card) -> Self {
        Self {
            card,
            face_up: false,
        }
    }
}

/// An ordered stack of cards, bottom at index 0 and top at the end.
#[derive(Debug, Clone, Default, Eq, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Pile {
    cards: Vec<PileCard>,
}

impl Pile {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_cards(cards: Vec<PileCard>) -> Self {
        Self { cards }
    }

    pub fn len(&self) -> usize {
        self.cards.len()
    }

    pub fn is_empty(&self) -> bool {
        self.cards.is_empty()
    }

    pub fn cards(&self) -> &[PileCard] {
        &self.cards
    }

    pub fn top(&self) -> Option<PileCard> {
        self.cards.last().copied()
    }

    pub fn get(&self, index: usize) -> Option<PileCard> {
        self.cards.get(index).copied()
    }

    pub fn push(&mut self, card: PileCard) {
        self.cards.push(card);
    }

    pub fn pop(&mut self) -> Option<PileCard> {
        self.cards.pop()
    }

    /// Length of the maximal contiguous face-up suffix.
    pub fn face_up_run(&self) -> usize {
        self.cards.iter().rev().take_while(|c| c.face_up).count()
    }

    /// Removes and returns the top `n` cards, bottom-most first.
    pub fn take_top(&mut self, n: usize) -> Vec<PileCard> {
        let at = self.cards.len().saturating_sub(n);
        self.cards.split_off(at)
    }

    pub fn extend(&mut self, cards: impl IntoIterator<Item = PileCard>) {
        self.cards.extend(cards);
    }

    /// Turns a face-down top card face-up. Returns the card when it flipped.
    pub fn flip_top(&mut self) -> Option<Card> {
        match self.cards.last_mut() {
            Some(top) if !top.face_up => {
                top.face_up = true;
                Some(top.card)
            }
            _ => None,
        }
    }

    pub fn position_of(&self, card: Card) -> Option<usize> {
        self.cards.iter().position(|c| c.card == card)
    }

    pub fn clear(&mut self) -> Vec<PileCard> {
        std::mem::take(&mut self.cards)
    }
}

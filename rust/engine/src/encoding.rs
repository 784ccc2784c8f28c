//! Canonical byte form of a [`Layout`].
//!
//! Piles are written in a fixed order: tableau 1..7 bottom to top, stock in
//! draw order (next card first), waste bottom to top, then the foundations in
//! suit order. Each pile opens with a marker byte `0xC0 | ordinal`; each card
//! is one byte `face << 7 | suit << 4 | rank`. Markers have bits 6 and 7 set
//! while card bytes never set bit 6 (suit index < 4), so the stream parses
//! without lengths.

use std::fmt;

use thiserror::Error;

use crate::cards::{Card, Rank, Suit};
use crate::layout::Layout;
use crate::pile::{Pile, PileCard, PileId};

const MARKER: u8 = 0xC0;
const FACE_BIT: u8 = 0x80;

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum DecodeError {
    #[error("encoding is empty")]
    Empty,
    #[error("byte {offset}: expected pile marker {expected:#04x}, found {found:#04x}")]
    UnexpectedMarker { offset: usize, expected: u8, found: u8 },
    #[error("byte {offset}: card byte {value:#04x} before any pile marker")]
    CardOutsidePile { offset: usize, value: u8 },
    #[error("byte {offset}: invalid card byte {value:#04x}")]
    InvalidCard { offset: usize, value: u8 },
    #[error("encoding ends after {found} of 13 piles")]
    Truncated { found: usize },
    #[error("decoded layout is inconsistent: {0}")]
    Inconsistent(String),
}

/// The canonical encoding of one layout.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct CanonicalEncoding {
    bytes: Vec<u8>,
}

impl CanonicalEncoding {
    pub fn as_bytes(&self) -> &[u8] {
        &self.bytes
    }

    pub fn into_bytes(self) -> Vec<u8> {
        self.bytes
    }

    pub fn len(&self) -> usize {
        self.bytes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bytes.is_empty()
    }

    pub fn to_hex(&self) -> String {
        hex::encode(&self.bytes)
    }

    /// Human-readable token stream, e.g. `t1:Kh+ | t2:3c- 9d+ | ... | stock:... | fs:`.
    /// `+` marks a face-up card, `-` a face-down one.
    pub fn to_text(&self) -> String {
        let mut parts: Vec<String> = Vec::with_capacity(13);
        for &b in &self.bytes {
            if b & MARKER == MARKER {
                let label = PileId::from_ordinal((b & !MARKER) as usize)
                    .map(|id| id.to_string())
                    .unwrap_or_else(|| "?".to_string());
                parts.push(format!("{}:", label));
            } else if let (Some(last), Some((card, up))) = (parts.last_mut(), card_from_byte(b)) {
                if !last.ends_with(':') {
                    last.push(' ');
                }
                last.push_str(&card.to_string());
                last.push(if up { '+' } else { '-' });
            }
        }
        parts.join(" | ")
    }
}

impl fmt::Display for CanonicalEncoding {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_text())
    }
}

impl AsRef<[u8]> for CanonicalEncoding {
    fn as_ref(&self) -> &[u8] {
        &self.bytes
    }
}

fn card_byte(pc: PileCard) -> u8 {
    let face = if pc.face_up { FACE_BIT } else { 0 };
    face | ((pc.card.suit.index() as u8) << 4) | pc.card.rank.value()
}

fn card_from_byte(b: u8) -> Option<(Card, bool)> {
    let up = b & FACE_BIT != 0;
    let suit = Suit::from_index(((b >> 4) & 0x07) as usize)?;
    let rank = Rank::from_u8(b & 0x0F)?;
    Some((Card::new(rank, suit), up))
}

/// Encodes `layout`. Equal layouts give equal bytes and any structural
/// difference (placement, order or face state) gives different bytes.
///
/// ```
/// use klondike_engine::deck::Deck;
/// use klondike_engine::encoding::{decode, encode};
/// use klondike_engine::layout::Layout;
///
/// let mut deck = Deck::new_with_seed(3);
/// deck.shuffle();
/// let layout = Layout::deal(&mut deck);
/// let enc = encode(&layout);
/// assert_eq!(enc.len(), 52 + 13);
/// assert_eq!(decode(enc.as_bytes()).unwrap(), layout);
/// ```
pub fn encode(layout: &Layout) -> CanonicalEncoding {
    let mut bytes = Vec::with_capacity(52 + 13);
    for (ordinal, id) in PileId::canonical_order().into_iter().enumerate() {
        bytes.push(MARKER | ordinal as u8);
        let Some(pile) = layout.pile(id) else {
            continue;
        };
        if id == PileId::Stock {
            bytes.extend(pile.cards().iter().rev().map(|&pc| card_byte(pc)));
        } else {
            bytes.extend(pile.cards().iter().map(|&pc| card_byte(pc)));
        }
    }
    CanonicalEncoding { bytes }
}

/// Rebuilds the layout an encoding was produced from.
pub fn decode(bytes: &[u8]) -> Result<Layout, DecodeError> {
    if bytes.is_empty() {
        return Err(DecodeError::Empty);
    }
    let mut piles: Vec<Vec<PileCard>> = Vec::with_capacity(13);
    for (offset, &b) in bytes.iter().enumerate() {
        if b & MARKER == MARKER {
            let expected = MARKER | piles.len() as u8;
            if b != expected || piles.len() >= 13 {
                return Err(DecodeError::UnexpectedMarker {
                    offset,
                    expected,
                    found: b,
                });
            }
            piles.push(Vec::new());
            continue;
        }
        let Some(current) = piles.last_mut() else {
            return Err(DecodeError::CardOutsidePile { offset, value: b });
        };
        let (card, face_up) =
            card_from_byte(b).ok_or(DecodeError::InvalidCard { offset, value: b })?;
        current.push(PileCard { card, face_up });
    }
    if piles.len() != 13 {
        return Err(DecodeError::Truncated { found: piles.len() });
    }

    let mut layout = Layout::default();
    for (ordinal, cards) in piles.into_iter().enumerate() {
        let Some(id) = PileId::from_ordinal(ordinal) else {
            continue;
        };
        let cards = if id == PileId::Stock {
            cards.into_iter().rev().collect()
        } else {
            cards
        };
        if let Some(pile) = layout.pile_mut(id) {
            *pile = Pile::from_cards(cards);
        }
    }
    layout
        .check_invariant()
        .map_err(DecodeError::Inconsistent)?;
    Ok(layout)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::deck::Deck;

    fn dealt(seed: u32) -> Layout {
        let mut deck = Deck::new_with_seed(seed);
        deck.shuffle();
        Layout::deal(&mut deck)
    }

    #[test]
    fn encoding_is_idempotent() {
        let layout = dealt(21);
        assert_eq!(encode(&layout), encode(&layout.clone()));
    }

    #[test]
    fn face_state_changes_the_bytes() {
        let a = dealt(4);
        let mut b = a.clone();
        if let Some(pc) = b.tableau[3].cards().first().copied() {
            let mut cards = b.tableau[3].cards().to_vec();
            cards[0] = PileCard::up(pc.card);
            b.tableau[3] = Pile::from_cards(cards);
        }
        assert_ne!(encode(&a), encode(&b));
    }

    #[test]
    fn moving_a_card_between_piles_changes_the_bytes() {
        let a = dealt(4);
        let mut b = a.clone();
        if let Some(pc) = b.stock.pop() {
            b.waste.push(PileCard::up(pc.card));
        }
        assert_ne!(encode(&a), encode(&b));
    }

    #[test]
    fn stock_is_written_in_draw_order() {
        let layout = dealt(8);
        let enc = encode(&layout);
        let stock_marker = enc
            .as_bytes()
            .iter()
            .position(|&b| b == MARKER | 7)
            .unwrap();
        let first = card_from_byte(enc.as_bytes()[stock_marker + 1]).unwrap();
        assert_eq!(Some(first.0), layout.stock.top().map(|c| c.card));
    }

    #[test]
    fn text_form_lists_piles() {
        let text = encode(&dealt(1)).to_text();
        assert!(text.starts_with("t1:"));
        assert!(text.contains(" | stock:"));
        assert!(text.ends_with("fs:"));
        assert_eq!(text.matches(" | ").count(), 12);
    }

    #[test]
    fn decode_rejects_garbage() {
        assert_eq!(decode(&[]), Err(DecodeError::Empty));
        assert!(matches!(
            decode(&[0x81]),
            Err(DecodeError::CardOutsidePile { offset: 0, .. })
        ));
        assert!(matches!(decode(&[MARKER, MARKER | 2]), Err(DecodeError::UnexpectedMarker { .. })));
        assert!(matches!(decode(&[MARKER, 0x8F]), Err(DecodeError::InvalidCard { .. })));
        let enc = encode(&dealt(2));
        let cut = &enc.as_bytes()[..enc.len() - 4];
        assert!(decode(cut).is_err());
    }
}

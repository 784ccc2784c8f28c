use std::collections::HashSet;

use serde::{Deserialize, Serialize};

use crate::cards::{all_suits, Card, Suit};
use crate::deck::Deck;
use crate::pile::{Pile, PileCard, PileId, FOUNDATION_PILES, TABLEAU_PILES};

pub const DECK_SIZE: usize = 52;
/// Cards left in the stock after the tableau deal (52 - 28).
pub const STOCK_AFTER_DEAL: usize = 24;

/// The arrangement of all 52 cards at one instant.
///
/// Invariant: the union of all piles is the full deck, each card exactly
/// once. Every mutation in this crate keeps it; [`Layout::check_invariant`]
/// reports the first violation.
#[derive(Debug, Clone, Default, Eq, PartialEq, Serialize, Deserialize)]
pub struct Layout {
    /// Face-down reserve, top is the next card drawn
    pub stock: Pile,
    /// Face-up drawn cards, only the top is playable
    pub waste: Pile,
    /// Seven tableau piles
    pub tableau: [Pile; TABLEAU_PILES],
    /// Foundations indexed by [`Suit::index`]
    pub foundations: [Pile; FOUNDATION_PILES],
}

impl Layout {
    /// Deals a Klondike layout from a deck.
    ///
    /// Tableau pile *i* receives *i + 1* cards (column by column), only the
    /// last one face-up. The remaining cards go to the stock face-down so
    /// that the next card of the deck order is the first one drawn.
    pub fn deal(deck: &mut Deck) -> Layout {
        let mut layout = Layout::default();
        for (col, pile) in layout.tableau.iter_mut().enumerate() {
            for row in 0..=col {
                if let Some(card) = deck.deal_card() {
                    pile.push(PileCard {
                        card,
                        face_up: row == col,
                    });
                }
            }
        }
        let mut rest = Vec::with_capacity(deck.remaining());
        while let Some(card) = deck.deal_card() {
            rest.push(PileCard::down(card));
        }
        rest.reverse();
        layout.stock = Pile::from_cards(rest);
        layout
    }

    pub fn pile(&self, id: PileId) -> Option<&Pile> {
        match id {
            PileId::Stock => Some(&self.stock),
            PileId::Waste => Some(&self.waste),
            PileId::Tableau(i) => self.tableau.get(i as usize),
            PileId::Foundation(s) => self.foundations.get(s.index()),
        }
    }

    pub fn pile_mut(&mut self, id: PileId) -> Option<&mut Pile> {
        match id {
            PileId::Stock => Some(&mut self.stock),
            PileId::Waste => Some(&mut self.waste),
            PileId::Tableau(i) => self.tableau.get_mut(i as usize),
            PileId::Foundation(s) => self.foundations.get_mut(s.index()),
        }
    }

    pub fn foundation(&self, suit: Suit) -> &Pile {
        &self.foundations[suit.index()]
    }

    pub fn foundation_total(&self) -> usize {
        self.foundations.iter().map(Pile::len).sum()
    }

    pub fn is_won(&self) -> bool {
        self.foundations.iter().all(|f| f.len() == 13)
    }

    /// Finds the pile currently holding `card` and its index in that pile.
    pub fn locate(&self, card: Card) -> Option<(PileId, usize)> {
        PileId::canonical_order().into_iter().find_map(|id| {
            self.pile(id)
                .and_then(|p| p.position_of(card))
                .map(|i| (id, i))
        })
    }

    pub fn card_count(&self) -> usize {
        PileId::canonical_order()
            .into_iter()
            .filter_map(|id| self.pile(id))
            .map(Pile::len)
            .sum()
    }

    /// Checks the 52-distinct-cards invariant plus the per-pile shape rules
    /// (stock face-down, waste and foundations face-up, foundations ascending
    /// in their own suit).
    pub fn check_invariant(&self) -> Result<(), String> {
        let mut seen = HashSet::with_capacity(DECK_SIZE);
        for id in PileId::canonical_order() {
            let Some(pile) = self.pile(id) else {
                continue;
            };
            for pc in pile.cards() {
                if !seen.insert(pc.card) {
                    return Err(format!("card {} appears twice (again in {})", pc.card, id));
                }
            }
        }
        if seen.len() != DECK_SIZE {
            return Err(format!("expected {} cards, found {}", DECK_SIZE, seen.len()));
        }
        if self.stock.cards().iter().any(|c| c.face_up) {
            return Err("face-up card in stock".into());
        }
        if self.waste.cards().iter().any(|c| !c.face_up) {
            return Err("face-down card in waste".into());
        }
        for suit in all_suits() {
            for (i, pc) in self.foundation(suit).cards().iter().enumerate() {
                if pc.card.suit != suit || pc.card.rank.value() as usize != i + 1 || !pc.face_up {
                    return Err(format!("foundation {} out of sequence at {}", suit.letter(), i));
                }
            }
        }
        Ok(())
    }
}

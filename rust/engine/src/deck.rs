use rand::{RngCore, SeedableRng};
use rand_chacha::ChaCha20Rng;

use crate::cards::{full_deck, Card};

/// A 32-bit deal seed. Wider inputs are masked into range, never rejected.
#[derive(Debug, Copy, Clone, Eq, PartialEq, Hash, serde::Serialize, serde::Deserialize)]
#[serde(transparent)]
pub struct Seed(pub u32);

impl Seed {
    pub fn from_u64(v: u64) -> Self {
        Seed((v & 0xFFFF_FFFF) as u32)
    }

    pub fn random() -> Self {
        Seed(rand::random())
    }
}

impl From<u32> for Seed {
    fn from(v: u32) -> Self {
        Seed(v)
    }
}

/// Returns the permutation of the base deck for `seed`.
///
/// ChaCha20 is seeded from the 32-bit seed and drives an explicit
/// Fisher–Yates pass from the top index down: for `i` in `51..=1`,
/// `j = next_u64() % (i + 1)` and cards `i` and `j` swap. The output depends
/// on nothing but the seed, so every platform produces the same order.
///
/// ```
/// use klondike_engine::deck::shuffle;
///
/// assert_eq!(shuffle(7), shuffle(7));
/// assert_eq!(shuffle(7).len(), 52);
/// ```
pub fn shuffle(seed: u32) -> Vec<Card> {
    let mut rng = ChaCha20Rng::seed_from_u64(seed as u64);
    let mut cards = full_deck();
    fisher_yates(&mut cards, &mut rng);
    cards
}

fn fisher_yates(cards: &mut [Card], rng: &mut ChaCha20Rng) {
    for i in (1..cards.len()).rev() {
        let j = (rng.next_u64() % (i as u64 + 1)) as usize;
        cards.swap(i, j);
    }
}

/// Deterministic shuffled deck handed out one card at a time.
///
/// # Examples
///
/// ```
/// use klondike_engine::deck::Deck;
///
/// let mut a = Deck::new_with_seed(42);
/// let mut b = Deck::new_with_seed(42);
/// a.shuffle();
/// b.shuffle();
/// assert_eq!(a.deal_card(), b.deal_card());
/// ```
#[derive(Debug, Clone)]
pub struct Deck {
    cards: Vec<Card>,
    position: usize,
    seed: u32,
}

impl Deck {
    pub fn new_with_seed(seed: u32) -> Self {
        // Keep base order until shuffle is called explicitly
        Self {
            cards: full_deck(),
            position: 0,
            seed,
        }
    }

    pub fn seed(&self) -> u32 {
        self.seed
    }

    pub fn shuffle(&mut self) {
        self.cards = shuffle(self.seed);
        self.position = 0;
    }

    pub fn deal_card(&mut self) -> Option<Card> {
        let c = self.cards.get(self.position).copied()?;
        self.position += 1;
        Some(c)
    }

    /// The full order this deck deals in, including already dealt cards.
    pub fn order(&self) -> &[Card] {
        &self.cards
    }

    pub fn reset(&mut self) {
        self.cards = full_deck();
        self.position = 0;
    }

    pub fn remaining(&self) -> usize {
        self.cards.len().saturating_sub(self.position)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    #[test]
    fn seed_masks_high_bits() {
        assert_eq!(Seed::from_u64(0x1_0000_0007), Seed(7));
        assert_eq!(Seed::from_u64(u64::MAX), Seed(u32::MAX));
    }

    #[test]
    fn shuffle_is_a_permutation() {
        for seed in [0, 1, 2, 0xDEAD_BEEF, u32::MAX] {
            let cards = shuffle(seed);
            let set: HashSet<Card> = cards.iter().copied().collect();
            assert_eq!(set.len(), 52, "seed {seed} lost a card");
        }
    }

    #[test]
    fn deck_deals_exactly_52() {
        let mut deck = Deck::new_with_seed(9);
        deck.shuffle();
        for _ in 0..52 {
            assert!(deck.deal_card().is_some());
        }
        assert_eq!(deck.remaining(), 0);
        assert!(deck.deal_card().is_none());
    }
}

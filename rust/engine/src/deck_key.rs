//! Reversible 32-byte key for a 52-card deck order.
//!
//! The key is the Lehmer code of the order relative to the base deck
//! ([`crate::cards::full_deck`]) read as one mixed-radix number: position 0
//! has radix 52 and is the most significant digit, position 51 has radix 1.
//! The number is stored big-endian and left-padded to 32 bytes
//! (52! < 2^226). The all-zero key is the base order.

use num_bigint::BigUint;
use num_traits::{ToPrimitive, Zero};
use thiserror::Error;

use crate::cards::Card;
use crate::layout::DECK_SIZE;

pub const DECK_KEY_SIZE: usize = 32;

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum DeckKeyError {
    #[error("Deck key must contain 32 bytes, got {0}")]
    InvalidLength(usize),
    #[error("Deck key contains leftover data")]
    LeftoverData,
    #[error("Deck order is not a permutation of the 52-card deck")]
    NotAPermutation,
}

pub fn encode(order: &[Card]) -> Result<[u8; DECK_KEY_SIZE], DeckKeyError> {
    if order.len() != DECK_SIZE {
        return Err(DeckKeyError::NotAPermutation);
    }
    let mut available: Vec<usize> = (0..DECK_SIZE).collect();
    let mut value = BigUint::zero();
    for (pos, card) in order.iter().enumerate() {
        let digit = available
            .iter()
            .position(|&o| o == card.ordinal())
            .ok_or(DeckKeyError::NotAPermutation)?;
        available.remove(digit);
        value = value * BigUint::from(DECK_SIZE - pos) + BigUint::from(digit);
    }

    let raw = value.to_bytes_be();
    let mut key = [0u8; DECK_KEY_SIZE];
    // raw.len() <= 29 since 52! needs 226 bits
    key[DECK_KEY_SIZE - raw.len()..].copy_from_slice(&raw);
    Ok(key)
}

pub fn decode(key: &[u8]) -> Result<Vec<Card>, DeckKeyError> {
    if key.len() != DECK_KEY_SIZE {
        return Err(DeckKeyError::InvalidLength(key.len()));
    }
    let mut value = BigUint::from_bytes_be(key);
    let mut digits = [0usize; DECK_SIZE];
    for pos in (0..DECK_SIZE).rev() {
        let radix = BigUint::from(DECK_SIZE - pos);
        let digit = (&value % &radix).to_usize().ok_or(DeckKeyError::LeftoverData)?;
        digits[pos] = digit;
        value /= radix;
    }
    if !value.is_zero() {
        return Err(DeckKeyError::LeftoverData);
    }

    let mut available: Vec<usize> = (0..DECK_SIZE).collect();
    let mut order = Vec::with_capacity(DECK_SIZE);
    for digit in digits {
        let ordinal = available.remove(digit);
        order.push(Card::from_ordinal(ordinal).ok_or(DeckKeyError::NotAPermutation)?);
    }
    Ok(order)
}

pub fn to_hex(key: &[u8; DECK_KEY_SIZE]) -> String {
    hex::encode(key)
}

pub fn from_hex(text: &str) -> Result<Vec<Card>, DeckKeyError> {
    let bytes = hex::decode(text.trim()).map_err(|_| DeckKeyError::InvalidLength(text.len() / 2))?;
    decode(&bytes)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cards::full_deck;
    use crate::deck::shuffle;

    #[test]
    fn zero_key_is_base_order() {
        assert_eq!(decode(&[0u8; DECK_KEY_SIZE]), Ok(full_deck()));
        assert_eq!(encode(&full_deck()), Ok([0u8; DECK_KEY_SIZE]));
    }

    #[test]
    fn shuffled_orders_survive_the_key() {
        for seed in [1, 77, 4096, u32::MAX] {
            let order = shuffle(seed);
            let key = encode(&order).unwrap();
            assert_eq!(decode(&key).unwrap(), order);
            assert_eq!(from_hex(&to_hex(&key)).unwrap(), order);
        }
    }

    #[test]
    fn wrong_sizes_are_rejected() {
        let err = decode(&[0u8; DECK_KEY_SIZE + 1]).unwrap_err();
        assert!(err.to_string().contains("32 bytes"));
        assert!(decode(&[]).is_err());
    }

    #[test]
    fn values_past_52_factorial_are_leftover() {
        assert_eq!(decode(&[0xFF; DECK_KEY_SIZE]), Err(DeckKeyError::LeftoverData));
    }

    #[test]
    fn duplicate_cards_cannot_be_encoded() {
        let mut order = full_deck();
        order[1] = order[0];
        assert_eq!(encode(&order), Err(DeckKeyError::NotAPermutation));
        assert_eq!(encode(&order[..51]), Err(DeckKeyError::NotAPermutation));
    }
}

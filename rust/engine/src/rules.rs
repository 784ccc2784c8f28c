use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::cards::{Card, Rank};
use crate::errors::GameError;
use crate::layout::Layout;
use crate::pile::{Pile, PileCard, PileId};

pub const DEFAULT_DRAW: u8 = 3;
pub const MAX_DRAW: u8 = 5;

/// Errors from building or parsing a [`RuleProfile`].
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum RuleError {
    #[error("Invalid pass limit '{0}': expected a name (unlimited, three, one, none) or a non-negative integer")]
    InvalidPassLimit(String),
    #[error("Invalid draw count {0}: must be between 1 and 5")]
    InvalidDraw(u8),
    #[error("Unknown rule profile '{0}'")]
    UnknownProfile(String),
}

/// How many times the waste may be recycled into the stock.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum PassLimit {
    #[default]
    Unlimited,
    Limited(u32),
}

impl PassLimit {
    pub fn allows(self, passes_used: u32) -> bool {
        match self {
            PassLimit::Unlimited => true,
            PassLimit::Limited(n) => passes_used < n,
        }
    }

    /// `None` when unlimited.
    pub fn remaining(self, passes_used: u32) -> Option<u32> {
        match self {
            PassLimit::Unlimited => None,
            PassLimit::Limited(n) => Some(n.saturating_sub(passes_used)),
        }
    }
}

impl FromStr for PassLimit {
    type Err = RuleError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let t = s.trim().to_ascii_lowercase();
        let named = match t.as_str() {
            "" | "unlimited" | "infinite" | "max_relax" => Some(PassLimit::Unlimited),
            "three" | "triple" => Some(PassLimit::Limited(3)),
            "one" | "single" => Some(PassLimit::Limited(1)),
            "none" => Some(PassLimit::Limited(0)),
            _ => None,
        };
        if let Some(limit) = named {
            return Ok(limit);
        }
        if let Ok(n) = t.parse::<u32>() {
            return Ok(PassLimit::Limited(n));
        }
        // integral floats such as "4.0" are accepted, anything else is rejected
        match t.parse::<f64>() {
            Ok(f) if f.is_finite() && f >= 0.0 && f.fract() == 0.0 && f <= u32::MAX as f64 => {
                Ok(PassLimit::Limited(f as u32))
            }
            _ => Err(RuleError::InvalidPassLimit(s.to_string())),
        }
    }
}

impl fmt::Display for PassLimit {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PassLimit::Unlimited => write!(f, "unlimited"),
            PassLimit::Limited(n) => write!(f, "{}", n),
        }
    }
}

impl Serialize for PassLimit {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            PassLimit::Unlimited => serializer.serialize_str("unlimited"),
            PassLimit::Limited(n) => serializer.serialize_u32(*n),
        }
    }
}

impl<'de> Deserialize<'de> for PassLimit {
    fn deserialize<D: serde::Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        #[derive(Deserialize)]
        #[serde(untagged)]
        enum Raw {
            Int(i64),
            Float(f64),
            Text(String),
        }
        let text = match Raw::deserialize(deserializer)? {
            Raw::Int(n) => n.to_string(),
            Raw::Float(f) => f.to_string(),
            Raw::Text(s) => s,
        };
        text.parse().map_err(serde::de::Error::custom)
    }
}

/// A configurable rule set for one session.
///
/// # Examples
///
/// ```
/// use klondike_engine::rules::{PassLimit, RuleProfile};
///
/// let std = RuleProfile::standard();
/// assert_eq!(std.draw, 3);
/// assert_eq!(std.passes, PassLimit::Limited(3));
/// assert_eq!(RuleProfile::by_name("friendly").unwrap().draw, 1);
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct RuleProfile {
    /// Cards moved from stock to waste per draw
    pub draw: u8,
    /// Recycle allowance
    #[serde(default)]
    pub passes: PassLimit,
    /// Whether foundation cards may be played back onto the tableau
    #[serde(default)]
    pub foundation_takeback: bool,
    /// Whether auto-promote is restricted to safe cards
    #[serde(default)]
    pub autoplay_safe_only: bool,
    /// Whether face-down cards may be shown to the player
    #[serde(default)]
    pub peek: bool,
}

impl Default for RuleProfile {
    fn default() -> Self {
        Self::classic()
    }
}

impl RuleProfile {
    pub const NAMES: [&'static str; 5] = ["classic", "standard", "friendly", "relaxed", "xray"];

    /// Draw three, unlimited passes.
    pub fn classic() -> Self {
        Self {
            draw: DEFAULT_DRAW,
            passes: PassLimit::Unlimited,
            foundation_takeback: false,
            autoplay_safe_only: false,
            peek: false,
        }
    }

    /// Draw three, three passes, safe-only autoplay.
    pub fn standard() -> Self {
        Self {
            draw: 3,
            passes: PassLimit::Limited(3),
            foundation_takeback: false,
            autoplay_safe_only: true,
            peek: false,
        }
    }

    pub fn friendly() -> Self {
        Self {
            draw: 1,
            passes: PassLimit::Unlimited,
            foundation_takeback: true,
            autoplay_safe_only: false,
            peek: false,
        }
    }

    /// [`RuleProfile::friendly`] with face-down cards visible.
    pub fn relaxed() -> Self {
        Self {
            peek: true,
            ..Self::friendly()
        }
    }

    /// [`RuleProfile::standard`] with face-down cards visible.
    pub fn xray() -> Self {
        Self {
            peek: true,
            ..Self::standard()
        }
    }

    pub fn by_name(name: &str) -> Result<Self, RuleError> {
        match name.trim().to_ascii_lowercase().as_str() {
            "classic" | "default" => Ok(Self::classic()),
            "standard" => Ok(Self::standard()),
            "friendly" | "friendly_app" => Ok(Self::friendly()),
            "relaxed" | "max_relax" => Ok(Self::relaxed()),
            "xray" => Ok(Self::xray()),
            _ => Err(RuleError::UnknownProfile(name.to_string())),
        }
    }

    pub fn with_draw(mut self, draw: u8) -> Result<Self, RuleError> {
        self.draw = draw;
        self.validate()?;
        Ok(self)
    }

    pub fn with_passes(mut self, passes: PassLimit) -> Self {
        self.passes = passes;
        self
    }

    pub fn validate(&self) -> Result<(), RuleError> {
        if self.draw == 0 || self.draw > MAX_DRAW {
            return Err(RuleError::InvalidDraw(self.draw));
        }
        Ok(())
    }

    pub fn passes_remaining(&self, passes_used: u32) -> Option<u32> {
        self.passes.remaining(passes_used)
    }
}

/// A proposed transition between two piles.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct MoveRequest {
    pub from: PileId,
    pub count: usize,
    pub to: PileId,
}

impl MoveRequest {
    pub fn new(from: PileId, count: usize, to: PileId) -> Self {
        Self { from, count, to }
    }

    pub fn single(from: PileId, to: PileId) -> Self {
        Self::new(from, 1, to)
    }
}

/// A move that passed validation against a specific layout.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidatedMove {
    pub request: MoveRequest,
    /// The bottom card of the moving group
    pub lead: Card,
}

/// Whether `card` (with its run on top) may be placed on a tableau pile
/// whose top is `dest_top`.
pub fn can_stack_tableau(dest_top: Option<PileCard>, card: Card) -> bool {
    match dest_top {
        None => card.rank == Rank::King,
        Some(top) => {
            top.face_up
                && top.card.color() != card.color()
                && top.card.rank.value() == card.rank.value() + 1
        }
    }
}

/// Whether `card` may be placed on `foundation`.
pub fn can_stack_foundation(foundation: &Pile, card: Card) -> bool {
    match foundation.top() {
        None => card.rank == Rank::Ace,
        Some(top) => top.card.suit == card.suit && top.card.rank.next() == Some(card.rank),
    }
}

/// A card is safe to promote when no tableau card could still need it:
/// Aces and Twos always, otherwise when both foundations of the opposite
/// color already reach one rank below.
pub fn is_safe_promotion(layout: &Layout, card: Card) -> bool {
    if card.rank.value() <= 2 {
        return true;
    }
    let needed = card.rank.value() - 1;
    layout
        .foundations
        .iter()
        .filter_map(|f| f.top())
        .filter(|top| top.card.color() != card.color())
        .filter(|top| top.card.rank.value() >= needed)
        .count()
        == 2
}

/// Validates a pile-to-pile move against `layout` under `profile`.
///
/// # Errors
///
/// - [`GameError::UnknownPile`] for tableau indices out of range
/// - [`GameError::EmptyPile`] when the source has no cards
/// - [`GameError::InvalidCount`] for zero counts, multi-card moves from the
///   waste or foundations, or runs longer than the face-up suffix
/// - [`GameError::IllegalMove`] when the stacking rules reject the placement
///
/// # Examples
///
/// ```
/// use klondike_engine::cards::{Card, Rank, Suit};
/// use klondike_engine::layout::Layout;
/// use klondike_engine::pile::{PileCard, PileId};
/// use klondike_engine::rules::{validate_move, MoveRequest, RuleProfile};
///
/// let mut layout = Layout::default();
/// layout.tableau[0].push(PileCard::up(Card::new(Rank::Three, Suit::Spades)));
/// layout.tableau[1].push(PileCard::up(Card::new(Rank::Two, Suit::Hearts)));
/// let req = MoveRequest::single(PileId::Tableau(1), PileId::Tableau(0));
/// assert!(validate_move(&layout, &RuleProfile::default(), &req).is_ok());
/// ```
pub fn validate_move(
    layout: &Layout,
    profile: &RuleProfile,
    req: &MoveRequest,
) -> Result<ValidatedMove, GameError> {
    let src = layout
        .pile(req.from)
        .ok_or_else(|| GameError::UnknownPile(req.from.to_string()))?;
    let dst = layout
        .pile(req.to)
        .ok_or_else(|| GameError::UnknownPile(req.to.to_string()))?;
    if req.from == req.to {
        return Err(GameError::illegal("source and destination are the same pile"));
    }
    if src.is_empty() {
        return Err(GameError::EmptyPile(req.from));
    }

    let movable = match req.from {
        PileId::Stock => {
            return Err(GameError::illegal("stock cards move only by drawing"));
        }
        PileId::Tableau(_) => src.face_up_run(),
        PileId::Waste => 1,
        PileId::Foundation(_) => {
            if !profile.foundation_takeback {
                return Err(GameError::illegal("foundation takeback is disabled"));
            }
            1
        }
    };
    if req.count == 0 || req.count > movable {
        return Err(GameError::InvalidCount {
            pile: req.from,
            requested: req.count,
            available: movable,
        });
    }
    let lead = src.cards()[src.len() - req.count].card;

    match req.to {
        PileId::Tableau(_) => {
            if req.from.is_foundation() && !profile.foundation_takeback {
                return Err(GameError::illegal("foundation takeback is disabled"));
            }
            if !can_stack_tableau(dst.top(), lead) {
                return Err(GameError::illegal(match dst.top() {
                    None => format!("only a King may start an empty pile, not {}", lead),
                    Some(top) => format!("{} cannot be placed on {}", lead, top.card),
                }));
            }
        }
        PileId::Foundation(suit) => {
            if req.count != 1 {
                return Err(GameError::illegal("only single cards move to a foundation"));
            }
            if lead.suit != suit || !can_stack_foundation(dst, lead) {
                return Err(GameError::illegal(format!(
                    "{} does not continue the {:?} foundation",
                    lead, suit
                )));
            }
        }
        PileId::Stock | PileId::Waste => {
            return Err(GameError::illegal(format!("cards cannot be played onto the {}", req.to)));
        }
    }

    Ok(ValidatedMove {
        request: *req,
        lead,
    })
}

/// Every pile-to-pile move [`validate_move`] accepts on `layout`.
pub fn legal_moves(layout: &Layout, profile: &RuleProfile) -> Vec<MoveRequest> {
    let mut out = Vec::new();
    for from in PileId::canonical_order() {
        let Some(src) = layout.pile(from) else {
            continue;
        };
        let max = match from {
            PileId::Stock => 0,
            PileId::Tableau(_) => src.face_up_run(),
            PileId::Waste | PileId::Foundation(_) => src.len().min(1),
        };
        for count in 1..=max {
            for to in PileId::canonical_order() {
                let req = MoveRequest::new(from, count, to);
                if validate_move(layout, profile, &req).is_ok() {
                    out.push(req);
                }
            }
        }
    }
    out
}

/// Number of cards a draw would move, or the reason it cannot happen.
pub fn validate_draw(layout: &Layout, profile: &RuleProfile) -> Result<usize, GameError> {
    if layout.stock.is_empty() {
        return Err(GameError::EmptyPile(PileId::Stock));
    }
    Ok(layout.stock.len().min(profile.draw as usize))
}

/// Number of cards a recycle would move back, or the reason it cannot happen.
pub fn validate_recycle(
    layout: &Layout,
    profile: &RuleProfile,
    passes_used: u32,
) -> Result<usize, GameError> {
    if !layout.stock.is_empty() {
        return Err(GameError::illegal("the stock must be empty before recycling"));
    }
    if layout.waste.is_empty() {
        return Err(GameError::NothingToDraw);
    }
    if !profile.passes.allows(passes_used) {
        return Err(GameError::PassLimitExhausted { used: passes_used });
    }
    Ok(layout.waste.len())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cards::Suit;

    fn card(rank: Rank, suit: Suit) -> Card {
        Card::new(rank, suit)
    }

    #[test]
    fn pass_limit_parsing_table() {
        let cases = [
            ("unlimited", PassLimit::Unlimited),
            ("infinite", PassLimit::Unlimited),
            ("max_relax", PassLimit::Unlimited),
            ("   ", PassLimit::Unlimited),
            ("three", PassLimit::Limited(3)),
            ("Triple", PassLimit::Limited(3)),
            ("one", PassLimit::Limited(1)),
            ("single", PassLimit::Limited(1)),
            ("none", PassLimit::Limited(0)),
            ("5", PassLimit::Limited(5)),
            ("4.0", PassLimit::Limited(4)),
        ];
        for (text, expected) in cases {
            assert_eq!(text.parse::<PassLimit>(), Ok(expected), "parsing {:?}", text);
        }
        for bad in ["-1", "bogus", "3.5", "NaN", "inf"] {
            assert!(bad.parse::<PassLimit>().is_err(), "{:?} should be rejected", bad);
        }
    }

    #[test]
    fn pass_limit_counts_down() {
        let std = RuleProfile::standard();
        assert_eq!(std.passes_remaining(1), Some(2));
        assert_eq!(std.passes_remaining(3), Some(0));
        assert_eq!(std.passes_remaining(7), Some(0));
        assert_eq!(RuleProfile::friendly().passes_remaining(20), None);
        assert!(std.passes.allows(2));
        assert!(!std.passes.allows(3));
    }

    #[test]
    fn profile_serialises_through_json() {
        let p = RuleProfile::standard();
        let s = serde_json::to_string(&p).unwrap();
        let back: RuleProfile = serde_json::from_str(&s).unwrap();
        assert_eq!(p, back);

        let unlimited: RuleProfile =
            serde_json::from_str(r#"{"draw":1,"passes":"infinite"}"#).unwrap();
        assert_eq!(unlimited.passes, PassLimit::Unlimited);
        assert!(!unlimited.foundation_takeback);
        assert!(serde_json::from_str::<RuleProfile>(r#"{"draw":1,"passes":-2}"#).is_err());
    }

    #[test]
    fn draw_count_is_validated() {
        assert_eq!(RuleProfile::classic().with_draw(0), Err(RuleError::InvalidDraw(0)));
        assert_eq!(RuleProfile::classic().with_draw(6), Err(RuleError::InvalidDraw(6)));
        assert_eq!(RuleProfile::classic().with_draw(1).map(|p| p.draw), Ok(1));
        assert!(RuleProfile::by_name("bogus").is_err());
    }

    #[test]
    fn tableau_stacking_alternates_color_and_descends() {
        let three_spades = Some(PileCard::up(card(Rank::Three, Suit::Spades)));
        let three_hearts = Some(PileCard::up(card(Rank::Three, Suit::Hearts)));
        let two_hearts = card(Rank::Two, Suit::Hearts);
        assert!(can_stack_tableau(three_spades, two_hearts));
        assert!(!can_stack_tableau(three_hearts, two_hearts));
        assert!(!can_stack_tableau(None, two_hearts));
        assert!(can_stack_tableau(None, card(Rank::King, Suit::Clubs)));
        let hidden = Some(PileCard::down(card(Rank::Three, Suit::Spades)));
        assert!(!can_stack_tableau(hidden, two_hearts));
    }

    #[test]
    fn foundation_needs_ace_then_sequence() {
        let mut f = Pile::new();
        assert!(can_stack_foundation(&f, card(Rank::Ace, Suit::Clubs)));
        assert!(!can_stack_foundation(&f, card(Rank::Two, Suit::Clubs)));
        f.push(PileCard::up(card(Rank::Ace, Suit::Clubs)));
        assert!(!can_stack_foundation(&f, card(Rank::Three, Suit::Clubs)));
        assert!(!can_stack_foundation(&f, card(Rank::Two, Suit::Hearts)));
        assert!(can_stack_foundation(&f, card(Rank::Two, Suit::Clubs)));
    }

    #[test]
    fn multi_card_run_must_be_face_up_suffix() {
        let mut layout = Layout::default();
        layout.tableau[0].extend([
            PileCard::down(card(Rank::Nine, Suit::Clubs)),
            PileCard::up(card(Rank::Eight, Suit::Hearts)),
            PileCard::up(card(Rank::Seven, Suit::Spades)),
        ]);
        layout.tableau[1].push(PileCard::up(card(Rank::Nine, Suit::Spades)));
        let profile = RuleProfile::default();

        let ok = MoveRequest::new(PileId::Tableau(0), 2, PileId::Tableau(1));
        assert_eq!(
            validate_move(&layout, &profile, &ok).map(|v| v.lead),
            Ok(card(Rank::Eight, Suit::Hearts))
        );
        let too_many = MoveRequest::new(PileId::Tableau(0), 3, PileId::Tableau(1));
        assert!(matches!(
            validate_move(&layout, &profile, &too_many),
            Err(GameError::InvalidCount { available: 2, .. })
        ));
        let zero = MoveRequest::new(PileId::Tableau(0), 0, PileId::Tableau(1));
        assert!(validate_move(&layout, &profile, &zero).is_err());
    }

    #[test]
    fn foundation_rejects_groups_and_wrong_suit() {
        let mut layout = Layout::default();
        layout.tableau[0].extend([
            PileCard::up(card(Rank::Two, Suit::Clubs)),
            PileCard::up(card(Rank::Ace, Suit::Hearts)),
        ]);
        let profile = RuleProfile::default();
        let group = MoveRequest::new(PileId::Tableau(0), 2, PileId::Foundation(Suit::Hearts));
        assert!(validate_move(&layout, &profile, &group).is_err());
        let wrong = MoveRequest::single(PileId::Tableau(0), PileId::Foundation(Suit::Clubs));
        assert!(validate_move(&layout, &profile, &wrong).is_err());
        let right = MoveRequest::single(PileId::Tableau(0), PileId::Foundation(Suit::Hearts));
        assert!(validate_move(&layout, &profile, &right).is_ok());
    }

    #[test]
    fn takeback_depends_on_profile() {
        let mut layout = Layout::default();
        layout.foundations[Suit::Hearts.index()].extend([
            PileCard::up(card(Rank::Ace, Suit::Hearts)),
            PileCard::up(card(Rank::Two, Suit::Hearts)),
        ]);
        layout.tableau[2].push(PileCard::up(card(Rank::Three, Suit::Clubs)));
        let req = MoveRequest::single(PileId::Foundation(Suit::Hearts), PileId::Tableau(2));
        assert!(validate_move(&layout, &RuleProfile::classic(), &req).is_err());
        assert!(validate_move(&layout, &RuleProfile::friendly(), &req).is_ok());
    }

    #[test]
    fn never_into_stock_or_waste() {
        let mut layout = Layout::default();
        layout.tableau[0].push(PileCard::up(card(Rank::Ace, Suit::Hearts)));
        let profile = RuleProfile::default();
        for to in [PileId::Stock, PileId::Waste] {
            let req = MoveRequest::single(PileId::Tableau(0), to);
            assert!(validate_move(&layout, &profile, &req).is_err());
        }
        let bad_index = MoveRequest::single(PileId::Tableau(0), PileId::Tableau(9));
        assert!(matches!(
            validate_move(&layout, &profile, &bad_index),
            Err(GameError::UnknownPile(_))
        ));
    }

    #[test]
    fn safe_promotion_waits_for_opposite_color() {
        let mut layout = Layout::default();
        let three_hearts = card(Rank::Three, Suit::Hearts);
        assert!(is_safe_promotion(&layout, card(Rank::Two, Suit::Hearts)));
        assert!(!is_safe_promotion(&layout, three_hearts));
        for suit in [Suit::Clubs, Suit::Spades] {
            layout.foundations[suit.index()].extend([
                PileCard::up(card(Rank::Ace, suit)),
                PileCard::up(card(Rank::Two, suit)),
            ]);
        }
        assert!(is_safe_promotion(&layout, three_hearts));
    }
}

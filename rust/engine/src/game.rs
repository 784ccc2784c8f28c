use std::sync::mpsc::Receiver;

use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use crate::cards::Card;
use crate::commands::Selection;
use crate::deck::{Deck, Seed};
use crate::deck_key::{self, DeckKeyError, DECK_KEY_SIZE};
use crate::encoding::{encode, CanonicalEncoding};
use crate::errors::GameError;
use crate::events::{EventBus, GameEvent};
use crate::fingerprint::{HandTag, PendingTag, TagStatus};
use crate::layout::Layout;
use crate::pile::{PileCard, PileId};
use crate::rules::{
    is_safe_promotion, validate_draw, validate_move, validate_recycle, MoveRequest, RuleProfile,
};
use crate::snapshot::Snapshot;

/// Lifecycle of a session. `Won` is terminal until the next deal.
#[derive(Debug, Copy, Clone, Eq, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum GameState {
    Dealing,
    Active,
    Won,
}

/// The immutable record of one shuffle and deal.
#[derive(Debug, Clone)]
pub struct Deal {
    seed: u32,
    order: Vec<Card>,
    initial: Layout,
    encoding: CanonicalEncoding,
}

impl Deal {
    pub fn from_seed(seed: u32) -> Self {
        let mut deck = Deck::new_with_seed(seed);
        deck.shuffle();
        let order = deck.order().to_vec();
        let initial = Layout::deal(&mut deck);
        let encoding = encode(&initial);
        Self {
            seed,
            order,
            initial,
            encoding,
        }
    }

    pub fn seed(&self) -> u32 {
        self.seed
    }

    /// The shuffled deck order the layout was dealt from.
    pub fn order(&self) -> &[Card] {
        &self.order
    }

    pub fn initial(&self) -> &Layout {
        &self.initial
    }

    pub fn encoding(&self) -> &CanonicalEncoding {
        &self.encoding
    }

    pub fn deck_key(&self) -> Result<[u8; DECK_KEY_SIZE], DeckKeyError> {
        deck_key::encode(&self.order)
    }
}

/// The identity exported for a deal once its tag has resolved.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DealIdentity {
    pub seed: u32,
    pub hand_tag: HandTag,
}

/// Result of an applied pile-to-pile move.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MoveOutcome {
    pub request: MoveRequest,
    /// Tableau card turned face-up by the move
    pub flipped: Option<Card>,
    pub moves: u32,
    pub won: bool,
}

/// The single authority over the live layout.
///
/// Every mutating method validates first and leaves the layout untouched
/// when it returns an error.
///
/// # Examples
///
/// ```
/// use klondike_engine::game::{Game, GameState};
/// use klondike_engine::rules::RuleProfile;
///
/// let mut game = Game::new(RuleProfile::default());
/// assert_eq!(game.state(), GameState::Dealing);
/// let seed = game.new_game(Some(42)).seed();
/// assert_eq!(seed, 42);
/// assert_eq!(game.state(), GameState::Active);
/// assert_eq!(game.layout().stock.len(), 24);
/// ```
#[derive(Debug)]
pub struct Game {
    profile: RuleProfile,
    state: GameState,
    layout: Layout,
    deal: Option<Deal>,
    moves: u32,
    passes_used: u32,
    tag: Option<PendingTag>,
    tag_announced: bool,
    pub(crate) selection: Option<Selection>,
    events: EventBus,
}

impl Game {
    pub fn new(profile: RuleProfile) -> Self {
        Self {
            profile,
            state: GameState::Dealing,
            layout: Layout::default(),
            deal: None,
            moves: 0,
            passes_used: 0,
            tag: None,
            tag_announced: false,
            selection: None,
            events: EventBus::new(),
        }
    }

    /// Resumes play from an arbitrary layout, e.g. one rebuilt by
    /// [`crate::encoding::decode`]. There is no seed; the hand tag is
    /// computed from `layout` itself.
    pub fn from_layout(profile: RuleProfile, layout: Layout) -> Result<Self, GameError> {
        layout.check_invariant().map_err(GameError::InvalidLayout)?;
        let mut game = Self::new(profile);
        game.tag = Some(PendingTag::spawn(encode(&layout).into_bytes()));
        game.layout = layout;
        game.state = if game.layout.is_won() {
            GameState::Won
        } else {
            GameState::Active
        };
        Ok(game)
    }

    pub fn profile(&self) -> &RuleProfile {
        &self.profile
    }

    /// Takes effect immediately; callers normally change it between deals.
    pub fn set_profile(&mut self, profile: RuleProfile) {
        self.profile = profile;
    }

    pub fn state(&self) -> GameState {
        self.state
    }

    pub fn layout(&self) -> &Layout {
        &self.layout
    }

    pub fn deal(&self) -> Option<&Deal> {
        self.deal.as_ref()
    }

    pub fn seed(&self) -> Option<u32> {
        self.deal.as_ref().map(Deal::seed)
    }

    pub fn moves(&self) -> u32 {
        self.moves
    }

    pub fn passes_used(&self) -> u32 {
        self.passes_used
    }

    pub fn passes_remaining(&self) -> Option<u32> {
        self.profile.passes_remaining(self.passes_used)
    }

    pub fn is_won(&self) -> bool {
        self.state == GameState::Won
    }

    pub fn selection(&self) -> Option<Selection> {
        self.selection
    }

    pub fn subscribe(&mut self) -> Receiver<GameEvent> {
        self.events.subscribe()
    }

    /// Discards the current layout and deals a fresh one. A random seed is
    /// drawn when none is given. Hashing of the new layout starts on a
    /// worker thread; [`Game::poll_tag`] reports `Pending` until it lands.
    pub fn new_game(&mut self, seed: Option<u32>) -> &Deal {
        self.state = GameState::Dealing;
        let seed = seed.unwrap_or_else(|| Seed::random().0);
        let deal = Deal::from_seed(seed);

        self.layout = deal.initial().clone();
        self.moves = 0;
        self.passes_used = 0;
        self.selection = None;
        self.tag = Some(PendingTag::spawn(deal.encoding().as_bytes().to_vec()));
        self.tag_announced = false;
        debug_assert_eq!(self.layout.check_invariant(), Ok(()));

        self.state = GameState::Active;
        info!(seed, draw = self.profile.draw, passes = %self.profile.passes, "deal started");
        self.events.publish(GameEvent::DealStarted {
            seed,
            draw: self.profile.draw,
        });
        self.deal.insert(deal)
    }

    fn ensure_active(&self) -> Result<(), GameError> {
        if self.state != GameState::Active {
            return Err(GameError::NotActive { state: self.state });
        }
        Ok(())
    }

    /// Validates and applies a pile-to-pile move, flipping a newly uncovered
    /// tableau card in the same step.
    pub fn request_move(&mut self, req: MoveRequest) -> Result<MoveOutcome, GameError> {
        self.ensure_active()?;
        validate_move(&self.layout, &self.profile, &req)?;

        let moving = self
            .layout
            .pile_mut(req.from)
            .ok_or_else(|| GameError::UnknownPile(req.from.to_string()))?
            .take_top(req.count);
        let mut flipped = None;
        if let Some(src) = self.layout.pile_mut(req.from) {
            if req.from.is_tableau() {
                flipped = src.flip_top();
            }
        }
        if let Some(dst) = self.layout.pile_mut(req.to) {
            dst.extend(moving.into_iter().map(|pc| PileCard::up(pc.card)));
        }
        self.moves += 1;
        self.selection = None;
        debug_assert_eq!(self.layout.check_invariant(), Ok(()));

        debug!(from = %req.from, to = %req.to, count = req.count, moves = self.moves, "move applied");
        self.events.publish(GameEvent::MoveApplied {
            from: req.from,
            to: req.to,
            count: req.count,
            flipped,
            moves: self.moves,
        });
        let won = self.check_won();
        Ok(MoveOutcome {
            request: req,
            flipped,
            moves: self.moves,
            won,
        })
    }

    fn check_won(&mut self) -> bool {
        if !self.layout.is_won() {
            return false;
        }
        self.state = GameState::Won;
        let seed = self.seed().unwrap_or_default();
        info!(seed, moves = self.moves, passes_used = self.passes_used, "game won");
        self.events.publish(GameEvent::Won {
            seed,
            moves: self.moves,
            passes_used: self.passes_used,
        });
        true
    }

    /// Draws a batch from the stock onto the waste. When the stock is empty
    /// this recycles the waste instead. Returns the number of cards moved.
    pub fn draw_from_stock(&mut self) -> Result<usize, GameError> {
        self.ensure_active()?;
        if self.layout.stock.is_empty() {
            return self.recycle_stock();
        }
        let n = validate_draw(&self.layout, &self.profile)?;
        for _ in 0..n {
            if let Some(pc) = self.layout.stock.pop() {
                self.layout.waste.push(PileCard::up(pc.card));
            }
        }
        self.moves += 1;
        self.selection = None;
        debug_assert_eq!(self.layout.check_invariant(), Ok(()));

        debug!(count = n, stock = self.layout.stock.len(), "stock drawn");
        self.events.publish(GameEvent::StockDrawn {
            count: n,
            moves: self.moves,
        });
        Ok(n)
    }

    /// Turns the whole waste back into the stock so it is drawn again in the
    /// original order. Consumes one pass.
    pub fn recycle_stock(&mut self) -> Result<usize, GameError> {
        self.ensure_active()?;
        let n = validate_recycle(&self.layout, &self.profile, self.passes_used)?;
        let mut cards = self.layout.waste.clear();
        cards.reverse();
        self.layout
            .stock
            .extend(cards.into_iter().map(|pc| PileCard::down(pc.card)));
        self.passes_used += 1;
        self.moves += 1;
        self.selection = None;
        debug_assert_eq!(self.layout.check_invariant(), Ok(()));

        debug!(count = n, passes_used = self.passes_used, "stock recycled");
        self.events.publish(GameEvent::StockRecycled {
            count: n,
            passes_used: self.passes_used,
            moves: self.moves,
        });
        Ok(n)
    }

    /// Where `card` could be promoted from, if it is playable at all.
    fn promotion_source(&self, card: Card) -> Result<PileId, GameError> {
        let (pile, _) = self
            .layout
            .locate(card)
            .ok_or_else(|| GameError::NotOnTop(card.to_string()))?;
        let on_top = self
            .layout
            .pile(pile)
            .and_then(|p| p.top())
            .is_some_and(|top| top.card == card && top.face_up);
        let playable = matches!(pile, PileId::Waste | PileId::Tableau(_));
        if !on_top || !playable {
            return Err(GameError::NotOnTop(card.to_string()));
        }
        Ok(pile)
    }

    /// Moves `card` to its foundation when it is the top of the waste or of
    /// a tableau pile and the foundation accepts it.
    pub fn auto_promote(&mut self, card: Card) -> Result<MoveOutcome, GameError> {
        self.ensure_active()?;
        let from = self.promotion_source(card)?;
        if self.profile.autoplay_safe_only && !is_safe_promotion(&self.layout, card) {
            return Err(GameError::illegal(format!(
                "{} is not safe to promote yet",
                card
            )));
        }
        self.request_move(MoveRequest::single(from, PileId::Foundation(card.suit)))
    }

    /// Promotes eligible tops until none remain. Returns the number promoted.
    pub fn auto_promote_all(&mut self) -> usize {
        let mut promoted = 0;
        while self.state == GameState::Active {
            let next = self.promotable_tops().into_iter().next();
            let Some(card) = next else {
                break;
            };
            if self.auto_promote(card).is_err() {
                break;
            }
            promoted += 1;
        }
        promoted
    }

    /// Waste and tableau tops that [`Game::auto_promote`] would accept now.
    pub fn promotable_tops(&self) -> Vec<Card> {
        let sources = std::iter::once(PileId::Waste)
            .chain((0..crate::pile::TABLEAU_PILES as u8).map(PileId::Tableau));
        sources
            .filter_map(|id| self.layout.pile(id).and_then(|p| p.top()))
            .filter(|top| top.face_up)
            .map(|top| top.card)
            .filter(|&card| {
                crate::rules::can_stack_foundation(self.layout.foundation(card.suit), card)
                    && (!self.profile.autoplay_safe_only || is_safe_promotion(&self.layout, card))
            })
            .collect()
    }

    /// Non-blocking check on the hand tag of the current deal.
    pub fn poll_tag(&mut self) -> TagStatus {
        let status = match self.tag.as_mut() {
            Some(pending) => pending.poll(),
            None => TagStatus::Pending,
        };
        self.announce(&status);
        status
    }

    /// Blocks until the hand tag of the current deal is available.
    pub fn wait_tag(&mut self) -> Option<HandTag> {
        let tag = self.tag.as_mut().map(PendingTag::wait)?;
        self.announce(&TagStatus::Resolved(tag.clone()));
        Some(tag)
    }

    fn announce(&mut self, status: &TagStatus) {
        if self.tag_announced {
            return;
        }
        if let TagStatus::Resolved(tag) = status {
            self.tag_announced = true;
            self.events.publish(GameEvent::TagResolved {
                seed: self.seed(),
                tag: tag.clone(),
            });
        }
    }

    /// Seed plus hand tag, once the tag has resolved.
    pub fn identity(&mut self) -> Option<DealIdentity> {
        let seed = self.seed()?;
        let hand_tag = self.poll_tag().tag()?.clone();
        Some(DealIdentity { seed, hand_tag })
    }

    pub fn snapshot(&mut self) -> Snapshot {
        let tag = self.poll_tag();
        Snapshot::capture(self, tag)
    }
}

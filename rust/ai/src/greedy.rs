//! Rule-based baseline player.
//!
//! Each turn it takes the first available option in this order:
//!
//! 1. waste top to its foundation
//! 2. a tableau top to its foundation
//! 3. waste top onto the tableau, preferring piles with hidden cards, then
//!    empty piles, then any other
//! 4. a whole face-up run onto another tableau pile, only when that
//!    uncovers a hidden card (Kings go to empty piles on the same terms)
//! 5. draw, then recycle
//!
//! It gives up when a full pass through the stock produced no other move.
//! There is no lookahead, so it wins only a modest share of deals.

use klondike_engine::commands::Command;
use klondike_engine::game::Game;
use klondike_engine::layout::Layout;
use klondike_engine::pile::{PileId, TABLEAU_PILES};
use klondike_engine::rules::{validate_move, validate_recycle, MoveRequest, RuleProfile};

use crate::Player;

#[derive(Debug, Clone, Default)]
pub struct GreedyPlayer {
    recycled: bool,
    progress_since_recycle: bool,
}

impl GreedyPlayer {
    pub fn new() -> Self {
        Self::default()
    }

    /// The best non-stock move for `layout`, if any.
    pub fn choose_move(&self, layout: &Layout, profile: &RuleProfile) -> Option<MoveRequest> {
        let legal = |from: PileId, count: usize, to: PileId| {
            let req = MoveRequest::new(from, count, to);
            validate_move(layout, profile, &req).ok().map(|_| req)
        };

        if let Some(top) = layout.waste.top() {
            if let Some(req) = legal(PileId::Waste, 1, PileId::Foundation(top.card.suit)) {
                return Some(req);
            }
        }

        for i in 0..TABLEAU_PILES as u8 {
            let Some(top) = layout.tableau[i as usize].top() else {
                continue;
            };
            if let Some(req) = legal(PileId::Tableau(i), 1, PileId::Foundation(top.card.suit)) {
                return Some(req);
            }
        }

        if !layout.waste.is_empty() {
            let best = (0..TABLEAU_PILES as u8)
                .filter_map(|i| legal(PileId::Waste, 1, PileId::Tableau(i)))
                .max_by_key(|req| {
                    let dest = layout.pile(req.to).map(|p| (p.len(), p.face_up_run()));
                    match dest {
                        Some((len, run)) if len > run => 3,
                        Some((0, _)) => 2,
                        _ => 1,
                    }
                });
            if best.is_some() {
                return best;
            }
        }

        for src in 0..TABLEAU_PILES as u8 {
            let pile = &layout.tableau[src as usize];
            let run = pile.face_up_run();
            if run == 0 {
                continue;
            }
            let has_hidden = pile.len() > run;
            if !has_hidden {
                continue;
            }
            for dst in 0..TABLEAU_PILES as u8 {
                if dst == src {
                    continue;
                }
                if let Some(req) = legal(PileId::Tableau(src), run, PileId::Tableau(dst)) {
                    return Some(req);
                }
            }
        }
        None
    }
}

impl Player for GreedyPlayer {
    fn next_command(&mut self, game: &Game) -> Option<Command> {
        let layout = game.layout();
        if let Some(req) = self.choose_move(layout, game.profile()) {
            self.progress_since_recycle = true;
            return Some(req.into());
        }
        if !layout.stock.is_empty() {
            return Some(Command::DrawFromStock);
        }
        validate_recycle(layout, game.profile(), game.passes_used()).ok()?;
        if self.recycled && !self.progress_since_recycle {
            return None;
        }
        self.recycled = true;
        self.progress_since_recycle = false;
        Some(Command::RecycleStock)
    }

    fn name(&self) -> &str {
        "GreedyPlayer"
    }

    fn reset(&mut self) {
        *self = Self::default();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use klondike_engine::cards::{Card, Rank, Suit};
    use klondike_engine::pile::PileCard;

    fn up(rank: Rank, suit: Suit) -> PileCard {
        PileCard::up(Card::new(rank, suit))
    }

    #[test]
    fn prefers_foundation_over_tableau() {
        let mut layout = Layout::default();
        layout.waste.push(up(Rank::Ace, Suit::Hearts));
        layout.tableau[0].push(up(Rank::Two, Suit::Spades));
        let req = GreedyPlayer::new()
            .choose_move(&layout, &RuleProfile::default())
            .unwrap();
        assert_eq!(req.to, PileId::Foundation(Suit::Hearts));
    }

    #[test]
    fn waste_prefers_pile_with_hidden_cards() {
        let mut layout = Layout::default();
        layout.waste.push(up(Rank::Eight, Suit::Hearts));
        layout.tableau[1].push(up(Rank::Nine, Suit::Clubs));
        layout.tableau[4].push(PileCard::down(Card::new(Rank::Two, Suit::Diamonds)));
        layout.tableau[4].push(up(Rank::Nine, Suit::Spades));
        let req = GreedyPlayer::new()
            .choose_move(&layout, &RuleProfile::default())
            .unwrap();
        assert_eq!(req.to, PileId::Tableau(4));
    }

    #[test]
    fn runs_move_only_to_uncover_cards() {
        let mut layout = Layout::default();
        layout.tableau[0].push(up(Rank::Eight, Suit::Hearts));
        layout.tableau[1].push(up(Rank::Nine, Suit::Clubs));
        let player = GreedyPlayer::new();
        assert_eq!(player.choose_move(&layout, &RuleProfile::default()), None);

        let mut layout = Layout::default();
        layout.tableau[0].push(PileCard::down(Card::new(Rank::Two, Suit::Diamonds)));
        layout.tableau[0].push(up(Rank::Eight, Suit::Hearts));
        layout.tableau[1].push(up(Rank::Nine, Suit::Clubs));
        assert_eq!(
            player.choose_move(&layout, &RuleProfile::default()),
            Some(MoveRequest::single(PileId::Tableau(0), PileId::Tableau(1)))
        );
    }

    #[test]
    fn kings_leave_only_piles_with_hidden_cards() {
        let mut layout = Layout::default();
        layout.tableau[0].push(up(Rank::King, Suit::Hearts));
        let player = GreedyPlayer::new();
        assert_eq!(player.choose_move(&layout, &RuleProfile::default()), None);
    }
}

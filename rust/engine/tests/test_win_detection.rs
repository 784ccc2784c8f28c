use klondike_engine::cards::{all_ranks, all_suits, Card, Rank, Suit};
use klondike_engine::errors::GameError;
use klondike_engine::events::GameEvent;
use klondike_engine::game::{Game, GameState};
use klondike_engine::layout::Layout;
use klondike_engine::pile::{PileCard, PileId};
use klondike_engine::rules::{MoveRequest, RuleProfile};

/// Every card on its foundation except the King of hearts, which waits on t1.
fn one_move_from_won() -> Layout {
    let mut layout = Layout::default();
    for suit in all_suits() {
        for rank in all_ranks() {
            let card = Card::new(rank, suit);
            if suit == Suit::Hearts && rank == Rank::King {
                layout.tableau[0].push(PileCard::up(card));
            } else {
                layout.foundations[suit.index()].push(PileCard::up(card));
            }
        }
    }
    layout
}

#[test]
fn final_promotion_wins() {
    let mut game = Game::from_layout(RuleProfile::default(), one_move_from_won()).unwrap();
    let events = game.subscribe();
    assert_eq!(game.state(), GameState::Active);

    let outcome = game
        .auto_promote(Card::new(Rank::King, Suit::Hearts))
        .expect("king goes home");
    assert!(outcome.won);
    assert_eq!(game.state(), GameState::Won);
    assert!(game.layout().is_won());

    let names: Vec<&str> = events.try_iter().map(|e| e.name()).collect();
    assert_eq!(names, vec!["move_applied", "won"]);
}

#[test]
fn won_game_rejects_further_commands() {
    let mut game = Game::from_layout(RuleProfile::friendly(), one_move_from_won()).unwrap();
    game.request_move(MoveRequest::single(
        PileId::Tableau(0),
        PileId::Foundation(Suit::Hearts),
    ))
    .unwrap();

    let takeback = MoveRequest::single(PileId::Foundation(Suit::Hearts), PileId::Tableau(0));
    assert_eq!(
        game.request_move(takeback),
        Err(GameError::NotActive {
            state: GameState::Won
        })
    );
    assert!(game.draw_from_stock().is_err());
    assert_eq!(game.auto_promote_all(), 0);
}

#[test]
fn new_deal_leaves_won_state() {
    let mut game = Game::from_layout(RuleProfile::default(), one_move_from_won()).unwrap();
    game.auto_promote_all();
    assert!(game.is_won());
    game.new_game(Some(1));
    assert_eq!(game.state(), GameState::Active);
    assert_eq!(game.moves(), 0);
}

#[test]
fn broken_layouts_are_refused() {
    let mut layout = one_move_from_won();
    layout.tableau[0].pop();
    assert!(matches!(
        Game::from_layout(RuleProfile::default(), layout),
        Err(GameError::InvalidLayout(_))
    ));
}

#[test]
fn won_event_carries_totals() {
    let mut game = Game::from_layout(RuleProfile::default(), one_move_from_won()).unwrap();
    let events = game.subscribe();
    game.auto_promote_all();
    let won = events
        .try_iter()
        .find(|e| matches!(e, GameEvent::Won { .. }));
    assert!(matches!(won, Some(GameEvent::Won { moves: 1, .. })));
}

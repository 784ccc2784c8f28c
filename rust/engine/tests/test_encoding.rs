use std::collections::HashSet;

use klondike_engine::encoding::{decode, encode};
use klondike_engine::events::GameEvent;
use klondike_engine::fingerprint::{fingerprint, TagStatus};
use klondike_engine::game::{Deal, Game};
use klondike_engine::rules::RuleProfile;

#[test]
fn distinct_seeds_give_distinct_encodings() {
    let encodings: HashSet<Vec<u8>> = (0..300u32)
        .map(|s| Deal::from_seed(s).encoding().as_bytes().to_vec())
        .collect();
    assert_eq!(encodings.len(), 300);
}

#[test]
fn mid_game_layouts_decode_exactly() {
    let mut game = Game::new(RuleProfile::classic());
    game.new_game(Some(64));
    for _ in 0..5 {
        game.draw_from_stock().unwrap();
        game.auto_promote_all();
        let enc = encode(game.layout());
        assert_eq!(&decode(enc.as_bytes()).unwrap(), game.layout());
        assert_eq!(enc, encode(game.layout()));
    }
}

#[test]
fn hand_tag_is_stable_for_a_redealt_seed() {
    let mut game = Game::new(RuleProfile::classic());
    game.new_game(Some(1_000_003));
    let first = game.wait_tag().unwrap();
    game.draw_from_stock().unwrap();
    game.new_game(Some(1_000_003));
    let second = game.wait_tag().unwrap();
    assert_eq!(first, second);

    let direct = fingerprint(Deal::from_seed(1_000_003).encoding().as_bytes());
    assert_eq!(first, direct);
}

#[test]
fn tag_describes_the_initial_layout_not_the_current_one() {
    let mut game = Game::new(RuleProfile::classic());
    game.new_game(Some(55));
    game.draw_from_stock().unwrap();
    let tag = game.wait_tag().unwrap();
    assert_ne!(tag, fingerprint(encode(game.layout()).as_bytes()));
}

#[test]
fn poll_eventually_resolves() {
    let mut game = Game::new(RuleProfile::classic());
    game.new_game(Some(9));
    let events = game.subscribe();
    let expected = game.wait_tag().unwrap();
    assert_eq!(game.poll_tag(), TagStatus::Resolved(expected));
    let announced = events.try_iter().filter(|e| e.name() == "tag_resolved").count();
    assert_eq!(announced, 1, "tag is announced exactly once");
}

#[test]
fn resumed_layout_announces_its_tag_without_seed() {
    let mut source = Game::new(RuleProfile::classic());
    source.new_game(Some(21));
    source.draw_from_stock().unwrap();
    let layout = decode(encode(source.layout()).as_bytes()).unwrap();

    let mut game = Game::from_layout(RuleProfile::classic(), layout).unwrap();
    let events = game.subscribe();
    let expected = game.wait_tag().unwrap();
    assert_eq!(game.poll_tag(), TagStatus::Resolved(expected.clone()));

    let announced: Vec<GameEvent> = events
        .try_iter()
        .filter(|e| e.name() == "tag_resolved")
        .collect();
    assert_eq!(
        announced,
        vec![GameEvent::TagResolved {
            seed: None,
            tag: expected,
        }]
    );
}

#[test]
fn text_form_mentions_every_card() {
    let deal = Deal::from_seed(77);
    let text = deal.encoding().to_text();
    for card in deal.order() {
        assert!(text.contains(&card.to_string()), "{} missing", card);
    }
}

//! `deal`: deal one layout and print everything that identifies it.
//!
//! Output is line oriented so scripts can pick fields by prefix:
//!
//! ```text
//! seed: 42
//! rules: draw 3, passes unlimited
//! stock: 24  waste(0): []
//! ...
//! canonical: t1:Kh+ | t2:3c-,9d+ | ...
//! deck_key: 0f3a...
//! tag: 5be1...
//! tag_algorithm: sha256
//! ```

use crate::error::CliError;
use crate::formatters::format_layout;
use klondike_engine::deck_key;
use klondike_engine::fingerprint::fingerprint;
use klondike_engine::game::Deal;
use klondike_engine::rules::RuleProfile;
use std::io::Write;

pub fn handle_deal_command(
    seed: Option<u32>,
    draw: Option<u8>,
    out: &mut dyn Write,
) -> Result<(), CliError> {
    let seed = seed.unwrap_or_else(rand::random);
    let profile = match draw {
        Some(d) => RuleProfile::classic().with_draw(d)?,
        None => RuleProfile::classic(),
    };
    let deal = Deal::from_seed(seed);
    let key = deal
        .deck_key()
        .map_err(|e| CliError::Engine(e.to_string()))?;
    let tag = fingerprint(deal.encoding().as_bytes());

    writeln!(out, "seed: {}", deal.seed())?;
    writeln!(out, "rules: draw {}, passes {}", profile.draw, profile.passes)?;
    writeln!(out, "{}", format_layout(deal.initial(), &profile))?;
    writeln!(out, "canonical: {}", deal.encoding().to_text())?;
    writeln!(out, "deck_key: {}", deck_key::to_hex(&key))?;
    writeln!(out, "tag: {}", tag)?;
    writeln!(out, "tag_algorithm: {}", tag.algorithm().name())?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn field<'a>(text: &'a str, prefix: &str) -> Option<&'a str> {
        text.lines().find_map(|l| l.strip_prefix(prefix))
    }

    #[test]
    fn same_seed_same_output() {
        let mut a = Vec::new();
        let mut b = Vec::new();
        handle_deal_command(Some(12345), None, &mut a).unwrap();
        handle_deal_command(Some(12345), None, &mut b).unwrap();
        assert_eq!(a, b);
    }

    #[test]
    fn deck_key_decodes_to_the_dealt_order() {
        let mut out = Vec::new();
        handle_deal_command(Some(99), None, &mut out).unwrap();
        let text = String::from_utf8(out).unwrap();
        let key = field(&text, "deck_key: ").unwrap();
        let order = deck_key::from_hex(key).unwrap();
        assert_eq!(order, Deal::from_seed(99).order());
        assert_eq!(field(&text, "seed: "), Some("99"));
    }

    #[test]
    fn invalid_draw_is_rejected() {
        let mut out = Vec::new();
        let res = handle_deal_command(Some(1), Some(0), &mut out);
        assert!(matches!(res, Err(CliError::InvalidInput(_))));
    }
}

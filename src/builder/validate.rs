use std::collections::HashSet;

use crate::builder::categorize::CategorizedPool;
use crate::models::card::{Card, ColorSet, Legality};
use crate::models::deck::{SkipReason, SkipRecord};
use crate::opt::*;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Validation {
    Admit,
    Reject(SkipReason),
}

impl Validation {
    pub fn is_admit(&self) -> bool {
        matches!(self, Validation::Admit)
    }
}

/// Color rule shared by every selection step: a basic land fits when its
/// color is allowed, anything else when its identity is a subset.
pub fn fits_colors(card: &Card, allowed: &ColorSet) -> bool {
    match card.basic_land_color() {
        Some(color) => allowed.contains(color),
        None => card.color_identity().is_subset(allowed),
    }
}

/// Format legality and color identity check. A card without legality data
/// is treated as illegal everywhere.
pub fn is_valid_card_for_deck(card: &Card, allowed: &ColorSet, format: &str) -> Validation {
    match card.legality(format) {
        Legality::Legal => {}
        Legality::Unknown => {
            return Validation::Reject(SkipReason::MissingLegality {
                format: format.to_string(),
            })
        }
        Legality::NotLegal => {
            return Validation::Reject(SkipReason::NotLegal {
                format: format.to_string(),
            })
        }
    }

    if fits_colors(card, allowed) {
        return Validation::Admit;
    }

    match card.basic_land_color() {
        Some(color) => Validation::Reject(SkipReason::OffColorBasic {
            color,
            allowed: *allowed,
        }),
        None => Validation::Reject(SkipReason::ColorIdentity {
            card: *card.color_identity(),
            allowed: *allowed,
        }),
    }
}

/// Splits a pool into the cards valid for the deck and the skip records of
/// everything else.
pub fn filter_pool(
    pool: &CategorizedPool,
    allowed: &ColorSet,
    format: &str,
) -> (CategorizedPool, Vec<SkipRecord>) {
    let mut valid = CategorizedPool::default();
    let mut skipped = Vec::new();

    for card in pool.all_cards() {
        match is_valid_card_for_deck(card, allowed, format) {
            Validation::Admit => valid.push(card.clone()),
            Validation::Reject(reason) => {
                log_if(
                    &format!("Skipping {}: {}", card.name(), reason),
                    DbgFlg::Build,
                );
                skipped.push(SkipRecord {
                    name: card.name().to_string(),
                    reason,
                });
            }
        }
    }

    (valid, skipped)
}

/// The append-only selection of one build. Owns the singleton rule and the
/// size limit; nothing else decides either.
#[derive(Debug, Clone)]
pub struct DeckList<'a> {
    limit: usize,
    cards: Vec<&'a Card>,
    names: HashSet<String>,
}

impl<'a> DeckList<'a> {
    pub fn new(limit: usize) -> Self {
        DeckList {
            limit,
            cards: Vec::with_capacity(limit),
            names: HashSet::new(),
        }
    }

    pub fn limit(&self) -> usize {
        self.limit
    }

    pub fn len(&self) -> usize {
        self.cards.len()
    }

    pub fn is_empty(&self) -> bool {
        self.cards.is_empty()
    }

    pub fn is_full(&self) -> bool {
        self.cards.len() >= self.limit
    }

    pub fn remaining(&self) -> usize {
        self.limit.saturating_sub(self.cards.len())
    }

    /// Basic lands are exempt; any other card is rejected when a card with
    /// the same front-face name is already selected.
    pub fn is_singleton_legal(&self, card: &Card) -> bool {
        card.is_basic_land() || !self.names.contains(&card.front_face_name())
    }

    /// Marks a card kept outside the list, such as a leader, as taken so no
    /// copy of it can be added. Does not count toward the size limit.
    pub fn exclude(&mut self, card: &Card) {
        if !card.is_basic_land() {
            self.names.insert(card.front_face_name());
        }
    }

    pub fn admits(&self, card: &Card) -> bool {
        !self.is_full() && self.is_singleton_legal(card)
    }

    pub fn push(&mut self, card: &'a Card) -> bool {
        if !self.admits(card) {
            return false;
        }
        self.names.insert(card.front_face_name());
        self.cards.push(card);
        true
    }

    pub fn cards(&self) -> &[&'a Card] {
        &self.cards
    }

    pub fn iter(&self) -> impl Iterator<Item = &'a Card> + '_ {
        self.cards.iter().copied()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::builder::categorize::categorize_cards;
    use crate::builder::fixtures::*;
    use crate::models::card::Color;

    #[test]
    fn test_missing_legality_fails_closed() {
        let card = Card::new("Mystery", "Artifact", "");
        assert_eq!(
            is_valid_card_for_deck(&card, &ColorSet::all(), "commander"),
            Validation::Reject(SkipReason::MissingLegality {
                format: "commander".to_string()
            })
        );

        let banned = Card::new("Banned", "Artifact", "").with_legality("commander", "banned");
        assert!(!is_valid_card_for_deck(&banned, &ColorSet::all(), "commander").is_admit());
    }

    #[test]
    fn test_color_identity_subset() {
        let allowed = ColorSet::parse_symbols("WU");
        let ok = creature("Azorius Guy", "WU", 2.0, "");
        let bad = creature("Esper Guy", "WUB", 3.0, "");
        assert!(is_valid_card_for_deck(&ok, &allowed, "commander").is_admit());
        assert_eq!(
            is_valid_card_for_deck(&bad, &allowed, "commander"),
            Validation::Reject(SkipReason::ColorIdentity {
                card: ColorSet::parse_symbols("WUB"),
                allowed,
            })
        );
    }

    #[test]
    fn test_basic_land_color_rule() {
        let allowed = ColorSet::parse_symbols("W");
        assert!(fits_colors(&basic(Color::White), &allowed));
        assert!(!fits_colors(&basic(Color::Blue), &allowed));
        assert_eq!(
            is_valid_card_for_deck(&basic(Color::Blue), &allowed, "commander"),
            Validation::Reject(SkipReason::OffColorBasic {
                color: Color::Blue,
                allowed
            })
        );
    }

    #[test]
    fn test_filter_pool_collects_skips() {
        let pool = categorize_cards(vec![
            creature("Keep", "G", 2.0, ""),
            creature("Drop", "R", 2.0, ""),
            Card::new("No Data", "Instant", ""),
        ]);
        let (valid, skipped) = filter_pool(&pool, &ColorSet::parse_symbols("G"), "commander");
        assert_eq!(valid.len(), 1);
        assert_eq!(
            skipped.iter().map(|s| s.name.as_str()).collect::<Vec<_>>(),
            vec!["Drop", "No Data"]
        );
    }

    #[test]
    fn test_singleton_uses_front_face() {
        let front = spell("Bala Ged Recovery // Bala Ged Sanctuary", "Sorcery // Land", "G", 3.0, "");
        let again = spell("Bala Ged Recovery", "Sorcery", "G", 3.0, "");
        let forest = basic(Color::Green);

        let mut deck = DeckList::new(10);
        assert!(deck.push(&front));
        assert!(!deck.is_singleton_legal(&again));
        assert!(!deck.push(&again));
        assert!(deck.push(&forest));
        assert!(deck.push(&forest));
        assert_eq!(deck.len(), 3);
    }

    #[test]
    fn test_excluded_card_cannot_be_added() {
        let leader = legend("Forest Warden", "G", "");
        let copy = leader.clone();
        let bear = creature("Bear", "G", 2.0, "");

        let mut deck = DeckList::new(2);
        deck.exclude(&leader);
        assert!(!deck.push(&copy));
        assert!(deck.is_empty());
        assert_eq!(deck.remaining(), 2);
        assert!(deck.push(&bear));
    }

    #[test]
    fn test_size_limit() {
        let cards = creatures("Bear", "G", 3);
        let mut deck = DeckList::new(2);
        assert!(deck.push(&cards[0]));
        assert!(deck.push(&cards[1]));
        assert!(deck.is_full());
        assert!(!deck.push(&cards[2]));
        assert_eq!(deck.remaining(), 0);
    }
}

use std::collections::BTreeMap;

use serde::Serialize;
use strum::IntoEnumIterator;
use strum_macros::{Display, EnumIter};

use crate::models::card::Card;

/// Functional buckets a pool is partitioned into. A card lands in the first
/// bucket whose keyword its front-face type line contains, in declaration order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Display, EnumIter, Serialize)]
#[strum(serialize_all = "lowercase")]
pub enum Bucket {
    Lands,
    Creatures,
    Instants,
    Sorceries,
    Artifacts,
    Planeswalkers,
    Enchantments,
    Others,
}

impl Bucket {
    pub fn for_card(card: &Card) -> Bucket {
        let types = card.front_types();
        Bucket::iter()
            .find(|bucket| bucket.type_keyword().is_some_and(|kw| types.contains(kw)))
            .unwrap_or(Bucket::Others)
    }

    fn type_keyword(&self) -> Option<&'static str> {
        match self {
            Bucket::Lands => Some("land"),
            Bucket::Creatures => Some("creature"),
            Bucket::Instants => Some("instant"),
            Bucket::Sorceries => Some("sorcery"),
            Bucket::Artifacts => Some("artifact"),
            Bucket::Planeswalkers => Some("planeswalker"),
            Bucket::Enchantments => Some("enchantment"),
            Bucket::Others => None,
        }
    }

    /// Buckets pooled together for the residual spell slots.
    pub fn is_spell(&self) -> bool {
        !matches!(self, Bucket::Lands | Bucket::Creatures)
    }
}

#[derive(Debug, Clone, Default, Serialize)]
pub struct CategorizedPool {
    buckets: BTreeMap<Bucket, Vec<Card>>,
}

impl CategorizedPool {
    pub fn get(&self, bucket: Bucket) -> &[Card] {
        self.buckets.get(&bucket).map(Vec::as_slice).unwrap_or_default()
    }

    pub fn push(&mut self, card: Card) {
        self.buckets.entry(Bucket::for_card(&card)).or_default().push(card);
    }

    pub fn iter(&self) -> impl Iterator<Item = (Bucket, &[Card])> {
        Bucket::iter().map(move |bucket| (bucket, self.get(bucket)))
    }

    /// Every card, bucket by bucket, in insertion order within a bucket.
    pub fn all_cards(&self) -> impl Iterator<Item = &Card> {
        self.buckets.values().flatten()
    }

    pub fn spells(&self) -> impl Iterator<Item = &Card> {
        self.buckets
            .iter()
            .filter(|(bucket, _)| bucket.is_spell())
            .flat_map(|(_, cards)| cards.iter())
    }

    pub fn len(&self) -> usize {
        self.buckets.values().map(Vec::len).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn counts(&self) -> BTreeMap<String, usize> {
        self.iter()
            .map(|(bucket, cards)| (bucket.to_string(), cards.len()))
            .collect()
    }
}

pub fn categorize_cards<I: IntoIterator<Item = Card>>(cards: I) -> CategorizedPool {
    let mut pool = CategorizedPool::default();
    for card in cards {
        pool.push(card);
    }
    pool
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_categorize_cards() {
        let cards = vec![
            Card::new("Dryad Arbor", "Land Creature — Forest Dryad", ""),
            Card::new("Llanowar Elves", "Creature — Elf Druid", "{T}: Add {G}."),
            Card::new("Counterspell", "Instant", "Counter target spell."),
            Card::new("Sol Ring", "Artifact", "{T}: Add {C}{C}."),
            Card::new("Steel Overseer", "Artifact Creature — Construct", ""),
            Card::new("Tarmogoyf // Goyf Land", "Creature — Lhurgoyf // Land", ""),
            Card::new("Invasion of Zendikar", "Battle — Siege", ""),
            Card::new("Oath of Gideon", "Legendary Enchantment", ""),
        ];
        let pool = categorize_cards(cards);

        let names = |bucket| {
            pool.get(bucket)
                .iter()
                .map(|c| c.name().to_string())
                .collect::<Vec<_>>()
        };
        assert_eq!(names(Bucket::Lands), vec!["Dryad Arbor"]);
        assert_eq!(
            names(Bucket::Creatures),
            vec!["Llanowar Elves", "Steel Overseer", "Tarmogoyf // Goyf Land"]
        );
        assert_eq!(names(Bucket::Instants), vec!["Counterspell"]);
        assert_eq!(names(Bucket::Artifacts), vec!["Sol Ring"]);
        assert_eq!(names(Bucket::Others), vec!["Invasion of Zendikar"]);
        assert_eq!(names(Bucket::Enchantments), vec!["Oath of Gideon"]);
        assert!(pool.get(Bucket::Sorceries).is_empty());
        assert_eq!(pool.len(), 8);
        assert_eq!(pool.spells().count(), 4);
    }

    #[test]
    fn test_bucket_names() {
        assert_eq!(Bucket::Planeswalkers.to_string(), "planeswalkers");
        let counts = categorize_cards(Vec::new()).counts();
        assert_eq!(counts.len(), 8);
        assert!(counts.values().all(|n| *n == 0));
    }
}

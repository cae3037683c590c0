use std::collections::HashMap;

use crate::app::card_loader::ListEntry;
use crate::models::card::{Card, FACE_SEPARATOR};
use crate::opt::*;

pub const SIMILARITY_THRESHOLD: f64 = 0.92;

fn front_face(name: &str) -> String {
    name.split(FACE_SEPARATOR)
        .next()
        .unwrap_or_default()
        .trim()
        .to_lowercase()
}

/// Looks a name up exactly, then by front face, then by Jaro-Winkler
/// similarity. Among equally similar names the alphabetically first wins.
pub fn resolve_name<'a>(name: &str, cards: &'a HashMap<String, Card>) -> Option<&'a Card> {
    let key = name.trim().to_lowercase();
    if let Some(card) = cards.get(&key) {
        return Some(card);
    }

    let front = front_face(&key);
    let by_front = cards
        .iter()
        .filter(|(_, card)| card.front_face_name() == front)
        .min_by(|a, b| a.0.cmp(b.0));
    if let Some((_, card)) = by_front {
        return Some(card);
    }

    let mut best: Option<(f64, &String, &Card)> = None;
    for (candidate, card) in cards {
        let similarity = strsim::jaro_winkler(&key, candidate);
        if similarity < SIMILARITY_THRESHOLD {
            continue;
        }
        let better = match best {
            None => true,
            Some((top, top_name, _)) => {
                similarity > top || (similarity == top && candidate < top_name)
            }
        };
        if better {
            best = Some((similarity, candidate, card));
        }
    }

    best.map(|(similarity, candidate, card)| {
        log_if(
            &format!("Resolved '{}' to '{}' ({:.3})", name, candidate, similarity),
            DbgFlg::Loader,
        );
        card
    })
}

/// Expands list entries into a card pool. Returns the pool and the names
/// that could not be resolved.
pub fn resolve_list(entries: &[ListEntry], cards: &HashMap<String, Card>) -> (Vec<Card>, Vec<String>) {
    let mut pool = Vec::new();
    let mut unresolved = Vec::new();

    for entry in entries {
        match resolve_name(&entry.name, cards) {
            Some(card) => pool.extend(std::iter::repeat(card).take(entry.count).cloned()),
            None => unresolved.push(entry.name.clone()),
        }
    }

    (pool, unresolved)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn db() -> HashMap<String, Card> {
        [
            Card::new("Lightning Bolt", "Instant", "Lightning Bolt deals 3 damage to any target."),
            Card::new("Delver of Secrets // Insectile Aberration", "Creature — Human Wizard // Creature — Human Insect", ""),
            Card::new("Forest", "Basic Land — Forest", ""),
        ]
        .into_iter()
        .map(|card| (card.name().to_lowercase(), card))
        .collect()
    }

    #[test]
    fn test_resolve_exact_and_front_face() {
        let cards = db();
        assert_eq!(resolve_name("lightning bolt", &cards).map(Card::name), Some("Lightning Bolt"));
        assert_eq!(
            resolve_name("Delver of Secrets", &cards).map(Card::name),
            Some("Delver of Secrets // Insectile Aberration")
        );
    }

    #[test]
    fn test_resolve_fuzzy() {
        let cards = db();
        assert_eq!(resolve_name("Lightning Blot", &cards).map(Card::name), Some("Lightning Bolt"));
        assert_eq!(resolve_name("Counterspell", &cards), None);
    }

    #[test]
    fn test_resolve_list() {
        let cards = db();
        let entries = vec![
            ListEntry {
                name: "Forest".to_string(),
                count: 3,
            },
            ListEntry {
                name: "Black Lotus".to_string(),
                count: 1,
            },
        ];
        let (pool, unresolved) = resolve_list(&entries, &cards);
        assert_eq!(pool.len(), 3);
        assert_eq!(unresolved, vec!["Black Lotus"]);
    }
}

use itertools::Itertools;
use lazy_static::lazy_static;
use regex::Regex;
use strum::IntoEnumIterator;

use crate::config::ArchetypeConfig;
use crate::models::card::Card;
use crate::models::strategy::Archetype;
use crate::opt::*;

lazy_static! {
    static ref CREATURE_TYPE_PATTERN: Regex =
        Regex::new(r"(?:other )?([a-z]+) creatures?").unwrap();
}

/// Words appearing in front of "creature(s)" in lower-cased text, deduplicated
/// in first-seen order.
pub fn creature_types_mentioned(text: &str) -> Vec<String> {
    CREATURE_TYPE_PATTERN
        .captures_iter(text)
        .filter_map(|caps| caps.get(1).map(|m| m.as_str().to_string()))
        .unique()
        .collect()
}

/// Raw score of every scored archetype for a leader text, in declaration order.
pub fn archetype_scores(text: &str, config: &ArchetypeConfig) -> Vec<(Archetype, i32)> {
    Archetype::iter()
        .filter(|a| *a != Archetype::Midrange)
        .map(|archetype| {
            let mut score: i32 = config
                .signals
                .iter()
                .filter(|s| s.archetype == archetype && s.rule.matches(text))
                .map(|s| s.points)
                .sum();
            if archetype == Archetype::Tribal && !creature_types_mentioned(text).is_empty() {
                score += config.tribal_points;
            }
            (archetype, score)
        })
        .collect()
}

/// Strategic identity of a leader. Ties go to the earliest archetype in
/// declaration order; a winning score below the threshold means Midrange.
pub fn detect_archetype(leader: Option<&Card>, config: &ArchetypeConfig) -> Archetype {
    let Some(leader) = leader else {
        return Archetype::Midrange;
    };

    let scores = archetype_scores(leader.text(), config);
    let best = scores
        .iter()
        .fold(None::<(Archetype, i32)>, |best, &(archetype, score)| match best {
            Some((_, best_score)) if score <= best_score => best,
            _ => Some((archetype, score)),
        });

    log_if(
        &format!("Archetype scores for {}: {:?}", leader.name(), scores),
        DbgFlg::Build,
    );

    match best {
        Some((archetype, score)) if score >= config.threshold => archetype,
        _ => Archetype::Midrange,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn leader(text: &str) -> Card {
        Card::new("Test Leader", "Legendary Creature — Human", text)
    }

    fn detect(text: &str) -> Archetype {
        detect_archetype(Some(&leader(text)), &ArchetypeConfig::default())
    }

    #[test]
    fn test_no_leader_is_midrange() {
        assert_eq!(
            detect_archetype(None, &ArchetypeConfig::default()),
            Archetype::Midrange
        );
    }

    #[test]
    fn test_token_leader() {
        assert_eq!(
            detect("At the beginning of your end step, create a 1/1 white Soldier token."),
            Archetype::Tokens
        );
    }

    #[test]
    fn test_tie_resolves_to_declaration_order() {
        // Tokens and Aristocrats both score 3.
        assert_eq!(
            detect("Whenever you sacrifice a permanent, create a Treasure token."),
            Archetype::Tokens
        );
    }

    #[test]
    fn test_below_threshold_is_midrange() {
        assert_eq!(detect("When this enters, draw a card."), Archetype::Midrange);
        assert_eq!(detect("Flying"), Archetype::Midrange);
        assert_eq!(detect(""), Archetype::Midrange);
    }

    #[test]
    fn test_tribal_from_creature_type_pattern() {
        assert_eq!(
            creature_types_mentioned("other elf creatures you control get +1/+1. elf creatures"),
            vec!["elf"]
        );
        assert_eq!(
            detect("Other Elf creatures you control get +1/+1."),
            Archetype::Tribal
        );
    }

    #[test]
    fn test_aristocrats_beats_weaker_signals() {
        assert_eq!(
            detect("Whenever another creature you control dies, each opponent loses 1 life. Sacrifice a creature: Scry 1."),
            Archetype::Aristocrats
        );
    }

    #[test]
    fn test_detection_is_idempotent() {
        let card = leader("Whenever you cast an instant or sorcery spell, copy that spell.");
        let config = ArchetypeConfig::default();
        let first = detect_archetype(Some(&card), &config);
        let second = detect_archetype(Some(&card), &config);
        assert_eq!(first, second);
        assert_eq!(first, Archetype::Spellslinger);
    }
}

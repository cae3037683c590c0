use itertools::Itertools;
use serde::Serialize;

use crate::config::PartnerConfig;
use crate::models::card::{Card, ColorSet};

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PartnerCheck {
    pub compatible: bool,
    pub reason: String,
}

impl PartnerCheck {
    fn rejected(reason: String) -> Self {
        PartnerCheck {
            compatible: false,
            reason,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PartnerSynergy {
    pub score: u32,
    pub notes: Vec<String>,
    pub combined_colors: ColorSet,
}

/// A card that may lead a deck: its type line names both "legendary" and
/// "creature".
pub fn is_valid_leader(card: &Card) -> bool {
    card.is_legendary_creature()
}

/// The name after "Partner with", in its printed casing and without
/// reminder text.
pub fn partner_with(card: &Card) -> Option<String> {
    const MARKER: &str = "partner with";
    let text = card.oracle_text();
    let start = text.to_ascii_lowercase().find(MARKER)? + MARKER.len();
    let rest = &text[start..];
    let line = rest.lines().next().unwrap_or_default();
    let name = match line.find('(') {
        Some(paren) => &line[..paren],
        None => line,
    };
    let name = name.trim().trim_end_matches('.').trim();
    (!name.is_empty()).then(|| name.to_string())
}

pub fn check_partner_compatibility(a: &Card, b: &Card) -> PartnerCheck {
    for (card, other) in [(a, b), (b, a)] {
        if let Some(required) = partner_with(card) {
            if !required.eq_ignore_ascii_case(other.name()) {
                return PartnerCheck::rejected(format!(
                    "{} can only partner with {}",
                    card.name(),
                    required
                ));
            }
        }
    }

    if !(a.text().contains("partner") && b.text().contains("partner")) {
        return PartnerCheck::rejected("One or both commanders lack Partner ability".to_string());
    }

    PartnerCheck {
        compatible: true,
        reason: "Compatible partners".to_string(),
    }
}

pub fn combine_leader_colors(a: &Card, b: Option<&Card>) -> ColorSet {
    b.map_or(*a.color_identity(), |b| a.color_identity().union(b.color_identity()))
}

fn creature_subtypes(card: &Card) -> Vec<&str> {
    let types = card.types();
    if !types.contains("creature") {
        return Vec::new();
    }
    types
        .split_once('—')
        .or_else(|| types.split_once(" - "))
        .map(|(_, subtypes)| subtypes.split_whitespace().collect())
        .unwrap_or_default()
}

pub fn analyze_partner_synergy(a: &Card, b: &Card, config: &PartnerConfig) -> PartnerSynergy {
    let mut score = 0u32;
    let mut notes = Vec::new();

    let tribes_b = creature_subtypes(b);
    let shared_tribes = creature_subtypes(a)
        .into_iter()
        .filter(|t| tribes_b.contains(t))
        .unique()
        .collect::<Vec<_>>();
    if !shared_tribes.is_empty() {
        score += config.tribal_bonus;
        notes.push(format!("Tribal synergy: {}", shared_tribes.join(", ")));
    }

    let (text_a, text_b) = (a.text(), b.text());
    for mechanic in &config.mechanics {
        if text_a.contains(mechanic.as_str()) && text_b.contains(mechanic.as_str()) {
            score += config.mechanic_bonus;
            notes.push(format!("Shared {} mechanic", mechanic));
        }
    }

    let (producer, consumer) = (config.producer_phrase.as_str(), config.consumer_phrase.as_str());
    if (text_a.contains(producer) && text_b.contains(consumer))
        || (text_a.contains(consumer) && text_b.contains(producer))
    {
        score += config.complement_bonus;
        notes.push("Complementary token/sacrifice strategy".to_string());
    }

    score += a.color_identity().intersection(b.color_identity()).len() as u32 * config.shared_color_bonus;

    PartnerSynergy {
        score: score.min(config.synergy_cap),
        notes,
        combined_colors: combine_leader_colors(a, Some(b)),
    }
}

fn strategic_weight(card: &Card, config: &PartnerConfig) -> i32 {
    config
        .strategy_phrases
        .iter()
        .map(|p| card.text().matches(p.phrase.as_str()).count() as i32 * p.points)
        .sum()
}

/// Which of two partners drives strategy detection. Ties favor `a`.
pub fn partner_emphasis<'c>(
    a: &'c Card,
    b: &'c Card,
    config: &PartnerConfig,
) -> (&'c Card, &'c Card, String) {
    let mut weight_a = strategic_weight(a, config);
    let mut weight_b = strategic_weight(b, config);
    if a.mana_value() < b.mana_value() {
        weight_a += config.cheaper_bonus;
    } else if b.mana_value() < a.mana_value() {
        weight_b += config.cheaper_bonus;
    }

    let (primary, secondary) = if weight_a >= weight_b { (a, b) } else { (b, a) };
    let note = format!("{} appears to be the primary strategic driver", primary.name());
    (primary, secondary, note)
}

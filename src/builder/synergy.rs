use std::collections::BTreeMap;

use lazy_static::lazy_static;
use regex::Regex;

use crate::config::{EquipmentConfig, StrategyFitConfig, SynergyConfig};
use crate::models::card::{Card, ColorSet};
use crate::models::deck::ThemeInfo;
use crate::models::strategy::{Archetype, Strategy};

pub type KeywordWeights = BTreeMap<String, f64>;

lazy_static! {
    static ref EQUIP_COST: Regex = Regex::new(r"equip \{(\d+)\}").unwrap();
}

/// Vocabulary keywords found in the card text, in vocabulary order.
pub fn extract_keywords<'a>(card: &Card, config: &'a SynergyConfig) -> Vec<&'a str> {
    config
        .keyword_weights
        .keys()
        .map(String::as_str)
        .filter(|kw| card.text().contains(kw))
        .collect()
}

/// Base weights boosted for keywords the leader text or the theme emphasize.
pub fn keyword_weights(
    leader: Option<&Card>,
    theme: Option<&ThemeInfo>,
    config: &SynergyConfig,
) -> KeywordWeights {
    let mut weights = config.keyword_weights.clone();
    for (kw, weight) in weights.iter_mut() {
        if leader.is_some_and(|l| l.text().contains(kw.as_str())) {
            *weight *= config.leader_keyword_multiplier;
        }
        if theme.is_some_and(|t| t.has_keyword(kw) || t.has_keyword(&format!("{}s", kw))) {
            *weight *= config.theme_keyword_multiplier;
        }
    }
    weights
}

/// How many times each vocabulary keyword occurs across the selected cards.
#[derive(Debug, Clone, Default)]
pub struct KeywordTally {
    counts: BTreeMap<String, usize>,
}

impl KeywordTally {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_cards<'c, I>(cards: I, config: &SynergyConfig) -> Self
    where
        I: IntoIterator<Item = &'c Card>,
    {
        let mut tally = KeywordTally::new();
        for card in cards {
            tally.add(card, config);
        }
        tally
    }

    pub fn add(&mut self, card: &Card, config: &SynergyConfig) {
        for kw in extract_keywords(card, config) {
            *self.counts.entry(kw.to_string()).or_default() += 1;
        }
    }

    pub fn count(&self, keyword: &str) -> usize {
        self.counts.get(keyword).copied().unwrap_or(0)
    }
}

/// Inputs every scorer term reads. Holds no mutable state.
#[derive(Debug, Clone, Copy)]
pub struct ScoringContext<'a> {
    pub leader: Option<&'a Card>,
    pub leader_identity: ColorSet,
    pub weights: &'a KeywordWeights,
    pub tally: &'a KeywordTally,
    pub strategy: &'a Strategy,
    pub config: &'a SynergyConfig,
}

pub fn leader_synergy(card: &Card, leader: Option<&Card>, identity: &ColorSet, config: &SynergyConfig) -> f64 {
    let Some(leader) = leader else {
        return 0.0;
    };

    let mut score = 0.0;
    if card.colors().intersects(identity) {
        score += config.color_bonus;
    }

    let leader_keywords = extract_keywords(leader, config);
    let shared = extract_keywords(card, config)
        .into_iter()
        .filter(|kw| leader_keywords.contains(kw))
        .count();
    score += shared as f64 * config.shared_keyword_bonus;

    for interaction in &config.interactions {
        if leader.text().contains(interaction.leader_phrase.as_str())
            && card.text().contains(interaction.card_phrase.as_str())
        {
            score += interaction.points;
        }
    }

    score.min(config.leader_cap)
}

pub fn inherent_strength(card: &Card, weights: &KeywordWeights, config: &SynergyConfig) -> f64 {
    extract_keywords(card, config)
        .into_iter()
        .map(|kw| weights.get(kw).copied().unwrap_or(0.0))
        .sum()
}

pub fn inter_deck_bonus(card: &Card, tally: &KeywordTally, config: &SynergyConfig) -> f64 {
    let shared: usize = extract_keywords(card, config)
        .into_iter()
        .map(|kw| tally.count(kw))
        .sum();
    shared as f64 * config.inter_deck_bonus
}

pub fn archetype_fit(card: &Card, archetype: Archetype, config: &SynergyConfig) -> f64 {
    config
        .archetype_fit
        .iter()
        .filter(|fit| fit.archetype == archetype)
        .filter(|fit| fit.types.matches(card.types()) || fit.text.matches(card.text()))
        .map(|fit| fit.points)
        .sum()
}

/// Fitness of a card for the deck being built. Pure function of its inputs.
pub fn score(card: &Card, ctx: &ScoringContext) -> f64 {
    leader_synergy(card, ctx.leader, &ctx.leader_identity, ctx.config)
        + inherent_strength(card, ctx.weights, ctx.config)
        + inter_deck_bonus(card, ctx.tally, ctx.config)
        + archetype_fit(card, ctx.strategy.primary_archetype, ctx.config)
}

pub fn equipment_aura_score(card: &Card, voltron: bool, config: &EquipmentConfig) -> f64 {
    let text = card.text();
    let granted = config
        .keywords
        .iter()
        .filter(|kw| text.contains(kw.phrase.as_str()))
        .collect::<Vec<_>>();

    let mut score: f64 = granted.iter().map(|kw| kw.points).sum();
    if granted.len() >= 2 {
        score += config.multi_keyword_bonus;
    }
    if voltron {
        score *= config.voltron_multiplier;
    }

    let boost = config.stat_boosts.iter().find(|boost| {
        text.contains(&format!("+{}/", boost.amount)) || text.contains(&format!("/+{}", boost.amount))
    });
    if let Some(boost) = boost {
        score += boost.points;
    }

    let equip_cost = EQUIP_COST
        .captures(text)
        .and_then(|caps| caps.get(1))
        .and_then(|m| m.as_str().parse::<u32>().ok());
    if let Some(cost) = equip_cost {
        if let Some(penalty) = config.equip_costs.iter().find(|p| cost >= p.min_cost) {
            score -= penalty.points;
        }
    }

    score
}

/// Extra ranking weight from the detected strategy's requirements and
/// sub-archetypes.
pub fn strategy_fit(
    card: &Card,
    strategy: &Strategy,
    creature_keywords: &[String],
    config: &StrategyFitConfig,
) -> f64 {
    let text = card.text();
    let types = card.types();
    let reqs = &strategy.requirements;
    let mut score = 0.0;

    if reqs.spell_matters {
        if types.contains("instant") || types.contains("sorcery") {
            score += config.spell_type_bonus;
        }
        if text.contains("copy") && text.contains("spell") {
            score += config.spell_copy_bonus;
        }
        score += config
            .spell_synergy
            .iter()
            .filter(|bonus| text.contains(bonus.phrase.as_str()))
            .map(|bonus| bonus.points)
            .sum::<f64>();
    }

    if reqs.creature_keywords_matter {
        let count = creature_keywords
            .iter()
            .filter(|kw| text.contains(kw.as_str()))
            .count();
        score += count as f64 * config.creature_keyword_bonus;
    }

    if let Some(tribe) = &reqs.tribal_type {
        if types.contains(tribe.as_str()) {
            score += config.tribal_bonus;
        }
    }

    if (reqs.graveyard_matters || strategy.has_sub_archetype("graveyard"))
        && (text.contains("graveyard")
            || (text.contains("return") && text.contains("from your graveyard")))
    {
        score += config.graveyard_bonus;
    }

    if strategy.has_sub_archetype("voltron")
        && (types.contains("equipment") || types.contains("aura"))
    {
        score += equipment_aura_score(card, true, &config.equipment);
    }

    if strategy.has_sub_archetype("control")
        && config.control_phrases.iter().any(|p| text.contains(p.as_str()))
    {
        score += config.control_bonus;
    }

    score
}

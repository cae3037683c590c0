use std::collections::BTreeMap;

use lazy_static::lazy_static;
use regex::Regex;
use serde::Serialize;
use strum::IntoEnumIterator;

use crate::builder::validate::DeckList;
use crate::config::{LandConfig, PhraseBonus};
use crate::models::card::{Card, Color, ColorSet};
use crate::models::strategy::Archetype;
use crate::opt::*;

lazy_static! {
    static ref MANA_SYMBOL: Regex = Regex::new(r"\{([^}]+)\}").unwrap();
}

/// Share of colored pips per allowed color. Shares sum to 1 when any color
/// is allowed.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct PipShares {
    shares: BTreeMap<Color, f64>,
}

impl PipShares {
    pub fn share(&self, color: Color) -> f64 {
        self.shares.get(&color).copied().unwrap_or(0.0)
    }
}

/// Counts colored mana symbols in the mana costs of `cards`. Every allowed
/// color starts at one pip; a hybrid symbol gives each of its colors a
/// fractional pip.
pub fn pip_shares<'c, I>(allowed: &ColorSet, cards: I, config: &LandConfig) -> PipShares
where
    I: IntoIterator<Item = &'c Card>,
{
    let mut pips: BTreeMap<Color, f64> = allowed.iter().map(|c| (c, 1.0)).collect();

    for card in cards {
        for caps in MANA_SYMBOL.captures_iter(card.mana_cost()) {
            let colors = caps[1]
                .split('/')
                .filter_map(|part| part.chars().next().filter(|_| part.len() == 1))
                .filter_map(Color::from_symbol)
                .filter(|c| allowed.contains(*c))
                .collect::<Vec<_>>();
            let weight = if colors.len() > 1 {
                config.hybrid_pip_weight
            } else {
                1.0
            };
            for color in colors {
                *pips.entry(color).or_default() += weight;
            }
        }
    }

    let total: f64 = pips.values().sum();
    if total > 0.0 {
        pips.values_mut().for_each(|v| *v /= total);
    }
    PipShares { shares: pips }
}

fn produces(text: &str, color: Color) -> bool {
    text.contains(&format!("add {{{}}}", color.symbol().to_ascii_lowercase()))
}

/// Colors of the basic land types a fetch effect names.
fn fetchable_colors(text: &str) -> ColorSet {
    Color::iter()
        .filter(|c| text.contains(&c.basic_land_name().to_lowercase()))
        .collect()
}

pub fn is_valid_land(land: &Card, allowed: &ColorSet, config: &LandConfig) -> bool {
    if let Some(color) = land.basic_land_color() {
        return allowed.contains(color);
    }

    let text = land.text();
    if !land.color_identity().is_subset(allowed) {
        return false;
    }

    if allowed.len() == 1 {
        let produces_color = allowed.iter().any(|c| produces(text, c));
        let has_utility = config
            .mono_utility_effects
            .iter()
            .any(|effect| text.contains(effect.as_str()));
        return produces_color || has_utility;
    }

    if text.contains(config.fetch_phrase.as_str()) {
        return fetchable_colors(text).intersects(allowed);
    }

    true
}

/// Ranking score of a non-basic land. Never used to filter.
pub fn score_utility_land(
    land: &Card,
    allowed: &ColorSet,
    archetype: Archetype,
    leader: Option<&Card>,
    config: &LandConfig,
) -> i32 {
    let text = land.text();
    let phrase_points = |bonuses: &[PhraseBonus]| -> i32 {
        bonuses
            .iter()
            .filter(|b| text.contains(b.phrase.as_str()))
            .map(|b| b.points)
            .sum()
    };

    let mut score = phrase_points(&config.keyword_bonuses);

    if let Some(bonuses) = config.archetype_bonuses.get(&archetype) {
        score += phrase_points(bonuses);
    }

    if let Some(leader) = leader {
        score += config
            .leader_bonuses
            .iter()
            .filter(|b| leader.text().contains(b.leader_phrase.as_str()))
            .filter(|b| b.land_any.iter().any(|p| text.contains(p.as_str())))
            .map(|b| b.points)
            .sum::<i32>();
    }

    if config.tapped_phrases.iter().any(|p| text.contains(p.as_str())) {
        if score >= config.tapped_high_value_threshold {
            score -= config.tapped_penalty_high_value;
        } else if config
            .tapped_soft_phrases
            .iter()
            .any(|p| text.contains(p.as_str()))
        {
            score -= config.tapped_penalty_soft;
        } else {
            score -= config.tapped_penalty_plain;
        }
    }

    if land.types().contains("legendary") && score > config.legendary_gate {
        score += config.legendary_bonus;
    }

    if allowed.len() == 1
        && config
            .mono_color_phrases
            .iter()
            .any(|p| text.contains(p.as_str()))
    {
        score += config.mono_color_bonus;
    }

    score
}

/// One representative basic per color, in WUBRG order.
pub fn available_basics<'p, I>(lands: I) -> Vec<(Color, &'p Card)>
where
    I: IntoIterator<Item = &'p Card>,
{
    let mut basics: Vec<(Color, &Card)> = Vec::new();
    for land in lands {
        if let Some(color) = land.basic_land_color() {
            if !basics.iter().any(|(c, _)| *c == color) {
                basics.push((color, land));
            }
        }
    }
    basics.sort_by_key(|(color, _)| *color);
    basics
}

/// Picks the basic whose color is furthest below its pip share of the
/// basics placed so far. Ties go to the earlier color in WUBRG order.
pub fn next_basic<'p>(
    basics: &[(Color, &'p Card)],
    placed: &BTreeMap<Color, usize>,
    shares: &PipShares,
) -> Option<&'p Card> {
    let total = placed.values().sum::<usize>() as f64 + 1.0;
    let mut best: Option<(f64, &'p Card)> = None;
    for (color, card) in basics {
        let deficit = shares.share(*color) * total - placed.get(color).copied().unwrap_or(0) as f64;
        if best.map_or(true, |(d, _)| deficit > d) {
            best = Some((deficit, *card));
        }
    }
    best.map(|(_, card)| card)
}

/// The land bucket: best utility lands first, then basics spread by pip
/// share. Returns at most `count` cards.
pub fn select_lands<'p>(
    pool: &'p [Card],
    count: usize,
    allowed: &ColorSet,
    leader: Option<&Card>,
    archetype: Archetype,
    shares: &PipShares,
    config: &LandConfig,
) -> Vec<&'p Card> {
    let mut selected = DeckList::new(count);
    let valid = pool
        .iter()
        .filter(|land| is_valid_land(land, allowed, config))
        .collect::<Vec<_>>();

    let basics = available_basics(valid.iter().copied());
    let mut nonbasics = valid
        .iter()
        .filter(|land| !land.is_basic_land())
        .map(|land| (score_utility_land(land, allowed, archetype, leader, config), *land))
        .collect::<Vec<_>>();
    nonbasics.sort_by(|a, b| b.0.cmp(&a.0));

    for (score, land) in nonbasics {
        if selected.is_full() {
            break;
        }
        if score > 0 && selected.push(land) {
            log_if(
                &format!("Utility land {} (score {})", land.name(), score),
                DbgFlg::Lands,
            );
        }
    }

    let mut placed: BTreeMap<Color, usize> = BTreeMap::new();
    while !selected.is_full() {
        let Some(basic) = next_basic(&basics, &placed, shares) else {
            break;
        };
        if !selected.push(basic) {
            break;
        }
        if let Some(color) = basic.basic_land_color() {
            *placed.entry(color).or_default() += 1;
        }
    }

    log_if(
        &format!(
            "Selected {} of {} lands for {}: {:?}",
            selected.len(),
            count,
            allowed,
            placed
        ),
        DbgFlg::Lands,
    );
    selected.cards().to_vec()
}

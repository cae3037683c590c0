use std::collections::BTreeMap;

use crate::builder::backfill::{backfill_requirements, compile_requirements, Requirement, RAMP};
use crate::builder::categorize::{Bucket, CategorizedPool};
use crate::builder::curve::{analyze_curve, curve_penalty, desired_ceiling};
use crate::builder::lands::{available_basics, next_basic, pip_shares, select_lands, PipShares};
use crate::builder::partner::{analyze_partner_synergy, combine_leader_colors, partner_emphasis};
use crate::builder::strategy::analyze_strategy;
use crate::builder::synergy::{keyword_weights, score, strategy_fit, KeywordTally, KeywordWeights, ScoringContext};
use crate::builder::validate::{filter_pool, fits_colors, DeckList};
use crate::config::BuilderConfig;
use crate::models::card::{Card, Color, ColorSet};
use crate::models::deck::{BucketShortfall, BuildReport, BuildRequest};
use crate::models::strategy::Strategy;
use crate::opt::*;

/// Everything the greedy ranking reads besides the deck itself.
struct Ranking<'a> {
    leader: Option<&'a Card>,
    identity: ColorSet,
    weights: &'a KeywordWeights,
    strategy: &'a Strategy,
    config: &'a BuilderConfig,
    ceiling: f64,
    ramp: Option<&'a Requirement>,
}

impl<'a> Ranking<'a> {
    fn synergy(&self, card: &Card, tally: &KeywordTally) -> f64 {
        let ctx = ScoringContext {
            leader: self.leader,
            leader_identity: self.identity,
            weights: self.weights,
            tally,
            strategy: self.strategy,
            config: &self.config.synergy,
        };
        score(card, &ctx)
    }

    fn ramp_count(&self, deck: &DeckList) -> usize {
        self.ramp.map_or(0, |ramp| ramp.count(deck.iter()))
    }
}

/// Fills one bucket, one card per pass, always taking the best remaining
/// candidate. Stops at `target`, on a full deck, or when nothing is
/// admissible. Returns how many cards were placed.
fn select_greedy<'p>(
    deck: &mut DeckList<'p>,
    candidates: &[&'p Card],
    target: usize,
    allowed: &ColorSet,
    ranking: &Ranking,
) -> usize {
    let mut remaining = candidates.to_vec();
    let mut placed = 0;

    while placed < target && !deck.is_full() {
        let tally = KeywordTally::from_cards(deck.iter(), &ranking.config.synergy);
        let ramp_count = ranking.ramp_count(deck);
        let curve = analyze_curve(deck.iter().filter(|c| !c.is_land()), ramp_count);

        let mut best: Option<(usize, f64)> = None;
        for (idx, card) in remaining.iter().enumerate() {
            if !fits_colors(card, allowed) || !deck.is_singleton_legal(card) {
                continue;
            }
            let value = ranking.synergy(card, &tally)
                + strategy_fit(
                    card,
                    ranking.strategy,
                    &ranking.config.strategy.creature_keywords,
                    &ranking.config.strategy_fit,
                )
                - curve_penalty(card, ranking.ceiling, ramp_count, curve.as_ref(), &ranking.config.curve);
            if best.map_or(true, |(_, top)| value > top) {
                best = Some((idx, value));
            }
        }

        let Some((idx, value)) = best else {
            break;
        };
        let card = remaining.remove(idx);
        if !deck.push(card) {
            break;
        }
        log_if(&format!("Selected {} ({:.1})", card.name(), value), DbgFlg::Build);
        placed += 1;
    }

    placed
}

/// Allowed colors of a leaderless build: every color the non-land pool
/// uses, or all five when that is nothing.
fn pool_colors(pool: &CategorizedPool) -> ColorSet {
    let colors = pool
        .all_cards()
        .filter(|c| !c.is_land())
        .fold(ColorSet::empty(), |acc, c| acc.union(c.color_identity()));
    if colors.is_empty() {
        ColorSet::all()
    } else {
        colors
    }
}

fn count_types(deck: &DeckList, types: &[&str]) -> usize {
    deck.iter()
        .filter(|c| types.iter().any(|t| c.types().contains(t)))
        .count()
}

fn unmet_minimums(deck: &DeckList, strategy: &Strategy) -> Vec<String> {
    let reqs = &strategy.requirements;
    let checks = [
        (
            "instants and sorceries",
            reqs.min_instants_sorceries,
            count_types(deck, &["instant", "sorcery"]),
        ),
        ("artifacts", reqs.min_artifacts, count_types(deck, &["artifact"])),
        ("enchantments", reqs.min_enchantments, count_types(deck, &["enchantment"])),
        ("planeswalkers", reqs.min_planeswalkers, count_types(deck, &["planeswalker"])),
    ];
    checks
        .into_iter()
        .filter(|(_, min, have)| have < min)
        .map(|(what, min, have)| format!("Strategy wants {} {} but the deck has {}", min, what, have))
        .collect()
}

/// Appends basics until the deck is full. Color-appropriate basics from the
/// validated pool come first, then any basic at all.
fn reconcile_size<'p>(
    deck: &mut DeckList<'p>,
    valid: &'p CategorizedPool,
    raw: &'p CategorizedPool,
    shares: &PipShares,
) -> Option<String> {
    let mut basics = available_basics(valid.get(Bucket::Lands));
    if basics.is_empty() {
        basics = available_basics(raw.get(Bucket::Lands));
    }

    let mut placed: BTreeMap<Color, usize> = BTreeMap::new();
    for color in deck.iter().filter_map(Card::basic_land_color) {
        *placed.entry(color).or_default() += 1;
    }

    while !deck.is_full() {
        let Some(basic) = next_basic(&basics, &placed, shares) else {
            return Some("No basic lands available to complete the deck".to_string());
        };
        if !deck.push(basic) {
            break;
        }
        log_if(
            &format!("Added basic land: {} (deck size {})", basic.name(), deck.len()),
            DbgFlg::Build,
        );
        if let Some(color) = basic.basic_land_color() {
            *placed.entry(color).or_default() += 1;
        }
    }
    None
}

/// Builds one deck from a categorized pool. Never fails: a thin pool yields
/// a shorter deck and warnings in the report.
pub fn build_deck(pool: &CategorizedPool, request: &BuildRequest, config: &BuilderConfig) -> BuildReport {
    let mut warnings = Vec::new();
    let theme = request.theme.as_ref();
    let leader = request.leader.as_ref();
    let co_leader = match (leader, request.co_leader.as_ref()) {
        (None, Some(co)) => {
            warnings.push(format!("Ignoring partner {} without a commander", co.name()));
            None
        }
        (_, co) => co,
    };

    let driver = match (leader, co_leader) {
        (Some(a), Some(b)) => {
            let (primary, _, note) = partner_emphasis(a, b, &config.partner);
            log_if(&note, DbgFlg::Build);
            Some(primary)
        }
        (leader, _) => leader,
    };

    let strategy = analyze_strategy(driver, theme, config);
    let allowed = match leader {
        Some(leader) => combine_leader_colors(leader, co_leader),
        None => pool_colors(pool),
    };

    let (size, lands_target, creatures_target) = match leader {
        Some(_) => (
            config.deck.leader_deck_size,
            request.lands_required.unwrap_or(strategy.lands_required),
            request.creatures_required.unwrap_or(strategy.creatures_required),
        ),
        None => (
            request.deck_size.unwrap_or(config.deck.default_deck_size),
            request.lands_required.unwrap_or(config.deck.default_lands),
            request.creatures_required.unwrap_or(config.deck.default_creatures),
        ),
    };

    log_if(
        &format!(
            "Building {}-card deck for colors {} ({} lands, {} creatures)",
            size, allowed, lands_target, creatures_target
        ),
        DbgFlg::Build,
    );

    let (valid, skipped) = filter_pool(pool, &allowed, &config.deck.format);
    let weights = request
        .keyword_weights
        .clone()
        .unwrap_or_else(|| keyword_weights(driver, theme, &config.synergy));
    let (requirements, pattern_errors) = compile_requirements(&config.requirements);
    warnings.extend(pattern_errors);

    let ranking = Ranking {
        leader: driver,
        identity: allowed,
        weights: &weights,
        strategy: &strategy,
        config,
        ceiling: desired_ceiling(theme, strategy.primary_archetype, &config.curve),
        ramp: requirements.iter().find(|r| r.name == RAMP),
    };

    let nonlands = valid.all_cards().filter(|c| !c.is_land()).collect::<Vec<_>>();
    let shares = pip_shares(&allowed, nonlands.iter().copied(), &config.lands);
    let mut deck = DeckList::new(size);
    for card in leader.into_iter().chain(co_leader) {
        deck.exclude(card);
    }
    let mut shortfalls = Vec::new();

    let lands = select_lands(
        valid.get(Bucket::Lands),
        lands_target.min(size),
        &allowed,
        driver,
        strategy.primary_archetype,
        &shares,
        &config.lands,
    );
    let lands_placed = lands.into_iter().filter(|land| deck.push(*land)).count();

    let creatures = valid.get(Bucket::Creatures).iter().collect::<Vec<_>>();
    let creatures_placed = select_greedy(&mut deck, &creatures, creatures_target, &allowed, &ranking);

    // spells take every slot the first two buckets left open
    let residual = deck.remaining();
    let spell_slots = request.spells_required.map_or(residual, |n| n.min(residual));
    let spells = valid.spells().collect::<Vec<_>>();
    let spells_placed = select_greedy(&mut deck, &spells, spell_slots, &allowed, &ranking);

    for (bucket, target, placed) in [
        ("lands", lands_target, lands_placed),
        ("creatures", creatures_target, creatures_placed),
        ("spells", spell_slots, spells_placed),
    ] {
        if placed < target {
            warn(&format!("Only {} of {} {} available", placed, target, bucket));
            shortfalls.push(BucketShortfall {
                bucket: bucket.to_string(),
                target,
                placed,
            });
        }
    }

    let backfilled = backfill_requirements(&mut deck, &nonlands, &requirements, &allowed, |card, deck| {
        ranking.synergy(card, &KeywordTally::from_cards(deck.iter(), &config.synergy))
    });

    if let Some(warning) = reconcile_size(&mut deck, &valid, pool, &shares) {
        warn(&warning);
        warnings.push(warning);
    }
    if deck.len() != size {
        let warning = format!("Deck contains {} cards instead of {}", deck.len(), size);
        warn(&warning);
        warnings.push(warning);
    }
    warnings.extend(unmet_minimums(&deck, &strategy));

    BuildReport {
        leader: leader.map(|c| c.name().to_string()),
        co_leader: co_leader.map(|c| c.name().to_string()),
        target_size: size,
        allowed_colors: allowed,
        partner: leader.zip(co_leader).map(|(a, b)| analyze_partner_synergy(a, b, &config.partner)),
        strategy,
        cards: deck.iter().cloned().collect(),
        skipped,
        backfilled,
        shortfalls,
        warnings,
    }
}

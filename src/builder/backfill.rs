use regex::RegexSet;

use crate::builder::validate::{fits_colors, DeckList};
use crate::config::EffectRequirement;
use crate::models::card::{Card, ColorSet};
use crate::models::deck::BackfillEvent;
use crate::opt::*;

pub const RAMP: &str = "ramp";

/// An effect requirement with its patterns compiled.
#[derive(Debug, Clone)]
pub struct Requirement {
    pub name: String,
    pub min_count: usize,
    patterns: RegexSet,
}

impl Requirement {
    /// Lands never count towards an effect family.
    pub fn matches(&self, card: &Card) -> bool {
        !card.is_land() && self.patterns.is_match(card.oracle_text())
    }

    pub fn count<'c, I>(&self, cards: I) -> usize
    where
        I: IntoIterator<Item = &'c Card>,
    {
        cards.into_iter().filter(|card| self.matches(card)).count()
    }
}

/// Compiles every requirement. One with a bad pattern is left out and
/// reported instead of failing the build.
pub fn compile_requirements(requirements: &[EffectRequirement]) -> (Vec<Requirement>, Vec<String>) {
    let mut compiled = Vec::new();
    let mut errors = Vec::new();
    for requirement in requirements {
        match requirement.matcher() {
            Ok(patterns) => compiled.push(Requirement {
                name: requirement.name.clone(),
                min_count: requirement.min_count,
                patterns,
            }),
            Err(err) => errors.push(err.to_string()),
        }
    }
    (compiled, errors)
}

/// Adds unused candidates until every requirement reaches its minimum, the
/// candidates run out or the deck is full. Candidates are tried in
/// descending `rank` order, ties keeping pool order.
pub fn backfill_requirements<'p, F>(
    deck: &mut DeckList<'p>,
    candidates: &[&'p Card],
    requirements: &[Requirement],
    allowed: &ColorSet,
    rank: F,
) -> Vec<BackfillEvent>
where
    F: Fn(&Card, &DeckList<'p>) -> f64,
{
    let mut events = Vec::new();

    for requirement in requirements {
        let present = requirement.count(deck.iter());
        if present >= requirement.min_count {
            continue;
        }
        let needed = requirement.min_count - present;
        log_if(
            &format!(
                "Requirement {}: {} of {}, looking for {} more",
                requirement.name, present, requirement.min_count, needed
            ),
            DbgFlg::Build,
        );

        let current: &DeckList<'p> = deck;
        let mut matching = candidates
            .iter()
            .copied()
            .filter(|card| requirement.matches(card))
            .filter(|card| fits_colors(card, allowed) && current.is_singleton_legal(card))
            .map(|card| (rank(card, current), card))
            .collect::<Vec<_>>();
        matching.sort_by(|a, b| b.0.total_cmp(&a.0));

        let mut added = 0;
        for (_, card) in matching {
            if added == needed || deck.is_full() {
                break;
            }
            if deck.push(card) {
                added += 1;
                log_if(
                    &format!("Added {} for {} requirement", card.name(), requirement.name),
                    DbgFlg::Build,
                );
                events.push(BackfillEvent {
                    requirement: requirement.name.clone(),
                    card: card.name().to_string(),
                });
            }
        }
    }

    events
}

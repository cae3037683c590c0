use serde::{Deserialize, Serialize};
use strum_macros::{Display, EnumIter, EnumString};

/// Strategic identity of a leader. Declaration order is the tie-break order
/// used by archetype detection.
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    Hash,
    PartialOrd,
    Ord,
    Display,
    EnumString,
    EnumIter,
    Serialize,
    Deserialize,
)]
#[strum(ascii_case_insensitive)]
pub enum Archetype {
    Tokens,
    Control,
    Voltron,
    Aristocrats,
    Graveyard,
    Spellslinger,
    Combo,
    Tribal,
    Ramp,
    Midrange,
}

impl Archetype {
    pub fn tag(&self) -> String {
        self.to_string().to_lowercase()
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct StrategyRequirements {
    pub min_instants_sorceries: usize,
    pub min_artifacts: usize,
    pub min_enchantments: usize,
    pub min_planeswalkers: usize,
    pub creature_keywords_matter: bool,
    pub tribal_type: Option<String>,
    pub spell_matters: bool,
    pub graveyard_matters: bool,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Strategy {
    pub primary_archetype: Archetype,
    pub sub_archetypes: Vec<String>,
    pub lands_required: usize,
    pub creatures_required: usize,
    pub spells_required: usize,
    pub requirements: StrategyRequirements,
}

impl Strategy {
    pub fn has_sub_archetype(&self, tag: &str) -> bool {
        self.sub_archetypes.iter().any(|t| t == tag)
    }
}

impl Default for Strategy {
    fn default() -> Self {
        Strategy {
            primary_archetype: Archetype::Midrange,
            sub_archetypes: Vec::new(),
            lands_required: 36,
            creatures_required: 25,
            spells_required: 38,
            requirements: StrategyRequirements::default(),
        }
    }
}

#[cfg(test)]
mod tests {
    use std::str::FromStr;

    use strum::IntoEnumIterator;

    use super::*;

    #[test]
    fn test_archetype_order_and_parse() {
        let order = Archetype::iter().collect::<Vec<_>>();
        assert_eq!(order.first(), Some(&Archetype::Tokens));
        assert_eq!(order.last(), Some(&Archetype::Midrange));
        assert_eq!(Archetype::from_str("voltron"), Ok(Archetype::Voltron));
        assert_eq!(Archetype::Spellslinger.tag(), "spellslinger");
    }

    #[test]
    fn test_default_strategy() {
        let strategy = Strategy::default();
        assert_eq!(strategy.primary_archetype, Archetype::Midrange);
        assert_eq!(
            (strategy.lands_required, strategy.creatures_required, strategy.spells_required),
            (36, 25, 38)
        );
        assert!(strategy.sub_archetypes.is_empty());
    }
}

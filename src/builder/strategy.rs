use crate::builder::archetype::detect_archetype;
use crate::config::BuilderConfig;
use crate::models::card::Card;
use crate::models::deck::ThemeInfo;
use crate::models::strategy::{Archetype, Strategy};
use crate::opt::*;

fn words(text: &str) -> impl Iterator<Item = &str> {
    text.split(|c: char| !c.is_alphanumeric())
        .filter(|w| !w.is_empty())
}

/// Combines leader-derived signals and an optional theme into one Strategy.
/// Rules run in a fixed order; later rules may overwrite numeric targets but
/// only ever append sub-archetype tags.
pub fn analyze_strategy(
    leader: Option<&Card>,
    theme: Option<&ThemeInfo>,
    config: &BuilderConfig,
) -> Strategy {
    let rules = &config.strategy;
    let mut strategy = Strategy {
        primary_archetype: detect_archetype(leader, &config.archetype),
        lands_required: rules.default_targets.lands,
        creatures_required: rules.default_targets.creatures,
        spells_required: rules.default_targets.spells,
        ..Strategy::default()
    };

    if let Some(leader) = leader {
        let text = leader.text();

        if rules
            .spell_focus_phrases
            .iter()
            .any(|p| text.contains(p.as_str()))
        {
            strategy.primary_archetype = Archetype::Spellslinger;
            strategy.requirements.spell_matters = true;
            strategy.requirements.min_instants_sorceries = rules.spell_focus_min_instants_sorceries;
            strategy.lands_required = rules.spell_focus_targets.lands;
            strategy.creatures_required = rules.spell_focus_targets.creatures;
            strategy.spells_required = rules.spell_focus_targets.spells;
        }

        let keyword_count = rules
            .creature_keywords
            .iter()
            .filter(|kw| text.contains(kw.as_str()))
            .count();
        if keyword_count >= rules.creature_keyword_threshold
            || text.contains(rules.creature_keyword_phrase.as_str())
        {
            strategy.sub_archetypes.push("creature_keywords".to_string());
            strategy.requirements.creature_keywords_matter = true;
        }

        let tribe = rules.tribes.iter().find(|rule| {
            let plural = rule.plural_form();
            words(text).any(|w| w == rule.tribe || w == plural)
        });
        if let Some(rule) = tribe {
            strategy.sub_archetypes.push("tribal".to_string());
            strategy.requirements.tribal_type = Some(rule.type_name.clone());
            strategy.creatures_required = rule.creature_count;
            strategy.spells_required = rules
                .tribal_deck_size
                .saturating_sub(strategy.lands_required + rule.creature_count);
        }
    }

    let overlay = theme.and_then(|info| {
        rules
            .themes
            .iter()
            .find(|overlay| info.theme_is(&overlay.theme))
    });
    if let Some(overlay) = overlay {
        if let Some(lands) = overlay.lands_required {
            strategy.lands_required = lands;
        }
        if let Some(min) = overlay.min_instants_sorceries {
            strategy.requirements.min_instants_sorceries = min;
        }
        if let Some(min) = overlay.min_artifacts {
            strategy.requirements.min_artifacts = min;
        }
        if let Some(min) = overlay.min_enchantments {
            strategy.requirements.min_enchantments = min;
        }
        if overlay.graveyard_matters {
            strategy.requirements.graveyard_matters = true;
        }
        strategy.sub_archetypes.push(overlay.theme.clone());
    }

    strategy.dbg_if(DbgFlg::Build);
    strategy
}

#[cfg(test)]
mod tests {
    use super::*;

    fn leader(text: &str) -> Card {
        Card::new("Test Leader", "Legendary Creature — Human Wizard", text)
    }

    #[test]
    fn test_default_strategy_without_leader_or_theme() {
        let strategy = analyze_strategy(None, None, &BuilderConfig::default());
        assert_eq!(strategy, Strategy::default());
    }

    #[test]
    fn test_spell_focus() {
        let card = leader("Magecraft — Whenever you cast or copy an instant or sorcery spell, scry 1.");
        let strategy = analyze_strategy(Some(&card), None, &BuilderConfig::default());
        assert_eq!(strategy.primary_archetype, Archetype::Spellslinger);
        assert!(strategy.requirements.spell_matters);
        assert_eq!(strategy.requirements.min_instants_sorceries, 30);
        assert_eq!(
            (strategy.lands_required, strategy.creatures_required, strategy.spells_required),
            (36, 15, 48)
        );
    }

    #[test]
    fn test_creature_keywords() {
        let card = leader("Flying, vigilance");
        let strategy = analyze_strategy(Some(&card), None, &BuilderConfig::default());
        assert!(strategy.has_sub_archetype("creature_keywords"));
        assert!(strategy.requirements.creature_keywords_matter);

        let anthem = leader("Creatures you control get +1/+0.");
        let strategy = analyze_strategy(Some(&anthem), None, &BuilderConfig::default());
        assert!(strategy.requirements.creature_keywords_matter);

        let single = leader("Trample");
        let strategy = analyze_strategy(Some(&single), None, &BuilderConfig::default());
        assert!(!strategy.requirements.creature_keywords_matter);
    }

    #[test]
    fn test_first_tribe_wins() {
        let card = leader("Dragons and Zombies you control have haste.");
        let strategy = analyze_strategy(Some(&card), None, &BuilderConfig::default());
        assert!(strategy.has_sub_archetype("tribal"));
        assert_eq!(strategy.requirements.tribal_type.as_deref(), Some("dragon"));
        assert_eq!(strategy.creatures_required, 33);
        assert_eq!(strategy.spells_required, 99 - 36 - 33);
    }

    #[test]
    fn test_tribe_needs_a_whole_word() {
        let card = leader("Exile it, then return it to the battlefield under its owner's control. It gains hexproof itself.");
        let strategy = analyze_strategy(Some(&card), None, &BuilderConfig::default());
        assert_eq!(strategy.requirements.tribal_type, None);

        let elves = leader("Other Elves you control get +1/+1.");
        let strategy = analyze_strategy(Some(&elves), None, &BuilderConfig::default());
        assert_eq!(strategy.requirements.tribal_type.as_deref(), Some("elf"));
    }

    #[test]
    fn test_theme_overlay_keeps_earlier_tags() {
        let card = leader("Flying, lifelink. Other Vampires you control get +1/+1.");
        let theme = ThemeInfo::new(Some("control"), None);
        let strategy = analyze_strategy(Some(&card), Some(&theme), &BuilderConfig::default());
        assert_eq!(
            strategy.sub_archetypes,
            vec!["creature_keywords", "tribal", "control"]
        );
        assert_eq!(strategy.lands_required, 38);
        assert_eq!(strategy.requirements.min_instants_sorceries, 20);
        // tribal spell target was derived before the overlay changed lands
        assert_eq!(strategy.spells_required, 99 - 36 - 33);
    }

    #[test]
    fn test_theme_without_leader() {
        let theme = ThemeInfo::new(Some("graveyard"), None);
        let strategy = analyze_strategy(None, Some(&theme), &BuilderConfig::default());
        assert_eq!(strategy.primary_archetype, Archetype::Midrange);
        assert!(strategy.requirements.graveyard_matters);
        assert_eq!(strategy.sub_archetypes, vec!["graveyard"]);

        let unknown = ThemeInfo::new(Some("group hug"), None);
        let strategy = analyze_strategy(None, Some(&unknown), &BuilderConfig::default());
        assert!(strategy.sub_archetypes.is_empty());
    }
}

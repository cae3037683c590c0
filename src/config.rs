use std::collections::BTreeMap;
use std::fs::{self, OpenOptions};
use std::io::Write;
use std::path::{Path, PathBuf};

use directories::ProjectDirs;
use regex::RegexSet;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::models::strategy::Archetype;
use crate::opt::*;

const APP_NAME: &str = "deck-smith";
const APP_AUTHOR: &str = "deck-smith";
const APP_QUALIFIER: &str = "com";

const CONFIG_FILE_NAME: &str = "builder_config.json";

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Unable to resolve a configuration directory for this platform")]
    NoProjectDir,

    #[error("Failed to read config {path:?}: {source}")]
    Read {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("Failed to write config {path:?}: {source}")]
    Write {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("Failed to parse config {path:?}: {source}")]
    Parse {
        path: PathBuf,
        source: serde_json::Error,
    },

    #[error("Requirement '{requirement}' has an invalid pattern: {source}")]
    InvalidPattern {
        requirement: String,
        source: regex::Error,
    },
}

fn strings(items: &[&str]) -> Vec<String> {
    items.iter().map(|s| s.to_string()).collect()
}

/// Substring rule over lower-cased text: every `all_of` phrase must appear
/// and, when `any_of` is non-empty, at least one of its phrases too.
/// An empty rule never matches.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TextRule {
    pub all_of: Vec<String>,
    pub any_of: Vec<String>,
}

impl TextRule {
    pub fn all(phrases: &[&str]) -> Self {
        TextRule {
            all_of: strings(phrases),
            any_of: Vec::new(),
        }
    }

    pub fn any(phrases: &[&str]) -> Self {
        TextRule {
            all_of: Vec::new(),
            any_of: strings(phrases),
        }
    }

    pub fn matches(&self, text: &str) -> bool {
        if self.all_of.is_empty() && self.any_of.is_empty() {
            return false;
        }
        self.all_of.iter().all(|p| text.contains(p.as_str()))
            && (self.any_of.is_empty() || self.any_of.iter().any(|p| text.contains(p.as_str())))
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ArchetypeSignal {
    pub archetype: Archetype,
    #[serde(flatten)]
    pub rule: TextRule,
    pub points: i32,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ArchetypeConfig {
    pub threshold: i32,
    pub signals: Vec<ArchetypeSignal>,
    pub tribal_points: i32,
}

impl Default for ArchetypeConfig {
    fn default() -> Self {
        let signal = |archetype, rule, points| ArchetypeSignal {
            archetype,
            rule,
            points,
        };
        ArchetypeConfig {
            threshold: 2,
            signals: vec![
                signal(Archetype::Tokens, TextRule::all(&["create", "token"]), 3),
                signal(Archetype::Tokens, TextRule::all(&["populate"]), 2),
                signal(
                    Archetype::Control,
                    TextRule::any(&["counter target spell", "counter spell", "return target"]),
                    2,
                ),
                signal(Archetype::Control, TextRule::all(&["draw a card"]), 1),
                signal(
                    Archetype::Voltron,
                    TextRule::any(&["double strike", "hexproof", "indestructible", "equip"]),
                    2,
                ),
                signal(Archetype::Voltron, TextRule::any(&["aura", "equipment"]), 2),
                signal(Archetype::Aristocrats, TextRule::all(&["sacrifice"]), 3),
                signal(Archetype::Aristocrats, TextRule::any(&["dies"]), 2),
                signal(Archetype::Graveyard, TextRule::all(&["graveyard"]), 2),
                signal(Archetype::Graveyard, TextRule::all(&["exile", "return"]), 1),
                signal(
                    Archetype::Spellslinger,
                    TextRule {
                        all_of: strings(&["whenever you cast"]),
                        any_of: strings(&["instant", "sorcery"]),
                    },
                    3,
                ),
                signal(Archetype::Spellslinger, TextRule::all(&["copy", "spell"]), 2),
                signal(
                    Archetype::Combo,
                    TextRule::any(&["untap", "extra turn", "storm", "cascade"]),
                    2,
                ),
                signal(
                    Archetype::Ramp,
                    TextRule {
                        all_of: strings(&["land"]),
                        any_of: strings(&["search", "additional", "play"]),
                    },
                    2,
                ),
                signal(Archetype::Ramp, TextRule::all(&["add {"]), 2),
            ],
            tribal_points: 2,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TribeRule {
    pub tribe: String,
    #[serde(default)]
    pub plural: Option<String>,
    pub type_name: String,
    pub creature_count: usize,
}

impl TribeRule {
    pub fn plural_form(&self) -> String {
        self.plural
            .clone()
            .unwrap_or_else(|| format!("{}s", self.tribe))
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ThemeOverlay {
    pub theme: String,
    pub lands_required: Option<usize>,
    pub min_instants_sorceries: Option<usize>,
    pub min_artifacts: Option<usize>,
    pub min_enchantments: Option<usize>,
    pub graveyard_matters: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Targets {
    pub lands: usize,
    pub creatures: usize,
    pub spells: usize,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct StrategyConfig {
    pub default_targets: Targets,
    pub spell_focus_phrases: Vec<String>,
    pub spell_focus_targets: Targets,
    pub spell_focus_min_instants_sorceries: usize,
    pub creature_keywords: Vec<String>,
    pub creature_keyword_threshold: usize,
    pub creature_keyword_phrase: String,
    pub tribes: Vec<TribeRule>,
    /// Non-leader card count the tribal spell target is derived from.
    pub tribal_deck_size: usize,
    pub themes: Vec<ThemeOverlay>,
}

impl Default for StrategyConfig {
    fn default() -> Self {
        let tribe = |name: &str, plural: Option<&str>, count| TribeRule {
            tribe: name.to_string(),
            plural: plural.map(str::to_string),
            type_name: name.to_string(),
            creature_count: count,
        };
        StrategyConfig {
            default_targets: Targets {
                lands: 36,
                creatures: 25,
                spells: 38,
            },
            spell_focus_phrases: strings(&[
                "whenever you cast",
                "instant or sorcery",
                "noncreature spell",
                "copy target spell",
                "prowess",
                "magecraft",
            ]),
            spell_focus_targets: Targets {
                lands: 36,
                creatures: 15,
                spells: 48,
            },
            spell_focus_min_instants_sorceries: 30,
            creature_keywords: strings(&[
                "flying",
                "first strike",
                "double strike",
                "deathtouch",
                "lifelink",
                "trample",
                "vigilance",
                "haste",
                "protection",
                "hexproof",
            ]),
            creature_keyword_threshold: 2,
            creature_keyword_phrase: "creatures you control".to_string(),
            tribes: vec![
                tribe("dragon", None, 33),
                tribe("zombie", None, 35),
                tribe("elf", Some("elves"), 33),
                tribe("goblin", None, 35),
                tribe("dinosaur", None, 32),
                tribe("vampire", None, 33),
                tribe("wizard", None, 30),
                tribe("warrior", None, 33),
            ],
            tribal_deck_size: 99,
            themes: vec![
                ThemeOverlay {
                    theme: "control".to_string(),
                    lands_required: Some(38),
                    min_instants_sorceries: Some(20),
                    ..Default::default()
                },
                ThemeOverlay {
                    theme: "voltron".to_string(),
                    lands_required: Some(34),
                    min_artifacts: Some(15),
                    ..Default::default()
                },
                ThemeOverlay {
                    theme: "tokens".to_string(),
                    min_enchantments: Some(10),
                    ..Default::default()
                },
                ThemeOverlay {
                    theme: "graveyard".to_string(),
                    graveyard_matters: true,
                    ..Default::default()
                },
            ],
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LeaderInteraction {
    pub leader_phrase: String,
    pub card_phrase: String,
    pub points: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ArchetypeFit {
    pub archetype: Archetype,
    #[serde(default)]
    pub types: TextRule,
    #[serde(default)]
    pub text: TextRule,
    pub points: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SynergyConfig {
    /// Keyword vocabulary with base weights.
    pub keyword_weights: BTreeMap<String, f64>,
    pub color_bonus: f64,
    pub shared_keyword_bonus: f64,
    pub interactions: Vec<LeaderInteraction>,
    pub leader_cap: f64,
    pub inter_deck_bonus: f64,
    pub leader_keyword_multiplier: f64,
    pub theme_keyword_multiplier: f64,
    pub archetype_fit: Vec<ArchetypeFit>,
}

impl Default for SynergyConfig {
    fn default() -> Self {
        let weights = [
            ("ramp", 10.0),
            ("draw", 8.0),
            ("removal", 7.0),
            ("lifelink", 4.0),
            ("trample", 4.0),
            ("haste", 3.0),
            ("counter", 6.0),
            ("combo", 8.0),
            ("token", 5.0),
            ("discard", 4.0),
            ("aggressive", 5.0),
            ("defensive", 5.0),
            ("control", 7.0),
            ("mill", 4.0),
            ("sacrifice", 3.0),
            ("reanimation", 7.0),
            ("search", 6.0),
            ("fetch", 5.0),
        ];
        let interaction = |leader: &str, card: &str, points| LeaderInteraction {
            leader_phrase: leader.to_string(),
            card_phrase: card.to_string(),
            points,
        };
        let fit = |archetype, types, text, points| ArchetypeFit {
            archetype,
            types,
            text,
            points,
        };
        SynergyConfig {
            keyword_weights: weights
                .iter()
                .map(|(k, w)| (k.to_string(), *w))
                .collect(),
            color_bonus: 50.0,
            shared_keyword_bonus: 10.0,
            interactions: vec![
                interaction("copy spell", "copy", 30.0),
                interaction("tax", "opponent", 25.0),
                interaction("extra turn", "extra turn", 40.0),
            ],
            leader_cap: 100.0,
            inter_deck_bonus: 3.0,
            leader_keyword_multiplier: 1.5,
            theme_keyword_multiplier: 1.5,
            archetype_fit: vec![
                fit(
                    Archetype::Voltron,
                    TextRule::any(&["equipment", "aura"]),
                    TextRule::default(),
                    20.0,
                ),
                fit(
                    Archetype::Control,
                    TextRule::default(),
                    TextRule::any(&["counter", "draw"]),
                    15.0,
                ),
                fit(
                    Archetype::Combo,
                    TextRule::default(),
                    TextRule::any(&["infinite", "extra turn", "storm"]),
                    25.0,
                ),
                fit(
                    Archetype::Tokens,
                    TextRule::default(),
                    TextRule::all(&["create", "token"]),
                    30.0,
                ),
                fit(
                    Archetype::Graveyard,
                    TextRule::default(),
                    TextRule::any(&["sacrifice", "reanimate"]),
                    20.0,
                ),
                fit(
                    Archetype::Ramp,
                    TextRule::any(&["land"]),
                    TextRule::all(&["add {"]),
                    15.0,
                ),
                fit(
                    Archetype::Aristocrats,
                    TextRule::default(),
                    TextRule::any(&["sacrifice", "dies"]),
                    20.0,
                ),
                fit(
                    Archetype::Spellslinger,
                    TextRule::any(&["instant", "sorcery"]),
                    TextRule::default(),
                    20.0,
                ),
                fit(
                    Archetype::Tribal,
                    TextRule::any(&["creature"]),
                    TextRule::default(),
                    15.0,
                ),
            ],
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CurveConfig {
    pub aggressive_markers: Vec<String>,
    pub aggressive_ceiling: f64,
    pub slow_markers: Vec<String>,
    pub slow_ceiling: f64,
    pub default_ceiling: f64,
    pub penalty_per_point: f64,
    pub ramp_relief_per_card: f64,
    pub max_ramp_relief: f64,
    pub low_average: f64,
    pub low_average_scale: f64,
    pub high_average: f64,
    pub high_average_scale: f64,
}

impl Default for CurveConfig {
    fn default() -> Self {
        CurveConfig {
            aggressive_markers: strings(&["aggro", "fast"]),
            aggressive_ceiling: 3.0,
            slow_markers: strings(&["control", "ramp"]),
            slow_ceiling: 5.0,
            default_ceiling: 4.0,
            penalty_per_point: 10.0,
            ramp_relief_per_card: 0.1,
            max_ramp_relief: 0.8,
            low_average: 3.0,
            low_average_scale: 1.2,
            high_average: 4.0,
            high_average_scale: 0.8,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PhraseBonus {
    pub phrase: String,
    pub points: i32,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LeaderLandBonus {
    pub leader_phrase: String,
    pub land_any: Vec<String>,
    pub points: i32,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LandConfig {
    pub keyword_bonuses: Vec<PhraseBonus>,
    pub archetype_bonuses: BTreeMap<Archetype, Vec<PhraseBonus>>,
    pub leader_bonuses: Vec<LeaderLandBonus>,
    pub tapped_phrases: Vec<String>,
    pub tapped_high_value_threshold: i32,
    pub tapped_penalty_high_value: i32,
    pub tapped_soft_phrases: Vec<String>,
    pub tapped_penalty_soft: i32,
    pub tapped_penalty_plain: i32,
    pub legendary_gate: i32,
    pub legendary_bonus: i32,
    pub mono_color_phrases: Vec<String>,
    pub mono_color_bonus: i32,
    /// Effects that make an off-color land worth playing in a mono-color deck.
    pub mono_utility_effects: Vec<String>,
    pub fetch_phrase: String,
    pub hybrid_pip_weight: f64,
}

impl Default for LandConfig {
    fn default() -> Self {
        let bonuses = |items: &[(&str, i32)]| {
            items
                .iter()
                .map(|(p, v)| PhraseBonus {
                    phrase: p.to_string(),
                    points: *v,
                })
                .collect::<Vec<_>>()
        };
        let archetype_bonuses = BTreeMap::from([
            (
                Archetype::Voltron,
                bonuses(&[
                    ("equipment", 20),
                    ("equip", 20),
                    ("commander", 15),
                    ("double strike", 20),
                ]),
            ),
            (
                Archetype::Control,
                bonuses(&[("draw", 20), ("scry", 15), ("counter", 18)]),
            ),
            (
                Archetype::Tokens,
                bonuses(&[("creature token", 18), ("populate", 15)]),
            ),
            (
                Archetype::Graveyard,
                bonuses(&[("graveyard", 20), ("exile from graveyard", -10)]),
            ),
            (
                Archetype::Spellslinger,
                bonuses(&[("copy", 20), ("instant", 15), ("sorcery", 15)]),
            ),
        ]);
        LandConfig {
            keyword_bonuses: bonuses(&[
                ("indestructible", 15),
                ("haste", 15),
                ("flying", 12),
                ("unblockable", 20),
                ("can't be blocked", 20),
                ("double strike", 18),
                ("from graveyard to", 15),
                ("draw a card", 15),
            ]),
            archetype_bonuses,
            leader_bonuses: vec![
                LeaderLandBonus {
                    leader_phrase: "creature".to_string(),
                    land_any: strings(&["haste", "double strike", "unblockable"]),
                    points: 15,
                },
                LeaderLandBonus {
                    leader_phrase: "spell".to_string(),
                    land_any: strings(&["copy"]),
                    points: 15,
                },
            ],
            tapped_phrases: strings(&["enters the battlefield tapped", "enters tapped"]),
            tapped_high_value_threshold: 25,
            tapped_penalty_high_value: 10,
            tapped_soft_phrases: strings(&["scry", "gain life", "draw"]),
            tapped_penalty_soft: 15,
            tapped_penalty_plain: 30,
            legendary_gate: 15,
            legendary_bonus: 10,
            mono_color_phrases: strings(&["scry", "draw", "indestructible"]),
            mono_color_bonus: 10,
            mono_utility_effects: strings(&[
                "draw a card",
                "scry",
                "search your library",
                "exile",
                "destroy target",
            ]),
            fetch_phrase: "search your library for".to_string(),
            hybrid_pip_weight: 0.5,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WeightedPhrase {
    pub phrase: String,
    pub points: f64,
}

fn weighted(items: &[(&str, f64)]) -> Vec<WeightedPhrase> {
    items
        .iter()
        .map(|(phrase, points)| WeightedPhrase {
            phrase: phrase.to_string(),
            points: *points,
        })
        .collect()
}

/// Bonus for a `+N/` or `/+N` stat boost.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StatBoost {
    pub amount: u32,
    pub points: f64,
}

/// Penalty for an equip cost of at least `min_cost`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EquipCostPenalty {
    pub min_cost: u32,
    pub points: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EquipmentConfig {
    /// Keywords an equipment or aura grants, with their value.
    pub keywords: Vec<WeightedPhrase>,
    pub multi_keyword_bonus: f64,
    pub voltron_multiplier: f64,
    /// Checked in order; only the first boost found counts.
    pub stat_boosts: Vec<StatBoost>,
    /// Checked in order; only the first matching penalty applies.
    pub equip_costs: Vec<EquipCostPenalty>,
}

impl Default for EquipmentConfig {
    fn default() -> Self {
        let boost = |amount, points| StatBoost { amount, points };
        let penalty = |min_cost, points| EquipCostPenalty { min_cost, points };
        EquipmentConfig {
            keywords: weighted(&[
                ("double strike", 25.0),
                ("lifelink", 20.0),
                ("flying", 15.0),
                ("first strike", 15.0),
                ("vigilance", 15.0),
                ("trample", 15.0),
                ("hexproof", 25.0),
                ("indestructible", 25.0),
                ("protection", 20.0),
                ("haste", 15.0),
            ]),
            multi_keyword_bonus: 15.0,
            voltron_multiplier: 1.5,
            stat_boosts: vec![boost(2, 10.0), boost(3, 15.0), boost(4, 20.0)],
            equip_costs: vec![penalty(4, 15.0), penalty(3, 10.0)],
        }
    }
}

/// Ranking points a card earns from the detected strategy.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct StrategyFitConfig {
    pub spell_type_bonus: f64,
    pub spell_copy_bonus: f64,
    pub spell_synergy: Vec<WeightedPhrase>,
    pub creature_keyword_bonus: f64,
    pub tribal_bonus: f64,
    pub graveyard_bonus: f64,
    pub control_phrases: Vec<String>,
    pub control_bonus: f64,
    pub equipment: EquipmentConfig,
}

impl Default for StrategyFitConfig {
    fn default() -> Self {
        StrategyFitConfig {
            spell_type_bonus: 20.0,
            spell_copy_bonus: 15.0,
            spell_synergy: weighted(&[
                ("prowess", 15.0),
                ("magecraft", 20.0),
                ("copy target spell", 25.0),
                ("whenever you cast", 20.0),
                ("instant or sorcery", 15.0),
                ("flashback", 15.0),
                ("retrace", 15.0),
                ("jump-start", 15.0),
            ]),
            creature_keyword_bonus: 15.0,
            tribal_bonus: 25.0,
            graveyard_bonus: 20.0,
            control_phrases: strings(&["counter target", "destroy target", "exile target"]),
            control_bonus: 15.0,
            equipment: EquipmentConfig::default(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PartnerConfig {
    pub tribal_bonus: u32,
    pub mechanics: Vec<String>,
    pub mechanic_bonus: u32,
    /// One partner makes what the other consumes.
    pub producer_phrase: String,
    pub consumer_phrase: String,
    pub complement_bonus: u32,
    pub shared_color_bonus: u32,
    pub synergy_cap: u32,
    /// Phrases that mark a partner as the strategic driver, per occurrence.
    pub strategy_phrases: Vec<PhraseBonus>,
    pub cheaper_bonus: i32,
}

impl Default for PartnerConfig {
    fn default() -> Self {
        PartnerConfig {
            tribal_bonus: 20,
            mechanics: strings(&["sacrifice", "token", "counter", "draw", "combat"]),
            mechanic_bonus: 15,
            producer_phrase: "create".to_string(),
            consumer_phrase: "sacrifice".to_string(),
            complement_bonus: 25,
            shared_color_bonus: 10,
            synergy_cap: 100,
            strategy_phrases: [
                ("whenever", 3),
                ("at the beginning of", 2),
                ("at end of", 2),
                ("you may", 1),
                ("create", 2),
                ("draw", 2),
                ("sacrifice", 2),
                ("counter", 2),
                ("combat", 2),
            ]
            .iter()
            .map(|(phrase, points)| PhraseBonus {
                phrase: phrase.to_string(),
                points: *points,
            })
            .collect(),
            cheaper_bonus: 1,
        }
    }
}

/// A named effect family the finished deck should contain a minimum of.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EffectRequirement {
    pub name: String,
    pub min_count: usize,
    /// Regular expressions matched case-insensitively against oracle text.
    pub patterns: Vec<String>,
}

impl EffectRequirement {
    pub fn matcher(&self) -> Result<RegexSet, ConfigError> {
        RegexSet::new(self.patterns.iter().map(|p| format!("(?i){}", p))).map_err(|source| {
            ConfigError::InvalidPattern {
                requirement: self.name.clone(),
                source,
            }
        })
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DeckConfig {
    pub format: String,
    pub leader_deck_size: usize,
    pub default_deck_size: usize,
    pub default_lands: usize,
    pub default_creatures: usize,
}

impl Default for DeckConfig {
    fn default() -> Self {
        DeckConfig {
            format: "commander".to_string(),
            leader_deck_size: 99,
            default_deck_size: 60,
            default_lands: 24,
            default_creatures: 20,
        }
    }
}

/// Every tunable table and threshold the builder consults.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct BuilderConfig {
    pub deck: DeckConfig,
    pub archetype: ArchetypeConfig,
    pub strategy: StrategyConfig,
    pub synergy: SynergyConfig,
    pub curve: CurveConfig,
    pub lands: LandConfig,
    pub strategy_fit: StrategyFitConfig,
    pub partner: PartnerConfig,
    pub requirements: Vec<EffectRequirement>,
}

impl Default for BuilderConfig {
    fn default() -> Self {
        BuilderConfig {
            deck: DeckConfig::default(),
            archetype: ArchetypeConfig::default(),
            strategy: StrategyConfig::default(),
            synergy: SynergyConfig::default(),
            curve: CurveConfig::default(),
            lands: LandConfig::default(),
            strategy_fit: StrategyFitConfig::default(),
            partner: PartnerConfig::default(),
            requirements: vec![
                EffectRequirement {
                    name: "ramp".to_string(),
                    min_count: 8,
                    patterns: strings(&[
                        r"search your library for .*(plains|island|swamp|mountain|forest)",
                        r"search.*for a basic land",
                        r"land.*onto the battlefield",
                        r"add \{[wubrgc]\}",
                        r"add one mana of any color",
                        r"you may put a.*land.*onto the battlefield",
                    ]),
                },
                EffectRequirement {
                    name: "draw".to_string(),
                    min_count: 6,
                    patterns: strings(&[
                        r"draw a card",
                        r"draw (two|three|four|x)? ?cards",
                        r"investigate",
                        r"whenever.*you may draw",
                        r"draw.*for each",
                        r"look at the top.*you may reveal",
                    ]),
                },
            ],
        }
    }
}

impl BuilderConfig {
    pub fn validate(&self) -> Result<(), ConfigError> {
        for requirement in &self.requirements {
            requirement.matcher()?;
        }
        Ok(())
    }

    pub fn requirement(&self, name: &str) -> Option<&EffectRequirement> {
        self.requirements.iter().find(|r| r.name == name)
    }
}

pub fn config_file_path() -> Result<PathBuf, ConfigError> {
    let project_dirs =
        ProjectDirs::from(APP_QUALIFIER, APP_AUTHOR, APP_NAME).ok_or(ConfigError::NoProjectDir)?;
    Ok(project_dirs.config_dir().join(CONFIG_FILE_NAME))
}

pub fn load_config_from_file(path: &Path) -> Result<BuilderConfig, ConfigError> {
    let contents = fs::read_to_string(path).map_err(|source| ConfigError::Read {
        path: path.to_path_buf(),
        source,
    })?;
    let config: BuilderConfig =
        serde_json::from_str(&contents).map_err(|source| ConfigError::Parse {
            path: path.to_path_buf(),
            source,
        })?;
    config.validate()?;

    log_if(&format!("Loaded builder config from {:?}", path), DbgFlg::Loader);
    Ok(config)
}

/// Explicit path wins; otherwise the platform config file if present; otherwise defaults.
pub fn load_config(explicit: Option<&Path>) -> Result<BuilderConfig, ConfigError> {
    if let Some(path) = explicit {
        return load_config_from_file(path);
    }

    match config_file_path() {
        Ok(path) if path.exists() => load_config_from_file(&path),
        _ => Ok(BuilderConfig::default()),
    }
}

pub fn save_config(path: &Path, config: &BuilderConfig) -> Result<(), ConfigError> {
    let write_err = |source| ConfigError::Write {
        path: path.to_path_buf(),
        source,
    };
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent).map_err(write_err)?;
    }
    let content = serde_json::to_string_pretty(config).map_err(|source| ConfigError::Parse {
        path: path.to_path_buf(),
        source,
    })?;
    let mut file = OpenOptions::new()
        .write(true)
        .create(true)
        .truncate(true)
        .open(path)
        .map_err(write_err)?;
    file.write_all(content.as_bytes()).map_err(write_err)
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_text_rule() {
        let rule = TextRule {
            all_of: strings(&["land"]),
            any_of: strings(&["search", "play"]),
        };
        assert!(rule.matches("you may play an additional land"));
        assert!(!rule.matches("search your library for a card"));
        assert!(!TextRule::default().matches("anything"));
    }

    #[test]
    fn test_default_config_is_valid() {
        let config = BuilderConfig::default();
        assert!(config.validate().is_ok());
        assert_eq!(config.requirement("ramp").map(|r| r.min_count), Some(8));
        assert_eq!(config.requirement("draw").map(|r| r.min_count), Some(6));
        assert_eq!(config.synergy.keyword_weights.len(), 18);
    }

    #[test]
    fn test_persistence() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("nested").join(CONFIG_FILE_NAME);

        let mut config = BuilderConfig::default();
        config.requirements[0].min_count = 10;
        save_config(&path, &config).unwrap();

        let loaded = load_config(Some(&path)).unwrap();
        assert_eq!(loaded.requirements, config.requirements);
        assert_eq!(loaded.deck, config.deck);
        assert_eq!(loaded.strategy, config.strategy);
        assert_eq!(loaded.lands.archetype_bonuses, config.lands.archetype_bonuses);
        assert_eq!(loaded.strategy_fit, config.strategy_fit);
        assert_eq!(loaded.partner, config.partner);
    }

    #[test]
    fn test_partial_config_falls_back_to_defaults() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join(CONFIG_FILE_NAME);
        fs::write(&path, r#"{"deck": {"leader_deck_size": 98}}"#).unwrap();

        let loaded = load_config_from_file(&path).unwrap();
        assert_eq!(loaded.deck.leader_deck_size, 98);
        assert_eq!(loaded.deck.format, "commander");
        assert_eq!(loaded.archetype, ArchetypeConfig::default());
        assert_eq!(loaded.partner, PartnerConfig::default());
    }

    #[test]
    fn test_scoring_tables_can_be_overridden() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join(CONFIG_FILE_NAME);
        fs::write(
            &path,
            r#"{"partner": {"mechanics": ["mill"]}, "strategy_fit": {"control_phrases": ["tap target"], "equipment": {"voltron_multiplier": 2.0}}}"#,
        )
        .unwrap();

        let loaded = load_config_from_file(&path).unwrap();
        assert_eq!(loaded.partner.mechanics, vec!["mill"]);
        assert_eq!(loaded.partner.synergy_cap, 100);
        assert_eq!(loaded.strategy_fit.control_phrases, vec!["tap target"]);
        assert_eq!(loaded.strategy_fit.control_bonus, 15.0);
        assert_eq!(loaded.strategy_fit.equipment.voltron_multiplier, 2.0);
        assert_eq!(loaded.strategy_fit.equipment.keywords.len(), 10);
    }

    #[test]
    fn test_invalid_pattern_is_rejected() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join(CONFIG_FILE_NAME);
        fs::write(
            &path,
            r#"{"requirements": [{"name": "ramp", "min_count": 8, "patterns": ["add {("]}]}"#,
        )
        .unwrap();

        match load_config_from_file(&path) {
            Err(ConfigError::InvalidPattern { requirement, .. }) => assert_eq!(requirement, "ramp"),
            other => panic!("unexpected result: {:?}", other),
        }
    }

    #[test]
    fn test_missing_file_is_a_read_error() {
        let dir = TempDir::new().unwrap();
        let result = load_config(Some(&dir.path().join("absent.json")));
        assert!(matches!(result, Err(ConfigError::Read { .. })));
    }
}

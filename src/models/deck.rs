use std::fmt::{self, Display, Formatter};

use serde::{Deserialize, Serialize};

use crate::builder::partner::PartnerSynergy;
use crate::builder::synergy::KeywordWeights;
use crate::models::card::{Card, Color, ColorSet};
use crate::models::strategy::Strategy;

/// Thematic goal supplied by the caller, e.g. from a free-text deck description.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ThemeInfo {
    pub theme: Option<String>,
    pub keywords: Vec<String>,
}

impl ThemeInfo {
    pub fn new(theme: Option<&str>, goal: Option<&str>) -> Self {
        ThemeInfo {
            theme: theme.map(|t| t.trim().to_lowercase()).filter(|t| !t.is_empty()),
            keywords: goal
                .map(|g| g.split_whitespace().map(|w| w.to_lowercase()).collect())
                .unwrap_or_default(),
        }
    }

    pub fn theme_is(&self, tag: &str) -> bool {
        self.theme.as_deref() == Some(tag)
    }

    pub fn has_keyword(&self, keyword: &str) -> bool {
        self.keywords.iter().any(|k| k == keyword)
    }
}

/// Inputs of one build call. Everything except the pool is optional.
#[derive(Debug, Clone, Default)]
pub struct BuildRequest {
    pub leader: Option<Card>,
    pub co_leader: Option<Card>,
    pub deck_size: Option<usize>,
    pub lands_required: Option<usize>,
    pub creatures_required: Option<usize>,
    pub spells_required: Option<usize>,
    pub keyword_weights: Option<KeywordWeights>,
    pub theme: Option<ThemeInfo>,
}

impl BuildRequest {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn leader(mut self, leader: Card) -> Self {
        self.leader = Some(leader);
        self
    }

    pub fn co_leader(mut self, co_leader: Card) -> Self {
        self.co_leader = Some(co_leader);
        self
    }

    pub fn deck_size(mut self, size: usize) -> Self {
        self.deck_size = Some(size);
        self
    }

    pub fn lands(mut self, count: usize) -> Self {
        self.lands_required = Some(count);
        self
    }

    pub fn creatures(mut self, count: usize) -> Self {
        self.creatures_required = Some(count);
        self
    }

    pub fn spells(mut self, count: usize) -> Self {
        self.spells_required = Some(count);
        self
    }

    pub fn keyword_weights(mut self, weights: KeywordWeights) -> Self {
        self.keyword_weights = Some(weights);
        self
    }

    pub fn theme(mut self, theme: ThemeInfo) -> Self {
        self.theme = Some(theme);
        self
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum SkipReason {
    MissingLegality { format: String },
    NotLegal { format: String },
    ColorIdentity { card: ColorSet, allowed: ColorSet },
    OffColorBasic { color: Color, allowed: ColorSet },
}

impl Display for SkipReason {
    fn fmt(&self, f: &mut Formatter) -> fmt::Result {
        match self {
            SkipReason::MissingLegality { format } => {
                write!(f, "Missing legality data for {}", format)
            }
            SkipReason::NotLegal { format } => write!(f, "Not legal in {}", format),
            SkipReason::ColorIdentity { card, allowed } => write!(
                f,
                "Color identity {} not compatible with commander colors {}",
                card, allowed
            ),
            SkipReason::OffColorBasic { color, allowed } => {
                write!(f, "Basic land of color {} outside {}", color, allowed)
            }
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SkipRecord {
    pub name: String,
    pub reason: SkipReason,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BackfillEvent {
    pub requirement: String,
    pub card: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BucketShortfall {
    pub bucket: String,
    pub target: usize,
    pub placed: usize,
}

/// Everything a build produced. `cards` excludes the leaders.
#[derive(Debug, Clone, Serialize)]
pub struct BuildReport {
    pub leader: Option<String>,
    pub co_leader: Option<String>,
    pub target_size: usize,
    pub allowed_colors: ColorSet,
    pub strategy: Strategy,
    pub cards: Vec<Card>,
    pub skipped: Vec<SkipRecord>,
    pub backfilled: Vec<BackfillEvent>,
    pub shortfalls: Vec<BucketShortfall>,
    pub warnings: Vec<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub partner: Option<PartnerSynergy>,
}

impl BuildReport {
    pub fn cards(&self) -> &[Card] {
        &self.cards
    }

    pub fn is_complete(&self) -> bool {
        self.cards.len() == self.target_size
    }

    pub fn count_where<P: Fn(&Card) -> bool>(&self, pred: P) -> usize {
        self.cards.iter().filter(|c| pred(c)).count()
    }

    pub fn decklist(&self) -> String {
        let mut lines = Vec::new();
        if let Some(leader) = &self.leader {
            lines.push(format!("Commander: 1x {}", leader));
        }
        if let Some(co_leader) = &self.co_leader {
            lines.push(format!("Commander: 1x {}", co_leader));
        }
        lines.extend(self.cards.iter().map(|c| c.to_string()));
        lines.join("\n")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_theme_info_from_goal() {
        let theme = ThemeInfo::new(Some(" Control "), Some("Lifelink tokens  DRAW"));
        assert!(theme.theme_is("control"));
        assert_eq!(theme.keywords, vec!["lifelink", "tokens", "draw"]);
        assert!(theme.has_keyword("draw"));

        let empty = ThemeInfo::new(Some(""), None);
        assert_eq!(empty.theme, None);
        assert!(empty.keywords.is_empty());
    }

    #[test]
    fn test_skip_reason_text() {
        let reason = SkipReason::ColorIdentity {
            card: ColorSet::parse_symbols("UB"),
            allowed: ColorSet::parse_symbols("W"),
        };
        assert_eq!(
            reason.to_string(),
            "Color identity {U, B} not compatible with commander colors {W}"
        );
    }
}

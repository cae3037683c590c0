use std::collections::BTreeMap;
use std::fmt::{self, Display, Formatter};
use std::str::FromStr;

use serde::de::{self, SeqAccess, Visitor};
use serde::ser::SerializeSeq;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use strum::IntoEnumIterator;
use strum_macros::{EnumIter, EnumString};

/// Separator between the faces of a double-faced or split card name.
pub const FACE_SEPARATOR: &str = " // ";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, EnumString, EnumIter)]
#[strum(ascii_case_insensitive)]
pub enum Color {
    #[strum(serialize = "W")]
    White,
    #[strum(serialize = "U")]
    Blue,
    #[strum(serialize = "B")]
    Black,
    #[strum(serialize = "R")]
    Red,
    #[strum(serialize = "G")]
    Green,
}

impl Color {
    pub fn symbol(self) -> char {
        match self {
            Color::White => 'W',
            Color::Blue => 'U',
            Color::Black => 'B',
            Color::Red => 'R',
            Color::Green => 'G',
        }
    }

    pub fn from_symbol(c: char) -> Option<Color> {
        match c.to_ascii_uppercase() {
            'W' => Some(Color::White),
            'U' => Some(Color::Blue),
            'B' => Some(Color::Black),
            'R' => Some(Color::Red),
            'G' => Some(Color::Green),
            _ => None,
        }
    }

    pub fn basic_land_name(self) -> &'static str {
        match self {
            Color::White => "Plains",
            Color::Blue => "Island",
            Color::Black => "Swamp",
            Color::Red => "Mountain",
            Color::Green => "Forest",
        }
    }

    pub fn from_basic_land_name(name: &str) -> Option<Color> {
        Color::iter().find(|c| c.basic_land_name().eq_ignore_ascii_case(name))
    }

    fn bit(self) -> u8 {
        1 << (self as u8)
    }
}

impl Display for Color {
    fn fmt(&self, f: &mut Formatter) -> fmt::Result {
        write!(f, "{}", self.symbol())
    }
}

/// A set of colors, always iterated in WUBRG order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct ColorSet(u8);

impl ColorSet {
    pub fn empty() -> Self {
        ColorSet(0)
    }

    pub fn all() -> Self {
        Color::iter().collect()
    }

    pub fn insert(&mut self, color: Color) {
        self.0 |= color.bit();
    }

    pub fn contains(&self, color: Color) -> bool {
        self.0 & color.bit() != 0
    }

    pub fn is_subset(&self, other: &ColorSet) -> bool {
        self.0 & !other.0 == 0
    }

    pub fn intersects(&self, other: &ColorSet) -> bool {
        self.0 & other.0 != 0
    }

    pub fn union(&self, other: &ColorSet) -> ColorSet {
        ColorSet(self.0 | other.0)
    }

    pub fn intersection(&self, other: &ColorSet) -> ColorSet {
        ColorSet(self.0 & other.0)
    }

    pub fn len(&self) -> usize {
        self.0.count_ones() as usize
    }

    pub fn is_empty(&self) -> bool {
        self.0 == 0
    }

    pub fn iter(&self) -> impl Iterator<Item = Color> + '_ {
        Color::iter().filter(move |c| self.contains(*c))
    }

    /// Parses every color symbol found in `s`, e.g. `"{W}{U/B}"` or `"WU"`.
    pub fn parse_symbols(s: &str) -> ColorSet {
        s.chars().filter_map(Color::from_symbol).collect()
    }
}

impl FromIterator<Color> for ColorSet {
    fn from_iter<I: IntoIterator<Item = Color>>(iter: I) -> Self {
        let mut set = ColorSet::empty();
        for color in iter {
            set.insert(color);
        }
        set
    }
}

impl Serialize for Color {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.serialize_str(&self.to_string())
    }
}

impl<'de> Deserialize<'de> for Color {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let symbol = String::deserialize(deserializer)?;
        Color::from_str(symbol.trim())
            .map_err(|_| de::Error::custom(format!("unknown color symbol {:?}", symbol)))
    }
}

impl Display for ColorSet {
    fn fmt(&self, f: &mut Formatter) -> fmt::Result {
        let symbols = self.iter().map(|c| c.to_string()).collect::<Vec<_>>();
        write!(f, "{{{}}}", symbols.join(", "))
    }
}

impl Serialize for ColorSet {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        let mut seq = serializer.serialize_seq(Some(self.len()))?;
        for color in self.iter() {
            seq.serialize_element(&color.to_string())?;
        }
        seq.end()
    }
}

struct ColorSetVisitor;

impl<'de> Visitor<'de> for ColorSetVisitor {
    type Value = ColorSet;

    fn expecting(&self, formatter: &mut Formatter) -> fmt::Result {
        formatter.write_str("a list of color letters or a mana symbol string")
    }

    fn visit_str<E>(self, v: &str) -> Result<Self::Value, E>
    where
        E: de::Error,
    {
        Ok(ColorSet::parse_symbols(v))
    }

    fn visit_unit<E>(self) -> Result<Self::Value, E>
    where
        E: de::Error,
    {
        Ok(ColorSet::empty())
    }

    fn visit_seq<A>(self, mut seq: A) -> Result<Self::Value, A::Error>
    where
        A: SeqAccess<'de>,
    {
        let mut set = ColorSet::empty();
        while let Some(symbol) = seq.next_element::<String>()? {
            if let Ok(color) = Color::from_str(symbol.trim()) {
                set.insert(color);
            }
        }
        Ok(set)
    }
}

impl<'de> Deserialize<'de> for ColorSet {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        deserializer.deserialize_any(ColorSetVisitor)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Legality {
    Legal,
    NotLegal,
    /// The card record carries no legality data at all.
    Unknown,
}

#[derive(Debug, Deserialize)]
struct RawFace {
    #[serde(default)]
    type_line: Option<String>,
    #[serde(default)]
    oracle_text: Option<String>,
}

#[derive(Debug, Deserialize)]
struct RawCard {
    name: String,
    #[serde(default)]
    type_line: Option<String>,
    #[serde(default)]
    oracle_text: Option<String>,
    #[serde(default, alias = "mana_value")]
    cmc: Option<f64>,
    #[serde(default)]
    mana_cost: Option<String>,
    #[serde(default)]
    colors: Option<ColorSet>,
    #[serde(default)]
    color_identity: Option<ColorSet>,
    #[serde(default)]
    legalities: Option<BTreeMap<String, String>>,
    #[serde(default)]
    power: Option<String>,
    #[serde(default)]
    toughness: Option<String>,
    #[serde(default)]
    loyalty: Option<String>,
    #[serde(default)]
    card_faces: Vec<RawFace>,
}

impl From<RawCard> for Card {
    fn from(raw: RawCard) -> Self {
        let join_faces = |pick: fn(&RawFace) -> Option<&String>| {
            raw.card_faces
                .iter()
                .filter_map(pick)
                .cloned()
                .collect::<Vec<_>>()
                .join(FACE_SEPARATOR)
        };

        let type_line = raw
            .type_line
            .clone()
            .unwrap_or_else(|| join_faces(|f| f.type_line.as_ref()));
        let oracle_text = raw
            .oracle_text
            .clone()
            .unwrap_or_else(|| join_faces(|f| f.oracle_text.as_ref()));

        let mut card = Card::new(&raw.name, &type_line, &oracle_text)
            .with_mana_value(raw.cmc.unwrap_or(0.0))
            .with_colors(raw.colors.unwrap_or_default())
            .with_identity(raw.color_identity.unwrap_or_default());
        card.mana_cost = raw.mana_cost.unwrap_or_default();
        card.legalities = raw.legalities;
        card.power = raw.power;
        card.toughness = raw.toughness;
        card.loyalty = raw.loyalty;
        card
    }
}

/// A normalized card record. Text fields are never absent and their
/// lower-cased forms are computed once on construction.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(from = "RawCard")]
pub struct Card {
    name: String,
    type_line: String,
    oracle_text: String,
    #[serde(rename = "cmc")]
    mana_value: f64,
    mana_cost: String,
    colors: ColorSet,
    color_identity: ColorSet,
    #[serde(skip_serializing_if = "Option::is_none")]
    legalities: Option<BTreeMap<String, String>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    power: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    toughness: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    loyalty: Option<String>,
    #[serde(skip)]
    text: String,
    #[serde(skip)]
    types: String,
}

impl Card {
    pub fn new(name: &str, type_line: &str, oracle_text: &str) -> Self {
        Card {
            name: name.to_string(),
            type_line: type_line.to_string(),
            oracle_text: oracle_text.to_string(),
            mana_value: 0.0,
            mana_cost: String::new(),
            colors: ColorSet::empty(),
            color_identity: ColorSet::empty(),
            legalities: None,
            power: None,
            toughness: None,
            loyalty: None,
            text: oracle_text.to_lowercase(),
            types: type_line.to_lowercase(),
        }
    }

    pub fn with_mana_value(mut self, mana_value: f64) -> Self {
        self.mana_value = if mana_value.is_finite() {
            mana_value.max(0.0)
        } else {
            0.0
        };
        self
    }

    pub fn with_mana_cost(mut self, mana_cost: &str) -> Self {
        self.mana_cost = mana_cost.to_string();
        self
    }

    pub fn with_colors(mut self, colors: ColorSet) -> Self {
        self.colors = colors;
        self
    }

    pub fn with_identity(mut self, identity: ColorSet) -> Self {
        self.color_identity = identity;
        self
    }

    pub fn with_legality(mut self, format: &str, status: &str) -> Self {
        self.legalities
            .get_or_insert_with(BTreeMap::new)
            .insert(format.to_string(), status.to_string());
        self
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn type_line(&self) -> &str {
        &self.type_line
    }

    pub fn oracle_text(&self) -> &str {
        &self.oracle_text
    }

    /// Lower-cased oracle text.
    pub fn text(&self) -> &str {
        &self.text
    }

    /// Lower-cased type line.
    pub fn types(&self) -> &str {
        &self.types
    }

    /// Lower-cased type line of the front face only.
    pub fn front_types(&self) -> &str {
        self.types.split(FACE_SEPARATOR).next().unwrap_or_default()
    }

    pub fn mana_value(&self) -> f64 {
        self.mana_value
    }

    pub fn mana_cost(&self) -> &str {
        &self.mana_cost
    }

    pub fn colors(&self) -> &ColorSet {
        &self.colors
    }

    pub fn color_identity(&self) -> &ColorSet {
        &self.color_identity
    }

    pub fn power(&self) -> Option<&str> {
        self.power.as_deref()
    }

    pub fn toughness(&self) -> Option<&str> {
        self.toughness.as_deref()
    }

    pub fn loyalty(&self) -> Option<&str> {
        self.loyalty.as_deref()
    }

    pub fn has_legalities(&self) -> bool {
        self.legalities.is_some()
    }

    pub fn legality(&self, format: &str) -> Legality {
        match &self.legalities {
            None => Legality::Unknown,
            Some(map) => match map.get(format) {
                Some(status) if status.eq_ignore_ascii_case("legal") => Legality::Legal,
                _ => Legality::NotLegal,
            },
        }
    }

    /// Lower-cased name of the front face, the key used by the singleton rule.
    pub fn front_face_name(&self) -> String {
        self.name
            .split(FACE_SEPARATOR)
            .next()
            .unwrap_or_default()
            .trim()
            .to_lowercase()
    }

    pub fn basic_land_color(&self) -> Option<Color> {
        Color::from_basic_land_name(&self.front_face_name())
    }

    pub fn is_basic_land(&self) -> bool {
        self.basic_land_color().is_some()
    }

    pub fn is_land(&self) -> bool {
        self.front_types().contains("land")
    }

    pub fn is_legendary_creature(&self) -> bool {
        self.types.contains("legendary") && self.types.contains("creature")
    }
}

impl Display for Card {
    fn fmt(&self, f: &mut Formatter) -> fmt::Result {
        write!(f, "1x {}", self.name)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_color_set_subset() {
        let wu = ColorSet::parse_symbols("{W}{U}");
        let w = ColorSet::parse_symbols("W");
        assert!(w.is_subset(&wu));
        assert!(!wu.is_subset(&w));
        assert!(ColorSet::empty().is_subset(&w));
        assert_eq!(wu.len(), 2);
        assert_eq!(wu.to_string(), "{W, U}");
    }

    #[test]
    fn test_color_serializes_as_symbol() {
        assert_eq!(serde_json::to_string(&Color::Blue).unwrap(), r#""U""#);
        assert_eq!(serde_json::from_str::<Color>(r#""g""#).unwrap(), Color::Green);
        assert!(serde_json::from_str::<Color>(r#""X""#).is_err());

        let shares = BTreeMap::from([(Color::White, 0.25), (Color::Red, 0.75)]);
        let json = serde_json::to_string(&shares).unwrap();
        assert_eq!(json, r#"{"W":0.25,"R":0.75}"#);
        let back: BTreeMap<Color, f64> = serde_json::from_str(&json).unwrap();
        assert_eq!(back, shares);
    }

    #[test]
    fn test_deserialize_card_with_nulls() {
        let json = r#"{
            "name": "Sol Ring",
            "type_line": "Artifact",
            "oracle_text": null,
            "cmc": 1.0,
            "colors": [],
            "color_identity": [],
            "legalities": {"commander": "legal", "standard": "not_legal"}
        }"#;
        let card: Card = serde_json::from_str(json).unwrap();
        assert_eq!(card.oracle_text(), "");
        assert_eq!(card.legality("commander"), Legality::Legal);
        assert_eq!(card.legality("standard"), Legality::NotLegal);
        assert_eq!(card.legality("vintage"), Legality::NotLegal);
    }

    #[test]
    fn test_deserialize_card_faces() {
        let json = r#"{
            "name": "Emeria's Call // Emeria, Shattered Skyclave",
            "cmc": 7,
            "color_identity": "{W}",
            "card_faces": [
                {"type_line": "Sorcery", "oracle_text": "Create two 4/4 white Angel Warrior creature tokens with flying."},
                {"type_line": "Land", "oracle_text": "{T}: Add {W}."}
            ]
        }"#;
        let card: Card = serde_json::from_str(json).unwrap();
        assert_eq!(card.type_line(), "Sorcery // Land");
        assert_eq!(card.front_types(), "sorcery");
        assert!(!card.is_land());
        assert!(card.text().contains("add {w}"));
        assert_eq!(card.front_face_name(), "emeria's call");
        assert_eq!(card.legality("commander"), Legality::Unknown);
        assert!(card.color_identity().contains(Color::White));
    }

    #[test]
    fn test_basic_land_detection() {
        let island = Card::new("Island", "Basic Land — Island", "({T}: Add {U}.)");
        assert!(island.is_basic_land());
        assert_eq!(island.basic_land_color(), Some(Color::Blue));

        let dual = Card::new("Hallowed Fountain", "Land — Plains Island", "");
        assert!(!dual.is_basic_land());
        assert!(dual.is_land());
    }

    #[test]
    fn test_serialize_roundtrip_keeps_lowercase_cache() {
        let card = Card::new("Rhystic Study", "Enchantment", "Whenever an opponent casts a spell, you may draw a card unless that player pays {1}.")
            .with_identity(ColorSet::parse_symbols("U"))
            .with_legality("commander", "legal");
        let json = serde_json::to_string(&card).unwrap();
        let back: Card = serde_json::from_str(&json).unwrap();
        assert_eq!(back, card);
        assert!(back.text().contains("draw a card"));
    }
}

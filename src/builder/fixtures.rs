use crate::models::card::{Card, Color, ColorSet};

fn legal(card: Card) -> Card {
    card.with_legality("commander", "legal")
}

pub fn legend(name: &str, colors: &str, text: &str) -> Card {
    let colors = ColorSet::parse_symbols(colors);
    legal(
        Card::new(name, "Legendary Creature — Human", text)
            .with_mana_value(4.0)
            .with_colors(colors)
            .with_identity(colors),
    )
}

pub fn creature(name: &str, colors: &str, mana_value: f64, text: &str) -> Card {
    spell(name, "Creature — Beast", colors, mana_value, text)
}

pub fn spell(name: &str, type_line: &str, colors: &str, mana_value: f64, text: &str) -> Card {
    let colors = ColorSet::parse_symbols(colors);
    legal(
        Card::new(name, type_line, text)
            .with_mana_value(mana_value)
            .with_colors(colors)
            .with_identity(colors),
    )
}

pub fn land(name: &str, identity: &str, text: &str) -> Card {
    legal(Card::new(name, "Land", text).with_identity(ColorSet::parse_symbols(identity)))
}

pub fn basic(color: Color) -> Card {
    legal(
        Card::new(
            color.basic_land_name(),
            &format!("Basic Land — {}", color.basic_land_name()),
            &format!("({{T}}: Add {{{}}}.)", color),
        )
        .with_identity(ColorSet::from_iter([color])),
    )
}

/// `count` vanilla creatures named `<prefix> N`.
pub fn creatures(prefix: &str, colors: &str, count: usize) -> Vec<Card> {
    (0..count)
        .map(|i| creature(&format!("{} {}", prefix, i), colors, 2.0, ""))
        .collect()
}

/// `count` vanilla sorceries named `<prefix> N`.
pub fn sorceries(prefix: &str, colors: &str, count: usize) -> Vec<Card> {
    (0..count)
        .map(|i| spell(&format!("{} {}", prefix, i), "Sorcery", colors, 3.0, ""))
        .collect()
}

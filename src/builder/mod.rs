pub mod archetype;
pub mod assembler;
pub mod backfill;
pub mod categorize;
pub mod curve;
pub mod lands;
pub mod partner;
pub mod strategy;
pub mod synergy;
pub mod validate;

#[cfg(test)]
mod fixtures;

pub use archetype::detect_archetype;
pub use assembler::build_deck;
pub use categorize::{categorize_cards, Bucket, CategorizedPool};
pub use partner::{check_partner_compatibility, PartnerCheck};
pub use strategy::analyze_strategy;
pub use validate::{is_valid_card_for_deck, Validation};

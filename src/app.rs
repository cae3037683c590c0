pub mod card_loader;
pub mod card_matcher;

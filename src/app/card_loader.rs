use std::collections::HashMap;
use std::fs::File;
use std::io::{self, BufRead, BufReader};
use std::path::{Path, PathBuf};

use lazy_static::lazy_static;
use regex::Regex;
use thiserror::Error;

use crate::models::card::Card;
use crate::opt::*;

lazy_static! {
    static ref CARD_LINE: Regex = Regex::new(r"^\s*(?:(\d+)x\s+)?([^(*]+)").unwrap();
}

#[derive(Debug, Error)]
pub enum LoadError {
    #[error("failed to read {path}: {source}")]
    Read { path: PathBuf, source: io::Error },
    #[error("failed to parse card data in {path}: {source}")]
    Parse {
        path: PathBuf,
        source: serde_json::Error,
    },
}

/// One line of a card list.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ListEntry {
    pub name: String,
    pub count: usize,
}

pub fn load_card_data(path: &Path) -> Result<Vec<Card>, LoadError> {
    let card_data = std::fs::read_to_string(path).map_err(|source| LoadError::Read {
        path: path.to_path_buf(),
        source,
    })?;
    let cards: Vec<Card> = serde_json::from_str(&card_data).map_err(|source| LoadError::Parse {
        path: path.to_path_buf(),
        source,
    })?;

    log_if(
        &format!("Loaded {} cards from {}", cards.len(), path.display()),
        DbgFlg::Loader,
    );
    Ok(cards)
}

/// Card database keyed by lower-cased name. The first record of a name wins.
pub fn load_card_hashmap_by_name(path: &Path) -> Result<HashMap<String, Card>, LoadError> {
    let mut card_hashmap = HashMap::new();
    for card in load_card_data(path)? {
        card_hashmap
            .entry(card.name().to_lowercase())
            .or_insert(card);
    }
    Ok(card_hashmap)
}

/// Parses `"2x Card Name (SET) 123"` or a bare `"Card Name"`.
pub fn parse_card_line(line: &str) -> Option<ListEntry> {
    let line = line.trim();
    if line.is_empty() {
        return None;
    }

    let entry = match CARD_LINE.captures(line) {
        Some(caps) => ListEntry {
            name: caps.get(2).map_or("", |m| m.as_str()).trim().to_string(),
            count: caps
                .get(1)
                .and_then(|m| m.as_str().parse().ok())
                .unwrap_or(1),
        },
        None => ListEntry {
            name: line.to_string(),
            count: 1,
        },
    };

    (!entry.name.is_empty()).then_some(entry)
}

pub fn read_card_list(path: &Path) -> Result<Vec<ListEntry>, LoadError> {
    let file = File::open(path).map_err(|source| LoadError::Read {
        path: path.to_path_buf(),
        source,
    })?;
    let reader = BufReader::new(file);

    let mut entries = Vec::new();
    for line in reader.lines() {
        let line = line.map_err(|source| LoadError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        entries.extend(parse_card_line(&line));
    }

    log_if(
        &format!("Read {} list entries from {}", entries.len(), path.display()),
        DbgFlg::Loader,
    );
    Ok(entries)
}

#[cfg(test)]
mod tests {
    use std::io::Write;

    use super::*;
    use tempfile::NamedTempFile;

    #[test]
    fn test_parse_card_line() {
        assert_eq!(
            parse_card_line("2x Lightning Bolt (M10) 146"),
            Some(ListEntry {
                name: "Lightning Bolt".to_string(),
                count: 2
            })
        );
        assert_eq!(
            parse_card_line("  Sol Ring  "),
            Some(ListEntry {
                name: "Sol Ring".to_string(),
                count: 1
            })
        );
        assert_eq!(
            parse_card_line("1x Delver of Secrets // Insectile Aberration *F*"),
            Some(ListEntry {
                name: "Delver of Secrets // Insectile Aberration".to_string(),
                count: 1
            })
        );
        assert_eq!(parse_card_line("   "), None);
    }

    #[test]
    fn test_load_card_data() {
        let mut file = NamedTempFile::new().unwrap();
        write!(
            file,
            r#"[
                {{"name": "Sol Ring", "type_line": "Artifact", "oracle_text": "{{T}}: Add {{C}}{{C}}.", "cmc": 1,
                  "colors": [], "color_identity": [], "legalities": {{"commander": "legal"}}}},
                {{"name": "Forest", "type_line": "Basic Land — Forest", "color_identity": ["G"]}}
            ]"#
        )
        .unwrap();

        let cards = load_card_hashmap_by_name(file.path()).unwrap();
        assert_eq!(cards.len(), 2);
        assert_eq!(cards["sol ring"].mana_value(), 1.0);
        assert!(cards["forest"].is_basic_land());
        assert_eq!(cards["forest"].oracle_text(), "");
    }

    #[test]
    fn test_load_errors() {
        let missing = Path::new("/definitely/not/here.json");
        assert!(matches!(load_card_data(missing), Err(LoadError::Read { .. })));

        let mut file = NamedTempFile::new().unwrap();
        write!(file, "not json").unwrap();
        assert!(matches!(load_card_data(file.path()), Err(LoadError::Parse { .. })));
    }

    #[test]
    fn test_read_card_list() {
        let mut file = NamedTempFile::new().unwrap();
        writeln!(file, "1x Sol Ring (C21) 263").unwrap();
        writeln!(file).unwrap();
        writeln!(file, "30x Forest").unwrap();
        let entries = read_card_list(file.path()).unwrap();
        assert_eq!(entries.len(), 2);
        assert_eq!(entries[1].count, 30);
    }
}

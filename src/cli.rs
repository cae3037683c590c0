use std::collections::HashMap;
use std::io::{stdout, Write};
use std::path::PathBuf;

use clap::{value_parser, Arg, ArgAction, ArgMatches, Command};

use deck_smith::app::card_loader::{load_card_hashmap_by_name, read_card_list};
use deck_smith::app::card_matcher::{resolve_list, resolve_name};
use deck_smith::builder::partner::{analyze_partner_synergy, is_valid_leader};
use deck_smith::builder::{analyze_strategy, build_deck, categorize_cards, check_partner_compatibility, detect_archetype};
use deck_smith::config::{config_file_path, load_config, save_config, BuilderConfig};
use deck_smith::models::card::Card;
use deck_smith::models::deck::{BuildRequest, ThemeInfo};
use deck_smith::opt::*;

pub fn main() -> Res<()> {
    let matches = cli().get_matches();
    match matches.subcommand() {
        Some(("build", matches)) => build(matches),
        Some(("partner", matches)) => partner(matches),
        Some(("archetype", matches)) => archetype(matches),
        Some(("config-path", matches)) => config_path(matches),
        _ => unreachable!("subcommand required"),
    }
}

fn cli() -> Command {
    let cards_arg = Arg::new("cards")
        .long("cards")
        .required(true)
        .value_name("FILE")
        .value_parser(value_parser!(PathBuf))
        .help("JSON card database");
    let config_arg = Arg::new("config")
        .long("config")
        .value_name("FILE")
        .value_parser(value_parser!(PathBuf))
        .help("Builder configuration, defaults to the platform config file");

    Command::new("deck-smith")
        .about("Builds singleton decks around a commander from a card pool")
        .subcommand_required(true)
        .arg_required_else_help(true)
        .subcommand(
            Command::new("build")
                .about("Build a deck from a card list")
                .arg(cards_arg.clone())
                .arg(
                    Arg::new("list")
                        .long("list")
                        .required(true)
                        .value_name("FILE")
                        .value_parser(value_parser!(PathBuf))
                        .help("Card list, one \"2x Card Name\" entry per line"),
                )
                .arg(Arg::new("commander").long("commander").value_name("NAME"))
                .arg(Arg::new("partner").long("partner").value_name("NAME").requires("commander"))
                .arg(Arg::new("theme").long("theme").value_name("THEME"))
                .arg(Arg::new("goal").long("goal").value_name("WORDS"))
                .arg(
                    Arg::new("size")
                        .long("size")
                        .value_name("N")
                        .value_parser(value_parser!(usize))
                        .help("Deck size when no commander is given"),
                )
                .arg(config_arg.clone())
                .arg(
                    Arg::new("json")
                        .long("json")
                        .action(ArgAction::SetTrue)
                        .help("Print the full build report as JSON"),
                ),
        )
        .subcommand(
            Command::new("partner")
                .about("Check whether two commanders can partner")
                .arg(cards_arg.clone())
                .arg(Arg::new("first").required(true).value_name("NAME"))
                .arg(Arg::new("second").required(true).value_name("NAME"))
                .arg(config_arg.clone()),
        )
        .subcommand(
            Command::new("archetype")
                .about("Show the archetype and strategy detected for a commander")
                .arg(cards_arg)
                .arg(Arg::new("name").required(true).value_name("NAME"))
                .arg(Arg::new("theme").long("theme").value_name("THEME"))
                .arg(config_arg),
        )
        .subcommand(
            Command::new("config-path")
                .about("Print the configuration file location")
                .arg(
                    Arg::new("init")
                        .long("init")
                        .action(ArgAction::SetTrue)
                        .help("Write the default configuration there if none exists"),
                ),
        )
}

fn load_db(matches: &ArgMatches) -> Res<HashMap<String, Card>> {
    let path = matches
        .get_one::<PathBuf>("cards")
        .ok_or("error: --cards is required")?;
    load_card_hashmap_by_name(path).err_to_str()
}

fn lookup<'a>(db: &'a HashMap<String, Card>, name: &str) -> Res<&'a Card> {
    resolve_name(name, db).ok_or_else(|| format!("Card '{}' not found", name))
}

fn lookup_leader<'a>(db: &'a HashMap<String, Card>, name: &str) -> Res<&'a Card> {
    let card = lookup(db, name)?;
    if !is_valid_leader(card) {
        return Err(format!("{} is not a legendary creature", card.name()));
    }
    Ok(card)
}

fn theme_arg(matches: &ArgMatches, with_goal: bool) -> Option<ThemeInfo> {
    let theme = matches.get_one::<String>("theme").map(String::as_str);
    let goal = if with_goal {
        matches.get_one::<String>("goal").map(String::as_str)
    } else {
        None
    };
    (theme.is_some() || goal.is_some()).then(|| ThemeInfo::new(theme, goal))
}

fn load_builder_config(matches: &ArgMatches) -> Res<BuilderConfig> {
    load_config(matches.get_one::<PathBuf>("config").map(PathBuf::as_path)).err_to_str()
}

fn build(matches: &ArgMatches) -> Res<()> {
    let db = load_db(matches)?;
    let config = load_builder_config(matches)?;
    let list = matches
        .get_one::<PathBuf>("list")
        .ok_or("error: --list is required")?;

    let mut request = BuildRequest::new();
    if let Some(name) = matches.get_one::<String>("commander") {
        request = request.leader(lookup_leader(&db, name)?.clone());
    }
    if let Some(name) = matches.get_one::<String>("partner") {
        let co_leader = lookup_leader(&db, name)?;
        if let Some(leader) = &request.leader {
            let check = check_partner_compatibility(leader, co_leader);
            if !check.compatible {
                return Err(format!("Invalid partner: {}", check.reason));
            }
        }
        request = request.co_leader(co_leader.clone());
    }
    if let Some(size) = matches.get_one::<usize>("size") {
        request = request.deck_size(*size);
    }
    if let Some(theme) = theme_arg(matches, true) {
        request = request.theme(theme);
    }

    let (cards, unresolved) = resolve_list(&read_card_list(list).err_to_str()?, &db);
    for name in &unresolved {
        warn(&format!("Card '{}' not found in the card database", name));
    }
    if cards.is_empty() {
        return Err("No cards from the list were found".to_string());
    }

    let report = build_deck(&categorize_cards(cards), &request, &config);

    let mut out = stdout();
    if matches.get_flag("json") {
        writeln!(out, "{}", serde_json::to_string_pretty(&report).err_to_str()?).err_to_str()?;
    } else {
        writeln!(out, "{}", report.decklist()).err_to_str()?;
        for warning in &report.warnings {
            writeln!(out, "# warning: {}", warning).err_to_str()?;
        }
    }
    out.flush().err_to_str()
}

fn partner(matches: &ArgMatches) -> Res<()> {
    let db = load_db(matches)?;
    let config = load_builder_config(matches)?;
    let first = lookup(&db, matches.get_one::<String>("first").ok_or("error: missing name")?)?;
    let second = lookup(&db, matches.get_one::<String>("second").ok_or("error: missing name")?)?;

    let check = check_partner_compatibility(first, second);
    let mut out = stdout();
    writeln!(out, "{}", check.reason).err_to_str()?;
    if check.compatible {
        let synergy = analyze_partner_synergy(first, second, &config.partner);
        writeln!(out, "Synergy score: {}/100", synergy.score).err_to_str()?;
        writeln!(out, "Combined colors: {}", synergy.combined_colors).err_to_str()?;
        for note in &synergy.notes {
            writeln!(out, "- {}", note).err_to_str()?;
        }
    }
    out.flush().err_to_str()
}

fn archetype(matches: &ArgMatches) -> Res<()> {
    let db = load_db(matches)?;
    let config = load_builder_config(matches)?;
    let leader = lookup(&db, matches.get_one::<String>("name").ok_or("error: missing name")?)?;
    let theme = theme_arg(matches, false);

    let archetype = detect_archetype(Some(leader), &config.archetype);
    let strategy = analyze_strategy(Some(leader), theme.as_ref(), &config);

    let mut out = stdout();
    writeln!(out, "Archetype: {}", archetype).err_to_str()?;
    writeln!(out, "{}", serde_json::to_string_pretty(&strategy).err_to_str()?).err_to_str()?;
    out.flush().err_to_str()
}

fn config_path(matches: &ArgMatches) -> Res<()> {
    let path = config_file_path().err_to_str()?;
    if matches.get_flag("init") && !path.exists() {
        save_config(&path, &BuilderConfig::default()).err_to_str()?;
    }
    writeln!(stdout(), "{}", path.display()).err_to_str()
}

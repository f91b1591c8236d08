//! notestream — dump the events a music string produces, as YAML.

use std::path::PathBuf;

use clap::Parser as _;

use notestream::dictionary::parse_definition;
use notestream::{Environment, EventLog, Parser, ParserConfig};

/// Parse a music string and print every event it fires
#[derive(clap::Parser)]
#[command(name = "notestream")]
#[command(version)]
struct Cli {
    /// The pattern, e.g. "T120 V0 I[PIANO] C5q E5q G5h"
    pattern: String,

    /// Configuration file (default: ~/.notestream/parser.yaml if present)
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Add a dictionary entry, e.g. -D FAST=T160 or -D HALF=0.5
    #[arg(short = 'D', long = "define", value_name = "NAME=VALUE")]
    defines: Vec<String>,

    /// Start from an empty dictionary instead of the standard names
    #[arg(long)]
    no_standard_dictionary: bool,
}

fn main() {
    let cli = Cli::parse();

    let mut config = match &cli.config {
        Some(path) => match ParserConfig::load_from(path) {
            Ok(config) => config,
            Err(e) => {
                eprintln!("{e}");
                std::process::exit(1);
            }
        },
        None => ParserConfig::load().unwrap_or_default(),
    };
    if cli.no_standard_dictionary {
        config.standard_dictionary = false;
    }

    let mut env = Environment::from_config(&config);
    for define in &cli.defines {
        let parsed = define
            .split_once('=')
            .and_then(|(name, value)| Some((name, parse_definition(value)?)));
        match parsed {
            Some((name, (value, role))) if !name.is_empty() => {
                env.define_with_role(name, value, role)
            }
            _ => {
                eprintln!("invalid definition '{define}', expected NAME=VALUE");
                std::process::exit(2);
            }
        }
    }

    let log = EventLog::new();
    env.add_listener(log.clone());
    let result = Parser::parse(&mut env, &cli.pattern);

    match serde_yaml::to_string(&log.events()) {
        Ok(yaml) => print!("{yaml}"),
        Err(e) => eprintln!("cannot serialize events: {e}"),
    }
    if let Err(e) = result {
        eprintln!("error: {e}");
        std::process::exit(1);
    }
}

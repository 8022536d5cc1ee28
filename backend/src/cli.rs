use clap::{ArgAction, Parser, Subcommand};
use std::str::FromStr;
use thiserror::Error;

#[derive(Debug, Parser)]
#[command(name = "bounty")]
#[command(version)]
#[command(about = "Scan game data and track shop inventories from the terminal")]
#[command(long_about = "Talks to a running tracker server: streams game data scans, \
    lists and edits tracked items, and syncs profiles from save files.\n\n\
    Examples:\n  \
    bounty scan 3 --language eng            # Scan game 3 in English\n  \
    bounty tracked 3 1                      # Tracked items of profile 1\n  \
    bounty set-count 3 1 12:4=5 12:4=6      # Quantity edits, last one wins")]
pub struct Cli {
  #[command(subcommand)]
  pub command: Command,

  /// Server to talk to; overrides `server_url` from the config file
  #[arg(long, global = true)]
  pub server: Option<String>,

  /// Increase log verbosity (-v debug, -vv trace)
  #[arg(short = 'v', long, action = ArgAction::Count, global = true)]
  pub verbose: u8,
}

#[derive(Debug, Subcommand)]
pub enum Command {
  /// Run a game data scan and follow its progress
  Scan {
    game: u64,

    /// Language of the game data to extract
    #[arg(short, long, default_value = "")]
    language: String,

    /// Start over this many times when a scan fails
    #[arg(long, default_value_t = 0)]
    retries: u32,
  },

  /// List games known to the server
  Games,

  /// List profiles of a game
  Profiles { game: u64 },

  /// Shops grouped by location
  Shops { game: u64 },

  /// Items tracked by a profile
  Tracked { game: u64, profile: u64 },

  /// Set tracked quantities, written as ITEM:SHOP=COUNT
  SetCount {
    game: u64,
    profile: u64,
    #[arg(required = true)]
    edits: Vec<QuantityEdit>,
  },

  /// Start tracking an item at a shop
  AddShop {
    game: u64,
    profile: u64,
    item: u64,
    #[arg(long)]
    shop: Option<u64>,
    #[arg(long, default_value_t = 1)]
    count: u32,
  },

  /// Stop tracking an item at a shop
  RemoveShop { game: u64, profile: u64, item: u64, shop: u64 },

  /// Sync a profile's shop inventories from its newest save
  SyncProfile { game: u64, profile: u64 },

  /// List save directories of a game
  Saves { game: u64 },

  /// Extract campaign data from one save directory
  ScanSave { game: u64, save_dir: String },

  /// Inspect the configuration
  Config {
    #[command(subcommand)]
    action: ConfigAction,
  },
}

#[derive(Debug, Subcommand)]
pub enum ConfigAction {
  /// Print the effective configuration
  Show,
  /// Print where the config file lives
  Path,
}

/// One `ITEM:SHOP=COUNT` argument.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct QuantityEdit {
  pub item: u64,
  pub shop: u64,
  pub count: u32,
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("expected ITEM:SHOP=COUNT, got '{0}'")]
pub struct QuantityEditParseError(String);

impl FromStr for QuantityEdit {
  type Err = QuantityEditParseError;

  fn from_str(s: &str) -> Result<Self, Self::Err> {
    let err = || QuantityEditParseError(s.to_string());

    let (key, count) = s.trim().split_once('=').ok_or_else(err)?;
    let (item, shop) = key.split_once(':').ok_or_else(err)?;

    Ok(QuantityEdit {
      item: item.trim().parse().map_err(|_| err())?,
      shop: shop.trim().parse().map_err(|_| err())?,
      count: count.trim().parse().map_err(|_| err())?,
    })
  }
}

#[cfg(test)]
mod tests {
  use super::*;
  use clap::CommandFactory;

  #[test]
  fn cli_definition_is_consistent() {
    Cli::command().debug_assert();
  }

  #[test]
  fn parses_quantity_edit() {
    let edit: QuantityEdit = "12:4=7".parse().unwrap();
    assert_eq!(edit, QuantityEdit { item: 12, shop: 4, count: 7 });
  }

  #[test]
  fn rejects_malformed_quantity_edits() {
    for raw in ["12:4", "12=7", "a:4=7", "12:4=-1", ""] {
      assert!(raw.parse::<QuantityEdit>().is_err(), "{raw} should not parse");
    }

    let err = "12=7".parse::<QuantityEdit>().unwrap_err();
    assert_eq!(err.to_string(), "expected ITEM:SHOP=COUNT, got '12=7'");
    let _: &dyn std::error::Error = &err;
  }

  #[test]
  fn scan_language_defaults_to_blank() {
    let cli = Cli::try_parse_from(["bounty", "scan", "3"]).unwrap();
    match cli.command {
      Command::Scan { game, language, retries } => {
        assert_eq!(game, 3);
        assert!(language.is_empty());
        assert_eq!(retries, 0);
      }
      other => panic!("unexpected {other:?}"),
    }
  }

  #[test]
  fn server_flag_is_global() {
    let cli = Cli::try_parse_from(["bounty", "games", "--server", "http://h:1"]).unwrap();
    assert_eq!(cli.server.as_deref(), Some("http://h:1"));
  }
}

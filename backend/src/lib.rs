pub mod cli;
mod commands;
mod config;
mod infrastructure;

use anyhow::Context;
use bounty_api::HttpCatalog;
use bounty_config::{ClientConfig, TomlConfigBackend};
use bounty_core::domain::{GameId, ProfileId};
use bounty_core::services::TrackingService;

use crate::cli::{Cli, Command, ConfigAction};
use crate::config::{ConfigView, Settings};
use infrastructure::logging;

/// Entry point of the `bounty` binary: loads configuration, starts logging
/// and runs one command.
pub async fn run(cli: Cli) -> anyhow::Result<()> {
  // --- Wiring ---

  // 1. Configuration. First run writes the defaults to disk.
  let backend = TomlConfigBackend::detect().context("locating config directory")?;
  let client_config = ClientConfig::load_from(&backend).context("loading client config")?;

  // 2. CLI flags over file values.
  let settings = Settings::resolve(&client_config, cli.server.as_deref())?;

  // 3. Logging, now that the filter is known.
  logging::init(&settings.log_filter, cli.verbose);
  log::debug!("using server {} (config: {:?})", settings.server, backend.paths().config_file());

  // 4. Collaborator client, shared by the lookup and tracking commands.
  let catalog = HttpCatalog::new(settings.server.clone());
  let tracking = |game: u64, profile: u64| {
    TrackingService::new(catalog.clone(), GameId(game), ProfileId(profile))
  };

  match cli.command {
    Command::Scan { game, language, retries } => {
      commands::scan(&settings, game, language, retries).await
    }
    Command::Games => commands::games(&catalog).await,
    Command::Profiles { game } => commands::profiles(&catalog, game).await,
    Command::Shops { game } => commands::shops(&catalog, game).await,
    Command::Saves { game } => commands::saves(&catalog, game).await,
    Command::ScanSave { game, save_dir } => commands::scan_save(&catalog, game, &save_dir).await,
    Command::Tracked { game, profile } => commands::tracked(&tracking(game, profile)).await,
    Command::SetCount { game, profile, edits } => {
      commands::set_count(tracking(game, profile), &settings, edits).await
    }
    Command::AddShop { game, profile, item, shop, count } => {
      commands::add_shop(&tracking(game, profile), item, shop, count).await
    }
    Command::RemoveShop { game, profile, item, shop } => {
      commands::remove_shop(&tracking(game, profile), item, shop).await
    }
    Command::SyncProfile { game, profile } => {
      commands::sync_profile(&tracking(game, profile)).await
    }
    Command::Config { action } => {
      let file = backend.paths().config_file();
      match action {
        ConfigAction::Path => println!("{}", file.display()),
        ConfigAction::Show => {
          let view = ConfigView { file: file.display().to_string(), client: &client_config };
          println!("{}", serde_json::to_string_pretty(&view)?);
        }
      }
      Ok(())
    }
  }
}

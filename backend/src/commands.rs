use anyhow::{Context, bail};
use bounty_api::{HttpCatalog, QuantityDebouncer};
use bounty_core::domain::tracking::{SaveDirectories, ShopGroup, TrackedItem};
use bounty_core::domain::{GameId, ItemId, ScanParameters, ScanPhase, ShopId};
use bounty_core::ports::{CatalogApi, ScanRenderer};
use bounty_core::services::{
  EditReport, ScanController, Toast, ToastLevel, TrackingService, run_session,
};
use bounty_core::CoreError;
use bounty_stream::SseChannel;
use colored::Colorize;
use log::{info, warn};
use std::fmt::Write as _;
use std::sync::Arc;
use tokio::sync::mpsc;

use crate::cli::QuantityEdit;
use crate::config::Settings;
use crate::infrastructure::reporter::TerminalReporter;

// -------- Scan --------

/// Runs one scan session, starting over up to `retries` times on failure.
pub async fn scan(
  settings: &Settings,
  game: u64,
  language: String,
  retries: u32,
) -> anyhow::Result<()> {
  let language = language.trim().to_string();
  if !language.is_empty() && !settings.languages.iter().any(|l| *l == language) {
    warn!("language '{language}' is not one of the configured languages {:?}", settings.languages);
  }

  let channel = SseChannel::new(settings.server.clone());
  let kinds = settings.resource_kinds.clone();
  let mut controller = ScanController::new(channel, TerminalReporter::stdout(), kinds);

  controller.start_scan(ScanParameters::new(GameId(game), language)).context("scan not started")?;
  let mut phase = run_session(&mut controller).await;

  let mut attempt = 0;
  while phase == ScanPhase::Failed && attempt < retries {
    attempt += 1;
    info!("retrying scan of game {game} ({attempt}/{retries})");
    controller.retry().context("scan not restarted")?;
    phase = run_session(&mut controller).await;
  }

  match phase {
    ScanPhase::Completed => Ok(()),
    other => bail!("scan of game {game} ended as {other}"),
  }
}

// -------- Lookups --------

pub async fn games(catalog: &HttpCatalog) -> anyhow::Result<()> {
  for game in catalog.list_games().await? {
    println!("{}\t{}", game.id, game.name);
  }
  Ok(())
}

pub async fn profiles(catalog: &HttpCatalog, game: u64) -> anyhow::Result<()> {
  for profile in catalog.list_profiles(GameId(game)).await? {
    match profile.hero_name {
      Some(hero) => println!("{}\t{}\t{}", profile.id, profile.name, hero),
      None => println!("{}\t{}", profile.id, profile.name),
    }
  }
  Ok(())
}

pub async fn shops(catalog: &HttpCatalog, game: u64) -> anyhow::Result<()> {
  print!("{}", format_shop_groups(&catalog.shops_grouped(GameId(game)).await?));
  Ok(())
}

pub async fn saves(catalog: &HttpCatalog, game: u64) -> anyhow::Result<()> {
  print!("{}", format_saves(&catalog.save_directories(GameId(game)).await?));
  Ok(())
}

pub async fn scan_save(catalog: &HttpCatalog, game: u64, save_dir: &str) -> anyhow::Result<()> {
  let data = catalog.scan_save(GameId(game), save_dir).await?;
  if let Some(name) = &data.full_name {
    println!("{}", name.bold());
  }
  println!("{}", serde_json::to_string_pretty(&data.extra)?);
  Ok(())
}

// -------- Tracking --------

pub async fn tracked(service: &TrackingService<HttpCatalog>) -> anyhow::Result<()> {
  print!("{}", format_tracked(&service.tracked_items().await?));
  Ok(())
}

/// Feeds every edit through the debouncer; repeated edits of one item/shop
/// pair collapse to the last value.
pub async fn set_count(
  service: TrackingService<HttpCatalog>,
  settings: &Settings,
  edits: Vec<QuantityEdit>,
) -> anyhow::Result<()> {
  let service = Arc::new(service);
  let debouncer = QuantityDebouncer::new(settings.debounce);
  let (tx, mut rx) = mpsc::unbounded_channel::<EditReport>();

  let mut handles = Vec::with_capacity(edits.len());
  for edit in edits {
    let service = Arc::clone(&service);
    let tx = tx.clone();
    let (item, shop) = (ItemId(edit.item), ShopId(edit.shop));

    handles.push(debouncer.schedule((item, shop), move || async move {
      let report = service.update_quantity(item, shop, edit.count).await;
      let _ = tx.send(report);
    }));
  }
  drop(tx);

  for handle in handles {
    handle.await.context("quantity edit task failed")?;
  }

  let mut failed = false;
  while let Some(report) = rx.recv().await {
    failed |= report.toast.level == ToastLevel::Error;
    print_report(&report);
  }

  if failed {
    bail!("some quantity updates were rejected");
  }
  Ok(())
}

pub async fn add_shop(
  service: &TrackingService<HttpCatalog>,
  item: u64,
  shop: Option<u64>,
  count: u32,
) -> anyhow::Result<()> {
  let report = service.add_shop(ItemId(item), shop.map(ShopId), count).await;
  print_report(&report);
  ensure_success(&report)
}

pub async fn remove_shop(
  service: &TrackingService<HttpCatalog>,
  item: u64,
  shop: u64,
) -> anyhow::Result<()> {
  let report = service.remove_shop(ItemId(item), ShopId(shop)).await;
  print_report(&report);
  ensure_success(&report)
}

pub async fn sync_profile(service: &TrackingService<HttpCatalog>) -> anyhow::Result<()> {
  match service.sync_profile().await {
    Ok(result) => {
      println!("{}", result.summary().green());
      if let Some(missing) = result.corrupted_data.as_ref().filter(|c| !c.is_empty()) {
        print!("{}", missing.report().yellow());
      }
      Ok(())
    }
    Err(CoreError::Api(e)) => {
      TerminalReporter::stdout().failure(&e.to_failure());
      Err(e).context("profile sync failed")
    }
    Err(e) => Err(e.into()),
  }
}

// -------- Output --------

fn ensure_success(report: &EditReport) -> anyhow::Result<()> {
  match report.toast.level {
    ToastLevel::Success => Ok(()),
    ToastLevel::Error => bail!("{}", report.toast.message),
  }
}

fn print_report(report: &EditReport) {
  println!("{}", format_toast(&report.toast));
  if let Some(items) = &report.refreshed {
    print!("{}", format_tracked(items));
  }
}

pub fn format_toast(toast: &Toast) -> String {
  match toast.level {
    ToastLevel::Success => format!("{} {}", "✓".green(), toast.message),
    ToastLevel::Error => format!("{} {}", "✗".red(), toast.message.red()),
  }
}

pub fn format_tracked(items: &[TrackedItem]) -> String {
  let mut out = String::new();
  if items.is_empty() {
    out.push_str("No tracked items\n");
    return out;
  }

  for tracked in items {
    let item = &tracked.item;
    let _ = writeln!(out, "{} (#{}, {} gold)", item.name.bold(), item.id, item.price);
    for shop in &tracked.tracked_shops {
      let id = shop.shop_id.map(|s| format!("#{s}")).unwrap_or_else(|| "-".to_string());
      let _ = writeln!(out, "  {} / {} ({id}): {}", shop.location_name, shop.shop_name, shop.count);
    }
  }
  out
}

pub fn format_shop_groups(groups: &[ShopGroup]) -> String {
  let mut out = String::new();
  for group in groups {
    let _ = writeln!(out, "{}", group.location.name.bold());
    for shop in &group.shops {
      match shop.hint.as_deref().filter(|h| !h.is_empty()) {
        Some(hint) => {
          let _ = writeln!(out, "  #{} {} ({hint})", shop.id, shop.name);
        }
        None => {
          let _ = writeln!(out, "  #{} {}", shop.id, shop.name);
        }
      }
    }
  }
  out
}

pub fn format_saves(saves: &SaveDirectories) -> String {
  let mut out = String::new();
  for (folder, dirs) in saves {
    let _ = writeln!(out, "{}", folder.bold());
    for dir in dirs {
      let _ = writeln!(out, "  {}", dir.name);
    }
  }
  out
}

//! Payloads of the collaborator HTTP API: games, profiles, tracked items and
//! shops. These are read-mostly views the client renders and edits.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt::Write as _;

use crate::domain::ids::{GameId, ItemId, LocationId, ProfileId, ShopId};

/// Upper bound the server accepts for a tracked quantity.
pub const MAX_SHOP_COUNT: u32 = 99_999;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Game {
  pub id: GameId,
  pub name: String,
  #[serde(default)]
  pub path: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Profile {
  pub id: ProfileId,
  pub name: String,
  #[serde(default)]
  pub hero_name: Option<String>,
  #[serde(default)]
  pub save_dir: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ItemSummary {
  pub id: ItemId,
  pub name: String,
  #[serde(default)]
  pub price: u64,
  #[serde(default)]
  pub hint: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TrackedShop {
  pub shop_id: Option<ShopId>,
  pub shop_name: String,
  pub location_id: Option<LocationId>,
  pub location_name: String,
  pub count: u32,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TrackedItem {
  pub item: ItemSummary,
  pub tracked_shops: Vec<TrackedShop>,
}

impl TrackedItem {
  pub fn count_at(&self, shop: ShopId) -> Option<u32> {
    self.tracked_shops.iter().find(|s| s.shop_id == Some(shop)).map(|s| s.count)
  }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LocationRef {
  pub id: LocationId,
  pub name: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ShopRef {
  pub id: ShopId,
  pub name: String,
  #[serde(default)]
  pub hint: Option<String>,
}

/// Shops of one location, as offered in the "add shop" picker.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ShopGroup {
  pub location: LocationRef,
  pub shops: Vec<ShopRef>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SaveDirectory {
  pub name: String,
  #[serde(default)]
  pub path: Option<String>,
  /// Unix seconds; save directories are named after their timestamp.
  pub timestamp: i64,
}

/// Save directories keyed by game folder name, newest first within a folder.
pub type SaveDirectories = BTreeMap<String, Vec<SaveDirectory>>;

/// Campaign data extracted from one save file.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CampaignData {
  #[serde(default)]
  pub full_name: Option<String>,
  #[serde(flatten)]
  pub extra: BTreeMap<String, serde_json::Value>,
}

/// Objects referenced by a save that the game data does not contain.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct CorruptedData {
  #[serde(default)]
  pub shops: Option<Vec<serde_json::Value>>,
  #[serde(default)]
  pub items: Option<Vec<serde_json::Value>>,
  #[serde(default)]
  pub units: Option<Vec<serde_json::Value>>,
  #[serde(default)]
  pub garrison: Option<Vec<serde_json::Value>>,
}

impl CorruptedData {
  pub fn is_empty(&self) -> bool {
    [&self.shops, &self.items, &self.units, &self.garrison]
      .iter()
      .all(|v| v.as_ref().is_none_or(|v| v.is_empty()))
  }

  /// "Missing objects:" block, one line per non-empty category.
  pub fn report(&self) -> String {
    let mut out = String::from("Missing objects:\n");
    let sections = [
      ("Shops", &self.shops),
      ("Items", &self.items),
      ("Units", &self.units),
      ("Garrison", &self.garrison),
    ];

    for (label, values) in sections {
      if let Some(values) = values.as_ref().filter(|v| !v.is_empty()) {
        let joined = values.iter().map(display_value).collect::<Vec<_>>().join(", ");
        let _ = writeln!(out, "- {label}: {joined}");
      }
    }
    out
  }
}

fn display_value(value: &serde_json::Value) -> String {
  match value {
    serde_json::Value::String(s) => s.clone(),
    other => other.to_string(),
  }
}

/// Result of syncing a profile's save file into the tracker.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProfileSyncResult {
  pub items: u64,
  pub spells: u64,
  pub units: u64,
  pub garrison: u64,
  #[serde(default)]
  pub corrupted_data: Option<CorruptedData>,
}

impl ProfileSyncResult {
  pub fn summary(&self) -> String {
    format!(
      "Successfully synced: {} items, {} spells, {} units, {} garrison units.",
      self.items, self.spells, self.units, self.garrison
    )
  }
}

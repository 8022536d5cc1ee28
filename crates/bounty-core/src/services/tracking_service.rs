use log::{error, info, warn};

use crate::domain::ids::{GameId, ItemId, ProfileId, ShopId};
use crate::domain::tracking::{MAX_SHOP_COUNT, ProfileSyncResult, TrackedItem};
use crate::errors::{CoreError, ValidationError};
use crate::ports::CatalogApi;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ToastLevel {
  Success,
  Error,
}

/// Short-lived notification shown after an edit.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Toast {
  pub level: ToastLevel,
  pub message: String,
}

impl Toast {
  pub fn success(message: impl Into<String>) -> Self {
    Self { level: ToastLevel::Success, message: message.into() }
  }

  pub fn error(message: impl Into<String>) -> Self {
    Self { level: ToastLevel::Error, message: message.into() }
  }
}

/// Outcome of one edit: what to tell the user and, when the local view must
/// be replaced, the server's current list of tracked items.
#[derive(Debug, Clone, PartialEq)]
pub struct EditReport {
  pub toast: Toast,
  pub refreshed: Option<Vec<TrackedItem>>,
}

impl EditReport {
  fn failed(message: impl Into<String>) -> Self {
    Self { toast: Toast::error(message), refreshed: None }
  }
}

/// Tracked-item editing for one profile.
///
/// Edits never fail outright: a rejected mutation becomes an error toast,
/// and a rejected quantity change re-fetches the list so the view drops the
/// value the server refused.
pub struct TrackingService<A>
where
  A: CatalogApi,
{
  api: A,
  game: GameId,
  profile: ProfileId,
}

impl<A> TrackingService<A>
where
  A: CatalogApi,
{
  pub fn new(api: A, game: GameId, profile: ProfileId) -> Self {
    Self { api, game, profile }
  }

  pub fn api(&self) -> &A {
    &self.api
  }

  // -------- QUERY (read) --------

  pub async fn tracked_items(&self) -> Result<Vec<TrackedItem>, CoreError> {
    Ok(self.api.tracked_items(self.game, self.profile).await?)
  }

  // -------- COMMAND (write) --------

  pub async fn update_quantity(&self, item: ItemId, shop: ShopId, count: u32) -> EditReport {
    if count > MAX_SHOP_COUNT {
      let reason = ValidationError::CountOutOfRange { max: MAX_SHOP_COUNT }.to_string();
      return self.rolled_back("Failed to update quantity", &reason).await;
    }

    match self.api.update_shop_count(self.game, self.profile, item, shop, count).await {
      Ok(()) => {
        info!("profile {}: item {item} at shop {shop} set to {count}", self.profile);
        EditReport { toast: Toast::success("Quantity updated"), refreshed: None }
      }
      Err(e) => {
        warn!(
          "profile {}: quantity update for item {item} at shop {shop} failed: {e}",
          self.profile
        );
        self.rolled_back("Failed to update quantity", &e.short_message()).await
      }
    }
  }

  /// Starts tracking `item` at `shop`. A zero count is stored as 1.
  pub async fn add_shop(&self, item: ItemId, shop: Option<ShopId>, count: u32) -> EditReport {
    let Some(shop) = shop else {
      return EditReport::failed(ValidationError::MissingShop.to_string());
    };
    if count > MAX_SHOP_COUNT {
      let msg = ValidationError::CountOutOfRange { max: MAX_SHOP_COUNT }.to_string();
      return EditReport::failed(format!("Failed to add shop: {msg}"));
    }
    let count = count.max(1);

    match self.api.add_shop(self.game, self.profile, item, shop, count).await {
      Ok(()) => EditReport { toast: Toast::success("Shop added"), refreshed: self.refetch().await },
      Err(e) => {
        warn!("profile {}: adding shop {shop} to item {item} failed: {e}", self.profile);
        EditReport::failed(format!("Failed to add shop: {}", e.short_message()))
      }
    }
  }

  pub async fn remove_shop(&self, item: ItemId, shop: ShopId) -> EditReport {
    match self.api.remove_shop(self.game, self.profile, item, shop).await {
      Ok(()) => {
        EditReport { toast: Toast::success("Shop removed"), refreshed: self.refetch().await }
      }
      Err(e) => {
        warn!("profile {}: removing shop {shop} from item {item} failed: {e}", self.profile);
        EditReport::failed(format!("Failed to remove shop: {}", e.short_message()))
      }
    }
  }

  /// Syncs the profile's save file into the tracker.
  pub async fn sync_profile(&self) -> Result<ProfileSyncResult, CoreError> {
    let result = self.api.scan_profile(self.game, self.profile).await?;
    info!("profile {}: {}", self.profile, result.summary());
    Ok(result)
  }

  async fn rolled_back(&self, action: &str, reason: &str) -> EditReport {
    let toast = Toast::error(format!("{action}: {reason}"));
    EditReport { toast, refreshed: self.refetch().await }
  }

  async fn refetch(&self) -> Option<Vec<TrackedItem>> {
    match self.api.tracked_items(self.game, self.profile).await {
      Ok(items) => Some(items),
      Err(e) => {
        error!("profile {}: reloading tracked items failed: {e}", self.profile);
        None
      }
    }
  }
}

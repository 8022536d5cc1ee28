use async_trait::async_trait;

use crate::domain::failure::ScanFailure;
use crate::domain::ids::{GameId, ItemId, ProfileId, ShopId};
use crate::domain::tracking::{
  CampaignData, Game, Profile, ProfileSyncResult, SaveDirectories, ShopGroup, TrackedItem,
};

#[derive(Debug, thiserror::Error)]
pub enum ApiError {
  /// The request never got an HTTP answer.
  #[error("network error: {0}")]
  Network(String),

  /// Non-2xx answer. `failure` is decoded from the body's `detail`.
  #[error("request rejected ({status}): {}", .failure.message)]
  Rejected { status: u16, failure: ScanFailure },

  #[error("unexpected response: {0}")]
  Decode(String),

  #[error("invalid input: {0}")]
  Invalid(String),
}

impl ApiError {
  /// Structured report for the failure renderer.
  pub fn to_failure(&self) -> ScanFailure {
    match self {
      ApiError::Rejected { failure, .. } => failure.clone(),
      ApiError::Network(msg) => ScanFailure::new(msg.clone()).with_error_type("NetworkError"),
      ApiError::Decode(msg) => ScanFailure::new(msg.clone()).with_error_type("DecodeError"),
      ApiError::Invalid(msg) => ScanFailure::new(msg.clone()).with_error_type("ValidationError"),
    }
  }

  /// One-line text for toasts.
  pub fn short_message(&self) -> String {
    match self {
      ApiError::Rejected { failure, .. } => failure.message.clone(),
      other => other.to_string(),
    }
  }
}

/// Request/response surface of the CRUD collaborators.
#[async_trait]
pub trait CatalogApi: Send + Sync {
  async fn list_games(&self) -> Result<Vec<Game>, ApiError>;
  async fn list_profiles(&self, game: GameId) -> Result<Vec<Profile>, ApiError>;
  async fn tracked_items(
    &self,
    game: GameId,
    profile: ProfileId,
  ) -> Result<Vec<TrackedItem>, ApiError>;
  async fn shops_grouped(&self, game: GameId) -> Result<Vec<ShopGroup>, ApiError>;
  async fn save_directories(&self, game: GameId) -> Result<SaveDirectories, ApiError>;

  async fn add_shop(
    &self,
    game: GameId,
    profile: ProfileId,
    item: ItemId,
    shop: ShopId,
    count: u32,
  ) -> Result<(), ApiError>;

  async fn update_shop_count(
    &self,
    game: GameId,
    profile: ProfileId,
    item: ItemId,
    shop: ShopId,
    count: u32,
  ) -> Result<(), ApiError>;

  async fn remove_shop(
    &self,
    game: GameId,
    profile: ProfileId,
    item: ItemId,
    shop: ShopId,
  ) -> Result<(), ApiError>;

  async fn scan_profile(
    &self,
    game: GameId,
    profile: ProfileId,
  ) -> Result<ProfileSyncResult, ApiError>;

  async fn scan_save(&self, game: GameId, save_dir: &str) -> Result<CampaignData, ApiError>;
}

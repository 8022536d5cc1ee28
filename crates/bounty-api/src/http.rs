use async_trait::async_trait;
use bounty_core::domain::failure::{ErrorBody, ScanFailure};
use bounty_core::domain::tracking::{
  CampaignData, Game, Profile, ProfileSyncResult, SaveDirectories, ShopGroup, TrackedItem,
};
use bounty_core::domain::{GameId, ItemId, ProfileId, ShopId};
use bounty_core::ports::{ApiError, CatalogApi};
use reqwest::{RequestBuilder, Response, StatusCode};
use serde::de::DeserializeOwned;
use serde_json::json;
use url::Url;

/// Builds the `ApiError` for a non-2xx answer from its status and raw body.
///
/// Bodies carrying a `detail` (string or structured) keep its diagnostics;
/// anything else falls back to the status line.
pub fn rejection(status: StatusCode, body: &str) -> ApiError {
  let failure = serde_json::from_str::<ErrorBody>(body)
    .ok()
    .and_then(|b| b.detail)
    .map(ScanFailure::from)
    .unwrap_or_else(|| ScanFailure::new(status.to_string()));

  ApiError::Rejected { status: status.as_u16(), failure }
}

/// `CatalogApi` over the server's `/api` routes.
#[derive(Debug, Clone)]
pub struct HttpCatalog {
  client: reqwest::Client,
  server: Url,
}

impl HttpCatalog {
  pub fn new(server: Url) -> Self {
    Self::with_client(server, reqwest::Client::new())
  }

  pub fn with_client(server: Url, client: reqwest::Client) -> Self {
    Self { client, server }
  }

  /// `{server}/api/{segments...}`
  pub fn endpoint<I>(&self, segments: I) -> Result<Url, ApiError>
  where
    I: IntoIterator,
    I::Item: AsRef<str>,
  {
    let mut url = self.server.clone();
    url
      .path_segments_mut()
      .map_err(|_| ApiError::Invalid(format!("{} cannot be a base URL", self.server)))?
      .pop_if_empty()
      .push("api")
      .extend(segments);
    Ok(url)
  }

  fn profile_path(&self, game: GameId, profile: ProfileId, tail: &[&str]) -> Vec<String> {
    let mut segments =
      vec!["games".into(), game.to_string(), "profiles".into(), profile.to_string()];
    segments.extend(tail.iter().map(|s| s.to_string()));
    segments
  }

  fn item_shops(&self, game: GameId, profile: ProfileId, item: ItemId) -> Vec<String> {
    self.profile_path(game, profile, &["items", item.to_string().as_str(), "shops"])
  }

  async fn send(&self, request: RequestBuilder) -> Result<Response, ApiError> {
    let response = request.send().await.map_err(|e| ApiError::Network(e.to_string()))?;
    let status = response.status();

    if status.is_success() {
      return Ok(response);
    }

    let body = response.text().await.unwrap_or_default();
    log::warn!("API request rejected with {status}");
    Err(rejection(status, &body))
  }

  async fn fetch<T: DeserializeOwned>(&self, request: RequestBuilder) -> Result<T, ApiError> {
    let response = self.send(request).await?;
    response.json::<T>().await.map_err(|e| ApiError::Decode(e.to_string()))
  }

  async fn get<T: DeserializeOwned>(&self, url: Url) -> Result<T, ApiError> {
    log::debug!("GET {url}");
    self.fetch(self.client.get(url)).await
  }
}

#[async_trait]
impl CatalogApi for HttpCatalog {
  async fn list_games(&self) -> Result<Vec<Game>, ApiError> {
    self.get(self.endpoint(["games"])?).await
  }

  async fn list_profiles(&self, game: GameId) -> Result<Vec<Profile>, ApiError> {
    self.get(self.endpoint(["games", game.to_string().as_str(), "profiles"])?).await
  }

  async fn tracked_items(
    &self,
    game: GameId,
    profile: ProfileId,
  ) -> Result<Vec<TrackedItem>, ApiError> {
    self.get(self.endpoint(self.profile_path(game, profile, &["tracked"]))?).await
  }

  async fn shops_grouped(&self, game: GameId) -> Result<Vec<ShopGroup>, ApiError> {
    self.get(self.endpoint(["games", game.to_string().as_str(), "shops-grouped"])?).await
  }

  async fn save_directories(&self, game: GameId) -> Result<SaveDirectories, ApiError> {
    self.get(self.endpoint(["games", game.to_string().as_str(), "save-directories"])?).await
  }

  async fn add_shop(
    &self,
    game: GameId,
    profile: ProfileId,
    item: ItemId,
    shop: ShopId,
    count: u32,
  ) -> Result<(), ApiError> {
    let url = self.endpoint(self.item_shops(game, profile, item))?;
    log::debug!("POST {url}");
    self.send(self.client.post(url).json(&json!({ "shop_id": shop, "count": count }))).await?;
    Ok(())
  }

  async fn update_shop_count(
    &self,
    game: GameId,
    profile: ProfileId,
    item: ItemId,
    shop: ShopId,
    count: u32,
  ) -> Result<(), ApiError> {
    let mut segments = self.item_shops(game, profile, item);
    segments.push(shop.to_string());
    let url = self.endpoint(segments)?;
    log::debug!("PATCH {url}");
    self.send(self.client.patch(url).json(&json!({ "count": count }))).await?;
    Ok(())
  }

  async fn remove_shop(
    &self,
    game: GameId,
    profile: ProfileId,
    item: ItemId,
    shop: ShopId,
  ) -> Result<(), ApiError> {
    let mut segments = self.item_shops(game, profile, item);
    segments.push(shop.to_string());
    let url = self.endpoint(segments)?;
    log::debug!("DELETE {url}");
    self.send(self.client.delete(url)).await?;
    Ok(())
  }

  async fn scan_profile(
    &self,
    game: GameId,
    profile: ProfileId,
  ) -> Result<ProfileSyncResult, ApiError> {
    let url = self.endpoint(self.profile_path(game, profile, &["scan"]))?;
    log::debug!("POST {url}");
    self.fetch(self.client.post(url)).await
  }

  async fn scan_save(&self, game: GameId, save_dir: &str) -> Result<CampaignData, ApiError> {
    if save_dir.trim().is_empty() {
      return Err(ApiError::Invalid("save_dir is required".into()));
    }
    let url = self.endpoint(["games", game.to_string().as_str(), "scan-save"])?;
    log::debug!("POST {url}");
    self.fetch(self.client.post(url).json(&json!({ "save_dir": save_dir }))).await
  }
}

#[cfg(test)]
mod tests {
  use super::*;
  use tokio::io::{AsyncReadExt, AsyncWriteExt};
  use tokio::net::TcpListener;
  use tokio::task::JoinHandle;

  fn catalog(server: &str) -> HttpCatalog {
    HttpCatalog::new(Url::parse(server).unwrap())
  }

  /// Answers one request with `status` and a JSON `body`; yields the raw request.
  async fn serve_once(status: &'static str, body: &'static str) -> (String, JoinHandle<String>) {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();

    let handle = tokio::spawn(async move {
      let (mut socket, _) = listener.accept().await.unwrap();
      let request = read_request(&mut socket).await;

      let response = format!(
        "HTTP/1.1 {status}\r\ncontent-type: application/json\r\n\
         content-length: {}\r\nconnection: close\r\n\r\n{body}",
        body.len()
      );
      socket.write_all(response.as_bytes()).await.unwrap();
      request
    });

    (format!("http://{addr}"), handle)
  }

  async fn read_request(socket: &mut tokio::net::TcpStream) -> String {
    let mut raw = Vec::new();
    let mut buf = [0u8; 1024];
    loop {
      let n = socket.read(&mut buf).await.unwrap();
      if n == 0 {
        break;
      }
      raw.extend_from_slice(&buf[..n]);

      let text = String::from_utf8_lossy(&raw).to_string();
      if let Some(end) = text.find("\r\n\r\n") {
        let length = text[..end]
          .lines()
          .find_map(|l| {
            let l = l.to_ascii_lowercase();
            l.strip_prefix("content-length:").map(|v| v.trim().to_string())
          })
          .and_then(|v| v.parse::<usize>().ok())
          .unwrap_or(0);
        if raw.len() >= end + 4 + length {
          break;
        }
      }
    }
    String::from_utf8_lossy(&raw).to_string()
  }

  #[test]
  fn endpoints_live_under_api() {
    let c = catalog("http://127.0.0.1:8000");
    let url = c.endpoint(["games", "3", "shops-grouped"]).unwrap();
    assert_eq!(url.as_str(), "http://127.0.0.1:8000/api/games/3/shops-grouped");

    let url = c.endpoint(c.item_shops(GameId(1), ProfileId(2), ItemId(3))).unwrap();
    assert_eq!(url.as_str(), "http://127.0.0.1:8000/api/games/1/profiles/2/items/3/shops");
  }

  #[test]
  fn rejection_decodes_text_detail() {
    let body = r#"{"detail": "Count must be between 0 and 99999"}"#;
    let err = rejection(StatusCode::BAD_REQUEST, body);
    match err {
      ApiError::Rejected { status, failure } => {
        assert_eq!(status, 400);
        assert_eq!(failure.message, "Count must be between 0 and 99999");
      }
      other => panic!("unexpected {other:?}"),
    }
  }

  #[test]
  fn rejection_decodes_structured_detail() {
    let err = rejection(
      StatusCode::NOT_FOUND,
      r#"{"detail": {"error": "No matching save file: x", "error_type": "FileNotFoundError",
                     "error_traceback": "tb"}}"#,
    );
    let failure = err.to_failure();
    assert_eq!(failure.message, "No matching save file: x");
    assert_eq!(failure.error_type.as_deref(), Some("FileNotFoundError"));
    assert_eq!(failure.traceback.as_deref(), Some("tb"));
  }

  #[test]
  fn rejection_without_json_uses_status_line() {
    let err = rejection(StatusCode::BAD_GATEWAY, "<html>upstream down</html>");
    assert_eq!(err.short_message(), "502 Bad Gateway");
  }

  #[tokio::test]
  async fn update_shop_count_sends_patch_with_count() {
    let (server, handle) = serve_once("200 OK", r#"{"success": true}"#).await;

    let c = catalog(&server);
    c.update_shop_count(GameId(1), ProfileId(2), ItemId(3), ShopId(4), 7).await.unwrap();

    let request = handle.await.unwrap();
    assert!(request.starts_with("PATCH /api/games/1/profiles/2/items/3/shops/4 "));
    assert!(request.ends_with(r#"{"count":7}"#));
  }

  #[tokio::test]
  async fn tracked_items_decodes_payload() {
    let (server, handle) = serve_once(
      "200 OK",
      r#"[{"item": {"id": 10, "name": "Sword", "price": 500, "hint": null},
           "tracked_shops": [{"shop_id": 4, "shop_name": "Smith", "location_id": 2,
                              "location_name": "Town", "count": 3}]}]"#,
    )
    .await;

    let items = catalog(&server).tracked_items(GameId(1), ProfileId(2)).await.unwrap();
    assert_eq!(items.len(), 1);
    assert_eq!(items[0].item.name, "Sword");
    assert_eq!(items[0].count_at(ShopId(4)), Some(3));

    let request = handle.await.unwrap();
    assert!(request.starts_with("GET /api/games/1/profiles/2/tracked "));
  }

  #[tokio::test]
  async fn rejected_scan_profile_carries_server_diagnostics() {
    let (server, _handle) = serve_once(
      "500 Internal Server Error",
      r#"{"detail": {"error": "Scan failed: boom", "error_type": "ValueError",
                     "error_traceback": "Traceback"}}"#,
    )
    .await;

    let err = catalog(&server).scan_profile(GameId(1), ProfileId(2)).await.unwrap_err();
    match err {
      ApiError::Rejected { status, failure } => {
        assert_eq!(status, 500);
        assert_eq!(failure.message, "Scan failed: boom");
        assert_eq!(failure.error_type.as_deref(), Some("ValueError"));
      }
      other => panic!("unexpected {other:?}"),
    }
  }

  #[tokio::test]
  async fn blank_save_dir_is_rejected_locally() {
    let err = catalog("http://127.0.0.1:1").scan_save(GameId(1), "  ").await.unwrap_err();
    assert!(matches!(err, ApiError::Invalid(_)));
  }
}

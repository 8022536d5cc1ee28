use crate::backend::ConfigBackend;
use crate::paths::ConfigError;
use bounty_core::domain::resource_kind::DEFAULT_RESOURCE_KINDS;
use serde::{Deserialize, Serialize};
use std::time::Duration;

const SECTION: &str = "client";

/// `[client]` section of `bounty.toml`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ClientConfig {
  pub server_url: String,
  /// Resource kinds shown in the progress list, in display order.
  pub resource_kinds: Vec<String>,
  pub languages: Vec<String>,
  pub debounce_ms: u64,
  pub log_filter: String,
}

impl Default for ClientConfig {
  fn default() -> Self {
    Self {
      server_url: "http://127.0.0.1:8000".to_string(),
      resource_kinds: DEFAULT_RESOURCE_KINDS.iter().map(|k| k.to_string()).collect(),
      languages: ["ru", "eng", "ger", "pol"].into_iter().map(String::from).collect(),
      debounce_ms: 500,
      log_filter: "info".to_string(),
    }
  }
}

impl ClientConfig {
  /// Loads the section, filling gaps with defaults, and writes the result
  /// back so the file always lists every key.
  pub fn load_from<B: ConfigBackend>(backend: &B) -> Result<Self, ConfigError> {
    let config: Self = backend.load_section_with_default(SECTION)?;
    backend.save_section(SECTION, &config)?;
    Ok(config)
  }

  pub fn save_to<B: ConfigBackend>(&self, backend: &B) -> Result<(), ConfigError> {
    backend.save_section(SECTION, self)
  }

  pub fn debounce(&self) -> Duration {
    Duration::from_millis(self.debounce_ms)
  }
}

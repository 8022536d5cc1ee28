use anyhow::Context;
use bounty_config::ClientConfig;
use bounty_core::domain::ResourceKind;
use serde::Serialize;
use std::time::Duration;
use url::Url;

/// Client configuration after CLI overrides, in the types the services take.
#[derive(Debug, Clone)]
pub struct Settings {
  pub server: Url,
  pub resource_kinds: Vec<ResourceKind>,
  pub languages: Vec<String>,
  pub debounce: Duration,
  pub log_filter: String,
}

impl Settings {
  pub fn resolve(config: &ClientConfig, server_override: Option<&str>) -> anyhow::Result<Self> {
    let raw_server = server_override.unwrap_or(&config.server_url);
    let server = Url::parse(raw_server.trim())
      .with_context(|| format!("invalid server URL '{raw_server}'"))?;

    let mut resource_kinds: Vec<ResourceKind> = Vec::new();
    let configured = config.resource_kinds.iter().filter(|k| !k.trim().is_empty());
    for kind in configured.map(ResourceKind::new) {
      if !resource_kinds.contains(&kind) {
        resource_kinds.push(kind);
      }
    }
    if resource_kinds.is_empty() {
      resource_kinds = ResourceKind::defaults();
    }

    Ok(Settings {
      server,
      resource_kinds,
      languages: config.languages.clone(),
      debounce: config.debounce(),
      log_filter: config.log_filter.clone(),
    })
  }
}

/// What `config show` prints.
#[derive(Debug, Serialize)]
pub struct ConfigView<'a> {
  pub file: String,
  #[serde(flatten)]
  pub client: &'a ClientConfig,
}

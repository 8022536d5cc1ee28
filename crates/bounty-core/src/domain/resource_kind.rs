use serde::{Deserialize, Serialize};
use std::fmt;

/// A named category of entity counted by a scan job (`items`, `units`, ...).
///
/// The set is defined by the backend and treated as open: the client only
/// tracks the kinds it registered a slot for.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ResourceKind(String);

/// Default display order of the kinds the scan view knows about.
pub const DEFAULT_RESOURCE_KINDS: &[&str] = &[
  "items",
  "sets",
  "units",
  "spells",
  "atoms",
  "actors",
  "localizations",
  "garrison",
  "locations",
  "shops",
];

impl ResourceKind {
  pub fn new(name: impl Into<String>) -> Self {
    ResourceKind(name.into().trim().to_lowercase())
  }

  pub fn as_str(&self) -> &str {
    &self.0
  }

  /// Human label used in summaries: `items` -> `Items`.
  pub fn label(&self) -> String {
    let mut chars = self.0.chars();
    match chars.next() {
      Some(first) => first.to_uppercase().chain(chars).collect(),
      None => String::new(),
    }
  }

  pub fn defaults() -> Vec<ResourceKind> {
    DEFAULT_RESOURCE_KINDS.iter().map(|k| ResourceKind::new(*k)).collect()
  }
}

impl From<&str> for ResourceKind {
  fn from(s: &str) -> Self {
    ResourceKind::new(s)
  }
}

impl fmt::Display for ResourceKind {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    f.write_str(&self.0)
  }
}

use serde::{Deserialize, Serialize};

use crate::domain::event_type::ScanEventType;
use crate::domain::resource_kind::ResourceKind;

/// One message pushed by the server during a scan.
///
/// Only `event_type` is mandatory; which of the other fields are present
/// depends on it. Servers send explicit `null`s for absent fields, which
/// deserialize to `None` like missing keys do.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScanEvent {
  pub event_type: ScanEventType,
  #[serde(default)]
  pub resource_type: Option<ResourceKind>,
  /// Only present on `resource_completed`.
  #[serde(default)]
  pub count: Option<u64>,
  #[serde(default)]
  pub message: Option<String>,
  #[serde(default)]
  pub error: Option<String>,
  #[serde(default)]
  pub error_type: Option<String>,
  #[serde(default)]
  pub error_traceback: Option<String>,
}

/// The one field read before anything else, so that unknown event types
/// are not held to the shape of the known ones.
#[derive(Deserialize)]
struct Header {
  event_type: ScanEventType,
}

impl ScanEvent {
  fn bare(event_type: ScanEventType) -> Self {
    Self {
      event_type,
      resource_type: None,
      count: None,
      message: None,
      error: None,
      error_type: None,
      error_traceback: None,
    }
  }

  /// Decodes one frame payload.
  ///
  /// Event types this client does not know keep only their name; whatever
  /// else they carry is not decoded.
  pub fn parse(raw: &str) -> Result<Self, serde_json::Error> {
    let header: Header = serde_json::from_str(raw)?;
    match header.event_type {
      unknown @ ScanEventType::Unknown(_) => Ok(Self::bare(unknown)),
      _ => serde_json::from_str(raw),
    }
  }

  /// Message to put in the status line, if the event carries a usable one.
  pub fn status_text(&self) -> Option<&str> {
    self.message.as_deref().filter(|m| !m.trim().is_empty())
  }
}

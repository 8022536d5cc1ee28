use serde::{Deserialize, Serialize};

use crate::domain::event::ScanEvent;

pub const UNKNOWN_ERROR: &str = "Unknown error occurred";
pub const CONNECTION_LOST: &str = "Connection lost. The scan may have failed or completed.";

/// Structured failure report handed to the renderer.
///
/// Every failure path (job error, dropped connection, malformed frame,
/// rejected HTTP mutation) is normalized into this shape. Optional fields are
/// `None` rather than empty so a renderer never draws an empty section.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScanFailure {
  pub message: String,
  pub error_type: Option<String>,
  pub traceback: Option<String>,
}

impl ScanFailure {
  pub fn new(message: impl Into<String>) -> Self {
    let message = message.into();
    let message = if message.trim().is_empty() { UNKNOWN_ERROR.to_string() } else { message };
    Self { message, error_type: None, traceback: None }
  }

  pub fn with_error_type(mut self, error_type: impl Into<String>) -> Self {
    self.error_type = non_empty(Some(error_type.into()));
    self
  }

  pub fn with_traceback(mut self, traceback: impl Into<String>) -> Self {
    self.traceback = non_empty(Some(traceback.into()));
    self
  }

  /// Builds the report for a `scan_error` event. `error` wins over `message`.
  pub fn from_event(event: &ScanEvent) -> Self {
    let message = non_empty(event.error.clone())
      .or_else(|| non_empty(event.message.clone()))
      .unwrap_or_else(|| UNKNOWN_ERROR.to_string());

    Self {
      message,
      error_type: non_empty(event.error_type.clone()),
      traceback: non_empty(event.error_traceback.clone()),
    }
  }

  /// The transport went away before the job said how it ended.
  pub fn connection_lost() -> Self {
    Self::new(CONNECTION_LOST)
  }

  /// A frame arrived that is not a scan event. The raw payload is kept as
  /// diagnostic detail.
  pub fn protocol(raw: &str, cause: &serde_json::Error) -> Self {
    Self::new("Received a malformed scan event")
      .with_error_type("ProtocolError")
      .with_traceback(format!("{cause}\n\n{raw}"))
  }
}

fn non_empty(value: Option<String>) -> Option<String> {
  value.filter(|s| !s.trim().is_empty())
}

/// The `detail` field of an HTTP error body.
///
/// The server sends either a plain string, a structured object with the same
/// fields as a `scan_error` event, or (for request validation) an arbitrary
/// JSON value.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(untagged)]
pub enum ErrorDetail {
  Text(String),
  Structured {
    #[serde(default)]
    error: Option<String>,
    #[serde(default)]
    message: Option<String>,
    #[serde(default)]
    error_type: Option<String>,
    #[serde(default)]
    error_traceback: Option<String>,
  },
  Other(serde_json::Value),
}

impl From<ErrorDetail> for ScanFailure {
  fn from(detail: ErrorDetail) -> Self {
    match detail {
      ErrorDetail::Text(text) => ScanFailure::new(text),
      ErrorDetail::Structured { error, message, error_type, error_traceback } => ScanFailure {
        message: non_empty(error)
          .or(non_empty(message))
          .unwrap_or_else(|| UNKNOWN_ERROR.to_string()),
        error_type: non_empty(error_type),
        traceback: non_empty(error_traceback),
      },
      ErrorDetail::Other(value) => ScanFailure::new(value.to_string()),
    }
  }
}

/// Error envelope returned by the collaborator API on non-2xx responses.
#[derive(Debug, Clone, Deserialize)]
pub struct ErrorBody {
  #[serde(default)]
  pub detail: Option<ErrorDetail>,
}

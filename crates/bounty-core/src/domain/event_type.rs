use serde::{Deserialize, Serialize};
use std::{fmt, str::FromStr};

/// Lifecycle event kinds emitted by a scan job.
///
/// The vocabulary is the union of every backend that speaks this protocol.
/// Backends that import game data never send the `Extraction*` variants,
/// save-file scanners do; both are handled by the same interpreter.
///
/// Values the client does not know land in [`ScanEventType::Unknown`] so a
/// server can add event kinds without breaking older clients.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum ScanEventType {
  ScanStarted,
  ExtractionStarted,
  ExtractionCompleted,
  ExtractionWarning,
  ResourceStarted,
  ResourceCompleted,
  ScanCompleted,
  ScanError,
  Unknown(String),
}

impl ScanEventType {
  pub fn as_str(&self) -> &str {
    match self {
      ScanEventType::ScanStarted => "scan_started",
      ScanEventType::ExtractionStarted => "extraction_started",
      ScanEventType::ExtractionCompleted => "extraction_completed",
      ScanEventType::ExtractionWarning => "extraction_warning",
      ScanEventType::ResourceStarted => "resource_started",
      ScanEventType::ResourceCompleted => "resource_completed",
      ScanEventType::ScanCompleted => "scan_completed",
      ScanEventType::ScanError => "scan_error",
      ScanEventType::Unknown(s) => s,
    }
  }
}

impl FromStr for ScanEventType {
  type Err = std::convert::Infallible;

  /// Parsing never fails: unrecognised names become `Unknown`.
  fn from_str(s: &str) -> Result<Self, Self::Err> {
    let et = match s.trim() {
      "scan_started" => ScanEventType::ScanStarted,
      "extraction_started" => ScanEventType::ExtractionStarted,
      "extraction_completed" => ScanEventType::ExtractionCompleted,
      "extraction_warning" => ScanEventType::ExtractionWarning,
      "resource_started" => ScanEventType::ResourceStarted,
      "resource_completed" => ScanEventType::ResourceCompleted,
      "scan_completed" => ScanEventType::ScanCompleted,
      "scan_error" => ScanEventType::ScanError,
      _ => ScanEventType::Unknown(s.to_string()),
    };

    Ok(et)
  }
}

impl From<String> for ScanEventType {
  fn from(s: String) -> Self {
    match s.parse() {
      Ok(et) => et,
      Err(never) => match never {},
    }
  }
}

impl From<ScanEventType> for String {
  fn from(et: ScanEventType) -> Self {
    et.as_str().to_string()
  }
}

impl fmt::Display for ScanEventType {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    f.write_str(self.as_str())
  }
}

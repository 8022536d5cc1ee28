use serde::{Deserialize, Serialize};
use std::fmt;

use crate::domain::failure::ScanFailure;
use crate::domain::ids::{GameId, SessionId};
use crate::domain::ledger::ProgressLedger;
use crate::domain::resource_kind::ResourceKind;

pub const INITIAL_STATUS: &str = "Initializing scan...";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ScanPhase {
  #[default]
  Idle,
  Running,
  Completed,
  Failed,
}

impl fmt::Display for ScanPhase {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    let s = match self {
      ScanPhase::Idle => "idle",
      ScanPhase::Running => "running",
      ScanPhase::Completed => "completed",
      ScanPhase::Failed => "failed",
    };
    f.write_str(s)
  }
}

/// What the user picked before starting a scan.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScanParameters {
  /// Job whose stream is opened; for game-data scans this is the game.
  pub job_id: GameId,
  /// Game language to extract (`ru`, `eng`, `ger`, `pol`, ...).
  pub language: String,
}

impl ScanParameters {
  pub fn new(job_id: impl Into<GameId>, language: impl Into<String>) -> Self {
    Self { job_id: job_id.into(), language: language.into() }
  }
}

/// The one live scan: stream handle, ledger, phase and status line.
///
/// Owned by the controller and mutated only through it.
#[derive(Debug)]
pub struct ScanSession<C> {
  pub(crate) id: SessionId,
  pub(crate) channel: C,
  pub(crate) ledger: ProgressLedger,
  pub(crate) phase: ScanPhase,
  pub(crate) status_message: String,
  pub(crate) parameters: Option<ScanParameters>,
  pub(crate) failure: Option<ScanFailure>,
}

impl<C> ScanSession<C> {
  pub fn new(channel: C, known_kinds: &[ResourceKind]) -> Self {
    Self {
      id: SessionId::new(),
      channel,
      ledger: ProgressLedger::new(known_kinds),
      phase: ScanPhase::Idle,
      status_message: String::new(),
      parameters: None,
      failure: None,
    }
  }

  pub fn id(&self) -> SessionId {
    self.id
  }

  pub fn phase(&self) -> ScanPhase {
    self.phase
  }

  pub fn ledger(&self) -> &ProgressLedger {
    &self.ledger
  }

  pub fn status_message(&self) -> &str {
    &self.status_message
  }

  pub fn parameters(&self) -> Option<&ScanParameters> {
    self.parameters.as_ref()
  }

  /// Report of the last failed session, until the next reset.
  pub fn failure(&self) -> Option<&ScanFailure> {
    self.failure.as_ref()
  }

  pub fn channel(&self) -> &C {
    &self.channel
  }
}

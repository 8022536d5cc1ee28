use serde::{Deserialize, Serialize};
use std::fmt;

use crate::domain::resource_kind::ResourceKind;

/// Progress of one resource kind. Ordered: a status may only move forward.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ResourceState {
  Pending,
  InProgress,
  Completed,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ResourceStatus {
  pub state: ResourceState,
  /// Fixed once the kind completes; `None` before that or if the server
  /// completed the kind without a count.
  pub count: Option<u64>,
}

impl ResourceStatus {
  pub const PENDING: ResourceStatus = ResourceStatus { state: ResourceState::Pending, count: None };
}

/// What a ledger mutation did.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LedgerUpdate {
  Applied,
  /// The kind was already in the requested state.
  Unchanged,
  /// No slot was registered for the kind; nothing to update.
  Unregistered,
  /// The transition would move the kind backwards and was not applied.
  Rejected { current: ResourceState },
}

/// Per-kind progress of the live scan session.
///
/// Pure state: no I/O, no rendering. Kinds keep the order they were
/// registered in, which is also the display order of the final summary.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ProgressLedger {
  entries: Vec<(ResourceKind, ResourceStatus)>,
}

impl ProgressLedger {
  pub fn new(kinds: &[ResourceKind]) -> Self {
    let mut ledger = Self::default();
    ledger.reset(kinds);
    ledger
  }

  /// Drops all progress and registers `kinds` as pending. Duplicates keep
  /// their first position.
  pub fn reset(&mut self, kinds: &[ResourceKind]) {
    self.entries.clear();
    for kind in kinds {
      if self.position(kind).is_none() {
        self.entries.push((kind.clone(), ResourceStatus::PENDING));
      }
    }
  }

  pub fn mark_started(&mut self, kind: &ResourceKind) -> LedgerUpdate {
    let Some(status) = self.status_mut(kind) else {
      return LedgerUpdate::Unregistered;
    };

    match status.state {
      ResourceState::Pending => {
        status.state = ResourceState::InProgress;
        LedgerUpdate::Applied
      }
      ResourceState::InProgress => LedgerUpdate::Unchanged,
      ResourceState::Completed => LedgerUpdate::Rejected { current: ResourceState::Completed },
    }
  }

  /// Completes `kind`. A kind that never started is completed directly.
  pub fn mark_completed(&mut self, kind: &ResourceKind, count: Option<u64>) -> LedgerUpdate {
    let Some(status) = self.status_mut(kind) else {
      return LedgerUpdate::Unregistered;
    };

    if status.state == ResourceState::Completed {
      return LedgerUpdate::Rejected { current: ResourceState::Completed };
    }

    status.state = ResourceState::Completed;
    status.count = count;
    LedgerUpdate::Applied
  }

  pub fn get(&self, kind: &ResourceKind) -> Option<ResourceStatus> {
    self.position(kind).map(|i| self.entries[i].1)
  }

  pub fn kinds(&self) -> Vec<ResourceKind> {
    self.entries.iter().map(|(k, _)| k.clone()).collect()
  }

  pub fn snapshot(&self) -> LedgerSnapshot {
    LedgerSnapshot { entries: self.entries.clone() }
  }

  fn position(&self, kind: &ResourceKind) -> Option<usize> {
    self.entries.iter().position(|(k, _)| k == kind)
  }

  fn status_mut(&mut self, kind: &ResourceKind) -> Option<&mut ResourceStatus> {
    self.entries.iter_mut().find(|(k, _)| k == kind).map(|(_, s)| s)
  }
}

/// Read-only copy of the ledger handed to renderers.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LedgerSnapshot {
  entries: Vec<(ResourceKind, ResourceStatus)>,
}

impl LedgerSnapshot {
  pub fn iter(&self) -> impl Iterator<Item = (&ResourceKind, &ResourceStatus)> {
    self.entries.iter().map(|(k, s)| (k, s))
  }

  pub fn get(&self, kind: &ResourceKind) -> Option<ResourceStatus> {
    self.entries.iter().find(|(k, _)| k == kind).map(|(_, s)| *s)
  }

  pub fn len(&self) -> usize {
    self.entries.len()
  }

  pub fn is_empty(&self) -> bool {
    self.entries.is_empty()
  }

  /// Final counts in display order. Kinds that never reported count as zero.
  pub fn summary(&self) -> ScanSummary {
    let lines = self
      .entries
      .iter()
      .map(|(kind, s)| SummaryLine { kind: kind.clone(), count: s.count.unwrap_or(0) })
      .collect();
    ScanSummary { lines }
  }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SummaryLine {
  pub kind: ResourceKind,
  pub count: u64,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ScanSummary {
  pub lines: Vec<SummaryLine>,
}

impl ScanSummary {
  pub fn count_of(&self, kind: &ResourceKind) -> Option<u64> {
    self.lines.iter().find(|l| &l.kind == kind).map(|l| l.count)
  }

  pub fn total(&self) -> u64 {
    self.lines.iter().map(|l| l.count).sum()
  }
}

impl fmt::Display for ScanSummary {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    for (i, line) in self.lines.iter().enumerate() {
      if i > 0 {
        writeln!(f)?;
      }
      write!(f, "{} scanned: {}", line.kind.label(), line.count)?;
    }
    Ok(())
  }
}

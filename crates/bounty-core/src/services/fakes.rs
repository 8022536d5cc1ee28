//! In-memory channel and renderer used by the service tests.

use async_trait::async_trait;
use std::collections::VecDeque;

use crate::domain::failure::ScanFailure;
use crate::domain::ledger::{LedgerSnapshot, ScanSummary};
use crate::ports::{ChannelError, ChannelSignal, Panel, ScanChannel, ScanRenderer, StreamRequest};

#[derive(Debug, Default)]
pub struct FakeChannel {
  pub requests: Vec<StreamRequest>,
  /// Signals replayed after the next `open`.
  pub script: Vec<ChannelSignal>,
  pub close_count: usize,
  pub open_connections: usize,
  pub refuse: bool,
  queue: Option<VecDeque<ChannelSignal>>,
}

impl FakeChannel {
  pub fn scripted(script: Vec<ChannelSignal>) -> Self {
    Self { script, ..Self::default() }
  }

  pub fn refusing() -> Self {
    Self { refuse: true, ..Self::default() }
  }
}

#[async_trait]
impl ScanChannel for FakeChannel {
  fn open(&mut self, request: &StreamRequest) -> Result<(), ChannelError> {
    self.requests.push(request.clone());
    if self.refuse {
      return Err(ChannelError::Transport("connection refused".into()));
    }
    self.close();
    self.queue = Some(self.script.iter().cloned().collect());
    self.open_connections += 1;
    Ok(())
  }

  fn close(&mut self) {
    if self.queue.take().is_some() {
      self.close_count += 1;
      self.open_connections -= 1;
    }
  }

  fn is_open(&self) -> bool {
    self.queue.is_some()
  }

  async fn next_signal(&mut self) -> Option<ChannelSignal> {
    self.queue.as_mut()?.pop_front()
  }
}

#[derive(Debug, Clone, PartialEq)]
pub enum Rendered {
  Panel(Panel),
  Progress { snapshot: LedgerSnapshot, status: String },
  Success(ScanSummary),
  Failure(ScanFailure),
  Validation(String),
}

#[derive(Debug, Default)]
pub struct RecordingRenderer {
  pub events: Vec<Rendered>,
}

impl RecordingRenderer {
  pub fn last(&self) -> Option<&Rendered> {
    self.events.last()
  }

  pub fn panels(&self) -> Vec<Panel> {
    self
      .events
      .iter()
      .filter_map(|e| match e {
        Rendered::Panel(p) => Some(*p),
        _ => None,
      })
      .collect()
  }
}

impl ScanRenderer for RecordingRenderer {
  fn show_panel(&mut self, panel: Panel) {
    self.events.push(Rendered::Panel(panel));
  }

  fn progress(&mut self, snapshot: &LedgerSnapshot, status: &str) {
    self.events.push(Rendered::Progress { snapshot: snapshot.clone(), status: status.to_string() });
  }

  fn success(&mut self, summary: &ScanSummary) {
    self.events.push(Rendered::Success(summary.clone()));
  }

  fn failure(&mut self, failure: &ScanFailure) {
    self.events.push(Rendered::Failure(failure.clone()));
  }

  fn validation(&mut self, message: &str) {
    self.events.push(Rendered::Validation(message.to_string()));
  }
}

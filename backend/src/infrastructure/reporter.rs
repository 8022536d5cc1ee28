use bounty_core::domain::failure::ScanFailure;
use bounty_core::domain::ledger::{LedgerSnapshot, ResourceState, ResourceStatus, ScanSummary};
use bounty_core::domain::ResourceKind;
use bounty_core::ports::{Panel, ScanRenderer};
use colored::Colorize;
use std::collections::HashMap;
use std::io::{self, Write};

/// A `ScanRenderer` that prints scan progress as a running log.
///
/// A terminal cannot redraw a list in place without taking over the screen,
/// so each progress call only prints the kinds whose state changed since the
/// previous call, plus the status line when it changes.
pub struct TerminalReporter<W: Write> {
  out: W,
  panel: Option<Panel>,
  status: String,
  drawn: HashMap<ResourceKind, ResourceStatus>,
}

impl TerminalReporter<io::Stdout> {
  pub fn stdout() -> Self {
    Self::new(io::stdout())
  }
}

impl<W: Write> TerminalReporter<W> {
  pub fn new(out: W) -> Self {
    Self { out, panel: None, status: String::new(), drawn: HashMap::new() }
  }

  pub fn panel(&self) -> Option<Panel> {
    self.panel
  }

  pub fn into_inner(self) -> W {
    self.out
  }

  fn line(&mut self, text: impl AsRef<str>) {
    // Output errors (closed pipe) must not abort the scan.
    let _ = writeln!(self.out, "{}", text.as_ref());
  }
}

fn resource_line(kind: &ResourceKind, status: &ResourceStatus) -> String {
  match status.state {
    ResourceState::Pending => format!("  {}  {}", "·".dimmed(), kind.label().dimmed()),
    ResourceState::InProgress => format!("  {}  {}", "…".yellow(), kind.label()),
    ResourceState::Completed => match status.count {
      Some(count) => format!("  {}  {} ({count})", "✓".green(), kind.label()),
      None => format!("  {}  {}", "✓".green(), kind.label()),
    },
  }
}

impl<W: Write> ScanRenderer for TerminalReporter<W> {
  fn show_panel(&mut self, panel: Panel) {
    if self.panel == Some(panel) {
      return;
    }
    self.panel = Some(panel);

    match panel {
      Panel::Form => {
        self.status.clear();
        self.drawn.clear();
      }
      Panel::Progress => {
        self.status.clear();
        self.drawn.clear();
        self.line("Scan progress".bold().to_string());
      }
      Panel::Results | Panel::Error => self.line(""),
    }
  }

  fn progress(&mut self, snapshot: &LedgerSnapshot, status: &str) {
    if status != self.status {
      self.status = status.to_string();
      if !status.is_empty() {
        self.line(format!("{} {}", "»".cyan(), status));
      }
    }

    let changed: Vec<String> = snapshot
      .iter()
      .filter(|(kind, s)| self.drawn.get(*kind) != Some(*s))
      .map(|(kind, s)| resource_line(kind, s))
      .collect();

    for (kind, s) in snapshot.iter() {
      self.drawn.insert(kind.clone(), *s);
    }
    for text in changed {
      self.line(text);
    }
  }

  fn success(&mut self, summary: &ScanSummary) {
    self.line("Scan completed successfully".green().bold().to_string());
    self.line(summary.to_string());
  }

  fn failure(&mut self, failure: &ScanFailure) {
    self.line(format!("{} {}", "Scan failed:".red().bold(), failure.message));

    if let Some(error_type) = &failure.error_type {
      self.line(format!("  [{}]", error_type.yellow()));
    }
    if let Some(traceback) = &failure.traceback {
      self.line("  Details:".dimmed().to_string());
      for l in traceback.lines() {
        self.line(format!("    {l}"));
      }
    }
  }

  fn validation(&mut self, message: &str) {
    self.line(message.yellow().to_string());
  }
}

#[cfg(test)]
mod tests {
  use super::*;
  use bounty_core::domain::ledger::ProgressLedger;

  fn reporter() -> TerminalReporter<Vec<u8>> {
    colored::control::set_override(false);
    TerminalReporter::new(Vec::new())
  }

  fn output(r: TerminalReporter<Vec<u8>>) -> String {
    String::from_utf8(r.into_inner()).unwrap()
  }

  #[test]
  fn prints_only_changed_resources() {
    let kinds = vec![ResourceKind::new("items"), ResourceKind::new("units")];
    let mut ledger = ProgressLedger::new(&kinds);
    let mut r = reporter();

    r.show_panel(Panel::Progress);
    r.progress(&ledger.snapshot(), "Initializing scan...");
    ledger.mark_completed(&kinds[0], Some(42));
    r.progress(&ledger.snapshot(), "Completed items: 42");

    let out = output(r);
    assert_eq!(out.matches("Items").count(), 2);
    assert_eq!(out.matches("Units").count(), 1);
    assert!(out.contains("✓  Items (42)"));
    assert!(out.contains("» Completed items: 42"));
  }

  #[test]
  fn failure_omits_absent_sections() {
    let mut r = reporter();
    r.failure(&ScanFailure::new("boom"));
    let out = output(r);

    assert!(out.contains("Scan failed: boom"));
    assert!(!out.contains("["));
    assert!(!out.contains("Details"));
  }

  #[test]
  fn failure_shows_badge_and_details() {
    let mut r = reporter();
    let failure =
      ScanFailure::new("boom").with_error_type("ValueError").with_traceback("line 1\nline 2");
    r.failure(&failure);
    let out = output(r);

    assert!(out.contains("[ValueError]"));
    assert!(out.contains("Details:"));
    assert!(out.contains("    line 2"));
  }

  #[test]
  fn success_prints_summary() {
    let kinds = vec![ResourceKind::new("items")];
    let mut ledger = ProgressLedger::new(&kinds);
    ledger.mark_completed(&kinds[0], Some(3));

    let mut r = reporter();
    r.show_panel(Panel::Results);
    r.success(&ledger.snapshot().summary());

    assert!(output(r).contains("Items scanned: 3"));
  }
}

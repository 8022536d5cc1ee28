use crate::domain::failure::ScanFailure;
use crate::domain::ledger::{LedgerSnapshot, ScanSummary};

/// Mutually exclusive areas of the scan view.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Panel {
  /// Parameter form (language picker).
  Form,
  Progress,
  Results,
  Error,
}

/// View side of the scan controller.
///
/// The controller decides what is shown; implementations only draw. Showing
/// a panel hides the others. Terminal renders (`success`, `failure`) are the
/// places where a front end offers its retry control.
pub trait ScanRenderer {
  fn show_panel(&mut self, panel: Panel);

  /// Redraws progress after any ledger or status change.
  fn progress(&mut self, snapshot: &LedgerSnapshot, status: &str);

  fn success(&mut self, summary: &ScanSummary);

  /// Draws the message, then the badge and detail sections only when the
  /// corresponding fields are present.
  fn failure(&mut self, failure: &ScanFailure);

  /// Input was rejected before any network action.
  fn validation(&mut self, message: &str);
}

impl<R: ScanRenderer + ?Sized> ScanRenderer for &mut R {
  fn show_panel(&mut self, panel: Panel) {
    (**self).show_panel(panel)
  }

  fn progress(&mut self, snapshot: &LedgerSnapshot, status: &str) {
    (**self).progress(snapshot, status)
  }

  fn success(&mut self, summary: &ScanSummary) {
    (**self).success(summary)
  }

  fn failure(&mut self, failure: &ScanFailure) {
    (**self).failure(failure)
  }

  fn validation(&mut self, message: &str) {
    (**self).validation(message)
  }
}

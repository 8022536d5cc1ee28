use log::{debug, error, info, warn};

use crate::domain::event::ScanEvent;
use crate::domain::event_type::ScanEventType;
use crate::domain::failure::ScanFailure;
use crate::domain::ids::SessionId;
use crate::domain::ledger::LedgerUpdate;
use crate::domain::resource_kind::ResourceKind;
use crate::domain::session::{INITIAL_STATUS, ScanParameters, ScanPhase, ScanSession};
use crate::errors::{CoreError, ValidationError};
use crate::ports::{Panel, ScanChannel, ScanRenderer, StreamRequest};

/// Optional slot tracking the coarse extraction phase of save-file scans.
/// Only updated when registered among the known kinds.
pub const EXTRACTION_SLOT: &str = "extraction";

/// Frame payload servers send to keep idle connections alive.
const KEEPALIVE: &str = "keepalive";

/// Whether the session still expects signals from the channel.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Step {
  Continue,
  Finished,
}

/// Drives one scan session end to end.
///
/// Validates parameters and opens the stream, interprets each event into a
/// ledger transition, and hands the terminal state to the renderer. All
/// mutation goes through `&mut self`; the controller is the only writer of
/// its session.
#[derive(Debug)]
pub struct ScanController<C, R> {
  session: ScanSession<C>,
  renderer: R,
  known_kinds: Vec<ResourceKind>,
}

impl<C, R> ScanController<C, R>
where
  C: ScanChannel,
  R: ScanRenderer,
{
  pub fn new(channel: C, renderer: R, known_kinds: Vec<ResourceKind>) -> Self {
    let session = ScanSession::new(channel, &known_kinds);
    Self { session, renderer, known_kinds }
  }

  pub fn session(&self) -> &ScanSession<C> {
    &self.session
  }

  pub fn phase(&self) -> ScanPhase {
    self.session.phase
  }

  pub fn renderer(&self) -> &R {
    &self.renderer
  }

  pub fn channel_mut(&mut self) -> &mut C {
    &mut self.session.channel
  }

  // -------- Initiator --------

  /// Validates `params`, resets progress and opens the event stream.
  ///
  /// Validation failures are rendered and returned; nothing is opened. A
  /// stream that cannot be opened is a transport failure: it is rendered as
  /// such and the call still succeeds.
  pub fn start_scan(&mut self, params: ScanParameters) -> Result<(), CoreError> {
    if self.session.phase == ScanPhase::Running {
      return Err(self.reject(ValidationError::SessionActive));
    }

    let language = params.language.trim();
    if language.is_empty() {
      return Err(self.reject(ValidationError::MissingLanguage));
    }
    let params = ScanParameters { job_id: params.job_id, language: language.to_string() };

    self.session.channel.close();
    self.session.id = SessionId::new();
    self.session.ledger.reset(&self.known_kinds);
    self.session.phase = ScanPhase::Running;
    self.session.status_message = INITIAL_STATUS.to_string();
    self.session.failure = None;
    self.session.parameters = Some(params.clone());

    self.renderer.show_panel(Panel::Progress);
    self.render_progress();

    info!(
      "[scan {}] starting for job {} (language={})",
      self.session.id, params.job_id, params.language
    );

    let request = StreamRequest::new(params.job_id).with_query("language", params.language);
    if let Err(e) = self.session.channel.open(&request) {
      error!("[scan {}] could not open event stream: {e}", self.session.id);
      self.fail(ScanFailure::new(e.to_string()).with_error_type("ConnectionError"));
    }

    Ok(())
  }

  /// Tears the session down and shows the parameter form again. The last
  /// parameters are kept for [`retry`](Self::retry).
  pub fn reset(&mut self) {
    self.session.channel.close();
    self.session.ledger.reset(&self.known_kinds);
    self.session.phase = ScanPhase::Idle;
    self.session.status_message.clear();
    self.session.failure = None;
    self.renderer.show_panel(Panel::Form);
  }

  /// Discards whatever the current session holds and starts over with the
  /// previous parameters, whatever the previous outcome was.
  pub fn retry(&mut self) -> Result<(), CoreError> {
    let Some(params) = self.session.parameters.clone() else {
      return Err(self.reject(ValidationError::NothingToRetry));
    };

    debug!("[scan {}] retrying", self.session.id);
    self.reset();
    self.start_scan(params)
  }

  // -------- Interpreter --------

  /// Handles one SSE frame. Keepalives and named events other than the
  /// default `message` are skipped.
  pub fn on_frame(&mut self, event: &str, data: &str) -> Step {
    if data.trim().is_empty() || data == KEEPALIVE {
      debug!("[scan {}] keepalive", self.session.id);
      return self.still_running();
    }

    if !event.is_empty() && event != "message" {
      debug!("[scan {}] skipping named frame '{event}'", self.session.id);
      return self.still_running();
    }

    self.on_event(data)
  }

  /// Interprets one raw event payload.
  pub fn on_event(&mut self, raw: &str) -> Step {
    if self.session.phase != ScanPhase::Running {
      let (id, phase) = (&self.session.id, self.session.phase);
      debug!("[scan {id}] discarding event received in phase {phase}");
      return Step::Finished;
    }

    match ScanEvent::parse(raw) {
      Ok(event) => self.apply(event),
      Err(e) => {
        warn!("[scan {}] malformed event: {e} - data: {raw}", self.session.id);
        self.fail(ScanFailure::protocol(raw, &e));
        Step::Finished
      }
    }
  }

  /// The transport failed or closed. Before a terminal event this fails the
  /// session; after one it is a no-op.
  pub fn on_transport_error(&mut self, reason: &str) -> Step {
    self.session.channel.close();

    if self.session.phase == ScanPhase::Running {
      error!("[scan {}] connection lost before the scan finished: {reason}", self.session.id);
      self.fail(ScanFailure::connection_lost());
    } else {
      let (id, phase) = (&self.session.id, self.session.phase);
      debug!("[scan {id}] transport closed after phase {phase}: {reason}");
    }

    Step::Finished
  }

  fn apply(&mut self, event: ScanEvent) -> Step {
    match &event.event_type {
      ScanEventType::ScanStarted => {
        self.set_status(&event);
      }
      ScanEventType::ExtractionStarted => {
        let update = self.session.ledger.mark_started(&ResourceKind::new(EXTRACTION_SLOT));
        self.log_update(EXTRACTION_SLOT, update);
        self.set_status(&event);
      }
      ScanEventType::ExtractionCompleted => {
        let update = self.session.ledger.mark_completed(&ResourceKind::new(EXTRACTION_SLOT), None);
        self.log_update(EXTRACTION_SLOT, update);
        self.set_status(&event);
      }
      ScanEventType::ExtractionWarning => {
        let message = event.message.as_deref().unwrap_or_default();
        warn!("[scan {}] extraction warning: {message}", self.session.id);
        return Step::Continue;
      }
      ScanEventType::ResourceStarted => {
        match &event.resource_type {
          Some(kind) => {
            let update = self.session.ledger.mark_started(kind);
            self.log_update(kind.as_str(), update);
          }
          None => warn!("[scan {}] resource_started without resource_type", self.session.id),
        }
        self.set_status(&event);
      }
      ScanEventType::ResourceCompleted => {
        match &event.resource_type {
          Some(kind) => {
            let update = self.session.ledger.mark_completed(kind, event.count);
            self.log_update(kind.as_str(), update);
          }
          None => warn!("[scan {}] resource_completed without resource_type", self.session.id),
        }
        self.set_status(&event);
      }
      ScanEventType::ScanCompleted => {
        self.complete();
        return Step::Finished;
      }
      ScanEventType::ScanError => {
        self.fail(ScanFailure::from_event(&event));
        return Step::Finished;
      }
      ScanEventType::Unknown(name) => {
        debug!("[scan {}] ignoring unknown event type '{name}'", self.session.id);
        return Step::Continue;
      }
    }

    self.render_progress();
    Step::Continue
  }

  // -------- Terminal reporting --------

  fn complete(&mut self) {
    self.session.channel.close();
    self.session.phase = ScanPhase::Completed;

    let summary = self.session.ledger.snapshot().summary();
    info!("[scan {}] completed ({} entities)", self.session.id, summary.total());

    self.renderer.show_panel(Panel::Results);
    self.renderer.success(&summary);
  }

  fn fail(&mut self, failure: ScanFailure) {
    self.session.channel.close();
    self.session.phase = ScanPhase::Failed;

    warn!(
      "[scan {}] failed: {} ({})",
      self.session.id,
      failure.message,
      failure.error_type.as_deref().unwrap_or("no error type")
    );

    self.renderer.show_panel(Panel::Error);
    self.renderer.failure(&failure);
    self.session.failure = Some(failure);
  }

  fn reject(&mut self, err: ValidationError) -> CoreError {
    self.renderer.validation(&err.to_string());
    CoreError::Validation(err)
  }

  fn set_status(&mut self, event: &ScanEvent) {
    if let Some(text) = event.status_text() {
      self.session.status_message = text.to_string();
    }
  }

  fn render_progress(&mut self) {
    let snapshot = self.session.ledger.snapshot();
    self.renderer.progress(&snapshot, &self.session.status_message);
  }

  fn still_running(&self) -> Step {
    if self.session.phase == ScanPhase::Running { Step::Continue } else { Step::Finished }
  }

  fn log_update(&self, kind: &str, update: LedgerUpdate) {
    match update {
      LedgerUpdate::Applied | LedgerUpdate::Unchanged => {}
      LedgerUpdate::Unregistered => {
        debug!("[scan {}] no slot for resource '{kind}'", self.session.id)
      }
      LedgerUpdate::Rejected { current } => warn!(
        "[scan {}] ignored backwards transition for '{kind}' (currently {current:?})",
        self.session.id
      ),
    }
  }
}

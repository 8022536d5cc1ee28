use log::debug;

use crate::domain::session::ScanPhase;
use crate::ports::{ChannelSignal, ScanChannel, ScanRenderer};
use crate::services::scan_controller::{ScanController, Step};

/// Feeds channel signals into the controller until the session ends.
///
/// Signals are handled one at a time in delivery order; the controller is
/// never re-entered. Returns the phase the session finished in.
pub async fn run_session<C, R>(controller: &mut ScanController<C, R>) -> ScanPhase
where
  C: ScanChannel,
  R: ScanRenderer,
{
  while controller.phase() == ScanPhase::Running {
    let step = match controller.channel_mut().next_signal().await {
      Some(ChannelSignal::Opened) => {
        debug!("[scan {}] stream opened", controller.session().id());
        Step::Continue
      }
      Some(ChannelSignal::Frame { event, data }) => controller.on_frame(&event, &data),
      Some(ChannelSignal::Failed(reason)) => controller.on_transport_error(&reason),
      Some(ChannelSignal::Ended) | None => controller.on_transport_error("stream ended"),
    };

    if step == Step::Finished {
      break;
    }
  }

  controller.phase()
}

#[cfg(test)]
mod tests {
  use super::*;
  use crate::domain::failure::CONNECTION_LOST;
  use crate::domain::ids::GameId;
  use crate::domain::ledger::ResourceState;
  use crate::domain::resource_kind::ResourceKind;
  use crate::domain::session::ScanParameters;
  use crate::services::fakes::{FakeChannel, RecordingRenderer};
  use futures::executor::block_on;

  fn frame(data: &str) -> ChannelSignal {
    ChannelSignal::Frame { event: "message".into(), data: data.into() }
  }

  fn run(script: Vec<ChannelSignal>) -> ScanController<FakeChannel, RecordingRenderer> {
    let (channel, renderer) = (FakeChannel::scripted(script), RecordingRenderer::default());
    let mut c = ScanController::new(channel, renderer, ResourceKind::defaults());
    c.start_scan(ScanParameters::new(GameId(1), "eng")).unwrap();
    block_on(run_session(&mut c));
    c
  }

  #[test]
  fn runs_until_scan_completed() {
    let c = run(vec![
      ChannelSignal::Opened,
      frame(r#"{"event_type": "scan_started", "message": "Scan started"}"#),
      frame(r#"{"event_type": "resource_completed", "resource_type": "spells", "count": 12}"#),
      frame(r#"{"event_type": "scan_completed"}"#),
      frame(r#"{"event_type": "resource_completed", "resource_type": "items", "count": 1}"#),
      ChannelSignal::Ended,
    ]);

    assert_eq!(c.phase(), ScanPhase::Completed);
    let ledger = c.session().ledger();
    assert_eq!(ledger.get(&ResourceKind::new("spells")).unwrap().count, Some(12));
    assert_eq!(ledger.get(&ResourceKind::new("items")).unwrap().state, ResourceState::Pending);
    assert!(c.session().failure().is_none());
  }

  #[test]
  fn stream_end_without_terminal_event_is_a_failure() {
    let c = run(vec![
      ChannelSignal::Opened,
      frame(r#"{"event_type": "resource_started", "resource_type": "items"}"#),
      ChannelSignal::Ended,
    ]);

    assert_eq!(c.phase(), ScanPhase::Failed);
    assert_eq!(c.session().failure().unwrap().message, CONNECTION_LOST);
  }

  #[test]
  fn transport_failure_is_a_failure() {
    let c = run(vec![ChannelSignal::Failed("502 Bad Gateway".into())]);

    assert_eq!(c.phase(), ScanPhase::Failed);
    assert_eq!(c.session().failure().unwrap().message, CONNECTION_LOST);
    assert!(!c.session().channel().is_open());
  }

  #[test]
  fn drained_channel_never_counts_as_success() {
    let c = run(vec![frame(r#"{"event_type": "scan_started"}"#)]);
    assert_eq!(c.phase(), ScanPhase::Failed);
  }
}

use async_trait::async_trait;

use crate::domain::ids::GameId;

/// Address of a scan event stream: the job path segment plus query values.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StreamRequest {
  pub job_id: GameId,
  pub query: Vec<(String, String)>,
}

impl StreamRequest {
  pub fn new(job_id: GameId) -> Self {
    Self { job_id, query: Vec::new() }
  }

  pub fn with_query(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
    self.query.push((key.into(), value.into()));
    self
  }
}

/// What the transport reports while a channel is open.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ChannelSignal {
  /// The server accepted the connection.
  Opened,
  /// One frame. `event` is the SSE event name (`message` when unnamed).
  Frame { event: String, data: String },
  /// The connection failed; no more frames will follow.
  Failed(String),
  /// The server closed the stream.
  Ended,
}

#[derive(Debug, thiserror::Error)]
pub enum ChannelError {
  #[error("invalid stream address: {0}")]
  Address(String),

  #[error("transport error: {0}")]
  Transport(String),
}

/// Server-push channel carrying scan events.
///
/// At most one connection is open per channel. `open` on an open channel
/// replaces the previous connection, so events from the old one are never
/// delivered. Opening does not wait for the server: the outcome arrives as
/// a signal.
#[async_trait]
pub trait ScanChannel: Send {
  fn open(&mut self, request: &StreamRequest) -> Result<(), ChannelError>;

  /// Idempotent. Pending signals of the closed connection are dropped.
  fn close(&mut self);

  fn is_open(&self) -> bool;

  /// Next signal in delivery order, or `None` once the channel is closed
  /// and drained.
  async fn next_signal(&mut self) -> Option<ChannelSignal>;
}

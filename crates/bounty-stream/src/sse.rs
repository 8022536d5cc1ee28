use async_trait::async_trait;
use bounty_core::ports::{ChannelError, ChannelSignal, ScanChannel, StreamRequest};
use futures::StreamExt;
use reqwest_eventsource::{Event, EventSource, retry};
use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use url::Url;

/// Builds `{base}/games/{job}/scan/stream?{query}`.
pub fn stream_url(base: &Url, request: &StreamRequest) -> Result<Url, ChannelError> {
  let mut url = base.clone();
  let job = request.job_id.to_string();

  url
    .path_segments_mut()
    .map_err(|_| ChannelError::Address(format!("{base} cannot be a base URL")))?
    .pop_if_empty()
    .extend(["games", job.as_str(), "scan", "stream"]);

  if !request.query.is_empty() {
    let mut pairs = url.query_pairs_mut();
    for (k, v) in &request.query {
      pairs.append_pair(k, v);
    }
  }

  Ok(url)
}

/// Scan event stream over server-sent events.
///
/// Each connection runs in its own task and forwards into an unbounded
/// queue. Closing aborts that task and drops the queue, so nothing from a
/// replaced connection is ever read.
pub struct SseChannel {
  base: Url,
  client: reqwest::Client,
  receiver: Option<mpsc::UnboundedReceiver<ChannelSignal>>,
  task: Option<JoinHandle<()>>,
}

impl SseChannel {
  pub fn new(base: Url) -> Self {
    Self::with_client(base, reqwest::Client::new())
  }

  pub fn with_client(base: Url, client: reqwest::Client) -> Self {
    Self { base, client, receiver: None, task: None }
  }

  pub fn base(&self) -> &Url {
    &self.base
  }
}

impl std::fmt::Debug for SseChannel {
  fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
    f.debug_struct("SseChannel")
      .field("base", &self.base.as_str())
      .field("open", &self.is_open())
      .finish()
  }
}

#[async_trait]
impl ScanChannel for SseChannel {
  fn open(&mut self, request: &StreamRequest) -> Result<(), ChannelError> {
    self.close();

    let url = stream_url(&self.base, request)?;
    let runtime = tokio::runtime::Handle::try_current()
      .map_err(|e| ChannelError::Transport(format!("no async runtime: {e}")))?;

    log::info!("Opening scan stream: {url}");

    let mut source = EventSource::new(self.client.get(url.clone()))
      .map_err(|e| ChannelError::Transport(e.to_string()))?;
    // Reconnecting would replay a stream the server already closed.
    source.set_retry_policy(Box::new(retry::Never));

    let (tx, rx) = mpsc::unbounded_channel();
    let task = runtime.spawn(async move {
      let mut finished = false;
      while let Some(event) = source.next().await {
        let signal = match event {
          Ok(Event::Open) => ChannelSignal::Opened,
          Ok(Event::Message(msg)) => ChannelSignal::Frame { event: msg.event, data: msg.data },
          Err(reqwest_eventsource::Error::StreamEnded) => {
            log::debug!("Scan stream ended: {url}");
            finished = true;
            ChannelSignal::Ended
          }
          Err(e) => {
            log::warn!("Scan stream error on {url}: {e}");
            finished = true;
            ChannelSignal::Failed(e.to_string())
          }
        };

        // A send error means the receiver was dropped.
        if tx.send(signal).is_err() || finished {
          break;
        }
      }

      source.close();
      if !finished {
        let _ = tx.send(ChannelSignal::Ended);
      }
    });

    self.receiver = Some(rx);
    self.task = Some(task);
    Ok(())
  }

  fn close(&mut self) {
    if let Some(task) = self.task.take() {
      task.abort();
      log::debug!("Scan stream closed: {}", self.base);
    }
    self.receiver = None;
  }

  fn is_open(&self) -> bool {
    self.receiver.is_some()
  }

  async fn next_signal(&mut self) -> Option<ChannelSignal> {
    match self.receiver.as_mut() {
      Some(rx) => rx.recv().await,
      None => None,
    }
  }
}

impl Drop for SseChannel {
  fn drop(&mut self) {
    self.close();
  }
}

#[cfg(test)]
mod tests {
  use super::*;
  use bounty_core::domain::GameId;
  use tokio::io::{AsyncReadExt, AsyncWriteExt};
  use tokio::net::TcpListener;

  fn request() -> StreamRequest {
    StreamRequest::new(GameId(5)).with_query("language", "eng")
  }

  #[test]
  fn builds_stream_url_with_encoded_query() {
    let base = Url::parse("http://127.0.0.1:8000").unwrap();
    let req = StreamRequest::new(GameId(12)).with_query("language", "pt br");

    let url = stream_url(&base, &req).unwrap();
    assert_eq!(url.as_str(), "http://127.0.0.1:8000/games/12/scan/stream?language=pt+br");
  }

  #[test]
  fn stream_url_keeps_base_path() {
    let base = Url::parse("http://host/app/").unwrap();
    let url = stream_url(&base, &StreamRequest::new(GameId(3))).unwrap();
    assert_eq!(url.as_str(), "http://host/app/games/3/scan/stream");
  }

  #[test]
  fn stream_url_rejects_opaque_base() {
    let base = Url::parse("mailto:someone@example.com").unwrap();
    assert!(matches!(stream_url(&base, &request()), Err(ChannelError::Address(_))));
  }

  #[test]
  fn open_outside_runtime_is_a_transport_error() {
    let mut channel = SseChannel::new(Url::parse("http://127.0.0.1:1").unwrap());
    assert!(matches!(channel.open(&request()), Err(ChannelError::Transport(_))));
    assert!(!channel.is_open());
  }

  #[tokio::test]
  async fn delivers_frames_then_end() {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();

    let server = tokio::spawn(async move {
      let (mut socket, _) = listener.accept().await.unwrap();
      let mut buf = vec![0u8; 4096];
      let n = socket.read(&mut buf).await.unwrap();
      let head = String::from_utf8_lossy(&buf[..n]).to_string();

      socket
        .write_all(
          b"HTTP/1.1 200 OK\r\ncontent-type: text/event-stream\r\nconnection: close\r\n\r\n\
            data: {\"type\":\"scan_started\"}\n\n",
        )
        .await
        .unwrap();
      socket.shutdown().await.unwrap();
      head
    });

    let mut channel = SseChannel::new(Url::parse(&format!("http://{addr}")).unwrap());
    channel.open(&request()).unwrap();
    assert!(channel.is_open());

    assert_eq!(channel.next_signal().await, Some(ChannelSignal::Opened));
    assert_eq!(
      channel.next_signal().await,
      Some(ChannelSignal::Frame {
        event: "message".into(),
        data: r#"{"type":"scan_started"}"#.into()
      })
    );
    assert_eq!(channel.next_signal().await, Some(ChannelSignal::Ended));

    let head = server.await.unwrap();
    assert!(head.starts_with("GET /games/5/scan/stream?language=eng "));
  }

  #[tokio::test]
  async fn refused_connection_reports_failure() {
    let addr = {
      let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
      listener.local_addr().unwrap()
    };

    let mut channel = SseChannel::new(Url::parse(&format!("http://{addr}")).unwrap());
    channel.open(&request()).unwrap();

    assert!(matches!(channel.next_signal().await, Some(ChannelSignal::Failed(_))));
  }

  #[tokio::test]
  async fn close_drops_pending_signals() {
    let mut channel = SseChannel::new(Url::parse("http://127.0.0.1:1").unwrap());
    channel.open(&request()).unwrap();
    channel.close();
    channel.close();

    assert!(!channel.is_open());
    assert_eq!(channel.next_signal().await, None);
  }
}

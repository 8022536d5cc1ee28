//! Server-sent-events transport for scan progress streams.

mod sse;

pub use sse::{SseChannel, stream_url};

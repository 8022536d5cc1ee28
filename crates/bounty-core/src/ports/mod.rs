pub mod catalog;
pub mod channel;
pub mod renderer;

pub use catalog::{ApiError, CatalogApi};
pub use channel::{ChannelError, ChannelSignal, ScanChannel, StreamRequest};
pub use renderer::{Panel, ScanRenderer};

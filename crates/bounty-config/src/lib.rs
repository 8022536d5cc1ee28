mod backend;
mod client;
mod io;
mod paths;

pub use backend::{ConfigBackend, TomlConfigBackend};
pub use client::ClientConfig;
pub use io::atomic_write_str;
pub use paths::{BountyPaths, ConfigError};

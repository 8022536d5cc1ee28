use directories::ProjectDirs;
use std::path::{Path, PathBuf};
use thiserror::Error;

/// Overrides the platform directories; everything lives under this base.
pub const BASE_DIR_ENV: &str = "BOUNTY_BASE_DIR";

#[derive(Debug, Error)]
pub enum ConfigError {
  #[error("io error: {0}")]
  Io(#[from] std::io::Error),
  #[error("toml error: {0}")]
  Toml(#[from] toml::de::Error),
  #[error("directories error: could not determine home directory")]
  Directories,
  #[error("other: {0}")]
  Other(String),
}

#[derive(Debug, Clone)]
pub struct BountyPaths {
  pub base_dir: PathBuf,
  pub config_dir: PathBuf,
}

impl BountyPaths {
  /// Uses `BOUNTY_BASE_DIR` when set, the platform config dir otherwise.
  /// Creates the directories.
  pub fn detect() -> Result<Self, ConfigError> {
    let paths = match std::env::var(BASE_DIR_ENV) {
      Ok(env_base) if !env_base.trim().is_empty() => Self::under(env_base),
      _ => {
        let proj_dirs =
          ProjectDirs::from("com", "bounty", "bounty").ok_or(ConfigError::Directories)?;
        let config_dir = proj_dirs.config_dir().to_path_buf();
        Self { base_dir: config_dir.clone(), config_dir }
      }
    };

    std::fs::create_dir_all(&paths.config_dir)?;
    Ok(paths)
  }

  /// Layout rooted at `base`. Does not touch the filesystem.
  pub fn under(base: impl AsRef<Path>) -> Self {
    let base = base.as_ref().to_path_buf();
    Self { config_dir: base.join("config"), base_dir: base }
  }

  pub fn config_file(&self) -> PathBuf {
    self.config_dir.join("bounty.toml")
  }
}

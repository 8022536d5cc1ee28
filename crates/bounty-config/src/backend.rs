use crate::io::atomic_write_str;
use crate::paths::{BountyPaths, ConfigError};
use serde::Serialize;
use serde::de::DeserializeOwned;
use std::fs;
use std::io::ErrorKind;

// toml_edit keeps the user's comments and layout when a section is rewritten.
use toml_edit::{DocumentMut, Item};

pub trait ConfigBackend {
  fn load_section<T: DeserializeOwned>(&self, section: &str) -> Result<T, ConfigError>;

  /// Like `load_section`, but a missing file or section yields `T::default()`.
  fn load_section_with_default<T>(&self, section: &str) -> Result<T, ConfigError>
  where
    T: DeserializeOwned + Default;

  fn save_section<T: Serialize>(&self, section: &str, value: &T) -> Result<(), ConfigError>;
}

#[derive(Debug, Clone)]
pub struct TomlConfigBackend {
  paths: BountyPaths,
}

impl TomlConfigBackend {
  pub fn new(paths: BountyPaths) -> Self {
    Self { paths }
  }

  pub fn detect() -> Result<Self, ConfigError> {
    Ok(Self::new(BountyPaths::detect()?))
  }

  pub fn paths(&self) -> &BountyPaths {
    &self.paths
  }

  fn read_table(&self) -> Result<Option<toml::Table>, ConfigError> {
    let path = self.paths.config_file();
    let content = match fs::read_to_string(&path) {
      Ok(c) => c,
      Err(e) if e.kind() == ErrorKind::NotFound => return Ok(None),
      Err(e) => return Err(e.into()),
    };

    Ok(Some(toml::from_str(&content)?))
  }
}

fn decode<T: DeserializeOwned>(section: &str, value: &toml::Value) -> Result<T, ConfigError> {
  value
    .clone()
    .try_into()
    .map_err(|e| ConfigError::Other(format!("decode section [{section}]: {e}")))
}

impl ConfigBackend for TomlConfigBackend {
  fn load_section<T: DeserializeOwned>(&self, section: &str) -> Result<T, ConfigError> {
    let path = self.paths.config_file();
    let table = self
      .read_table()?
      .ok_or_else(|| ConfigError::Other(format!("config file {:?} does not exist", path)))?;

    let value = table
      .get(section)
      .ok_or_else(|| ConfigError::Other(format!("missing section [{section}] in {:?}", path)))?;

    decode(section, value)
  }

  fn load_section_with_default<T>(&self, section: &str) -> Result<T, ConfigError>
  where
    T: DeserializeOwned + Default,
  {
    let Some(table) = self.read_table()? else {
      return Ok(T::default());
    };

    match table.get(section) {
      Some(value) => decode(section, value),
      None => Ok(T::default()),
    }
  }

  fn save_section<T: Serialize>(&self, section: &str, value: &T) -> Result<(), ConfigError> {
    let path = self.paths.config_file();

    // 1) Current document, or an empty one.
    let mut doc: DocumentMut = match fs::read_to_string(&path) {
      Ok(content) => content
        .parse::<DocumentMut>()
        .map_err(|e| ConfigError::Other(format!("parse toml_edit doc: {e}")))?,
      Err(e) if e.kind() == ErrorKind::NotFound => DocumentMut::new(),
      Err(e) => return Err(e.into()),
    };

    // 2) Section body as a headerless document ("foo = 1\nbar = 2\n").
    let section_str = toml::to_string(value)
      .map_err(|e| ConfigError::Other(format!("encode section [{section}]: {e}")))?;
    let section_doc = section_str
      .parse::<DocumentMut>()
      .map_err(|e| ConfigError::Other(format!("parse section as doc: {e}")))?;

    // 3) Replace only that section; comments elsewhere survive.
    doc[section] = Item::Table(section_doc.as_table().clone());

    if let Some(parent) = path.parent() {
      fs::create_dir_all(parent)?;
    }
    atomic_write_str(&path, &doc.to_string())?;
    log::debug!("wrote section [{section}] to {:?}", path);

    Ok(())
  }
}

#[cfg(test)]
mod tests {
  use super::*;
  use serde::Deserialize;
  use tempfile::tempdir;

  #[derive(Debug, Default, PartialEq, Serialize, Deserialize)]
  struct Section {
    name: String,
    retries: u32,
  }

  #[test]
  fn missing_file_yields_default() {
    let tmp = tempdir().unwrap();
    let backend = TomlConfigBackend::new(BountyPaths::under(tmp.path()));

    let s: Section = backend.load_section_with_default("client").unwrap();
    assert_eq!(s, Section::default());
    assert!(backend.load_section::<Section>("client").is_err());
  }

  #[test]
  fn save_preserves_other_sections_and_comments() {
    let tmp = tempdir().unwrap();
    let paths = BountyPaths::under(tmp.path());
    fs::create_dir_all(&paths.config_dir).unwrap();
    fs::write(paths.config_file(), "# my notes\n[other]\nkeep = true\n").unwrap();

    let backend = TomlConfigBackend::new(paths.clone());
    backend.save_section("client", &Section { name: "x".into(), retries: 2 }).unwrap();

    let written = fs::read_to_string(paths.config_file()).unwrap();
    assert!(written.contains("# my notes"));
    assert!(written.contains("keep = true"));

    let s: Section = backend.load_section("client").unwrap();
    assert_eq!(s, Section { name: "x".into(), retries: 2 });
  }
}

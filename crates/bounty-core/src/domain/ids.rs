use serde::{Deserialize, Serialize};
use std::fmt;
use uuid::Uuid;

/// Identifies one scan session on the client side.
///
/// The server never sees it; it only exists so log lines from a retry can be
/// told apart from the attempt that preceded it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct SessionId(Uuid);

impl SessionId {
  pub fn new() -> Self {
    SessionId(Uuid::new_v4())
  }

  pub fn as_uuid(&self) -> Uuid {
    self.0
  }
}

impl Default for SessionId {
  fn default() -> Self {
    Self::new()
  }
}

impl From<Uuid> for SessionId {
  fn from(u: Uuid) -> Self {
    SessionId(u)
  }
}

impl fmt::Display for SessionId {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    self.0.fmt(f)
  }
}

/// Server-side identifiers are plain integers; the newtypes only keep a game
/// id from being passed where a profile id is expected.
macro_rules! numeric_id {
  ($(#[$meta:meta])* $name:ident) => {
    $(#[$meta])*
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
    #[serde(transparent)]
    pub struct $name(pub u64);

    impl From<u64> for $name {
      fn from(v: u64) -> Self {
        $name(v)
      }
    }

    impl fmt::Display for $name {
      fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
      }
    }
  };
}

numeric_id!(
  /// A game installation known to the server. Also the job id of its scan stream.
  GameId
);
numeric_id!(ProfileId);
numeric_id!(ItemId);
numeric_id!(ShopId);
numeric_id!(LocationId);

use thiserror::Error;

use crate::ports::ApiError;

/// Input rejected before any network action.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
  #[error("Please select a language")]
  MissingLanguage,

  #[error("A scan is already running")]
  SessionActive,

  #[error("There is no previous scan to retry")]
  NothingToRetry,

  #[error("Please select a shop")]
  MissingShop,

  #[error("Quantity must be between 0 and {max}")]
  CountOutOfRange { max: u32 },
}

/// Core error. Front ends map it to user messages or logs.
#[derive(Debug, Error)]
pub enum CoreError {
  #[error(transparent)]
  Validation(#[from] ValidationError),

  #[error("api error: {0}")]
  Api(#[from] ApiError),
}

//! Error types for `ringplan-core`.

use thiserror::Error;
use uuid::Uuid;

#[derive(Debug, Error)]
pub enum Error {
  #[error("domain not found: {0}")]
  DomainNotFound(Uuid),

  #[error("invalid timeout action: {0:?}")]
  InvalidTimeoutAction(String),

  #[error("unknown ring strategy: {0:?}")]
  UnknownStrategy(String),
}

pub type Result<T, E = Error> = std::result::Result<T, E>;

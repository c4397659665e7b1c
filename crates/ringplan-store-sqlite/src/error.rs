//! Error type for `ringplan-store-sqlite`.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum Error {
  #[error("core error: {0}")]
  Core(#[from] ringplan_core::Error),

  #[error("database error: {0}")]
  Database(#[from] tokio_rusqlite::Error),

  #[error("uuid parse error: {0}")]
  Uuid(#[from] uuid::Error),

  #[error("date/time parse error: {0}")]
  DateParse(String),

  #[error("dialplan not found: {0}")]
  DialplanNotFound(uuid::Uuid),

  #[error("ring group not found: {0}")]
  RingGroupNotFound(uuid::Uuid),
}

pub type Result<T, E = Error> = std::result::Result<T, E>;

use std::path::PathBuf;

use thiserror::Error;

/// Crate-wide result type.
pub type Result<T> = std::result::Result<T, Error>;

/// Failures that stop a run. Per-video lookup failures never end up here,
/// they are recorded as a `Status` instead.
#[derive(Debug, Error)]
pub enum Error {
  #[error("{path}: missing column `{column}`")]
  MissingColumn { path: PathBuf, column: String },

  #[error("invalid configuration: {0}")]
  InvalidConfig(String),

  #[error(transparent)]
  Io(#[from] std::io::Error),

  #[error(transparent)]
  Csv(#[from] csv::Error),

  #[error(transparent)]
  Http(#[from] reqwest::Error),
}

impl Error {
  pub(crate) fn config(message: impl Into<String>) -> Self {
    Self::InvalidConfig(message.into())
  }
}

impl From<tempfile::PersistError> for Error {
  fn from(err: tempfile::PersistError) -> Self {
    Self::Io(err.error)
  }
}

//! Error types for `mkwawa-core`.

use serde::Serialize;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum Error {
  #[error("invalid {field}: {message}")]
  Validation {
    field:   &'static str,
    message: String,
  },

  #[error("sacrament invariant violated: {0}")]
  SacramentInvariant(String),

  #[error("an evangelist must be assigned to an outstation")]
  EvangelistOutstationRequired,

  #[error("singleton violated: {0}")]
  SingletonViolation(String),

  #[error("year {0} is the current year and cannot be deleted")]
  CurrentYearLocked(i32),

  #[error("no current year is set")]
  CurrentYearMissing,

  #[error("invalid year {year}: {reason}")]
  InvalidYear { year: i32, reason: String },

  #[error("{entity} not found: {id}")]
  NotFound { entity: &'static str, id: String },

  #[error("conflict: {0}")]
  Conflict(String),

  #[error("{0} is still referenced and cannot be deleted")]
  Protected(String),

  #[error("permission denied")]
  PermissionDenied,

  #[error("could not generate a unique {0}")]
  IdExhaustion(&'static str),

  #[error("file storage error: {0}")]
  FileStorage(#[from] crate::collab::StorageError),

  #[error("storage error: {0}")]
  Storage(#[source] Box<dyn std::error::Error + Send + Sync>),
}

/// Coarse classification of [`Error`], used at the HTTP boundary.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ErrorKind {
  Validation,
  Invariant,
  NotFound,
  Conflict,
  PermissionDenied,
  Internal,
}

impl Error {
  pub fn validation(field: &'static str, message: impl Into<String>) -> Self {
    Self::Validation { field, message: message.into() }
  }

  pub fn not_found(entity: &'static str, id: impl ToString) -> Self {
    Self::NotFound { entity, id: id.to_string() }
  }

  pub fn sacrament(message: impl Into<String>) -> Self {
    Self::SacramentInvariant(message.into())
  }

  pub fn kind(&self) -> ErrorKind {
    match self {
      Self::Validation { .. } | Self::InvalidYear { .. } => ErrorKind::Validation,
      Self::SacramentInvariant(_)
      | Self::EvangelistOutstationRequired
      | Self::SingletonViolation(_)
      | Self::CurrentYearLocked(_)
      | Self::CurrentYearMissing => ErrorKind::Invariant,
      Self::NotFound { .. } => ErrorKind::NotFound,
      Self::Conflict(_) | Self::Protected(_) => ErrorKind::Conflict,
      Self::PermissionDenied => ErrorKind::PermissionDenied,
      Self::IdExhaustion(_) | Self::FileStorage(_) | Self::Storage(_) => {
        ErrorKind::Internal
      }
    }
  }
}

pub type Result<T, E = Error> = std::result::Result<T, E>;

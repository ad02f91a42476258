//! Error type for `mkwawa-store-sqlite`.

use rusqlite::ErrorCode;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum Error {
  #[error("core error: {0}")]
  Core(#[from] mkwawa_core::Error),

  #[error("database error: {0}")]
  Database(#[from] tokio_rusqlite::Error),

  #[error("sqlite error: {0}")]
  Sqlite(#[from] rusqlite::Error),

  #[error("uuid parse error: {0}")]
  Uuid(#[from] uuid::Error),

  #[error("decimal parse error: {0}")]
  Decimal(#[from] rust_decimal::Error),

  #[error("date/time parse error: {0}")]
  DateParse(String),

  /// A stored enum label that no longer maps to a variant.
  #[error("unknown {what}: {value:?}")]
  UnknownLabel { what: &'static str, value: String },
}

pub type Result<T, E = Error> = std::result::Result<T, E>;

fn constraint_message(e: &rusqlite::Error) -> Option<String> {
  match e {
    rusqlite::Error::SqliteFailure(f, msg) if f.code == ErrorCode::ConstraintViolation => {
      Some(msg.clone().unwrap_or_else(|| f.to_string()))
    }
    _ => None,
  }
}

impl From<Error> for mkwawa_core::Error {
  /// Domain errors pass through; unique/foreign-key breaches become
  /// `Conflict`; everything else is an opaque storage failure.
  fn from(e: Error) -> Self {
    let constraint = match &e {
      Error::Sqlite(inner) => constraint_message(inner),
      Error::Database(tokio_rusqlite::Error::Rusqlite(inner)) => constraint_message(inner),
      _ => None,
    };
    match (e, constraint) {
      (Error::Core(core), _) => core,
      (_, Some(message)) => mkwawa_core::Error::Conflict(message),
      (other, None) => mkwawa_core::Error::Storage(Box::new(other)),
    }
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn core_errors_pass_through() {
    let e: mkwawa_core::Error = Error::Core(mkwawa_core::Error::CurrentYearMissing).into();
    assert!(matches!(e, mkwawa_core::Error::CurrentYearMissing));
  }

  #[test]
  fn unique_breach_is_a_conflict() {
    let conn = rusqlite::Connection::open_in_memory().unwrap();
    conn
      .execute_batch("CREATE TABLE t (x TEXT UNIQUE); INSERT INTO t VALUES ('a');")
      .unwrap();
    let err = conn.execute("INSERT INTO t VALUES ('a')", []).unwrap_err();
    let e: mkwawa_core::Error = Error::Sqlite(err).into();
    assert!(matches!(e, mkwawa_core::Error::Conflict(_)));
  }

  #[test]
  fn other_failures_are_storage() {
    let e: mkwawa_core::Error = Error::DateParse("nope".into()).into();
    assert_eq!(e.kind(), mkwawa_core::ErrorKind::Internal);
  }
}

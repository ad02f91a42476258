//! External collaborators: SMS transport, elevation lookup and file storage.
//!
//! The core only depends on these traits. Failures of the SMS gateway and the
//! elevation service are logged and swallowed by [`crate::parish::Parish`];
//! a failed file `put` aborts the upload it belongs to.

use std::future::Future;

use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SmsReceipt {
  /// Status name as reported by the gateway.
  pub status:     String,
  pub request_id: String,
}

#[derive(Debug, Error)]
pub enum SmsError {
  #[error("sms gateway is not configured")]
  NotConfigured,
  #[error("sms gateway rejected the message: {0}")]
  Rejected(String),
  #[error("sms transport error: {0}")]
  Transport(#[source] Box<dyn std::error::Error + Send + Sync>),
}

pub trait SmsGateway: Send + Sync {
  fn send(
    &self,
    to: &str,
    message: &str,
  ) -> impl Future<Output = Result<SmsReceipt, SmsError>> + Send;
}

#[derive(Debug, Error)]
pub enum ElevationError {
  #[error("elevation service returned no result")]
  NoResult,
  #[error("elevation transport error: {0}")]
  Transport(#[source] Box<dyn std::error::Error + Send + Sync>),
}

pub trait ElevationService: Send + Sync {
  /// Altitude in metres above sea level.
  fn lookup(
    &self,
    latitude: f64,
    longitude: f64,
  ) -> impl Future<Output = Result<f64, ElevationError>> + Send;
}

#[derive(Debug, Error)]
pub enum StorageError {
  #[error("invalid storage path: {0}")]
  InvalidPath(String),
  #[error("io error: {0}")]
  Io(#[from] std::io::Error),
}

/// A file received from a client.
#[derive(Debug, Clone)]
pub struct Upload {
  pub file_name: String,
  pub bytes:     Vec<u8>,
}

pub trait FileStorage: Send + Sync {
  /// Store `bytes` under `path` and return the final stored path, which may
  /// differ from the requested one.
  fn put(
    &self,
    path: &str,
    bytes: Vec<u8>,
  ) -> impl Future<Output = Result<String, StorageError>> + Send;

  /// Remove a stored file. Deleting a missing file succeeds.
  fn delete(&self, path: &str) -> impl Future<Output = Result<(), StorageError>> + Send;
}

/// The set of collaborators a [`crate::parish::Parish`] is wired with.
pub trait Collaborators: Send + Sync + 'static {
  type Sms: SmsGateway;
  type Elevation: ElevationService;
  type Files: FileStorage;

  fn sms(&self) -> &Self::Sms;
  fn elevation(&self) -> &Self::Elevation;
  fn files(&self) -> &Self::Files;
}

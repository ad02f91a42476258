//! In-process collaborators for tests: a recording SMS gateway, a fixed
//! elevation service and an in-memory file store.

use std::{
  collections::BTreeMap,
  sync::{
    Mutex,
    atomic::{AtomicBool, AtomicUsize, Ordering},
  },
};

use crate::collab::{
  Collaborators, ElevationError, ElevationService, FileStorage, SmsError,
  SmsGateway, SmsReceipt, StorageError,
};

#[derive(Debug, Default)]
pub struct RecordingSms {
  pub sent: Mutex<Vec<(String, String)>>,
  pub fail: AtomicBool,
  counter:  AtomicUsize,
}

impl RecordingSms {
  pub fn messages(&self) -> Vec<(String, String)> {
    self.sent.lock().map(|m| m.clone()).unwrap_or_default()
  }
}

impl SmsGateway for RecordingSms {
  async fn send(&self, to: &str, message: &str) -> Result<SmsReceipt, SmsError> {
    if self.fail.load(Ordering::SeqCst) {
      return Err(SmsError::Rejected("gateway down".into()));
    }
    if let Ok(mut sent) = self.sent.lock() {
      sent.push((to.to_owned(), message.to_owned()));
    }
    let n = self.counter.fetch_add(1, Ordering::SeqCst);
    Ok(SmsReceipt { status: "PENDING".into(), request_id: format!("req-{n}") })
  }
}

/// Returns `altitude`, or fails when it is `None`.
#[derive(Debug, Default)]
pub struct FixedElevation {
  pub altitude: Option<f64>,
}

impl ElevationService for FixedElevation {
  async fn lookup(&self, _latitude: f64, _longitude: f64) -> Result<f64, ElevationError> {
    self.altitude.ok_or(ElevationError::NoResult)
  }
}

#[derive(Debug, Default)]
pub struct MemoryFiles {
  pub files: Mutex<BTreeMap<String, Vec<u8>>>,
  pub fail:  AtomicBool,
}

impl MemoryFiles {
  pub fn paths(&self) -> Vec<String> {
    self.files.lock().map(|f| f.keys().cloned().collect()).unwrap_or_default()
  }
}

impl FileStorage for MemoryFiles {
  async fn put(&self, path: &str, bytes: Vec<u8>) -> Result<String, StorageError> {
    if self.fail.load(Ordering::SeqCst) {
      return Err(std::io::Error::other("disk full").into());
    }
    let mut files = self
      .files
      .lock()
      .map_err(|_| StorageError::InvalidPath(path.to_owned()))?;
    let mut stored = path.to_owned();
    let mut n = 1;
    while files.contains_key(&stored) {
      stored = format!("{path}.{n}");
      n += 1;
    }
    files.insert(stored.clone(), bytes);
    Ok(stored)
  }

  async fn delete(&self, path: &str) -> Result<(), StorageError> {
    if let Ok(mut files) = self.files.lock() {
      files.remove(path);
    }
    Ok(())
  }
}

#[derive(Debug, Default)]
pub struct Fakes {
  pub sms:       RecordingSms,
  pub elevation: FixedElevation,
  pub files:     MemoryFiles,
}

impl Fakes {
  pub fn with_altitude(altitude: f64) -> Self {
    Self { elevation: FixedElevation { altitude: Some(altitude) }, ..Default::default() }
  }
}

impl Collaborators for Fakes {
  type Elevation = FixedElevation;
  type Files = MemoryFiles;
  type Sms = RecordingSms;

  fn sms(&self) -> &RecordingSms { &self.sms }

  fn elevation(&self) -> &FixedElevation { &self.elevation }

  fn files(&self) -> &MemoryFiles { &self.files }
}

//! Local-disk file storage under the configured media root.
//!
//! Stored paths are relative to the root. When the requested path is taken
//! by a file with different content, a short SHA-256 prefix of the new
//! content is inserted before the extension; re-uploading identical content
//! reuses the existing file.

use std::path::{Component, Path, PathBuf};

use mkwawa_core::collab::{FileStorage, StorageError};
use sha2::{Digest, Sha256};
use tokio::fs;
use tracing::debug;

#[derive(Debug, Clone)]
pub struct LocalFiles {
  root: PathBuf,
}

impl LocalFiles {
  pub fn new(root: impl Into<PathBuf>) -> Self { Self { root: root.into() } }

  /// Resolve a stored path, refusing anything that could leave the root.
  fn resolve(&self, path: &str) -> Result<PathBuf, StorageError> {
    let relative = Path::new(path);
    let clean = !path.is_empty()
      && relative
        .components()
        .all(|c| matches!(c, Component::Normal(_)));
    if !clean {
      return Err(StorageError::InvalidPath(path.to_owned()));
    }
    Ok(self.root.join(relative))
  }
}

fn content_hash(bytes: &[u8]) -> String { hex::encode(Sha256::digest(bytes)) }

/// `dir/name.ext` → `dir/name_<tag>.ext`
fn tagged(path: &str, tag: &str) -> String {
  let (dir, file) = match path.rsplit_once('/') {
    Some((dir, file)) => (Some(dir), file),
    None => (None, path),
  };
  let file = match file.rsplit_once('.') {
    Some((stem, ext)) if !stem.is_empty() => format!("{stem}_{tag}.{ext}"),
    _ => format!("{file}_{tag}"),
  };
  match dir {
    Some(dir) => format!("{dir}/{file}"),
    None => file,
  }
}

impl FileStorage for LocalFiles {
  async fn put(&self, path: &str, bytes: Vec<u8>) -> Result<String, StorageError> {
    let hash = content_hash(&bytes);
    let mut stored = path.to_owned();
    let mut target = self.resolve(&stored)?;

    if let Ok(existing) = fs::read(&target).await {
      if content_hash(&existing) == hash {
        debug!(path = %stored, "identical file already stored");
        return Ok(stored);
      }
      stored = tagged(path, &hash[..8]);
      target = self.resolve(&stored)?;
    }

    if let Some(parent) = target.parent() {
      fs::create_dir_all(parent).await?;
    }
    fs::write(&target, &bytes).await?;
    debug!(path = %stored, size = bytes.len(), "file stored");
    Ok(stored)
  }

  async fn delete(&self, path: &str) -> Result<(), StorageError> {
    let target = self.resolve(path)?;
    match fs::remove_file(&target).await {
      Ok(()) => Ok(()),
      Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
      Err(e) => Err(e.into()),
    }
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  fn temp_root() -> LocalFiles {
    LocalFiles::new(std::env::temp_dir().join(format!("mkwawa-media-{}", uuid::Uuid::new_v4())))
  }

  #[tokio::test]
  async fn put_then_delete() {
    let files = temp_root();
    let stored = files.put("passports/neema.jpg", b"jpeg".to_vec()).await.unwrap();
    assert_eq!(stored, "passports/neema.jpg");
    assert_eq!(fs::read(files.root.join(&stored)).await.unwrap(), b"jpeg");

    files.delete(&stored).await.unwrap();
    assert!(fs::metadata(files.root.join(&stored)).await.is_err());
    // A second delete of the same path succeeds.
    files.delete(&stored).await.unwrap();
    fs::remove_dir_all(&files.root).await.ok();
  }

  #[tokio::test]
  async fn colliding_names_get_a_content_tag() {
    let files = temp_root();
    let first = files.put("receipt_uploads/risiti.pdf", b"one".to_vec()).await.unwrap();
    let again = files.put("receipt_uploads/risiti.pdf", b"one".to_vec()).await.unwrap();
    assert_eq!(first, again);

    let second = files.put("receipt_uploads/risiti.pdf", b"two".to_vec()).await.unwrap();
    let tag = &content_hash(b"two")[..8];
    assert_eq!(second, format!("receipt_uploads/risiti_{tag}.pdf"));
    assert_eq!(fs::read(files.root.join(&first)).await.unwrap(), b"one");
    fs::remove_dir_all(&files.root).await.ok();
  }

  #[tokio::test]
  async fn paths_cannot_escape_the_root() {
    let files = temp_root();
    for path in ["../etc/passwd", "/etc/passwd", "passports/../../x", ""] {
      assert!(matches!(
        files.put(path, b"x".to_vec()).await,
        Err(StorageError::InvalidPath(_))
      ));
    }
  }

  #[test]
  fn tags_go_before_the_extension() {
    assert_eq!(tagged("a/b.jpg", "1234"), "a/b_1234.jpg");
    assert_eq!(tagged("a/b", "1234"), "a/b_1234");
    assert_eq!(tagged("a/.hidden", "1234"), "a/.hidden_1234");
  }
}

//! Meadow Host Filesystem
//!
//! Filesystem capability used to reset build state between deployments.
//! Paths are interpreted relative to the implementation's root.

use std::io;
use std::path::{Path, PathBuf};

use async_trait::async_trait;
use tracing::debug;

/// Existence checks and deletion of directories and files.
#[async_trait]
pub trait Filesystem: Send + Sync {
  async fn dir_exists(&self, path: &Path) -> io::Result<bool>;

  /// Recursively delete a directory.
  async fn remove_dir_all(&self, path: &Path) -> io::Result<()>;

  async fn file_exists(&self, path: &Path) -> io::Result<bool>;

  async fn remove_file(&self, path: &Path) -> io::Result<()>;
}

/// Local filesystem rooted at a project directory.
#[derive(Debug, Clone)]
pub struct LocalFilesystem {
  root: PathBuf,
}

impl LocalFilesystem {
  pub fn new(root: impl Into<PathBuf>) -> Self {
    Self { root: root.into() }
  }

  pub fn root(&self) -> &Path {
    &self.root
  }

  fn resolve(&self, path: &Path) -> PathBuf {
    self.root.join(path)
  }
}

#[async_trait]
impl Filesystem for LocalFilesystem {
  async fn dir_exists(&self, path: &Path) -> io::Result<bool> {
    match tokio::fs::metadata(self.resolve(path)).await {
      Ok(meta) => Ok(meta.is_dir()),
      Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(false),
      Err(e) => Err(e),
    }
  }

  async fn remove_dir_all(&self, path: &Path) -> io::Result<()> {
    let full = self.resolve(path);
    debug!(path = %full.display(), "removing directory");
    tokio::fs::remove_dir_all(full).await
  }

  async fn file_exists(&self, path: &Path) -> io::Result<bool> {
    match tokio::fs::metadata(self.resolve(path)).await {
      Ok(meta) => Ok(meta.is_file()),
      Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(false),
      Err(e) => Err(e),
    }
  }

  async fn remove_file(&self, path: &Path) -> io::Result<()> {
    let full = self.resolve(path);
    debug!(path = %full.display(), "removing file");
    tokio::fs::remove_file(full).await
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  #[tokio::test]
  async fn test_directory_lifecycle() {
    let temp = tempfile::tempdir().unwrap();
    std::fs::create_dir_all(temp.path().join("bin/Release")).unwrap();
    std::fs::write(temp.path().join("bin/Release/app.dll"), b"x").unwrap();

    let fs = LocalFilesystem::new(temp.path());
    assert!(fs.dir_exists(Path::new("bin")).await.unwrap());
    fs.remove_dir_all(Path::new("bin")).await.unwrap();
    assert!(!fs.dir_exists(Path::new("bin")).await.unwrap());
  }

  #[tokio::test]
  async fn test_file_lifecycle() {
    let temp = tempfile::tempdir().unwrap();
    std::fs::write(temp.path().join("app.mpak"), b"x").unwrap();

    let fs = LocalFilesystem::new(temp.path());
    assert!(fs.file_exists(Path::new("app.mpak")).await.unwrap());
    // A file is not a directory.
    assert!(!fs.dir_exists(Path::new("app.mpak")).await.unwrap());

    fs.remove_file(Path::new("app.mpak")).await.unwrap();
    assert!(!fs.file_exists(Path::new("app.mpak")).await.unwrap());
  }

  #[tokio::test]
  async fn test_missing_paths() {
    let temp = tempfile::tempdir().unwrap();
    let fs = LocalFilesystem::new(temp.path());

    assert!(!fs.dir_exists(Path::new("obj")).await.unwrap());
    assert!(!fs.file_exists(Path::new("nope.txt")).await.unwrap());
    let err = fs.remove_dir_all(Path::new("obj")).await.unwrap_err();
    assert_eq!(err.kind(), io::ErrorKind::NotFound);
  }
}

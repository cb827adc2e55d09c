//! Temporary certificate directories.

use std::fs;
use std::path::{Path, PathBuf};

use tempfile::TempDir;

/// A temporary directory pre-populated with small placeholder files.
pub struct CertDirGuard {
  temp_dir: TempDir,
}

impl CertDirGuard {
  /// Create an empty certificate directory.
  pub fn new() -> Self {
    Self {
      temp_dir: TempDir::new().expect("Failed to create temporary directory"),
    }
  }

  /// Create a directory holding one placeholder file per name.
  pub fn with_files(names: &[&str]) -> Self {
    let guard = Self::new();
    for name in names {
      guard.add_file(name, b"%PDF-1.4\n% placeholder\n");
    }
    guard
  }

  /// Write `contents` to `name` inside the directory and return its path.
  pub fn add_file(&self, name: &str, contents: &[u8]) -> PathBuf {
    let path = self.temp_dir.path().join(name);
    if let Some(parent) = path.parent() {
      fs::create_dir_all(parent).expect("Failed to create parent directory");
    }
    fs::write(&path, contents).expect("Failed to write placeholder file");
    path
  }

  pub fn path(&self) -> &Path {
    self.temp_dir.path()
  }
}

impl Default for CertDirGuard {
  fn default() -> Self {
    Self::new()
  }
}

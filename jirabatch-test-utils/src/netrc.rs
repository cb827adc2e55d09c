use std::fs;
use std::path::{Path, PathBuf};

use crate::home::HomeEnvTestGuard;

/// RAII guard for test .netrc files
///
/// Creates a temporary HOME containing a `.netrc` with the given content and
/// restores the original HOME when dropped.
pub struct NetrcGuard {
  home: HomeEnvTestGuard,
  netrc_path: PathBuf,
}

impl NetrcGuard {
  /// Create a new NetrcGuard with the given content
  pub fn new(content: &str) -> Self {
    let home = HomeEnvTestGuard::new();
    let netrc_path = home.home_path(".netrc");
    fs::write(&netrc_path, content).expect("Failed to write test .netrc");

    Self { home, netrc_path }
  }

  /// Get the path to the .netrc file
  pub fn netrc_path(&self) -> &Path {
    &self.netrc_path
  }

  /// Get the path to the temporary directory
  pub fn home_dir(&self) -> &Path {
    self.home.home_dir()
  }
}

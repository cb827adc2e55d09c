//! # Attachment Resolution
//!
//! Locates the local file a record wants attached. The default resolver
//! implements the certificate naming convention `{category}_{severity}.{ext}`
//! inside a configured directory; callers only see the
//! [`AttachmentResolver`] trait.

use std::collections::HashSet;
use std::ffi::OsString;
use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use tracing::{debug, warn};

use crate::error::BatchError;
use crate::record::AttachmentSpec;

/// Extensions tried when none are configured.
pub const DEFAULT_EXTENSIONS: &[&str] = &["pdf"];

/// A local file that has been checked to exist and is ready for upload.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AttachmentRef {
  pub path: PathBuf,
}

impl AttachmentRef {
  /// The file name sent to the remote side.
  pub fn file_name(&self) -> String {
    self
      .path
      .file_name()
      .map(|name| name.to_string_lossy().into_owned())
      .unwrap_or_else(|| self.path.display().to_string())
  }
}

/// Resolves attachment requests to local files.
pub trait AttachmentResolver {
  fn resolve(&self, spec: &AttachmentSpec) -> Result<AttachmentRef, BatchError>;
}

/// Resolves attachments from a certificate directory.
#[derive(Debug, Clone)]
pub struct CertificateDirResolver {
  dir: PathBuf,
  extensions: Vec<String>,
}

impl CertificateDirResolver {
  pub fn new(dir: impl Into<PathBuf>, extensions: &[String]) -> Self {
    let extensions: Vec<String> = extensions
      .iter()
      .map(|ext| ext.trim().trim_start_matches('.').to_string())
      .filter(|ext| !ext.is_empty())
      .collect();

    let extensions = if extensions.is_empty() {
      DEFAULT_EXTENSIONS.iter().map(|ext| ext.to_string()).collect()
    } else {
      extensions
    };

    Self {
      dir: dir.into(),
      extensions,
    }
  }

  pub fn dir(&self) -> &Path {
    &self.dir
  }

  pub fn extensions(&self) -> &[String] {
    &self.extensions
  }

  /// Verify the certificate directory exists and can be listed.
  pub fn check_dir(&self) -> Result<()> {
    if !self.dir.is_dir() {
      return Err(anyhow::anyhow!(
        "Certificate directory {} does not exist or is not a directory",
        self.dir.display()
      ));
    }

    fs::read_dir(&self.dir).with_context(|| format!("Certificate directory {} is not readable", self.dir.display()))?;
    Ok(())
  }

  /// Candidate file names for a category/severity pair, in lookup order.
  ///
  /// Case is preserved exactly as given.
  pub fn candidate_names(&self, category: &str, severity: &str) -> Vec<String> {
    self
      .extensions
      .iter()
      .map(|ext| format!("{category}_{severity}.{ext}"))
      .collect()
  }

  fn resolve_convention(&self, category: &str, severity: &str) -> Result<AttachmentRef, BatchError> {
    let candidates = self.candidate_names(category, severity);

    // Compare directory entries byte-for-byte so a case-insensitive
    // filesystem cannot hand back `maneuver_LOW.pdf` for `maneuver_low.pdf`.
    let entries: HashSet<OsString> = match fs::read_dir(&self.dir) {
      Ok(entries) => entries
        .filter_map(|entry| entry.ok())
        .filter(|entry| entry.file_type().map(|t| t.is_file()).unwrap_or(false))
        .map(|entry| entry.file_name())
        .collect(),
      Err(e) => {
        warn!("Failed to list certificate directory {}: {e}", self.dir.display());
        return Err(BatchError::mapping(format!(
          "cannot list certificate directory {}: {e}",
          self.dir.display()
        )));
      }
    };

    for candidate in &candidates {
      if entries.contains(&OsString::from(candidate)) {
        let path = self.dir.join(candidate);
        debug!("Resolved attachment {}", path.display());
        return Ok(AttachmentRef { path });
      }
    }

    Err(BatchError::AttachmentNotFound {
      candidates: candidates.join(" or "),
      dir: self.dir.clone(),
    })
  }

  fn resolve_path(&self, path: &Path) -> Result<AttachmentRef, BatchError> {
    let full_path = if path.is_absolute() {
      path.to_path_buf()
    } else {
      self.dir.join(path)
    };

    if full_path.is_file() {
      debug!("Resolved explicit attachment {}", full_path.display());
      Ok(AttachmentRef { path: full_path })
    } else {
      Err(BatchError::AttachmentNotFound {
        candidates: path.display().to_string(),
        dir: full_path.parent().map(Path::to_path_buf).unwrap_or_else(|| self.dir.clone()),
      })
    }
  }
}

impl AttachmentResolver for CertificateDirResolver {
  fn resolve(&self, spec: &AttachmentSpec) -> Result<AttachmentRef, BatchError> {
    match spec {
      AttachmentSpec::Convention { category, severity } => self.resolve_convention(category, severity),
      AttachmentSpec::Path(path) => self.resolve_path(path),
    }
  }
}

#[cfg(test)]
mod tests {
  use jirabatch_test_utils::CertDirGuard;

  use super::*;

  fn convention(category: &str, severity: &str) -> AttachmentSpec {
    AttachmentSpec::Convention {
      category: category.to_string(),
      severity: severity.to_string(),
    }
  }

  #[test]
  fn test_resolves_exact_match() {
    let certs = CertDirGuard::with_files(&["maneuver_LOW.pdf", "docking_HIGH.pdf"]);
    let resolver = CertificateDirResolver::new(certs.path(), &[]);

    let attachment = resolver.resolve(&convention("maneuver", "LOW")).unwrap();
    assert_eq!(attachment.path, certs.path().join("maneuver_LOW.pdf"));
    assert_eq!(attachment.file_name(), "maneuver_LOW.pdf");
  }

  #[test]
  fn test_severity_case_is_preserved() {
    let certs = CertDirGuard::with_files(&["maneuver_LOW.pdf"]);
    let resolver = CertificateDirResolver::new(certs.path(), &[]);

    let result = resolver.resolve(&convention("maneuver", "low"));
    match result {
      Err(BatchError::AttachmentNotFound { candidates, .. }) => {
        assert_eq!(candidates, "maneuver_low.pdf");
      }
      other => panic!("expected AttachmentNotFound, got {other:?}"),
    }
  }

  #[test]
  fn test_first_extension_wins() {
    let certs = CertDirGuard::with_files(&["maneuver_LOW.png", "maneuver_LOW.pdf"]);
    let resolver = CertificateDirResolver::new(certs.path(), &["png".to_string(), ".pdf".to_string()]);

    let attachment = resolver.resolve(&convention("maneuver", "LOW")).unwrap();
    assert_eq!(attachment.file_name(), "maneuver_LOW.png");

    let resolver = CertificateDirResolver::new(certs.path(), &["pdf".to_string(), "png".to_string()]);
    let attachment = resolver.resolve(&convention("maneuver", "LOW")).unwrap();
    assert_eq!(attachment.file_name(), "maneuver_LOW.pdf");
  }

  #[test]
  fn test_directories_do_not_match() {
    let certs = CertDirGuard::with_files(&[]);
    fs::create_dir(certs.path().join("maneuver_LOW.pdf")).unwrap();
    let resolver = CertificateDirResolver::new(certs.path(), &[]);

    assert!(resolver.resolve(&convention("maneuver", "LOW")).is_err());
  }

  #[test]
  fn test_explicit_path_relative_to_cert_dir() {
    let certs = CertDirGuard::with_files(&["custom.pdf"]);
    let resolver = CertificateDirResolver::new(certs.path(), &[]);

    let attachment = resolver.resolve(&AttachmentSpec::Path(PathBuf::from("custom.pdf"))).unwrap();
    assert_eq!(attachment.path, certs.path().join("custom.pdf"));

    let missing = resolver.resolve(&AttachmentSpec::Path(PathBuf::from("missing.pdf")));
    assert!(matches!(missing, Err(BatchError::AttachmentNotFound { .. })));
  }

  #[test]
  fn test_check_dir() {
    let certs = CertDirGuard::with_files(&[]);
    assert!(CertificateDirResolver::new(certs.path(), &[]).check_dir().is_ok());

    let missing = CertificateDirResolver::new(certs.path().join("nope"), &[]);
    let error = missing.check_dir().unwrap_err().to_string();
    assert!(error.contains("does not exist"));
  }

  #[test]
  fn test_unlistable_dir_reports_io_cause() {
    let certs = CertDirGuard::with_files(&[]);
    let resolver = CertificateDirResolver::new(certs.path().join("gone"), &[]);

    let error = resolver.resolve(&convention("maneuver", "LOW")).unwrap_err();
    assert_eq!(error.kind(), crate::error::ErrorKind::Mapping);
    assert!(error.to_string().contains("cannot list certificate directory"));
  }
}

//! Environment variable management for testing
//!
//! `std::env::set_var` is process global and tests run on parallel threads.
//! Every guard here takes [`EnvLock`] first; the lock is re-entrant per
//! thread so one test can stack several guards.

use std::cell::{Cell, RefCell};
use std::env;
use std::ffi::OsString;
use std::path::PathBuf;
use std::sync::{Mutex, MutexGuard};

use tempfile::TempDir;

static ENV_MUTEX: Mutex<()> = Mutex::new(());

thread_local! {
  static HELD: RefCell<Option<MutexGuard<'static, ()>>> = const { RefCell::new(None) };
  static DEPTH: Cell<usize> = const { Cell::new(0) };
}

/// Token proving the current thread owns the environment.
pub struct EnvLock {
  _private: (),
}

impl EnvLock {
  /// Block until no other thread holds the environment.
  pub fn acquire() -> Self {
    DEPTH.with(|depth| {
      if depth.get() == 0 {
        let guard = ENV_MUTEX.lock().unwrap_or_else(|poisoned| poisoned.into_inner());
        HELD.with(|held| *held.borrow_mut() = Some(guard));
      }
      depth.set(depth.get() + 1);
    });
    Self { _private: () }
  }
}

impl Drop for EnvLock {
  fn drop(&mut self) {
    DEPTH.with(|depth| {
      depth.set(depth.get() - 1);
      if depth.get() == 0 {
        HELD.with(|held| held.borrow_mut().take());
      }
    });
  }
}

/// Overrides a single environment variable and restores it on drop.
pub struct EnvVarGuard {
  name: String,
  original: Option<OsString>,
  _lock: EnvLock,
}

impl EnvVarGuard {
  /// Remember the current value of `name`. Nothing changes until
  /// [`set`](Self::set) or [`remove`](Self::remove) is called.
  pub fn new(name: &str) -> Self {
    let lock = EnvLock::acquire();
    Self {
      name: name.to_string(),
      original: env::var_os(name),
      _lock: lock,
    }
  }

  pub fn set(&self, value: impl Into<OsString>) {
    unsafe {
      env::set_var(&self.name, value.into());
    }
  }

  pub fn remove(&self) {
    unsafe {
      env::remove_var(&self.name);
    }
  }
}

impl Drop for EnvVarGuard {
  fn drop(&mut self) {
    match &self.original {
      Some(value) => unsafe {
        env::set_var(&self.name, value);
      },
      None => unsafe {
        env::remove_var(&self.name);
      },
    }
  }
}

/// A test environment that overrides XDG directories to use a per-test
/// temporary directory
pub struct EnvTestGuard {
  /// The temporary directory that will be used for XDG directories
  pub temp_dir: TempDir,
  config_home: EnvVarGuard,
  data_home: EnvVarGuard,
}

impl Default for EnvTestGuard {
  fn default() -> Self {
    Self::new()
  }
}

impl EnvTestGuard {
  pub const XDG_CONFIG_HOME: &'static str = "XDG_CONFIG_HOME";
  pub const XDG_DATA_HOME: &'static str = "XDG_DATA_HOME";

  /// Create a new test environment with overridden XDG directories
  pub fn new() -> Self {
    let temp_dir = TempDir::new().expect("Failed to create temporary directory");
    let temp_path = temp_dir.path().to_path_buf();

    let config_home = EnvVarGuard::new(Self::XDG_CONFIG_HOME);
    let data_home = EnvVarGuard::new(Self::XDG_DATA_HOME);
    config_home.set(temp_path.join("config"));
    data_home.set(temp_path.join("data"));

    std::fs::create_dir_all(temp_path.join("config")).expect("Failed to create config directory");
    std::fs::create_dir_all(temp_path.join("data")).expect("Failed to create data directory");

    Self {
      temp_dir,
      config_home,
      data_home,
    }
  }

  /// Get the path to the XDG config directory
  pub fn config_dir(&self) -> PathBuf {
    self.temp_dir.path().join("config")
  }

  /// Directory `ProjectDirs` resolves to for jirabatch under this guard
  /// (Linux layout).
  pub fn jirabatch_config_dir(&self) -> PathBuf {
    self.config_dir().join("jirabatch")
  }
}

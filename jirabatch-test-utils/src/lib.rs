//! Test utilities shared across the jirabatch workspace
//!
//! This crate provides common testing infrastructure including:
//! - Serialized environment variable overrides ([`EnvVarGuard`])
//! - XDG directory mocking ([`EnvTestGuard`])
//! - HOME directory isolation ([`HomeEnvTestGuard`], [`NetrcGuard`])
//! - Certificate directories populated with dummy files ([`CertDirGuard`])
//!
//! Every guard that touches the process environment holds a shared lock for
//! its lifetime, so tests that override variables never observe each other.
//!
//! The clippy dead_code lint is disabled for this crate because test utilities
//! may not be used by all tests, and the compiler cannot detect usage across
//! crate boundaries in development dependencies.

#![allow(dead_code)]
#![allow(clippy::missing_panics_doc)]

pub mod certs;
pub mod env;
pub mod home;
pub mod netrc;

// Re-export commonly used items
pub use certs::CertDirGuard;
pub use env::{EnvTestGuard, EnvVarGuard};
pub use home::HomeEnvTestGuard;
pub use netrc::NetrcGuard;

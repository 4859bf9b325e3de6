//! Core error type.
//!
//! Downstream crates define their own error enums and wrap `DnError` as one
//! `#[from]` variant.

use thiserror::Error;

/// Errors raised by `dn-core` helpers (configuration validation, duration
/// conversion).
#[derive(Debug, Error)]
pub enum DnError {
    #[error("configuration error: {0}")]
    Config(String),

    #[error("negative or non-finite duration: {0} h")]
    NegativeDuration(f64),
}

/// Shorthand result type for `dn-core`.
pub type DnResult<T> = Result<T, DnError>;

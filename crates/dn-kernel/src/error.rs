use thiserror::Error;

use dn_core::EventId;

/// Errors produced by `dn-kernel`.
#[derive(Debug, Error)]
pub enum KernelError {
    #[error("timeout with negative or non-finite duration: {0} h")]
    NegativeDuration(f64),

    #[error("{0} is not known to the kernel (retired or never created)")]
    UnknownEvent(EventId),
}

pub type KernelResult<T> = Result<T, KernelError>;

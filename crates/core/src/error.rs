//! Error types for the OS-facing parts of the single-instance runner.
//!
//! The hand-off flow itself never fails: every miss has a fallback. Errors only
//! surface where the operating system refuses a request outright.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum Error {
    /// The named lock object could not be created (handle table exhausted,
    /// access denied to the namespace, ...)
    #[error("failed to create instance lock '{name}': {reason}")]
    LockCreate { name: String, reason: String },

    /// Registering the window class or creating the host window failed
    #[error("failed to create host window: {0}")]
    HostWindow(String),

    #[error("config error: {0}")]
    Config(String),
}

pub type Result<T> = std::result::Result<T, Error>;

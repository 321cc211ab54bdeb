//! FullStop Core Library
//!
//! Single-instance coordination for the FullStop desktop app.
//!
//! Architecture:
//! - The first launch owns a named mutex (instance_lock) and runs the app
//! - Later launches pull the deep link out of their command line (deep_link),
//!   find the running instance's window (window_locator) and forward the link
//!   with `WM_COPYDATA` (notifier), then exit
//! - The running instance decodes forwarded links (receiver)
//! - All window-manager calls go through the `Desktop` trait (desktop)

pub mod config;
pub mod deep_link;
pub mod desktop;
pub mod error;
pub mod handoff;
pub mod identity;
pub mod instance_lock;
pub mod logging;
pub mod notifier;
pub mod receiver;
pub mod window_locator;

pub use crate::deep_link::DeepLink;
pub use crate::desktop::{Desktop, WindowHandle};
pub use crate::error::{Error, Result};
pub use crate::handoff::{start, HandoffOutcome, Startup};
pub use crate::identity::AppIdentity;
pub use crate::instance_lock::{InProcessLocks, InstanceLock, LockNamespace};

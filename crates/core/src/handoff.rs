//! Startup sequence: decide between running the app and handing off.
//!
//! ```text
//! Start -> lock acquired ─┬─ first     -> caller creates the host window
//!                         └─ not first -> extract -> locate -> notify -> exit 0
//! ```
//!
//! Every step of the hand-off is attempted exactly once. A miss is logged and
//! the launch still exits cleanly.

use crate::deep_link::DeepLink;
use crate::desktop::Desktop;
use crate::identity::AppIdentity;
use crate::instance_lock::{InstanceLock, LockNamespace};
use crate::notifier::Notifier;
use crate::window_locator::WindowLocator;
use tracing::{debug, info, warn};

/// What a subsequent launch managed to do
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum HandoffOutcome {
    /// No window of the running instance was found
    WindowNotFound,
    /// No deep link on the command line; the window was only activated
    Activated { foreground: bool },
    /// A deep link was sent; `accepted` is the receiver's answer
    Delivered { link: DeepLink, accepted: bool },
}

/// Result of the startup decision
pub enum Startup<N: LockNamespace> {
    /// This launch owns the instance lock and should run the app.
    /// Keep the lock alive until the event loop ends.
    FirstInstance(InstanceLock<N>),
    /// Another instance is running. The lock has been released and the
    /// process should exit with status 0.
    HandedOff(HandoffOutcome),
}

impl<N: LockNamespace> Startup<N> {
    pub fn is_first_instance(&self) -> bool {
        matches!(self, Startup::FirstInstance(_))
    }
}

/// Acquire the instance lock and, if another instance holds it, forward
/// `command_line`'s deep link to that instance.
pub fn start<N, D>(
    namespace: N,
    desktop: &D,
    identity: &AppIdentity,
    command_line: &str,
) -> Startup<N>
where
    N: LockNamespace,
    D: Desktop,
{
    let mut lock = InstanceLock::acquire(namespace, identity.mutex_name);

    if lock.is_first_instance() {
        info!("This is the first instance");
        return Startup::FirstInstance(lock);
    }

    info!("Another instance is already running");
    let outcome = hand_off(desktop, identity, command_line);
    lock.release();

    Startup::HandedOff(outcome)
}

/// Forward the deep link in `command_line` to the running instance
pub fn hand_off<D: Desktop>(
    desktop: &D,
    identity: &AppIdentity,
    command_line: &str,
) -> HandoffOutcome {
    debug!("Command line: {}", command_line);

    let link = DeepLink::extract(command_line, identity.scheme);
    info!("Extracted deep link: {}", link);

    let Some(window) = WindowLocator::for_app(identity).find(desktop) else {
        warn!("Could not find existing window");
        return HandoffOutcome::WindowNotFound;
    };
    info!("Found existing window {:?}", window);

    let notifier = Notifier::new(desktop, identity.message_tag);

    if link.is_empty() {
        info!("No deep link, just bringing window to front");
        let foreground = notifier.activate(window);
        return HandoffOutcome::Activated { foreground };
    }

    info!("Sending deep link to existing instance...");
    let accepted = notifier.notify(window, &link);
    if accepted {
        info!("Deep link sent successfully");
    } else {
        warn!("Failed to send deep link");
    }

    HandoffOutcome::Delivered { link, accepted }
}

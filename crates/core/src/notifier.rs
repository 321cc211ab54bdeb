//! Cross-process notifier
//!
//! Wakes the running instance: brings its window forward and, when there is a
//! deep link, hands it over in a single `WM_COPYDATA` send.

use crate::deep_link::DeepLink;
use crate::desktop::{Desktop, WindowHandle};
use tracing::{debug, warn};

/// Bytes and tag of one forwarded deep link.
///
/// The buffer is the link's UTF-8 bytes followed by one NUL, the shape
/// app_links receivers expect.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CopyDataPayload {
    tag: usize,
    bytes: Vec<u8>,
}

impl CopyDataPayload {
    pub fn new(tag: usize, link: &DeepLink) -> Self {
        let mut bytes = Vec::with_capacity(link.as_str().len() + 1);
        bytes.extend_from_slice(link.as_str().as_bytes());
        bytes.push(0);
        Self { tag, bytes }
    }

    pub fn tag(&self) -> usize {
        self.tag
    }

    /// Full buffer, terminator included
    pub fn as_bytes(&self) -> &[u8] {
        &self.bytes
    }
}

pub struct Notifier<'a, D: Desktop> {
    desktop: &'a D,
    tag: usize,
}

impl<'a, D: Desktop> Notifier<'a, D> {
    pub fn new(desktop: &'a D, tag: usize) -> Self {
        Self { desktop, tag }
    }

    /// Bring `target` to the foreground, restoring it first if minimized.
    ///
    /// Returns whether the window became the foreground window. Failure is
    /// reported but never treated as an error.
    pub fn activate(&self, target: WindowHandle) -> bool {
        let foreground = self.desktop.set_foreground(target);
        if self.desktop.is_minimized(target) {
            self.desktop.restore(target);
        }
        if !foreground {
            debug!("Could not move window {:?} to the foreground", target);
        }
        foreground
    }

    /// Activate `target` and deliver `link` to it.
    ///
    /// An empty link means "just show the app": only activation happens and
    /// its result is returned. Otherwise the result is whether the receiver
    /// accepted the payload; a window destroyed since lookup yields `false`.
    pub fn notify(&self, target: WindowHandle, link: &DeepLink) -> bool {
        let activated = self.activate(target);

        if link.is_empty() {
            return activated;
        }

        let payload = CopyDataPayload::new(self.tag, link);
        let reply = self
            .desktop
            .send_copy_data(target, payload.tag(), payload.as_bytes());

        if reply == 0 {
            warn!("Window {:?} did not accept deep link {}", target, link);
            return false;
        }
        true
    }
}

//! Receiving side of forwarded deep links
//!
//! `WM_COPYDATA` is a shared channel: other programs, or other plugins in the
//! same window, may send buffers with their own tags. Anything that is not
//! exactly our shape is ignored.

use crate::deep_link::DeepLink;
use std::sync::mpsc::Sender;
use tracing::{debug, info, warn};

/// Decode a `WM_COPYDATA` buffer sent by a later launch.
///
/// Accepts the buffer only if `tag` matches `expected_tag`, the buffer ends
/// with a single NUL and the bytes before it are UTF-8 without interior NULs.
pub fn decode_copy_data(expected_tag: usize, tag: usize, data: &[u8]) -> Option<DeepLink> {
    if tag != expected_tag {
        return None;
    }

    let (&last, text) = data.split_last()?;
    if last != 0 || text.contains(&0) {
        return None;
    }

    let link = std::str::from_utf8(text).ok()?;
    Some(DeepLink::from(link.to_string()))
}

/// Window-side inbox for forwarded links.
///
/// A sent `WM_COPYDATA` is dispatched inside `GetMessageW` without making it
/// return, so queuing alone would leave the link waiting for an unrelated
/// posted message. Every accepted link is followed by `wake`, which must post
/// something to the owning thread's queue.
pub struct LinkInbox {
    message_tag: usize,
    links: Sender<DeepLink>,
    wake: Box<dyn Fn()>,
}

impl LinkInbox {
    pub fn new(message_tag: usize, links: Sender<DeepLink>, wake: impl Fn() + 'static) -> Self {
        Self {
            message_tag,
            links,
            wake: Box::new(wake),
        }
    }

    /// Queue the link carried by a `WM_COPYDATA` buffer.
    ///
    /// Returns the reply for the sender: `true` only if the buffer was ours
    /// and the link was queued.
    pub fn accept(&self, tag: usize, data: &[u8]) -> bool {
        let Some(link) = decode_copy_data(self.message_tag, tag, data) else {
            debug!("Ignoring WM_COPYDATA (tag {:#x}, {} bytes)", tag, data.len());
            return false;
        };

        info!("Received deep link: {}", link);
        if self.links.send(link).is_err() {
            warn!("Deep link receiver is gone");
            return false;
        }

        (self.wake)();
        true
    }
}

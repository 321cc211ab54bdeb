//! Fixed identity of the FullStop application.
//!
//! These values are shared between every launch of every installed version.
//! Changing any of them breaks single-instance detection against an older
//! instance that is still running during an upgrade.

/// `WM_USER`, duplicated here so the value is available on every target
pub const WM_USER: u32 = 0x0400;

/// Message tag used by app_links receivers for forwarded deep links
pub const APPLINK_MSG_ID: usize = (WM_USER + 2) as usize;

/// Names that tie separate launches together
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AppIdentity {
    /// Name of the process-wide mutex
    pub mutex_name: &'static str,
    /// Window class registered by the host window
    pub window_class: &'static str,
    /// Title of the host window
    pub window_title: &'static str,
    /// Custom URI scheme prefix, including `://`
    pub scheme: &'static str,
    /// `dwData` tag of forwarded deep-link payloads
    pub message_tag: usize,
}

impl AppIdentity {
    pub const FULLSTOP: AppIdentity = AppIdentity {
        mutex_name: "FullStop_SingleInstance_Mutex",
        window_class: "FLUTTER_RUNNER_WIN32_WINDOW",
        window_title: "FullStop",
        scheme: "fullstop://",
        message_tag: APPLINK_MSG_ID,
    };
}

impl Default for AppIdentity {
    fn default() -> Self {
        Self::FULLSTOP
    }
}

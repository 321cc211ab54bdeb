//! Host window of the first instance
//!
//! A plain Win32 top-level window registered under the application's window
//! class and title, so later launches can find it. It answers forwarded deep
//! links (`WM_COPYDATA`) and quits the message loop when closed.

use fullstop_core::config::WindowGeometry;
use fullstop_core::error::{Error, Result};
use fullstop_core::receiver::LinkInbox;
use fullstop_core::{AppIdentity, DeepLink};
use std::mem;
use std::sync::mpsc::{Receiver, Sender};
use tracing::info;
use windows::core::PCWSTR;
use windows::Win32::{
    Foundation::*,
    Graphics::Gdi::{COLOR_WINDOW, HBRUSH},
    System::{DataExchange::COPYDATASTRUCT, LibraryLoader::GetModuleHandleW},
    UI::WindowsAndMessaging::*,
};

pub struct HostWindow {
    hwnd: HWND,
}

/// Internal state stored in GWLP_USERDATA
struct HostState {
    inbox: LinkInbox,
}

impl HostWindow {
    /// Register the window class, then create and show the window
    pub fn create(
        identity: &AppIdentity,
        geometry: &WindowGeometry,
        links: Sender<DeepLink>,
    ) -> Result<Self> {
        unsafe {
            let hinstance =
                GetModuleHandleW(None).map_err(|e| Error::HostWindow(e.to_string()))?;

            let class_name = identity
                .window_class
                .encode_utf16()
                .chain(Some(0))
                .collect::<Vec<u16>>();
            let title = identity
                .window_title
                .encode_utf16()
                .chain(Some(0))
                .collect::<Vec<u16>>();

            let wc = WNDCLASSEXW {
                cbSize: mem::size_of::<WNDCLASSEXW>() as u32,
                style: CS_HREDRAW | CS_VREDRAW,
                lpfnWndProc: Some(Self::wndproc),
                hInstance: hinstance.into(),
                hCursor: LoadCursorW(None, IDC_ARROW).unwrap_or_default(),
                hbrBackground: HBRUSH((COLOR_WINDOW.0 + 1) as isize),
                lpszClassName: PCWSTR(class_name.as_ptr()),
                ..Default::default()
            };

            if RegisterClassExW(&wc) == 0 {
                return Err(Error::HostWindow(format!(
                    "RegisterClassExW failed for '{}': {}",
                    identity.window_class,
                    windows::core::Error::from_win32()
                )));
            }

            let hwnd = CreateWindowExW(
                WINDOW_EX_STYLE::default(),
                PCWSTR(class_name.as_ptr()),
                PCWSTR(title.as_ptr()),
                WS_OVERLAPPEDWINDOW,
                geometry.x,
                geometry.y,
                geometry.width,
                geometry.height,
                HWND::default(),
                HMENU::default(),
                hinstance,
                None,
            );

            if hwnd == HWND::default() {
                return Err(Error::HostWindow(format!(
                    "CreateWindowExW failed: {}",
                    windows::core::Error::from_win32()
                )));
            }

            // Posting WM_APP makes GetMessageW return so `run` drains the channel
            let inbox = LinkInbox::new(identity.message_tag, links, move || {
                let _ = PostMessageW(hwnd, WM_APP, WPARAM(0), LPARAM(0));
            });

            // Owned by the window from here on, freed in WM_NCDESTROY
            let state = Box::new(HostState { inbox });
            SetWindowLongPtrW(hwnd, GWLP_USERDATA, Box::into_raw(state) as isize);

            ShowWindow(hwnd, SW_SHOWNORMAL);

            info!(
                "Host window created at ({}, {}) {}x{}",
                geometry.x, geometry.y, geometry.width, geometry.height
            );

            Ok(Self { hwnd })
        }
    }

    /// Pump messages until the window is closed.
    ///
    /// Links queued by the window procedure, or before the loop started, are
    /// handed to `on_link` on this thread.
    pub fn run(&self, links: &Receiver<DeepLink>, mut on_link: impl FnMut(DeepLink)) {
        links.try_iter().for_each(&mut on_link);

        unsafe {
            let mut msg = MSG::default();
            // GetMessageW returns -1 on error, 0 on WM_QUIT
            while GetMessageW(&mut msg, HWND::default(), 0, 0).0 > 0 {
                TranslateMessage(&msg);
                DispatchMessageW(&msg);

                links.try_iter().for_each(&mut on_link);
            }
        }

        info!("Message loop finished");
    }

    /// Get state reference from window data
    unsafe fn get_state(hwnd: HWND) -> Option<&'static HostState> {
        let ptr = GetWindowLongPtrW(hwnd, GWLP_USERDATA);
        if ptr != 0 {
            Some(&*(ptr as *const HostState))
        } else {
            None
        }
    }

    unsafe fn on_copy_data(hwnd: HWND, lparam: LPARAM) -> LRESULT {
        let Some(state) = Self::get_state(hwnd) else {
            return LRESULT(0);
        };
        if lparam.0 == 0 {
            return LRESULT(0);
        }

        let cds = &*(lparam.0 as *const COPYDATASTRUCT);
        let data: &[u8] = if cds.lpData.is_null() || cds.cbData == 0 {
            &[]
        } else {
            std::slice::from_raw_parts(cds.lpData as *const u8, cds.cbData as usize)
        };

        LRESULT(state.inbox.accept(cds.dwData, data) as isize)
    }

    unsafe extern "system" fn wndproc(
        hwnd: HWND,
        msg: u32,
        wparam: WPARAM,
        lparam: LPARAM,
    ) -> LRESULT {
        match msg {
            WM_COPYDATA => Self::on_copy_data(hwnd, lparam),
            WM_DESTROY => {
                PostQuitMessage(0);
                LRESULT(0)
            }
            WM_NCDESTROY => {
                let ptr = SetWindowLongPtrW(hwnd, GWLP_USERDATA, 0);
                if ptr != 0 {
                    drop(Box::from_raw(ptr as *mut HostState));
                }
                DefWindowProcW(hwnd, msg, wparam, lparam)
            }
            _ => DefWindowProcW(hwnd, msg, wparam, lparam),
        }
    }
}

impl Drop for HostWindow {
    fn drop(&mut self) {
        unsafe {
            if IsWindow(self.hwnd).as_bool() {
                let _ = DestroyWindow(self.hwnd);
            }
        }
    }
}

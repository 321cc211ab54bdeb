//! Desktop window system seam
//!
//! The hand-off flow only needs a handful of window-manager calls. They are
//! collected in the [`Desktop`] trait so the flow can run against the real
//! Win32 desktop or an in-memory one.

use std::ops::ControlFlow;

/// Handle of a top-level window owned by some process.
///
/// Only meaningful between lookup and use; the owning process may destroy the
/// window at any moment.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct WindowHandle(pub isize);

/// Window-manager operations used by the locator and the notifier
pub trait Desktop {
    /// Visit every top-level window until `visit` breaks
    fn for_each_window(&self, visit: &mut dyn FnMut(WindowHandle) -> ControlFlow<()>);

    /// Window class name, `None` if it cannot be read
    fn class_name(&self, window: WindowHandle) -> Option<String>;

    /// Window title, `None` if it cannot be read or is empty
    fn title(&self, window: WindowHandle) -> Option<String>;

    /// Ask for `window` to become the foreground window
    fn set_foreground(&self, window: WindowHandle) -> bool;

    fn is_minimized(&self, window: WindowHandle) -> bool;

    /// Restore a minimized window
    fn restore(&self, window: WindowHandle) -> bool;

    /// Synchronously send a `WM_COPYDATA` message and return the receiver's reply
    fn send_copy_data(&self, window: WindowHandle, tag: usize, data: &[u8]) -> isize;
}

#[cfg(windows)]
pub use self::win32::Win32Desktop;

#[cfg(windows)]
mod win32 {
    use super::{Desktop, WindowHandle};
    use std::ffi::c_void;
    use std::ops::ControlFlow;
    use windows::Win32::Foundation::{BOOL, HWND, LPARAM, WPARAM};
    use windows::Win32::System::DataExchange::COPYDATASTRUCT;
    use windows::Win32::UI::WindowsAndMessaging::{
        EnumWindows, GetClassNameW, GetWindowTextW, IsIconic, SendMessageW, SetForegroundWindow,
        ShowWindow, SW_RESTORE, WM_COPYDATA,
    };

    /// Both class names and titles are read into fixed 256-unit buffers
    const NAME_BUFFER_LEN: usize = 256;

    /// The interactive Win32 desktop
    #[derive(Debug, Clone, Copy, Default)]
    pub struct Win32Desktop;

    type Visitor<'a> = &'a mut dyn FnMut(WindowHandle) -> ControlFlow<()>;

    unsafe extern "system" fn enum_windows_cb(hwnd: HWND, lparam: LPARAM) -> BOOL {
        let visit = &mut *(lparam.0 as *mut Visitor);
        match visit(WindowHandle(hwnd.0)) {
            ControlFlow::Continue(()) => BOOL(1),
            ControlFlow::Break(()) => BOOL(0),
        }
    }

    fn read_name(len: i32, buf: &[u16]) -> Option<String> {
        if len <= 0 {
            return None;
        }
        Some(String::from_utf16_lossy(&buf[..len as usize]))
    }

    impl Desktop for Win32Desktop {
        fn for_each_window(&self, visit: &mut dyn FnMut(WindowHandle) -> ControlFlow<()>) {
            let mut visitor: Visitor = visit;
            unsafe {
                // Fails when the callback stops early; that is not an error here
                let _ = EnumWindows(
                    Some(enum_windows_cb),
                    LPARAM(&mut visitor as *mut Visitor as isize),
                );
            }
        }

        fn class_name(&self, window: WindowHandle) -> Option<String> {
            let mut buf = [0u16; NAME_BUFFER_LEN];
            let len = unsafe { GetClassNameW(HWND(window.0), &mut buf) };
            read_name(len, &buf)
        }

        fn title(&self, window: WindowHandle) -> Option<String> {
            let mut buf = [0u16; NAME_BUFFER_LEN];
            let len = unsafe { GetWindowTextW(HWND(window.0), &mut buf) };
            read_name(len, &buf)
        }

        fn set_foreground(&self, window: WindowHandle) -> bool {
            unsafe { SetForegroundWindow(HWND(window.0)).as_bool() }
        }

        fn is_minimized(&self, window: WindowHandle) -> bool {
            unsafe { IsIconic(HWND(window.0)).as_bool() }
        }

        fn restore(&self, window: WindowHandle) -> bool {
            // ShowWindow reports the previous visibility, not success
            unsafe {
                ShowWindow(HWND(window.0), SW_RESTORE);
            }
            true
        }

        fn send_copy_data(&self, window: WindowHandle, tag: usize, data: &[u8]) -> isize {
            let hwnd = HWND(window.0);
            let cds = COPYDATASTRUCT {
                dwData: tag,
                cbData: data.len() as u32,
                lpData: data.as_ptr() as *mut c_void,
            };

            unsafe {
                SendMessageW(
                    hwnd,
                    WM_COPYDATA,
                    WPARAM(hwnd.0 as usize),
                    LPARAM(&cds as *const COPYDATASTRUCT as isize),
                )
                .0
            }
        }
    }
}

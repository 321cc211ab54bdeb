//! Instance lock - named mutual exclusion between launches
//!
//! The first process to create the named object owns it for its whole
//! lifetime. Every later creation still gets a handle, but observes that the
//! name already existed. That single bit decides whether a launch runs the app
//! or hands off to the running instance.

use crate::error::Result;
use parking_lot::Mutex;
use std::collections::HashMap;
use std::sync::Arc;
use tracing::{debug, warn};

/// A namespace of named lock objects
pub trait LockNamespace {
    type Handle;

    /// Create (or open) the object called `name`.
    ///
    /// Returns the handle and whether the name was already in use when the
    /// call was made. Check-and-create must be atomic.
    fn create(&self, name: &str) -> Result<(Self::Handle, bool)>;

    /// Close a handle returned by [`LockNamespace::create`]
    fn close(&self, handle: Self::Handle);
}

/// Scoped ownership of the application's instance lock.
///
/// The handle is closed on [`InstanceLock::release`] or on drop, whichever
/// happens first. Releasing more than once is a no-op.
pub struct InstanceLock<N: LockNamespace> {
    namespace: N,
    name: String,
    handle: Option<N::Handle>,
    already_held: bool,
}

impl<N: LockNamespace> InstanceLock<N> {
    /// Acquire `name` in `namespace`.
    ///
    /// If the lock object cannot be created at all, the launch is treated as
    /// the first instance: a rare double launch beats refusing to start.
    pub fn acquire(namespace: N, name: &str) -> Self {
        let (handle, already_held) = match namespace.create(name) {
            Ok((handle, already_held)) => (Some(handle), already_held),
            Err(e) => {
                warn!("{}; continuing as first instance", e);
                (None, false)
            }
        };

        debug!("Instance lock '{}' acquired (already held: {})", name, already_held);

        Self {
            namespace,
            name: name.to_string(),
            handle,
            already_held,
        }
    }

    /// True if another live process owned the lock when it was acquired
    pub fn already_held(&self) -> bool {
        self.already_held
    }

    pub fn is_first_instance(&self) -> bool {
        !self.already_held
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// Close the handle. Safe to call on every exit path.
    pub fn release(&mut self) {
        if let Some(handle) = self.handle.take() {
            self.namespace.close(handle);
            debug!("Instance lock '{}' released", self.name);
        }
    }
}

impl<N: LockNamespace> Drop for InstanceLock<N> {
    fn drop(&mut self) {
        self.release();
    }
}

/// Process-local lock namespace.
///
/// Mirrors the kernel object semantics: a name exists while at least one
/// handle to it is open, and the first creator is the owner.
#[derive(Clone, Default)]
pub struct InProcessLocks {
    table: Arc<Mutex<HashMap<String, usize>>>,
}

#[derive(Debug)]
pub struct InProcessHandle {
    name: String,
}

impl InProcessLocks {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of open handles for `name`
    pub fn open_handles(&self, name: &str) -> usize {
        self.table.lock().get(name).copied().unwrap_or(0)
    }
}

impl LockNamespace for InProcessLocks {
    type Handle = InProcessHandle;

    fn create(&self, name: &str) -> Result<(InProcessHandle, bool)> {
        let mut table = self.table.lock();
        let count = table.entry(name.to_string()).or_insert(0);
        let already_held = *count > 0;
        *count += 1;

        Ok((
            InProcessHandle {
                name: name.to_string(),
            },
            already_held,
        ))
    }

    fn close(&self, handle: InProcessHandle) {
        let mut table = self.table.lock();
        if let Some(count) = table.get_mut(&handle.name) {
            *count -= 1;
            if *count == 0 {
                table.remove(&handle.name);
            }
        }
    }
}

#[cfg(windows)]
pub use self::win32::NamedMutex;

#[cfg(windows)]
mod win32 {
    use super::LockNamespace;
    use crate::error::{Error, Result};
    use windows::core::PCWSTR;
    use windows::Win32::Foundation::{CloseHandle, ERROR_ALREADY_EXISTS, HANDLE};
    use windows::Win32::System::Threading::CreateMutexW;

    /// The session-wide kernel mutex namespace
    #[derive(Debug, Clone, Copy, Default)]
    pub struct NamedMutex;

    impl LockNamespace for NamedMutex {
        type Handle = HANDLE;

        fn create(&self, name: &str) -> Result<(HANDLE, bool)> {
            let wide_name: Vec<u16> = name.encode_utf16().chain(Some(0)).collect();

            unsafe {
                let handle = CreateMutexW(None, true, PCWSTR(wide_name.as_ptr())).map_err(|e| {
                    Error::LockCreate {
                        name: name.to_string(),
                        reason: e.to_string(),
                    }
                })?;

                // Nothing else may touch the thread's last error before this read
                let already_held = std::io::Error::last_os_error().raw_os_error()
                    == Some(ERROR_ALREADY_EXISTS.0 as i32);

                Ok((handle, already_held))
            }
        }

        fn close(&self, handle: HANDLE) {
            unsafe {
                let _ = CloseHandle(handle);
            }
        }
    }
}

//! Finds the running instance's window by exact class name and title.

use crate::desktop::{Desktop, WindowHandle};
use crate::identity::AppIdentity;
use std::ops::ControlFlow;

#[derive(Debug, Clone)]
pub struct WindowLocator {
    class_name: String,
    title: String,
}

impl WindowLocator {
    pub fn new(class_name: impl Into<String>, title: impl Into<String>) -> Self {
        Self {
            class_name: class_name.into(),
            title: title.into(),
        }
    }

    pub fn for_app(identity: &AppIdentity) -> Self {
        Self::new(identity.window_class, identity.window_title)
    }

    /// First top-level window whose class AND title match.
    ///
    /// `None` is an expected answer: the other instance may still be building
    /// its window, or may have exited since the lock check.
    pub fn find(&self, desktop: &impl Desktop) -> Option<WindowHandle> {
        let mut found = None;

        desktop.for_each_window(&mut |window: WindowHandle| {
            if self.matches(desktop, window) {
                found = Some(window);
                ControlFlow::Break(())
            } else {
                ControlFlow::Continue(())
            }
        });

        found
    }

    fn matches(&self, desktop: &impl Desktop, window: WindowHandle) -> bool {
        match desktop.class_name(window) {
            Some(class_name) if class_name == self.class_name => {}
            _ => return false,
        }

        desktop.title(window).as_deref() == Some(self.title.as_str())
    }
}

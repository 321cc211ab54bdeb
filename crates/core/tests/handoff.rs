use fullstop_core::handoff::{hand_off, start, HandoffOutcome, Startup};
use fullstop_core::logging::{self, DebugOutput};
use fullstop_core::receiver::decode_copy_data;
use fullstop_core::{AppIdentity, DeepLink, Desktop, InProcessLocks, WindowHandle};
use std::cell::RefCell;
use std::ops::ControlFlow;
use tracing_subscriber::EnvFilter;

const APP: AppIdentity = AppIdentity::FULLSTOP;
const LAUNCH_WITH_LINK: &str = r#""C:\FullStop\fullstop.exe" fullstop://foo"#;

struct FakeWindow {
    handle: WindowHandle,
    class_name: &'static str,
    title: &'static str,
    minimized: bool,
    alive: bool,
    received: Vec<DeepLink>,
}

/// In-memory desktop whose windows answer WM_COPYDATA like the host window
#[derive(Default)]
struct FakeDesktop {
    windows: RefCell<Vec<FakeWindow>>,
    foreground: RefCell<Option<WindowHandle>>,
    sends: RefCell<usize>,
}

impl FakeDesktop {
    fn add(&self, class_name: &'static str, title: &'static str) -> WindowHandle {
        let mut windows = self.windows.borrow_mut();
        let handle = WindowHandle(0x100 + windows.len() as isize);
        windows.push(FakeWindow {
            handle,
            class_name,
            title,
            minimized: false,
            alive: true,
            received: Vec::new(),
        });
        handle
    }

    fn add_app_window(&self) -> WindowHandle {
        self.add(APP.window_class, APP.window_title)
    }

    fn with_window<R>(
        &self,
        handle: WindowHandle,
        f: impl FnOnce(&mut FakeWindow) -> R,
    ) -> Option<R> {
        self.windows
            .borrow_mut()
            .iter_mut()
            .find(|w| w.handle == handle && w.alive)
            .map(f)
    }

    fn minimize(&self, handle: WindowHandle) {
        self.with_window(handle, |w| w.minimized = true);
    }

    fn destroy(&self, handle: WindowHandle) {
        self.with_window(handle, |w| w.alive = false);
    }

    fn received(&self, handle: WindowHandle) -> Vec<DeepLink> {
        self.with_window(handle, |w| w.received.clone()).unwrap_or_default()
    }

    fn is_minimized_now(&self, handle: WindowHandle) -> bool {
        self.with_window(handle, |w| w.minimized).unwrap_or(false)
    }
}

impl Desktop for FakeDesktop {
    fn for_each_window(&self, visit: &mut dyn FnMut(WindowHandle) -> ControlFlow<()>) {
        let handles: Vec<WindowHandle> = self
            .windows
            .borrow()
            .iter()
            .filter(|w| w.alive)
            .map(|w| w.handle)
            .collect();
        for handle in handles {
            if visit(handle).is_break() {
                break;
            }
        }
    }

    fn class_name(&self, window: WindowHandle) -> Option<String> {
        self.with_window(window, |w| w.class_name.to_string())
    }

    fn title(&self, window: WindowHandle) -> Option<String> {
        self.with_window(window, |w| w.title.to_string())
            .filter(|t| !t.is_empty())
    }

    fn set_foreground(&self, window: WindowHandle) -> bool {
        let alive = self.with_window(window, |_| ()).is_some();
        if alive {
            *self.foreground.borrow_mut() = Some(window);
        }
        alive
    }

    fn is_minimized(&self, window: WindowHandle) -> bool {
        self.is_minimized_now(window)
    }

    fn restore(&self, window: WindowHandle) -> bool {
        self.with_window(window, |w| w.minimized = false).is_some()
    }

    fn send_copy_data(&self, window: WindowHandle, tag: usize, data: &[u8]) -> isize {
        *self.sends.borrow_mut() += 1;
        let Some(link) = decode_copy_data(APP.message_tag, tag, data) else {
            return 0;
        };
        match self.with_window(window, |w| w.received.push(link)) {
            Some(()) => 1,
            None => 0,
        }
    }
}

fn hand_off_with(desktop: &FakeDesktop, command_line: &str) -> HandoffOutcome {
    hand_off(desktop, &APP, command_line)
}

#[test]
fn first_launch_keeps_lock_and_skips_handoff() {
    let locks = InProcessLocks::new();
    let desktop = FakeDesktop::default();
    desktop.add_app_window();

    let startup = start(locks.clone(), &desktop, &APP, LAUNCH_WITH_LINK);

    assert!(startup.is_first_instance());
    assert_eq!(locks.open_handles(APP.mutex_name), 1);
    assert_eq!(*desktop.sends.borrow(), 0);
    assert!(desktop.foreground.borrow().is_none());
}

#[test]
fn second_launch_delivers_link_and_releases_lock() {
    let locks = InProcessLocks::new();
    let desktop = FakeDesktop::default();
    let first = start(locks.clone(), &desktop, &APP, r#""C:\FullStop\fullstop.exe""#);
    assert!(first.is_first_instance());
    let window = desktop.add_app_window();

    let second = start(locks.clone(), &desktop, &APP, LAUNCH_WITH_LINK);

    match second {
        Startup::HandedOff(HandoffOutcome::Delivered { link, accepted }) => {
            assert_eq!(link.as_str(), "fullstop://foo");
            assert!(accepted);
        }
        Startup::HandedOff(other) => panic!("unexpected outcome {:?}", other),
        Startup::FirstInstance(_) => panic!("second launch must not be first"),
    }

    assert_eq!(
        desktop.received(window),
        vec![DeepLink::from("fullstop://foo".to_string())]
    );
    assert_eq!(*desktop.foreground.borrow(), Some(window));
    // Only the first instance still holds a handle
    assert_eq!(locks.open_handles(APP.mutex_name), 1);

    drop(first);
    assert_eq!(locks.open_handles(APP.mutex_name), 0);
}

#[test]
fn second_launch_without_link_only_activates() {
    let locks = InProcessLocks::new();
    let desktop = FakeDesktop::default();
    let _first = start(locks.clone(), &desktop, &APP, "fullstop.exe");
    let window = desktop.add_app_window();
    desktop.minimize(window);

    let second = start(locks.clone(), &desktop, &APP, r#""C:\FullStop\fullstop.exe""#);

    assert!(matches!(
        second,
        Startup::HandedOff(HandoffOutcome::Activated { foreground: true })
    ));
    assert_eq!(*desktop.sends.borrow(), 0);
    assert!(!desktop.is_minimized_now(window));
    assert_eq!(*desktop.foreground.borrow(), Some(window));
}

#[test]
fn missing_window_is_a_clean_miss() {
    let desktop = FakeDesktop::default();
    desktop.add(APP.window_class, "Another App");
    desktop.add("Notepad", APP.window_title);

    assert_eq!(
        hand_off_with(&desktop, "fullstop.exe fullstop://foo"),
        HandoffOutcome::WindowNotFound
    );
    assert_eq!(*desktop.sends.borrow(), 0);
}

#[test]
fn window_destroyed_after_lookup_reports_failure() {
    struct Vanishing(FakeDesktop);

    impl Desktop for Vanishing {
        fn for_each_window(&self, visit: &mut dyn FnMut(WindowHandle) -> ControlFlow<()>) {
            self.0.for_each_window(visit)
        }

        fn class_name(&self, window: WindowHandle) -> Option<String> {
            self.0.class_name(window)
        }

        fn title(&self, window: WindowHandle) -> Option<String> {
            let title = self.0.title(window);
            // The owner exits right after we matched its window
            self.0.destroy(window);
            title
        }

        fn set_foreground(&self, window: WindowHandle) -> bool {
            self.0.set_foreground(window)
        }

        fn is_minimized(&self, window: WindowHandle) -> bool {
            self.0.is_minimized(window)
        }

        fn restore(&self, window: WindowHandle) -> bool {
            self.0.restore(window)
        }

        fn send_copy_data(&self, window: WindowHandle, tag: usize, data: &[u8]) -> isize {
            self.0.send_copy_data(window, tag, data)
        }
    }

    let desktop = Vanishing(FakeDesktop::default());
    desktop.0.add_app_window();

    let outcome = hand_off(&desktop, &APP, "fullstop.exe fullstop://foo");

    assert_eq!(
        outcome,
        HandoffOutcome::Delivered {
            link: DeepLink::from("fullstop://foo".to_string()),
            accepted: false,
        }
    );
}

#[test]
fn only_first_link_is_forwarded() {
    let desktop = FakeDesktop::default();
    let window = desktop.add_app_window();

    hand_off_with(&desktop, "fullstop.exe fullstop://one fullstop://two");

    assert_eq!(
        desktop.received(window),
        vec![DeepLink::from("fullstop://one".to_string())]
    );
}

#[test]
fn launches_after_owner_exit_become_first() {
    let locks = InProcessLocks::new();
    let desktop = FakeDesktop::default();

    let first = start(locks.clone(), &desktop, &APP, "fullstop.exe");
    drop(first);

    let next = start(locks.clone(), &desktop, &APP, "fullstop.exe fullstop://foo");
    assert!(next.is_first_instance());
}

thread_local! {
    static LOG_LINES: RefCell<Vec<String>> = RefCell::new(Vec::new());
}

fn capture_line(text: &str) {
    LOG_LINES.with(|l| l.borrow_mut().push(text.to_string()));
}

#[test]
fn log_lines_identify_the_app() {
    let locks = InProcessLocks::new();
    let desktop = FakeDesktop::default();
    let output = DebugOutput::with_sink(capture_line);
    let subscriber = logging::subscriber(EnvFilter::new("info"), output);

    tracing::subscriber::with_default(subscriber, || {
        let _app = logging::app_span().entered();
        let _first = start(locks.clone(), &desktop, &APP, "fullstop.exe");
        desktop.add_app_window();
        start(locks.clone(), &desktop, &APP, LAUNCH_WITH_LINK);
    });

    let lines = LOG_LINES.with(|l| l.borrow_mut().drain(..).collect::<Vec<_>>());
    assert!(lines.len() >= 3, "{:?}", lines);
    assert!(lines.iter().all(|l| l.contains("FullStop:")), "{:?}", lines);
}

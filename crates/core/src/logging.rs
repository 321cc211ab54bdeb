//! Diagnostic output
//!
//! Trace lines go to the debugger (`OutputDebugStringW`) so they can be read
//! with DebugView or an attached debugger even though the runner has no
//! console. Other targets write to stderr. Nothing depends on this output.

use std::io;
use tracing::Span;
use tracing_subscriber::fmt::MakeWriter;
use tracing_subscriber::EnvFilter;

/// Destination of one finished log record
pub type Sink = fn(&str);

/// `MakeWriter` that hands every formatted record to a [`Sink`]
#[derive(Clone, Copy)]
pub struct DebugOutput {
    sink: Sink,
}

impl DebugOutput {
    pub fn new() -> Self {
        Self {
            sink: output_debug_string,
        }
    }

    pub fn with_sink(sink: Sink) -> Self {
        Self { sink }
    }
}

impl Default for DebugOutput {
    fn default() -> Self {
        Self::new()
    }
}

impl<'a> MakeWriter<'a> for DebugOutput {
    type Writer = DebugRecord;

    fn make_writer(&'a self) -> Self::Writer {
        DebugRecord {
            buf: Vec::new(),
            sink: self.sink,
        }
    }
}

/// Buffers one record and emits it in a single call on drop
pub struct DebugRecord {
    buf: Vec<u8>,
    sink: Sink,
}

impl DebugRecord {
    fn emit(&mut self) {
        if self.buf.is_empty() {
            return;
        }
        let text = String::from_utf8_lossy(&self.buf);
        (self.sink)(&text);
        self.buf.clear();
    }
}

impl io::Write for DebugRecord {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        self.buf.extend_from_slice(buf);
        Ok(buf.len())
    }

    fn flush(&mut self) -> io::Result<()> {
        self.emit();
        Ok(())
    }
}

impl Drop for DebugRecord {
    fn drop(&mut self) {
        self.emit();
    }
}

/// Send `text` to the debugger
#[cfg(windows)]
pub fn output_debug_string(text: &str) {
    use windows::core::PCWSTR;
    use windows::Win32::System::Diagnostics::Debug::OutputDebugStringW;

    let wide: Vec<u16> = text.encode_utf16().chain(Some(0)).collect();
    unsafe {
        OutputDebugStringW(PCWSTR(wide.as_ptr()));
    }
}

/// Send `text` to stderr
#[cfg(not(windows))]
pub fn output_debug_string(text: &str) {
    eprint!("{}", text);
}

/// Formatting shared by the runner and tests: no ANSI, no module targets,
/// span names kept so lines read `FullStop: ...`
pub fn subscriber(
    filter: EnvFilter,
    output: DebugOutput,
) -> impl tracing::Subscriber + Send + Sync + 'static {
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(output)
        .with_ansi(false)
        .with_target(false)
        .finish()
}

/// Install the global subscriber.
///
/// `RUST_LOG` wins over `default_filter`. Calling this twice is harmless.
pub fn init(default_filter: &str) {
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_filter));

    let _ = tracing::subscriber::set_global_default(subscriber(filter, DebugOutput::new()));
}

/// Span identifying this process in a shared debugger log.
/// Enter it for the whole run.
pub fn app_span() -> Span {
    tracing::info_span!("FullStop")
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::RefCell;
    use std::io::Write;

    thread_local! {
        static CAPTURED: RefCell<Vec<String>> = RefCell::new(Vec::new());
    }

    fn capture(text: &str) {
        CAPTURED.with(|c| c.borrow_mut().push(text.to_string()));
    }

    fn captured() -> Vec<String> {
        CAPTURED.with(|c| c.borrow_mut().drain(..).collect())
    }

    #[test]
    fn test_record_is_emitted_once_on_drop() {
        let output = DebugOutput::with_sink(capture);
        {
            let mut record = output.make_writer();
            write!(record, "[FullStop] ").unwrap();
            writeln!(record, "Found existing window").unwrap();
        }
        assert_eq!(captured(), vec!["[FullStop] Found existing window\n".to_string()]);
    }

    #[test]
    fn test_empty_record_is_not_emitted() {
        let output = DebugOutput::with_sink(capture);
        drop(output.make_writer());
        assert!(captured().is_empty());
    }

    #[test]
    fn test_flush_emits_and_resets() {
        let output = DebugOutput::with_sink(capture);
        let mut record = output.make_writer();
        write!(record, "one").unwrap();
        record.flush().unwrap();
        write!(record, "two").unwrap();
        drop(record);
        assert_eq!(captured(), vec!["one".to_string(), "two".to_string()]);
    }

    #[test]
    fn test_subscriber_routes_events_to_sink() {
        let subscriber = tracing_subscriber::fmt()
            .with_writer(DebugOutput::with_sink(capture))
            .with_ansi(false)
            .finish();

        tracing::subscriber::with_default(subscriber, || {
            tracing::info!("Deep link sent successfully");
        });

        let lines = captured();
        assert_eq!(lines.len(), 1);
        assert!(lines[0].contains("Deep link sent successfully"));
    }

    #[test]
    fn test_lines_inside_app_span_name_the_app() {
        let subscriber = subscriber(EnvFilter::new("info"), DebugOutput::with_sink(capture));

        tracing::subscriber::with_default(subscriber, || {
            let _app = app_span().entered();
            tracing::info!("This is the first instance");
            tracing::warn!("Could not find existing window");
        });

        let lines = captured();
        assert_eq!(lines.len(), 2);
        assert!(lines.iter().all(|l| l.contains("FullStop:")), "{:?}", lines);
    }
}

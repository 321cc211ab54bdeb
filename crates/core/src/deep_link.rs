//! Deep link extraction from the raw launch command line
//!
//! This is not a command-line tokenizer. The link starts at the first
//! occurrence of the scheme and ends at the first `"` or space after it.
//! Links containing literal spaces or quotes are cut short; consumers rely on
//! this lenient behavior, so keep it.

use std::fmt;

/// A deep link taken from a launch command line. May be empty.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DeepLink(String);

impl DeepLink {
    /// Extract the first `scheme` link from `command_line`
    pub fn extract(command_line: &str, scheme: &str) -> Self {
        if scheme.is_empty() {
            return Self::default();
        }

        let Some(start) = command_line.find(scheme) else {
            return Self::default();
        };

        let link = &command_line[start..];
        let end = link.find(['"', ' ']).unwrap_or(link.len());

        DeepLink(link[..end].to_string())
    }

    /// Same as [`DeepLink::extract`] for a UTF-16 command line
    pub fn extract_wide(command_line: &[u16], scheme: &str) -> Self {
        let command_line = String::from_utf16_lossy(command_line);
        Self::extract(command_line.trim_end_matches('\0'), scheme)
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn into_string(self) -> String {
        self.0
    }
}

impl From<String> for DeepLink {
    fn from(link: String) -> Self {
        DeepLink(link)
    }
}

impl fmt::Display for DeepLink {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.0.is_empty() {
            write!(f, "(empty)")
        } else {
            f.write_str(&self.0)
        }
    }
}

/// Raw command line of the current process
#[cfg(windows)]
pub fn process_command_line() -> String {
    use windows::Win32::System::Environment::GetCommandLineW;

    unsafe {
        let command_line = GetCommandLineW();
        if command_line.is_null() {
            return String::new();
        }
        String::from_utf16_lossy(command_line.as_wide())
    }
}

/// Raw command line of the current process
#[cfg(not(windows))]
pub fn process_command_line() -> String {
    std::env::args_os()
        .map(|arg| arg.to_string_lossy().into_owned())
        .collect::<Vec<_>>()
        .join(" ")
}

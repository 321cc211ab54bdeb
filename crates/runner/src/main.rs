//! FullStop - single-instance host process
//!
//! This process:
//! - Takes the instance lock on startup
//! - If another instance is running: forwards the `fullstop://` deep link from
//!   its command line to that instance's window, activates it, and exits 0
//! - Otherwise creates the host window and runs the Win32 message loop,
//!   routing deep links from its own command line and from later launches

#![windows_subsystem = "windows"]

#[cfg(windows)]
mod host_window;

use anyhow::Result;
use fullstop_core::config::{self, RunnerConfig};
use fullstop_core::logging;
use std::process::ExitCode;

fn main() -> ExitCode {
    let app_config = config::load_config();
    logging::init(&app_config.log_filter);
    let _app = logging::app_span().entered();

    tracing::info!("FullStop starting...");

    match run(&app_config) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            tracing::error!("{:#}", e);
            ExitCode::FAILURE
        }
    }
}

#[cfg(windows)]
fn run(app_config: &RunnerConfig) -> Result<()> {
    use anyhow::Context;
    use fullstop_core::deep_link::{self, DeepLink};
    use fullstop_core::desktop::Win32Desktop;
    use fullstop_core::instance_lock::NamedMutex;
    use fullstop_core::{handoff, AppIdentity, Startup};
    use host_window::HostWindow;
    use std::sync::mpsc;

    let identity = AppIdentity::FULLSTOP;
    let command_line = deep_link::process_command_line();

    let mut lock = match handoff::start(NamedMutex, &Win32Desktop, &identity, &command_line) {
        Startup::FirstInstance(lock) => lock,
        Startup::HandedOff(outcome) => {
            tracing::debug!("Hand-off finished: {:?}", outcome);
            return Ok(());
        }
    };

    let (link_tx, link_rx) = mpsc::channel::<DeepLink>();

    // The first instance handles its own launch link like a forwarded one
    let initial_link = DeepLink::extract(&command_line, identity.scheme);
    if !initial_link.is_empty() {
        if let Err(mpsc::SendError(link)) = link_tx.send(initial_link) {
            tracing::warn!("Dropped initial deep link {}", link);
        }
    }

    // On failure the lock is released when `lock` drops on return
    let window = HostWindow::create(&identity, &app_config.window, link_tx)
        .context("Failed to create host window")?;

    window.run(&link_rx, route_deep_link);

    drop(window);
    lock.release();

    tracing::info!("FullStop stopped");
    Ok(())
}

#[cfg(windows)]
fn route_deep_link(link: fullstop_core::DeepLink) {
    // Link handling belongs to the application layer; the host only routes
    tracing::info!("Routing deep link: {}", link);
}

#[cfg(not(windows))]
fn run(_app_config: &RunnerConfig) -> Result<()> {
    anyhow::bail!("FullStop single-instance runner is only supported on Windows")
}

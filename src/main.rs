mod app;
mod command;
mod config;
mod error;
mod headless;
#[cfg_attr(not(target_os = "macos"), allow(dead_code))]
mod icon;
#[cfg_attr(not(target_os = "macos"), allow(dead_code))]
mod launch;
mod parser;
mod poller;
mod power;
mod probe;
mod state;

#[cfg(target_os = "macos")]
mod actions;
#[cfg(target_os = "macos")]
mod tray;
#[cfg(target_os = "macos")]
mod ui;

#[cfg(test)]
mod testing;

use std::process::ExitCode;
use std::sync::Arc;

use tracing::info;

use crate::command::ShellCommand;
use crate::power::SystemLowPower;

fn main() -> ExitCode {
    // Init tracing to stderr
    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .init();

    info!(version = env!("CARGO_PKG_VERSION"), "ibattery starting");

    let once = std::env::args().skip(1).any(|a| a == "--once");
    let headless = once || std::env::args().skip(1).any(|a| a == "--headless");

    let cfg = config::load();
    info!(name = %cfg.identity.name, command = %cfg.status.command, "config loaded");

    #[cfg(target_os = "macos")]
    if !headless {
        ui::run(cfg);
    }

    #[cfg(not(target_os = "macos"))]
    if !headless {
        info!("no menu bar on this platform, running headless");
    }

    let command = Arc::new(ShellCommand::from_settings(&cfg.status));
    let max_readings = if once { Some(1) } else { None };
    match headless::monitor(command, Arc::new(SystemLowPower), max_readings) {
        Some(_) => ExitCode::SUCCESS,
        None => ExitCode::FAILURE,
    }
}

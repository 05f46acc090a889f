use std::sync::Arc;
use std::thread::{self, JoinHandle};
use std::time::Duration;

use crossbeam_channel::{Sender, select, tick};
use tracing::{debug, info};

use crate::command::{CancelToken, StatusCommand};
use crate::parser;
use crate::power::LowPowerQuery;
use crate::state::StatusReading;

/// Fixed poll period.
pub const POLL_INTERVAL: Duration = Duration::from_secs(1);

/// Events sent from worker threads to the UI thread.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PollEvent {
    /// Result of the startup capability probe.
    Probed(bool),
    Reading(StatusReading),
}

/// Run one tick: command, parse, low-power query.
/// Any failure yields `None` and leaves the published state untouched.
pub fn poll_once(
    command: &dyn StatusCommand,
    low_power: &dyn LowPowerQuery,
    cancel: &CancelToken,
) -> Option<StatusReading> {
    let output = match command.run(cancel) {
        Ok(output) => output,
        Err(e) => {
            debug!(error = %e, "status command failed, skipping tick");
            return None;
        }
    };

    let parsed = match parser::parse_status(&output) {
        Ok(parsed) => parsed,
        Err(e) => {
            debug!(error = %e, "unparseable status output, skipping tick");
            return None;
        }
    };

    Some(StatusReading {
        percentage: parsed.percentage,
        is_charging: parsed.is_charging,
        is_low_power_mode: low_power.is_enabled(),
    })
}

/// Owns the ticker thread. Dropping it cancels any running command,
/// stops the timer and joins the thread.
pub struct PollerHandle {
    shutdown: Option<Sender<()>>,
    cancel: CancelToken,
    thread: Option<JoinHandle<()>>,
}

impl Drop for PollerHandle {
    fn drop(&mut self) {
        self.cancel.cancel();
        self.shutdown.take();
        if let Some(thread) = self.thread.take() {
            let _ = thread.join();
        }
        debug!("poller stopped");
    }
}

/// Start polling once per second. The first tick runs immediately.
pub fn start(
    command: Arc<dyn StatusCommand>,
    low_power: Arc<dyn LowPowerQuery>,
    tx: Sender<PollEvent>,
) -> PollerHandle {
    start_with_interval(command, low_power, tx, POLL_INTERVAL)
}

pub(crate) fn start_with_interval(
    command: Arc<dyn StatusCommand>,
    low_power: Arc<dyn LowPowerQuery>,
    tx: Sender<PollEvent>,
    interval: Duration,
) -> PollerHandle {
    let (shutdown_tx, shutdown_rx) = crossbeam_channel::bounded::<()>(0);
    let cancel = CancelToken::new();
    let worker_cancel = cancel.clone();

    let thread = thread::spawn(move || {
        info!(interval_ms = interval.as_millis() as u64, "poller started");
        // Ticks run back to back on this thread; ticks missed while a
        // command is running are coalesced by the ticker channel.
        let ticker = tick(interval);
        loop {
            if let Some(reading) = poll_once(command.as_ref(), low_power.as_ref(), &worker_cancel)
            {
                if tx.send(PollEvent::Reading(reading)).is_err() {
                    debug!("poll receiver gone");
                    break;
                }
            }

            select! {
                recv(shutdown_rx) -> _ => break,
                recv(ticker) -> _ => {}
            }
        }
    });

    PollerHandle {
        shutdown: Some(shutdown_tx),
        cancel,
        thread: Some(thread),
    }
}

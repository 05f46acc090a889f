use std::sync::Arc;
use std::thread::{self, JoinHandle};

use crossbeam_channel::Sender;
use tracing::{info, warn};

use crate::command::{CancelToken, StatusCommand};
use crate::parser;
use crate::poller::PollEvent;

/// Check once whether the machine has an internal battery.
/// A command that cannot run counts as "no battery".
pub fn probe_has_battery(command: &dyn StatusCommand) -> bool {
    match command.run(&CancelToken::new()) {
        Ok(output) => parser::has_internal_battery(&output),
        Err(e) => {
            warn!(error = %e, "battery probe command failed");
            false
        }
    }
}

/// Run the probe off the UI thread and report the result as `PollEvent::Probed`.
pub fn spawn(command: Arc<dyn StatusCommand>, tx: Sender<PollEvent>) -> JoinHandle<()> {
    thread::spawn(move || {
        let has_battery = probe_has_battery(command.as_ref());
        info!(has_battery, "battery probe finished");
        let _ = tx.send(PollEvent::Probed(has_battery));
    })
}

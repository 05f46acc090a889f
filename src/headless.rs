//! Tray-less mode: the same probe/poll/consume pipeline, logging each state
//! change instead of drawing it.

use std::sync::Arc;

use crossbeam_channel::unbounded;
use tracing::{error, info};

use crate::app::{App, Transition};
use crate::command::StatusCommand;
use crate::poller::{self, PollEvent, PollerHandle};
use crate::power::LowPowerQuery;
use crate::probe;
use crate::state::BatteryState;

/// Probe, then poll until `max_readings` readings have arrived (or forever).
/// Returns `None` when the machine has no battery.
pub fn monitor(
    command: Arc<dyn StatusCommand>,
    low_power: Arc<dyn LowPowerQuery>,
    max_readings: Option<usize>,
) -> Option<BatteryState> {
    let (tx, rx) = unbounded::<PollEvent>();
    probe::spawn(command.clone(), tx.clone());

    let mut app = App::new();
    app.subscribe(Box::new(|state: &BatteryState| {
        if state.has_checked_capability {
            info!(
                percentage = state.percentage,
                charging = state.is_charging,
                low_power = state.is_low_power_mode,
                "{}",
                state.status_text()
            );
        }
    }));

    let mut _poller: Option<PollerHandle> = None;
    let mut readings = 0usize;

    for event in rx.iter() {
        let is_reading = matches!(event, PollEvent::Reading(_));
        match app.handle(event) {
            Transition::StartPolling => {
                _poller = Some(poller::start(command.clone(), low_power.clone(), tx.clone()));
            }
            Transition::NoBattery => {
                error!("no battery detected");
                return None;
            }
            Transition::Updated | Transition::Unchanged => {}
        }
        if is_reading {
            readings += 1;
            if max_readings.is_some_and(|max| readings >= max) {
                break;
            }
        }
    }

    Some(app.state())
}

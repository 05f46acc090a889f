use tracing::{debug, info, warn};

use crate::poller::PollEvent;
use crate::state::{BatteryState, BatteryStore, Observer};

/// What the UI loop should do after an event has been applied.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Transition {
    /// Probe found a battery: show the tray and start the poller.
    StartPolling,
    /// Probe found no battery: show the modal notice and exit.
    NoBattery,
    Updated,
    Unchanged,
}

/// The single consumer of poll events. All state mutation goes through here.
#[derive(Default)]
pub struct App {
    store: BatteryStore,
}

impl App {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn state(&self) -> BatteryState {
        self.store.snapshot()
    }

    pub fn subscribe(&mut self, observer: Observer) {
        self.store.subscribe(observer);
    }

    pub fn handle(&mut self, event: PollEvent) -> Transition {
        match event {
            PollEvent::Probed(true) => {
                if self.store.mark_capability_checked() {
                    info!("battery detected, starting poller");
                    Transition::StartPolling
                } else {
                    Transition::Unchanged
                }
            }
            PollEvent::Probed(false) => {
                warn!("no battery detected");
                Transition::NoBattery
            }
            PollEvent::Reading(reading) => {
                if !self.store.snapshot().has_checked_capability {
                    debug!("reading before probe, ignoring");
                    return Transition::Unchanged;
                }
                if self.store.apply(reading) {
                    debug!(
                        percentage = reading.percentage,
                        charging = reading.is_charging,
                        low_power = reading.is_low_power_mode,
                        "battery state updated"
                    );
                    Transition::Updated
                } else {
                    Transition::Unchanged
                }
            }
        }
    }
}

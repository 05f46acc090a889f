/// One complete reading produced by a poll tick.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StatusReading {
    pub percentage: u8,
    pub is_charging: bool,
    pub is_low_power_mode: bool,
}

/// Current battery snapshot shown in the menu bar.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BatteryState {
    /// Always within 0..=100.
    pub percentage: u8,
    pub is_charging: bool,
    pub is_low_power_mode: bool,
    /// Set once the startup probe has confirmed a battery.
    pub has_checked_capability: bool,
}

impl Default for BatteryState {
    fn default() -> Self {
        Self {
            percentage: 100,
            is_charging: false,
            is_low_power_mode: false,
            has_checked_capability: false,
        }
    }
}

impl BatteryState {
    pub fn status_text(&self) -> String {
        let mode = match (self.is_charging, self.is_low_power_mode) {
            (true, true) => "Charging \u{00B7} Low Power Mode",
            (true, false) => "Charging",
            (false, true) => "Low Power Mode",
            (false, false) => "On Battery",
        };
        format!("{}% \u{2014} {}", self.percentage, mode)
    }
}

pub type Observer = Box<dyn FnMut(&BatteryState)>;

/// Owner of the single `BatteryState`.
///
/// Only the holder of `&mut BatteryStore` can change the state, and observers
/// are called after every field of an update has been written.
pub struct BatteryStore {
    state: BatteryState,
    observers: Vec<Observer>,
}

impl Default for BatteryStore {
    fn default() -> Self {
        Self::new()
    }
}

impl BatteryStore {
    pub fn new() -> Self {
        Self {
            state: BatteryState::default(),
            observers: Vec::new(),
        }
    }

    pub fn snapshot(&self) -> BatteryState {
        self.state
    }

    /// Register an observer. It is immediately called with the current state.
    pub fn subscribe(&mut self, mut observer: Observer) {
        observer(&self.state);
        self.observers.push(observer);
    }

    /// Record that the probe found a battery. Returns true on first call.
    pub fn mark_capability_checked(&mut self) -> bool {
        if self.state.has_checked_capability {
            return false;
        }
        self.state.has_checked_capability = true;
        self.notify();
        true
    }

    /// Replace the reading fields as one unit. Returns whether anything changed.
    pub fn apply(&mut self, reading: StatusReading) -> bool {
        let next = BatteryState {
            percentage: reading.percentage.min(100),
            is_charging: reading.is_charging,
            is_low_power_mode: reading.is_low_power_mode,
            has_checked_capability: self.state.has_checked_capability,
        };
        if next == self.state {
            return false;
        }
        self.state = next;
        self.notify();
        true
    }

    fn notify(&mut self) {
        let state = self.state;
        for observer in &mut self.observers {
            observer(&state);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::RefCell;
    use std::rc::Rc;

    fn reading(percentage: u8, is_charging: bool, is_low_power_mode: bool) -> StatusReading {
        StatusReading {
            percentage,
            is_charging,
            is_low_power_mode,
        }
    }

    fn recording_store() -> (BatteryStore, Rc<RefCell<Vec<BatteryState>>>) {
        let seen = Rc::new(RefCell::new(Vec::new()));
        let mut store = BatteryStore::new();
        let sink = seen.clone();
        store.subscribe(Box::new(move |s: &BatteryState| sink.borrow_mut().push(*s)));
        (store, seen)
    }

    #[test]
    fn test_default_is_optimistic() {
        let state = BatteryState::default();
        assert_eq!(state.percentage, 100);
        assert!(!state.is_charging);
        assert!(!state.is_low_power_mode);
        assert!(!state.has_checked_capability);
    }

    #[test]
    fn test_subscribe_delivers_current_state() {
        let (_store, seen) = recording_store();
        assert_eq!(seen.borrow().as_slice(), &[BatteryState::default()]);
    }

    #[test]
    fn test_apply_publishes_whole_snapshot() {
        let (mut store, seen) = recording_store();
        assert!(store.apply(reading(85, true, true)));

        let seen = seen.borrow();
        assert_eq!(seen.len(), 2);
        let last = seen[1];
        assert_eq!(last.percentage, 85);
        assert!(last.is_charging);
        assert!(last.is_low_power_mode);
    }

    #[test]
    fn test_identical_reading_does_not_notify() {
        let (mut store, seen) = recording_store();
        assert!(store.apply(reading(42, false, false)));
        assert!(!store.apply(reading(42, false, false)));
        assert_eq!(seen.borrow().len(), 2);
        assert_eq!(store.snapshot().percentage, 42);
    }

    #[test]
    fn test_capability_flag_survives_readings() {
        let (mut store, seen) = recording_store();
        assert!(store.mark_capability_checked());
        assert!(!store.mark_capability_checked());
        store.apply(reading(10, false, false));
        assert!(store.snapshot().has_checked_capability);
        assert_eq!(seen.borrow().len(), 3);
    }

    #[test]
    fn test_percentage_is_clamped() {
        let mut store = BatteryStore::new();
        store.apply(reading(20, false, false));
        assert!(store.apply(reading(250, true, false)));
        assert_eq!(store.snapshot().percentage, 100);
    }

    #[test]
    fn test_status_text() {
        let mut state = BatteryState::default();
        state.percentage = 85;
        state.is_charging = true;
        assert_eq!(state.status_text(), "85% \u{2014} Charging");
        state.is_charging = false;
        state.is_low_power_mode = true;
        assert_eq!(state.status_text(), "85% \u{2014} Low Power Mode");
    }
}

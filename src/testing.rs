//! Scripted fakes for the command and low-power seams.

use std::collections::VecDeque;
use std::sync::Mutex;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};

use crate::command::{CancelToken, StatusCommand};
use crate::error::CommandError;
use crate::power::LowPowerQuery;

/// Replays a fixed list of outcomes, then keeps failing with `EmptyOutput`.
pub struct ScriptedCommand {
    script: Mutex<VecDeque<Result<String, CommandError>>>,
    calls: AtomicUsize,
}

impl ScriptedCommand {
    pub fn new(script: Vec<Result<String, CommandError>>) -> Self {
        Self {
            script: Mutex::new(script.into()),
            calls: AtomicUsize::new(0),
        }
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

impl StatusCommand for ScriptedCommand {
    fn run(&self, _cancel: &CancelToken) -> Result<String, CommandError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        self.script
            .lock()
            .unwrap()
            .pop_front()
            .unwrap_or(Err(CommandError::EmptyOutput))
    }
}

/// Always answers with the same text.
pub struct RepeatingCommand {
    output: String,
    calls: AtomicUsize,
}

impl RepeatingCommand {
    pub fn new(output: &str) -> Self {
        Self {
            output: output.to_string(),
            calls: AtomicUsize::new(0),
        }
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

impl StatusCommand for RepeatingCommand {
    fn run(&self, _cancel: &CancelToken) -> Result<String, CommandError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        Ok(self.output.clone())
    }
}

/// Low-power flag that tests can flip.
#[derive(Default)]
pub struct FakeLowPower(AtomicBool);

impl FakeLowPower {
    pub fn new(enabled: bool) -> Self {
        Self(AtomicBool::new(enabled))
    }

    pub fn set(&self, enabled: bool) {
        self.0.store(enabled, Ordering::SeqCst);
    }
}

impl LowPowerQuery for FakeLowPower {
    fn is_enabled(&self) -> bool {
        self.0.load(Ordering::SeqCst)
    }
}

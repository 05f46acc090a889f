use std::process::Command;

use crate::error::ActionError;

const BATTERY_SETTINGS_URL: &str = "x-apple.systempreferences:com.apple.preference.battery";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AlertStyle {
    Informational,
    Warning,
}

impl AlertStyle {
    fn as_str(&self) -> &'static str {
        match self {
            AlertStyle::Informational => "informational",
            AlertStyle::Warning => "warning",
        }
    }
}

/// Open System Settings on the Battery pane.
pub fn open_battery_settings() -> Result<(), ActionError> {
    let output = Command::new("open").arg(BATTERY_SETTINGS_URL).output()?;
    if output.status.success() {
        Ok(())
    } else {
        Err(failure("open", &output.stderr))
    }
}

/// Modal "about" alert. Blocks until dismissed.
pub fn show_about(name: &str, version: &str) -> Result<(), ActionError> {
    show_alert(
        &format!("{name} ({version})"),
        "Battery level, charging and Low Power Mode in your menu bar.",
        AlertStyle::Informational,
    )
}

/// Modal notice shown when the machine has no battery. Blocks until dismissed.
pub fn show_no_battery_alert() -> Result<(), ActionError> {
    show_alert(
        "No Battery Detected",
        "This app is designed for MacBooks. It will now close.",
        AlertStyle::Warning,
    )
}

fn show_alert(title: &str, message: &str, style: AlertStyle) -> Result<(), ActionError> {
    let output = Command::new("osascript")
        .args(["-e", &alert_script(title, message, style)])
        .output()?;
    if output.status.success() {
        Ok(())
    } else {
        Err(failure("osascript", &output.stderr))
    }
}

fn failure(program: &str, stderr: &[u8]) -> ActionError {
    let stderr = String::from_utf8_lossy(stderr);
    ActionError::Failed(format!("{program} failed: {}", stderr.trim()))
}

/// AppleScript for a single-button alert.
fn alert_script(title: &str, message: &str, style: AlertStyle) -> String {
    // Strip quotes and backslashes so the text cannot break out of the literals.
    let clean = |s: &str| s.replace('"', "'").replace('\\', "");
    format!(
        "display alert \"{}\" message \"{}\" as {} buttons {{\"OK\"}} default button \"OK\"",
        clean(title),
        clean(message),
        style.as_str(),
    )
}

//! Scraping of `pmset -g batt` output.
//!
//! Typical output:
//!
//! ```text
//! Now drawing from 'Battery Power'
//!  -InternalBattery-0 (id=4653155)	42%; discharging; 3:12 remaining present: true
//! ```
//!
//! Only three facts are extracted: whether the first line names AC power,
//! the first `<digits>%` token on the last line, and whether the internal
//! battery is listed at all.

use once_cell::sync::Lazy;
use regex::Regex;

use crate::error::ParseError;

/// First-line marker for a machine running on the power adapter.
pub const AC_POWER_MARKER: &str = "AC Power";

/// Present anywhere in the output when the machine has a built-in battery.
pub const INTERNAL_BATTERY_MARKER: &str = "InternalBattery";

static PERCENTAGE_REGEX: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(\d+)%").expect("Invalid PERCENTAGE_REGEX pattern"));

/// Values scraped from one status command run.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ParsedStatus {
    pub percentage: u8,
    pub is_charging: bool,
}

/// Whether the output lists an internal battery.
pub fn has_internal_battery(output: &str) -> bool {
    output.contains(INTERNAL_BATTERY_MARKER)
}

/// Whether the first line of the output reports AC power.
pub fn is_on_ac_power(output: &str) -> bool {
    output
        .lines()
        .next()
        .is_some_and(|line| line.contains(AC_POWER_MARKER))
}

/// Extract the charge percentage from the last line of the output.
pub fn parse_percentage(output: &str) -> Result<u8, ParseError> {
    let last = output.lines().last().ok_or(ParseError::MissingPercentage)?;
    let caps = PERCENTAGE_REGEX
        .captures(last)
        .ok_or(ParseError::MissingPercentage)?;
    let digits = &caps[1];
    let value: u32 = digits
        .parse()
        .map_err(|_| ParseError::InvalidNumber(digits.to_string()))?;
    if value > 100 {
        return Err(ParseError::OutOfRange(value));
    }
    Ok(value as u8)
}

/// Parse a full status output. Fails without a usable percentage.
pub fn parse_status(output: &str) -> Result<ParsedStatus, ParseError> {
    let percentage = parse_percentage(output)?;
    Ok(ParsedStatus {
        percentage,
        is_charging: is_on_ac_power(output),
    })
}

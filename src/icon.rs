//! Menu bar icon selection and rendering.
//!
//! Every combination of visual state and 10% bucket has a glyph, named like
//! `charging-40`. Lookups for a name the set does not hold fall back to
//! `normal-100`.

use std::collections::HashMap;
use std::fmt;

use image::{ImageBuffer, Rgba, RgbaImage};

use crate::state::BatteryState;

/// Glyph size in pixels.
pub const ICON_WIDTH: u32 = 36;
pub const ICON_HEIGHT: u32 = 18;

/// At or below this bucket the normal icon is drawn in colour.
pub const LOW_BATTERY_THRESHOLD: u8 = 20;

const BUCKET_STEP: u8 = 10;

const OUTLINE: Rgba<u8> = Rgba([0, 0, 0, 255]);
const MUTED_OUTLINE: Rgba<u8> = Rgba([128, 128, 128, 255]);
const FILL: Rgba<u8> = Rgba([0, 0, 0, 255]);
const LOW_FILL: Rgba<u8> = Rgba([235, 64, 52, 255]);
const CHARGING_FILL: Rgba<u8> = Rgba([52, 199, 89, 255]);
const LOW_POWER_FILL: Rgba<u8> = Rgba([255, 204, 0, 255]);
const BOLT: Rgba<u8> = Rgba([255, 255, 255, 255]);
const CLEAR: Rgba<u8> = Rgba([0, 0, 0, 0]);

/// The four mutually exclusive visual states.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum IconState {
    Normal,
    Charging,
    LowPower,
    LowPowerCharging,
}

impl IconState {
    pub const ALL: [IconState; 4] = [
        IconState::Normal,
        IconState::Charging,
        IconState::LowPower,
        IconState::LowPowerCharging,
    ];

    /// Low power mode takes precedence over charging alone.
    pub fn from_flags(is_charging: bool, is_low_power_mode: bool) -> Self {
        match (is_low_power_mode, is_charging) {
            (true, true) => IconState::LowPowerCharging,
            (true, false) => IconState::LowPower,
            (false, true) => IconState::Charging,
            (false, false) => IconState::Normal,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            IconState::Normal => "normal",
            IconState::Charging => "charging",
            IconState::LowPower => "lpm",
            IconState::LowPowerCharging => "lpmcharging",
        }
    }

    fn is_charging(&self) -> bool {
        matches!(self, IconState::Charging | IconState::LowPowerCharging)
    }
}

/// Identifies one glyph: visual state plus percentage bucket.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct IconKey {
    pub state: IconState,
    pub level: u8,
}

impl IconKey {
    pub const DEFAULT: IconKey = IconKey {
        state: IconState::Normal,
        level: 100,
    };

    /// Normal glyphs at or below the low threshold are drawn in colour.
    fn is_low_colour(&self) -> bool {
        self.state == IconState::Normal && self.level <= LOW_BATTERY_THRESHOLD
    }

    /// Every key the built-in set renders.
    pub fn all() -> impl Iterator<Item = IconKey> {
        IconState::ALL.into_iter().flat_map(|state| {
            (0..=100)
                .step_by(BUCKET_STEP as usize)
                .map(move |level| IconKey { state, level })
        })
    }
}

impl fmt::Display for IconKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}-{}", self.state.as_str(), self.level)
    }
}

/// Round a percentage to the nearest bucket (0, 10, ..., 100).
pub fn level_bucket(percentage: u8) -> u8 {
    let pct = percentage.min(100) as u16;
    (((pct + (BUCKET_STEP as u16) / 2) / BUCKET_STEP as u16) * BUCKET_STEP as u16) as u8
}

/// Icon to show for a state, and whether macOS should tint it as a template.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct IconChoice {
    pub key: IconKey,
    pub template: bool,
}

/// Pure mapping from battery state to icon.
pub fn select(state: &BatteryState) -> IconChoice {
    let key = IconKey {
        state: IconState::from_flags(state.is_charging, state.is_low_power_mode),
        level: level_bucket(state.percentage),
    };
    IconChoice {
        key,
        template: !key.is_low_colour() && key.state == IconState::Normal,
    }
}

/// Rendered glyphs keyed by `IconKey`. Always holds the default glyph.
pub struct IconSet {
    images: HashMap<IconKey, RgbaImage>,
}

impl IconSet {
    /// Every state and bucket.
    pub fn builtin() -> Self {
        Self::from_keys(IconKey::all())
    }

    /// Only the given keys, plus the default.
    pub fn from_keys(keys: impl IntoIterator<Item = IconKey>) -> Self {
        let mut images: HashMap<IconKey, RgbaImage> =
            keys.into_iter().map(|key| (key, render(key))).collect();
        images
            .entry(IconKey::DEFAULT)
            .or_insert_with(|| render(IconKey::DEFAULT));
        Self { images }
    }

    /// Look up a glyph, falling back to the default. Returns the key used.
    pub fn resolve(&self, key: IconKey) -> (IconKey, &RgbaImage) {
        match self.images.get(&key) {
            Some(image) => (key, image),
            None => {
                tracing::debug!(key = %key, "no icon for key, using default");
                (IconKey::DEFAULT, &self.images[&IconKey::DEFAULT])
            }
        }
    }
}

/// Draw a battery glyph: outline, terminal nub, level fill, and a bolt when charging.
pub fn render(key: IconKey) -> RgbaImage {
    let fill_colour = match key.state {
        IconState::Normal if key.is_low_colour() => LOW_FILL,
        IconState::Normal => FILL,
        IconState::Charging => CHARGING_FILL,
        IconState::LowPower | IconState::LowPowerCharging => LOW_POWER_FILL,
    };
    let outline = if fill_colour == FILL { OUTLINE } else { MUTED_OUTLINE };

    // Body spans x 1..=31, y 2..=15 with a 2px stroke.
    let (left, right, top, bottom) = (1u32, 31u32, 2u32, 15u32);
    let (inner_left, inner_right) = (left + 3, right - 3);
    let inner_width = inner_right - inner_left + 1;
    let filled = (inner_width * key.level as u32 + 50) / 100;

    ImageBuffer::from_fn(ICON_WIDTH, ICON_HEIGHT, |x, y| {
        let in_body = x >= left && x <= right && y >= top && y <= bottom;
        let on_stroke = in_body && (x < left + 2 || x > right - 2 || y < top + 2 || y > bottom - 2);
        let in_nub = (right + 1..=right + 3).contains(&x) && (6..=11).contains(&y);

        if key.state.is_charging() && in_bolt(x as f32, y as f32) {
            return if in_body && !on_stroke { BOLT } else { outline };
        }
        if on_stroke || in_nub {
            return outline;
        }
        let in_fill = x >= inner_left
            && x < inner_left + filled
            && y >= top + 3
            && y <= bottom - 3;
        if in_fill { fill_colour } else { CLEAR }
    })
}

/// Zigzag bolt centred on the body.
fn in_bolt(x: f32, y: f32) -> bool {
    let (top, mid, bottom) = (4.0, 8.5, 13.0);
    if !(top..=bottom).contains(&y) {
        return false;
    }
    let start = if y <= mid { top } else { mid };
    let centre = 18.0 - (y - start) * 0.9;
    (x - centre).abs() <= 1.5
}

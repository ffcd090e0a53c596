use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Shortest pause between clicks when the configured interval is zero.
pub const MIN_INTERVAL_SECS: f64 = 0.01;

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(into = "u8", try_from = "u8")]
pub enum RepeatMode {
    #[default]
    Infinite,
    FixedCount,
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(into = "u8", try_from = "u8")]
pub enum PositionMode {
    #[default]
    CurrentCursor,
    FixedPoint,
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum ClickButton {
    #[default]
    Left,
    Right,
    Middle,
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum ClickKind {
    #[default]
    Single,
    Double,
}

impl From<RepeatMode> for u8 {
    fn from(mode: RepeatMode) -> u8 {
        match mode {
            RepeatMode::Infinite => 0,
            RepeatMode::FixedCount => 1,
        }
    }
}

impl TryFrom<u8> for RepeatMode {
    type Error = String;

    fn try_from(raw: u8) -> Result<Self, Self::Error> {
        match raw {
            0 => Ok(RepeatMode::Infinite),
            1 => Ok(RepeatMode::FixedCount),
            other => Err(format!("unknown repeat mode {other} (expected 0 or 1)")),
        }
    }
}

impl From<PositionMode> for u8 {
    fn from(mode: PositionMode) -> u8 {
        match mode {
            PositionMode::CurrentCursor => 0,
            PositionMode::FixedPoint => 1,
        }
    }
}

impl TryFrom<u8> for PositionMode {
    type Error = String;

    fn try_from(raw: u8) -> Result<Self, Self::Error> {
        match raw {
            0 => Ok(PositionMode::CurrentCursor),
            1 => Ok(PositionMode::FixedPoint),
            other => Err(format!("unknown position mode {other} (expected 0 or 1)")),
        }
    }
}

impl ClickButton {
    pub const ALL: [ClickButton; 3] = [ClickButton::Left, ClickButton::Right, ClickButton::Middle];

    pub fn label(self) -> &'static str {
        match self {
            ClickButton::Left => "Left",
            ClickButton::Right => "Right",
            ClickButton::Middle => "Middle",
        }
    }
}

impl ClickKind {
    pub const ALL: [ClickKind; 2] = [ClickKind::Single, ClickKind::Double];

    pub fn label(self) -> &'static str {
        match self {
            ClickKind::Single => "Single",
            ClickKind::Double => "Double",
        }
    }

    pub fn clicks(self) -> u32 {
        match self {
            ClickKind::Single => 1,
            ClickKind::Double => 2,
        }
    }
}

/// Pause between clicks in seconds, never below [`MIN_INTERVAL_SECS`].
pub fn interval_seconds(hours: u32, minutes: u32, seconds: u32, millis: u32) -> f64 {
    let raw = f64::from(hours) * 3600.0
        + f64::from(minutes) * 60.0
        + f64::from(seconds)
        + f64::from(millis) / 1000.0;
    if raw <= 0.0 { MIN_INTERVAL_SECS } else { raw }
}

/// The editable form values, as shown in the window and written to disk.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ClickInputs {
    pub hours: u32,
    pub minutes: u32,
    pub seconds: u32,
    pub millis: u32,
    pub repeat_mode: RepeatMode,
    pub repeat_times: u32,
    pub position_mode: PositionMode,
    pub x: u32,
    pub y: u32,
    pub button: ClickButton,
    pub click_kind: ClickKind,
}

impl Default for ClickInputs {
    fn default() -> Self {
        Self {
            hours: 0,
            minutes: 0,
            seconds: 0,
            millis: 100,
            repeat_mode: RepeatMode::Infinite,
            repeat_times: 1,
            position_mode: PositionMode::CurrentCursor,
            x: 0,
            y: 0,
            button: ClickButton::Left,
            click_kind: ClickKind::Single,
        }
    }
}

impl ClickInputs {
    pub fn snapshot(&self) -> ClickSnapshot {
        ClickSnapshot {
            interval_secs: interval_seconds(self.hours, self.minutes, self.seconds, self.millis),
            repeat_mode: self.repeat_mode,
            repeat_count: self.repeat_times,
            position_mode: self.position_mode,
            x: self.x,
            y: self.y,
            button: self.button,
            click_kind: self.click_kind,
        }
    }
}

/// Parameters frozen at start time; a running loop only ever sees its own copy.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct ClickSnapshot {
    pub interval_secs: f64,
    pub repeat_mode: RepeatMode,
    pub repeat_count: u32,
    pub position_mode: PositionMode,
    pub x: u32,
    pub y: u32,
    pub button: ClickButton,
    pub click_kind: ClickKind,
}

impl ClickSnapshot {
    pub fn interval(&self) -> Duration {
        Duration::from_secs_f64(self.interval_secs.max(MIN_INTERVAL_SECS))
    }

    /// `None` means clicks keep coming until the run is stopped.
    pub fn click_limit(&self) -> Option<u32> {
        match self.repeat_mode {
            RepeatMode::Infinite => None,
            RepeatMode::FixedCount => Some(self.repeat_count),
        }
    }

    pub fn target(&self) -> Option<(i32, i32)> {
        match self.position_mode {
            PositionMode::CurrentCursor => None,
            PositionMode::FixedPoint => Some((to_screen(self.x), to_screen(self.y))),
        }
    }
}

fn to_screen(coord: u32) -> i32 {
    i32::try_from(coord).unwrap_or(i32::MAX)
}

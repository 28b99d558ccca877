// Telenode — System Events & Data Types

use std::fmt;

// ---------------------------------------------------------------------------
// Acceleration (3-axis reading from the LIS2DH12, in g)
// ---------------------------------------------------------------------------
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct Vector3 {
    pub x: f32,
    pub y: f32,
    pub z: f32,
}

impl Vector3 {
    pub const fn new(x: f32, y: f32, z: f32) -> Self {
        Self { x, y, z }
    }

    pub fn is_finite(&self) -> bool {
        self.x.is_finite() && self.y.is_finite() && self.z.is_finite()
    }
}

// ---------------------------------------------------------------------------
// Dice face (orientation label)
// ---------------------------------------------------------------------------
/// Face pointing up, dice numbering: opposite faces sum to 7.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[repr(u8)]
pub enum Face {
    #[default]
    Unknown = 0,
    ZPositive = 1,
    XPositive = 2,
    YPositive = 3,
    YNegative = 4,
    XNegative = 5,
    ZNegative = 6,
}

impl Face {
    pub fn code(self) -> u8 {
        self as u8
    }

    pub fn from_code(code: u8) -> Option<Self> {
        match code {
            0 => Some(Self::Unknown),
            1 => Some(Self::ZPositive),
            2 => Some(Self::XPositive),
            3 => Some(Self::YPositive),
            4 => Some(Self::YNegative),
            5 => Some(Self::XNegative),
            6 => Some(Self::ZNegative),
            _ => None,
        }
    }
}

// ---------------------------------------------------------------------------
// Report header — why the current frame is sent
// ---------------------------------------------------------------------------
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(u8)]
pub enum ReportHeader {
    Boot = 0x00,
    ScheduledUpdate = 0x01,
    ButtonClick = 0x02,
    ButtonHold = 0x03,
}

impl ReportHeader {
    pub fn from_u8(v: u8) -> Option<Self> {
        match v {
            0x00 => Some(Self::Boot),
            0x01 => Some(Self::ScheduledUpdate),
            0x02 => Some(Self::ButtonClick),
            0x03 => Some(Self::ButtonHold),
            _ => None,
        }
    }
}

impl fmt::Display for ReportHeader {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Boot => "boot",
            Self::ScheduledUpdate => "update",
            Self::ButtonClick => "button click",
            Self::ButtonHold => "button hold",
        };
        f.write_str(name)
    }
}

// ---------------------------------------------------------------------------
// Collaborator signals
// ---------------------------------------------------------------------------
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SensorKind {
    Thermometer,
    Accelerometer,
    Battery,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ButtonEvent {
    Click,
    Hold,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TransportEvent {
    Error,
    SendStarted,
    SendDone,
    Ready,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LedMode {
    Off,
    On,
    BlinkFast,
    /// Blink `n` times, then off.
    Blink(u8),
}

// ---------------------------------------------------------------------------
// Node events — queued and dispatched one at a time
// ---------------------------------------------------------------------------
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NodeEvent {
    /// A sensor has a fresh value behind its accessor.
    SensorUpdate(SensorKind),
    Button(ButtonEvent),
    Transport(TransportEvent),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn face_codes_round_trip() {
        for code in 0..=6 {
            assert_eq!(Face::from_code(code).map(Face::code), Some(code));
        }
        assert_eq!(Face::from_code(7), None);
        assert_eq!(Face::from_code(0xFF), None);
    }

    #[test]
    fn header_tags_match_wire_values() {
        assert_eq!(ReportHeader::Boot as u8, 0);
        assert_eq!(ReportHeader::ButtonHold as u8, 3);
        assert_eq!(ReportHeader::from_u8(2), Some(ReportHeader::ButtonClick));
        assert_eq!(ReportHeader::from_u8(4), None);
    }
}

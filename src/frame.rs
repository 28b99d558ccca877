// Telenode — Report Frame
//
// Fixed 9-byte uplink payload, multi-byte fields big-endian:
//
// ┌────────┬─────────┬─────────────┬──────────────┬─────────────┬────────────┐
// │ Header │ Voltage │ Orientation │ Temperature  │ Click count │ Hold count │
// │ 1 byte │ 1 byte  │ 1 byte      │ 2 bytes i16  │ 2 bytes u16 │ 2 bytes u16│
// └────────┴─────────┴─────────────┴──────────────┴─────────────┴────────────┘
//
// Voltage and temperature are carried in tenths.  A field without data this
// window is left at 0xFF (0xFFFF for temperature) so the receiver can tell
// "no reading" from a zero reading.

use std::fmt;

use crate::events::{Face, ReportHeader};

pub const FRAME_LEN: usize = 9;

/// Fill byte for fields without data.
pub const NO_DATA: u8 = 0xFF;

/// Largest voltage value that does not collide with the sentinel.
const VOLTAGE_MAX_TENTHS: f32 = 254.0;

/// Aggregate state a frame is built from.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FrameFields {
    pub header: ReportHeader,
    /// Average battery voltage (V).
    pub voltage: Option<f32>,
    /// Median face code.
    pub orientation: Option<u8>,
    /// Average temperature (°C).
    pub temperature: Option<f32>,
    pub clicks: u16,
    pub holds: u16,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Frame([u8; FRAME_LEN]);

impl Frame {
    /// Build the frame.  Pure: reads `fields` only.
    pub fn encode(fields: &FrameFields) -> Self {
        let mut buf = [NO_DATA; FRAME_LEN];

        buf[0] = fields.header as u8;

        if let Some(volts) = fields.voltage.filter(|v| v.is_finite()) {
            buf[1] = tenths(volts).clamp(0.0, VOLTAGE_MAX_TENTHS) as u8;
        }

        if let Some(face) = fields.orientation {
            buf[2] = face;
        }

        if let Some(celsius) = fields.temperature.filter(|v| v.is_finite()) {
            let t = tenths(celsius).clamp(i16::MIN as f32, i16::MAX as f32) as i16;
            buf[3..5].copy_from_slice(&t.to_be_bytes());
        }

        buf[5..7].copy_from_slice(&fields.clicks.to_be_bytes());
        buf[7..9].copy_from_slice(&fields.holds.to_be_bytes());

        Self(buf)
    }

    pub fn as_bytes(&self) -> &[u8; FRAME_LEN] {
        &self.0
    }

    /// Parse a received payload back into its fields.
    pub fn decode(buf: &[u8]) -> Option<DecodedFrame> {
        if buf.len() != FRAME_LEN {
            return None;
        }

        let orientation = match buf[2] {
            NO_DATA => None,
            code => Some(Face::from_code(code)?),
        };
        let temperature = match [buf[3], buf[4]] {
            [NO_DATA, NO_DATA] => None,
            raw => Some(i16::from_be_bytes(raw)),
        };

        Some(DecodedFrame {
            header: ReportHeader::from_u8(buf[0])?,
            voltage_tenths: (buf[1] != NO_DATA).then_some(buf[1]),
            orientation,
            temperature_tenths: temperature,
            clicks: u16::from_be_bytes([buf[5], buf[6]]),
            holds: u16::from_be_bytes([buf[7], buf[8]]),
        })
    }
}

/// Lowercase hex, as echoed on the console after a send.
impl fmt::Display for Frame {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for b in self.0 {
            write!(f, "{:02x}", b)?;
        }
        Ok(())
    }
}

/// Fields of a received frame, in wire units.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DecodedFrame {
    pub header: ReportHeader,
    pub voltage_tenths: Option<u8>,
    pub orientation: Option<Face>,
    pub temperature_tenths: Option<i16>,
    pub clicks: u16,
    pub holds: u16,
}

fn tenths(value: f32) -> f32 {
    (value * 10.0).round()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn fields() -> FrameFields {
        FrameFields {
            header: ReportHeader::ScheduledUpdate,
            voltage: Some(3.7),
            orientation: Some(4),
            temperature: Some(-5.2),
            clicks: 300,
            holds: 2,
        }
    }

    #[test]
    fn reference_frame() {
        let frame = Frame::encode(&fields());
        assert_eq!(
            frame.as_bytes(),
            &[0x01, 0x25, 0x04, 0xFF, 0xCC, 0x01, 0x2C, 0x00, 0x02]
        );
        assert_eq!(frame.to_string(), "012504ffcc012c0002");
    }

    #[test]
    fn missing_voltage_and_orientation_use_sentinel() {
        let frame = Frame::encode(&FrameFields {
            voltage: None,
            orientation: None,
            ..fields()
        });
        let bytes = frame.as_bytes();
        assert_eq!(bytes[1], NO_DATA);
        assert_eq!(bytes[2], NO_DATA);
        assert_eq!(&bytes[3..], &[0xFF, 0xCC, 0x01, 0x2C, 0x00, 0x02]);
    }

    #[test]
    fn missing_temperature_uses_double_sentinel() {
        let frame = Frame::encode(&FrameFields {
            temperature: None,
            ..fields()
        });
        assert_eq!(&frame.as_bytes()[3..5], &[0xFF, 0xFF]);
    }

    #[test]
    fn boot_frame_without_any_data() {
        let frame = Frame::encode(&FrameFields {
            header: ReportHeader::Boot,
            voltage: None,
            orientation: None,
            temperature: None,
            clicks: 0,
            holds: 0,
        });
        assert_eq!(
            frame.as_bytes(),
            &[0x00, 0xFF, 0xFF, 0xFF, 0xFF, 0x00, 0x00, 0x00, 0x00]
        );
    }

    #[test]
    fn zero_readings_are_not_sentinels() {
        let frame = Frame::encode(&FrameFields {
            voltage: Some(0.0),
            orientation: Some(0),
            temperature: Some(0.0),
            ..fields()
        });
        assert_eq!(&frame.as_bytes()[1..5], &[0x00, 0x00, 0x00, 0x00]);
    }

    #[test]
    fn values_are_rounded_and_clamped() {
        let frame = Frame::encode(&FrameFields {
            voltage: Some(3.66),
            temperature: Some(21.96),
            ..fields()
        });
        assert_eq!(frame.as_bytes()[1], 37);
        assert_eq!(&frame.as_bytes()[3..5], &220i16.to_be_bytes());

        let frame = Frame::encode(&FrameFields {
            voltage: Some(40.0),
            temperature: Some(1.0e6),
            ..fields()
        });
        assert_eq!(frame.as_bytes()[1], 254);
        assert_eq!(&frame.as_bytes()[3..5], &i16::MAX.to_be_bytes());
    }

    #[test]
    fn nan_aggregates_encode_as_no_data() {
        let frame = Frame::encode(&FrameFields {
            voltage: Some(f32::NAN),
            temperature: Some(f32::NAN),
            ..fields()
        });
        assert_eq!(frame.as_bytes()[1], NO_DATA);
        assert_eq!(&frame.as_bytes()[3..5], &[NO_DATA, NO_DATA]);
    }

    #[test]
    fn decode_recovers_wire_values() {
        let frame = Frame::encode(&fields());
        let decoded = Frame::decode(frame.as_bytes()).unwrap();
        assert_eq!(decoded.header, ReportHeader::ScheduledUpdate);
        assert_eq!(decoded.voltage_tenths, Some(37));
        assert_eq!(decoded.orientation, Some(Face::YNegative));
        assert_eq!(decoded.temperature_tenths, Some(-52));
        assert_eq!(decoded.clicks, 300);
        assert_eq!(decoded.holds, 2);

        assert_eq!(Frame::decode(&[0x01; 8]), None);
        assert_eq!(Frame::decode(&[0x07; 9]), None);

        // face code out of range
        let mut bytes = *frame.as_bytes();
        bytes[2] = 9;
        assert_eq!(Frame::decode(&bytes), None);
    }
}

// Telenode — External collaborator interfaces
//
// Sensor drivers, the radio transport and the LED sit behind these traits.
// The ESP-IDF drivers and the host simulator both implement them; tests use
// hand-written mocks.

use crate::events::{LedMode, SensorKind, TransportEvent, Vector3};

/// Radio uplink.
pub trait Transport {
    /// `true` when a new frame can be handed over.
    fn is_ready(&self) -> bool;

    /// Request transmission.  Completion is reported through `poll_event`.
    fn send(&mut self, payload: &[u8]) -> bool;

    /// Next pending transport signal, if any.
    fn poll_event(&mut self) -> Option<TransportEvent>;
}

/// Thermometer, accelerometer and battery monitor.
pub trait Sensors {
    /// Take a measurement.  `true` means the accessor for `kind` now holds
    /// a fresh value (the node then raises the matching update event).
    fn measure(&mut self, kind: SensorKind) -> bool;

    fn temperature_celsius(&self) -> Option<f32>;

    fn battery_voltage(&self) -> Option<f32>;

    fn acceleration_g(&self) -> Option<Vector3>;
}

/// Status LED.
pub trait Indicator {
    fn set_mode(&mut self, mode: LedMode);
}

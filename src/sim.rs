// Telenode — Host simulator
//
// Stands in for the board when running on a development machine: a slowly
// drifting thermometer, a battery that sags while the radio transmits, an
// accelerometer resting on a configurable face, and a radio with a join
// delay and fixed airtime.

use std::collections::VecDeque;
use std::time::{Duration, Instant};

use telenode::events::{LedMode, SensorKind, TransportEvent, Vector3};
use telenode::{Frame, Indicator, Sensors, Transport};

const RADIO_JOIN_DELAY: Duration = Duration::from_secs(3);
const RADIO_AIRTIME: Duration = Duration::from_millis(400);
const BATTERY_IDLE_V: f32 = 3.02;
const BATTERY_LOAD_DROP_V: f32 = 0.12;

/// Uptime clock shared by the simulated parts.
#[derive(Clone, Copy)]
pub struct SimClock {
    start: Instant,
    scale: u32,
}

impl SimClock {
    pub fn new(scale: u32) -> Self {
        Self {
            start: Instant::now(),
            scale: scale.max(1),
        }
    }

    pub fn uptime(&self) -> Duration {
        self.start.elapsed()
    }

    /// Uptime as experienced by the physical world (time-scaled).
    fn world_time(&self) -> Duration {
        self.uptime() * self.scale
    }
}

// ---------------------------------------------------------------------------
// Sensors
// ---------------------------------------------------------------------------
pub struct SimSensors {
    clock: SimClock,
    gravity: Vector3,
    under_load: bool,
    temperature: Option<f32>,
    voltage: Option<f32>,
    acceleration: Option<Vector3>,
}

impl SimSensors {
    pub fn new(clock: SimClock) -> Self {
        Self {
            clock,
            gravity: Vector3::new(0.02, -0.03, 0.98),
            under_load: false,
            temperature: None,
            voltage: None,
            acceleration: None,
        }
    }

    pub fn set_gravity(&mut self, gravity: Vector3) {
        log::info!("Simulated gravity now {:?}", gravity);
        self.gravity = gravity;
    }

    pub fn set_under_load(&mut self, under_load: bool) {
        self.under_load = under_load;
    }
}

impl Sensors for SimSensors {
    fn measure(&mut self, kind: SensorKind) -> bool {
        let hours = self.clock.world_time().as_secs_f32() / 3600.0;
        match kind {
            SensorKind::Thermometer => {
                // slow swing plus a gentle downward drift
                self.temperature = Some(21.5 + 3.0 * (hours * 0.26).sin() - 0.05 * hours);
            }
            SensorKind::Battery => {
                let drop = if self.under_load { BATTERY_LOAD_DROP_V } else { 0.0 };
                self.voltage = Some(BATTERY_IDLE_V - 0.001 * hours - drop);
            }
            SensorKind::Accelerometer => {
                let jitter = 0.01 * (hours * 977.0).sin();
                self.acceleration = Some(Vector3::new(
                    self.gravity.x + jitter,
                    self.gravity.y - jitter,
                    self.gravity.z,
                ));
            }
        }
        true
    }

    fn temperature_celsius(&self) -> Option<f32> {
        self.temperature
    }

    fn battery_voltage(&self) -> Option<f32> {
        self.voltage
    }

    fn acceleration_g(&self) -> Option<Vector3> {
        self.acceleration
    }
}

// ---------------------------------------------------------------------------
// Radio
// ---------------------------------------------------------------------------
pub struct SimRadio {
    clock: SimClock,
    joined: bool,
    airtime_until: Option<Duration>,
    fail_next: bool,
    events: VecDeque<TransportEvent>,
    uplinks: u32,
}

impl SimRadio {
    pub fn new(clock: SimClock) -> Self {
        Self {
            clock,
            joined: false,
            airtime_until: None,
            fail_next: false,
            events: VecDeque::new(),
            uplinks: 0,
        }
    }

    /// Make the next transmission end in an error.
    pub fn fail_next(&mut self) {
        self.fail_next = true;
    }

    pub fn is_transmitting(&self) -> bool {
        self.airtime_until.is_some()
    }

    fn advance(&mut self) {
        let now = self.clock.uptime();

        if !self.joined && now >= RADIO_JOIN_DELAY {
            self.joined = true;
            self.events.push_back(TransportEvent::Ready);
        }

        if let Some(until) = self.airtime_until {
            if now >= until {
                self.airtime_until = None;
                if std::mem::take(&mut self.fail_next) {
                    self.events.push_back(TransportEvent::Error);
                } else {
                    self.events.push_back(TransportEvent::SendDone);
                }
            }
        }
    }
}

impl Transport for SimRadio {
    fn is_ready(&self) -> bool {
        self.joined && self.airtime_until.is_none()
    }

    fn send(&mut self, payload: &[u8]) -> bool {
        if !self.is_ready() {
            return false;
        }
        self.uplinks += 1;
        match Frame::decode(payload) {
            Some(decoded) => log::info!("Radio uplink #{}: {:?}", self.uplinks, decoded),
            None => log::warn!("Radio uplink #{}: malformed ({} bytes)", self.uplinks, payload.len()),
        }
        self.airtime_until = Some(self.clock.uptime() + RADIO_AIRTIME);
        self.events.push_back(TransportEvent::SendStarted);
        true
    }

    fn poll_event(&mut self) -> Option<TransportEvent> {
        self.advance();
        self.events.pop_front()
    }
}

// ---------------------------------------------------------------------------
// LED
// ---------------------------------------------------------------------------
#[derive(Default)]
pub struct SimLed {
    mode: Option<LedMode>,
}

impl Indicator for SimLed {
    fn set_mode(&mut self, mode: LedMode) {
        if self.mode != Some(mode) {
            log::info!("LED {:?}", mode);
            self.mode = Some(mode);
        }
    }
}

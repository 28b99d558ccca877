// Telenode — Sample ingest
//
// Bridges sensor update events into the window aggregates.  Orientation is
// smoothed twice: the classifier turns each vector into a face, and the face
// codes go through a small median buffer.

use crate::collaborators::Sensors;
use crate::config::{ClassifierConfig, ORIENTATION_SAMPLES, TEMPERATURE_SAMPLES, VOLTAGE_SAMPLES};
use crate::counters::EventCounters;
use crate::events::{ButtonEvent, ReportHeader, SensorKind};
use crate::frame::FrameFields;
use crate::orientation::OrientationClassifier;
use crate::stat_buffer::StatBuffer;

/// Everything a report is computed from.
pub struct Aggregates {
    voltage: StatBuffer<f32, VOLTAGE_SAMPLES>,
    temperature: StatBuffer<f32, TEMPERATURE_SAMPLES>,
    orientation: StatBuffer<u8, ORIENTATION_SAMPLES>,
    dice: OrientationClassifier,
    counters: EventCounters,
}

/// Point-in-time view of the aggregates.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Snapshot {
    pub voltage: Option<f32>,
    pub temperature: Option<f32>,
    pub orientation: Option<u8>,
    pub clicks: u16,
    pub holds: u16,
}

impl Snapshot {
    pub fn frame_fields(&self, header: ReportHeader) -> FrameFields {
        FrameFields {
            header,
            voltage: self.voltage,
            orientation: self.orientation,
            temperature: self.temperature,
            clicks: self.clicks,
            holds: self.holds,
        }
    }
}

impl Aggregates {
    pub fn new(classifier: ClassifierConfig) -> Self {
        Self {
            voltage: StatBuffer::new(),
            temperature: StatBuffer::new(),
            orientation: StatBuffer::new(),
            dice: OrientationClassifier::new(classifier),
            counters: EventCounters::new(),
        }
    }

    /// Handle a sensor update event by reading the sensor's current value.
    pub fn on_sensor_update<S: Sensors + ?Sized>(&mut self, kind: SensorKind, sensors: &S) {
        match kind {
            SensorKind::Thermometer => match sensors.temperature_celsius() {
                Some(celsius) if celsius.is_finite() => {
                    log::debug!("Temperature {:.2} °C", celsius);
                    self.temperature.feed(celsius);
                }
                other => log::debug!("Thermometer update without value ({:?})", other),
            },

            SensorKind::Battery => match sensors.battery_voltage() {
                Some(volts) if volts.is_finite() => {
                    log::debug!("Battery {:.2} V", volts);
                    self.voltage.feed(volts);
                }
                other => log::debug!("Battery update without value ({:?})", other),
            },

            SensorKind::Accelerometer => match sensors.acceleration_g() {
                Some(g) if g.is_finite() => {
                    let face = self.dice.feed_vector(g.x, g.y, g.z);
                    log::debug!("Acceleration {:?} -> face {}", g, face);
                    self.orientation.feed(face);
                }
                other => log::debug!("Accelerometer update without value ({:?})", other),
            },
        }
    }

    pub fn on_button(&mut self, event: ButtonEvent) {
        self.counters.record(event);
    }

    pub fn snapshot(&self) -> Snapshot {
        Snapshot {
            voltage: self.voltage.average(),
            temperature: self.temperature.average(),
            orientation: self.orientation.median(),
            clicks: self.counters.clicks(),
            holds: self.counters.holds(),
        }
    }

    pub fn counters(&self) -> EventCounters {
        self.counters
    }

    /// Samples currently held per buffer: (voltage, temperature, orientation).
    pub fn sample_counts(&self) -> (usize, usize, usize) {
        (self.voltage.len(), self.temperature.len(), self.orientation.len())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::events::{Face, Vector3};

    #[derive(Default)]
    struct FixedSensors {
        temperature: Option<f32>,
        voltage: Option<f32>,
        acceleration: Option<Vector3>,
    }

    impl Sensors for FixedSensors {
        fn measure(&mut self, _kind: SensorKind) -> bool {
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

    #[test]
    fn fresh_aggregates_have_no_data() {
        let aggregates = Aggregates::new(ClassifierConfig::default());
        let snap = aggregates.snapshot();
        assert_eq!(snap.voltage, None);
        assert_eq!(snap.temperature, None);
        assert_eq!(snap.orientation, None);
        assert_eq!((snap.clicks, snap.holds), (0, 0));
    }

    #[test]
    fn readings_land_in_their_buffers() {
        let mut aggregates = Aggregates::new(ClassifierConfig::default());
        let mut sensors = FixedSensors {
            temperature: Some(20.0),
            voltage: Some(3.0),
            ..FixedSensors::default()
        };

        aggregates.on_sensor_update(SensorKind::Thermometer, &sensors);
        aggregates.on_sensor_update(SensorKind::Battery, &sensors);
        sensors.temperature = Some(22.0);
        aggregates.on_sensor_update(SensorKind::Thermometer, &sensors);

        let snap = aggregates.snapshot();
        assert_eq!(snap.temperature, Some(21.0));
        assert_eq!(snap.voltage, Some(3.0));
        assert_eq!(aggregates.sample_counts(), (1, 2, 0));
    }

    #[test]
    fn missing_and_nan_readings_are_dropped() {
        let mut aggregates = Aggregates::new(ClassifierConfig::default());
        let sensors = FixedSensors {
            temperature: Some(f32::NAN),
            voltage: None,
            acceleration: Some(Vector3::new(f32::INFINITY, 0.0, 0.0)),
        };

        aggregates.on_sensor_update(SensorKind::Thermometer, &sensors);
        aggregates.on_sensor_update(SensorKind::Battery, &sensors);
        aggregates.on_sensor_update(SensorKind::Accelerometer, &sensors);

        assert_eq!(aggregates.sample_counts(), (0, 0, 0));
    }

    #[test]
    fn orientation_is_median_of_classified_faces() {
        let mut aggregates = Aggregates::new(ClassifierConfig::default());
        let mut sensors = FixedSensors::default();

        // 6, 6, then 1 -> median of [6, 6, 1] is 6
        for v in [
            Vector3::new(0.0, 0.0, -1.0),
            Vector3::new(0.0, 0.0, -1.0),
            Vector3::new(0.0, 0.0, 1.0),
        ] {
            sensors.acceleration = Some(v);
            aggregates.on_sensor_update(SensorKind::Accelerometer, &sensors);
        }

        assert_eq!(aggregates.snapshot().orientation, Some(Face::ZNegative.code()));

        // [6, 1, 1] -> 1
        aggregates.on_sensor_update(SensorKind::Accelerometer, &sensors);
        assert_eq!(aggregates.snapshot().orientation, Some(Face::ZPositive.code()));
    }

    #[test]
    fn buttons_feed_counters() {
        let mut aggregates = Aggregates::new(ClassifierConfig::default());
        aggregates.on_button(ButtonEvent::Click);
        aggregates.on_button(ButtonEvent::Hold);
        aggregates.on_button(ButtonEvent::Click);
        let snap = aggregates.snapshot();
        assert_eq!((snap.clicks, snap.holds), (2, 1));
    }
}

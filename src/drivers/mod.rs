// Telenode — Board drivers (ESP-IDF only)
//
// Register-level drivers over the shared I2C bus, the battery ADC, the status
// LED and the UART modem.  `Board` bundles the three sensors behind the
// `Sensors` trait and caches the last good reading of each.

pub mod battery;
pub mod led;
pub mod lis2dh12;
pub mod modem;
pub mod tmp112;

use std::sync::Mutex;

use esp_idf_hal::i2c::I2cDriver;

use telenode::events::{SensorKind, Vector3};
use telenode::Sensors;

use self::battery::BatteryMonitor;
use self::lis2dh12::Lis2dh12;
use self::tmp112::Tmp112;

/// Thread-safe handle to a shared I2C bus.
pub type SharedBus = &'static Mutex<I2cDriver<'static>>;

pub struct Board {
    thermometer: Tmp112,
    accelerometer: Lis2dh12,
    battery: BatteryMonitor,
    temperature: Option<f32>,
    acceleration: Option<Vector3>,
    voltage: Option<f32>,
}

impl Board {
    pub fn new(thermometer: Tmp112, accelerometer: Lis2dh12, battery: BatteryMonitor) -> Self {
        Self {
            thermometer,
            accelerometer,
            battery,
            temperature: None,
            acceleration: None,
            voltage: None,
        }
    }
}

impl Sensors for Board {
    fn measure(&mut self, kind: SensorKind) -> bool {
        let result = match kind {
            SensorKind::Thermometer => self.thermometer.read_celsius().map(|t| self.temperature = Some(t)),
            SensorKind::Accelerometer => self.accelerometer.read_g().map(|g| self.acceleration = Some(g)),
            SensorKind::Battery => self.battery.read_volts().map(|v| self.voltage = Some(v)),
        };

        match result {
            Ok(()) => true,
            Err(e) => {
                log::warn!("{:?} read error: {}", kind, e);
                false
            }
        }
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

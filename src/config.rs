// Telenode — Hardware & System Configuration
// Target: ESP32-C3 sensor node with TMP112, LIS2DH12 and a UART LoRa modem.

use std::time::Duration;

use thiserror::Error;

// ---------------------------------------------------------------------------
// GPIO Pin Definitions
// ---------------------------------------------------------------------------
pub const PIN_BUTTON: i32 = 3;      // User button (INPUT_PULLUP, active LOW)
pub const PIN_LED: i32 = 5;         // Status LED (active HIGH)
pub const PIN_I2C_SDA: i32 = 6;     // I2C data line
pub const PIN_I2C_SCL: i32 = 7;     // I2C clock line
pub const PIN_UART_TX: i32 = 21;    // Modem RX
pub const PIN_UART_RX: i32 = 20;    // Modem TX
pub const PIN_BATTERY_ADC: u32 = 2; // Battery voltage (ADC1 channel 2)

// ---------------------------------------------------------------------------
// I2C Bus
// ---------------------------------------------------------------------------
pub const I2C_ADDR_TMP112: u8 = 0x49;
pub const I2C_ADDR_LIS2DH12: u8 = 0x19;
pub const I2C_TIMEOUT_TICKS: u32 = 1000; // FreeRTOS ticks

// ---------------------------------------------------------------------------
// Modem UART
// ---------------------------------------------------------------------------
pub const MODEM_BAUDRATE: u32 = 19_200;
pub const MODEM_LINE_MAX: usize = 64;
pub const MODEM_PROBE_RETRY_MS: u64 = 1000;
pub const MODEM_SEND_TIMEOUT_MS: u64 = 20_000;          // uplink without +OK / +ERR

// ---------------------------------------------------------------------------
// Timing (milliseconds)
// ---------------------------------------------------------------------------
pub const SEND_DATA_INTERVAL_MS: u64 = 60 * 60 * 1000;  // 1 hour reporting window
pub const MEASURE_INTERVAL_MS: u64 = 60 * 1000;         // thermometer / accelerometer
pub const WARMUP_DELAY_MS: u64 = 10 * 1000;             // boot announcement delay
pub const READY_POLL_INTERVAL_MS: u64 = 100;            // transport readiness poll
pub const BATTERY_FIRST_MEASURE_MS: u64 = 2020;
pub const BATTERY_REMEASURE_DELAY_MS: u64 = 20;         // after send start (under load)
pub const BATTERY_RETRY_DELAY_MS: u64 = 100;            // monitor busy or read failed
pub const LOOP_POLL_INTERVAL_MS: u64 = 10;              // input poll / max idle sleep
pub const DEBOUNCE_MS: u64 = 50;
pub const HOLD_MS: u64 = 1000;                          // press longer than this is a hold

// ---------------------------------------------------------------------------
// Aggregation buffers (samples)
// ---------------------------------------------------------------------------
pub const VOLTAGE_SAMPLES: usize = 8;
pub const TEMPERATURE_SAMPLES: usize = (SEND_DATA_INTERVAL_MS / MEASURE_INTERVAL_MS) as usize; // 60
pub const ORIENTATION_SAMPLES: usize = 3;

// ---------------------------------------------------------------------------
// Orientation classifier (g)
// ---------------------------------------------------------------------------
pub const FACE_THRESHOLD_G: f32 = 0.4;
pub const FACE_HYSTERESIS_G: f32 = 0.2;

// ---------------------------------------------------------------------------
// LIS2DH12 scale (8-bit resolution, ±2 g → 16 mg/LSB)
// ---------------------------------------------------------------------------
pub const ACCEL_SCALE_8BIT_2G: f32 = 0.016;

/// Timing parameters of the reporting cycle.
#[derive(Debug, Clone, PartialEq)]
pub struct NodeConfig {
    pub send_interval: Duration,
    pub measure_interval: Duration,
    pub warmup_delay: Duration,
    pub ready_poll_interval: Duration,
    pub battery_first_measure: Duration,
    pub battery_remeasure_delay: Duration,
    pub battery_retry_delay: Duration,
}

impl Default for NodeConfig {
    fn default() -> Self {
        Self {
            send_interval: Duration::from_millis(SEND_DATA_INTERVAL_MS),
            measure_interval: Duration::from_millis(MEASURE_INTERVAL_MS),
            warmup_delay: Duration::from_millis(WARMUP_DELAY_MS),
            ready_poll_interval: Duration::from_millis(READY_POLL_INTERVAL_MS),
            battery_first_measure: Duration::from_millis(BATTERY_FIRST_MEASURE_MS),
            battery_remeasure_delay: Duration::from_millis(BATTERY_REMEASURE_DELAY_MS),
            battery_retry_delay: Duration::from_millis(BATTERY_RETRY_DELAY_MS),
        }
    }
}

#[derive(Debug, Error, PartialEq)]
pub enum ConfigError {
    #[error("{0} must be greater than zero")]
    ZeroInterval(&'static str),
    #[error("send interval ({send:?}) is shorter than the measure interval ({measure:?})")]
    WindowShorterThanMeasure { send: Duration, measure: Duration },
}

impl NodeConfig {
    pub fn validate(&self) -> Result<(), ConfigError> {
        let intervals = [
            ("send_interval", self.send_interval),
            ("measure_interval", self.measure_interval),
            ("ready_poll_interval", self.ready_poll_interval),
            ("battery_retry_delay", self.battery_retry_delay),
        ];
        for (name, value) in intervals {
            if value.is_zero() {
                return Err(ConfigError::ZeroInterval(name));
            }
        }

        if self.send_interval < self.measure_interval {
            return Err(ConfigError::WindowShorterThanMeasure {
                send: self.send_interval,
                measure: self.measure_interval,
            });
        }

        Ok(())
    }

    /// Divide every interval by `factor` (host simulator fast-forward).
    pub fn scaled(&self, factor: u32) -> Self {
        let factor = factor.max(1);
        Self {
            send_interval: self.send_interval / factor,
            measure_interval: self.measure_interval / factor,
            warmup_delay: self.warmup_delay / factor,
            ready_poll_interval: self.ready_poll_interval,
            battery_first_measure: self.battery_first_measure / factor,
            battery_remeasure_delay: self.battery_remeasure_delay,
            battery_retry_delay: self.battery_retry_delay,
        }
    }
}

/// Thresholds for the dice orientation classifier.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ClassifierConfig {
    /// Minimum magnitude of the dominant axis.
    pub threshold: f32,
    /// Required lead of the dominant axis over the runner-up.
    pub hysteresis: f32,
}

impl Default for ClassifierConfig {
    fn default() -> Self {
        Self {
            threshold: FACE_THRESHOLD_G,
            hysteresis: FACE_HYSTERESIS_G,
        }
    }
}

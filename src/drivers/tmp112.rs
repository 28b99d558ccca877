// Telenode — TMP112 Thermometer Driver
//
// Register-level driver over the shared I2C bus.  Runs in continuous
// conversion mode (4 Hz); a measurement just reads the latest result.

use std::sync::MutexGuard;

use esp_idf_hal::i2c::I2cDriver;

use telenode::config::*;

use super::SharedBus;

const REG_TEMPERATURE: u8 = 0x00;
const REG_CONFIG: u8 = 0x01;
// Continuous conversion, 12-bit, 4 Hz (power-on defaults made explicit)
const CONFIG_CONTINUOUS: [u8; 2] = [0x60, 0xA0];
const CELSIUS_PER_LSB: f32 = 0.0625;

pub struct Tmp112 {
    bus: SharedBus,
}

impl Tmp112 {
    pub fn new(bus: SharedBus) -> Self {
        Self { bus }
    }

    pub fn init(&self) -> anyhow::Result<()> {
        let mut bus = self.lock()?;
        bus.write(
            I2C_ADDR_TMP112,
            &[REG_CONFIG, CONFIG_CONTINUOUS[0], CONFIG_CONTINUOUS[1]],
            I2C_TIMEOUT_TICKS,
        )?;
        log::info!("TMP112 initialised (12-bit, continuous 4 Hz)");
        Ok(())
    }

    pub fn read_celsius(&self) -> anyhow::Result<f32> {
        let mut bus = self.lock()?;
        let mut raw = [0u8; 2];
        bus.write_read(I2C_ADDR_TMP112, &[REG_TEMPERATURE], &mut raw, I2C_TIMEOUT_TICKS)?;

        // 12-bit two's complement, left aligned
        let counts = i16::from_be_bytes(raw) >> 4;
        Ok(counts as f32 * CELSIUS_PER_LSB)
    }

    fn lock(&self) -> anyhow::Result<MutexGuard<'static, I2cDriver<'static>>> {
        self.bus
            .lock()
            .map_err(|_| anyhow::anyhow!("I2C bus mutex poisoned"))
    }
}

// Telenode — LIS2DH12 Accelerometer Driver
//
// Register-level driver over the shared I2C bus.  8-bit low-power mode at
// 10 Hz, ±2 g; only the gravity direction matters here.

use std::sync::MutexGuard;

use esp_idf_hal::i2c::I2cDriver;

use telenode::config::*;
use telenode::events::Vector3;

use super::SharedBus;

const REG_WHO_AM_I: u8 = 0x0F;
const REG_CTRL_REG1: u8 = 0x20;
const REG_CTRL_REG4: u8 = 0x23;
const REG_OUT_X_L: u8 = 0x28;
const AUTO_INCREMENT: u8 = 0x80;
const WHO_AM_I_EXPECTED: u8 = 0x33;

// ODR 10 Hz, low-power (8-bit), X/Y/Z enabled
const CTRL_REG1_LP_10HZ: u8 = 0x2F;
// Block data update, ±2 g
const CTRL_REG4_BDU_2G: u8 = 0x80;

pub struct Lis2dh12 {
    bus: SharedBus,
}

impl Lis2dh12 {
    pub fn new(bus: SharedBus) -> Self {
        Self { bus }
    }

    /// Verify the device is reachable on the I2C bus.
    pub fn is_connected(&self) -> bool {
        let Ok(mut bus) = self.lock() else {
            return false;
        };
        let mut buf = [0u8; 1];
        match bus.write_read(I2C_ADDR_LIS2DH12, &[REG_WHO_AM_I], &mut buf, I2C_TIMEOUT_TICKS) {
            Ok(()) => buf[0] == WHO_AM_I_EXPECTED,
            Err(_) => false,
        }
    }

    pub fn init(&self) -> anyhow::Result<()> {
        if !self.is_connected() {
            anyhow::bail!("LIS2DH12 not found at 0x{:02x}", I2C_ADDR_LIS2DH12);
        }

        let mut bus = self.lock()?;
        bus.write(I2C_ADDR_LIS2DH12, &[REG_CTRL_REG1, CTRL_REG1_LP_10HZ], I2C_TIMEOUT_TICKS)?;
        bus.write(I2C_ADDR_LIS2DH12, &[REG_CTRL_REG4, CTRL_REG4_BDU_2G], I2C_TIMEOUT_TICKS)?;

        log::info!("LIS2DH12 initialised (8-bit, ±2g, 10 Hz)");
        Ok(())
    }

    /// Burst-read the three axes and convert to g.
    pub fn read_g(&self) -> anyhow::Result<Vector3> {
        let mut bus = self.lock()?;
        let mut raw = [0u8; 6];
        bus.write_read(
            I2C_ADDR_LIS2DH12,
            &[REG_OUT_X_L | AUTO_INCREMENT],
            &mut raw,
            I2C_TIMEOUT_TICKS,
        )?;

        // 8-bit mode: the result sits in the high byte of each axis
        Ok(Vector3 {
            x: raw[1] as i8 as f32 * ACCEL_SCALE_8BIT_2G,
            y: raw[3] as i8 as f32 * ACCEL_SCALE_8BIT_2G,
            z: raw[5] as i8 as f32 * ACCEL_SCALE_8BIT_2G,
        })
    }

    fn lock(&self) -> anyhow::Result<MutexGuard<'static, I2cDriver<'static>>> {
        self.bus
            .lock()
            .map_err(|_| anyhow::anyhow!("I2C bus mutex poisoned"))
    }
}

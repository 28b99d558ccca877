// Telenode — Battery Monitor
//
// One-shot ADC read via raw ESP-IDF calls.  GPIO2 / ADC1 channel 2 with
// 11 dB attenuation (0–3.3 V range) behind a 1:2 resistor divider.

use telenode::config::PIN_BATTERY_ADC;

const ADC_FULL_SCALE: f32 = 4095.0;
const ADC_REFERENCE_V: f32 = 3.3;
const DIVIDER_RATIO: f32 = 2.0;

pub struct BatteryMonitor {
    handle: esp_idf_sys::adc_oneshot_unit_handle_t,
    channel: esp_idf_sys::adc_channel_t,
}

impl BatteryMonitor {
    pub fn new() -> anyhow::Result<Self> {
        let channel = PIN_BATTERY_ADC as esp_idf_sys::adc_channel_t;

        // SAFETY: configuration structs are fully initialised; the unit handle
        // is owned by this monitor for the rest of the programme.
        unsafe {
            let mut handle: esp_idf_sys::adc_oneshot_unit_handle_t = core::ptr::null_mut();
            let unit_cfg = esp_idf_sys::adc_oneshot_unit_init_cfg_t {
                unit_id: esp_idf_sys::adc_unit_t_ADC_UNIT_1,
                ulp_mode: esp_idf_sys::adc_ulp_mode_t_ADC_ULP_MODE_DISABLE,
                ..core::mem::zeroed()
            };
            let ret = esp_idf_sys::adc_oneshot_new_unit(&unit_cfg, &mut handle);
            if ret != esp_idf_sys::ESP_OK {
                anyhow::bail!("ADC unit init failed ({})", ret);
            }

            let chan_cfg = esp_idf_sys::adc_oneshot_chan_cfg_t {
                atten: esp_idf_sys::adc_atten_t_ADC_ATTEN_DB_11,
                bitwidth: esp_idf_sys::adc_bitwidth_t_ADC_BITWIDTH_12,
            };
            let ret = esp_idf_sys::adc_oneshot_config_channel(handle, channel, &chan_cfg);
            if ret != esp_idf_sys::ESP_OK {
                anyhow::bail!("ADC channel config failed ({})", ret);
            }

            log::info!("Battery ADC ready on channel {}", PIN_BATTERY_ADC);
            Ok(Self { handle, channel })
        }
    }

    pub fn read_volts(&self) -> anyhow::Result<f32> {
        let mut raw: i32 = 0;
        // SAFETY: handle and channel were configured in `new`.
        let ret = unsafe { esp_idf_sys::adc_oneshot_read(self.handle, self.channel, &mut raw) };
        if ret != esp_idf_sys::ESP_OK {
            anyhow::bail!("ADC read failed ({})", ret);
        }

        Ok((raw as f32 / ADC_FULL_SCALE) * ADC_REFERENCE_V * DIVIDER_RATIO)
    }
}

// Telenode — Status LED Driver
//
// GPIO-driven LED.  Blink patterns are toggled from the main loop via `tick`.

use std::time::Duration;

use esp_idf_hal::gpio::{AnyOutputPin, Output, PinDriver};

use telenode::events::LedMode;
use telenode::Indicator;

const BLINK_FAST_HALF_PERIOD: Duration = Duration::from_millis(100);
const BLINK_HALF_PERIOD: Duration = Duration::from_millis(250);

pub struct StatusLed {
    pin: PinDriver<'static, AnyOutputPin, Output>,
    mode: LedMode,
    lit: bool,
    last_toggle: Duration,
    /// Toggles left in a counted blink.
    toggles_left: u8,
}

impl StatusLed {
    pub fn new(pin: PinDriver<'static, AnyOutputPin, Output>) -> Self {
        let mut led = Self {
            pin,
            mode: LedMode::Off,
            lit: false,
            last_toggle: Duration::ZERO,
            toggles_left: 0,
        };
        led.write(false);
        led
    }

    /// Advance the blink pattern; call every loop iteration.
    pub fn tick(&mut self, now: Duration) {
        let half_period = match self.mode {
            LedMode::BlinkFast => BLINK_FAST_HALF_PERIOD,
            LedMode::Blink(_) => BLINK_HALF_PERIOD,
            LedMode::Off | LedMode::On => return,
        };
        if now.saturating_sub(self.last_toggle) < half_period {
            return;
        }
        self.last_toggle = now;

        if let LedMode::Blink(_) = self.mode {
            if self.toggles_left == 0 {
                self.mode = LedMode::Off;
                self.write(false);
                return;
            }
            self.toggles_left -= 1;
        }

        let lit = !self.lit;
        self.write(lit);
    }

    fn write(&mut self, lit: bool) {
        self.lit = lit;
        let _ = if lit { self.pin.set_high() } else { self.pin.set_low() };
    }
}

impl Indicator for StatusLed {
    fn set_mode(&mut self, mode: LedMode) {
        self.mode = mode;
        match mode {
            LedMode::Off => self.write(false),
            LedMode::On => self.write(true),
            LedMode::BlinkFast => {}
            LedMode::Blink(count) => {
                self.toggles_left = count.saturating_mul(2);
                self.write(false);
            }
        }
    }
}

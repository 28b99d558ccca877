// Telenode — Button Input
//
// Debounced button with click and hold detection.  Polled from the main
// loop; a hold fires once while the button is still down, a click fires on
// release of a shorter press.

use std::time::Instant;

use esp_idf_hal::gpio::{AnyInputPin, Input, PinDriver};

use telenode::config::*;
use telenode::events::ButtonEvent;

pub struct ButtonInput<'d> {
    pin: PinDriver<'d, AnyInputPin, Input>,

    // Debounce state
    last_raw: bool,
    last_debounce: Instant,

    // Press tracking
    press_start: Option<Instant>,
    hold_reported: bool,
}

impl<'d> ButtonInput<'d> {
    pub fn new(pin: PinDriver<'d, AnyInputPin, Input>) -> Self {
        configure_pullup();
        Self {
            pin,
            last_raw: true, // pull-up → idle HIGH
            last_debounce: Instant::now(),
            press_start: None,
            hold_reported: false,
        }
    }

    /// Call every loop iteration (~10 ms).
    pub fn update(&mut self) -> Option<ButtonEvent> {
        let current = self.pin.is_high(); // true = released (pull-up)
        let now = Instant::now();

        // ---- debounce filter ----
        if current != self.last_raw {
            self.last_debounce = now;
        }
        self.last_raw = current;

        let stable_ms = now.duration_since(self.last_debounce).as_millis() as u64;
        if stable_ms < DEBOUNCE_MS {
            return None;
        }

        let pressed = !current; // active LOW

        match (pressed, self.press_start) {
            // pressed edge
            (true, None) => {
                self.press_start = Some(now);
                self.hold_reported = false;
                None
            }
            // still down: report the hold once
            (true, Some(start)) => {
                let held_ms = now.duration_since(start).as_millis() as u64;
                if !self.hold_reported && held_ms >= HOLD_MS {
                    self.hold_reported = true;
                    Some(ButtonEvent::Hold)
                } else {
                    None
                }
            }
            // released edge
            (false, Some(_)) => {
                self.press_start = None;
                (!self.hold_reported).then_some(ButtonEvent::Click)
            }
            (false, None) => None,
        }
    }
}

/// Enable the internal pull-up on the button GPIO.
fn configure_pullup() {
    // SAFETY: plain register configuration of a pin this driver owns.
    unsafe {
        esp_idf_sys::gpio_set_pull_mode(
            PIN_BUTTON,
            esp_idf_sys::gpio_pull_mode_t_GPIO_PULLUP_ONLY,
        );
    }
}

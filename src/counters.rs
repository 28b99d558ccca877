// Telenode — Button event counters
//
// Lifetime totals sent verbatim in every frame.  Never reset; wrap at 65535.

use crate::events::ButtonEvent;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct EventCounters {
    clicks: u16,
    holds: u16,
}

impl EventCounters {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn record(&mut self, event: ButtonEvent) {
        match event {
            ButtonEvent::Click => self.clicks = self.clicks.wrapping_add(1),
            ButtonEvent::Hold => self.holds = self.holds.wrapping_add(1),
        }
    }

    pub fn clicks(&self) -> u16 {
        self.clicks
    }

    pub fn holds(&self) -> u16 {
        self.holds
    }
}

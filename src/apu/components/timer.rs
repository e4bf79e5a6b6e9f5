//! Divider that clocks a channel's waveform generator

use serde::{Deserialize, Serialize};

/// Down-counting timer; fires when it is clocked at zero and reloads
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Timer {
    /// Raw period as written by the CPU
    pub(crate) period: u16,
    counter: u16,
}

impl Timer {
    pub fn new() -> Self {
        Self::default()
    }

    /// Clock the timer, reloading with `period`
    /// Returns true when the timer was at 0
    pub fn clock(&mut self) -> bool {
        self.clock_with(self.period)
    }

    /// Clock the timer, reloading with a caller-scaled period
    pub fn clock_with(&mut self, reload: u16) -> bool {
        if self.counter == 0 {
            self.counter = reload;
            true
        } else {
            self.counter -= 1;
            false
        }
    }

    /// Replace the low 8 bits of an 11-bit period
    pub fn set_low(&mut self, low: u8) {
        self.period = (self.period & 0x0700) | low as u16;
    }

    /// Replace the high 3 bits of an 11-bit period
    pub fn set_high(&mut self, high: u8) {
        self.period = (self.period & 0x00FF) | (((high & 0x07) as u16) << 8);
    }

    pub fn set_period(&mut self, period: u16) {
        self.period = period;
    }
}

//! Envelope generator for controlling volume over time

use serde::{Deserialize, Serialize};

/// Envelope generator shared by the pulse and noise channels
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Envelope {
    /// Start flag - set by a write to the channel's length register
    pub(crate) start: bool,
    /// Divider counter
    divider: u8,
    /// Decay level counter (0-15)
    pub(crate) decay_level: u8,
    /// Divider period, and the volume in constant-volume mode
    pub(crate) period: u8,
    /// Loop flag (shared with the length counter halt bit)
    pub(crate) loop_flag: bool,
    /// Constant volume flag (register bit 4)
    pub(crate) constant_volume: bool,
}

impl Envelope {
    pub fn new() -> Self {
        Self::default()
    }

    /// Clock the envelope generator (quarter frame)
    pub fn clock(&mut self) {
        if self.start {
            self.start = false;
            self.decay_level = 15;
            self.divider = self.period;
        } else if self.divider > 0 {
            self.divider -= 1;
        } else {
            self.divider = self.period;
            if self.decay_level > 0 {
                self.decay_level -= 1;
            } else if self.loop_flag {
                self.decay_level = 15;
            }
        }
    }

    /// Get the current volume (0-15)
    pub fn volume(&self) -> u8 {
        if self.constant_volume {
            self.period
        } else {
            self.decay_level
        }
    }

    /// Apply the low six bits of a channel's first register
    pub fn write_control(&mut self, data: u8) {
        self.loop_flag = (data & 0x20) != 0;
        self.constant_volume = (data & 0x10) != 0;
        self.period = data & 0x0F;
    }

    pub fn restart(&mut self) {
        self.start = true;
    }
}

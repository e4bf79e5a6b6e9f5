//! Sweep unit for pitch bending

use serde::{Deserialize, Serialize};

/// Pulse sweep unit
///
/// The target period and the muting flag are recomputed whenever the
/// channel's period or the sweep settings change, and after every period
/// update the sweep makes.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Sweep {
    enabled: bool,
    divider: u8,
    period: u8,
    negate: bool,
    shift: u8,
    reload: bool,
    /// Pulse 1 negates with one's complement (subtracts one more)
    pub(crate) ones_complement: bool,
    target: i32,
    pub(crate) muting: bool,
}

impl Sweep {
    /// `channel` is 1 or 2
    pub fn new(channel: u8) -> Self {
        Self {
            enabled: false,
            divider: 0,
            period: 0,
            negate: false,
            shift: 0,
            reload: false,
            ones_complement: channel == 1,
            target: 0,
            muting: true,
        }
    }

    /// Recompute the target period and muting for the channel's current period
    pub fn update(&mut self, current_period: u16) {
        let current = current_period as i32;
        let mut change = current >> self.shift;
        if self.negate {
            change = -change;
            if self.ones_complement {
                change -= 1;
            }
        }
        self.target = current + change;
        self.muting = self.target > 0x7FF || current_period < 8;
    }

    /// Clock the sweep unit (half frame)
    /// Returns the new channel period when the sweep adjusts it
    pub fn clock(&mut self) -> Option<u16> {
        let mut new_period = None;
        if self.divider == 0 && self.enabled && !self.muting && self.shift > 0 {
            // Not muting: target is within 0..=0x7FF
            new_period = Some(self.target as u16);
        }

        if self.divider == 0 || self.reload {
            self.divider = self.period;
            self.reload = false;
        } else {
            self.divider -= 1;
        }

        new_period
    }

    /// Write the sweep register ($4001/$4005)
    pub fn write_control(&mut self, data: u8) {
        self.enabled = (data & 0x80) != 0;
        self.period = (data >> 4) & 0x07;
        self.negate = (data & 0x08) != 0;
        self.shift = data & 0x07;
        self.reload = true;
    }
}

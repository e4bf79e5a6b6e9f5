//! Linear counter for the triangle channel

use serde::{Deserialize, Serialize};

/// Linear counter: a second, finer duration gate on the triangle channel
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct LinearCounter {
    pub(crate) counter: u8,
    /// Reload value (register bits 6-0)
    pub(crate) reload_value: u8,
    /// Control flag (register bit 7); keeps the reload flag set while on
    pub(crate) control_flag: bool,
    /// Set by a write to $400B
    pub(crate) reload_flag: bool,
}

impl LinearCounter {
    pub fn new() -> Self {
        Self::default()
    }

    /// Clock the linear counter (quarter frame)
    pub fn clock(&mut self) {
        if self.reload_flag {
            self.counter = self.reload_value;
        } else if self.counter > 0 {
            self.counter -= 1;
        }

        if !self.control_flag {
            self.reload_flag = false;
        }
    }

    pub fn is_active(&self) -> bool {
        self.counter > 0
    }

    /// Write $4008; the reload flag is left alone
    pub fn write_control(&mut self, data: u8) {
        self.control_flag = (data & 0x80) != 0;
        self.reload_value = data & 0x7F;
    }

    pub fn set_reload_flag(&mut self) {
        self.reload_flag = true;
    }
}

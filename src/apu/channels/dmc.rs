//! DMC (Delta Modulation Channel) implementation for sample playback
//!
//! The channel never touches the bus itself. When its one-byte sample
//! buffer is empty and bytes remain, it publishes the address it wants
//! through `fetch_address`, and the bus answers with `fetch_complete` in
//! the same CPU cycle.

use serde::{Deserialize, Serialize};

use crate::apu::components::Timer;
use crate::apu::constants::DMC_RATE_TABLE;

/// DMC channel for sample playback
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DmcChannel {
    pub(crate) irq_enabled: bool,
    pub(crate) loop_flag: bool,
    /// Rate timer (period = table value - 1)
    pub(crate) timer: Timer,
    /// Sample start ($C000 + value * 64)
    pub(crate) sample_address: u16,
    /// Sample length (value * 16 + 1 bytes)
    pub(crate) sample_length: u16,
    pub(crate) current_address: u16,
    pub(crate) bytes_remaining: u16,
    pub(crate) sample_buffer: u8,
    pub(crate) sample_buffer_empty: bool,
    pub(crate) shift_register: u8,
    pub(crate) bits_remaining: u8,
    /// Output level (7-bit counter, 0-127)
    pub(crate) output_level: u8,
    pub(crate) silence_flag: bool,
    /// IRQ pending flag
    pub(crate) irq_flag: bool,
}

impl Default for DmcChannel {
    fn default() -> Self {
        Self::new()
    }
}

impl DmcChannel {
    pub fn new() -> Self {
        Self {
            irq_enabled: false,
            loop_flag: false,
            timer: Timer::new(),
            sample_address: 0xC000,
            sample_length: 0,
            current_address: 0xC000,
            bytes_remaining: 0,
            sample_buffer: 0,
            sample_buffer_empty: true,
            shift_register: 0,
            bits_remaining: 8,
            output_level: 0,
            silence_flag: true,
            irq_flag: false,
        }
    }

    /// $4010: IRQ enable, loop, rate index
    pub fn write_register_0(&mut self, data: u8) {
        self.irq_enabled = (data & 0x80) != 0;
        self.loop_flag = (data & 0x40) != 0;
        self.timer
            .set_period(DMC_RATE_TABLE[(data & 0x0F) as usize] - 1);
        if !self.irq_enabled {
            self.irq_flag = false;
        }
    }

    /// $4011: direct load of the output level
    pub fn write_register_1(&mut self, data: u8) {
        self.output_level = data & 0x7F;
    }

    /// $4012: sample address
    pub fn write_register_2(&mut self, data: u8) {
        self.sample_address = 0xC000 | ((data as u16) << 6);
    }

    /// $4013: sample length
    pub fn write_register_3(&mut self, data: u8) {
        self.sample_length = ((data as u16) << 4) + 1;
    }

    /// $4015 bit 4: start the sample if idle, or stop it
    pub fn set_enabled(&mut self, enabled: bool) {
        if enabled {
            if self.bytes_remaining == 0 {
                self.restart();
            }
        } else {
            self.bytes_remaining = 0;
        }
    }

    fn restart(&mut self) {
        self.bytes_remaining = self.sample_length;
        self.current_address = self.sample_address;
    }

    /// Bytes remain in the current sample
    pub fn is_active(&self) -> bool {
        self.bytes_remaining > 0
    }

    /// Clock the output unit
    pub fn clock_timer(&mut self) {
        if !self.timer.clock() {
            return;
        }
        if !self.silence_flag {
            if self.shift_register & 0x01 == 0 {
                if self.output_level >= 2 {
                    self.output_level -= 2;
                }
            } else if self.output_level <= 125 {
                self.output_level += 2;
            }
        }
        self.shift_register >>= 1;
        self.bits_remaining -= 1;
        if self.bits_remaining == 0 {
            self.bits_remaining = 8;
            if self.sample_buffer_empty {
                self.silence_flag = true;
            } else {
                self.silence_flag = false;
                self.shift_register = self.sample_buffer;
                self.sample_buffer_empty = true;
            }
        }
    }

    /// Address of the next sample byte, when the reader wants one
    pub fn fetch_address(&self) -> Option<u16> {
        if self.bytes_remaining > 0 && self.sample_buffer_empty {
            Some(self.current_address)
        } else {
            None
        }
    }

    /// Accept the byte read from `fetch_address`
    pub fn fetch_complete(&mut self, value: u8) {
        if self.bytes_remaining == 0 {
            return;
        }
        self.sample_buffer = value;
        self.sample_buffer_empty = false;
        self.current_address = if self.current_address == 0xFFFF {
            0x8000
        } else {
            self.current_address + 1
        };
        self.bytes_remaining -= 1;
        if self.bytes_remaining == 0 {
            if self.loop_flag {
                self.restart();
            } else if self.irq_enabled {
                self.irq_flag = true;
            }
        }
    }

    pub fn output(&self) -> u8 {
        self.output_level
    }

    pub(crate) fn validate(&self) -> Result<(), String> {
        if self.bits_remaining == 0 || self.bits_remaining > 8 || self.output_level > 0x7F {
            return Err("DMC output unit out of range".to_string());
        }
        Ok(())
    }
}

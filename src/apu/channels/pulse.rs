//! Pulse wave channel implementation

use serde::{Deserialize, Serialize};

use crate::apu::components::{Envelope, LengthCounter, Sweep, Timer};
use crate::apu::constants::DUTY_PATTERNS;

/// Pulse wave channel (used for both Pulse 1 and Pulse 2)
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PulseChannel {
    /// Enabled flag (from $4015)
    pub(crate) enabled: bool,
    /// Duty cycle (0-3)
    pub(crate) duty: u8,
    /// Duty cycle sequence position (0-7)
    duty_position: u8,
    pub(crate) envelope: Envelope,
    pub(crate) sweep: Sweep,
    pub(crate) length_counter: LengthCounter,
    /// 11-bit period; the divider reloads with `period * 2 + 1`
    pub(crate) timer: Timer,
}

impl PulseChannel {
    /// `channel_number` is 1 or 2 and selects the sweep negate behavior
    pub fn new(channel_number: u8) -> Self {
        Self {
            enabled: false,
            duty: 0,
            duty_position: 0,
            envelope: Envelope::new(),
            sweep: Sweep::new(channel_number),
            length_counter: LengthCounter::new(),
            timer: Timer::new(),
        }
    }

    /// Register 0: duty, length halt / envelope loop, constant volume, volume
    pub fn write_register_0(&mut self, data: u8) {
        self.duty = (data >> 6) & 0x03;
        self.length_counter.set_halt((data & 0x20) != 0);
        self.envelope.write_control(data);
    }

    /// Register 1: sweep unit
    pub fn write_register_1(&mut self, data: u8) {
        self.sweep.write_control(data);
        self.sweep.update(self.timer.period);
    }

    /// Register 2: timer low byte
    pub fn write_register_2(&mut self, data: u8) {
        self.timer.set_low(data);
        self.sweep.update(self.timer.period);
    }

    /// Register 3: length counter load and timer high bits
    pub fn write_register_3(&mut self, data: u8) {
        self.timer.set_high(data);
        self.duty_position = 0;
        if self.enabled {
            self.length_counter.load(data >> 3);
        }
        self.envelope.restart();
        self.sweep.update(self.timer.period);
    }

    /// Set the enabled flag (from $4015); disabling clears the length counter
    pub fn set_enabled(&mut self, enabled: bool) {
        self.enabled = enabled;
        if !enabled {
            self.length_counter.clear();
        }
    }

    /// Length counter nonzero, as reported by $4015
    pub fn is_active(&self) -> bool {
        self.length_counter.is_active()
    }

    /// Clock the timer and advance the duty sequencer
    pub fn clock_timer(&mut self) {
        if self.timer.clock_with(self.timer.period * 2 + 1) {
            self.duty_position = (self.duty_position + 1) & 0x07;
        }
    }

    pub fn clock_envelope(&mut self) {
        self.envelope.clock();
    }

    pub fn clock_length_counter(&mut self) {
        self.length_counter.clock();
    }

    pub fn clock_sweep(&mut self) {
        if let Some(new_period) = self.sweep.clock() {
            self.timer.set_period(new_period);
            self.sweep.update(new_period);
        }
    }

    /// Current output level (0-15)
    pub fn output(&self) -> u8 {
        let duty_output = DUTY_PATTERNS[self.duty as usize][self.duty_position as usize];
        if duty_output == 0 || self.sweep.muting || !self.length_counter.is_active() {
            0
        } else {
            self.envelope.volume()
        }
    }

    pub(crate) fn validate(&self) -> Result<(), String> {
        if self.duty > 3 || self.duty_position > 7 {
            return Err("pulse duty out of range".to_string());
        }
        Ok(())
    }
}

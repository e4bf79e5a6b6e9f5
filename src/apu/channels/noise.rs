//! Noise channel implementation

use serde::{Deserialize, Serialize};

use crate::apu::components::{Envelope, LengthCounter, Timer};
use crate::apu::constants::NOISE_PERIOD_TABLE;

/// Noise channel: a 15-bit linear feedback shift register gated by an envelope
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NoiseChannel {
    pub(crate) enabled: bool,
    pub(crate) envelope: Envelope,
    pub(crate) length_counter: LengthCounter,
    pub(crate) timer: Timer,
    /// Seeded with 1
    pub(crate) shift_register: u16,
    /// Short-period mode (register bit 7): feedback from bit 6 instead of bit 1
    pub(crate) tonal: bool,
}

impl Default for NoiseChannel {
    fn default() -> Self {
        Self::new()
    }
}

impl NoiseChannel {
    pub fn new() -> Self {
        Self {
            enabled: false,
            envelope: Envelope::new(),
            length_counter: LengthCounter::new(),
            timer: Timer::new(),
            shift_register: 1,
            tonal: false,
        }
    }

    /// $400C: length halt / envelope loop, constant volume, volume
    pub fn write_register_0(&mut self, data: u8) {
        self.length_counter.set_halt((data & 0x20) != 0);
        self.envelope.write_control(data);
    }

    /// $400E: mode and period index
    pub fn write_register_2(&mut self, data: u8) {
        self.tonal = (data & 0x80) != 0;
        self.timer
            .set_period(NOISE_PERIOD_TABLE[(data & 0x0F) as usize] - 1);
    }

    /// $400F: length load and envelope restart
    pub fn write_register_3(&mut self, data: u8) {
        if self.enabled {
            self.length_counter.load(data >> 3);
        }
        self.envelope.restart();
    }

    pub fn set_enabled(&mut self, enabled: bool) {
        self.enabled = enabled;
        if !enabled {
            self.length_counter.clear();
        }
    }

    pub fn is_active(&self) -> bool {
        self.length_counter.is_active()
    }

    pub fn clock_timer(&mut self) {
        if self.timer.clock() {
            let tap = if self.tonal { 6 } else { 1 };
            let feedback = (self.shift_register ^ (self.shift_register >> tap)) & 0x01;
            self.shift_register = (self.shift_register >> 1) | (feedback << 14);
        }
    }

    pub fn clock_envelope(&mut self) {
        self.envelope.clock();
    }

    pub fn clock_length_counter(&mut self) {
        self.length_counter.clock();
    }

    /// Current output level (0-15)
    pub fn output(&self) -> u8 {
        if !self.length_counter.is_active() || self.shift_register & 0x01 != 0 {
            0
        } else {
            self.envelope.volume()
        }
    }

    /// A zero shift register never recovers, so it is rejected with the rest
    pub(crate) fn validate(&self) -> Result<(), String> {
        if self.shift_register == 0 || self.shift_register > 0x7FFF {
            return Err("noise shift register out of range".to_string());
        }
        let period = self.timer.period;
        if period != 0 && !NOISE_PERIOD_TABLE.iter().any(|&p| p - 1 == period) {
            return Err(format!("noise timer period {} not in the period table", period));
        }
        if self.envelope.decay_level > 15 || self.envelope.period > 15 {
            return Err("noise envelope out of range".to_string());
        }
        Ok(())
    }
}

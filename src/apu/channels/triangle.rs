//! Triangle wave channel implementation

use serde::{Deserialize, Serialize};

use crate::apu::components::{LengthCounter, LinearCounter, Timer};
use crate::apu::constants::TRIANGLE_SEQUENCE;

/// Level held while the period is too short to be audible
const ULTRASONIC_LEVEL: f64 = 7.5;

/// Triangle wave channel
///
/// The sequencer only steps while both the length and linear counters are
/// nonzero; otherwise the last level is held.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TriangleChannel {
    pub(crate) enabled: bool,
    pub(crate) linear_counter: LinearCounter,
    pub(crate) length_counter: LengthCounter,
    /// 11-bit period; the divider reloads with `period` directly
    pub(crate) timer: Timer,
    /// Sequence position (0-31)
    sequence_position: u8,
    /// Held output level
    output: f64,
}

impl Default for TriangleChannel {
    fn default() -> Self {
        Self::new()
    }
}

impl TriangleChannel {
    pub fn new() -> Self {
        Self {
            enabled: false,
            linear_counter: LinearCounter::new(),
            length_counter: LengthCounter::new(),
            timer: Timer::new(),
            sequence_position: 0,
            output: 0.0,
        }
    }

    /// $4008: control flag (also length halt) and linear reload value
    pub fn write_register_0(&mut self, data: u8) {
        self.linear_counter.write_control(data);
        self.length_counter.set_halt((data & 0x80) != 0);
    }

    /// $400A: timer low byte
    pub fn write_register_2(&mut self, data: u8) {
        self.timer.set_low(data);
    }

    /// $400B: timer high bits and length load; sets the linear reload flag
    pub fn write_register_3(&mut self, data: u8) {
        self.timer.set_high(data);
        if self.enabled {
            self.length_counter.load(data >> 3);
        }
        self.linear_counter.set_reload_flag();
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
        if !self.timer.clock() {
            return;
        }
        if self.length_counter.is_active() && self.linear_counter.is_active() {
            self.output = if self.timer.period < 2 {
                ULTRASONIC_LEVEL
            } else {
                TRIANGLE_SEQUENCE[self.sequence_position as usize] as f64
            };
            self.sequence_position = (self.sequence_position + 1) & 0x1F;
        }
    }

    pub fn clock_linear_counter(&mut self) {
        self.linear_counter.clock();
    }

    pub fn clock_length_counter(&mut self) {
        self.length_counter.clock();
    }

    pub fn output(&self) -> f64 {
        self.output
    }

    pub(crate) fn validate(&self) -> Result<(), String> {
        if self.sequence_position > 0x1F || !(0.0..=15.0).contains(&self.output) {
            return Err("triangle sequencer out of range".to_string());
        }
        Ok(())
    }
}

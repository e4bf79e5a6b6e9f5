// APU module - Audio Processing Unit (2A03) implementation
//
// Clocked once per CPU cycle. Each cycle runs the frame counter, then the
// triangle, both pulses, noise and DMC, and appends one mixed sample to a
// per-frame buffer that the host drains.
//
// # Register Map
//
// ```text
// $4000-$4003: Pulse 1
// $4004-$4007: Pulse 2
// $4008-$400B: Triangle
// $400C-$400F: Noise
// $4010-$4013: DMC
// $4015:       Channel enables (W) / status (R)
// $4017:       Frame counter mode (W)
// ```

pub mod channels;
pub mod components;
pub mod constants;

#[cfg(test)]
mod tests;

use serde::{Deserialize, Serialize};

use crate::bus::MemoryMappedDevice;
use channels::{DmcChannel, NoiseChannel, PulseChannel, TriangleChannel};
use components::{FrameCounter, FrameEvent};
use constants::*;

/// Serializable APU snapshot
///
/// The pending sample buffer is not included.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ApuState {
    pub frame_counter: FrameCounter,
    pub pulse1: PulseChannel,
    pub pulse2: PulseChannel,
    pub triangle: TriangleChannel,
    pub noise: NoiseChannel,
    pub dmc: DmcChannel,
}

/// APU structure representing the Audio Processing Unit state
pub struct Apu {
    pub(crate) frame_counter: FrameCounter,
    pub(crate) pulse1: PulseChannel,
    pub(crate) pulse2: PulseChannel,
    pub(crate) triangle: TriangleChannel,
    pub(crate) noise: NoiseChannel,
    pub(crate) dmc: DmcChannel,

    /// One mixed sample per APU cycle since the last drain
    samples: Vec<f64>,
    sample_count: usize,
}

impl Apu {
    /// Create a new APU instance in the power-on state
    pub fn new() -> Self {
        Apu {
            frame_counter: FrameCounter::new(),
            pulse1: PulseChannel::new(1),
            pulse2: PulseChannel::new(2),
            triangle: TriangleChannel::new(),
            noise: NoiseChannel::new(),
            dmc: DmcChannel::new(),
            samples: vec![0.0; SAMPLE_BUFFER_SIZE],
            sample_count: 0,
        }
    }

    /// Return every channel and the sample buffer to power-on state
    pub fn reset(&mut self) {
        *self = Self::new();
    }

    // ========================================
    // Clocking
    // ========================================

    /// Run one APU cycle (one CPU cycle)
    pub fn step(&mut self) {
        match self.frame_counter.clock() {
            Some(FrameEvent::QuarterFrame) => self.clock_quarter_frame(),
            Some(FrameEvent::HalfFrame) => {
                self.clock_quarter_frame();
                self.clock_half_frame();
            }
            None => {}
        }

        self.triangle.clock_timer();
        self.pulse1.clock_timer();
        self.pulse2.clock_timer();
        self.noise.clock_timer();
        self.dmc.clock_timer();

        self.samples[self.sample_count] = self.mix();
        // A full buffer keeps overwriting its last slot until drained
        if self.sample_count < SAMPLE_BUFFER_SIZE - 1 {
            self.sample_count += 1;
        }
    }

    fn clock_quarter_frame(&mut self) {
        self.triangle.clock_linear_counter();
        self.pulse1.clock_envelope();
        self.pulse2.clock_envelope();
        self.noise.clock_envelope();
    }

    fn clock_half_frame(&mut self) {
        self.pulse1.clock_length_counter();
        self.pulse2.clock_length_counter();
        self.triangle.clock_length_counter();
        self.noise.clock_length_counter();
        self.pulse1.clock_sweep();
        self.pulse2.clock_sweep();
    }

    /// Linear approximation of the NES mixer
    fn mix(&self) -> f64 {
        let tnd = MIX_TRIANGLE * self.triangle.output()
            + MIX_NOISE * self.noise.output() as f64
            + MIX_DMC * self.dmc.output() as f64;
        let pulse = MIX_PULSE * (self.pulse1.output() as f64 + self.pulse2.output() as f64);
        tnd + pulse
    }

    // ========================================
    // Interrupts and DMC Memory Access
    // ========================================

    /// Frame IRQ or DMC IRQ asserted
    pub fn irq_pending(&self) -> bool {
        self.frame_counter.irq_pending() || self.dmc.irq_flag
    }

    /// Address the DMC wants read this cycle, if any
    pub fn dmc_fetch_address(&self) -> Option<u16> {
        self.dmc.fetch_address()
    }

    pub fn dmc_fetch_complete(&mut self, value: u8) {
        self.dmc.fetch_complete(value);
    }

    // ========================================
    // Audio Output
    // ========================================

    /// Samples produced since the last `clear_samples`
    pub fn samples(&self) -> &[f64] {
        &self.samples[..self.sample_count]
    }

    pub fn clear_samples(&mut self) {
        self.sample_count = 0;
    }

    // ========================================
    // Registers
    // ========================================

    fn status(&self) -> u8 {
        let mut status = 0;
        if self.pulse1.is_active() {
            status |= 0x01;
        }
        if self.pulse2.is_active() {
            status |= 0x02;
        }
        if self.triangle.is_active() {
            status |= 0x04;
        }
        if self.noise.is_active() {
            status |= 0x08;
        }
        if self.dmc.is_active() {
            status |= 0x10;
        }
        if self.frame_counter.irq_pending() {
            status |= 0x40;
        }
        if self.dmc.irq_flag {
            status |= 0x80;
        }
        status
    }

    /// Read without side effects; only $4015 is readable
    pub fn peek(&self, addr: u16) -> u8 {
        if addr == 0x4015 {
            self.status()
        } else {
            0
        }
    }

    fn write_status(&mut self, data: u8) {
        self.pulse1.set_enabled(data & 0x01 != 0);
        self.pulse2.set_enabled(data & 0x02 != 0);
        self.triangle.set_enabled(data & 0x04 != 0);
        self.noise.set_enabled(data & 0x08 != 0);
        self.dmc.set_enabled(data & 0x10 != 0);
        self.dmc.irq_flag = false;
    }

    fn write_frame_counter(&mut self, data: u8) {
        if let Some(FrameEvent::HalfFrame) = self.frame_counter.write_control(data) {
            self.clock_quarter_frame();
            self.clock_half_frame();
        }
    }

    // ========================================
    // Save States
    // ========================================

    pub fn save_state(&self) -> ApuState {
        ApuState {
            frame_counter: self.frame_counter.clone(),
            pulse1: self.pulse1.clone(),
            pulse2: self.pulse2.clone(),
            triangle: self.triangle.clone(),
            noise: self.noise.clone(),
            dmc: self.dmc.clone(),
        }
    }

    /// Check a snapshot without applying it
    pub fn validate_state(state: &ApuState) -> Result<(), String> {
        state.frame_counter.validate()?;
        state.pulse1.validate()?;
        state.pulse2.validate()?;
        state.triangle.validate()?;
        state.noise.validate()?;
        state.dmc.validate()
    }

    /// Apply a snapshot; nothing changes if it fails validation
    ///
    /// Samples already buffered for the current frame are dropped.
    pub fn load_state(&mut self, state: &ApuState) -> Result<(), String> {
        Self::validate_state(state)?;
        self.frame_counter = state.frame_counter.clone();
        self.pulse1 = state.pulse1.clone();
        self.pulse2 = state.pulse2.clone();
        self.triangle = state.triangle.clone();
        self.noise = state.noise.clone();
        self.dmc = state.dmc.clone();
        self.sample_count = 0;
        Ok(())
    }
}

impl MemoryMappedDevice for Apu {
    /// Read $4015; clears the frame IRQ flag
    fn read(&mut self, addr: u16) -> u8 {
        if addr == 0x4015 {
            let status = self.status();
            self.frame_counter.clear_irq();
            status
        } else {
            0
        }
    }

    fn write(&mut self, addr: u16, data: u8) {
        match addr {
            0x4000 => self.pulse1.write_register_0(data),
            0x4001 => self.pulse1.write_register_1(data),
            0x4002 => self.pulse1.write_register_2(data),
            0x4003 => self.pulse1.write_register_3(data),
            0x4004 => self.pulse2.write_register_0(data),
            0x4005 => self.pulse2.write_register_1(data),
            0x4006 => self.pulse2.write_register_2(data),
            0x4007 => self.pulse2.write_register_3(data),
            0x4008 => self.triangle.write_register_0(data),
            0x400A => self.triangle.write_register_2(data),
            0x400B => self.triangle.write_register_3(data),
            0x400C => self.noise.write_register_0(data),
            0x400E => self.noise.write_register_2(data),
            0x400F => self.noise.write_register_3(data),
            0x4010 => self.dmc.write_register_0(data),
            0x4011 => self.dmc.write_register_1(data),
            0x4012 => self.dmc.write_register_2(data),
            0x4013 => self.dmc.write_register_3(data),
            0x4015 => self.write_status(data),
            0x4017 => self.write_frame_counter(data),
            // $4009, $400D and the test registers are unused
            _ => {}
        }
    }
}

impl Default for Apu {
    fn default() -> Self {
        Self::new()
    }
}

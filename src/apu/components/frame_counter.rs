//! Frame counter for the APU
//!
//! The frame counter divides the CPU clock into the low-frequency quarter
//! and half frame signals that drive envelopes, the triangle linear counter,
//! length counters and sweeps.
//!
//! It operates in two modes:
//! - 4-step mode: quarter/half/quarter/half+IRQ, period 29830 cycles
//! - 5-step mode: quarter/half/quarter/-/half, period 37282 cycles, no IRQ

use serde::{Deserialize, Serialize};

use crate::apu::constants::{
    FRAME_4_STEP_PERIOD, FRAME_5_STEP_PERIOD, FRAME_STEP_1, FRAME_STEP_2, FRAME_STEP_3,
    FRAME_STEP_4, FRAME_STEP_5,
};

/// Clock signal the frame counter emits on a step
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FrameEvent {
    /// Envelopes and the triangle linear counter
    QuarterFrame,
    /// Quarter frame work plus length counters and sweeps
    HalfFrame,
}

/// Frame counter sequencer mode
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum FrameMode {
    #[default]
    FourStep,
    FiveStep,
}

/// Frame counter for clocking APU components
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct FrameCounter {
    mode: FrameMode,
    /// CPU cycles since the sequence started
    cycle: u16,
    /// IRQ inhibit flag (bit 6 of $4017)
    irq_inhibit: bool,
    /// Frame interrupt flag
    irq_pending: bool,
}

impl FrameCounter {
    /// Create a new frame counter in 4-step mode
    pub fn new() -> Self {
        Self::default()
    }

    pub fn reset(&mut self) {
        *self = Self::new();
    }

    /// Write to the frame counter control register ($4017)
    ///
    /// Bit 7 selects 5-step mode, bit 6 inhibits (and clears) the frame IRQ.
    /// The sequence restarts; 5-step mode clocks a half frame right away.
    pub fn write_control(&mut self, value: u8) -> Option<FrameEvent> {
        self.mode = if value & 0x80 != 0 {
            FrameMode::FiveStep
        } else {
            FrameMode::FourStep
        };
        self.irq_inhibit = value & 0x40 != 0;
        if self.irq_inhibit {
            self.irq_pending = false;
        }
        self.cycle = 0;

        match self.mode {
            FrameMode::FiveStep => Some(FrameEvent::HalfFrame),
            FrameMode::FourStep => None,
        }
    }

    /// Clock the frame counter (every CPU cycle)
    pub fn clock(&mut self) -> Option<FrameEvent> {
        let four_step = self.mode == FrameMode::FourStep;
        if (self.cycle == FRAME_4_STEP_PERIOD && four_step) || self.cycle == FRAME_5_STEP_PERIOD {
            self.cycle = 0;
        }
        self.cycle += 1;

        match self.cycle {
            FRAME_STEP_1 | FRAME_STEP_3 => Some(FrameEvent::QuarterFrame),
            FRAME_STEP_2 => Some(FrameEvent::HalfFrame),
            FRAME_STEP_4 if four_step => {
                if !self.irq_inhibit {
                    self.irq_pending = true;
                }
                Some(FrameEvent::HalfFrame)
            }
            FRAME_STEP_5 => Some(FrameEvent::HalfFrame),
            _ => None,
        }
    }

    pub fn irq_pending(&self) -> bool {
        self.irq_pending
    }

    /// Clear the IRQ flag (when $4015 is read)
    pub fn clear_irq(&mut self) {
        self.irq_pending = false;
    }

    pub fn mode(&self) -> FrameMode {
        self.mode
    }

    pub fn cycle(&self) -> u16 {
        self.cycle
    }

    pub(crate) fn validate(&self) -> Result<(), String> {
        if self.cycle > FRAME_5_STEP_PERIOD {
            return Err(format!("frame counter cycle {} out of range", self.cycle));
        }
        Ok(())
    }
}

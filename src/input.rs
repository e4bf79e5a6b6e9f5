// Input module - Standard controller ports at $4016/$4017
//
// Each controller holds the live button state (set by the host) and an 8-bit
// shift register. While the strobe bit written to $4016 is high, the shift
// registers are reloaded from the live state once per CPU cycle. Each read
// returns the lowest bit and shifts a 1 in from the top, so reads past the
// eighth return 1.

use serde::{Deserialize, Serialize};

use crate::bus::MemoryMappedDevice;

/// Controller buttons, numbered by their position in the report
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Button {
    A = 0,
    B = 1,
    Select = 2,
    Start = 3,
    Up = 4,
    Down = 5,
    Left = 6,
    Right = 7,
}

impl Button {
    /// Bit mask within the controller report
    pub fn mask(self) -> u8 {
        1 << self as u8
    }
}

/// Controller port
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Player {
    One,
    Two,
}

/// A single standard controller
#[derive(Debug, Clone, Default)]
pub struct Controller {
    /// Live buttons, bit N = [`Button`] N
    buttons: u8,
    /// Report being shifted out
    shift: u8,
}

impl Controller {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set_button(&mut self, button: Button, pressed: bool) {
        if pressed {
            self.buttons |= button.mask();
        } else {
            self.buttons &= !button.mask();
        }
    }

    pub fn is_pressed(&self, button: Button) -> bool {
        self.buttons & button.mask() != 0
    }

    pub fn buttons(&self) -> u8 {
        self.buttons
    }

    /// Copy the live buttons into the shift register
    pub fn latch(&mut self) {
        self.shift = self.buttons;
    }

    /// Shift out one bit; the upper bits of the result are open bus ($40)
    pub fn read(&mut self) -> u8 {
        let bit = self.peek();
        self.shift = (self.shift >> 1) | 0x80;
        bit
    }

    pub fn peek(&self) -> u8 {
        (self.shift & 1) | 0x40
    }
}

/// Shift-register part of the ports, captured in save states
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ControllerState {
    pub shift_1: u8,
    pub shift_2: u8,
    pub strobe: bool,
}

/// Both controller ports plus the shared strobe line
#[derive(Debug, Clone, Default)]
pub struct ControllerPorts {
    pub player1: Controller,
    pub player2: Controller,
    strobe: bool,
}

impl ControllerPorts {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn controller_mut(&mut self, player: Player) -> &mut Controller {
        match player {
            Player::One => &mut self.player1,
            Player::Two => &mut self.player2,
        }
    }

    pub fn strobe(&self) -> bool {
        self.strobe
    }

    /// Reload both shift registers if the strobe is high
    pub fn poll_strobe(&mut self) {
        if self.strobe {
            self.player1.latch();
            self.player2.latch();
        }
    }

    /// Side-effect-free read of $4016/$4017
    pub fn peek(&self, addr: u16) -> u8 {
        match addr {
            0x4016 => self.player1.peek(),
            0x4017 => self.player2.peek(),
            _ => 0,
        }
    }

    /// Clear shift registers and strobe; live buttons are kept
    pub fn reset(&mut self) {
        self.player1.shift = 0;
        self.player2.shift = 0;
        self.strobe = false;
    }

    pub fn save_state(&self) -> ControllerState {
        ControllerState {
            shift_1: self.player1.shift,
            shift_2: self.player2.shift,
            strobe: self.strobe,
        }
    }

    pub fn load_state(&mut self, state: &ControllerState) {
        self.player1.shift = state.shift_1;
        self.player2.shift = state.shift_2;
        self.strobe = state.strobe;
    }
}

impl MemoryMappedDevice for ControllerPorts {
    fn read(&mut self, addr: u16) -> u8 {
        match addr {
            0x4016 => self.player1.read(),
            0x4017 => self.player2.read(),
            _ => 0,
        }
    }

    fn write(&mut self, addr: u16, data: u8) {
        if addr == 0x4016 {
            self.strobe = data & 0x01 != 0;
        }
    }
}

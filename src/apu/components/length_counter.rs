//! Length counter for controlling note duration

use serde::{Deserialize, Serialize};

use crate::apu::constants::LENGTH_COUNTER_TABLE;

/// Length counter for controlling note duration
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct LengthCounter {
    pub(crate) counter: u8,
    /// Halt flag; also the envelope loop or triangle control bit
    pub(crate) halt: bool,
}

impl LengthCounter {
    pub fn new() -> Self {
        Self::default()
    }

    /// Clock the length counter (half frame)
    pub fn clock(&mut self) {
        if !self.halt && self.counter > 0 {
            self.counter -= 1;
        }
    }

    /// Load from the table; channels only call this while enabled
    pub fn load(&mut self, index: u8) {
        self.counter = LENGTH_COUNTER_TABLE[(index & 0x1F) as usize];
    }

    pub fn clear(&mut self) {
        self.counter = 0;
    }

    pub fn is_active(&self) -> bool {
        self.counter > 0
    }

    pub fn set_halt(&mut self, halt: bool) {
        self.halt = halt;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_load_from_table() {
        let mut lc = LengthCounter::new();
        lc.load(0x01);
        assert_eq!(lc.counter, 254);
        lc.load(0x1F);
        assert_eq!(lc.counter, 30);
    }

    #[test]
    fn test_halt_freezes_counter() {
        let mut lc = LengthCounter::new();
        lc.load(0);
        lc.set_halt(true);
        lc.clock();
        assert_eq!(lc.counter, 10);
        lc.set_halt(false);
        lc.clock();
        assert_eq!(lc.counter, 9);
    }
}

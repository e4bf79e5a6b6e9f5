// Instructions module for 6502 CPU
// This module organizes CPU instructions by semantic grouping

pub mod arithmetic;
pub mod branch;
pub mod compare;
pub mod jump_subroutine;
pub mod load_store;
pub mod logic;
pub mod miscellaneous;
pub mod shift_rotate;
pub mod stack;
pub mod transfer;
pub mod unofficial;

use crate::bus::Bus;
use crate::cpu::addressing::AddressingResult;

impl crate::cpu::Cpu {
    // ========================================
    // Helper Functions
    // ========================================

    /// Read the operand of the current instruction
    ///
    /// Immediate operands resolve to the address of the operand byte, so
    /// every mode reads through the bus the same way.
    #[inline]
    pub(crate) fn read_operand(&self, bus: &mut Bus, addr_result: &AddressingResult) -> u8 {
        bus.read(addr_result.address)
    }
}

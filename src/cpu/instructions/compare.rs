// Compare instructions for 6502 CPU

use crate::bus::Bus;
use crate::cpu::addressing::AddressingResult;
use crate::cpu::Cpu;

impl Cpu {
    // ========================================
    // Compare Instructions
    // ========================================

    /// Set C, Z and N as `register - value` would
    ///
    /// C is set when no borrow occurs (register >= value).
    pub(crate) fn compare(&mut self, register: u8, value: u8) {
        let result = register as u16 + (value ^ 0xFF) as u16 + 1;
        self.set_carry(result > 0xFF);
        self.update_zero_and_negative_flags(result as u8);
    }

    /// CMP - Compare Accumulator
    ///
    /// Flags affected: C, Z, N
    pub fn cmp(&mut self, bus: &mut Bus, addr_result: &AddressingResult) {
        let value = self.read_operand(bus, addr_result);
        self.compare(self.a, value);
    }

    /// CPX - Compare X Register
    ///
    /// Flags affected: C, Z, N
    pub fn cpx(&mut self, bus: &mut Bus, addr_result: &AddressingResult) {
        let value = self.read_operand(bus, addr_result);
        self.compare(self.x, value);
    }

    /// CPY - Compare Y Register
    ///
    /// Flags affected: C, Z, N
    pub fn cpy(&mut self, bus: &mut Bus, addr_result: &AddressingResult) {
        let value = self.read_operand(bus, addr_result);
        self.compare(self.y, value);
    }
}

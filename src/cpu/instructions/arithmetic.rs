// Arithmetic instructions for 6502 CPU

use crate::bus::Bus;
use crate::cpu::addressing::AddressingResult;
use crate::cpu::Cpu;

impl Cpu {
    // ========================================
    // Arithmetic Instructions
    // ========================================

    /// Add `value` and the carry to A, updating C, V, Z and N
    ///
    /// Shared by ADC, SBC (with the operand inverted) and the undocumented
    /// RRA/ISC combinations. Decimal mode is ignored on the NES.
    pub(crate) fn add_with_carry(&mut self, value: u8, carry_in: bool) {
        let sum = self.a as u16 + value as u16 + carry_in as u16;
        let result = sum as u8;

        // Overflow when both inputs share a sign that the result does not
        let overflow = (self.a & 0x80) == (value & 0x80) && (value & 0x80) != (result & 0x80);

        self.set_carry(sum > 0xFF);
        self.set_overflow(overflow);
        self.a = result;
        self.update_zero_and_negative_flags(result);
    }

    /// ADC - Add with Carry
    ///
    /// Formula: A = A + M + C
    ///
    /// Flags affected: C, Z, V, N
    pub fn adc(&mut self, bus: &mut Bus, addr_result: &AddressingResult) {
        let value = self.read_operand(bus, addr_result);
        self.add_with_carry(value, self.get_carry());
    }

    /// SBC - Subtract with Carry
    ///
    /// Formula: A = A - M - (1 - C), computed as A + !M + C
    ///
    /// Flags affected: C, Z, V, N
    pub fn sbc(&mut self, bus: &mut Bus, addr_result: &AddressingResult) {
        let value = self.read_operand(bus, addr_result);
        self.add_with_carry(value ^ 0xFF, self.get_carry());
    }

    /// INC - Increment Memory
    ///
    /// Flags affected: Z, N
    pub fn inc(&mut self, bus: &mut Bus, addr_result: &AddressingResult) {
        let result = self.read_operand(bus, addr_result).wrapping_add(1);
        self.update_zero_and_negative_flags(result);
        bus.write(addr_result.address, result);
    }

    /// DEC - Decrement Memory
    ///
    /// Flags affected: Z, N
    pub fn dec(&mut self, bus: &mut Bus, addr_result: &AddressingResult) {
        let result = self.read_operand(bus, addr_result).wrapping_sub(1);
        self.update_zero_and_negative_flags(result);
        bus.write(addr_result.address, result);
    }

    /// INX - Increment X Register
    pub fn inx(&mut self) {
        self.x = self.x.wrapping_add(1);
        self.update_zero_and_negative_flags(self.x);
    }

    /// INY - Increment Y Register
    pub fn iny(&mut self) {
        self.y = self.y.wrapping_add(1);
        self.update_zero_and_negative_flags(self.y);
    }

    /// DEX - Decrement X Register
    pub fn dex(&mut self) {
        self.x = self.x.wrapping_sub(1);
        self.update_zero_and_negative_flags(self.x);
    }

    /// DEY - Decrement Y Register
    pub fn dey(&mut self) {
        self.y = self.y.wrapping_sub(1);
        self.update_zero_and_negative_flags(self.y);
    }
}

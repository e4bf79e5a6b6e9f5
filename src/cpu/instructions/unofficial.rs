// Undocumented instructions for 6502 CPU
//
// Most of these are a documented read-modify-write followed by a documented
// ALU operation on the same operand. The SH*/TAS group AND the stored value
// with the high byte of the base address plus one.

use crate::bus::Bus;
use crate::cpu::addressing::AddressingResult;
use crate::cpu::Cpu;

/// High byte of the un-indexed base address, plus one
#[inline]
fn base_high_plus_one(addr_result: &AddressingResult, index: u8) -> u8 {
    let base = addr_result.address.wrapping_sub(index as u16);
    ((base >> 8) as u8).wrapping_add(1)
}

impl Cpu {
    // ========================================
    // Read-Modify-Write Combinations
    // ========================================

    /// SLO - ASL memory, then ORA
    pub fn slo(&mut self, bus: &mut Bus, addr_result: &AddressingResult) {
        let value = self.read_operand(bus, addr_result);
        let result = self.shift_left(value);
        bus.write(addr_result.address, result);
        self.a |= result;
        self.update_zero_and_negative_flags(self.a);
    }

    /// RLA - ROL memory, then AND
    pub fn rla(&mut self, bus: &mut Bus, addr_result: &AddressingResult) {
        let value = self.read_operand(bus, addr_result);
        let result = self.rotate_left(value);
        bus.write(addr_result.address, result);
        self.a &= result;
        self.update_zero_and_negative_flags(self.a);
    }

    /// SRE - LSR memory, then EOR
    pub fn sre(&mut self, bus: &mut Bus, addr_result: &AddressingResult) {
        let value = self.read_operand(bus, addr_result);
        let result = self.shift_right(value);
        bus.write(addr_result.address, result);
        self.a ^= result;
        self.update_zero_and_negative_flags(self.a);
    }

    /// RRA - ROR memory, then ADC using the bit rotated out as carry
    pub fn rra(&mut self, bus: &mut Bus, addr_result: &AddressingResult) {
        let value = self.read_operand(bus, addr_result);
        let result = self.rotate_right(value);
        bus.write(addr_result.address, result);
        self.add_with_carry(result, self.get_carry());
    }

    /// DCP - DEC memory, then CMP
    pub fn dcp(&mut self, bus: &mut Bus, addr_result: &AddressingResult) {
        let result = self.read_operand(bus, addr_result).wrapping_sub(1);
        bus.write(addr_result.address, result);
        self.compare(self.a, result);
    }

    /// ISC (ISB) - INC memory, then SBC
    pub fn isc(&mut self, bus: &mut Bus, addr_result: &AddressingResult) {
        let result = self.read_operand(bus, addr_result).wrapping_add(1);
        bus.write(addr_result.address, result);
        self.add_with_carry(result ^ 0xFF, self.get_carry());
    }

    // ========================================
    // Load/Store Combinations
    // ========================================

    /// SAX - Store A & X
    pub fn sax(&mut self, bus: &mut Bus, addr_result: &AddressingResult) {
        bus.write(addr_result.address, self.a & self.x);
    }

    /// LAX - Load A and X
    pub fn lax(&mut self, bus: &mut Bus, addr_result: &AddressingResult) {
        self.a = self.read_operand(bus, addr_result);
        self.x = self.a;
        self.update_zero_and_negative_flags(self.x);
    }

    // ========================================
    // Immediate ALU Combinations
    // ========================================

    /// ANC - AND, then copy N into C
    pub fn anc(&mut self, bus: &mut Bus, addr_result: &AddressingResult) {
        self.and(bus, addr_result);
        self.set_carry(self.get_negative());
    }

    /// ALR - AND, then LSR A
    pub fn alr(&mut self, bus: &mut Bus, addr_result: &AddressingResult) {
        self.a &= self.read_operand(bus, addr_result);
        self.a = self.shift_right(self.a);
        self.update_zero_and_negative_flags(self.a);
    }

    /// ARR - AND, then ROR A
    ///
    /// C comes from bit 6 of the result and V from bit 6 xor bit 5.
    pub fn arr(&mut self, bus: &mut Bus, addr_result: &AddressingResult) {
        let value = self.a & self.read_operand(bus, addr_result);
        let result = (value >> 1) | ((self.get_carry() as u8) << 7);
        self.update_zero_and_negative_flags(result);
        self.set_carry(result & 0x40 != 0);
        self.set_overflow(((result >> 6) ^ (result >> 5)) & 0x01 != 0);
        self.a = result;
    }

    /// AXS - X = (A & X) - M, without borrow
    ///
    /// Flags affected: C, Z, N
    pub fn axs(&mut self, bus: &mut Bus, addr_result: &AddressingResult) {
        let value = self.read_operand(bus, addr_result);
        let result = (self.a & self.x) as u16 + (value ^ 0xFF) as u16 + 1;
        self.set_carry(result > 0xFF);
        self.x = result as u8;
        self.update_zero_and_negative_flags(self.x);
    }

    // ========================================
    // High-Byte AND Stores
    // ========================================

    /// SHY - Store Y & (H + 1) (abs,X)
    pub fn shy(&mut self, bus: &mut Bus, addr_result: &AddressingResult) {
        let value = self.y & base_high_plus_one(addr_result, self.x);
        bus.write(addr_result.address, value);
    }

    /// SHX - Store X & (H + 1) (abs,Y)
    pub fn shx(&mut self, bus: &mut Bus, addr_result: &AddressingResult) {
        let value = self.x & base_high_plus_one(addr_result, self.y);
        bus.write(addr_result.address, value);
    }

    /// AHX - Store A & X & (H + 1) (abs,Y and (zp),Y)
    pub fn ahx(&mut self, bus: &mut Bus, addr_result: &AddressingResult) {
        let value = self.a & self.x & base_high_plus_one(addr_result, self.y);
        bus.write(addr_result.address, value);
    }

    /// TAS - SP = A & X, then store SP & (H + 1) (abs,Y)
    pub fn tas(&mut self, bus: &mut Bus, addr_result: &AddressingResult) {
        self.sp = self.a & self.x;
        let value = self.sp & base_high_plus_one(addr_result, self.y);
        bus.write(addr_result.address, value);
    }

    /// LAS - A = X = SP = M & SP
    pub fn las(&mut self, bus: &mut Bus, addr_result: &AddressingResult) {
        let value = self.read_operand(bus, addr_result) & self.sp;
        self.a = value;
        self.x = value;
        self.sp = value;
        self.update_zero_and_negative_flags(value);
    }
}

// Shift and rotate instructions for 6502 CPU
//
// Each instruction works either on the accumulator or on memory
// (read-modify-write). The value helpers are shared with the undocumented
// SLO/RLA/SRE/RRA combinations.

use crate::bus::Bus;
use crate::cpu::addressing::AddressingResult;
use crate::cpu::Cpu;

impl Cpu {
    // ========================================
    // Value Helpers
    // ========================================

    /// Shift left, bit 7 into C
    pub(crate) fn shift_left(&mut self, value: u8) -> u8 {
        self.set_carry(value & 0x80 != 0);
        value << 1
    }

    /// Shift right, bit 0 into C
    pub(crate) fn shift_right(&mut self, value: u8) -> u8 {
        self.set_carry(value & 0x01 != 0);
        value >> 1
    }

    /// Rotate left through C
    pub(crate) fn rotate_left(&mut self, value: u8) -> u8 {
        let result = (value << 1) | self.get_carry() as u8;
        self.set_carry(value & 0x80 != 0);
        result
    }

    /// Rotate right through C
    pub(crate) fn rotate_right(&mut self, value: u8) -> u8 {
        let result = (value >> 1) | ((self.get_carry() as u8) << 7);
        self.set_carry(value & 0x01 != 0);
        result
    }

    /// Apply `op` to A or to memory and set Z/N from the result
    fn modify(
        &mut self,
        bus: &mut Bus,
        addr_result: &AddressingResult,
        accumulator: bool,
        op: fn(&mut Self, u8) -> u8,
    ) {
        if accumulator {
            self.a = op(self, self.a);
            self.update_zero_and_negative_flags(self.a);
        } else {
            let value = self.read_operand(bus, addr_result);
            let result = op(self, value);
            self.update_zero_and_negative_flags(result);
            bus.write(addr_result.address, result);
        }
    }

    // ========================================
    // Shift/Rotate Instructions
    // ========================================

    /// ASL - Arithmetic Shift Left
    ///
    /// Flags affected: C, Z, N
    pub fn asl(&mut self, bus: &mut Bus, addr_result: &AddressingResult, accumulator: bool) {
        self.modify(bus, addr_result, accumulator, Self::shift_left);
    }

    /// LSR - Logical Shift Right
    ///
    /// Flags affected: C, Z, N (N always cleared)
    pub fn lsr(&mut self, bus: &mut Bus, addr_result: &AddressingResult, accumulator: bool) {
        self.modify(bus, addr_result, accumulator, Self::shift_right);
    }

    /// ROL - Rotate Left
    ///
    /// Flags affected: C, Z, N
    pub fn rol(&mut self, bus: &mut Bus, addr_result: &AddressingResult, accumulator: bool) {
        self.modify(bus, addr_result, accumulator, Self::rotate_left);
    }

    /// ROR - Rotate Right
    ///
    /// Flags affected: C, Z, N
    pub fn ror(&mut self, bus: &mut Bus, addr_result: &AddressingResult, accumulator: bool) {
        self.modify(bus, addr_result, accumulator, Self::rotate_right);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const ADDR: u16 = 0x0040;

    #[test]
    fn test_asl_accumulator() {
        let mut cpu = Cpu::new();
        let mut bus = Bus::new();
        cpu.a = 0x81;
        cpu.asl(&mut bus, &AddressingResult::new(0), true);
        assert_eq!(cpu.a, 0x02);
        assert!(cpu.get_carry());
        assert!(!cpu.get_negative());
    }

    #[test]
    fn test_asl_memory_leaves_accumulator() {
        let mut cpu = Cpu::new();
        let mut bus = Bus::new();
        cpu.a = 0x55;
        bus.write(ADDR, 0x40);
        cpu.asl(&mut bus, &AddressingResult::new(ADDR), false);
        assert_eq!(bus.peek(ADDR), 0x80);
        assert_eq!(cpu.a, 0x55);
        assert!(cpu.get_negative());
        assert!(!cpu.get_carry());
    }

    #[test]
    fn test_lsr_to_zero() {
        let mut cpu = Cpu::new();
        let mut bus = Bus::new();
        bus.write(ADDR, 0x01);
        cpu.lsr(&mut bus, &AddressingResult::new(ADDR), false);
        assert_eq!(bus.peek(ADDR), 0x00);
        assert!(cpu.get_carry());
        assert!(cpu.get_zero());
    }

    #[test]
    fn test_rol_through_carry() {
        let mut cpu = Cpu::new();
        let mut bus = Bus::new();
        cpu.a = 0x80;
        cpu.set_carry(true);
        cpu.rol(&mut bus, &AddressingResult::new(0), true);
        assert_eq!(cpu.a, 0x01);
        assert!(cpu.get_carry());
    }

    #[test]
    fn test_ror_through_carry() {
        let mut cpu = Cpu::new();
        let mut bus = Bus::new();
        bus.write(ADDR, 0x02);
        cpu.set_carry(true);
        cpu.ror(&mut bus, &AddressingResult::new(ADDR), false);
        assert_eq!(bus.peek(ADDR), 0x81);
        assert!(!cpu.get_carry());
        assert!(cpu.get_negative());
    }
}

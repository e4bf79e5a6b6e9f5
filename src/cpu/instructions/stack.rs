// Stack instructions for 6502 CPU
//
// The stack lives in page 1 ($0100-$01FF) and grows downward.

use crate::bus::Bus;
use crate::cpu::Cpu;

impl Cpu {
    // ========================================
    // Stack Instructions
    // ========================================

    /// PHA - Push Accumulator
    pub fn pha(&mut self, bus: &mut Bus) {
        self.stack_push(bus, self.a);
    }

    /// PLA - Pull Accumulator
    ///
    /// Flags affected: Z, N
    pub fn pla(&mut self, bus: &mut Bus) {
        self.a = self.stack_pop(bus);
        self.update_zero_and_negative_flags(self.a);
    }

    /// PHP - Push Processor Status
    ///
    /// The pushed copy has B and bit 5 set.
    pub fn php(&mut self, bus: &mut Bus) {
        let status = self.status_for_push(true);
        self.stack_push(bus, status);
    }

    /// PLP - Pull Processor Status
    ///
    /// Bits 4 and 5 of the pulled byte are ignored.
    pub fn plp(&mut self, bus: &mut Bus) {
        let value = self.stack_pop(bus);
        self.restore_status(value);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cpu::flags;

    #[test]
    fn test_pha_pla() {
        let mut cpu = Cpu::new();
        let mut bus = Bus::new();
        cpu.a = 0x80;
        cpu.pha(&mut bus);
        assert_eq!(cpu.sp, 0xFC);
        assert_eq!(bus.peek(0x01FD), 0x80);

        cpu.a = 0x00;
        cpu.pla(&mut bus);
        assert_eq!(cpu.a, 0x80);
        assert!(cpu.get_negative());
        assert_eq!(cpu.sp, 0xFD);
    }

    #[test]
    fn test_php_sets_break_bits() {
        let mut cpu = Cpu::new();
        let mut bus = Bus::new();
        cpu.status = flags::UNUSED | flags::CARRY;
        cpu.php(&mut bus);
        assert_eq!(bus.peek(0x01FD), 0x31);
        assert!(!cpu.get_flag(flags::BREAK), "live register keeps B clear");
    }

    #[test]
    fn test_plp_ignores_break_bits() {
        let mut cpu = Cpu::new();
        let mut bus = Bus::new();
        cpu.sp = 0xFC;
        bus.write(0x01FD, 0xD3);
        cpu.plp(&mut bus);
        assert_eq!(cpu.status, 0xE3);
        assert_eq!(cpu.sp, 0xFD);
    }
}

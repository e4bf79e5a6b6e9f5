// Interrupt and miscellaneous instructions for 6502 CPU

use crate::bus::Bus;
use crate::cpu::{Cpu, IRQ_VECTOR};

impl Cpu {
    // ========================================
    // Interrupt Instructions
    // ========================================

    /// BRK - Force Interrupt
    ///
    /// Pushes PC + 1 (skipping the padding byte) and the status with B set,
    /// sets I and jumps through the IRQ vector at $FFFE.
    pub fn brk(&mut self, bus: &mut Bus) {
        let return_addr = self.pc.wrapping_add(1);
        self.stack_push_u16(bus, return_addr);
        let status = self.status_for_push(true);
        self.stack_push(bus, status);
        self.set_interrupt_disable(true);
        self.pc = bus.read_u16(IRQ_VECTOR);
    }

    /// RTI - Return from Interrupt
    ///
    /// Pulls the status (ignoring bits 4 and 5) and then PC. Unlike RTS the
    /// pulled address is used as is.
    pub fn rti(&mut self, bus: &mut Bus) {
        let status = self.stack_pop(bus);
        self.restore_status(status);
        self.pc = self.stack_pop_u16(bus);
    }

    /// Hardware interrupt sequence shared by NMI and IRQ
    ///
    /// Pushes the current PC and the status with B clear, sets I and loads
    /// PC from `vector`.
    pub(crate) fn interrupt(&mut self, bus: &mut Bus, vector: u16) {
        self.stack_push_u16(bus, self.pc);
        let status = self.status_for_push(false);
        self.stack_push(bus, status);
        self.set_interrupt_disable(true);
        self.pc = bus.read_u16(vector);
    }

    /// KIL - Halt
    ///
    /// Rewinds PC onto the opcode so the CPU keeps re-executing it.
    pub fn kil(&mut self) {
        self.pc = self.pc.wrapping_sub(1);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cartridge::mappers::create_mapper;
    use crate::cartridge::{test_rom, Cartridge};
    use crate::cpu::{flags, NMI_VECTOR};

    /// Bus with an NROM cart whose NMI vector is $9000 and IRQ vector $A000
    fn bus_with_vectors() -> Bus {
        let mut prg = vec![0xEAu8; 0x4000];
        prg[0x3FFA] = 0x00;
        prg[0x3FFB] = 0x90;
        prg[0x3FFC] = 0x00;
        prg[0x3FFD] = 0x80;
        prg[0x3FFE] = 0x00;
        prg[0x3FFF] = 0xA0;
        let rom = test_rom::build(0, 1, 1, 0, &prg);
        Bus::with_mapper(create_mapper(Cartridge::from_bytes(&rom).unwrap()).unwrap())
    }

    #[test]
    fn test_brk_pushes_and_vectors() {
        let mut cpu = Cpu::new();
        let mut bus = bus_with_vectors();
        // PC just past the BRK opcode at $8010
        cpu.pc = 0x8011;
        cpu.status = flags::UNUSED;
        cpu.brk(&mut bus);

        assert_eq!(cpu.pc, 0xA000);
        assert_eq!(bus.peek(0x01FD), 0x80);
        assert_eq!(bus.peek(0x01FC), 0x12, "return skips the padding byte");
        assert_eq!(bus.peek(0x01FB), 0x30, "B and bit 5 set");
        assert!(cpu.get_interrupt_disable());
    }

    #[test]
    fn test_nmi_sequence() {
        let mut cpu = Cpu::new();
        let mut bus = bus_with_vectors();
        cpu.pc = 0x8123;
        cpu.status = flags::UNUSED | flags::CARRY;
        cpu.interrupt(&mut bus, NMI_VECTOR);

        assert_eq!(cpu.pc, 0x9000);
        assert_eq!(bus.peek(0x01FC), 0x23);
        assert_eq!(bus.peek(0x01FB), 0x21, "B clear for hardware interrupts");
    }

    #[test]
    fn test_rti_restores_state() {
        let mut cpu = Cpu::new();
        let mut bus = bus_with_vectors();
        cpu.pc = 0x8123;
        cpu.status = flags::UNUSED | flags::CARRY | flags::NEGATIVE;
        cpu.interrupt(&mut bus, IRQ_VECTOR);
        cpu.set_carry(false);

        cpu.rti(&mut bus);
        assert_eq!(cpu.pc, 0x8123);
        assert_eq!(cpu.status, flags::UNUSED | flags::CARRY | flags::NEGATIVE);
        assert_eq!(cpu.sp, 0xFD);
    }

    #[test]
    fn test_kil_spins() {
        let mut cpu = Cpu::new();
        cpu.pc = 0x8001;
        cpu.kil();
        assert_eq!(cpu.pc, 0x8000);
    }
}

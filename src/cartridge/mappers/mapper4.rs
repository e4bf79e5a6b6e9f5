// Mapper 4 (MMC3) - Fine-grained banking with a scanline IRQ counter
//
// Memory Layout:
// - CPU $6000-$7FFF: 8KB PRG-RAM (optional, battery-backed in some games)
// - CPU $8000-$9FFF: 8KB PRG-ROM bank (R6, or second-last bank in mode 1)
// - CPU $A000-$BFFF: 8KB PRG-ROM bank (R7)
// - CPU $C000-$DFFF: 8KB PRG-ROM bank (second-last bank, or R6 in mode 1)
// - CPU $E000-$FFFF: 8KB PRG-ROM bank (fixed to last bank)
// - PPU $0000-$0FFF: two 2KB CHR banks (R0, R1)
// - PPU $1000-$1FFF: four 1KB CHR banks (R2-R5)
//   (halves swapped when CHR inversion is set)
//
// Register Interface (address & $E001):
// - $8000: Bank select (bits 0-2 register, bit 6 PRG mode, bit 7 CHR inversion)
// - $8001: Bank data
// - $A000: Mirroring (0 = vertical, 1 = horizontal)
// - $A001: PRG-RAM protect (ignored)
// - $C000: IRQ latch
// - $C001: IRQ reload
// - $E000: IRQ disable and acknowledge
// - $E001: IRQ enable
//
// The IRQ counter is clocked on each rising edge of PPU address line A12
// seen on pattern-table fetches.

use serde::{Deserialize, Serialize};

use super::{
    check_len, read_nametable, write_nametable, wrong_kind, MapperError, MapperState,
    CHR_RAM_SIZE, PRG_RAM_SIZE,
};
use crate::cartridge::{Cartridge, ChrMemory, Mapper, Mirroring};

/// PRG-ROM bank size (8KB)
const PRG_8KB: usize = 0x2000;

/// Mutable MMC3 state
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Mmc3State {
    /// R0-R7
    pub bank_registers: [u8; 8],
    pub register_select: u8,
    pub prg_mode: u8,
    pub chr_mode: u8,
    /// 0 = vertical, 1 = horizontal
    pub mirroring: u8,
    pub irq_latch: u8,
    pub irq_counter: u8,
    pub irq_reload: bool,
    pub irq_enabled: bool,
    pub irq_pending: bool,
    /// Last pattern-table address seen, for A12 edge detection
    pub last_chr_address: u16,
    pub prg_ram: Vec<u8>,
    pub chr_ram: Vec<u8>,
    pub vram: Vec<u8>,
}

/// Mapper 4 implementation (MMC3)
///
/// Used by Super Mario Bros. 3, Mega Man 3 and Kirby's Adventure.
pub struct Mapper4 {
    prg_rom: Vec<u8>,
    chr: ChrMemory,
    /// Number of 8KB PRG-ROM banks
    prg_banks: usize,
    /// Header asked for four-screen VRAM
    four_screen: bool,
    state: Mmc3State,
}

impl Mapper4 {
    pub fn new(cartridge: Cartridge) -> Self {
        let header_mirroring = cartridge.header.mirroring;
        let prg_banks = (cartridge.prg_rom.len() / PRG_8KB).max(2);
        let chr = ChrMemory::new(cartridge.chr_rom);
        let chr_ram = if chr.is_ram() {
            vec![0; CHR_RAM_SIZE]
        } else {
            Vec::new()
        };

        let mut mapper = Mapper4 {
            prg_rom: cartridge.prg_rom,
            chr,
            prg_banks,
            four_screen: header_mirroring == Mirroring::FourScreen,
            state: Mmc3State {
                bank_registers: [0; 8],
                register_select: 0,
                prg_mode: 1,
                chr_mode: 1,
                mirroring: 0,
                irq_latch: 0,
                irq_counter: 0,
                irq_reload: false,
                irq_enabled: false,
                irq_pending: false,
                last_chr_address: 0,
                prg_ram: vec![0; PRG_RAM_SIZE],
                chr_ram,
                vram: vec![0; header_mirroring.vram_size()],
            },
        };
        mapper.reset(true);
        mapper
    }

    /// Map CPU address to PRG-ROM offset
    fn map_prg_address(&self, addr: u16) -> usize {
        let mask = self.prg_banks - 1;
        let r6 = self.state.bank_registers[6] as usize & mask;
        let r7 = self.state.bank_registers[7] as usize & mask;
        let second_last = self.prg_banks - 2;
        let last = self.prg_banks - 1;

        let bank = match (addr, self.state.prg_mode) {
            (0x8000..=0x9FFF, 0) => r6,
            (0x8000..=0x9FFF, _) => second_last,
            (0xA000..=0xBFFF, _) => r7,
            (0xC000..=0xDFFF, 0) => second_last,
            (0xC000..=0xDFFF, _) => r6,
            _ => last,
        };

        bank * PRG_8KB + (addr as usize & 0x1FFF)
    }

    /// Map PPU address to CHR offset in 1KB units
    fn map_chr_address(&self, addr: u16) -> usize {
        let mask = self.chr.kilobytes().max(8) - 1;
        let regs = &self.state.bank_registers;
        let addr = if self.state.chr_mode == 1 {
            addr ^ 0x1000
        } else {
            addr
        } as usize;

        match addr {
            0x0000..=0x07FF => ((regs[0] as usize & mask) >> 1) * 0x800 + (addr & 0x7FF),
            0x0800..=0x0FFF => ((regs[1] as usize & mask) >> 1) * 0x800 + (addr & 0x7FF),
            _ => {
                let reg = 2 + ((addr - 0x1000) >> 10);
                (regs[reg] as usize & mask) * 0x400 + (addr & 0x3FF)
            }
        }
    }

    /// Clock the scanline counter
    pub fn clock_irq_counter(&mut self) {
        let s = &mut self.state;
        if s.irq_counter == 0 || s.irq_reload {
            s.irq_counter = s.irq_latch;
            s.irq_reload = false;
        } else {
            s.irq_counter -= 1;
        }

        if s.irq_counter == 0 && s.irq_enabled {
            s.irq_pending = true;
        }
    }

    fn nametable_mirroring(&self) -> Mirroring {
        if self.four_screen {
            Mirroring::FourScreen
        } else if self.state.mirroring == 0 {
            Mirroring::Vertical
        } else {
            Mirroring::Horizontal
        }
    }
}

impl Mapper for Mapper4 {
    fn name(&self) -> &'static str {
        "MMC3"
    }

    fn reset(&mut self, hard: bool) {
        let s = &mut self.state;
        if hard {
            s.prg_ram.fill(0);
            s.chr_ram.fill(0);
            s.vram.fill(0);
        }
        s.bank_registers = [0; 8];
        s.register_select = 0;
        s.prg_mode = 1;
        s.chr_mode = 1;
        s.mirroring = 0;
        s.irq_latch = 0;
        s.irq_counter = 0;
        s.irq_reload = false;
        s.irq_enabled = false;
        s.irq_pending = false;
        s.last_chr_address = 0;
    }

    fn cpu_read(&self, addr: u16) -> u8 {
        match addr {
            0x6000..=0x7FFF => self.state.prg_ram[(addr & 0x1FFF) as usize],
            0x8000..=0xFFFF => self.prg_rom[self.map_prg_address(addr) % self.prg_rom.len()],
            _ => 0,
        }
    }

    fn cpu_write(&mut self, addr: u16, value: u8) {
        if addr < 0x6000 {
            return;
        }
        if addr < 0x8000 {
            self.state.prg_ram[(addr & 0x1FFF) as usize] = value;
            return;
        }

        let s = &mut self.state;
        match addr & 0x6001 {
            0x0000 => {
                s.register_select = value & 0x07;
                s.prg_mode = (value & 0x40) >> 6;
                s.chr_mode = (value & 0x80) >> 7;
            }
            0x0001 => s.bank_registers[s.register_select as usize] = value,
            0x2000 => s.mirroring = value & 0x01,
            0x2001 => {}
            0x4000 => s.irq_latch = value,
            0x4001 => s.irq_reload = true,
            0x6000 => {
                s.irq_enabled = false;
                s.irq_pending = false;
            }
            _ => s.irq_enabled = true,
        }
    }

    fn ppu_read(&self, addr: u16) -> u8 {
        let addr = addr & 0x3FFF;
        if addr < 0x2000 {
            self.chr.read(&self.state.chr_ram, self.map_chr_address(addr))
        } else {
            read_nametable(&self.state.vram, self.nametable_mirroring(), addr)
        }
    }

    fn ppu_write(&mut self, addr: u16, value: u8) {
        let addr = addr & 0x3FFF;
        if addr < 0x2000 {
            if self.chr.is_ram() {
                let index = self.map_chr_address(addr) % CHR_RAM_SIZE;
                self.state.chr_ram[index] = value;
            }
        } else {
            let mirroring = self.nametable_mirroring();
            write_nametable(&mut self.state.vram, mirroring, addr, value);
        }
    }

    fn ppu_address(&mut self, addr: u16) {
        let addr = addr & 0x3FFF;
        if addr >= 0x2000 {
            return;
        }
        if self.state.last_chr_address & 0x1000 == 0 && addr & 0x1000 != 0 {
            self.clock_irq_counter();
        }
        self.state.last_chr_address = addr;
    }

    fn mirroring(&self) -> Mirroring {
        self.nametable_mirroring()
    }

    fn irq_pending(&self) -> bool {
        self.state.irq_pending
    }

    fn prg_ram(&self) -> Option<&[u8]> {
        Some(&self.state.prg_ram)
    }

    fn prg_ram_mut(&mut self) -> Option<&mut [u8]> {
        Some(&mut self.state.prg_ram)
    }

    fn save_state(&self) -> MapperState {
        MapperState::Mmc3(self.state.clone())
    }

    fn load_state(&mut self, state: &MapperState) -> Result<(), MapperError> {
        let MapperState::Mmc3(s) = state else {
            return Err(wrong_kind("MMC3", state));
        };
        check_len("PRG-RAM", self.state.prg_ram.len(), s.prg_ram.len())?;
        check_len("CHR-RAM", self.state.chr_ram.len(), s.chr_ram.len())?;
        check_len("VRAM", self.state.vram.len(), s.vram.len())?;
        if s.register_select > 7 {
            return Err(MapperError::StateMismatch(format!(
                "MMC3 register select {} out of range",
                s.register_select
            )));
        }
        self.state = s.clone();
        Ok(())
    }
}

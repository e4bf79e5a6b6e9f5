// Mapper 2 (UxROM) - Switchable 16KB PRG bank with fixed last bank
//
// Memory Layout:
// - CPU $8000-$BFFF: 16KB PRG-ROM bank (switchable)
// - CPU $C000-$FFFF: 16KB PRG-ROM bank (fixed to last bank)
// - PPU $0000-$1FFF: 8KB CHR-RAM (CHR-ROM on a few boards)
//
// Register Interface:
// - $8000-$FFFF: Bank select, the whole byte is latched and masked by the bank count
//
// No PRG-RAM; $6000-$7FFF reads as 0.

use serde::{Deserialize, Serialize};

use super::{
    check_len, read_nametable, write_nametable, wrong_kind, MapperError, MapperState,
    CHR_RAM_SIZE,
};
use crate::cartridge::{Cartridge, ChrMemory, Mapper, Mirroring, PRG_BANK_SIZE};

/// Mutable UxROM state
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UxromState {
    pub prg_bank: u8,
    pub chr_ram: Vec<u8>,
    pub vram: Vec<u8>,
}

/// Mapper 2 implementation (UxROM)
///
/// Used by Mega Man, Castlevania and Contra.
pub struct Mapper2 {
    prg_rom: Vec<u8>,
    chr: ChrMemory,
    prg_banks: usize,
    mirroring: Mirroring,
    state: UxromState,
}

impl Mapper2 {
    pub fn new(cartridge: Cartridge) -> Self {
        let mirroring = cartridge.header.mirroring;
        let prg_banks = (cartridge.prg_rom.len() / PRG_BANK_SIZE).max(1);
        let chr = ChrMemory::new(cartridge.chr_rom);
        let chr_ram = if chr.is_ram() {
            vec![0; CHR_RAM_SIZE]
        } else {
            Vec::new()
        };

        Mapper2 {
            prg_rom: cartridge.prg_rom,
            chr,
            prg_banks,
            mirroring,
            state: UxromState {
                prg_bank: 0,
                chr_ram,
                vram: vec![0; mirroring.vram_size()],
            },
        }
    }

    fn map_prg_address(&self, addr: u16) -> usize {
        let offset = addr as usize & 0x3FFF;
        if addr < 0xC000 {
            let bank = self.state.prg_bank as usize & (self.prg_banks - 1);
            bank * PRG_BANK_SIZE + offset
        } else {
            (self.prg_banks - 1) * PRG_BANK_SIZE + offset
        }
    }
}

impl Mapper for Mapper2 {
    fn name(&self) -> &'static str {
        "UxROM"
    }

    fn reset(&mut self, hard: bool) {
        if hard {
            self.state.chr_ram.fill(0);
            self.state.vram.fill(0);
        }
        self.state.prg_bank = 0;
    }

    fn cpu_read(&self, addr: u16) -> u8 {
        if addr < 0x8000 {
            return 0;
        }
        self.prg_rom[self.map_prg_address(addr) % self.prg_rom.len()]
    }

    fn cpu_write(&mut self, addr: u16, value: u8) {
        if addr >= 0x8000 {
            self.state.prg_bank = value;
        }
    }

    fn ppu_read(&self, addr: u16) -> u8 {
        let addr = addr & 0x3FFF;
        if addr < 0x2000 {
            self.chr.read(&self.state.chr_ram, addr as usize)
        } else {
            read_nametable(&self.state.vram, self.mirroring, addr)
        }
    }

    fn ppu_write(&mut self, addr: u16, value: u8) {
        let addr = addr & 0x3FFF;
        if addr < 0x2000 {
            if self.chr.is_ram() {
                self.state.chr_ram[addr as usize] = value;
            }
        } else {
            write_nametable(&mut self.state.vram, self.mirroring, addr, value);
        }
    }

    fn mirroring(&self) -> Mirroring {
        self.mirroring
    }

    fn save_state(&self) -> MapperState {
        MapperState::Uxrom(self.state.clone())
    }

    fn load_state(&mut self, state: &MapperState) -> Result<(), MapperError> {
        let MapperState::Uxrom(s) = state else {
            return Err(wrong_kind("UxROM", state));
        };
        check_len("CHR-RAM", self.state.chr_ram.len(), s.chr_ram.len())?;
        check_len("VRAM", self.state.vram.len(), s.vram.len())?;
        self.state = s.clone();
        Ok(())
    }
}

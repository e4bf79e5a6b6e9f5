// Mapper 7 (AxROM) - 32KB PRG switching with one-screen mirroring
//
// Memory Layout:
// - CPU $8000-$FFFF: 32KB PRG-ROM bank (switchable)
// - PPU $0000-$1FFF: 8KB CHR-RAM
//
// Register Interface:
// - $8000-$FFFF: Bits 0-3 select the 32KB bank, bit 4 selects the nametable page

use serde::{Deserialize, Serialize};

use super::{
    check_len, read_nametable, write_nametable, wrong_kind, MapperError, MapperState,
    CHR_RAM_SIZE,
};
use crate::cartridge::{Cartridge, ChrMemory, Mapper, Mirroring, NAMETABLE_SIZE};

/// PRG-ROM bank size (32KB)
const PRG_32KB: usize = 0x8000;

/// Mutable AxROM state
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AxromState {
    pub prg_bank: u8,
    /// 0 = lower page, 1 = upper page
    pub nametable_page: u8,
    pub chr_ram: Vec<u8>,
    pub vram: Vec<u8>,
}

/// Mapper 7 implementation (AxROM)
///
/// Used by Battletoads, Marble Madness and R.C. Pro-Am.
pub struct Mapper7 {
    prg_rom: Vec<u8>,
    chr: ChrMemory,
    /// Number of 32KB banks
    prg_banks: usize,
    state: AxromState,
}

impl Mapper7 {
    pub fn new(cartridge: Cartridge) -> Self {
        let prg_banks = (cartridge.prg_rom.len() / PRG_32KB).max(1);
        let chr = ChrMemory::new(cartridge.chr_rom);
        let chr_ram = if chr.is_ram() {
            vec![0; CHR_RAM_SIZE]
        } else {
            Vec::new()
        };

        Mapper7 {
            prg_rom: cartridge.prg_rom,
            chr,
            prg_banks,
            state: AxromState {
                prg_bank: 0,
                nametable_page: 0,
                chr_ram,
                vram: vec![0; 2 * NAMETABLE_SIZE],
            },
        }
    }
}

impl Mapper for Mapper7 {
    fn name(&self) -> &'static str {
        "AxROM"
    }

    fn reset(&mut self, hard: bool) {
        if hard {
            self.state.chr_ram.fill(0);
            self.state.vram.fill(0);
        }
        self.state.prg_bank = 0;
        self.state.nametable_page = 0;
    }

    fn cpu_read(&self, addr: u16) -> u8 {
        if addr < 0x8000 {
            return 0;
        }
        let bank = self.state.prg_bank as usize & (self.prg_banks - 1);
        self.prg_rom[(bank * PRG_32KB + (addr as usize & 0x7FFF)) % self.prg_rom.len()]
    }

    fn cpu_write(&mut self, addr: u16, value: u8) {
        if addr >= 0x8000 {
            self.state.prg_bank = value & 0x0F;
            self.state.nametable_page = (value & 0x10) >> 4;
        }
    }

    fn ppu_read(&self, addr: u16) -> u8 {
        let addr = addr & 0x3FFF;
        if addr < 0x2000 {
            self.chr.read(&self.state.chr_ram, addr as usize)
        } else {
            read_nametable(&self.state.vram, self.mirroring(), addr)
        }
    }

    fn ppu_write(&mut self, addr: u16, value: u8) {
        let addr = addr & 0x3FFF;
        if addr < 0x2000 {
            if self.chr.is_ram() {
                self.state.chr_ram[addr as usize] = value;
            }
        } else {
            let mirroring = self.mirroring();
            write_nametable(&mut self.state.vram, mirroring, addr, value);
        }
    }

    fn mirroring(&self) -> Mirroring {
        if self.state.nametable_page == 0 {
            Mirroring::SingleScreenLower
        } else {
            Mirroring::SingleScreenUpper
        }
    }

    fn save_state(&self) -> MapperState {
        MapperState::Axrom(self.state.clone())
    }

    fn load_state(&mut self, state: &MapperState) -> Result<(), MapperError> {
        let MapperState::Axrom(s) = state else {
            return Err(wrong_kind("AxROM", state));
        };
        check_len("CHR-RAM", self.state.chr_ram.len(), s.chr_ram.len())?;
        check_len("VRAM", self.state.vram.len(), s.vram.len())?;
        self.state = s.clone();
        Ok(())
    }
}

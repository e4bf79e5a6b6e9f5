// Mapper 3 (CNROM) - Switchable 8KB CHR bank
//
// Memory Layout:
// - CPU $8000-$FFFF: 16KB or 32KB PRG-ROM, NROM-style (16KB mirrored)
// - PPU $0000-$1FFF: 8KB CHR-ROM bank (switchable)
//
// Register Interface:
// - $8000-$FFFF: CHR bank select, masked by the bank count

use serde::{Deserialize, Serialize};

use super::{
    check_len, read_nametable, write_nametable, wrong_kind, MapperError, MapperState,
    CHR_RAM_SIZE,
};
use crate::cartridge::{Cartridge, ChrMemory, Mapper, Mirroring, CHR_BANK_SIZE};

/// Mutable CNROM state
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CnromState {
    pub chr_bank: u8,
    pub chr_ram: Vec<u8>,
    pub vram: Vec<u8>,
}

/// Mapper 3 implementation (CNROM)
///
/// Used by Arkanoid, Gradius and Solomon's Key.
pub struct Mapper3 {
    prg_rom: Vec<u8>,
    chr: ChrMemory,
    /// Number of 8KB CHR banks (1 for CHR-RAM boards)
    chr_banks: usize,
    mirroring: Mirroring,
    state: CnromState,
}

impl Mapper3 {
    pub fn new(cartridge: Cartridge) -> Self {
        let mirroring = cartridge.header.mirroring;
        let chr = ChrMemory::new(cartridge.chr_rom);
        let chr_banks = (chr.kilobytes() / 8).max(1);
        let chr_ram = if chr.is_ram() {
            vec![0; CHR_RAM_SIZE]
        } else {
            Vec::new()
        };

        Mapper3 {
            prg_rom: cartridge.prg_rom,
            chr,
            chr_banks,
            mirroring,
            state: CnromState {
                chr_bank: 0,
                chr_ram,
                vram: vec![0; mirroring.vram_size()],
            },
        }
    }

    fn map_chr_address(&self, addr: u16) -> usize {
        let bank = self.state.chr_bank as usize & (self.chr_banks - 1);
        bank * CHR_BANK_SIZE + (addr as usize & 0x1FFF)
    }
}

impl Mapper for Mapper3 {
    fn name(&self) -> &'static str {
        "CNROM"
    }

    fn reset(&mut self, hard: bool) {
        if hard {
            self.state.chr_ram.fill(0);
            self.state.vram.fill(0);
        }
        self.state.chr_bank = 0;
    }

    fn cpu_read(&self, addr: u16) -> u8 {
        if addr < 0x8000 {
            return 0;
        }
        self.prg_rom[(addr - 0x8000) as usize % self.prg_rom.len()]
    }

    fn cpu_write(&mut self, addr: u16, value: u8) {
        if addr >= 0x8000 {
            self.state.chr_bank = value;
        }
    }

    fn ppu_read(&self, addr: u16) -> u8 {
        let addr = addr & 0x3FFF;
        if addr < 0x2000 {
            self.chr.read(&self.state.chr_ram, self.map_chr_address(addr))
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
        MapperState::Cnrom(self.state.clone())
    }

    fn load_state(&mut self, state: &MapperState) -> Result<(), MapperError> {
        let MapperState::Cnrom(s) = state else {
            return Err(wrong_kind("CNROM", state));
        };
        check_len("CHR-RAM", self.state.chr_ram.len(), s.chr_ram.len())?;
        check_len("VRAM", self.state.vram.len(), s.vram.len())?;
        self.state = s.clone();
        Ok(())
    }
}

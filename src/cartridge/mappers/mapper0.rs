// Mapper 0 (NROM) - The simplest NES mapper with no bank switching
//
// Memory Layout:
// - CPU $6000-$7FFF: 8KB PRG-RAM
// - CPU $8000-$BFFF: First 16KB of PRG-ROM
// - CPU $C000-$FFFF: Last 16KB of PRG-ROM (or mirror of first 16KB if only 16KB total)
// - PPU $0000-$1FFF: 8KB CHR-ROM or CHR-RAM
// - PPU $2000-$3EFF: Nametables, mirrored as the header says
//
// Variants:
// - NROM-128: 16KB PRG-ROM (mirrored to fill 32KB space)
// - NROM-256: 32KB PRG-ROM (no mirroring)

use serde::{Deserialize, Serialize};

use super::{
    check_len, read_nametable, write_nametable, wrong_kind, MapperError, MapperState,
    CHR_RAM_SIZE, PRG_RAM_SIZE,
};
use crate::cartridge::{Cartridge, ChrMemory, Mapper, Mirroring};

/// Mutable NROM state
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NromState {
    pub prg_ram: Vec<u8>,
    /// Empty when the board has CHR-ROM
    pub chr_ram: Vec<u8>,
    pub vram: Vec<u8>,
}

/// Mapper 0 implementation (NROM)
///
/// Used by Super Mario Bros., Donkey Kong and Balloon Fight.
pub struct Mapper0 {
    prg_rom: Vec<u8>,
    chr: ChrMemory,
    /// Fixed by the header
    mirroring: Mirroring,
    state: NromState,
}

impl Mapper0 {
    pub fn new(cartridge: Cartridge) -> Self {
        let mirroring = cartridge.header.mirroring;
        let chr = ChrMemory::new(cartridge.chr_rom);
        let chr_ram = if chr.is_ram() {
            vec![0; CHR_RAM_SIZE]
        } else {
            Vec::new()
        };

        Mapper0 {
            prg_rom: cartridge.prg_rom,
            chr,
            mirroring,
            state: NromState {
                prg_ram: vec![0; PRG_RAM_SIZE],
                chr_ram,
                vram: vec![0; mirroring.vram_size()],
            },
        }
    }
}

impl Mapper for Mapper0 {
    fn name(&self) -> &'static str {
        "NROM"
    }

    fn reset(&mut self, hard: bool) {
        if hard {
            self.state.prg_ram.fill(0);
            self.state.chr_ram.fill(0);
            self.state.vram.fill(0);
        }
    }

    fn cpu_read(&self, addr: u16) -> u8 {
        match addr {
            0x6000..=0x7FFF => self.state.prg_ram[(addr - 0x6000) as usize],
            // 16KB images mirror into the upper half
            0x8000..=0xFFFF => self.prg_rom[(addr - 0x8000) as usize % self.prg_rom.len()],
            _ => 0,
        }
    }

    fn cpu_write(&mut self, addr: u16, value: u8) {
        if let 0x6000..=0x7FFF = addr {
            self.state.prg_ram[(addr - 0x6000) as usize] = value;
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

    fn prg_ram(&self) -> Option<&[u8]> {
        Some(&self.state.prg_ram)
    }

    fn prg_ram_mut(&mut self) -> Option<&mut [u8]> {
        Some(&mut self.state.prg_ram)
    }

    fn save_state(&self) -> MapperState {
        MapperState::Nrom(self.state.clone())
    }

    fn load_state(&mut self, state: &MapperState) -> Result<(), MapperError> {
        let MapperState::Nrom(s) = state else {
            return Err(wrong_kind("NROM", state));
        };
        check_len("PRG-RAM", self.state.prg_ram.len(), s.prg_ram.len())?;
        check_len("CHR-RAM", self.state.chr_ram.len(), s.chr_ram.len())?;
        check_len("VRAM", self.state.vram.len(), s.vram.len())?;
        self.state = s.clone();
        Ok(())
    }
}

// Mapper 1 (MMC1) - Serial-loaded bank registers
//
// Memory Layout:
// - CPU $6000-$7FFF: 8KB PRG-RAM (optional, battery-backed)
// - CPU $8000-$BFFF: 16KB PRG-ROM bank (switchable or fixed depending on mode)
// - CPU $C000-$FFFF: 16KB PRG-ROM bank (switchable or fixed depending on mode)
// - PPU $0000-$0FFF: 4KB CHR bank 0 (switchable)
// - PPU $1000-$1FFF: 4KB CHR bank 1 (switchable)
//
// Register Interface:
// All writes to $8000-$FFFF go through a serial shift register:
// - Bit 7 set: Clear the shift register and write counter
// - Bit 0: Data bit, shifted in LSB first
// - The fifth write commits the value to the register chosen by address bits 13-14
//
// Control Register ($8000-$9FFF):
//   Bits 0-1: Mirroring (0=one-screen lower, 1=one-screen upper, 2=vertical, 3=horizontal)
//   Bits 2-3: PRG-ROM bank mode
//   Bit 4: CHR-ROM bank mode
//
// CHR Bank 0 ($A000-$BFFF), CHR Bank 1 ($C000-$DFFF)
//
// PRG Bank ($E000-$FFFF):
//   Bits 0-3: Select PRG-ROM bank
//   Bit 4: PRG-RAM disable

use serde::{Deserialize, Serialize};

use super::{
    check_len, read_nametable, write_nametable, wrong_kind, MapperError, MapperState,
    CHR_RAM_SIZE, PRG_RAM_SIZE,
};
use crate::cartridge::{Cartridge, ChrMemory, Mapper, Mirroring, PRG_BANK_SIZE};

/// 4KB CHR bank
const CHR_4KB: usize = 0x1000;

/// Mutable MMC1 state
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Mmc1State {
    pub shift_register: u8,
    pub write_count: u8,
    /// Control bits 0-1
    pub mirroring: u8,
    /// Control bits 2-3
    pub prg_mode: u8,
    /// Control bit 4
    pub chr_mode: u8,
    pub chr_bank_0: u8,
    pub chr_bank_1: u8,
    pub prg_bank: u8,
    pub ram_disabled: bool,
    pub prg_ram: Vec<u8>,
    pub chr_ram: Vec<u8>,
    pub vram: Vec<u8>,
}

/// Mapper 1 implementation (MMC1)
///
/// Used by The Legend of Zelda, Metroid and Mega Man 2.
pub struct Mapper1 {
    prg_rom: Vec<u8>,
    chr: ChrMemory,
    /// Number of 16KB PRG-ROM banks
    prg_banks: usize,
    state: Mmc1State,
}

impl Mapper1 {
    pub fn new(cartridge: Cartridge) -> Self {
        let prg_banks = (cartridge.prg_rom.len() / PRG_BANK_SIZE).max(1);
        let chr = ChrMemory::new(cartridge.chr_rom);
        let chr_ram = if chr.is_ram() {
            vec![0; CHR_RAM_SIZE]
        } else {
            Vec::new()
        };

        let mut mapper = Mapper1 {
            prg_rom: cartridge.prg_rom,
            chr,
            prg_banks,
            state: Mmc1State {
                shift_register: 0,
                write_count: 0,
                mirroring: 0,
                prg_mode: 3,
                chr_mode: 1,
                chr_bank_0: 0,
                chr_bank_1: 0,
                prg_bank: 0,
                ram_disabled: false,
                prg_ram: vec![0; PRG_RAM_SIZE],
                chr_ram,
                vram: vec![0; 2 * crate::cartridge::NAMETABLE_SIZE],
            },
        };
        mapper.reset(true);
        mapper
    }

    /// Commit a full shift register to the register picked by address bits 13-14
    fn write_internal_register(&mut self, addr: u16, value: u8) {
        let s = &mut self.state;
        match (addr & 0x6000) >> 13 {
            0 => {
                s.mirroring = value & 0x03;
                s.prg_mode = (value & 0x0C) >> 2;
                s.chr_mode = (value & 0x10) >> 4;
            }
            1 => s.chr_bank_0 = value,
            2 => s.chr_bank_1 = value,
            _ => {
                s.prg_bank = value & 0x0F;
                s.ram_disabled = value & 0x10 != 0;
            }
        }
    }

    /// Map CPU address to PRG-ROM offset
    fn map_prg_address(&self, addr: u16) -> usize {
        let bank = self.state.prg_bank as usize & (self.prg_banks - 1);
        let offset = addr as usize & 0x3FFF;

        match self.state.prg_mode {
            // 32KB mode ignores the low bank bit
            0 | 1 => (bank >> 1) * 2 * PRG_BANK_SIZE + (addr as usize & 0x7FFF),
            2 => {
                if addr < 0xC000 {
                    offset
                } else {
                    bank * PRG_BANK_SIZE + offset
                }
            }
            _ => {
                if addr < 0xC000 {
                    bank * PRG_BANK_SIZE + offset
                } else {
                    (self.prg_banks - 1) * PRG_BANK_SIZE + offset
                }
            }
        }
    }

    /// Map PPU address to CHR offset
    fn map_chr_address(&self, addr: u16) -> usize {
        let bank_count = self.chr.kilobytes() / 4;
        let mask = bank_count.max(2) - 1;

        if self.state.chr_mode == 1 {
            let bank = if addr < 0x1000 {
                self.state.chr_bank_0
            } else {
                self.state.chr_bank_1
            };
            (bank as usize & mask) * CHR_4KB + (addr as usize & 0x0FFF)
        } else {
            ((self.state.chr_bank_0 as usize & mask) >> 1) * 2 * CHR_4KB + (addr as usize & 0x1FFF)
        }
    }
}

impl Mapper for Mapper1 {
    fn name(&self) -> &'static str {
        "MMC1"
    }

    fn reset(&mut self, hard: bool) {
        let s = &mut self.state;
        if hard {
            s.prg_ram.fill(0);
            s.chr_ram.fill(0);
            s.vram.fill(0);
        }
        s.shift_register = 0;
        s.write_count = 0;
        s.mirroring = 0;
        s.prg_mode = 3;
        s.chr_mode = 1;
        s.chr_bank_0 = 0;
        s.chr_bank_1 = 0;
        s.prg_bank = 0;
        s.ram_disabled = false;
    }

    fn cpu_read(&self, addr: u16) -> u8 {
        match addr {
            0x6000..=0x7FFF => {
                if self.state.ram_disabled {
                    0
                } else {
                    self.state.prg_ram[(addr & 0x1FFF) as usize]
                }
            }
            0x8000..=0xFFFF => self.prg_rom[self.map_prg_address(addr) % self.prg_rom.len()],
            _ => 0,
        }
    }

    fn cpu_write(&mut self, addr: u16, value: u8) {
        match addr {
            0x6000..=0x7FFF => {
                if !self.state.ram_disabled {
                    self.state.prg_ram[(addr & 0x1FFF) as usize] = value;
                }
            }
            0x8000..=0xFFFF => {
                if value & 0x80 != 0 {
                    self.state.shift_register = 0;
                    self.state.write_count = 0;
                    return;
                }

                self.state.shift_register |= (value & 1) << self.state.write_count;
                self.state.write_count += 1;

                if self.state.write_count == 5 {
                    let register_value = self.state.shift_register;
                    self.write_internal_register(addr, register_value);
                    self.state.shift_register = 0;
                    self.state.write_count = 0;
                }
            }
            _ => {}
        }
    }

    fn ppu_read(&self, addr: u16) -> u8 {
        let addr = addr & 0x3FFF;
        if addr < 0x2000 {
            self.chr.read(&self.state.chr_ram, self.map_chr_address(addr))
        } else {
            read_nametable(&self.state.vram, self.mirroring(), addr)
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
            let mirroring = self.mirroring();
            write_nametable(&mut self.state.vram, mirroring, addr, value);
        }
    }

    fn mirroring(&self) -> Mirroring {
        match self.state.mirroring {
            0 => Mirroring::SingleScreenLower,
            1 => Mirroring::SingleScreenUpper,
            2 => Mirroring::Vertical,
            _ => Mirroring::Horizontal,
        }
    }

    fn prg_ram(&self) -> Option<&[u8]> {
        Some(&self.state.prg_ram)
    }

    fn prg_ram_mut(&mut self) -> Option<&mut [u8]> {
        Some(&mut self.state.prg_ram)
    }

    fn save_state(&self) -> MapperState {
        MapperState::Mmc1(self.state.clone())
    }

    fn load_state(&mut self, state: &MapperState) -> Result<(), MapperError> {
        let MapperState::Mmc1(s) = state else {
            return Err(wrong_kind("MMC1", state));
        };
        check_len("PRG-RAM", self.state.prg_ram.len(), s.prg_ram.len())?;
        check_len("CHR-RAM", self.state.chr_ram.len(), s.chr_ram.len())?;
        check_len("VRAM", self.state.vram.len(), s.vram.len())?;
        if s.write_count >= 5 {
            return Err(MapperError::StateMismatch(format!(
                "MMC1 write count {} out of range",
                s.write_count
            )));
        }
        self.state = s.clone();
        Ok(())
    }
}
